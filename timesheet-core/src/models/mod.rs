mod entry;
mod ids;
mod lookup;

pub use entry::*;
pub use ids::*;
pub use lookup::*;
