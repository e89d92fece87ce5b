//! Backend adapters for `timesheet-core`.

mod dev;
mod dto;
mod http;

pub use dev::DevBackend;
pub use dto::RowError;
pub use http::HttpBackend;
