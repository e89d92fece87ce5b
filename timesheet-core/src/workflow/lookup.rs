use std::fmt;

use crate::error::LoadError;

/// Identifies one issued fetch. Strictly increasing per workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub(crate) fn first() -> Self {
        Self(1)
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for FetchTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A dependent list keyed by the parent selection it was fetched for.
///
/// There is no "empty" state: a lookup only exists once its parent has been
/// chosen, and it starts out loading.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<K, T> {
    Loading { key: K, ticket: FetchTicket },
    Ready { key: K, items: Vec<T> },
    Failed { key: K, error: LoadError },
}

impl<K: Copy + PartialEq, T> Lookup<K, T> {
    pub fn loading(key: K, ticket: FetchTicket) -> Self {
        Self::Loading { key, ticket }
    }

    pub fn key(&self) -> K {
        match self {
            Lookup::Loading { key, .. } | Lookup::Ready { key, .. } | Lookup::Failed { key, .. } => {
                *key
            }
        }
    }

    /// Loaded items, empty while loading or after a failure.
    pub fn items(&self) -> &[T] {
        match self {
            Lookup::Ready { items, .. } => items,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Lookup::Loading { .. })
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Lookup::Ready { .. })
    }

    pub fn error(&self) -> Option<&LoadError> {
        match self {
            Lookup::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Whether this lookup is still waiting for exactly this fetch.
    pub fn awaits(&self, key: K, ticket: FetchTicket) -> bool {
        matches!(self, Lookup::Loading { key: k, ticket: t } if *k == key && *t == ticket)
    }

    pub(crate) fn resolve(&mut self, result: Result<Vec<T>, LoadError>) {
        let key = self.key();
        *self = match result {
            Ok(items) => Lookup::Ready { key, items },
            Err(error) => Lookup::Failed { key, error },
        };
    }
}
