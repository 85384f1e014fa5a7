//! Before/after snapshots produced by every mutation.

use serde::Serialize;

/// The record as it was before a mutation and as it is after.
///
/// Creates carry only `after`, deletes only `before`, updates both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change<T> {
    pub before: Option<T>,
    pub after: Option<T>,
}

impl<T> Change<T> {
    pub fn created(after: T) -> Self {
        Self { before: None, after: Some(after) }
    }

    pub fn updated(before: T, after: T) -> Self {
        Self { before: Some(before), after: Some(after) }
    }

    pub fn deleted(before: T) -> Self {
        Self { before: Some(before), after: None }
    }

    /// The most recent state: `after` when present, otherwise `before`.
    pub fn current(&self) -> Option<&T> {
        self.after.as_ref().or(self.before.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_prefers_after() {
        assert_eq!(Change::updated(1, 2).current(), Some(&2));
        assert_eq!(Change::created(3).current(), Some(&3));
        assert_eq!(Change::deleted(4).current(), Some(&4));
    }
}
