//! Authorized user set.

use std::collections::BTreeSet;

use tracing::warn;

use crate::error::ConfigError;

use super::ChatId;

/// Immutable set of user ids allowed to issue commands and receive alerts.
///
/// Iteration order is ascending by id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizedUsers {
    ids: BTreeSet<ChatId>,
}

impl AuthorizedUsers {
    /// Builds the set; an empty set is rejected.
    pub fn new(ids: impl IntoIterator<Item = ChatId>) -> Result<Self, ConfigError> {
        let ids: BTreeSet<ChatId> = ids.into_iter().collect();
        if ids.is_empty() {
            return Err(ConfigError::NoUsers);
        }
        Ok(Self { ids })
    }

    /// Parses a comma-separated list of integer ids.
    ///
    /// Blank items are ignored and malformed ones are skipped with a warning;
    /// only an empty result is an error.
    ///
    /// # Example
    /// ```
    /// use hostwatch::AuthorizedUsers;
    ///
    /// let users = AuthorizedUsers::parse("42, 7,,42, bob").unwrap();
    /// assert_eq!(users.len(), 2);
    /// assert!(users.contains(7));
    /// ```
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let ids = raw
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .filter_map(|part| match part.parse::<ChatId>() {
                Ok(id) => Some(id),
                Err(_) => {
                    warn!(entry = part, "skipping malformed user id");
                    None
                }
            });
        Self::new(ids)
    }

    /// True if `id` is authorized.
    pub fn contains(&self, id: ChatId) -> bool {
        self.ids.contains(&id)
    }

    /// Iterates over authorized ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = ChatId> + '_ {
        self.ids.iter().copied()
    }

    /// Number of authorized users.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Always false: construction rejects empty sets.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skips_malformed_entries() {
        let users = AuthorizedUsers::parse("123, abc").unwrap();
        assert_eq!(users.iter().collect::<Vec<_>>(), vec![123]);
    }

    #[test]
    fn parse_rejects_sets_left_empty() {
        assert_eq!(AuthorizedUsers::parse(" , "), Err(ConfigError::NoUsers));
        assert_eq!(AuthorizedUsers::parse("abc, 1.5"), Err(ConfigError::NoUsers));
    }

    #[test]
    fn iteration_is_sorted() {
        let users = AuthorizedUsers::parse("30,-5,10").unwrap();
        assert_eq!(users.iter().collect::<Vec<_>>(), vec![-5, 10, 30]);
    }
}
