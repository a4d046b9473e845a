/// Database models for Quillpress
///
/// This module contains the row types for the blog tables along with their
/// SQL operations. Each model follows the same shape: a `FromRow` struct,
/// a `Create*` input, an `Update*` partial input, and a typed `*Filter`
/// for list/count queries.
///
/// # Models
///
/// - [`tag::Tag`]: Article categories, unique by name
/// - [`article::Article`]: Blog posts, each belonging to exactly one tag
///
/// # Example
///
/// ```no_run
/// use quillpress_shared::models::tag::{CreateTag, Tag};
/// use quillpress_shared::models::State;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let tag = Tag::create(
///     &pool,
///     CreateTag {
///         name: "rust".to_string(),
///         created_by: "admin".to_string(),
///         state: State::Enabled,
///     },
/// )
/// .await?;
/// println!("Created tag {}", tag.id);
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod article;
pub mod tag;

/// Publication state shared by tags and articles
///
/// Stored as `SMALLINT` and serialized as the bare integer (`0` or `1`),
/// so the wire format stays `"state": 1`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(into = "i16", try_from = "i16")]
#[repr(i16)]
pub enum State {
    /// Hidden / draft
    #[default]
    Disabled = 0,

    /// Visible / published
    Enabled = 1,
}

/// Error returned when an integer is not a valid [`State`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidState(pub i16);

impl fmt::Display for InvalidState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "state must be 0 or 1, got {}", self.0)
    }
}

impl std::error::Error for InvalidState {}

impl From<State> for i16 {
    fn from(state: State) -> Self {
        state as i16
    }
}

impl TryFrom<i16> for State {
    type Error = InvalidState;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(State::Disabled),
            1 => Ok(State::Enabled),
            other => Err(InvalidState(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_conversion() {
        assert_eq!(State::try_from(0), Ok(State::Disabled));
        assert_eq!(State::try_from(1), Ok(State::Enabled));
        assert_eq!(State::try_from(2), Err(InvalidState(2)));
        assert_eq!(i16::from(State::Enabled), 1);
    }

    #[test]
    fn test_state_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&State::Enabled).unwrap(), "1");
        assert_eq!(serde_json::from_str::<State>("0").unwrap(), State::Disabled);
        assert!(serde_json::from_str::<State>("7").is_err());
    }

    #[test]
    fn test_state_default_is_disabled() {
        assert_eq!(State::default(), State::Disabled);
    }
}
