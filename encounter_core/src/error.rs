//! Errors raised by encounter operations
//!
//! Losing a roll (a failed disarm, a failed evade) is never an error; those are
//! outcome variants. Errors here mean the request itself could not be honoured.

use crate::types::ItemId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Category of content key that failed to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Trap,
    Enemy,
    Item,
    Class,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Trap => write!(f, "trap"),
            EntityKind::Enemy => write!(f, "enemy"),
            EntityKind::Item => write!(f, "item"),
            EntityKind::Class => write!(f, "class"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EncounterError {
    /// A consumable or tool was required but is not in the inventory.
    /// The action is rejected but the turn is still spent.
    #[error("item not available: {0}")]
    ItemNotAvailable(ItemId),

    /// The decision could not be understood or does not answer the pending
    /// request. Nothing changed; the caller should ask again.
    #[error("invalid action '{input}', expected {expected}")]
    InvalidAction {
        input: String,
        expected: &'static str,
    },

    /// A content key did not resolve. This is a data bug, not a player mistake.
    #[error("unknown {kind}: '{key}'")]
    UnknownEntity { kind: EntityKind, key: String },

    #[error("combat is already resolved")]
    AlreadyResolved,

    #[error("session is over")]
    SessionOver,
}

impl EncounterError {
    pub(crate) fn invalid(input: impl Into<String>, expected: &'static str) -> Self {
        EncounterError::InvalidAction {
            input: input.into(),
            expected,
        }
    }

    pub(crate) fn unknown(kind: EntityKind, key: impl Into<String>) -> Self {
        EncounterError::UnknownEntity {
            kind,
            key: key.into(),
        }
    }

    /// Whether the caller should simply re-prompt for the same decision
    pub fn is_retryable(&self) -> bool {
        matches!(self, EncounterError::InvalidAction { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = EncounterError::ItemNotAvailable(ItemId::from("Health Potion"));
        assert_eq!(err.to_string(), "item not available: Health Potion");

        let err = EncounterError::unknown(EntityKind::Trap, "boulder");
        assert_eq!(err.to_string(), "unknown trap: 'boulder'");
    }

    #[test]
    fn test_only_invalid_action_is_retryable() {
        assert!(EncounterError::invalid("dance", "attack, block or heal").is_retryable());
        assert!(!EncounterError::SessionOver.is_retryable());
        assert!(!EncounterError::AlreadyResolved.is_retryable());
    }
}
