//! Failure kinds surfaced by engine operations.
use thiserror::Error;

/// Outcome of an operation that did not go through.
///
/// Everything except [`EngineError::PersistenceFailure`] is an expected,
/// user-facing refusal; front ends render those as ordinary messages.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("not enough coins: need {required}, have {available}")]
    InsufficientFunds { required: u64, available: u64 },
    #[error("earn upgrade is already at the maximum level")]
    AlreadyMaxed,
    #[error("character is already at the maximum level")]
    CharacterMaxed,
    #[error("character slot {requested} is locked (highest unlocked slot is {max_unlocked})")]
    LockedCharacter { requested: usize, max_unlocked: usize },
    #[error("daily bonus not ready yet: {remaining_secs}s remaining")]
    TooEarly { remaining_secs: u64 },
    #[error("unknown player `{0}`")]
    UnknownPlayer(String),
    #[error("storage failure for player `{player}`: {reason}")]
    PersistenceFailure { player: String, reason: String },
}

impl EngineError {
    /// Whether this is a rule refusal rather than an infrastructure fault.
    #[must_use]
    pub const fn is_domain(&self) -> bool {
        !matches!(
            self,
            Self::UnknownPlayer(_) | Self::PersistenceFailure { .. }
        )
    }

    pub(crate) fn persistence(player: &str, err: &dyn std::error::Error) -> Self {
        Self::PersistenceFailure {
            player: player.to_string(),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_amounts() {
        let err = EngineError::InsufficientFunds {
            required: 1_500,
            available: 20,
        };
        assert_eq!(err.to_string(), "not enough coins: need 1500, have 20");
        assert!(err.is_domain());
    }

    #[test]
    fn persistence_is_not_a_domain_refusal() {
        let io = std::io::Error::other("disk full");
        let err = EngineError::persistence("7", &io);
        assert!(!err.is_domain());
        assert!(err.to_string().contains("disk full"));
        assert!(!EngineError::UnknownPlayer("x".into()).is_domain());
        assert!(EngineError::TooEarly { remaining_secs: 5 }.is_domain());
    }
}
