use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Direction of a single ledger entry. There is no neutral value: the absence
/// of an entry means the user has not voted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum VoteValue {
    Up,
    Down,
}

impl VoteValue {
    pub fn as_i32(self) -> i32 {
        match self {
            VoteValue::Up => 1,
            VoteValue::Down => -1,
        }
    }
}

impl TryFrom<i32> for VoteValue {
    type Error = DomainError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(VoteValue::Up),
            -1 => Ok(VoteValue::Down),
            other => Err(DomainError::InvalidArgument(format!(
                "vote value must be 1 or -1, got {other}"
            ))),
        }
    }
}

impl From<VoteValue> for i32 {
    fn from(value: VoteValue) -> Self {
        value.as_i32()
    }
}

/// The ledger mutation required to move a user's vote to a desired value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTransition {
    /// No entry yet: insert one.
    Insert(VoteValue),
    /// Entry points the other way: overwrite it.
    Flip(VoteValue),
    /// Entry already matches.
    Unchanged,
}

impl VoteTransition {
    /// Decision table for a vote cast.
    pub fn decide(current: Option<VoteValue>, desired: VoteValue) -> Self {
        match current {
            None => VoteTransition::Insert(desired),
            Some(existing) if existing == desired => VoteTransition::Unchanged,
            Some(_) => VoteTransition::Flip(desired),
        }
    }

    /// Change to apply to the post's `points`.
    pub fn points_delta(self) -> i32 {
        match self {
            VoteTransition::Insert(value) => value.as_i32(),
            // Swings from one pole to the other.
            VoteTransition::Flip(value) => 2 * value.as_i32(),
            VoteTransition::Unchanged => 0,
        }
    }

    /// The value written to the ledger, if any.
    pub fn written_value(self) -> Option<VoteValue> {
        match self {
            VoteTransition::Insert(value) | VoteTransition::Flip(value) => Some(value),
            VoteTransition::Unchanged => None,
        }
    }
}

/// Result of a vote cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// Ledger and score were updated together.
    Applied { delta: i32 },
    /// Re-vote in the same direction; nothing was written.
    NoOp,
}

impl VoteOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, VoteOutcome::Applied { .. })
    }

    pub fn delta(&self) -> i32 {
        match self {
            VoteOutcome::Applied { delta } => *delta,
            VoteOutcome::NoOp => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_vote_inserts_with_unit_delta() {
        let t = VoteTransition::decide(None, VoteValue::Up);
        assert_eq!(t, VoteTransition::Insert(VoteValue::Up));
        assert_eq!(t.points_delta(), 1);

        let t = VoteTransition::decide(None, VoteValue::Down);
        assert_eq!(t.points_delta(), -1);
    }

    #[test]
    fn test_same_direction_is_unchanged() {
        let t = VoteTransition::decide(Some(VoteValue::Down), VoteValue::Down);
        assert_eq!(t, VoteTransition::Unchanged);
        assert_eq!(t.points_delta(), 0);
        assert_eq!(t.written_value(), None);
    }

    #[test]
    fn test_flip_swings_by_two() {
        let t = VoteTransition::decide(Some(VoteValue::Up), VoteValue::Down);
        assert_eq!(t, VoteTransition::Flip(VoteValue::Down));
        assert_eq!(t.points_delta(), -2);

        let t = VoteTransition::decide(Some(VoteValue::Down), VoteValue::Up);
        assert_eq!(t.points_delta(), 2);
    }

    #[test]
    fn test_vote_value_rejects_out_of_range() {
        for raw in [0, 2, -2, i32::MAX] {
            assert!(matches!(
                VoteValue::try_from(raw),
                Err(DomainError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_vote_value_serde_as_integer() {
        assert_eq!(serde_json::to_string(&VoteValue::Down).unwrap(), "-1");
        let parsed: VoteValue = serde_json::from_str("1").unwrap();
        assert_eq!(parsed, VoteValue::Up);
        assert!(serde_json::from_str::<VoteValue>("0").is_err());
    }
}
