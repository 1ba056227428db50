use serde::{Deserialize, Serialize};

/// Represents the direction of a vote cast by a user.
///
/// A retraction is not a direction: it is the absence of a vote record.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    /// Indicates an upvote or positive endorsement.
    Up,
    /// Indicates a downvote or negative endorsement.
    Down,
}

impl TryFrom<i16> for VoteDirection {
    type Error = i16;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(VoteDirection::Up),
            1 => Ok(VoteDirection::Down),
            other => Err(other),
        }
    }
}

impl From<VoteDirection> for i16 {
    fn from(direction: VoteDirection) -> Self {
        match direction {
            VoteDirection::Up => 0,
            VoteDirection::Down => 1,
        }
    }
}

/// Point deltas credited to a content author per vote direction.
///
/// Both values are signed and applied as-is: `down` is normally negative. A
/// retraction applies the negation of the value credited when the vote was cast.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteWeights {
    pub up: i64,
    pub down: i64,
}

impl VoteWeights {
    pub const fn new(up: i64, down: i64) -> Self {
        Self { up, down }
    }

    /// Points credited to the author while a vote in `direction` stands.
    pub fn points_for(&self, direction: VoteDirection) -> i64 {
        match direction {
            VoteDirection::Up => self.up,
            VoteDirection::Down => self.down,
        }
    }
}

impl Default for VoteWeights {
    fn default() -> Self {
        Self::new(1, -1)
    }
}
