use reputation_ledger_shared::types::{VoteDirection, VoteSnapshot, VoteWeights, VoteWrite};
use crate::errors::LedgerError;

/// The effect of one vote action on the records it touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTransition {
    /// The voter's direction once the action commits; `None` after a retraction.
    pub next: Option<VoteDirection>,
    pub upvotes: i64,
    pub downvotes: i64,
    /// Net change to the author's points.
    pub points: i64,
}

impl VoteTransition {
    /// Computes the transition from the voter's `previous` direction when they click `requested`.
    ///
    /// Clicking the standing direction again retracts the vote. Clicking the other
    /// direction flips it, undoing the old direction's count and points before
    /// applying the new ones.
    ///
    /// Fails with `LedgerError::ArithmeticOverflow` when the point delta does not fit in `i64`.
    pub fn compute(
        previous: Option<VoteDirection>,
        requested: VoteDirection,
        weights: &VoteWeights,
    ) -> Result<Self, LedgerError> {
        let next = (previous != Some(requested)).then_some(requested);

        let (upvotes, downvotes) = match (previous, next) {
            (Some(VoteDirection::Up), None)                         => (-1, 0),
            (Some(VoteDirection::Down), None)                       => (0, -1),
            (Some(VoteDirection::Up), Some(VoteDirection::Down))    => (-1, 1),
            (Some(VoteDirection::Down), Some(VoteDirection::Up))    => (1, -1),
            (None, Some(VoteDirection::Up))                         => (1, 0),
            (None, Some(VoteDirection::Down))                       => (0, 1),
            (_, _) => (0, 0),
        };

        let withdrawn = previous.map_or(0, |direction| weights.points_for(direction));
        let credited = next.map_or(0, |direction| weights.points_for(direction));

        Ok(Self {
            next,
            upvotes,
            downvotes,
            points: credited.checked_sub(withdrawn).ok_or(LedgerError::ArithmeticOverflow)?,
        })
    }

    /// Builds the conditional write set that applies this transition on top of `snapshot`.
    pub fn apply(&self, snapshot: &VoteSnapshot) -> Result<VoteWrite, LedgerError> {
        let mut counts = snapshot.counts.value.clone();
        counts.upvotes = checked_add(counts.upvotes, self.upvotes)?;
        counts.downvotes = checked_add(counts.downvotes, self.downvotes)?;

        let author = match &snapshot.author {
            Some(author) => {
                let mut account = author.value.clone();
                account.points = checked_add(account.points, self.points)?;
                Some(author.with_value(account))
            }
            None => None,
        };

        Ok(VoteWrite {
            key: snapshot.key.clone(),
            vote: snapshot.vote.with_value(self.next),
            counts: snapshot.counts.with_value(counts),
            author,
        })
    }
}

pub(crate) fn checked_add(total: i64, delta: i64) -> Result<i64, LedgerError> {
    total.checked_add(delta).ok_or(LedgerError::ArithmeticOverflow)
}
