//! This module defines the `VoteLedger`, which records one vote per (user, content item),
//! keeps per-item vote counts and keeps each author's point total consistent with them.
//!
//! Every mutation goes through the same optimistic cycle: read a versioned snapshot,
//! compute the new values, and ask the repository to commit them conditionally. A
//! conflicting concurrent commit makes the repository reject the whole write set, in
//! which case the cycle restarts from a fresh snapshot until the retry budget runs out.
mod retry;
mod transition;

pub use retry::RetryPolicy;
pub use transition::VoteTransition;

use transition::checked_add;

use std::sync::Arc;
use reputation_ledger_repository::{CommitOutcome, LedgerRepository, LedgerRepositoryError};
use reputation_ledger_shared::types::{
    AuthorAccount, ContentRef, UserId, VoteDirection, VoteKey, VoteOutcome, VoteWeights,
    VotesCount,
};
use tokio_retry::RetryIf;
use tracing::{debug, info, instrument};
use crate::errors::LedgerError;
use crate::identity::Identity;

/// A vote action as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteRequest {
    pub content: ContentRef,
    pub direction: VoteDirection,
    /// Author of the content item; `None` when nobody earns points from it.
    pub author_id: Option<UserId>,
    pub weights: VoteWeights,
}

/// Failure of a single optimistic attempt. Only `Conflict` is retried.
#[derive(Debug)]
enum AttemptError {
    Conflict,
    Failed(LedgerError),
}

impl From<LedgerError> for AttemptError {
    fn from(error: LedgerError) -> Self {
        AttemptError::Failed(error)
    }
}

impl From<LedgerRepositoryError> for AttemptError {
    fn from(error: LedgerRepositoryError) -> Self {
        AttemptError::Failed(error.into())
    }
}

/// The vote and reputation ledger.
pub struct VoteLedger {
    repository: Arc<dyn LedgerRepository>,
    retry_policy: RetryPolicy,
}

impl VoteLedger {
    pub fn new(repository: Arc<dyn LedgerRepository>) -> Self {
        Self::with_retry_policy(repository, RetryPolicy::default())
    }

    pub fn with_retry_policy(repository: Arc<dyn LedgerRepository>, retry_policy: RetryPolicy) -> Self {
        Self {
            repository,
            retry_policy,
        }
    }

    /// Casts, flips or retracts the caller's vote on `request.content`.
    ///
    /// Clicking the direction the caller already holds retracts the vote; clicking
    /// the other direction flips it. The vote record, the item's counts and the
    /// author's points are committed together or not at all.
    ///
    /// # Errors
    ///
    /// * `LedgerError::Unauthenticated` - `caller` has no user id
    /// * `LedgerError::SelfVoteForbidden` - the caller authored the content
    /// * `LedgerError::VoteConflict` - every attempt lost to a concurrent commit
    /// * `LedgerError::ArithmeticOverflow` - counts or points would leave the `i64` range
    /// * `LedgerError::Repository` - the store failed; nothing was written
    #[instrument(
        skip(self, caller, request),
        fields(content = %request.content, direction = ?request.direction)
    )]
    pub async fn cast_vote(
        &self,
        caller: &dyn Identity,
        request: &VoteRequest,
    ) -> Result<VoteOutcome, LedgerError> {
        let voter_id = caller.user_id().ok_or(LedgerError::Unauthenticated)?;
        if request.author_id.as_ref() == Some(&voter_id) {
            return Err(LedgerError::SelfVoteForbidden);
        }

        let key = VoteKey::new(voter_id, request.content.clone());
        let mut attempts = 0u32;
        let result = RetryIf::start(
            self.retry_policy.strategy(),
            || {
                attempts += 1;
                self.attempt_vote(&key, request, attempts)
            },
            |error: &AttemptError| matches!(error, AttemptError::Conflict),
        )
        .await;

        match result {
            Ok(outcome) => {
                debug!(
                    voter = %key.voter_id,
                    attempts,
                    upvotes = outcome.upvotes,
                    downvotes = outcome.downvotes,
                    "Vote committed"
                );
                Ok(outcome)
            }
            Err(AttemptError::Conflict) => {
                info!(voter = %key.voter_id, attempts, "Vote retry budget exhausted");
                Err(LedgerError::VoteConflict { attempts })
            }
            Err(AttemptError::Failed(error)) => Err(error),
        }
    }

    async fn attempt_vote(
        &self,
        key: &VoteKey,
        request: &VoteRequest,
        attempt: u32,
    ) -> Result<VoteOutcome, AttemptError> {
        let snapshot = self
            .repository
            .load_vote_snapshot(key, request.author_id.as_ref())
            .await?;
        let transition = VoteTransition::compute(snapshot.vote.value, request.direction, &request.weights)?;
        let write = transition.apply(&snapshot)?;

        match self.repository.commit_vote(&write).await? {
            CommitOutcome::Committed => Ok(VoteOutcome {
                upvotes: write.counts.value.upvotes,
                downvotes: write.counts.value.downvotes,
                direction: transition.next,
            }),
            CommitOutcome::Conflict => {
                debug!(vote = %key, attempt, "Vote commit conflicted, retrying");
                Err(AttemptError::Conflict)
            }
        }
    }

    /// Credits a one-time award (e.g. for posting a comment) to `author_id`.
    ///
    /// Uses the same optimistic retry as `cast_vote`, so concurrent awards and
    /// votes never lose each other's updates.
    #[instrument(skip(self))]
    pub async fn award_points(&self, author_id: &UserId, points: i64) -> Result<AuthorAccount, LedgerError> {
        let mut attempts = 0u32;
        let result = RetryIf::start(
            self.retry_policy.strategy(),
            || {
                attempts += 1;
                self.attempt_award(author_id, points)
            },
            |error: &AttemptError| matches!(error, AttemptError::Conflict),
        )
        .await;

        match result {
            Ok(account) => Ok(account),
            Err(AttemptError::Conflict) => Err(LedgerError::VoteConflict { attempts }),
            Err(AttemptError::Failed(error)) => Err(error),
        }
    }

    async fn attempt_award(&self, author_id: &UserId, points: i64) -> Result<AuthorAccount, AttemptError> {
        let read = self.repository.load_account(author_id).await?;
        let account = AuthorAccount {
            user_id: author_id.clone(),
            points: checked_add(read.value.points, points)?,
        };
        let write = read.with_value(account);

        match self.repository.commit_account(&write).await? {
            CommitOutcome::Committed => Ok(write.value),
            CommitOutcome::Conflict => Err(AttemptError::Conflict),
        }
    }

    /// The voter's standing direction on `content`, if any.
    pub async fn vote_of(
        &self,
        voter_id: &UserId,
        content: &ContentRef,
    ) -> Result<Option<VoteDirection>, LedgerError> {
        let key = VoteKey::new(voter_id.clone(), content.clone());
        Ok(self.repository.get_vote(&key).await?)
    }

    /// Current vote counts of `content`; zero for items nobody has voted on.
    pub async fn counts(&self, content: &ContentRef) -> Result<VotesCount, LedgerError> {
        Ok(self.repository.get_votes_count(content).await?)
    }

    /// Current account of `user_id`; zero points for users who never earned any.
    pub async fn account(&self, user_id: &UserId) -> Result<AuthorAccount, LedgerError> {
        Ok(self.repository.load_account(user_id).await?.value)
    }

    /// Top `limit` accounts by points, ties broken by user id.
    pub async fn leaderboard(&self, limit: usize) -> Result<Vec<AuthorAccount>, LedgerError> {
        Ok(self.repository.top_accounts(limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reputation_ledger_repository::InMemoryLedgerRepository;
    use reputation_ledger_shared::types::{
        AccountWrite, ContentType, Versioned, VoteSnapshot, VoteWrite,
    };
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Wraps the in-memory store and reports a conflict for the first `conflicts` commits.
    struct ContendedRepository {
        inner: InMemoryLedgerRepository,
        conflicts: AtomicU32,
        commits: AtomicU32,
    }

    impl ContendedRepository {
        fn new(conflicts: u32) -> Self {
            Self {
                inner: InMemoryLedgerRepository::new(),
                conflicts: AtomicU32::new(conflicts),
                commits: AtomicU32::new(0),
            }
        }

        fn lose_race(&self) -> bool {
            self.commits.fetch_add(1, Ordering::SeqCst);
            self.conflicts
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
                .is_ok()
        }
    }

    #[async_trait]
    impl LedgerRepository for ContendedRepository {
        async fn load_vote_snapshot(
            &self,
            key: &VoteKey,
            author_id: Option<&UserId>,
        ) -> Result<VoteSnapshot, LedgerRepositoryError> {
            self.inner.load_vote_snapshot(key, author_id).await
        }

        async fn commit_vote(&self, write: &VoteWrite) -> Result<CommitOutcome, LedgerRepositoryError> {
            if self.lose_race() {
                return Ok(CommitOutcome::Conflict);
            }
            self.inner.commit_vote(write).await
        }

        async fn load_account(
            &self,
            user_id: &UserId,
        ) -> Result<Versioned<AuthorAccount>, LedgerRepositoryError> {
            self.inner.load_account(user_id).await
        }

        async fn commit_account(
            &self,
            write: &AccountWrite,
        ) -> Result<CommitOutcome, LedgerRepositoryError> {
            if self.lose_race() {
                return Ok(CommitOutcome::Conflict);
            }
            self.inner.commit_account(write).await
        }

        async fn get_vote(&self, key: &VoteKey) -> Result<Option<VoteDirection>, LedgerRepositoryError> {
            self.inner.get_vote(key).await
        }

        async fn get_votes_count(&self, content: &ContentRef) -> Result<VotesCount, LedgerRepositoryError> {
            self.inner.get_votes_count(content).await
        }

        async fn top_accounts(&self, limit: usize) -> Result<Vec<AuthorAccount>, LedgerRepositoryError> {
            self.inner.top_accounts(limit).await
        }
    }

    fn upvote_request() -> VoteRequest {
        VoteRequest {
            content: ContentRef::new(ContentType::Answer, "a1"),
            direction: VoteDirection::Up,
            author_id: Some(UserId::from("author")),
            weights: VoteWeights::new(2, -1),
        }
    }

    #[tokio::test]
    async fn test_conflicts_are_retried_transparently() {
        let repository = Arc::new(ContendedRepository::new(3));
        let ledger = VoteLedger::with_retry_policy(repository.clone(), RetryPolicy::immediate(5));

        let outcome = ledger.cast_vote(&UserId::from("voter"), &upvote_request()).await.unwrap();

        assert_eq!(outcome.upvotes, 1);
        assert_eq!(outcome.direction, Some(VoteDirection::Up));
        assert_eq!(repository.commits.load(Ordering::SeqCst), 4);
        assert_eq!(ledger.account(&UserId::from("author")).await.unwrap().points, 2);
    }

    #[tokio::test]
    async fn test_exhausted_budget_reports_conflict() {
        let repository = Arc::new(ContendedRepository::new(u32::MAX));
        let ledger = VoteLedger::with_retry_policy(repository.clone(), RetryPolicy::immediate(2));
        let request = upvote_request();

        let result = ledger.cast_vote(&UserId::from("voter"), &request).await;

        assert!(matches!(result, Err(LedgerError::VoteConflict { attempts: 3 })));
        assert_eq!(ledger.counts(&request.content).await.unwrap().upvotes, 0);
        assert_eq!(ledger.vote_of(&UserId::from("voter"), &request.content).await.unwrap(), None);
        assert_eq!(ledger.account(&UserId::from("author")).await.unwrap().points, 0);
    }

    #[tokio::test]
    async fn test_award_retries_on_conflict() {
        let repository = Arc::new(ContendedRepository::new(1));
        let ledger = VoteLedger::with_retry_policy(repository, RetryPolicy::immediate(3));

        let account = ledger.award_points(&UserId::from("author"), 2).await.unwrap();
        assert_eq!(account.points, 2);
    }

    #[tokio::test]
    async fn test_award_overflow_is_rejected_without_writing() {
        let repository = Arc::new(ContendedRepository::new(0));
        let ledger = VoteLedger::with_retry_policy(repository, RetryPolicy::immediate(3));
        let author = UserId::from("author");

        ledger.award_points(&author, i64::MAX).await.unwrap();
        let result = ledger.award_points(&author, 1).await;

        assert!(matches!(result, Err(LedgerError::ArithmeticOverflow)));
        assert_eq!(ledger.account(&author).await.unwrap().points, i64::MAX);
    }

    #[tokio::test]
    async fn test_vote_overflow_is_not_retried() {
        let repository = Arc::new(ContendedRepository::new(0));
        let ledger = VoteLedger::with_retry_policy(repository.clone(), RetryPolicy::immediate(3));
        let author = UserId::from("author");
        ledger.award_points(&author, i64::MAX).await.unwrap();
        let commits_before = repository.commits.load(Ordering::SeqCst);

        let result = ledger.cast_vote(&UserId::from("voter"), &upvote_request()).await;

        assert!(matches!(result, Err(LedgerError::ArithmeticOverflow)));
        assert_eq!(repository.commits.load(Ordering::SeqCst), commits_before);
        assert_eq!(ledger.counts(&upvote_request().content).await.unwrap().upvotes, 0);
    }

    #[tokio::test]
    async fn test_rejections_happen_before_any_read() {
        let repository = Arc::new(ContendedRepository::new(0));
        let ledger = VoteLedger::new(repository.clone());

        let anonymous: Option<UserId> = None;
        let result = ledger.cast_vote(&anonymous, &upvote_request()).await;
        assert!(matches!(result, Err(LedgerError::Unauthenticated)));

        let result = ledger.cast_vote(&UserId::from("author"), &upvote_request()).await;
        assert!(matches!(result, Err(LedgerError::SelfVoteForbidden)));

        assert_eq!(repository.commits.load(Ordering::SeqCst), 0);
    }
}
