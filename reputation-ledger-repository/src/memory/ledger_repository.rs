//! In-memory implementation of the ledger repository.
//!
//! All records live behind one `tokio::sync::Mutex`. Each trait call takes the lock
//! once, so a snapshot read is consistent and a commit is checked and applied as
//! one step. Callers still go through the optimistic protocol: the lock is never
//! held between a read and the corresponding commit.
use async_trait::async_trait;
use reputation_ledger_shared::types::{
    AccountWrite, AuthorAccount, ContentRef, UserId, Versioned, VoteDirection, VoteKey,
    VoteSnapshot, VoteWrite, VotesCount, ABSENT,
};
use std::collections::HashMap;
use tokio::sync::Mutex;
use crate::{CommitOutcome, LedgerRepository, LedgerRepositoryError};

#[derive(Debug, Default)]
struct LedgerState {
    votes: HashMap<VoteKey, Versioned<VoteDirection>>,
    counts: HashMap<ContentRef, Versioned<VotesCount>>,
    accounts: HashMap<UserId, Versioned<AuthorAccount>>,
}

impl LedgerState {
    fn vote(&self, key: &VoteKey) -> Versioned<Option<VoteDirection>> {
        self.votes
            .get(key)
            .map(|vote| Versioned::new(Some(vote.value), vote.version))
            .unwrap_or_else(|| Versioned::new(None, ABSENT))
    }

    fn counts(&self, content: &ContentRef) -> Versioned<VotesCount> {
        self.counts
            .get(content)
            .cloned()
            .unwrap_or_else(|| Versioned::new(VotesCount::empty(content.clone()), ABSENT))
    }

    fn account(&self, user_id: &UserId) -> Versioned<AuthorAccount> {
        self.accounts
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| Versioned::new(AuthorAccount::empty(user_id.clone()), ABSENT))
    }

    fn account_matches(&self, write: &AccountWrite) -> bool {
        self.account(&write.value.user_id).version == write.version
    }

    fn apply_account(&mut self, write: &AccountWrite) {
        self.accounts.insert(
            write.value.user_id.clone(),
            Versioned::new(write.value.clone(), write.version + 1),
        );
    }
}

/// In-memory `LedgerRepository` with per-record versions.
///
/// Deleting a vote drops its record, so a re-cast vote starts again at version 1.
/// Stale writes across a delete are still rejected because every vote change also
/// bumps the version of the item's counts.
#[derive(Debug, Default)]
pub struct InMemoryLedgerRepository {
    state: Mutex<LedgerState>,
}

impl InMemoryLedgerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerRepository for InMemoryLedgerRepository {
    async fn load_vote_snapshot(
        &self,
        key: &VoteKey,
        author_id: Option<&UserId>,
    ) -> Result<VoteSnapshot, LedgerRepositoryError> {
        let state = self.state.lock().await;
        Ok(VoteSnapshot {
            key: key.clone(),
            vote: state.vote(key),
            counts: state.counts(&key.content),
            author: author_id.map(|author_id| state.account(author_id)),
        })
    }

    async fn commit_vote(&self, write: &VoteWrite) -> Result<CommitOutcome, LedgerRepositoryError> {
        let mut state = self.state.lock().await;

        let vote_matches = state.vote(&write.key).version == write.vote.version;
        let counts_matches = state.counts(&write.key.content).version == write.counts.version;
        let author_matches = write
            .author
            .as_ref()
            .is_none_or(|author| state.account_matches(author));

        if !(vote_matches && counts_matches && author_matches) {
            return Ok(CommitOutcome::Conflict);
        }

        match write.vote.value {
            Some(direction) => {
                state.votes.insert(
                    write.key.clone(),
                    Versioned::new(direction, write.vote.version + 1),
                );
            }
            None => {
                state.votes.remove(&write.key);
            }
        }
        state.counts.insert(
            write.key.content.clone(),
            Versioned::new(write.counts.value.clone(), write.counts.version + 1),
        );
        if let Some(author) = &write.author {
            state.apply_account(author);
        }

        Ok(CommitOutcome::Committed)
    }

    async fn load_account(
        &self,
        user_id: &UserId,
    ) -> Result<Versioned<AuthorAccount>, LedgerRepositoryError> {
        Ok(self.state.lock().await.account(user_id))
    }

    async fn commit_account(
        &self,
        write: &AccountWrite,
    ) -> Result<CommitOutcome, LedgerRepositoryError> {
        let mut state = self.state.lock().await;
        if !state.account_matches(write) {
            return Ok(CommitOutcome::Conflict);
        }
        state.apply_account(write);
        Ok(CommitOutcome::Committed)
    }

    async fn get_vote(&self, key: &VoteKey) -> Result<Option<VoteDirection>, LedgerRepositoryError> {
        Ok(self.state.lock().await.vote(key).value)
    }

    async fn get_votes_count(&self, content: &ContentRef) -> Result<VotesCount, LedgerRepositoryError> {
        Ok(self.state.lock().await.counts(content).value)
    }

    async fn top_accounts(&self, limit: usize) -> Result<Vec<AuthorAccount>, LedgerRepositoryError> {
        let state = self.state.lock().await;
        let mut accounts: Vec<AuthorAccount> =
            state.accounts.values().map(|account| account.value.clone()).collect();
        accounts.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.user_id.cmp(&b.user_id)));
        accounts.truncate(limit);
        Ok(accounts)
    }
}
