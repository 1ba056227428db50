//! Integration tests for the PostgreSQL ledger repository implementation.
//!
//! These tests require a real PostgreSQL database and use SQLx test macros
//! to ensure proper test isolation and cleanup.
//!
//! Run with: `cargo test -p reputation-ledger-repository --features postgres-tests --test postgres_integration`
#![cfg(feature = "postgres-tests")]

use reputation_ledger_repository::{CommitOutcome, LedgerRepository, PostgresLedgerRepository};
use reputation_ledger_shared::types::{
    AuthorAccount, ContentRef, ContentType, UserId, Versioned, VoteDirection, VoteKey,
    VoteSnapshot, VoteWrite, ABSENT,
};
use sqlx::Row;

fn make_key(voter: &str) -> VoteKey {
    VoteKey::new(UserId::from(voter), ContentRef::new(ContentType::Comment, "comment-1"))
}

/// Builds the write set that applies `direction` on top of `snapshot`, crediting `points`.
fn make_write(snapshot: &VoteSnapshot, direction: Option<VoteDirection>, up: i64, down: i64, points: i64) -> VoteWrite {
    let mut counts = snapshot.counts.value.clone();
    counts.upvotes += up;
    counts.downvotes += down;
    VoteWrite {
        key: snapshot.key.clone(),
        vote: snapshot.vote.with_value(direction),
        counts: snapshot.counts.with_value(counts),
        author: snapshot.author.as_ref().map(|author| {
            let mut account = author.value.clone();
            account.points += points;
            author.with_value(account)
        }),
    }
}

// ============================================================================
// Vote Commit Tests
// ============================================================================

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_snapshot_of_unknown_records(pool: sqlx::PgPool) {
    let repository = PostgresLedgerRepository::new(pool.clone()).await.unwrap();
    let author = UserId::from("author");

    let snapshot = repository.load_vote_snapshot(&make_key("alice"), Some(&author)).await.unwrap();

    assert_eq!(snapshot.vote, Versioned::new(None, ABSENT));
    assert_eq!(snapshot.counts.version, ABSENT);
    assert_eq!((snapshot.counts.value.upvotes, snapshot.counts.value.downvotes), (0, 0));
    assert_eq!(snapshot.author, Some(Versioned::new(AuthorAccount::empty(author), ABSENT)));
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_commit_vote_inserts_all_records(pool: sqlx::PgPool) {
    let repository = PostgresLedgerRepository::new(pool.clone()).await.unwrap();
    let author = UserId::from("author");
    let key = make_key("alice");

    let snapshot = repository.load_vote_snapshot(&key, Some(&author)).await.unwrap();
    let outcome = repository
        .commit_vote(&make_write(&snapshot, Some(VoteDirection::Up), 1, 0, 1))
        .await
        .unwrap();
    assert_eq!(outcome, CommitOutcome::Committed);

    let row = sqlx::query("SELECT direction, version FROM user_votes WHERE voter_id = $1")
        .bind("alice")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(row.get::<i16, _>("direction"), 0);
    assert_eq!(row.get::<i64, _>("version"), 1);

    let after = repository.load_vote_snapshot(&key, Some(&author)).await.unwrap();
    assert_eq!(after.vote.value, Some(VoteDirection::Up));
    assert_eq!(after.counts.value.upvotes, 1);
    assert_eq!(after.author.map(|account| account.value.points), Some(1));
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_stale_write_is_rejected_atomically(pool: sqlx::PgPool) {
    let repository = PostgresLedgerRepository::new(pool.clone()).await.unwrap();
    let author = UserId::from("author");

    let alice = repository.load_vote_snapshot(&make_key("alice"), Some(&author)).await.unwrap();
    let bob = repository.load_vote_snapshot(&make_key("bob"), Some(&author)).await.unwrap();

    let first = repository
        .commit_vote(&make_write(&alice, Some(VoteDirection::Up), 1, 0, 1))
        .await
        .unwrap();
    let second = repository
        .commit_vote(&make_write(&bob, Some(VoteDirection::Down), 0, 1, -1))
        .await
        .unwrap();

    assert_eq!(first, CommitOutcome::Committed);
    assert_eq!(second, CommitOutcome::Conflict);

    // Nothing from Bob's write set may be visible.
    assert_eq!(repository.get_vote(&make_key("bob")).await.unwrap(), None);
    let counts = repository.get_votes_count(&make_key("bob").content).await.unwrap();
    assert_eq!((counts.upvotes, counts.downvotes), (1, 0));
    assert_eq!(repository.load_account(&author).await.unwrap().value.points, 1);
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_retraction_deletes_vote_record(pool: sqlx::PgPool) {
    let repository = PostgresLedgerRepository::new(pool.clone()).await.unwrap();
    let key = make_key("alice");

    let snapshot = repository.load_vote_snapshot(&key, None).await.unwrap();
    repository
        .commit_vote(&make_write(&snapshot, Some(VoteDirection::Down), 0, 1, 0))
        .await
        .unwrap();

    let snapshot = repository.load_vote_snapshot(&key, None).await.unwrap();
    let outcome = repository
        .commit_vote(&make_write(&snapshot, None, 0, -1, 0))
        .await
        .unwrap();
    assert_eq!(outcome, CommitOutcome::Committed);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_votes")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
    let counts = repository.get_votes_count(&key.content).await.unwrap();
    assert_eq!((counts.upvotes, counts.downvotes), (0, 0));
}

// ============================================================================
// Concurrent Commit Tests
// ============================================================================

/// Commits both write sets at the same time and returns their outcomes.
async fn race_commits(
    repository: &PostgresLedgerRepository,
    first: &VoteWrite,
    second: &VoteWrite,
) -> (CommitOutcome, CommitOutcome) {
    let (a, b) = tokio::join!(repository.commit_vote(first), repository.commit_vote(second));
    (a.unwrap(), b.unwrap())
}

fn assert_one_winner(outcomes: (CommitOutcome, CommitOutcome)) {
    let committed = [outcomes.0, outcomes.1]
        .iter()
        .filter(|outcome| **outcome == CommitOutcome::Committed)
        .count();
    assert_eq!(committed, 1, "outcomes: {outcomes:?}");
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_racing_first_votes_on_new_item(pool: sqlx::PgPool) {
    let repository = PostgresLedgerRepository::new(pool.clone()).await.unwrap();
    let author = UserId::from("author");

    // Both snapshots see the item's counts as absent, so both try to insert the row.
    let alice = repository.load_vote_snapshot(&make_key("alice"), Some(&author)).await.unwrap();
    let bob = repository.load_vote_snapshot(&make_key("bob"), Some(&author)).await.unwrap();
    let outcomes = race_commits(
        &repository,
        &make_write(&alice, Some(VoteDirection::Up), 1, 0, 1),
        &make_write(&bob, Some(VoteDirection::Up), 1, 0, 1),
    )
    .await;

    assert_one_winner(outcomes);
    let counts = repository.get_votes_count(&make_key("alice").content).await.unwrap();
    assert_eq!((counts.upvotes, counts.downvotes), (1, 0));
    assert_eq!(repository.load_account(&author).await.unwrap().value.points, 1);

    let votes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_votes")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(votes, 1);
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_racing_updates_on_existing_item(pool: sqlx::PgPool) {
    let repository = PostgresLedgerRepository::new(pool.clone()).await.unwrap();
    let author = UserId::from("author");

    let seed = repository.load_vote_snapshot(&make_key("carol"), Some(&author)).await.unwrap();
    let seeded = repository
        .commit_vote(&make_write(&seed, Some(VoteDirection::Down), 0, 1, -1))
        .await
        .unwrap();
    assert_eq!(seeded, CommitOutcome::Committed);

    // Both snapshots hold version 1 of the counts and account rows.
    let alice = repository.load_vote_snapshot(&make_key("alice"), Some(&author)).await.unwrap();
    let bob = repository.load_vote_snapshot(&make_key("bob"), Some(&author)).await.unwrap();
    let outcomes = race_commits(
        &repository,
        &make_write(&alice, Some(VoteDirection::Up), 1, 0, 1),
        &make_write(&bob, Some(VoteDirection::Down), 0, 1, -1),
    )
    .await;

    assert_one_winner(outcomes);
    let snapshot = repository.load_vote_snapshot(&make_key("alice"), Some(&author)).await.unwrap();
    assert_eq!(snapshot.counts.version, 2);
    let (up, down) = (snapshot.counts.value.upvotes, snapshot.counts.value.downvotes);
    assert_eq!(up + down, 2);
    let points = snapshot.author.map(|account| account.value.points).unwrap();
    assert_eq!(points, up - down);
}

// ============================================================================
// Account Tests
// ============================================================================

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_commit_account_and_leaderboard(pool: sqlx::PgPool) {
    let repository = PostgresLedgerRepository::new(pool.clone()).await.unwrap();

    for (user, points) in [("carol", 4), ("alice", 9), ("bob", 4)] {
        let user_id = UserId::from(user);
        let read = repository.load_account(&user_id).await.unwrap();
        let write = read.with_value(AuthorAccount { user_id, points });
        assert_eq!(repository.commit_account(&write).await.unwrap(), CommitOutcome::Committed);
        assert_eq!(repository.commit_account(&write).await.unwrap(), CommitOutcome::Conflict);
    }

    let top = repository.top_accounts(2).await.unwrap();
    let names: Vec<&str> = top.iter().map(|account| account.user_id.as_str()).collect();
    assert_eq!(names, vec!["alice", "bob"]);
    assert!(repository.top_accounts(0).await.unwrap().is_empty());
}
