//! PostgreSQL implementation of the ledger repository.
//!
//! Every row carries a `version` column. Writes are conditional on the version
//! observed at read time (`UPDATE ... WHERE version = $n`, `DELETE ... WHERE
//! version = $n`, `INSERT ... ON CONFLICT DO NOTHING` for rows read as absent).
//! A write that affects no row means another transaction committed first: the
//! whole transaction is rolled back and reported as `CommitOutcome::Conflict`.
//!
//! ## Database Tables
//!
//! - `user_votes`: Standing vote per (voter, content type, content id)
//! - `votes_count`: Up/down tallies per content item
//! - `author_accounts`: Cumulative points per author
use async_trait::async_trait;
use reputation_ledger_shared::types::{
    AccountWrite, AuthorAccount, ContentRef, UserId, Versioned, VoteDirection,
    VoteKey, VoteSnapshot, VoteWrite, VotesCount, ABSENT,
};
use sqlx::{Postgres, Row, Transaction};
use crate::postgres::is_write_conflict;
use crate::{CommitOutcome, LedgerRepository, LedgerRepositoryError};

/// PostgreSQL implementation of the ledger repository.
///
/// Provides versioned reads and conditional writes over votes, vote counts and
/// author accounts using a shared `sqlx::PgPool`.
pub struct PostgresLedgerRepository {
    pool: sqlx::PgPool,
}

/// Whether the conditional statements of a transaction all hit their row.
enum Applied {
    Yes,
    Stale,
}

impl Applied {
    fn from_rows(rows_affected: u64) -> Self {
        if rows_affected == 1 { Applied::Yes } else { Applied::Stale }
    }
}

impl PostgresLedgerRepository {
    /// Creates a new PostgreSQL repository instance.
    ///
    /// # Arguments
    ///
    /// * `pool` - Configured PostgreSQL connection pool with the ledger schema applied
    pub async fn new(pool: sqlx::PgPool) -> Result<Self, LedgerRepositoryError> {
        Ok(Self { pool })
    }

    async fn read_vote_tx(
        key: &VoteKey,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Versioned<Option<VoteDirection>>, LedgerRepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT direction, version
            FROM user_votes
            WHERE voter_id = $1 AND content_type = $2 AND content_id = $3
            "#,
        )
        .bind(key.voter_id.as_str())
        .bind(i16::from(key.content.content_type))
        .bind(key.content.content_id.as_str())
        .fetch_optional(&mut **tx)
        .await?;

        match row {
            Some(row) => {
                let code: i16 = row.try_get("direction")?;
                let direction = VoteDirection::try_from(code)
                    .map_err(LedgerRepositoryError::InvalidVoteDirection)?;
                Ok(Versioned::new(Some(direction), row.try_get("version")?))
            }
            None => Ok(Versioned::new(None, ABSENT)),
        }
    }

    async fn read_counts_tx(
        content: &ContentRef,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Versioned<VotesCount>, LedgerRepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT upvotes, downvotes, version
            FROM votes_count
            WHERE content_type = $1 AND content_id = $2
            "#,
        )
        .bind(i16::from(content.content_type))
        .bind(content.content_id.as_str())
        .fetch_optional(&mut **tx)
        .await?;

        match row {
            Some(row) => Ok(Versioned::new(
                VotesCount {
                    content: content.clone(),
                    upvotes: row.try_get("upvotes")?,
                    downvotes: row.try_get("downvotes")?,
                },
                row.try_get("version")?,
            )),
            None => Ok(Versioned::new(VotesCount::empty(content.clone()), ABSENT)),
        }
    }

    async fn read_account_tx(
        user_id: &UserId,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Versioned<AuthorAccount>, LedgerRepositoryError> {
        let row = sqlx::query("SELECT points, version FROM author_accounts WHERE user_id = $1")
            .bind(user_id.as_str())
            .fetch_optional(&mut **tx)
            .await?;

        match row {
            Some(row) => Ok(Versioned::new(
                AuthorAccount {
                    user_id: user_id.clone(),
                    points: row.try_get("points")?,
                },
                row.try_get("version")?,
            )),
            None => Ok(Versioned::new(AuthorAccount::empty(user_id.clone()), ABSENT)),
        }
    }

    async fn write_vote_tx(
        key: &VoteKey,
        vote: &Versioned<Option<VoteDirection>>,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Applied, LedgerRepositoryError> {
        let content_type = i16::from(key.content.content_type);
        let rows_affected = match (vote.version, vote.value) {
            (ABSENT, None) => return Ok(Applied::Yes),
            (ABSENT, Some(direction)) => sqlx::query(
                r#"
                INSERT INTO user_votes (voter_id, content_type, content_id, direction, version, voted_at)
                VALUES ($1, $2, $3, $4, 1, now())
                ON CONFLICT (voter_id, content_type, content_id) DO NOTHING
                "#,
            )
            .bind(key.voter_id.as_str())
            .bind(content_type)
            .bind(key.content.content_id.as_str())
            .bind(i16::from(direction))
            .execute(&mut **tx)
            .await?
            .rows_affected(),
            (version, Some(direction)) => sqlx::query(
                r#"
                UPDATE user_votes
                SET direction = $4, version = version + 1, voted_at = now()
                WHERE voter_id = $1 AND content_type = $2 AND content_id = $3 AND version = $5
                "#,
            )
            .bind(key.voter_id.as_str())
            .bind(content_type)
            .bind(key.content.content_id.as_str())
            .bind(i16::from(direction))
            .bind(version)
            .execute(&mut **tx)
            .await?
            .rows_affected(),
            (version, None) => sqlx::query(
                r#"
                DELETE FROM user_votes
                WHERE voter_id = $1 AND content_type = $2 AND content_id = $3 AND version = $4
                "#,
            )
            .bind(key.voter_id.as_str())
            .bind(content_type)
            .bind(key.content.content_id.as_str())
            .bind(version)
            .execute(&mut **tx)
            .await?
            .rows_affected(),
        };
        Ok(Applied::from_rows(rows_affected))
    }

    async fn write_counts_tx(
        counts: &Versioned<VotesCount>,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Applied, LedgerRepositoryError> {
        let content = &counts.value.content;
        let rows_affected = if counts.version == ABSENT {
            sqlx::query(
                r#"
                INSERT INTO votes_count (content_type, content_id, upvotes, downvotes, version)
                VALUES ($1, $2, $3, $4, 1)
                ON CONFLICT (content_type, content_id) DO NOTHING
                "#,
            )
            .bind(i16::from(content.content_type))
            .bind(content.content_id.as_str())
            .bind(counts.value.upvotes)
            .bind(counts.value.downvotes)
            .execute(&mut **tx)
            .await?
            .rows_affected()
        } else {
            sqlx::query(
                r#"
                UPDATE votes_count
                SET upvotes = $3, downvotes = $4, version = version + 1
                WHERE content_type = $1 AND content_id = $2 AND version = $5
                "#,
            )
            .bind(i16::from(content.content_type))
            .bind(content.content_id.as_str())
            .bind(counts.value.upvotes)
            .bind(counts.value.downvotes)
            .bind(counts.version)
            .execute(&mut **tx)
            .await?
            .rows_affected()
        };
        Ok(Applied::from_rows(rows_affected))
    }

    async fn write_account_tx(
        account: &AccountWrite,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Applied, LedgerRepositoryError> {
        let rows_affected = if account.version == ABSENT {
            sqlx::query(
                r#"
                INSERT INTO author_accounts (user_id, points, version)
                VALUES ($1, $2, 1)
                ON CONFLICT (user_id) DO NOTHING
                "#,
            )
            .bind(account.value.user_id.as_str())
            .bind(account.value.points)
            .execute(&mut **tx)
            .await?
            .rows_affected()
        } else {
            sqlx::query(
                r#"
                UPDATE author_accounts
                SET points = $2, version = version + 1
                WHERE user_id = $1 AND version = $3
                "#,
            )
            .bind(account.value.user_id.as_str())
            .bind(account.value.points)
            .bind(account.version)
            .execute(&mut **tx)
            .await?
            .rows_affected()
        };
        Ok(Applied::from_rows(rows_affected))
    }

    async fn apply_vote_tx(
        write: &VoteWrite,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Applied, LedgerRepositoryError> {
        // Counts first: every vote change on an item serializes on this row.
        if let Applied::Stale = Self::write_counts_tx(&write.counts, tx).await? {
            return Ok(Applied::Stale);
        }
        if let Applied::Stale = Self::write_vote_tx(&write.key, &write.vote, tx).await? {
            return Ok(Applied::Stale);
        }
        if let Some(author) = &write.author {
            if let Applied::Stale = Self::write_account_tx(author, tx).await? {
                return Ok(Applied::Stale);
            }
        }
        Ok(Applied::Yes)
    }

    /// Commits `tx` when every conditional write applied, otherwise rolls it back.
    ///
    /// Conflicts detected by the server while executing or committing are folded
    /// into `CommitOutcome::Conflict`.
    async fn finish(
        tx: Transaction<'_, Postgres>,
        applied: Result<Applied, LedgerRepositoryError>,
    ) -> Result<CommitOutcome, LedgerRepositoryError> {
        match applied {
            Ok(Applied::Yes) => match tx.commit().await {
                Ok(()) => Ok(CommitOutcome::Committed),
                Err(e) if is_write_conflict(&e) => Ok(CommitOutcome::Conflict),
                Err(e) => Err(e.into()),
            },
            Ok(Applied::Stale) => {
                tx.rollback().await?;
                Ok(CommitOutcome::Conflict)
            }
            Err(LedgerRepositoryError::DatabaseError(e)) if is_write_conflict(&e) => {
                tx.rollback().await?;
                Ok(CommitOutcome::Conflict)
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e)
            }
        }
    }
}

#[async_trait]
impl LedgerRepository for PostgresLedgerRepository {
    /// Reads the three records inside one repeatable-read, read-only transaction so
    /// that the snapshot reflects a single point in time.
    async fn load_vote_snapshot(
        &self,
        key: &VoteKey,
        author_id: Option<&UserId>,
    ) -> Result<VoteSnapshot, LedgerRepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let vote = Self::read_vote_tx(key, &mut tx).await?;
        let counts = Self::read_counts_tx(&key.content, &mut tx).await?;
        let author = match author_id {
            Some(author_id) => Some(Self::read_account_tx(author_id, &mut tx).await?),
            None => None,
        };
        tx.commit().await?;

        Ok(VoteSnapshot {
            key: key.clone(),
            vote,
            counts,
            author,
        })
    }

    async fn commit_vote(&self, write: &VoteWrite) -> Result<CommitOutcome, LedgerRepositoryError> {
        let mut tx = self.pool.begin().await?;
        let applied = Self::apply_vote_tx(write, &mut tx).await;
        Self::finish(tx, applied).await
    }

    async fn load_account(
        &self,
        user_id: &UserId,
    ) -> Result<Versioned<AuthorAccount>, LedgerRepositoryError> {
        let mut tx = self.pool.begin().await?;
        let account = Self::read_account_tx(user_id, &mut tx).await?;
        tx.commit().await?;
        Ok(account)
    }

    async fn commit_account(
        &self,
        write: &AccountWrite,
    ) -> Result<CommitOutcome, LedgerRepositoryError> {
        let mut tx = self.pool.begin().await?;
        let applied = Self::write_account_tx(write, &mut tx).await;
        Self::finish(tx, applied).await
    }

    async fn get_vote(&self, key: &VoteKey) -> Result<Option<VoteDirection>, LedgerRepositoryError> {
        let mut tx = self.pool.begin().await?;
        let vote = Self::read_vote_tx(key, &mut tx).await?;
        tx.commit().await?;
        Ok(vote.value)
    }

    async fn get_votes_count(&self, content: &ContentRef) -> Result<VotesCount, LedgerRepositoryError> {
        let mut tx = self.pool.begin().await?;
        let counts = Self::read_counts_tx(content, &mut tx).await?;
        tx.commit().await?;
        Ok(counts.value)
    }

    async fn top_accounts(&self, limit: usize) -> Result<Vec<AuthorAccount>, LedgerRepositoryError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT user_id, points
            FROM author_accounts
            ORDER BY points DESC, user_id ASC
            LIMIT $1
            "#,
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        let mut accounts = Vec::with_capacity(rows.len());
        for row in rows {
            let user_id: String = row.try_get("user_id")?;
            accounts.push(AuthorAccount {
                user_id: UserId::new(user_id),
                points: row.try_get("points")?,
            });
        }
        Ok(accounts)
    }
}

