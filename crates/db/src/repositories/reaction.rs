use chrono::Utc;
use sqlx::Row;

use heymoji_core::domain::leaderboard::LeaderboardRow;
use heymoji_core::domain::member::SlackUserId;
use heymoji_core::domain::reaction::{Period, SpecialCredit};

use super::{ReactionRepository, RepositoryError};
use crate::DbPool;

pub struct SqlReactionRepository {
    pool: DbPool,
}

impl SqlReactionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decode<T>(row: &sqlx::sqlite::SqliteRow, column: &str) -> Result<T, RepositoryError>
where
    T: for<'r> sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column).map_err(|e| RepositoryError::Decode(e.to_string()))
}

#[async_trait::async_trait]
impl ReactionRepository for SqlReactionRepository {
    async fn increment(
        &self,
        user_id: &SlackUserId,
        reaction_name: &str,
        period: &Period,
    ) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "INSERT INTO reaction_count (user_id, reaction_name, period, count, updated_at)
             VALUES (?, ?, ?, 1, ?)
             ON CONFLICT(user_id, reaction_name, period) DO UPDATE SET
                 count = reaction_count.count + 1,
                 updated_at = excluded.updated_at
             RETURNING count",
        )
        .bind(user_id.as_str())
        .bind(reaction_name)
        .bind(period.to_string())
        .bind(Utc::now().to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn decrement(
        &self,
        user_id: &SlackUserId,
        reaction_name: &str,
        period: &Period,
    ) -> Result<i64, RepositoryError> {
        let count: Option<i64> = sqlx::query_scalar(
            "UPDATE reaction_count
             SET count = MAX(count - 1, 0), updated_at = ?
             WHERE user_id = ? AND reaction_name = ? AND period = ?
             RETURNING count",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(user_id.as_str())
        .bind(reaction_name)
        .bind(period.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(count.unwrap_or(0))
    }

    async fn count(
        &self,
        user_id: &SlackUserId,
        reaction_name: &str,
        period: &Period,
    ) -> Result<i64, RepositoryError> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT count FROM reaction_count
             WHERE user_id = ? AND reaction_name = ? AND period = ?",
        )
        .bind(user_id.as_str())
        .bind(reaction_name)
        .bind(period.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(count.unwrap_or(0))
    }

    async fn reserve_grant(
        &self,
        credit: &SpecialCredit,
        period: &Period,
        limit: u32,
    ) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Limit check and increment happen in a single statement.
        let granted: Option<i64> = sqlx::query_scalar(
            "INSERT INTO special_grant (giver_id, period, count)
             VALUES (?, ?, 1)
             ON CONFLICT(giver_id, period) DO UPDATE SET count = special_grant.count + 1
             WHERE special_grant.count < ?
             RETURNING count",
        )
        .bind(credit.giver_id.as_str())
        .bind(period.to_string())
        .bind(i64::from(limit))
        .fetch_optional(&mut *tx)
        .await?;

        if !granted.is_some_and(|count| count <= i64::from(limit)) {
            return Ok(false);
        }

        let recorded = sqlx::query(
            "INSERT INTO special_credit
                 (giver_id, target_id, reaction_name, channel, item_id, period, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT DO NOTHING",
        )
        .bind(credit.giver_id.as_str())
        .bind(credit.target_id.as_str())
        .bind(&credit.reaction_name)
        .bind(&credit.channel)
        .bind(&credit.item_id)
        .bind(period.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await?;

        // Dropping the transaction rolls the grant back for redelivered credits.
        if recorded.rows_affected() == 0 {
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn release_grant(&self, credit: &SpecialCredit) -> Result<Option<Period>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let credited_period: Option<String> = sqlx::query_scalar(
            "DELETE FROM special_credit
             WHERE giver_id = ? AND target_id = ? AND reaction_name = ? AND channel = ? AND item_id = ?
             RETURNING period",
        )
        .bind(credit.giver_id.as_str())
        .bind(credit.target_id.as_str())
        .bind(&credit.reaction_name)
        .bind(&credit.channel)
        .bind(&credit.item_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(credited_period) = credited_period else {
            return Ok(None);
        };

        sqlx::query(
            "UPDATE special_grant SET count = MAX(count - 1, 0)
             WHERE giver_id = ? AND period = ?",
        )
        .bind(credit.giver_id.as_str())
        .bind(&credited_period)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        credited_period
            .parse::<Period>()
            .map(Some)
            .map_err(|error| RepositoryError::Decode(error.to_string()))
    }

    async fn leaderboard_rows(&self, period: &Period) -> Result<Vec<LeaderboardRow>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT m.slack_id, m.username, m.avatar_url, r.reaction_name, r.count
             FROM reaction_count r
             JOIN member m ON m.slack_id = r.user_id
             WHERE r.period = ? AND r.count > 0 AND m.is_hidden = 0
             ORDER BY m.slack_id, r.reaction_name",
        )
        .bind(period.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(LeaderboardRow {
                    slack_id: SlackUserId(decode(row, "slack_id")?),
                    username: decode(row, "username")?,
                    avatar_url: decode(row, "avatar_url")?,
                    reaction_name: decode(row, "reaction_name")?,
                    count: decode(row, "count")?,
                })
            })
            .collect()
    }
}
