use chrono::Utc;
use sqlx::Row;

use heymoji_core::domain::member::{Member, SlackUserId};

use super::{MemberRepository, RepositoryError};
use crate::DbPool;

pub struct SqlMemberRepository {
    pool: DbPool,
}

impl SqlMemberRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_member(row: &sqlx::sqlite::SqliteRow) -> Result<Member, RepositoryError> {
    let slack_id: String =
        row.try_get("slack_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let username: String =
        row.try_get("username").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let avatar_url: Option<String> =
        row.try_get("avatar_url").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let department: Option<String> =
        row.try_get("department").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let is_hidden: i64 =
        row.try_get("is_hidden").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(Member {
        slack_id: SlackUserId(slack_id),
        username,
        avatar_url,
        department,
        is_hidden: is_hidden != 0,
    })
}

#[async_trait::async_trait]
impl MemberRepository for SqlMemberRepository {
    async fn find_by_id(&self, id: &SlackUserId) -> Result<Option<Member>, RepositoryError> {
        let row = sqlx::query(
            "SELECT slack_id, username, avatar_url, department, is_hidden
             FROM member WHERE slack_id = ?",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_member(r)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, member: Member) -> Result<(), RepositoryError> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO member (slack_id, username, avatar_url, department, is_hidden,
                                 created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(slack_id) DO NOTHING",
        )
        .bind(member.slack_id.as_str())
        .bind(&member.username)
        .bind(&member.avatar_url)
        .bind(&member.department)
        .bind(i64::from(member.is_hidden))
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict(format!("member {}", member.slack_id)));
        }
        Ok(())
    }

    async fn update(&self, member: Member) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE member
             SET username = ?, avatar_url = ?, department = ?, is_hidden = ?, updated_at = ?
             WHERE slack_id = ?",
        )
        .bind(&member.username)
        .bind(&member.avatar_url)
        .bind(&member.department)
        .bind(i64::from(member.is_hidden))
        .bind(Utc::now().to_rfc3339())
        .bind(member.slack_id.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("member {}", member.slack_id)));
        }
        Ok(())
    }

    async fn set_hidden(&self, id: &SlackUserId, hidden: bool) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE member SET is_hidden = ?, updated_at = ? WHERE slack_id = ?")
                .bind(i64::from(hidden))
                .bind(Utc::now().to_rfc3339())
                .bind(id.as_str())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("member {id}")));
        }
        Ok(())
    }
}
