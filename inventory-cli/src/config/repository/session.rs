//! Operator session repository

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::api::identity::{SessionToken, UserId};

/// The signed-in operator as last verified
#[derive(Debug, Clone)]
pub struct StoredSession {
    pub token: SessionToken,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Store the session, replacing any previous one
pub async fn save_session(pool: &SqlitePool, token: &SessionToken, user_id: &UserId) -> Result<()> {
    sqlx::query(
        "INSERT INTO sessions (id, token, user_id, created_at)
         VALUES (1, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
            token = excluded.token,
            user_id = excluded.user_id,
            created_at = excluded.created_at",
    )
    .bind(token.as_str())
    .bind(&user_id.0)
    .bind(Utc::now())
    .execute(pool)
    .await
    .context("Failed to save session")?;

    Ok(())
}

pub async fn get_session(pool: &SqlitePool) -> Result<Option<StoredSession>> {
    let row = sqlx::query("SELECT token, user_id, created_at FROM sessions WHERE id = 1")
        .fetch_optional(pool)
        .await
        .context("Failed to load session")?;

    let Some(row) = row else {
        return Ok(None);
    };

    Ok(Some(StoredSession {
        token: SessionToken::new(row.try_get::<String, _>("token")?),
        user_id: UserId(row.try_get("user_id")?),
        created_at: row.try_get("created_at")?,
    }))
}

/// Forget the session. Returns whether one was stored.
pub async fn clear_session(pool: &SqlitePool) -> Result<bool> {
    let result = sqlx::query("DELETE FROM sessions")
        .execute(pool)
        .await
        .context("Failed to clear session")?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::connect_pool;

    #[tokio::test]
    async fn test_login_round_trip_and_logout() {
        let pool = connect_pool("sqlite::memory:").await.unwrap();
        assert!(get_session(&pool).await.unwrap().is_none());

        let token = SessionToken::new("sess_1");
        save_session(&pool, &token, &UserId("user_1".to_string()))
            .await
            .unwrap();

        let stored = get_session(&pool).await.unwrap().unwrap();
        assert_eq!(stored.token, token);
        assert_eq!(stored.user_id.0, "user_1");

        assert!(clear_session(&pool).await.unwrap());
        assert!(get_session(&pool).await.unwrap().is_none());
        assert!(!clear_session(&pool).await.unwrap());
    }

    #[tokio::test]
    async fn test_second_login_replaces_first() {
        let pool = connect_pool("sqlite::memory:").await.unwrap();

        save_session(&pool, &SessionToken::new("old"), &UserId("user_1".to_string()))
            .await
            .unwrap();
        save_session(&pool, &SessionToken::new("new"), &UserId("user_2".to_string()))
            .await
            .unwrap();

        let stored = get_session(&pool).await.unwrap().unwrap();
        assert_eq!(stored.token.as_str(), "new");
        assert_eq!(stored.user_id.0, "user_2");
    }
}
