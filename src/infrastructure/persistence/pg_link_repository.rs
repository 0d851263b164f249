//! PostgreSQL implementation of the link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    code: String,
    long_url: String,
    created_at: DateTime<Utc>,
}

impl From<LinkRow> for Link {
    fn from(row: LinkRow) -> Self {
        Link::new(row.id, row.code, row.long_url, row.created_at)
    }
}

/// PostgreSQL repository for link storage and retrieval.
///
/// The `links.code` unique constraint is the authoritative uniqueness
/// guarantee; an insert that violates it surfaces as
/// [`AppError::Conflict`].
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            INSERT INTO links (code, long_url, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, code, long_url, created_at
            "#,
        )
        .bind(&new_link.code)
        .bind(&new_link.long_url)
        .bind(new_link.created_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, code, long_url, created_at
            FROM links
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn find_all(&self) -> Result<Vec<Link>, AppError> {
        let rows = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, code, long_url, created_at
            FROM links
            ORDER BY created_at
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Link::from).collect())
    }

    async fn count_clicks_by_link_id(&self, link_id: i64) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM link_clicks WHERE link_id = $1",
        )
        .bind(link_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }
}
