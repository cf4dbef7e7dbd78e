use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Bookmark {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub link: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub async fn list_by_user(db: &PgPool, user_id: i64) -> anyhow::Result<Vec<Bookmark>> {
    let rows = sqlx::query_as::<_, Bookmark>(
        r#"
        SELECT id, user_id, title, description, link, created_at
        FROM bookmarks
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn create(
    db: &PgPool,
    user_id: i64,
    title: &str,
    description: Option<&str>,
    link: &str,
) -> anyhow::Result<Bookmark> {
    let row = sqlx::query_as::<_, Bookmark>(
        r#"
        INSERT INTO bookmarks (user_id, title, description, link)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, title, description, link, created_at
        "#,
    )
    .bind(user_id)
    .bind(title)
    .bind(description)
    .bind(link)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn get_for_user(
    db: &PgPool,
    user_id: i64,
    bookmark_id: i64,
) -> anyhow::Result<Option<Bookmark>> {
    let row = sqlx::query_as::<_, Bookmark>(
        r#"
        SELECT id, user_id, title, description, link, created_at
        FROM bookmarks
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(bookmark_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn update(
    db: &PgPool,
    user_id: i64,
    bookmark_id: i64,
    title: Option<&str>,
    description: Option<&str>,
    link: Option<&str>,
) -> anyhow::Result<Option<Bookmark>> {
    let row = sqlx::query_as::<_, Bookmark>(
        r#"
        UPDATE bookmarks
        SET title       = COALESCE($3, title),
            description = COALESCE($4, description),
            link        = COALESCE($5, link)
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, title, description, link, created_at
        "#,
    )
    .bind(bookmark_id)
    .bind(user_id)
    .bind(title)
    .bind(description)
    .bind(link)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn delete(db: &PgPool, user_id: i64, bookmark_id: i64) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM bookmarks
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(bookmark_id)
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}
