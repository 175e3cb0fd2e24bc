use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: Uuid,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

pub async fn count(db: &PgPool, search: Option<&str>) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM posts
        WHERE ($1::text IS NULL OR title ILIKE $1)
        "#,
    )
    .bind(search)
    .fetch_one(db)
    .await
}

pub async fn list(
    db: &PgPool,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<Post>> {
    sqlx::query_as::<_, Post>(
        r#"
        SELECT id, title, content, author, created_at, updated_at
        FROM posts
        WHERE ($1::text IS NULL OR title ILIKE $1)
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(search)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
}

pub async fn find(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Post>> {
    sqlx::query_as::<_, Post>(
        r#"
        SELECT id, title, content, author, created_at, updated_at
        FROM posts
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn create(db: &PgPool, title: &str, content: &str, author: Uuid) -> sqlx::Result<Post> {
    sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (title, content, author)
        VALUES ($1, $2, $3)
        RETURNING id, title, content, author, created_at, updated_at
        "#,
    )
    .bind(title)
    .bind(content)
    .bind(author)
    .fetch_one(db)
    .await
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    title: &str,
    content: &str,
) -> sqlx::Result<Option<Post>> {
    sqlx::query_as::<_, Post>(
        r#"
        UPDATE posts
        SET title = $2, content = $3, updated_at = now()
        WHERE id = $1
        RETURNING id, title, content, author, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(title)
    .bind(content)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Post>> {
    sqlx::query_as::<_, Post>(
        r#"
        DELETE FROM posts
        WHERE id = $1
        RETURNING id, title, content, author, created_at, updated_at
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}
