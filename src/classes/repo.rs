use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Class row joined with its (optional) creator.
#[derive(Debug, Clone, FromRow)]
pub struct ClassRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub creator_name: Option<String>,
    pub creator_email: Option<String>,
}

/// Enrollment row joined with the member and the class.
#[derive(Debug, Clone, FromRow)]
pub struct EnrollmentRow {
    pub id: Uuid,
    pub role: String,
    pub status: String,
    pub joined_at: OffsetDateTime,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub class_id: Uuid,
    pub class_name: String,
    pub class_description: Option<String>,
}

pub async fn count(db: &PgPool, search: Option<&str>) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM classes
        WHERE ($1::text IS NULL OR name ILIKE $1)
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
) -> sqlx::Result<Vec<ClassRow>> {
    sqlx::query_as::<_, ClassRow>(
        r#"
        SELECT c.id, c.name, c.description, c.created_by, c.created_at, c.updated_at,
               u.name AS creator_name, u.email AS creator_email
        FROM classes c
        LEFT JOIN users u ON u.id = c.created_by
        WHERE ($1::text IS NULL OR c.name ILIKE $1)
        ORDER BY c.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(search)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
}

pub async fn find(db: &PgPool, id: Uuid) -> sqlx::Result<Option<ClassRow>> {
    sqlx::query_as::<_, ClassRow>(
        r#"
        SELECT c.id, c.name, c.description, c.created_by, c.created_at, c.updated_at,
               u.name AS creator_name, u.email AS creator_email
        FROM classes c
        LEFT JOIN users u ON u.id = c.created_by
        WHERE c.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn create(
    db: &PgPool,
    name: &str,
    description: Option<&str>,
    created_by: Uuid,
) -> sqlx::Result<ClassRow> {
    sqlx::query_as::<_, ClassRow>(
        r#"
        WITH inserted AS (
            INSERT INTO classes (name, description, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, created_by, created_at, updated_at
        )
        SELECT i.id, i.name, i.description, i.created_by, i.created_at, i.updated_at,
               u.name AS creator_name, u.email AS creator_email
        FROM inserted i
        LEFT JOIN users u ON u.id = i.created_by
        "#,
    )
    .bind(name)
    .bind(description)
    .bind(created_by)
    .fetch_one(db)
    .await
}

/// Partial update: a NULL parameter leaves the column untouched.
pub async fn update(
    db: &PgPool,
    id: Uuid,
    name: Option<&str>,
    description: Option<&str>,
) -> sqlx::Result<Option<ClassRow>> {
    sqlx::query_as::<_, ClassRow>(
        r#"
        WITH updated AS (
            UPDATE classes
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, description, created_by, created_at, updated_at
        )
        SELECT up.id, up.name, up.description, up.created_by, up.created_at, up.updated_at,
               u.name AS creator_name, u.email AS creator_email
        FROM updated up
        LEFT JOIN users u ON u.id = up.created_by
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(description)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<Option<ClassRow>> {
    sqlx::query_as::<_, ClassRow>(
        r#"
        WITH deleted AS (
            DELETE FROM classes
            WHERE id = $1
            RETURNING id, name, description, created_by, created_at, updated_at
        )
        SELECT d.id, d.name, d.description, d.created_by, d.created_at, d.updated_at,
               u.name AS creator_name, u.email AS creator_email
        FROM deleted d
        LEFT JOIN users u ON u.id = d.created_by
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn enrollment_exists(db: &PgPool, user_id: Uuid, class_id: Uuid) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM enrollments WHERE user_id = $1 AND class_id = $2
        )
        "#,
    )
    .bind(user_id)
    .bind(class_id)
    .fetch_one(db)
    .await
}

/// Atomic create-if-absent keyed on `(user_id, class_id)`. Role, status and
/// join timestamp come from the column defaults, so they are set only on the
/// first insert. Returns `None` when the enrollment already existed and the
/// insert was a no-op.
pub async fn enroll(
    db: &PgPool,
    user_id: Uuid,
    class_id: Uuid,
) -> sqlx::Result<Option<EnrollmentRow>> {
    sqlx::query_as::<_, EnrollmentRow>(
        r#"
        WITH inserted AS (
            INSERT INTO enrollments (user_id, class_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, class_id) DO NOTHING
            RETURNING id, user_id, class_id, role, status, joined_at
        )
        SELECT i.id, i.role, i.status, i.joined_at,
               u.id AS user_id, u.name AS user_name, u.email AS user_email,
               c.id AS class_id, c.name AS class_name, c.description AS class_description
        FROM inserted i
        JOIN users u ON u.id = i.user_id
        JOIN classes c ON c.id = i.class_id
        "#,
    )
    .bind(user_id)
    .bind(class_id)
    .fetch_optional(db)
    .await
}
