use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::posts::repo::Post;

/// Post entity as serialized to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDto {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Post> for PostDto {
    fn from(p: Post) -> Self {
        Self {
            id: p.id,
            title: p.title,
            content: p.content,
            author: p.author,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Body for create and full update; both fields are required.
#[derive(Debug, Deserialize)]
pub struct PostInput {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPost {
    pub message: String,
    pub post: PostDto,
    pub created_by: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedPost {
    pub message: String,
    pub post: PostDto,
    pub updated_by: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedPost {
    pub message: String,
    pub deleted_post: PostDto,
    pub deleted_by: Uuid,
}
