use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::services::AuthUser,
    error::ApiError,
    pagination::{PageQuery, Paginated},
    posts::{
        dto::{CreatedPost, DeletedPost, PostDto, PostInput, UpdatedPost},
        repo,
    },
    state::AppState,
};

const DEFAULT_PAGE_SIZE: i64 = 5;

fn require_title_content(payload: &PostInput) -> Result<(&str, &str), ApiError> {
    let title = payload.title.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let content = payload.content.as_deref().map(str::trim).filter(|s| !s.is_empty());
    match (title, content) {
        (Some(t), Some(c)) => Ok((t, c)),
        _ => Err(ApiError::validation("title and content are required")),
    }
}

#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<PostDto>>, ApiError> {
    let spec = query.normalize(DEFAULT_PAGE_SIZE);
    let total = repo::count(&state.db, spec.search.as_deref()).await?;
    let posts = repo::list(&state.db, spec.search.as_deref(), spec.limit, spec.offset).await?;
    let results = posts.into_iter().map(PostDto::from).collect();
    Ok(Json(Paginated::new(&spec, total, results)))
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PostDto>, ApiError> {
    let post = repo::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("post not found"))?;
    Ok(Json(post.into()))
}

#[instrument(skip(state, payload))]
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<PostInput>,
) -> Result<(StatusCode, Json<CreatedPost>), ApiError> {
    let (title, content) = require_title_content(&payload)?;

    let post = repo::create(&state.db, title, content, claims.id).await?;
    info!(post_id = %post.id, user_id = %claims.id, "post created");

    Ok((
        StatusCode::CREATED,
        Json(CreatedPost {
            message: "post created".into(),
            post: post.into(),
            created_by: claims.id,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_post(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<PostInput>,
) -> Result<Json<UpdatedPost>, ApiError> {
    let (title, content) = require_title_content(&payload)?;

    // any authenticated caller may update any post; there is no ownership check
    let post = repo::update(&state.db, id, title, content)
        .await?
        .ok_or_else(|| ApiError::not_found("post not found"))?;
    info!(post_id = %post.id, user_id = %claims.id, "post updated");

    Ok(Json(UpdatedPost {
        message: "post updated".into(),
        post: post.into(),
        updated_by: claims.id,
    }))
}

#[instrument(skip(state))]
pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedPost>, ApiError> {
    let post = repo::delete(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("post not found"))?;
    info!(post_id = %post.id, user_id = %claims.id, "post deleted");

    Ok(Json(DeletedPost {
        message: "post deleted".into(),
        deleted_post: post.into(),
        deleted_by: claims.id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: Option<&str>, content: Option<&str>) -> PostInput {
        PostInput {
            title: title.map(str::to_string),
            content: content.map(str::to_string),
        }
    }

    #[test]
    fn accepts_title_and_content() {
        let payload = input(Some("REST API"), Some("notes"));
        let (t, c) = require_title_content(&payload).unwrap();
        assert_eq!((t, c), ("REST API", "notes"));
    }

    #[test]
    fn rejects_missing_or_blank_fields() {
        assert!(require_title_content(&input(None, Some("notes"))).is_err());
        assert!(require_title_content(&input(Some("REST API"), None)).is_err());
        assert!(require_title_content(&input(Some("   "), Some("notes"))).is_err());
        assert!(require_title_content(&input(None, None)).is_err());
    }
}
