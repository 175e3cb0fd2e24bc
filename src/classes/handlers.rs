use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::services::AuthUser,
    classes::{
        dto::{
            ClassDto, ClassEnvelope, CreateClassRequest, DeletedClass, EnrollmentDto,
            JoinResponse, UpdateClassRequest,
        },
        repo,
    },
    error::{is_unique_violation, ApiError},
    pagination::{PageQuery, Paginated},
    state::AppState,
};

const DEFAULT_PAGE_SIZE: i64 = 10;

const ALREADY_MEMBER: &str = "already a member of this class";

/// Normalize an update payload: names count only when non-blank, while a
/// supplied description is kept even when it trims down to empty.
fn normalized_update(payload: &UpdateClassRequest) -> (Option<String>, Option<String>) {
    let name = payload
        .name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let description = payload.description.as_deref().map(|s| s.trim().to_string());
    (name, description)
}

#[instrument(skip(state, payload))]
pub async fn create_class(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<CreateClassRequest>,
) -> Result<(StatusCode, Json<ClassEnvelope>), ApiError> {
    let Some(name) = payload.name.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
        return Err(ApiError::validation("name is required"));
    };
    let description = payload
        .description
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let class = repo::create(&state.db, name, description, claims.id).await?;
    info!(class_id = %class.id, user_id = %claims.id, "class created");

    Ok((
        StatusCode::CREATED,
        Json(ClassEnvelope {
            message: "class created".into(),
            class: class.into(),
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_classes(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<ClassDto>>, ApiError> {
    let spec = query.normalize(DEFAULT_PAGE_SIZE);
    let total = repo::count(&state.db, spec.search.as_deref()).await?;
    let classes = repo::list(&state.db, spec.search.as_deref(), spec.limit, spec.offset).await?;
    let results = classes.into_iter().map(ClassDto::from).collect();
    Ok(Json(Paginated::new(&spec, total, results)))
}

#[instrument(skip(state))]
pub async fn get_class(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClassEnvelope>, ApiError> {
    let class = repo::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("class not found"))?;
    Ok(Json(ClassEnvelope {
        message: "class retrieved".into(),
        class: class.into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_class(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateClassRequest>,
) -> Result<Json<ClassEnvelope>, ApiError> {
    let (name, description) = normalized_update(&payload);
    if name.is_none() && description.is_none() {
        return Err(ApiError::validation("no valid fields to update"));
    }

    let class = repo::update(&state.db, id, name.as_deref(), description.as_deref())
        .await?
        .ok_or_else(|| ApiError::not_found("class not found"))?;
    info!(class_id = %class.id, user_id = %claims.id, "class updated");

    Ok(Json(ClassEnvelope {
        message: "class updated".into(),
        class: class.into(),
    }))
}

#[instrument(skip(state))]
pub async fn delete_class(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedClass>, ApiError> {
    let class = repo::delete(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("class not found"))?;
    info!(class_id = %class.id, user_id = %claims.id, "class deleted");

    Ok(Json(DeletedClass {
        message: "class deleted".into(),
        deleted_class: class.into(),
    }))
}

#[instrument(skip(state))]
pub async fn join_class(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(class_id): Path<Uuid>,
) -> Result<Json<JoinResponse>, ApiError> {
    if repo::find(&state.db, class_id).await?.is_none() {
        return Err(ApiError::not_found("class not found"));
    }

    // fast path; the unique index is what actually prevents duplicates
    if repo::enrollment_exists(&state.db, claims.id, class_id).await? {
        return Ok(Json(JoinResponse {
            message: ALREADY_MEMBER.into(),
            enrollment: None,
        }));
    }

    let inserted = match repo::enroll(&state.db, claims.id, class_id).await {
        Ok(row) => row,
        // a racing join landed first; that is still a successful join
        Err(e) if is_unique_violation(&e) => None,
        Err(e) => return Err(ApiError::from_sqlx(e)),
    };

    match inserted {
        Some(row) => {
            info!(class_id = %class_id, user_id = %claims.id, "user joined class");
            Ok(Json(JoinResponse {
                message: "joined class successfully".into(),
                enrollment: Some(EnrollmentDto::from(row)),
            }))
        }
        None => Ok(Json(JoinResponse {
            message: ALREADY_MEMBER.into(),
            enrollment: None,
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(name: Option<&str>, description: Option<&str>) -> UpdateClassRequest {
        UpdateClassRequest {
            name: name.map(str::to_string),
            description: description.map(str::to_string),
        }
    }

    #[test]
    fn blank_name_is_not_an_update() {
        let (name, description) = normalized_update(&update(Some("   "), None));
        assert!(name.is_none());
        assert!(description.is_none());
    }

    #[test]
    fn description_may_be_cleared_to_empty() {
        let (name, description) = normalized_update(&update(None, Some("   ")));
        assert!(name.is_none());
        assert_eq!(description.as_deref(), Some(""));
    }

    #[test]
    fn both_fields_are_trimmed() {
        let (name, description) = normalized_update(&update(Some("  Rust 101 "), Some(" intro ")));
        assert_eq!(name.as_deref(), Some("Rust 101"));
        assert_eq!(description.as_deref(), Some("intro"));
    }
}
