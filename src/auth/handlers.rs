use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    Json,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, PublicUser, RegisterRequest, RegisterResponse},
        repo::User,
        services::{hash_password, is_valid_email, normalize_email, verify_password, JwtKeys},
    },
    error::{is_unique_violation, ApiError},
    state::AppState,
};

/// One body for both bad-credential outcomes, so the response does not
/// reveal whether the email exists.
const BAD_CREDENTIALS: &str = "wrong email or password";

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let name = payload.name.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let email = payload.email.as_deref().filter(|s| !s.trim().is_empty());
    let password = payload.password.as_deref().filter(|s| !s.is_empty());

    let mut missing = Vec::new();
    if name.is_none() {
        missing.push("name");
    }
    if email.is_none() {
        missing.push("email");
    }
    if password.is_none() {
        missing.push("password");
    }
    let (Some(name), Some(email), Some(password)) = (name, email, password) else {
        return Err(ApiError::validation(format!("missing {}", missing.join(", "))));
    };

    let email = normalize_email(email);
    if !is_valid_email(&email) {
        warn!("registration with invalid email");
        return Err(ApiError::validation("invalid email"));
    }

    let hash = hash_password(password).map_err(ApiError::Internal)?;

    let user = User::create(&state.db, name, &email, &hash)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                warn!(email = %email, "email already exists");
                ApiError::Conflict("email already exists".into())
            } else {
                ApiError::from_sqlx(e)
            }
        })?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "registration successful".into(),
            user_id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = payload.email.as_deref().filter(|s| !s.trim().is_empty());
    let password = payload.password.as_deref().filter(|s| !s.is_empty());

    let mut missing = Vec::new();
    if email.is_none() {
        missing.push("email");
    }
    if password.is_none() {
        missing.push("password");
    }
    let (Some(email), Some(password)) = (email, password) else {
        return Err(ApiError::validation(format!("missing {}", missing.join(", "))));
    };

    let email = normalize_email(email);
    let user = match User::find_by_email(&state.db, &email).await? {
        Some(u) => u,
        None => {
            // burn one hash so this path costs the same as a real verify
            let _ = hash_password(password);
            warn!(email = %email, "login unknown email");
            return Err(ApiError::auth(BAD_CREDENTIALS));
        }
    };

    let ok = match verify_password(password, &user.password_hash) {
        Ok(v) => v,
        Err(e) => {
            // a corrupt stored hash must look like a wrong password
            error!(error = %e, user_id = %user.id, "password verification failed");
            false
        }
    };
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::auth(BAD_CREDENTIALS));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&user).map_err(ApiError::Internal)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(LoginResponse {
        message: "login successful".into(),
        token,
        user: PublicUser::from(user),
    }))
}

#[cfg(test)]
mod response_shape_tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    #[test]
    fn register_response_uses_contract_keys() {
        let now = OffsetDateTime::now_utc();
        let body = RegisterResponse {
            message: "registration successful".into(),
            user_id: Uuid::new_v4(),
            name: "Tony".into(),
            email: "tony@example.com".into(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("userId").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn public_user_never_carries_the_hash() {
        let now = OffsetDateTime::now_utc();
        let user = crate::auth::repo::User {
            id: Uuid::new_v4(),
            name: "Tony".into(),
            email: "tony@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_string(&PublicUser::from(user)).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password"));
    }
}
