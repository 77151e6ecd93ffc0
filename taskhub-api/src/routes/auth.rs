/// Authentication endpoints
///
/// This module provides user authentication and profile endpoints:
/// - Registration
/// - Login
/// - Profile retrieval and update
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Register a new user
/// - `POST /api/auth/login` - Login and get a token
/// - `GET  /api/auth/profile` - Current user's profile
/// - `PUT  /api/auth/profile` - Update the current user's profile

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use taskhub_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, UpdateUser, User},
};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::auth::CurrentUser,
};

/// Register request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, max = 100, message = "Username must be 1-100 characters"))]
    pub username: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Optional postal address
    #[validate(length(max = 255, message = "Address must be at most 255 characters"))]
    pub address: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Profile update request
///
/// Only username, address, and password can change; anything else in the
/// body is ignored.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    /// New display name
    #[validate(length(min = 1, max = 100, message = "Username must be 1-100 characters"))]
    pub username: Option<String>,

    /// New postal address
    #[validate(length(max = 255, message = "Address must be at most 255 characters"))]
    pub address: Option<String>,

    /// New password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
}

/// Public view of a user record
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// User ID
    pub id: uuid::Uuid,

    /// Display name
    pub username: String,

    /// Email address
    pub email: String,

    /// Postal address
    pub address: Option<String>,

    /// When the account was created
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            address: user.address,
            created_at: user.created_at,
        }
    }
}

/// Response carrying a token and the user it belongs to
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    /// Bearer token
    pub token: String,

    /// The authenticated user
    pub user: UserResponse,
}

/// Response carrying just a user
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    /// The current user
    pub user: UserResponse,
}

/// Register a new user
///
/// Creates a user account and returns a bearer token for it.
///
/// # Errors
///
/// - `400 Bad Request`: validation failed or email already in use
/// - `500 Internal Server Error`: server error
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 400, description = "Validation failed or email in use")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate()?;

    if User::email_exists(&state.db, &req.email).await? {
        return Err(ApiError::BadRequest("Email is already in use".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
            address: req.address,
        },
    )
    .await?;

    let claims = jwt::Claims::new(user.id, state.token_expiry());
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// Login
///
/// Authenticates a user by email and password and returns a bearer token.
///
/// # Errors
///
/// - `400 Bad Request`: validation failed
/// - `401 Unauthorized`: unknown email or wrong password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login succeeded", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    // Same message for unknown email and wrong password
    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let claims = jwt::Claims::new(user.id, state.token_expiry());
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// Get the current user's profile
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    tag = "auth",
    responses(
        (status = 200, description = "Current profile", body = ProfileResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_profile(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<ProfileResponse>> {
    Ok(Json(ProfileResponse { user: user.into() }))
}

/// Update the current user's profile
///
/// Accepts a partial field set filtered against the allow-list
/// {username, address, password}. An update in which no allow-listed field
/// is present is rejected.
///
/// # Errors
///
/// - `400 Bad Request`: validation failed or nothing to update
/// - `401 Unauthorized`: missing or invalid token
#[utoipa::path(
    put,
    path = "/api/auth/profile",
    tag = "auth",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Validation failed or empty update")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    req.validate()?;

    let password_hash = match req.password {
        Some(ref password) => Some(password::hash_password(password)?),
        None => None,
    };

    let update = UpdateUser {
        username: req.username,
        address: req.address,
        password_hash,
    };

    if update.is_empty() {
        return Err(ApiError::BadRequest("No valid fields to update".to_string()));
    }

    let updated = User::update(&state.db, user.id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(ProfileResponse {
        user: updated.into(),
    }))
}
