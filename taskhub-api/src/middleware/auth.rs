/// Bearer-token authentication middleware
///
/// Validates the `Authorization: Bearer <token>` header, then loads the
/// token's user from the database and attaches the full record to request
/// extensions as [`CurrentUser`]. The database load is what makes
/// soft-deletion effective immediately: a deleted account fails here even
/// if its token has not expired yet.
///
/// # Example
///
/// ```no_run
/// use axum::{Extension, Json};
/// use taskhub_api::middleware::auth::CurrentUser;
///
/// async fn handler(Extension(current): Extension<CurrentUser>) -> String {
///     format!("Hello, {}!", current.0.username)
/// }
/// ```

use axum::{extract::Request, extract::State, middleware::Next, response::Response};
use taskhub_shared::{auth::jwt, models::user::User};

use crate::{app::AppState, error::ApiError};

/// The authenticated user, attached to request extensions
///
/// Handlers extract this with Axum's `Extension` extractor. The wrapped
/// record is the live row from the database, not just the token claims.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Authentication middleware layer
///
/// # Errors
///
/// Returns 401 Unauthorized if:
/// - the Authorization header is missing or not a Bearer token
/// - the token signature, issuer, or expiry is invalid
/// - the referenced user does not exist or is soft-deleted
pub async fn auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Expected Bearer token".to_string()))?;

    let claims = jwt::validate_token(token, state.jwt_secret())?;

    // The token alone is not enough: the account must still exist and be
    // active. Soft-deleting a user invalidates all outstanding tokens here.
    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid token: user not found".to_string()))?;

    tracing::debug!(user_id = %user.id, "User authenticated");

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}
