/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskhub_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = taskhub_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    docs::ApiDoc,
    middleware::{auth::auth_layer, rate_limit::RateLimiter, security::SecurityHeadersLayer},
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Per-IP rate limiter shared across requests
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        let rate_limiter = RateLimiter::new(config.rate_limit);
        Self {
            db,
            config: Arc::new(config),
            rate_limiter,
        }
    }

    /// Gets the JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Gets the configured token lifetime
    pub fn token_expiry(&self) -> chrono::Duration {
        chrono::Duration::hours(self.config.jwt.expiry_hours)
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                        # Health check (public)
/// ├── /api-docs                      # Swagger UI + openapi.json (public)
/// └── /api/
///     ├── /auth/
///     │   ├── POST /register         # public
///     │   ├── POST /login            # public
///     │   └── GET|PUT /profile       # authenticated
///     ├── /tasks/                    # authenticated
///     ├── /categories/               # authenticated
///     ├── /groups/                   # authenticated (+ role policy)
///     ├── /group-tasks/              # authenticated (+ role policy)
///     └── /notifications/            # authenticated
/// ```
///
/// # Middleware Stack
///
/// Applied in order (outermost first):
/// 1. Security headers
/// 2. CORS (tower-http CorsLayer)
/// 3. Request logging (tower-http TraceLayer)
/// 4. Per-IP rate limiting
/// 5. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let require_auth =
        || axum::middleware::from_fn_with_state(state.clone(), auth_layer);

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes: register/login are public, profile requires a token
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .merge(
            Router::new()
                .route(
                    "/profile",
                    get(routes::auth::get_profile).put(routes::auth::update_profile),
                )
                .layer(require_auth()),
        );

    let task_routes = Router::new()
        .route(
            "/",
            post(routes::tasks::create_task).get(routes::tasks::list_tasks),
        )
        .route(
            "/:task_id",
            put(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        .layer(require_auth());

    let category_routes = Router::new()
        .route(
            "/",
            post(routes::categories::create_category).get(routes::categories::list_categories),
        )
        .route(
            "/:category_id",
            put(routes::categories::update_category)
                .delete(routes::categories::delete_category),
        )
        .route(
            "/:category_id/tasks",
            get(routes::categories::list_category_tasks),
        )
        .layer(require_auth());

    let group_routes = Router::new()
        .route("/", post(routes::groups::create_group))
        .route(
            "/:group_id",
            put(routes::groups::update_group).delete(routes::groups::delete_group),
        )
        .route(
            "/:group_id/members",
            post(routes::groups::add_member).delete(routes::groups::remove_member),
        )
        .layer(require_auth());

    // One `:id` segment serves both shapes here: GET lists by group ID,
    // the mutations address a task ID (the router cannot mix parameter
    // names at the same position).
    let group_task_routes = Router::new()
        .route("/", post(routes::group_tasks::create_group_task))
        .route(
            "/:id",
            get(routes::group_tasks::list_group_tasks)
                .put(routes::group_tasks::update_group_task)
                .delete(routes::group_tasks::delete_group_task),
        )
        .route(
            "/:id/status",
            axum::routing::patch(routes::group_tasks::update_group_task_status),
        )
        .layer(require_auth());

    let notification_routes = Router::new()
        .route("/", get(routes::notifications::list_notifications))
        .route(
            "/mark-as-read",
            put(routes::notifications::mark_notifications_read),
        )
        .layer(require_auth());

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/tasks", task_routes)
        .nest("/categories", category_routes)
        .nest("/groups", group_routes)
        .nest("/group-tasks", group_task_routes)
        .nest("/notifications", notification_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with the middleware stack
    Router::new()
        .merge(health_routes)
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::rate_limit::rate_limit_layer,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
