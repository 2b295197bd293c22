//! # tasktrack_api
//!
//! HTTP API library for Tasktrack.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, patch, post};
use tasktrack_core::auth::CredentialError;
use tasktrack_core::auth::jwt::TokenService;
use tasktrack_core::auth::password;
use tasktrack_core::auth::resolver::IdentityResolver;
use tasktrack_core::store::{MemoryStore, TaskStore, UserStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::ApiConfig;
use crate::handlers::{auth, health, tasks, users};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// User persistence.
    pub users: Arc<dyn UserStore>,
    /// Task persistence.
    pub tasks: Arc<dyn TaskStore>,
    /// Access token issuer/verifier.
    pub tokens: Arc<TokenService>,
    /// Bearer token to principal resolution.
    pub resolver: IdentityResolver,
    /// API configuration.
    pub config: ApiConfig,
    /// bcrypt hash verified against on unknown-email logins.
    pub(crate) dummy_hash: Arc<str>,
}

impl AppState {
    /// Build state over the given stores.
    pub fn new(
        config: ApiConfig,
        users: Arc<dyn UserStore>,
        tasks: Arc<dyn TaskStore>,
    ) -> Result<Self, CredentialError> {
        let tokens = Arc::new(TokenService::new(&config.auth));
        let resolver = IdentityResolver::new(tokens.clone(), users.clone());
        let dummy_hash = password::hash_password_with_cost(
            services::auth::TIMING_DUMMY_PASSWORD,
            config.auth.bcrypt_cost(),
        )?;
        Ok(Self {
            users,
            tasks,
            tokens,
            resolver,
            config,
            dummy_hash: dummy_hash.into(),
        })
    }

    /// Build state backed by a fresh [`MemoryStore`].
    pub fn in_memory(config: ApiConfig) -> Result<Self, CredentialError> {
        let store = Arc::new(MemoryStore::new());
        Self::new(config, store.clone(), store)
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(origins)
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    // Public routes (no auth required)
    let public = Router::new()
        .route(routes::GET_ROOT, get(health::root_handler))
        .route(routes::GET_HEALTH, get(health::health_handler))
        .route(routes::POST_AUTH_REGISTER, post(auth::register_handler))
        .route(routes::POST_AUTH_LOGIN, post(auth::login_handler));

    let task_collection = get(tasks::list_tasks_handler).post(tasks::create_task_handler);
    let user_collection = get(users::list_users_handler);

    // Protected routes (require auth)
    let protected = Router::new()
        .route(routes::GET_AUTH_ME, get(auth::me_handler))
        .route(routes::TASKS, task_collection.clone())
        .route(routes::TASKS_SLASH, task_collection)
        .route(
            routes::TASKS_ID,
            get(tasks::get_task_handler)
                .put(tasks::update_task_handler)
                .delete(tasks::delete_task_handler),
        )
        .route(routes::USERS, user_collection.clone())
        .route(routes::USERS_SLASH, user_collection)
        .route(
            routes::USERS_ID,
            patch(users::update_user_handler).delete(users::delete_user_handler),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
