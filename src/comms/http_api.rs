use anyhow::{Context, Result};
use axum::{
    extract::{MatchedPath, Request, State},
    http::{header::AUTHORIZATION, Method},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers;
use crate::config::Config;
use crate::domain::User;
use crate::errors::AppError;
use crate::messages::MessageKey;
use crate::security::guard::{Access, AccessGuard, AccessPolicy, Endpoint};
use crate::security::password;
use crate::security::roles::Role;
use crate::security::token::TokenService;
use crate::services::{AuthService, ReviewService, RoleService, UserService};
use crate::store::{MemoryStore, Store};

pub type SharedState = Arc<AppState>;

pub const HEALTH: &str = "/health";
pub const AUTH_SIGN_IN: &str = "/api/v1/auth/sign-in";
pub const AUTH_VERIFY: &str = "/api/v1/auth/verify";
pub const USERS: &str = "/api/v1/user";
pub const USER_BY_ID: &str = "/api/v1/user/{id}";
pub const USER_CREATE: &str = "/api/v1/user/create";
pub const USER_UPDATE_SELF: &str = "/api/v1/user/update";
pub const USER_UPDATE: &str = "/api/v1/user/update/{id}";
pub const USER_DELETE_SELF: &str = "/api/v1/user/delete";
pub const USER_DELETE: &str = "/api/v1/user/delete/{id}";
pub const REVIEWS: &str = "/api/v1/reviews";
pub const REVIEW_BY_ID: &str = "/api/v1/reviews/{id}";
pub const REVIEWS_BY_USER: &str = "/api/v1/reviews/user/{id}";
pub const REVIEW_CREATE: &str = "/api/v1/reviews/create";
pub const REVIEW_UPDATE: &str = "/api/v1/reviews/update/{id}";
pub const REVIEW_DELETE: &str = "/api/v1/reviews/delete/{id}";
pub const PROMOTE_ADMIN: &str = "/api/v1/role/promote/admin/{id}";

/// Access requirements of every routed endpoint, keyed by route template.
pub fn access_policy() -> AccessPolicy {
    AccessPolicy::new()
        .anonymous(Method::GET, HEALTH)
        .anonymous(Method::POST, AUTH_SIGN_IN)
        .anonymous(Method::POST, USER_CREATE)
        .require(Method::GET, AUTH_VERIFY, &[Role::User])
        .require(Method::GET, USERS, &[Role::User])
        .require(Method::GET, USER_BY_ID, &[Role::User])
        .require(Method::PATCH, USER_UPDATE_SELF, &[Role::User])
        .require(Method::PATCH, USER_UPDATE, &[Role::Admin])
        .require(Method::DELETE, USER_DELETE_SELF, &[Role::User])
        .require(Method::DELETE, USER_DELETE, &[Role::Admin])
        .authenticated(Method::GET, REVIEWS)
        .authenticated(Method::GET, REVIEW_BY_ID)
        .authenticated(Method::GET, REVIEWS_BY_USER)
        .authenticated(Method::POST, REVIEW_CREATE)
        .authenticated(Method::PATCH, REVIEW_UPDATE)
        .authenticated(Method::DELETE, REVIEW_DELETE)
        .require(Method::POST, PROMOTE_ADMIN, &[Role::Admin])
}

pub struct AppState {
    pub config: Arc<Config>,
    pub guard: AccessGuard,
    pub auth: AuthService,
    pub users: UserService,
    pub reviews: ReviewService,
    pub roles: RoleService,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>) -> Result<Self> {
        let tokens = TokenService::new(config.signing_secret(), config.token_ttl()?);
        Ok(Self {
            guard: AccessGuard::new(access_policy(), tokens.clone(), store.clone()),
            auth: AuthService::new(store.clone(), tokens),
            users: UserService::new(store.clone(), config.password_cost),
            reviews: ReviewService::new(store.clone()),
            roles: RoleService::new(store),
            config: Arc::new(config),
        })
    }
}

/// Resolve the caller for the matched route before the handler runs.
async fn access_guard(
    State(state): State<SharedState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());
    let endpoint = Endpoint::new(req.method().clone(), path);
    let authorization = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    match state.guard.check(&endpoint, authorization.as_deref()).await? {
        Access::Exempt => {}
        Access::Authenticated(caller, window) => {
            req.extensions_mut().insert(caller);
            req.extensions_mut().insert(window);
        }
    }
    Ok(next.run(req).await)
}

pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route(HEALTH, get(handlers::health))
        .route(AUTH_SIGN_IN, post(handlers::sign_in))
        .route(AUTH_VERIFY, get(handlers::verify))
        .route(USERS, get(handlers::list_users))
        .route(USER_BY_ID, get(handlers::get_user))
        .route(USER_CREATE, post(handlers::create_user))
        .route(USER_UPDATE_SELF, patch(handlers::update_self))
        .route(USER_UPDATE, patch(handlers::update_user))
        .route(USER_DELETE_SELF, delete(handlers::delete_self))
        .route(USER_DELETE, delete(handlers::delete_user))
        .route(REVIEWS, get(handlers::list_reviews))
        .route(REVIEW_BY_ID, get(handlers::get_review))
        .route(REVIEWS_BY_USER, get(handlers::list_user_reviews))
        .route(REVIEW_CREATE, post(handlers::create_review))
        .route(REVIEW_UPDATE, patch(handlers::update_review))
        .route(REVIEW_DELETE, delete(handlers::delete_review))
        .route(PROMOTE_ADMIN, post(handlers::promote_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), access_guard))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Create the configured bootstrap account if needed and make sure it is an admin.
pub async fn seed_bootstrap_admin(state: &AppState) -> Result<(), AppError> {
    let Some(seed) = state.config.bootstrap_admin.clone() else {
        return Ok(());
    };

    let user = match state.users.list().await?.into_iter().find(|u| u.email == seed.email) {
        Some(existing) => existing,
        None => {
            let hash = password::hash_blocking(seed.password, state.config.password_cost)
                .await
                .map_err(|e| AppError::internal(MessageKey::UserInternal, e))?;
            state
                .users
                .insert(User::new(seed.email, seed.username, seed.display_name, hash))
                .await?
        }
    };

    let outcome = state.roles.promote_to_admin(user.id).await?;
    info!(
        user_id = %user.id,
        admin_id = %outcome.admin_id,
        created = outcome.admin_created,
        "bootstrap admin ready"
    );
    Ok(())
}

pub async fn serve(config: Config) -> Result<()> {
    let port = config.port;
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState::new(config, store)?);
    seed_bootstrap_admin(&state)
        .await
        .context("seeding bootstrap admin")?;

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app).into_future().await?;
    Ok(())
}
