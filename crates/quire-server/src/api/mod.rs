//! REST API: router assembly, middleware and handlers.

pub mod error;
pub mod extract;
mod handlers;
pub mod middleware;
pub mod state;

use axum::Router;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method, Request};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info_span, warn};

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use handlers::{auth, categories, dashboard, health, menus, pages, posts, settings, users};

/// Assemble the application.
///
/// Layout:
/// * `/health`: always public, outside any tenant.
/// * `/api/auth/*`, `/api/public/*`: public, tenant-scoped.
/// * `/api/auth/me`, `/api/v1/*`: require a token issued in the request's
///   tenant.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/v1/pages", post(pages::create).get(pages::list))
        .route(
            "/api/v1/pages/{id}",
            get(pages::get).put(pages::update).delete(pages::delete),
        )
        .route("/api/v1/pages/{id}/publish", post(pages::publish))
        .route("/api/v1/pages/{id}/unpublish", post(pages::unpublish))
        .route("/api/v1/menus", post(menus::create).get(menus::list))
        .route(
            "/api/v1/menus/{id}",
            get(menus::get).put(menus::update).delete(menus::delete),
        )
        .route("/api/v1/posts", post(posts::create).get(posts::list))
        .route(
            "/api/v1/posts/{id}",
            get(posts::get).put(posts::update).delete(posts::delete),
        )
        .route(
            "/api/v1/categories",
            post(categories::create).get(categories::list),
        )
        .route(
            "/api/v1/categories/{id}",
            get(categories::get)
                .put(categories::update)
                .delete(categories::delete),
        )
        .route("/api/v1/users", post(users::create).get(users::list))
        .route(
            "/api/v1/users/{id}",
            get(users::get).put(users::update).delete(users::delete),
        )
        .route("/api/v1/settings", get(settings::get).put(settings::update))
        .route("/api/v1/dashboard/stats", get(dashboard::stats))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_auth));

    let public = Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/public/pages/{*slug}", get(pages::public_by_slug))
        .route("/api/public/menus/{id}", get(menus::public_get))
        .route("/api/public/settings", get(settings::get))
        .route("/api/public/posts", get(posts::public_list))
        .route("/api/public/posts/{slug}", get(posts::public_by_slug))
        .route("/api/public/categories", get(categories::public_list));

    let mut scoped = public.merge(protected);
    if state.resolver.mode().is_multi() {
        scoped = scoped.layer(from_fn_with_state(state.clone(), middleware::resolve_tenant));
    }

    Router::new()
        .route("/health", get(health::health))
        .merge(scoped)
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                info_span!(
                    "request",
                    method = %req.method(),
                    path = %req.uri().path(),
                    tenant_id = tracing::field::Empty,
                )
            }),
        )
        .layer(cors_layer(&state.cors_origins))
        .with_state(state)
}

/// Credentialed CORS for the configured origins; without any, every
/// origin may call the API but cookies are not shared.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(methods)
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static(middleware::TENANT_HEADER),
        ])
        .allow_credentials(true)
}
