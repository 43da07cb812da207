use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use axum::Extension;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::client::TrustedProxies;
use super::handlers::assign_role::assign_role;
use super::handlers::block_account::block_account;
use super::handlers::list_sessions::list_sessions;
use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::me::me;
use super::handlers::refresh::refresh;
use super::handlers::register::register;
use super::handlers::revoke_sessions::revoke_sessions;
use super::handlers::verify_email::verify_email;
use super::middleware::authenticate;
use super::middleware::require_admin;
use crate::domain::auth::ports::AuthServicePort;

pub struct AppState<S: AuthServicePort> {
    pub auth_service: Arc<S>,
}

impl<S: AuthServicePort> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            auth_service: Arc::clone(&self.auth_service),
        }
    }
}

pub fn create_router<S: AuthServicePort>(
    auth_service: Arc<S>,
    trusted_proxies: TrustedProxies,
) -> Router {
    let state = AppState { auth_service };

    let public_routes = Router::new()
        .route("/api/auth/register", post(register::<S>))
        .route("/api/auth/login", post(login::<S>))
        .route("/api/auth/refresh", post(refresh::<S>))
        .route("/api/auth/logout", post(logout::<S>));

    let protected_routes = Router::new()
        .route("/api/auth/me", get(me))
        .route("/api/auth/sessions", get(list_sessions::<S>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authenticate::<S>,
        ));

    // Layers run bottom-up: authenticate first, then the admin gate
    let admin_routes = Router::new()
        .route("/api/accounts/:account_id/role", put(assign_role::<S>))
        .route("/api/accounts/:account_id/block", post(block_account::<S>))
        .route(
            "/api/accounts/:account_id/verify-email",
            post(verify_email::<S>),
        )
        .route(
            "/api/accounts/:account_id/sessions/revoke",
            post(revoke_sessions::<S>),
        )
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authenticate::<S>,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .layer(Extension(trusted_proxies))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
