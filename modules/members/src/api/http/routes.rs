use axum::{
    middleware,
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api::http::{handlers, session};
use crate::api::http::session::{AuthSettings, SessionStore};
use crate::domain::service::Service;

/// Build the member registry router. Member pages sit behind the session
/// middleware; login and the health endpoint stay open.
pub fn router(service: Arc<Service>, sessions: Arc<SessionStore>, auth: AuthSettings) -> Router {
    let protected = Router::new()
        .route("/", get(handlers::list_members))
        .route(
            "/members/add/",
            get(handlers::show_add_form).post(handlers::create_member),
        )
        .route("/members/{id}/", get(handlers::member_detail))
        .route(
            "/members/{id}/edit/",
            get(handlers::show_edit_form).post(handlers::update_member),
        )
        .route("/members/{id}/toggle/", post(handlers::toggle_member))
        .route("/logout", post(handlers::logout))
        .layer(middleware::from_fn(session::require_session));

    Router::new()
        .merge(protected)
        .route(
            "/login",
            get(handlers::login_form).post(handlers::login_submit),
        )
        .route("/healthz", get(handlers::healthz))
        .layer(Extension(service))
        .layer(Extension(sessions))
        .layer(Extension(auth))
        .layer(TraceLayer::new_for_http())
}
