use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use tracing::{error, info};
use uuid::Uuid;

use crate::api::http::dto::{ListParams, LoginForm, LoginParams, MemberFormData};
use crate::api::http::render;
use crate::api::http::session::{self, AuthSettings, SessionStore};
use crate::contract::error::MembersError;
use crate::domain::error::DomainError;
use crate::domain::service::Service;

const HX_REQUEST: &str = "hx-request";
const HX_TRIGGER: &str = "hx-trigger";
const TOGGLE_EVENT: &str = "memberStatusToggled";

/// List members with name filter and pagination
pub async fn list_members(
    Extension(svc): Extension<Arc<Service>>,
    Query(params): Query<ListParams>,
) -> Result<Html<String>, StatusCode> {
    let q = params.q.clone();
    let notice = (params.created == Some(1)).then_some("Member added.");
    match svc.list(params.into()).await {
        Ok(page) => Ok(Html(render::list_page(&page, q.as_deref(), notice))),
        Err(e) => {
            error!("Failed to list members: {}", e);
            Err(error_status(e.into()))
        }
    }
}

/// Member detail page
pub async fn member_detail(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, StatusCode> {
    match svc.get(id).await {
        Ok(member) => Ok(Html(render::detail_page(&member))),
        Err(e) => {
            error!("Failed to get member {}: {}", id, e);
            Err(error_status(e.into()))
        }
    }
}

/// Blank create form
pub async fn show_add_form() -> Html<String> {
    Html(render::member_form_page(
        "Add member",
        "/members/add/",
        "",
        "",
        &[],
    ))
}

/// Create form submit: redirect to the list on success, re-render the
/// form with inline errors on validation failure.
pub async fn create_member(
    Extension(svc): Extension<Arc<Service>>,
    Form(form): Form<MemberFormData>,
) -> Response {
    match svc.create(form.clone().into()).await {
        Ok(member) => {
            info!("Created member {}", member.id);
            Redirect::to("/?created=1").into_response()
        }
        Err(e) => match form_errors(&e) {
            Some(errors) => Html(render::member_form_page(
                "Add member",
                "/members/add/",
                &form.name,
                &form.email,
                &errors,
            ))
            .into_response(),
            None => {
                error!("Failed to create member: {}", e);
                error_status(e.into()).into_response()
            }
        },
    }
}

/// Edit form, prefilled with the current values
pub async fn show_edit_form(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, StatusCode> {
    match svc.get(id).await {
        Ok(member) => Ok(Html(render::member_form_page(
            "Edit member",
            &format!("/members/{id}/edit/"),
            &member.name,
            &member.email,
            &[],
        ))),
        Err(e) => Err(error_status(e.into())),
    }
}

/// Edit form submit
pub async fn update_member(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<Uuid>,
    Form(form): Form<MemberFormData>,
) -> Response {
    match svc.update(id, form.clone().into()).await {
        Ok(member) => Redirect::to(&format!("/members/{}/", member.id)).into_response(),
        Err(e) => match form_errors(&e) {
            Some(errors) => Html(render::member_form_page(
                "Edit member",
                &format!("/members/{id}/edit/"),
                &form.name,
                &form.email,
                &errors,
            ))
            .into_response(),
            None => {
                error!("Failed to update member {}: {}", id, e);
                error_status(e.into()).into_response()
            }
        },
    }
}

/// htmx-aware status toggle: returns a fragment plus a client event
/// trigger on htmx requests; falls back to a redirect otherwise.
pub async fn toggle_member(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Response {
    let member = match svc.toggle_status(id).await {
        Ok(member) => member,
        Err(e) => {
            error!("Failed to toggle member {}: {}", id, e);
            return error_status(e.into()).into_response();
        }
    };

    let is_htmx = headers
        .get(HX_REQUEST)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("true"));

    if is_htmx {
        let trigger = [(
            HeaderName::from_static(HX_TRIGGER),
            HeaderValue::from_static(TOGGLE_EVENT),
        )];
        (trigger, Html(render::status_fragment(&member))).into_response()
    } else {
        Redirect::to(&format!("/members/{}/", member.id)).into_response()
    }
}

/// Login page
pub async fn login_form(Query(params): Query<LoginParams>) -> Html<String> {
    Html(render::login_page(safe_next(params.next.as_deref()), None))
}

/// Login submit: on a matching access key, start a session and redirect
/// to the requested page.
pub async fn login_submit(
    Extension(store): Extension<Arc<SessionStore>>,
    Extension(auth): Extension<AuthSettings>,
    Form(form): Form<LoginForm>,
) -> Response {
    let next = safe_next(form.next.as_deref()).to_string();

    let accepted = matches!(&auth.access_key, Some(key) if !key.is_empty() && *key == form.access_key);
    if !accepted {
        info!("Rejected login attempt");
        return Html(render::login_page(&next, Some("Invalid access key."))).into_response();
    }

    let token = store.create_session().await;
    (
        [(header::SET_COOKIE, session::session_cookie(&token))],
        Redirect::to(&next),
    )
        .into_response()
}

/// Logout: drop the session and clear the cookie
pub async fn logout(
    Extension(store): Extension<Arc<SessionStore>>,
    headers: HeaderMap,
) -> Response {
    if let Some(token) = session::session_token(&headers) {
        store.delete_session(&token).await;
    }
    (
        [(header::SET_COOKIE, session::clear_session_cookie())],
        Redirect::to("/login"),
    )
        .into_response()
}

/// Deliberate no-op endpoint: empty success response regardless of input.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Only allow same-site absolute paths as post-login targets.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(n) if n.starts_with('/') && !n.starts_with("//") => n,
        _ => "/",
    }
}

/// Map a domain error to inline form errors, when it is one the user can
/// fix in the form. Messages match the original field error wording.
fn form_errors(error: &DomainError) -> Option<Vec<(&'static str, String)>> {
    match error {
        DomainError::EmptyName => Some(vec![("name", "Name is required.".to_string())]),
        DomainError::NameTooLong { .. } => Some(vec![("name", error.to_string())]),
        DomainError::InvalidEmail { .. } => {
            Some(vec![("email", "Enter a valid email address.".to_string())])
        }
        DomainError::EmailAlreadyExists { .. } => Some(vec![(
            "email",
            "A member with this email already exists.".to_string(),
        )]),
        DomainError::Validation { field, message } if field == "email" => {
            Some(vec![("email", message.clone())])
        }
        DomainError::Validation { field, message } if field == "name" => {
            Some(vec![("name", message.clone())])
        }
        _ => None,
    }
}

/// Map the module-boundary error to an HTTP status code. Domain errors
/// cross into the API layer through `MembersError`, which already strips
/// anything unsafe to expose.
fn error_status(error: MembersError) -> StatusCode {
    match error {
        MembersError::NotFound { .. } => StatusCode::NOT_FOUND,
        MembersError::Conflict { .. } => StatusCode::CONFLICT,
        MembersError::Validation { .. } => StatusCode::BAD_REQUEST,
        MembersError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_errors_map_to_http_statuses() {
        assert_eq!(
            error_status(MembersError::not_found(Uuid::new_v4())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_status(MembersError::conflict("a@x.com".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_status(DomainError::empty_name().into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(DomainError::database("disk full").into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn safe_next_only_allows_local_paths() {
        assert_eq!(safe_next(Some("/members/add/")), "/members/add/");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(None), "/");
    }
}
