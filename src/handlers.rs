use axum::{
    body::Body,
    extract::{FromRequest, Path as AxumPath, Request, State},
    http::{header, Response, StatusCode, Uri},
    response::{Html, IntoResponse},
    Form,
};
use serde::Deserialize;

use crate::errors::WikiError;
use crate::router::{Operation, Route};
use crate::services::Outcome;
use crate::types::AppState;
use crate::utils::{content_type_for, ensure_safe_path, normalize_path};

/// Form posted by the edit page
#[derive(Debug, Default, Deserialize)]
pub struct SaveForm {
    #[serde(default)]
    pub body: String,
}

impl IntoResponse for Outcome {
    fn into_response(self) -> axum::response::Response {
        match self {
            Outcome::Html(html) => Html(html).into_response(),
            Outcome::Redirect(location) => {
                (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
            }
        }
    }
}

/// Validate the full request path and check it names the operation this
/// handler serves
fn route_for(state: &AppState, uri: &Uri, expected: Operation) -> Result<Route, WikiError> {
    match state.router.validate(uri.path()) {
        Some(route) if route.operation == expected => Ok(route),
        _ => {
            log::warn!("No route for '{}'", uri.path());
            Err(WikiError::NotFound)
        }
    }
}

/// Handle root path requests: list every page
pub async fn handle_root(State(state): State<AppState>) -> Result<Outcome, WikiError> {
    log::info!("Index request received");
    state.dispatcher.list()
}

pub async fn handle_view(State(state): State<AppState>, uri: Uri) -> Result<Outcome, WikiError> {
    let route = route_for(&state, &uri, Operation::View)?;
    log::info!("View request for '{}'", route.id);
    state.dispatcher.dispatch(&route, None)
}

pub async fn handle_edit(State(state): State<AppState>, uri: Uri) -> Result<Outcome, WikiError> {
    let route = route_for(&state, &uri, Operation::Edit)?;
    log::info!("Edit request for '{}'", route.id);
    state.dispatcher.dispatch(&route, None)
}

/// Store a posted page. The path is checked before the body is read, so a
/// bad path is a 404 whatever the request carries.
pub async fn handle_save(
    State(state): State<AppState>,
    request: Request,
) -> Result<axum::response::Response, WikiError> {
    let route = route_for(&state, request.uri(), Operation::Save)?;
    let form = match Form::<SaveForm>::from_request(request, &state).await {
        Ok(Form(form)) => form,
        Err(rejection) => {
            log::warn!("Rejected save form for '{}': {}", route.id, rejection.body_text());
            return Ok(rejection.into_response());
        }
    };
    log::info!("Save request for '{}' ({} bytes)", route.id, form.body.len());
    Ok(state.dispatcher.dispatch(&route, Some(&form.body))?.into_response())
}

/// Handle static image requests
pub async fn handle_image(
    State(state): State<AppState>,
    AxumPath(path): AxumPath<String>,
) -> Result<Response<Body>, WikiError> {
    let normalized = normalize_path(&path);
    ensure_safe_path(&normalized).inspect_err(|_| {
        log::warn!("Rejected image path '{}'", path);
    })?;
    let requested = state.images_dir.join(&normalized);

    if !requested.is_file() {
        return Err(WikiError::NotFound);
    }

    let bytes = std::fs::read(&requested)?;
    let mut resp = Response::new(Body::from(bytes));
    resp.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static(content_type_for(&requested)),
    );
    Ok(resp)
}

/// Anything the routes above do not claim
pub async fn handle_not_found(uri: Uri) -> WikiError {
    log::warn!("Path not found: '{}'", uri.path());
    WikiError::NotFound
}
