//! HTTP mapping for [`CeError`] (JSON `{error, message, details}` body).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use ceprism_core::error::{CeError, ClientCode};

/// `CeError` on its way out of an axum handler.
#[derive(Debug)]
pub struct HttpError(pub CeError);

impl From<CeError> for HttpError {
    fn from(e: CeError) -> Self {
        Self(e)
    }
}

pub fn status_for(code: ClientCode) -> StatusCode {
    match code {
        ClientCode::BadRequest
        | ClientCode::ValidationFailed
        | ClientCode::InvalidAttribute
        | ClientCode::UnrecognizedMode
        | ClientCode::UnsupportedVersion => StatusCode::BAD_REQUEST,
        ClientCode::NotAllowed => StatusCode::FORBIDDEN,
        ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Body sent for a failed request.
pub fn error_body(e: &CeError) -> serde_json::Value {
    json!({
        "error": e.client_code().as_str(),
        "message": e.to_string(),
        "details": e.details(),
    })
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.client_code());
        (status, Json(error_body(&self.0))).into_response()
    }
}
