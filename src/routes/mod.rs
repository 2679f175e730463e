//! actix-web handlers. Every response body is an [`Envelope`].

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;

use crate::services::{ServiceError, ServiceResult};

pub mod auth;
pub mod checkin;
pub mod extension;
pub mod purchase_tracker;
pub mod retailer_orders;
pub mod retailers;

/// `status` of a successful envelope.
pub const STATUS_OK: i32 = 200;
/// `status` of a failed envelope.
pub const STATUS_ERROR: i32 = -1;

/// Uniform JSON body: `{ "status": 200 | -1, "message": "...", "data": ... }`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: i32,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            status: STATUS_OK,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR,
            message: message.into(),
            data: None,
        }
    }
}

/// HTTP status for a failed service call.
pub fn error_status(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
        ServiceError::Form(_) => StatusCode::BAD_REQUEST,
        ServiceError::NotFound => StatusCode::NOT_FOUND,
        ServiceError::Conflict => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Message shown to the client for a failed service call.
pub fn error_message(err: &ServiceError) -> String {
    match err {
        ServiceError::Unauthorized => "Insufficient permissions".to_string(),
        ServiceError::Form(message) => message.clone(),
        ServiceError::NotFound => "Not found".to_string(),
        ServiceError::Conflict => "Already exists".to_string(),
        _ => "Internal server error".to_string(),
    }
}

/// Envelope response for a service error. `action` names what failed in the log.
pub fn error_response(err: ServiceError, action: &str) -> HttpResponse {
    let status = error_status(&err);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        log::error!("Failed to {action}: {err}");
    } else {
        log::debug!("Could not {action}: {err}");
    }
    HttpResponse::build(status).json(Envelope::<()>::error(error_message(&err)))
}

/// `200 OK` envelope for a successful call, error envelope otherwise.
pub fn respond<T: Serialize>(result: ServiceResult<T>, action: &str) -> HttpResponse {
    match result {
        Ok(data) => HttpResponse::Ok().json(Envelope::ok("Success", data)),
        Err(err) => error_response(err, action),
    }
}

/// Like [`respond`] with `201 Created` on success.
pub fn respond_created<T: Serialize>(result: ServiceResult<T>, action: &str) -> HttpResponse {
    match result {
        Ok(data) => HttpResponse::Created().json(Envelope::ok("Created", data)),
        Err(err) => error_response(err, action),
    }
}
