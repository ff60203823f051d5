//! This module wires the userdir HTTP surface together: route registration,
//! response helpers, and the mapping from the crate error taxonomy to HTTP
//! statuses. This module utilizes the `actix_web` crate as the underlying
//! provider.

use actix_web::{http::StatusCode, web, HttpResponse, ResponseError};
use serde_json::json;

use crate::{errors::UdError, users::manager::Reply};

pub mod metrics;
pub mod users;

pub fn init_service(cfg: &mut web::ServiceConfig) {
    users::init_users_service(cfg);
    metrics::init_metrics_service(cfg);
}

impl UdError {
    pub fn response_status(&self) -> StatusCode {
        match self {
            UdError::ErrUserValidation(_) | UdError::Serde { .. } => StatusCode::BAD_REQUEST,
            UdError::ErrUserNotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ResponseError for UdError {
    // builds the actual response to send back when an error occurs
    fn error_response(&self) -> HttpResponse {
        let status = self.response_status();
        if status == StatusCode::NOT_FOUND {
            return HttpResponse::build(status).finish();
        }
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            log::error!("request failed: {}", self);
        }
        HttpResponse::build(status).json(json!({ "error": self.to_string() }))
    }
}

pub fn reply_response(reply: Reply) -> HttpResponse {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    match reply.body {
        Some(body) => HttpResponse::build(status).json(body),
        None => HttpResponse::build(status).finish(),
    }
}
