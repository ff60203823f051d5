use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde_json::{Map, Value};

use crate::{errors::UdError, http::reply_response, users::manager::UserManager};

// An unparseable JSON body is rejected here with 400, before the manager
// runs, matching the body-parser middleware behavior of the source service.
fn parse_body(body: &web::Bytes) -> Result<Option<Map<String, Value>>, UdError> {
    if body.is_empty() {
        return Ok(None);
    }

    let payload = serde_json::from_slice(body)?;
    Ok(Some(payload))
}

async fn create_user_handler(
    body: web::Bytes,
    manager: web::Data<Arc<UserManager>>,
) -> Result<HttpResponse, UdError> {
    let payload = parse_body(&body)?;
    let reply = manager.create(payload.as_ref())?;
    Ok(reply_response(reply))
}

async fn list_users_handler(manager: web::Data<Arc<UserManager>>) -> Result<HttpResponse, UdError> {
    let reply = manager.list()?;
    Ok(reply_response(reply))
}

async fn get_user_handler(
    path: web::Path<String>,
    manager: web::Data<Arc<UserManager>>,
) -> Result<HttpResponse, UdError> {
    let reply = manager.get(&path.into_inner())?;
    Ok(reply_response(reply))
}

async fn update_user_handler(
    path: web::Path<String>,
    body: web::Bytes,
    manager: web::Data<Arc<UserManager>>,
) -> Result<HttpResponse, UdError> {
    let payload = parse_body(&body)?;
    let reply = manager.update(&path.into_inner(), payload.as_ref())?;
    Ok(reply_response(reply))
}

async fn delete_user_handler(
    path: web::Path<String>,
    manager: web::Data<Arc<UserManager>>,
) -> Result<HttpResponse, UdError> {
    let reply = manager.delete(&path.into_inner())?;
    Ok(reply_response(reply))
}

pub fn init_users_service(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("", web::post().to(create_user_handler))
            .route("", web::get().to(list_users_handler))
            .route("/{id}", web::get().to(get_user_handler))
            .route("/{id}", web::put().to(update_user_handler))
            .route("/{id}", web::delete().to(delete_user_handler)),
    );
}
