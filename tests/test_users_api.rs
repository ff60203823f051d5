use std::sync::Arc;

use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};
use userdir::{cli::config::Config, http, storage::memory::MemStore, Userdir};

fn new_userdir(config: Option<&Config>) -> Userdir {
    Userdir::new(Arc::new(MemStore::new()), config).unwrap()
}

macro_rules! test_app {
    ($ud:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(Arc::clone(&$ud.user_manager)))
                .app_data(web::Data::new(Arc::clone(&$ud.metrics_manager)))
                .configure(http::init_service),
        )
        .await
    };
}

fn config_from(value: Value) -> Config {
    serde_json::from_value(value).expect("test config should deserialize")
}

#[actix_rt::test]
async fn test_user_crud_lifecycle() {
    let ud = new_userdir(None);
    let app = test_app!(ud);

    // create
    let req = test::TestRequest::post().uri("/users").set_json(json!({ "name": "Alice", "age": 30 })).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["name"], "Alice");
    assert_eq!(created["age"], 30);

    // read it back
    let req = test::TestRequest::get().uri(&format!("/users/{}", id)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Value = test::read_body_json(resp).await;
    assert_eq!(fetched, created);

    // list
    let req = test::TestRequest::get().uri("/users").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let users: Value = test::read_body_json(resp).await;
    assert_eq!(users.as_array().unwrap().len(), 1);

    // partial update by default
    let req = test::TestRequest::put().uri(&format!("/users/{}", id)).set_json(json!({ "age": 31 })).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = test::read_body_json(resp).await;
    assert_eq!(updated["name"], "Alice");
    assert_eq!(updated["age"], 31);

    // delete returns the removed record by default
    let req = test::TestRequest::delete().uri(&format!("/users/{}", id)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let deleted: Value = test::read_body_json(resp).await;
    assert_eq!(deleted["id"], id.as_str());

    // delete is effective immediately
    let req = test::TestRequest::get().uri(&format!("/users/{}", id)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = test::read_body(resp).await;
    assert!(body.is_empty());
}

#[actix_rt::test]
async fn test_create_rejects_bad_payloads() {
    let ud = new_userdir(None);
    let app = test_app!(ud);

    let req = test::TestRequest::post().uri("/users").set_json(json!({ "email": "a@example.com" })).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("name"));

    // malformed JSON never reaches the user manager
    let req = test::TestRequest::post().uri("/users").set_payload("{not json").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_not_found_increments_counter() {
    let ud = new_userdir(None);
    let app = test_app!(ud);

    let req = test::TestRequest::get().uri("/users/12345").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(test::read_body(resp).await.is_empty());

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("http_requests_total{method=\"GET\",route=\"/users/:id\",status_code=\"404\"} 1"));
}

#[actix_rt::test]
async fn test_metrics_exposition_output() {
    let ud = new_userdir(None);
    let app = test_app!(ud);

    let req = test::TestRequest::post().uri("/users").set_json(json!({ "name": "Alice" })).to_request();
    test::call_service(&app, req).await;
    let req = test::TestRequest::get().uri("/users").to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("content-type").unwrap(), "text/plain; version=0.0.4");

    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("# HELP http_requests_total Total number of HTTP requests"));
    assert!(body.contains("# TYPE http_requests_total counter"));
    assert!(body.contains("http_requests_total{method=\"POST\",route=\"/users\",status_code=\"201\"} 1"));
    assert!(body.contains("http_requests_total{method=\"GET\",route=\"/users\",status_code=\"200\"} 1"));
    assert!(body.contains("# TYPE cpu_usage_percent gauge"));

    // the scrape itself is not counted by default
    assert!(!body.contains("route=\"/metrics\""));
}

#[actix_rt::test]
async fn test_instrumented_exposition_variant() {
    let config = config_from(json!({
        "listener": { "tcp": { "address": "127.0.0.1:3000" } },
        "storage": { "mem": {} },
        "instrument_exposition": true,
    }));
    let ud = new_userdir(Some(&config));
    let app = test_app!(ud);

    let req = test::TestRequest::get().uri("/metrics").to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("http_requests_total{method=\"GET\",route=\"/metrics\",status_code=\"200\"}"));
}

#[actix_rt::test]
async fn test_delete_without_body_variant() {
    let config = config_from(json!({
        "listener": { "tcp": { "address": "127.0.0.1:3000" } },
        "storage": { "mem": {} },
        "return_deleted_body": false,
    }));
    let ud = new_userdir(Some(&config));
    let app = test_app!(ud);

    let req = test::TestRequest::post().uri("/users").set_json(json!({ "name": "Alice" })).to_request();
    let resp = test::call_service(&app, req).await;
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::delete().uri(&format!("/users/{}", id)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(test::read_body(resp).await.is_empty());
}

#[actix_rt::test]
async fn test_strict_validation_variant() {
    let config = config_from(json!({
        "listener": { "tcp": { "address": "127.0.0.1:3000" } },
        "storage": { "mem": {} },
        "strict_validation": true,
    }));
    let ud = new_userdir(Some(&config));
    let app = test_app!(ud);

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({ "name": "Alice", "role": "admin" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("unknown field"));
}
