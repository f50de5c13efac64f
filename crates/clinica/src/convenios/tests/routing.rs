use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use super::common::*;

fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

#[tokio::test]
async fn register_returns_created_view() {
    let response = router()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/convenios",
            json!({ "nombre": "Seguros Caracas", "rif": "v-12345678-1" }),
        ))
        .await
        .expect("router responds");

    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["rif"], "V123456781");
    assert_eq!(body["rif_formateado"], "V-12345678-1");
    assert_eq!(body["activo"], true);
    assert!(body.get("correo").is_none());
}

#[tokio::test]
async fn invalid_rif_is_unprocessable() {
    let response = router()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/convenios",
            json!({ "nombre": "Seguros Caracas", "rif": "V123456780" }),
        ))
        .await
        .expect("router responds");

    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("expected 1"));
}

#[tokio::test]
async fn full_lifecycle_over_http() {
    let app = router();

    let created = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/convenios",
            json!({ "nombre": "Seguros Caracas", "rif": "J123456784" }),
        ))
        .await
        .expect("router responds");
    let (_, created) = read_json(created).await;
    let id = created["id"].as_str().expect("id").to_string();

    let duplicate = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/convenios",
            json!({ "nombre": "Copia", "rif": "J-12345678-4" }),
        ))
        .await
        .expect("router responds");
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let updated = app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &format!("/api/v1/convenios/{id}"),
            json!({ "nombre": "Seguros Caracas C.A.", "rif": "J123456784", "direccion": "Chacao" }),
        ))
        .await
        .expect("router responds");
    let (status, updated) = read_json(updated).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["direccion"], "Chacao");

    let removed = app
        .clone()
        .oneshot(empty_request(
            Method::DELETE,
            &format!("/api/v1/convenios/{id}"),
        ))
        .await
        .expect("router responds");
    let (status, removed) = read_json(removed).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["activo"], false);

    let active = app
        .clone()
        .oneshot(empty_request(Method::GET, "/api/v1/convenios?activos=true"))
        .await
        .expect("router responds");
    let (_, active) = read_json(active).await;
    assert_eq!(active, json!([]));

    let all = app
        .oneshot(empty_request(Method::GET, "/api/v1/convenios"))
        .await
        .expect("router responds");
    let (_, all) = read_json(all).await;
    assert_eq!(all.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn unknown_convenio_is_not_found() {
    let response = router()
        .oneshot(empty_request(Method::GET, "/api/v1/convenios/conv-404"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
