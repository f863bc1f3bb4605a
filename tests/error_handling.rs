//! Response envelope and error mapping shared by every endpoint.

mod common;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Request, StatusCode};
use common::{body_bytes, body_json, TestApp};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = TestApp::new().await;

    let response = app
        .send(
            Request::post("/api/projects")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from("{\"name\": "))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json["message"]
        .as_str()
        .unwrap()
        .starts_with("Malformed JSON body"));
}

#[tokio::test]
async fn non_object_json_is_a_bad_request() {
    let app = TestApp::new().await;

    let response = app
        .post_json("/api/projects", serde_json::json!(["name", "Portal"]))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "Request body must be a JSON object"
    );
}

#[tokio::test]
async fn url_encoded_forms_are_accepted() {
    let app = TestApp::new().await;

    let response = app
        .send(
            Request::post("/api/projects")
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("name=Form+Project&price=12.5&_token=abc"))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Form Project");
    assert_eq!(json["data"]["price"], 12.5);
}

#[tokio::test]
async fn error_envelope_has_a_null_data_member() {
    let app = TestApp::new().await;

    let response = app
        .get("/api/categories/3e0c4f7a-2b1d-4e8f-a9c6-5d4b3a2f1e0d")
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(
        json,
        serde_json::json!({
            "success": false,
            "message": "Category not found",
            "data": null
        })
    );
}

#[tokio::test]
async fn home_page_and_api_docs_are_served() {
    let app = TestApp::new().await;

    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("Screen Catalog"));

    let response = app.get("/api-docs/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);
    let doc = body_json(response).await;
    assert_eq!(doc["info"]["title"], "Screen Catalog API");
    assert!(doc["paths"]["/api/screens/{id}"].is_object());
    assert!(doc["paths"]["/api/projects/{id}/categories"].is_object());
}

#[tokio::test]
async fn malformed_ids_in_path_or_query_use_the_envelope() {
    let app = TestApp::new().await;

    for uri in [
        "/api/screens/not-a-uuid",
        "/api/projects/12345",
        "/api/categories/xyz",
        "/api/screens?project_id=not-a-uuid",
        "/api/categories?project_id=42",
    ] {
        let response = app.get(uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        let json = body_json(response).await;
        assert_eq!(json["success"], false, "{uri}");
        assert!(json["message"].is_string(), "{uri}");
        assert!(json["data"].is_null(), "{uri}");
    }

    let response = app.delete("/api/projects/not-a-uuid").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], false);
}
