//! HTTP-level tests for screens: metadata decoding, category ownership,
//! partial updates and image handling.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, id_of, FilePart, TestApp, JPEG, PUBLIC_STORAGE};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

const METADATA_FIELDS: [&str; 6] = [
    "actions",
    "inputs",
    "static_content",
    "navigations",
    "states",
    "data",
];

struct Fixture {
    app: TestApp,
    project_id: String,
    category_id: String,
}

async fn fixture() -> Fixture {
    let app = TestApp::new().await;
    let project_id = id_of(&app.create_project("Mobile Banking").await);
    let category_id = id_of(&app.create_category(&project_id, "Authentication").await);
    Fixture {
        app,
        project_id,
        category_id,
    }
}

fn empty_value(field: &str) -> Value {
    if field == "data" {
        json!({})
    } else {
        json!([])
    }
}

#[tokio::test]
async fn metadata_submitted_as_json_strings_round_trips() {
    let Fixture {
        app,
        project_id,
        category_id,
    } = fixture().await;

    let actions = json!([{ "label": "Sign in", "event": "submit", "target": "dashboard" }]);
    let inputs = json!([
        { "label": "Email", "type": "email", "required": true },
        { "label": "Password", "type": "password", "required": true }
    ]);
    let static_content = json!(["Welcome back", "Forgot your password?"]);
    let navigations = json!([{ "label": "Create account", "target": "register" }]);
    let states = json!(["idle", "loading", "error"]);
    let data = json!({ "endpoint": "/auth/login", "remember_me": false });

    let (actions_s, inputs_s, static_s, nav_s, states_s, data_s) = (
        actions.to_string(),
        inputs.to_string(),
        static_content.to_string(),
        navigations.to_string(),
        states.to_string(),
        data.to_string(),
    );

    let response = app
        .multipart(
            Method::POST,
            "/api/screens",
            &[
                ("project_id", project_id.as_str()),
                ("category_id", category_id.as_str()),
                ("title", "Login"),
                ("type", "mobile"),
                ("purpose", "Authenticate returning users"),
                ("actions", actions_s.as_str()),
                ("inputs", inputs_s.as_str()),
                ("static_content", static_s.as_str()),
                ("navigations", nav_s.as_str()),
                ("states", states_s.as_str()),
                ("data", data_s.as_str()),
            ],
            &[],
        )
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Screen created successfully");
    assert_eq!(json["data"]["category"]["id"], category_id.as_str());
    let screen_id = id_of(&json["data"]);

    let response = app.get(&format!("/api/screens/{screen_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let screen = body_json(response).await["data"].clone();

    assert_eq!(screen["title"], "Login");
    assert_eq!(screen["type"], "mobile");
    assert_eq!(screen["purpose"], "Authenticate returning users");
    assert_eq!(screen["project_id"], project_id.as_str());
    assert_eq!(screen["actions"], actions);
    assert_eq!(screen["inputs"], inputs);
    assert_eq!(screen["static_content"], static_content);
    assert_eq!(screen["navigations"], navigations);
    assert_eq!(screen["states"], states);
    assert_eq!(screen["data"], data);
    assert_eq!(screen["category"]["name"], "Authentication");
}

#[tokio::test]
async fn malformed_metadata_is_stored_empty() {
    let Fixture {
        app,
        project_id,
        category_id,
    } = fixture().await;

    let mut fields = vec![
        ("project_id", project_id.as_str()),
        ("category_id", category_id.as_str()),
        ("title", "Broken"),
    ];
    fields.extend(METADATA_FIELDS.iter().map(|field| (*field, "{not json")));

    let response = app
        .multipart(Method::POST, "/api/screens", &fields, &[])
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let screen = body_json(response).await["data"].clone();
    for field in METADATA_FIELDS {
        assert_eq!(screen[field], empty_value(field), "field {field}");
    }
}

#[tokio::test]
async fn omitted_metadata_and_type_get_defaults() {
    let Fixture {
        app,
        project_id,
        category_id,
    } = fixture().await;

    let screen = app.create_screen(&project_id, &category_id, "Splash").await;

    assert_eq!(screen["type"], "web");
    assert!(screen["image_url"].is_null());
    for field in METADATA_FIELDS {
        assert_eq!(screen[field], empty_value(field), "field {field}");
    }
}

#[tokio::test]
async fn json_bodies_may_send_structured_metadata() {
    let Fixture {
        app,
        project_id,
        category_id,
    } = fixture().await;

    let response = app
        .post_json(
            "/api/screens",
            json!({
                "project_id": project_id,
                "category_id": category_id,
                "title": "Profile",
                "inputs": [{ "label": "Name", "type": "text", "required": false }],
                "data": "{\"avatar\": true}",
                "states": 5
            }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let screen = body_json(response).await["data"].clone();
    assert_eq!(
        screen["inputs"],
        json!([{ "label": "Name", "type": "text", "required": false }])
    );
    assert_eq!(screen["data"], json!({ "avatar": true }));
    assert_eq!(screen["states"], json!([]));
}

#[tokio::test]
async fn invalid_type_is_rejected() {
    let Fixture {
        app,
        project_id,
        category_id,
    } = fixture().await;

    let response = app
        .post_json(
            "/api/screens",
            json!({
                "project_id": project_id,
                "category_id": category_id,
                "title": "Kiosk",
                "type": "tv"
            }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await["message"],
        "The type field must be one of: web, mobile, other."
    );
}

#[tokio::test]
async fn category_from_another_project_is_refused() {
    let Fixture {
        app,
        project_id,
        category_id: _,
    } = fixture().await;
    let other_project = id_of(&app.create_project("Other").await);
    let foreign_category = id_of(&app.create_category(&other_project, "Foreign").await);

    let response = app
        .multipart(
            Method::POST,
            "/api/screens",
            &[
                ("project_id", project_id.as_str()),
                ("category_id", foreign_category.as_str()),
                ("title", "Misfiled"),
            ],
            &[FilePart::png("image")],
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(
        json["message"],
        "This category does not belong to the specified project"
    );
    assert_eq!(json["data"]["category_id"], foreign_category.as_str());
    assert_eq!(json["data"]["category_project_id"], other_project.as_str());
    assert_eq!(json["data"]["project_id"], project_id.as_str());

    let response = app.get("/api/screens").await;
    assert_eq!(body_json(response).await["data"], json!([]));
}

#[tokio::test]
async fn unknown_project_or_category_is_404() {
    let Fixture {
        app,
        project_id,
        category_id,
    } = fixture().await;
    let missing = "7d3c2a10-5b1e-4f6a-9d8c-0e1f2a3b4c5d";

    let response = app
        .post_json(
            "/api/screens",
            json!({ "project_id": missing, "category_id": category_id, "title": "Nowhere" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "Project not found");

    let response = app
        .post_json(
            "/api/screens",
            json!({ "project_id": project_id, "category_id": missing, "title": "Nowhere" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "Category not found");
}

#[tokio::test]
async fn update_without_metadata_keeps_stored_values() {
    let Fixture {
        app,
        project_id,
        category_id,
    } = fixture().await;
    let inputs = json!([{ "label": "Email", "type": "email", "required": true }]);
    let response = app
        .post_json(
            "/api/screens",
            json!({
                "project_id": project_id,
                "category_id": category_id,
                "title": "Login",
                "inputs": inputs.to_string(),
                "states": "[\"idle\"]"
            }),
        )
        .await;
    let screen_id = id_of(&body_json(response).await["data"]);

    let response = app
        .multipart(
            Method::PUT,
            &format!("/api/screens/{screen_id}"),
            &[("title", "Sign in"), ("states", "[\"idle\",\"busy\"]")],
            &[],
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Screen updated successfully");
    let screen = &json["data"];
    assert_eq!(screen["title"], "Sign in");
    assert_eq!(screen["inputs"], inputs);
    assert_eq!(screen["states"], json!(["idle", "busy"]));
    assert_eq!(screen["category"]["id"], category_id.as_str());
}

#[tokio::test]
async fn moving_to_a_category_of_the_same_project() {
    let Fixture {
        app,
        project_id,
        category_id,
    } = fixture().await;
    let screen_id = id_of(&app.create_screen(&project_id, &category_id, "Login").await);
    let sibling = id_of(&app.create_category(&project_id, "Account").await);
    let other_project = id_of(&app.create_project("Other").await);
    let foreign = id_of(&app.create_category(&other_project, "Foreign").await);

    let response = app
        .put_json(
            &format!("/api/screens/{screen_id}"),
            json!({
                "category_id": foreign,
                "title": "Moved login",
                "inputs": "[{\"label\":\"Email\"}]"
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.get(&format!("/api/screens/{screen_id}")).await;
    let unchanged = body_json(response).await["data"].clone();
    assert_eq!(unchanged["category_id"], category_id.as_str());
    assert_eq!(unchanged["title"], "Login");
    assert_eq!(unchanged["inputs"], json!([]));
    assert_eq!(unchanged["category"]["name"], "Authentication");

    let response = app
        .put_json(
            &format!("/api/screens/{screen_id}"),
            json!({ "category_id": sibling }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let screen = body_json(response).await["data"].clone();
    assert_eq!(screen["category_id"], sibling.as_str());
    assert_eq!(screen["category"]["name"], "Account");
}

#[tokio::test]
async fn list_screens_filters_by_project() {
    let Fixture {
        app,
        project_id,
        category_id,
    } = fixture().await;
    app.create_screen(&project_id, &category_id, "Login").await;
    app.create_screen(&project_id, &category_id, "Register").await;
    let other_project = id_of(&app.create_project("Other").await);
    let other_category = id_of(&app.create_category(&other_project, "Misc").await);
    app.create_screen(&other_project, &other_category, "Elsewhere").await;

    let response = app.get(&format!("/api/screens?project_id={project_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let screens = json["data"].as_array().unwrap();
    assert_eq!(screens.len(), 2);
    assert!(screens
        .iter()
        .all(|screen| screen["category"]["name"] == "Authentication"));

    let response = app.get("/api/screens").await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn screen_images_follow_the_screen_lifecycle() {
    let Fixture {
        app,
        project_id,
        category_id,
    } = fixture().await;

    let response = app
        .multipart(
            Method::POST,
            "/api/screens",
            &[
                ("project_id", project_id.as_str()),
                ("category_id", category_id.as_str()),
                ("title", "Login"),
            ],
            &[FilePart::png("image")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let screen = body_json(response).await["data"].clone();
    let screen_id = id_of(&screen);
    let first_url = screen["image_url"].as_str().unwrap().to_string();
    assert!(first_url.starts_with(&format!("{PUBLIC_STORAGE}/screens/")));
    let first_image = app.stored_path(&first_url);
    assert!(first_image.exists());

    let response = app
        .multipart(
            Method::POST,
            &format!("/api/screens/{screen_id}"),
            &[],
            &[FilePart {
                field: "image",
                file_name: "login.jpg",
                content_type: "image/jpeg",
                data: JPEG,
            }],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let second_url = body_json(response).await["data"]["image_url"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(second_url.ends_with(".jpg"));
    let second_image = app.stored_path(&second_url);
    assert!(second_image.exists());
    assert!(!first_image.exists());

    let response = app.delete(&format!("/api/screens/{screen_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Screen deleted successfully");
    assert!(json["data"].is_null());
    assert!(!second_image.exists());

    let response = app.get(&format!("/api/screens/{screen_id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_image_uploads_are_rejected() {
    let Fixture {
        app,
        project_id,
        category_id,
    } = fixture().await;
    let fields = [
        ("project_id", project_id.as_str()),
        ("category_id", category_id.as_str()),
        ("title", "Login"),
    ];

    let response = app
        .multipart(
            Method::POST,
            "/api/screens",
            &fields,
            &[FilePart {
                field: "image",
                file_name: "notes.txt",
                content_type: "text/plain",
                data: b"just some notes",
            }],
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await["message"],
        "The image field must be an image."
    );

    let response = app
        .multipart(
            Method::POST,
            "/api/screens",
            &fields,
            &[FilePart {
                field: "image",
                file_name: "fake.png",
                content_type: "image/png",
                data: b"definitely not a png",
            }],
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app.get("/api/screens").await;
    assert_eq!(body_json(response).await["data"], json!([]));
}

#[tokio::test]
async fn oversized_uploads_are_rejected() {
    let app = TestApp::with_upload_limit(1024).await;
    let project_id = id_of(&app.create_project("Portal").await);
    let category_id = id_of(&app.create_category(&project_id, "Auth").await);

    let mut large = common::PNG.to_vec();
    large.resize(4096, 0);

    let response = app
        .multipart(
            Method::POST,
            "/api/screens",
            &[
                ("project_id", project_id.as_str()),
                ("category_id", category_id.as_str()),
                ("title", "Huge"),
            ],
            &[FilePart {
                field: "image",
                file_name: "huge.png",
                content_type: "image/png",
                data: &large,
            }],
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await["message"],
        "The image field may not be greater than 1 kilobytes."
    );
}

#[tokio::test]
async fn title_cannot_be_cleared() {
    let Fixture {
        app,
        project_id,
        category_id,
    } = fixture().await;
    let screen_id = id_of(&app.create_screen(&project_id, &category_id, "Login").await);

    let response = app
        .put_json(&format!("/api/screens/{screen_id}"), json!({ "title": "" }))
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["message"], "The title field is required.");
}

#[tokio::test]
async fn catalog_scenario_from_project_to_cascade() {
    let app = TestApp::new().await;

    let response = app
        .post_json("/api/projects", json!({ "name": "Demo" }))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let project = body_json(response).await["data"].clone();
    assert_eq!(project["status"], "draft");
    let project_id = id_of(&project);

    let response = app
        .post_json(
            "/api/categories",
            json!({ "project_id": project_id, "name": "Main" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let category_id = id_of(&body_json(response).await["data"]);

    let response = app
        .multipart(
            Method::POST,
            "/api/screens",
            &[
                ("project_id", project_id.as_str()),
                ("category_id", category_id.as_str()),
                ("title", "Home"),
                ("actions", "[]"),
            ],
            &[],
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["actions"], json!([]));

    let response = app.delete(&format!("/api/projects/{project_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get(&format!("/api/categories/{category_id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
