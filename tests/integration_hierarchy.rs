mod common;

use axum::http::StatusCode;
use common::{open_session, send, test_app};
use feedbackhub_db::HierarchyStore;
use feedbackhub_models::{ConfigDocument, Institution, InstitutionId};
use serde_json::json;

fn hierarchy_uri(id: InstitutionId) -> String {
    format!("/api/institutions/{}/hierarchy", id)
}

fn session_uri(session: &str, rest: &str) -> String {
    format!("/api/hierarchy/sessions/{}{}", session, rest)
}

async fn put_tree(app: &common::TestApp, id: InstitutionId, tree: serde_json::Value) {
    let (status, body) = send(&app.router, "PUT", &hierarchy_uri(id), Some(tree)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
}

#[tokio::test]
async fn test_unknown_institution_gets_standard_default() {
    let app = test_app();
    let id = InstitutionId::new();

    let (status, body) = send(&app.router, "GET", &hierarchy_uri(id), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"]["kind"], "default");
    assert_eq!(body["source"]["name"], "standard");
    assert!(!body["tree"]["courses"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_institution_code_selects_default() {
    let app = test_app();
    let id = InstitutionId::new();
    app.store
        .upsert_institution(&Institution {
            id,
            name: "Northfield Business School".into(),
            code: Some("management".into()),
        })
        .await
        .unwrap();

    let (status, body) = send(&app.router, "GET", &hierarchy_uri(id), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"]["name"], "management");
    assert_eq!(body["tree"]["courses"][0]["name"], "MBA");
}

#[tokio::test]
async fn test_course_names_are_unique_ignoring_case() {
    let app = test_app();
    let id = InstitutionId::new();
    put_tree(&app, id, json!({"courses": []})).await;
    let session = open_session(&app.router, id).await;

    let (status, body) = send(
        &app.router,
        "POST",
        &session_uri(&session, "/courses"),
        Some(json!({"name": "Engineering"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["tree"]["courses"][0]["name"], "Engineering");

    let (status, body) = send(
        &app.router,
        "POST",
        &session_uri(&session, "/courses"),
        Some(json!({"name": "engineering"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field"], "name");
    assert_eq!(body["error"], "A course with this name already exists");

    let (status, body) = send(
        &app.router,
        "POST",
        &session_uri(&session, "/courses"),
        Some(json!({"name": "AI"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let courses = body["tree"]["courses"].as_array().unwrap();
    assert_eq!(courses.len(), 2);
    assert_eq!(courses[1]["name"], "AI");
}

#[tokio::test]
async fn test_year_with_departments_cannot_be_deleted() {
    let app = test_app();
    let id = InstitutionId::new();
    put_tree(
        &app,
        id,
        json!({"courses": [{"name": "CS", "years": [{"name": "1", "departments": [{"name": "IT"}]}]}]}),
    )
    .await;
    let session = open_session(&app.router, id).await;

    let (status, body) = send(
        &app.router,
        "DELETE",
        &session_uri(&session, "/courses/0/years/0"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("has existing departments")
    );

    let (status, _) = send(
        &app.router,
        "DELETE",
        &session_uri(&session, "/courses/0/years/0/departments/0"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app.router,
        "DELETE",
        &session_uri(&session, "/courses/0/years/0"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["tree"]["courses"][0]["years"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_saved_departments_appear_in_directory() {
    let app = test_app();
    let id = InstitutionId::new();
    put_tree(&app, id, json!({"courses": []})).await;
    let session = open_session(&app.router, id).await;

    for (uri, name) in [
        ("/courses", "MBA"),
        ("/courses/0/years", "1"),
        ("/courses/0/years/0/departments", "Finance"),
    ] {
        let (status, body) = send(
            &app.router,
            "POST",
            &session_uri(&session, uri),
            Some(json!({"name": name})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    let (status, report) = send(&app.router, "POST", &session_uri(&session, "/save"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["status"], "saved");
    assert_eq!(report["departments_created"], json!(["Finance"]));

    let (status, body) = send(
        &app.router,
        "GET",
        &format!("/api/institutions/{}/departments", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let departments = body.as_array().unwrap();
    assert_eq!(departments.len(), 1);
    assert_eq!(departments[0]["name"], "Finance");
    assert_eq!(departments[0]["code"], "finance");
}

#[tokio::test]
async fn test_session_lifecycle() {
    let app = test_app();
    let id = InstitutionId::new();
    let session = open_session(&app.router, id).await;

    let (status, body) = send(&app.router, "GET", &session_uri(&session, ""), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["save_state"], "idle");
    assert_eq!(body["source"]["kind"], "default");

    let (status, body) = send(
        &app.router,
        "POST",
        &session_uri(&session, "/courses/0/years/0/departments/0/subjects"),
        Some(json!({"name": "Statistics (Advanced)", "code": "STA201", "type": "Practical"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let subjects = body["tree"]["courses"][0]["years"][0]["departments"][0]["subjects"]
        .as_array()
        .unwrap();
    let added = subjects.last().unwrap();
    assert_eq!(added["code"], "STA201");
    assert_eq!(added["type"], "Practical");
    assert_eq!(added["batches"], json!(["A", "B", "C", "D"]));

    let (status, body) = send(&app.router, "POST", &session_uri(&session, "/save"), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (_, body) = send(&app.router, "GET", &session_uri(&session, ""), None).await;
    assert_eq!(body["save_state"], "saved");
    assert_eq!(body["source"]["kind"], "stored");
    assert_eq!(body["last_save"]["status"], "saved");

    let (_, body) = send(&app.router, "GET", &hierarchy_uri(id), None).await;
    assert_eq!(body["source"]["kind"], "stored");

    let (status, _) = send(&app.router, "DELETE", &session_uri(&session, ""), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app.router, "GET", &session_uri(&session, ""), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_session_and_selection_are_not_found() {
    let app = test_app();
    let unknown = InstitutionId::new().to_string();

    let (status, body) = send(
        &app.router,
        "POST",
        &session_uri(&unknown, "/courses"),
        Some(json!({"name": "MBA"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));

    let session = open_session(&app.router, InstitutionId::new()).await;
    let (status, body) = send(
        &app.router,
        "PUT",
        &session_uri(&session, "/courses/42"),
        Some(json!({"name": "MBA"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Invalid selection: course 42 does not exist");
}

#[tokio::test]
async fn test_reserved_and_malformed_names_are_rejected() {
    let app = test_app();
    let session = open_session(&app.router, InstitutionId::new()).await;

    for name in ["Admin", "X", "Maths!"] {
        let (status, body) = send(
            &app.router,
            "POST",
            &session_uri(&session, "/courses"),
            Some(json!({"name": name})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{name}: {body}");
        assert_eq!(body["field"], "name");
    }

    let (status, body) = send(
        &app.router,
        "POST",
        &session_uri(&session, "/courses/0/years"),
        Some(json!({"name": "Fifth"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Year must be one of: 1, 2, 3, 4");
}

#[tokio::test]
async fn test_put_rejects_invalid_tree() {
    let app = test_app();
    let id = InstitutionId::new();

    let (status, body) = send(
        &app.router,
        "PUT",
        &hierarchy_uri(id),
        Some(json!({"courses": [{"name": "CS", "years": [{"name": "1"}, {"name": " 1 "}]}]})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["field"].as_str().unwrap().starts_with("CS"));
    assert!(app.store.get_config(id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_legacy_subject_lists_load_with_default_batches() {
    let app = test_app();
    let id = InstitutionId::new();
    app.store
        .upsert_config(
            id,
            &ConfigDocument {
                course_index: json!({"courses": [{
                    "name": "BCom",
                    "years": ["1"],
                    "departments": {"1": ["Accounts"]}
                }]}),
                subject_table: json!({"BCom": {"1": {"Accounts": ["Auditing", "Taxation"]}}}),
                updated_at: None,
            },
        )
        .await
        .unwrap();

    let (status, body) = send(&app.router, "GET", &hierarchy_uri(id), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"]["kind"], "stored");
    let subjects = &body["tree"]["courses"][0]["years"][0]["departments"][0]["subjects"];
    assert_eq!(subjects[0]["name"], "Auditing");
    assert_eq!(subjects[0]["type"], "Theory");
    assert_eq!(subjects[0]["code"], "");
    assert_eq!(subjects[1]["batches"], json!(["A", "B", "C", "D"]));
}

#[tokio::test]
async fn test_catalog_cascades_through_saved_hierarchy() {
    let app = test_app();
    let id = InstitutionId::new();
    put_tree(
        &app,
        id,
        json!({"courses": [{
            "name": "B Tech",
            "years": [{"name": "2", "departments": [{
                "name": "Mechanical",
                "subjects": [{"name": "Thermodynamics", "code": "ME201", "type": "Theory", "batches": ["M1", "M2"]}]
            }]}]
        }]}),
    )
    .await;

    let base = format!("/api/institutions/{}/catalog/courses", id);
    let (_, courses) = send(&app.router, "GET", &base, None).await;
    assert_eq!(courses, json!(["B Tech"]));

    let (_, years) = send(&app.router, "GET", &format!("{base}/B%20Tech/years"), None).await;
    assert_eq!(years, json!(["2"]));

    let (_, departments) = send(
        &app.router,
        "GET",
        &format!("{base}/B%20Tech/years/2/departments"),
        None,
    )
    .await;
    assert_eq!(departments, json!(["Mechanical"]));

    let (_, subjects) = send(
        &app.router,
        "GET",
        &format!("{base}/B%20Tech/years/2/departments/Mechanical/subjects"),
        None,
    )
    .await;
    assert_eq!(subjects[0]["code"], "ME201");

    let (_, batches) = send(
        &app.router,
        "GET",
        &format!("{base}/B%20Tech/years/2/departments/Mechanical/subjects/Thermodynamics/batches"),
        None,
    )
    .await;
    assert_eq!(batches, json!(["M1", "M2"]));

    let (status, unknown) = send(&app.router, "GET", &format!("{base}/MBA/years"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unknown, json!([]));
}
