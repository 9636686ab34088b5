// tests/faculty_tests.rs

use std::sync::Arc;

use learning_portal::{
    config::Config,
    database::MemoryDocumentStore,
    models::user::{Identity, Role},
    routes,
    state::AppState,
    utils::jwt::sign_jwt,
};
use serde_json::{Value, json};

const SECRET: &str = "faculty_test_secret";

struct TestApp {
    address: String,
    store: Arc<MemoryDocumentStore>,
    client: reqwest::Client,
    token: String,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}/api/faculty{}", self.address, path)
    }

    async fn post(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    async fn put(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .put(self.url(path))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    async fn get_json(&self, path: &str) -> Value {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 200, "GET {}", path);
        response.json().await.unwrap()
    }

    async fn create_material(&self, body: Value) -> Value {
        let response = self.post("/materials", body).await;
        assert_eq!(response.status().as_u16(), 201);
        response.json().await.unwrap()
    }
}

fn token(role: Role) -> String {
    let identity = Identity {
        uid: "kulkarni".to_string(),
        display_name: "Mrs. Kulkarni".to_string(),
        email: "kulkarni@example.com".to_string(),
        role,
    };
    sign_jwt(&identity, SECRET, 600).unwrap()
}

async fn spawn_app() -> TestApp {
    let config = Config {
        database_url: None,
        jwt_secret: SECRET.to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        quiz_catalog_path: None,
        curriculum_path: None,
        cors_origins: vec![],
    };

    let store = Arc::new(MemoryDocumentStore::new());
    let state = AppState::build(config, store.clone())
        .await
        .expect("Failed to build app state");
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        store,
        client: reqwest::Client::new(),
        token: token(Role::Teacher),
    }
}

#[tokio::test]
async fn students_cannot_reach_faculty_routes() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/materials"))
        .bearer_auth(token(Role::Student))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn material_defaults_and_sanitized_content() {
    let app = spawn_app().await;

    let material = app
        .create_material(json!({
            "content": "<p>Ionic bonds<script>alert(1)</script></p>",
            "tags": ["bonding", " bonding ", "class10"]
        }))
        .await;

    assert_eq!(material["title"], "Untitled Material");
    assert_eq!(material["subject"], "Mathematics");
    assert_eq!(material["type"], "notes");
    assert_eq!(material["status"], "draft");
    assert_eq!(material["version"], 1);
    assert_eq!(material["content"], "<p>Ionic bonds</p>");
    assert_eq!(material["tags"], json!(["bonding", "class10"]));
}

#[tokio::test]
async fn blank_titles_and_names_are_rejected() {
    let app = spawn_app().await;

    let material = app.post("/materials", json!({ "title": "   " })).await;
    assert_eq!(material.status().as_u16(), 400);

    let student = app
        .post("/students", json!({ "name": " \t ", "grade": "10", "section": "A" }))
        .await;
    assert_eq!(student.status().as_u16(), 400);

    let assessment = app
        .post("/assessments", json!({ "title": "  ", "date": "2024-08-10" }))
        .await;
    assert_eq!(assessment.status().as_u16(), 400);

    let created = app.create_material(json!({ "title": "Circle Theorems" })).await;
    let id = created["id"].as_str().unwrap();
    let renamed = app.put(&format!("/materials/{}", id), json!({ "title": " " })).await;
    assert_eq!(renamed.status().as_u16(), 400);
    assert_eq!(
        app.get_json(&format!("/materials/{}", id)).await["title"],
        "Circle Theorems"
    );
}

#[tokio::test]
async fn filter_matches_tags_and_keeps_insertion_order() {
    let app = spawn_app().await;

    app.create_material(json!({ "title": "Trigonometric Functions", "type": "presentation" }))
        .await;
    let tagged = app
        .create_material(json!({
            "title": "Linear Equations Worksheet",
            "type": "worksheet",
            "tags": ["algebra"]
        }))
        .await;
    app.create_material(json!({ "title": "Motion and Forces", "subject": "Science", "type": "video" }))
        .await;

    let all = app.get_json("/materials?q=&subject=all&type=all").await;
    let titles: Vec<&str> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["title"].as_str().unwrap())
        .collect();
    assert_eq!(
        titles,
        vec!["Trigonometric Functions", "Linear Equations Worksheet", "Motion and Forces"]
    );

    let algebra = app.get_json("/materials?q=algebra").await;
    assert_eq!(algebra.as_array().unwrap().len(), 1);
    assert_eq!(algebra[0]["id"], tagged["id"]);

    let videos = app.get_json("/materials?type=video&subject=Science").await;
    assert_eq!(videos.as_array().unwrap().len(), 1);

    let stats = app.get_json("/materials/stats").await;
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["by_subject"]["Mathematics"], 2);
    assert_eq!(stats["by_type"]["video"], 1);
}

#[tokio::test]
async fn publishing_keeps_identity_and_advances_date() {
    let app = spawn_app().await;
    let material = app.create_material(json!({ "title": "Chemical Bonding" })).await;
    let id = material["id"].as_str().unwrap();

    let response = app
        .put(&format!("/materials/{}", id), json!({ "status": "published" }))
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let updated: Value = response.json().await.unwrap();

    assert_eq!(updated["id"], material["id"]);
    assert_eq!(updated["date_created"], material["date_created"]);
    assert_ne!(updated["date_updated"], material["date_updated"]);
    assert_eq!(updated["status"], "published");
    assert_eq!(updated["version"], 2);

    let stale = app
        .put(
            &format!("/materials/{}", id),
            json!({ "title": "Overwrite", "expected_version": 1 }),
        )
        .await;
    assert_eq!(stale.status().as_u16(), 409);
}

#[tokio::test]
async fn failed_write_is_503_and_state_is_kept() {
    let app = spawn_app().await;
    let material = app.create_material(json!({ "title": "Freedom Movement Timeline" })).await;
    let id = material["id"].as_str().unwrap().to_string();

    app.store.set_fail_writes(true);

    let response = app
        .put(&format!("/materials/{}", id), json!({ "status": "published" }))
        .await;
    assert_eq!(response.status().as_u16(), 503);

    let create = app.post("/materials", json!({ "title": "Never stored" })).await;
    assert_eq!(create.status().as_u16(), 503);

    app.store.set_fail_writes(false);

    let current = app.get_json(&format!("/materials/{}", id)).await;
    assert_eq!(current["status"], "draft");
    assert_eq!(current["version"], 1);
    assert_eq!(app.get_json("/materials").await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn deleting_selected_material_clears_selection() {
    let app = spawn_app().await;
    let material = app.create_material(json!({ "title": "Geometry Notes" })).await;
    let id = material["id"].as_str().unwrap();

    let selected = app.put(&format!("/materials/{}/select", id), json!({})).await;
    assert_eq!(selected.status().as_u16(), 200);
    assert_eq!(app.get_json("/materials/selected").await["id"], material["id"]);

    let deleted = app
        .client
        .delete(app.url(&format!("/materials/{}", id)))
        .bearer_auth(&app.token)
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 204);

    let none = app
        .client
        .get(app.url("/materials/selected"))
        .bearer_auth(&app.token)
        .send()
        .await
        .unwrap();
    assert_eq!(none.status().as_u16(), 404);
}

#[tokio::test]
async fn leaderboard_ranks_ties_in_roster_order() {
    let app = spawn_app().await;

    for (id, name, progress) in [("a", "Aarav", 50.0), ("b", "Bhavna", 90.0), ("c", "Chirag", 90.0)] {
        let response = app
            .post(
                "/students",
                json!({ "id": id, "name": name, "grade": "10", "section": "A", "progress": progress }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201);
    }

    let board = app.get_json("/leaderboard").await;
    let order: Vec<(&str, u64)> = board
        .as_array()
        .unwrap()
        .iter()
        .map(|r| (r["id"].as_str().unwrap(), r["rank"].as_u64().unwrap()))
        .collect();
    assert_eq!(order, vec![("b", 1), ("c", 2), ("a", 3)]);

    let response = app.put("/students/a", json!({ "progress": 99.0 })).await;
    assert_eq!(response.status().as_u16(), 200);

    let board = app.get_json("/leaderboard").await;
    assert_eq!(board[0]["id"], "a");
    assert_eq!(board[0]["movement"], 2);
    assert_eq!(board[0]["direction"], "up");
    assert_eq!(board[1]["direction"], "down");
}

#[tokio::test]
async fn analytics_reflect_roster_assessments_and_activity() {
    let app = spawn_app().await;

    app.post(
        "/students",
        json!({
            "name": "Aarav",
            "grade": "10",
            "section": "A",
            "progress": 42.0,
            "attendance": 73.0,
            "areas_of_concern": ["Algebra", "Physics"]
        }),
    )
    .await;
    app.post(
        "/students",
        json!({
            "name": "Bhavna",
            "grade": "10",
            "section": "A",
            "progress": 92.0,
            "attendance": 95.0,
            "areas_of_concern": ["Physics"]
        }),
    )
    .await;

    let created = app
        .post(
            "/assessments",
            json!({
                "title": "Mathematics Monthly Test",
                "date": "2024-08-10",
                "type": "test",
                "questions": [{
                    "id": "q1",
                    "question": "2 + 2?",
                    "options": ["3", "4"],
                    "correct_answer": 1,
                    "explanation": "Basic addition."
                }]
            }),
        )
        .await;
    assert_eq!(created.status().as_u16(), 201);

    let bad_key = app
        .post(
            "/assessments",
            json!({
                "title": "Broken",
                "date": "2024-08-11",
                "questions": [{
                    "id": "q1",
                    "question": "?",
                    "options": ["a", "b"],
                    "correct_answer": 5,
                    "explanation": ""
                }]
            }),
        )
        .await;
    assert_eq!(bad_key.status().as_u16(), 400);

    let analytics = app.get_json("/analytics").await;
    assert_eq!(analytics["student_count"], 2);
    assert_eq!(analytics["average_progress"], 67.0);
    assert_eq!(analytics["performance"]["low"], 1);
    assert_eq!(analytics["performance"]["high"], 1);
    assert_eq!(analytics["performance"]["attendance_issues"], 1);
    assert_eq!(analytics["topics_trouble"], json!(["Physics"]));
    assert_eq!(analytics["upcoming_assessments"][0]["progress"], 0.0);

    let activity = analytics["recent_activity"].as_array().unwrap();
    assert_eq!(activity.len(), 3);
    assert_eq!(activity[0]["title"], "New Assessment Created");
    assert_eq!(
        activity[0]["description"],
        "Mathematics Monthly Test scheduled for 2024-08-10"
    );
    assert_eq!(activity[2]["title"], "New Student Added");
}
