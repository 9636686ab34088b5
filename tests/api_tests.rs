// tests/api_tests.rs

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

const SECRET: &str = "test_secret_for_integration_tests";

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> String {
    spawn_app_with_store().await.0
}

/// Same as `spawn_app`, also handing back the document store so a test
/// can make writes fail.
async fn spawn_app_with_store() -> (String, Arc<MemoryDocumentStore>) {
    let config = Config {
        database_url: None,
        jwt_secret: SECRET.to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        quiz_catalog_path: None,
        curriculum_path: None,
        cors_origins: vec!["http://localhost:5173".to_string()],
    };

    let store = Arc::new(MemoryDocumentStore::new());
    let state = AppState::build(config, store.clone())
        .await
        .expect("Failed to build app state");

    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, store)
}

fn token(uid: &str, role: Role) -> String {
    let identity = Identity {
        uid: uid.to_string(),
        display_name: format!("User {}", uid),
        email: format!("{}@example.com", uid),
        role,
    };
    sign_jwt(&identity, SECRET, 600).unwrap()
}

async fn post_step(client: &reqwest::Client, address: &str, sid: &str, step: &str, token: &str) -> Value {
    let response = client
        .post(format!("{}/api/sessions/{}/{}", address, sid, step))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200, "step {} failed", step);
    response.json().await.unwrap()
}

async fn answer(client: &reqwest::Client, address: &str, sid: &str, option: usize, token: &str) -> Value {
    let response = client
        .post(format!("{}/api/sessions/{}/select", address, sid))
        .bearer_auth(token)
        .json(&json!({ "option": option }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);
    post_step(client, address, sid, "submit", token).await
}

async fn start(client: &reqwest::Client, address: &str, quiz_id: &str, token: &str) -> String {
    let response = client
        .post(format!("{}/api/quizzes/{}/sessions", address, quiz_id))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    body["session_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_check_works() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/health", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .request(reqwest::Method::OPTIONS, format!("{}/api/quizzes", address))
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "GET")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:5173"
    );
}

#[tokio::test]
async fn unknown_path_is_404() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn quizzes_require_a_valid_token() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let missing = client
        .get(format!("{}/api/quizzes", address))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 401);

    let forged = client
        .get(format!("{}/api/quizzes", address))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(forged.status().as_u16(), 401);
}

#[tokio::test]
async fn quiz_listing_filters_and_hides_answers() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = token("learner", Role::Student);

    let math: Vec<Value> = client
        .get(format!("{}/api/quizzes?subject=math", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(math.len(), 2);
    assert!(math.iter().all(|q| q["subject"] == "math"));

    let quiz: Value = client
        .get(format!("{}/api/quizzes/math-algebra-1", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(quiz["questions"].as_array().unwrap().len(), 5);
    assert!(quiz["questions"][0].get("correct_answer").is_none());
    assert!(quiz["questions"][0].get("explanation").is_none());

    let missing = client
        .get(format!("{}/api/quizzes/no-such-quiz", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn perfect_run_scores_full_marks_and_records_result() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = token("learner", Role::Student);
    let sid = start(&client, &address, "math-algebra-1", &token).await;

    let key = [0, 0, 1, 0, 1];
    let mut last = Value::Null;
    for (i, option) in key.iter().enumerate() {
        let revealed = answer(&client, &address, &sid, *option, &token).await;
        assert_eq!(revealed["phase"], json!({ "state": "revealed", "index": i }));
        assert_eq!(revealed["reveal"]["is_correct"], true);
        last = post_step(&client, &address, &sid, "next", &token).await;
    }

    assert_eq!(last["phase"]["state"], "completed");
    assert_eq!(last["score"], 5);
    assert_eq!(last["result"]["percentage"], 100);
    assert_eq!(last["result"]["tier"], "excellent");
    assert_eq!(last["recorded"]["attempts"], 1);

    let results: Vec<Value> = client
        .get(format!("{}/api/profile/me/results", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["quiz_id"], "math-algebra-1");
    assert_eq!(results[0]["percentage"], 100);
}

#[tokio::test]
async fn three_of_five_is_good_effort() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = token("learner", Role::Student);
    let sid = start(&client, &address, "math-algebra-1", &token).await;

    // correct, correct, wrong, correct, wrong
    let picks = [0, 0, 0, 0, 0];
    let mut last = Value::Null;
    for option in picks {
        answer(&client, &address, &sid, option, &token).await;
        last = post_step(&client, &address, &sid, "next", &token).await;
    }

    assert_eq!(last["score"], 3);
    assert_eq!(last["result"]["percentage"], 60);
    assert_eq!(last["result"]["tier"], "good_effort");

    let review: Vec<Value> = client
        .get(format!("{}/api/sessions/{}/review", address, sid))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let correct: Vec<bool> = review.iter().map(|r| r["is_correct"].as_bool().unwrap()).collect();
    assert_eq!(correct, vec![true, true, false, true, false]);
}

#[tokio::test]
async fn previous_then_next_restores_revealed_state() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = token("learner", Role::Student);
    let sid = start(&client, &address, "science-physics-1", &token).await;

    answer(&client, &address, &sid, 2, &token).await;
    let before = post_step(&client, &address, &sid, "next", &token).await;
    assert_eq!(before["phase"], json!({ "state": "answering", "index": 1 }));

    let back = post_step(&client, &address, &sid, "previous", &token).await;
    assert_eq!(back["phase"], json!({ "state": "revealed", "index": 0 }));
    assert_eq!(back["candidate"], 2);
    assert_eq!(back["score"], 1);

    let forward = post_step(&client, &address, &sid, "next", &token).await;
    assert_eq!(forward["phase"], before["phase"]);
    assert_eq!(forward["score"], before["score"]);
}

#[tokio::test]
async fn reset_returns_to_first_question() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = token("learner", Role::Student);
    let sid = start(&client, &address, "science-chemistry-1", &token).await;

    answer(&client, &address, &sid, 3, &token).await;
    post_step(&client, &address, &sid, "next", &token).await;

    let reset = post_step(&client, &address, &sid, "reset", &token).await;
    assert_eq!(reset["phase"], json!({ "state": "answering", "index": 0 }));
    assert_eq!(reset["score"], 0);
    assert!(reset["candidate"].is_null());
}

#[tokio::test]
async fn sessions_are_private_to_their_owner() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let owner = token("owner", Role::Student);
    let other = token("other", Role::Student);
    let sid = start(&client, &address, "math-geometry-1", &owner).await;

    let response = client
        .get(format!("{}/api/sessions/{}", address, sid))
        .bearer_auth(&other)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn out_of_range_option_is_rejected() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = token("learner", Role::Student);
    let sid = start(&client, &address, "math-algebra-1", &token).await;

    let response = client
        .post(format!("{}/api/sessions/{}/select", address, sid))
        .bearer_auth(&token)
        .json(&json!({ "option": 7 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn unsaved_result_can_be_recorded_later() {
    let (address, store) = spawn_app_with_store().await;
    let client = reqwest::Client::new();
    let token = token("learner", Role::Student);
    let sid = start(&client, &address, "math-algebra-1", &token).await;

    let key = [0, 0, 1, 0, 1];
    for option in &key[..4] {
        answer(&client, &address, &sid, *option, &token).await;
        post_step(&client, &address, &sid, "next", &token).await;
    }
    answer(&client, &address, &sid, key[4], &token).await;

    store.set_fail_writes(true);
    let finished = post_step(&client, &address, &sid, "next", &token).await;
    assert_eq!(finished["phase"]["state"], "completed");
    assert_eq!(finished["score"], 5);
    assert_eq!(finished["result_pending"], true);
    assert!(finished["record_error"].is_string());
    assert!(finished.get("recorded").is_none());

    let still_failing = client
        .post(format!("{}/api/sessions/{}/record", address, sid))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(still_failing.status().as_u16(), 503);

    store.set_fail_writes(false);

    let session: Value = client
        .get(format!("{}/api/sessions/{}", address, sid))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(session["result_pending"], true);

    let retried = post_step(&client, &address, &sid, "record", &token).await;
    assert_eq!(retried["recorded"]["percentage"], 100);
    assert_eq!(retried["recorded"]["attempts"], 1);
    assert_eq!(retried["result_pending"], false);

    let again = client
        .post(format!("{}/api/sessions/{}/record", address, sid))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(again.status().as_u16(), 400);

    let results: Vec<Value> = client
        .get(format!("{}/api/profile/me/results", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["quiz_id"], "math-algebra-1");
}

#[tokio::test]
async fn curriculum_lists_subjects_and_serves_topics() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = token("learner", Role::Student);

    let unauthenticated = client
        .get(format!("{}/api/curriculum", address))
        .send()
        .await
        .unwrap();
    assert_eq!(unauthenticated.status().as_u16(), 401);

    let subjects: Vec<Value> = client
        .get(format!("{}/api/curriculum", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ids: Vec<&str> = subjects.iter().map(|s| s["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["math", "science", "history", "language", "geography"]);
    assert_eq!(subjects[0]["topic_count"], 4);

    let lenses: Vec<Value> = client
        .get(format!("{}/api/curriculum?q=lenses", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(lenses.len(), 1);
    assert_eq!(lenses[0]["id"], "science");
    assert_eq!(lenses[0]["topics"][0]["id"], "physics");

    let algebra: Value = client
        .get(format!("{}/api/curriculum/math/algebra", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(algebra["subject_name"], "Mathematics");
    assert_eq!(algebra["name"], "Algebra");
    assert_eq!(algebra["resources"].as_array().unwrap().len(), 4);
    assert_eq!(algebra["resources"][3]["type"], "link");
    assert_eq!(algebra["quizzes"][0]["id"], "math-algebra-1");

    let missing = client
        .get(format!("{}/api/curriculum/math/calculus", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}
