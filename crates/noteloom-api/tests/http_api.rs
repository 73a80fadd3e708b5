use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{Value, json};

use noteloom_api::auth::{AppStateInner, create_token};
use noteloom_api::throttle::RateLimiter;
use noteloom_db::Database;

struct TestApp {
    base: String,
    client: reqwest::Client,
}

async fn spawn_app() -> TestApp {
    let state = Arc::new(AppStateInner {
        db: Database::open_in_memory().expect("open db"),
        jwt_secret: "test-secret".into(),
        token_ttl: chrono::Duration::hours(1),
        notes_per_page: 6,
        rate_limiter: RateLimiter::per_minute(60),
    });
    let app = noteloom_api::router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });

    TestApp {
        base: format!("http://{}", addr),
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn register(&self, name: &str, email: &str) -> String {
        let resp = self
            .client
            .post(self.url("/auth/register"))
            .json(&json!({ "name": name, "email": email, "password": "correct-horse" }))
            .send()
            .await
            .expect("register request");
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = resp.json().await.expect("register body");
        body["token"].as_str().expect("token").to_string()
    }

    async fn create_note(&self, token: &str, title: &str, content: &str, important: bool) -> Value {
        let resp = self
            .client
            .post(self.url("/notes"))
            .bearer_auth(token)
            .json(&json!({ "title": title, "content": content, "is_important": important }))
            .send()
            .await
            .expect("create request");
        assert_eq!(resp.status(), StatusCode::CREATED);
        resp.json().await.expect("note body")
    }

    async fn get(&self, token: &str, path: &str) -> (StatusCode, Value) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request");
        let status = resp.status();
        let body = resp.json().await.unwrap_or(Value::Null);
        (status, body)
    }

    async fn list_titles(&self, token: &str, path: &str) -> Vec<String> {
        let (status, body) = self.get(token, path).await;
        assert_eq!(status, StatusCode::OK);
        body["notes"]
            .as_array()
            .expect("notes array")
            .iter()
            .map(|n| n["title"].as_str().expect("title").to_string())
            .collect()
    }
}

#[tokio::test]
async fn register_then_login() {
    let app = spawn_app().await;
    app.register("Demo User", "Demo@Noteloom.com").await;

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&json!({ "email": "demo@noteloom.com", "password": "correct-horse" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["name"], "Demo User");
    assert!(body["token"].as_str().is_some());

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&json!({ "email": "demo@noteloom.com", "password": "wrong-horse" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "invalid_credentials");
}

#[tokio::test]
async fn register_rejects_duplicates_and_bad_input() {
    let app = spawn_app().await;
    app.register("Demo User", "demo@noteloom.com").await;

    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&json!({ "name": "Again", "email": "demo@noteloom.com", "password": "correct-horse" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&json!({ "name": "", "email": "not-an-email", "password": "short" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
    for field in ["name", "email", "password"] {
        assert!(body["fields"][field].is_array(), "missing error for {field}");
    }
}

#[tokio::test]
async fn note_routes_require_a_token() {
    let app = spawn_app().await;

    let resp = app.client.get(app.url("/notes")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("garbage", "/dashboard").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let resp = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn importance_sort_end_to_end() {
    let app = spawn_app().await;
    let token = app.register("Demo User", "demo@noteloom.com").await;

    app.create_note(&token, "Regular Note", "This is a regular note.", false).await;
    app.create_note(&token, "Important Note", "This one really matters.", true).await;

    let titles = app.list_titles(&token, "/notes?sort=importance").await;
    assert_eq!(titles.first().map(String::as_str), Some("Important Note"));
    assert_eq!(titles.last().map(String::as_str), Some("Regular Note"));

    let titles = app.list_titles(&token, "/notes?sort=oldest").await;
    assert_eq!(titles, vec!["Regular Note", "Important Note"]);

    let titles = app.list_titles(&token, "/notes?sort=newest").await;
    assert_eq!(titles, vec!["Important Note", "Regular Note"]);
}

#[tokio::test]
async fn invalid_sort_is_rejected() {
    let app = spawn_app().await;
    let token = app.register("Demo User", "demo@noteloom.com").await;

    let (status, body) = app.get(&token, "/notes?sort=alphabetical").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_option");
}

#[tokio::test]
async fn search_filters_and_blank_search_is_ignored() {
    let app = spawn_app().await;
    let token = app.register("Demo User", "demo@noteloom.com").await;

    app.create_note(&token, "Team meeting", "Agenda for the weekly sync.", false).await;
    app.create_note(&token, "Groceries", "Milk, eggs and a MEETING snack.", true).await;
    app.create_note(&token, "Holiday", "Pack the suitcase early.", false).await;

    let (_, all) = app.get(&token, "/notes").await;
    let (_, blank) = app.get(&token, "/notes?search=%20%20").await;
    assert_eq!(all["notes"], blank["notes"]);
    assert_eq!(all["statistics"]["filtered"], 3);
    assert_eq!(blank["statistics"]["has_search"], false);

    let (status, found) = app.get(&token, "/notes?search=meeting").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["statistics"]["total"], 3);
    assert_eq!(found["statistics"]["filtered"], 2);
    assert_eq!(found["statistics"]["important"], 1);
    assert_eq!(found["statistics"]["has_search"], true);
    assert_eq!(found["links"]["self"], "search=meeting");
}

#[tokio::test]
async fn create_validates_fields() {
    let app = spawn_app().await;
    let token = app.register("Demo User", "demo@noteloom.com").await;

    let resp = app
        .client
        .post(app.url("/notes"))
        .bearer_auth(&token)
        .json(&json!({ "title": "ab", "content": "too short" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["fields"]["title"][0],
        "The title field must be at least 3 characters."
    );
    assert_eq!(
        body["fields"]["content"][0],
        "The content field must be at least 10 characters."
    );

    let note = app.create_note(&token, "Defaults", "Importance defaults to false.", false).await;
    assert_eq!(note["is_important"], false);
}

#[tokio::test]
async fn owner_can_edit_update_and_delete() {
    let app = spawn_app().await;
    let token = app.register("Demo User", "demo@noteloom.com").await;
    let note = app.create_note(&token, "Draft", "First version of the text.", false).await;
    let id = note["id"].as_str().unwrap();

    let (status, form) = app.get(&token, &format!("/notes/{id}/edit")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(form["title"], "Draft");
    assert_eq!(form["limits"]["title_max"], 255);

    let resp = app
        .client
        .put(app.url(&format!("/notes/{id}")))
        .bearer_auth(&token)
        .json(&json!({ "title": "Final", "content": "Second version of the text.", "is_important": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["title"], "Final");
    assert_eq!(updated["is_important"], true);
    assert_eq!(updated["created_at"], note["created_at"]);

    let resp = app
        .client
        .delete(app.url(&format!("/notes/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let (status, _) = app.get(&token, &format!("/notes/{id}/edit")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn other_users_cannot_touch_a_note() {
    let app = spawn_app().await;
    let owner = app.register("Owner", "owner@noteloom.com").await;
    let intruder = app.register("Intruder", "intruder@noteloom.com").await;
    let note = app.create_note(&owner, "Private", "Nobody else should see this.", true).await;
    let id = note["id"].as_str().unwrap();

    assert!(app.list_titles(&intruder, "/notes?search=private").await.is_empty());

    let (status, body) = app.get(&intruder, &format!("/notes/{id}/edit")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let resp = app
        .client
        .put(app.url(&format!("/notes/{id}")))
        .bearer_auth(&intruder)
        .json(&json!({ "title": "Hijacked", "content": "Overwritten content here." }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = app
        .client
        .delete(app.url(&format!("/notes/{id}")))
        .bearer_auth(&intruder)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    assert_eq!(app.list_titles(&owner, "/notes").await, vec!["Private"]);

    let resp = app
        .client
        .delete(app.url("/notes/not-a-uuid"))
        .bearer_auth(&owner)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn dashboard_and_pagination() {
    let app = spawn_app().await;
    let token = app.register("Demo User", "demo@noteloom.com").await;

    let (status, empty) = app.get(&token, "/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(empty["summary"]["total_notes"], 0);
    assert!(empty["summary"]["last_updated"].is_null());

    for i in 0..7 {
        app.create_note(&token, &format!("Note {i}"), "Some body text here.", i == 3).await;
    }

    let (_, dash) = app.get(&token, "/dashboard").await;
    assert_eq!(dash["summary"]["total_notes"], 7);
    assert_eq!(dash["summary"]["important_notes"], 1);
    assert!(dash["summary"]["last_updated"].is_string());
    assert_eq!(dash["list"]["notes"][0]["title"], "Note 3");
    assert_eq!(dash["list"]["pagination"]["last_page"], 2);
    assert_eq!(dash["list"]["links"]["next"], "page=2");

    let (_, second) = app.get(&token, "/notes?sort=oldest&page=2").await;
    assert_eq!(second["notes"].as_array().unwrap().len(), 1);
    assert_eq!(second["notes"][0]["title"], "Note 6");
    assert_eq!(second["pagination"]["from"], 7);
    assert_eq!(second["links"]["prev"], "sort=oldest");
    assert!(second["links"]["next"].is_null());

    let (status, form) = app.get(&token, "/notes/create").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(form["title"], "");
    assert!(form["id"].is_null());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_duplicate_registrations_conflict() {
    let app = spawn_app().await;

    let mut handles = Vec::new();
    for i in 0..4 {
        let client = app.client.clone();
        let url = app.url("/auth/register");
        handles.push(tokio::spawn(async move {
            client
                .post(url)
                .json(&json!({
                    "name": format!("Racer {i}"),
                    "email": "race@noteloom.com",
                    "password": "correct-horse",
                }))
                .send()
                .await
                .unwrap()
                .status()
        }));
    }

    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.unwrap());
    }
    assert_eq!(
        statuses.iter().filter(|s| **s == StatusCode::CREATED).count(),
        1,
        "{statuses:?}"
    );
    assert!(
        statuses
            .iter()
            .all(|s| *s == StatusCode::CREATED || *s == StatusCode::CONFLICT),
        "{statuses:?}"
    );
}

#[tokio::test]
async fn malformed_page_falls_back_to_first_page() {
    let app = spawn_app().await;
    let token = app.register("Demo User", "demo@noteloom.com").await;
    app.create_note(&token, "Only note", "Lives on the first page.", false).await;

    for path in ["/notes?page=abc", "/notes?page=", "/notes?page=-1", "/notes?page=2.5"] {
        let (status, body) = app.get(&token, path).await;
        assert_eq!(status, StatusCode::OK, "{path}");
        assert_eq!(body["pagination"]["current_page"], 1, "{path}");
        assert_eq!(body["notes"][0]["title"], "Only note", "{path}");
    }

    let (status, body) = app.get(&token, "/dashboard?page=abc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["list"]["pagination"]["current_page"], 1);
}

#[tokio::test]
async fn tokens_for_unknown_users_are_rejected() {
    let app = spawn_app().await;
    let token = create_token(
        "test-secret",
        uuid::Uuid::new_v4(),
        "Ghost",
        chrono::Duration::hours(1),
    )
    .unwrap();

    let (status, body) = app.get(&token, "/notes").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn authenticated_routes_allow_sixty_requests_a_minute() {
    let app = spawn_app().await;
    let token = app.register("Demo User", "demo@noteloom.com").await;

    for i in 0..60 {
        let (status, _) = app.get(&token, "/notes/create").await;
        assert_eq!(status, StatusCode::OK, "request {}", i + 1);
    }

    let resp = app
        .client
        .get(app.url("/notes"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = resp.headers()["retry-after"].to_str().unwrap().parse().unwrap();
    assert!((1..=60).contains(&retry_after));
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "too_many_requests");

    // other users and public routes are unaffected
    let other = app.register("Other User", "other@noteloom.com").await;
    let (status, _) = app.get(&other, "/notes/create").await;
    assert_eq!(status, StatusCode::OK);
    let resp = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
