use std::fs;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode, header};
use folio_core::TokenSettings;
use folio_core::domain::NewTitle;
use folio_core::store::TitleCatalog;
use folio_http::app;
use folio_http::config::{Config, IN_MEMORY_DATABASE};
use folio_http::state::AppState;
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &str = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";

struct Harness {
    _storage: tempfile::TempDir,
    state: Arc<AppState>,
    title_id: i64,
}

impl Harness {
    async fn new() -> Self {
        let storage = tempfile::tempdir().unwrap();
        let config = Config {
            port: 0,
            database: IN_MEMORY_DATABASE.to_string(),
            storage_root: storage.path().to_path_buf(),
            tokens: TokenSettings::from_hex(SECRET, 2).unwrap(),
            cookie_name: "session".to_string(),
        };
        let state = AppState::new(config).await.unwrap();
        let title = state
            .store
            .create_title(NewTitle {
                name: "Yotsuba".into(),
                total_chapters: 20,
                available: true,
                ..Default::default()
            })
            .await
            .unwrap();
        for chapter in ["1", "2", "5", "x"] {
            let dir = storage
                .path()
                .join(title.id.to_string())
                .join("chapters")
                .join(chapter);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("02.png"), b"p2").unwrap();
            fs::write(dir.join("01.png"), b"p1").unwrap();
        }
        Self {
            _storage: storage,
            state,
            title_id: title.id,
        }
    }

    fn router(&self) -> Router {
        app(Arc::clone(&self.state))
    }

    async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router().oneshot(req).await.unwrap()
    }

    async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut req = Request::builder().uri(uri);
        if let Some(c) = cookie {
            req = req.header(header::COOKIE, c);
        }
        self.send(req.body(Body::empty()).unwrap()).await
    }

    async fn post_json(&self, uri: &str, body: Value, cookie: Option<&str>) -> Response<Body> {
        let mut req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(c) = cookie {
            req = req.header(header::COOKIE, c);
        }
        self.send(req.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Registers and logs in, returning the `name=value` cookie pair.
    async fn login(&self, email: &str) -> String {
        let resp = self
            .post_json(
                "/register",
                json!({ "name": "Koiwai", "email": email, "password": "pw" }),
                None,
            )
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = self
            .post_json("/login", json!({ "email": email, "password": "pw" }), None)
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let set_cookie = resp
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        assert!(set_cookie.contains("HttpOnly"));
        set_cookie.split(';').next().unwrap().to_string()
    }
}

async fn json_body(resp: Response<Body>) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn anonymous_title_view_has_no_progress() {
    let h = Harness::new().await;
    let resp = h.get(&format!("/titles/{}", h.title_id), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let view = json_body(resp).await;
    assert_eq!(view["current_chapter"], 0);
    assert_eq!(view["percentage"], 0);
    let statuses: Vec<_> = view["chapters"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["status"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(statuses, vec!["unread", "unread", "unread"]);
}

#[tokio::test]
async fn reading_a_chapter_records_progress() {
    let h = Harness::new().await;
    let cookie = h.login("koiwai@x.io").await;

    let resp = h
        .get(&format!("/titles/{}/chapters/5", h.title_id), Some(&cookie))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let chapter = json_body(resp).await;
    let expected = json!([
        format!("/static/{}/chapters/5/01.png", h.title_id),
        format!("/static/{}/chapters/5/02.png", h.title_id),
    ]);
    assert_eq!(chapter["pages"], expected);

    // Going back to an earlier chapter keeps the furthest one.
    h.get(&format!("/titles/{}/chapters/2", h.title_id), Some(&cookie))
        .await;

    let view = json_body(h.get(&format!("/titles/{}", h.title_id), Some(&cookie)).await).await;
    assert_eq!(view["current_chapter"], 5);
    assert_eq!(view["percentage"], 25);
    assert_eq!(view["chapters"][2]["status"], "current");
    assert_eq!(view["chapters"][0]["status"], "read");

    let list = json_body(h.get("/me/progress", Some(&cookie)).await).await;
    assert_eq!(list[0]["current_chapter"], 5);
}

#[tokio::test]
async fn anonymous_chapter_view_is_served_but_not_saved() {
    let h = Harness::new().await;
    let resp = h.get(&format!("/titles/{}/chapters/1", h.title_id), None).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = h.login("late@x.io").await;
    let list = json_body(h.get("/me/progress", Some(&cookie)).await).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn forged_cookie_reads_anonymously() {
    let h = Harness::new().await;
    let resp = h
        .get(&format!("/titles/{}", h.title_id), Some("session=not-a-token"))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["current_chapter"], 0);
}

#[tokio::test]
async fn protected_routes_reject_missing_and_invalid_tokens() {
    let h = Harness::new().await;
    assert_eq!(h.get("/me/progress", None).await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        h.get("/me/progress", Some("session=forged")).await.status(),
        StatusCode::UNAUTHORIZED
    );
    let resp = h
        .post_json("/titles", json!({ "name": "Blame!" }), None)
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_chapter_and_title_are_404() {
    let h = Harness::new().await;
    let resp = h.get(&format!("/titles/{}/chapters/3", h.title_id), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let resp = h.get(&format!("/titles/{}", h.title_id + 1), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_canonical_chapter_names_are_404_and_not_recorded() {
    let h = Harness::new().await;
    let cookie = h.login("strict@x.io").await;
    for name in ["01", "+1", "1.0", "-1", "99999999999"] {
        let resp = h
            .get(
                &format!("/titles/{}/chapters/{name}", h.title_id),
                Some(&cookie),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "chapter {name:?}");
    }
    let list = json_body(h.get("/me/progress", Some(&cookie)).await).await;
    assert_eq!(list, json!([]));

    let resp = h
        .get(&format!("/titles/{}/chapters/1", h.title_id), Some(&cookie))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn bad_login_and_duplicate_registration() {
    let h = Harness::new().await;
    h.login("dup@x.io").await;
    let resp = h
        .post_json(
            "/register",
            json!({ "name": "Again", "email": "dup@x.io", "password": "pw" }),
            None,
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let resp = h
        .post_json("/login", json!({ "email": "dup@x.io", "password": "wrong" }), None)
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn authenticated_user_can_add_and_search_titles() {
    let h = Harness::new().await;
    let cookie = h.login("editor@x.io").await;
    let resp = h
        .post_json(
            "/titles",
            json!({ "name": "Blame!", "total_chapters": 65, "available": true }),
            Some(&cookie),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let found = json_body(h.get("/titles?q=bla", None).await).await;
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["name"], "Blame!");
    let all = json_body(h.get("/titles", None).await).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn bearer_header_is_accepted() {
    let h = Harness::new().await;
    let token = h.state.tokens.issue(77).unwrap();
    let req = Request::builder()
        .uri("/me/progress")
        .header(header::AUTHORIZATION, format!("Bearer {}", token.value))
        .body(Body::empty())
        .unwrap();
    assert_eq!(h.send(req).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn logout_expires_cookie() {
    let h = Harness::new().await;
    let req = Request::builder()
        .method("POST")
        .uri("/logout")
        .body(Body::empty())
        .unwrap();
    let resp = h.send(req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let cookie = resp.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with("session=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn pages_are_served_from_storage() {
    let h = Harness::new().await;
    let resp = h
        .get(&format!("/static/{}/chapters/1/01.png", h.title_id), None)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"p1");
}
