use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use almasrif_api::auth::{AppStateInner, hash_code};
use almasrif_api::router;
use almasrif_db::Database;
use almasrif_types::models::{ExcellentMention, ScoreRecord, UserId};

const SECRET: &str = "integration-secret";

struct Fixture {
    app: Router,
}

impl Fixture {
    fn new(seed: impl FnOnce(&Database)) -> Self {
        let db = Database::open_in_memory().unwrap();
        seed(&db);
        let state = Arc::new(AppStateInner {
            db,
            jwt_secret: SECRET.into(),
            session_ttl: chrono::Duration::days(1),
        });
        Self { app: router(state) }
    }

    async fn send(&self, req: Request<Body>) -> (StatusCode, Option<String>, Value) {
        let resp = self.app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let location = resp
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, location, body)
    }

    async fn login(&self, phone: &str, code: &str) -> (StatusCode, Value) {
        self.login_raw(&json!({ "phone": phone, "code": code }).to_string(), true)
            .await
    }

    async fn login_raw(&self, body: &str, json_content_type: bool) -> (StatusCode, Value) {
        let mut req = Request::post("/login");
        if json_content_type {
            req = req.header(header::CONTENT_TYPE, "application/json");
        }
        let (status, _, body) = self.send(req.body(Body::from(body.to_string())).unwrap()).await;
        (status, body)
    }

    async fn token(&self, phone: &str, code: &str) -> String {
        let (status, body) = self.login(phone, code).await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["token"].as_str().unwrap().to_string()
    }

    async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Option<String>, Value) {
        let mut req = Request::get(path);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(req.body(Body::empty()).unwrap()).await
    }
}

fn provision(db: &Database, name: &str, phone: &str, code: &str) -> UserId {
    let id = db.insert_user(name, &format!("{}-nick", name), phone).unwrap();
    db.set_login_code_hash(phone, &hash_code(code).unwrap()).unwrap();
    id
}

fn score(db: &Database, user_id: UserId, issues: [i64; 8], excellent: &[u8]) {
    let mentions = excellent
        .iter()
        .map(|n| ExcellentMention::parse(&format!("العدد {}", n)))
        .collect();
    db.upsert_score(&ScoreRecord::new(user_id, issues, 3, mentions)).unwrap();
}

fn flat(total: i64) -> [i64; 8] {
    [0, 0, 0, 0, 0, 0, 0, total]
}

#[tokio::test]
async fn protected_views_redirect_without_session() {
    let fx = Fixture::new(|_| {});

    for path in ["/dashboard", "/leaderboard", "/excellent"] {
        let (status, location, body) = fx.get(path, None).await;
        assert_eq!(status, StatusCode::SEE_OTHER, "{}", path);
        assert_eq!(location.as_deref(), Some("/login"), "{}", path);
        assert_eq!(body, Value::Null, "{}", path);

        let (status, location, _) = fx.get(path, Some("not-a-token")).await;
        assert_eq!(status, StatusCode::SEE_OTHER, "{}", path);
        assert_eq!(location.as_deref(), Some("/login"), "{}", path);
    }
}

#[tokio::test]
async fn wrong_code_gets_generic_message() {
    let fx = Fixture::new(|db| {
        provision(db, "Sara", "0500000001", "123456");
    });

    for (phone, code) in [("0500000001", "654321"), ("0599999999", "123456"), ("0500000001", "abc")] {
        let (status, body) = fx.login(phone, code).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "رقم الجوال أو الكود غير صحيح");
        assert!(body.get("token").is_none());
    }
}

#[tokio::test]
async fn unreadable_login_body_gets_generic_message() {
    let fx = Fixture::new(|db| {
        provision(db, "Sara", "0500000001", "123456");
    });

    let bodies = [
        (r#"{"phone":"0500000001","code":123456}"#, true),
        (r#"{"phone":"0500000001"}"#, true),
        (r#"{"phone":"0500000001","code":"123456","x":1}"#, true),
        ("phone=0500000001&code=123456", true),
        (r#"{"phone":"0500000001","code":"123456"}"#, false),
    ];

    for (body, json_content_type) in bodies {
        let (status, resp) = fx.login_raw(body, json_content_type).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", body);
        assert_eq!(resp, json!({ "error": "رقم الجوال أو الكود غير صحيح" }), "{}", body);
    }
}

#[tokio::test]
async fn login_store_failure_is_500_with_generic_body() {
    let fx = Fixture::new(|db| {
        provision(db, "Sara", "0500000001", "123456");
        db.with_conn(|c| c.execute_batch("DROP TABLE login_codes").map_err(Into::into))
            .unwrap();
    });

    let (status, body) = fx.login("0500000001", "123456").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "رقم الجوال أو الكود غير صحيح" }));
}

#[tokio::test]
async fn store_failure_renders_empty_views() {
    let fx = Fixture::new(|db| {
        let sara = provision(db, "Sara", "0500000001", "123456");
        score(db, sara, [400_000, 800_000, 0, 0, 0, 0, 0, 0], &[1, 2]);
        db.with_conn(|c| c.execute_batch("DROP TABLE leaderboard").map_err(Into::into))
            .unwrap();
    });

    let token = fx.token("0500000001", "123456").await;

    let (status, _, card) = fx.get("/dashboard", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(card["user"]["full_name"], "Sara");
    assert_eq!(card["total_score"], 0);
    assert_eq!(card["excellent_count"], 0);
    assert_eq!(card["rank"], Value::Null);
    assert!(card["issues"].as_array().unwrap().iter().all(|i| i["score"] == 0));

    let (status, _, body) = fx.get("/leaderboard", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entries"], json!([]));

    let (status, _, body) = fx.get("/excellent", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let issues = body["issues"].as_array().unwrap();
    assert_eq!(issues.len(), 8);
    assert!(issues.iter().all(|i| i["count"] == 0 && i["users"] == json!([])));
}

#[tokio::test]
async fn login_opens_dashboard() {
    let fx = Fixture::new(|db| {
        let sara = provision(db, "Sara", "0500000001", "123456");
        let omar = provision(db, "Omar", "0500000002", "111111");
        score(db, sara, [400_000, 800_000, 0, 0, 0, 0, 0, 0], &[1, 2]);
        score(db, omar, flat(2_000_000), &[]);
    });

    let (status, body) = fx.login(" 0500000001 ", "123456").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["full_name"], "Sara");
    let token = body["token"].as_str().unwrap().to_string();

    let (status, _, card) = fx.get("/dashboard", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(card["user"]["full_name"], "Sara");
    assert_eq!(card["total_score"], 1_200_000);
    assert_eq!(card["excellent_count"], 2);
    assert_eq!(card["rank"], 2);
    assert_eq!(card["issues"][0]["issue"], 1);
    assert_eq!(card["issues"][0]["excellent"], true);
    assert_eq!(card["issues"][1]["excellent"], true);
    assert_eq!(card["issues"][2]["excellent"], false);
}

#[tokio::test]
async fn ungraded_user_sees_zeros_and_no_rank() {
    let fx = Fixture::new(|db| {
        provision(db, "New", "0500000003", "222222");
        let other = provision(db, "Old", "0500000004", "333333");
        score(db, other, flat(10), &[]);
    });

    let token = fx.token("0500000003", "222222").await;
    let (status, _, card) = fx.get("/dashboard", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(card["total_score"], 0);
    assert_eq!(card["participation_count"], 0);
    assert_eq!(card["rank"], Value::Null);
    assert_eq!(card["issues"].as_array().unwrap().len(), 8);
    assert!(card["issues"].as_array().unwrap().iter().all(|i| i["score"] == 0));
}

#[tokio::test]
async fn tied_totals_rank_lower_id_first() {
    let fx = Fixture::new(|db| {
        let first = provision(db, "First", "0500000005", "555555");
        let second = provision(db, "Second", "0500000006", "666666");
        score(db, second, flat(500_000), &[]);
        score(db, first, flat(500_000), &[]);
    });

    let token = fx.token("0500000005", "555555").await;
    let (_, _, card) = fx.get("/dashboard", Some(&token)).await;
    assert_eq!(card["rank"], 1);

    let token = fx.token("0500000006", "666666").await;
    let (_, _, card) = fx.get("/dashboard", Some(&token)).await;
    assert_eq!(card["rank"], 2);
}

#[tokio::test]
async fn leaderboard_lists_top_ten() {
    let fx = Fixture::new(|db| {
        provision(db, "Viewer", "0500000000", "000000");
        for i in 1..=12 {
            let id = db
                .insert_user(&format!("P{}", i), "", &format!("05100000{:02}", i))
                .unwrap();
            score(db, id, flat(i * 10_000), &[]);
        }
        // graded row whose user was never provisioned
        score(db, 9_999, flat(5_000_000), &[3]);
    });

    let token = fx.token("0500000000", "000000").await;
    let (status, _, body) = fx.get("/leaderboard", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let entries = body["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 10);
    assert_eq!(entries[0]["user_id"], 9_999);
    assert_eq!(entries[0]["full_name"], "");
    assert_eq!(entries[0]["excellent_count"], 1);
    assert_eq!(entries[1]["full_name"], "P12");
    assert_eq!(entries[9]["rank"], 10);

    let totals: Vec<i64> = entries.iter().map(|e| e["total_score"].as_i64().unwrap()).collect();
    assert!(totals.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn short_leaderboard_is_not_padded() {
    let fx = Fixture::new(|db| {
        let a = provision(db, "A", "0500000011", "111111");
        let b = db.insert_user("B", "", "0500000012").unwrap();
        score(db, a, flat(1), &[]);
        score(db, b, flat(2), &[]);
    });

    let token = fx.token("0500000011", "111111").await;
    let (_, _, body) = fx.get("/leaderboard", Some(&token)).await;
    assert_eq!(body["entries"].as_array().unwrap().len(), 2);
    assert_eq!(body["entries"][0]["full_name"], "B");
}

#[tokio::test]
async fn excellence_board_groups_by_issue() {
    let fx = Fixture::new(|db| {
        let a = provision(db, "A", "0500000021", "121212");
        let b = db.insert_user("B", "bee", "0500000022").unwrap();
        let c = db.insert_user("C", "", "0500000023").unwrap();
        score(db, a, [0, 800_000, 0, 0, 800_000, 0, 0, 0], &[2, 5]);
        score(db, b, [0, 0, 0, 0, 800_000, 0, 0, 0], &[5]);
        score(db, c, flat(100), &[]);
        // unresolvable owner is skipped
        score(db, 4_242, flat(800_000), &[8]);
    });

    let token = fx.token("0500000021", "121212").await;
    let (status, _, body) = fx.get("/excellent", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let issues = body["issues"].as_array().unwrap();
    assert_eq!(issues.len(), 8);
    assert_eq!(issues[1]["issue"], 2);
    assert_eq!(issues[1]["count"], 1);
    assert_eq!(issues[1]["users"][0]["full_name"], "A");
    assert_eq!(issues[4]["count"], 2);
    assert_eq!(issues[4]["users"][1]["nickname"], "bee");
    assert_eq!(issues[7]["count"], 0);
    assert_eq!(issues[0]["users"], json!([]));
}

#[tokio::test]
async fn health_and_logout_are_public() {
    let fx = Fixture::new(|_| {});

    let (status, _, _) = fx.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);

    let req = Request::post("/logout").body(Body::empty()).unwrap();
    let (status, _, _) = fx.send(req).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
