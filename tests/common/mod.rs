// tests/common/mod.rs
//
// In-process stand-in for the quiz REST backend.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicI64, AtomicUsize, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use client::{ApiClient, Session};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

pub const SECRET: &str = "test_secret_for_integration_tests";
pub const EMAIL: &str = "player@example.com";
pub const PASSWORD: &str = "password123";

type ApiResult = Result<Response, (StatusCode, Json<Value>)>;

#[derive(Debug, Deserialize, Serialize)]
struct Claims {
    sub: String,
    exp: usize,
}

/// Everything the fake server has seen, plus its data.
#[derive(Default)]
pub struct MockBackend {
    pub quizzes: Mutex<Vec<Value>>,
    pub comments: Mutex<Vec<Value>>,
    pub next_id: AtomicI64,

    /// `Authorization` header of every request, in arrival order.
    pub auth_headers: Mutex<Vec<Option<String>>>,
    /// `Content-Type` header of every request, in arrival order.
    pub content_types: Mutex<Vec<Option<String>>>,
    /// Query string of every `GET /api/quizzes`.
    pub list_queries: Mutex<Vec<HashMap<String, String>>>,
    /// Body of every `POST /api/quizzes/{id}/attempts`.
    pub attempts: Mutex<Vec<Value>>,
    pub comment_fetches: AtomicUsize,
    pub comment_mutations: AtomicUsize,
}

impl MockBackend {
    fn seeded() -> Self {
        let backend = MockBackend {
            next_id: AtomicI64::new(100),
            ..Default::default()
        };

        *backend.quizzes.lock().unwrap() = vec![
            json!({
                "id": 1,
                "title": "European Capitals",
                "description": "Name them all",
                "quiz_type": "standard",
                "time_limit": 60,
                "attempt_count": 3,
                "creator_id": 7,
                "answers": [
                    { "correct_answer": "Paris", "aliases": ["paris"], "position": 0 },
                    { "correct_answer": "42", "aliases": [], "position": 1 }
                ]
            }),
            json!({
                "id": 2,
                "title": "Untimed trivia",
                "description": null,
                "quiz_type": "standard",
                "time_limit": null,
                "attempt_count": 0,
                "creator_id": 7,
                "answers": [
                    { "correct_answer": "blue", "aliases": [], "position": 0 }
                ]
            }),
        ];

        *backend.comments.lock().unwrap() = vec![
            comment_json(10, 1, None, "First!"),
            comment_json(11, 1, Some(10), "Welcome"),
            comment_json(12, 2, None, "Other quiz"),
        ];

        backend
    }

    pub fn last_auth_header(&self) -> Option<String> {
        self.auth_headers.lock().unwrap().last().cloned().flatten()
    }

    pub fn comment_fetches(&self) -> usize {
        self.comment_fetches.load(Ordering::SeqCst)
    }
}

fn comment_json(id: i64, quiz_id: i64, parent_id: Option<i64>, content: &str) -> Value {
    // Naive, space-separated timestamps, the way the backend stringifies them.
    let now = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string();
    json!({
        "id": id,
        "content": content,
        "author_id": 7,
        "author_username": "alice",
        "quiz_id": quiz_id,
        "parent_id": parent_id,
        "created_at": now,
        "updated_at": now,
        "likes_count": 0
    })
}

fn error(status: StatusCode, detail: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": detail })))
}

fn sign(user_id: i64) -> String {
    let exp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
        + 600;
    let claims = Claims {
        sub: user_id.to_string(),
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

/// Valid bearer token for the seeded user.
pub fn valid_token() -> String {
    sign(7)
}

fn authorize(headers: &HeaderMap) -> Result<i64, (StatusCode, Json<Value>)> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Not authenticated"))?;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(SECRET.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| error(StatusCode::UNAUTHORIZED, "Could not validate credentials"))?;

    Ok(data.claims.sub.parse().unwrap_or(0))
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

async fn record_headers(
    State(backend): State<Arc<MockBackend>>,
    req: Request,
    next: Next,
) -> Response {
    // Owned copies only: nothing borrowed from `req` may live across the await.
    let (auth, content_type) = {
        let headers = req.headers();
        (
            header_value(headers, header::AUTHORIZATION),
            header_value(headers, header::CONTENT_TYPE),
        )
    };
    backend.auth_headers.lock().unwrap().push(auth);
    backend.content_types.lock().unwrap().push(content_type);
    next.run(req).await
}

async fn register(Json(body): Json<Value>) -> ApiResult {
    if body["username"] == "taken" {
        return Err(error(StatusCode::BAD_REQUEST, "Username already taken"));
    }
    if body["username"] == "silent" {
        return Err((StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))));
    }
    Ok(Json(json!({ "access_token": sign(8), "token_type": "bearer" })).into_response())
}

async fn login(Json(body): Json<Value>) -> ApiResult {
    if body["email"] == EMAIL && body["password"] == PASSWORD {
        Ok(Json(json!({
            "access_token": sign(7),
            "token_type": "bearer",
            "user_id": 7
        }))
        .into_response())
    } else {
        Err(error(StatusCode::UNAUTHORIZED, "Invalid credentials"))
    }
}

async fn list_quizzes(
    State(backend): State<Arc<MockBackend>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    backend.list_queries.lock().unwrap().push(params.clone());

    let skip: usize = params.get("skip").and_then(|s| s.parse().ok()).unwrap_or(0);
    let limit: usize = params.get("limit").and_then(|s| s.parse().ok()).unwrap_or(10);
    let search = params.get("search").map(|s| s.to_lowercase());

    let quizzes: Vec<Value> = backend
        .quizzes
        .lock()
        .unwrap()
        .iter()
        .filter(|q| match &search {
            Some(term) => q["title"]
                .as_str()
                .is_some_and(|t| t.to_lowercase().contains(term)),
            None => true,
        })
        .skip(skip)
        .take(limit)
        .map(|q| {
            let mut summary = q.clone();
            summary.as_object_mut().unwrap().remove("answers");
            summary
        })
        .collect();

    Ok(Json(quizzes).into_response())
}

async fn get_quiz(State(backend): State<Arc<MockBackend>>, Path(id): Path<i64>) -> ApiResult {
    backend
        .quizzes
        .lock()
        .unwrap()
        .iter()
        .find(|q| q["id"] == id)
        .cloned()
        .map(|q| Json(q).into_response())
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Quiz not found"))
}

async fn create_quiz(
    State(backend): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> ApiResult {
    let user_id = authorize(&headers)?;
    let id = backend.next_id.fetch_add(1, Ordering::SeqCst);

    let quiz = body.as_object_mut().unwrap();
    quiz.insert("id".to_string(), json!(id));
    quiz.insert("creator_id".to_string(), json!(user_id));
    quiz.insert("attempt_count".to_string(), json!(0));
    backend.quizzes.lock().unwrap().push(body.clone());

    Ok(Json(body).into_response())
}

async fn submit_attempt(
    State(backend): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> ApiResult {
    authorize(&headers)?;
    backend.attempts.lock().unwrap().push(body.clone());

    let expected: Vec<String> = {
        let quizzes = backend.quizzes.lock().unwrap();
        let quiz = quizzes
            .iter()
            .find(|q| q["id"] == id)
            .ok_or_else(|| error(StatusCode::NOT_FOUND, "Quiz not found"))?;
        quiz["answers"]
            .as_array()
            .map(|answers| {
                answers
                    .iter()
                    .map(|a| a["correct_answer"].as_str().unwrap_or("").to_lowercase())
                    .collect()
            })
            .unwrap_or_default()
    };

    let given: Vec<String> = body["answers"]
        .as_array()
        .map(|a| a.iter().map(|v| v.as_str().unwrap_or("").to_lowercase()).collect())
        .unwrap_or_default();

    if given.len() != expected.len() {
        return Err(error(
            StatusCode::BAD_REQUEST,
            &format!("Expected {} answers, got {}", expected.len(), given.len()),
        ));
    }

    let correct = expected.iter().zip(&given).filter(|(e, g)| e == g).count();
    let score = correct * 100 / expected.len().max(1);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "score": score,
            "correct_answers": correct,
            "total_questions": expected.len(),
            "points_earned": correct
        })),
    )
        .into_response())
}

async fn quiz_stats(Path(id): Path<i64>) -> ApiResult {
    if id != 1 {
        return Err(error(StatusCode::NOT_FOUND, "Quiz not found"));
    }
    Ok(Json(json!({
        "quiz_id": 1,
        "total_attempts": 4,
        "average_score": 62.5,
        "answers_stats": [
            { "answer": "Paris", "correct_count": 3, "attempt_count": 4, "percentage": 75.0 },
            { "answer": "42", "correct_count": 2, "attempt_count": 4, "percentage": 50.0 }
        ]
    }))
    .into_response())
}

async fn list_comments(State(backend): State<Arc<MockBackend>>, Path(quiz_id): Path<i64>) -> ApiResult {
    backend.comment_fetches.fetch_add(1, Ordering::SeqCst);
    let comments: Vec<Value> = backend
        .comments
        .lock()
        .unwrap()
        .iter()
        .filter(|c| c["quiz_id"] == quiz_id)
        .cloned()
        .collect();
    Ok(Json(comments).into_response())
}

fn content_of(body: &Value) -> Result<String, (StatusCode, Json<Value>)> {
    body["content"]
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| error(StatusCode::UNPROCESSABLE_ENTITY, "content is required"))
}

async fn add_comment(
    State(backend): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Path(quiz_id): Path<i64>,
    Json(body): Json<Value>,
) -> ApiResult {
    authorize(&headers)?;
    let content = content_of(&body)?;
    backend.comment_mutations.fetch_add(1, Ordering::SeqCst);

    let id = backend.next_id.fetch_add(1, Ordering::SeqCst);
    let comment = comment_json(id, quiz_id, None, &content);
    backend.comments.lock().unwrap().push(comment.clone());
    Ok((StatusCode::CREATED, Json(comment)).into_response())
}

async fn reply_to_comment(
    State(backend): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Path(parent_id): Path<i64>,
    Json(body): Json<Value>,
) -> ApiResult {
    authorize(&headers)?;
    let content = content_of(&body)?;

    let quiz_id = backend
        .comments
        .lock()
        .unwrap()
        .iter()
        .find(|c| c["id"] == parent_id)
        .and_then(|c| c["quiz_id"].as_i64())
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Parent comment not found"))?;
    backend.comment_mutations.fetch_add(1, Ordering::SeqCst);

    let id = backend.next_id.fetch_add(1, Ordering::SeqCst);
    let comment = comment_json(id, quiz_id, Some(parent_id), &content);
    backend.comments.lock().unwrap().push(comment.clone());
    Ok((StatusCode::CREATED, Json(comment)).into_response())
}

async fn update_comment(
    State(backend): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> ApiResult {
    authorize(&headers)?;
    let content = content_of(&body)?;

    let mut comments = backend.comments.lock().unwrap();
    let comment = comments
        .iter_mut()
        .find(|c| c["id"] == id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Comment not found"))?;
    comment["content"] = json!(content);
    backend.comment_mutations.fetch_add(1, Ordering::SeqCst);
    Ok(Json(comment.clone()).into_response())
}

async fn delete_comment(
    State(backend): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult {
    authorize(&headers)?;

    let mut comments = backend.comments.lock().unwrap();
    let before = comments.len();
    comments.retain(|c| c["id"] != id);
    if comments.len() == before {
        return Err(error(StatusCode::NOT_FOUND, "Comment not found"));
    }
    backend.comment_mutations.fetch_add(1, Ordering::SeqCst);
    Ok(Json(json!({ "message": "Comment deleted successfully" })).into_response())
}

pub struct TestApp {
    pub address: String,
    pub backend: Arc<MockBackend>,
}

impl TestApp {
    /// A client with an empty in-memory session.
    pub fn client(&self) -> ApiClient {
        self.client_with(Session::in_memory())
    }

    pub fn client_with(&self, session: Session) -> ApiClient {
        ApiClient::new(self.address.parse().unwrap(), session).unwrap()
    }
}

/// Helper function to spawn the fake backend on a random port.
pub async fn spawn_app() -> TestApp {
    let backend = Arc::new(MockBackend::seeded());

    let app = Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/quizzes", get(list_quizzes).post(create_quiz))
        .route("/api/quizzes/{id}", get(get_quiz))
        .route("/api/quizzes/{id}/attempts", post(submit_attempt))
        .route("/api/quizzes/{id}/comments", get(list_comments).post(add_comment))
        .route("/api/comments/{id}/replies", post(reply_to_comment))
        .route("/api/comments/{id}", put(update_comment).delete(delete_comment))
        .route("/api/stats/quizzes/{id}", get(quiz_stats))
        .layer(middleware::from_fn_with_state(backend.clone(), record_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(backend.clone());

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp { address, backend }
}
