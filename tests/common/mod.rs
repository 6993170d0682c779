//! 测试通用工具
//!
//! 提供一个可编程的假 Ollama 服务

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;

use solace::InferenceConfig;

static INIT: Once = Once::new();

/// 初始化测试环境
pub fn setup() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

/// 根据第 n 次请求（从 1 开始）决定响应
pub type Responder = Arc<dyn Fn(usize) -> (StatusCode, String) + Send + Sync>;

#[derive(Clone)]
struct FakeState {
    hits: Arc<AtomicUsize>,
    last_body: Arc<Mutex<Option<Value>>>,
    responder: Responder,
}

/// 假推理服务
pub struct FakeOllama {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    last_body: Arc<Mutex<Option<Value>>>,
}

impl FakeOllama {
    pub fn host(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// `/api/chat` 收到的请求数
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// 最近一次 `/api/chat` 请求体
    pub fn last_body(&self) -> Option<Value> {
        self.last_body.lock().unwrap().clone()
    }

    /// 指向该服务的客户端配置，重试间隔缩短为 50ms
    pub fn config(&self, max_retries: u32) -> InferenceConfig {
        InferenceConfig {
            host: self.host(),
            max_retries,
            retry_delay: Duration::from_millis(50),
            ..Default::default()
        }
    }
}

async fn fake_chat(State(state): State<FakeState>, body: String) -> (StatusCode, String) {
    let n = state.hits.fetch_add(1, Ordering::SeqCst) + 1;
    *state.last_body.lock().unwrap() = serde_json::from_str(&body).ok();
    (state.responder)(n)
}

async fn fake_tags() -> Json<Value> {
    Json(serde_json::json!({
        "models": [{"name": "llama3.2:3b"}, {"name": "mistral:latest"}]
    }))
}

/// 启动假推理服务
pub async fn spawn_fake_ollama(responder: Responder) -> FakeOllama {
    setup();

    let hits = Arc::new(AtomicUsize::new(0));
    let last_body = Arc::new(Mutex::new(None));
    let state = FakeState {
        hits: hits.clone(),
        last_body: last_body.clone(),
        responder,
    };

    let app = Router::new()
        .route("/api/chat", post(fake_chat))
        .route("/api/tags", get(fake_tags))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeOllama {
        addr,
        hits,
        last_body,
    }
}

/// 每次都返回同一个 200 响应体
pub fn always_ok(body: &'static str) -> Responder {
    Arc::new(move |_| (StatusCode::OK, body.to_string()))
}

/// 每次都返回 500
pub fn always_fail() -> Responder {
    Arc::new(|_| (StatusCode::INTERNAL_SERVER_ERROR, "model crashed".to_string()))
}
