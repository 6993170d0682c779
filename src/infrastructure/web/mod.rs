//! Web 服务器模块
//!
//! 提供页面、聊天接口和日志查询的 HTTP 路由

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{debug, error, info, warn, Instrument};

use crate::core::store::{LogStore, DEFAULT_RECENT_LIMIT, MAX_RECENT_LIMIT};
use crate::domain::{ChatLogEntry, NewChatLog};
use crate::infrastructure::llm::OllamaClient;

pub mod views;

/// 推理客户端初始化失败时的回复
pub const UNAVAILABLE_REPLY: &str =
    "Sorry, the AI model is currently unavailable. Please try again later.";

/// 推理调用失败时的回复
pub const FAILURE_REPLY: &str =
    "Sorry, there was an error processing your request. Please try again.";

// ==================== 错误响应 ====================

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// ==================== 状态 ====================

pub struct AppState {
    /// 初始化失败时为 `None`，所有聊天请求返回不可用提示
    pub llm: Option<OllamaClient>,
    pub store: Arc<dyn LogStore>,
    /// 会话缓冲区，服务端不写入，仅由 `/reset` 清空
    pub history: Mutex<Vec<NewChatLog>>,
}

impl AppState {
    pub fn new(llm: Option<OllamaClient>, store: Arc<dyn LogStore>) -> Self {
        Self {
            llm,
            store,
            history: Mutex::new(Vec::new()),
        }
    }
}

// ==================== 请求/响应类型 ====================

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogsResponse {
    pub logs: Vec<ChatLogEntry>,
}

// ==================== 处理器 ====================

/// 健康检查
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
        "inference_available": state.llm.is_some(),
    }))
}

/// 聊天
///
/// 无论下游是否失败都返回 200，错误只体现在回复文本中。
/// 请求体不检查 Content-Type，无法解析时按空消息处理
async fn chat(State(state): State<Arc<AppState>>, body: Bytes) -> Json<ChatResponse> {
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap_or_default();
    let message = body
        .get("message")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .to_string();

    let Some(llm) = state.llm.as_ref() else {
        return Json(ChatResponse {
            response: UNAVAILABLE_REPLY.to_string(),
        });
    };

    let request_id = uuid::Uuid::new_v4();
    let response = respond(&state, llm, message)
        .instrument(tracing::info_span!("chat", %request_id))
        .await;

    Json(ChatResponse { response })
}

/// 调用推理服务，仅在成功时写入日志
async fn respond(state: &AppState, llm: &OllamaClient, message: String) -> String {
    // 消息内容敏感，只记录长度
    debug!(
        "Attempting to get response for message of {} chars",
        message.chars().count()
    );

    match llm.chat(&message).await {
        Ok(reply) => {
            store_chat_log(state.store.as_ref(), NewChatLog::new(message, reply.clone())).await;
            reply
        }
        Err(e) => {
            error!("Error generating response: {}", e);
            FAILURE_REPLY.to_string()
        }
    }
}

/// 写入聊天日志，失败只记录不上抛
async fn store_chat_log(store: &dyn LogStore, log: NewChatLog) {
    match store.append(log).await {
        Ok(entry) => info!("Stored chat log {}", entry.id),
        Err(e) => error!("Error storing chat log: {}", e),
    }
}

/// 清空会话缓冲区
async fn reset(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    state.history.lock().await.clear();

    Json(StatusResponse {
        status: "success".to_string(),
    })
}

/// 查询最近的聊天日志
async fn list_chat_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LogsQuery>,
) -> impl IntoResponse {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_RECENT_LIMIT)
        .min(MAX_RECENT_LIMIT);

    match state.store.recent(limit).await {
        Ok(logs) => Json(LogsResponse { logs }).into_response(),
        Err(e) => {
            error!("Failed to load chat logs: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to load chat logs".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// 302 跳转
fn found(location: &'static str) -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, location)])
}

async fn redirect_to_option() -> impl IntoResponse {
    found("/option")
}

async fn redirect_to_index() -> impl IntoResponse {
    found("/index")
}

// ==================== 路由 ====================

/// 构建路由，未匹配的 GET 请求从 `public_dir` 提供静态文件
pub fn create_router(state: Arc<AppState>, public_dir: impl AsRef<Path>) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    Router::new()
        .route("/", get(views::login))
        .route("/user", get(views::user))
        .route("/option", get(views::option))
        .route("/index", get(views::index))
        .route("/redirect_to_user", post(views::user))
        .route("/redirect_to_option", post(redirect_to_option))
        .route("/redirect_to_index", post(redirect_to_index))
        .route("/chat", post(chat))
        .route("/reset", post(reset))
        .route("/chat_logs", get(list_chat_logs))
        .route("/api/health", get(health_check))
        .fallback_service(ServeDir::new(public_dir))
        .layer(middleware)
        .with_state(state)
}

// ==================== 服务器启动 ====================

pub async fn start_web_server(
    bind_addr: SocketAddr,
    state: Arc<AppState>,
    public_dir: &Path,
) -> anyhow::Result<()> {
    if !public_dir.is_dir() {
        warn!("Static directory {} not found", public_dir.display());
    }

    let app = create_router(state, public_dir);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Server running http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
