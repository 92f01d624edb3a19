use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;

use eventsphere_auth::{User, UserProfile, permissions};
use eventsphere_chat::{Chat, Message};
use eventsphere_core::{ChatId, UserId};
use eventsphere_infra::modify_with_retry;

use crate::app::dto;
use crate::app::errors::{ApiError, ApiResult};
use crate::app::routes::common::{CmdAuth, create, fetch, list_values, parse_id};
use crate::app::routes::system;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

/// Appends commute, so a lost race is simply retried.
const APPEND_ATTEMPTS: usize = 3;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_chat))
        .route("/create", post(create_chat))
        .route("/message", post(send_message))
        .route("/chats/:userId", get(list_chats))
        .route("/stream", get(system::stream))
}

/// Create-or-get the chat between two users. 201 when a new chat was opened.
pub async fn create_chat(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateChatRequest>,
) -> ApiResult {
    let cmd = CmdAuth {
        inner: body,
        required: vec![permissions::CHAT_PARTICIPATE],
    };
    authz::authorize_command(&principal, &cmd)?;
    let dto::CreateChatRequest { user_id1, user_id2 } = cmd.inner;

    if !principal.is_admin() && principal.user_id() != user_id1 && principal.user_id() != user_id2 {
        return Err(ApiError::forbidden("callers can only open chats they take part in"));
    }

    let chat = Chat::open(user_id1, user_id2, Utc::now())?;
    fetch(services.users(), &user_id1, "user").await?;
    fetch(services.users(), &user_id2, "user").await?;

    let _guard = services.serial_writes().await;
    let existing = list_values(services.chats())
        .await?
        .into_iter()
        .find(|c| c.is_between(user_id1, user_id2));
    if let Some(chat) = existing {
        return Ok(dto::ok(StatusCode::OK, "Chat already exists", chat));
    }

    let stored = create(services.chats(), chat).await?;
    tracing::info!(chat_id = %stored.value.id, "chat opened");
    Ok(dto::ok(StatusCode::CREATED, "Chat created", stored.value))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MessagePush<'a> {
    chat_id: ChatId,
    message: &'a Message,
}

pub async fn send_message(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::SendMessageRequest>,
) -> ApiResult {
    let sender_id = body.sender_id.unwrap_or_else(|| principal.user_id());
    let cmd = CmdAuth {
        inner: body,
        required: vec![permissions::CHAT_PARTICIPATE],
    };
    authz::authorize_command(&principal, &cmd)?;
    authz::ensure_self_or_admin(&principal, sender_id)?;
    let body = cmd.inner;

    let now = Utc::now();
    let (stored, message) = modify_with_retry(services.chats(), &body.chat_id, APPEND_ATTEMPTS, |chat| {
        chat.append(sender_id, &body.content, now)
    })
    .await?;

    let chat = stored.value;
    services.publish_to(
        chat.participants().to_vec(),
        "chat.message",
        &MessagePush {
            chat_id: chat.id,
            message: &message,
        },
    );

    tracing::info!(chat_id = %chat.id, sender_id = %sender_id, "message sent");
    Ok(dto::ok(StatusCode::CREATED, "Message sent", message))
}

#[derive(Debug, Serialize)]
struct ChatView {
    #[serde(flatten)]
    chat: Chat,
    counterpart: Option<UserProfile>,
}

/// Chats of one user, most recently active first.
pub async fn list_chats(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(user_id): Path<String>,
) -> ApiResult {
    let user_id: UserId = parse_id(&user_id)?;
    authz::ensure_self_or_admin(&principal, user_id)?;

    let users: HashMap<UserId, User> = list_values(services.users())
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let mut chats: Vec<Chat> = list_values(services.chats())
        .await?
        .into_iter()
        .filter(|c| c.has_participant(user_id))
        .collect();
    chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

    let views: Vec<ChatView> = chats
        .into_iter()
        .map(|chat| ChatView {
            counterpart: chat
                .counterpart(user_id)
                .and_then(|id| users.get(&id))
                .map(User::profile),
            chat,
        })
        .collect();

    Ok(dto::ok(StatusCode::OK, "Chats fetched", views))
}
