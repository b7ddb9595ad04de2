//! Conversation list, conversation view, reply and compose handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use domain::models::message::{ComposeForm, MessageForm, MessageInput};
use domain::models::{ConversationSummary, FormErrors, Message, Recipient, User, UserRole};
use domain::services::authorization::can_message;
use persistence::repositories::{MessageRepository, UserRepository};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::AppError;
use crate::extractors::{CsrfForm, CurrentUser};
use crate::middleware::metrics::record_message_sent;
use crate::services::flash::{redirect, FlashMessage};
use crate::views::messages::{compose_page as render_compose, conversation_page, list_page};
use crate::views::Page;

#[derive(Debug, Default, Deserialize)]
pub struct ComposeQuery {
    /// Preselected recipient.
    pub to: Option<String>,
}

/// Who `user` may start a conversation with.
async fn allowed_recipients(state: &AppState, user: &User) -> Result<Vec<Recipient>, AppError> {
    let repo = MessageRepository::new(state.pool.clone());
    let rows = match user.role {
        UserRole::Landlord => repo.recipients_for_landlord(user.id).await?,
        UserRole::Tenant => repo.recipients_for_tenant(&user.email).await?,
        UserRole::Administrator => repo.recipients_for_admin(user.id).await?,
    };
    Ok(rows.into_iter().map(Into::into).collect())
}

/// The other side of a conversation. Unknown users, unrelated users and
/// the current user are all treated as missing.
async fn counterpart(state: &AppState, me: &User, user_id: Uuid) -> Result<User, AppError> {
    let is_allowed = allowed_recipients(state, me)
        .await?
        .iter()
        .any(|r| r.user_id == user_id);
    let has_history = !is_allowed
        && MessageRepository::new(state.pool.clone())
            .has_conversation(me.id, user_id)
            .await?;
    if !can_message(me.id, user_id, is_allowed, has_history) {
        return Err(AppError::not_found());
    }
    Ok(UserRepository::new(state.pool.clone())
        .find_by_id(user_id)
        .await?
        .ok_or_else(AppError::not_found)?
        .into())
}

async fn store(
    state: &AppState,
    sender_id: Uuid,
    recipient_id: Uuid,
    input: &MessageInput,
) -> Result<(), AppError> {
    let message = MessageRepository::new(state.pool.clone())
        .create(
            sender_id,
            recipient_id,
            input.subject.as_deref(),
            &input.content,
        )
        .await?;
    record_message_sent();
    info!(message_id = %message.id, sender_id = %sender_id, recipient_id = %recipient_id, "Message sent");
    Ok(())
}

fn sent(state: &AppState, recipient_id: Uuid) -> Response {
    redirect(
        &state.cookies,
        &format!("/messages/conversation/{}", recipient_id),
        FlashMessage::success("Message sent successfully."),
    )
}

pub async fn list_conversations(
    State(state): State<AppState>,
    current: CurrentUser,
    page: Page,
) -> Result<Html<String>, AppError> {
    let conversations: Vec<ConversationSummary> = MessageRepository::new(state.pool.clone())
        .list_conversations(current.user.id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(list_page(&page, &conversations, current.user.id))
}

pub async fn conversation(
    State(state): State<AppState>,
    current: CurrentUser,
    mut page: Page,
    Path(user_id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let me = current.user.id;
    let other = counterpart(&state, &current.user, user_id).await?;

    let repo = MessageRepository::new(state.pool.clone());
    let marked = repo.mark_conversation_read(me, other.id).await?;
    if let Some(nav) = page.user.as_mut() {
        nav.unread_messages = (nav.unread_messages - marked as i64).max(0);
    }

    let messages: Vec<Message> = repo
        .list_conversation(me, other.id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(conversation_page(
        &page,
        &other,
        &messages,
        me,
        &MessageForm::default(),
        &FormErrors::new(),
    ))
}

pub async fn reply(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(user_id): Path<Uuid>,
    page: Page,
    CsrfForm(form): CsrfForm<MessageForm>,
) -> Result<Response, AppError> {
    let me = current.user.id;
    let other = counterpart(&state, &current.user, user_id).await?;

    let input = match form.clean() {
        Ok(input) => input,
        Err(errors) => {
            let messages: Vec<Message> = MessageRepository::new(state.pool.clone())
                .list_conversation(me, other.id)
                .await?
                .into_iter()
                .map(Into::into)
                .collect();
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                conversation_page(&page, &other, &messages, me, &form, &errors),
            )
                .into_response());
        }
    };

    store(&state, me, other.id, &input).await?;
    Ok(sent(&state, other.id))
}

pub async fn compose_page(
    State(state): State<AppState>,
    current: CurrentUser,
    page: Page,
    Query(query): Query<ComposeQuery>,
) -> Result<Html<String>, AppError> {
    let recipients = allowed_recipients(&state, &current.user).await?;
    let form = ComposeForm {
        recipient_id: query.to.unwrap_or_default(),
        ..Default::default()
    };
    Ok(render_compose(&page, &recipients, &form, &FormErrors::new()))
}

pub async fn send_new_message(
    State(state): State<AppState>,
    current: CurrentUser,
    page: Page,
    CsrfForm(form): CsrfForm<ComposeForm>,
) -> Result<Response, AppError> {
    let recipients = allowed_recipients(&state, &current.user).await?;
    let allowed: Vec<Uuid> = recipients.iter().map(|r| r.user_id).collect();

    let (recipient_id, input) = match form.clean(&allowed) {
        Ok(cleaned) => cleaned,
        Err(errors) => {
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                render_compose(&page, &recipients, &form, &errors),
            )
                .into_response())
        }
    };

    store(&state, current.user.id, recipient_id, &input).await?;
    Ok(sent(&state, recipient_id))
}
