//! Conversation list, conversation thread and compose pages.

use axum::response::Html;
use domain::models::message::{preview, ComposeForm, MessageForm};
use domain::models::{ConversationSummary, FormErrors, Message, Recipient, User};
use shared::html::escape;
use uuid::Uuid;

use super::components::{csrf_field, datetime, input, non_field_errors, select, textarea};
use super::layout::{render, Page};

const PREVIEW_CHARS: usize = 80;

pub fn list_page(page: &Page, conversations: &[ConversationSummary], me: Uuid) -> Html<String> {
    let list = if conversations.is_empty() {
        "<p>No conversations yet.</p>".to_string()
    } else {
        let items: String = conversations
            .iter()
            .map(|c| {
                let unread = if c.unread_count > 0 {
                    format!(
                        r#" <span class="badge badge-info">{} unread</span>"#,
                        c.unread_count
                    )
                } else {
                    String::new()
                };
                let prefix = if c.last_sender_id == me { "You: " } else { "" };
                format!(
                    r#"<li class="conversation"><a href="/messages/conversation/{id}"><strong>{email}</strong>{unread}</a><p>{prefix}{preview}</p><small>{sent}</small></li>"#,
                    id = c.counterpart_id,
                    email = escape(&c.counterpart_email),
                    unread = unread,
                    prefix = prefix,
                    preview = escape(&preview(&c.last_message, PREVIEW_CHARS)),
                    sent = datetime(&c.last_sent_at),
                )
            })
            .collect();
        format!(r#"<ul class="conversations">{}</ul>"#, items)
    };

    render(
        page,
        "Messages",
        &format!(
            r#"<p><a class="btn btn-primary" href="/messages/new">New message</a></p>{}"#,
            list
        ),
    )
}

pub fn conversation_page(
    page: &Page,
    counterpart: &User,
    messages: &[Message],
    me: Uuid,
    form: &MessageForm,
    errors: &FormErrors,
) -> Html<String> {
    let thread = if messages.is_empty() {
        "<p>No messages yet. Say hello!</p>".to_string()
    } else {
        messages
            .iter()
            .map(|m| {
                let (class, author) = if m.sender_id == me {
                    ("message mine", "You".to_string())
                } else {
                    ("message theirs", escape(&counterpart.email))
                };
                let subject = m
                    .subject
                    .as_deref()
                    .map(|s| format!("<h3>{}</h3>", escape(s)))
                    .unwrap_or_default();
                format!(
                    r#"<div class="{}"><small>{} · {}</small>{}<p>{}</p></div>"#,
                    class,
                    author,
                    datetime(&m.sent_at),
                    subject,
                    escape(&m.content)
                )
            })
            .collect()
    };

    let body = format!(
        r#"<div class="thread">{thread}</div>
<form method="post" action="/messages/conversation/{id}" class="card">{csrf}{non_field}{subject}{content}<button type="submit" class="btn btn-primary">Send</button></form>
<p><a href="/messages">Back to messages</a></p>"#,
        thread = thread,
        id = counterpart.id,
        csrf = csrf_field(&page.csrf_token),
        non_field = non_field_errors(errors),
        subject = input("text", "subject", "Subject (optional)", &form.subject, errors),
        content = textarea("content", "Message", &form.content, errors),
    );
    render(
        page,
        &format!("Conversation with {}", counterpart.email),
        &body,
    )
}

pub fn compose_page(
    page: &Page,
    recipients: &[Recipient],
    form: &ComposeForm,
    errors: &FormErrors,
) -> Html<String> {
    if recipients.is_empty() {
        return render(
            page,
            "New message",
            "<p>There is nobody you can message yet.</p>",
        );
    }

    let options: Vec<(String, String)> = recipients
        .iter()
        .map(|r| (r.user_id.to_string(), r.display_name()))
        .collect();
    let body = format!(
        r#"<form method="post" action="/messages/new" class="card">{}{}{}{}{}<button type="submit" class="btn btn-primary">Send</button></form>"#,
        csrf_field(&page.csrf_token),
        non_field_errors(errors),
        select("recipient_id", "To", &options, &form.recipient_id, errors),
        input("text", "subject", "Subject (optional)", &form.subject, errors),
        textarea("content", "Message", &form.content, errors),
    );
    render(page, "New message", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::models::UserRole;

    fn counterpart() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "landlord@example.com".to_string(),
            password_hash: String::new(),
            role: UserRole::Landlord,
            is_active: true,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    #[test]
    fn test_list_shows_unread_and_own_prefix() {
        let me = Uuid::new_v4();
        let conversations = vec![ConversationSummary {
            counterpart_id: Uuid::new_v4(),
            counterpart_email: "t@example.com".to_string(),
            last_message: "See you <tomorrow>".to_string(),
            last_sent_at: Utc::now(),
            last_sender_id: me,
            unread_count: 2,
        }];
        let Html(html) = list_page(&Page::default(), &conversations, me);
        assert!(html.contains("2 unread"));
        assert!(html.contains("You: See you &lt;tomorrow&gt;"));
    }

    #[test]
    fn test_conversation_marks_authors() {
        let me = Uuid::new_v4();
        let other = counterpart();
        let messages = vec![
            Message {
                id: Uuid::new_v4(),
                sender_id: other.id,
                recipient_id: me,
                subject: Some("Rent".to_string()),
                content: "Hello".to_string(),
                sent_at: Utc::now(),
                is_read: true,
            },
            Message {
                id: Uuid::new_v4(),
                sender_id: me,
                recipient_id: other.id,
                subject: None,
                content: "Hi!".to_string(),
                sent_at: Utc::now(),
                is_read: false,
            },
        ];
        let Html(html) = conversation_page(
            &Page::default(),
            &other,
            &messages,
            me,
            &MessageForm::default(),
            &FormErrors::new(),
        );
        assert!(html.contains(r#"<div class="message theirs">"#));
        assert!(html.contains(r#"<div class="message mine">"#));
        assert!(html.contains("<h3>Rent</h3>"));
    }

    #[test]
    fn test_compose_without_recipients() {
        let Html(html) = compose_page(&Page::default(), &[], &ComposeForm::default(), &FormErrors::new());
        assert!(html.contains("There is nobody you can message yet."));
    }
}
