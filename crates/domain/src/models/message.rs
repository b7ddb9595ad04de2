//! Direct message domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::form::FormErrors;

/// Longest message body accepted, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 5000;

/// A message between two users. Only `is_read` ever changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub subject: Option<String>,
    pub content: String,
    pub sent_at: DateTime<Utc>,
    pub is_read: bool,
}

/// One row of the conversation list: the latest message exchanged with a
/// counterpart and how many of their messages are still unread.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSummary {
    pub counterpart_id: Uuid,
    pub counterpart_email: String,
    pub last_message: String,
    pub last_sent_at: DateTime<Utc>,
    pub last_sender_id: Uuid,
    pub unread_count: i64,
}

/// A user that may be messaged, for the compose screen.
#[derive(Debug, Clone, Serialize)]
pub struct Recipient {
    pub user_id: Uuid,
    pub email: String,
    pub name: Option<String>,
}

impl Recipient {
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => format!("{} <{}>", name, self.email),
            _ => self.email.clone(),
        }
    }
}

/// Shortens `content` to at most `max_chars` characters for previews.
pub fn preview(content: &str, max_chars: usize) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}…", head.trim_end())
    } else {
        head
    }
}

/// Reply form on the conversation page.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct MessageForm {
    #[validate(length(max = 255, message = "Ensure this value has at most 255 characters."))]
    #[serde(default)]
    pub subject: String,

    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageInput {
    pub subject: Option<String>,
    pub content: String,
}

impl MessageForm {
    pub fn clean(&self) -> Result<MessageInput, FormErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FormErrors::new(),
            Err(e) => FormErrors::from(e),
        };

        let content = self.content.trim();
        if content.is_empty() {
            errors.add("content", "Message cannot be empty.");
        } else if content.chars().count() > MAX_MESSAGE_LENGTH {
            errors.add(
                "content",
                format!(
                    "Message is too long. It must contain at most {} characters.",
                    MAX_MESSAGE_LENGTH
                ),
            );
        }

        let subject = self.subject.trim();
        errors.into_result(MessageInput {
            subject: (!subject.is_empty()).then(|| subject.to_string()),
            content: content.to_string(),
        })
    }
}

/// Compose form: a reply form plus the chosen recipient.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComposeForm {
    #[serde(default)]
    pub recipient_id: String,

    #[serde(default)]
    pub subject: String,

    #[serde(default)]
    pub content: String,
}

impl ComposeForm {
    /// Cleans the form; the recipient must be one of `allowed_recipients`.
    pub fn clean(&self, allowed_recipients: &[Uuid]) -> Result<(Uuid, MessageInput), FormErrors> {
        let message = MessageForm {
            subject: self.subject.clone(),
            content: self.content.clone(),
        };
        let mut errors = FormErrors::new();

        let recipient = Uuid::parse_str(self.recipient_id.trim())
            .ok()
            .filter(|id| allowed_recipients.contains(id));
        if recipient.is_none() {
            errors.add("recipient_id", "Select a valid recipient.");
        }

        match message.clean() {
            Ok(input) => match recipient {
                Some(recipient) if errors.is_empty() => Ok((recipient, input)),
                _ => Err(errors),
            },
            Err(message_errors) => {
                errors.merge(message_errors);
                Err(errors)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_form_trims_content() {
        let form = MessageForm {
            subject: String::new(),
            content: "  The heating is fixed.  ".to_string(),
        };
        let input = form.clean().unwrap();
        assert_eq!(input.content, "The heating is fixed.");
        assert_eq!(input.subject, None);
    }

    #[test]
    fn test_message_form_rejects_blank() {
        let form = MessageForm {
            subject: "Hello".to_string(),
            content: " \n ".to_string(),
        };
        assert_eq!(
            form.clean().unwrap_err().get("content"),
            ["Message cannot be empty.".to_string()]
        );
    }

    #[test]
    fn test_message_form_length_limit() {
        let ok = MessageForm {
            subject: String::new(),
            content: "a".repeat(MAX_MESSAGE_LENGTH),
        };
        assert!(ok.clean().is_ok());

        let too_long = MessageForm {
            subject: String::new(),
            content: "a".repeat(MAX_MESSAGE_LENGTH + 1),
        };
        assert!(too_long.clean().unwrap_err().has("content"));
    }

    #[test]
    fn test_compose_form_requires_allowed_recipient() {
        let allowed = Uuid::new_v4();
        let form = ComposeForm {
            recipient_id: Uuid::new_v4().to_string(),
            subject: "Rent".to_string(),
            content: "Paid.".to_string(),
        };
        assert!(form.clean(&[allowed]).unwrap_err().has("recipient_id"));

        let form = ComposeForm {
            recipient_id: allowed.to_string(),
            ..form
        };
        let (recipient, input) = form.clean(&[allowed]).unwrap();
        assert_eq!(recipient, allowed);
        assert_eq!(input.subject.as_deref(), Some("Rent"));
    }

    #[test]
    fn test_compose_form_reports_both_fields() {
        let errors = ComposeForm::default().clean(&[]).unwrap_err();
        assert!(errors.has("recipient_id"));
        assert!(errors.has("content"));
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("The boiler is broken again", 10), "The boiler…");
        assert_eq!(preview("żółć żółć", 4), "żółć…");
    }

    #[test]
    fn test_recipient_display_name() {
        let r = Recipient {
            user_id: Uuid::new_v4(),
            email: "t@example.com".to_string(),
            name: Some("Anna".to_string()),
        };
        assert_eq!(r.display_name(), "Anna <t@example.com>");
        let r = Recipient { name: None, ..r };
        assert_eq!(r.display_name(), "t@example.com");
    }
}
