//! Property reminder domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::form::FormErrors;
use shared::validation::parse_due_date;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Reminder {
    pub id: Uuid,
    pub property_id: Uuid,
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Display state of a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderBadge {
    Completed,
    Overdue,
    Upcoming,
}

impl ReminderBadge {
    pub fn label(&self) -> &'static str {
        match self {
            ReminderBadge::Completed => "Completed",
            ReminderBadge::Overdue => "Overdue",
            ReminderBadge::Upcoming => "Upcoming",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            ReminderBadge::Completed => "badge badge-success",
            ReminderBadge::Overdue => "badge badge-danger",
            ReminderBadge::Upcoming => "badge badge-info",
        }
    }
}

impl Reminder {
    /// Not completed and due before `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.is_completed && self.due_date < now
    }

    pub fn badge(&self, now: DateTime<Utc>) -> ReminderBadge {
        if self.is_completed {
            ReminderBadge::Completed
        } else if self.is_overdue(now) {
            ReminderBadge::Overdue
        } else {
            ReminderBadge::Upcoming
        }
    }
}

/// Reminder joined with its property address.
#[derive(Debug, Clone, Serialize)]
pub struct ReminderSummary {
    pub reminder: Reminder,
    pub property_address: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ReminderForm {
    #[validate(
        custom(function = "shared::validation::validate_not_blank"),
        length(max = 255, message = "Ensure this value has at most 255 characters.")
    )]
    #[serde(default)]
    pub title: String,

    #[validate(length(max = 5000, message = "Ensure this value has at most 5000 characters."))]
    #[serde(default)]
    pub description: String,

    /// `YYYY-MM-DD` from a date input.
    #[serde(default)]
    pub due_date: String,

    #[serde(default)]
    pub property_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReminderInput {
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub property_id: Uuid,
}

impl ReminderForm {
    pub fn from_reminder(reminder: &Reminder) -> Self {
        Self {
            title: reminder.title.clone(),
            description: reminder.description.clone(),
            due_date: reminder.due_date.format("%Y-%m-%d").to_string(),
            property_id: reminder.property_id.to_string(),
        }
    }

    /// Cleans the form; `property_id` must be one of `allowed_properties`.
    pub fn clean(&self, allowed_properties: &[Uuid]) -> Result<ReminderInput, FormErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FormErrors::new(),
            Err(e) => FormErrors::from(e),
        };

        let due_date = parse_due_date(&self.due_date)
            .map_err(|message| errors.add("due_date", message))
            .ok();

        let property_id = Uuid::parse_str(self.property_id.trim())
            .ok()
            .filter(|id| allowed_properties.contains(id));
        if property_id.is_none() {
            errors.add(
                "property_id",
                "Select a valid choice. That choice is not one of the available choices.",
            );
        }

        match (due_date, property_id) {
            (Some(due_date), Some(property_id)) if errors.is_empty() => Ok(ReminderInput {
                title: self.title.trim().to_string(),
                description: self.description.trim().to_string(),
                due_date,
                property_id,
            }),
            _ => Err(errors),
        }
    }
}
