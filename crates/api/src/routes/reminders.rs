use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chrono::Utc;
use domain::models::reminder::ReminderForm;
use domain::models::{FormErrors, Property, ReminderSummary};
use domain::services::authorization::{tenancy_access, Access};
use persistence::repositories::{PropertyRepository, ReminderRepository};
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::AppError;
use crate::extractors::{CsrfForm, LandlordUser, NoFields};
use crate::services::flash::{redirect, FlashMessage};
use crate::views::reminders::{edit_page, list_page};
use crate::views::Page;

async fn landlord_properties(
    state: &AppState,
    landlord_id: Uuid,
) -> Result<Vec<Property>, AppError> {
    Ok(PropertyRepository::new(state.pool.clone())
        .list_by_landlord(landlord_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect())
}

async fn landlord_reminders(
    state: &AppState,
    landlord_id: Uuid,
) -> Result<Vec<ReminderSummary>, AppError> {
    Ok(ReminderRepository::new(state.pool.clone())
        .list_by_landlord(landlord_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect())
}

/// Loads a reminder whose property belongs to `landlord`.
async fn owned_reminder(
    state: &AppState,
    landlord: &LandlordUser,
    id: Uuid,
) -> Result<ReminderSummary, AppError> {
    let detail = ReminderRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(AppError::not_found)?;

    match tenancy_access(landlord.current.actor(), detail.landlord_id) {
        Access::Allowed => Ok(detail.into()),
        Access::Forbidden => Err(AppError::forbidden()),
        Access::NotFound => Err(AppError::not_found()),
    }
}

pub async fn list_reminders(
    State(state): State<AppState>,
    landlord: LandlordUser,
    page: Page,
) -> Result<Html<String>, AppError> {
    let reminders = landlord_reminders(&state, landlord.id()).await?;
    let properties = landlord_properties(&state, landlord.id()).await?;
    Ok(list_page(
        &page,
        &reminders,
        &properties,
        &ReminderForm::default(),
        &FormErrors::new(),
        Utc::now(),
    ))
}

pub async fn create_reminder(
    State(state): State<AppState>,
    landlord: LandlordUser,
    page: Page,
    CsrfForm(form): CsrfForm<ReminderForm>,
) -> Result<Response, AppError> {
    let properties = landlord_properties(&state, landlord.id()).await?;
    let allowed: Vec<Uuid> = properties.iter().map(|p| p.id).collect();

    let input = match form.clean(&allowed) {
        Ok(input) => input,
        Err(errors) => {
            let reminders = landlord_reminders(&state, landlord.id()).await?;
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                list_page(&page, &reminders, &properties, &form, &errors, Utc::now()),
            )
                .into_response());
        }
    };

    let reminder = ReminderRepository::new(state.pool.clone())
        .create(&input)
        .await?;
    info!(reminder_id = %reminder.id, property_id = %reminder.property_id, "Reminder created");

    Ok(redirect(
        &state.cookies,
        "/reminders",
        FlashMessage::success("Reminder created successfully."),
    ))
}

pub async fn edit_reminder(
    State(state): State<AppState>,
    landlord: LandlordUser,
    page: Page,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let summary = owned_reminder(&state, &landlord, id).await?;
    let properties = landlord_properties(&state, landlord.id()).await?;
    let form = ReminderForm::from_reminder(&summary.reminder);
    Ok(edit_page(&page, id, &properties, &form, &FormErrors::new()))
}

pub async fn update_reminder(
    State(state): State<AppState>,
    landlord: LandlordUser,
    Path(id): Path<Uuid>,
    page: Page,
    CsrfForm(form): CsrfForm<ReminderForm>,
) -> Result<Response, AppError> {
    owned_reminder(&state, &landlord, id).await?;
    let properties = landlord_properties(&state, landlord.id()).await?;
    let allowed: Vec<Uuid> = properties.iter().map(|p| p.id).collect();

    let input = match form.clean(&allowed) {
        Ok(input) => input,
        Err(errors) => {
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                edit_page(&page, id, &properties, &form, &errors),
            )
                .into_response())
        }
    };

    ReminderRepository::new(state.pool.clone())
        .update(id, &input)
        .await?
        .ok_or_else(AppError::not_found)?;
    info!(reminder_id = %id, "Reminder updated");

    Ok(redirect(
        &state.cookies,
        "/reminders",
        FlashMessage::success("Reminder updated successfully."),
    ))
}

pub async fn delete_reminder(
    State(state): State<AppState>,
    landlord: LandlordUser,
    Path(id): Path<Uuid>,
    CsrfForm(_): CsrfForm<NoFields>,
) -> Result<Response, AppError> {
    owned_reminder(&state, &landlord, id).await?;
    if !ReminderRepository::new(state.pool.clone()).delete(id).await? {
        return Err(AppError::not_found());
    }
    info!(reminder_id = %id, "Reminder deleted");

    Ok(redirect(
        &state.cookies,
        "/reminders",
        FlashMessage::success("Reminder deleted successfully."),
    ))
}

pub async fn toggle_reminder(
    State(state): State<AppState>,
    landlord: LandlordUser,
    Path(id): Path<Uuid>,
    CsrfForm(_): CsrfForm<NoFields>,
) -> Result<Response, AppError> {
    owned_reminder(&state, &landlord, id).await?;
    let reminder = ReminderRepository::new(state.pool.clone())
        .toggle_completed(id)
        .await?
        .ok_or_else(AppError::not_found)?;

    let message = if reminder.is_completed {
        "Reminder marked as completed."
    } else {
        "Reminder marked as not completed."
    };
    Ok(redirect(
        &state.cookies,
        "/reminders",
        FlashMessage::success(message),
    ))
}
