//! Property list, create, detail, update and delete handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use domain::models::property::PropertyForm;
use domain::models::{FormErrors, Property};
use domain::services::authorization::{
    can_create_property, can_list_properties, property_access, sees_all_properties, Access, Actor,
};
use persistence::repositories::PropertyRepository;
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::AppError;
use crate::extractors::{CsrfForm, CurrentUser, LandlordUser, NoFields};
use crate::middleware::metrics::record_property_created;
use crate::services::flash::{redirect, FlashMessage};
use crate::views::properties::{detail_page, list_page, new_page};
use crate::views::Page;

/// Loads a property and applies the ownership policy for `actor`.
async fn load_property(state: &AppState, actor: Actor, id: Uuid) -> Result<Property, AppError> {
    let property: Property = PropertyRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(AppError::not_found)?
        .into();

    match property_access(actor, property.landlord_id) {
        Access::Allowed => Ok(property),
        Access::Forbidden => Err(AppError::forbidden()),
        Access::NotFound => Err(AppError::not_found()),
    }
}

pub async fn list_properties(
    State(state): State<AppState>,
    current: CurrentUser,
    page: Page,
) -> Result<Html<String>, AppError> {
    let role = current.role();
    if !can_list_properties(role) {
        return Err(AppError::forbidden());
    }

    let repo = PropertyRepository::new(state.pool.clone());
    let rows = if sees_all_properties(role) {
        repo.list_all().await?
    } else {
        repo.list_by_landlord(current.user.id).await?
    };
    let properties: Vec<Property> = rows.into_iter().map(Into::into).collect();

    Ok(list_page(&page, &properties, can_create_property(role)))
}

pub async fn new_property(_landlord: LandlordUser, page: Page) -> Html<String> {
    new_page(&page, &PropertyForm::default(), &FormErrors::new())
}

pub async fn create_property(
    State(state): State<AppState>,
    landlord: LandlordUser,
    page: Page,
    CsrfForm(form): CsrfForm<PropertyForm>,
) -> Result<Response, AppError> {
    let input = match form.clean() {
        Ok(input) => input,
        Err(errors) => {
            return Ok(
                (StatusCode::UNPROCESSABLE_ENTITY, new_page(&page, &form, &errors))
                    .into_response(),
            )
        }
    };

    let property = PropertyRepository::new(state.pool.clone())
        .create(landlord.id(), &input)
        .await?;
    record_property_created();
    info!(property_id = %property.id, landlord_id = %landlord.id(), "Property created");

    Ok(redirect(
        &state.cookies,
        "/properties",
        FlashMessage::success("Property created successfully."),
    ))
}

pub async fn property_detail(
    State(state): State<AppState>,
    current: CurrentUser,
    page: Page,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let property = load_property(&state, current.actor(), id).await?;
    let form = PropertyForm::from_property(&property);
    Ok(detail_page(&page, &property, &form, &FormErrors::new()))
}

pub async fn update_property(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    page: Page,
    CsrfForm(form): CsrfForm<PropertyForm>,
) -> Result<Response, AppError> {
    let property = load_property(&state, current.actor(), id).await?;

    let input = match form.clean() {
        Ok(input) => input,
        Err(errors) => {
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                detail_page(&page, &property, &form, &errors),
            )
                .into_response())
        }
    };

    PropertyRepository::new(state.pool.clone())
        .update(property.id, &input)
        .await?
        .ok_or_else(AppError::not_found)?;
    info!(property_id = %property.id, user_id = %current.user.id, "Property updated");

    Ok(redirect(
        &state.cookies,
        &format!("/properties/{}", property.id),
        FlashMessage::success("Property updated successfully."),
    ))
}

pub async fn delete_property(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    CsrfForm(_): CsrfForm<NoFields>,
) -> Result<Response, AppError> {
    let property = load_property(&state, current.actor(), id).await?;

    if !PropertyRepository::new(state.pool.clone())
        .delete(property.id)
        .await?
    {
        return Err(AppError::not_found());
    }
    info!(property_id = %property.id, user_id = %current.user.id, "Property deleted");

    Ok(redirect(
        &state.cookies,
        "/properties",
        FlashMessage::success("Property deleted successfully."),
    ))
}
