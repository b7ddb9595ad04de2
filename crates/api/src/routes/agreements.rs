use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use domain::models::lease::RentalAgreementForm;
use domain::models::{AgreementDetails, AgreementSummary, Contact, FormErrors, Property};
use domain::services::authorization::{tenancy_access, Access};
use persistence::repositories::{PropertyRepository, RentalAgreementRepository, UserRepository};
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::AppError;
use crate::extractors::{CsrfForm, LandlordUser, NoFields};
use crate::services::flash::{redirect, FlashMessage};
use crate::views::agreements::{edit_page, list_page, AgreementChoices};
use crate::views::Page;

async fn choices(state: &AppState, landlord_id: Uuid) -> Result<AgreementChoices, AppError> {
    let properties: Vec<Property> = PropertyRepository::new(state.pool.clone())
        .list_by_landlord(landlord_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let tenants: Vec<Contact> = UserRepository::new(state.pool.clone())
        .list_tenants_of_landlord(landlord_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(AgreementChoices {
        properties,
        tenants,
    })
}

pub(crate) async fn landlord_agreements(
    state: &AppState,
    landlord_id: Uuid,
) -> Result<Vec<AgreementSummary>, AppError> {
    Ok(RentalAgreementRepository::new(state.pool.clone())
        .list_by_landlord(landlord_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect())
}

/// Loads an agreement whose property belongs to `landlord`.
async fn owned_agreement(
    state: &AppState,
    landlord: &LandlordUser,
    id: Uuid,
) -> Result<AgreementSummary, AppError> {
    let detail = RentalAgreementRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(AppError::not_found)?;

    match tenancy_access(landlord.current.actor(), detail.landlord_id) {
        Access::Allowed => Ok(detail.into()),
        Access::Forbidden => Err(AppError::forbidden()),
        Access::NotFound => Err(AppError::not_found()),
    }
}

pub async fn list_agreements(
    State(state): State<AppState>,
    landlord: LandlordUser,
    page: Page,
) -> Result<Html<String>, AppError> {
    let agreements = landlord_agreements(&state, landlord.id()).await?;
    let choices = choices(&state, landlord.id()).await?;
    Ok(list_page(
        &page,
        &agreements,
        &choices,
        &RentalAgreementForm::default(),
        &FormErrors::new(),
    ))
}

pub async fn create_agreement(
    State(state): State<AppState>,
    landlord: LandlordUser,
    page: Page,
    CsrfForm(form): CsrfForm<RentalAgreementForm>,
) -> Result<Response, AppError> {
    let choices = choices(&state, landlord.id()).await?;

    let input = match form.clean(&choices.property_ids(), &choices.tenant_ids()) {
        Ok(input) => input,
        Err(errors) => {
            let agreements = landlord_agreements(&state, landlord.id()).await?;
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                list_page(&page, &agreements, &choices, &form, &errors),
            )
                .into_response());
        }
    };

    let agreement = RentalAgreementRepository::new(state.pool.clone())
        .create(&input)
        .await?;
    info!(
        agreement_id = %agreement.id,
        property_id = %agreement.property_id,
        tenant_id = %agreement.tenant_id,
        "Rental agreement created"
    );

    Ok(redirect(
        &state.cookies,
        "/agreements",
        FlashMessage::success("Rental agreement created successfully."),
    ))
}

pub async fn edit_agreement(
    State(state): State<AppState>,
    landlord: LandlordUser,
    page: Page,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let summary = owned_agreement(&state, &landlord, id).await?;
    let choices = choices(&state, landlord.id()).await?;
    let form = RentalAgreementForm::from_agreement(&summary.agreement);
    Ok(edit_page(&page, id, &choices, &form, &FormErrors::new()))
}

pub async fn update_agreement(
    State(state): State<AppState>,
    landlord: LandlordUser,
    Path(id): Path<Uuid>,
    page: Page,
    CsrfForm(form): CsrfForm<RentalAgreementForm>,
) -> Result<Response, AppError> {
    owned_agreement(&state, &landlord, id).await?;
    let choices = choices(&state, landlord.id()).await?;

    let input = match form.clean(&choices.property_ids(), &choices.tenant_ids()) {
        Ok(input) => input,
        Err(errors) => {
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                edit_page(&page, id, &choices, &form, &errors),
            )
                .into_response())
        }
    };

    RentalAgreementRepository::new(state.pool.clone())
        .update(id, &input)
        .await?
        .ok_or_else(AppError::not_found)?;
    info!(agreement_id = %id, "Rental agreement updated");

    Ok(redirect(
        &state.cookies,
        "/agreements",
        FlashMessage::success("Rental agreement updated successfully."),
    ))
}

pub async fn delete_agreement(
    State(state): State<AppState>,
    landlord: LandlordUser,
    Path(id): Path<Uuid>,
    CsrfForm(_): CsrfForm<NoFields>,
) -> Result<Response, AppError> {
    owned_agreement(&state, &landlord, id).await?;
    if !RentalAgreementRepository::new(state.pool.clone())
        .delete(id)
        .await?
    {
        return Err(AppError::not_found());
    }
    info!(agreement_id = %id, "Rental agreement deleted");

    Ok(redirect(
        &state.cookies,
        "/agreements",
        FlashMessage::success("Rental agreement deleted successfully."),
    ))
}

/// Agreed fees, used by the payment form to prefill amounts.
pub async fn agreement_details(
    State(state): State<AppState>,
    landlord: LandlordUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AgreementDetails>, AppError> {
    let summary = owned_agreement(&state, &landlord, id).await?;
    Ok(Json(AgreementDetails::from(&summary)))
}
