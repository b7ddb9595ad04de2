//! Profile page and profile update handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use domain::models::user::ProfileForm;
use domain::models::{FormErrors, LandlordProfile, TenantProfile, User, UserRole};
use domain::services::authorization::can_edit_profile;
use persistence::repositories::{PropertyRepository, ReminderRepository, UserRepository};
use tracing::info;

use crate::app::AppState;
use crate::error::AppError;
use crate::extractors::{CsrfForm, CurrentUser};
use crate::services::flash::{redirect, FlashMessage};
use crate::views::profile::{profile_page, ProfileDetails};
use crate::views::Page;

/// Role data for the profile page, with the edit form prefilled from it.
async fn load_details(
    state: &AppState,
    user: &User,
) -> Result<(ProfileDetails, ProfileForm), AppError> {
    match user.role {
        UserRole::Landlord => {
            let profile: LandlordProfile = UserRepository::new(state.pool.clone())
                .ensure_landlord_profile(user.id, &user.email)
                .await?
                .into();
            let properties = PropertyRepository::new(state.pool.clone())
                .list_by_landlord(user.id)
                .await?
                .into_iter()
                .map(Into::into)
                .collect();
            let reminders = ReminderRepository::new(state.pool.clone())
                .list_by_landlord(user.id)
                .await?
                .into_iter()
                .map(Into::into)
                .collect();
            let form = ProfileForm::from_landlord(&profile);
            Ok((
                ProfileDetails::Landlord {
                    profile,
                    properties,
                    reminders,
                },
                form,
            ))
        }
        UserRole::Tenant => {
            let profile: TenantProfile = UserRepository::new(state.pool.clone())
                .find_tenant_profile(user.id)
                .await?
                .ok_or_else(|| AppError::NotFound("Profile not found.".to_string()))?
                .into();
            let form = ProfileForm::from_tenant(&profile);
            Ok((ProfileDetails::Tenant { profile }, form))
        }
        UserRole::Administrator => Ok((ProfileDetails::Administrator, ProfileForm::default())),
    }
}

pub async fn profile(
    State(state): State<AppState>,
    current: CurrentUser,
    page: Page,
) -> Result<Response, AppError> {
    let (details, form) = load_details(&state, &current.user).await?;
    Ok(profile_page(
        &page,
        &current.user,
        &details,
        &form,
        &FormErrors::new(),
        Utc::now(),
    )
    .into_response())
}

pub async fn update_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    page: Page,
    CsrfForm(form): CsrfForm<ProfileForm>,
) -> Result<Response, AppError> {
    let user = &current.user;
    if !can_edit_profile(user.role) {
        return Ok(redirect(
            &state.cookies,
            "/profile",
            FlashMessage::error("Administrators don't have an editable profile here."),
        ));
    }

    let update = match form.clean() {
        Ok(update) => update,
        Err(errors) => {
            let (details, _) = load_details(&state, user).await?;
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                profile_page(&page, user, &details, &form, &errors, Utc::now()),
            )
                .into_response());
        }
    };

    let users = UserRepository::new(state.pool.clone());
    let updated = if user.is_landlord() {
        users.ensure_landlord_profile(user.id, &user.email).await?;
        users
            .update_landlord_profile(
                user.id,
                &update.name,
                &update.contact_info,
                update.tax_residency_country.as_deref(),
            )
            .await?
            .is_some()
    } else {
        users
            .update_tenant_profile(user.id, &update.name, &update.contact_info)
            .await?
            .is_some()
    };

    if !updated {
        return Ok(redirect(
            &state.cookies,
            "/profile",
            FlashMessage::error("Profile not found to update."),
        ));
    }

    info!(user_id = %user.id, "Profile updated");
    Ok(redirect(
        &state.cookies,
        "/profile",
        FlashMessage::success("Profile updated successfully."),
    ))
}
