//! Tenant invitation handlers: the landlord's list and send form, resend and
//! cancel, plus the public accept and decline pages reached by token.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use domain::models::form::NON_FIELD_ERRORS;
use domain::models::invitation::{
    check_duplicate, invitation_expiry, AcceptInvitationForm, InvitationForm,
};
use domain::models::{FormErrors, InvitationStatus, InvitationSummary, Property};
use domain::services::authorization::{tenancy_access, Access};
use persistence::repositories::{
    AcceptOutcome, InvitationRepository, PropertyRepository, UserRepository,
};
use shared::password::hash_password;
use tracing::{error, info};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::{is_unique_violation, AppError};
use crate::extractors::{CsrfForm, LandlordUser, NoFields};
use crate::middleware::metrics::{record_invitation_accepted, record_invitation_sent};
use crate::services::email::{accept_url, invitation_message, InvitationEmail};
use crate::services::flash::{redirect, FlashMessage};
use crate::views::auth::accept_invitation_page;
use crate::views::invitations::list_page;
use crate::views::Page;

const NOT_RESENDABLE: &str = "Invitation not found or cannot be resent.";
const NOT_TENANT: &str = "An account with this email already exists and is not a tenant account.";
const NO_LONGER_VALID: &str = "This invitation is no longer valid.";

/// Landlord's invitations and properties, after expiring overdue rows.
async fn load_list(
    state: &AppState,
    landlord_id: Uuid,
    now: DateTime<Utc>,
) -> Result<(Vec<InvitationSummary>, Vec<Property>), AppError> {
    let invitations = InvitationRepository::new(state.pool.clone());
    let expired = invitations.expire_overdue(now).await?;
    if expired > 0 {
        info!(expired, "Expired overdue invitations");
    }

    let summaries = invitations
        .list_by_landlord(landlord_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let properties = PropertyRepository::new(state.pool.clone())
        .list_by_landlord(landlord_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok((summaries, properties))
}

/// Emails the accept link. Delivery failures are logged and reported to the
/// caller, the invitation row is kept either way.
async fn deliver(
    state: &AppState,
    landlord: &LandlordUser,
    email: &str,
    property_address: &str,
    token: Uuid,
) -> bool {
    let url = accept_url(&state.config.server.base_url, &token);
    let landlord_name = if landlord.profile.name.trim().is_empty() {
        landlord.user().email.as_str()
    } else {
        landlord.profile.name.as_str()
    };
    let message = invitation_message(&InvitationEmail {
        to: email,
        landlord_name,
        property_address,
        accept_url: &url,
        expiry_days: state.config.invitations.expiry_days,
    });

    match state.mailer.send(message).await {
        Ok(()) => true,
        Err(e) => {
            error!(error = %e, to = %email, "Failed to send invitation email");
            false
        }
    }
}

fn sent_flash(delivered: bool, success: &str) -> FlashMessage {
    if delivered {
        FlashMessage::success(success)
    } else {
        FlashMessage::error("The invitation was saved but the email could not be sent.")
    }
}

pub async fn list_invitations(
    State(state): State<AppState>,
    landlord: LandlordUser,
    page: Page,
) -> Result<Html<String>, AppError> {
    let now = Utc::now();
    let (invitations, properties) = load_list(&state, landlord.id(), now).await?;
    Ok(list_page(
        &page,
        &invitations,
        &properties,
        &InvitationForm::default(),
        &FormErrors::new(),
        now,
    ))
}

pub async fn send_invitation(
    State(state): State<AppState>,
    landlord: LandlordUser,
    page: Page,
    CsrfForm(form): CsrfForm<InvitationForm>,
) -> Result<Response, AppError> {
    let now = Utc::now();
    let (invitations, properties) = load_list(&state, landlord.id(), now).await?;
    let invalid = |errors: FormErrors| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            list_page(&page, &invitations, &properties, &form, &errors, now),
        )
            .into_response()
    };

    let allowed: Vec<Uuid> = properties.iter().map(|p| p.id).collect();
    let input = match form.clean(&allowed) {
        Ok(input) => input,
        Err(errors) => return Ok(invalid(errors)),
    };

    let repo = InvitationRepository::new(state.pool.clone());
    let existing: Vec<InvitationStatus> = repo
        .statuses_for(&input.email, input.property_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    if let Err(duplicate) = check_duplicate(&existing) {
        return Ok(invalid(FormErrors::single("email", duplicate.message())));
    }

    let token = Uuid::new_v4();
    let expires_at = invitation_expiry(now, state.config.invitations.expiry_days);
    let invitation = repo
        .create(&input.email, input.property_id, landlord.id(), token, expires_at)
        .await?;
    record_invitation_sent(false);
    info!(invitation_id = %invitation.id, landlord_id = %landlord.id(), "Invitation created");

    let address = properties
        .iter()
        .find(|p| p.id == input.property_id)
        .map(Property::display_address)
        .unwrap_or_default();
    let delivered = deliver(&state, &landlord, &input.email, &address, token).await;

    Ok(redirect(
        &state.cookies,
        "/invitations",
        sent_flash(delivered, "Invitation sent successfully!"),
    ))
}

pub async fn resend_invitation(
    State(state): State<AppState>,
    landlord: LandlordUser,
    Path(id): Path<Uuid>,
    CsrfForm(_): CsrfForm<NoFields>,
) -> Result<Response, AppError> {
    let not_resendable =
        || redirect(&state.cookies, "/invitations", FlashMessage::error(NOT_RESENDABLE));

    let repo = InvitationRepository::new(state.pool.clone());
    let summary: InvitationSummary = match repo.find_by_id(id).await? {
        Some(detail) => detail.into(),
        None => return Ok(not_resendable()),
    };
    if !tenancy_access(landlord.current.actor(), summary.invitation.landlord_id).is_allowed()
        || !summary.invitation.can_resend()
    {
        return Ok(not_resendable());
    }

    let now = Utc::now();
    let token = Uuid::new_v4();
    let expires_at = invitation_expiry(now, state.config.invitations.expiry_days);
    // A newer live invitation for the same email and property wins
    match repo.resend(id, token, now, expires_at).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_resendable()),
        Err(e) if is_unique_violation(&e) => {
            info!(invitation_id = %id, "Resend refused: a live invitation already exists");
            return Ok(not_resendable());
        }
        Err(e) => return Err(e.into()),
    }
    record_invitation_sent(true);
    info!(invitation_id = %id, "Invitation resent");

    let delivered = deliver(
        &state,
        &landlord,
        &summary.invitation.email,
        &summary.property_address,
        token,
    )
    .await;

    Ok(redirect(
        &state.cookies,
        "/invitations",
        sent_flash(delivered, "Invitation resent successfully!"),
    ))
}

pub async fn cancel_invitation(
    State(state): State<AppState>,
    landlord: LandlordUser,
    Path(id): Path<Uuid>,
    CsrfForm(_): CsrfForm<NoFields>,
) -> Result<Response, AppError> {
    let repo = InvitationRepository::new(state.pool.clone());
    let detail = repo.find_by_id(id).await?.ok_or_else(AppError::not_found)?;

    match tenancy_access(landlord.current.actor(), detail.invitation.landlord_id) {
        Access::Allowed => {}
        Access::Forbidden => return Err(AppError::forbidden()),
        Access::NotFound => return Err(AppError::not_found()),
    }

    if !repo.delete(id).await? {
        return Err(AppError::not_found());
    }
    info!(invitation_id = %id, "Invitation cancelled");

    Ok(redirect(
        &state.cookies,
        "/invitations",
        FlashMessage::success("Invitation deleted successfully!"),
    ))
}

/// Pending, unexpired invitation for `token`, and whether its email still
/// needs an account.
async fn actionable_invitation(
    state: &AppState,
    token: Uuid,
    now: DateTime<Utc>,
) -> Result<(InvitationSummary, bool), AppError> {
    let repo = InvitationRepository::new(state.pool.clone());
    repo.expire_overdue(now).await?;

    let summary: InvitationSummary = repo
        .find_by_token(token)
        .await?
        .ok_or_else(|| AppError::NotFound(NO_LONGER_VALID.into()))?
        .into();
    if !summary.invitation.is_actionable(now) {
        return Err(AppError::NotFound(NO_LONGER_VALID.into()));
    }

    let needs_account = UserRepository::new(state.pool.clone())
        .find_by_email(&summary.invitation.email)
        .await?
        .is_none();
    Ok((summary, needs_account))
}

pub async fn accept_page(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
    page: Page,
) -> Result<Html<String>, AppError> {
    let (summary, needs_account) = actionable_invitation(&state, token, Utc::now()).await?;
    Ok(accept_invitation_page(
        &page,
        &summary,
        needs_account,
        &AcceptInvitationForm::default(),
        &FormErrors::new(),
    ))
}

pub async fn accept_invitation(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
    page: Page,
    CsrfForm(form): CsrfForm<AcceptInvitationForm>,
) -> Result<Response, AppError> {
    let now = Utc::now();
    let (summary, needs_account) = actionable_invitation(&state, token, now).await?;
    let rerender = |status: StatusCode, needs_account: bool, errors: FormErrors| {
        (
            status,
            accept_invitation_page(&page, &summary, needs_account, &form, &errors),
        )
            .into_response()
    };

    let password_hash = if needs_account {
        match form.clean_new_account(&summary.invitation.email) {
            Ok(password) => Some(hash_password(&password)?),
            Err(errors) => return Ok(rerender(StatusCode::UNPROCESSABLE_ENTITY, true, errors)),
        }
    } else {
        None
    };

    let outcome = InvitationRepository::new(state.pool.clone())
        .accept(token, password_hash.as_deref(), now)
        .await?;

    match outcome {
        AcceptOutcome::Accepted {
            user,
            account_created,
        } => {
            record_invitation_accepted(account_created);
            info!(
                invitation_id = %summary.invitation.id,
                user_id = %user.id,
                account_created,
                "Invitation accepted"
            );
            Ok(redirect(
                &state.cookies,
                "/login",
                FlashMessage::success("Invitation accepted successfully! You can now log in."),
            ))
        }
        AcceptOutcome::NotAvailable => Err(AppError::NotFound(NO_LONGER_VALID.into())),
        AcceptOutcome::NotTenant => Ok(rerender(
            StatusCode::CONFLICT,
            false,
            FormErrors::single(NON_FIELD_ERRORS, NOT_TENANT),
        )),
        // The account was removed between rendering and submitting.
        AcceptOutcome::PasswordRequired => Ok(rerender(
            StatusCode::UNPROCESSABLE_ENTITY,
            true,
            FormErrors::single("password", "This field is required."),
        )),
    }
}

pub async fn decline_invitation(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
    CsrfForm(_): CsrfForm<NoFields>,
) -> Result<Response, AppError> {
    let now = Utc::now();
    let repo = InvitationRepository::new(state.pool.clone());
    repo.expire_overdue(now).await?;

    if !repo.decline(token, now).await? {
        return Err(AppError::NotFound(NO_LONGER_VALID.into()));
    }
    info!(token = %token, "Invitation declined");

    Ok(redirect(
        &state.cookies,
        "/login",
        FlashMessage::info("Invitation declined."),
    ))
}
