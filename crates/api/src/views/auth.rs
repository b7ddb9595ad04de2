//! Login, registration and invitation acceptance pages.

use axum::response::Html;
use domain::models::invitation::AcceptInvitationForm;
use domain::models::user::{LoginForm, RegisterForm};
use domain::models::{FormErrors, InvitationSummary};
use shared::html::escape;

use super::components::{checkbox, csrf_field, input, non_field_errors};
use super::layout::{render, Page};

pub fn login_page(page: &Page, form: &LoginForm, errors: &FormErrors) -> Html<String> {
    let next = form
        .next
        .as_deref()
        .map(|next| {
            format!(
                r#"<input type="hidden" name="next" value="{}">"#,
                escape(next)
            )
        })
        .unwrap_or_default();

    let body = format!(
        r#"<form method="post" action="/login" class="card">
{csrf}{non_field}{next}
{email}
{password}
<button type="submit" class="btn btn-primary">Log in</button>
</form>
<p>No account yet? <a href="/register">Register</a></p>"#,
        csrf = csrf_field(&page.csrf_token),
        non_field = non_field_errors(errors),
        next = next,
        email = input("email", "email", "Email", &form.email, errors),
        password = input("password", "password", "Password", "", errors),
    );
    render(page, "Log in", &body)
}

pub fn register_page(page: &Page, form: &RegisterForm, errors: &FormErrors) -> Html<String> {
    let body = format!(
        r#"<form method="post" action="/register" class="card">
{csrf}{non_field}
{email}
{password}
{confirm}
{landlord}
<button type="submit" class="btn btn-primary">Create account</button>
</form>
<p>Already registered? <a href="/login">Log in</a></p>"#,
        csrf = csrf_field(&page.csrf_token),
        non_field = non_field_errors(errors),
        email = input("email", "email", "Email", &form.email, errors),
        password = input("password", "password", "Password", "", errors),
        confirm = input(
            "password",
            "password_confirm",
            "Confirm password",
            "",
            errors
        ),
        landlord = checkbox("is_landlord", "I am a landlord", form.wants_landlord()),
    );
    render(page, "Register", &body)
}

/// Acceptance page for a pending invitation. Password fields are only shown
/// when no account exists for the invited email.
pub fn accept_invitation_page(
    page: &Page,
    invitation: &InvitationSummary,
    needs_account: bool,
    form: &AcceptInvitationForm,
    errors: &FormErrors,
) -> Html<String> {
    let token = invitation.invitation.token;
    let account_fields = if needs_account {
        format!(
            "<p>Choose a password for your new tenant account.</p>{}{}",
            input("password", "password", "Password", &form.password, errors),
            input(
                "password",
                "password_confirm",
                "Confirm password",
                &form.password_confirm,
                errors
            ),
        )
    } else {
        "<p>You already have an account; log in with it after accepting.</p>".to_string()
    };

    let body = format!(
        r#"<div class="card">
<p>You have been invited as a tenant of <strong>{address}</strong>.</p>
<p>Invitation for <strong>{email}</strong>.</p>
</div>
<form method="post" action="/invitations/accept/{token}" class="card">
{csrf}{non_field}
{account_fields}
<button type="submit" class="btn btn-primary">Accept invitation</button>
</form>
<form method="post" action="/invitations/decline/{token}" class="inline">
{csrf}<button type="submit" class="btn btn-secondary">Decline</button>
</form>"#,
        address = escape(&invitation.property_address),
        email = escape(&invitation.invitation.email),
        token = token,
        csrf = csrf_field(&page.csrf_token),
        non_field = non_field_errors(errors),
        account_fields = account_fields,
    );
    render(page, "Accept invitation", &body)
}
