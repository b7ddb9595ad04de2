use axum::{extract::State, response::Html};
use domain::models::Contact;
use persistence::repositories::UserRepository;

use crate::app::AppState;
use crate::error::AppError;
use crate::extractors::LandlordUser;
use crate::views::tenants::tenants_page;
use crate::views::Page;

/// Tenants who accepted one of the landlord's invitations, by name.
pub async fn list_tenants(
    State(state): State<AppState>,
    landlord: LandlordUser,
    page: Page,
) -> Result<Html<String>, AppError> {
    let tenants: Vec<Contact> = UserRepository::new(state.pool.clone())
        .list_tenants_of_landlord(landlord.id())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(tenants_page(&page, &tenants))
}
