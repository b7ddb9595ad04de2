use axum::{extract::State, response::Html};
use chrono::Utc;
use domain::models::{
    AdminDashboard, Dashboard, LandlordDashboard, TenantDashboard, UserRole,
};
use persistence::repositories::{
    InvitationRepository, PropertyRepository, ReminderRepository, UserRepository,
};

use crate::app::AppState;
use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::views::dashboard::dashboard_page;
use crate::views::Page;

/// Builds the role-specific summary for `current`.
async fn summary(state: &AppState, current: &CurrentUser) -> Result<Dashboard, AppError> {
    let user = &current.user;
    let dashboard = match user.role {
        UserRole::Landlord => {
            let now = Utc::now();
            let property_count = PropertyRepository::new(state.pool.clone())
                .count_by_landlord(user.id)
                .await?;
            let pending_invitation_count = InvitationRepository::new(state.pool.clone())
                .count_pending_by_landlord(user.id, now)
                .await?;
            let overdue_reminders = ReminderRepository::new(state.pool.clone())
                .list_overdue_by_landlord(user.id, now)
                .await?
                .into_iter()
                .map(Into::into)
                .collect();
            Dashboard::Landlord(LandlordDashboard {
                property_count,
                pending_invitation_count,
                overdue_reminders,
                unread_message_count: current.unread_messages,
            })
        }
        UserRole::Tenant => {
            let landlords = UserRepository::new(state.pool.clone())
                .list_landlords_of_tenant(&user.email)
                .await?
                .into_iter()
                .map(Into::into)
                .collect();
            Dashboard::Tenant(TenantDashboard {
                unread_message_count: current.unread_messages,
                landlords,
            })
        }
        UserRole::Administrator => Dashboard::Administrator(AdminDashboard {
            user_count: UserRepository::new(state.pool.clone()).count().await?,
            property_count: PropertyRepository::new(state.pool.clone())
                .count_all()
                .await?,
            unread_message_count: current.unread_messages,
        }),
    };
    Ok(dashboard)
}

pub async fn dashboard(
    State(state): State<AppState>,
    current: CurrentUser,
    page: Page,
) -> Result<Html<String>, AppError> {
    let dashboard = summary(&state, &current).await?;
    Ok(dashboard_page(&page, &dashboard))
}
