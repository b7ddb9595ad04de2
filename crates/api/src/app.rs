use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::Config;
use crate::middleware::{
    csrf_middleware, flash_middleware, metrics_handler, metrics_middleware,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{
    self, agreements, auth, dashboard, health, invitations, messages, payments, profile,
    properties, reminders, static_assets, tenants,
};
use crate::services::cookies::CookieHelper;
use crate::services::email::{EmailService, Mailer};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub cookies: CookieHelper,
    pub mailer: Arc<dyn Mailer>,
    /// Per-email login limiter; `None` when disabled.
    pub login_limiter: Option<Arc<RateLimiterState>>,
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let mailer = Arc::new(EmailService::new(config.email.clone()));
    create_app_with_mailer(config, pool, mailer)
}

/// Builds the router with a custom outbound mailer.
pub fn create_app_with_mailer(config: Config, pool: PgPool, mailer: Arc<dyn Mailer>) -> Router {
    let config = Arc::new(config);

    let login_limiter =
        RateLimiterState::new(config.security.login_attempts_per_minute).map(Arc::new);

    let state = AppState {
        pool,
        cookies: CookieHelper::new(
            config.security.secure_cookies,
            config.security.session_ttl_hours,
        ),
        config: config.clone(),
        mailer,
        login_limiter,
    };

    let auth_routes = Router::new()
        .route("/", get(auth::index))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/profile", get(profile::profile).post(profile::update_profile))
        .route("/tenants", get(tenants::list_tenants));

    let property_routes = Router::new()
        .route(
            "/properties",
            get(properties::list_properties).post(properties::create_property),
        )
        .route("/properties/new", get(properties::new_property))
        .route(
            "/properties/:id",
            get(properties::property_detail).post(properties::update_property),
        )
        .route("/properties/:id/delete", post(properties::delete_property));

    let notification_routes = Router::new()
        .route(
            "/invitations",
            get(invitations::list_invitations).post(invitations::send_invitation),
        )
        .route(
            "/invitations/:id/resend",
            post(invitations::resend_invitation),
        )
        .route(
            "/invitations/:id/cancel",
            post(invitations::cancel_invitation),
        )
        .route(
            "/invitations/accept/:token",
            get(invitations::accept_page).post(invitations::accept_invitation),
        )
        .route(
            "/invitations/decline/:token",
            post(invitations::decline_invitation),
        )
        .route(
            "/reminders",
            get(reminders::list_reminders).post(reminders::create_reminder),
        )
        .route("/reminders/:id", post(reminders::update_reminder))
        .route("/reminders/:id/edit", get(reminders::edit_reminder))
        .route("/reminders/:id/delete", post(reminders::delete_reminder))
        .route("/reminders/:id/toggle", post(reminders::toggle_reminder));

    let ledger_routes = Router::new()
        .route(
            "/agreements",
            get(agreements::list_agreements).post(agreements::create_agreement),
        )
        .route("/agreements/:id", post(agreements::update_agreement))
        .route("/agreements/:id/edit", get(agreements::edit_agreement))
        .route("/agreements/:id/delete", post(agreements::delete_agreement))
        .route(
            "/agreements/:id/details.json",
            get(agreements::agreement_details),
        )
        .route(
            "/payments",
            get(payments::monthly_payments).post(payments::create_payment),
        )
        .route("/payments/new", get(payments::new_payment))
        .route("/payments/my", get(payments::my_payments))
        .route("/payments/report", get(payments::payments_report))
        .route("/payments/:id", post(payments::update_payment))
        .route("/payments/:id/edit", get(payments::edit_payment))
        .route("/payments/:id/delete", post(payments::delete_payment));

    let message_routes = Router::new()
        .route("/messages", get(messages::list_conversations))
        .route(
            "/messages/new",
            get(messages::compose_page).post(messages::send_new_message),
        )
        .route(
            "/messages/conversation/:user_id",
            get(messages::conversation).post(messages::reply),
        );

    // Public routes (no session, no CSRF)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::ready))
        .route("/health/live", get(health::live))
        .route("/metrics", get(metrics_handler))
        .route("/static/*path", get(static_assets::static_file));

    let pages = Router::new()
        .merge(auth_routes)
        .merge(property_routes)
        .merge(notification_routes)
        .merge(ledger_routes)
        .merge(message_routes)
        // Flash runs inside CSRF so both are available to the Page extractor
        .layer(middleware::from_fn_with_state(
            state.clone(),
            flash_middleware,
        ))
        .layer(middleware::from_fn_with_state(state.clone(), csrf_middleware));

    Router::new()
        .merge(public_routes)
        .merge(pages)
        .fallback(routes::not_found)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .with_state(state)
}
