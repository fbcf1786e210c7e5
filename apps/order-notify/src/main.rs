//! Order status email service
//!
//! Serves `POST /send-order-status-email/` and delivers each email through
//! the configured SMTP server.

use axum_helpers::server::{create_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_order_notifications::{ApiDoc, OrderNotificationService, handlers};
use email::SmtpTransport;
use tracing::info;

mod config;

use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first so configuration errors are reported nicely
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    info!(
        name = config.app.name,
        version = config.app.version,
        smtp = ?config.smtp,
        "Starting order notification service"
    );

    let transport = SmtpTransport::new(config.smtp.clone());
    let service = OrderNotificationService::new(transport, config.branding.clone());

    // - /send-order-status-email/: order status emails
    // - /ready: SMTP reachability
    // - /health: liveness with app name/version
    let api_routes = handlers::router(service).merge(health_router(config.app));
    let router = create_router::<ApiDoc>(api_routes);

    create_app(router, &config.server)
        .await
        .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Order notification service shutdown complete");
    Ok(())
}
