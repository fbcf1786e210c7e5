use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{ErrorResponse, HealthCheckFuture, ValidatedJson, run_health_checks};
use email::MailTransport;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::OrderNotificationResult;
use crate::models::{EmailSentResponse, OrderEmailRequest, OrderStatus};
use crate::service::OrderNotificationService;

pub const TAG: &str = "order-notifications";

/// OpenAPI documentation for the order notification API
#[derive(OpenApi)]
#[openapi(
    paths(send_order_status_email, readiness),
    components(schemas(OrderEmailRequest, OrderStatus, EmailSentResponse, ErrorResponse)),
    tags(
        (name = TAG, description = "Order status emails")
    )
)]
pub struct ApiDoc;

/// Create the order notification router
pub fn router<T: MailTransport + 'static>(service: OrderNotificationService<T>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/send-order-status-email/", post(send_order_status_email::<T>))
        .route("/send-order-status-email", post(send_order_status_email::<T>))
        .route("/ready", get(readiness::<T>))
        .with_state(shared_service)
}

/// Send the email matching the order's current status
#[utoipa::path(
    post,
    path = "/send-order-status-email/",
    tag = TAG,
    request_body = OrderEmailRequest,
    responses(
        (status = 200, description = "Email handed to the mail server", body = EmailSentResponse),
        (status = 400, description = "Unknown order status or recipient refused by the mail server", body = ErrorResponse),
        (status = 422, description = "Request body failed validation", body = ErrorResponse),
        (status = 500, description = "Mail server unreachable, authentication or TLS failed, or delivery failed", body = ErrorResponse)
    )
)]
async fn send_order_status_email<T: MailTransport>(
    State(service): State<Arc<OrderNotificationService<T>>>,
    ValidatedJson(request): ValidatedJson<OrderEmailRequest>,
) -> OrderNotificationResult<Json<EmailSentResponse>> {
    service.send_status_email(&request).await?;
    Ok(Json(EmailSentResponse::sent()))
}

/// Check that the mail server accepts connections
#[utoipa::path(
    get,
    path = "/ready",
    tag = TAG,
    responses(
        (status = 200, description = "Mail server reachable"),
        (status = 503, description = "Mail server unreachable")
    )
)]
async fn readiness<T: MailTransport>(
    State(service): State<Arc<OrderNotificationService<T>>>,
) -> impl IntoResponse {
    let smtp: HealthCheckFuture = Box::pin(async move {
        service
            .check_mail_server()
            .await
            .map_err(|e| e.to_string())
    });

    run_health_checks(vec![("mail_server", smtp)]).await
}
