use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::warn;

use crate::models::admin::requests::TestEmailRequest;
use crate::models::admin::responses::TestEmailResponse;
use crate::models::ApiResponse;
use crate::notifications::templates::test_email;
use crate::services::common::{mailer_from, validation_failed};
use crate::utils::validate::ValidateRequest;

pub async fn send_test_email(
    mut body: TestEmailRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    body.to = body.to.trim().to_lowercase();
    if let Err(msg) = body.validate_request() {
        return Ok(validation_failed(request, msg));
    }

    let message = test_email(&body.to, body.subject.as_deref(), body.body.as_deref());
    let delivered = match mailer_from(request) {
        Some(mailer) => mailer.send(&message).await,
        None => {
            warn!("Mailer not registered, test email to {} dropped", body.to);
            false
        }
    };

    let msg = if delivered {
        "Test email delivered"
    } else {
        "Test email could not be delivered"
    };
    Ok(HttpResponse::Ok()
        .json(ApiResponse::success(TestEmailResponse { delivered }, msg).at(request)))
}
