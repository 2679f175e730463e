use actix_web::{HttpResponse, Responder, post, web};
use chrono::{Local, Utc};
use pushkind_common::domain::auth::AuthenticatedUser;

use crate::domain::retailer_order::{EmailMessage, OrderProcessingResult};
use crate::repository::DieselRepository;
use crate::routes::{Envelope, STATUS_ERROR, error_response, respond_created};
use crate::services::{ServiceResult, retailer_orders};

/// Processing outcomes that wrote nothing are reported as `400` with the result attached.
fn order_response(result: ServiceResult<OrderProcessingResult>) -> HttpResponse {
    match result {
        Ok(result) if result.duplicate => {
            HttpResponse::Ok().json(Envelope::ok("Order already processed", result))
        }
        Ok(result) if result.success => {
            HttpResponse::Ok().json(Envelope::ok("Order processed", result))
        }
        Ok(result) => HttpResponse::BadRequest().json(Envelope {
            status: STATUS_ERROR,
            message: result
                .error
                .clone()
                .unwrap_or_else(|| "Order not processed".to_string()),
            data: Some(result),
        }),
        Err(err) => error_response(err, "process order email"),
    }
}

#[post("/v1/retailer-orders/process")]
/// Order confirmation email; the parser is picked from sender and subject.
pub async fn process_order(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    email: web::Json<EmailMessage>,
) -> impl Responder {
    let today = Local::now().date_naive();
    order_response(retailer_orders::process_order(
        repo.get_ref(),
        &user,
        &email,
        None,
        today,
    ))
}

#[post("/v1/retailer-orders/process/{retailer}")]
pub async fn process_retailer_order(
    retailer: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    email: web::Json<EmailMessage>,
) -> impl Responder {
    let today = Local::now().date_naive();
    order_response(retailer_orders::process_order(
        repo.get_ref(),
        &user,
        &email,
        Some(retailer.as_str()),
        today,
    ))
}

#[post("/v1/retailer-orders/inbound")]
/// PrepWorx inbound notification, one check-in per item.
pub async fn process_inbound(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    email: web::Json<EmailMessage>,
) -> impl Responder {
    let now = Utc::now().naive_utc();
    respond_created(
        retailer_orders::process_inbound(repo.get_ref(), &user, &email, now),
        "process inbound email",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use actix_web::http::StatusCode;

    #[test]
    fn failed_processing_is_a_bad_request() {
        let result = OrderProcessingResult::failed(None, "no parser recognises this email");
        assert_eq!(order_response(Ok(result)).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn duplicate_is_reported_as_success() {
        let result = OrderProcessingResult {
            success: true,
            duplicate: true,
            ..OrderProcessingResult::default()
        };
        assert_eq!(order_response(Ok(result)).status(), StatusCode::OK);
    }
}
