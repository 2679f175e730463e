use actix_web::{Responder, post, web};
use pushkind_common::domain::auth::AuthenticatedUser;

use crate::amazon::VariantDetector;
use crate::routes::respond;
use crate::services::extension::{self, MessageRequest, ScrapeRequest};

#[post("/v1/extension/message")]
/// Converts an extension message into a lead submittal draft.
pub async fn extension_message(
    user: AuthenticatedUser,
    request: web::Json<MessageRequest>,
) -> impl Responder {
    respond(
        extension::message_to_draft(&user, request.into_inner()),
        "accept extension message",
    )
}

#[post("/v1/extension/scrape")]
/// Size variants of a captured Amazon product page.
pub async fn scrape_variants(
    user: AuthenticatedUser,
    detector: web::Data<VariantDetector>,
    request: web::Json<ScrapeRequest>,
) -> impl Responder {
    respond(
        extension::scrape(detector.get_ref(), &user, request.into_inner()),
        "scrape variants",
    )
}
