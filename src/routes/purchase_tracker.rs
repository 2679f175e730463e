use actix_web::{Responder, delete, get, patch, post, routes, web};
use chrono::Utc;
use pushkind_common::domain::auth::AuthenticatedUser;

use crate::forms::leads::{EditLeadForm, LeadSubmittalForm};
use crate::forms::purchases::EditPurchaseForm;
use crate::pagination::PageParams;
use crate::repository::DieselRepository;
use crate::routes::{respond, respond_created};
use crate::services::asin_bank::{self, AsinBankParams};
use crate::services::leads::{self, LeadListParams};
use crate::services::purchases::{self, PurchaseListParams};

#[get("/v1/purchase-tracker/leads")]
pub async fn list_leads(
    params: web::Query<LeadListParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        leads::list_leads(repo.get_ref(), &user, params.into_inner()),
        "list leads",
    )
}

#[get("/v1/purchase-tracker/leads/{lead_id}")]
/// Lead with its ASIN slots resolved.
pub async fn get_lead(
    lead_id: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(leads::get_lead(repo.get_ref(), &user, &lead_id), "load lead")
}

#[post("/v1/purchase-tracker/leads")]
/// Lead submittal; the lead ID is generated from the submission time.
pub async fn submit_lead(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<LeadSubmittalForm>,
) -> impl Responder {
    let now = Utc::now().naive_utc();
    respond_created(
        leads::submit_lead(repo.get_ref(), &user, form.into_inner(), now),
        "submit lead",
    )
}

#[patch("/v1/purchase-tracker/leads/{lead_id}")]
pub async fn update_lead(
    lead_id: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<EditLeadForm>,
) -> impl Responder {
    respond(
        leads::update_lead(repo.get_ref(), &user, &lead_id, form.into_inner()),
        "update lead",
    )
}

#[get("/v1/purchase-tracker/leads/{lead_id}/purchases")]
pub async fn lead_purchases(
    lead_id: web::Path<String>,
    params: web::Query<PageParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        purchases::lead_purchases(repo.get_ref(), &user, &lead_id, params.into_inner().into()),
        "list lead purchases",
    )
}

/// ASIN bank rows; `lead_id` is matched exactly.
#[routes]
#[get("/v1/purchase-tracker/asins")]
#[get("/v1/purchase-tracker/asin-bank")]
pub async fn list_asin_bank(
    params: web::Query<AsinBankParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        asin_bank::list_asin_bank(repo.get_ref(), &user, params.into_inner()),
        "list ASIN bank",
    )
}

#[get("/v1/purchase-tracker/purchases")]
pub async fn list_purchases(
    params: web::Query<PurchaseListParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        purchases::list_purchases(repo.get_ref(), &user, params.into_inner()),
        "list purchases",
    )
}

#[get("/v1/purchase-tracker/purchases/{id}")]
pub async fn get_purchase(
    id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        purchases::get_purchase(repo.get_ref(), &user, id.into_inner()),
        "load purchase",
    )
}

#[patch("/v1/purchase-tracker/purchases/{id}")]
pub async fn update_purchase(
    id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<EditPurchaseForm>,
) -> impl Responder {
    respond(
        purchases::update_purchase(repo.get_ref(), &user, id.into_inner(), form.into_inner()),
        "update purchase",
    )
}

#[delete("/v1/purchase-tracker/purchases/{id}")]
pub async fn delete_purchase(
    id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        purchases::delete_purchase(repo.get_ref(), &user, id.into_inner()),
        "delete purchase",
    )
}

#[get("/v1/purchase-tracker/statistics/summary")]
pub async fn purchase_statistics(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        purchases::purchase_statistics(repo.get_ref(), &user),
        "summarise purchases",
    )
}

#[get("/v1/purchase-tracker/statistics/by-retailer")]
pub async fn lead_stats_by_retailer(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        leads::lead_stats_by_retailer(repo.get_ref(), &user),
        "summarise leads by retailer",
    )
}
