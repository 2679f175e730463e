use actix_web::{Responder, delete, get, patch, post, put, routes, web};
use chrono::{Local, Utc};
use pushkind_common::domain::auth::AuthenticatedUser;

use crate::forms::checkins::{AddCheckinForm, EditCheckinForm};
use crate::repository::DieselRepository;
use crate::routes::{respond, respond_created};
use crate::services::checkins::{self, CheckinListParams};

#[get("/v1/checkin")]
pub async fn list_checkins(
    params: web::Query<CheckinListParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        checkins::list_checkins(repo.get_ref(), &user, params.into_inner()),
        "list check-ins",
    )
}

#[get("/v1/checkin/stats/summary")]
pub async fn checkin_summary(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let today = Local::now().date_naive();
    respond(
        checkins::checkin_summary(repo.get_ref(), &user, today),
        "summarise check-ins",
    )
}

#[get("/v1/checkin/by-order/{order_number}")]
pub async fn order_checkins(
    order_number: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        checkins::order_checkins(repo.get_ref(), &user, &order_number),
        "load order check-ins",
    )
}

#[get("/v1/checkin/{id}")]
pub async fn get_checkin(
    id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        checkins::get_checkin(repo.get_ref(), &user, id.into_inner()),
        "load check-in",
    )
}

#[post("/v1/checkin")]
pub async fn create_checkin(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<AddCheckinForm>,
) -> impl Responder {
    let now = Utc::now().naive_utc();
    respond_created(
        checkins::create_checkin(repo.get_ref(), &user, form.into_inner(), now),
        "create check-in",
    )
}

#[routes]
#[put("/v1/checkin/{id}")]
#[patch("/v1/checkin/{id}")]
pub async fn update_checkin(
    id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<EditCheckinForm>,
) -> impl Responder {
    respond(
        checkins::update_checkin(repo.get_ref(), &user, id.into_inner(), form.into_inner()),
        "update check-in",
    )
}

#[delete("/v1/checkin/{id}")]
pub async fn delete_checkin(
    id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        checkins::delete_checkin(repo.get_ref(), &user, id.into_inner()),
        "delete check-in",
    )
}
