use actix_multipart::form::MultipartForm;
use actix_web::{Responder, delete, get, patch, post, put, routes, web};
use pushkind_common::domain::auth::AuthenticatedUser;

use crate::forms::retailers::{AddRetailerForm, EditRetailerForm, UploadRetailersForm};
use crate::repository::DieselRepository;
use crate::routes::{respond, respond_created};
use crate::services::retailers::{self, RetailerListParams};

#[get("/v1/retailers")]
/// Paginated retailers, filtered by `location`, `wholesale`, `shopify` and `search`.
pub async fn list_retailers(
    params: web::Query<RetailerListParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        retailers::list_retailers(repo.get_ref(), &user, params.into_inner()),
        "list retailers",
    )
}

#[get("/v1/retailers/stats/summary")]
pub async fn retailer_summary(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        retailers::retailer_summary(repo.get_ref(), &user),
        "summarise retailers",
    )
}

#[routes]
#[get("/v1/retailers/name/{name}")]
#[get("/v1/retailers/by-name/{name}")]
pub async fn get_retailer_by_name(
    name: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        retailers::get_retailer_by_name(repo.get_ref(), &user, &name),
        "load retailer",
    )
}

#[get("/v1/retailers/{id}")]
pub async fn get_retailer(
    id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        retailers::get_retailer(repo.get_ref(), &user, id.into_inner()),
        "load retailer",
    )
}

#[post("/v1/retailers")]
pub async fn create_retailer(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<AddRetailerForm>,
) -> impl Responder {
    respond_created(
        retailers::create_retailer(repo.get_ref(), &user, form.into_inner()),
        "create retailer",
    )
}

#[post("/v1/retailers/upload")]
/// CSV import; rows whose name already exists are skipped.
pub async fn upload_retailers(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    MultipartForm(form): MultipartForm<UploadRetailersForm>,
) -> impl Responder {
    respond(
        retailers::import_retailers(repo.get_ref(), &user, form),
        "import retailers",
    )
}

#[routes]
#[put("/v1/retailers/{id}")]
#[patch("/v1/retailers/{id}")]
pub async fn update_retailer(
    id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<EditRetailerForm>,
) -> impl Responder {
    respond(
        retailers::update_retailer(repo.get_ref(), &user, id.into_inner(), form.into_inner()),
        "update retailer",
    )
}

#[delete("/v1/retailers/{id}")]
pub async fn delete_retailer(
    id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        retailers::delete_retailer(repo.get_ref(), &user, id.into_inner()),
        "delete retailer",
    )
}
