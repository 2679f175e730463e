use actix_web::{Responder, get, post, web};
use chrono::Utc;
use pushkind_common::domain::auth::AuthenticatedUser;

use crate::forms::users::{ForgotPasswordForm, GoogleSignInForm, ResetPasswordForm, SetRoleForm};
use crate::repository::DieselRepository;
use crate::routes::respond;
use crate::services::users::{self, UserListParams};

#[get("/users")]
pub async fn list_users(
    params: web::Query<UserListParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        users::list_users(repo.get_ref(), &user, params.into_inner()),
        "list users",
    )
}

#[get("/users/{id}")]
pub async fn get_user(
    id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        users::get_user(repo.get_ref(), &user, id.into_inner()),
        "load user",
    )
}

#[post("/users/{id}/role")]
pub async fn set_user_role(
    id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<SetRoleForm>,
) -> impl Responder {
    respond(
        users::set_user_role(repo.get_ref(), &user, id.into_inner(), form.into_inner()),
        "set user role",
    )
}

#[post("/users/{id}/deactivate")]
pub async fn deactivate_user(
    id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        users::deactivate_user(repo.get_ref(), &user, id.into_inner()),
        "deactivate user",
    )
}

#[post("/google")]
/// Account upsert for the caller's own Google identity.
pub async fn google_sign_in(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<GoogleSignInForm>,
) -> impl Responder {
    let now = Utc::now().naive_utc();
    respond(
        users::google_sign_in(repo.get_ref(), &user, form.into_inner(), now),
        "sign in with Google",
    )
}

#[post("/forgot-password")]
pub async fn forgot_password(
    repo: web::Data<DieselRepository>,
    form: web::Json<ForgotPasswordForm>,
) -> impl Responder {
    let now = Utc::now().naive_utc();
    respond(
        users::forgot_password(repo.get_ref(), form.into_inner(), now),
        "issue reset token",
    )
}

#[post("/reset-password")]
pub async fn reset_password(
    repo: web::Data<DieselRepository>,
    form: web::Json<ResetPasswordForm>,
) -> impl Responder {
    let now = Utc::now().naive_utc();
    respond(
        users::reset_password(repo.get_ref(), form.into_inner(), now),
        "reset password",
    )
}
