use chrono::NaiveDateTime;
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::routes::check_role;
use serde::Deserialize;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::user::{DEFAULT_ROLE, NewPasswordResetToken, NewUser, User, UserListQuery};
use crate::forms::users::{
    ForgotPasswordForm, GoogleSignInForm, ResetPasswordForm, SetRoleForm,
};
use crate::pagination::{ListPage, PageRequest};
use crate::repository::{UserReader, UserWriter};
use crate::services::{ServiceError, ServiceResult};

/// Reply to every password reset request, whether or not the account exists.
pub const RESET_REQUESTED_MESSAGE: &str =
    "If an account with that email exists, a password reset link has been sent.";

/// Query parameters accepted by the users list.
#[derive(Debug, Default, Deserialize)]
pub struct UserListParams {
    pub skip: Option<usize>,
    pub limit: Option<usize>,
    pub search: Option<String>,
    #[serde(default)]
    pub active_only: bool,
}

pub fn list_users<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: UserListParams,
) -> ServiceResult<ListPage<User>>
where
    R: UserReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let page = PageRequest::new(params.skip, params.limit);
    let mut query = UserListQuery::new().paginate(page);
    if let Some(search) = params.search.filter(|v| !v.trim().is_empty()) {
        query = query.search(search.trim());
    }
    if params.active_only {
        query = query.active_only();
    }

    let (total, items) = repo.list_users(query).map_err(ServiceError::from)?;
    Ok(ListPage::new(total, page, items))
}

pub fn get_user<R>(repo: &R, user: &AuthenticatedUser, id: i32) -> ServiceResult<User>
where
    R: UserReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.get_user_by_id(id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)
}

pub fn set_user_role<R>(
    repo: &R,
    user: &AuthenticatedUser,
    id: i32,
    form: SetRoleForm,
) -> ServiceResult<User>
where
    R: UserReader + UserWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let role_name = form
        .into_role_name()
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    let role = repo
        .get_role_by_name(&role_name)
        .map_err(ServiceError::from)?
        .ok_or_else(|| ServiceError::Form(format!("unknown role `{role_name}`")))?;

    log::info!("User {id} is now `{}`", role.name);
    repo.set_user_role(id, role.id).map_err(ServiceError::from)
}

pub fn deactivate_user<R>(repo: &R, user: &AuthenticatedUser, id: i32) -> ServiceResult<User>
where
    R: UserWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.set_user_active(id, false).map_err(ServiceError::from)
}

/// Finds or creates the account behind a Google identity and records the login.
///
/// The identity must carry the email the auth service signed the caller in
/// with. Lookup goes by Google ID first, then by email (linking the Google ID
/// to the existing account). Deactivated accounts are refused.
pub fn google_sign_in<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: GoogleSignInForm,
    now: NaiveDateTime,
) -> ServiceResult<User>
where
    R: UserReader + UserWriter + ?Sized,
{
    let profile = form
        .into_profile()
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    if !profile.email.eq_ignore_ascii_case(user.email.trim()) {
        log::warn!("Google sign-in for {} rejected for caller {}", profile.email, user.sub);
        return Err(ServiceError::Unauthorized);
    }

    let existing = match repo
        .get_user_by_google_id(&profile.google_id)
        .map_err(ServiceError::from)?
    {
        Some(user) => Some(user),
        None => match repo
            .get_user_by_email(&profile.email)
            .map_err(ServiceError::from)?
        {
            Some(user) => {
                log::info!("Linking Google account to user {}", user.id);
                Some(
                    repo.link_google_account(user.id, &profile.google_id)
                        .map_err(ServiceError::from)?,
                )
            }
            None => None,
        },
    };

    match existing {
        Some(user) if !user.is_active => {
            log::warn!("Deactivated user {} tried to sign in", user.id);
            Err(ServiceError::Unauthorized)
        }
        Some(user) => repo.record_login(user.id, now).map_err(ServiceError::from),
        None => {
            let role = repo
                .get_role_by_name(DEFAULT_ROLE)
                .map_err(ServiceError::from)?
                .ok_or(ServiceError::NotFound)?;
            let new_user = NewUser::new(profile.username(), profile.email.clone(), role.id)
                .with_google(profile.google_id.clone());
            let created = repo
                .create_user(&new_user, now)
                .map_err(ServiceError::from)?;
            log::info!("Created user {} from Google sign-in", created.id);
            Ok(created)
        }
    }
}

/// Issues a reset token for a password account.
///
/// The reply never reveals whether the email is known.
pub fn forgot_password<R>(
    repo: &R,
    form: ForgotPasswordForm,
    now: NaiveDateTime,
) -> ServiceResult<&'static str>
where
    R: UserReader + UserWriter + ?Sized,
{
    let email = form
        .into_email()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    match repo.get_user_by_email(&email).map_err(ServiceError::from)? {
        Some(user) if user.is_active && user.has_password => {
            let token = repo
                .issue_reset_token(&NewPasswordResetToken::issue(user.id, now))
                .map_err(ServiceError::from)?;
            log::info!("Issued password reset token for user {}", user.id);
            log::debug!("Reset token for user {}: {}", user.id, token.token);
        }
        Some(user) => log::info!("No password reset for OAuth or inactive user {}", user.id),
        None => log::info!("Password reset requested for an unknown email"),
    }

    Ok(RESET_REQUESTED_MESSAGE)
}

/// Redeems a reset token and stores the new password hash. Unknown tokens are
/// not found; used or expired ones are form errors.
pub fn reset_password<R>(
    repo: &R,
    form: ResetPasswordForm,
    now: NaiveDateTime,
) -> ServiceResult<()>
where
    R: UserReader + UserWriter + ?Sized,
{
    let request = form
        .into_reset()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let reset = repo
        .get_reset_token(&request.token)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)?;
    if reset.used {
        return Err(ServiceError::Form("reset token already used".to_string()));
    }
    if reset.is_expired(now) {
        return Err(ServiceError::Form("reset token expired".to_string()));
    }

    repo.redeem_reset_token(reset.id, &request.password_hash)
        .map_err(ServiceError::from)?;
    log::info!("Password reset for user {}", reset.user_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, NaiveDate};

    use crate::domain::user::{PasswordResetToken, UserRole};
    use crate::repository::mock::MockUserRepository;

    fn datetime() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap_or_default()
    }

    fn user_with_role(role: &str) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "user".to_string(),
            email: "user@example.com".to_string(),
            hub_id: 11,
            name: "User".to_string(),
            roles: vec![role.to_string()],
            exp: 0,
        }
    }

    fn account(id: i32, email: &str, has_password: bool) -> User {
        User {
            id,
            username: "jane".to_string(),
            email: email.to_string(),
            has_password,
            role_id: 2,
            role: Some("user".to_string()),
            google_id: None,
            oauth_provider: None,
            is_active: true,
            created_at: datetime(),
            updated_at: datetime(),
            last_login: None,
        }
    }

    /// Caller signed in by the auth service as jane@example.com.
    fn caller() -> AuthenticatedUser {
        AuthenticatedUser {
            email: "jane@example.com".to_string(),
            ..user_with_role("user")
        }
    }

    fn google_form() -> GoogleSignInForm {
        GoogleSignInForm {
            google_id: "g-42".to_string(),
            email: "Jane@Example.com".to_string(),
            name: Some("Jane".to_string()),
        }
    }

    fn reset_token(used: bool, expires_at: NaiveDateTime) -> PasswordResetToken {
        PasswordResetToken {
            id: 5,
            user_id: 1,
            token: "abc".to_string(),
            expires_at,
            used,
            created_at: datetime(),
        }
    }

    #[test]
    fn google_sign_in_links_existing_email() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_user_by_google_id().returning(|_| Ok(None));
        repo.expect_get_user_by_email()
            .withf(|email| email == "jane@example.com")
            .returning(|email| Ok(Some(account(3, email, true))));
        repo.expect_link_google_account()
            .times(1)
            .withf(|id, google_id| *id == 3 && google_id == "g-42")
            .returning(|id, _| Ok(account(id, "jane@example.com", true)));
        repo.expect_record_login()
            .times(1)
            .returning(|id, at| {
                let mut user = account(id, "jane@example.com", true);
                user.last_login = Some(at);
                Ok(user)
            });
        repo.expect_create_user().times(0);

        let user = google_sign_in(&repo, &caller(), google_form(), datetime()).unwrap();

        assert_eq!(user.id, 3);
        assert_eq!(user.last_login, Some(datetime()));
    }

    #[test]
    fn google_sign_in_creates_user_with_default_role() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_user_by_google_id().returning(|_| Ok(None));
        repo.expect_get_user_by_email().returning(|_| Ok(None));
        repo.expect_get_role_by_name()
            .withf(|name| name == DEFAULT_ROLE)
            .returning(|name| {
                Ok(Some(UserRole {
                    id: 2,
                    name: name.to_string(),
                    description: None,
                }))
            });
        repo.expect_create_user()
            .times(1)
            .withf(|new, _| {
                new.role_id == 2
                    && new.username == "Jane"
                    && new.google_id.as_deref() == Some("g-42")
            })
            .returning(|new, _| Ok(account(9, &new.email, false)));

        let user = google_sign_in(&repo, &caller(), google_form(), datetime()).unwrap();

        assert_eq!(user.id, 9);
    }

    #[test]
    fn deactivated_user_cannot_sign_in() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_user_by_google_id().returning(|_| {
            let mut user = account(4, "jane@example.com", false);
            user.is_active = false;
            Ok(Some(user))
        });
        repo.expect_record_login().times(0);

        let result = google_sign_in(&repo, &caller(), google_form(), datetime());
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn google_identity_must_match_the_caller() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_user_by_google_id().times(0);
        repo.expect_get_user_by_email().times(0);
        repo.expect_link_google_account().times(0);
        repo.expect_create_user().times(0);

        let form = GoogleSignInForm {
            google_id: "attacker".to_string(),
            email: "victim@example.com".to_string(),
            name: None,
        };
        let result = google_sign_in(&repo, &caller(), form, datetime());
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn forgot_password_is_silent_for_unknown_and_oauth_accounts() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_user_by_email().returning(|email| {
            Ok((email == "oauth@example.com").then(|| account(2, email, false)))
        });
        repo.expect_issue_reset_token().times(0);

        for email in ["nobody@example.com", "oauth@example.com"] {
            let form = ForgotPasswordForm {
                email: email.to_string(),
            };
            assert_eq!(
                forgot_password(&repo, form, datetime()).unwrap(),
                RESET_REQUESTED_MESSAGE
            );
        }
    }

    #[test]
    fn forgot_password_issues_token_for_password_account() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_user_by_email()
            .returning(|email| Ok(Some(account(1, email, true))));
        repo.expect_issue_reset_token()
            .times(1)
            .withf(|new| new.user_id == 1 && new.expires_at == datetime() + Duration::hours(1))
            .returning(|new| {
                Ok(PasswordResetToken {
                    id: 1,
                    user_id: new.user_id,
                    token: new.token.clone(),
                    expires_at: new.expires_at,
                    used: false,
                    created_at: datetime(),
                })
            });

        let form = ForgotPasswordForm {
            email: "jane@example.com".to_string(),
        };
        assert!(forgot_password(&repo, form, datetime()).is_ok());
    }

    #[test]
    fn reset_password_checks_token_state() {
        let form = || ResetPasswordForm {
            token: "abc".to_string(),
            new_password: "s3cret-pass".to_string(),
        };

        let mut unknown = MockUserRepository::new();
        unknown.expect_get_reset_token().returning(|_| Ok(None));
        assert!(matches!(
            reset_password(&unknown, form(), datetime()),
            Err(ServiceError::NotFound)
        ));

        let mut used = MockUserRepository::new();
        used.expect_get_reset_token()
            .returning(|_| Ok(Some(reset_token(true, datetime() + Duration::hours(1)))));
        assert!(matches!(
            reset_password(&used, form(), datetime()),
            Err(ServiceError::Form(_))
        ));

        let mut expired = MockUserRepository::new();
        expired
            .expect_get_reset_token()
            .returning(|_| Ok(Some(reset_token(false, datetime() - Duration::minutes(1)))));
        assert!(matches!(
            reset_password(&expired, form(), datetime()),
            Err(ServiceError::Form(_))
        ));

        let mut valid = MockUserRepository::new();
        valid
            .expect_get_reset_token()
            .returning(|_| Ok(Some(reset_token(false, datetime() + Duration::minutes(30)))));
        valid
            .expect_redeem_reset_token()
            .times(1)
            .withf(|id, hash| *id == 5 && bcrypt::verify("s3cret-pass", hash).unwrap_or(false))
            .returning(|_, _| Ok(()));
        assert!(reset_password(&valid, form(), datetime()).is_ok());
    }

    #[test]
    fn unknown_role_is_a_form_error() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_role_by_name().returning(|_| Ok(None));
        repo.expect_set_user_role().times(0);

        let form = SetRoleForm {
            role: "superuser".to_string(),
        };
        let result = set_user_role(&repo, &user_with_role(SERVICE_ACCESS_ROLE), 1, form);
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }
}
