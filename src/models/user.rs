use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::user::{
    NewPasswordResetToken as DomainNewPasswordResetToken, NewUser as DomainNewUser,
    PasswordResetToken as DomainPasswordResetToken, User as DomainUser,
    UserRole as DomainUserRole,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::user_roles)]
pub struct UserRole {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::users)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password: Option<String>,
    pub role_id: i32,
    pub google_id: Option<String>,
    pub oauth_provider: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub last_login: Option<NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub role_id: i32,
    pub google_id: Option<&'a str>,
    pub oauth_provider: Option<&'a str>,
    pub last_login: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::password_reset_tokens)]
pub struct PasswordResetToken {
    pub id: i32,
    pub user_id: i32,
    pub token: String,
    pub expires_at: NaiveDateTime,
    pub used: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::password_reset_tokens)]
pub struct NewPasswordResetToken<'a> {
    pub user_id: i32,
    pub token: &'a str,
    pub expires_at: NaiveDateTime,
}

impl From<UserRole> for DomainUserRole {
    fn from(value: UserRole) -> Self {
        Self {
            id: value.id,
            name: value.name,
            description: value.description,
        }
    }
}

impl From<User> for DomainUser {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            username: value.username,
            email: value.email,
            has_password: value.password.is_some(),
            role_id: value.role_id,
            role: None,
            google_id: value.google_id,
            oauth_provider: value.oauth_provider,
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
            last_login: value.last_login,
        }
    }
}

impl<'a> From<&'a DomainNewUser> for NewUser<'a> {
    fn from(value: &'a DomainNewUser) -> Self {
        Self {
            username: value.username.as_str(),
            email: value.email.as_str(),
            role_id: value.role_id,
            google_id: value.google_id.as_deref(),
            oauth_provider: value.oauth_provider.as_deref(),
            last_login: None,
        }
    }
}

impl From<PasswordResetToken> for DomainPasswordResetToken {
    fn from(value: PasswordResetToken) -> Self {
        Self {
            id: value.id,
            user_id: value.user_id,
            token: value.token,
            expires_at: value.expires_at,
            used: value.used,
            created_at: value.created_at,
        }
    }
}

impl<'a> From<&'a DomainNewPasswordResetToken> for NewPasswordResetToken<'a> {
    fn from(value: &'a DomainNewPasswordResetToken) -> Self {
        Self {
            user_id: value.user_id,
            token: value.token.as_str(),
            expires_at: value.expires_at,
        }
    }
}
