use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::user::GoogleProfile;

/// Work factor of stored password hashes.
pub const PASSWORD_HASH_COST: u32 = bcrypt::DEFAULT_COST;

#[derive(Debug, Error)]
pub enum UserFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("password could not be hashed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetRoleForm {
    #[validate(length(min = 1, max = 50))]
    pub role: String,
}

impl SetRoleForm {
    pub fn into_role_name(self) -> Result<String, UserFormError> {
        self.validate()?;
        Ok(self.role.trim().to_lowercase())
    }
}

/// Identity confirmed by Google, forwarded by the sign-in page.
#[derive(Debug, Deserialize, Validate)]
pub struct GoogleSignInForm {
    #[validate(length(min = 1, max = 255))]
    pub google_id: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 255))]
    pub name: Option<String>,
}

impl GoogleSignInForm {
    pub fn into_profile(self) -> Result<GoogleProfile, UserFormError> {
        self.validate()?;
        Ok(GoogleProfile {
            google_id: self.google_id.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            name: self.name,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordForm {
    #[validate(email)]
    pub email: String,
}

impl ForgotPasswordForm {
    pub fn into_email(self) -> Result<String, UserFormError> {
        self.validate()?;
        Ok(self.email.trim().to_lowercase())
    }
}

/// Reset token together with the password that replaces the old one.
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordForm {
    #[validate(length(min = 1, max = 255))]
    pub token: String,
    /// bcrypt only reads the first 72 bytes.
    #[validate(length(min = 6, max = 72))]
    pub new_password: String,
}

/// Validated reset request with the new password already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordReset {
    pub token: String,
    pub password_hash: String,
}

impl ResetPasswordForm {
    pub fn into_reset(self) -> Result<PasswordReset, UserFormError> {
        self.validate()?;
        Ok(PasswordReset {
            token: self.token.trim().to_string(),
            password_hash: bcrypt::hash(&self.new_password, PASSWORD_HASH_COST)?,
        })
    }
}
