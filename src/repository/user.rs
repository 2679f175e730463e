use std::collections::HashMap;

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::{
    domain::user::{
        GOOGLE_PROVIDER, NewPasswordResetToken as DomainNewPasswordResetToken,
        NewUser as DomainNewUser,
        PasswordResetToken as DomainPasswordResetToken, User as DomainUser, UserListQuery,
        UserRole as DomainUserRole,
    },
    models::user::{
        NewPasswordResetToken as DbNewPasswordResetToken, NewUser as DbNewUser,
        PasswordResetToken as DbPasswordResetToken, User as DbUser, UserRole as DbUserRole,
    },
    repository::{DieselRepository, UserReader, UserWriter, contains_pattern, window},
    schema::{password_reset_tokens, user_roles, users},
};

fn filtered(query: &UserListQuery) -> users::BoxedQuery<'static, Sqlite> {
    let mut items = users::table.into_boxed::<Sqlite>();

    if let Some(term) = query.search.as_ref() {
        let pattern = contains_pattern(term);
        items = items.filter(
            users::username
                .like(pattern.clone())
                .or(users::email.like(pattern)),
        );
    }

    if query.active_only {
        items = items.filter(users::is_active.eq(true));
    }

    items
}

impl UserReader for DieselRepository {
    fn get_user_by_id(&self, id: i32) -> RepositoryResult<Option<DomainUser>> {
        let mut conn = self.conn()?;
        let user = users::table
            .filter(users::id.eq(id))
            .first::<DbUser>(&mut conn)
            .optional()?;

        match user {
            Some(user) => Ok(hydrate_users(&mut conn, vec![user])?.pop()),
            None => Ok(None),
        }
    }

    fn get_user_by_email(&self, email: &str) -> RepositoryResult<Option<DomainUser>> {
        let mut conn = self.conn()?;
        let user = users::table
            .filter(users::email.eq(email.to_lowercase()))
            .first::<DbUser>(&mut conn)
            .optional()?;

        match user {
            Some(user) => Ok(hydrate_users(&mut conn, vec![user])?.pop()),
            None => Ok(None),
        }
    }

    fn get_user_by_google_id(&self, google_id: &str) -> RepositoryResult<Option<DomainUser>> {
        let mut conn = self.conn()?;
        let user = users::table
            .filter(users::google_id.eq(google_id))
            .first::<DbUser>(&mut conn)
            .optional()?;

        match user {
            Some(user) => Ok(hydrate_users(&mut conn, vec![user])?.pop()),
            None => Ok(None),
        }
    }

    fn get_role_by_name(&self, name: &str) -> RepositoryResult<Option<DomainUserRole>> {
        let mut conn = self.conn()?;
        let role = user_roles::table
            .filter(user_roles::name.eq(name))
            .first::<DbUserRole>(&mut conn)
            .optional()?;
        Ok(role.map(Into::into))
    }

    fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<DomainUser>)> {
        let mut conn = self.conn()?;

        let total = filtered(&query).count().get_result::<i64>(&mut conn)? as usize;

        let mut items = filtered(&query).order(users::created_at.desc());
        if let Some((offset, limit)) = window(&query.pagination) {
            items = items.offset(offset).limit(limit);
        }

        let rows = items.load::<DbUser>(&mut conn)?;
        Ok((total, hydrate_users(&mut conn, rows)?))
    }

    fn get_reset_token(&self, token: &str) -> RepositoryResult<Option<DomainPasswordResetToken>> {
        let mut conn = self.conn()?;
        let found = password_reset_tokens::table
            .filter(password_reset_tokens::token.eq(token))
            .first::<DbPasswordResetToken>(&mut conn)
            .optional()?;
        Ok(found.map(Into::into))
    }
}

impl UserWriter for DieselRepository {
    fn create_user(
        &self,
        new_user: &DomainNewUser,
        logged_in_at: NaiveDateTime,
    ) -> RepositoryResult<DomainUser> {
        let mut conn = self.conn()?;
        let mut db_new = DbNewUser::from(new_user);
        db_new.last_login = Some(logged_in_at);

        let created = diesel::insert_into(users::table)
            .values(&db_new)
            .get_result::<DbUser>(&mut conn)?;

        hydrate_users(&mut conn, vec![created])?
            .pop()
            .ok_or(RepositoryError::NotFound)
    }

    fn link_google_account(&self, user_id: i32, google_id: &str) -> RepositoryResult<DomainUser> {
        let mut conn = self.conn()?;
        let updated = diesel::update(users::table.filter(users::id.eq(user_id)))
            .set((
                users::google_id.eq(Some(google_id)),
                users::oauth_provider.eq(Some(GOOGLE_PROVIDER)),
            ))
            .get_result::<DbUser>(&mut conn)
            .optional()?;

        single_user(&mut conn, updated)
    }

    fn record_login(&self, user_id: i32, at: NaiveDateTime) -> RepositoryResult<DomainUser> {
        let mut conn = self.conn()?;
        let updated = diesel::update(users::table.filter(users::id.eq(user_id)))
            .set(users::last_login.eq(Some(at)))
            .get_result::<DbUser>(&mut conn)
            .optional()?;

        single_user(&mut conn, updated)
    }

    fn set_user_role(&self, user_id: i32, role_id: i32) -> RepositoryResult<DomainUser> {
        let mut conn = self.conn()?;
        let updated = diesel::update(users::table.filter(users::id.eq(user_id)))
            .set(users::role_id.eq(role_id))
            .get_result::<DbUser>(&mut conn)
            .optional()?;

        single_user(&mut conn, updated)
    }

    fn set_user_active(&self, user_id: i32, is_active: bool) -> RepositoryResult<DomainUser> {
        let mut conn = self.conn()?;
        let updated = diesel::update(users::table.filter(users::id.eq(user_id)))
            .set(users::is_active.eq(is_active))
            .get_result::<DbUser>(&mut conn)
            .optional()?;

        single_user(&mut conn, updated)
    }

    fn issue_reset_token(
        &self,
        new_token: &DomainNewPasswordResetToken,
    ) -> RepositoryResult<DomainPasswordResetToken> {
        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            diesel::update(
                password_reset_tokens::table
                    .filter(password_reset_tokens::user_id.eq(new_token.user_id))
                    .filter(password_reset_tokens::used.eq(false)),
            )
            .set(password_reset_tokens::used.eq(true))
            .execute(conn)?;

            let created = diesel::insert_into(password_reset_tokens::table)
                .values(&DbNewPasswordResetToken::from(new_token))
                .get_result::<DbPasswordResetToken>(conn)?;

            Ok(created.into())
        })
    }

    fn redeem_reset_token(&self, token_id: i32, password_hash: &str) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let user_id = diesel::update(
                password_reset_tokens::table
                    .filter(password_reset_tokens::id.eq(token_id))
                    .filter(password_reset_tokens::used.eq(false)),
            )
            .set(password_reset_tokens::used.eq(true))
            .returning(password_reset_tokens::user_id)
            .get_result::<i32>(conn)
            .optional()?
            .ok_or(RepositoryError::NotFound)?;

            let updated = diesel::update(users::table.filter(users::id.eq(user_id)))
                .set(users::password.eq(Some(password_hash)))
                .execute(conn)?;
            if updated == 0 {
                return Err(RepositoryError::NotFound);
            }

            Ok(())
        })
    }
}

fn single_user(
    conn: &mut SqliteConnection,
    row: Option<DbUser>,
) -> RepositoryResult<DomainUser> {
    let row = row.ok_or(RepositoryError::NotFound)?;
    hydrate_users(conn, vec![row])?
        .pop()
        .ok_or(RepositoryError::NotFound)
}

/// Attach role names to user rows.
fn hydrate_users(
    conn: &mut SqliteConnection,
    rows: Vec<DbUser>,
) -> RepositoryResult<Vec<DomainUser>> {
    let role_ids: Vec<i32> = rows.iter().map(|row| row.role_id).collect();
    let roles: HashMap<i32, String> = user_roles::table
        .filter(user_roles::id.eq_any(role_ids.as_slice()))
        .select((user_roles::id, user_roles::name))
        .load::<(i32, String)>(conn)?
        .into_iter()
        .collect();

    Ok(rows
        .into_iter()
        .map(|row| {
            let role = roles.get(&row.role_id).cloned();
            let mut user: DomainUser = row.into();
            user.role = role;
            user
        })
        .collect())
}
