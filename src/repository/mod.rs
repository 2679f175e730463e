use chrono::{NaiveDate, NaiveDateTime};
use pushkind_common::db::{DbConnection, DbPool};
use pushkind_common::repository::errors::RepositoryResult;

use crate::domain::asin_bank::{AsinBankEntry, AsinBankListQuery, NewAsinBankEntry};
use crate::domain::checkin::{
    Checkin, CheckinListQuery, CheckinSummary, InboundRecord, NewCheckin, UpdateCheckin,
};
use crate::domain::lead::{
    Lead, LeadListQuery, LeadSubmission, NewLead, NewLeadAsin, RetailerLeadStats, UpdateLead,
};
use crate::domain::purchase::{
    NewPurchase, Purchase, PurchaseListQuery, PurchaseStatistics, UpdatePurchase,
};
use crate::domain::retailer::{
    NewRetailer, Retailer, RetailerListQuery, RetailerSummary, UpdateRetailer,
};
use crate::domain::retailer_order::InboundItem;
use crate::domain::user::{
    NewPasswordResetToken, NewUser, PasswordResetToken, User, UserListQuery, UserRole,
};
use crate::pagination::PageRequest;

pub mod asin_bank;
pub mod checkin;
pub mod lead;
pub mod purchase;
pub mod retailer;
pub mod user;

#[cfg(test)]
pub mod mock;

#[derive(Clone)]
/// Diesel-backed repository implementation that wraps an r2d2 pool.
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository using the provided connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// SQL `LIKE` pattern matching `term` anywhere in a column.
fn contains_pattern(term: &str) -> String {
    format!("%{}%", term.trim())
}

/// Offset and limit of an optional page window.
fn window(pagination: &Option<PageRequest>) -> Option<(i64, i64)> {
    pagination
        .as_ref()
        .map(|page| {
            (
                i64::try_from(page.skip).unwrap_or(i64::MAX),
                i64::try_from(page.limit).unwrap_or(i64::MAX),
            )
        })
}

/// Read-only operations over retailers.
pub trait RetailerReader {
    fn get_retailer_by_id(&self, id: i32) -> RepositoryResult<Option<Retailer>>;
    fn get_retailer_by_name(&self, name: &str) -> RepositoryResult<Option<Retailer>>;
    fn list_retailers(&self, query: RetailerListQuery) -> RepositoryResult<(usize, Vec<Retailer>)>;
    fn retailer_summary(&self) -> RepositoryResult<RetailerSummary>;
}

/// Write operations over retailers.
pub trait RetailerWriter {
    fn create_retailer(&self, new_retailer: &NewRetailer) -> RepositoryResult<Retailer>;
    /// Insert every retailer whose name is not stored yet, returning how many were added.
    fn import_retailers(&self, new_retailers: &[NewRetailer]) -> RepositoryResult<usize>;
    fn update_retailer(&self, id: i32, updates: &UpdateRetailer) -> RepositoryResult<Retailer>;
    fn delete_retailer(&self, id: i32) -> RepositoryResult<()>;
}

/// Read-only operations over the ASIN bank.
pub trait AsinBankReader {
    fn list_asin_bank(
        &self,
        query: AsinBankListQuery,
    ) -> RepositoryResult<(usize, Vec<AsinBankEntry>)>;
    /// First row with this ASIN and size; a `None` size matches any size.
    fn find_asin(&self, asin: &str, size: Option<&str>)
    -> RepositoryResult<Option<AsinBankEntry>>;
    fn find_lead_asin(&self, lead_id: &str, size: &str)
    -> RepositoryResult<Option<AsinBankEntry>>;
}

/// Write operations over the ASIN bank.
pub trait AsinBankWriter {
    fn create_asin(&self, new_entry: &NewAsinBankEntry) -> RepositoryResult<AsinBankEntry>;
}

/// Read-only operations over leads.
pub trait LeadReader {
    fn get_lead_by_lead_id(&self, lead_id: &str) -> RepositoryResult<Option<Lead>>;
    fn get_lead_by_unique_id(&self, unique_id: &str) -> RepositoryResult<Option<Lead>>;
    fn lead_id_exists(&self, lead_id: &str) -> RepositoryResult<bool>;
    fn list_leads(&self, query: LeadListQuery) -> RepositoryResult<(usize, Vec<Lead>)>;
    fn lead_stats_by_retailer(&self) -> RepositoryResult<Vec<RetailerLeadStats>>;
}

/// Write operations over leads.
pub trait LeadWriter {
    /// Insert a lead and attach its ASINs, reusing ASIN bank rows with the same ASIN and size.
    fn submit_lead(
        &self,
        new_lead: &NewLead,
        asins: &[NewLeadAsin],
    ) -> RepositoryResult<LeadSubmission>;
    fn update_lead(&self, lead_id: &str, updates: &UpdateLead) -> RepositoryResult<Lead>;
}

/// Read-only operations over purchases.
pub trait PurchaseReader {
    fn get_purchase_by_id(&self, id: i32) -> RepositoryResult<Option<Purchase>>;
    fn list_purchases(&self, query: PurchaseListQuery) -> RepositoryResult<(usize, Vec<Purchase>)>;
    fn order_number_exists(&self, order_number: &str) -> RepositoryResult<bool>;
    fn purchase_statistics(&self) -> RepositoryResult<PurchaseStatistics>;
}

/// Write operations over purchases.
pub trait PurchaseWriter {
    /// Insert the purchases of one order in a single transaction.
    ///
    /// Returns `None` without writing when the order number is already recorded.
    fn create_order_purchases(
        &self,
        order_number: &str,
        new_purchases: &[NewPurchase],
    ) -> RepositoryResult<Option<usize>>;
    fn update_purchase(&self, id: i32, updates: &UpdatePurchase) -> RepositoryResult<Purchase>;
    fn delete_purchase(&self, id: i32) -> RepositoryResult<()>;
}

/// Read-only operations over check-ins.
pub trait CheckinReader {
    fn get_checkin_by_id(&self, id: i32) -> RepositoryResult<Option<Checkin>>;
    fn list_checkins(&self, query: CheckinListQuery) -> RepositoryResult<(usize, Vec<Checkin>)>;
    fn list_order_checkins(&self, order_number: &str) -> RepositoryResult<Vec<Checkin>>;
    fn checkin_summary(&self, today: NaiveDate) -> RepositoryResult<CheckinSummary>;
}

/// Write operations over check-ins.
pub trait CheckinWriter {
    fn create_checkin(&self, new_checkin: &NewCheckin) -> RepositoryResult<Checkin>;
    fn update_checkin(&self, id: i32, updates: &UpdateCheckin) -> RepositoryResult<Checkin>;
    fn delete_checkin(&self, id: i32) -> RepositoryResult<()>;
    /// Record the lines of an inbound shipment in one transaction.
    ///
    /// A line whose order number, ASIN row, item name and quantity are already
    /// checked in is skipped. Missing ASIN rows are created under the check-in
    /// lead ID and a row without a size takes the line's size.
    fn record_inbound(
        &self,
        order_number: &str,
        items: &[InboundItem],
        checked_in_at: NaiveDateTime,
    ) -> RepositoryResult<InboundRecord>;
}

/// Read-only operations over users, roles and reset tokens.
pub trait UserReader {
    fn get_user_by_id(&self, id: i32) -> RepositoryResult<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    fn get_user_by_google_id(&self, google_id: &str) -> RepositoryResult<Option<User>>;
    fn get_role_by_name(&self, name: &str) -> RepositoryResult<Option<UserRole>>;
    fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<User>)>;
    fn get_reset_token(&self, token: &str) -> RepositoryResult<Option<PasswordResetToken>>;
}

/// Write operations over users, roles and reset tokens.
pub trait UserWriter {
    fn create_user(&self, new_user: &NewUser, logged_in_at: NaiveDateTime)
    -> RepositoryResult<User>;
    fn link_google_account(&self, user_id: i32, google_id: &str) -> RepositoryResult<User>;
    fn record_login(&self, user_id: i32, at: NaiveDateTime) -> RepositoryResult<User>;
    fn set_user_role(&self, user_id: i32, role_id: i32) -> RepositoryResult<User>;
    fn set_user_active(&self, user_id: i32, is_active: bool) -> RepositoryResult<User>;
    /// Store a new token, retiring the user's earlier unused tokens.
    fn issue_reset_token(
        &self,
        new_token: &NewPasswordResetToken,
    ) -> RepositoryResult<PasswordResetToken>;
    /// Mark an unused token as used and store the new password hash of its user.
    fn redeem_reset_token(&self, token_id: i32, password_hash: &str) -> RepositoryResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_saturates_huge_offsets() {
        let page = Some(PageRequest {
            skip: usize::MAX,
            limit: 50,
        });
        assert_eq!(window(&page), Some((i64::MAX, 50)));
        assert_eq!(window(&None), None);
    }
}
