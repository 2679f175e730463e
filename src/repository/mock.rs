use chrono::{NaiveDate, NaiveDateTime};
use mockall::mock;

use super::{
    AsinBankReader, AsinBankWriter, CheckinReader, CheckinWriter, LeadReader, LeadWriter,
    PurchaseReader, PurchaseWriter, RetailerReader, RetailerWriter, UserReader, UserWriter,
};
use crate::domain::{
    asin_bank::{AsinBankEntry, AsinBankListQuery, NewAsinBankEntry},
    checkin::{
        Checkin, CheckinListQuery, CheckinSummary, InboundRecord, NewCheckin, UpdateCheckin,
    },
    lead::{
        Lead, LeadListQuery, LeadSubmission, NewLead, NewLeadAsin, RetailerLeadStats, UpdateLead,
    },
    purchase::{NewPurchase, Purchase, PurchaseListQuery, PurchaseStatistics, UpdatePurchase},
    retailer::{NewRetailer, Retailer, RetailerListQuery, RetailerSummary, UpdateRetailer},
    retailer_order::InboundItem,
    user::{NewPasswordResetToken, NewUser, PasswordResetToken, User, UserListQuery, UserRole},
};
use pushkind_common::repository::errors::RepositoryResult;

mock! {
    pub RetailerRepository {}

    impl RetailerReader for RetailerRepository {
        fn get_retailer_by_id(&self, id: i32) -> RepositoryResult<Option<Retailer>>;
        fn get_retailer_by_name(&self, name: &str) -> RepositoryResult<Option<Retailer>>;
        fn list_retailers(&self, query: RetailerListQuery) -> RepositoryResult<(usize, Vec<Retailer>)>;
        fn retailer_summary(&self) -> RepositoryResult<RetailerSummary>;
    }

    impl RetailerWriter for RetailerRepository {
        fn create_retailer(&self, new_retailer: &NewRetailer) -> RepositoryResult<Retailer>;
        fn import_retailers(&self, new_retailers: &[NewRetailer]) -> RepositoryResult<usize>;
        fn update_retailer(&self, id: i32, updates: &UpdateRetailer) -> RepositoryResult<Retailer>;
        fn delete_retailer(&self, id: i32) -> RepositoryResult<()>;
    }
}

mock! {
    pub AsinBankRepository {}

    impl AsinBankReader for AsinBankRepository {
        fn list_asin_bank(&self, query: AsinBankListQuery) -> RepositoryResult<(usize, Vec<AsinBankEntry>)>;
        fn find_asin<'a>(&self, asin: &str, size: Option<&'a str>) -> RepositoryResult<Option<AsinBankEntry>>;
        fn find_lead_asin(&self, lead_id: &str, size: &str) -> RepositoryResult<Option<AsinBankEntry>>;
    }

    impl AsinBankWriter for AsinBankRepository {
        fn create_asin(&self, new_entry: &NewAsinBankEntry) -> RepositoryResult<AsinBankEntry>;
    }
}

mock! {
    pub LeadRepository {}

    impl LeadReader for LeadRepository {
        fn get_lead_by_lead_id(&self, lead_id: &str) -> RepositoryResult<Option<Lead>>;
        fn get_lead_by_unique_id(&self, unique_id: &str) -> RepositoryResult<Option<Lead>>;
        fn lead_id_exists(&self, lead_id: &str) -> RepositoryResult<bool>;
        fn list_leads(&self, query: LeadListQuery) -> RepositoryResult<(usize, Vec<Lead>)>;
        fn lead_stats_by_retailer(&self) -> RepositoryResult<Vec<RetailerLeadStats>>;
    }

    impl LeadWriter for LeadRepository {
        fn submit_lead(&self, new_lead: &NewLead, asins: &[NewLeadAsin]) -> RepositoryResult<LeadSubmission>;
        fn update_lead(&self, lead_id: &str, updates: &UpdateLead) -> RepositoryResult<Lead>;
    }

    impl RetailerReader for LeadRepository {
        fn get_retailer_by_id(&self, id: i32) -> RepositoryResult<Option<Retailer>>;
        fn get_retailer_by_name(&self, name: &str) -> RepositoryResult<Option<Retailer>>;
        fn list_retailers(&self, query: RetailerListQuery) -> RepositoryResult<(usize, Vec<Retailer>)>;
        fn retailer_summary(&self) -> RepositoryResult<RetailerSummary>;
    }

    impl RetailerWriter for LeadRepository {
        fn create_retailer(&self, new_retailer: &NewRetailer) -> RepositoryResult<Retailer>;
        fn import_retailers(&self, new_retailers: &[NewRetailer]) -> RepositoryResult<usize>;
        fn update_retailer(&self, id: i32, updates: &UpdateRetailer) -> RepositoryResult<Retailer>;
        fn delete_retailer(&self, id: i32) -> RepositoryResult<()>;
    }
}

mock! {
    pub PurchaseRepository {}

    impl PurchaseReader for PurchaseRepository {
        fn get_purchase_by_id(&self, id: i32) -> RepositoryResult<Option<Purchase>>;
        fn list_purchases(&self, query: PurchaseListQuery) -> RepositoryResult<(usize, Vec<Purchase>)>;
        fn order_number_exists(&self, order_number: &str) -> RepositoryResult<bool>;
        fn purchase_statistics(&self) -> RepositoryResult<PurchaseStatistics>;
    }

    impl PurchaseWriter for PurchaseRepository {
        fn create_order_purchases(&self, order_number: &str, new_purchases: &[NewPurchase]) -> RepositoryResult<Option<usize>>;
        fn update_purchase(&self, id: i32, updates: &UpdatePurchase) -> RepositoryResult<Purchase>;
        fn delete_purchase(&self, id: i32) -> RepositoryResult<()>;
    }

    impl LeadReader for PurchaseRepository {
        fn get_lead_by_lead_id(&self, lead_id: &str) -> RepositoryResult<Option<Lead>>;
        fn get_lead_by_unique_id(&self, unique_id: &str) -> RepositoryResult<Option<Lead>>;
        fn lead_id_exists(&self, lead_id: &str) -> RepositoryResult<bool>;
        fn list_leads(&self, query: LeadListQuery) -> RepositoryResult<(usize, Vec<Lead>)>;
        fn lead_stats_by_retailer(&self) -> RepositoryResult<Vec<RetailerLeadStats>>;
    }

    impl AsinBankReader for PurchaseRepository {
        fn list_asin_bank(&self, query: AsinBankListQuery) -> RepositoryResult<(usize, Vec<AsinBankEntry>)>;
        fn find_asin<'a>(&self, asin: &str, size: Option<&'a str>) -> RepositoryResult<Option<AsinBankEntry>>;
        fn find_lead_asin(&self, lead_id: &str, size: &str) -> RepositoryResult<Option<AsinBankEntry>>;
    }

    impl AsinBankWriter for PurchaseRepository {
        fn create_asin(&self, new_entry: &NewAsinBankEntry) -> RepositoryResult<AsinBankEntry>;
    }

    impl CheckinWriter for PurchaseRepository {
        fn create_checkin(&self, new_checkin: &NewCheckin) -> RepositoryResult<Checkin>;
        fn update_checkin(&self, id: i32, updates: &UpdateCheckin) -> RepositoryResult<Checkin>;
        fn delete_checkin(&self, id: i32) -> RepositoryResult<()>;
        fn record_inbound(&self, order_number: &str, items: &[InboundItem], checked_in_at: NaiveDateTime) -> RepositoryResult<InboundRecord>;
    }
}

mock! {
    pub CheckinRepository {}

    impl CheckinReader for CheckinRepository {
        fn get_checkin_by_id(&self, id: i32) -> RepositoryResult<Option<Checkin>>;
        fn list_checkins(&self, query: CheckinListQuery) -> RepositoryResult<(usize, Vec<Checkin>)>;
        fn list_order_checkins(&self, order_number: &str) -> RepositoryResult<Vec<Checkin>>;
        fn checkin_summary(&self, today: NaiveDate) -> RepositoryResult<CheckinSummary>;
    }

    impl CheckinWriter for CheckinRepository {
        fn create_checkin(&self, new_checkin: &NewCheckin) -> RepositoryResult<Checkin>;
        fn update_checkin(&self, id: i32, updates: &UpdateCheckin) -> RepositoryResult<Checkin>;
        fn delete_checkin(&self, id: i32) -> RepositoryResult<()>;
        fn record_inbound(&self, order_number: &str, items: &[InboundItem], checked_in_at: NaiveDateTime) -> RepositoryResult<InboundRecord>;
    }

    impl AsinBankReader for CheckinRepository {
        fn list_asin_bank(&self, query: AsinBankListQuery) -> RepositoryResult<(usize, Vec<AsinBankEntry>)>;
        fn find_asin<'a>(&self, asin: &str, size: Option<&'a str>) -> RepositoryResult<Option<AsinBankEntry>>;
        fn find_lead_asin(&self, lead_id: &str, size: &str) -> RepositoryResult<Option<AsinBankEntry>>;
    }

    impl AsinBankWriter for CheckinRepository {
        fn create_asin(&self, new_entry: &NewAsinBankEntry) -> RepositoryResult<AsinBankEntry>;
    }
}

mock! {
    pub UserRepository {}

    impl UserReader for UserRepository {
        fn get_user_by_id(&self, id: i32) -> RepositoryResult<Option<User>>;
        fn get_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
        fn get_user_by_google_id(&self, google_id: &str) -> RepositoryResult<Option<User>>;
        fn get_role_by_name(&self, name: &str) -> RepositoryResult<Option<UserRole>>;
        fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<User>)>;
        fn get_reset_token(&self, token: &str) -> RepositoryResult<Option<PasswordResetToken>>;
    }

    impl UserWriter for UserRepository {
        fn create_user(&self, new_user: &NewUser, logged_in_at: NaiveDateTime) -> RepositoryResult<User>;
        fn link_google_account(&self, user_id: i32, google_id: &str) -> RepositoryResult<User>;
        fn record_login(&self, user_id: i32, at: NaiveDateTime) -> RepositoryResult<User>;
        fn set_user_role(&self, user_id: i32, role_id: i32) -> RepositoryResult<User>;
        fn set_user_active(&self, user_id: i32, is_active: bool) -> RepositoryResult<User>;
        fn issue_reset_token(&self, new_token: &NewPasswordResetToken) -> RepositoryResult<PasswordResetToken>;
        fn redeem_reset_token(&self, token_id: i32, password_hash: &str) -> RepositoryResult<()>;
    }
}
