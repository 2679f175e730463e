use chrono::NaiveDate;
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::routes::check_role;
use serde::{Deserialize, Serialize};

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::purchase::{Purchase, PurchaseListQuery, PurchaseStatistics};
use crate::forms::purchases::EditPurchaseForm;
use crate::pagination::{ListPage, PageRequest};
use crate::repository::{LeadReader, PurchaseReader, PurchaseWriter};
use crate::services::{ServiceError, ServiceResult};

/// Query parameters accepted by the purchase tracker list.
#[derive(Debug, Default, Deserialize)]
pub struct PurchaseListParams {
    pub skip: Option<usize>,
    pub limit: Option<usize>,
    pub platform: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// A purchase with the money columns derived from its lead.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PurchaseView {
    #[serde(flatten)]
    pub purchase: Purchase,
    pub ppu: Option<f64>,
    pub effective_rsp: Option<f64>,
    pub total_spend: f64,
    pub profit: f64,
    pub margin_percent: f64,
    pub supplier: Option<String>,
}

impl From<Purchase> for PurchaseView {
    fn from(purchase: Purchase) -> Self {
        Self {
            ppu: purchase.ppu(),
            effective_rsp: purchase.effective_rsp(),
            total_spend: purchase.total_spend(),
            profit: purchase.profit(),
            margin_percent: purchase.margin_percent(),
            supplier: purchase.supplier().map(str::to_string),
            purchase,
        }
    }
}

pub fn list_purchases<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: PurchaseListParams,
) -> ServiceResult<ListPage<PurchaseView>>
where
    R: PurchaseReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    if let (Some(start), Some(end)) = (params.start_date, params.end_date)
        && start > end
    {
        return Err(ServiceError::Form(
            "start_date must not be after end_date".to_string(),
        ));
    }

    let page = PageRequest::new(params.skip, params.limit);
    let mut query = PurchaseListQuery::new()
        .between(params.start_date, params.end_date)
        .paginate(page);
    if let Some(platform) = params.platform.filter(|v| !v.trim().is_empty()) {
        query = query.platform(platform.trim());
    }
    if let Some(status) = params.status.filter(|v| !v.trim().is_empty()) {
        query = query.status(status.trim());
    }

    let (total, items) = repo.list_purchases(query).map_err(ServiceError::from)?;
    Ok(ListPage::new(total, page, items).map(PurchaseView::from))
}

pub fn get_purchase<R>(repo: &R, user: &AuthenticatedUser, id: i32) -> ServiceResult<PurchaseView>
where
    R: PurchaseReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.get_purchase_by_id(id)
        .map_err(ServiceError::from)?
        .map(PurchaseView::from)
        .ok_or(ServiceError::NotFound)
}

/// Purchases placed against one lead, newest first.
pub fn lead_purchases<R>(
    repo: &R,
    user: &AuthenticatedUser,
    lead_id: &str,
    page: PageRequest,
) -> ServiceResult<ListPage<PurchaseView>>
where
    R: PurchaseReader + LeadReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    if !repo.lead_id_exists(lead_id).map_err(ServiceError::from)? {
        return Err(ServiceError::NotFound);
    }

    let query = PurchaseListQuery::new().lead_id(lead_id).paginate(page);
    let (total, items) = repo.list_purchases(query).map_err(ServiceError::from)?;
    Ok(ListPage::new(total, page, items).map(PurchaseView::from))
}

pub fn update_purchase<R>(
    repo: &R,
    user: &AuthenticatedUser,
    id: i32,
    form: EditPurchaseForm,
) -> ServiceResult<PurchaseView>
where
    R: PurchaseWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let updates = form
        .into_update_purchase()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    repo.update_purchase(id, &updates)
        .map(PurchaseView::from)
        .map_err(ServiceError::from)
}

pub fn delete_purchase<R>(repo: &R, user: &AuthenticatedUser, id: i32) -> ServiceResult<()>
where
    R: PurchaseWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.delete_purchase(id).map_err(ServiceError::from)
}

pub fn purchase_statistics<R>(
    repo: &R,
    user: &AuthenticatedUser,
) -> ServiceResult<PurchaseStatistics>
where
    R: PurchaseReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.purchase_statistics().map_err(ServiceError::from)
}
