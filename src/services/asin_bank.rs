use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::routes::check_role;
use serde::Deserialize;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::asin_bank::{AsinBankEntry, AsinBankListQuery, NewAsinBankEntry};
use crate::pagination::{ListPage, PageRequest};
use crate::repository::{AsinBankReader, AsinBankWriter};
use crate::services::{ServiceError, ServiceResult};

/// Query parameters accepted by the ASIN bank list.
#[derive(Debug, Default, Deserialize)]
pub struct AsinBankParams {
    pub skip: Option<usize>,
    pub limit: Option<usize>,
    /// Matched exactly.
    pub lead_id: Option<String>,
    pub asin: Option<String>,
    pub size: Option<String>,
}

pub fn list_asin_bank<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: AsinBankParams,
) -> ServiceResult<ListPage<AsinBankEntry>>
where
    R: AsinBankReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let page = PageRequest::new(params.skip, params.limit);
    let mut query = AsinBankListQuery::new().paginate(page);
    if let Some(lead_id) = params.lead_id.filter(|v| !v.trim().is_empty()) {
        query = query.lead_id(lead_id.trim());
    }
    if let Some(asin) = params.asin.filter(|v| !v.trim().is_empty()) {
        query = query.asin(asin);
    }
    if let Some(size) = params.size.filter(|v| !v.trim().is_empty()) {
        query = query.size(size);
    }

    let (total, items) = repo.list_asin_bank(query).map_err(ServiceError::from)?;
    Ok(ListPage::new(total, page, items))
}

/// Bank row for the ASIN and size, created under `lead_id` when missing.
///
/// Returns the row and whether it was created.
pub fn find_or_create_asin<R>(
    repo: &R,
    lead_id: &str,
    asin: &str,
    size: Option<&str>,
) -> ServiceResult<(AsinBankEntry, bool)>
where
    R: AsinBankReader + AsinBankWriter + ?Sized,
{
    if let Some(existing) = repo.find_asin(asin, size).map_err(ServiceError::from)? {
        return Ok((existing, false));
    }

    let created = repo
        .create_asin(&NewAsinBankEntry::new(lead_id, asin, size.map(str::to_string)))
        .map_err(ServiceError::from)?;
    log::info!("Created ASIN bank entry {} for {asin}", created.id);
    Ok((created, true))
}
