use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::routes::check_role;
use serde::Deserialize;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::retailer::{Retailer, RetailerListQuery, RetailerSummary};
use crate::forms::retailers::{AddRetailerForm, EditRetailerForm, UploadRetailersForm};
use crate::pagination::{ListPage, PageRequest};
use crate::repository::{RetailerReader, RetailerWriter};
use crate::services::{ServiceError, ServiceResult};

/// Query parameters accepted by the retailers list.
#[derive(Debug, Default, Deserialize)]
pub struct RetailerListParams {
    pub skip: Option<usize>,
    pub limit: Option<usize>,
    pub location: Option<String>,
    pub wholesale: Option<String>,
    pub shopify: Option<bool>,
    pub search: Option<String>,
}

impl RetailerListParams {
    fn into_query(self) -> ServiceResult<RetailerListQuery> {
        let page = PageRequest::new(self.skip, self.limit);
        let mut query = RetailerListQuery::new().paginate(page);

        if let Some(location) = self.location.as_deref().filter(|l| !l.trim().is_empty()) {
            let location = location
                .parse()
                .map_err(|value| ServiceError::Form(format!("invalid location `{value}`")))?;
            query = query.location(location);
        }
        if let Some(wholesale) = self.wholesale.as_deref().filter(|w| !w.trim().is_empty()) {
            let wholesale = wholesale
                .parse()
                .map_err(|value| ServiceError::Form(format!("invalid wholesale `{value}`")))?;
            query = query.wholesale(wholesale);
        }
        if let Some(shopify) = self.shopify {
            query = query.shopify(shopify);
        }
        if let Some(search) = self.search.filter(|s| !s.trim().is_empty()) {
            query = query.search(search);
        }
        Ok(query)
    }
}

pub fn list_retailers<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: RetailerListParams,
) -> ServiceResult<ListPage<Retailer>>
where
    R: RetailerReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let query = params.into_query()?;
    let page = query.pagination.unwrap_or_default();
    let (total, items) = repo.list_retailers(query).map_err(ServiceError::from)?;
    Ok(ListPage::new(total, page, items))
}

pub fn get_retailer<R>(repo: &R, user: &AuthenticatedUser, id: i32) -> ServiceResult<Retailer>
where
    R: RetailerReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.get_retailer_by_id(id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)
}

pub fn get_retailer_by_name<R>(
    repo: &R,
    user: &AuthenticatedUser,
    name: &str,
) -> ServiceResult<Retailer>
where
    R: RetailerReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.get_retailer_by_name(name.trim())
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)
}

/// Creates a retailer; names are unique.
pub fn create_retailer<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AddRetailerForm,
) -> ServiceResult<Retailer>
where
    R: RetailerReader + RetailerWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let new_retailer = form
        .into_new_retailer()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    if repo
        .get_retailer_by_name(&new_retailer.name)
        .map_err(ServiceError::from)?
        .is_some()
    {
        return Err(ServiceError::Conflict);
    }

    repo.create_retailer(&new_retailer).map_err(ServiceError::from)
}

pub fn update_retailer<R>(
    repo: &R,
    user: &AuthenticatedUser,
    id: i32,
    form: EditRetailerForm,
) -> ServiceResult<Retailer>
where
    R: RetailerReader + RetailerWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let updates = form
        .into_update_retailer()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    if let Some(name) = updates.name.as_deref()
        && let Some(existing) = repo.get_retailer_by_name(name).map_err(ServiceError::from)?
        && existing.id != id
    {
        return Err(ServiceError::Conflict);
    }

    repo.update_retailer(id, &updates).map_err(ServiceError::from)
}

pub fn delete_retailer<R>(repo: &R, user: &AuthenticatedUser, id: i32) -> ServiceResult<()>
where
    R: RetailerWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.delete_retailer(id).map_err(ServiceError::from)
}

pub fn retailer_summary<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<RetailerSummary>
where
    R: RetailerReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.retailer_summary().map_err(ServiceError::from)
}

/// Imports retailers from an uploaded CSV, skipping names already stored.
pub fn import_retailers<R>(
    repo: &R,
    user: &AuthenticatedUser,
    mut form: UploadRetailersForm,
) -> ServiceResult<usize>
where
    R: RetailerWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let retailers = form
        .parse()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let created = repo.import_retailers(&retailers).map_err(ServiceError::from)?;
    log::info!(
        "Imported {created} of {} uploaded retailers",
        retailers.len()
    );
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{NaiveDate, NaiveDateTime};
    use pushkind_common::repository::errors::RepositoryError;

    use crate::domain::retailer::{Location, Wholesale};
    use crate::repository::mock::MockRetailerRepository;

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

    fn retailer(id: i32, name: &str) -> Retailer {
        Retailer {
            id,
            name: name.to_string(),
            link: None,
            wholesale: None,
            cancel_for_bulk: false,
            location: Some(Location::Usa),
            shopify: false,
            total_spend: 0.0,
            total_qty_of_items_ordered: 0,
            percent_of_cancelled_qty: 0.0,
            created_at: datetime(),
            updated_at: datetime(),
        }
    }

    fn add_form(name: &str) -> AddRetailerForm {
        AddRetailerForm {
            name: name.to_string(),
            link: None,
            wholesale: Some("no".to_string()),
            cancel_for_bulk: false,
            location: Some("USA".to_string()),
            shopify: false,
        }
    }

    #[test]
    fn list_requires_role() {
        let repo = MockRetailerRepository::new();
        let result = list_retailers(&repo, &user_with_role("user"), RetailerListParams::default());
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn list_passes_filters_and_window() {
        let mut repo = MockRetailerRepository::new();
        repo.expect_list_retailers()
            .times(1)
            .withf(|query| {
                query.location == Some(Location::Usa)
                    && query.wholesale == Some(Wholesale::NotApplicable)
                    && query.search.as_deref() == Some("lock")
                    && query.pagination == Some(PageRequest { skip: 20, limit: 10 })
            })
            .returning(|_| Ok((21, vec![retailer(1, "Foot Locker")])));

        let params = RetailerListParams {
            skip: Some(20),
            limit: Some(10),
            location: Some("usa".to_string()),
            wholesale: Some("n/a".to_string()),
            search: Some("lock".to_string()),
            ..RetailerListParams::default()
        };
        let page = list_retailers(&repo, &user_with_role(SERVICE_ACCESS_ROLE), params).unwrap();

        assert_eq!(page.total, 21);
        assert_eq!(page.skip, 20);
        assert_eq!(page.items.len(), 1);
    }

    #[test]
    fn list_rejects_unknown_location() {
        let repo = MockRetailerRepository::new();
        let params = RetailerListParams {
            location: Some("Atlantis".to_string()),
            ..RetailerListParams::default()
        };
        let result = list_retailers(&repo, &user_with_role(SERVICE_ACCESS_ROLE), params);
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn create_rejects_duplicate_name() {
        let mut repo = MockRetailerRepository::new();
        repo.expect_get_retailer_by_name()
            .times(1)
            .returning(|name| Ok(Some(retailer(4, name))));
        repo.expect_create_retailer().times(0);

        let result = create_retailer(&repo, &user_with_role(SERVICE_ACCESS_ROLE), add_form("Kith"));

        assert!(matches!(result, Err(ServiceError::Conflict)));
    }

    #[test]
    fn create_persists_new_retailer() {
        let mut repo = MockRetailerRepository::new();
        repo.expect_get_retailer_by_name().returning(|_| Ok(None));
        repo.expect_create_retailer()
            .times(1)
            .withf(|new| new.name == "Kith" && new.wholesale == Some(Wholesale::No))
            .returning(|new| Ok(retailer(9, &new.name)));

        let created =
            create_retailer(&repo, &user_with_role(SERVICE_ACCESS_ROLE), add_form(" Kith ")).unwrap();

        assert_eq!(created.id, 9);
    }

    #[test]
    fn update_allows_keeping_own_name() {
        let mut repo = MockRetailerRepository::new();
        repo.expect_get_retailer_by_name()
            .returning(|name| Ok(Some(retailer(3, name))));
        repo.expect_update_retailer()
            .times(1)
            .returning(|id, _| Ok(retailer(id, "Kith")));

        let form = EditRetailerForm {
            name: Some("Kith".to_string()),
            ..EditRetailerForm::default()
        };
        let updated = update_retailer(&repo, &user_with_role(SERVICE_ACCESS_ROLE), 3, form).unwrap();

        assert_eq!(updated.id, 3);
    }

    #[test]
    fn missing_retailer_maps_to_not_found() {
        let mut repo = MockRetailerRepository::new();
        repo.expect_get_retailer_by_id().returning(|_| Ok(None));
        repo.expect_delete_retailer()
            .returning(|_| Err(RepositoryError::NotFound));

        let user = user_with_role(SERVICE_ACCESS_ROLE);
        assert!(matches!(get_retailer(&repo, &user, 1), Err(ServiceError::NotFound)));
        assert!(matches!(delete_retailer(&repo, &user, 1), Err(ServiceError::NotFound)));
    }
}
