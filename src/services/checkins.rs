use chrono::{NaiveDate, NaiveDateTime};
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::routes::check_role;
use serde::Deserialize;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::checkin::{
    CHECKIN_LEAD_ID, Checkin, CheckinListQuery, CheckinSummary, OrderCheckins,
};
use crate::forms::checkins::{AddCheckinForm, AsinReference, EditCheckinForm};
use crate::pagination::{ListPage, PageRequest};
use crate::repository::{AsinBankReader, AsinBankWriter, CheckinReader, CheckinWriter};
use crate::services::asin_bank::find_or_create_asin;
use crate::services::{ServiceError, ServiceResult};

/// Query parameters accepted by the check-ins list.
#[derive(Debug, Default, Deserialize)]
pub struct CheckinListParams {
    pub skip: Option<usize>,
    pub limit: Option<usize>,
    pub order_number: Option<String>,
    pub asin: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub fn list_checkins<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: CheckinListParams,
) -> ServiceResult<ListPage<Checkin>>
where
    R: CheckinReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let page = PageRequest::new(params.skip, params.limit);
    let mut query = CheckinListQuery::new()
        .between(params.start_date, params.end_date)
        .paginate(page);
    if let Some(order_number) = params.order_number.filter(|v| !v.trim().is_empty()) {
        query = query.order_number(order_number.trim());
    }
    if let Some(asin) = params.asin.filter(|v| !v.trim().is_empty()) {
        query = query.asin(asin.trim().to_ascii_uppercase());
    }

    let (total, items) = repo.list_checkins(query).map_err(ServiceError::from)?;
    Ok(ListPage::new(total, page, items))
}

pub fn get_checkin<R>(repo: &R, user: &AuthenticatedUser, id: i32) -> ServiceResult<Checkin>
where
    R: CheckinReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.get_checkin_by_id(id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)
}

/// Records a check-in, creating the ASIN bank row it names when missing.
pub fn create_checkin<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AddCheckinForm,
    now: NaiveDateTime,
) -> ServiceResult<Checkin>
where
    R: CheckinWriter + AsinBankReader + AsinBankWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let (mut checkin, reference) = form
        .into_new_checkin(now)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    checkin.asin_bank_id = match reference {
        AsinReference::None => None,
        AsinReference::Id(id) => Some(id),
        AsinReference::Asin { asin, size } => {
            let (entry, _) = find_or_create_asin(repo, CHECKIN_LEAD_ID, &asin, size.as_deref())?;
            Some(entry.id)
        }
    };

    repo.create_checkin(&checkin).map_err(ServiceError::from)
}

pub fn update_checkin<R>(
    repo: &R,
    user: &AuthenticatedUser,
    id: i32,
    form: EditCheckinForm,
) -> ServiceResult<Checkin>
where
    R: CheckinWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let updates = form
        .into_update_checkin()
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    if updates.is_empty() {
        return Err(ServiceError::Form("nothing to update".to_string()));
    }

    repo.update_checkin(id, &updates).map_err(ServiceError::from)
}

pub fn delete_checkin<R>(repo: &R, user: &AuthenticatedUser, id: i32) -> ServiceResult<()>
where
    R: CheckinWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.delete_checkin(id).map_err(ServiceError::from)
}

pub fn checkin_summary<R>(
    repo: &R,
    user: &AuthenticatedUser,
    today: NaiveDate,
) -> ServiceResult<CheckinSummary>
where
    R: CheckinReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.checkin_summary(today).map_err(ServiceError::from)
}

pub fn order_checkins<R>(
    repo: &R,
    user: &AuthenticatedUser,
    order_number: &str,
) -> ServiceResult<OrderCheckins>
where
    R: CheckinReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let order_number = order_number.trim();
    let checkins = repo
        .list_order_checkins(order_number)
        .map_err(ServiceError::from)?;
    if checkins.is_empty() {
        return Err(ServiceError::NotFound);
    }
    Ok(OrderCheckins::new(order_number, checkins))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::domain::asin_bank::AsinBankEntry;
    use crate::repository::mock::MockCheckinRepository;

    fn datetime() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 13)
            .and_then(|date| date.and_hms_opt(9, 30, 0))
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

    fn checkin(id: i32, quantity: i32, asin_bank_id: Option<i32>) -> Checkin {
        Checkin {
            id,
            order_number: Some("P0017327917518".to_string()),
            item_name: None,
            asin_bank_id,
            asin: None,
            size: None,
            quantity,
            checked_in_at: datetime(),
        }
    }

    #[test]
    fn asin_reference_creates_checkin_bank_row() {
        let mut repo = MockCheckinRepository::new();
        repo.expect_find_asin().times(1).returning(|_, _| Ok(None));
        repo.expect_create_asin()
            .times(1)
            .withf(|new| new.lead_id == CHECKIN_LEAD_ID && new.asin == "B0DJDXB819")
            .returning(|new| {
                Ok(AsinBankEntry {
                    id: 31,
                    lead_id: new.lead_id.clone(),
                    size: new.size.clone(),
                    asin: new.asin.clone(),
                })
            });
        repo.expect_create_checkin()
            .times(1)
            .withf(|new| new.asin_bank_id == Some(31) && new.quantity == 2)
            .returning(|new| Ok(checkin(1, new.quantity, new.asin_bank_id)));

        let form = AddCheckinForm {
            order_number: Some("P0017327917518".to_string()),
            asin: Some("B0DJDXB819".to_string()),
            size: Some("9".to_string()),
            quantity: 2,
            ..AddCheckinForm::default()
        };
        let created =
            create_checkin(&repo, &user_with_role(SERVICE_ACCESS_ROLE), form, datetime()).unwrap();

        assert_eq!(created.asin_bank_id, Some(31));
    }

    #[test]
    fn bank_id_reference_skips_lookup() {
        let mut repo = MockCheckinRepository::new();
        repo.expect_find_asin().times(0);
        repo.expect_create_checkin()
            .times(1)
            .returning(|new| Ok(checkin(2, new.quantity, new.asin_bank_id)));

        let form = AddCheckinForm {
            asin_bank_id: Some(7),
            quantity: -1,
            ..AddCheckinForm::default()
        };
        let created =
            create_checkin(&repo, &user_with_role(SERVICE_ACCESS_ROLE), form, datetime()).unwrap();

        assert_eq!(created.asin_bank_id, Some(7));
        assert_eq!(created.quantity, -1);
    }

    #[test]
    fn order_without_checkins_is_not_found() {
        let mut repo = MockCheckinRepository::new();
        repo.expect_list_order_checkins().returning(|_| Ok(Vec::new()));
        let result = order_checkins(&repo, &user_with_role(SERVICE_ACCESS_ROLE), "NOPE");
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[test]
    fn order_checkins_are_totalled() {
        let mut repo = MockCheckinRepository::new();
        repo.expect_list_order_checkins()
            .withf(|order| order == "P0017327917518")
            .returning(|_| Ok(vec![checkin(1, 2, None), checkin(2, 3, None)]));

        let order =
            order_checkins(&repo, &user_with_role(SERVICE_ACCESS_ROLE), " P0017327917518 ")
                .unwrap();

        assert_eq!(order.total_quantity, 5);
        assert_eq!(order.checkin_count, 2);
    }

    #[test]
    fn empty_edit_is_rejected() {
        let repo = MockCheckinRepository::new();
        let result = update_checkin(
            &repo,
            &user_with_role(SERVICE_ACCESS_ROLE),
            1,
            EditCheckinForm::default(),
        );
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }
}
