use chrono::NaiveDateTime;
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::routes::check_role;
use serde::Deserialize;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::lead::{Lead, LeadListQuery, LeadSubmission, RetailerLeadStats};
use crate::domain::retailer::{NewRetailer, Retailer};
use crate::forms::leads::{
    EditLeadForm, LeadSubmittalForm, generate_lead_id, generate_unique_lead_id, sourcer_initials,
};
use crate::pagination::{ListPage, PageRequest};
use crate::repository::{LeadReader, LeadWriter, RetailerReader, RetailerWriter};
use crate::services::{ServiceError, ServiceResult};

/// Query parameters accepted by the leads list.
#[derive(Debug, Default, Deserialize)]
pub struct LeadListParams {
    pub skip: Option<usize>,
    pub limit: Option<usize>,
    /// Retailer name fragment.
    pub retailer: Option<String>,
    /// Exact sourcer initials.
    pub sourcer: Option<String>,
}

pub fn list_leads<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: LeadListParams,
) -> ServiceResult<ListPage<Lead>>
where
    R: LeadReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let page = PageRequest::new(params.skip, params.limit);
    let mut query = LeadListQuery::new().paginate(page);
    if let Some(retailer) = params.retailer.filter(|v| !v.trim().is_empty()) {
        query = query.retailer(retailer);
    }
    if let Some(sourcer) = params.sourcer.filter(|v| !v.trim().is_empty()) {
        query = query.sourcer(sourcer.trim().to_uppercase());
    }

    let (total, items) = repo.list_leads(query).map_err(ServiceError::from)?;
    Ok(ListPage::new(total, page, items))
}

pub fn get_lead<R>(repo: &R, user: &AuthenticatedUser, lead_id: &str) -> ServiceResult<Lead>
where
    R: LeadReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.get_lead_by_lead_id(lead_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)
}

fn find_or_create_retailer<R>(repo: &R, name: &str) -> ServiceResult<Retailer>
where
    R: RetailerReader + RetailerWriter + ?Sized,
{
    if let Some(retailer) = repo.get_retailer_by_name(name).map_err(ServiceError::from)? {
        return Ok(retailer);
    }
    log::info!("Creating retailer {name} for a lead submittal");
    repo.create_retailer(&NewRetailer::new(name))
        .map_err(ServiceError::from)
}

/// Pick a lead ID for a submission made at `now`.
fn allocate_lead_id<R>(repo: &R, now: NaiveDateTime, initials: &str) -> ServiceResult<String>
where
    R: LeadReader + ?Sized,
{
    let lead_id = generate_lead_id(now, initials);
    if !repo.lead_id_exists(&lead_id).map_err(ServiceError::from)? {
        return Ok(lead_id);
    }

    let lead_id = generate_unique_lead_id(now, initials);
    if repo.lead_id_exists(&lead_id).map_err(ServiceError::from)? {
        log::error!("Lead ID {lead_id} collided twice");
        return Err(ServiceError::Conflict);
    }
    Ok(lead_id)
}

/// Stores a lead submittal together with its ASIN rows.
pub fn submit_lead<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: LeadSubmittalForm,
    now: NaiveDateTime,
) -> ServiceResult<LeadSubmission>
where
    R: LeadReader + LeadWriter + RetailerReader + RetailerWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let submittal = form
        .into_submittal()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let retailer = find_or_create_retailer(repo, &submittal.retailer_name)?;
    let initials = sourcer_initials(submittal.lead.submitted_by.as_deref().unwrap_or_default());
    let lead_id = allocate_lead_id(repo, now, &initials)?;

    let mut lead = submittal.lead;
    lead.lead_id = lead_id;
    lead.sourcer = Some(initials);
    lead.submitted_at = Some(now);
    lead.retailer_id = Some(retailer.id);

    let submission = repo
        .submit_lead(&lead, &submittal.asins)
        .map_err(ServiceError::from)?;
    log::info!(
        "Lead {} submitted with {} ASINs ({} reused, {} created)",
        submission.lead_id,
        submission.total_asins,
        submission.asins_reused,
        submission.asins_created
    );
    Ok(submission)
}

pub fn update_lead<R>(
    repo: &R,
    user: &AuthenticatedUser,
    lead_id: &str,
    form: EditLeadForm,
) -> ServiceResult<Lead>
where
    R: LeadWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let updates = form
        .into_update_lead()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    repo.update_lead(lead_id, &updates).map_err(ServiceError::from)
}

pub fn lead_stats_by_retailer<R>(
    repo: &R,
    user: &AuthenticatedUser,
) -> ServiceResult<Vec<RetailerLeadStats>>
where
    R: LeadReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.lead_stats_by_retailer().map_err(ServiceError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;

    use crate::forms::leads::AsinRow;
    use crate::repository::mock::MockLeadRepository;

    fn datetime() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 13)
            .and_then(|date| date.and_hms_micro_opt(14, 30, 45, 42))
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
            location: None,
            shopify: false,
            total_spend: 0.0,
            total_qty_of_items_ordered: 0,
            percent_of_cancelled_qty: 0.0,
            created_at: datetime(),
            updated_at: datetime(),
        }
    }

    fn form() -> LeadSubmittalForm {
        LeadSubmittalForm {
            submitted_by: "John".to_string(),
            product_name: "Nike Dunk Low".to_string(),
            product_sku: "DD1391-100".to_string(),
            retailer_name: "Foot Locker".to_string(),
            retailer_link: "https://www.footlocker.com/product/~/HJ7395.html".to_string(),
            asins: vec![
                AsinRow::new("B0CHILD008", "8", 2),
                AsinRow::default(),
                AsinRow::new("B0CHILD009", "9", 3),
            ],
            ..LeadSubmittalForm::default()
        }
    }

    #[test]
    fn submit_requires_role() {
        let repo = MockLeadRepository::new();
        let result = submit_lead(&repo, &user_with_role("user"), form(), datetime());
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn submit_creates_missing_retailer_and_generates_lead_id() {
        let mut repo = MockLeadRepository::new();
        repo.expect_get_retailer_by_name()
            .times(1)
            .withf(|name| name == "Foot Locker")
            .returning(|_| Ok(None));
        repo.expect_create_retailer()
            .times(1)
            .returning(|new| Ok(retailer(7, &new.name)));
        repo.expect_lead_id_exists()
            .times(1)
            .withf(|lead_id| lead_id == "251013143045JN")
            .returning(|_| Ok(false));
        repo.expect_submit_lead()
            .times(1)
            .withf(|lead, asins| {
                lead.lead_id == "251013143045JN"
                    && lead.sourcer.as_deref() == Some("JN")
                    && lead.retailer_id == Some(7)
                    && lead.unique_id.as_deref() == Some("HJ7395")
                    && lead.suggested_total_qty == Some(5)
                    && asins.len() == 2
            })
            .returning(|lead, asins| {
                Ok(LeadSubmission {
                    lead_id: lead.lead_id.clone(),
                    id: 1,
                    asins_created: asins.len(),
                    asins_reused: 0,
                    total_asins: asins.len(),
                    total_suggested_qty: 5,
                })
            });

        let submission =
            submit_lead(&repo, &user_with_role(SERVICE_ACCESS_ROLE), form(), datetime()).unwrap();

        assert_eq!(submission.lead_id, "251013143045JN");
        assert_eq!(submission.total_asins, 2);
    }

    #[test]
    fn colliding_lead_id_gets_microseconds() {
        let mut repo = MockLeadRepository::new();
        repo.expect_get_retailer_by_name()
            .returning(|name| Ok(Some(retailer(3, name))));
        repo.expect_lead_id_exists()
            .times(2)
            .returning(|lead_id| Ok(lead_id == "251013143045JN"));
        repo.expect_submit_lead()
            .times(1)
            .withf(|lead, _| lead.lead_id == "251013143045JN000042")
            .returning(|lead, _| {
                Ok(LeadSubmission {
                    lead_id: lead.lead_id.clone(),
                    id: 2,
                    asins_created: 0,
                    asins_reused: 2,
                    total_asins: 2,
                    total_suggested_qty: 5,
                })
            });

        let submission =
            submit_lead(&repo, &user_with_role(SERVICE_ACCESS_ROLE), form(), datetime()).unwrap();

        assert_eq!(submission.asins_reused, 2);
    }

    #[test]
    fn invalid_form_never_reaches_repository() {
        let repo = MockLeadRepository::new();
        let mut bad = form();
        bad.product_name = String::new();

        let result = submit_lead(&repo, &user_with_role(SERVICE_ACCESS_ROLE), bad, datetime());

        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn sourcer_filter_is_uppercased() {
        let mut repo = MockLeadRepository::new();
        repo.expect_list_leads()
            .times(1)
            .withf(|query| query.sourcer.as_deref() == Some("JN"))
            .returning(|_| Ok((0, Vec::new())));

        let params = LeadListParams {
            sourcer: Some(" jn ".to_string()),
            ..LeadListParams::default()
        };
        let page = list_leads(&repo, &user_with_role(SERVICE_ACCESS_ROLE), params).unwrap();
        assert_eq!(page.total, 0);
    }

    #[test]
    fn unknown_lead_is_not_found() {
        let mut repo = MockLeadRepository::new();
        repo.expect_get_lead_by_lead_id().returning(|_| Ok(None));
        let result = get_lead(&repo, &user_with_role(SERVICE_ACCESS_ROLE), "NOPE");
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }
}
