use chrono::{NaiveDate, NaiveDateTime};
use pushkind_common::domain::auth::AuthenticatedUser;
use purchase_tracker::domain::purchase::PurchaseListQuery;
use purchase_tracker::domain::retailer_order::EmailMessage;
use purchase_tracker::forms::leads::{AsinRow, LeadSubmittalForm};
use purchase_tracker::repository::{
    AsinBankReader, DieselRepository, LeadReader, PurchaseReader, RetailerReader,
};
use purchase_tracker::services::{ServiceError, leads, retailer_orders};
use purchase_tracker::SERVICE_ACCESS_ROLE;

mod common;

fn admin() -> AuthenticatedUser {
    AuthenticatedUser {
        sub: "admin".into(),
        email: "admin@example.com".into(),
        hub_id: 1,
        name: "Admin".into(),
        roles: vec![SERVICE_ACCESS_ROLE.to_string()],
        exp: 0,
    }
}

fn submitted_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 10, 13)
        .and_then(|date| date.and_hms_micro_opt(14, 30, 45, 42))
        .unwrap()
}

fn dunk_form(unique_id: &str) -> LeadSubmittalForm {
    LeadSubmittalForm {
        submitted_by: "John".to_string(),
        product_name: "Nike Dunk Low".to_string(),
        product_sku: "DD1391-100".to_string(),
        retailer_name: "Hibbett".to_string(),
        retailer_link: "https://www.hibbett.com/nike-dunk-low/4M178.html".to_string(),
        unique_id: unique_id.to_string(),
        asins: vec![
            AsinRow::new("B0CHILD095", "9.5", 2),
            AsinRow::new("B0CHILD010", "10", 1),
        ],
        ..LeadSubmittalForm::default()
    }
}

fn hibbett_email() -> EmailMessage {
    EmailMessage {
        message_id: Some("m-1".to_string()),
        sender: "Hibbett <hibbett@email.hibbett.com>".to_string(),
        subject: "Confirmation of your Order #1234567890123".to_string(),
        html: r#"<table>
            <tr><td><img src="https://images.hibbett.com/is/image/hibbett/4M178_0100_main?wid=120"></td>
            <td>Nike Dunk Low<br>SIZE: 09.5<br>QTY: 2</td></tr>
            <tr><td><img src="https://images.hibbett.com/is/image/hibbett/9Q512_0100_main?wid=120"></td>
            <td>Nike Air Max<br>SIZE: 10<br>QTY: 1</td></tr>
            </table><p>Order Number: 1234567890123</p>"#
            .to_string(),
    }
}

#[test]
fn submitting_twice_in_one_second_allocates_distinct_ids() {
    let test_db = common::TestDb::new("service_submit_lead_distinct_ids.db");
    let repo = DieselRepository::new(test_db.pool());

    let first = leads::submit_lead(&repo, &admin(), dunk_form("4M178"), submitted_at()).unwrap();
    let second = leads::submit_lead(&repo, &admin(), dunk_form("4M179"), submitted_at()).unwrap();

    assert_eq!(first.lead_id, "251013143045JN");
    assert_eq!(second.lead_id, "251013143045JN000042");
    assert_eq!(first.asins_created, 2);
    assert_eq!(second.asins_reused, 2);
    assert_eq!(second.total_suggested_qty, 3);

    // The retailer is created once and shared.
    let retailer = repo.get_retailer_by_name("Hibbett").unwrap().unwrap();
    let lead = repo.get_lead_by_lead_id(&second.lead_id).unwrap().unwrap();
    assert_eq!(lead.retailer_id, Some(retailer.id));
    assert_eq!(lead.sourcer.as_deref(), Some("JN"));

    // Reused rows keep the lead that introduced them.
    let entry = repo.find_asin("B0CHILD095", Some("9.5")).unwrap().unwrap();
    assert_eq!(entry.lead_id, first.lead_id);
}

#[test]
fn submit_rejects_invalid_asin() {
    let test_db = common::TestDb::new("service_submit_lead_invalid_asin.db");
    let repo = DieselRepository::new(test_db.pool());

    let mut form = dunk_form("4M178");
    form.asins = vec![AsinRow::new("not-an-asin", "9", 1)];

    let result = leads::submit_lead(&repo, &admin(), form, submitted_at());
    assert!(matches!(result, Err(ServiceError::Form(_))));
    assert!(!repo.lead_id_exists("251013143045JN").unwrap());
}

#[test]
fn order_email_creates_purchases_once() {
    let test_db = common::TestDb::new("service_order_email_creates_purchases.db");
    let repo = DieselRepository::new(test_db.pool());
    let today = NaiveDate::from_ymd_opt(2025, 10, 14).unwrap();

    let submission =
        leads::submit_lead(&repo, &admin(), dunk_form("4M178"), submitted_at()).unwrap();

    let result =
        retailer_orders::process_order(&repo, &admin(), &hibbett_email(), None, today).unwrap();
    assert!(result.success);
    assert_eq!(result.order_number.as_deref(), Some("1234567890123"));
    assert_eq!(result.created, 1);
    // 9Q512 has no lead.
    assert_eq!(result.skipped, 1);

    let (total, purchases) = repo
        .list_purchases(PurchaseListQuery::new().lead_id(submission.lead_id.as_str()))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(purchases[0].og_qty, Some(2));
    assert_eq!(purchases[0].purchase_date, Some(today));
    assert_eq!(
        purchases[0].fba_msku.as_deref(),
        Some("9.5-DD1391-100-1234567890123")
    );
    assert_eq!(
        purchases[0].asin.as_ref().map(|asin| asin.asin.as_str()),
        Some("B0CHILD095")
    );

    let again =
        retailer_orders::process_order(&repo, &admin(), &hibbett_email(), None, today).unwrap();
    assert!(again.duplicate);
    assert_eq!(again.created, 0);
    assert_eq!(repo.list_purchases(PurchaseListQuery::new()).unwrap().0, 1);
}
