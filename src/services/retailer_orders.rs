//! Turning order confirmation and warehouse emails into purchases and check-ins.

use chrono::{NaiveDate, NaiveDateTime};
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::routes::check_role;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::purchase::NewPurchase;
use crate::domain::retailer_order::{
    EmailMessage, InboundProcessingResult, OrderItem, OrderProcessingResult, ParsedOrder,
};
use crate::parsers::{self, OrderEmailParser, prepworx};
use crate::repository::{AsinBankReader, CheckinWriter, LeadReader, PurchaseReader, PurchaseWriter};
use crate::services::{ServiceError, ServiceResult};

/// SKU segment of the merchant SKU when the lead has none.
const UNKNOWN_SKU: &str = "UNKNOWN";

fn merchant_sku(size: &str, sku: Option<&str>, order_number: &str) -> String {
    let sku = sku.filter(|sku| !sku.trim().is_empty()).unwrap_or(UNKNOWN_SKU);
    format!("{size}-{sku}-{order_number}")
}

fn select_parser(
    email: &EmailMessage,
    retailer: Option<&str>,
) -> Result<Box<dyn OrderEmailParser>, String> {
    match retailer {
        Some(key) => parsers::parser_for(key).ok_or_else(|| format!("unknown retailer `{key}`")),
        None => parsers::detect_parser(email)
            .ok_or_else(|| "no parser recognises this email".to_string()),
    }
}

/// Purchase for one order line, `None` when no lead or ASIN matches it.
fn purchase_for_item<R>(
    repo: &R,
    order: &ParsedOrder,
    item: &OrderItem,
    purchase_date: NaiveDate,
) -> ServiceResult<Option<NewPurchase>>
where
    R: LeadReader + AsinBankReader + ?Sized,
{
    let Some(lead) = repo
        .get_lead_by_unique_id(&item.unique_id)
        .map_err(ServiceError::from)?
    else {
        log::warn!(
            "No lead with unique ID {} for order {}",
            item.unique_id,
            order.order_number
        );
        return Ok(None);
    };

    // Slots first: a reused bank row carries the lead ID of its first lead.
    let slot = lead
        .asins
        .iter()
        .find(|slot| slot.size.as_deref() == Some(item.size.as_str()))
        .map(|slot| slot.asin_bank_id);
    let asin_bank_id = match slot {
        Some(id) => Some(id),
        None => repo
            .find_lead_asin(&lead.lead_id, &item.size)
            .map_err(ServiceError::from)?
            .map(|entry| entry.id),
    };
    let Some(asin_bank_id) = asin_bank_id else {
        log::warn!(
            "Lead {} has no ASIN for size {} (order {})",
            lead.lead_id,
            item.size,
            order.order_number
        );
        return Ok(None);
    };

    let purchase = NewPurchase::ordered(
        lead.id,
        lead.lead_id.as_str(),
        order.order_number.as_str(),
        item.quantity,
        purchase_date,
    )
    .with_asin(asin_bank_id)
    .with_rsp(lead.rsp)
    .with_msku(merchant_sku(
        &item.size,
        lead.product_sku.as_deref(),
        &order.order_number,
    ));
    Ok(Some(purchase))
}

/// Parses an order confirmation and records a purchase per matched item.
///
/// `retailer` forces a parser by key; otherwise the parser is picked from the
/// sender and subject. Markup and matching problems are reported in the
/// result, repository failures as errors.
pub fn process_order<R>(
    repo: &R,
    user: &AuthenticatedUser,
    email: &EmailMessage,
    retailer: Option<&str>,
    today: NaiveDate,
) -> ServiceResult<OrderProcessingResult>
where
    R: PurchaseReader + PurchaseWriter + LeadReader + AsinBankReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let parser = match select_parser(email, retailer) {
        Ok(parser) => parser,
        Err(err) => {
            log::warn!("Email `{}` skipped: {err}", email.subject);
            return Ok(OrderProcessingResult::failed(None, err));
        }
    };

    let Some(order) = parser.parse(email) else {
        return Ok(OrderProcessingResult::failed(
            None,
            format!("could not parse the {} order email", parser.retailer()),
        ));
    };

    if repo
        .order_number_exists(&order.order_number)
        .map_err(ServiceError::from)?
    {
        log::info!("Order {} already recorded", order.order_number);
        return Ok(OrderProcessingResult::duplicate(&order));
    }

    let mut purchases = Vec::with_capacity(order.items.len());
    for item in &order.items {
        if let Some(purchase) = purchase_for_item(repo, &order, item, today)? {
            purchases.push(purchase);
        }
    }
    let skipped = order.items.len() - purchases.len();

    if purchases.is_empty() {
        return Ok(OrderProcessingResult {
            skipped,
            ..OrderProcessingResult::failed(Some(&order), "no purchases created")
        });
    }

    let Some(created) = repo
        .create_order_purchases(&order.order_number, &purchases)
        .map_err(ServiceError::from)?
    else {
        log::info!("Order {} recorded concurrently", order.order_number);
        return Ok(OrderProcessingResult::duplicate(&order));
    };
    log::info!(
        "Order {} from {}: {created} purchases created, {skipped} items skipped",
        order.order_number,
        order.retailer
    );

    Ok(OrderProcessingResult {
        success: true,
        retailer: Some(order.retailer.clone()),
        order_number: Some(order.order_number.clone()),
        items_count: order.items.len(),
        created,
        skipped,
        duplicate: false,
        error: None,
    })
}

/// Parses a PrepWorx inbound notification into check-ins.
pub fn process_inbound<R>(
    repo: &R,
    user: &AuthenticatedUser,
    email: &EmailMessage,
    now: NaiveDateTime,
) -> ServiceResult<InboundProcessingResult>
where
    R: CheckinWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    if !prepworx::can_parse(email) {
        return Err(ServiceError::Form(
            "not a PrepWorx inbound notification".to_string(),
        ));
    }
    let shipment = prepworx::parse(email)
        .ok_or_else(|| ServiceError::Form("inbound email has no items".to_string()))?;

    let items: Vec<_> = shipment
        .items
        .iter()
        .filter(|item| item.quantity != 0)
        .cloned()
        .collect();
    let record = repo
        .record_inbound(&shipment.order_number, &items, now)
        .map_err(ServiceError::from)?;

    log::info!(
        "Inbound {}: {} check-ins, {} duplicates skipped, {} new ASINs",
        shipment.order_number,
        record.created,
        record.skipped,
        record.asins_created
    );
    Ok(InboundProcessingResult {
        order_number: shipment.order_number,
        items_count: shipment.items.len(),
        created: record.created,
        skipped: record.skipped,
        asins_created: record.asins_created,
    })
}
