use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::purchase::UpdatePurchase;

const TEXT_MAX_LEN: u64 = 255;

#[derive(Debug, Error)]
pub enum PurchaseFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("cancelled quantity {cancelled} exceeds the ordered quantity {ordered}")]
    CancelledExceedsOrdered { cancelled: i32, ordered: i32 },
    #[error("nothing to update")]
    Empty,
}

/// Fulfilment and refund fields edited on the purchase tracker.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct EditPurchaseForm {
    #[validate(range(min = 0))]
    pub final_qty: Option<i32>,
    #[validate(range(min = 0.0))]
    pub rsp: Option<f64>,
    pub address: Option<String>,
    #[validate(range(min = 0))]
    pub shipped_to_pw: Option<i32>,
    #[validate(range(min = 0))]
    pub arrived: Option<i32>,
    #[validate(range(min = 0))]
    pub checked_in: Option<i32>,
    #[validate(range(min = 0))]
    pub shipped_out: Option<i32>,
    pub delivery_date: Option<NaiveDate>,
    #[validate(length(max = TEXT_MAX_LEN))]
    pub status: Option<String>,
    #[validate(length(max = TEXT_MAX_LEN))]
    pub location: Option<String>,
    pub in_bound: Option<bool>,
    #[validate(length(max = TEXT_MAX_LEN))]
    pub tracking: Option<String>,
    pub outbound_name: Option<String>,
    pub fba_shipment: Option<String>,
    pub fba_msku: Option<String>,
    pub audited: Option<bool>,
    #[validate(range(min = 0))]
    pub cancelled_qty: Option<i32>,
    pub amt_of_cancelled_qty_credit_card: Option<f64>,
    pub amt_of_cancelled_qty_gift_card: Option<f64>,
    pub expected_refund_amount: Option<f64>,
    pub amount_refunded: Option<f64>,
    pub refund_status: Option<String>,
    pub refund_method: Option<String>,
    pub date_of_refund: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl EditPurchaseForm {
    pub fn into_update_purchase(self) -> Result<UpdatePurchase, PurchaseFormError> {
        self.validate()?;

        if let (Some(cancelled), Some(ordered)) = (self.cancelled_qty, self.final_qty)
            && cancelled > ordered
        {
            return Err(PurchaseFormError::CancelledExceedsOrdered { cancelled, ordered });
        }

        let trim = |value: Option<String>| value.map(|v| v.trim().to_string());
        let updates = UpdatePurchase {
            final_qty: self.final_qty,
            rsp: self.rsp,
            address: trim(self.address),
            shipped_to_pw: self.shipped_to_pw,
            arrived: self.arrived,
            checked_in: self.checked_in,
            shipped_out: self.shipped_out,
            delivery_date: self.delivery_date,
            status: trim(self.status),
            location: trim(self.location),
            in_bound: self.in_bound,
            tracking: trim(self.tracking),
            outbound_name: trim(self.outbound_name),
            fba_shipment: trim(self.fba_shipment),
            fba_msku: trim(self.fba_msku),
            audited: self.audited,
            cancelled_qty: self.cancelled_qty,
            amt_of_cancelled_qty_credit_card: self.amt_of_cancelled_qty_credit_card,
            amt_of_cancelled_qty_gift_card: self.amt_of_cancelled_qty_gift_card,
            expected_refund_amount: self.expected_refund_amount,
            amount_refunded: self.amount_refunded,
            refund_status: trim(self.refund_status),
            refund_method: trim(self.refund_method),
            date_of_refund: self.date_of_refund,
            notes: trim(self.notes),
        };

        if updates.is_empty() {
            return Err(PurchaseFormError::Empty);
        }
        Ok(updates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_stage_markers_and_dates() {
        let form: EditPurchaseForm = serde_json::from_str(
            r#"{"shipped_to_pw": 1, "arrived": 2, "delivery_date": "2025-10-20", "status": " Delivered "}"#,
        )
        .unwrap();

        let updates = form.into_update_purchase().unwrap();

        assert_eq!(updates.shipped_to_pw, Some(1));
        assert_eq!(updates.arrived, Some(2));
        assert_eq!(updates.delivery_date, NaiveDate::from_ymd_opt(2025, 10, 20));
        assert_eq!(updates.status.as_deref(), Some("Delivered"));
    }

    #[test]
    fn rejects_negative_quantities() {
        let form = EditPurchaseForm {
            final_qty: Some(-1),
            ..EditPurchaseForm::default()
        };
        assert!(matches!(
            form.into_update_purchase(),
            Err(PurchaseFormError::Validation(_))
        ));
    }

    #[test]
    fn rejects_more_cancelled_than_ordered() {
        let form = EditPurchaseForm {
            final_qty: Some(2),
            cancelled_qty: Some(3),
            ..EditPurchaseForm::default()
        };
        assert!(matches!(
            form.into_update_purchase(),
            Err(PurchaseFormError::CancelledExceedsOrdered { .. })
        ));
    }

    #[test]
    fn empty_patch_is_rejected() {
        assert!(matches!(
            EditPurchaseForm::default().into_update_purchase(),
            Err(PurchaseFormError::Empty)
        ));
    }
}
