use chrono::NaiveDateTime;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::checkin::{NewCheckin, UpdateCheckin};
use crate::forms::sanitize_inline_text;

const TEXT_MAX_LEN: u64 = 255;

#[derive(Debug, Error)]
pub enum CheckinFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("quantity cannot be zero")]
    ZeroQuantity,
    #[error("give either `asin_bank_id` or `asin`, not both")]
    AmbiguousAsin,
}

/// How a new check-in points at its ASIN bank row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsinReference {
    None,
    Id(i32),
    /// Looked up by ASIN and size, created when missing.
    Asin { asin: String, size: Option<String> },
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AddCheckinForm {
    #[validate(length(max = TEXT_MAX_LEN))]
    pub order_number: Option<String>,
    #[validate(length(max = TEXT_MAX_LEN))]
    pub item_name: Option<String>,
    pub asin_bank_id: Option<i32>,
    #[validate(length(equal = 10))]
    pub asin: Option<String>,
    #[validate(length(max = 20))]
    pub size: Option<String>,
    pub quantity: i32,
    pub checked_in_at: Option<NaiveDateTime>,
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| sanitize_inline_text(&v))
        .filter(|v| !v.is_empty())
}

impl AddCheckinForm {
    /// The check-in to store, stamped `now` unless a time was given.
    pub fn into_new_checkin(
        self,
        now: NaiveDateTime,
    ) -> Result<(NewCheckin, AsinReference), CheckinFormError> {
        self.validate()?;
        if self.quantity == 0 {
            return Err(CheckinFormError::ZeroQuantity);
        }

        let asin = clean(self.asin).map(|asin| asin.to_ascii_uppercase());
        let reference = match (self.asin_bank_id, asin) {
            (Some(_), Some(_)) => return Err(CheckinFormError::AmbiguousAsin),
            (Some(id), None) => AsinReference::Id(id),
            (None, Some(asin)) => AsinReference::Asin {
                asin,
                size: clean(self.size),
            },
            (None, None) => AsinReference::None,
        };

        let checkin = NewCheckin {
            order_number: clean(self.order_number),
            item_name: clean(self.item_name),
            asin_bank_id: None,
            quantity: self.quantity,
            checked_in_at: self.checked_in_at.unwrap_or(now),
        };
        Ok((checkin, reference))
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct EditCheckinForm {
    #[validate(length(max = TEXT_MAX_LEN))]
    pub order_number: Option<String>,
    #[validate(length(max = TEXT_MAX_LEN))]
    pub item_name: Option<String>,
    pub asin_bank_id: Option<i32>,
    pub quantity: Option<i32>,
    pub checked_in_at: Option<NaiveDateTime>,
}

impl EditCheckinForm {
    pub fn into_update_checkin(self) -> Result<UpdateCheckin, CheckinFormError> {
        self.validate()?;
        if self.quantity == Some(0) {
            return Err(CheckinFormError::ZeroQuantity);
        }

        Ok(UpdateCheckin {
            order_number: clean(self.order_number),
            item_name: clean(self.item_name),
            asin_bank_id: self.asin_bank_id,
            quantity: self.quantity,
            checked_in_at: self.checked_in_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 13)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .unwrap()
    }

    #[test]
    fn asin_and_size_reference_bank_row() {
        let form = AddCheckinForm {
            order_number: Some(" P0017327917518 ".to_string()),
            asin: Some("b0djdxb819".to_string()),
            size: Some("6.5".to_string()),
            quantity: 2,
            ..AddCheckinForm::default()
        };

        let (checkin, reference) = form.into_new_checkin(now()).unwrap();

        assert_eq!(checkin.order_number.as_deref(), Some("P0017327917518"));
        assert_eq!(checkin.checked_in_at, now());
        assert_eq!(
            reference,
            AsinReference::Asin {
                asin: "B0DJDXB819".to_string(),
                size: Some("6.5".to_string())
            }
        );
    }

    #[test]
    fn rejects_both_id_and_asin() {
        let form = AddCheckinForm {
            asin_bank_id: Some(3),
            asin: Some("B0DJDXB819".to_string()),
            quantity: 1,
            ..AddCheckinForm::default()
        };
        assert!(matches!(
            form.into_new_checkin(now()),
            Err(CheckinFormError::AmbiguousAsin)
        ));
    }

    #[test]
    fn rejects_zero_quantity() {
        let form = AddCheckinForm::default();
        assert!(matches!(
            form.into_new_checkin(now()),
            Err(CheckinFormError::ZeroQuantity)
        ));
        let edit = EditCheckinForm {
            quantity: Some(0),
            ..EditCheckinForm::default()
        };
        assert!(matches!(
            edit.into_update_checkin(),
            Err(CheckinFormError::ZeroQuantity)
        ));
    }
}
