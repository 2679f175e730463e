//! Bridge between the browser extension and the lead submittal form.

use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::routes::check_role;
use serde::{Deserialize, Serialize};

use crate::SERVICE_ACCESS_ROLE;
use crate::amazon::{
    ExtensionMessage, HtmlProductPage, PageSnapshot, VariantObservation, VariantSource,
};
use crate::forms::leads::LeadDraft;
use crate::services::{ServiceError, ServiceResult};

/// Extension message posted to the page at `page_path`.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub page_path: String,
    pub message: ExtensionMessage,
}

/// Amazon product page captured by the extension.
#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    #[serde(flatten)]
    pub snapshot: PageSnapshot,
    /// Retailer page the product was found on.
    #[serde(default)]
    pub retailer_link: String,
}

#[derive(Debug, Serialize)]
pub struct ScrapeResult {
    pub variants: Vec<VariantObservation>,
    /// Message the extension forwards to the lead submittal page.
    pub message: ExtensionMessage,
}

/// Lead form draft filled from an extension message.
pub fn message_to_draft(
    user: &AuthenticatedUser,
    request: MessageRequest,
) -> ServiceResult<LeadDraft> {
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let message = request
        .message
        .accept(&request.page_path)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let mut draft = LeadDraft::default();
    draft.apply_extension_message(&message);
    Ok(draft)
}

/// Detects the size variants of a captured product page.
pub fn scrape<D>(
    detector: &D,
    user: &AuthenticatedUser,
    request: ScrapeRequest,
) -> ServiceResult<ScrapeResult>
where
    D: VariantSource + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    if request.snapshot.url.trim().is_empty() {
        return Err(ServiceError::Form("page url is required".to_string()));
    }

    let amazon_link = request.snapshot.url.clone();
    let mut page = HtmlProductPage::new(request.snapshot);
    let variants = detector.detect(&mut page);
    log::info!(
        "Detected {} variants ({} available) on {amazon_link}",
        variants.len(),
        variants.iter().filter(|v| v.available).count()
    );

    let message = ExtensionMessage::from_observations(request.retailer_link, amazon_link, &variants);
    Ok(ScrapeResult { variants, message })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::amazon::message::{ExtensionAsin, MESSAGE_TYPE};
    use crate::amazon::{KnownProducts, VariantDetector};

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

    fn message() -> ExtensionMessage {
        ExtensionMessage {
            kind: MESSAGE_TYPE.to_string(),
            retailer_link: "https://www.footlocker.com/product/~/HJ7395.html".to_string(),
            amazon_link: "https://www.amazon.com/dp/B0CHILD009".to_string(),
            asins: vec![ExtensionAsin {
                asin: "B0CHILD009".to_string(),
                size: "9".to_string(),
                quantity: 1,
            }],
        }
    }

    #[test]
    fn message_fills_draft_on_lead_submittal_page() {
        let request = MessageRequest {
            page_path: "/lead-submittal".to_string(),
            message: message(),
        };
        let draft = message_to_draft(&user_with_role(SERVICE_ACCESS_ROLE), request).unwrap();

        assert_eq!(draft.unique_id, "HJ7395");
        assert_eq!(draft.asins.len(), 1);
        assert_eq!(draft.asins.rows()[0].size, "9");
    }

    #[test]
    fn message_for_other_page_is_rejected() {
        let request = MessageRequest {
            page_path: "/purchase-tracker".to_string(),
            message: message(),
        };
        let result = message_to_draft(&user_with_role(SERVICE_ACCESS_ROLE), request);
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn scrape_uses_known_products() {
        let catalog = KnownProducts::from_json(
            r#"[{"parent_asin": "B0PARENT01", "name": "Dunk", "variants": [
                {"size": "9", "asin": "B0CHILD009"},
                {"size": "10", "asin": "B0CHILD010"}
            ]}]"#,
        )
        .unwrap();
        let detector = VariantDetector::new(catalog);
        let request = ScrapeRequest {
            snapshot: PageSnapshot {
                url: "https://www.amazon.com/dp/B0PARENT01".to_string(),
                html: String::new(),
            },
            retailer_link: "https://www.footlocker.com/product/~/HJ7395.html".to_string(),
        };

        let result = scrape(&detector, &user_with_role(SERVICE_ACCESS_ROLE), request).unwrap();

        assert_eq!(result.variants.len(), 2);
        assert_eq!(result.message.asins.len(), 2);
        assert_eq!(result.message.kind, MESSAGE_TYPE);
    }

    #[test]
    fn scrape_requires_url() {
        let detector = VariantDetector::default();
        let request = ScrapeRequest {
            snapshot: PageSnapshot {
                url: " ".to_string(),
                html: String::new(),
            },
            retailer_link: String::new(),
        };
        let result = scrape(&detector, &user_with_role(SERVICE_ACCESS_ROLE), request);
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }
}
