//! Per-page record extraction
//!
//! Every listing card yields exactly one [`TenderRecord`]. Fields whose source
//! element is missing become empty strings, so every record has the same
//! shape regardless of how much of the card rendered.

use crate::config::Config;
use crate::driver::{PageDriver, Scope};
use crate::url::detail_url_or_empty;
use serde::Serialize;

pub const CARD_SELECTOR: &str = "div.card";

/// Column headers of the serialized record, in field order
pub const HEADERS: [&str; 8] = [
    "Page",
    "Bid Number",
    "Detail URL",
    "Items",
    "Quantity",
    "Department",
    "Start Date",
    "End Date",
];

/// One listing card
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TenderRecord {
    #[serde(rename = "Page")]
    pub page: u32,
    #[serde(rename = "Bid Number")]
    pub bid_number: String,
    #[serde(rename = "Detail URL")]
    pub detail_url: String,
    #[serde(rename = "Items")]
    pub items: String,
    #[serde(rename = "Quantity")]
    pub quantity: String,
    #[serde(rename = "Department")]
    pub department: String,
    #[serde(rename = "Start Date")]
    pub start_date: String,
    #[serde(rename = "End Date")]
    pub end_date: String,
}

/// How a located element becomes a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldTransform {
    /// Trimmed rendered text
    Text,
    /// `href` attribute joined onto the site origin
    DetailUrl,
    /// Trimmed text with a leading label removed
    StripLabel(&'static str),
}

/// Where a field lives inside a card and how to read it
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub selector: &'static str,
    pub transform: FieldTransform,
}

const BID_LINK: &str = ".block_header a.bid_no_hover";

pub const BID_NUMBER: FieldSpec = FieldSpec {
    selector: BID_LINK,
    transform: FieldTransform::Text,
};
pub const DETAIL_URL: FieldSpec = FieldSpec {
    selector: BID_LINK,
    transform: FieldTransform::DetailUrl,
};
pub const ITEMS: FieldSpec = FieldSpec {
    selector: ".card-body .col-md-4 .row:nth-child(1) a",
    transform: FieldTransform::Text,
};
pub const QUANTITY: FieldSpec = FieldSpec {
    selector: ".card-body .col-md-4 .row:nth-child(2)",
    transform: FieldTransform::StripLabel("Quantity:"),
};
pub const DEPARTMENT: FieldSpec = FieldSpec {
    selector: ".card-body .col-md-5 .row:nth-child(2)",
    transform: FieldTransform::Text,
};
pub const START_DATE: FieldSpec = FieldSpec {
    selector: "span.start_date",
    transform: FieldTransform::Text,
};
pub const END_DATE: FieldSpec = FieldSpec {
    selector: "span.end_date",
    transform: FieldTransform::Text,
};

/// Reads one field of a card, yielding "" when anything along the way is missing
pub async fn extract_field<D: PageDriver>(
    driver: &D,
    card: &D::Element,
    spec: FieldSpec,
    base_origin: &str,
) -> String {
    let element = match driver.query_selector(Scope::Within(card), spec.selector).await {
        Ok(Some(element)) => element,
        Ok(None) => {
            tracing::debug!("No match for '{}' in card", spec.selector);
            return String::new();
        }
        Err(e) => {
            tracing::debug!("Lookup of '{}' failed: {}", spec.selector, e);
            return String::new();
        }
    };

    match spec.transform {
        FieldTransform::Text => driver
            .text(&element)
            .await
            .map(|text| text.trim().to_string())
            .unwrap_or_default(),
        FieldTransform::StripLabel(label) => driver
            .text(&element)
            .await
            .map(|text| text.replace(label, "").trim().to_string())
            .unwrap_or_default(),
        FieldTransform::DetailUrl => {
            let href = driver.attribute(&element, "href").await.ok().flatten();
            detail_url_or_empty(base_origin, href.as_deref())
        }
    }
}

/// Extracts the record of a single card
pub async fn extract_card<D: PageDriver>(
    driver: &D,
    card: &D::Element,
    page_no: u32,
    base_origin: &str,
) -> TenderRecord {
    TenderRecord {
        page: page_no,
        bid_number: extract_field(driver, card, BID_NUMBER, base_origin).await,
        detail_url: extract_field(driver, card, DETAIL_URL, base_origin).await,
        items: extract_field(driver, card, ITEMS, base_origin).await,
        quantity: extract_field(driver, card, QUANTITY, base_origin).await,
        department: extract_field(driver, card, DEPARTMENT, base_origin).await,
        start_date: extract_field(driver, card, START_DATE, base_origin).await,
        end_date: extract_field(driver, card, END_DATE, base_origin).await,
    }
}

/// Extracts every card on the loaded page, in document order
///
/// Lazy-rendered cards are brought in by scrolling `scroll-steps` times first.
pub async fn extract_page<D: PageDriver>(
    driver: &mut D,
    page_no: u32,
    config: &Config,
) -> Vec<TenderRecord> {
    let timing = &config.timing;
    for _ in 0..timing.scroll_steps {
        if let Err(e) = driver.scroll(0, timing.scroll_distance).await {
            tracing::debug!("Scroll failed on page {}: {}", page_no, e);
            break;
        }
        driver.sleep(timing.scroll_pause()).await;
    }

    let cards = match driver.query_selector_all(Scope::Document, CARD_SELECTOR).await {
        Ok(cards) => cards,
        Err(e) => {
            tracing::warn!("Card lookup failed on page {}: {}", page_no, e);
            Vec::new()
        }
    };

    let base_origin = config.base_origin();
    let mut records = Vec::with_capacity(cards.len());
    for card in &cards {
        records.push(extract_card(&*driver, card, page_no, base_origin).await);
    }

    tracing::info!("Page {}: extracted {} records", page_no, records.len());
    records
}
