//! Listing traversal engine
//!
//! This module contains the core traversal logic, including:
//! - Resolving the advertised record and page counts
//! - Forcing newest-first ordering
//! - Extracting the fixed record schema from each listing card
//! - Walking the pagination and deciding when to stop

mod coordinator;
mod counts;
mod extractor;
mod report;
mod settle;
mod sort;

pub use coordinator::{jump_to_last_page, Coordinator};
pub use counts::{parse_page_number, parse_total_pages, parse_total_records, resolve_counts, ListingCounts};
pub use extractor::{extract_card, extract_field, extract_page, FieldSpec, FieldTransform, TenderRecord, HEADERS};
pub use report::{Reconciliation, TerminationReason, TraversalReport};
pub use settle::SettlePolicy;
pub use sort::apply_sort;
