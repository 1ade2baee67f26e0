//! Integration tests for gem-tenders
//!
//! These tests drive complete traversals through the snapshot driver over
//! synthetic listing pages.

#[path = "../../src/driver/fixtures.rs"]
mod fixtures;

mod service_tests;
mod support;
mod traversal_tests;
