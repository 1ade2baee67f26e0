//! Traversal outcome types

use crate::crawler::TenderRecord;
use crate::state::Direction;
use std::fmt;

/// Why a traversal stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationReason {
    /// Forward walk extracted the last advertised page
    ReachedLastPage,
    /// Forward walk found no "next" control before the last page
    NoNextControl,
    /// Backward walk extracted the stop page
    ReachedStopPage,
    /// Backward walk found no "previous" control above the stop page
    NoPreviousControl,
    /// The driver failed mid-walk; records gathered so far are kept
    DriverFailure(String),
}

impl TerminationReason {
    /// Returns true if the walk ended before its intended bound
    pub fn is_premature(&self) -> bool {
        matches!(self, Self::NoPreviousControl | Self::DriverFailure(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReachedLastPage => "reached_last_page",
            Self::NoNextControl => "no_next_control",
            Self::ReachedStopPage => "reached_stop_page",
            Self::NoPreviousControl => "no_previous_control",
            Self::DriverFailure(_) => "driver_failure",
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DriverFailure(message) => write!(f, "driver_failure ({})", message),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// Scraped versus advertised record counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    pub expected: u64,
    pub scraped: u64,
}

impl Reconciliation {
    /// Records still missing; negative when more were scraped than advertised
    pub fn delta(&self) -> i64 {
        self.expected as i64 - self.scraped as i64
    }

    pub fn is_complete(&self) -> bool {
        self.scraped >= self.expected
    }
}

/// Everything a finished traversal produced
#[derive(Debug, Clone)]
pub struct TraversalReport {
    /// Records in traversal order
    pub records: Vec<TenderRecord>,
    pub total_records_expected: u64,
    pub total_pages: u32,
    pub pages_visited: u32,
    pub direction: Direction,
    /// First page the walk extracted (or would have)
    pub start_page: u32,
    /// Page the walk was heading toward
    pub end_page: u32,
    pub termination: TerminationReason,
}

impl TraversalReport {
    pub fn reconciliation(&self) -> Reconciliation {
        Reconciliation {
            expected: self.total_records_expected,
            scraped: self.records.len() as u64,
        }
    }

    pub fn is_premature(&self) -> bool {
        self.termination.is_premature()
    }
}
