/// Traversal state definitions
///
/// This module defines the walk direction, the phases of the traversal state
/// machine and the position tracking owned by the coordinator.
use crate::GemError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a walk over the listing pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Start at page 1 and follow the "next" control
    #[default]
    Forward,

    /// Jump to the last page and follow the "previous" control
    Backward,
}

impl Direction {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "forward" => Some(Self::Forward),
            "backward" => Some(Self::Backward),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

/// Phases of the traversal state machine
///
/// ```text
/// Init -> CountResolved -> PageLoaded -> Extracting -> Advancing -> PageLoaded
///                                                              \-> Terminated
/// ```
///
/// Any non-terminal phase may also move straight to `Terminated` when the walk
/// has to stop early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Init,
    CountResolved,
    PageLoaded,
    Extracting,
    Advancing,
    Terminated,
}

impl Phase {
    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: Phase) -> bool {
        match (self, next) {
            (Self::Terminated, _) => false,
            (_, Self::Terminated) => true,
            (Self::Init, Self::CountResolved) => true,
            (Self::CountResolved, Self::PageLoaded) => true,
            (Self::PageLoaded, Self::Extracting) => true,
            (Self::Extracting, Self::Advancing) => true,
            (Self::Advancing, Self::PageLoaded) => true,
            _ => false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated)
    }
}

/// Position and bounds of one traversal
///
/// `current_page` only ever moves in the traversal direction; there is no way
/// to step back onto a page once the walk has advanced past it.
#[derive(Debug, Clone)]
pub struct TraversalState {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_records_expected: u64,
    pub direction: Direction,
    /// Lowest page a backward walk extracts
    pub stop_page: u32,
    /// Page the walk begins extracting from
    pub start_page: u32,
    pub pages_visited: u32,
    phase: Phase,
}

impl TraversalState {
    pub fn new(direction: Direction, stop_page: u32) -> Self {
        Self {
            current_page: 0,
            total_pages: 0,
            total_records_expected: 0,
            direction,
            stop_page: stop_page.max(1),
            start_page: 0,
            pages_visited: 0,
            phase: Phase::Init,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Moves the state machine to `next`, rejecting illegal transitions
    pub fn transition(&mut self, next: Phase) -> Result<(), GemError> {
        if !self.phase.can_transition_to(next) {
            return Err(GemError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::trace!("Traversal phase {:?} -> {:?}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Records the listing totals; page 1 is the loaded page afterwards
    ///
    /// A backward walk is expected to start from the last page until
    /// [`start_at`](Self::start_at) says where the jump actually landed.
    pub fn resolve(&mut self, total_records: u64, total_pages: u32) -> Result<(), GemError> {
        self.transition(Phase::CountResolved)?;
        self.total_records_expected = total_records;
        self.total_pages = total_pages.max(1);
        self.current_page = 1;
        self.start_page = match self.direction {
            Direction::Forward => 1,
            Direction::Backward => self.total_pages,
        };
        Ok(())
    }

    /// Repositions the walk after a jump, before any page has been extracted
    pub fn start_at(&mut self, page: u32) -> Result<(), GemError> {
        if self.phase != Phase::CountResolved {
            return Err(GemError::InvalidTransition {
                from: self.phase,
                to: Phase::PageLoaded,
            });
        }
        if page < 1 || page > self.total_pages {
            return Err(GemError::PageOutOfBounds {
                page,
                total_pages: self.total_pages,
            });
        }
        self.current_page = page;
        self.start_page = page;
        Ok(())
    }

    /// Page the walk heads toward: the last page going forward, the stop
    /// page going backward
    pub fn end_page(&self) -> u32 {
        match self.direction {
            Direction::Forward => self.total_pages,
            Direction::Backward => self.stop_page,
        }
    }

    /// Counts the current page as extracted
    pub fn record_visit(&mut self) {
        self.pages_visited += 1;
    }

    /// Returns true when the current page is the last one the walk may extract
    ///
    /// Forward walks stop at `total_pages`; backward walks stop at `stop_page`.
    pub fn at_boundary(&self) -> bool {
        match self.direction {
            Direction::Forward => self.current_page >= self.total_pages,
            Direction::Backward => self.current_page <= self.stop_page,
        }
    }

    /// Steps one page in the traversal direction and returns the new page
    pub fn advance(&mut self) -> Result<u32, GemError> {
        if self.phase != Phase::Advancing {
            return Err(GemError::InvalidTransition {
                from: self.phase,
                to: Phase::PageLoaded,
            });
        }
        let next = match self.direction {
            Direction::Forward => self.current_page + 1,
            Direction::Backward => self.current_page.saturating_sub(1),
        };
        if next < 1 || next > self.total_pages.max(self.current_page) {
            return Err(GemError::PageOutOfBounds {
                page: next,
                total_pages: self.total_pages,
            });
        }
        self.current_page = next;
        self.transition(Phase::PageLoaded)?;
        Ok(next)
    }

    /// Moves to `Terminated` from wherever the walk currently is
    pub fn terminate(&mut self) {
        if !self.phase.is_terminal() {
            self.phase = Phase::Terminated;
        }
    }
}
