//! Core traits for testability and abstraction.

use chrono::NaiveDate;
use std::sync::{Mutex, PoisonError};

/// Source of the current calendar day.
///
/// The daily reset never reads the wall clock itself; callers pass the day
/// obtained from a `Clock` so the outcome is deterministic under test.
pub trait Clock: Send + Sync {
    /// The current local calendar day.
    fn today(&self) -> NaiveDate;
}

/// Clock backed by the system's local time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new system clock.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Clock pinned to a chosen day, which can be moved explicitly.
#[derive(Debug)]
pub struct FixedClock {
    day: Mutex<NaiveDate>,
}

impl FixedClock {
    /// Create a clock reporting `day`.
    #[must_use]
    pub const fn new(day: NaiveDate) -> Self {
        Self { day: Mutex::new(day) }
    }

    /// Move the clock to `day`.
    pub fn set(&self, day: NaiveDate) {
        *self.day.lock().unwrap_or_else(PoisonError::into_inner) = day;
    }

    /// Move the clock forward by `days`.
    pub fn advance(&self, days: u64) {
        let mut guard = self.day.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = guard.checked_add_days(chrono::Days::new(days)).unwrap_or(*guard);
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.day.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
