//! Meal windows.
//!
//! Each meal type is orderable during a fixed range of wall-clock hours.
//! Ranges are half-open (`start <= hour < end`). A range whose start is
//! after its end wraps past midnight, and a range whose start equals its
//! end is closed all day.

use chrono::{DateTime, FixedOffset, Timelike, Utc};
use serde::Serialize;
use std::fmt;

use crate::core::models::MealType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MealWindow {
    pub start: u32,
    pub end: u32,
}

impl MealWindow {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, hour: u32) -> bool {
        if self.start < self.end {
            hour >= self.start && hour < self.end
        } else if self.start > self.end {
            hour >= self.start || hour < self.end
        } else {
            false
        }
    }

    /// Minutes left until the window closes, or `None` when it is not open
    pub fn minutes_until_close(&self, hour: u32, minute: u32) -> Option<u32> {
        if !self.contains(hour) {
            return None;
        }
        let now = hour * 60 + minute;
        let end = self.end * 60;
        Some((end + MINUTES_PER_DAY - now) % MINUTES_PER_DAY)
    }
}

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Schedule in lookup order; `current_meal` returns the first open entry.
pub const MEAL_SCHEDULE: [(MealType, MealWindow); 9] = [
    (MealType::Desjejum, MealWindow::new(0, 0)),
    (MealType::Almoco, MealWindow::new(0, 0)),
    (MealType::CafeTarde, MealWindow::new(5, 8)),
    (MealType::Jantar, MealWindow::new(5, 9)),
    (MealType::Ceia, MealWindow::new(5, 23)),
    (MealType::CafeNoturno, MealWindow::new(23, 5)),
    (MealType::Lanche, MealWindow::new(0, 23)),
    (MealType::Bebidas, MealWindow::new(19, 14)),
    (MealType::FimSemana, MealWindow::new(0, 23)),
];

pub fn window_for(meal: MealType) -> MealWindow {
    MEAL_SCHEDULE
        .iter()
        .find(|(m, _)| *m == meal)
        .map(|(_, window)| *window)
        .unwrap_or(MealWindow::new(0, 0))
}

pub fn current_meal(hour: u32) -> Option<MealType> {
    MEAL_SCHEDULE
        .iter()
        .find(|(_, window)| window.contains(hour))
        .map(|(meal, _)| *meal)
}

pub fn is_open(meal: MealType, hour: u32) -> bool {
    window_for(meal).contains(hour)
}

pub fn remaining(meal: MealType, hour: u32, minute: u32) -> Option<Remaining> {
    window_for(meal)
        .minutes_until_close(hour, minute)
        .map(|total| Remaining {
            hours: total / 60,
            minutes: total % 60,
        })
}

/// Time left in an open meal window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remaining {
    pub hours: u32,
    pub minutes: u32,
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {}m", self.hours, self.minutes)
    }
}

impl Serialize for Remaining {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;

    /// Offset used to turn UTC into the wall-clock hour meal windows use
    fn offset(&self) -> FixedOffset;

    fn local_now(&self) -> DateTime<FixedOffset> {
        self.now_utc().with_timezone(&self.offset())
    }

    /// `(hour, minute)` on the local wall clock
    fn local_hour_minute(&self) -> (u32, u32) {
        let local = self.local_now();
        (local.hour(), local.minute())
    }
}

pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn offset(&self) -> FixedOffset {
        self.offset
    }
}

/// Clock frozen at a given instant
pub struct FixedClock {
    now: std::sync::RwLock<DateTime<Utc>>,
    offset: FixedOffset,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            now: std::sync::RwLock::new(now),
            offset,
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.write() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        if let Ok(mut guard) = self.now.write() {
            *guard += by;
        }
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        match self.now.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn offset(&self) -> FixedOffset {
        self.offset
    }
}
