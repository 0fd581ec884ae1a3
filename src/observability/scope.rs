//! ObservationScope for pass-level begin/complete logging
//!
//! - Logs `{name}_BEGIN` on creation
//! - Logs `{name}_COMPLETE` (with elapsed time) when completed
//! - Logs `{name}_FAILED` when failed
//! - Logs `{name}_INCOMPLETE` on drop otherwise

use std::cell::Cell;
use std::time::Instant;

use super::logger::Logger;

/// A scope that logs start and completion of one audit pass.
pub struct ObservationScope<'a> {
    name: &'a str,
    completed: Cell<bool>,
    fields: Vec<(&'a str, String)>,
    timer: Timer,
}

impl<'a> ObservationScope<'a> {
    /// Create a new observation scope with fields repeated on every line.
    pub fn with_fields(name: &'a str, fields: &[(&'a str, &str)]) -> Self {
        let event = format!("{}_BEGIN", name);
        Logger::info(&event, fields);

        Self {
            name,
            completed: Cell::new(false),
            fields: fields.iter().map(|(k, v)| (*k, v.to_string())).collect(),
            timer: Timer::new(),
        }
    }

    /// Create a new observation scope
    pub fn new(name: &'a str) -> Self {
        Self::with_fields(name, &[])
    }

    /// Mark the scope as completed with additional fields
    pub fn complete_with_fields(self, extra_fields: &[(&str, &str)]) {
        self.completed.set(true);
        let event = format!("{}_COMPLETE", self.name);
        let elapsed = self.timer.elapsed_ms();

        let mut all_fields: Vec<(&str, &str)> =
            self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        all_fields.extend(extra_fields.iter().copied());
        all_fields.push(("elapsed_ms", elapsed.as_str()));

        Logger::info(&event, &all_fields);
    }

    /// Mark the scope as completed
    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    /// Mark the scope as failed at FATAL level
    pub fn fail_fatal(self, reason: &str) {
        self.completed.set(true);
        let event = format!("{}_FAILED", self.name);
        let mut all_fields: Vec<(&str, &str)> =
            self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        all_fields.push(("reason", reason));
        Logger::fatal(&event, &all_fields);
    }

    /// Check if the scope has been completed
    pub fn is_completed(&self) -> bool {
        self.completed.get()
    }
}

impl Drop for ObservationScope<'_> {
    fn drop(&mut self) {
        if !self.completed.get() {
            let event = format!("{}_INCOMPLETE", self.name);
            Logger::warn(&event, &[("reason", "scope dropped without completion")]);
        }
    }
}

/// Wall-clock timer for pass durations
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed milliseconds as a string
    pub fn elapsed_ms(&self) -> String {
        self.start.elapsed().as_millis().to_string()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
