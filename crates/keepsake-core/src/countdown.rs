#![forbid(unsafe_code)]

//! Countdown to the event start.
//!
//! The ticker is driven by the host's repeating timer: each tick passes the
//! current wall-clock instant and the ticker renders the remaining
//! days/hours/minutes/seconds into four slots.
//!
//! # Invariants
//!
//! 1. Once the remaining time goes negative the ticker is inactive forever:
//!    later ticks emit nothing.
//! 2. The expiry transition emits `StopCountdown` and the expiry message
//!    exactly once.
//! 3. A remaining time of exactly zero still renders `0 0 0 0`.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::command::{CommandQueue, ElementRole, PageCommand};
use crate::error::{PageError, Result};
use crate::metrics::LayoutMetricsProvider;

const LOG_TARGET: &str = "keepsake.countdown";

pub const MILLIS_PER_SECOND: i64 = 1_000;
pub const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
pub const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
pub const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

/// Target instant and rendering knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountdownConfig {
    /// RFC 3339 instant the countdown runs to.
    pub target: String,
    /// Tick period in milliseconds (default: 1000).
    pub interval_ms: u32,
    /// HTML that replaces the countdown once the target has passed.
    pub expired_message: String,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            target: "2025-10-25T12:00:00+08:00".into(),
            interval_ms: 1_000,
            expired_message: "<p class=\"countdown-expired\">The celebration has begun!</p>"
                .into(),
        }
    }
}

/// Parse an RFC 3339 target instant.
pub fn parse_target(value: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).map_err(|source| PageError::InvalidTarget {
        value: value.to_string(),
        source,
    })
}

/// Remaining time split into display units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRemaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TimeRemaining {
    /// Decompose a millisecond count; `None` once it is negative.
    #[must_use]
    pub const fn from_millis(millis: i64) -> Option<Self> {
        if millis < 0 {
            return None;
        }
        Some(Self {
            days: millis / MILLIS_PER_DAY,
            hours: (millis % MILLIS_PER_DAY) / MILLIS_PER_HOUR,
            minutes: (millis % MILLIS_PER_HOUR) / MILLIS_PER_MINUTE,
            seconds: (millis % MILLIS_PER_MINUTE) / MILLIS_PER_SECOND,
        })
    }

    /// Time left between `now` and `target`.
    #[must_use]
    pub fn between(now: DateTime<Utc>, target: DateTime<FixedOffset>) -> Option<Self> {
        Self::from_millis((target.with_timezone(&Utc) - now).num_milliseconds())
    }
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Slots were rendered.
    Running(TimeRemaining),
    /// This tick crossed the target; the timer was stopped.
    Expired,
    /// The ticker was already stopped or never started.
    Inactive,
}

/// Countdown ticker.
#[derive(Debug, Clone)]
pub struct Countdown {
    target: DateTime<FixedOffset>,
    expired_message: String,
    active: bool,
}

impl Countdown {
    pub fn from_config(config: &CountdownConfig) -> Result<Self> {
        Ok(Self {
            target: parse_target(&config.target)?,
            expired_message: config.expired_message.clone(),
            active: false,
        })
    }

    /// Activate and render immediately.
    ///
    /// Without a countdown root the ticker stays inactive and the host is
    /// told to stop its timer.
    pub fn start(
        &mut self,
        host: &dyn LayoutMetricsProvider,
        now: DateTime<Utc>,
        out: &mut CommandQueue,
    ) -> Result<TickOutcome> {
        if !host.element_exists(ElementRole::CountdownRoot) {
            tracing::warn!(target: LOG_TARGET, "countdown root missing; countdown disabled");
            self.active = false;
            out.push(PageCommand::StopCountdown);
            return Err(PageError::MissingElement {
                role: ElementRole::CountdownRoot,
            });
        }
        self.active = true;
        tracing::debug!(target: LOG_TARGET, target = %self.target, "countdown started");
        Ok(self.tick(now, out))
    }

    /// One timer tick.
    pub fn tick(&mut self, now: DateTime<Utc>, out: &mut CommandQueue) -> TickOutcome {
        if !self.active {
            return TickOutcome::Inactive;
        }
        match TimeRemaining::between(now, self.target) {
            Some(remaining) => {
                out.set_text(ElementRole::CountdownDays, remaining.days.to_string());
                out.set_text(ElementRole::CountdownHours, remaining.hours.to_string());
                out.set_text(ElementRole::CountdownMinutes, remaining.minutes.to_string());
                out.set_text(ElementRole::CountdownSeconds, remaining.seconds.to_string());
                TickOutcome::Running(remaining)
            }
            None => {
                self.active = false;
                out.push(PageCommand::StopCountdown);
                out.push(PageCommand::SetInnerHtml {
                    role: ElementRole::CountdownRoot,
                    html: self.expired_message.clone(),
                });
                tracing::debug!(target: LOG_TARGET, "countdown expired");
                TickOutcome::Expired
            }
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub const fn target(&self) -> DateTime<FixedOffset> {
        self.target
    }
}
