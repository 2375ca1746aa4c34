// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::{Duration, Instant};

pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(200);

/// Single-slot delayed task. Scheduling replaces whatever was pending, so at
/// most one value is ever waiting. Callers pass the clock in and poll.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
    token: u64,
}

#[derive(Debug, Clone)]
struct Pending<T> {
    due: Instant,
    token: u64,
    value: T,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            token: 0,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules `value` for `now + delay`, cancelling the previous entry.
    /// Returns the token identifying the new entry.
    pub fn schedule(&mut self, value: T, now: Instant) -> u64 {
        self.token = self.token.saturating_add(1);
        self.pending = Some(Pending {
            due: now + self.delay,
            token: self.token,
            value,
        });
        self.token
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|pending| pending.value)
    }

    /// Takes the pending value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.pending.as_ref().is_some_and(|pending| pending.due <= now) {
            return self.cancel();
        }
        None
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_token(&self) -> Option<u64> {
        self.pending.as_ref().map(|pending| pending.token)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.due)
    }

    pub fn peek(&self) -> Option<&T> {
        self.pending.as_ref().map(|pending| &pending.value)
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEBOUNCE)
    }
}
