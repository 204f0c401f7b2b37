//! Display board state.
//!
//! `DisplaySession` is a plain state machine: callers pass the current time
//! in and get back the fetch to issue, if any. It owns the only slide timer,
//! so replacing the timer is the only way to schedule one, and at most one is
//! ever live. Fetch results are applied only when their sequence number is
//! newer than the last applied one.

use crate::client::{ClientFetchError, FetchRequest};
use crate::model::{AggregatedItem, PageResult};
use crate::pagination;
use std::time::{Duration, Instant};

/// Auto-slide state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideState {
    Idle,
    Running,
}

/// The single scheduled auto-slide tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideTimer {
    pub id: u64,
    pub due: Instant,
}

/// A fetch the caller must run and later hand back to [`DisplaySession::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCommand {
    pub sequence: u64,
    pub request: FetchRequest,
}

#[derive(Debug)]
pub struct DisplaySession {
    current_page: u32,
    page_size: u32,
    search_term: String,
    auto_slide_enabled: bool,
    interval: Duration,
    timer: Option<SlideTimer>,
    timers_armed: u64,
    last_issued_sequence: u64,
    last_applied_sequence: u64,
    items: Vec<AggregatedItem>,
    total_count: u64,
    error: Option<String>,
    loading: bool,
    mounted: bool,
}

impl DisplaySession {
    pub fn new(page_size: u32, interval: Duration, auto_slide: bool) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
            search_term: String::new(),
            auto_slide_enabled: auto_slide,
            interval,
            timer: None,
            timers_armed: 0,
            last_issued_sequence: 0,
            last_applied_sequence: 0,
            items: Vec::new(),
            total_count: 0,
            error: None,
            loading: false,
            mounted: false,
        }
    }

    /// Start the session with `search` and load page 1.
    pub fn mount(&mut self, search: &str, now: Instant) -> FetchCommand {
        self.mounted = true;
        self.search_term = search.trim().to_string();
        if self.auto_slide_enabled {
            self.arm(now);
        }
        self.issue(1)
    }

    /// Tear down; no timer survives.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.timer = None;
    }

    pub fn enable(&mut self, now: Instant) {
        self.auto_slide_enabled = true;
        if self.mounted {
            self.arm(now);
        }
    }

    pub fn disable(&mut self) {
        self.auto_slide_enabled = false;
        self.timer = None;
    }

    pub fn toggle_auto_slide(&mut self, now: Instant) {
        if self.auto_slide_enabled {
            self.disable();
        } else {
            self.enable(now);
        }
    }

    /// Timer `id` fired. Ignored unless it is the live timer of a running session.
    pub fn on_timer(&mut self, id: u64, now: Instant) -> Option<FetchCommand> {
        if self.state() != SlideState::Running || self.timer.map(|t| t.id) != Some(id) {
            return None;
        }
        let next = pagination::next_page_wrapping(self.current_page, self.page_count());
        self.arm(now);
        Some(self.issue(next))
    }

    pub fn submit_search(&mut self, term: &str, now: Instant) -> FetchCommand {
        self.search_term = term.trim().to_string();
        self.on_user_interaction(now);
        self.issue(1)
    }

    /// Jump to `page`, clamped to the known page range.
    pub fn go_to_page(&mut self, page: u32, now: Instant) -> FetchCommand {
        let page = page.clamp(1, pagination::last_page(self.total_count, self.page_size));
        self.on_user_interaction(now);
        self.issue(page)
    }

    pub fn next_page(&mut self, now: Instant) -> FetchCommand {
        self.go_to_page(self.current_page.saturating_add(1), now)
    }

    pub fn previous_page(&mut self, now: Instant) -> FetchCommand {
        self.go_to_page(self.current_page.saturating_sub(1), now)
    }

    pub fn refresh(&mut self, now: Instant) -> FetchCommand {
        self.on_user_interaction(now);
        self.issue(self.current_page)
    }

    /// Restart the countdown without changing whether auto-slide is on.
    pub fn on_user_interaction(&mut self, now: Instant) {
        if self.state() == SlideState::Running {
            self.arm(now);
        }
    }

    /// Apply a resolved fetch. Returns false when it was stale and dropped.
    pub fn apply(&mut self, sequence: u64, outcome: Result<PageResult, ClientFetchError>) -> bool {
        if sequence <= self.last_applied_sequence {
            log::debug!(
                "dropping fetch #{sequence}, #{} already applied",
                self.last_applied_sequence
            );
            return false;
        }
        self.last_applied_sequence = sequence;
        if sequence >= self.last_issued_sequence {
            self.loading = false;
        }
        match outcome {
            Ok(page) => {
                self.current_page = page.page.max(1);
                self.total_count = page.total_count;
                self.items = page.items;
                self.error = None;
            }
            Err(err) => {
                log::warn!("fetch #{sequence} failed: {err}");
                self.items.clear();
                self.error = Some(err.to_string());
            }
        }
        true
    }

    fn arm(&mut self, now: Instant) {
        self.timers_armed += 1;
        self.timer = Some(SlideTimer {
            id: self.timers_armed,
            due: now + self.interval,
        });
    }

    fn issue(&mut self, page: u32) -> FetchCommand {
        self.last_issued_sequence += 1;
        self.loading = true;
        FetchCommand {
            sequence: self.last_issued_sequence,
            request: FetchRequest {
                search: self.search_term.clone(),
                page,
                page_size: self.page_size,
            },
        }
    }

    pub fn state(&self) -> SlideState {
        if self.mounted && self.auto_slide_enabled {
            SlideState::Running
        } else {
            SlideState::Idle
        }
    }

    pub fn timer(&self) -> Option<SlideTimer> {
        self.timer
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn page_count(&self) -> u32 {
        pagination::page_count(self.total_count, self.page_size)
    }

    pub fn shows_pager(&self) -> bool {
        pagination::shows_pager(self.total_count, self.page_size)
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn auto_slide_enabled(&self) -> bool {
        self.auto_slide_enabled
    }

    pub fn items(&self) -> &[AggregatedItem] {
        &self.items
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_issued_sequence(&self) -> u64 {
        self.last_issued_sequence
    }

    pub fn last_applied_sequence(&self) -> u64 {
        self.last_applied_sequence
    }
}
