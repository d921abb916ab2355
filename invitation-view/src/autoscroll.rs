use std::time::{Duration, Instant};

use log::debug;

/// How long a manual scroll suspends the driver.
pub const MANUAL_PAUSE: Duration = Duration::from_secs(10);

/// Pixels advanced per animation frame.
pub const STEP_PX: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    fn at_bottom(&self) -> bool {
        self.scroll_top >= self.scroll_height - self.client_height - 1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollStep {
    /// Scroll the content to this offset.
    Advance(f64),
    Idle,
    /// Reached the bottom; the driver switched itself off.
    Finished,
}

/// Slowly scrolls the invitation down, one frame at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AutoScroll {
    active: bool,
    paused_until: Option<Instant>,
    own_scroll_pending: bool,
}

impl AutoScroll {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_paused(&self, now: Instant) -> bool {
        self.paused_until.map_or(false, |until| now < until)
    }

    pub fn start(&mut self) {
        self.active = true;
    }

    pub fn stop(&mut self) {
        self.active = false;
        self.paused_until = None;
        self.own_scroll_pending = false;
    }

    /// Flips the driver on or off and returns the new state.
    pub fn toggle(&mut self) -> bool {
        if self.active {
            self.stop();
        } else {
            self.start();
        }
        self.active
    }

    pub fn frame(&mut self, metrics: ScrollMetrics, now: Instant) -> ScrollStep {
        if !self.active {
            return ScrollStep::Idle;
        }
        if self.is_paused(now) {
            return ScrollStep::Idle;
        }
        self.paused_until = None;

        if metrics.at_bottom() {
            debug!("Auto-scroll reached the bottom");
            self.stop();
            return ScrollStep::Finished;
        }

        self.own_scroll_pending = true;
        ScrollStep::Advance(metrics.scroll_top + STEP_PX)
    }

    /// Handles a scroll event. The first event after our own step is ours;
    /// anything else is the guest scrolling, which pauses the driver.
    pub fn on_scroll_event(&mut self, now: Instant) {
        if self.own_scroll_pending {
            self.own_scroll_pending = false;
            return;
        }
        if self.active {
            self.paused_until = Some(now + MANUAL_PAUSE);
        }
    }
}
