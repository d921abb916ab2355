//! Time left until the wedding, recomputed from the clock every second.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use log::{debug, info};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const TICK: Duration = Duration::from_secs(1);

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CountdownBreakdown {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl CountdownBreakdown {
    pub fn from_millis(remaining: u64) -> Self {
        Self {
            days: remaining / MS_PER_DAY,
            hours: (remaining / MS_PER_HOUR) % 24,
            minutes: (remaining / MS_PER_MINUTE) % 60,
            seconds: (remaining / MS_PER_SECOND) % 60,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    Counting(CountdownBreakdown),
    Elapsed,
}

impl CountdownState {
    /// What the page shows. Elapsed reads as all zeroes.
    pub fn breakdown(&self) -> CountdownBreakdown {
        match self {
            CountdownState::Counting(breakdown) => *breakdown,
            CountdownState::Elapsed => CountdownBreakdown::default(),
        }
    }
}

pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Countdown {
    target: DateTime<Utc>,
}

impl Countdown {
    pub fn new<Tz: TimeZone>(target: DateTime<Tz>) -> Self {
        Self {
            target: target.with_timezone(&Utc),
        }
    }

    pub fn target(&self) -> DateTime<Utc> {
        self.target
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> CountdownState {
        let remaining = (self.target - now).num_milliseconds();
        if remaining <= 0 {
            CountdownState::Elapsed
        } else {
            CountdownState::Counting(CountdownBreakdown::from_millis(remaining as u64))
        }
    }

    /// Starts the ticking task. The receiver holds the latest breakdown; the
    /// task ends once the target passes or every receiver is dropped.
    pub fn spawn<C: Clock>(self, clock: C) -> (watch::Receiver<CountdownBreakdown>, JoinHandle<()>) {
        let initial = self.state_at(clock.now()).breakdown();
        let (tx, rx) = watch::channel(initial);
        let handle = tokio::spawn(self.run(clock, tx));
        (rx, handle)
    }

    async fn run<C: Clock>(self, clock: C, tx: watch::Sender<CountdownBreakdown>) {
        let mut interval = tokio::time::interval(TICK);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            match self.state_at(clock.now()) {
                CountdownState::Counting(breakdown) => {
                    if tx.send(breakdown).is_err() {
                        debug!("Countdown has no viewers left, stopping");
                        return;
                    }
                }
                CountdownState::Elapsed => {
                    tx.send_replace(CountdownBreakdown::default());
                    info!("Countdown reached {}", self.target);
                    return;
                }
            }
        }
    }
}
