//! Page state as a reducer: `update` takes the state and an action and hands
//! back the next state plus the side effects the host should perform.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use log::{info, warn};
use wedding_shared::models::{wish_id_at, NewWish, Wish, WishStatus};

use crate::autoscroll::{AutoScroll, ScrollMetrics, ScrollStep};
use crate::content::guest_name_from_query;
use crate::countdown::CountdownBreakdown;

/// Delay between opening the cover and starting music and auto-scroll.
pub const PLAYBACK_DELAY: Duration = Duration::from_millis(500);

/// How long a freshly sent wish stays highlighted.
pub const HIGHLIGHT_DURATION: Duration = Duration::from_secs(3);

pub const SUBMIT_FAILED_ALERT: &str = "Failed to send your wish. Please try again.";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WishForm {
    pub name: String,
    pub message: String,
    pub status: WishStatus,
}

impl WishForm {
    /// The submission for this form, if name and message are filled in.
    pub fn to_new_wish(&self, at: DateTime<Utc>) -> Option<NewWish> {
        if self.name.trim().is_empty() || self.message.trim().is_empty() {
            return None;
        }
        Some(NewWish {
            name: self.name.clone(),
            message: self.message.clone(),
            status: self.status,
            timestamp: at,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub opened: bool,
    pub guest_name: Option<String>,
    pub playing: bool,
    pub auto_scroll: AutoScroll,
    pub form: WishForm,
    pub wishes: Vec<Wish>,
    pub loading_wishes: bool,
    pub submitting: bool,
    pub highlighted: Option<String>,
    pub countdown: CountdownBreakdown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The page loaded; `query` is the location's query string.
    Loaded { query: String },
    Open,
    StartPlayback,
    ToggleAudio,
    AudioFailed,
    SetName(String),
    SetMessage(String),
    SetStatus(WishStatus),
    Submit { at: DateTime<Utc> },
    SubmitSucceeded(NewWish),
    SubmitFailed(String),
    WishesLoaded(Vec<Wish>),
    WishesFailed(String),
    HighlightExpired(String),
    Tick(CountdownBreakdown),
    ToggleAutoScroll,
    ScrollFrame { metrics: ScrollMetrics, at: Instant },
    ScrollEvent { at: Instant },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    PlayAudio,
    PauseAudio,
    FetchWishes,
    SubmitWish(NewWish),
    ScrollTo(f64),
    /// Dispatch `action` after `delay`.
    Schedule { delay: Duration, action: Box<Action> },
    Alert(String),
}

pub fn update(mut state: ViewState, action: Action) -> (ViewState, Vec<Effect>) {
    let mut effects = Vec::new();

    match action {
        Action::Loaded { query } => {
            state.guest_name = guest_name_from_query(&query);
            state.loading_wishes = true;
            effects.push(Effect::FetchWishes);
        }
        Action::Open => {
            if !state.opened {
                state.opened = true;
                effects.push(Effect::Schedule {
                    delay: PLAYBACK_DELAY,
                    action: Box::new(Action::StartPlayback),
                });
            }
        }
        Action::StartPlayback => {
            state.playing = true;
            state.auto_scroll.start();
            effects.push(Effect::PlayAudio);
        }
        Action::ToggleAudio => {
            if state.opened {
                state.playing = !state.playing;
                effects.push(if state.playing {
                    Effect::PlayAudio
                } else {
                    Effect::PauseAudio
                });
            }
        }
        Action::AudioFailed => {
            warn!("Audio failed to load or play");
            state.playing = false;
        }
        Action::SetName(name) => state.form.name = name,
        Action::SetMessage(message) => state.form.message = message,
        Action::SetStatus(status) => state.form.status = status,
        Action::Submit { at } => {
            if !state.submitting {
                if let Some(wish) = state.form.to_new_wish(at) {
                    state.submitting = true;
                    effects.push(Effect::SubmitWish(wish));
                }
            }
        }
        Action::SubmitSucceeded(new_wish) => {
            let id = wish_id_at(new_wish.timestamp);
            info!("Wish from {} sent", new_wish.name);
            state.submitting = false;
            state.wishes.insert(0, new_wish.into_wish(id.clone()));
            state.form.name.clear();
            state.form.message.clear();
            state.highlighted = Some(id.clone());
            effects.push(Effect::Schedule {
                delay: HIGHLIGHT_DURATION,
                action: Box::new(Action::HighlightExpired(id)),
            });
        }
        Action::SubmitFailed(reason) => {
            warn!("Wish submission failed: {}", reason);
            state.submitting = false;
            effects.push(Effect::Alert(SUBMIT_FAILED_ALERT.to_string()));
        }
        Action::WishesLoaded(wishes) => {
            state.loading_wishes = false;
            state.wishes = wishes;
        }
        Action::WishesFailed(reason) => {
            warn!("Could not load wishes: {}", reason);
            state.loading_wishes = false;
        }
        Action::HighlightExpired(id) => {
            if state.highlighted.as_deref() == Some(id.as_str()) {
                state.highlighted = None;
            }
        }
        Action::Tick(breakdown) => state.countdown = breakdown,
        Action::ToggleAutoScroll => {
            state.auto_scroll.toggle();
        }
        Action::ScrollFrame { metrics, at } => {
            if let ScrollStep::Advance(top) = state.auto_scroll.frame(metrics, at) {
                effects.push(Effect::ScrollTo(top));
            }
        }
        Action::ScrollEvent { at } => state.auto_scroll.on_scroll_event(at),
    }

    (state, effects)
}
