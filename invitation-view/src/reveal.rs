//! Scroll-reveal: marks page sections visible as they scroll into view.
//!
//! Geometry follows the browser's intersection rules. The root is the
//! viewport grown (or shrunk) by a CSS-like margin, and a section counts as
//! intersecting even when it only touches the root's edge.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::str::FromStr;
use std::time::Duration;

use log::{debug, warn};
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Delays after setup at which a missing section is looked up again.
pub const ATTACH_ATTEMPTS: [Duration; 3] = [
    Duration::from_millis(100),
    Duration::from_millis(300),
    Duration::from_millis(500),
];

#[derive(Error, Debug, PartialEq)]
pub enum RevealError {
    #[error("invalid root margin `{0}`")]
    InvalidMargin(String),

    #[error("threshold {0} is outside 0..=1")]
    InvalidThreshold(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f64),
    Percent(f64),
}

impl Length {
    fn resolve(&self, basis: f64) -> f64 {
        match self {
            Length::Px(px) => *px,
            Length::Percent(pct) => basis * pct / 100.0,
        }
    }
}

impl FromStr for Length {
    type Err = RevealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RevealError::InvalidMargin(s.to_string());
        if let Some(px) = s.strip_suffix("px") {
            px.parse().map(Length::Px).map_err(|_| invalid())
        } else if let Some(pct) = s.strip_suffix('%') {
            pct.parse().map(Length::Percent).map_err(|_| invalid())
        } else if s == "0" {
            Ok(Length::Px(0.0))
        } else {
            Err(invalid())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootMargin {
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
}

impl Default for RootMargin {
    fn default() -> Self {
        Self {
            top: Length::Px(0.0),
            right: Length::Px(0.0),
            bottom: Length::Px(0.0),
            left: Length::Px(0.0),
        }
    }
}

/// Accepts the CSS margin shorthand: one to four lengths in `px` or `%`.
impl FromStr for RootMargin {
    type Err = RevealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split_whitespace()
            .map(Length::from_str)
            .collect::<Result<Vec<_>, _>>()?;

        let (top, right, bottom, left) = match parts.as_slice() {
            [all] => (*all, *all, *all, *all),
            [vertical, horizontal] => (*vertical, *horizontal, *vertical, *horizontal),
            [top, horizontal, bottom] => (*top, *horizontal, *bottom, *horizontal),
            [top, right, bottom, left] => (*top, *right, *bottom, *left),
            _ => return Err(RevealError::InvalidMargin(s.to_string())),
        };
        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RevealOptions {
    pub threshold: f64,
    pub root_margin: RootMargin,
    pub trigger_once: bool,
    pub enabled: bool,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: RootMargin::default(),
            trigger_once: true,
            enabled: true,
        }
    }
}

/// A section's box in page coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// A viewport scrolled vertically only.
    pub fn at(scroll_y: f64, width: f64, height: f64) -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RevealEvent<K> {
    Revealed(K),
    Concealed(K),
}

/// Intersection of `target` with the margin-adjusted viewport. `None` when
/// they do not touch; otherwise the visible fraction of the target's area.
pub fn intersection_ratio(target: &Rect, viewport: &Viewport, margin: &RootMargin) -> Option<f64> {
    let root_left = viewport.scroll_x - margin.left.resolve(viewport.width);
    let root_top = viewport.scroll_y - margin.top.resolve(viewport.height);
    let root_right = viewport.scroll_x + viewport.width + margin.right.resolve(viewport.width);
    let root_bottom = viewport.scroll_y + viewport.height + margin.bottom.resolve(viewport.height);

    let left = target.x.max(root_left);
    let top = target.y.max(root_top);
    let right = (target.x + target.width).min(root_right);
    let bottom = (target.y + target.height).min(root_bottom);

    if right < left || bottom < top {
        return None;
    }

    let area = target.width * target.height;
    if area <= 0.0 {
        return Some(1.0);
    }
    Some(((right - left) * (bottom - top)) / area)
}

/// Observes registered sections and tracks which ones are revealed.
#[derive(Debug)]
pub struct ScrollReveal<K> {
    options: RevealOptions,
    observed: HashMap<K, Rect>,
    visible: HashSet<K>,
}

impl<K> ScrollReveal<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    pub fn new(options: RevealOptions) -> Result<Self, RevealError> {
        if !(0.0..=1.0).contains(&options.threshold) {
            return Err(RevealError::InvalidThreshold(options.threshold));
        }
        Ok(Self {
            options,
            observed: HashMap::new(),
            visible: HashSet::new(),
        })
    }

    pub fn options(&self) -> &RevealOptions {
        &self.options
    }

    /// Starts observing a section. Ignored while disabled.
    pub fn observe(&mut self, key: K, rect: Rect) -> bool {
        if !self.options.enabled {
            debug!("Scroll reveal disabled, not observing {:?}", key);
            return false;
        }
        self.observed.insert(key, rect);
        true
    }

    /// Updates the box of an observed section after a layout change.
    pub fn relayout(&mut self, key: &K, rect: Rect) {
        if let Some(current) = self.observed.get_mut(key) {
            *current = rect;
        }
    }

    pub fn unobserve(&mut self, key: &K) -> bool {
        self.observed.remove(key).is_some()
    }

    /// Releases every observation. Revealed sections stay revealed.
    pub fn disconnect(&mut self) {
        if !self.observed.is_empty() {
            debug!("Releasing {} scroll observations", self.observed.len());
        }
        self.observed.clear();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.options.enabled = enabled;
        if !enabled {
            self.disconnect();
        }
    }

    pub fn is_observed(&self, key: &K) -> bool {
        self.observed.contains_key(key)
    }

    pub fn is_visible(&self, key: &K) -> bool {
        self.visible.contains(key)
    }

    pub fn observed_count(&self) -> usize {
        self.observed.len()
    }

    /// Re-evaluates every observed section against the viewport and returns
    /// the transitions, in no particular order.
    pub fn on_viewport(&mut self, viewport: &Viewport) -> Vec<RevealEvent<K>> {
        let mut events = Vec::new();
        let mut finished = Vec::new();

        for (key, rect) in &self.observed {
            let ratio = intersection_ratio(rect, viewport, &self.options.root_margin);
            let shown = self.visible.contains(key);

            match ratio {
                Some(ratio) if ratio >= self.options.threshold => {
                    if !shown {
                        self.visible.insert(key.clone());
                        events.push(RevealEvent::Revealed(key.clone()));
                    }
                    if self.options.trigger_once {
                        finished.push(key.clone());
                    }
                }
                None if shown && !self.options.trigger_once => {
                    self.visible.remove(key);
                    events.push(RevealEvent::Concealed(key.clone()));
                }
                _ => {}
            }
        }

        for key in finished {
            self.observed.remove(&key);
        }
        events
    }
}

/// Looks a section up at each delay in `attempts` (measured from the call)
/// until it exists. Gives up after the last attempt or once `cancel` fires.
pub async fn wait_for_target<T, F>(
    mut lookup: F,
    attempts: &[Duration],
    cancel: &CancellationToken,
) -> Option<T>
where
    F: FnMut() -> Option<T>,
{
    let start = Instant::now();
    for delay in attempts {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Section lookup cancelled");
                return None;
            }
            _ = tokio::time::sleep_until(start + *delay) => {}
        }
        if let Some(target) = lookup() {
            return Some(target);
        }
    }
    warn!("Section never appeared after {} attempts", attempts.len());
    None
}
