//! Scrolling marquee lanes.
//!
//! Each lane is either idle or running exactly one looping animation. The
//! engine keeps the text it was last given per lane and only restarts the
//! animation when that text changes, so a poll that returns the same ticker
//! does not make the lane jump back to the start.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::model::{ElementId, LaneBinding};

/// Joins repeated copies of the ticker text.
pub const MARQUEE_SEPARATOR: &str = " • ";

/// Short texts are repeated until they are at least this many characters, so
/// the lane never shows a lone word drifting across an empty window.
pub const MIN_MARQUEE_CHARS: usize = 80;

pub const SCROLL_PX_PER_SEC: f64 = 90.0;

pub const MIN_LOOP_DURATION: Duration = Duration::from_secs(8);

/// Measured widths of a lane after its text was set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneMetrics {
    /// Visible width of the lane's window.
    pub window_px: f64,
    /// Full width of the scrolling track.
    pub track_px: f64,
}

/// A linear, infinitely repeating horizontal translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframes {
    pub from_px: f64,
    pub to_px: f64,
    pub duration: Duration,
}

/// A running animation that can be cancelled.
pub trait Animation {
    fn cancel(&mut self);
}

/// Owns a running animation and cancels it when dropped.
pub struct AnimationGuard(Box<dyn Animation>);

impl AnimationGuard {
    pub fn new(animation: Box<dyn Animation>) -> Self {
        Self(animation)
    }
}

impl Drop for AnimationGuard {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

impl std::fmt::Debug for AnimationGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AnimationGuard(..)")
    }
}

/// The part of the page the ticker engine drives.
pub trait Stage {
    /// Replace the plain text of the lane's text element.
    fn set_lane_text(&mut self, lane: &LaneBinding, text: &str);

    /// Measure the lane as laid out with its current text. `None` when the
    /// lane has no window or track to measure.
    fn measure_lane(&self, lane: &LaneBinding) -> Option<LaneMetrics>;

    /// Start animating the lane's track. `None` when the host cannot
    /// animate.
    fn animate_lane(
        &mut self,
        lane: &LaneBinding,
        keyframes: &Keyframes,
    ) -> Option<Box<dyn Animation>>;
}

/// Pad `text` with copies of itself until it reaches
/// [`MIN_MARQUEE_CHARS`], then double it so the loop seam is invisible.
pub fn marquee_text(text: &str) -> String {
    let mut padded = text.to_string();
    while padded.chars().count() < MIN_MARQUEE_CHARS {
        padded.push_str(MARQUEE_SEPARATOR);
        padded.push_str(text);
    }
    format!("{padded}{MARQUEE_SEPARATOR}{padded}")
}

/// Keyframes scrolling the track from just right of the window until it has
/// fully left on the left. `None` if either width is zero.
pub fn marquee_keyframes(metrics: LaneMetrics) -> Option<Keyframes> {
    let LaneMetrics {
        window_px,
        track_px,
    } = metrics;
    if !(window_px > 0.0 && track_px > 0.0 && window_px.is_finite() && track_px.is_finite()) {
        return None;
    }
    let travel_ms = ((track_px + window_px) / SCROLL_PX_PER_SEC * 1000.0).round();
    let duration = Duration::from_millis(travel_ms as u64).max(MIN_LOOP_DURATION);
    Some(Keyframes {
        from_px: window_px,
        to_px: -track_px,
        duration,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LaneContent {
    Empty,
    Text(String),
    Error(String),
}

#[derive(Debug)]
struct TickerLane {
    binding: LaneBinding,
    content: LaneContent,
    animation: Option<AnimationGuard>,
}

impl TickerLane {
    fn new(binding: LaneBinding) -> Self {
        Self {
            binding,
            content: LaneContent::Empty,
            animation: None,
        }
    }

    fn is_running(&self) -> bool {
        self.animation.is_some()
    }

    fn stop(&mut self) {
        self.animation = None;
    }

    fn start<S: Stage + ?Sized>(&mut self, stage: &mut S) {
        self.stop();
        let LaneContent::Text(text) = &self.content else {
            return;
        };

        let raw = text.trim();
        if raw.is_empty() {
            stage.set_lane_text(&self.binding, text);
            return;
        }

        stage.set_lane_text(&self.binding, &marquee_text(raw));
        let Some(keyframes) = stage
            .measure_lane(&self.binding)
            .and_then(marquee_keyframes)
        else {
            tracing::debug!(lane = %self.binding.lane, "lane not measurable, leaving idle");
            return;
        };

        self.animation = stage
            .animate_lane(&self.binding, &keyframes)
            .map(AnimationGuard::new);
        tracing::trace!(
            lane = %self.binding.lane,
            duration_ms = keyframes.duration.as_millis() as u64,
            "ticker started"
        );
    }
}

/// All ticker lanes on the page, keyed by lane element id.
#[derive(Debug, Default)]
pub struct TickerEngine {
    lanes: BTreeMap<ElementId, TickerLane>,
}

impl TickerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn lane_mut(&mut self, binding: &LaneBinding) -> &mut TickerLane {
        self.lanes
            .entry(binding.lane.clone())
            .or_insert_with(|| TickerLane::new(binding.clone()))
    }

    /// Show `text` on the lane.
    ///
    /// New text replaces the content and restarts the animation. The same
    /// text again leaves a running animation alone and only starts one if the
    /// lane is idle. Returns whether the lane was (re)started.
    pub fn set_text<S: Stage + ?Sized>(
        &mut self,
        stage: &mut S,
        binding: &LaneBinding,
        text: &str,
    ) -> bool {
        let lane = self.lane_mut(binding);
        let unchanged = matches!(&lane.content, LaneContent::Text(current) if current == text);
        if unchanged && lane.is_running() {
            return false;
        }
        if !unchanged {
            lane.content = LaneContent::Text(text.to_string());
        }
        lane.start(stage);
        true
    }

    /// Restart the lane from its current text. Lanes showing an error or
    /// never given text stay idle.
    pub fn start<S: Stage + ?Sized>(&mut self, stage: &mut S, lane: &ElementId) {
        if let Some(lane) = self.lanes.get_mut(lane) {
            lane.start(stage);
        }
    }

    /// Cancel the lane's animation. Stopping an idle lane does nothing.
    pub fn stop(&mut self, lane: &ElementId) {
        if let Some(lane) = self.lanes.get_mut(lane) {
            lane.stop();
        }
    }

    /// Put an error message on the lane and stop it.
    pub fn show_error<S: Stage + ?Sized>(
        &mut self,
        stage: &mut S,
        binding: &LaneBinding,
        message: &str,
    ) {
        let lane = self.lane_mut(binding);
        lane.stop();
        lane.content = LaneContent::Error(message.to_string());
        stage.set_lane_text(binding, message);
    }

    /// Stop and restart every lane that is showing text, e.g. after the
    /// window was resized and the old measurements are stale.
    pub fn restart_all<S: Stage + ?Sized>(&mut self, stage: &mut S) {
        for lane in self.lanes.values_mut() {
            if matches!(lane.content, LaneContent::Text(_)) {
                lane.start(stage);
            }
        }
    }

    /// Forget every lane, cancelling all animations.
    pub fn clear(&mut self) {
        self.lanes.clear();
    }

    pub fn is_running(&self, lane: &ElementId) -> bool {
        self.lanes.get(lane).is_some_and(TickerLane::is_running)
    }

    pub fn active_animations(&self) -> usize {
        self.lanes.values().filter(|l| l.is_running()).count()
    }

    /// The text last given to the lane, if it is showing text.
    pub fn last_text(&self, lane: &ElementId) -> Option<&str> {
        match &self.lanes.get(lane)?.content {
            LaneContent::Text(text) => Some(text),
            LaneContent::Empty | LaneContent::Error(_) => None,
        }
    }

    /// The error the lane is showing, if any.
    pub fn error(&self, lane: &ElementId) -> Option<&str> {
        match &self.lanes.get(lane)?.content {
            LaneContent::Error(message) => Some(message),
            LaneContent::Empty | LaneContent::Text(_) => None,
        }
    }
}
