//! Rendering context - what every shape can see while drawing

use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::{BubbleSizing, PointConfig};
use crate::types::DataPoint;

use super::defaults;
use super::transition::TransitionNamer;

/// Execution context bound to every shape call.
///
/// Holds the chart's point configuration and the session key that prefixes
/// synthetic definition ids.
#[derive(Debug, Clone)]
pub struct PointContext {
    config: PointConfig,
    session_key: String,
    namer: TransitionNamer,
}

/// A fresh session key derived from the current time, e.g. `pm-1760700000000`.
pub fn session_key() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("pm-{millis}")
}

impl PointContext {
    pub fn new(config: PointConfig, session_key: impl Into<String>) -> Self {
        Self {
            config,
            session_key: session_key.into(),
            namer: TransitionNamer,
        }
    }

    pub fn config(&self) -> &PointConfig {
        &self.config
    }

    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    pub fn is_bubble(&self) -> bool {
        self.config.bubble.is_some()
    }

    pub fn bubble(&self) -> Option<&BubbleSizing> {
        self.config.bubble.as_ref()
    }

    pub fn transition_name(&self) -> String {
        self.namer.next_name()
    }

    /// Id under which externally defined markup for `identity` lives.
    pub fn synthetic_id(&self, identity: &str) -> String {
        format!("{}-point-{}", self.session_key, identity)
    }

    /// Configured radius, ignoring visibility and bubble sizing.
    pub fn base_r(&self, d: &DataPoint) -> f64 {
        self.config.r.at(d)
    }

    /// Radius a point is drawn with.
    pub fn point_r(&self, d: &DataPoint) -> f64 {
        if !self.config.show {
            return 0.0;
        }
        match &self.config.bubble {
            Some(bubble) => bubble.radius(d.value.unwrap_or(0.0)),
            None => self.base_r(d),
        }
    }

    /// Radius of a focused (hovered) point.
    pub fn expanded_r(&self, d: &DataPoint) -> f64 {
        if !self.config.focus_expand {
            return self.point_r(d);
        }
        let ratio = if self.is_bubble() {
            defaults::BUBBLE_FOCUS_EXPAND_RATIO
        } else {
            defaults::FOCUS_EXPAND_RATIO
        };
        self.config
            .focus_expand_r
            .unwrap_or_else(|| self.point_r(d) * ratio)
    }

    /// Radius of a selected point.
    pub fn select_r(&self, d: &DataPoint) -> f64 {
        self.config
            .select_r
            .unwrap_or_else(|| self.point_r(d) * defaults::SELECT_RATIO)
    }

    /// Pointer distance within which `d` counts as hovered.
    pub fn hit_radius(&self, d: &DataPoint) -> f64 {
        self.config.sensitivity.max(self.point_r(d))
    }
}
