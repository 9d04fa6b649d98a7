//! Pan/zoom gestures and the policy deciding which of them reach the route

use crate::model::{Defaults, ViewTransform};

/// One frame of user pan/zoom input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Drag by a screen-space delta
    Pan { dx: f64, dy: f64 },
    /// Scale by `factor` keeping the screen point (`cx`, `cy`) fixed
    Zoom { factor: f64, cx: f64, cy: f64 },
}

impl Gesture {
    /// Transform after this gesture; the zoom factor is clamped to the
    /// configured scale range
    pub fn apply(&self, t: ViewTransform, defaults: &Defaults) -> ViewTransform {
        match *self {
            Gesture::Pan { dx, dy } => ViewTransform::new(t.x + dx, t.y + dy, t.k),
            Gesture::Zoom { factor, cx, cy } => {
                let k = defaults.clamp_scale(t.k * factor);
                let ratio = k / t.k;
                ViewTransform::new(cx - (cx - t.x) * ratio, cy - (cy - t.y) * ratio, k)
            }
        }
    }
}

/// Which kind of pointer input the scene currently accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    /// Pan/zoom reach the backdrop
    #[default]
    Gesture,
    /// The dialog text has focus; pan/zoom are filtered out
    TextEdit,
}

/// Suppresses transform updates smaller than `epsilon` on every axis
#[derive(Debug, Clone)]
pub struct TransformThreshold {
    epsilon: f64,
    last: Option<ViewTransform>,
}

impl TransformThreshold {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon, last: None }
    }

    /// Take `t` as the reference without forwarding it
    pub fn reset(&mut self, t: ViewTransform) {
        self.last = Some(t);
    }

    /// Returns true, and makes `t` the new reference, when `t` moved enough
    pub fn admit(&mut self, t: ViewTransform) -> bool {
        let moved = self
            .last
            .map(|last| t.differs_from(&last, self.epsilon))
            .unwrap_or(true);
        if moved {
            self.last = Some(t);
        }
        moved
    }
}
