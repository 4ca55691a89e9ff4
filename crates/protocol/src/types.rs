use serde::{Deserialize, Serialize};

/// Width and height in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub w: f64,
    pub h: f64,
}

impl Size {
    pub fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }

    /// Whether `self` fits inside `outer` once `cushion` pixels of slack are
    /// allowed on each axis.
    pub fn within(&self, outer: Size, cushion: f64) -> bool {
        self.w <= outer.w + cushion && self.h <= outer.h + cushion
    }
}
