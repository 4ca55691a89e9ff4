use signage_protocol::Size;

/// Slack allowed between content and box before content counts as
/// overflowing. Absorbs sub-pixel layout rounding.
pub const FIT_CUSHION_PX: f64 = 2.0;

/// The binary search stops once the interval is this narrow.
pub const FIT_CONVERGENCE_PX: f64 = 0.25;

/// Font-size bounds for one class of boxes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitRange {
    pub min_px: f64,
    pub max_px: f64,
}

impl FitRange {
    pub const fn new(min_px: f64, max_px: f64) -> Self {
        Self { min_px, max_px }
    }
}

/// Groups of fitted boxes, one per view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FitClass {
    Today,
    Tomorrow,
    Week,
    Month,
}

impl FitClass {
    pub const ALL: [FitClass; 4] = [
        FitClass::Today,
        FitClass::Tomorrow,
        FitClass::Week,
        FitClass::Month,
    ];

    /// Class attribute marking a box as belonging to this group.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Today => "fit-today",
            Self::Tomorrow => "fit-tomorrow",
            Self::Week => "fit-week",
            Self::Month => "fit-month",
        }
    }

    pub fn range(self) -> FitRange {
        match self {
            Self::Today | Self::Tomorrow => FitRange::new(8.0, 22.0),
            Self::Week => FitRange::new(7.0, 13.0),
            Self::Month => FitRange::new(6.0, 11.0),
        }
    }
}

/// A box whose text node's font size can be changed and whose layout can be
/// measured afterwards.
pub trait FitBox {
    fn set_font_size(&mut self, px: f64);
    /// Size the content needs (scroll size).
    fn content_size(&self) -> Size;
    /// Size the box shows (client size).
    fn visible_size(&self) -> Size;
}

/// Anything that can enumerate its fit boxes by class.
pub trait FitTarget {
    fn for_each_fit_box(&mut self, class: FitClass, f: &mut dyn FnMut(&mut dyn FitBox));
}

pub fn fits<B: FitBox + ?Sized>(b: &B) -> bool {
    b.content_size().within(b.visible_size(), FIT_CUSHION_PX)
}

/// Largest font size in `range` at which the box's content fits.
///
/// Tries `max_px` first. If that overflows, bisects until the interval is at
/// most [`FIT_CONVERGENCE_PX`] wide and settles on the lower (fitting) bound.
/// If even `min_px` overflows the box is left at `min_px`.
pub fn fit<B: FitBox + ?Sized>(b: &mut B, range: FitRange) -> f64 {
    b.set_font_size(range.max_px);
    if fits(b) {
        return range.max_px;
    }

    let mut lo = range.min_px;
    let mut hi = range.max_px;
    while hi - lo > FIT_CONVERGENCE_PX {
        let mid = (lo + hi) / 2.0;
        b.set_font_size(mid);
        if fits(b) {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    b.set_font_size(lo);
    lo
}

/// Fit every box of every class. Returns how many boxes were visited.
pub fn fit_pass<T: FitTarget + ?Sized>(target: &mut T) -> usize {
    let mut fitted = 0;
    for class in FitClass::ALL {
        let range = class.range();
        target.for_each_fit_box(class, &mut |b| {
            fit(b, range);
            fitted += 1;
        });
    }
    fitted
}

/// Collapses fit requests made before the next paint into a single pass.
#[derive(Debug, Default)]
pub struct FitQueue {
    queued: bool,
}

impl FitQueue {
    /// Ask for a pass at the next paint. Returns `false` if one was already
    /// pending.
    pub fn request(&mut self) -> bool {
        !std::mem::replace(&mut self.queued, true)
    }

    /// Consume the pending request, if any.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.queued)
    }

    pub fn is_queued(&self) -> bool {
        self.queued
    }
}
