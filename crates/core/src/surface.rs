use crate::bindings::Page;
use crate::fit::FitTarget;
use crate::model::ElementId;
use crate::ticker::Stage;

/// Everything the dashboard needs from the page it draws on.
///
/// Implemented by a browser page through the wasm bridge and by the
/// kiosk's HTML snapshot.
pub trait Surface: Page + Stage + FitTarget {
    /// Replace an element's inner markup.
    fn set_html(&mut self, id: &ElementId, html: &str);

    /// Replace an element's content with plain text.
    fn set_text(&mut self, id: &ElementId, text: &str);

    /// Whether the element currently has no content.
    fn is_blank(&self, id: &ElementId) -> bool;

    /// Called once all pending work of a tick is applied.
    fn present(&mut self) {}
}
