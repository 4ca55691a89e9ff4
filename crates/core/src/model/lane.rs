/// Identifier of an element on the kiosk page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A ticker lane as laid out on the page: the lane element (which owns the
/// scrolling window and track) and the element holding the lane's text.
///
/// The lane element id doubles as the lane's identity in the ticker engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LaneBinding {
    pub lane: ElementId,
    pub text: ElementId,
}

impl LaneBinding {
    pub fn new(lane: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            lane: ElementId::new(lane),
            text: ElementId::new(text),
        }
    }
}
