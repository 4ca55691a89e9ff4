//! The kiosk page as a self-contained HTML file.
//!
//! [`HtmlSurface`] keeps the markup of every region in memory, estimates text
//! layout from the configured box sizes and font metrics, and on every
//! `present` rewrites the output file with fitted font sizes and CSS marquee
//! animations baked in. A browser pointed at the file (with a meta refresh)
//! shows what a live page would show.

use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use signage_core::markup::{LINE_BREAK, escape_html, unescape_html};
use signage_core::{
    Animation, ElementId, FitBox, FitClass, FitTarget, Keyframes, LaneBinding, LaneMetrics, Page,
    Stage, Surface,
};
use signage_protocol::Size;

use crate::config::{BoxConfig, LayoutConfig};

const STATUS: &str = "status";
const FLEET: &str = "truckPanelBody";

const FIT_REGIONS: [(FitClass, &str); 4] = [
    (FitClass::Today, "today"),
    (FitClass::Tomorrow, "tomorrow"),
    (FitClass::Week, "week"),
    (FitClass::Month, "month"),
];

const LANES: [(&str, &str); 3] = [
    ("ticker-master", "ticker-master-text"),
    ("ticker-install", "ticker-install-text"),
    ("ticker-weather-top", "ticker-weather-top-text"),
];

/// Seconds between browser reloads of the snapshot file.
const META_REFRESH_SECS: u32 = 5;

fn is_element(id: &str) -> bool {
    id == STATUS
        || id == FLEET
        || FIT_REGIONS.iter().any(|(_, region)| *region == id)
        || LANES.iter().any(|(lane, text)| *lane == id || *text == id)
}

/// Marks a lane's animation as cancelled when dropped by the ticker engine.
#[derive(Debug)]
struct CssAnimation {
    live: Rc<Cell<bool>>,
}

impl Animation for CssAnimation {
    fn cancel(&mut self) {
        self.live.set(false);
    }
}

#[derive(Debug)]
struct LaneAnimation {
    keyframes: Keyframes,
    live: Rc<Cell<bool>>,
}

/// One fitted box, measured by character counts.
#[derive(Debug)]
struct EstimatedBox<'a> {
    lines: Vec<usize>,
    font_px: f64,
    visible: Size,
    layout: &'a LayoutConfig,
}

impl FitBox for EstimatedBox<'_> {
    fn set_font_size(&mut self, px: f64) {
        self.font_px = px;
    }

    fn content_size(&self) -> Size {
        let widest = self.lines.iter().copied().max().unwrap_or(0);
        Size::new(
            widest as f64 * self.layout.char_width_em * self.font_px,
            self.lines.len() as f64 * self.layout.line_height_em * self.font_px,
        )
    }

    fn visible_size(&self) -> Size {
        self.visible
    }
}

#[derive(Debug)]
pub struct HtmlSurface {
    layout: LayoutConfig,
    output: Option<PathBuf>,
    html: BTreeMap<String, String>,
    lane_text: BTreeMap<String, String>,
    fonts: HashMap<FitClass, Vec<f64>>,
    animations: BTreeMap<String, LaneAnimation>,
    animations_started: usize,
    presented: usize,
}

impl HtmlSurface {
    pub fn new(layout: LayoutConfig) -> Self {
        Self {
            layout,
            output: None,
            html: BTreeMap::new(),
            lane_text: BTreeMap::new(),
            fonts: HashMap::new(),
            animations: BTreeMap::new(),
            animations_started: 0,
            presented: 0,
        }
    }

    /// Write the document to `path` on every present.
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    pub fn html(&self, id: &str) -> Option<&str> {
        self.html.get(id).map(String::as_str)
    }

    pub fn lane_text(&self, text_id: &str) -> Option<&str> {
        self.lane_text.get(text_id).map(String::as_str)
    }

    /// Font sizes chosen by the last fit pass, one per box in document order.
    pub fn font_sizes(&self, class: FitClass) -> &[f64] {
        self.fonts.get(&class).map_or(&[], Vec::as_slice)
    }

    /// Lanes with an uncancelled animation.
    pub fn running_lanes(&self) -> Vec<&str> {
        self.animations
            .iter()
            .filter(|(_, a)| a.live.get())
            .map(|(lane, _)| lane.as_str())
            .collect()
    }

    pub fn keyframes(&self, lane: &str) -> Option<Keyframes> {
        self.animations
            .get(lane)
            .filter(|a| a.live.get())
            .map(|a| a.keyframes)
    }

    /// Lane animations started over the surface's lifetime.
    pub fn animations_started(&self) -> usize {
        self.animations_started
    }

    /// How many times the surface has been presented.
    pub fn presented(&self) -> usize {
        self.presented
    }

    fn box_size(&self, class: FitClass) -> BoxConfig {
        match class {
            FitClass::Today | FitClass::Tomorrow => self.layout.day_panel,
            FitClass::Week => self.layout.week_card,
            FitClass::Month => self.layout.month_cell,
        }
    }

    /// The whole page as one HTML document.
    pub fn render_document(&self) -> String {
        let mut doc = String::from(
            "<!doctype html>\n<html><head><meta charset=\"utf-8\">",
        );
        let _ = write!(
            doc,
            "<meta http-equiv=\"refresh\" content=\"{META_REFRESH_SECS}\"><title>Signage</title><style>"
        );
        doc.push_str(&self.render_style());
        doc.push_str("</style></head><body>\n");

        let _ = writeln!(
            doc,
            "<div id=\"{STATUS}\">{}</div>",
            self.html(STATUS).unwrap_or_default()
        );
        for (lane, text) in LANES {
            let _ = writeln!(
                doc,
                "<div id=\"{lane}\" class=\"ticker\"><div class=\"ticker-track\"><span id=\"{text}\">{}</span></div></div>",
                escape_html(self.lane_text(text).unwrap_or_default())
            );
        }
        for (class, region) in FIT_REGIONS {
            let html = self.html(region).unwrap_or_default();
            let _ = writeln!(
                doc,
                "<div id=\"{region}\" class=\"region\">{}</div>",
                with_font_sizes(html, class, self.font_sizes(class))
            );
        }
        let _ = writeln!(
            doc,
            "<div class=\"truck-panel\"><div id=\"{FLEET}\">{}</div></div>",
            self.html(FLEET).unwrap_or_default()
        );
        doc.push_str("</body></html>\n");
        doc
    }

    fn render_style(&self) -> String {
        let mut css = String::new();
        for (selector, size) in [
            (".panel-body", self.layout.day_panel),
            (".week-card", self.layout.week_card),
            (".month-cell", self.layout.month_cell),
        ] {
            let _ = write!(
                css,
                "{selector}{{width:{}px;height:{}px;overflow:hidden}}",
                size.width_px, size.height_px
            );
        }
        let _ = write!(
            css,
            ".ticker{{width:{}px;overflow:hidden;white-space:nowrap;font-size:{}px}}.ticker-track{{display:inline-block}}",
            self.layout.ticker_window_px, self.layout.ticker_font_px
        );
        for (lane, animation) in &self.animations {
            if !animation.live.get() {
                continue;
            }
            let Keyframes {
                from_px,
                to_px,
                duration,
            } = animation.keyframes;
            let _ = write!(
                css,
                "@keyframes marquee-{lane}{{from{{transform:translateX({from_px}px)}}to{{transform:translateX({to_px}px)}}}}#{lane} .ticker-track{{animation:marquee-{lane} {:.3}s linear infinite}}",
                duration.as_secs_f64()
            );
        }
        css
    }

    fn write_output(&self, path: &Path) -> std::io::Result<()> {
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, self.render_document())?;
        std::fs::rename(&tmp, path)
    }
}

/// A `class` attribute naming a fit box: where the attribute starts and the
/// byte just past its closing quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ClassAttr {
    start: usize,
    end: usize,
}

/// Every `class="..."` attribute in `html` whose tokens include `class`.
///
/// Text content is escaped, so a raw `class="` only ever opens an attribute.
fn box_attrs(html: &str, class: FitClass) -> Vec<ClassAttr> {
    const OPEN: &str = "class=\"";
    let wanted = class.css_class();
    let mut found = Vec::new();
    let mut from = 0;
    while let Some(offset) = html[from..].find(OPEN) {
        let start = from + offset;
        let value = start + OPEN.len();
        let Some(len) = html[value..].find('"') else {
            break;
        };
        let end = value + len + 1;
        if html[value..value + len]
            .split_ascii_whitespace()
            .any(|token| token == wanted)
        {
            found.push(ClassAttr { start, end });
        }
        from = end;
    }
    found
}

/// Character counts of the text lines inside each box.
fn box_lines(html: &str, class: FitClass) -> Vec<Vec<usize>> {
    let attrs = box_attrs(html, class);
    attrs
        .iter()
        .enumerate()
        .map(|(n, attr)| {
            let end = attrs.get(n + 1).map_or(html.len(), |next| next.start);
            let segment = &html[attr.end..end];
            let body = segment.find('>').map_or("", |gt| &segment[gt + 1..]);
            let plain = strip_tags(&body.replace(LINE_BREAK, "\n").replace("</div>", "\n"));
            unescape_html(&plain)
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(|line| line.chars().count())
                .collect()
        })
        .collect()
}

fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

/// Add an inline font size right after the class attribute of each box.
fn with_font_sizes(html: &str, class: FitClass, sizes: &[f64]) -> String {
    let mut out = String::with_capacity(html.len() + sizes.len() * 32);
    let mut rest = 0;
    for (attr, size) in box_attrs(html, class).into_iter().zip(sizes) {
        out.push_str(&html[rest..attr.end]);
        let _ = write!(out, " style=\"font-size:{size:.2}px\"");
        rest = attr.end;
    }
    out.push_str(&html[rest..]);
    out
}

impl Page for HtmlSurface {
    fn has_element(&self, id: &str) -> bool {
        is_element(id)
    }
}

impl Stage for HtmlSurface {
    fn set_lane_text(&mut self, lane: &LaneBinding, text: &str) {
        self.lane_text
            .insert(lane.text.as_str().to_string(), text.to_string());
    }

    fn measure_lane(&self, lane: &LaneBinding) -> Option<LaneMetrics> {
        if !is_element(lane.lane.as_str()) {
            return None;
        }
        let chars = self.lane_text(lane.text.as_str())?.chars().count();
        Some(LaneMetrics {
            window_px: self.layout.ticker_window_px,
            track_px: chars as f64 * self.layout.char_width_em * self.layout.ticker_font_px,
        })
    }

    fn animate_lane(
        &mut self,
        lane: &LaneBinding,
        keyframes: &Keyframes,
    ) -> Option<Box<dyn Animation>> {
        let live = Rc::new(Cell::new(true));
        self.animations_started += 1;
        self.animations.insert(
            lane.lane.as_str().to_string(),
            LaneAnimation {
                keyframes: *keyframes,
                live: Rc::clone(&live),
            },
        );
        Some(Box::new(CssAnimation { live }))
    }
}

impl FitTarget for HtmlSurface {
    fn for_each_fit_box(&mut self, class: FitClass, f: &mut dyn FnMut(&mut dyn FitBox)) {
        let Some((_, region)) = FIT_REGIONS.iter().find(|(c, _)| *c == class) else {
            return;
        };
        let lines = box_lines(self.html(region).unwrap_or_default(), class);
        let visible = {
            let b = self.box_size(class);
            Size::new(b.width_px, b.height_px)
        };
        let mut sizes = Vec::with_capacity(lines.len());
        for lines in lines {
            let mut b = EstimatedBox {
                lines,
                font_px: class.range().max_px,
                visible,
                layout: &self.layout,
            };
            f(&mut b);
            sizes.push(b.font_px);
        }
        self.fonts.insert(class, sizes);
    }
}

impl Surface for HtmlSurface {
    fn set_html(&mut self, id: &ElementId, html: &str) {
        if let Some((class, _)) = FIT_REGIONS.iter().find(|(_, r)| *r == id.as_str()) {
            self.fonts.remove(class);
        }
        self.html.insert(id.as_str().to_string(), html.to_string());
    }

    fn set_text(&mut self, id: &ElementId, text: &str) {
        self.set_html(id, &escape_html(text));
    }

    fn is_blank(&self, id: &ElementId) -> bool {
        self.html(id.as_str()).is_none_or(|html| html.trim().is_empty())
    }

    fn present(&mut self) {
        self.presented += 1;
        if let Some(path) = &self.output {
            match self.write_output(path) {
                Ok(()) => tracing::trace!(path = %path.display(), "snapshot written"),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to write snapshot"),
            }
        }
    }
}
