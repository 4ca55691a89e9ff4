use std::cmp::Ordering;

use signage_protocol::Truck;

use crate::markup::escape_html;

/// Badge colour for a truck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruckState {
    Green,
    Yellow,
    Red,
}

impl TruckState {
    /// Case-insensitive. Unknown states fall back to green styling.
    pub fn parse(state: &str) -> Self {
        match state.to_ascii_uppercase().as_str() {
            "RED" => Self::Red,
            "YELLOW" => Self::Yellow,
            _ => Self::Green,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Green => "truck-green",
            Self::Yellow => "truck-yellow",
            Self::Red => "truck-red",
        }
    }
}

/// Row shown when the feed has no trucks or was rejected.
pub fn render_no_trucks() -> String {
    placeholder_row("No active trucks", "—")
}

/// Row shown when the proxy could not be reached and nothing was rendered
/// before.
pub fn render_fleet_unreachable() -> String {
    placeholder_row("Truck status", "Proxy error")
}

fn placeholder_row(name: &str, reason: &str) -> String {
    format!(
        "<div class=\"truck-row\"><div class=\"truck-left\"><div class=\"truck-name\">{name}</div><div class=\"truck-reason\">{reason}</div></div><div class=\"truck-badge\">—</div></div>"
    )
}

fn display_name(truck: &Truck) -> &str {
    [truck.display_name.as_deref(), truck.truck_id.as_deref()]
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .unwrap_or("")
}

/// Trucks ordered by `sort_order` (missing last), then by display name.
pub fn sorted_trucks(trucks: &[Truck]) -> Vec<&Truck> {
    let mut sorted: Vec<&Truck> = trucks.iter().collect();
    sorted.sort_by(|a, b| {
        let by_order = match (a.sort_order, b.sort_order) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_order.then_with(|| display_name(a).cmp(display_name(b)))
    });
    sorted
}

/// Reason text for a non-green truck: the primary reason (or the first one
/// listed) followed by `  (+N more)` for the remaining reasons.
fn reason_text(truck: &Truck) -> String {
    let reason = truck
        .primary_reason
        .as_deref()
        .filter(|r| !r.is_empty())
        .or_else(|| truck.reasons.first().map(String::as_str))
        .unwrap_or("");
    let extra = truck
        .reasons
        .len()
        .saturating_sub(usize::from(!reason.is_empty()));
    if extra > 0 {
        format!("{reason}  (+{extra} more)")
    } else {
        reason.to_string()
    }
}

/// Rows for the truck panel. An empty list renders [`render_no_trucks`].
pub fn render_fleet(trucks: &[Truck]) -> String {
    if trucks.is_empty() {
        return render_no_trucks();
    }

    let mut html = String::new();
    for truck in sorted_trucks(trucks) {
        let name = match display_name(truck) {
            "" => "TRUCK",
            name => name,
        };
        let state_label = truck
            .state
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("GREEN")
            .to_uppercase();
        let reason = if state_label == "GREEN" {
            String::new()
        } else {
            reason_text(truck)
        };
        let reason = if reason.is_empty() {
            "Ready".to_string()
        } else {
            escape_html(&reason)
        };

        html.push_str(&format!(
            "<div class=\"truck-row\"><div class=\"truck-left\"><div class=\"truck-name\">{}</div><div class=\"truck-reason\">{reason}</div></div><div class=\"truck-badge {}\">{}</div></div>",
            escape_html(name),
            TruckState::parse(&state_label).css_class(),
            escape_html(&state_label),
        ));
    }
    html
}
