//! # Kitchen Display
//!
//! The kitchen reports every placement, waste, pickup and spoilage as a
//! [`KitchenEvent`] together with a [`KitchenSnapshot`] of its shelves. What happens
//! with that pair is up to the [`KitchenDisplay`] implementation.
//!
//! [`ConsoleDisplay`] reproduces the classic console view:
//!
//! ```text
//! [hot 2] [cold 0] [frozen 1] [overflow 0] Pad See Ew is processed.
//! hot::Cheese Pizza:0.92,Pad See Ew:1.00,
//! cold::
//! frozen::Banana Split:0.71,
//! overflow::
//! ```

use serde::Serialize;
use std::fmt;
use std::io::Write;
use tracing::{info, warn};

/// Something that happened to an order inside the kitchen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum KitchenEvent {
    Processed { order: String, shelf: String },
    Wasted { order: String },
    PickedUp { order: String, shelf: String, value: f64 },
    Spoiled { order: String, shelf: String },
}

impl KitchenEvent {
    pub fn order(&self) -> &str {
        match self {
            KitchenEvent::Processed { order, .. }
            | KitchenEvent::Wasted { order }
            | KitchenEvent::PickedUp { order, .. }
            | KitchenEvent::Spoiled { order, .. } => order,
        }
    }
}

impl fmt::Display for KitchenEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KitchenEvent::Processed { order, .. } => write!(f, "{order} is processed."),
            KitchenEvent::Wasted { order } => write!(f, "{order} is wasted."),
            KitchenEvent::PickedUp { order, .. } => write!(f, "{order} is picked up."),
            KitchenEvent::Spoiled { order, .. } => write!(f, "{order} is spoiled."),
        }
    }
}

/// A live order and its normalized value (`value / shelf_life`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderValue {
    pub name: String,
    pub value: f64,
}

/// Point-in-time view of one shelf.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShelfSnapshot {
    pub name: String,
    pub count: usize,
    pub capacity: usize,
    pub orders: Vec<OrderValue>,
}

/// Point-in-time view of every shelf, in placement order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KitchenSnapshot {
    pub shelves: Vec<ShelfSnapshot>,
}

impl KitchenSnapshot {
    pub fn shelf(&self, name: &str) -> Option<&ShelfSnapshot> {
        self.shelves.iter().find(|s| s.name == name)
    }

    pub fn total_count(&self) -> usize {
        self.shelves.iter().map(|s| s.count).sum()
    }
}

/// Renders kitchen events.
///
/// Called synchronously from inside the kitchen, possibly while the kitchen-wide lock
/// is held. Implementations must not call back into the kitchen.
pub trait KitchenDisplay: Send + Sync {
    fn display(&self, event: &KitchenEvent, snapshot: &KitchenSnapshot);
}

/// Prints the shelf counts and contents to stdout after every event.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleDisplay {
    show_contents: bool,
}

impl ConsoleDisplay {
    pub fn new(show_contents: bool) -> Self {
        Self { show_contents }
    }

    /// Formats one event the way [`display`](KitchenDisplay::display) prints it.
    pub fn render(&self, event: &KitchenEvent, snapshot: &KitchenSnapshot) -> String {
        let mut out = String::new();
        for shelf in &snapshot.shelves {
            out.push_str(&format!("[{} {}] ", shelf.name, shelf.count));
        }
        out.push_str(&event.to_string());
        out.push('\n');

        if self.show_contents {
            for shelf in &snapshot.shelves {
                out.push_str(&shelf.name);
                out.push_str("::");
                for order in &shelf.orders {
                    out.push_str(&format!("{}:{:.2},", order.name, order.value));
                }
                out.push('\n');
            }
        }
        out
    }
}

impl Default for ConsoleDisplay {
    fn default() -> Self {
        Self::new(true)
    }
}

impl KitchenDisplay for ConsoleDisplay {
    fn display(&self, event: &KitchenEvent, snapshot: &KitchenSnapshot) {
        let rendered = self.render(event, snapshot);
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(rendered.as_bytes());
        let _ = stdout.flush();
    }
}

/// Sends events to the `tracing` pipeline instead of stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDisplay;

impl KitchenDisplay for TracingDisplay {
    fn display(&self, event: &KitchenEvent, snapshot: &KitchenSnapshot) {
        info!(total = snapshot.total_count(), "{event}");
    }
}

/// Writes one JSON object per event to stdout, for piping into other tools:
///
/// ```text
/// {"event":"picked_up","order":"Yogurt","shelf":"cold","value":241.6,"snapshot":{"shelves":[...]}}
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonDisplay;

#[derive(Serialize)]
struct JsonLine<'a> {
    #[serde(flatten)]
    event: &'a KitchenEvent,
    snapshot: &'a KitchenSnapshot,
}

impl JsonDisplay {
    pub fn render(
        &self,
        event: &KitchenEvent,
        snapshot: &KitchenSnapshot,
    ) -> Result<String, serde_json::Error> {
        serde_json::to_string(&JsonLine { event, snapshot })
    }
}

impl KitchenDisplay for JsonDisplay {
    fn display(&self, event: &KitchenEvent, snapshot: &KitchenSnapshot) {
        match self.render(event, snapshot) {
            Ok(line) => {
                let mut stdout = std::io::stdout().lock();
                let _ = writeln!(stdout, "{line}");
            }
            Err(e) => warn!(error = %e, order = event.order(), "Cannot encode event"),
        }
    }
}
