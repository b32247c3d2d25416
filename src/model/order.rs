use super::error::OrderError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Storage temperature an order requires.
///
/// Shelves declare the set of temperatures they accept; the kitchen only places an
/// order on a shelf whose set contains the order's temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Temperature {
    Hot,
    Cold,
    Frozen,
}

impl Temperature {
    /// Every temperature the kitchen knows about.
    pub const ALL: [Temperature; 3] = [Temperature::Hot, Temperature::Cold, Temperature::Frozen];
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Temperature::Hot => "hot",
            Temperature::Cold => "cold",
            Temperature::Frozen => "frozen",
        };
        f.write_str(name)
    }
}

/// State stamped on an order when a shelf accepts it.
#[derive(Debug, Clone, PartialEq)]
pub struct Processed {
    /// Name of the shelf holding the order.
    pub shelf: String,
    /// Process-unique id of that shelf; names need not be unique.
    pub shelf_id: u64,
    /// Absolute time (epoch seconds) at which the order's value reaches zero.
    pub expiration: u64,
    /// Absolute time (epoch seconds) at which the order was placed.
    pub placed_at: u64,
}

/// State stamped on an order when a courier takes it.
#[derive(Debug, Clone, PartialEq)]
pub struct PickedUp {
    /// Value of the order at the moment it left the shelf.
    pub value: f64,
}

/// A single order moving through the kitchen.
///
/// The intrinsic fields are fixed at construction. The two lifecycle stages are
/// write-once cells: [`Processed`] is set by the shelf that accepts the order and
/// [`PickedUp`] is set by the same shelf when a courier removes it. Once picked up,
/// the order is logically gone even if it still sits in the shelf's heap waiting to
/// be purged.
#[derive(Debug)]
pub struct Order {
    pub name: String,
    pub temperature: Temperature,
    /// Seconds the order stays sellable under no extra decay.
    pub shelf_life: u64,
    pub decay_rate: f64,
    /// Epoch seconds at which the order entered the system.
    pub created_at: u64,
    processed: OnceLock<Processed>,
    picked_up: OnceLock<PickedUp>,
}

impl Order {
    /// Creates a new order, validating its intrinsic properties.
    ///
    /// # Errors
    /// - [`OrderError::EmptyName`] if `name` is blank.
    /// - [`OrderError::InvalidShelfLife`] if `shelf_life` is zero.
    /// - [`OrderError::InvalidDecayRate`] if `decay_rate` is negative or not finite.
    pub fn new(
        name: impl Into<String>,
        temperature: Temperature,
        shelf_life: u64,
        decay_rate: f64,
        created_at: u64,
    ) -> Result<Self, OrderError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(OrderError::EmptyName);
        }
        if shelf_life == 0 {
            return Err(OrderError::InvalidShelfLife(name));
        }
        if !decay_rate.is_finite() || decay_rate < 0.0 {
            return Err(OrderError::InvalidDecayRate {
                order: name,
                rate: decay_rate,
            });
        }
        Ok(Self {
            name,
            temperature,
            shelf_life,
            decay_rate,
            created_at,
            processed: OnceLock::new(),
            picked_up: OnceLock::new(),
        })
    }

    /// Placement details, if a shelf has accepted this order.
    pub fn processed(&self) -> Option<&Processed> {
        self.processed.get()
    }

    /// Pickup details, if a courier has taken this order.
    pub fn picked_up(&self) -> Option<&PickedUp> {
        self.picked_up.get()
    }

    pub fn is_picked_up(&self) -> bool {
        self.picked_up.get().is_some()
    }

    /// Returns `true` iff the order sits on a shelf, has not been taken yet and has
    /// not expired at `now`.
    pub fn can_be_picked_up_at(&self, now: u64) -> bool {
        match self.processed.get() {
            Some(processed) => !self.is_picked_up() && now < processed.expiration,
            None => false,
        }
    }

    pub(crate) fn mark_processed(&self, processed: Processed) -> Result<(), Processed> {
        self.processed.set(processed)
    }

    pub(crate) fn mark_picked_up(&self, picked_up: PickedUp) -> Result<(), PickedUp> {
        self.picked_up.set(picked_up)
    }
}

/// One entry of an orders file.
///
/// ```json
/// { "name": "Banana Split", "temp": "frozen", "shelfLife": 20, "decayRate": 0.63 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    #[serde(alias = "id")]
    pub name: String,
    #[serde(alias = "temperature")]
    pub temp: Temperature,
    pub shelf_life: u64,
    pub decay_rate: f64,
}

impl OrderRecord {
    /// Converts the record into an [`Order`] created at `created_at`.
    pub fn into_order(self, created_at: u64) -> Result<Order, OrderError> {
        Order::new(self.name, self.temp, self.shelf_life, self.decay_rate, created_at)
    }

    /// Parses a JSON array of records.
    pub fn parse_list(json: &str) -> Result<Vec<OrderRecord>, OrderError> {
        Ok(serde_json::from_str(json)?)
    }
}
