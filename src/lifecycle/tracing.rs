//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the process-wide subscriber. Every component logs through
//! `tracing` with structured fields, so a run reads as a sequence of kitchen events:
//!
//! ```text
//! INFO Started scheduler="arrivals"
//! INFO Processed order="Banana Split" shelf="frozen" expiration=1700000013
//! INFO Picked up order="Banana Split" shelf="frozen" value=14.2
//! INFO Spoiled order="Cobb Salad" shelf="overflow"
//! INFO Exhausted scheduler="arrivals" ticks=42
//! ```
//!
//! ## Levels
//!
//! - `info`: placements, pickups, waste, spoilage, scheduler start/stop
//! - `debug`: per-tick event counts, stale pickup candidates, scheduler re-arming
//! - `warn`: rejected order records, misuse such as starting a scheduler twice
//!
//! ```bash
//! RUST_LOG=info kitchen-sim --orders orders.json
//! RUST_LOG=kitchen_sim::kitchen=debug kitchen-sim --orders orders.json
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
