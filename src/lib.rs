#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Kitchen Simulator
//!
//! > **A concurrent order-fulfillment kitchen, driven by Poisson arrivals.**
//!
//! Orders arrive at random, get placed on temperature-appropriate shelves, decay while
//! they wait, and are collected by couriers who always take the order closest to
//! spoiling. Everything shares one [`Kitchen`](kitchen::Kitchen) behind an `Arc`.
//!
//! ## Design
//!
//! ### Shelves
//! Each [`Shelf`](kitchen::Shelf) keeps its orders in a min-heap by expiration time.
//! Spoiled orders are purged lazily whenever the shelf is touched, and picked-up orders
//! stay in the heap as tombstones counted separately, so removal never has to search.
//!
//! ### Locking
//! A kitchen-wide mutex is always taken before any shelf mutex. No lock is held across
//! an `.await`; couriers wait on a [`Notify`](tokio::sync::Notify) instead.
//!
//! ### Time and value
//! [`Clock`](kitchen::Clock) and [`Evaluator`](kitchen::Evaluator) are injected, so
//! tests run against a [`ManualClock`](mock::ManualClock) and scripted expirations.
//!
//! ### Observability
//! Every placement, pickup, waste and spoilage is logged with `tracing` and shown on a
//! [`KitchenDisplay`](display::KitchenDisplay). See [`lifecycle::tracing`].
//!
//! ## Module Tour
//!
//! - [`model`]: [`Order`](model::Order) and its write-once lifecycle, plus JSON records
//! - [`kitchen`]: shelves, the kitchen, evaluators and clocks
//! - [`dispatch`]: the [`RecurringScheduler`](dispatch::RecurringScheduler) and the
//!   arrival and courier workloads it runs
//! - [`display`]: typed [`KitchenEvent`](display::KitchenEvent)s and renderers
//! - [`lifecycle`]: configuration, tracing setup and the
//!   [`KitchenSystem`](lifecycle::KitchenSystem) orchestrator
//! - [`mock`]: deterministic test doubles
//!
//! ## Running
//!
//! ```bash
//! RUST_LOG=info cargo run -- --orders demos/orders.json
//! ```

pub mod dispatch;
pub mod display;
pub mod kitchen;
pub mod lifecycle;
pub mod mock;
pub mod model;
