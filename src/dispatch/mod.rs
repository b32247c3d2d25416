//! Recurring workloads that drive the kitchen: order arrivals and courier pickups,
//! each paced by a Poisson event count and run by a [`RecurringScheduler`].

pub mod courier_dispatcher;
pub mod generator;
pub mod order_dispatcher;
pub mod scheduler;

pub use courier_dispatcher::*;
pub use generator::*;
pub use order_dispatcher::*;
pub use scheduler::*;
