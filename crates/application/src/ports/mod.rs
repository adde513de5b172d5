//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the template core and the code that
//! embeds it. Filters and clocks are implemented by adapters in the
//! infrastructure layer or by the embedding application.

mod clock;
mod filter;

pub use clock::Clock;
pub use filter::{Filter, FilterKind, FilterRegistry, FilterRegistryBuilder};
