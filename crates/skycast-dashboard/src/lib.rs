//! Location-driven weather dashboard core.
//!
//! Composes the coordinate provider, the weather client, and keyed
//! query caches into three coordinated queries, folding their statuses
//! into a single view state for the presentation layer.

pub mod keys;
pub mod orchestrator;
pub mod view;

pub use keys::{QueryKind, WeatherKey};
pub use orchestrator::WeatherOrchestrator;
pub use view::{fold_view, WeatherViewState, UNKNOWN_PLACE};
