//! pfx-testkit
//!
//! In-memory fakes for the two seams of the scrape pipeline:
//! - [`RecordingSink`] stands in for the Prometheus sink;
//! - [`ScriptedPortfolioApi`] stands in for a remote broker client.
//!
//! Test-only. Production crates must list this under `[dev-dependencies]`.

mod api;
mod sink;

pub use api::{account, instrument, position, snapshot, ScriptedPortfolioApi};
pub use sink::{RecordedUpdate, RecordingSink};
