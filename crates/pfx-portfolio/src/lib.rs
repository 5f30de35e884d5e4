//! pfx-portfolio
//!
//! Portfolio data model shared by every exporter crate:
//! - broker-native fixed-point numbers and their `f64` conversion;
//! - per-cycle entities (accounts, snapshots, positions, instruments);
//! - the [`PortfolioApi`] trait remote clients implement.
//!
//! No I/O happens in this crate.

pub mod provider;
pub mod quotation;
pub mod types;

pub use provider::{ApiError, PortfolioApi};
pub use quotation::{MoneyValue, Quotation, NANO_SCALE};
pub use types::{Account, InstrumentMeta, PortfolioSnapshot, Position};
