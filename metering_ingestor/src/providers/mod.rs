//! Provider abstraction for consumption-data sources.
//!
//! This module defines the [`ConsumptionDataProvider`] trait, the unified
//! interface for fetching installation lists and consumption series from a
//! metering portal. The engine in the `consumption_sync` crate drives the
//! trait and never talks to a concrete portal directly.
//!
//! The trait is designed for async usage and supports dynamic dispatch
//! (`dyn ConsumptionDataProvider`) so hosts can select a backend at runtime.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use metering_ingestor::models::{
//!     installation::Installation,
//!     reading::ConsumptionData,
//!     request_params::ConsumptionRequestParams,
//! };
//! use metering_ingestor::providers::{ConsumptionDataProvider, ProviderError};
//!
//! struct MyPortal;
//!
//! #[async_trait]
//! impl ConsumptionDataProvider for MyPortal {
//!     async fn list_installations(&self) -> Result<Vec<Installation>, ProviderError> {
//!         Ok(vec![])
//!     }
//!
//!     async fn fetch_consumption(
//!         &self,
//!         _params: &ConsumptionRequestParams,
//!     ) -> Result<ConsumptionData, ProviderError> {
//!         Ok(ConsumptionData::default())
//!     }
//! }
//! ```

pub mod ekz_rest;
pub mod errors;

use async_trait::async_trait;

pub use errors::ProviderError;

use crate::models::{
    installation::Installation, reading::ConsumptionData, request_params::ConsumptionRequestParams,
};

/// Trait for fetching consumption data from a metering portal.
///
/// Implement this trait for each concrete portal backend. Requests are
/// independent and stateless from the caller's perspective; any session
/// handling lives inside the implementation.
#[async_trait]
pub trait ConsumptionDataProvider {
    /// Lists the installations visible to the authenticated account,
    /// including closed contracts.
    async fn list_installations(&self) -> Result<Vec<Installation>, ProviderError>;

    /// Fetches one window of consumption data.
    ///
    /// The returned window may be a subset of the requested one; callers must
    /// not assume full coverage.
    async fn fetch_consumption(
        &self,
        params: &ConsumptionRequestParams,
    ) -> Result<ConsumptionData, ProviderError>;
}
