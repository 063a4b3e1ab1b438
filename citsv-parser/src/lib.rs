//! CITSV (Sorel-Varennes) bus feed customisation.
//!
//! Agency-specific rules layered on a GTFS conversion: canonical stop and
//! route IDs, display label cleanup, and per-route headsign merging.

pub mod config;
pub mod convert;
pub mod domain;
pub mod error;
pub mod feed;
pub mod headsign;
pub mod labels;
pub mod output;
pub mod service;
