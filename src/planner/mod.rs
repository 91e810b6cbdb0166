//! Conversion planning module
//!
//! Decides between stream copy and re-encoding, and picks the scaling filter
//! for re-encodes. Everything here is a pure function of its inputs and the
//! canonical resolution table, so it can be called from any number of
//! workers at once.

pub mod strategy;

pub use strategy::{plan, ConversionPlanner};
