//! Scorecard aggregation and classification.
//!
//! This module folds scored records into group and indicator totals,
//! computes percentages, assigns the overall rank, and selects groups by
//! status, department or performance band.

pub mod aggregate;
pub mod filter;
pub mod pipeline;
pub mod rank;
pub mod types;
pub mod utility;
