//! Financial evaluation pipeline for skilled nursing admission decisions.
//!
//! The crate converts structured clinical intake data into a case-mix
//! classification, a projected revenue and cost breakdown, and a 0-100
//! margin score with an Accept/Defer/Decline recommendation. Persistence,
//! document extraction, and presentation are external collaborators; the
//! pipeline itself is pure and synchronous.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
