//! Domain logic for approval ingestion.
//!
//! Everything in this crate is pure: no I/O, no database, no HTTP. The
//! pipeline crate feeds fetched approval instances through these modules and
//! hands the results to storage.

pub mod callback;
pub mod error;
pub mod flatten;
pub mod form;
pub mod instance;
pub mod kv;
pub mod naming;
pub mod types;
pub mod value;
pub mod widget;
