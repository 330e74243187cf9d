//! Row models.
//!
//! Each struct is a `FromRow` + `Serialize` mirror of one table. Write-side
//! inputs are the projections from `larkflow_core` (`InstanceHeader`,
//! `TaskRecord`, `FlattenedField`, `KvRow`).

pub mod approval;
