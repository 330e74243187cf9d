//! Repository layer.
//!
//! Each repository is a zero-sized struct. Writes take `&mut PgConnection`
//! so one pooled connection can be held for a whole ingestion run; reads take
//! `&PgPool`.

pub mod approval_field_kv_repo;
pub mod approval_form_field_repo;
pub mod approval_instance_repo;
pub mod approval_raw_repo;
pub mod approval_task_repo;

pub use approval_field_kv_repo::ApprovalFieldKvRepo;
pub use approval_form_field_repo::ApprovalFormFieldRepo;
pub use approval_instance_repo::ApprovalInstanceRepo;
pub use approval_raw_repo::ApprovalRawRepo;
pub use approval_task_repo::ApprovalTaskRepo;
