//! Domain model for task records.
//!
//! # Responsibility
//! - Define the persisted `Task` shape and the validated inputs that create
//!   or change it.
//!
//! # Invariants
//! - Every task is identified by a storage-assigned `TaskId`.
//! - Deletion is a hard delete; a deleted id never resolves again.

pub mod task;
