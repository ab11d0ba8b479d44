//! Runtime collaborators and drivers.
//!
//! - `notify`: user-facing notices and the tracing-backed notifier
//! - `memory`: in-process backend implementing every backend trait
//! - `headless`: page surface and router without a browser
//! - `replay`: JSON-lines driver used by the binary

pub mod headless;
pub mod memory;
pub mod notify;
pub mod replay;
