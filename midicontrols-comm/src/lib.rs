//! Sync contract between widget models and a rendering host.
//!
//! The host (a notebook frontend, a test harness) sees each widget as a flat
//! JSON state tagged with the frontend module that renders it. This crate
//! defines the messages and keeps both sides consistent; it does not open
//! any channel itself.

pub mod protocol;
pub mod session;
pub mod state;

pub use protocol::{HostMessage, KernelMessage, ModuleInfo, WidgetState};
pub use session::CommSession;
pub use state::{StateError, MODEL_REF_PREFIX};
