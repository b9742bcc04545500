//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! State is split by concern (`auth`, `ui`) so components depend on small
//! focused models that are cheap to clone into signals.

pub mod auth;
pub mod ui;
