//! Reusable UI components built on top of shared session state.

pub mod loading_indicator;
pub mod route_guard;
pub mod session_notice;
