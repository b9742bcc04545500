//! Networking modules for the dashboard's HTTP API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` attaches session credentials to outgoing requests and feeds request
//! outcomes back into the session services (loading, activity, expiry).

pub mod api;
