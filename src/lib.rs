//! SupportSphere: a support-ticketing REST API. Customers file tickets,
//! staff triage them by status, priority and category, and conversations
//! happen in two-level comment threads with staff-only internal notes.

pub mod auth;
pub mod core;
pub mod email;
pub mod security;
pub mod tickets;
pub mod users;
