//! Matchmaking and group lifecycle engine for sietch.
//!
//! [`rules`] holds the pure decision functions (eligibility, derived group
//! state, rating window). [`services`] wires them to the stores.

pub mod rules;
pub mod services;

pub use rules::*;
pub use services::*;
