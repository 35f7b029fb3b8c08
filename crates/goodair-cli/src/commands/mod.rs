//! Command implementations.

pub mod clear;
pub mod current;
pub mod emissions;
pub mod forecast;
pub mod history;
pub mod routes;
pub mod set;
pub mod traffic;
pub mod watch;
pub mod weather;
