//! Single test binary entry point.
//!
//! Structure:
//! - helpers: fixtures (CSV files, local servers)
//! - flow: load → session → interactions, end to end without sockets
//! - http: the dashboard served over a real socket

mod flow;
mod helpers;
mod http;
