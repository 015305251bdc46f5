//! Linked scatter / parallel-categories dashboard.
//!
//! A table is loaded once ([`data::loader`]), turned into two linked chart
//! descriptions ([`chart`]) and served per viewer ([`state::Session`]) over
//! HTTP ([`server`]) or in a desktop window ([`app`]). Interactions on
//! either chart replace the shared selection ([`selection`]).

pub mod app;
pub mod chart;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod selection;
pub mod server;
pub mod state;
pub mod ui;
