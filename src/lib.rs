// src/lib.rs

//! pagewatch library
//!
//! Polls profile pages for watched screen names, extracts post records
//! from the markup, and forwards records not seen before to a delivery
//! sink. Hosts drive everything through [`watcher::Watcher`].

pub mod config;
pub mod delivery;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod watcher;

#[cfg(test)]
pub(crate) mod testutil;
