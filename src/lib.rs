//! Consensus Swipe - pass-the-device group decision engine.
//!
//! Participants take turns rating a shared pool of titles on one device.
//! The session ends the moment every participant has approved the same
//! title, or when every queue is exhausted without agreement.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
