//! Zenith Payments - checkout and fulfilment for the Zenith meditation e-book
//!
//! Creates gateway orders, verifies checkout callback signatures, reconciles
//! gateway webhooks into idempotent payment records, and grants the buyer
//! access to the e-book download.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
