//! HTTP handlers

pub mod health;
pub mod transactions;
pub mod stats;
pub mod reputation;
pub mod nodes;
pub mod controls;
