//! Request models

pub mod controls;
pub mod transaction;

pub use controls::*;
pub use transaction::*;
