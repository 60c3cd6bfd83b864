//! Route modules.

pub mod refresh;
