//! Query modules, one per concern.

pub mod tables;
