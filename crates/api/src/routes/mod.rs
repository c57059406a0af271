//! Route handlers

pub mod analysis;
pub mod android;
pub mod sensors;
