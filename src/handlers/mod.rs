//! HTTP handlers

pub mod health;
pub mod devices;
pub mod predict;
