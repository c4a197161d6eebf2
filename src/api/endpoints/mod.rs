//! API endpoint handlers, one module per feature.

pub mod chat;
pub mod health;
pub mod hospitals;
pub mod predict;
pub mod translate;
