//! HTTP handlers for the Products domain

pub mod products;
pub mod publish;
