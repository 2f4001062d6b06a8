//! Domain model for the Products domain

pub mod caption;
pub mod entities;
pub mod state;
