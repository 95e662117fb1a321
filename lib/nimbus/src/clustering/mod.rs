//! Clustering service.

pub mod actions;
