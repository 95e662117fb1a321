//! Compute service: servers, flavors and service status.

pub mod flavors;
pub mod servers;
pub mod services;
