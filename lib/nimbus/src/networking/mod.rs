//! Networking service: VPCs, their subnets and the port-security extension.

pub mod portsecurity;
pub mod vpcs;
pub mod vpcsubnets;
