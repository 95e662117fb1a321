//! Port security on VPCs.
//!
//! The extension adds `port_security_enabled` to VPC create and update
//! bodies, and to the VPCs the service returns.
//!
//! ```ignore
//! use nimbus::networking::{portsecurity, vpcs};
//!
//! let opts = portsecurity::vpc_create(
//!     vpcs::CreateOpts { name: "private".into(), ..Default::default() },
//!     portsecurity::PortSecurityOpts { port_security_enabled: Some(false) },
//! );
//! let vpc: portsecurity::WithPortSecurity<vpcs::Vpc> = vpcs::create_into(&network, &opts).await?;
//! ```

use serde::{Deserialize, Serialize};

use crate::{Extended, Options, ToBody};

/// The port-security attribute added to another resource's body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Options)]
pub struct PortSecurityOpts {
    /// Toggle port security; `None` leaves the body untouched.
    pub port_security_enabled: Option<bool>,
}

/// VPC create options with port security.
#[must_use]
pub fn vpc_create<B: ToBody>(base: B, extension: PortSecurityOpts) -> Extended<B, PortSecurityOpts> {
    Extended::new(base, "vpc", extension)
}

/// VPC update options with port security.
#[must_use]
pub fn vpc_update<B: ToBody>(base: B, extension: PortSecurityOpts) -> Extended<B, PortSecurityOpts> {
    Extended::new(base, "vpc", extension)
}

/// The port-security attribute of a returned resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSecurityExt {
    /// Whether port security is on.
    #[serde(default)]
    pub port_security_enabled: bool,
}

/// A resource decoded together with its port-security attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithPortSecurity<T> {
    /// The base resource.
    #[serde(flatten)]
    pub resource: T,
    /// The extension attribute.
    #[serde(flatten)]
    pub port_security: PortSecurityExt,
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use serde_json::json;

    use super::*;
    use crate::Error;
    use crate::networking::vpcs;

    #[test]
    fn create_adds_the_flag_under_vpc() {
        let opts = vpc_create(
            vpcs::CreateOpts {
                name: "private".to_string(),
                ..vpcs::CreateOpts::default()
            },
            PortSecurityOpts {
                port_security_enabled: Some(false),
            },
        );

        let body = opts.to_body().expect("body");

        check!(body.into_value() == json!({"vpc": {"name": "private", "port_security_enabled": false}}));
    }

    #[test]
    fn update_without_flag_is_the_base_body() {
        let base = vpcs::UpdateOpts {
            description: "edge".to_string(),
            ..vpcs::UpdateOpts::default()
        };

        let extended = vpc_update(base.clone(), PortSecurityOpts::default());

        check!(extended.to_body().expect("body") == base.to_body().expect("body"));
    }

    #[test]
    fn decodes_flattened_result() {
        let value = json!({"id": "v-1", "name": "private", "port_security_enabled": true});

        let_assert!(Ok(vpc) = crate::from_value::<WithPortSecurity<vpcs::Vpc>>(value, "vpc"));

        check!(vpc.resource.id == "v-1");
        check!(vpc.port_security.port_security_enabled);
        let_assert!(
            Err(Error::JsonDeserialization { .. }) =
                crate::from_value::<WithPortSecurity<vpcs::Vpc>>(json!({"port_security_enabled": "yes"}), "vpc")
        );
    }
}
