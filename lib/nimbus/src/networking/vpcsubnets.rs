//! Subnets of a VPC.
//!
//! Subnets live under their VPC: `vpcs/{vpc_id}/subnets.json`.

use serde::{Deserialize, Serialize};

use crate::{
    HttpClientExt, Options, Pager, RequestOptions, Result, ServiceClient, Strategy, ToBody,
    ToQuery, single_match,
};

/// Filters for [`list`].
#[derive(Debug, Clone, Default, Options)]
pub struct ListOpts {
    /// Only subnets with this name.
    #[opts(query)]
    pub name: String,
    /// Only subnets with this address range.
    #[opts(query)]
    pub cidr: String,
    /// Restrict the attributes returned for each subnet.
    #[opts(query)]
    pub fields: Vec<String>,
    /// Page size.
    #[opts(query)]
    pub limit: u32,
    /// Id of the last subnet of the previous page.
    #[opts(query)]
    pub marker: String,
}

/// Attributes of a new subnet.
#[derive(Debug, Clone, Default, Options)]
#[opts(root = "subnet")]
pub struct CreateOpts {
    /// Address range, e.g. `10.0.1.0/24`. Left out when empty.
    pub cidr: String,
    /// Display name.
    pub name: String,
    /// Gateway address.
    ///
    /// `None` lets the service pick a default gateway, `Some("")` creates the
    /// subnet without one (sent as `null`), any other value is the gateway.
    pub gateway_ip: Option<String>,
    /// 4 or 6.
    pub ip_version: u16,
    /// Nameservers handed out over DHCP.
    pub dns_nameservers: Vec<String>,
    /// Mark the subnet as VPC-scoped.
    pub vpc: Option<bool>,
}

/// A subnet as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Subnet {
    /// Unique id.
    pub id: String,
    /// Display name; not unique.
    pub name: String,
    /// Address range.
    pub cidr: String,
    /// Gateway address, `None` when the subnet has no gateway.
    pub gateway_ip: Option<String>,
    /// 4 or 6.
    pub ip_version: u16,
    /// Nameservers handed out over DHCP.
    pub dns_nameservers: Vec<String>,
    /// Network the subnet belongs to.
    pub network_id: String,
    /// Owner project.
    pub tenant_id: String,
}

fn collection_url<C: ServiceClient>(client: &C, vpc_id: &str) -> Result<url::Url> {
    client.service_url(&["vpcs", vpc_id, "subnets.json"])
}

/// Lists the subnets of `vpc_id`, following `subnets_links`.
///
/// # Errors
///
/// Returns an error if `opts` does not build or the endpoint has no path.
pub fn list<C: ServiceClient>(client: &C, vpc_id: &str, opts: &impl ToQuery) -> Result<Pager<C>> {
    let url = opts.to_query()?.with_url(&collection_url(client, vpc_id)?);
    Ok(Pager::new(
        client.clone(),
        url,
        "subnets",
        Strategy::linked("subnets_links"),
    ))
}

/// Create a subnet in `vpc_id`.
///
/// # Errors
///
/// Returns the body build error, or the transport, status or decode error.
pub async fn create<C: ServiceClient>(client: &C, vpc_id: &str, opts: &impl ToBody) -> Result<Subnet> {
    let body = opts.to_body()?;
    let url = collection_url(client, vpc_id)?;
    client
        .post(&url, &body, &RequestOptions::new())
        .await?
        .json_at("subnet")
}

/// Delete a subnet.
///
/// # Errors
///
/// Returns the transport or status error.
pub async fn delete<C: ServiceClient>(client: &C, vpc_id: &str, subnet_id: &str) -> Result<()> {
    let url = client.service_url(&["vpcs", vpc_id, "subnets", subnet_id])?;
    client.delete(&url, &RequestOptions::new()).await?;
    Ok(())
}

/// The id of the only subnet of `vpc_id` called `name`.
///
/// # Errors
///
/// Returns a lookup error unless exactly one subnet matches, or the
/// traversal error.
pub async fn id_from_name<C: ServiceClient>(client: &C, vpc_id: &str, name: &str) -> Result<String> {
    let ids: Vec<String> = list(client, vpc_id, &ListOpts::default())?
        .all_items::<Subnet>()
        .await?
        .into_iter()
        .filter(|subnet| subnet.name == name)
        .map(|subnet| subnet.id)
        .collect();
    single_match("subnet", name, &ids)
}

#[cfg(test)]
mod tests {
    use assert2::check;
    use serde_json::json;

    use super::*;

    fn opts(gateway_ip: Option<&str>) -> CreateOpts {
        CreateOpts {
            cidr: "10.0.1.0/24".to_string(),
            gateway_ip: gateway_ip.map(str::to_string),
            ..CreateOpts::default()
        }
    }

    #[test]
    fn gateway_three_ways() {
        let default_gateway = opts(None).to_body().expect("body").into_value();
        let no_gateway = opts(Some("")).to_body().expect("body").into_value();
        let explicit = opts(Some("10.0.1.254")).to_body().expect("body").into_value();

        check!(default_gateway == json!({"subnet": {"cidr": "10.0.1.0/24"}}));
        check!(no_gateway == json!({"subnet": {"cidr": "10.0.1.0/24", "gateway_ip": null}}));
        check!(explicit == json!({"subnet": {"cidr": "10.0.1.0/24", "gateway_ip": "10.0.1.254"}}));
    }

    #[test]
    fn empty_cidr_is_left_out() {
        let body = CreateOpts {
            name: "db".to_string(),
            ..CreateOpts::default()
        }
        .to_body()
        .expect("body");

        check!(body.into_value() == json!({"subnet": {"name": "db"}}));
    }

    #[test]
    fn vpc_flag_and_nameservers() {
        let opts = CreateOpts {
            ip_version: 4,
            dns_nameservers: vec!["8.8.8.8".to_string()],
            vpc: Some(true),
            ..opts(None)
        };

        let body = opts.to_body().expect("body").into_value();

        check!(
            body == json!({"subnet": {
                "cidr": "10.0.1.0/24",
                "ip_version": 4,
                "dns_nameservers": ["8.8.8.8"],
                "vpc": true
            }})
        );
    }
}
