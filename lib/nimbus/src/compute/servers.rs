//! Servers (instances).

use std::collections::BTreeMap;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    Body, Error, HttpClientExt, IdLookup, Options, Pager, RequestOptions, Result, ServiceClient,
    Strategy, ToBody, ToQuery, build_body_with, single_match,
};

/// Filters for [`list`].
#[derive(Debug, Clone, Default, Options)]
pub struct ListOpts {
    /// Name filter; the service treats it as a regular expression.
    #[opts(query)]
    pub name: String,
    /// Only servers booted from this image id.
    #[opts(query)]
    pub image: String,
    /// Only servers of this flavor id.
    #[opts(query)]
    pub flavor: String,
    /// Only servers with a matching IPv4 address.
    #[opts(query)]
    pub ip: String,
    /// Only servers with a matching IPv6 address.
    #[opts(query)]
    pub ip6: String,
    /// Only servers in this availability zone.
    #[opts(query)]
    pub availability_zone: String,
    /// Only servers on this compute host (admin).
    #[opts(query)]
    pub host: String,
    /// Only servers using this key pair.
    #[opts(query)]
    pub key_name: String,
    /// Only servers carrying all of these tags.
    #[opts(query, format = "csv")]
    pub tags: Vec<String>,
    /// Only servers carrying any of these tags.
    #[opts(query = "tags-any", format = "csv")]
    pub tags_any: Vec<String>,
    /// Only servers in this status, e.g. `ACTIVE`.
    #[opts(query)]
    pub status: String,
    /// Attribute to sort by.
    #[opts(query)]
    pub sort_key: String,
    /// List servers of every project (admin).
    #[opts(query = "all_tenants")]
    pub all_tenants: Option<bool>,
    /// Include deleted servers (admin).
    #[opts(query)]
    pub deleted: Option<bool>,
    /// Page size.
    #[opts(query)]
    pub limit: u32,
    /// Id of the last server of the previous page.
    #[opts(query)]
    pub marker: String,
}

/// A network attachment of a new server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    /// Network id.
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub uuid: String,
    /// Existing port to plug.
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub port: String,
    /// Fixed address on the network.
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub fixed_ip: String,
    /// Device tag.
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub tag: String,
}

/// A file injected into a new server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct File {
    /// Destination path.
    pub path: String,
    /// Raw contents, always base64 encoded when sent.
    pub contents: Bytes,
}

/// Attributes of a new server.
///
/// The image is given either as `image_ref` or as `image_name`; the flavor as
/// `flavor_ref` or `flavor_name`. Names are resolved through the
/// [`IdLookup`] handed to [`ToBody::to_body_with`].
#[derive(Debug, Clone, Default, Options)]
pub struct CreateOpts {
    /// Display name.
    #[opts(required)]
    pub name: String,
    /// Image id. Sent even when empty, as booting from a volume expects.
    #[opts(body = "imageRef", keep_zero)]
    pub image_ref: String,
    /// Image name, resolved when `image_ref` is empty.
    #[opts(lookup(key = "imageRef", kind = "image"))]
    pub image_name: String,
    /// Flavor id.
    #[opts(body = "flavorRef")]
    pub flavor_ref: String,
    /// Flavor name, resolved when `flavor_ref` is empty.
    #[opts(lookup(key = "flavorRef", kind = "flavor"))]
    pub flavor_name: String,
    /// Security group names.
    #[opts(skip)]
    pub security_groups: Vec<String>,
    /// Network attachments.
    #[opts(skip)]
    pub networks: Vec<Network>,
    /// Files to inject.
    #[opts(skip)]
    pub personality: Vec<File>,
    /// Attach a config drive.
    pub config_drive: Option<bool>,
    /// Root password.
    #[opts(body = "adminPass")]
    pub admin_pass: String,
    /// Public IPv4 address to advertise.
    #[opts(body = "accessIPv4")]
    pub access_ipv4: String,
    /// Public IPv6 address to advertise.
    #[opts(body = "accessIPv6")]
    pub access_ipv6: String,
    /// Key pair to inject.
    pub key_name: String,
    /// Availability zone.
    pub availability_zone: String,
    /// Cloud-init payload, raw or already base64-encoded.
    pub user_data: Bytes,
    /// Server tags.
    pub tags: Vec<String>,
    /// Free-form key/value metadata.
    pub metadata: BTreeMap<String, String>,
    /// Block device mappings, passed through as is.
    pub block_device_mapping_v2: Vec<Value>,
}

impl ToBody for CreateOpts {
    fn to_body_with(&self, lookup: Option<&dyn IdLookup>) -> Result<Body> {
        if self.flavor_ref.is_empty() && self.flavor_name.is_empty() {
            return Err(Error::MissingRequiredField { field: "flavor_ref" });
        }

        let mut body = build_body_with(self, "", lookup)?;
        if !self.security_groups.is_empty() {
            let groups: Vec<Value> = self
                .security_groups
                .iter()
                .map(|name| json!({ "name": name }))
                .collect();
            body.insert("security_groups", groups);
        }
        if !self.networks.is_empty() {
            body.insert("networks", serde_json::to_value(&self.networks)?);
        }
        if !self.personality.is_empty() {
            let files: Vec<Value> = self
                .personality
                .iter()
                .map(|file| json!({ "path": file.path, "contents": STANDARD.encode(&file.contents) }))
                .collect();
            body.insert("personality", files);
        }
        Ok(body.wrap("server"))
    }
}

/// An address of a server on one network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    /// IP address.
    pub addr: String,
    /// 4 or 6.
    pub version: u16,
    /// `fixed` or `floating`.
    #[serde(rename = "OS-EXT-IPS:type")]
    pub kind: String,
}

/// A server as returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    /// Unique id.
    pub id: String,
    /// Display name; not unique.
    pub name: String,
    /// `ACTIVE`, `BUILD`, `ERROR`, `SHUTOFF`...
    pub status: String,
    /// Owner project.
    pub tenant_id: String,
    /// Owner user.
    pub user_id: String,
    /// Image reference; an empty string for volume-backed servers.
    pub image: Value,
    /// Flavor reference.
    pub flavor: Value,
    /// Addresses per network name.
    pub addresses: BTreeMap<String, Vec<Address>>,
    /// Free-form key/value metadata.
    pub metadata: BTreeMap<String, String>,
    /// Key pair name.
    pub key_name: Option<String>,
    /// Public IPv4 address.
    #[serde(rename = "accessIPv4")]
    pub access_ipv4: String,
    /// Public IPv6 address.
    #[serde(rename = "accessIPv6")]
    pub access_ipv6: String,
    /// Creation timestamp.
    pub created: String,
    /// Last update timestamp.
    pub updated: String,
    /// Generated root password, only present in create answers.
    #[serde(rename = "adminPass", skip_serializing_if = "Option::is_none")]
    pub admin_pass: Option<String>,
}

/// Lists servers with details, following `servers_links`.
///
/// # Errors
///
/// Returns an error if `opts` does not build or the endpoint has no path.
pub fn list<C: ServiceClient>(client: &C, opts: &impl ToQuery) -> Result<Pager<C>> {
    let url = opts
        .to_query()?
        .with_url(&client.service_url(&["servers", "detail"])?);
    Ok(Pager::new(
        client.clone(),
        url,
        "servers",
        Strategy::linked("servers_links"),
    ))
}

/// Fetch one server.
///
/// # Errors
///
/// Returns the transport, status or decode error.
pub async fn get<C: ServiceClient>(client: &C, id: &str) -> Result<Server> {
    let url = client.service_url(&["servers", id])?;
    client
        .get(&url, &RequestOptions::new().ok_codes([200, 203]))
        .await?
        .json_at("server")
}

/// Create a server.
///
/// `lookup` resolves `image_name` and `flavor_name`; it may be `None` when
/// both ids are given.
///
/// # Errors
///
/// Returns the body build or lookup error, or the transport, status or
/// decode error.
pub async fn create<C: ServiceClient>(
    client: &C,
    opts: &impl ToBody,
    lookup: Option<&dyn IdLookup>,
) -> Result<Server> {
    let body = opts.to_body_with(lookup)?;
    let url = client.service_url(&["servers"])?;
    client
        .post(&url, &body, &RequestOptions::new())
        .await?
        .json_at("server")
}

/// Delete a server.
///
/// # Errors
///
/// Returns the transport or status error.
pub async fn delete<C: ServiceClient>(client: &C, id: &str) -> Result<()> {
    let url = client.service_url(&["servers", id])?;
    client.delete(&url, &RequestOptions::new()).await?;
    Ok(())
}

/// The id of the only server called exactly `name`.
///
/// # Errors
///
/// Returns a lookup error unless exactly one server matches, or the
/// traversal error.
pub async fn id_from_name<C: ServiceClient>(client: &C, name: &str) -> Result<String> {
    let opts = ListOpts {
        name: name.to_string(),
        ..ListOpts::default()
    };
    let ids: Vec<String> = list(client, &opts)?
        .all_items::<Server>()
        .await?
        .into_iter()
        .filter(|server| server.name == name)
        .map(|server| server.id)
        .collect();
    single_match("server", name, &ids)
}
