//! Virtual private clouds.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{
    HttpClientExt, Options, Pager, RequestOptions, Result, ServiceClient, Strategy, ToBody,
    ToQuery, single_match,
};

/// Filters and sorting for [`list`].
#[derive(Debug, Clone, Default, Options)]
pub struct ListOpts {
    /// Only VPCs in this status.
    #[opts(query)]
    pub status: String,
    /// Only VPCs with this name.
    #[opts(query)]
    pub name: String,
    /// Only VPCs owned by this project.
    #[opts(query)]
    pub tenant_id: String,
    /// Only the VPC with this id.
    #[opts(query)]
    pub id: String,
    /// Only VPCs with this address range.
    #[opts(query)]
    pub cidr: String,
    /// Only VPCs with this description.
    #[opts(query)]
    pub description: String,
    /// Only the default VPC, or only the others.
    #[opts(query)]
    pub is_default: Option<bool>,
    /// Attribute to sort by.
    #[opts(query)]
    pub sort_key: String,
    /// `asc` or `desc`.
    #[opts(query)]
    pub sort_dir: String,
    /// Restrict the attributes returned for each VPC.
    #[opts(query)]
    pub fields: Vec<String>,
    /// Page size.
    #[opts(query)]
    pub limit: u32,
    /// Id of the last VPC of the previous page.
    #[opts(query)]
    pub marker: String,
}

/// Attributes of a new VPC.
#[derive(Debug, Clone, Default, Options)]
#[opts(root = "vpc")]
pub struct CreateOpts {
    /// Display name.
    pub name: String,
    /// Owner project; only admins may create on behalf of another one.
    pub tenant_id: String,
    /// Free-form description.
    pub description: String,
    /// Address range, e.g. `10.0.0.0/16`.
    pub cidr: String,
    /// Make this the project's default VPC.
    pub is_default: Option<bool>,
}

/// Attributes to change on an existing VPC.
#[derive(Debug, Clone, Default, Options)]
#[opts(root = "vpc")]
pub struct UpdateOpts {
    /// New display name.
    pub name: String,
    /// New description.
    pub description: String,
    /// New address range.
    pub cidr: String,
}

/// A router attached to a VPC.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Router {
    /// Router id.
    pub id: String,
}

/// A VPC as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Vpc {
    /// Unique id.
    pub id: String,
    /// Display name; not unique.
    pub name: String,
    /// `ACTIVE`, `DOWN`, `BUILD` or `ERROR`.
    pub status: String,
    /// Networks inside the VPC.
    pub network_ids: Vec<String>,
    /// Routers attached to the VPC.
    pub routers: Vec<Router>,
    /// Owner project.
    pub tenant_id: String,
    /// Free-form description.
    pub description: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
    /// Whether this is the project's default VPC.
    pub is_default: bool,
    /// Address range.
    pub cidr: String,
}

/// Lists VPCs, following `vpcs_links`.
///
/// # Errors
///
/// Returns an error if `opts` does not build or the endpoint has no path.
pub fn list<C: ServiceClient>(client: &C, opts: &impl ToQuery) -> Result<Pager<C>> {
    let url = opts.to_query()?.with_url(&client.service_url(&["vpcs"])?);
    Ok(Pager::new(
        client.clone(),
        url,
        "vpcs",
        Strategy::linked("vpcs_links"),
    ))
}

/// Fetch one VPC.
///
/// # Errors
///
/// Returns the transport, status or decode error.
pub async fn get<C: ServiceClient>(client: &C, id: &str) -> Result<Vpc> {
    get_into(client, id).await
}

/// Fetch one VPC, decoding the `vpc` object into `T`.
///
/// # Errors
///
/// Returns the transport, status or decode error.
pub async fn get_into<C: ServiceClient, T: DeserializeOwned>(client: &C, id: &str) -> Result<T> {
    let url = client.service_url(&["vpcs", id])?;
    client.get(&url, &RequestOptions::new()).await?.json_at("vpc")
}

/// Create a VPC.
///
/// `opts` is usually a [`CreateOpts`], possibly wrapped by an extension such
/// as [`super::portsecurity::vpc_create`].
///
/// # Errors
///
/// Returns the body build error, or the transport, status or decode error.
pub async fn create<C: ServiceClient>(client: &C, opts: &impl ToBody) -> Result<Vpc> {
    create_into(client, opts).await
}

/// [`create`], decoding the created `vpc` object into `T`.
///
/// # Errors
///
/// See [`create`].
pub async fn create_into<C: ServiceClient, T: DeserializeOwned>(
    client: &C,
    opts: &impl ToBody,
) -> Result<T> {
    let body = opts.to_body()?;
    let url = client.service_url(&["vpcs"])?;
    client
        .post(&url, &body, &RequestOptions::new())
        .await?
        .json_at("vpc")
}

/// Update a VPC.
///
/// # Errors
///
/// Returns the body build error, or the transport, status or decode error.
pub async fn update<C: ServiceClient>(client: &C, id: &str, opts: &impl ToBody) -> Result<Vpc> {
    update_into(client, id, opts).await
}

/// [`update`], decoding the updated `vpc` object into `T`.
///
/// # Errors
///
/// See [`update`].
pub async fn update_into<C: ServiceClient, T: DeserializeOwned>(
    client: &C,
    id: &str,
    opts: &impl ToBody,
) -> Result<T> {
    let body = opts.to_body()?;
    let url = client.service_url(&["vpcs", id])?;
    client
        .put(&url, &body, &RequestOptions::new().ok_codes([200, 201]))
        .await?
        .json_at("vpc")
}

/// Delete a VPC.
///
/// # Errors
///
/// Returns the transport or status error.
pub async fn delete<C: ServiceClient>(client: &C, id: &str) -> Result<()> {
    let url = client.service_url(&["vpcs", id])?;
    client.delete(&url, &RequestOptions::new()).await?;
    Ok(())
}

/// The id of the only VPC called `name`.
///
/// # Errors
///
/// Returns [`crate::Error::NotFoundLookup`] or
/// [`crate::Error::AmbiguousLookup`] unless exactly one VPC matches, or the
/// traversal error.
pub async fn id_from_name<C: ServiceClient>(client: &C, name: &str) -> Result<String> {
    let opts = ListOpts {
        name: name.to_string(),
        ..ListOpts::default()
    };
    let ids: Vec<String> = list(client, &opts)?
        .all_items::<Vpc>()
        .await?
        .into_iter()
        .filter(|vpc| vpc.name == name)
        .map(|vpc| vpc.id)
        .collect();
    single_match("vpc", name, &ids)
}
