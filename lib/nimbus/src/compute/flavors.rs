//! Flavors (hardware templates).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{NameTable, Options, Pager, Result, ServiceClient, Strategy, ToQuery, single_match};

/// Filters for [`list`].
#[derive(Debug, Clone, Default, Options)]
pub struct ListOpts {
    /// Only flavors with at least this much disk, in GiB.
    #[opts(query = "minDisk")]
    pub min_disk: u32,
    /// Only flavors with at least this much memory, in MiB.
    #[opts(query = "minRam")]
    pub min_ram: u32,
    /// `public`, `private` or `all` (admin).
    #[opts(query = "is_public")]
    pub access_type: String,
    /// Attribute to sort by.
    #[opts(query)]
    pub sort_key: String,
    /// `asc` or `desc`.
    #[opts(query)]
    pub sort_dir: String,
    /// Page size.
    #[opts(query)]
    pub limit: u32,
    /// Id of the last flavor of the previous page.
    #[opts(query)]
    pub marker: String,
}

/// A flavor as returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Flavor {
    /// Unique id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Memory in MiB.
    pub ram: u64,
    /// Virtual CPUs.
    pub vcpus: u32,
    /// Root disk in GiB.
    pub disk: u64,
    /// Swap in MiB; some deployments answer `""` for none.
    pub swap: Value,
    /// Whether every project may use it.
    #[serde(rename = "os-flavor-access:is_public")]
    pub is_public: bool,
}

/// Lists flavors with details, following `flavors_links`.
///
/// # Errors
///
/// Returns an error if `opts` does not build or the endpoint has no path.
pub fn list<C: ServiceClient>(client: &C, opts: &impl ToQuery) -> Result<Pager<C>> {
    let url = opts
        .to_query()?
        .with_url(&client.service_url(&["flavors", "detail"])?);
    Ok(Pager::new(
        client.clone(),
        url,
        "flavors",
        Strategy::linked("flavors_links"),
    ))
}

/// Every flavor name, for resolving `flavor_name` in server bodies.
///
/// # Errors
///
/// Returns the traversal or decode error.
pub async fn name_table<C: ServiceClient>(client: &C) -> Result<NameTable> {
    NameTable::from_pager("flavor", &list(client, &ListOpts::default())?).await
}

/// The id of the only flavor called `name`.
///
/// # Errors
///
/// Returns a lookup error unless exactly one flavor matches, or the
/// traversal error.
pub async fn id_from_name<C: ServiceClient>(client: &C, name: &str) -> Result<String> {
    let ids: Vec<String> = list(client, &ListOpts::default())?
        .all_items::<Flavor>()
        .await?
        .into_iter()
        .filter(|flavor| flavor.name == name)
        .map(|flavor| flavor.id)
        .collect();
    single_match("flavor", name, &ids)
}

#[cfg(test)]
mod tests {
    use assert2::check;
    use serde_json::json;

    use super::*;

    #[test]
    fn list_query_uses_service_keys() {
        let opts = ListOpts {
            min_ram: 2048,
            access_type: "all".to_string(),
            ..ListOpts::default()
        };

        insta::assert_snapshot!(opts.to_query().expect("query"), @"?minRam=2048&is_public=all");
    }

    #[test]
    fn decodes_flavor() {
        let flavor: Flavor = crate::from_value(
            json!({
                "id": "fl-1",
                "name": "m1.small",
                "ram": 2048,
                "vcpus": 1,
                "disk": 20,
                "swap": "",
                "os-flavor-access:is_public": true
            }),
            "flavor",
        )
        .expect("flavor");

        check!(flavor.name == "m1.small");
        check!(flavor.swap == "");
        check!(flavor.is_public);
    }
}
