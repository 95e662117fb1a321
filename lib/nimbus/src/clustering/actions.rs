//! Cluster actions.
//!
//! The action list is paginated by marker: each page request carries the id
//! of the last action already seen, until a page comes back empty.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Options, Pager, Result, ServiceClient, Strategy, ToQuery};

/// Filters for [`list`].
#[derive(Debug, Clone, Default, Options)]
pub struct ListOpts {
    /// Only actions with this name.
    #[opts(query)]
    pub name: String,
    /// Only actions on this cluster or node id.
    #[opts(query)]
    pub target: String,
    /// Only actions of this type, e.g. `CLUSTER_SCALE_OUT`.
    #[opts(query)]
    pub action: String,
    /// Only actions in this status.
    #[opts(query)]
    pub status: String,
    /// Sort keys and directions, e.g. `created_at:desc`.
    #[opts(query)]
    pub sort: String,
    /// Include every project's actions (admin).
    #[opts(query)]
    pub global_project: Option<bool>,
    /// Page size.
    #[opts(query)]
    pub limit: u32,
    /// Id of the action to start after.
    #[opts(query)]
    pub marker: String,
}

/// A cluster action as returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Action {
    /// Unique id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Action type.
    pub action: String,
    /// Target cluster or node.
    pub target: String,
    /// `INIT`, `READY`, `RUNNING`, `SUCCEEDED`, `FAILED`...
    pub status: String,
    /// Human readable status detail.
    pub status_reason: String,
    /// `RPC Request` or `Derived Action`.
    pub cause: String,
    /// Engine that owns the action.
    pub owner: Option<String>,
    /// Owning project.
    pub project: String,
    /// Inputs of the action.
    pub inputs: Value,
    /// Outputs of the action.
    pub outputs: Value,
    /// Actions this one waits on.
    pub depends_on: Vec<String>,
    /// Actions waiting on this one.
    pub depended_by: Vec<String>,
    /// Seconds before the action times out.
    pub timeout: Option<u64>,
    /// Creation timestamp.
    pub created_at: Option<String>,
    /// Last update timestamp.
    pub updated_at: Option<String>,
}

/// Lists actions, continuing from the last id of each page.
///
/// # Errors
///
/// Returns an error if `opts` does not build or the endpoint has no path.
pub fn list<C: ServiceClient>(client: &C, opts: &impl ToQuery) -> Result<Pager<C>> {
    let url = opts.to_query()?.with_url(&client.service_url(&["actions"])?);
    Ok(Pager::new(client.clone(), url, "actions", Strategy::marker()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query() {
        let opts = ListOpts {
            status: "FAILED".to_string(),
            limit: 200,
            ..ListOpts::default()
        };

        insta::assert_snapshot!(opts.to_query().expect("query"), @"?status=FAILED&limit=200");
    }
}
