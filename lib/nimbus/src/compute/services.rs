//! Compute services (scheduler, conductor, compute hosts). Admin only.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Pager, Result, ServiceClient, Strategy};

/// A compute service as returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Service {
    /// Integer id on older microversions, UUID on newer ones.
    pub id: Value,
    /// Executable, e.g. `nova-scheduler`.
    pub binary: String,
    /// Host the service runs on.
    pub host: String,
    /// Availability zone.
    pub zone: String,
    /// `enabled` or `disabled`.
    pub status: String,
    /// `up` or `down`.
    pub state: String,
    /// Last heartbeat.
    pub updated_at: Option<String>,
    /// Why the service was disabled.
    pub disabled_reason: Option<String>,
}

/// Lists compute services.
///
/// The answer is never paginated: the pager fetches exactly one page.
///
/// # Errors
///
/// Returns an error if the endpoint has no path.
pub fn list<C: ServiceClient>(client: &C) -> Result<Pager<C>> {
    let url = client.service_url(&["os-services"])?;
    Ok(Pager::new(client.clone(), url, "services", Strategy::single()))
}
