//! Device endpoints
//!
//! Listing, lookup, blocking, deactivation and deauthorization of backup
//! client devices, plus the agent state and device setting views.

use std::sync::Arc;

use serde_json::json;
use vaultline_domain::{ApiResponse, RequestOptions, Result};

use super::resource_path;
use crate::http::Session;

const COMPUTER: &str = "/api/Computer";
const COMPUTER_BLOCK: &str = "/api/ComputerBlock";
const COMPUTER_DEAUTHORIZATION: &str = "/api/ComputerDeauthorization";
const DEACTIVATION_UPDATE: &str = "/api/v4/computer-deactivation/update";
const DEACTIVATION_REMOVE: &str = "/api/v4/computer-deactivation/remove";
const DEVICE_SETTING_VIEW: &str = "/api/v4/device-setting/view";
const AGENT_STATE_VIEW: &str = "/api/v14/agent-state/view-by-device-guid";

const FULL_DISK_ACCESS: &str = "fullDiskAccess";

/// Filters for [`DeviceClient::get_devices`].
///
/// `page_size` falls back to the session's `items_per_page` when unset.
#[derive(Debug, Clone)]
pub struct DeviceQuery {
    pub active: Option<bool>,
    pub blocked: Option<bool>,
    pub org_uid: Option<String>,
    pub user_uid: Option<String>,
    pub target_computer_guid: Option<String>,
    pub include_backup_usage: Option<bool>,
    pub include_counts: bool,
    pub page_num: Option<u32>,
    pub page_size: Option<u32>,
    pub q: Option<String>,
}

impl Default for DeviceQuery {
    fn default() -> Self {
        Self {
            active: None,
            blocked: None,
            org_uid: None,
            user_uid: None,
            target_computer_guid: None,
            include_backup_usage: None,
            include_counts: true,
            page_num: None,
            page_size: None,
            q: None,
        }
    }
}

pub struct DeviceClient {
    session: Arc<Session>,
}

impl DeviceClient {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    pub fn get_devices(&self, query: &DeviceQuery) -> Result<ApiResponse> {
        let page_size = query.page_size.unwrap_or(self.session.settings().items_per_page);
        let options = RequestOptions::new()
            .opt_param("active", query.active)
            .opt_param("blocked", query.blocked)
            .opt_param("orgUid", query.org_uid.as_deref())
            .opt_param("userUid", query.user_uid.as_deref())
            .opt_param("targetComputerGuid", query.target_computer_guid.as_deref())
            .opt_param("incBackupUsage", query.include_backup_usage)
            .param("incCounts", query.include_counts)
            .opt_param("pgNum", query.page_num)
            .param("pgSize", page_size)
            .opt_param("q", query.q.as_deref());
        self.session.get(COMPUTER, options)
    }

    pub fn get_by_id(
        &self,
        device_id: u64,
        include_backup_usage: Option<bool>,
    ) -> Result<ApiResponse> {
        let options = RequestOptions::new().opt_param("incBackupUsage", include_backup_usage);
        self.session.get(&format!("{COMPUTER}/{device_id}"), options)
    }

    pub fn get_by_guid(
        &self,
        guid: &str,
        include_backup_usage: Option<bool>,
    ) -> Result<ApiResponse> {
        let options = RequestOptions::new()
            .param("idType", "guid")
            .opt_param("incBackupUsage", include_backup_usage);
        self.session.get(&resource_path(COMPUTER, guid), options)
    }

    pub fn block(&self, device_id: u64) -> Result<ApiResponse> {
        self.session.put(&format!("{COMPUTER_BLOCK}/{device_id}"), RequestOptions::new())
    }

    pub fn unblock(&self, device_id: u64) -> Result<ApiResponse> {
        self.session.delete(&format!("{COMPUTER_BLOCK}/{device_id}"), RequestOptions::new())
    }

    pub fn deactivate(&self, device_id: u64) -> Result<ApiResponse> {
        let body = json!({ "id": device_id });
        self.session.post(DEACTIVATION_UPDATE, RequestOptions::new().json(&body)?)
    }

    pub fn reactivate(&self, device_id: u64) -> Result<ApiResponse> {
        let body = json!({ "id": device_id });
        self.session.post(DEACTIVATION_REMOVE, RequestOptions::new().json(&body)?)
    }

    pub fn deauthorize(&self, device_id: u64) -> Result<ApiResponse> {
        self.session
            .put(&format!("{COMPUTER_DEAUTHORIZATION}/{device_id}"), RequestOptions::new())
    }

    /// `keys` is a comma-separated list of setting names; `None` returns all.
    pub fn get_settings(&self, guid: &str, keys: Option<&str>) -> Result<ApiResponse> {
        let options = RequestOptions::new().param("guid", guid).opt_param("keys", keys);
        self.session.get(DEVICE_SETTING_VIEW, options)
    }

    pub fn get_agent_state(&self, guid: &str, property_name: &str) -> Result<ApiResponse> {
        let options = RequestOptions::new()
            .param("deviceGuid", guid)
            .param("propertyName", property_name);
        self.session.get(AGENT_STATE_VIEW, options)
    }

    pub fn get_agent_full_disk_access_state(&self, guid: &str) -> Result<ApiResponse> {
        self.get_agent_state(guid, FULL_DISK_ACCESS)
    }
}
