//! Legal hold endpoints
//!
//! Thin mapping of legal hold operations onto [`Session`] requests. Payloads
//! keep `null` for unset optional fields, which the service treats as "not
//! provided". Policy lookups and hold deactivation require a v3 user token
//! and go through the v3 session.

use std::sync::Arc;

use serde_json::json;
use vaultline_domain::{ApiResponse, RequestOptions, Result};

use super::resource_path;
use crate::http::Session;

const LEGAL_HOLD: &str = "/api/LegalHold";
const LEGAL_HOLD_MEMBERSHIP: &str = "/api/LegalHoldMembership";
const LEGAL_HOLD_MEMBERSHIP_DEACTIVATION: &str = "/api/LegalHoldMembershipDeactivation";
const POLICY_CREATE: &str = "/api/v4/legal-hold-policy/create";
const POLICY_VIEW: &str = "/api/v4/legal-hold-policy/view";
const POLICY_LIST: &str = "/api/v4/legal-hold-policy/list";
const HOLD_DEACTIVATION: &str = "/api/v4/legal-hold-deactivation/update";
const LEGAL_HOLD_REACTIVATION: &str = "/api/LegalHoldReactivation";

/// Filters for [`LegalHoldClient::get_legal_holds`].
#[derive(Debug, Clone)]
pub struct LegalHoldQuery {
    pub legal_hold_uid: Option<String>,
    pub creator_user_uid: Option<String>,
    pub active_state: Option<String>,
    pub name: Option<String>,
    pub hold_ext_ref: Option<String>,
    pub page_num: Option<u32>,
    pub page_size: Option<u32>,
}

impl Default for LegalHoldQuery {
    fn default() -> Self {
        Self {
            legal_hold_uid: None,
            creator_user_uid: None,
            active_state: Some("ACTIVE".to_string()),
            name: None,
            hold_ext_ref: None,
            page_num: None,
            page_size: None,
        }
    }
}

/// Filters for [`LegalHoldClient::get_legal_hold_memberships`].
#[derive(Debug, Clone, Default)]
pub struct MembershipQuery {
    pub legal_hold_membership_uid: Option<String>,
    pub legal_hold_uid: Option<String>,
    pub user_uid: Option<String>,
    pub user: Option<String>,
    pub active_state: Option<String>,
    pub page_num: Option<u32>,
    pub page_size: Option<u32>,
}

/// Optional fields for [`LegalHoldClient::create_legal_hold`].
#[derive(Debug, Clone, Default)]
pub struct NewLegalHold {
    pub description: Option<String>,
    pub notes: Option<String>,
    pub hold_ext_ref: Option<String>,
}

pub struct LegalHoldClient {
    session: Arc<Session>,
    v3_session: Arc<Session>,
}

impl LegalHoldClient {
    /// Client that sends every endpoint through `session`.
    pub fn new(session: Arc<Session>) -> Self {
        Self { v3_session: Arc::clone(&session), session }
    }

    pub fn with_v3_session(session: Arc<Session>, v3_session: Arc<Session>) -> Self {
        Self { session, v3_session }
    }

    pub fn create_legal_hold_policy(
        &self,
        name: &str,
        policy: Option<serde_json::Value>,
    ) -> Result<ApiResponse> {
        let body = json!({ "name": name, "policy": policy });
        self.session.post(POLICY_CREATE, RequestOptions::new().json(&body)?)
    }

    pub fn create_legal_hold(
        &self,
        name: &str,
        hold_policy_uid: &str,
        extra: &NewLegalHold,
    ) -> Result<ApiResponse> {
        let body = json!({
            "name": name,
            "holdPolicyUid": hold_policy_uid,
            "description": extra.description,
            "notes": extra.notes,
            "holdExtRef": extra.hold_ext_ref,
        });
        self.session.post(LEGAL_HOLD, RequestOptions::new().json(&body)?)
    }

    pub fn get_legal_hold_policy_by_uid(&self, legal_hold_policy_uid: &str) -> Result<ApiResponse> {
        let options = RequestOptions::new().param("legalHoldPolicyUid", legal_hold_policy_uid);
        self.v3_session.get(POLICY_VIEW, options)
    }

    pub fn get_all_legal_hold_policies(&self) -> Result<ApiResponse> {
        self.v3_session.get(POLICY_LIST, RequestOptions::new())
    }

    pub fn get_legal_hold_by_uid(&self, legal_hold_uid: &str) -> Result<ApiResponse> {
        self.session.get(&resource_path(LEGAL_HOLD, legal_hold_uid), RequestOptions::new())
    }

    pub fn get_legal_holds(&self, query: &LegalHoldQuery) -> Result<ApiResponse> {
        let options = RequestOptions::new()
            .opt_param("legalHoldUid", query.legal_hold_uid.as_deref())
            .opt_param("creatorUserUid", query.creator_user_uid.as_deref())
            .opt_param("activeState", query.active_state.as_deref())
            .opt_param("name", query.name.as_deref())
            .opt_param("holdExtRef", query.hold_ext_ref.as_deref())
            .opt_param("pgNum", query.page_num)
            .opt_param("pgSize", query.page_size);
        self.session.get(LEGAL_HOLD, options)
    }

    pub fn get_legal_hold_memberships(&self, query: &MembershipQuery) -> Result<ApiResponse> {
        let options = RequestOptions::new()
            .opt_param("legalHoldMembershipUid", query.legal_hold_membership_uid.as_deref())
            .opt_param("legalHoldUid", query.legal_hold_uid.as_deref())
            .opt_param("userUid", query.user_uid.as_deref())
            .opt_param("user", query.user.as_deref())
            .opt_param("activeState", query.active_state.as_deref())
            .opt_param("pgNum", query.page_num)
            .opt_param("pgSize", query.page_size);
        self.session.get(LEGAL_HOLD_MEMBERSHIP, options)
    }

    pub fn add_user_to_legal_hold(
        &self,
        user_uid: &str,
        legal_hold_uid: &str,
    ) -> Result<ApiResponse> {
        let body = json!({ "legalHoldUid": legal_hold_uid, "userUid": user_uid });
        self.session.post(LEGAL_HOLD_MEMBERSHIP, RequestOptions::new().json(&body)?)
    }

    pub fn remove_user_from_legal_hold(
        &self,
        legal_hold_membership_uid: &str,
    ) -> Result<ApiResponse> {
        let body = json!({ "legalHoldMembershipUid": legal_hold_membership_uid });
        self.session.post(LEGAL_HOLD_MEMBERSHIP_DEACTIVATION, RequestOptions::new().json(&body)?)
    }

    pub fn deactivate_legal_hold(&self, legal_hold_uid: &str) -> Result<ApiResponse> {
        let body = json!({ "legalHoldUid": legal_hold_uid });
        self.v3_session.post(HOLD_DEACTIVATION, RequestOptions::new().json(&body)?)
    }

    pub fn reactivate_legal_hold(&self, legal_hold_uid: &str) -> Result<ApiResponse> {
        let path = resource_path(LEGAL_HOLD_REACTIVATION, legal_hold_uid);
        self.session.put(&path, RequestOptions::new())
    }
}
