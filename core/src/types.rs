//! Typed arguments for endpoint catalog entries.
//!
//! Most request bodies are forwarded as whatever serializable value the
//! caller holds. The types here cover the few entries whose shape the
//! catalog itself fixes.

use serde::{Deserialize, Serialize};

use crate::params::Params;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Draft,
    Scheduled,
    Running,
    Paused,
    Cancelled,
    Finished,
}

/// Body of a campaign status change: `{"status": "running"}`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatusChange {
    pub status: CampaignStatus,
}

/// Criteria for the subscriber filter endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriberFilter {
    pub max_subscribers: u64,
    pub selection: String,
    pub kind: String,
    pub time_range: String,
    pub list_range: String,
    pub campaign_list_range: String,
}

impl SubscriberFilter {
    pub fn to_params(&self) -> Params {
        Params::new()
            .set("maxsubscribers", self.max_subscribers)
            .set("selection", &self.selection)
            .set("type", &self.kind)
            .set("timerange", &self.time_range)
            .set("list", &self.list_range)
            .set("campaignlist", &self.campaign_list_range)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderPair {
    pub key: String,
    pub value: String,
}

impl HeaderPair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A GraphQL query relayed through the settings proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphqlProxy {
    pub url: String,
    pub header: Vec<HeaderPair>,
    pub query: String,
}

impl GraphqlProxy {
    /// Anonymous JSON query against `url`.
    pub fn anonymous(url: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            header: vec![
                HeaderPair::new("content-type", "application/json"),
                HeaderPair::new("x-hasura-role", "anonymous"),
            ],
            query: query.into(),
        }
    }
}
