//! Call descriptors: what one API invocation asks of the gateway.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::params::Params;

/// Logical resource names addressing slots in the shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Model {
    ServerConfig,
    Lang,
    Dashboard,
    Lists,
    Subscribers,
    Campaigns,
    Templates,
    Media,
    Settings,
    Logs,
}

impl Model {
    pub const ALL: [Model; 10] = [
        Model::ServerConfig,
        Model::Lang,
        Model::Dashboard,
        Model::Lists,
        Model::Subscribers,
        Model::Campaigns,
        Model::Templates,
        Model::Media,
        Model::Settings,
        Model::Logs,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Model::ServerConfig => "serverConfig",
            Model::Lang => "lang",
            Model::Dashboard => "dashboard",
            Model::Lists => "lists",
            Model::Subscribers => "subscribers",
            Model::Campaigns => "campaigns",
            Model::Templates => "templates",
            Model::Media => "media",
            Model::Settings => "settings",
            Model::Logs => "logs",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side effects a call opts into. Every field defaults to "off".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Toggle `state[model].loading` around the call.
    pub loading: Option<Model>,
    /// Write the normalized payload into `state[model].data` on success.
    pub store: Option<Model>,
    /// Return the payload's keys exactly as the server sent them.
    pub preserve_case: bool,
    /// Do not raise a failure notification for this call.
    pub disable_toast: bool,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loading(mut self, model: Model) -> Self {
        self.loading = Some(model);
        self
    }

    pub fn store(mut self, model: Model) -> Self {
        self.store = Some(model);
        self
    }

    /// Shorthand for `loading(model).store(model)`.
    pub fn tracked(self, model: Model) -> Self {
        self.loading(model).store(model)
    }

    pub fn preserve_case(mut self) -> Self {
        self.preserve_case = true;
        self
    }

    pub fn disable_toast(mut self) -> Self {
        self.disable_toast = true;
        self
    }
}

/// One resolved API invocation. Built by the endpoint catalog, consumed once
/// by `Gateway::send`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub method: HttpMethod,
    pub path: String,
    pub params: Params,
    pub body: Option<String>,
    pub options: CallOptions,
}

impl Call {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Params::new(),
            body: None,
            options: CallOptions::default(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub fn options(mut self, options: CallOptions) -> Self {
        self.options = options;
        self
    }

    /// Attach a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, payload: &T) -> Result<Self, ApiError> {
        let body =
            serde_json::to_string(payload).map_err(|e| ApiError::Serialization(e.to_string()))?;
        self.body = Some(body);
        Ok(self)
    }

    /// Path plus serialized query string, relative to the base address.
    pub fn target(&self) -> String {
        if self.params.is_empty() {
            return self.path.clone();
        }
        let separator = if self.path.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.path, separator, self.params.to_query_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_names_match_state_keys() {
        assert_eq!(Model::ServerConfig.as_str(), "serverConfig");
        assert_eq!(
            serde_json::to_value(Model::ServerConfig).unwrap(),
            serde_json::json!("serverConfig")
        );
        for model in Model::ALL {
            assert_eq!(serde_json::to_value(model).unwrap(), model.as_str());
        }
    }

    #[test]
    fn options_default_to_no_side_effects() {
        let options = CallOptions::default();
        assert_eq!(options.loading, None);
        assert_eq!(options.store, None);
        assert!(!options.preserve_case);
        assert!(!options.disable_toast);
    }

    #[test]
    fn tracked_sets_loading_and_store() {
        let options = CallOptions::new().tracked(Model::Lists);
        assert_eq!(options.loading, Some(Model::Lists));
        assert_eq!(options.store, Some(Model::Lists));
    }

    #[test]
    fn target_appends_query() {
        let call =
            Call::get("/v1/api/subscribers").params(Params::new().set_list("list_id", [1, 2]));
        assert_eq!(call.target(), "/v1/api/subscribers?list_id=1&list_id=2");
    }

    #[test]
    fn target_extends_existing_query() {
        let call = Call::get("/v1/api/x?a=1").params(Params::new().set("b", 2));
        assert_eq!(call.target(), "/v1/api/x?a=1&b=2");
    }

    #[test]
    fn json_body_is_encoded() {
        let call = Call::post("/v1/api/lists")
            .json(&serde_json::json!({"name": "news"}))
            .unwrap();
        assert_eq!(call.body.as_deref(), Some(r#"{"name":"news"}"#));
    }
}
