//! The request/response pipeline every API call goes through.
//!
//! # Design
//! `Gateway::send` runs one `Call` through three ordered stages:
//!
//! 1. **intercept**: raise `state[loading].loading` before dispatch.
//! 2. **on_success**: clear the flag, unwrap the `{"data": …}` envelope,
//!    camelize keys, store the payload, return it.
//! 3. **on_failure**: clear the flag, pick a display message, raise a toast
//!    unless suppressed, hand the original error back.
//!
//! The loading flag is owned by a `LoadingGuard` created in stage 1. Stages 2
//! and 3 settle it explicitly; if the `send` future is dropped mid-flight the
//! guard's `Drop` clears it instead, so the flag always goes back to `false`
//! exactly once.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::call::{Call, CallOptions, Model};
use crate::case::camelize_keys;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::notify::{Notifier, Toast, TracingNotifier};
use crate::state::AppState;
use crate::transport::{Transport, UreqTransport};

pub struct Gateway<T> {
    config: ClientConfig,
    transport: T,
    state: AppState,
    notifier: Arc<dyn Notifier>,
}

impl Gateway<UreqTransport> {
    /// Gateway over the default ureq transport, honouring the config's timeout.
    pub fn with_ureq(config: ClientConfig, state: AppState) -> Self {
        let transport = UreqTransport::from_config(&config);
        Self::new(config, transport, state)
    }
}

impl<T: Transport> Gateway<T> {
    /// Failure toasts go to [`TracingNotifier`] until
    /// [`with_notifier`](Self::with_notifier) says otherwise.
    pub fn new(config: ClientConfig, transport: T, state: AppState) -> Self {
        Self {
            config,
            transport,
            state,
            notifier: Arc::new(TracingNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Dispatch `call` and resolve to its normalized payload.
    pub async fn send(&self, call: Call) -> Result<Value, ApiError> {
        let request = self.prepare(&call);
        let options = call.options;
        let guard = self.intercept(&options);

        debug!(method = %request.method, url = %request.url, "dispatch");
        match self.transport.execute(request).await {
            Ok(response) if response.is_success() => Ok(self.on_success(&options, guard, response)),
            Ok(response) => {
                let err = ApiError::from_status(response.status, response.body);
                Err(self.on_failure(&options, guard, err))
            }
            Err(e) => Err(self.on_failure(&options, guard, ApiError::Transport(e))),
        }
    }

    /// Like [`send`](Self::send), then deserialize the payload into `R`.
    pub async fn send_as<R: DeserializeOwned>(&self, call: Call) -> Result<R, ApiError> {
        let value = self.send(call).await?;
        serde_json::from_value(value).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    fn prepare(&self, call: &Call) -> HttpRequest {
        let mut headers = self.config.headers();
        if call.body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        HttpRequest {
            method: call.method,
            url: self.config.url_for(&call.target()),
            headers,
            body: call.body.clone(),
        }
    }

    fn intercept(&self, options: &CallOptions) -> LoadingGuard<'_> {
        if let Some(model) = options.loading {
            self.state.set_loading(model, true);
        }
        LoadingGuard {
            state: &self.state,
            model: options.loading,
        }
    }

    fn on_success(
        &self,
        options: &CallOptions,
        guard: LoadingGuard<'_>,
        response: HttpResponse,
    ) -> Value {
        guard.settle();
        debug!(status = response.status, "settled");

        let data = unwrap_envelope(&response.body);
        let data = if options.preserve_case {
            data
        } else {
            camelize_keys(data)
        };

        if let Some(model) = options.store {
            self.state.set_model_response(model, data.clone());
        }
        data
    }

    fn on_failure(
        &self,
        options: &CallOptions,
        guard: LoadingGuard<'_>,
        err: ApiError,
    ) -> ApiError {
        guard.settle();
        warn!(error = %err, "request failed");

        if !options.disable_toast {
            if let Err(e) = self.notifier.notify(Toast::danger(err.display_message())) {
                warn!(error = %e, "failure toast dropped");
            }
        }
        err
    }
}

/// Pull `data` out of a success envelope. Empty, non-JSON or data-less bodies
/// read as an empty object.
fn unwrap_envelope(body: &str) -> Value {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(mut envelope)) => envelope
            .remove("data")
            .unwrap_or_else(|| Value::Object(Map::new())),
        _ => Value::Object(Map::new()),
    }
}

struct LoadingGuard<'a> {
    state: &'a AppState,
    model: Option<Model>,
}

impl LoadingGuard<'_> {
    fn settle(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(model) = self.model.take() {
            self.state.set_loading(model, false);
        }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.release();
    }
}
