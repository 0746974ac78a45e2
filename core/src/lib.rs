//! HTTP gateway for the mailer admin API.
//!
//! # Overview
//! Every API call is described as a `Call` by the `endpoints` catalog and
//! sent through one `Gateway`, which injects authentication, toggles loading
//! flags in the shared `AppState`, unwraps the `{"data": …}` envelope,
//! camelizes field names, stores results and raises a toast on failure.
//!
//! # Design
//! - `ClientConfig` is built once per process; the bearer token is read from a
//!   `KeyValueStore` at that moment and never refreshed.
//! - `AppState` is an explicit handle passed into the gateway, so each test
//!   can own an isolated store.
//! - Side effects are opted into per call through the typed `CallOptions`.
//! - The network sits behind the `Transport` trait; `UreqTransport` is the
//!   production implementation.

pub mod call;
pub mod case;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod gateway;
pub mod http;
pub mod notify;
pub mod params;
pub mod state;
pub mod transport;
pub mod types;

pub use call::{Call, CallOptions, Model};
pub use config::{ClientConfig, FileStore, KeyValueStore, MemoryStore, TOKEN_KEY};
pub use error::{ApiError, ConfigError, TransportError};
pub use gateway::Gateway;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use notify::{ChannelNotifier, Notifier, NotifyError, Severity, Toast, TracingNotifier};
pub use params::{ParamValue, Params};
pub use state::{AppState, ModelState};
pub use transport::{Transport, UreqTransport};
pub use types::{CampaignStatus, GraphqlProxy, SubscriberFilter};
