//! Shared application state written by the gateway.
//!
//! # Design
//! `AppState` is a cloneable handle onto one keyed store: each `Model` maps to
//! a loading flag and the last payload stored for it. Only the gateway writes
//! (`set_loading`, `set_model_response`); everything else reads. Concurrent
//! writes to the same slot are last-settled-wins.
//!
//! Every write bumps a revision published on a `watch` channel so readers can
//! wait for changes instead of polling.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;
use tracing::trace;

use crate::call::Model;

/// The state slot for one resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelState {
    pub loading: bool,
    pub data: Value,
}

#[derive(Debug, Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    slots: RwLock<HashMap<Model, ModelState>>,
    revision: watch::Sender<u64>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                slots: RwLock::new(HashMap::new()),
                revision,
            }),
        }
    }

    pub(crate) fn set_loading(&self, model: Model, loading: bool) {
        self.inner.slots.write().entry(model).or_default().loading = loading;
        trace!(%model, loading, "state: loading");
        self.bump();
    }

    pub(crate) fn set_model_response(&self, model: Model, data: Value) {
        self.inner.slots.write().entry(model).or_default().data = data;
        trace!(%model, "state: model response");
        self.bump();
    }

    /// Current slot for `model`; untouched slots read as not loading with
    /// `null` data.
    pub fn get(&self, model: Model) -> ModelState {
        self.inner
            .slots
            .read()
            .get(&model)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_loading(&self, model: Model) -> bool {
        self.inner
            .slots
            .read()
            .get(&model)
            .is_some_and(|slot| slot.loading)
    }

    pub fn data(&self, model: Model) -> Value {
        self.get(model).data
    }

    /// Copy of every slot written so far, ordered by model.
    pub fn snapshot(&self) -> BTreeMap<Model, ModelState> {
        self.inner
            .slots
            .read()
            .iter()
            .map(|(model, slot)| (*model, slot.clone()))
            .collect()
    }

    /// Receiver that observes a new revision after every write.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    fn bump(&self) {
        self.inner.revision.send_modify(|rev| *rev += 1);
    }
}
