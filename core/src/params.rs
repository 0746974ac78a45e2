//! Query parameters and their wire serialization.
//!
//! List-valued parameters are rendered as repeated keys (`id=1&id=2`), never
//! the bracketed form (`id[]=1&id[]=2`). The API's query binder only
//! understands the repeated form.

use url::form_urlencoded;

/// A single parameter value: scalar or list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    One(String),
    Many(Vec<String>),
}

/// Ordered query parameters. Setting an existing key replaces its value in
/// place, so insertion order is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key.into(), ParamValue::One(value.to_string()))
    }

    pub fn set_list<I, V>(self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        let values = values.into_iter().map(|v| v.to_string()).collect();
        self.insert(key.into(), ParamValue::Many(values))
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flatten into `(key, value)` pairs, one pair per list element.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs = Vec::new();
        for (key, value) in &self.entries {
            match value {
                ParamValue::One(v) => pairs.push((key.as_str(), v.as_str())),
                ParamValue::Many(values) => {
                    pairs.extend(values.iter().map(|v| (key.as_str(), v.as_str())));
                }
            }
        }
        pairs
    }

    /// Render as an `application/x-www-form-urlencoded` query string without
    /// the leading `?`. Empty lists contribute nothing.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs())
            .finish()
    }

    fn insert(mut self, key: String, value: ParamValue) -> Self {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }
}
