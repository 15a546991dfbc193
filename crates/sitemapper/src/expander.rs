//! Expansion of one dynamic route into many concrete entries.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::entry::Entry;
use crate::types::{Lastmod, MetaValue, Priority, Scheme};

/// Parameter name to the ordered values it takes, one per expanded entry.
///
/// Combinations are built positionally: the i-th combination takes the i-th
/// value of every parameter. Lengths are expected to agree; extra values of
/// longer sequences are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlVariables {
    values: BTreeMap<String, Vec<String>>,
}

impl UrlVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the values of one parameter.
    pub fn var<I, V>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        self.values.insert(
            name.to_string(),
            values.into_iter().map(|v| v.to_string()).collect(),
        );
        self
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of combinations: the length of the shortest sequence.
    pub fn len(&self) -> usize {
        self.values.values().map(Vec::len).min().unwrap_or(0)
    }

    /// Zip all sequences into one map per combination.
    pub fn combinations(&self) -> Vec<BTreeMap<String, String>> {
        (0..self.len())
            .map(|i| {
                self.values
                    .iter()
                    .map(|(name, values)| (name.clone(), values[i].clone()))
                    .collect()
            })
            .collect()
    }
}

impl<K: ToString, V: ToString> FromIterator<(K, Vec<V>)> for UrlVariables {
    fn from_iter<T: IntoIterator<Item = (K, Vec<V>)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
                .collect(),
        }
    }
}

/// Callback producing parameter values at render time.
pub type UrlGenerator = Arc<dyn Fn() -> UrlVariables + Send + Sync>;

/// Where a dynamic route gets its parameter values from.
#[derive(Clone)]
pub enum UrlSource {
    /// Fixed values; expansion is reproducible.
    Literal(UrlVariables),
    /// Re-evaluated on every render that is not served from cache.
    Generator(UrlGenerator),
}

impl UrlSource {
    /// A literal source is safe to cache, a generator is not.
    pub fn is_cacheable(&self) -> bool {
        matches!(self, UrlSource::Literal(_))
    }

    fn variables(&self) -> UrlVariables {
        match self {
            UrlSource::Literal(vars) => vars.clone(),
            UrlSource::Generator(generate) => generate(),
        }
    }
}

impl fmt::Debug for UrlSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlSource::Literal(vars) => f.debug_tuple("Literal").field(vars).finish(),
            UrlSource::Generator(_) => f.write_str("Generator(..)"),
        }
    }
}

/// A dynamic route registered for the sitemap, expanded lazily.
#[derive(Debug, Clone)]
pub struct DynamicEndpoint {
    pub endpoint: String,
    pub scheme: Scheme,
    pub lastmod: Option<MetaValue<Lastmod>>,
    pub changefreq: Option<MetaValue<String>>,
    pub priority: Option<MetaValue<Priority>>,
    pub source: UrlSource,
}

impl DynamicEndpoint {
    /// One entry per parameter combination, metadata paired by index.
    pub fn entries(&self) -> Vec<Entry> {
        let variables = self.source.variables();
        let combinations = variables.combinations();

        tracing::trace!(
            endpoint = %self.endpoint,
            count = combinations.len(),
            "expanding dynamic endpoint"
        );

        combinations
            .into_iter()
            .enumerate()
            .map(|(i, vars)| {
                Entry::new(
                    self.endpoint.clone(),
                    self.scheme,
                    self.lastmod.as_ref().and_then(|m| m.at(i)),
                    self.changefreq.as_ref().and_then(|m| m.at(i)),
                    self.priority.as_ref().and_then(|m| m.at(i)),
                    vars,
                )
            })
            .collect()
    }
}
