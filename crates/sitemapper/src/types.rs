//! Core value types shared by entries, expanders and the renderer.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::host::RouteHandle;

/// Format used for structured `lastmod` values.
pub const LASTMOD_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// URL scheme used when resolving entries to absolute URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    #[default]
    Https,
}

impl Scheme {
    /// Pick the scheme from an `https` flag.
    pub fn from_https(https: bool) -> Self {
        if https {
            Scheme::Https
        } else {
            Scheme::Http
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which document a registry renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SitemapKind {
    /// `<urlset>` of `<url>` entries.
    #[default]
    Urlset,
    /// `<sitemapindex>` of `<sitemap>` entries.
    Index,
}

impl SitemapKind {
    /// Pick the kind from a `master` flag.
    pub fn from_master(master: bool) -> Self {
        if master {
            SitemapKind::Index
        } else {
            SitemapKind::Urlset
        }
    }

    /// Root element name.
    pub fn root_tag(&self) -> &'static str {
        match self {
            SitemapKind::Urlset => "urlset",
            SitemapKind::Index => "sitemapindex",
        }
    }

    /// Per-entry element name.
    pub fn entry_tag(&self) -> &'static str {
        match self {
            SitemapKind::Urlset => "url",
            SitemapKind::Index => "sitemap",
        }
    }
}

/// A `lastmod` value as supplied at registration.
///
/// Structured values are turned into text when an entry is built, so the
/// renderer only ever sees strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lastmod {
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Lastmod {
    /// Normalize to the string written into the document.
    pub fn into_text(self) -> String {
        match self {
            Lastmod::Text(text) => text,
            Lastmod::Date(date) => date.format("%Y-%m-%d").to_string(),
            Lastmod::DateTime(dt) => dt.format(LASTMOD_FORMAT).to_string(),
        }
    }
}

impl From<&str> for Lastmod {
    fn from(value: &str) -> Self {
        Lastmod::Text(value.to_string())
    }
}

impl From<String> for Lastmod {
    fn from(value: String) -> Self {
        Lastmod::Text(value)
    }
}

impl From<NaiveDate> for Lastmod {
    fn from(value: NaiveDate) -> Self {
        Lastmod::Date(value)
    }
}

impl From<NaiveDateTime> for Lastmod {
    fn from(value: NaiveDateTime) -> Self {
        Lastmod::DateTime(value)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Lastmod {
    fn from(value: DateTime<Tz>) -> Self {
        Lastmod::DateTime(value.naive_local())
    }
}

/// A `priority` value. Not range checked.
#[derive(Debug, Clone, PartialEq)]
pub enum Priority {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Priority {
    /// Whether the value is written at all. Zero and empty text are skipped.
    pub fn is_set(&self) -> bool {
        match self {
            Priority::Int(v) => *v != 0,
            Priority::Float(v) => *v != 0.0,
            Priority::Text(v) => !v.is_empty(),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Int(v) => write!(f, "{v}"),
            // Debug keeps the fractional digit: 1.0 stays "1.0".
            Priority::Float(v) => write!(f, "{v:?}"),
            Priority::Text(v) => f.write_str(v),
        }
    }
}

impl From<i32> for Priority {
    fn from(value: i32) -> Self {
        Priority::Int(value.into())
    }
}

impl From<i64> for Priority {
    fn from(value: i64) -> Self {
        Priority::Int(value)
    }
}

impl From<u32> for Priority {
    fn from(value: u32) -> Self {
        Priority::Int(value.into())
    }
}

impl From<f64> for Priority {
    fn from(value: f64) -> Self {
        Priority::Float(value)
    }
}

impl From<&str> for Priority {
    fn from(value: &str) -> Self {
        Priority::Text(value.to_string())
    }
}

impl From<String> for Priority {
    fn from(value: String) -> Self {
        Priority::Text(value)
    }
}

/// Metadata for a dynamic route: one value for every expanded entry, or one
/// value per parameter combination.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue<T> {
    One(T),
    PerIndex(Vec<T>),
}

impl<T: Clone> MetaValue<T> {
    /// Value for the `index`-th combination. `None` past the end of a sequence.
    pub fn at(&self, index: usize) -> Option<T> {
        match self {
            MetaValue::One(value) => Some(value.clone()),
            MetaValue::PerIndex(values) => values.get(index).cloned(),
        }
    }
}

/// Errors raised while registering or rendering a sitemap.
#[derive(thiserror::Error, Debug)]
pub enum SitemapError {
    #[error("Route handle {0} is not registered as a route")]
    HandleNotRegistered(RouteHandle),

    #[error("Endpoint not registered: {0}")]
    EndpointNotRegistered(String),

    #[error("Could not build URL for endpoint '{endpoint}': {message}")]
    UrlBuild { endpoint: String, message: String },

    #[error("Sitemap is not attached to a host")]
    NotAttached,

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type SitemapResult<T> = Result<T, SitemapError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_lastmod_text_passes_through() {
        assert_eq!(Lastmod::from("2022-02-08").into_text(), "2022-02-08");
    }

    #[test]
    fn test_lastmod_datetime_normalized() {
        let dt = NaiveDate::from_ymd_opt(2022, 2, 8)
            .unwrap()
            .and_hms_opt(13, 5, 9)
            .unwrap();
        assert_eq!(Lastmod::from(dt).into_text(), "2022-02-08T13:05:09");
    }

    #[test]
    fn test_lastmod_aware_datetime_uses_local_time() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let dt = Utc
            .with_ymd_and_hms(2023, 6, 1, 10, 0, 0)
            .unwrap()
            .with_timezone(&offset);
        assert_eq!(Lastmod::from(dt).into_text(), "2023-06-01T12:00:00");
    }

    #[test]
    fn test_lastmod_date() {
        let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        assert_eq!(Lastmod::from(date).into_text(), "2023-01-01");
    }

    #[test]
    fn test_priority_display() {
        assert_eq!(Priority::from(1.0).to_string(), "1.0");
        assert_eq!(Priority::from(0.8).to_string(), "0.8");
        assert_eq!(Priority::from(3).to_string(), "3");
        assert_eq!(Priority::from("0.5").to_string(), "0.5");
    }

    #[test]
    fn test_priority_zero_is_unset() {
        assert!(!Priority::from(0).is_set());
        assert!(!Priority::from(0.0).is_set());
        assert!(!Priority::from("").is_set());
        assert!(Priority::from(0.1).is_set());
    }

    #[test]
    fn test_meta_value_at() {
        let one = MetaValue::One("monthly".to_string());
        assert_eq!(one.at(7).as_deref(), Some("monthly"));

        let many = MetaValue::PerIndex(vec![1, 2]);
        assert_eq!(many.at(1), Some(2));
        assert_eq!(many.at(2), None);
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(SitemapKind::from_master(false).root_tag(), "urlset");
        assert_eq!(SitemapKind::from_master(true).entry_tag(), "sitemap");
        assert_eq!(Scheme::from_https(false).to_string(), "http");
    }
}
