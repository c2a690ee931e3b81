//! Registry payloads and the update record handed to the host

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::package::types::PackageKind;

/// Minimal answer of the registry to a version query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteVersionInfo {
    pub slug: String,
    pub version: String,
    /// Informational page of the package
    pub url: String,
    /// Download location of the package archive
    pub package: String,
}

/// Answer of the registry to a "view details" query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteDetailInfo {
    pub slug: String,
    pub version: String,
    /// Named content sections (description, changelog, ...)
    #[serde(default, deserialize_with = "deserialize_mapping")]
    pub sections: IndexMap<String, String>,
    /// Banner image URLs keyed by size
    #[serde(default, deserialize_with = "deserialize_mapping")]
    pub banners: IndexMap<String, String>,
    /// Everything else the registry sent, passed through untouched
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// A newer version of an installed package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecord {
    pub kind: PackageKind,
    /// Slug reported by the registry
    pub slug: String,
    /// Slug derived from the install path; the host keys its update list by it
    pub install_slug: String,
    pub new_version: String,
    pub url: String,
    pub package_source: String,
}

/// Shapes the registry is known to send for sections and banners
#[derive(Deserialize)]
#[serde(untagged)]
enum WireMapping {
    Map(IndexMap<String, Value>),
    List(Vec<Value>),
    Scalar(Value),
}

fn deserialize_mapping<'de, D>(deserializer: D) -> Result<IndexMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let wire = Option::<WireMapping>::deserialize(deserializer)?;

    let mapping = match wire {
        None | Some(WireMapping::Scalar(Value::Null)) => IndexMap::new(),
        Some(WireMapping::Map(map)) => map
            .into_iter()
            .map(|(name, value)| (name, stringify(value)))
            .collect(),
        Some(WireMapping::List(items)) => items
            .into_iter()
            .enumerate()
            .map(|(i, value)| (i.to_string(), stringify(value)))
            .collect(),
        Some(WireMapping::Scalar(value)) => IndexMap::from([("0".to_string(), stringify(value))]),
    };

    Ok(mapping)
}

fn stringify(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
