//! Model catalog records and their client-facing projection.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A model as reported by the upstream provider.
///
/// Only the fields the relay projects are typed; everything else the
/// provider sends is kept in `extra` and never reaches clients.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_generation_methods: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_token_limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_token_limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reduced, whitelisted view of a [`ModelRecord`].
///
/// Fields absent upstream are omitted rather than filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supported_generation_methods: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_token_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_token_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl From<ModelRecord> for ModelDescriptor {
    fn from(record: ModelRecord) -> Self {
        Self {
            name: record.name,
            display_name: record.display_name,
            supported_generation_methods: record.supported_generation_methods,
            input_token_limit: record.input_token_limit,
            output_token_limit: record.output_token_limit,
            version: record.version,
        }
    }
}

/// Project upstream records in their original order.
pub fn project(records: Vec<ModelRecord>) -> Vec<ModelDescriptor> {
    records.into_iter().map(ModelDescriptor::from).collect()
}
