//! Swagger 2.0 document root.

use super::{
    DocumentAccessor, ExternalDocs, Info, OASVersion, Parameter, PathItem, Response, Schema,
    SecurityRequirement, SecurityScheme, Tag,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAS2Document {
    /// Always `"2.0"`.
    pub swagger: String,
    #[serde(default)]
    pub info: Info,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub definitions: IndexMap<String, Schema>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, Parameter>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, Response>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub security_definitions: IndexMap<String, SecurityScheme>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl Default for OAS2Document {
    fn default() -> Self {
        Self {
            swagger: crate::constants::VERSION_2_0.to_string(),
            info: Info::default(),
            host: None,
            base_path: None,
            schemes: Vec::new(),
            consumes: Vec::new(),
            produces: Vec::new(),
            paths: IndexMap::new(),
            definitions: IndexMap::new(),
            parameters: IndexMap::new(),
            responses: IndexMap::new(),
            security_definitions: IndexMap::new(),
            security: Vec::new(),
            tags: Vec::new(),
            external_docs: None,
            extensions: IndexMap::new(),
        }
    }
}

impl DocumentAccessor for OAS2Document {
    fn info(&self) -> &Info {
        &self.info
    }

    fn paths(&self) -> &IndexMap<String, PathItem> {
        &self.paths
    }

    fn tags(&self) -> &[Tag] {
        &self.tags
    }

    fn schemas(&self) -> Option<&IndexMap<String, Schema>> {
        Some(&self.definitions)
    }

    fn version_string(&self) -> &str {
        &self.swagger
    }

    fn oas_version(&self) -> OASVersion {
        OASVersion::V2_0
    }
}
