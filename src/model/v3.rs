//! OpenAPI 3.x document root and components.

use super::{
    DocumentAccessor, ExternalDocs, Header, Info, OASVersion, Parameter, PathItem, RequestBody,
    Response, Schema, SecurityRequirement, SecurityScheme, Server, Tag,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAS3Document {
    /// One of the recognized `3.*` version strings.
    pub openapi: String,
    #[serde(default)]
    pub info: Info,
    /// 3.1+
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_schema_dialect: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    /// 3.1+
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub webhooks: IndexMap<String, PathItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl Default for OAS3Document {
    fn default() -> Self {
        Self {
            openapi: crate::constants::VERSION_3_0_3.to_string(),
            info: Info::default(),
            json_schema_dialect: None,
            servers: Vec::new(),
            paths: IndexMap::new(),
            webhooks: IndexMap::new(),
            components: None,
            security: Vec::new(),
            tags: Vec::new(),
            external_docs: None,
            extensions: IndexMap::new(),
        }
    }
}

impl OAS3Document {
    /// The components map, created on first use.
    pub fn components_mut(&mut self) -> &mut Components {
        self.components.get_or_insert_with(Components::default)
    }

    /// Named schemas, if a components map is present.
    #[must_use]
    pub fn component_schemas(&self) -> Option<&IndexMap<String, Schema>> {
        self.components.as_ref().map(|c| &c.schemas)
    }
}

impl DocumentAccessor for OAS3Document {
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
        self.component_schemas()
    }

    fn version_string(&self) -> &str {
        &self.openapi
    }

    fn oas_version(&self) -> OASVersion {
        OASVersion::parse(&self.openapi).unwrap_or(OASVersion::V3_0_0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, Schema>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, Response>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, Parameter>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub request_bodies: IndexMap<String, RequestBody>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, Header>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub security_schemes: IndexMap<String, SecurityScheme>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub links: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub callbacks: IndexMap<String, Value>,
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl Components {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
            && self.responses.is_empty()
            && self.parameters.is_empty()
            && self.examples.is_empty()
            && self.request_bodies.is_empty()
            && self.headers.is_empty()
            && self.security_schemes.is_empty()
            && self.links.is_empty()
            && self.callbacks.is_empty()
            && self.extensions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_document_round_trip() {
        let source = serde_json::json!({
            "openapi": "3.0.3",
            "info": {"title": "Test API", "version": "1.0.0"},
            "paths": {}
        });
        let doc: OAS3Document = serde_json::from_value(source.clone()).unwrap();
        assert_eq!(doc.openapi, "3.0.3");
        assert_eq!(doc.oas_version(), OASVersion::V3_0_3);
        assert_eq!(serde_json::to_value(&doc).unwrap(), source);
    }

    #[test]
    fn test_webhooks_decode() {
        let source = serde_json::json!({
            "openapi": "3.1.0",
            "info": {"title": "Hooks", "version": "0.1.0"},
            "paths": {},
            "webhooks": {"newPet": {"post": {"responses": {"200": {"description": "ok"}}}}}
        });
        let doc: OAS3Document = serde_json::from_value(source).unwrap();
        assert!(doc.webhooks.contains_key("newPet"));
        assert!(doc.oas_version().supports_webhooks());
    }
}
