//! Typed document model shared across OpenAPI versions.
//!
//! Swagger 2.0 and OpenAPI 3.x documents decode into one shared set of
//! entity structs; version-specific fields are optional and skipped on
//! serialization when absent. Unknown keys (including `x-*` extensions) are
//! captured into flattened `extensions` maps so a typed round trip is
//! lossless.
//!
//! Every referenceable entity carries a `ref_path` field (serialized as
//! `$ref`) instead of a reference-or-value wrapper, which keeps reference
//! walking uniform across the model.

pub mod v2;
pub mod v3;

use crate::constants;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

pub use v2::OAS2Document;
pub use v3::{Components, OAS3Document};

/// Recognized OpenAPI document versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OASVersion {
    V2_0,
    V3_0_0,
    V3_0_1,
    V3_0_2,
    V3_0_3,
    V3_1_0,
    V3_1_1,
    V3_2_0,
}

impl OASVersion {
    pub const ALL: &'static [Self] = &[
        Self::V2_0,
        Self::V3_0_0,
        Self::V3_0_1,
        Self::V3_0_2,
        Self::V3_0_3,
        Self::V3_1_0,
        Self::V3_1_1,
        Self::V3_2_0,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::V2_0 => constants::VERSION_2_0,
            Self::V3_0_0 => constants::VERSION_3_0_0,
            Self::V3_0_1 => constants::VERSION_3_0_1,
            Self::V3_0_2 => constants::VERSION_3_0_2,
            Self::V3_0_3 => constants::VERSION_3_0_3,
            Self::V3_1_0 => constants::VERSION_3_1_0,
            Self::V3_1_1 => constants::VERSION_3_1_1,
            Self::V3_2_0 => constants::VERSION_3_2_0,
        }
    }

    /// Parse a recognized version string.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == text)
    }

    #[must_use]
    pub const fn major(&self) -> u8 {
        match self {
            Self::V2_0 => 2,
            _ => 3,
        }
    }

    #[must_use]
    pub const fn is_v2(&self) -> bool {
        matches!(self, Self::V2_0)
    }

    #[must_use]
    pub const fn is_v3(&self) -> bool {
        !self.is_v2()
    }

    /// True for 3.1.0 and later, where JSON Schema 2020-12 keywords and
    /// `webhooks` are available.
    #[must_use]
    pub const fn is_v3_1_plus(&self) -> bool {
        matches!(self, Self::V3_1_0 | Self::V3_1_1 | Self::V3_2_0)
    }

    #[must_use]
    pub const fn supports_webhooks(&self) -> bool {
        self.is_v3_1_plus()
    }
}

impl std::fmt::Display for OASVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OASVersion {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| crate::error::Error::unknown_version(s))
    }
}

/// A parsed document of either major version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Document {
    V2(OAS2Document),
    V3(OAS3Document),
}

impl Document {
    #[must_use]
    pub const fn as_v2(&self) -> Option<&OAS2Document> {
        match self {
            Self::V2(doc) => Some(doc),
            Self::V3(_) => None,
        }
    }

    #[must_use]
    pub const fn as_v3(&self) -> Option<&OAS3Document> {
        match self {
            Self::V2(_) => None,
            Self::V3(doc) => Some(doc),
        }
    }

    #[must_use]
    pub fn into_v3(self) -> Option<OAS3Document> {
        match self {
            Self::V2(_) => None,
            Self::V3(doc) => Some(doc),
        }
    }
}

/// Version-agnostic view over a typed document.
pub trait DocumentAccessor {
    fn info(&self) -> &Info;
    fn paths(&self) -> &IndexMap<String, PathItem>;
    fn tags(&self) -> &[Tag];
    /// Named schemas: `definitions` in 2.0, `components.schemas` in 3.x.
    fn schemas(&self) -> Option<&IndexMap<String, Schema>>;
    fn version_string(&self) -> &str;
    fn oas_version(&self) -> OASVersion;
}

impl DocumentAccessor for Document {
    fn info(&self) -> &Info {
        match self {
            Self::V2(doc) => doc.info(),
            Self::V3(doc) => doc.info(),
        }
    }

    fn paths(&self) -> &IndexMap<String, PathItem> {
        match self {
            Self::V2(doc) => doc.paths(),
            Self::V3(doc) => doc.paths(),
        }
    }

    fn tags(&self) -> &[Tag] {
        match self {
            Self::V2(doc) => doc.tags(),
            Self::V3(doc) => doc.tags(),
        }
    }

    fn schemas(&self) -> Option<&IndexMap<String, Schema>> {
        match self {
            Self::V2(doc) => doc.schemas(),
            Self::V3(doc) => doc.schemas(),
        }
    }

    fn version_string(&self) -> &str {
        match self {
            Self::V2(doc) => doc.version_string(),
            Self::V3(doc) => doc.version_string(),
        }
    }

    fn oas_version(&self) -> OASVersion {
        match self {
            Self::V2(doc) => doc.oas_version(),
            Self::V3(doc) => doc.oas_version(),
        }
    }
}

/// Arbitrary JSON value used for open-ended positions in the model.
pub type Any = Value;

/// Map of security scheme name to required scopes.
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    #[serde(default)]
    pub title: String,
    /// 3.1+
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    #[serde(default)]
    pub version: String,
    #[serde(flatten)]
    pub extensions: IndexMap<String, Any>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct License {
    #[serde(default)]
    pub name: String,
    /// 3.1+
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalDocs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    #[serde(default)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
    #[serde(flatten)]
    pub extensions: IndexMap<String, Any>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Server {
    #[serde(default)]
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub variables: IndexMap<String, ServerVariable>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerVariable {
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    #[serde(default)]
    pub default: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The `type` keyword: a single name in 2.0/3.0, optionally an array of
/// names in 3.1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Multiple(Vec<String>),
}

impl SchemaType {
    /// The primary (first non-`"null"`) type name, if any.
    #[must_use]
    pub fn primary(&self) -> Option<&str> {
        match self {
            Self::Single(name) => Some(name.as_str()),
            Self::Multiple(names) => names
                .iter()
                .map(String::as_str)
                .find(|name| *name != "null"),
        }
    }

    #[must_use]
    pub fn includes_null(&self) -> bool {
        match self {
            Self::Single(name) => name == "null",
            Self::Multiple(names) => names.iter().any(|name| name == "null"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<Schema>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discriminator {
    pub property_name: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub mapping: IndexMap<String, String>,
}

/// The schema node, a superset of 2.0, 3.0, and 3.1 keywords.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub ref_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Any>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<Schema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<Schema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not: Option<Box<Schema>>,
    /// 3.0 only; replaced by `type: [T, "null"]` in 3.1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Any>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Any>,
    /// 3.1+
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Any>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    /// Boolean in 3.0, number in 3.1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<Any>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    /// Boolean in 3.0, number in 3.1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<Any>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<u64>,
    /// 3.1+
    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Any>,
    /// 3.1+
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prefix_items: Vec<Schema>,
    /// 3.1+
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unevaluated_properties: Option<Any>,
    /// 3.1+
    #[serde(rename = "$comment", skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(flatten)]
    pub extensions: IndexMap<String, Any>,
}

impl Schema {
    /// A bare `$ref` schema.
    #[must_use]
    pub fn reference(target: impl Into<String>) -> Self {
        Self {
            ref_path: Some(target.into()),
            ..Self::default()
        }
    }

    /// A schema with only a `type` name set.
    #[must_use]
    pub fn of_type(name: impl Into<String>) -> Self {
        Self {
            schema_type: Some(SchemaType::Single(name.into())),
            ..Self::default()
        }
    }

    /// The primary type name, if a `type` keyword is present.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        self.schema_type.as_ref().and_then(SchemaType::primary)
    }

    /// Visit this schema and every nested subschema, depth-first.
    pub fn walk_mut(&mut self, visit: &mut impl FnMut(&mut Self)) {
        visit(self);
        if let Some(items) = &mut self.items {
            items.walk_mut(visit);
        }
        for property in self.properties.values_mut() {
            property.walk_mut(visit);
        }
        if let Some(AdditionalProperties::Schema(inner)) = &mut self.additional_properties {
            inner.walk_mut(visit);
        }
        for group in [&mut self.all_of, &mut self.one_of, &mut self.any_of] {
            for member in group {
                member.walk_mut(visit);
            }
        }
        if let Some(not) = &mut self.not {
            not.walk_mut(visit);
        }
        for member in &mut self.prefix_items {
            member.walk_mut(visit);
        }
    }
}

/// Where a parameter is carried. `cookie` is 3.x only; `body` and
/// `formData` are 2.0 only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
    Body,
    FormData,
}

impl ParameterLocation {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Header => "header",
            Self::Path => "path",
            Self::Cookie => "cookie",
            Self::Body => "body",
            Self::FormData => "formData",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub ref_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<ParameterLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_empty_value: Option<bool>,
    // 3.x serialization keywords
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_reserved: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Any>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
    // 2.0 inline type keywords
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Any>,
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Any>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(flatten)]
    pub extensions: IndexMap<String, Any>,
}

impl Parameter {
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false) || self.location == Some(ParameterLocation::Path)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Any>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: IndexMap<String, Any>,
    #[serde(flatten)]
    pub extensions: IndexMap<String, Any>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub ref_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(flatten)]
    pub extensions: IndexMap<String, Any>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub ref_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    // 2.0 inline type keywords
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub header_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_format: Option<String>,
    #[serde(flatten)]
    pub extensions: IndexMap<String, Any>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub ref_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, Header>,
    /// 3.x media-type map.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
    /// 2.0 single response schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    /// 2.0 example map keyed by media type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<Any>,
    /// 3.x links.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub links: IndexMap<String, Any>,
    #[serde(flatten)]
    pub extensions: IndexMap<String, Any>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// 2.0 operation-level media types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,
    /// 2.0 operation-level media types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// 3.x only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, Response>,
    /// 3.x only; kept generic (callback path items nest arbitrarily).
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub callbacks: IndexMap<String, Any>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
    /// 3.x only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    /// 2.0 operation-level schemes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<String>,
    #[serde(flatten)]
    pub extensions: IndexMap<String, Any>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub ref_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// 3.x only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(flatten)]
    pub extensions: IndexMap<String, Any>,
}

impl PathItem {
    /// Operations present on this path, in the canonical method order.
    #[must_use]
    pub fn operations(&self) -> Vec<(&'static str, &Operation)> {
        let table = [
            ("get", &self.get),
            ("put", &self.put),
            ("post", &self.post),
            ("delete", &self.delete),
            ("options", &self.options),
            ("head", &self.head),
            ("patch", &self.patch),
            ("trace", &self.trace),
        ];
        table
            .into_iter()
            .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
            .collect()
    }

    /// Mutable view over present operations, in the canonical method order.
    pub fn operations_mut(&mut self) -> Vec<(&'static str, &mut Operation)> {
        let table = [
            ("get", &mut self.get),
            ("put", &mut self.put),
            ("post", &mut self.post),
            ("delete", &mut self.delete),
            ("options", &mut self.options),
            ("head", &mut self.head),
            ("patch", &mut self.patch),
            ("trace", &mut self.trace),
        ];
        table
            .into_iter()
            .filter_map(|(method, op)| op.as_mut().map(|op| (method, op)))
            .collect()
    }

    #[must_use]
    pub fn operation(&self, method: &str) -> Option<&Operation> {
        match method {
            "get" => self.get.as_ref(),
            "put" => self.put.as_ref(),
            "post" => self.post.as_ref(),
            "delete" => self.delete.as_ref(),
            "options" => self.options.as_ref(),
            "head" => self.head.as_ref(),
            "patch" => self.patch.as_ref(),
            "trace" => self.trace.as_ref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn has_operations(&self) -> bool {
        !self.operations().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityScheme {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub ref_path: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub scheme_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// 3.x `http` scheme name (`basic`, `bearer`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,
    /// 3.x OAuth2 flow map.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flows: Option<OAuthFlows>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_id_connect_url: Option<String>,
    /// 2.0 OAuth2 single-flow form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub scopes: IndexMap<String, String>,
    #[serde(flatten)]
    pub extensions: IndexMap<String, Any>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlows {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implicit: Option<OAuthFlow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<OAuthFlow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_credentials: Option<OAuthFlow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_code: Option<OAuthFlow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_url: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub scopes: IndexMap<String, String>,
}
