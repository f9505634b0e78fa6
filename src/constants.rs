//! Centralized string constants for the oaskit library
//!
//! This module contains commonly used string literals to:
//! - Reduce string duplication
//! - Improve maintainability
//! - Ensure consistency across the codebase

// Document version fields
pub const FIELD_SWAGGER: &str = "swagger";
pub const FIELD_OPENAPI: &str = "openapi";
pub const FIELD_REF: &str = "$ref";
pub const FIELD_INFO: &str = "info";
pub const FIELD_TITLE: &str = "title";
pub const FIELD_VERSION: &str = "version";
pub const FIELD_PATHS: &str = "paths";
pub const FIELD_WEBHOOKS: &str = "webhooks";
pub const FIELD_COMPONENTS: &str = "components";
pub const FIELD_DEFINITIONS: &str = "definitions";
pub const FIELD_PARAMETERS: &str = "parameters";
pub const FIELD_RESPONSES: &str = "responses";
pub const FIELD_SECURITY_DEFINITIONS: &str = "securityDefinitions";
pub const FIELD_SECURITY: &str = "security";
pub const FIELD_SERVERS: &str = "servers";
pub const FIELD_TAGS: &str = "tags";
pub const FIELD_HOST: &str = "host";
pub const FIELD_BASE_PATH: &str = "basePath";
pub const FIELD_SCHEMES: &str = "schemes";
pub const FIELD_CONSUMES: &str = "consumes";
pub const FIELD_PRODUCES: &str = "produces";
pub const FIELD_SCHEMA: &str = "schema";
pub const FIELD_CONTENT: &str = "content";
pub const FIELD_REQUEST_BODY: &str = "requestBody";
pub const FIELD_OPERATION_ID: &str = "operationId";
pub const FIELD_REQUIRED: &str = "required";
pub const FIELD_NAME: &str = "name";
pub const FIELD_IN: &str = "in";
pub const FIELD_TYPE: &str = "type";
pub const FIELD_FORMAT: &str = "format";
pub const FIELD_ENUM: &str = "enum";
pub const FIELD_NULLABLE: &str = "nullable";
pub const FIELD_STYLE: &str = "style";
pub const FIELD_EXPLODE: &str = "explode";
pub const FIELD_COLLECTION_FORMAT: &str = "collectionFormat";
pub const FIELD_DEPRECATED: &str = "deprecated";

// Component buckets (OpenAPI 3.x `components` submaps)
pub const BUCKET_SCHEMAS: &str = "schemas";
pub const BUCKET_PARAMETERS: &str = "parameters";
pub const BUCKET_RESPONSES: &str = "responses";
pub const BUCKET_REQUEST_BODIES: &str = "requestBodies";
pub const BUCKET_HEADERS: &str = "headers";
pub const BUCKET_SECURITY_SCHEMES: &str = "securitySchemes";
pub const BUCKET_LINKS: &str = "links";
pub const BUCKET_CALLBACKS: &str = "callbacks";
pub const BUCKET_EXAMPLES: &str = "examples";

// Reference prefixes
pub const REF_PREFIX_COMPONENTS: &str = "#/components/";
pub const REF_PREFIX_DEFINITIONS: &str = "#/definitions/";
pub const REF_PREFIX_V2_PARAMETERS: &str = "#/parameters/";
pub const REF_PREFIX_V2_RESPONSES: &str = "#/responses/";

// HTTP methods in the canonical OpenAPI iteration order.
// `trace` is OpenAPI 3.x only.
pub const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];
pub const HTTP_METHODS_V2: &[&str] = &["get", "put", "post", "delete", "options", "head", "patch"];

// Recognized document version strings
pub const VERSION_2_0: &str = "2.0";
pub const VERSION_3_0_0: &str = "3.0.0";
pub const VERSION_3_0_1: &str = "3.0.1";
pub const VERSION_3_0_2: &str = "3.0.2";
pub const VERSION_3_0_3: &str = "3.0.3";
pub const VERSION_3_1_0: &str = "3.1.0";
pub const VERSION_3_1_1: &str = "3.1.1";
pub const VERSION_3_2_0: &str = "3.2.0";

// Overlay specification
pub const OVERLAY_VERSION: &str = "1.0.0";
pub const FIELD_OVERLAY: &str = "overlay";
pub const FIELD_ACTIONS: &str = "actions";
pub const FIELD_TARGET: &str = "target";
pub const FIELD_UPDATE: &str = "update";
pub const FIELD_REMOVE: &str = "remove";

// Content types
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";
pub const CONTENT_TYPE_MULTIPART: &str = "multipart/form-data";

// Security scheme vocabulary
pub const SCHEME_TYPE_API_KEY: &str = "apiKey";
pub const SCHEME_TYPE_HTTP: &str = "http";
pub const SCHEME_TYPE_BASIC: &str = "basic";
pub const SCHEME_TYPE_OAUTH2: &str = "oauth2";
pub const HTTP_SCHEME_BEARER: &str = "bearer";
pub const HTTP_SCHEME_BASIC: &str = "basic";
pub const HEADER_AUTHORIZATION: &str = "Authorization";

// Error context messages
pub const ERR_YAML_SYNTAX: &str = "Check that the document is valid YAML syntax.";
pub const ERR_JSON_SYNTAX: &str = "Check that the document is valid JSON syntax.";
pub const ERR_OPENAPI_FORMAT: &str =
    "Check that the document declares a recognized 'swagger' or 'openapi' version.";
pub const ERR_JSONPATH_SYNTAX: &str =
    "Check the JSONPath expression against the supported grammar.";
pub const ERR_FILE_NOT_FOUND: &str = "Check that the file path is correct and the file exists.";

// Default values
pub const DEFAULT_RENAME_TEMPLATE: &str = "{name}_{source}";
pub const DEFAULT_SOURCE_STEM: &str = "document";
