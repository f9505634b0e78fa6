//! OpenAPI 3.x to Swagger 2.0.

use super::{for_each_schema_v2, Issues, JsonMap};
use crate::constants;
use crate::error::Error;
use crate::refs;
use crate::value::resolve_pointer;
use regex::Regex;
use serde_json::{json, Value};
use std::sync::OnceLock;

pub(super) fn convert(tree: &Value, issues: &mut Issues) -> Result<Value, Error> {
    let root = tree
        .as_object()
        .ok_or_else(|| Error::structural("document root is not a map"))?;

    let mut out = JsonMap::new();
    out.insert(
        constants::FIELD_SWAGGER.to_string(),
        Value::String(constants::VERSION_2_0.to_string()),
    );
    if let Some(info) = root.get(constants::FIELD_INFO) {
        out.insert(constants::FIELD_INFO.to_string(), info.clone());
    }

    split_servers(root, &mut out, issues);

    if let Some(webhooks) = root
        .get(constants::FIELD_WEBHOOKS)
        .and_then(Value::as_object)
    {
        for name in webhooks.keys() {
            issues.critical(
                format!("webhooks.{name}"),
                "webhooks-dropped",
                "webhooks have no 2.0 equivalent",
            );
        }
    }

    if let Some(paths) = root.get(constants::FIELD_PATHS).and_then(Value::as_object) {
        let mut new_paths = JsonMap::new();
        for (template, item) in paths {
            new_paths.insert(
                template.clone(),
                convert_path_item(item, template, tree, issues),
            );
        }
        out.insert(constants::FIELD_PATHS.to_string(), Value::Object(new_paths));
    }

    convert_components(root, &mut out, issues);

    for field in ["security", "tags", "externalDocs"] {
        if let Some(value) = root.get(field) {
            out.insert(field.to_string(), value.clone());
        }
    }
    for (key, value) in root {
        if key.starts_with("x-") {
            out.insert(key.clone(), value.clone());
        }
    }

    let mut out = Value::Object(out);

    refs::rewrite_ref_prefix(
        &mut out,
        "#/components/schemas/",
        constants::REF_PREFIX_DEFINITIONS,
    );
    refs::rewrite_ref_prefix(
        &mut out,
        "#/components/parameters/",
        constants::REF_PREFIX_V2_PARAMETERS,
    );
    refs::rewrite_ref_prefix(
        &mut out,
        "#/components/responses/",
        constants::REF_PREFIX_V2_RESPONSES,
    );

    for_each_schema_v2(&mut out, &mut |schema, location| {
        downgrade_schema_node(schema, location, issues);
    });

    Ok(out)
}

fn server_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([a-zA-Z][a-zA-Z0-9+.-]*)://([^/]+)(/.*)?$").expect("valid"))
}

// Only the first server survives the downgrade.
fn split_servers(root: &JsonMap, out: &mut JsonMap, issues: &mut Issues) {
    let Some(servers) = root
        .get(constants::FIELD_SERVERS)
        .and_then(Value::as_array)
    else {
        return;
    };
    let Some(first) = servers.first() else {
        return;
    };
    for (index, server) in servers.iter().enumerate().skip(1) {
        let url = server.get("url").and_then(Value::as_str).unwrap_or("");
        issues.warning(
            format!("servers[{index}]"),
            "server-dropped",
            format!("additional server '{url}' dropped; 2.0 supports one host"),
        );
    }
    let url = first.get("url").and_then(Value::as_str).unwrap_or("");
    if first.get("variables").is_some() {
        issues.warning(
            "servers[0]",
            "server-variables-dropped",
            "server variables have no 2.0 equivalent; the raw URL template was used",
        );
    }
    if let Some(captures) = server_url_regex().captures(url) {
        out.insert(
            constants::FIELD_SCHEMES.to_string(),
            json!([captures[1].to_string()]),
        );
        out.insert(
            constants::FIELD_HOST.to_string(),
            Value::String(captures[2].to_string()),
        );
        if let Some(base) = captures.get(3) {
            let base = base.as_str();
            if !base.is_empty() && base != "/" {
                out.insert(
                    constants::FIELD_BASE_PATH.to_string(),
                    Value::String(base.to_string()),
                );
            }
        }
    } else if !url.is_empty() {
        issues.warning(
            "servers[0]",
            "relative-server",
            format!("server URL '{url}' is not absolute; used as basePath"),
        );
        out.insert(
            constants::FIELD_BASE_PATH.to_string(),
            Value::String(url.to_string()),
        );
    }
}

fn convert_path_item(item: &Value, template: &str, tree: &Value, issues: &mut Issues) -> Value {
    let Some(item) = item.as_object() else {
        return item.clone();
    };
    let mut out = JsonMap::new();
    let location = format!("paths.{template}");
    if let Some(target) = item.get(constants::FIELD_REF) {
        out.insert(constants::FIELD_REF.to_string(), target.clone());
    }
    if item.get(constants::FIELD_SERVERS).is_some() {
        issues.warning(
            &location,
            "path-servers-dropped",
            "path-level servers have no 2.0 equivalent",
        );
    }

    if let Some(parameters) = item
        .get(constants::FIELD_PARAMETERS)
        .and_then(Value::as_array)
    {
        let converted = convert_parameter_list(parameters, tree, &location, issues);
        if !converted.is_empty() {
            out.insert(
                constants::FIELD_PARAMETERS.to_string(),
                Value::Array(converted),
            );
        }
    }

    for method in constants::HTTP_METHODS {
        let Some(operation) = item.get(*method).and_then(Value::as_object) else {
            continue;
        };
        if *method == "trace" {
            issues.critical(
                format!("{location}.trace"),
                "trace-dropped",
                "the trace method has no 2.0 equivalent",
            );
            continue;
        }
        out.insert(
            (*method).to_string(),
            convert_operation(operation, tree, &format!("{location}.{method}"), issues),
        );
    }

    for (key, value) in item {
        if key.starts_with("x-") {
            out.insert(key.clone(), value.clone());
        }
    }
    Value::Object(out)
}

fn convert_operation(
    operation: &JsonMap,
    tree: &Value,
    location: &str,
    issues: &mut Issues,
) -> Value {
    let mut out = JsonMap::new();
    for field in [
        "tags",
        "summary",
        "description",
        "externalDocs",
        "operationId",
        "deprecated",
        "security",
    ] {
        if let Some(value) = operation.get(field) {
            out.insert(field.to_string(), value.clone());
        }
    }
    if operation.get("callbacks").is_some() {
        issues.critical(
            location,
            "callbacks-dropped",
            "callbacks have no 2.0 equivalent",
        );
    }
    if operation.get(constants::FIELD_SERVERS).is_some() {
        issues.warning(
            location,
            "operation-servers-dropped",
            "operation-level servers have no 2.0 equivalent",
        );
    }

    let mut parameters: Vec<Value> = operation
        .get(constants::FIELD_PARAMETERS)
        .and_then(Value::as_array)
        .map(|items| convert_parameter_list(items, tree, location, issues))
        .unwrap_or_default();

    if let Some(body) = operation.get(constants::FIELD_REQUEST_BODY) {
        let body = resolve_ref(body, tree);
        convert_request_body(&body, &mut out, &mut parameters, location, issues);
    }

    if !parameters.is_empty() {
        out.insert(
            constants::FIELD_PARAMETERS.to_string(),
            Value::Array(parameters),
        );
    }

    if let Some(responses) = operation
        .get(constants::FIELD_RESPONSES)
        .and_then(Value::as_object)
    {
        let mut produces: Vec<String> = Vec::new();
        let mut out_responses = JsonMap::new();
        for (status, response) in responses {
            out_responses.insert(
                status.clone(),
                convert_response(
                    response,
                    tree,
                    &mut produces,
                    &format!("{location}.responses.{status}"),
                    issues,
                ),
            );
        }
        if !produces.is_empty() {
            out.insert(
                constants::FIELD_PRODUCES.to_string(),
                Value::Array(produces.into_iter().map(Value::String).collect()),
            );
        }
        out.insert(
            constants::FIELD_RESPONSES.to_string(),
            Value::Object(out_responses),
        );
    }

    for (key, value) in operation {
        if key.starts_with("x-") {
            out.insert(key.clone(), value.clone());
        }
    }
    Value::Object(out)
}

fn convert_parameter_list(
    parameters: &[Value],
    tree: &Value,
    location: &str,
    issues: &mut Issues,
) -> Vec<Value> {
    let mut out = Vec::new();
    for parameter in parameters {
        let resolved = resolve_ref(parameter, tree);
        let name = resolved
            .get(constants::FIELD_NAME)
            .and_then(Value::as_str)
            .unwrap_or("?");
        if resolved.get(constants::FIELD_IN).and_then(Value::as_str) == Some("cookie") {
            issues.critical(
                format!("{location}.parameters.{name}"),
                "cookie-parameter-dropped",
                "cookie parameters have no 2.0 equivalent",
            );
            continue;
        }
        if parameter.get(constants::FIELD_REF).is_some() {
            // Parameter refs survive; the prefix rewrite relocates them.
            out.push(parameter.clone());
        } else {
            out.push(convert_parameter(
                &resolved,
                &format!("{location}.parameters.{name}"),
                issues,
            ));
        }
    }
    out
}

fn convert_parameter(parameter: &Value, location: &str, issues: &mut Issues) -> Value {
    let Some(parameter) = parameter.as_object() else {
        return parameter.clone();
    };
    let mut out = JsonMap::new();
    for field in ["name", "in", "description", "required", "allowEmptyValue"] {
        if let Some(value) = parameter.get(field) {
            out.insert(field.to_string(), value.clone());
        }
    }

    if parameter.get(constants::FIELD_CONTENT).is_some() {
        issues.warning(
            location,
            "parameter-content-dropped",
            "content-based parameter serialization has no 2.0 equivalent; \
             falling back to type string",
        );
        out.insert("type".to_string(), Value::String("string".to_string()));
        return Value::Object(out);
    }

    if let Some(schema) = parameter.get(constants::FIELD_SCHEMA).and_then(Value::as_object) {
        for field in [
            "type",
            "format",
            "items",
            "default",
            "enum",
            "maximum",
            "exclusiveMaximum",
            "minimum",
            "exclusiveMinimum",
            "maxLength",
            "minLength",
            "pattern",
            "maxItems",
            "minItems",
            "uniqueItems",
            "multipleOf",
        ] {
            if let Some(value) = schema.get(field) {
                out.insert(field.to_string(), value.clone());
            }
        }
    }

    let style = parameter.get(constants::FIELD_STYLE).and_then(Value::as_str);
    let explode = parameter.get(constants::FIELD_EXPLODE).and_then(Value::as_bool);
    if let Some(style) = style {
        let collection_format = match (style, explode) {
            ("form", Some(true)) => Some("multi"),
            ("form", _) => Some("csv"),
            ("simple", _) => Some("csv"),
            ("spaceDelimited", _) => Some("ssv"),
            ("pipeDelimited", _) => Some("pipes"),
            (other, _) => {
                issues.warning(
                    location,
                    "style-dropped",
                    format!("parameter style '{other}' has no 2.0 equivalent"),
                );
                None
            }
        };
        if let Some(collection_format) = collection_format {
            if out.get("type").and_then(Value::as_str) == Some("array") {
                out.insert(
                    constants::FIELD_COLLECTION_FORMAT.to_string(),
                    Value::String(collection_format.to_string()),
                );
            }
        }
    }

    for (key, value) in parameter {
        if key.starts_with("x-") {
            out.insert(key.clone(), value.clone());
        }
    }
    Value::Object(out)
}

// A requestBody becomes a body parameter, or formData parameters when the
// chosen content type is a form encoding with an object schema.
fn convert_request_body(
    body: &Value,
    out: &mut JsonMap,
    parameters: &mut Vec<Value>,
    location: &str,
    issues: &mut Issues,
) {
    let Some(content) = body.get(constants::FIELD_CONTENT).and_then(Value::as_object) else {
        return;
    };
    if content.is_empty() {
        return;
    }
    let chosen = if content.contains_key(constants::CONTENT_TYPE_JSON) {
        constants::CONTENT_TYPE_JSON.to_string()
    } else {
        content.keys().next().cloned().unwrap_or_default()
    };
    if content.len() > 1 {
        issues.warning(
            format!("{location}.requestBody"),
            "multiple-content-types",
            format!(
                "request body declares {} content types; keeping '{chosen}'",
                content.len()
            ),
        );
    }
    out.insert(
        constants::FIELD_CONSUMES.to_string(),
        json!([chosen.clone()]),
    );

    let schema = content
        .get(&chosen)
        .and_then(|media| media.get(constants::FIELD_SCHEMA))
        .cloned()
        .unwrap_or_else(|| json!({}));
    let required = body.get(constants::FIELD_REQUIRED).cloned();

    let is_form = chosen == constants::CONTENT_TYPE_FORM || chosen == constants::CONTENT_TYPE_MULTIPART;
    if is_form {
        if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
            let required_names: Vec<&str> = schema
                .get("required")
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();
            for (name, property) in properties {
                let mut parameter = JsonMap::new();
                parameter.insert("name".to_string(), Value::String(name.clone()));
                parameter.insert("in".to_string(), Value::String("formData".to_string()));
                if required_names.contains(&name.as_str()) {
                    parameter.insert("required".to_string(), Value::Bool(true));
                }
                let is_binary = property.get("type").and_then(Value::as_str) == Some("string")
                    && property.get("format").and_then(Value::as_str) == Some("binary");
                if is_binary {
                    parameter.insert("type".to_string(), Value::String("file".to_string()));
                } else {
                    for field in ["type", "format", "items", "default", "enum"] {
                        if let Some(value) = property.get(field) {
                            parameter.insert(field.to_string(), value.clone());
                        }
                    }
                }
                parameters.push(Value::Object(parameter));
            }
            issues.info(
                format!("{location}.requestBody"),
                "request-body-to-form-data",
                "form request body expanded into formData parameters",
            );
            return;
        }
    }

    let mut parameter = JsonMap::new();
    parameter.insert("name".to_string(), Value::String("body".to_string()));
    parameter.insert("in".to_string(), Value::String("body".to_string()));
    if let Some(description) = body.get("description") {
        parameter.insert("description".to_string(), description.clone());
    }
    if let Some(required) = required {
        parameter.insert("required".to_string(), required);
    }
    parameter.insert(constants::FIELD_SCHEMA.to_string(), schema);
    parameters.push(Value::Object(parameter));
}

fn convert_response(
    response: &Value,
    tree: &Value,
    produces: &mut Vec<String>,
    location: &str,
    issues: &mut Issues,
) -> Value {
    if response.get(constants::FIELD_REF).is_some() {
        return response.clone();
    }
    let resolved = resolve_ref(response, tree);
    let Some(response) = resolved.as_object() else {
        return resolved.clone();
    };
    let mut out = JsonMap::new();
    if let Some(description) = response.get("description") {
        out.insert("description".to_string(), description.clone());
    }
    if !response
        .get("links")
        .and_then(Value::as_object)
        .is_none_or(serde_json::Map::is_empty)
    {
        issues.critical(
            location,
            "links-dropped",
            "response links have no 2.0 equivalent",
        );
    }

    if let Some(content) = response.get(constants::FIELD_CONTENT).and_then(Value::as_object) {
        if !content.is_empty() {
            let chosen = if content.contains_key(constants::CONTENT_TYPE_JSON) {
                constants::CONTENT_TYPE_JSON.to_string()
            } else {
                content.keys().next().cloned().unwrap_or_default()
            };
            if content.len() > 1 {
                issues.warning(
                    location,
                    "multiple-content-types",
                    format!(
                        "response declares {} content types; keeping '{chosen}'",
                        content.len()
                    ),
                );
            }
            if !produces.contains(&chosen) {
                produces.push(chosen.clone());
            }
            if let Some(media) = content.get(&chosen).and_then(Value::as_object) {
                if let Some(schema) = media.get(constants::FIELD_SCHEMA) {
                    out.insert(constants::FIELD_SCHEMA.to_string(), schema.clone());
                }
                if let Some(example) = media.get("example") {
                    out.insert("examples".to_string(), json!({ chosen: example.clone() }));
                }
            }
        }
    }

    if let Some(headers) = response.get("headers").and_then(Value::as_object) {
        let mut out_headers = JsonMap::new();
        for (name, header) in headers {
            let header = resolve_ref(header, tree);
            let mut out_header = JsonMap::new();
            if let Some(description) = header.get("description") {
                out_header.insert("description".to_string(), description.clone());
            }
            if let Some(schema) = header.get(constants::FIELD_SCHEMA).and_then(Value::as_object) {
                for field in ["type", "format", "items", "default", "enum"] {
                    if let Some(value) = schema.get(field) {
                        out_header.insert(field.to_string(), value.clone());
                    }
                }
            }
            out_headers.insert(name.clone(), Value::Object(out_header));
        }
        out.insert("headers".to_string(), Value::Object(out_headers));
    }

    for (key, value) in response {
        if key.starts_with("x-") {
            out.insert(key.clone(), value.clone());
        }
    }
    Value::Object(out)
}

fn convert_components(root: &JsonMap, out: &mut JsonMap, issues: &mut Issues) {
    let Some(components) = root
        .get(constants::FIELD_COMPONENTS)
        .and_then(Value::as_object)
    else {
        return;
    };

    if let Some(schemas) = components
        .get(constants::BUCKET_SCHEMAS)
        .and_then(Value::as_object)
    {
        out.insert(
            constants::FIELD_DEFINITIONS.to_string(),
            Value::Object(schemas.clone()),
        );
    }

    if let Some(parameters) = components
        .get(constants::BUCKET_PARAMETERS)
        .and_then(Value::as_object)
    {
        let mut out_params = JsonMap::new();
        for (name, parameter) in parameters {
            let location = format!("components.parameters.{name}");
            if parameter.get(constants::FIELD_IN).and_then(Value::as_str) == Some("cookie") {
                issues.critical(
                    &location,
                    "cookie-parameter-dropped",
                    "cookie parameters have no 2.0 equivalent",
                );
                continue;
            }
            out_params.insert(name.clone(), convert_parameter(parameter, &location, issues));
        }
        if !out_params.is_empty() {
            out.insert(constants::FIELD_PARAMETERS.to_string(), Value::Object(out_params));
        }
    }

    if let Some(responses) = components
        .get(constants::BUCKET_RESPONSES)
        .and_then(Value::as_object)
    {
        let mut produces = Vec::new();
        let mut out_responses = JsonMap::new();
        let tree = Value::Object(root.clone());
        for (name, response) in responses {
            out_responses.insert(
                name.clone(),
                convert_response(
                    response,
                    &tree,
                    &mut produces,
                    &format!("components.responses.{name}"),
                    issues,
                ),
            );
        }
        out.insert(
            constants::FIELD_RESPONSES.to_string(),
            Value::Object(out_responses),
        );
    }

    if let Some(bodies) = components
        .get(constants::BUCKET_REQUEST_BODIES)
        .and_then(Value::as_object)
    {
        for name in bodies.keys() {
            issues.info(
                format!("components.requestBodies.{name}"),
                "request-body-inlined",
                "reusable request body inlined at its operations",
            );
        }
    }
    for (bucket, severity_critical) in [("links", true), ("callbacks", true), ("examples", false)] {
        if let Some(entries) = components.get(bucket).and_then(Value::as_object) {
            for name in entries.keys() {
                let location = format!("components.{bucket}.{name}");
                if severity_critical {
                    issues.critical(
                        location,
                        format!("{bucket}-dropped"),
                        format!("{bucket} have no 2.0 equivalent"),
                    );
                } else {
                    issues.info(
                        location,
                        format!("{bucket}-dropped"),
                        format!("component {bucket} have no 2.0 equivalent"),
                    );
                }
            }
        }
    }

    if let Some(schemes) = components
        .get(constants::BUCKET_SECURITY_SCHEMES)
        .and_then(Value::as_object)
    {
        let mut out_schemes = JsonMap::new();
        for (name, scheme) in schemes {
            let location = format!("components.securitySchemes.{name}");
            if let Some(converted) = convert_security_scheme(scheme, &location, issues) {
                out_schemes.insert(name.clone(), converted);
            }
        }
        if !out_schemes.is_empty() {
            out.insert(
                constants::FIELD_SECURITY_DEFINITIONS.to_string(),
                Value::Object(out_schemes),
            );
        }
    }
}

fn convert_security_scheme(
    scheme: &Value,
    location: &str,
    issues: &mut Issues,
) -> Option<Value> {
    let map = scheme.as_object()?;
    let scheme_type = map
        .get(constants::FIELD_TYPE)
        .and_then(Value::as_str)
        .unwrap_or_default();
    let mut out = JsonMap::new();
    if let Some(description) = map.get("description") {
        out.insert("description".to_string(), description.clone());
    }
    match scheme_type {
        constants::SCHEME_TYPE_HTTP => {
            match map.get("scheme").and_then(Value::as_str) {
                Some(constants::HTTP_SCHEME_BASIC) => {
                    out.insert("type".to_string(), Value::String("basic".to_string()));
                }
                Some(constants::HTTP_SCHEME_BEARER) => {
                    issues.warning(
                        location,
                        "bearer-as-apikey",
                        "http/bearer converted to an apiKey Authorization header",
                    );
                    out.insert("type".to_string(), Value::String("apiKey".to_string()));
                    out.insert(
                        "name".to_string(),
                        Value::String(constants::HEADER_AUTHORIZATION.to_string()),
                    );
                    out.insert("in".to_string(), Value::String("header".to_string()));
                }
                other => {
                    issues.critical(
                        location,
                        "http-scheme-dropped",
                        format!("http scheme '{}' has no 2.0 equivalent", other.unwrap_or("?")),
                    );
                    return None;
                }
            }
        }
        constants::SCHEME_TYPE_API_KEY => {
            if map.get(constants::FIELD_IN).and_then(Value::as_str) == Some("cookie") {
                issues.critical(
                    location,
                    "cookie-apikey-dropped",
                    "cookie apiKey schemes have no 2.0 equivalent",
                );
                return None;
            }
            out.insert("type".to_string(), Value::String("apiKey".to_string()));
            for field in ["name", "in"] {
                if let Some(value) = map.get(field) {
                    out.insert(field.to_string(), value.clone());
                }
            }
        }
        constants::SCHEME_TYPE_OAUTH2 => {
            out.insert("type".to_string(), Value::String("oauth2".to_string()));
            let flows = map.get("flows").and_then(Value::as_object)?;
            let order = [
                ("implicit", "implicit"),
                ("password", "password"),
                ("clientCredentials", "application"),
                ("authorizationCode", "accessCode"),
            ];
            let mut first: Option<(&str, &Value)> = None;
            for (v3_name, _) in order {
                if let Some(flow) = flows.get(v3_name) {
                    if first.is_none() {
                        first = Some((v3_name, flow));
                    } else {
                        issues.warning(
                            location,
                            "oauth-flow-dropped",
                            format!("additional oauth2 flow '{v3_name}' dropped; 2.0 supports one"),
                        );
                    }
                }
            }
            let (v3_name, flow) = first?;
            let v2_name = order
                .iter()
                .find(|(v3, _)| *v3 == v3_name)
                .map(|(_, v2)| *v2)
                .unwrap_or("implicit");
            if v2_name != v3_name {
                issues.info(
                    location,
                    "oauth-flow-renamed",
                    format!("oauth2 flow '{v3_name}' renamed to '{v2_name}'"),
                );
            }
            out.insert("flow".to_string(), Value::String(v2_name.to_string()));
            for field in ["authorizationUrl", "tokenUrl"] {
                if let Some(value) = flow.get(field) {
                    out.insert(field.to_string(), value.clone());
                }
            }
            out.insert(
                "scopes".to_string(),
                flow.get("scopes").cloned().unwrap_or_else(|| json!({})),
            );
        }
        other => {
            issues.critical(
                location,
                "security-scheme-dropped",
                format!("security scheme type '{other}' has no 2.0 equivalent"),
            );
            return None;
        }
    }
    for (key, value) in map {
        if key.starts_with("x-") {
            out.insert(key.clone(), value.clone());
        }
    }
    Some(Value::Object(out))
}

fn downgrade_schema_node(schema: &mut JsonMap, location: &str, issues: &mut Issues) {
    // 3.1 type arrays fold back to a single type.
    if let Some(Value::Array(types)) = schema.get(constants::FIELD_TYPE) {
        let non_null: Vec<String> = types
            .iter()
            .filter_map(Value::as_str)
            .filter(|name| *name != "null")
            .map(ToString::to_string)
            .collect();
        if non_null.len() > 1 {
            issues.critical(
                location,
                "type-array",
                format!(
                    "type array [{}] has no 2.0 equivalent; keeping '{}'",
                    non_null.join(", "),
                    non_null[0]
                ),
            );
        }
        if types.iter().any(|name| name.as_str() == Some("null")) {
            issues.warning(
                location,
                "nullable-dropped",
                "null type has no 2.0 equivalent",
            );
        }
        match non_null.first() {
            Some(first) => {
                schema.insert(
                    constants::FIELD_TYPE.to_string(),
                    Value::String(first.clone()),
                );
            }
            None => {
                schema.remove(constants::FIELD_TYPE);
            }
        }
    }

    if schema.remove(constants::FIELD_NULLABLE).is_some() {
        issues.warning(
            location,
            "nullable-dropped",
            "nullable has no 2.0 equivalent",
        );
    }

    for keyword in ["oneOf", "anyOf", "not"] {
        if schema.remove(keyword).is_some() {
            issues.critical(
                location,
                "unsupported-keyword",
                format!("schema keyword '{keyword}' has no 2.0 equivalent"),
            );
        }
    }

    if let Some(constant) = schema.remove("const") {
        issues.info(
            location,
            "const-to-enum",
            "const converted to a single-value enum",
        );
        schema.insert("enum".to_string(), Value::Array(vec![constant]));
    }

    for keyword in ["prefixItems", "unevaluatedProperties", "$comment", "writeOnly"] {
        if schema.remove(keyword).is_some() {
            issues.warning(
                location,
                "keyword-dropped",
                format!("schema keyword '{keyword}' has no 2.0 equivalent"),
            );
        }
    }

    // 3.1 numeric exclusive bounds fold back to boolean + bound.
    for (exclusive, bound) in [("exclusiveMinimum", "minimum"), ("exclusiveMaximum", "maximum")] {
        if let Some(Value::Number(number)) = schema.get(exclusive) {
            let number = number.clone();
            issues.info(
                location,
                "exclusive-bound",
                format!("numeric {exclusive} converted to boolean form"),
            );
            schema.insert(bound.to_string(), Value::Number(number));
            schema.insert(exclusive.to_string(), Value::Bool(true));
        }
    }
}

fn resolve_ref(value: &Value, tree: &Value) -> Value {
    value
        .get(constants::FIELD_REF)
        .and_then(Value::as_str)
        .and_then(|target| resolve_pointer(tree, target))
        .cloned()
        .unwrap_or_else(|| value.clone())
}

#[cfg(test)]
mod tests {
    use crate::convert::{Converter, IssueSeverity};
    use crate::model::OASVersion;
    use crate::parser::parse_str;
    use serde_json::json;

    const PETSTORE_30: &str = r"
openapi: 3.0.3
info: {title: Petstore, version: 1.0.0}
servers:
  - url: https://api.petstore.io/v1
  - url: https://backup.petstore.io/v1
paths:
  /pets:
    post:
      operationId: createPet
      requestBody:
        required: true
        content:
          application/json:
            schema:
              $ref: '#/components/schemas/NewPet'
          application/xml:
            schema:
              $ref: '#/components/schemas/NewPet'
      responses:
        '201':
          description: created
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Pet'
components:
  schemas:
    NewPet:
      type: object
      properties:
        name: {type: string}
    Pet:
      type: object
      properties:
        id: {type: integer}
";

    #[test]
    fn test_downgrade_servers_and_body() {
        let input = parse_str(PETSTORE_30).unwrap();
        let result = Converter::new(OASVersion::V2_0).convert(&input).unwrap();

        assert_eq!(result.data["swagger"], "2.0");
        assert_eq!(result.data["host"], "api.petstore.io");
        assert_eq!(result.data["basePath"], "/v1");
        assert_eq!(result.data["schemes"], json!(["https"]));
        assert!(result
            .issues
            .iter()
            .any(|i| i.code == "server-dropped" && i.severity == IssueSeverity::Warning));

        let post = &result.data["paths"]["/pets"]["post"];
        assert_eq!(post["consumes"], json!(["application/json"]));
        let body = &post["parameters"][0];
        assert_eq!(body["in"], "body");
        assert_eq!(body["schema"]["$ref"], "#/definitions/NewPet");
        assert!(result.issues.iter().any(|i| i.code == "multiple-content-types"));

        assert_eq!(
            post["responses"]["201"]["schema"]["$ref"],
            "#/definitions/Pet"
        );
        assert_eq!(post["produces"], json!(["application/json"]));
        assert!(result.data["definitions"].get("Pet").is_some());
        assert!(result.data.get("components").is_none());
    }

    #[test]
    fn test_downgrade_drops_webhooks_and_trace() {
        let spec = r"
openapi: 3.1.0
info: {title: T, version: '1'}
paths:
  /debug:
    trace:
      responses:
        '200': {description: ok}
webhooks:
  newPet:
    post:
      responses:
        '200': {description: ok}
";
        let input = parse_str(spec).unwrap();
        let result = Converter::new(OASVersion::V2_0).convert(&input).unwrap();
        assert!(result
            .issues
            .iter()
            .any(|i| i.code == "webhooks-dropped" && i.severity == IssueSeverity::Critical));
        assert!(result
            .issues
            .iter()
            .any(|i| i.code == "trace-dropped" && i.severity == IssueSeverity::Critical));
        assert!(result.data["paths"]["/debug"].get("trace").is_none());
        assert_eq!(result.exit_code(), 1);
    }

    #[test]
    fn test_downgrade_type_arrays_and_bearer() {
        let spec = r#"
openapi: 3.1.0
info: {title: T, version: '1'}
paths: {}
components:
  schemas:
    Flexible:
      type: ["string", "null"]
  securitySchemes:
    auth:
      type: http
      scheme: bearer
"#;
        let input = parse_str(spec).unwrap();
        let result = Converter::new(OASVersion::V2_0).convert(&input).unwrap();
        assert_eq!(result.data["definitions"]["Flexible"]["type"], "string");
        let auth = &result.data["securityDefinitions"]["auth"];
        assert_eq!(auth["type"], "apiKey");
        assert_eq!(auth["name"], "Authorization");
        assert!(result.issues.iter().any(|i| i.code == "bearer-as-apikey"));
    }

    #[test]
    fn test_downgrade_form_request_body() {
        let spec = r"
openapi: 3.0.3
info: {title: T, version: '1'}
paths:
  /upload:
    post:
      requestBody:
        content:
          multipart/form-data:
            schema:
              type: object
              required: [label]
              properties:
                label: {type: string}
                payload: {type: string, format: binary}
      responses:
        '200': {description: ok}
";
        let input = parse_str(spec).unwrap();
        let result = Converter::new(OASVersion::V2_0).convert(&input).unwrap();
        let params = result.data["paths"]["/upload"]["post"]["parameters"]
            .as_array()
            .unwrap();
        let label = params.iter().find(|p| p["name"] == "label").unwrap();
        let payload = params.iter().find(|p| p["name"] == "payload").unwrap();
        assert_eq!(label["in"], "formData");
        assert_eq!(label["required"], true);
        assert_eq!(payload["type"], "file");
    }
}
