//! Swagger 2.0 to OpenAPI 3.x.

use super::{for_each_schema_v3, Issues, JsonMap};
use crate::constants;
use crate::error::Error;
use crate::model::OASVersion;
use crate::refs;
use crate::value::resolve_pointer;
use serde_json::{json, Value};

pub(super) fn convert(tree: &Value, target: OASVersion, issues: &mut Issues) -> Result<Value, Error> {
    let root = tree
        .as_object()
        .ok_or_else(|| Error::structural("document root is not a map"))?;

    let mut out = JsonMap::new();
    out.insert(
        constants::FIELD_OPENAPI.to_string(),
        Value::String(target.as_str().to_string()),
    );
    if let Some(info) = root.get(constants::FIELD_INFO) {
        out.insert(constants::FIELD_INFO.to_string(), info.clone());
    }

    build_servers(root, &mut out, issues);

    let global_consumes = string_list(root.get(constants::FIELD_CONSUMES));
    let global_produces = string_list(root.get(constants::FIELD_PRODUCES));

    if let Some(paths) = root.get(constants::FIELD_PATHS).and_then(Value::as_object) {
        let mut new_paths = JsonMap::new();
        for (template, item) in paths {
            new_paths.insert(
                template.clone(),
                convert_path_item(
                    item,
                    template,
                    tree,
                    &global_consumes,
                    &global_produces,
                    issues,
                ),
            );
        }
        out.insert(constants::FIELD_PATHS.to_string(), Value::Object(new_paths));
    }

    let components = build_components(root, &global_consumes, &global_produces, issues);
    if !components.is_empty() {
        out.insert(
            constants::FIELD_COMPONENTS.to_string(),
            Value::Object(components),
        );
    }

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

    // Every moved bucket gets its references relocated.
    refs::rewrite_ref_prefix(
        &mut out,
        constants::REF_PREFIX_DEFINITIONS,
        "#/components/schemas/",
    );
    refs::rewrite_ref_prefix(
        &mut out,
        constants::REF_PREFIX_V2_PARAMETERS,
        "#/components/parameters/",
    );
    refs::rewrite_ref_prefix(
        &mut out,
        constants::REF_PREFIX_V2_RESPONSES,
        "#/components/responses/",
    );

    // `type: file` has no 3.x equivalent; binary strings replace it.
    for_each_schema_v3(&mut out, &mut |schema, location| {
        rewrite_file_type(schema, location, issues);
    });

    Ok(out)
}

fn build_servers(root: &JsonMap, out: &mut JsonMap, issues: &mut Issues) {
    let host = root.get(constants::FIELD_HOST).and_then(Value::as_str);
    let base_path = root
        .get(constants::FIELD_BASE_PATH)
        .and_then(Value::as_str)
        .unwrap_or("");
    let schemes = string_list(root.get(constants::FIELD_SCHEMES));

    if let Some(host) = host {
        let schemes = if schemes.is_empty() {
            issues.info(
                "servers",
                "default-scheme",
                "no schemes declared; defaulting to https",
            );
            vec!["https".to_string()]
        } else {
            schemes
        };
        let servers: Vec<Value> = schemes
            .iter()
            .map(|scheme| json!({"url": format!("{scheme}://{host}{base_path}")}))
            .collect();
        issues.info(
            "servers",
            "servers-built",
            format!(
                "built {} server(s) from host/basePath/schemes",
                servers.len()
            ),
        );
        out.insert(constants::FIELD_SERVERS.to_string(), Value::Array(servers));
    } else if !base_path.is_empty() {
        issues.info(
            "servers",
            "servers-built",
            "built relative server from basePath (no host declared)",
        );
        out.insert(
            constants::FIELD_SERVERS.to_string(),
            json!([{"url": base_path}]),
        );
    }
}

fn build_components(
    root: &JsonMap,
    global_consumes: &[String],
    global_produces: &[String],
    issues: &mut Issues,
) -> JsonMap {
    let mut components = JsonMap::new();

    if let Some(definitions) = root
        .get(constants::FIELD_DEFINITIONS)
        .and_then(Value::as_object)
    {
        components.insert(
            constants::BUCKET_SCHEMAS.to_string(),
            Value::Object(definitions.clone()),
        );
    }

    if let Some(parameters) = root
        .get(constants::FIELD_PARAMETERS)
        .and_then(Value::as_object)
    {
        let mut out_params = JsonMap::new();
        let mut out_bodies = JsonMap::new();
        for (name, parameter) in parameters {
            let location = format!("parameters.{name}");
            match parameter_kind(parameter) {
                ParamKind::Body => {
                    out_bodies.insert(
                        name.clone(),
                        body_param_to_request_body(parameter, global_consumes, &location, issues),
                    );
                    issues.info(
                        &location,
                        "body-parameter-relocated",
                        "component body parameter moved to components.requestBodies",
                    );
                }
                ParamKind::FormData => {
                    issues.warning(
                        &location,
                        "form-data-component-dropped",
                        "component formData parameter has no 3.x equivalent; \
                         occurrences were inlined at their operations",
                    );
                }
                ParamKind::Regular => {
                    out_params.insert(name.clone(), convert_parameter(parameter, &location, issues));
                }
            }
        }
        if !out_params.is_empty() {
            components.insert(
                constants::BUCKET_PARAMETERS.to_string(),
                Value::Object(out_params),
            );
        }
        if !out_bodies.is_empty() {
            components.insert(
                constants::BUCKET_REQUEST_BODIES.to_string(),
                Value::Object(out_bodies),
            );
        }
    }

    if let Some(responses) = root
        .get(constants::FIELD_RESPONSES)
        .and_then(Value::as_object)
    {
        let mut out_responses = JsonMap::new();
        for (name, response) in responses {
            out_responses.insert(
                name.clone(),
                convert_response(
                    response,
                    global_produces,
                    &format!("responses.{name}"),
                    issues,
                ),
            );
        }
        components.insert(
            constants::BUCKET_RESPONSES.to_string(),
            Value::Object(out_responses),
        );
    }

    if let Some(schemes) = root
        .get(constants::FIELD_SECURITY_DEFINITIONS)
        .and_then(Value::as_object)
    {
        let mut out_schemes = JsonMap::new();
        for (name, scheme) in schemes {
            out_schemes.insert(
                name.clone(),
                convert_security_scheme(scheme, &format!("securityDefinitions.{name}"), issues),
            );
        }
        components.insert(
            constants::BUCKET_SECURITY_SCHEMES.to_string(),
            Value::Object(out_schemes),
        );
    }

    components
}

fn convert_path_item(
    item: &Value,
    template: &str,
    tree: &Value,
    global_consumes: &[String],
    global_produces: &[String],
    issues: &mut Issues,
) -> Value {
    let Some(item) = item.as_object() else {
        return item.clone();
    };
    let mut out = JsonMap::new();
    if let Some(target) = item.get(constants::FIELD_REF) {
        out.insert(constants::FIELD_REF.to_string(), target.clone());
    }

    // Path-level body/formData parameters are hoisted into each operation.
    let mut path_regular: Vec<Value> = Vec::new();
    let mut hoisted: Vec<Value> = Vec::new();
    for parameter in param_list(item) {
        let resolved = resolve_param_ref(parameter, tree);
        match parameter_kind(&resolved) {
            ParamKind::Body | ParamKind::FormData => hoisted.push(resolved),
            ParamKind::Regular => path_regular.push(parameter.clone()),
        }
    }
    if !path_regular.is_empty() {
        let location = format!("paths.{template}.parameters");
        let converted: Vec<Value> = path_regular
            .iter()
            .map(|parameter| {
                if parameter.get(constants::FIELD_REF).is_some() {
                    parameter.clone()
                } else {
                    convert_parameter(parameter, &location, issues)
                }
            })
            .collect();
        out.insert(
            constants::FIELD_PARAMETERS.to_string(),
            Value::Array(converted),
        );
    }

    for method in constants::HTTP_METHODS_V2 {
        if let Some(operation) = item.get(*method).and_then(Value::as_object) {
            out.insert(
                (*method).to_string(),
                convert_operation(
                    operation,
                    &hoisted,
                    tree,
                    global_consumes,
                    global_produces,
                    &format!("paths.{template}.{method}"),
                    issues,
                ),
            );
        }
    }

    for (key, value) in item {
        if key.starts_with("x-") {
            out.insert(key.clone(), value.clone());
        }
    }
    Value::Object(out)
}

#[allow(clippy::too_many_lines)]
fn convert_operation(
    operation: &JsonMap,
    hoisted: &[Value],
    tree: &Value,
    global_consumes: &[String],
    global_produces: &[String],
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

    let consumes = {
        let own = string_list(operation.get(constants::FIELD_CONSUMES));
        if own.is_empty() {
            global_consumes.to_vec()
        } else {
            own
        }
    };
    let produces = {
        let own = string_list(operation.get(constants::FIELD_PRODUCES));
        if own.is_empty() {
            global_produces.to_vec()
        } else {
            own
        }
    };

    // Body and formData parameters become the request body; everything
    // else stays a parameter. References to regular parameters stay
    // references (the prefix rewrite points them at components.parameters);
    // references to body/formData parameters are resolved inline.
    let mut body_param: Option<Value> = None;
    let mut form_params: Vec<Value> = Vec::new();
    let mut converted: Vec<Value> = Vec::new();
    for raw in hoisted
        .iter()
        .chain(param_list(operation).into_iter())
    {
        let resolved = resolve_param_ref(raw, tree);
        match parameter_kind(&resolved) {
            ParamKind::Body => {
                if raw.get(constants::FIELD_REF).is_some() {
                    issues.info(
                        location,
                        "body-parameter-inlined",
                        "body parameter reference resolved inline",
                    );
                }
                if body_param.is_some() {
                    issues.warning(
                        location,
                        "multiple-body-parameters",
                        "more than one body parameter declared; keeping the first",
                    );
                } else {
                    body_param = Some(resolved);
                }
            }
            ParamKind::FormData => {
                if raw.get(constants::FIELD_REF).is_some() {
                    issues.info(
                        location,
                        "form-data-parameter-inlined",
                        "formData parameter reference resolved inline",
                    );
                }
                form_params.push(resolved);
            }
            ParamKind::Regular => {
                if raw.get(constants::FIELD_REF).is_some() {
                    converted.push((*raw).clone());
                } else {
                    converted.push(convert_parameter(raw, location, issues));
                }
            }
        }
    }
    if !converted.is_empty() {
        out.insert(
            constants::FIELD_PARAMETERS.to_string(),
            Value::Array(converted),
        );
    }

    if let Some(body) = &body_param {
        if !form_params.is_empty() {
            issues.warning(
                location,
                "body-and-form-data",
                "operation declares both body and formData parameters; formData dropped",
            );
        }
        out.insert(
            constants::FIELD_REQUEST_BODY.to_string(),
            body_param_to_request_body(body, &consumes, location, issues),
        );
    } else if !form_params.is_empty() {
        out.insert(
            constants::FIELD_REQUEST_BODY.to_string(),
            form_params_to_request_body(&form_params, &consumes, location, issues),
        );
    }

    if let Some(responses) = operation
        .get(constants::FIELD_RESPONSES)
        .and_then(Value::as_object)
    {
        let mut out_responses = JsonMap::new();
        for (status, response) in responses {
            out_responses.insert(
                status.clone(),
                convert_response(
                    response,
                    &produces,
                    &format!("{location}.responses.{status}"),
                    issues,
                ),
            );
        }
        out.insert(
            constants::FIELD_RESPONSES.to_string(),
            Value::Object(out_responses),
        );
    }

    if operation.get(constants::FIELD_SCHEMES).is_some() {
        issues.info(
            location,
            "operation-schemes-dropped",
            "operation-level schemes have no 3.x equivalent",
        );
    }
    for (key, value) in operation {
        if key.starts_with("x-") {
            out.insert(key.clone(), value.clone());
        }
    }
    Value::Object(out)
}

fn body_param_to_request_body(
    parameter: &Value,
    consumes: &[String],
    location: &str,
    issues: &mut Issues,
) -> Value {
    let mut out = JsonMap::new();
    if let Some(description) = parameter.get("description") {
        out.insert("description".to_string(), description.clone());
    }
    if let Some(required) = parameter.get(constants::FIELD_REQUIRED) {
        out.insert(constants::FIELD_REQUIRED.to_string(), required.clone());
    }
    let schema = parameter
        .get(constants::FIELD_SCHEMA)
        .cloned()
        .unwrap_or_else(|| json!({}));
    let media_types = effective_media_types(consumes, location, issues);
    let mut content = JsonMap::new();
    for media in media_types {
        content.insert(media, json!({"schema": schema.clone()}));
    }
    out.insert(constants::FIELD_CONTENT.to_string(), Value::Object(content));
    Value::Object(out)
}

fn form_params_to_request_body(
    form_params: &[Value],
    consumes: &[String],
    location: &str,
    issues: &mut Issues,
) -> Value {
    let mut properties = JsonMap::new();
    let mut required: Vec<Value> = Vec::new();
    let has_file = form_params
        .iter()
        .any(|p| p.get(constants::FIELD_TYPE).and_then(Value::as_str) == Some("file"));
    for parameter in form_params {
        let Some(name) = parameter.get(constants::FIELD_NAME).and_then(Value::as_str) else {
            continue;
        };
        let mut schema = inline_type_to_schema(parameter);
        if let Some(map) = schema.as_object_mut() {
            rewrite_file_type(map, &format!("{location}.{name}"), issues);
        }
        properties.insert(name.to_string(), schema);
        if parameter.get(constants::FIELD_REQUIRED) == Some(&Value::Bool(true)) {
            required.push(Value::String(name.to_string()));
        }
    }
    let mut schema = JsonMap::new();
    schema.insert("type".to_string(), Value::String("object".to_string()));
    schema.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".to_string(), Value::Array(required));
    }

    let media = if consumes.iter().any(|c| c == constants::CONTENT_TYPE_MULTIPART) || has_file {
        constants::CONTENT_TYPE_MULTIPART
    } else {
        constants::CONTENT_TYPE_FORM
    };
    issues.info(
        location,
        "form-data-to-request-body",
        format!("formData parameters converted to a {media} request body"),
    );
    json!({
        "content": { media: {"schema": Value::Object(schema)} }
    })
}

fn convert_parameter(parameter: &Value, location: &str, issues: &mut Issues) -> Value {
    let Some(parameter) = parameter.as_object() else {
        return parameter.clone();
    };
    let mut out = JsonMap::new();
    for field in [
        "name",
        "in",
        "description",
        "required",
        "allowEmptyValue",
        "deprecated",
    ] {
        if let Some(value) = parameter.get(field) {
            out.insert(field.to_string(), value.clone());
        }
    }

    let mut schema = inline_type_to_schema(&Value::Object(parameter.clone()));
    if let Some(map) = schema.as_object_mut() {
        rewrite_file_type(map, location, issues);
    }
    if schema.as_object().is_some_and(|map| !map.is_empty()) {
        out.insert(constants::FIELD_SCHEMA.to_string(), schema);
    }

    if let Some(collection_format) = parameter
        .get(constants::FIELD_COLLECTION_FORMAT)
        .and_then(Value::as_str)
    {
        let in_location = parameter
            .get(constants::FIELD_IN)
            .and_then(Value::as_str)
            .unwrap_or("query");
        match collection_format {
            "csv" => {
                if in_location == "query" {
                    out.insert("style".to_string(), Value::String("form".to_string()));
                    out.insert("explode".to_string(), Value::Bool(false));
                } else {
                    out.insert("style".to_string(), Value::String("simple".to_string()));
                }
            }
            "ssv" => {
                out.insert(
                    "style".to_string(),
                    Value::String("spaceDelimited".to_string()),
                );
            }
            "pipes" => {
                out.insert(
                    "style".to_string(),
                    Value::String("pipeDelimited".to_string()),
                );
            }
            "multi" => {
                out.insert("style".to_string(), Value::String("form".to_string()));
                out.insert("explode".to_string(), Value::Bool(true));
            }
            "tsv" => {
                issues.critical(
                    location,
                    "collection-format-tsv",
                    "collectionFormat 'tsv' has no 3.x serialization equivalent",
                );
            }
            other => {
                issues.warning(
                    location,
                    "collection-format-unknown",
                    format!("unknown collectionFormat '{other}' dropped"),
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

fn convert_response(
    response: &Value,
    produces: &[String],
    location: &str,
    issues: &mut Issues,
) -> Value {
    let Some(response) = response.as_object() else {
        return response.clone();
    };
    if response.contains_key(constants::FIELD_REF) {
        return Value::Object(response.clone());
    }
    let mut out = JsonMap::new();
    if let Some(description) = response.get("description") {
        out.insert("description".to_string(), description.clone());
    }

    if let Some(schema) = response.get(constants::FIELD_SCHEMA) {
        let media_types = effective_media_types(produces, location, issues);
        let examples = response.get("examples").and_then(Value::as_object);
        let mut content = JsonMap::new();
        for media in media_types {
            let mut entry = JsonMap::new();
            entry.insert("schema".to_string(), schema.clone());
            if let Some(example) = examples.and_then(|map| map.get(&media)) {
                entry.insert("example".to_string(), example.clone());
            }
            content.insert(media, Value::Object(entry));
        }
        out.insert(constants::FIELD_CONTENT.to_string(), Value::Object(content));
    }

    if let Some(headers) = response.get("headers").and_then(Value::as_object) {
        let mut out_headers = JsonMap::new();
        for (name, header) in headers {
            let mut out_header = JsonMap::new();
            if let Some(description) = header.get("description") {
                out_header.insert("description".to_string(), description.clone());
            }
            let schema = inline_type_to_schema(header);
            if schema.as_object().is_some_and(|map| !map.is_empty()) {
                out_header.insert(constants::FIELD_SCHEMA.to_string(), schema);
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

fn convert_security_scheme(scheme: &Value, location: &str, issues: &mut Issues) -> Value {
    let Some(scheme) = scheme.as_object() else {
        return scheme.clone();
    };
    let scheme_type = scheme
        .get(constants::FIELD_TYPE)
        .and_then(Value::as_str)
        .unwrap_or_default();
    let description = scheme.get("description").cloned();
    let mut out = JsonMap::new();
    match scheme_type {
        constants::SCHEME_TYPE_BASIC => {
            out.insert("type".to_string(), Value::String("http".to_string()));
            out.insert("scheme".to_string(), Value::String("basic".to_string()));
            issues.info(
                location,
                "basic-to-http",
                "basic security converted to http/basic",
            );
        }
        constants::SCHEME_TYPE_API_KEY => {
            out.insert("type".to_string(), Value::String("apiKey".to_string()));
            for field in ["name", "in"] {
                if let Some(value) = scheme.get(field) {
                    out.insert(field.to_string(), value.clone());
                }
            }
        }
        constants::SCHEME_TYPE_OAUTH2 => {
            out.insert("type".to_string(), Value::String("oauth2".to_string()));
            let flow = scheme.get("flow").and_then(Value::as_str).unwrap_or_default();
            let scopes = scheme.get("scopes").cloned().unwrap_or_else(|| json!({}));
            let authorization_url = scheme.get("authorizationUrl").cloned();
            let token_url = scheme.get("tokenUrl").cloned();
            let (flow_name, mut flow_map): (&str, JsonMap) = match flow {
                "implicit" => ("implicit", JsonMap::new()),
                "password" => ("password", JsonMap::new()),
                "application" => {
                    issues.info(
                        location,
                        "oauth-flow-renamed",
                        "oauth2 flow 'application' renamed to 'clientCredentials'",
                    );
                    ("clientCredentials", JsonMap::new())
                }
                "accessCode" => {
                    issues.info(
                        location,
                        "oauth-flow-renamed",
                        "oauth2 flow 'accessCode' renamed to 'authorizationCode'",
                    );
                    ("authorizationCode", JsonMap::new())
                }
                other => {
                    issues.warning(
                        location,
                        "oauth-flow-unknown",
                        format!("unknown oauth2 flow '{other}'; defaulting to implicit"),
                    );
                    ("implicit", JsonMap::new())
                }
            };
            if matches!(flow_name, "implicit" | "authorizationCode") {
                if let Some(url) = authorization_url {
                    flow_map.insert("authorizationUrl".to_string(), url);
                }
            }
            if matches!(flow_name, "password" | "clientCredentials" | "authorizationCode") {
                if let Some(url) = token_url {
                    flow_map.insert("tokenUrl".to_string(), url);
                }
            }
            flow_map.insert("scopes".to_string(), scopes);
            out.insert(
                "flows".to_string(),
                json!({ flow_name: Value::Object(flow_map) }),
            );
        }
        other => {
            issues.warning(
                location,
                "security-scheme-unknown",
                format!("unknown security scheme type '{other}' copied as-is"),
            );
            return Value::Object(scheme.clone());
        }
    }
    if let Some(description) = description {
        out.insert("description".to_string(), description);
    }
    for (key, value) in scheme {
        if key.starts_with("x-") {
            out.insert(key.clone(), value.clone());
        }
    }
    Value::Object(out)
}

// ---- small helpers ----

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamKind {
    Body,
    FormData,
    Regular,
}

fn parameter_kind(parameter: &Value) -> ParamKind {
    match parameter.get(constants::FIELD_IN).and_then(Value::as_str) {
        Some("body") => ParamKind::Body,
        Some("formData") => ParamKind::FormData,
        _ => ParamKind::Regular,
    }
}

fn param_list(container: &JsonMap) -> Vec<&Value> {
    container
        .get(constants::FIELD_PARAMETERS)
        .and_then(Value::as_array)
        .map(|items| items.iter().collect())
        .unwrap_or_default()
}

fn resolve_param_ref(parameter: &Value, tree: &Value) -> Value {
    parameter
        .get(constants::FIELD_REF)
        .and_then(Value::as_str)
        .and_then(|target| resolve_pointer(tree, target))
        .cloned()
        .unwrap_or_else(|| parameter.clone())
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn effective_media_types(declared: &[String], location: &str, issues: &mut Issues) -> Vec<String> {
    if declared.is_empty() {
        issues.info(
            location,
            "default-media-type",
            "no media types declared; defaulting to application/json",
        );
        vec![constants::CONTENT_TYPE_JSON.to_string()]
    } else {
        declared.to_vec()
    }
}

// Copy the inline 2.0 type keywords of a parameter/header into a schema.
fn inline_type_to_schema(container: &Value) -> Value {
    let Some(container) = container.as_object() else {
        return json!({});
    };
    let mut schema = JsonMap::new();
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
        if let Some(value) = container.get(field) {
            schema.insert(field.to_string(), value.clone());
        }
    }
    Value::Object(schema)
}

fn rewrite_file_type(schema: &mut JsonMap, location: &str, issues: &mut Issues) {
    if schema.get(constants::FIELD_TYPE).and_then(Value::as_str) == Some("file") {
        schema.insert(
            constants::FIELD_TYPE.to_string(),
            Value::String("string".to_string()),
        );
        schema.insert(
            constants::FIELD_FORMAT.to_string(),
            Value::String("binary".to_string()),
        );
        issues.warning(
            location,
            "file-type",
            "type 'file' converted to string/binary",
        );
    }
}
