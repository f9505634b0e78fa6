use oaskit::model::{DocumentAccessor, OASVersion};
use oaskit::parser::{self, Parser};
use oaskit::SourceFormat;
use std::io::Write;

const PETSTORE_30: &str = r"
openapi: 3.0.3
info:
  title: Petstore
  version: 1.0.0
paths:
  /pets:
    get:
      operationId: listPets
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Pets'
    post:
      operationId: createPet
      responses:
        '201':
          description: created
components:
  schemas:
    Pets:
      type: array
      items:
        $ref: '#/components/schemas/Pet'
    Pet:
      type: object
      properties:
        id:
          type: integer
        name:
          type: string
";

const PETSTORE_20: &str = r#"{
  "swagger": "2.0",
  "info": {"title": "Petstore", "version": "1.0.0"},
  "host": "api.petstore.io",
  "basePath": "/v1",
  "paths": {
    "/pets": {
      "get": {
        "operationId": "listPets",
        "responses": {"200": {"description": "ok"}}
      }
    }
  },
  "definitions": {
    "Pet": {"type": "object"}
  }
}"#;

#[test]
fn test_parse_yaml_30() {
    let result = parser::parse_str(PETSTORE_30).unwrap();
    assert_eq!(result.oas_version, OASVersion::V3_0_3);
    assert_eq!(result.version, "3.0.3");
    assert_eq!(result.source_format, SourceFormat::Yaml);
    assert_eq!(result.source_size, PETSTORE_30.len());
    assert_eq!(result.stats.path_count, 1);
    assert_eq!(result.stats.operation_count, 2);
    assert_eq!(result.stats.schema_count, 2);
    assert!(result.errors.is_empty(), "errors: {:?}", result.errors);
    assert_eq!(result.document.info().title, "Petstore");
}

#[test]
fn test_parse_json_20() {
    let result = parser::parse_str(PETSTORE_20).unwrap();
    assert_eq!(result.oas_version, OASVersion::V2_0);
    assert_eq!(result.source_format, SourceFormat::Json);
    let doc = result.document.as_v2().unwrap();
    assert_eq!(doc.host.as_deref(), Some("api.petstore.io"));
    assert_eq!(result.document.schemas().unwrap().len(), 1);
}

#[test]
fn test_unknown_version_error() {
    let err = parser::parse_str("info:\n  title: T\n  version: '1'\npaths: {}\n").unwrap_err();
    assert_eq!(err.kind(), Some(oaskit::ErrorKind::Parse));

    assert!(parser::parse_str("swagger: '1.2'\ninfo: {title: T, version: '1'}\npaths: {}\n").is_err());
    assert!(parser::parse_str("openapi: 9.9.9\ninfo: {title: T, version: '1'}\npaths: {}\n").is_err());
}

#[test]
fn test_syntax_error() {
    assert!(parser::parse_str("{\"openapi\": ").is_err());
}

#[test]
fn test_parse_file_records_path() {
    let mut file = tempfile::NamedTempFile::with_suffix(".yaml").unwrap();
    file.write_all(PETSTORE_30.as_bytes()).unwrap();
    let result = parser::parse_file(file.path()).unwrap();
    assert_eq!(result.source_path.as_deref(), Some(file.path()));
    assert!(!result.source_stem().is_empty());
}

#[test]
fn test_source_map_option() {
    let result = Parser::new()
        .with_source_map(true)
        .parse_str(PETSTORE_30)
        .unwrap();
    let map = result.source_map.unwrap();
    assert_eq!(map.line_of("/openapi"), Some(2));
    assert!(map.line_of("/paths/~1pets").is_some());

    let without = parser::parse_str(PETSTORE_30).unwrap();
    assert!(without.source_map.is_none());
}

#[test]
fn test_validation_flags_structural_defects() {
    let spec = r"
openapi: 3.0.0
info:
  title: Broken
  version: '1'
paths:
  /items/{itemId}:
    get:
      operationId: shared
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Missing'
  /other:
    get:
      operationId: shared
      responses:
        '200': {description: ok}
";
    let result = parser::parse_str(spec).unwrap();
    assert!(result.errors.iter().any(|e| e.contains("Missing")));
    assert!(result.errors.iter().any(|e| e.contains("itemId")));
    assert!(result.errors.iter().any(|e| e.contains("shared")));

    // The standalone validation entry point reports the same defects.
    let errors = parser::validate(&result);
    assert_eq!(errors.len(), result.errors.len());

    // Validation can be disabled.
    let lenient = Parser::new()
        .with_validate_structure(false)
        .parse_str(spec)
        .unwrap();
    assert!(lenient.errors.is_empty());
}

#[test]
fn test_round_trip_preserves_typed_document_and_order() {
    let first = parser::parse_str(PETSTORE_30).unwrap();
    let emitted = first.emit().unwrap();
    let second = parser::parse_str(&emitted).unwrap();
    assert_eq!(first.document, second.document);

    // Key order of paths and properties survives the round trip.
    let keys: Vec<&String> = second.data["components"]["schemas"]["Pet"]["properties"]
        .as_object()
        .unwrap()
        .keys()
        .collect();
    assert_eq!(keys, ["id", "name"]);
}

#[test]
fn test_integers_survive_round_trip() {
    let spec = r"
openapi: 3.0.3
info: {title: T, version: '1'}
paths: {}
components:
  schemas:
    Limits:
      type: integer
      maximum: 100
      multipleOf: 10
";
    let first = parser::parse_str(spec).unwrap();
    let emitted = first.emit().unwrap();
    assert!(emitted.contains("maximum: 100"));
    assert!(!emitted.contains("100.0"));
}
