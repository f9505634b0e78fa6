//! End-to-end flows piping one component's output into the next.

use oaskit::convert::Converter;
use oaskit::diff::Differ;
use oaskit::fix::Fixer;
use oaskit::join::{CollisionStrategy, Joiner, JoinerConfig};
use oaskit::model::{DocumentAccessor, OASVersion};
use oaskit::overlay::{Applier, Overlay};
use oaskit::parser;

const SERVICE: &str = r"
openapi: 3.0.3
info:
  title: Service
  version: 1.0.0
paths:
  /widgets:
    get:
      operationId: listWidgets
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Widget'
  /internal/stats:
    x-internal: true
    get:
      operationId: stats
      responses:
        '200':
          description: ok
  /empty: {}
components:
  schemas:
    Widget:
      type: object
      properties:
        id: {type: integer}
    Orphan:
      type: object
";

#[test]
fn test_overlay_then_fix_then_diff() {
    let original = parser::parse_str(SERVICE).unwrap();

    // 1. Overlay strips internal endpoints.
    let overlay = Overlay::from_str(
        r"
overlay: 1.0.0
info: {title: Publish, version: '1'}
actions:
  - target: $.paths[?@.x-internal==true]
    remove: true
",
    )
    .unwrap();
    let applied = Applier::new().apply(&original, &overlay).unwrap();
    let published = applied.to_parse_result().unwrap();
    assert_eq!(published.stats.path_count, 2);

    // 2. Fixer prunes the leftovers.
    let outcome = Fixer::new().fix_parsed(&published).unwrap();
    assert!(!outcome.document.paths.contains_key("/empty"));
    assert!(!outcome
        .document
        .components
        .as_ref()
        .unwrap()
        .schemas
        .contains_key("Orphan"));

    // 3. The diff against the original classifies the removals.
    let fixed = oaskit::Document::V3(outcome.document);
    let result = Differ::new().diff_documents(&original.document, &fixed);
    assert!(result.has_breaking_changes);
    assert_eq!(result.exit_code(), 1);
}

#[test]
fn test_convert_then_join() {
    // A 2.0 document is upgraded, then joined with a native 3.0 document.
    let legacy = parser::parse_str(
        r"
swagger: '2.0'
info: {title: Legacy, version: '1'}
host: legacy.example.com
schemes: [https]
paths:
  /legacy:
    get:
      operationId: listLegacy
      responses:
        '200':
          description: ok
          schema:
            $ref: '#/definitions/Record'
definitions:
  Record:
    type: object
",
    )
    .unwrap();
    let upgraded = Converter::new(OASVersion::V3_0_3)
        .convert(&legacy)
        .unwrap()
        .to_parse_result()
        .unwrap();

    let modern = parser::parse_str(SERVICE).unwrap();
    let config = JoinerConfig::new().with_default_strategy(CollisionStrategy::AcceptLeft);
    let joined = Joiner::new(config).join(&[modern, upgraded]).unwrap();

    assert_eq!(joined.version, OASVersion::V3_0_3);
    assert!(joined.data["paths"].get("/widgets").is_some());
    assert!(joined.data["paths"].get("/legacy").is_some());
    assert!(joined.data["components"]["schemas"].get("Record").is_some());

    // The joined output revalidates cleanly.
    let reparsed = joined.to_parse_result().unwrap();
    assert!(reparsed.errors.is_empty(), "errors: {:?}", reparsed.errors);
    assert_eq!(reparsed.document.oas_version(), OASVersion::V3_0_3);
}

#[test]
fn test_exit_code_contract() {
    let original = parser::parse_str(SERVICE).unwrap();

    // Differ in breaking mode with no changes exits 0.
    let clean = Differ::new().diff(&original, &parser::parse_str(SERVICE).unwrap());
    assert_eq!(clean.exit_code(), 0);

    // Converter without criticals exits 0.
    let converted = Converter::new(OASVersion::V3_1_0).convert(&original).unwrap();
    assert_eq!(converted.exit_code(), 0);

    // Fixer success is decided by revalidating the output.
    let outcome = Fixer::new().fix_parsed(&original).unwrap();
    let tree = serde_json::to_value(&outcome.document).unwrap();
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    parser::validate_tree(&tree, OASVersion::V3_0_3, &mut errors, &mut warnings);
    let fixer_exit = i32::from(!errors.is_empty());
    assert_eq!(fixer_exit, 0);
}

#[test]
fn test_inputs_survive_every_component() {
    let original = parser::parse_str(SERVICE).unwrap();
    let snapshot = original.data.clone();

    let overlay = Overlay::from_str(
        r"
overlay: 1.0.0
info: {title: T, version: '1'}
actions:
  - target: $.info
    update: {x-stamped: true}
",
    )
    .unwrap();
    let _ = Applier::new().apply(&original, &overlay).unwrap();
    let _ = Converter::new(OASVersion::V3_1_0).convert(&original).unwrap();
    let _ = Fixer::new().fix_parsed(&original).unwrap();
    let other = parser::parse_str(SERVICE).unwrap();
    let _ = Differ::new().diff(&original, &other);
    let config = JoinerConfig::new().with_default_strategy(CollisionStrategy::AcceptLeft);
    let _ = Joiner::new(config).join(&[original.clone(), other]).unwrap();

    assert_eq!(original.data, snapshot, "a component mutated its input");
}
