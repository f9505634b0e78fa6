use oaskit::overlay::{ActionOp, Applier, Overlay, WarningCategory};
use oaskit::parser;

fn spec_with_internal_path() -> parser::ParseResult {
    parser::parse_str(
        r"
openapi: 3.0.3
info:
  title: Service
  version: 1.0.0
paths:
  /public/items:
    get:
      operationId: listItems
      responses:
        '200':
          description: ok
  /internal/metrics:
    x-internal: true
    get:
      operationId: scrapeMetrics
      responses:
        '200':
          description: ok
",
    )
    .unwrap()
}

#[test]
fn test_remove_internal_paths_scenario() {
    let spec = spec_with_internal_path();
    let before = spec.data.clone();
    let overlay = Overlay::from_str(
        r"
overlay: 1.0.0
info:
  title: Strip internal endpoints
  version: 1.0.0
actions:
  - target: $.paths[?@.x-internal==true]
    remove: true
",
    )
    .unwrap();

    let result = Applier::new().apply(&spec, &overlay).unwrap();
    assert_eq!(result.actions_applied, 1);
    assert_eq!(result.actions_skipped, 0);
    assert!(result.data["paths"].get("/internal/metrics").is_none());
    assert!(result.data["paths"].get("/public/items").is_some());

    // Non-destructive: the input tree is byte-identical after the call.
    assert_eq!(spec.data, before);
}

#[test]
fn test_compound_filter_updates_one_path() {
    let spec = parser::parse_str(
        r"
openapi: 3.0.3
info: {title: Grid, version: '1'}
paths:
  /both:
    deprecated: true
    x-internal: true
    get: {responses: {'200': {description: ok}}}
  /deprecated-only:
    deprecated: true
    get: {responses: {'200': {description: ok}}}
  /internal-only:
    x-internal: true
    get: {responses: {'200': {description: ok}}}
  /neither:
    get: {responses: {'200': {description: ok}}}
",
    )
    .unwrap();
    let overlay = Overlay::from_str(
        r"
overlay: 1.0.0
info: {title: Sunset, version: '1'}
actions:
  - target: $.paths[?@.deprecated==true && @.x-internal==true]
    update:
      x-removal-scheduled: '2025-01-01'
",
    )
    .unwrap();

    let result = Applier::new().apply(&spec, &overlay).unwrap();
    assert_eq!(result.changes.len(), 1);
    assert_eq!(result.changes[0].match_count, 1);
    assert_eq!(result.changes[0].operation, ActionOp::Update);
    assert_eq!(result.data["paths"]["/both"]["x-removal-scheduled"], "2025-01-01");
    for untouched in ["/deprecated-only", "/internal-only", "/neither"] {
        assert!(
            result.data["paths"][untouched].get("x-removal-scheduled").is_none(),
            "{untouched} must not be updated"
        );
    }
}

#[test]
fn test_validation_rejects_bad_overlays() {
    let overlay = Overlay::from_str(
        r"
overlay: 2.0.0
info: {title: '', version: ''}
actions: []
",
    )
    .unwrap();
    let findings = overlay.validate();
    assert_eq!(findings.len(), 4);

    let spec = spec_with_internal_path();
    let err = Applier::new().apply(&spec, &overlay).unwrap_err();
    assert_eq!(err.kind(), Some(oaskit::ErrorKind::OverlayValidation));
}

#[test]
fn test_ordered_actions_and_operations() {
    let spec = spec_with_internal_path();
    let overlay = Overlay::from_str(
        r"
overlay: 1.0.0
info: {title: Pipeline, version: '1'}
actions:
  - target: $.info
    update:
      title: Public Service
      x-audience: external
  - target: $.info.version
    update: 2.0.0
  - target: $.paths['/public/items'].get.tags
    remove: true
",
    )
    .unwrap();

    let result = Applier::new().apply(&spec, &overlay).unwrap();
    // First two actions apply; the third finds no tags node.
    assert_eq!(result.actions_applied, 2);
    assert_eq!(result.actions_skipped, 1);
    assert_eq!(result.changes[0].operation, ActionOp::Update);
    assert_eq!(result.changes[1].operation, ActionOp::Replace);
    assert_eq!(result.data["info"]["title"], "Public Service");
    assert_eq!(result.data["info"]["version"], "2.0.0");
    assert_eq!(result.warnings[0].category, WarningCategory::NoMatch);
    assert_eq!(result.warnings[0].action_index, 2);
    assert_eq!(result.warning_messages.len(), 1);
}

#[test]
fn test_strict_targets_aborts_whole_apply() {
    let spec = spec_with_internal_path();
    let overlay = Overlay::from_str(
        r"
overlay: 1.0.0
info: {title: Strict, version: '1'}
actions:
  - target: $.info
    update: {x-touched: true}
  - target: $.paths['/missing']
    remove: true
",
    )
    .unwrap();
    let err = Applier::new()
        .with_strict_targets(true)
        .apply(&spec, &overlay)
        .unwrap_err();
    assert_eq!(err.kind(), Some(oaskit::ErrorKind::OverlayApply));
}

#[test]
fn test_dry_run_predicts_without_mutation() {
    let spec = spec_with_internal_path();
    let before = spec.data.clone();
    let overlay = Overlay::from_str(
        r"
overlay: 1.0.0
info: {title: Preview, version: '1'}
actions:
  - target: $.paths[?@.x-internal==true]
    remove: true
  - target: $.paths[?@.x-internal==true]
    update: {x-late: true}
",
    )
    .unwrap();
    let proposed = Applier::new().dry_run(&spec, &overlay).unwrap();
    assert_eq!(spec.data, before);
    assert_eq!(proposed[0].operation, Some(ActionOp::Remove));
    assert_eq!(proposed[0].match_count, 1);
    // The second action sees the state after the first: nothing left.
    assert_eq!(proposed[1].match_count, 0);
    assert_eq!(proposed[1].operation, None);
}

#[test]
fn test_apply_files_and_reparse() {
    use std::io::Write;
    let mut spec_file = tempfile::NamedTempFile::with_suffix(".yaml").unwrap();
    spec_file
        .write_all(
            br"
openapi: 3.0.3
info: {title: OnDisk, version: '1'}
paths:
  /internal:
    x-internal: true
    get: {responses: {'200': {description: ok}}}
  /kept:
    get: {responses: {'200': {description: ok}}}
",
        )
        .unwrap();
    let mut overlay_file = tempfile::NamedTempFile::with_suffix(".yaml").unwrap();
    overlay_file
        .write_all(
            br"
overlay: 1.0.0
info: {title: Strip, version: '1'}
actions:
  - target: $.paths[?@.x-internal==true]
    remove: true
",
        )
        .unwrap();

    let result = oaskit::overlay::apply::apply_file(spec_file.path(), overlay_file.path()).unwrap();
    assert_eq!(result.actions_applied, 1);

    let reparsed = result.to_parse_result().unwrap();
    assert_eq!(reparsed.stats.path_count, 1);
    assert_eq!(reparsed.source_path.as_deref(), Some(spec_file.path()));
}
