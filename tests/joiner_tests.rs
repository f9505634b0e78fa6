use oaskit::join::{CollisionStrategy, EquivalenceMode, Joiner, JoinerConfig};
use oaskit::parser::{self, ParseResult};
use oaskit::refs;
use oaskit::value;
use std::path::PathBuf;

fn parse_as(yaml: &str, path: &str) -> ParseResult {
    let mut parsed = parser::parse_str(yaml).unwrap();
    parsed.source_path = Some(PathBuf::from(path));
    parsed
}

fn billing() -> ParseResult {
    parse_as(
        r"
openapi: 3.0.3
info: {title: Billing, version: '1.0.0'}
servers:
  - url: https://billing.example
tags:
  - name: billing
paths:
  /invoices:
    get:
      operationId: listInvoices
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Account'
components:
  schemas:
    Account:
      type: object
      properties:
        id: {type: integer}
",
        "billing.yaml",
    )
}

fn crm() -> ParseResult {
    parse_as(
        r"
openapi: 3.0.3
info: {title: CRM, version: '1.0.0'}
servers:
  - url: https://crm.example
tags:
  - name: crm
  - name: billing
paths:
  /contacts:
    get:
      operationId: listContacts
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Account'
components:
  schemas:
    Account:
      type: object
      properties:
        email: {type: string}
",
        "crm.yaml",
    )
}

fn assert_all_refs_resolve(data: &serde_json::Value) {
    for target in refs::collect_refs(data) {
        assert!(
            value::resolve_pointer(data, &target).is_some(),
            "dangling reference {target}"
        );
    }
}

#[test]
fn test_rename_right_with_default_template() {
    let config = JoinerConfig::new()
        .with_schema_strategy(CollisionStrategy::RenameRight)
        .with_default_strategy(CollisionStrategy::AcceptLeft);
    let result = Joiner::new(config).join(&[billing(), crm()]).unwrap();

    assert_eq!(result.collision_count, 1);
    let schemas = result.data["components"]["schemas"].as_object().unwrap();
    assert!(schemas.contains_key("Account"));
    assert!(schemas.contains_key("Account_crm"));

    // Every reference that came from crm.yaml now resolves to the renamed
    // schema; billing's references are untouched.
    assert_eq!(
        result.data["paths"]["/contacts"]["get"]["responses"]["200"]["content"]
            ["application/json"]["schema"]["$ref"],
        "#/components/schemas/Account_crm"
    );
    assert_eq!(
        result.data["paths"]["/invoices"]["get"]["responses"]["200"]["content"]
            ["application/json"]["schema"]["$ref"],
        "#/components/schemas/Account"
    );
    assert_all_refs_resolve(&result.data);
}

#[test]
fn test_custom_rename_template_with_case_function() {
    let config = JoinerConfig::new()
        .with_schema_strategy(CollisionStrategy::RenameRight)
        .with_rename_template("{name}From{pascalCase(source)}");
    let result = Joiner::new(config).join(&[billing(), crm()]).unwrap();
    assert!(result.data["components"]["schemas"]
        .as_object()
        .unwrap()
        .contains_key("AccountFromCrm"));
}

#[test]
fn test_semantic_deduplication_scenario() {
    let users = parse_as(
        r"
openapi: 3.0.3
info: {title: Users, version: '1'}
paths:
  /users:
    get:
      operationId: listUsers
      responses:
        '400':
          description: bad request
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/UserError'
components:
  schemas:
    UserError:
      type: object
      properties:
        code: {type: integer}
        message: {type: string}
",
        "users.yaml",
    );
    let products = parse_as(
        r"
openapi: 3.0.3
info: {title: Products, version: '1'}
paths:
  /products:
    get:
      operationId: listProducts
      responses:
        '400':
          description: bad request
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/ProductError'
components:
  schemas:
    ProductError:
      type: object
      properties:
        code: {type: integer}
        message: {type: string}
",
        "products.yaml",
    );

    let config = JoinerConfig::new()
        .with_schema_strategy(CollisionStrategy::AcceptLeft)
        .with_default_strategy(CollisionStrategy::AcceptLeft)
        .with_semantic_deduplication(true);
    let result = Joiner::new(config).join(&[users, products]).unwrap();

    let schemas = result.data["components"]["schemas"].as_object().unwrap();
    // Alphabetically-first name wins the equivalence class.
    assert!(schemas.contains_key("ProductError"));
    assert!(!schemas.contains_key("UserError"));
    assert_eq!(
        result.data["paths"]["/users"]["get"]["responses"]["400"]["content"]
            ["application/json"]["schema"]["$ref"],
        "#/components/schemas/ProductError"
    );
    assert!(result
        .warnings
        .iter()
        .any(|w| w.message.contains("semantic deduplication")));
    assert_all_refs_resolve(&result.data);
}

#[test]
fn test_collision_error_names_everything() {
    let err = Joiner::new(JoinerConfig::new())
        .join(&[billing(), crm()])
        .unwrap_err();
    assert_eq!(err.kind(), Some(oaskit::ErrorKind::Collision));
    let json = err.to_json();
    let details = json.details.unwrap();
    assert_eq!(details["bucket"], "schemas");
    assert_eq!(details["key"], "Account");
    assert_eq!(details["kept_source"], "billing");
    assert_eq!(details["incoming_source"], "crm");
    assert_eq!(details["strategy"], "fail");
    // A remediation is suggested.
    assert!(json.context.unwrap().contains("accept-left"));
}

#[test]
fn test_merge_arrays_and_tag_dedup() {
    let config = JoinerConfig::new().with_default_strategy(CollisionStrategy::AcceptLeft);
    let result = Joiner::new(config).join(&[billing(), crm()]).unwrap();
    let servers: Vec<&str> = result.data["servers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["url"].as_str().unwrap())
        .collect();
    assert_eq!(servers, ["https://billing.example", "https://crm.example"]);
    let tags: Vec<&str> = result.data["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(tags, ["billing", "crm"]);

    // Array merging can be disabled.
    let config = JoinerConfig::new()
        .with_default_strategy(CollisionStrategy::AcceptLeft)
        .with_merge_arrays(false);
    let result = Joiner::new(config).join(&[billing(), crm()]).unwrap();
    assert_eq!(result.data["servers"].as_array().unwrap().len(), 1);
}

#[test]
fn test_info_comes_from_first_document() {
    let config = JoinerConfig::new().with_default_strategy(CollisionStrategy::AcceptLeft);
    let result = Joiner::new(config).join(&[billing(), crm()]).unwrap();
    assert_eq!(result.data["info"]["title"], "Billing");
    assert_eq!(result.version, oaskit::OASVersion::V3_0_3);
}

#[test]
fn test_left_associativity_under_accept_left() {
    let third = parse_as(
        r"
openapi: 3.0.3
info: {title: Third, version: '1'}
paths:
  /third:
    get:
      operationId: listThird
      responses: {'200': {description: ok}}
components:
  schemas:
    Account:
      type: object
      properties:
        third: {type: boolean}
",
        "third.yaml",
    );

    let config = JoinerConfig::new().with_default_strategy(CollisionStrategy::AcceptLeft);
    let joined_all = Joiner::new(config.clone())
        .join(&[billing(), crm(), third.clone()])
        .unwrap();

    let pair = Joiner::new(config.clone()).join(&[billing(), crm()]).unwrap();
    let intermediate = pair.to_parse_result().unwrap();
    let joined_stepwise = Joiner::new(config).join(&[intermediate, third]).unwrap();

    assert_eq!(joined_all.data, joined_stepwise.data);
}

#[test]
fn test_deduplicate_equivalent_deep_mode() {
    let left = parse_as(
        r"
openapi: 3.0.3
info: {title: L, version: '1'}
paths: {}
components:
  schemas:
    Wrapper:
      type: object
      properties:
        error:
          $ref: '#/components/schemas/Inner'
    Inner:
      type: object
      properties:
        code: {type: integer}
",
        "left.yaml",
    );
    let right = parse_as(
        r"
openapi: 3.0.3
info: {title: R, version: '1'}
paths: {}
components:
  schemas:
    Wrapper:
      type: object
      properties:
        error:
          $ref: '#/components/schemas/Detail'
    Detail:
      type: object
      properties:
        code: {type: integer}
",
        "right.yaml",
    );

    // Shallow comparison sees different $ref strings and fails.
    let config = JoinerConfig::new()
        .with_schema_strategy(CollisionStrategy::DeduplicateEquivalent)
        .with_equivalence_mode(EquivalenceMode::Shallow)
        .with_default_strategy(CollisionStrategy::AcceptLeft);
    assert!(Joiner::new(config).join(&[left.clone(), right.clone()]).is_err());

    // Deep comparison resolves the references and accepts.
    let config = JoinerConfig::new()
        .with_schema_strategy(CollisionStrategy::DeduplicateEquivalent)
        .with_equivalence_mode(EquivalenceMode::Deep)
        .with_default_strategy(CollisionStrategy::AcceptLeft);
    let result = Joiner::new(config).join(&[left, right]).unwrap();
    assert_eq!(result.collision_count, 1);
}

#[test]
fn test_namespace_prefix_always_applied() {
    let config = JoinerConfig::new()
        .with_namespace_prefix("crm", "Crm")
        .with_always_apply_prefix(true);
    let result = Joiner::new(config).join(&[billing(), crm()]).unwrap();
    let schemas = result.data["components"]["schemas"].as_object().unwrap();
    assert!(schemas.contains_key("Account"));
    assert!(schemas.contains_key("CrmAccount"));
    assert_eq!(
        result.data["paths"]["/contacts"]["get"]["responses"]["200"]["content"]
            ["application/json"]["schema"]["$ref"],
        "#/components/schemas/CrmAccount"
    );
    // No collision at all: the prefix separated the names up front.
    assert_eq!(result.collision_count, 0);
}

#[test]
fn test_v2_join_uses_definitions_bucket() {
    let a = parse_as(
        r#"{"swagger": "2.0", "info": {"title": "A", "version": "1"},
            "paths": {"/a": {"get": {"responses": {"200": {"description": "ok"}}}}},
            "definitions": {"Shared": {"type": "object"}}}"#,
        "a.json",
    );
    let b = parse_as(
        r#"{"swagger": "2.0", "info": {"title": "B", "version": "1"},
            "paths": {"/b": {"get": {"responses": {"200": {"description": "ok"}}}}},
            "definitions": {"Shared": {"type": "string"}}}"#,
        "b.json",
    );
    let config = JoinerConfig::new().with_schema_strategy(CollisionStrategy::RenameRight);
    let result = Joiner::new(config).join(&[a, b]).unwrap();
    let definitions = result.data["definitions"].as_object().unwrap();
    assert!(definitions.contains_key("Shared"));
    assert!(definitions.contains_key("Shared_b"));
    assert_eq!(result.stats.path_count, 2);
}
