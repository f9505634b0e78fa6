use oaskit::jsonpath::{JsonPath, Match};
use serde_json::{json, Value};

fn store() -> Value {
    json!({
        "openapi": "3.0.3",
        "info": {"title": "Store", "version": "1.0.0"},
        "servers": [
            {"url": "https://prod.example"},
            {"url": "https://staging.example"},
            {"url": "https://dev.example"}
        ],
        "paths": {
            "/books": {
                "get": {"operationId": "listBooks", "deprecated": true},
                "x-internal": false
            },
            "/books/{bookId}": {
                "get": {"operationId": "getBook"}
            },
            "/admin/reindex": {
                "post": {"operationId": "reindex"},
                "x-internal": true
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "title": {"type": "string"},
                        "description": {"type": "string"}
                    }
                }
            }
        }
    })
}

#[test]
fn test_root_child_access() {
    let tree = store();
    let matches = JsonPath::parse("$.openapi").unwrap().get(&tree);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].value, &json!("3.0.3"));
}

#[test]
fn test_bracket_notation_for_special_names() {
    let tree = store();
    // Dots and slashes require bracket notation.
    let matches = JsonPath::parse("$.paths['/books/{bookId}'].get.operationId")
        .unwrap()
        .get(&tree);
    assert_eq!(matches[0].value, &json!("getBook"));

    // '-' in a member name also requires brackets.
    let matches = JsonPath::parse("$.paths['/books']['x-internal']")
        .unwrap()
        .get(&tree);
    assert_eq!(matches[0].value, &json!(false));
}

#[test]
fn test_wildcard_and_index() {
    let tree = store();
    let urls: Vec<&Value> = JsonPath::parse("$.servers[*].url")
        .unwrap()
        .get(&tree)
        .into_iter()
        .map(|m| m.value)
        .collect();
    assert_eq!(
        urls,
        vec![
            &json!("https://prod.example"),
            &json!("https://staging.example"),
            &json!("https://dev.example")
        ]
    );

    let second = JsonPath::parse("$.servers[1].url").unwrap().get(&tree);
    assert_eq!(second[0].value, &json!("https://staging.example"));

    let last = JsonPath::parse("$.servers[-1].url").unwrap().get(&tree);
    assert_eq!(last[0].value, &json!("https://dev.example"));

    assert!(JsonPath::parse("$.servers[9]").unwrap().get(&tree).is_empty());
}

#[test]
fn test_recursive_descent_finds_all_depths() {
    let tree = store();
    let matches = JsonPath::parse("$..operationId").unwrap().get(&tree);
    let ids: Vec<&Value> = matches.iter().map(|m| m.value).collect();
    assert_eq!(
        ids,
        vec![&json!("listBooks"), &json!("getBook"), &json!("reindex")]
    );

    let descriptions = JsonPath::parse("$..description").unwrap().get(&tree);
    assert_eq!(descriptions.len(), 1);
    assert_eq!(
        descriptions[0].pointer(),
        "/components/schemas/Book/properties/description"
    );
}

#[test]
fn test_filter_equality_on_map_values() {
    let tree = store();
    let matches = JsonPath::parse("$.paths[?@.x-internal==true]")
        .unwrap()
        .get(&tree);
    let keys: Vec<Option<&str>> = matches.iter().map(Match::key).collect();
    assert_eq!(keys, vec![Some("/admin/reindex")]);
}

#[test]
fn test_filter_inequality_and_strings() {
    let tree = json!({
        "servers": [
            {"url": "https://prod.example", "env": "prod"},
            {"url": "https://dev.example", "env": "dev"}
        ]
    });
    let matches = JsonPath::parse("$.servers[?@.env!='prod']").unwrap().get(&tree);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].value["url"], "https://dev.example");
}

#[test]
fn test_compound_filter_precedence() {
    let tree = json!({
        "items": [
            {"a": 1, "b": 1},
            {"a": 1, "b": 2},
            {"a": 2, "b": 2},
            {"a": 3}
        ]
    });
    // && binds tighter than ||: a==3 || (a==1 && b==2)
    let path = JsonPath::parse("$.items[?@.a==3 || @.a==1 && @.b==2]").unwrap();
    let matches = path.get(&tree);
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].value, &json!({"a": 1, "b": 2}));
    assert_eq!(matches[1].value, &json!({"a": 3}));
}

#[test]
fn test_invalid_expressions_error() {
    for expr in ["", "paths", "$..", "$.paths[", "$.paths[?@.a=>1]", "$[?(@.a==1)]"] {
        let err = JsonPath::parse(expr).unwrap_err();
        assert_eq!(err.kind(), Some(oaskit::ErrorKind::JsonPath), "expr: {expr}");
    }
}

#[test]
fn test_modify_each_match() {
    let mut tree = store();
    let count = JsonPath::parse("$.servers[*].url")
        .unwrap()
        .modify(&mut tree, |old| {
            json!(format!("{}/v2", old.as_str().unwrap()))
        });
    assert_eq!(count, 3);
    assert_eq!(tree["servers"][0]["url"], "https://prod.example/v2");
}

#[test]
fn test_remove_returns_count() {
    let mut tree = store();
    let removed = JsonPath::parse("$.paths[?@.x-internal==true]")
        .unwrap()
        .remove(&mut tree);
    assert_eq!(removed, 1);
    assert!(tree["paths"].get("/admin/reindex").is_none());
    assert_eq!(tree["paths"].as_object().unwrap().len(), 2);

    // Zero matches is not an error.
    let removed = JsonPath::parse("$.paths[?@.x-internal==true]")
        .unwrap()
        .remove(&mut tree);
    assert_eq!(removed, 0);
}

#[test]
fn test_remove_sequence_keeps_remaining_order() {
    let mut tree = json!({"list": [{"k": 1}, {"k": 2}, {"k": 1}, {"k": 3}]});
    let removed = JsonPath::parse("$.list[?@.k==1]").unwrap().remove(&mut tree);
    assert_eq!(removed, 2);
    assert_eq!(tree["list"], json!([{"k": 2}, {"k": 3}]));
}

#[test]
fn test_match_locations_are_stable() {
    let tree = store();
    let matches = JsonPath::parse("$.paths.*").unwrap().get(&tree);
    let pointers: Vec<String> = matches.iter().map(Match::pointer).collect();
    assert_eq!(
        pointers,
        vec![
            "/paths/~1books",
            "/paths/~1books~1{bookId}",
            "/paths/~1admin~1reindex"
        ]
    );
}
