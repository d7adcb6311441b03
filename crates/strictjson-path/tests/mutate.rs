use strictjson::Value;
use strictjson_path::{delete, query, update};

const STORE: &[u8] = br#"{
  "store": {
    "book": [
      {"category": "reference", "author": "Nigel Rees", "title": "Sayings of the Century", "price": 8.95},
      {"category": "fiction", "author": "Evelyn Waugh", "title": "Sword of Honour", "price": 12.99},
      {"category": "fiction", "author": "Herman Melville", "title": "Moby Dick", "isbn": "0-553-21311-3", "price": 8.99},
      {"category": "fiction", "author": "J. R. R. Tolkien", "title": "The Lord of the Rings", "isbn": "0-395-19395-8", "price": 22.99}
    ],
    "bicycle": {"color": "red", "price": 19.95}
  },
  "expensive": 10
}"#;

fn store() -> Value {
    Value::parse(STORE).unwrap()
}

#[test]
fn update_single_field() {
    let mut doc = store();
    assert_eq!(update(&mut doc, "$.expensive", Value::from(20)).unwrap(), 1);
    assert_eq!(doc["expensive"].as_long(), Some(20));
}

#[test]
fn update_every_book_price() {
    let mut doc = store();
    let count = update(&mut doc, "$.store.book[*].price", Value::from(9.99)).unwrap();
    assert_eq!(count, 4);
    let prices = query(&doc, "$.store.book[*].price").unwrap();
    assert_eq!(prices.len(), 4);
    for price in prices {
        assert_eq!(price.as_double(), Some(9.99));
    }
}

#[test]
fn update_with_filter() {
    let mut doc = store();
    let count = update(
        &mut doc,
        "$.store.book[?(@.price > 20)].category",
        Value::from("expensive-fiction"),
    )
    .unwrap();
    assert_eq!(count, 1);
    assert_eq!(
        doc["store"]["book"][3]["category"].as_str(),
        Some("expensive-fiction")
    );
}

#[test]
fn update_installs_deep_copies() {
    let mut doc = store();
    let replacement = Value::parse(br#"{"tag": "new"}"#).unwrap();
    assert_eq!(
        update(&mut doc, "$.store.book[*].price", replacement).unwrap(),
        4
    );
    // Mutating one installed copy must not affect the others.
    doc["store"]["book"][0]["price"]["tag"] = Value::from("changed");
    assert_eq!(doc["store"]["book"][1]["price"]["tag"].as_str(), Some("new"));
}

#[test]
fn update_missing_path_touches_nothing() {
    let mut doc = store();
    assert_eq!(update(&mut doc, "$.nope[*]", Value::from(1)).unwrap(), 0);
    assert_eq!(doc, store());
}

#[test]
fn delete_object_member() {
    let mut doc = Value::parse(br#"{"a": 1, "b": 2, "c": 3}"#).unwrap();
    assert_eq!(delete(&mut doc, "$.b").unwrap(), 1);
    assert_eq!(doc.to_string(), r#"{"a":1,"c":3}"#);
}

#[test]
fn delete_array_slice() {
    let mut doc = Value::parse(b"[1, 2, 3, 4, 5]").unwrap();
    assert_eq!(delete(&mut doc, "$[1:3]").unwrap(), 2);
    assert_eq!(doc.to_string(), "[1,4,5]");
}

#[test]
fn delete_longer_array_slice() {
    let mut doc = Value::parse(b"[1, 2, 3, 4, 5, 6, 7, 8]").unwrap();
    assert_eq!(delete(&mut doc, "$[1:4]").unwrap(), 3);
    assert_eq!(doc.to_string(), "[1,5,6,7,8]");
}

#[test]
fn delete_key_from_every_element() {
    let mut doc = Value::parse(
        br#"{"items": [{"id": 1, "name": "a"}, {"id": 2, "name": "b"}, {"id": 3, "name": "c"}]}"#,
    )
    .unwrap();
    assert_eq!(delete(&mut doc, "$.items[*].name").unwrap(), 3);
    assert_eq!(
        doc.to_string(),
        r#"{"items":[{"id":1},{"id":2},{"id":3}]}"#
    );
}

#[test]
fn delete_isbn_only_from_books_that_have_it() {
    let mut doc = store();
    assert_eq!(delete(&mut doc, "$.store.book[*].isbn").unwrap(), 2);
    assert_eq!(query(&doc, "$..isbn").unwrap().len(), 0);
    assert_eq!(doc["store"]["book"][2]["title"].as_str(), Some("Moby Dick"));
}

#[test]
fn delete_root_is_skipped() {
    let mut doc = store();
    assert_eq!(delete(&mut doc, "$").unwrap(), 0);
    assert!(doc.is_object());
}

#[test]
fn delete_with_filter() {
    let mut doc = store();
    assert_eq!(
        delete(&mut doc, "$.store.book[?(@.price > 10)]").unwrap(),
        2
    );
    let remaining = query(&doc, "$.store.book[*].title").unwrap();
    let titles: Vec<&str> = remaining.iter().filter_map(|v| v.as_str()).collect();
    assert_eq!(titles, ["Sayings of the Century", "Moby Dick"]);
}

#[test]
fn mutation_rejects_relative_roots() {
    let mut doc = store();
    assert!(update(&mut doc, "@.expensive", Value::from(1)).is_err());
    assert!(delete(&mut doc, "@.expensive").is_err());
}

#[test]
fn overlapping_delete_matches_stay_safe() {
    // $..* matches containers and their contents; deleting both must not
    // double-count or panic once the parent is gone.
    let mut doc = Value::parse(br#"{"a": {"b": 1}, "c": [2, 3]}"#).unwrap();
    let removed = delete(&mut doc, "$..*").unwrap();
    assert!(removed >= 2);
    assert_eq!(doc.to_string(), "{}");
}
