use jsondelta::{apply, diff, diff_bytes, parse, serialize, DiffOptions, Patch, PatchOperation};

fn doc(json: &str) -> jsondelta::Node {
    parse(json.as_bytes()).unwrap()
}

#[test]
fn object_key_escape_worked_example() {
    assert_eq!(
        jsondelta::pointer::escape("article/a~01~001name"),
        "article~1a~001~0001name"
    );
    assert_eq!(
        jsondelta::pointer::unescape("article~1a~001~0001name"),
        "article/a~01~001name"
    );
}

#[test]
fn leaf_replace() {
    let source = doc(r#"{"A":1}"#);
    let target = doc(r#"{"A":2}"#);
    let ops = diff(&source, &target, DiffOptions::new());
    assert_eq!(ops.len(), 1);
    match &ops[0] {
        PatchOperation::Replace(r) => {
            assert_eq!(r.path, "/A");
        }
        other => panic!("expected replace, got {other:?}"),
    }
    assert!(apply(&source, &ops).unwrap().deep_eq(&target));
}

#[test]
fn array_insertion_at_head() {
    let source = doc("[1,2,3]");
    let target = doc("[0,1,2,3]");
    let ops = diff(&source, &target, DiffOptions::new());
    assert_eq!(ops.len(), 1);
    match &ops[0] {
        PatchOperation::Add(a) => {
            assert_eq!(a.path, "/0");
            assert!(a.value.deep_eq(&doc("0")));
        }
        other => panic!("expected a single add, got {other:?}"),
    }
    assert!(apply(&source, &ops).unwrap().deep_eq(&target));
}

#[test]
fn object_add_and_remove() {
    let source = doc(r#"{"A":1,"B":2}"#);
    let target = doc(r#"{"A":1,"C":3}"#);
    let ops = diff(&source, &target, DiffOptions::new());
    assert!(ops.iter().any(|op| matches!(op, PatchOperation::Remove(r) if r.path == "/B")));
    assert!(ops.iter().any(|op| matches!(op, PatchOperation::Add(a) if a.path == "/C")));
    assert!(apply(&source, &ops).unwrap().deep_eq(&target));
}

#[test]
fn move_rewrite() {
    let source = doc(r#"{"A":1}"#);
    let target = doc(r#"{"D":1}"#);
    let ops = diff(&source, &target, DiffOptions::new().use_move());
    assert_eq!(ops.len(), 1);
    match &ops[0] {
        PatchOperation::Move(m) => {
            assert_eq!(m.from, "/A");
            assert_eq!(m.path, "/D");
        }
        other => panic!("expected a single move, got {other:?}"),
    }
    assert!(apply(&source, &ops).unwrap().deep_eq(&target));
}

#[test]
fn copy_with_check() {
    let source = doc(r#"{"A":{"X":1}}"#);
    let target = doc(r#"{"A":{"X":1},"B":{"X":1}}"#);
    let ops = diff(&source, &target, DiffOptions::new().use_copy().use_check_copy());
    assert_eq!(ops.len(), 2);
    assert!(matches!(&ops[0], PatchOperation::Test(t) if t.path == "/A"));
    assert!(matches!(&ops[1], PatchOperation::Copy(c) if c.from == "/A" && c.path == "/B"));
    assert!(apply(&source, &ops).unwrap().deep_eq(&target));
}

#[test]
fn identity_diff_is_empty() {
    let x = doc(r#"{"a":[1,2,{"b":true}],"c":null}"#);
    assert!(diff(&x, &x, DiffOptions::new()).is_empty());
    assert!(apply(&x, &[]).unwrap().deep_eq(&x));
}

#[test]
fn numeric_lexeme_survives_untouched_round_trip() {
    let source = doc("0.4E-32");
    let target = doc("0.4E-32");
    let ops = diff(&source, &target, DiffOptions::new());
    assert!(ops.is_empty());
    assert_eq!(serialize(&source), b"0.4E-32");
}

#[test]
fn empty_object_and_array_diff_cleanly() {
    let source = doc("{}");
    let target = doc(r#"{"a":1}"#);
    let ops = diff(&source, &target, DiffOptions::new());
    assert!(apply(&source, &ops).unwrap().deep_eq(&target));

    let source = doc("[]");
    let target = doc("[1,2,3]");
    let ops = diff(&source, &target, DiffOptions::new());
    assert!(apply(&source, &ops).unwrap().deep_eq(&target));
}

#[test]
fn object_key_containing_slash_and_tilde_round_trips_through_pointer() {
    let source = doc(r#"{"a/b":{"c~d":1}}"#);
    let target = doc(r#"{"a/b":{"c~d":2}}"#);
    let ops = diff(&source, &target, DiffOptions::new());
    assert_eq!(ops.len(), 1);
    assert!(apply(&source, &ops).unwrap().deep_eq(&target));
}

#[test]
fn array_reordered_wholesale_round_trips() {
    let source = doc("[1,2,3,4,5]");
    let target = doc("[5,4,3,2,1]");
    let ops = diff(&source, &target, DiffOptions::new());
    assert!(apply(&source, &ops).unwrap().deep_eq(&target));
}

#[test]
fn diff_bytes_produces_applicable_wire_format_patch() {
    let source = br#"{"A":1,"B":2}"#;
    let target = br#"{"A":1,"C":3}"#;
    let patch_bytes = diff_bytes(source, target, DiffOptions::new()).unwrap();
    let patch_doc = parse(&patch_bytes).unwrap();
    let ops = Patch::from_node(&patch_doc).unwrap();
    let applied = apply(&parse(source).unwrap(), &ops.0).unwrap();
    assert!(applied.deep_eq(&parse(target).unwrap()));
}

#[test]
fn diff_bytes_surfaces_parse_errors() {
    assert!(diff_bytes(b"{not json", b"{}", DiffOptions::new()).is_err());
}

#[test]
fn rejects_leading_zero_in_number_literal() {
    assert!(parse(b"012").is_err());
}

#[test]
fn deeply_nested_document_round_trips() {
    let mut json = String::from("0");
    for _ in 0..60 {
        json = format!("[{json}]");
    }
    let source = doc(&json);
    let target_json = json.replacen('0', "1", 1);
    let target = doc(&target_json);
    let ops = diff(&source, &target, DiffOptions::new());
    assert!(apply(&source, &ops).unwrap().deep_eq(&target));
}
