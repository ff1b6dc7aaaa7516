use proptest::prelude::*;

use pyviz_core::identifier::Id;
use pyviz_syntax::{
    ErrorCode, OperatorClass, SyntaxNode, Value, parse_object_graph, parse_syntax_tree,
    parse_tokens,
    syntax::{BinaryOperator, CompareOperator, Number},
};

#[test]
fn test_parse_module_with_if_statement() {
    let source = r#"
        {
            "_astname": "Module",
            "body": [{
                "_astname": "If",
                "test": {
                    "_astname": "Compare",
                    "left": {"_astname": "Name", "id": {"v": "x"}},
                    "ops": [{"_astname": "Gt"}],
                    "comparators": [{"_astname": "Num", "n": {"v": 0}}]
                },
                "body": [{"_astname": "Pass"}],
                "orelse": []
            }]
        }
    "#;

    let tree = parse_syntax_tree(source).expect("Failed to parse");

    let SyntaxNode::Module { body } = &tree else {
        panic!("Expected Module");
    };
    assert_eq!(body.len(), 1);

    match &body[0] {
        SyntaxNode::If { test, body, orelse } => {
            assert!(matches!(
                test.as_ref(),
                SyntaxNode::Compare { ops, .. } if ops == &[CompareOperator::Gt]
            ));
            assert_eq!(body, &[SyntaxNode::Pass]);
            assert!(orelse.is_empty());
        }
        other => panic!("Expected If, got {}", other.kind_name()),
    }
    assert_eq!(tree.subtree_size(), 7);
}

#[test]
fn test_parse_type_tagged_tree_with_bare_operators() {
    let source = r#"
        {"_type": "AugAssign",
         "target": {"_type": "Name", "id": "total"},
         "op": "Add",
         "value": {"_type": "Num", "n": 1.5}}
    "#;

    let tree = parse_syntax_tree(source).expect("Failed to parse");

    assert_eq!(
        tree,
        SyntaxNode::AugAssign {
            target: Box::new(SyntaxNode::Name { id: "total".into() }),
            op: BinaryOperator::Add,
            value: Box::new(SyntaxNode::Num {
                n: Number::Float(1.5)
            }),
        }
    );

    let mut classes = Vec::new();
    tree.walk(&mut |node| classes.extend(OperatorClass::of(node)));
    assert_eq!(classes, [OperatorClass::Binary]);
}

#[test]
fn test_malformed_json_has_span() {
    let err = parse_syntax_tree("{\"_astname\": ").unwrap_err();
    let diag = &err.diagnostics()[0];
    assert_eq!(diag.code(), Some(ErrorCode::E001));
    assert!(diag.span().is_some());
}

#[test]
fn test_unknown_kind_is_rejected() {
    let err = parse_syntax_tree(r#"[{"_astname": "Match", "subject": null}]"#).unwrap_err();
    let diag = &err.diagnostics()[0];
    assert_eq!(diag.code(), Some(ErrorCode::E101));
    assert_eq!(diag.path(), Some("$[0]"));
}

#[test]
fn test_parse_lunch_snapshot() {
    let source = r#"
        {
            "lunch": {
                "name": "lunch",
                "properties": {
                    "fruits": {"ref": "fruits"},
                    "drinks": {"ref": "drinks"}
                }
            },
            "fruits": {"name": "list", "items": ["apple", "banana", "cherry"]},
            "drinks": {"name": "list", "items": ["water", "tea"]}
        }
    "#;

    let graph = parse_object_graph(source).expect("Failed to parse");

    assert_eq!(graph.len(), 3);
    let lunch = graph.get(Id::new("lunch")).expect("lunch should exist");
    assert_eq!(lunch.properties()["fruits"], Value::reference("fruits"));
    assert_eq!(graph.get(Id::new("fruits")).unwrap().items().len(), 3);
}

#[test]
fn test_dangling_references_are_collected() {
    let source = r#"
        {
            "a": {"properties": {"left": {"ref": "ghost"}}},
            "b": {"linkedProperties": {"right": "phantom"}}
        }
    "#;

    let err = parse_object_graph(source).unwrap_err();

    assert_eq!(err.diagnostics().len(), 2);
    assert!(
        err.diagnostics()
            .iter()
            .all(|diag| diag.code() == Some(ErrorCode::E202))
    );
}

#[test]
fn test_parse_tokenizer_output() {
    let source = r#"
        [
            {"type": "NAME", "token": "print", "start": [1, 0], "end": [1, 5], "line": "print('a' + b)\n"},
            {"type": "OP", "token": "(", "start": [1, 5], "end": [1, 6], "line": "print('a' + b)\n"},
            {"type": "STRING", "token": "'a'", "start": [1, 6], "end": [1, 9], "line": "print('a' + b)\n"}
        ]
    "#;

    let tokens = parse_tokens(source).expect("Failed to parse");

    let rows: Vec<_> = tokens.rows().collect();
    assert_eq!(rows, [("NAME", "print"), ("OP", "("), ("STRING", "'a'")]);
}

proptest! {
    #[test]
    fn prop_integer_literals_decode_exactly(n in any::<i64>()) {
        let source = format!(r#"{{"_astname": "Num", "n": {n}}}"#);
        let tree = parse_syntax_tree(&source).unwrap();
        prop_assert_eq!(tree, SyntaxNode::Num { n: Number::Int(n) });
    }

    #[test]
    fn prop_arbitrary_input_never_panics(source in "\\PC{0,64}") {
        let _ = parse_syntax_tree(&source);
        let _ = parse_object_graph(&source);
        let _ = parse_tokens(&source);
    }

    #[test]
    fn prop_token_rows_follow_input_order(
        tokens in prop::collection::vec(("[A-Z]{1,8}", "[a-z0-9+()]{0,6}"), 0..20)
    ) {
        let records: Vec<String> = tokens
            .iter()
            .enumerate()
            .map(|(col, (kind, text))| {
                format!(
                    r#"{{"type": "{kind}", "token": "{text}", "start": [1, {col}], "end": [1, {col}]}}"#
                )
            })
            .collect();
        let source = format!("[{}]", records.join(","));

        let stream = parse_tokens(&source).unwrap();

        let rows: Vec<(String, String)> = stream
            .rows()
            .map(|(kind, text)| (kind.to_string(), text.to_string()))
            .collect();
        prop_assert_eq!(rows, tokens);
    }
}
