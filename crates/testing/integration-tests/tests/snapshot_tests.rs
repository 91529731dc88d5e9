//! Snapshot tests of the scope forest built for whole stories

use expect_test::expect;
use integration_tests::Story;
use ss_syntax::{NodeId, TreeBuilder};

/// A story touching every scoping construct
fn tour(b: &mut TreeBuilder) -> Vec<NodeId> {
    let hi = b.string("hi");
    let greeting = b.assign("greeting", hi);
    let one = b.int(1);
    let count = b.assign("count", one);

    let count_ref = b.path("count");
    let zero = b.int(0);
    let positive = b.binary(">", count_ref, zero);
    let positive_text = b.string("positive");
    let then_branch = b.assign("label", positive_text);
    let other_text = b.string("other");
    let else_body = b.assign("label", other_text);
    let otherwise = b.else_block(vec![else_body]);
    let branch = b.if_block(positive, vec![then_branch], vec![otherwise]);

    let first = b.int(1);
    let second = b.int(2);
    let items = b.list(vec![first, second]);
    let i = b.path("i");
    let two = b.int(2);
    let doubled = b.binary("*", i, two);
    let loop_body = b.assign("doubled", doubled);
    let each = b.foreach_block(items, &["i"], vec![loop_body]);

    let ratio = b.float(1.5);
    let risky = b.assign("risky", ratio);
    let yes = b.boolean(true);
    let recovered = b.assign("recovered", yes);
    let catch = b.catch_block(Some("err"), vec![recovered]);
    let also_yes = b.boolean(true);
    let done = b.assign("done", also_yes);
    let finally = b.finally_block(vec![done]);
    let attempt = b.try_block(vec![risky], vec![catch, finally]);

    let a_ty = b.types("int", Vec::new());
    let b_ty = b.types("int", Vec::new());
    let output = b.types("int", Vec::new());
    let a = b.path("a");
    let b_ref = b.path("b");
    let sum = b.binary("+", a, b_ref);
    let sum_assign = b.assign("sum", sum);
    let result = b.path("sum");
    let ret = b.return_statement(Some(result));
    let add = b.function_block(
        "add",
        vec![("a", a_ty), ("b", b_ty)],
        Some(output),
        vec![sum_assign, ret],
    );

    vec![greeting, count, branch, each, attempt, add]
}

#[test]
fn tour_scope_forest() {
    let story = Story::build(tour);

    expect![[r#"
        scope 0 (root)
          greeting: string
          count: int
          label: string
          risky: float
        scope 1 (loop) parent 0
          i: any
          doubled: any
        scope 2 (block) parent 0
          recovered: boolean
        scope 3 (block) parent 0
          done: boolean
        scope 4 (function)
          a: int
          b: int
          sum: int
    "#]]
    .assert_eq(&story.dump().unwrap());
}

#[test]
fn tour_annotates_scoped_nodes_only() {
    let story = Story::build(tour);
    let resolution = story.resolve().unwrap();

    let mut annotated: Vec<String> = resolution
        .annotations
        .iter()
        .map(|(node, scope)| format!("{} -> {}", story.tree.kind(node), scope.0))
        .collect();
    annotated.sort();

    expect![[r#"
        [
            "foreach_block -> 1",
            "function_block -> 4",
            "nested_block -> 2",
            "nested_block -> 3",
            "start -> 0",
        ]
    "#]]
    .assert_debug_eq(&annotated);
}

/// Resolving a structurally identical tree twice gives identical results
#[test]
fn resolution_is_deterministic() {
    let story = Story::build(tour);
    let copy = story.tree.clone();

    let first = story.resolve().unwrap();
    let second = ss_resolve::TypeResolver::resolve(&copy, &story.interner).unwrap();

    assert_eq!(first, second);
}

#[test]
fn error_messages() {
    let story = Story::build(|b| {
        let one = b.int(1);
        let text = b.string("x");
        vec![b.assign("a", one), b.assign("a", text)]
    });
    let error = story.resolve_err();

    expect!["can't assign `string` to a variable of type `int`"].assert_eq(&error.to_string());
}

#[test]
fn unresolved_error_offers_help() {
    use miette::Diagnostic;

    let story = Story::build(|b| {
        let one = b.int(1);
        let typo = b.path("totl");
        vec![b.assign("total", one), b.assign("copy", typo)]
    });
    let error = story.resolve_err();

    expect!["variable `totl` has not been defined"].assert_eq(&error.to_string());
    expect!["did you mean `total`?"].assert_eq(&error.help().unwrap().to_string());
}
