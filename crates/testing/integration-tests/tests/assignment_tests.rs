//! Assignment binding and reassignment checks
//!
//! A first assignment binds a new symbol in the current scope with the value's
//! type; later assignments must be accepted by that type.

use integration_tests::Story;
use ss_resolve::ErrorKind;
use ss_ty::Type;

/// Each fresh name adds exactly one symbol to the root scope
#[test]
fn fresh_assignment_adds_one_symbol() {
    let story = Story::build(|b| {
        let one = b.int(1);
        let two = b.string("two");
        vec![b.assign("a", one), b.assign("b", two)]
    });
    let resolution = story.resolve().unwrap();
    let root = resolution.scope_of(story.tree.root()).unwrap();

    assert_eq!(resolution.scopes.get_scope(root).symbols.len(), 2);
    assert_eq!(story.root_type(&resolution, "a"), Some(Type::Int));
    assert_eq!(story.root_type(&resolution, "b"), Some(Type::String));
}

/// Reassigning an existing name never adds a second symbol
#[test]
fn reassignment_keeps_symbol_count() {
    let story = Story::build(|b| {
        let one = b.int(1);
        let three = b.int(3);
        vec![b.assign("a", one), b.assign("a", three)]
    });
    let resolution = story.resolve().unwrap();
    let root = resolution.scope_of(story.tree.root()).unwrap();

    assert_eq!(resolution.scopes.get_scope(root).symbols.len(), 1);
}

/// `a = 1` then `a = "x"` is rejected with both types reported
#[test]
fn incompatible_reassignment_is_rejected() {
    let story = Story::build(|b| {
        let one = b.int(1);
        let text = b.string("x");
        vec![b.assign("a", one), b.assign("a", text)]
    });
    let error = story.resolve_err();

    assert_eq!(error.code(), "type_assignment_different");
    assert_eq!(
        error.kind,
        ErrorKind::TypeAssignmentDifferent {
            target_type: Type::Int,
            source_type: Type::String,
        }
    );
}

/// Widening an int into a float variable keeps the variable a float
#[test]
fn accepted_reassignment_does_not_retype() {
    let story = Story::build(|b| {
        let ratio = b.float(0.5);
        let one = b.int(1);
        vec![b.assign("ratio", ratio), b.assign("ratio", one)]
    });
    let resolution = story.resolve().unwrap();

    assert_eq!(story.root_type(&resolution, "ratio"), Some(Type::Float));
}

/// A variable first assigned `null` can later hold anything
#[test]
fn null_binding_accepts_later_values() {
    let story = Story::build(|b| {
        let nothing = b.null();
        let text = b.string("later");
        vec![b.assign("slot", nothing), b.assign("slot", text)]
    });
    let resolution = story.resolve().unwrap();

    assert_eq!(story.root_type(&resolution, "slot"), Some(Type::Any));
}

/// Values built from other variables take their computed type
#[test]
fn assignment_from_expression() {
    let story = Story::build(|b| {
        let one = b.int(1);
        let a = b.path("a");
        let half = b.float(0.5);
        let sum = b.binary("+", a, half);
        let greeting = b.string("hi ");
        let name = b.string("you");
        let joined = b.binary("+", greeting, name);
        vec![b.assign("a", one), b.assign("b", sum), b.assign("c", joined)]
    });
    let resolution = story.resolve().unwrap();

    assert_eq!(story.root_type(&resolution, "b"), Some(Type::Float));
    assert_eq!(story.root_type(&resolution, "c"), Some(Type::String));
}

/// Reading an undefined name suggests close matches
#[test]
fn unresolved_variable_suggests_similar_names() {
    let story = Story::build(|b| {
        let one = b.int(1);
        let typo = b.path("countr");
        vec![b.assign("counter", one), b.assign("copy", typo)]
    });
    let error = story.resolve_err();

    assert_eq!(
        error.kind,
        ErrorKind::UnresolvedVariable {
            name: "countr".to_string(),
            suggestions: vec!["counter".to_string()],
        }
    );
}

/// Assigning through an index of a list stays within the element type
#[test]
fn indexed_assignment_checks_element_type() {
    let story = Story::build(|b| {
        let one = b.int(1);
        let two = b.int(2);
        let items = b.list(vec![one, two]);
        let zero = b.int(0);
        let target = b.indexed_path("items", vec![zero]);
        let text = b.string("x");
        let update = b.assignment(target, text);
        vec![b.assign("items", items), update]
    });
    let error = story.resolve_err();

    assert_eq!(
        error.kind,
        ErrorKind::TypeAssignmentDifferent {
            target_type: Type::Int,
            source_type: Type::String,
        }
    );
}
