//! End-to-end tests for the generalized engine: conflicted tables, forest
//! packing, lazy tree enumeration, frontier merging, and rejection.

use lrkit::glr::SymbolNode;
use lrkit::{GlrConfig, GlrParser, ParseTable, TableBuilder};
use std::sync::Arc;

// Terminals for the ambiguous addition grammar.
const A: usize = 0;
const PLUS: usize = 1;
const END: usize = 2;

/// `E -> E + E | a`, deliberately left with its shift/reduce conflict so
/// both associativities survive.
fn ambiguous_addition_table() -> Arc<ParseTable> {
    const E: usize = 0;
    let mut b = TableBuilder::new(5);
    let p_add = b.production(E, 3);
    let p_a = b.production(E, 1);

    b.shift(0, A, 1).goto(0, E, 2);
    b.reduce(1, PLUS, p_a).reduce(1, END, p_a);
    b.shift(2, PLUS, 3).accept(2, END);
    b.shift(3, A, 1).goto(3, E, 4);
    // State 4 both reduces E -> E + E and shifts the next `+`.
    b.reduce(4, PLUS, p_add)
        .reduce(4, END, p_add)
        .shift(4, PLUS, 3);

    Arc::new(b.build().unwrap())
}

fn parse(table: Arc<ParseTable>, tokens: &[usize]) -> GlrParser {
    let mut parser = GlrParser::new(table, GlrConfig::default());
    for &token in tokens {
        parser.post(token);
    }
    parser
}

#[test]
fn both_associativities_of_a_plus_a_plus_a_survive() {
    let parser = parse(ambiguous_addition_table(), &[A, PLUS, A, PLUS, A, END]);
    assert!(parser.is_accepted());
    assert!(!parser.is_rejected());

    let forest = parser.forest();
    assert_eq!(forest.tree_count(), 2);
    assert!(forest.is_ambiguous());
    for tree in forest.trees() {
        assert_eq!(tree.fringe(), vec![A, PLUS, A, PLUS, A]);
    }
}

#[test]
fn local_ambiguity_packs_into_one_root() {
    let parser = parse(ambiguous_addition_table(), &[A, PLUS, A, PLUS, A, END]);
    // One accepted root carrying both derivations as alternatives, not two
    // roots and not duplicated alternatives.
    let roots = parser.accepted_roots();
    assert_eq!(roots.len(), 1);
    match parser.gss().node(roots[0]) {
        SymbolNode::Packed { alternatives, .. } => assert_eq!(alternatives.len(), 2),
        SymbolNode::Leaf { .. } => panic!("root must be a nonterminal node"),
    }
}

#[test]
fn tree_iterator_is_exhaustive_then_idempotent() {
    let parser = parse(ambiguous_addition_table(), &[A, PLUS, A, PLUS, A, END]);
    let forest = parser.forest();
    let expected = forest.tree_count();

    let mut iter = forest.trees();
    let mut seen = Vec::new();
    while let Some(tree) = iter.next() {
        seen.push(tree);
    }
    assert_eq!(seen.len(), expected);
    // Every enumerated tree is distinct.
    for (i, tree) in seen.iter().enumerate() {
        assert!(!seen[i + 1..].contains(tree));
    }
    assert!(iter.next().is_none());
    assert!(iter.next().is_none());
}

#[test]
fn unambiguous_input_yields_one_tree() {
    let parser = parse(ambiguous_addition_table(), &[A, END]);
    assert!(parser.is_accepted());
    let forest = parser.forest();
    assert_eq!(forest.tree_count(), 1);
    assert!(!forest.is_ambiguous());
}

#[test]
fn merging_bounds_the_frontier_by_state_count() {
    let table = ambiguous_addition_table();
    let num_states = table.num_states();
    let mut parser = GlrParser::new(table, GlrConfig::default());
    for &token in &[A, PLUS, A, PLUS, A, PLUS, A, PLUS, A, END] {
        parser.post(token);
        assert!(parser.frontier().len() <= num_states);
    }
    assert!(parser.is_accepted());
}

#[test]
fn dead_input_drains_the_frontier() {
    let mut parser = GlrParser::new(ambiguous_addition_table(), GlrConfig::default());
    assert!(parser.post(A));
    // `a a` has no viable continuation anywhere.
    assert!(!parser.post(A));
    assert!(parser.is_rejected());
    assert!(!parser.is_accepted());
    assert!(parser.frontier().is_empty());
    assert_eq!(parser.accepted_roots(), &[]);
}

#[test]
fn stepwise_advance_finishes_each_token_exactly_once() {
    let mut parser = GlrParser::new(ambiguous_addition_table(), GlrConfig::default());
    for (i, &token) in [A, PLUS, A, END].iter().enumerate() {
        assert_eq!(parser.generation(), i);
        parser.begin_token(token);
        let mut steps = 0;
        while parser.advance() {
            steps += 1;
            assert!(steps < 10_000, "token failed to converge");
        }
        assert_eq!(parser.generation(), i + 1);
        // The token is closed; further stepping is a no-op.
        assert!(!parser.advance());
    }
    assert!(parser.is_accepted());
}

#[test]
fn reset_starts_a_fresh_parse() {
    let mut parser = GlrParser::new(ambiguous_addition_table(), GlrConfig::default());
    parser.post(A);
    parser.post(A);
    assert!(parser.is_rejected());

    parser.reset();
    assert!(!parser.is_rejected());
    for &token in &[A, PLUS, A, END] {
        parser.post(token);
    }
    assert!(parser.is_accepted());
    assert_eq!(parser.forest().tree_count(), 1);
}

#[test]
fn snapshot_names_every_vertex_and_node() {
    let parser = parse(ambiguous_addition_table(), &[A, PLUS, A, END]);
    let snapshot = parser.snapshot();
    assert_eq!(snapshot.vertices.len(), parser.gss().vertex_count());
    assert_eq!(snapshot.nodes.len(), parser.gss().node_count());
    for (i, vertex) in snapshot.vertices.iter().enumerate() {
        assert_eq!(vertex.id, i);
    }
}

mod pp_attachment {
    use super::*;

    // I saw a man in the park with a scope.
    const PRO: usize = 0;
    const V: usize = 1;
    const DET: usize = 2;
    const N: usize = 3;
    const P: usize = 4;
    const END: usize = 5;

    /// A small natural-language grammar whose prepositional phrases attach
    /// to either the verb phrase or a noun phrase:
    ///
    /// ```text
    /// S  -> NP VP
    /// VP -> V NP | VP PP
    /// NP -> Det N | NP PP | Pro
    /// PP -> P NP
    /// ```
    fn table() -> Arc<ParseTable> {
        const S: usize = 0;
        const NP: usize = 1;
        const VP: usize = 2;
        const PP: usize = 3;

        let mut b = TableBuilder::new(13);
        let p_s = b.production(S, 2);
        let p_v_np = b.production(VP, 2);
        let p_vp_pp = b.production(VP, 2);
        let p_det_n = b.production(NP, 2);
        let p_np_pp = b.production(NP, 2);
        let p_pro = b.production(NP, 1);
        let p_p_np = b.production(PP, 2);

        b.shift(0, PRO, 1).shift(0, DET, 2);
        b.goto(0, S, 4).goto(0, NP, 5);

        b.reduce(1, V, p_pro).reduce(1, P, p_pro).reduce(1, END, p_pro);

        b.shift(2, N, 3);
        b.reduce(3, V, p_det_n)
            .reduce(3, P, p_det_n)
            .reduce(3, END, p_det_n);

        b.accept(4, END);

        b.shift(5, V, 6).shift(5, P, 7);
        b.goto(5, VP, 8).goto(5, PP, 9);

        b.shift(6, PRO, 1).shift(6, DET, 2);
        b.goto(6, NP, 10);

        b.shift(7, PRO, 1).shift(7, DET, 2);
        b.goto(7, NP, 11);

        b.reduce(8, END, p_s).shift(8, P, 7);
        b.goto(8, PP, 12);

        b.reduce(9, V, p_np_pp)
            .reduce(9, P, p_np_pp)
            .reduce(9, END, p_np_pp);

        // Attach the next PP to the verb phrase or to its object.
        b.reduce(10, P, p_v_np)
            .reduce(10, END, p_v_np)
            .shift(10, P, 7);
        b.goto(10, PP, 9);

        // Attach the next PP to the preposition's object or one level up.
        b.reduce(11, V, p_p_np)
            .reduce(11, P, p_p_np)
            .reduce(11, END, p_p_np)
            .shift(11, P, 7);
        b.goto(11, PP, 9);

        b.reduce(12, P, p_vp_pp).reduce(12, END, p_vp_pp);

        Arc::new(b.build().unwrap())
    }

    #[test]
    fn two_prepositional_phrases_yield_five_attachments() {
        let tokens = [PRO, V, DET, N, P, DET, N, P, DET, N, END];
        let parser = parse(table(), &tokens);
        assert!(parser.is_accepted());

        let forest = parser.forest();
        assert!(forest.is_ambiguous());
        assert_eq!(forest.tree_count(), 5);
        for tree in forest.trees() {
            assert_eq!(tree.fringe(), tokens[..tokens.len() - 1].to_vec());
        }
    }

    #[test]
    fn one_prepositional_phrase_yields_two_attachments() {
        let parser = parse(table(), &[PRO, V, DET, N, P, DET, N, END]);
        assert!(parser.is_accepted());
        assert_eq!(parser.forest().tree_count(), 2);
    }

    #[test]
    fn no_prepositional_phrase_is_unambiguous() {
        let parser = parse(table(), &[PRO, V, DET, N, END]);
        assert!(parser.is_accepted());
        assert_eq!(parser.forest().tree_count(), 1);
    }
}
