//! Hand-built grammar fixtures shared by the compiler crates' test suites.
//!
//! Every fixture here mirrors a small representative grammar shape, built
//! with `peg_ast::builder` instead of parsed from grammar text — this
//! workspace has no grammar-text parser, so hand-construction is the only
//! way to get an AST to exercise.

pub mod grammars {
    use peg_ast::builder::*;
    use peg_ast::{Expression, Grammar, SourceLocation};

    /// `start = X` — `X` is never defined.
    pub fn undefined_rule() -> (Grammar, SourceLocation) {
        let x_ref_location = span(7, 8);
        let start = rule("start", rule_ref_at("X", x_ref_location.clone()));
        (grammar(vec![start]), x_ref_location)
    }

    /// `start = head:Factor head:(_ ("*" / "/") _ Factor)*`
    ///
    /// Returns the grammar plus the location of the *second* `head` label
    /// (the one the duplicate-label check should flag) and of the first.
    pub fn duplicate_labels() -> (Grammar, SourceLocation, SourceLocation) {
        let first_label_loc = span(6, 10);
        let second_label_loc = span(22, 26);

        let factor_ref = || rule_ref("Factor");
        let ws_ref = || rule_ref("_");
        let op = choice(vec![lit("*"), lit("/")]);

        let inner = sequence(vec![ws_ref(), op, ws_ref(), factor_ref()]);
        let second_head = labeled_at(Some("head"), false, group(inner), second_label_loc.clone());

        let body = sequence(vec![
            labeled_at(Some("head"), false, factor_ref(), first_label_loc.clone()),
            zero_or_more(second_head),
        ]);

        let start = rule("start", body);
        let factor = rule("Factor", any());
        let ws = rule("_", zero_or_more(lit(" ")));
        (grammar(vec![start, factor, ws]), first_label_loc, second_label_loc)
    }

    /// `start = "a"? start` — `start` left-recurses through its own
    /// optional prefix.
    pub fn left_recursion() -> (Grammar, SourceLocation) {
        let name_location = span(0, 5);
        let self_ref = rule_ref_at("start", span(10, 15));
        let body = sequence(vec![optional(lit("a")), self_ref]);
        let start = rule_at("start", body, name_location.clone());
        (grammar(vec![start]), name_location)
    }

    /// `start = ("a"?)*` — the starred operand may succeed without
    /// consuming input.
    pub fn infinite_repetition() -> (Grammar, SourceLocation) {
        let star_location = span(7, 16);
        let body = zero_or_more_at(group(optional(lit("a"))), star_location.clone());
        let start = rule("start", body);
        (grammar(vec![start]), star_location)
    }

    /// `start = @"a" { return 1; }` — illegal: a pluck inside an action.
    pub fn pluck_inside_action() -> (Grammar, SourceLocation) {
        let pluck_location = span(7, 8);
        let body = action(labeled_at(None, true, lit("a"), pluck_location.clone()), "return 1;");
        let start = rule("start", body);
        (grammar(vec![start]), pluck_location)
    }

    /// `A = B`, `B = "x"` — `A` is a proxy rule for `B`.
    pub fn proxy_rule() -> Grammar {
        let a = rule("A", rule_ref("B"));
        let b = rule("B", lit("x"));
        grammar(vec![a, b])
    }

    /// `A = "a"? "b"` — exercises every match-result inference rule once.
    pub fn optional_then_literal() -> Grammar {
        let body = sequence(vec![optional(lit("a")), lit("b")]);
        grammar(vec![rule("A", body)])
    }

    /// `start = "a"` — the single-character-literal bytecode fixture.
    pub fn single_char_literal() -> Grammar {
        grammar(vec![rule("start", lit("a"))])
    }

    /// A small but structurally rich arithmetic-expression grammar,
    /// touching every `Expression` variant at least once: used by visitor
    /// and generic-traversal tests that just need "some real grammar",
    /// not a specific diagnostic scenario.
    pub fn arithmetic_expression() -> Grammar {
        let digit = class(vec![peg_ast::ClassPart::Range('0', '9')], false, false);
        let number =
            rule("Number", action(text(one_or_more(digit)), "return Number(text);"));

        let ws = rule("_", zero_or_more(class(vec![peg_ast::ClassPart::Char(' ')], false, false)));

        let factor_body: Expression = choice(vec![
            sequence(vec![lit("("), rule_ref("_"), rule_ref("Expr"), rule_ref("_"), lit(")")]),
            rule_ref("Number"),
        ]);
        let factor = rule("Factor", factor_body);

        let term_body = action(
            sequence(vec![
                labeled(Some("head"), false, rule_ref("Factor")),
                labeled(
                    Some("tail"),
                    false,
                    zero_or_more(sequence(vec![
                        rule_ref("_"),
                        labeled(Some("op"), false, choice(vec![lit("*"), lit("/")])),
                        rule_ref("_"),
                        rule_ref("Factor"),
                    ])),
                ),
            ]),
            "return fold(head, tail);",
        );
        let term = rule("Term", term_body);

        let expr_body = action(
            sequence(vec![
                labeled(Some("head"), false, rule_ref("Term")),
                labeled(
                    Some("tail"),
                    false,
                    zero_or_more(sequence(vec![
                        rule_ref("_"),
                        labeled(Some("op"), false, choice(vec![lit("+"), lit("-")])),
                        rule_ref("_"),
                        rule_ref("Term"),
                    ])),
                ),
            ]),
            "return fold(head, tail);",
        );
        let expr = rule("Expr", expr_body);

        let start_body = sequence(vec![
            simple_and(rule_ref("Expr")),
            named("expression", rule_ref("Expr")),
            simple_not(any()),
        ]);
        let start = rule("start", start_body);

        grammar(vec![start, expr, term, factor, number, ws])
    }

    /// A deliberately pathological grammar used to check the fixed-point
    /// inference cap: a chain of 3 mutually-referencing proxy-like rules
    /// whose match results all start `SOMETIMES` and must stabilize well
    /// under 6 iterations.
    pub fn three_rule_cycle_free_chain() -> Grammar {
        let c = rule("C", lit("c"));
        let b = rule("B", choice(vec![rule_ref("C"), lit("b")]));
        let a = rule("A", sequence(vec![rule_ref("B"), optional(rule_ref("C"))]));
        grammar(vec![a, b, c])
    }
}
