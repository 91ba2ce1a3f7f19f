//! Generic AST traversal scheme built around a "visitor factory": two
//! traits covering the two traversal primitives a grammar compiler needs.
//!
//! [`ExpressionVisitor`] covers every expression node and the atoms beneath
//! it, and [`GrammarVisitor`] extends it with defaults for the root and
//! container nodes. Both carry a typed auxiliary context `Ctx` through the
//! traversal (an environment for duplicate-label detection, a compilation
//! context for bytecode generation, ...); handlers call back into the
//! dispatcher with a (possibly modified) `Ctx` to recurse.
//!
//! Every method has a name mirroring the node it visits. Nodes with exactly
//! one `expression` child (`Named`, `Action`, `Labeled`, `Prefixed`,
//! `Suffixed`, `Group`) get a default implementation that just recurses into
//! that child. `Choice` and `Sequence` have no single
//! child and so carry no default; every primary atom
//! (`Literal`/`CharacterClass`/`Any`/`RuleReference`/`SemanticPredicate`)
//! has no generic default either, since there is nothing to recurse into.

use peg_ast::{
    Action, Any, CharacterClass, Choice, Expression, Grammar, Group, Initializer, Labeled,
    Literal, Named, Prefixed, Rule, RuleReference, Sequence, SemanticPredicate, Suffixed,
};

/// Traverses every [`Expression`] variant. `Output` is whatever the
/// implementing pass produces (`()` for a pure side-effecting check pass,
/// an annotation for match-result inference, a bytecode fragment for the
/// generator, ...).
pub trait ExpressionVisitor<Ctx> {
    /// What each visit method returns.
    type Output;

    /// Dispatches on `expr`'s discriminator.
    fn visit_expression(&mut self, expr: &Expression, ctx: Ctx) -> Self::Output {
        match expr {
            Expression::Named(n) => self.visit_named(n, ctx),
            Expression::Choice(n) => self.visit_choice(n, ctx),
            Expression::Action(n) => self.visit_action(n, ctx),
            Expression::Sequence(n) => self.visit_sequence(n, ctx),
            Expression::Labeled(n) => self.visit_labeled(n, ctx),
            Expression::Prefixed(n) => self.visit_prefixed(n, ctx),
            Expression::Suffixed(n) => self.visit_suffixed(n, ctx),
            Expression::Group(n) => self.visit_group(n, ctx),
            Expression::RuleReference(n) => self.visit_rule_reference(n, ctx),
            Expression::SemanticPredicate(n) => self.visit_semantic_predicate(n, ctx),
            Expression::Literal(n) => self.visit_literal(n, ctx),
            Expression::CharacterClass(n) => self.visit_character_class(n, ctx),
            Expression::Any(n) => self.visit_any(n, ctx),
        }
    }

    /// No generic default: there is no single child to recurse into.
    fn visit_choice(&mut self, node: &Choice, ctx: Ctx) -> Self::Output;
    /// No generic default: there is no single child to recurse into.
    fn visit_sequence(&mut self, node: &Sequence, ctx: Ctx) -> Self::Output;

    /// No generic default: this is a primary atom.
    fn visit_literal(&mut self, node: &Literal, ctx: Ctx) -> Self::Output;
    /// No generic default: this is a primary atom.
    fn visit_character_class(&mut self, node: &CharacterClass, ctx: Ctx) -> Self::Output;
    /// No generic default: this is a primary atom.
    fn visit_any(&mut self, node: &Any, ctx: Ctx) -> Self::Output;
    /// No generic default: this is a primary atom.
    fn visit_rule_reference(&mut self, node: &RuleReference, ctx: Ctx) -> Self::Output;
    /// No generic default: this is a primary atom.
    fn visit_semantic_predicate(&mut self, node: &SemanticPredicate, ctx: Ctx) -> Self::Output;

    /// Default: recurse into `node.expression`.
    fn visit_named(&mut self, node: &Named, ctx: Ctx) -> Self::Output {
        self.visit_expression(&node.expression, ctx)
    }
    /// Default: recurse into `node.expression`.
    fn visit_action(&mut self, node: &Action, ctx: Ctx) -> Self::Output {
        self.visit_expression(&node.expression, ctx)
    }
    /// Default: recurse into `node.expression`.
    fn visit_labeled(&mut self, node: &Labeled, ctx: Ctx) -> Self::Output {
        self.visit_expression(&node.expression, ctx)
    }
    /// Default: recurse into `node.expression`.
    fn visit_prefixed(&mut self, node: &Prefixed, ctx: Ctx) -> Self::Output {
        self.visit_expression(&node.expression, ctx)
    }
    /// Default: recurse into `node.expression`.
    fn visit_suffixed(&mut self, node: &Suffixed, ctx: Ctx) -> Self::Output {
        self.visit_expression(&node.expression, ctx)
    }
    /// Default: recurse into `node.expression`.
    fn visit_group(&mut self, node: &Group, ctx: Ctx) -> Self::Output {
        self.visit_expression(&node.expression, ctx)
    }
}

/// Extends [`ExpressionVisitor`] with defaults for the grammar root and its
/// rules. `Grammar`/`Rule` visitation needs `Ctx: Clone` because the default
/// `visit_grammar` hands each rule its own copy of the starting context.
pub trait GrammarVisitor<Ctx>: ExpressionVisitor<Ctx> {
    /// Visits a top-level or per-parse initializer. No generic default: an
    /// initializer carries no `expression` child.
    fn visit_initializer(&mut self, node: &Initializer, ctx: Ctx) -> Self::Output;

    /// Default: recurse into the rule's body expression.
    fn visit_rule(&mut self, node: &Rule, ctx: Ctx) -> Self::Output {
        self.visit_expression(&node.expression, ctx)
    }

    /// Default: visit both initializers (if present) then every rule in
    /// order, discarding their outputs (a grammar-level walk is for
    /// side-effecting passes; callers needing per-rule outputs should
    /// iterate `grammar.rules` themselves and call `visit_rule` directly).
    /// Requires `Output: Default` only because this default has to return
    /// *something* after throwing every per-rule output away.
    fn visit_grammar(&mut self, node: &Grammar, ctx: Ctx) -> Self::Output
    where
        Ctx: Clone,
        Self::Output: Default,
    {
        if let Some(initializer) = &node.initializer {
            self.visit_initializer(initializer, ctx.clone());
        }
        if let Some(initializer) = &node.per_parse_initializer {
            self.visit_initializer(initializer, ctx.clone());
        }
        for rule in &node.rules {
            self.visit_rule(rule, ctx.clone());
        }
        Self::Output::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peg_tdd_support::grammars;

    struct CountLeaves {
        count: usize,
    }

    impl ExpressionVisitor<()> for CountLeaves {
        type Output = ();

        fn visit_choice(&mut self, node: &Choice, _ctx: ()) {
            for alt in &node.alternatives {
                self.visit_expression(alt, ());
            }
        }

        fn visit_sequence(&mut self, node: &Sequence, _ctx: ()) {
            for el in &node.elements {
                self.visit_expression(el, ());
            }
        }

        fn visit_literal(&mut self, _node: &Literal, _ctx: ()) {
            self.count += 1;
        }

        fn visit_character_class(&mut self, _node: &CharacterClass, _ctx: ()) {
            self.count += 1;
        }

        fn visit_any(&mut self, _node: &Any, _ctx: ()) {
            self.count += 1;
        }

        fn visit_rule_reference(&mut self, _node: &RuleReference, _ctx: ()) {
            self.count += 1;
        }

        fn visit_semantic_predicate(&mut self, _node: &SemanticPredicate, _ctx: ()) {
            self.count += 1;
        }
    }

    impl GrammarVisitor<()> for CountLeaves {
        fn visit_initializer(&mut self, _node: &Initializer, _ctx: ()) {}
    }

    #[test]
    fn default_recursion_reaches_every_leaf() {
        let grammar = grammars::arithmetic_expression();
        let mut counter = CountLeaves { count: 0 };
        counter.visit_grammar(&grammar, ());
        assert!(counter.count > 0);
    }
}
