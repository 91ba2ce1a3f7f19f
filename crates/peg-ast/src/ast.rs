use serde::{Deserialize, Serialize};

use crate::pool::{CharClassDescriptor, ExpectedConst, FunctionDesc};
use peg_position::SourceLocation;

/// Three-valued static match-result tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    /// The expression always succeeds.
    Always = 1,
    /// The expression may or may not succeed.
    Sometimes = 0,
    /// The expression always fails.
    Never = -1,
}

impl MatchResult {
    /// Boolean negation used by `simple_not` (ALWAYS <-> NEVER, SOMETIMES
    /// unchanged).
    pub fn negate(self) -> MatchResult {
        match self {
            MatchResult::Always => MatchResult::Never,
            MatchResult::Never => MatchResult::Always,
            MatchResult::Sometimes => MatchResult::Sometimes,
        }
    }
}

/// The grammar root. Owns every descendant node and, after the generate
/// stage, the four constant pools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Grammar {
    /// Top-level initializer block (`{{ ... }}` in the grammar source).
    pub initializer: Option<Initializer>,
    /// Per-parse initializer block (`{ ... }` at the top of the grammar).
    pub per_parse_initializer: Option<Initializer>,
    /// Rules in declaration order.
    pub rules: Vec<Rule>,
    /// Deduplicated literal strings (populated by the bytecode generator).
    pub literals: Vec<String>,
    /// Deduplicated character-class descriptors.
    pub classes: Vec<CharClassDescriptor>,
    /// Deduplicated expected-token descriptors.
    pub expectations: Vec<ExpectedConst>,
    /// Deduplicated user-code function descriptors.
    pub functions: Vec<FunctionDesc>,
}

/// A top-level or per-parse initializer code block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Initializer {
    /// Raw user code.
    pub code: String,
    /// Span of the code block in the grammar source.
    pub location: SourceLocation,
}

/// A named parsing rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// Rule name, unique within the grammar (checked, not enforced here).
    pub name: String,
    /// Span of just the name token (used for duplicate-rule and
    /// left-recursion diagnostics).
    pub name_location: SourceLocation,
    /// The rule's body expression.
    pub expression: Expression,
    /// Span of the whole rule (`name "=" expression`).
    pub location: SourceLocation,
    /// Lowered bytecode, populated by the generate stage.
    pub bytecode: Option<Vec<u32>>,
}

/// One alternative polarity for a semantic predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredicatePolarity {
    /// `&{ ... }` — succeeds iff the code returns truthy.
    Positive,
    /// `!{ ... }` — succeeds iff the code returns falsy.
    Negative,
}

/// Operator for a [`Prefixed`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrefixedOperator {
    /// `$expr` — replace the match value with the consumed text.
    Text,
    /// `&expr` — positive lookahead.
    SimpleAnd,
    /// `!expr` — negative lookahead.
    SimpleNot,
}

/// Operator for a [`Suffixed`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuffixedOperator {
    /// `expr?`
    Optional,
    /// `expr*`
    ZeroOrMore,
    /// `expr+`
    OneOrMore,
}

/// One member of a character class: a single character or an inclusive
/// range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassPart {
    /// A single character, e.g. `a` in `[a-z]`.
    Char(char),
    /// An inclusive range, e.g. `a-z`.
    Range(char, char),
}

/// Gives a rule a human-readable name for error messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Named {
    /// Human-facing name, e.g. `"identifier"`.
    pub name: String,
    /// Wrapped expression.
    pub expression: Box<Expression>,
    /// Span of the whole `"name" expression` construct.
    pub location: SourceLocation,
    /// Inferred match result.
    pub match_result: Option<MatchResult>,
}

/// An ordered set of alternatives; the first to match wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    /// Alternatives in source order.
    pub alternatives: Vec<Expression>,
    /// Span of the whole choice expression.
    pub location: SourceLocation,
    /// Inferred match result.
    pub match_result: Option<MatchResult>,
}

/// A sub-expression paired with a user action code block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// Wrapped expression.
    pub expression: Box<Expression>,
    /// Raw action code.
    pub code: String,
    /// Span of just the code block.
    pub code_location: SourceLocation,
    /// Span of the whole `expression { code }` construct.
    pub location: SourceLocation,
    /// Inferred match result.
    pub match_result: Option<MatchResult>,
}

/// An ordered list of elements, all of which must match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sequence {
    /// Elements in source order.
    pub elements: Vec<Expression>,
    /// Span of the whole sequence expression.
    pub location: SourceLocation,
    /// Inferred match result.
    pub match_result: Option<MatchResult>,
}

/// Binds the result of a sub-expression to a label, optionally marking it
/// for auto-assembly (`@`, "pluck").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Labeled {
    /// Label name; `None` for an unlabeled pluck (`@expr`).
    pub label: Option<String>,
    /// Span of just the label token, if present.
    pub label_location: SourceLocation,
    /// Whether this label contributes to an auto-built sequence result.
    pub pick: bool,
    /// Wrapped expression.
    pub expression: Box<Expression>,
    /// Span of the whole labeled expression.
    pub location: SourceLocation,
    /// Inferred match result.
    pub match_result: Option<MatchResult>,
}

/// `text`/`simple_and`/`simple_not` prefix operators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prefixed {
    /// Which prefix operator this is.
    pub operator: PrefixedOperator,
    /// Wrapped expression.
    pub expression: Box<Expression>,
    /// Span of the whole prefixed expression.
    pub location: SourceLocation,
    /// Inferred match result.
    pub match_result: Option<MatchResult>,
}

/// `optional`/`zero_or_more`/`one_or_more` suffix operators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suffixed {
    /// Which suffix operator this is.
    pub operator: SuffixedOperator,
    /// Wrapped expression.
    pub expression: Box<Expression>,
    /// Span of the whole suffixed expression.
    pub location: SourceLocation,
    /// Inferred match result.
    pub match_result: Option<MatchResult>,
}

/// A parenthesized expression, forming a fresh label scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// Wrapped expression.
    pub expression: Box<Expression>,
    /// Span of the whole group expression.
    pub location: SourceLocation,
    /// Inferred match result.
    pub match_result: Option<MatchResult>,
}

/// A reference to another rule by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleReference {
    /// Target rule name.
    pub name: String,
    /// Span of the reference.
    pub location: SourceLocation,
    /// Inferred match result.
    pub match_result: Option<MatchResult>,
}

/// A user predicate code block (`&{ ... }` / `!{ ... }`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticPredicate {
    /// Whether this is a positive (`&`) or negative (`!`) predicate.
    pub polarity: PredicatePolarity,
    /// Raw predicate code.
    pub code: String,
    /// Span of just the code block.
    pub code_location: SourceLocation,
    /// Span of the whole predicate expression.
    pub location: SourceLocation,
    /// Inferred match result.
    pub match_result: Option<MatchResult>,
}

/// A literal string, optionally matched case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Literal {
    /// The literal text.
    pub value: String,
    /// Whether to match case-insensitively.
    pub ignore_case: bool,
    /// Span of the literal.
    pub location: SourceLocation,
    /// Inferred match result.
    pub match_result: Option<MatchResult>,
}

/// A character class (`[a-z]`, `[^0-9]`, etc.).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterClass {
    /// Characters and ranges in the class.
    pub parts: Vec<ClassPart>,
    /// Whether the class is negated (`[^...]`).
    pub inverted: bool,
    /// Whether to match case-insensitively.
    pub ignore_case: bool,
    /// Span of the class.
    pub location: SourceLocation,
    /// Inferred match result.
    pub match_result: Option<MatchResult>,
}

/// Matches any single input unit (`.`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Any {
    /// Span of the `.`.
    pub location: SourceLocation,
    /// Inferred match result.
    pub match_result: Option<MatchResult>,
}

/// Any parsing-expression node: a discriminated union, each variant
/// wrapping its own payload struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expression {
    /// See [`Named`].
    Named(Named),
    /// See [`Choice`].
    Choice(Choice),
    /// See [`Action`].
    Action(Action),
    /// See [`Sequence`].
    Sequence(Sequence),
    /// See [`Labeled`].
    Labeled(Labeled),
    /// See [`Prefixed`].
    Prefixed(Prefixed),
    /// See [`Suffixed`].
    Suffixed(Suffixed),
    /// See [`Group`].
    Group(Group),
    /// See [`RuleReference`].
    RuleReference(RuleReference),
    /// See [`SemanticPredicate`].
    SemanticPredicate(SemanticPredicate),
    /// See [`Literal`].
    Literal(Literal),
    /// See [`CharacterClass`].
    CharacterClass(CharacterClass),
    /// See [`Any`].
    Any(Any),
}

impl Expression {
    /// The node-type discriminator, matching the conventional `type` tag
    /// used in serialized PEG ASTs (useful for diagnostics and snapshot
    /// tests).
    pub fn type_name(&self) -> &'static str {
        match self {
            Expression::Named(_) => "named",
            Expression::Choice(_) => "choice",
            Expression::Action(_) => "action",
            Expression::Sequence(_) => "sequence",
            Expression::Labeled(_) => "labeled",
            Expression::Prefixed(p) => match p.operator {
                PrefixedOperator::Text => "text",
                PrefixedOperator::SimpleAnd => "simple_and",
                PrefixedOperator::SimpleNot => "simple_not",
            },
            Expression::Suffixed(s) => match s.operator {
                SuffixedOperator::Optional => "optional",
                SuffixedOperator::ZeroOrMore => "zero_or_more",
                SuffixedOperator::OneOrMore => "one_or_more",
            },
            Expression::Group(_) => "group",
            Expression::RuleReference(_) => "rule_ref",
            Expression::SemanticPredicate(p) => match p.polarity {
                PredicatePolarity::Positive => "semantic_and",
                PredicatePolarity::Negative => "semantic_not",
            },
            Expression::Literal(_) => "literal",
            Expression::CharacterClass(_) => "class",
            Expression::Any(_) => "any",
        }
    }

    /// Span of this node.
    pub fn location(&self) -> &SourceLocation {
        match self {
            Expression::Named(n) => &n.location,
            Expression::Choice(n) => &n.location,
            Expression::Action(n) => &n.location,
            Expression::Sequence(n) => &n.location,
            Expression::Labeled(n) => &n.location,
            Expression::Prefixed(n) => &n.location,
            Expression::Suffixed(n) => &n.location,
            Expression::Group(n) => &n.location,
            Expression::RuleReference(n) => &n.location,
            Expression::SemanticPredicate(n) => &n.location,
            Expression::Literal(n) => &n.location,
            Expression::CharacterClass(n) => &n.location,
            Expression::Any(n) => &n.location,
        }
    }

    /// Current match-result annotation, if the inference pass has run.
    pub fn match_result(&self) -> Option<MatchResult> {
        match self {
            Expression::Named(n) => n.match_result,
            Expression::Choice(n) => n.match_result,
            Expression::Action(n) => n.match_result,
            Expression::Sequence(n) => n.match_result,
            Expression::Labeled(n) => n.match_result,
            Expression::Prefixed(n) => n.match_result,
            Expression::Suffixed(n) => n.match_result,
            Expression::Group(n) => n.match_result,
            Expression::RuleReference(n) => n.match_result,
            Expression::SemanticPredicate(n) => n.match_result,
            Expression::Literal(n) => n.match_result,
            Expression::CharacterClass(n) => n.match_result,
            Expression::Any(n) => n.match_result,
        }
    }

    /// Overwrites the match-result annotation.
    pub fn set_match_result(&mut self, result: MatchResult) {
        let slot = match self {
            Expression::Named(n) => &mut n.match_result,
            Expression::Choice(n) => &mut n.match_result,
            Expression::Action(n) => &mut n.match_result,
            Expression::Sequence(n) => &mut n.match_result,
            Expression::Labeled(n) => &mut n.match_result,
            Expression::Prefixed(n) => &mut n.match_result,
            Expression::Suffixed(n) => &mut n.match_result,
            Expression::Group(n) => &mut n.match_result,
            Expression::RuleReference(n) => &mut n.match_result,
            Expression::SemanticPredicate(n) => &mut n.match_result,
            Expression::Literal(n) => &mut n.match_result,
            Expression::CharacterClass(n) => &mut n.match_result,
            Expression::Any(n) => &mut n.match_result,
        };
        *slot = Some(result);
    }

    /// The single `expression` child, for the variants that wrap exactly
    /// one sub-expression. Returns `None` for `Choice`, `Sequence`, and the
    /// primary atoms.
    pub fn single_child(&self) -> Option<&Expression> {
        match self {
            Expression::Named(n) => Some(&n.expression),
            Expression::Action(n) => Some(&n.expression),
            Expression::Labeled(n) => Some(&n.expression),
            Expression::Prefixed(n) => Some(&n.expression),
            Expression::Suffixed(n) => Some(&n.expression),
            Expression::Group(n) => Some(&n.expression),
            _ => None,
        }
    }

    /// Mutable version of [`Expression::single_child`].
    pub fn single_child_mut(&mut self) -> Option<&mut Expression> {
        match self {
            Expression::Named(n) => Some(&mut n.expression),
            Expression::Action(n) => Some(&mut n.expression),
            Expression::Labeled(n) => Some(&mut n.expression),
            Expression::Prefixed(n) => Some(&mut n.expression),
            Expression::Suffixed(n) => Some(&mut n.expression),
            Expression::Group(n) => Some(&mut n.expression),
            _ => None,
        }
    }
}
