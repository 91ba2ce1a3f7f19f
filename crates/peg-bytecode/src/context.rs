//! The compilation context threaded through emission: the simulated
//! stack-pointer discipline, the label environment, and the nearest
//! enclosing action.
//!
//! `env` is a plain owned, order-preserving list rather than a shared map so
//! that `Group`, `Choice` alternatives, and any other scope boundary can
//! take an independent clone, exactly the way duplicate-label scoping does
//! in the semantic-analyzer crate: mutations inside a nested scope never
//! leak back out through a shared reference. Order matters here beyond
//! scoping: a `CALL`'s argument offsets are built by walking `env` in
//! binding order, so a `HashMap` (whose iteration order is unspecified)
//! would make the emitted argument list nondeterministic between runs.

use peg_ast::SourceLocation;

/// A user action body visible to the innermost enclosing `Action`, captured
/// so a bare (non-sequence) child of that action can still fuse into the
/// action-call tail described for `sequence`.
#[derive(Debug, Clone)]
pub struct EnclosingAction {
    /// Raw action code.
    pub code: String,
    /// Span of the code block.
    pub code_location: SourceLocation,
}

/// Per-expression emission context.
#[derive(Debug, Clone, Default)]
pub struct EmitContext {
    /// Simulated stack pointer: the offset of the most recently pushed
    /// value relative to the start of the current rule's emission.
    pub sp: i32,
    /// Label bindings in the order they were bound: `(name, sp-at-bind)`.
    pub env: Vec<(String, i32)>,
    /// Nearest enclosing action, if any.
    pub action: Option<EnclosingAction>,
}

impl EmitContext {
    /// A fresh context at the start of a rule body: `sp = -1`, empty env, no
    /// enclosing action.
    pub fn for_rule() -> Self {
        EmitContext { sp: -1, env: Vec::new(), action: None }
    }

    /// A context for a nested scope (`group`), sharing `sp` and `action` but
    /// with its own copy of `env` so labels bound inside don't leak out.
    pub fn nested_scope(&self) -> Self {
        EmitContext { sp: self.sp, env: self.env.clone(), action: self.action.clone() }
    }

    /// Binds `label` to the current `sp`, or rebinds it if already present
    /// (a repeated label in a grammar that passed duplicate-label checking
    /// can only happen across sibling choice alternatives, never within one
    /// scope).
    pub fn bind(&mut self, label: &str, sp: i32) {
        if let Some(entry) = self.env.iter_mut().find(|(name, _)| name == label) {
            entry.1 = sp;
        } else {
            self.env.push((label.to_string(), sp));
        }
    }

    /// Offset from the current `sp` back to where `label` was bound, for use
    /// as a `CALL` operand.
    pub fn offset_of(&self, label: &str) -> Option<i32> {
        self.env.iter().find(|(name, _)| name == label).map(|&(_, bound_sp)| self.sp - bound_sp)
    }

    /// Every bound label's current offset from `sp`, in binding order — the
    /// argument list for a `CALL` into an action or predicate function.
    pub fn call_offsets(&self) -> Vec<i32> {
        self.env.iter().map(|&(_, bound_sp)| self.sp - bound_sp).collect()
    }

    /// Every bound label's name, in binding order — the parameter list
    /// recorded on the interned [`peg_ast::FunctionDesc`].
    pub fn call_params(&self) -> Vec<String> {
        self.env.iter().map(|(name, _)| name.clone()).collect()
    }
}
