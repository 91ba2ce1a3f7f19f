//! The four constant pools interned during generation: literals, character
//! classes, expectations, and user-code functions. Each pool deduplicates by
//! structural equality so two occurrences of the same literal, class, or
//! function body anywhere in the grammar share one index.

use rustc_hash::FxHashMap;

use peg_ast::{CharClassDescriptor, ExpectedConst, FunctionDesc};

/// Owns the four pools while a grammar is being generated, plus the dedup
/// side-tables used to find an existing entry before appending a new one.
/// Indices are assigned in first-use order, which is also emission order —
/// the (out-of-scope) emitter serializes pools in array order, so this
/// ordering is observable, not an implementation detail.
#[derive(Debug, Default)]
pub struct Pools {
    literals: Vec<String>,
    literal_index: FxHashMap<String, u32>,

    classes: Vec<CharClassDescriptor>,
    class_index: FxHashMap<(Vec<peg_ast::ClassPart>, bool, bool), u32>,

    expectations: Vec<ExpectedConst>,
    expectation_index: FxHashMap<ExpectedConst, u32>,

    functions: Vec<FunctionDesc>,
    function_index: FxHashMap<(peg_ast::FunctionKind, Vec<String>, String), u32>,
}

impl Pools {
    /// Interns `value` into the literal pool, returning its index.
    pub fn intern_literal(&mut self, value: &str) -> u32 {
        if let Some(&idx) = self.literal_index.get(value) {
            return idx;
        }
        let idx = self.literals.len() as u32;
        self.literals.push(value.to_string());
        self.literal_index.insert(value.to_string(), idx);
        idx
    }

    /// Interns `descriptor` into the class pool, returning its index.
    pub fn intern_class(&mut self, descriptor: CharClassDescriptor) -> u32 {
        let key = descriptor.dedup_key();
        if let Some(&idx) = self.class_index.get(&key) {
            return idx;
        }
        let idx = self.classes.len() as u32;
        self.classes.push(descriptor);
        self.class_index.insert(key, idx);
        idx
    }

    /// Interns `expected` into the expectations pool, returning its index.
    pub fn intern_expectation(&mut self, expected: ExpectedConst) -> u32 {
        if let Some(&idx) = self.expectation_index.get(&expected) {
            return idx;
        }
        let idx = self.expectations.len() as u32;
        self.expectations.push(expected.clone());
        self.expectation_index.insert(expected, idx);
        idx
    }

    /// Interns `function` into the functions pool, returning its index.
    pub fn intern_function(&mut self, function: FunctionDesc) -> u32 {
        let key = function.dedup_key();
        if let Some(&idx) = self.function_index.get(&key) {
            return idx;
        }
        let idx = self.functions.len() as u32;
        self.functions.push(function);
        self.function_index.insert(key, idx);
        idx
    }

    /// Consumes the builder, returning the four pools in the order
    /// `Grammar`'s fields expect them.
    pub fn into_parts(
        self,
    ) -> (Vec<String>, Vec<CharClassDescriptor>, Vec<ExpectedConst>, Vec<FunctionDesc>) {
        (self.literals, self.classes, self.expectations, self.functions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peg_ast::FunctionKind;
    use peg_position::SourceLocation;

    #[test]
    fn literal_interning_deduplicates() {
        let mut pools = Pools::default();
        let a = pools.intern_literal("foo");
        let b = pools.intern_literal("bar");
        let c = pools.intern_literal("foo");
        assert_eq!(a, c);
        assert_ne!(a, b);
    }

    #[test]
    fn function_interning_ignores_location() {
        let mut pools = Pools::default();
        let f1 = FunctionDesc {
            kind: FunctionKind::Action,
            params: vec!["x".to_string()],
            body: "return x;".to_string(),
            location: SourceLocation::synthetic(),
        };
        let mut f2 = f1.clone();
        f2.location = SourceLocation::new(
            None,
            peg_position::Position::new(2, 1, 10),
            peg_position::Position::new(2, 5, 14),
        );
        let idx1 = pools.intern_function(f1);
        let idx2 = pools.intern_function(f2);
        assert_eq!(idx1, idx2);
    }

    #[test]
    fn into_parts_preserves_first_use_order() {
        let mut pools = Pools::default();
        pools.intern_literal("b");
        pools.intern_literal("a");
        let (literals, ..) = pools.into_parts();
        assert_eq!(literals, vec!["b".to_string(), "a".to_string()]);
    }
}
