use crate::parse::{ast::ExpressionTree, SyntaxError};
use crate::roll::Limits;
use std::collections::hash_map::{Entry, HashMap};

/// Compiled expressions keyed by their exact source text.
///
/// Only successful compiles are stored: looking up a string that failed before
/// compiles it again and reports the same error.
#[derive(Debug, Default)]
pub struct ExpressionCache {
    trees: HashMap<String, ExpressionTree>,
    limits: Limits,
}

impl ExpressionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache that compiles with `limits.max_depth` instead of the default.
    pub fn with_limits(limits: Limits) -> Self {
        Self {
            trees: HashMap::new(),
            limits,
        }
    }

    pub fn get_or_compile(&mut self, source: &str) -> Result<&mut ExpressionTree, SyntaxError> {
        match self.trees.entry(source.to_owned()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let tree = crate::compile_with_limits(source, &self.limits)?;
                Ok(entry.insert(tree))
            }
        }
    }

    pub fn get(&self, source: &str) -> Option<&ExpressionTree> {
        self.trees.get(source)
    }

    pub fn contains(&self, source: &str) -> bool {
        self.trees.contains_key(source)
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}
