//! Dependency graph over a variable batch
//!
//! Nodes are batch entries whose values can contain placeholders (strings
//! and maps). An edge `a -> b` means the template of `a` reads `b`, where `b`
//! is itself a batch key. Names that are not batch keys are external and
//! collected in [`DependencyGraph::missing`].

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use stencil_domain::{TemplateError, TemplateResult, Value, VariableMap};

use crate::template::Tokenizer;

/// Adjacency list of intra-batch references, in batch order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    edges: IndexMap<String, Vec<String>>,
    missing: IndexSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

impl DependencyGraph {
    /// Builds the graph for `vars`.
    ///
    /// Map values are walked field by field; references found anywhere inside
    /// are attributed to the top-level entry.
    ///
    /// # Errors
    ///
    /// Only a strict `tokenizer` fails, with the offending entry's name
    /// attached.
    pub fn build(vars: &VariableMap, tokenizer: &Tokenizer) -> TemplateResult<Self> {
        let mut graph = Self::default();

        for (name, value) in vars {
            if !matches!(value, Value::String(_) | Value::Map(_)) {
                continue;
            }

            let mut refs = Vec::new();
            collect_references(value, tokenizer, &mut refs)
                .map_err(|err| err.in_variable(name))?;

            let mut deps: Vec<String> = Vec::new();
            for referenced in refs {
                if vars.contains_key(&referenced) {
                    if !deps.contains(&referenced) {
                        deps.push(referenced);
                    }
                } else {
                    graph.missing.insert(referenced);
                }
            }

            graph.edges.insert(name.clone(), deps);
        }

        Ok(graph)
    }

    /// Returns the batch names `name` depends on.
    #[must_use]
    pub fn dependencies(&self, name: &str) -> &[String] {
        self.edges.get(name).map_or(&[], Vec::as_slice)
    }

    /// Returns true if `name` is a node of the graph.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.edges.contains_key(name)
    }

    /// Iterates over the graph nodes in batch order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(String::as_str)
    }

    /// Names referenced by the batch that are not batch keys.
    #[must_use]
    pub const fn missing(&self) -> &IndexSet<String> {
        &self.missing
    }

    /// Orders the nodes so every node follows its dependencies.
    ///
    /// Depth-first, post-order. Ties keep batch order, so the result is
    /// deterministic for a given input.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::CircularDependency`] with the names along the
    /// cycle, ending with the name that closed it. A self reference yields a
    /// two-element chain such as `["x", "x"]`.
    pub fn topological_order(&self) -> TemplateResult<Vec<String>> {
        let mut marks = HashMap::with_capacity(self.edges.len());
        let mut path = Vec::new();
        let mut order = Vec::with_capacity(self.edges.len());

        for node in self.edges.keys() {
            self.visit(node, &mut marks, &mut path, &mut order)?;
        }

        Ok(order)
    }

    fn visit<'a>(
        &'a self,
        node: &'a str,
        marks: &mut HashMap<&'a str, Mark>,
        path: &mut Vec<&'a str>,
        order: &mut Vec<String>,
    ) -> TemplateResult<()> {
        match marks.get(node) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => {
                let start = path.iter().position(|n| *n == node).unwrap_or(0);
                let chain = path[start..]
                    .iter()
                    .chain(std::iter::once(&node))
                    .map(|n| (*n).to_string())
                    .collect();
                return Err(TemplateError::CircularDependency { chain });
            }
            None => {}
        }

        marks.insert(node, Mark::InProgress);
        path.push(node);

        for dep in self.dependencies(node) {
            if self.contains(dep) {
                self.visit(dep, marks, path, order)?;
            }
        }

        path.pop();
        marks.insert(node, Mark::Done);
        order.push(node.to_string());
        Ok(())
    }
}

fn collect_references(
    value: &Value,
    tokenizer: &Tokenizer,
    refs: &mut Vec<String>,
) -> TemplateResult<()> {
    match value {
        Value::String(template) => {
            for token in tokenizer.tokenize(template)? {
                refs.extend(token.referenced_names().into_iter().map(str::to_string));
            }
        }
        Value::Map(map) => {
            for nested in map.values() {
                collect_references(nested, tokenizer, refs)?;
            }
        }
        _ => {}
    }
    Ok(())
}
