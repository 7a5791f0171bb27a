//! Rule registration and execution.
//!
//! Rules are registered against a node type, which is the scope they run
//! at. [`Registry::run`] walks the tree depth-first and, for every node,
//! first descends into its children and then runs the rules registered for
//! the node's own type. Violations therefore come out innermost first, and
//! rules of one type come out in the order they were registered.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use tracing::trace;

use crate::error::{CheckError, Report, Violation};
use crate::path::{Path, Segment};

/// Access to the concrete type behind a `dyn Walk`.
///
/// Implemented for every `'static` type; there is no need to implement it
/// by hand.
pub trait AsAny {
    /// Upcast to `dyn Any`.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A node of a document the registry can descend into.
///
/// Leaves only need an empty `impl Walk for T {}`.
pub trait Walk: AsAny {
    /// Call `visit` once per child node, in document order.
    fn walk_children<'a>(&'a self, visit: &mut dyn FnMut(Segment, &'a dyn Walk)) {
        let _ = visit;
    }
}

type ErasedRule = Box<dyn Fn(&dyn Any) -> Vec<CheckError> + Send + Sync>;

/// Rules keyed by the node type they are scoped to.
///
/// A registry is built once and then only read, so a single instance can be
/// shared by every thread validating documents.
#[derive(Default)]
pub struct Registry {
    rules: HashMap<TypeId, Vec<ErasedRule>>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `rule` to run at every node of type `T`.
    ///
    /// Registering the same logic for two types makes it run, and report,
    /// at both scopes.
    pub fn register<T, F>(&mut self, rule: F) -> &mut Self
    where
        T: Walk + 'static,
        F: Fn(&T) -> Vec<CheckError> + Send + Sync + 'static,
    {
        let erased: ErasedRule = Box::new(move |node: &dyn Any| {
            node.downcast_ref::<T>().map_or_else(Vec::new, |node| rule(node))
        });
        self.rules.entry(TypeId::of::<T>()).or_default().push(erased);
        self
    }

    /// Total number of registered rules across all scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    /// Whether no rule has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every applicable rule over the tree rooted at `root`.
    #[must_use]
    pub fn run(&self, root: &dyn Walk) -> Vec<Violation> {
        let mut path = Path::root();
        let mut violations = Vec::new();
        self.visit(root, &mut path, &mut violations);
        violations
    }

    /// Like [`Registry::run`], folding the result into a [`Report`].
    ///
    /// # Errors
    ///
    /// Returns a report holding every violation if any rule failed.
    pub fn validate(&self, root: &dyn Walk) -> Result<(), Report> {
        let violations = self.run(root);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Report::new(violations))
        }
    }

    fn visit<'a>(&self, node: &'a dyn Walk, path: &mut Path, out: &mut Vec<Violation>) {
        node.walk_children(&mut |segment, child| {
            path.push(segment);
            self.visit(child, path, out);
            path.pop();
        });

        let any = node.as_any();
        let Some(rules) = self.rules.get(&any.type_id()) else {
            return;
        };
        trace!(path = %path, rules = rules.len(), "running rules");
        for rule in rules {
            out.extend(rule(any).into_iter().map(|error| Violation {
                path: path.to_string(),
                error,
            }));
        }
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("scopes", &self.rules.len())
            .field("rules", &self.len())
            .finish()
    }
}
