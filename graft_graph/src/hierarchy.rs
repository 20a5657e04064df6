//! Is-a relation over type tags.
//!
//! Every declared tag stores its full ancestor set (itself included), so
//! compatibility is a set lookup. Parents must be declared before their
//! children, which keeps the relation acyclic.

use std::collections::{HashMap, HashSet};

use crate::error::GraphError;
use crate::node::TypeTag;

/// A DAG of type tags with a reflexive, transitive is-a relation.
#[derive(Clone, Debug, Default)]
pub struct TypeHierarchy {
    /// Tag -> every tag it is-a, including itself.
    ancestors: HashMap<TypeTag, HashSet<TypeTag>>,
}

impl TypeHierarchy {
    /// An empty hierarchy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `tag` as a specialization of each of `parents`.
    ///
    /// # Errors
    ///
    /// [`GraphError::DuplicateType`] if `tag` is already declared,
    /// [`GraphError::UnknownType`] if a parent is not.
    pub fn declare<T, P>(&mut self, tag: T, parents: P) -> Result<(), GraphError>
    where
        T: Into<TypeTag>,
        P: IntoIterator,
        P::Item: Into<TypeTag>,
    {
        let tag = tag.into();
        if self.ancestors.contains_key(&tag) {
            return Err(GraphError::DuplicateType(tag));
        }

        let mut closure = HashSet::from([tag.clone()]);
        for parent in parents {
            let parent = parent.into();
            let Some(inherited) = self.ancestors.get(&parent) else {
                return Err(GraphError::UnknownType(parent));
            };
            closure.extend(inherited.iter().cloned());
        }

        tracing::trace!("declared type {} with {} ancestors", tag, closure.len() - 1);
        self.ancestors.insert(tag, closure);
        Ok(())
    }

    /// Declare a root type with no parents.
    ///
    /// # Errors
    ///
    /// [`GraphError::DuplicateType`] if `tag` is already declared.
    pub fn declare_root(&mut self, tag: impl Into<TypeTag>) -> Result<(), GraphError> {
        self.declare(tag, std::iter::empty::<TypeTag>())
    }

    /// Whether `tag` has been declared.
    #[must_use]
    pub fn is_declared(&self, tag: &TypeTag) -> bool {
        self.ancestors.contains_key(tag)
    }

    /// `sub` is-a `sup`. Undeclared tags are only related to themselves.
    #[must_use]
    pub fn is_a(&self, sub: &TypeTag, sup: &TypeTag) -> bool {
        sub == sup || self.ancestors.get(sub).is_some_and(|a| a.contains(sup))
    }

    /// A host node of type `host` may stand in for a pattern node of type
    /// `pattern`: specializations are accepted, generalizations are not.
    #[must_use]
    pub fn compatible(&self, host: &TypeTag, pattern: &TypeTag) -> bool {
        self.is_a(host, pattern)
    }

    /// Every tag `tag` is-a, including itself.
    pub fn ancestors<'a>(&'a self, tag: &'a TypeTag) -> impl Iterator<Item = &'a TypeTag> + 'a {
        self.ancestors
            .get(tag)
            .into_iter()
            .flatten()
            .chain(std::iter::once(tag).filter(move |t| !self.ancestors.contains_key(*t)))
    }
}
