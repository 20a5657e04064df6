use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use itertools::Itertools;

/// Identifier of a node, unique within one graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<usize> for NodeId {
    fn from(id: usize) -> Self {
        Self(id)
    }
}

/// Arena key of an edge. Distinguishes parallel edges with identical ports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub usize);

impl Display for EdgeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Name of a node type in a [`crate::TypeHierarchy`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeTag(Arc<str>);

impl TypeTag {
    /// Create a tag from a name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The tag's name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TypeTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeTag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TypeTag {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl From<&TypeTag> for TypeTag {
    fn from(tag: &TypeTag) -> Self {
        tag.clone()
    }
}

/// Opaque node parameter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Param {
    /// Integer value.
    Int(i64),
    /// Boolean value.
    Bool(bool),
    /// Text value.
    Str(String),
}

impl Display for Param {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<i64> for Param {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for Param {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for Param {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// Payload of a node: its type and ordered parameters.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeData {
    /// Type tag checked by the matcher.
    pub ty: TypeTag,
    /// Ordered opaque parameters.
    pub params: Vec<Param>,
}

impl NodeData {
    /// Node data with the given type and no parameters.
    pub fn new(ty: impl Into<TypeTag>) -> Self {
        Self {
            ty: ty.into(),
            params: Vec::new(),
        }
    }

    /// Node data with the given type and parameters.
    pub fn with_params(ty: impl Into<TypeTag>, params: impl IntoIterator<Item = Param>) -> Self {
        Self {
            ty: ty.into(),
            params: params.into_iter().collect(),
        }
    }
}

impl Display for NodeData {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            write!(f, "{}", self.ty)
        } else {
            write!(f, "{}({})", self.ty, self.params.iter().join(", "))
        }
    }
}
