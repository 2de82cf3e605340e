//! # Node Pointers
//!
//! A [`NodePointer`] addresses one node inside a [`Node`](crate::Node) tree
//! as a sequence of key/index steps from the root. The query engine hands
//! out pointers instead of borrows, so a caller can hold many results at
//! once and later write through any of them with
//! [`Node::resolve_mut`](crate::Node::resolve_mut) without a second
//! traversal.

use std::fmt;

/// One step from a container to a child.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Step {
    /// Map key (also accepted by lists when it is an integer key).
    Key(String),
    /// List position (also accepted by maps keyed `"0".."n-1"`).
    Index(usize),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(&key.replace('~', "~0").replace('/', "~1")),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

/// Address of a node, as steps from the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePointer(Vec<Step>);

impl NodePointer {
    /// The pointer to the root node itself.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// A new pointer one step deeper than `self`.
    pub fn child(&self, step: Step) -> Self {
        let mut steps = self.0.clone();
        steps.push(step);
        Self(steps)
    }

    /// The steps, root first.
    pub fn steps(&self) -> &[Step] {
        &self.0
    }

    /// Returns true for the root pointer.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of steps.
    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<Step>> for NodePointer {
    fn from(steps: Vec<Step>) -> Self {
        Self(steps)
    }
}

/// Renders in JSON Pointer form (`/a/0/b`); the root renders as `""`.
impl fmt::Display for NodePointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.0 {
            write!(f, "/{step}")?;
        }
        Ok(())
    }
}
