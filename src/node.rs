//! The JSON tree representation at the heart of this crate.
//!
//! Unlike a generic JSON value type, [`Node`] keeps the original source
//! lexeme of every scalar it was parsed from (when it was parsed, rather
//! than built programmatically), so re-serializing an untouched document
//! reproduces its bytes exactly instead of reformatting floats.

use std::collections::BTreeMap;

use crate::error::PatchError;
use crate::hash::HashCode;
use crate::pointer;

/// A scalar leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// `null`.
    Null,
    /// `true` / `false`.
    Bool(bool),
    /// A number, decoded to `f64` plus (when parsed from bytes) the exact
    /// source digits, so lossless re-emission doesn't need to reformat it.
    Number {
        /// The decoded value, used for comparisons and arithmetic.
        value: f64,
        /// The exact source lexeme, if this scalar came from parsing bytes.
        raw: Option<Box<str>>,
    },
    /// A string, decoded (escapes resolved except `\uXXXX`, see
    /// `SPEC_FULL.md`) plus the raw source bytes between the quotes.
    String {
        /// The decoded value, used for comparisons.
        value: String,
        /// The exact source lexeme (without surrounding quotes), if parsed.
        raw: Option<Box<str>>,
    },
}

impl Scalar {
    /// Build a number scalar with no raw lexeme (for synthetic nodes).
    pub fn number(value: f64) -> Self {
        Scalar::Number { value, raw: None }
    }

    /// Build a string scalar with no raw lexeme (for synthetic nodes).
    pub fn string(value: impl Into<String>) -> Self {
        Scalar::String {
            value: value.into(),
            raw: None,
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.deep_eq(other)
    }
}

/// One node of the JSON tree: a scalar, an ordered array, or an object.
///
/// Objects are stored in a `BTreeMap`: JSON object keys are unordered by
/// definition and this crate makes no attempt to preserve source insertion
/// order (see the Non-goals this crate implements), so a sorted map gives
/// deterministic iteration - useful for hashing and for reproducible test
/// fixtures - at no cost.
#[derive(Debug, Clone)]
pub struct Node {
    /// The node's payload.
    pub kind: NodeKind,
    /// Depth of this node below the document root (root is 0).
    pub level: usize,
    /// Cached content hash; `None` until [`crate::hash::hash`] visits it.
    /// Any mutating operation on this node or a descendant clears it.
    pub hash: Option<HashCode>,
}

/// The payload of a [`Node`].
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// A scalar leaf.
    Value(Scalar),
    /// An ordered sequence of nodes.
    Array(Vec<Node>),
    /// An unordered mapping of string keys to nodes.
    Object(BTreeMap<String, Node>),
}

impl Node {
    /// Build a new node at the given depth, with no cached hash.
    pub fn new(kind: NodeKind, level: usize) -> Self {
        Node {
            kind,
            level,
            hash: None,
        }
    }

    /// Construct a scalar node.
    pub fn value(scalar: Scalar, level: usize) -> Self {
        Node::new(NodeKind::Value(scalar), level)
    }

    /// Construct an array node.
    pub fn array(children: Vec<Node>, level: usize) -> Self {
        Node::new(NodeKind::Array(children), level)
    }

    /// Construct an object node.
    pub fn object(children: BTreeMap<String, Node>, level: usize) -> Self {
        Node::new(NodeKind::Object(children), level)
    }

    /// `true` if this is [`NodeKind::Value`].
    pub fn is_value(&self) -> bool {
        matches!(self.kind, NodeKind::Value(_))
    }

    /// `true` if this is [`NodeKind::Array`].
    pub fn is_array(&self) -> bool {
        matches!(self.kind, NodeKind::Array(_))
    }

    /// `true` if this is [`NodeKind::Object`].
    pub fn is_object(&self) -> bool {
        matches!(self.kind, NodeKind::Object(_))
    }

    /// Array children, if this is an array node.
    pub fn children(&self) -> Option<&[Node]> {
        match &self.kind {
            NodeKind::Array(c) => Some(c),
            _ => None,
        }
    }

    /// Object children, if this is an object node.
    pub fn children_map(&self) -> Option<&BTreeMap<String, Node>> {
        match &self.kind {
            NodeKind::Object(m) => Some(m),
            _ => None,
        }
    }

    /// Deep-compare two nodes: objects ignore key order, arrays require
    /// matching length and pairwise equality at every index, scalars
    /// compare decoded values (never raw lexemes).
    pub fn deep_eq(&self, other: &Node) -> bool {
        match (&self.kind, &other.kind) {
            (NodeKind::Value(a), NodeKind::Value(b)) => scalar_eq(a, b),
            (NodeKind::Array(a), NodeKind::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.deep_eq(y))
            }
            (NodeKind::Object(a), NodeKind::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).map(|v2| v.deep_eq(v2)).unwrap_or(false))
            }
            _ => false,
        }
    }

    /// Recursively clone this node, dropping cached hashes (the copy is
    /// considered unhashed since it's a fresh owned tree).
    pub fn deep_copy(&self) -> Node {
        let kind = match &self.kind {
            NodeKind::Value(s) => NodeKind::Value(s.clone()),
            NodeKind::Array(c) => NodeKind::Array(c.iter().map(Node::deep_copy).collect()),
            NodeKind::Object(m) => {
                NodeKind::Object(m.iter().map(|(k, v)| (k.clone(), v.deep_copy())).collect())
            }
        };
        Node::new(kind, self.level)
    }

    /// Invalidate this node's cached hash (does not recurse - callers
    /// invalidate along the path they mutated).
    pub fn invalidate_hash(&mut self) {
        self.hash = None;
    }

    /// Resolve a JSON Pointer against this node, returning `None` if any
    /// segment fails to resolve.
    pub fn find(&self, path: &str) -> Option<&Node> {
        let mut current = self;
        for segment in pointer::split(path) {
            current = current.step(&segment)?;
        }
        Some(current)
    }

    fn step(&self, segment: &str) -> Option<&Node> {
        match &self.kind {
            NodeKind::Object(m) => m.get(segment),
            NodeKind::Array(c) => {
                let idx: usize = segment.parse().ok()?;
                c.get(idx)
            }
            NodeKind::Value(_) => None,
        }
    }

    fn step_mut(&mut self, segment: &str) -> Option<&mut Node> {
        match &mut self.kind {
            NodeKind::Object(m) => m.get_mut(segment),
            NodeKind::Array(c) => {
                let idx: usize = segment.parse().ok()?;
                c.get_mut(idx)
            }
            NodeKind::Value(_) => None,
        }
    }

    /// Mutable access to the parent addressed by all but the last segment
    /// of `path`, plus that last (unescaped) segment.
    fn locate_parent_mut(&mut self, path: &str) -> Result<(&mut Node, String), PatchError> {
        let segments = pointer::split(path);
        let (last, init) = segments
            .split_last()
            .ok_or_else(|| PatchError::PathNotFound(path.to_string()))?;
        let mut current = self;
        for segment in init {
            current = current
                .step_mut(segment)
                .ok_or_else(|| PatchError::PathNotFound(path.to_string()))?;
        }
        Ok((current, last.clone()))
    }

    /// `add` per RFC 6902: object keys are inserted or overwritten; array
    /// indices in `[0, len]` insert (an index equal to length appends, `-`
    /// always appends); anything else is an error.
    pub fn add_at(&mut self, path: &str, value: Node) -> Result<(), PatchError> {
        if path.is_empty() {
            *self = value;
            return Ok(());
        }
        let (parent, key) = self.locate_parent_mut(path)?;
        parent.invalidate_hash();
        match &mut parent.kind {
            NodeKind::Object(m) => {
                m.insert(key, value);
                Ok(())
            }
            NodeKind::Array(c) => {
                if key == "-" {
                    c.push(value);
                    return Ok(());
                }
                let idx: usize = key.parse().map_err(|_| PatchError::BadNodeType {
                    path: path.to_string(),
                    message: format!("array index must be an integer, got {key:?}"),
                })?;
                if idx > c.len() {
                    return Err(PatchError::IndexOutOfRange {
                        path: path.to_string(),
                        index: idx,
                        len: c.len(),
                    });
                }
                c.insert(idx, value);
                Ok(())
            }
            NodeKind::Value(_) => Err(PatchError::BadNodeType {
                path: path.to_string(),
                message: "cannot add a child to a scalar value".to_string(),
            }),
        }
    }

    /// `remove` per RFC 6902, returning the removed node.
    pub fn remove_at(&mut self, path: &str) -> Result<Node, PatchError> {
        let (parent, key) = self.locate_parent_mut(path)?;
        parent.invalidate_hash();
        match &mut parent.kind {
            NodeKind::Object(m) => m
                .remove(&key)
                .ok_or_else(|| PatchError::PathNotFound(path.to_string())),
            NodeKind::Array(c) => {
                let idx: usize = key.parse().map_err(|_| PatchError::BadNodeType {
                    path: path.to_string(),
                    message: format!("array index must be an integer, got {key:?}"),
                })?;
                if idx >= c.len() {
                    return Err(PatchError::IndexOutOfRange {
                        path: path.to_string(),
                        index: idx,
                        len: c.len(),
                    });
                }
                Ok(c.remove(idx))
            }
            NodeKind::Value(_) => Err(PatchError::PathNotFound(path.to_string())),
        }
    }

    /// `replace` per RFC 6902, returning the previous node at `path`.
    pub fn replace_at(&mut self, path: &str, value: Node) -> Result<Node, PatchError> {
        if path.is_empty() {
            return Ok(std::mem::replace(self, value));
        }
        let (parent, key) = self.locate_parent_mut(path)?;
        parent.invalidate_hash();
        match &mut parent.kind {
            NodeKind::Object(m) => match m.get_mut(&key) {
                Some(slot) => Ok(std::mem::replace(slot, value)),
                None => Err(PatchError::PathNotFound(path.to_string())),
            },
            NodeKind::Array(c) => {
                let idx: usize = key.parse().map_err(|_| PatchError::BadNodeType {
                    path: path.to_string(),
                    message: format!("array index must be an integer, got {key:?}"),
                })?;
                if idx >= c.len() {
                    return Err(PatchError::IndexOutOfRange {
                        path: path.to_string(),
                        index: idx,
                        len: c.len(),
                    });
                }
                Ok(std::mem::replace(&mut c[idx], value))
            }
            NodeKind::Value(_) => Err(PatchError::PathNotFound(path.to_string())),
        }
    }

    /// `move` per RFC 6902: relocate the node at `from` to `path`. Rejects
    /// moving a node into one of its own descendants.
    ///
    /// Per spec.md §4.2's `move` row: resolve `to` first — replace if it
    /// already exists, otherwise add — and only then remove `from`. Doing
    /// it in this order (rather than removing first) matters when `from`
    /// and `path` address the same array: removing first would shift every
    /// later index down by one before the add/replace ever reads or writes
    /// `path`.
    pub fn move_to(&mut self, from: &str, path: &str) -> Result<(), PatchError> {
        if path == from {
            return Ok(());
        }
        if path.starts_with(from) && path[from.len()..].starts_with('/') {
            return Err(PatchError::InvalidMove {
                from: from.to_string(),
                path: path.to_string(),
            });
        }
        let value = self
            .find(from)
            .ok_or_else(|| PatchError::PathNotFound(from.to_string()))?
            .deep_copy();
        if self.find(path).is_some() {
            self.replace_at(path, value)?;
        } else {
            self.add_at(path, value)?;
        }
        self.remove_at(from)?;
        Ok(())
    }

    /// `copy` per RFC 6902: duplicate the node at `from` to `path`.
    pub fn copy_to(&mut self, from: &str, path: &str) -> Result<(), PatchError> {
        let source = self
            .find(from)
            .ok_or_else(|| PatchError::PathNotFound(from.to_string()))?
            .deep_copy();
        self.add_at(path, source)
    }

    /// `test` per RFC 6902: succeed only if the node at `path` deep-equals
    /// `expected`.
    pub fn test_at(&self, path: &str, expected: &Node) -> Result<(), PatchError> {
        let actual = self
            .find(path)
            .ok_or_else(|| PatchError::PathNotFound(path.to_string()))?;
        if actual.deep_eq(expected) {
            Ok(())
        } else {
            Err(PatchError::TestFailed {
                path: path.to_string(),
                message: "value does not match".to_string(),
            })
        }
    }
}

fn scalar_eq(a: &Scalar, b: &Scalar) -> bool {
    match (a, b) {
        (Scalar::Null, Scalar::Null) => true,
        (Scalar::Bool(x), Scalar::Bool(y)) => x == y,
        (Scalar::Number { value: x, .. }, Scalar::Number { value: y, .. }) => x == y,
        (Scalar::String { value: x, .. }, Scalar::String { value: y, .. }) => x == y,
        _ => false,
    }
}
