//! The typed patch operation vocabulary (RFC 6902 §4) and small helpers
//! the diff rewrite passes need to inspect operations uniformly.

use std::collections::BTreeMap;

use crate::error::PatchError;
use crate::node::{Node, NodeKind, Scalar};

/// A JSON Patch document: an ordered list of operations applied in turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch(pub Vec<PatchOperation>);

impl Patch {
    /// Render this patch as the wire-format `Node` §3 describes: an Array
    /// of Objects, one per operation.
    pub fn to_node(&self) -> Node {
        let ops = self.0.iter().map(PatchOperation::to_node).collect();
        Node::array(ops, 0)
    }

    /// Parse a patch document out of a previously-parsed `Node`, rejecting
    /// anything that isn't an Array of Objects shaped like §3 requires.
    pub fn from_node(node: &Node) -> Result<Patch, PatchError> {
        let entries = node
            .children()
            .ok_or_else(|| PatchError::BadPatch("patch document must be a JSON array".to_string()))?;
        let ops = entries.iter().map(PatchOperation::from_node).collect::<Result<_, _>>()?;
        Ok(Patch(ops))
    }
}

/// `add` - insert `value` at `path`.
#[derive(Debug, Clone, PartialEq)]
pub struct AddOperation {
    /// Location to add at.
    pub path: String,
    /// Value to insert.
    pub value: Node,
}

/// `remove` - delete the node at `path`.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoveOperation {
    /// Location to remove.
    pub path: String,
    /// The removed value, present only when the diff ran with
    /// [`crate::DiffOptions::use_full_remove`].
    pub value: Option<Node>,
}

/// `replace` - overwrite the node at `path` with `value`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaceOperation {
    /// Location to replace.
    pub path: String,
    /// Replacement value.
    pub value: Node,
}

/// `move` - relocate the node at `from` to `path`.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveOperation {
    /// Source location.
    pub from: String,
    /// Destination location.
    pub path: String,
}

/// `copy` - duplicate the node at `from` to `path`.
#[derive(Debug, Clone, PartialEq)]
pub struct CopyOperation {
    /// Source location.
    pub from: String,
    /// Destination location.
    pub path: String,
}

/// `test` - fail unless the node at `path` deep-equals `value`.
#[derive(Debug, Clone, PartialEq)]
pub struct TestOperation {
    /// Location to test.
    pub path: String,
    /// Expected value.
    pub value: Node,
}

/// One operation in a [`Patch`].
#[derive(Debug, Clone, PartialEq)]
pub enum PatchOperation {
    /// See [`AddOperation`].
    Add(AddOperation),
    /// See [`RemoveOperation`].
    Remove(RemoveOperation),
    /// See [`ReplaceOperation`].
    Replace(ReplaceOperation),
    /// See [`MoveOperation`].
    Move(MoveOperation),
    /// See [`CopyOperation`].
    Copy(CopyOperation),
    /// See [`TestOperation`].
    Test(TestOperation),
}

impl PatchOperation {
    /// The RFC 6902 `op` name (`"add"`, `"remove"`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            PatchOperation::Add(_) => "add",
            PatchOperation::Remove(_) => "remove",
            PatchOperation::Replace(_) => "replace",
            PatchOperation::Move(_) => "move",
            PatchOperation::Copy(_) => "copy",
            PatchOperation::Test(_) => "test",
        }
    }

    /// The `path` every operation carries.
    pub fn path(&self) -> &str {
        match self {
            PatchOperation::Add(op) => &op.path,
            PatchOperation::Remove(op) => &op.path,
            PatchOperation::Replace(op) => &op.path,
            PatchOperation::Move(op) => &op.path,
            PatchOperation::Copy(op) => &op.path,
            PatchOperation::Test(op) => &op.path,
        }
    }

    /// Render this operation as the §3 wire-format Object: `op`, `path`,
    /// and whichever of `value`/`from` that operation kind carries.
    pub fn to_node(&self) -> Node {
        let mut fields = BTreeMap::new();
        fields.insert("op".to_string(), Node::value(Scalar::string(self.name()), 0));
        fields.insert("path".to_string(), Node::value(Scalar::string(self.path()), 0));
        match self {
            PatchOperation::Add(op) => {
                fields.insert("value".to_string(), op.value.deep_copy());
            }
            PatchOperation::Remove(op) => {
                if let Some(value) = &op.value {
                    fields.insert("value".to_string(), value.deep_copy());
                }
            }
            PatchOperation::Replace(op) => {
                fields.insert("value".to_string(), op.value.deep_copy());
            }
            PatchOperation::Move(op) => {
                fields.insert("from".to_string(), Node::value(Scalar::string(&op.from), 0));
            }
            PatchOperation::Copy(op) => {
                fields.insert("from".to_string(), Node::value(Scalar::string(&op.from), 0));
            }
            PatchOperation::Test(op) => {
                fields.insert("value".to_string(), op.value.deep_copy());
            }
        }
        Node::object(fields, 0)
    }

    /// Parse one §3 wire-format Object back into a typed operation.
    fn from_node(node: &Node) -> Result<PatchOperation, PatchError> {
        let fields = node
            .children_map()
            .ok_or_else(|| PatchError::BadPatch("patch operation must be a JSON object".to_string()))?;
        let op = string_field(fields, "op")?;
        let path = string_field(fields, "path")?;
        let op = match op.as_str() {
            "add" => PatchOperation::Add(AddOperation {
                path,
                value: value_field(fields, "add")?.deep_copy(),
            }),
            "remove" => PatchOperation::Remove(RemoveOperation {
                path,
                value: fields.get("value").map(Node::deep_copy),
            }),
            "replace" => PatchOperation::Replace(ReplaceOperation {
                path,
                value: value_field(fields, "replace")?.deep_copy(),
            }),
            "move" => PatchOperation::Move(MoveOperation {
                path,
                from: string_field(fields, "from")?,
            }),
            "copy" => PatchOperation::Copy(CopyOperation {
                path,
                from: string_field(fields, "from")?,
            }),
            "test" => PatchOperation::Test(TestOperation {
                path,
                value: value_field(fields, "test")?.deep_copy(),
            }),
            other => {
                return Err(PatchError::BadPatch(format!("unknown op {other:?}")));
            }
        };
        Ok(op)
    }
}

fn string_field(fields: &BTreeMap<String, Node>, key: &str) -> Result<String, PatchError> {
    match fields.get(key).map(|n| &n.kind) {
        Some(NodeKind::Value(Scalar::String { value, .. })) => Ok(value.clone()),
        Some(_) => Err(PatchError::BadPatch(format!("{key:?} must be a string"))),
        None => Err(PatchError::BadPatch(format!("missing {key:?}"))),
    }
}

fn value_field<'a>(fields: &'a BTreeMap<String, Node>, op: &str) -> Result<&'a Node, PatchError> {
    fields
        .get("value")
        .ok_or_else(|| PatchError::BadPatch(format!("{op:?} operation is missing \"value\"")))
}

/// The value an `add`/`remove` operation introduces or removes, used by the
/// `move` rewrite pass to find a matching pair. `remove` looks its value up
/// in `source` since a plain remove doesn't otherwise carry one.
pub(crate) fn diff_value(op: &PatchOperation, source: &Node) -> Option<Node> {
    match op {
        PatchOperation::Add(add) => Some(add.value.clone()),
        PatchOperation::Remove(rm) => match &rm.value {
            Some(v) => Some(v.clone()),
            None => source.find(&rm.path).cloned(),
        },
        _ => None,
    }
}

/// The value carried by an `add`/`replace`/`test` operation.
pub(crate) fn carried_value(op: &PatchOperation) -> Option<&Node> {
    match op {
        PatchOperation::Add(op) => Some(&op.value),
        PatchOperation::Replace(op) => Some(&op.value),
        PatchOperation::Test(op) => Some(&op.value),
        _ => None,
    }
}
