//! Applies a patch to a document.
//!
//! [`apply`] works on a deep copy of the source document and only returns
//! it once every operation has succeeded, so a caller never observes a
//! partially-applied document - simpler than reverting operation by
//! operation, since nothing is visible to the caller until `apply` returns.

use crate::error::PatchError;
use crate::node::Node;
use crate::op::PatchOperation;

/// Apply `ops` to `source`, returning the resulting document.
///
/// On error, `source` itself is left untouched; the partially-patched
/// working copy is simply dropped.
#[tracing::instrument(skip_all, fields(op_count = ops.len()))]
pub fn apply(source: &Node, ops: &[PatchOperation]) -> Result<Node, PatchError> {
    let mut doc = source.deep_copy();
    for (idx, op) in ops.iter().enumerate() {
        apply_one(&mut doc, op).map_err(|e| {
            tracing::warn!(index = idx, op = op.name(), error = %e, "patch application failed");
            e
        })?;
    }
    Ok(doc)
}

/// Apply `ops` to `source` without the atomic-failure guarantee: operations
/// already applied before a failing one stay applied. Matches the teacher's
/// `patch_unsafe` for callers that can tolerate (or want to inspect) a
/// partially-patched document, at lower cost than the copy-then-commit path.
pub fn apply_unchecked(doc: &mut Node, ops: &[PatchOperation]) -> Result<(), PatchError> {
    for op in ops {
        apply_one(doc, op)?;
    }
    Ok(())
}

fn apply_one(doc: &mut Node, op: &PatchOperation) -> Result<(), PatchError> {
    match op {
        PatchOperation::Add(op) => doc.add_at(&op.path, op.value.deep_copy()),
        PatchOperation::Remove(op) => doc.remove_at(&op.path).map(|_| ()),
        PatchOperation::Replace(op) => doc.replace_at(&op.path, op.value.deep_copy()).map(|_| ()),
        PatchOperation::Move(op) => doc.move_to(&op.from, &op.path),
        PatchOperation::Copy(op) => doc.copy_to(&op.from, &op.path),
        PatchOperation::Test(op) => doc.test_at(&op.path, &op.value),
    }
}

/// Apply a JSON Merge Patch (RFC 7396) to `doc`.
///
/// Unlike [`apply`], merge patch semantics are defined only in terms of the
/// result - there is no intermediate "operation" to fail partway through, so
/// there's nothing to revert.
pub fn merge(doc: &Node, patch: &Node) -> Node {
    use crate::node::NodeKind;
    use std::collections::BTreeMap;

    let patch_map = match &patch.kind {
        NodeKind::Object(m) => m,
        _ => return patch.deep_copy(),
    };
    let mut result: BTreeMap<String, Node> = match &doc.kind {
        NodeKind::Object(m) => m.clone(),
        _ => BTreeMap::new(),
    };
    for (key, value) in patch_map {
        match &value.kind {
            NodeKind::Value(crate::node::Scalar::Null) => {
                result.remove(key);
            }
            _ => {
                let merged = match result.get(key) {
                    Some(existing) => merge(existing, value),
                    None => merge(&Node::object(BTreeMap::new(), 0), value),
                };
                result.insert(key.clone(), merged);
            }
        }
    }
    Node::object(result, doc.level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Scalar;
    use crate::op::{AddOperation, RemoveOperation, ReplaceOperation, TestOperation};
    use std::collections::BTreeMap;

    fn num(v: f64) -> Node {
        Node::value(Scalar::number(v), 0)
    }

    fn obj(pairs: &[(&str, Node)]) -> Node {
        let map: BTreeMap<String, Node> = pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        Node::object(map, 0)
    }

    #[test]
    fn apply_runs_ops_in_order() {
        let doc = obj(&[("a", num(1.0))]);
        let ops = vec![
            PatchOperation::Test(TestOperation {
                path: "/a".into(),
                value: num(1.0),
            }),
            PatchOperation::Add(AddOperation {
                path: "/b".into(),
                value: num(2.0),
            }),
        ];
        let result = apply(&doc, &ops).unwrap();
        assert_eq!(result.find("/b").unwrap(), &num(2.0));
    }

    #[test]
    fn apply_leaves_source_untouched_on_failure() {
        let doc = obj(&[("a", num(1.0))]);
        let ops = vec![
            PatchOperation::Remove(RemoveOperation {
                path: "/a".into(),
                value: None,
            }),
            PatchOperation::Replace(ReplaceOperation {
                path: "/does-not-exist".into(),
                value: num(9.0),
            }),
        ];
        assert!(apply(&doc, &ops).is_err());
        assert_eq!(doc.find("/a").unwrap(), &num(1.0));
    }

    #[test]
    fn merge_patch_removes_null_keys() {
        let doc = obj(&[("a", num(1.0)), ("b", num(2.0))]);
        let patch = obj(&[("b", Node::value(Scalar::Null, 0))]);
        let result = merge(&doc, &patch);
        assert!(result.find("/b").is_none());
        assert_eq!(result.find("/a").unwrap(), &num(1.0));
    }

    #[test]
    fn merge_patch_recurses_into_nested_objects() {
        let doc = obj(&[("author", obj(&[("first", num(1.0)), ("last", num(2.0))]))]);
        let patch = obj(&[("author", obj(&[("last", Node::value(Scalar::Null, 0))]))]);
        let result = merge(&doc, &patch);
        let author = result.find("/author").unwrap();
        assert!(author.find("/last").is_none());
    }
}
