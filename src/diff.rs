//! Computes a [`crate::op::PatchOperation`] sequence turning a source
//! document into a target document.
//!
//! Objects are diffed key by key. Arrays are diffed by first finding a
//! longest common subsequence (LCS) of elements that compare equal by
//! [`Node::deep_eq`], then walking source/target side by side one step at a
//! time: an element only the source side has reached yet was deleted, an
//! element only the target side has reached yet was inserted, and when
//! neither side has reached the next matched pair the two current elements
//! are diffed recursively at that shared position instead of being torn
//! down and rebuilt. Matched elements themselves are identical by
//! construction and need no further recursion.

use crate::node::{Node, NodeKind};
use crate::op::{AddOperation, PatchOperation, RemoveOperation, ReplaceOperation};
use crate::options::{self, DiffOptions};
use crate::pointer::PointerBuilder;

/// Compute the patch operations that turn `source` into `target`.
#[tracing::instrument(skip_all)]
pub fn diff(source: &Node, target: &Node, options: DiffOptions) -> Vec<PatchOperation> {
    let mut ops = Vec::new();
    let mut path = PointerBuilder::new();
    diff_node(&mut path, source, source, target, &mut ops, options);
    options::apply_rewrite_passes(&mut ops, options, source, target);
    tracing::debug!(op_count = ops.len(), "diff produced patch");
    ops
}

/// `root` is the top-level document `source` was sliced from; it never
/// changes across the recursion and is what [`push_remove`] resolves
/// `path` (an *absolute* pointer) against, as opposed to `source`, which
/// is only the subtree local to this recursive call.
fn diff_node(
    path: &mut PointerBuilder,
    root: &Node,
    source: &Node,
    target: &Node,
    ops: &mut Vec<PatchOperation>,
    options: DiffOptions,
) {
    if source.deep_eq(target) {
        return;
    }
    match (&source.kind, &target.kind) {
        (NodeKind::Object(_), NodeKind::Object(_)) => diff_object(path, root, source, target, ops, options),
        (NodeKind::Array(_), NodeKind::Array(_)) => diff_array(path, root, source, target, ops, options),
        _ => ops.push(PatchOperation::Replace(ReplaceOperation {
            path: path.render(),
            value: target.deep_copy(),
        })),
    }
}

fn diff_object(
    path: &mut PointerBuilder,
    root: &Node,
    source: &Node,
    target: &Node,
    ops: &mut Vec<PatchOperation>,
    options: DiffOptions,
) {
    let (src_map, tar_map) = match (&source.kind, &target.kind) {
        (NodeKind::Object(s), NodeKind::Object(t)) => (s, t),
        _ => unreachable!("diff_object called on non-objects"),
    };
    for key in src_map.keys() {
        if !tar_map.contains_key(key) {
            path.push(key.clone());
            push_remove(path, root, ops, options);
            path.pop();
        }
    }
    for (key, tar_child) in tar_map {
        path.push(key.clone());
        match src_map.get(key) {
            Some(src_child) => diff_node(path, root, src_child, tar_child, ops, options),
            None => ops.push(PatchOperation::Add(AddOperation {
                path: path.render(),
                value: tar_child.deep_copy(),
            })),
        }
        path.pop();
    }
}

fn diff_array(
    path: &mut PointerBuilder,
    root: &Node,
    source: &Node,
    target: &Node,
    ops: &mut Vec<PatchOperation>,
    options: DiffOptions,
) {
    let (src, tar) = match (&source.kind, &target.kind) {
        (NodeKind::Array(s), NodeKind::Array(t)) => (s, t),
        _ => unreachable!("diff_array called on non-arrays"),
    };
    let matches = longest_common_subsequence(src, tar);

    let mut src_idx = 0;
    let mut tar_idx = 0;
    let mut pos: usize = 0;

    // Walk one LCS pair at a time. Between the cursors and the next matched
    // pair there is at most one unmatched source element and one unmatched
    // target element outstanding at any step (a longer run is consumed one
    // element per loop iteration), so the three-way branch below mirrors
    // them individually instead of bulk-processing a whole gap - an
    // unmatched source/target pair straddling the same step recurses
    // instead of becoming a remove+add.
    for &(next_src, next_tar) in &matches {
        loop {
            let src_matches = src_idx == next_src;
            let tar_matches = tar_idx == next_tar;
            if src_matches && tar_matches {
                break;
            }
            path.push(pos.to_string());
            if src_matches {
                // Target has an element here the LCS doesn't reach yet: insert it.
                ops.push(PatchOperation::Add(AddOperation {
                    path: path.render(),
                    value: tar[tar_idx].deep_copy(),
                }));
                tar_idx += 1;
                pos += 1;
            } else if tar_matches {
                // Source has an element here the LCS doesn't reach yet: it was deleted.
                push_remove(path, root, ops, options);
                src_idx += 1;
            } else {
                // Neither side has reached the next LCS pair: both differ
                // from it at this position, so recurse instead of
                // remove+add.
                diff_node(path, root, &src[src_idx], &tar[tar_idx], ops, options);
                src_idx += 1;
                tar_idx += 1;
                pos += 1;
            }
            path.pop();
        }
        // The matched element itself is unchanged; it keeps its slot.
        pos += 1;
        src_idx += 1;
        tar_idx += 1;
    }

    // Past the last LCS pair: pair up remaining elements positionally and
    // recurse, then any surplus on either side becomes remove/add.
    while src_idx < src.len() && tar_idx < tar.len() {
        path.push(pos.to_string());
        diff_node(path, root, &src[src_idx], &tar[tar_idx], ops, options);
        path.pop();
        src_idx += 1;
        tar_idx += 1;
        pos += 1;
    }
    while src_idx < src.len() {
        path.push(pos.to_string());
        push_remove(path, root, ops, options);
        path.pop();
        src_idx += 1;
    }
    while tar_idx < tar.len() {
        path.push(pos.to_string());
        ops.push(PatchOperation::Add(AddOperation {
            path: path.render(),
            value: tar[tar_idx].deep_copy(),
        }));
        path.pop();
        pos += 1;
        tar_idx += 1;
    }
}

/// `root` must be the top-level document being diffed, not the local
/// subtree the caller is currently recursing through, since `path` is
/// always rendered as an absolute pointer from the document root.
fn push_remove(path: &mut PointerBuilder, root: &Node, ops: &mut Vec<PatchOperation>, options: DiffOptions) {
    let value = if options.full_remove_enabled() {
        root.find(&path.render()).map(Node::deep_copy)
    } else {
        None
    };
    ops.push(PatchOperation::Remove(RemoveOperation {
        path: path.render(),
        value,
    }));
}

/// Return the index pairs `(i, j)` of a longest common subsequence of
/// `source`/`target`, in increasing order of both indices, using
/// [`Node::deep_eq`] as the element equality.
fn longest_common_subsequence(source: &[Node], target: &[Node]) -> Vec<(usize, usize)> {
    let m = source.len();
    let n = target.len();
    // dp[i][j] = LCS length of source[i..], target[j..]
    let mut dp = vec![vec![0usize; n + 1]; m + 1];
    for i in (0..m).rev() {
        for j in (0..n).rev() {
            dp[i][j] = if source[i].deep_eq(&target[j]) {
                dp[i + 1][j + 1] + 1
            } else {
                dp[i + 1][j].max(dp[i][j + 1])
            };
        }
    }

    let mut pairs = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < m && j < n {
        if source[i].deep_eq(&target[j]) {
            pairs.push((i, j));
            i += 1;
            j += 1;
        } else if dp[i + 1][j] >= dp[i][j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::apply;
    use crate::node::Scalar;
    use std::collections::BTreeMap;

    fn num(v: f64) -> Node {
        Node::value(Scalar::number(v), 0)
    }

    fn obj(pairs: &[(&str, Node)]) -> Node {
        let map: BTreeMap<String, Node> = pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        Node::object(map, 0)
    }

    #[test]
    fn no_diff_for_equal_documents() {
        let doc = obj(&[("a", num(1.0))]);
        assert!(diff(&doc, &doc, DiffOptions::new()).is_empty());
    }

    #[test]
    fn object_key_added_removed_changed() {
        let source = obj(&[("a", num(1.0)), ("b", num(2.0))]);
        let target = obj(&[("b", num(3.0)), ("c", num(4.0))]);
        let ops = diff(&source, &target, DiffOptions::new());
        let applied = apply(&source, &ops).unwrap();
        assert!(applied.deep_eq(&target));
    }

    #[test]
    fn array_reorder_produces_minimal_ops() {
        let source = Node::array(vec![num(1.0), num(2.0), num(3.0)], 0);
        let target = Node::array(vec![num(2.0), num(3.0), num(1.0)], 0);
        let ops = diff(&source, &target, DiffOptions::new());
        let applied = apply(&source, &ops).unwrap();
        assert!(applied.deep_eq(&target));
    }

    #[test]
    fn array_insert_and_delete_round_trip() {
        let source = Node::array(vec![num(1.0), num(2.0), num(3.0)], 0);
        let target = Node::array(vec![num(1.0), num(4.0), num(3.0), num(5.0)], 0);
        let ops = diff(&source, &target, DiffOptions::new());
        let applied = apply(&source, &ops).unwrap();
        assert!(applied.deep_eq(&target));
    }

    #[test]
    fn nested_object_in_array_recurses() {
        let source = Node::array(vec![obj(&[("a", num(1.0))])], 0);
        let target = Node::array(vec![obj(&[("a", num(2.0))])], 0);
        let ops = diff(&source, &target, DiffOptions::new());
        let applied = apply(&source, &ops).unwrap();
        assert!(applied.deep_eq(&target));
    }

    #[test]
    fn full_remove_option_carries_removed_value() {
        let source = obj(&[("a", num(1.0))]);
        let target = obj(&[]);
        let ops = diff(&source, &target, DiffOptions::new().use_full_remove());
        match &ops[0] {
            PatchOperation::Remove(rm) => assert_eq!(rm.value, Some(num(1.0))),
            other => panic!("expected a remove operation, got {other:?}"),
        }
    }

    #[test]
    fn full_remove_option_carries_value_for_a_nested_key() {
        let source = obj(&[("a", obj(&[("b", num(1.0))]))]);
        let target = obj(&[("a", obj(&[]))]);
        let ops = diff(&source, &target, DiffOptions::new().use_full_remove());
        assert_eq!(ops.len(), 1);
        match &ops[0] {
            PatchOperation::Remove(rm) => {
                assert_eq!(rm.path, "/a/b");
                assert_eq!(rm.value, Some(num(1.0)));
            }
            other => panic!("expected a remove operation, got {other:?}"),
        }
    }

    #[test]
    fn full_remove_option_carries_value_for_a_nested_array_element() {
        let source = Node::array(vec![obj(&[("x", Node::array(vec![num(1.0), num(2.0)], 0))])], 0);
        let target = Node::array(vec![obj(&[("x", Node::array(vec![num(1.0)], 0))])], 0);
        let ops = diff(&source, &target, DiffOptions::new().use_full_remove());
        assert_eq!(ops.len(), 1);
        match &ops[0] {
            PatchOperation::Remove(rm) => {
                assert_eq!(rm.path, "/0/x/1");
                assert_eq!(rm.value, Some(num(2.0)));
            }
            other => panic!("expected a remove operation, got {other:?}"),
        }
    }

    #[test]
    fn unmatched_elements_between_lcs_pairs_recurse_instead_of_remove_add() {
        // Same length, same position, differing only in one nested field:
        // the LCS is empty, so both elements sit in the same "gap" and must
        // be diffed against each other rather than deleted and re-added.
        let source = Node::array(vec![obj(&[("a", num(1.0)), ("b", num(9.0))])], 0);
        let target = Node::array(vec![obj(&[("a", num(2.0)), ("b", num(9.0))])], 0);
        let ops = diff(&source, &target, DiffOptions::new());
        assert_eq!(ops.len(), 1, "expected a single nested replace, got {ops:?}");
        match &ops[0] {
            PatchOperation::Replace(r) => assert_eq!(r.path, "/0/a"),
            other => panic!("expected a replace at /0/a, got {other:?}"),
        }
    }

    #[test]
    fn trailing_removal_does_not_skip_indices() {
        let source = Node::array(vec![num(1.0), num(2.0), num(3.0), num(4.0)], 0);
        let target = Node::array(vec![num(1.0)], 0);
        let ops = diff(&source, &target, DiffOptions::new());
        let applied = apply(&source, &ops).unwrap();
        assert!(applied.deep_eq(&target));
    }
}
