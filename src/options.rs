//! Diff tuning flags and the optional `move`/`copy` rewrite passes that run
//! after the base diff, trading extra computation for a smaller patch.

use std::collections::HashMap;

use crate::hash::{self, HashCode};
use crate::node::Node;
use crate::op::{self, AddOperation, CopyOperation, MoveOperation, PatchOperation, TestOperation};
use crate::pointer::PointerBuilder;

const USE_COPY: u8 = 1 << 0;
const USE_CHECK_COPY: u8 = 1 << 1;
const USE_MOVE: u8 = 1 << 2;
const USE_FULL_REMOVE: u8 = 1 << 3;

/// Tuning flags for [`crate::diff`].
///
/// The underlying bit values are an implementation detail; build one with
/// [`DiffOptions::new`] and the `use_*` builder methods.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DiffOptions(u8);

impl DiffOptions {
    /// No optional passes enabled.
    pub fn new() -> Self {
        DiffOptions(0)
    }

    /// Rewrite `add` operations whose value matches an unchanged subtree
    /// elsewhere in the source document into `copy` operations.
    pub fn use_copy(mut self) -> Self {
        self.0 |= USE_COPY;
        self
    }

    /// Only meaningful together with [`Self::use_copy`]: precede each
    /// rewritten `copy` with a `test` confirming the source path still
    /// holds the expected value.
    pub fn use_check_copy(mut self) -> Self {
        self.0 |= USE_CHECK_COPY;
        self
    }

    /// Merge an `add`/`remove` pair with equal values into a single `move`.
    pub fn use_move(mut self) -> Self {
        self.0 |= USE_MOVE;
        self
    }

    /// Have `remove` operations carry the removed value.
    pub fn use_full_remove(mut self) -> Self {
        self.0 |= USE_FULL_REMOVE;
        self
    }

    pub(crate) fn copy_enabled(self) -> bool {
        self.0 & USE_COPY != 0
    }

    pub(crate) fn check_copy_enabled(self) -> bool {
        self.0 & USE_CHECK_COPY != 0
    }

    pub(crate) fn move_enabled(self) -> bool {
        self.0 & USE_MOVE != 0
    }

    pub(crate) fn full_remove_enabled(self) -> bool {
        self.0 & USE_FULL_REMOVE != 0
    }
}

/// Run whichever optional rewrite passes `options` enables.
///
/// The copy pass only offers subtrees that are identical between `source`
/// and `target`: those paths are guaranteed to still hold the same value
/// when the generated `copy` op runs, since the diff leaves them untouched.
pub(crate) fn apply_rewrite_passes(
    ops: &mut Vec<PatchOperation>,
    options: DiffOptions,
    source: &Node,
    target: &Node,
) {
    if options.copy_enabled() {
        let index = build_unchanged_index(source, target);
        rewrite_copies(ops, &index, options);
    }
    if options.move_enabled() {
        rewrite_moves(ops, source);
    }
}

/// Subtrees indexed by content hash, each bucket holding the first path an
/// equal subtree was observed at. Multiple distinct (non-equal) subtrees
/// can share a bucket on hash collision; [`UnchangedIndex::load`] scans the
/// bucket and compares with [`Node::deep_eq`] to confirm a real match.
#[derive(Default)]
struct UnchangedIndex {
    buckets: HashMap<HashCode, Vec<(String, Node)>>,
}

impl UnchangedIndex {
    fn store_or_load(&mut self, key: HashCode, path: &str, node: &Node) {
        let bucket = self.buckets.entry(key).or_default();
        if bucket.iter().any(|(_, existing)| existing.deep_eq(node)) {
            return;
        }
        bucket.push((path.to_string(), node.deep_copy()));
    }

    fn load(&self, key: HashCode, node: &Node) -> Option<&str> {
        self.buckets
            .get(&key)?
            .iter()
            .find(|(_, existing)| existing.deep_eq(node))
            .map(|(path, _)| path.as_str())
    }
}

/// Index every subtree that is identical between `source` and `target` at
/// the same path, keyed by content hash, so a later `add` can be rewritten
/// into a `copy` from wherever that value already lives in `source`.
fn build_unchanged_index(source: &Node, target: &Node) -> UnchangedIndex {
    let mut index = UnchangedIndex::default();
    let mut path = PointerBuilder::new();
    collect_unchanged(&mut index, &mut path, source, target);
    index
}

fn collect_unchanged(index: &mut UnchangedIndex, path: &mut PointerBuilder, source: &Node, target: &Node) {
    if source.deep_eq(target) {
        index.store_or_load(hash::hash(source), &path.render(), source);
        return;
    }
    match (&source.kind, &target.kind) {
        (crate::node::NodeKind::Array(s), crate::node::NodeKind::Array(t)) => {
            for (i, (sc, tc)) in s.iter().zip(t.iter()).enumerate() {
                path.push(i.to_string());
                collect_unchanged(index, path, sc, tc);
                path.pop();
            }
        }
        (crate::node::NodeKind::Object(s), crate::node::NodeKind::Object(t)) => {
            for (key, sc) in s {
                if let Some(tc) = t.get(key) {
                    path.push(key.clone());
                    collect_unchanged(index, path, sc, tc);
                    path.pop();
                }
            }
        }
        _ => {}
    }
}

fn rewrite_copies(ops: &mut Vec<PatchOperation>, index: &UnchangedIndex, options: DiffOptions) {
    let mut i = 0;
    while i < ops.len() {
        let found = match &ops[i] {
            PatchOperation::Add(add) => {
                let key = hash::hash(&add.value);
                index.load(key, &add.value).map(|p| p.to_string())
            }
            _ => None,
        };
        if let Some(from) = found {
            let PatchOperation::Add(AddOperation { path, value }) = ops[i].clone() else {
                unreachable!()
            };
            if from == path {
                i += 1;
                continue;
            }
            if options.check_copy_enabled() {
                ops.insert(
                    i,
                    PatchOperation::Test(TestOperation {
                        path: from.clone(),
                        value: value.clone(),
                    }),
                );
                i += 1;
            }
            ops[i] = PatchOperation::Copy(CopyOperation { from, path });
        }
        i += 1;
    }
}

fn rewrite_moves(ops: &mut Vec<PatchOperation>, source: &Node) {
    let mut i = 0;
    while i < ops.len() {
        if !matches!(ops[i], PatchOperation::Remove(_) | PatchOperation::Add(_)) {
            i += 1;
            continue;
        }
        let lhs_value = op::diff_value(&ops[i], source);
        let mut matched = None;
        if let Some(lhs_value) = lhs_value {
            let mut j = i + 1;
            while j < ops.len() {
                if let Some(rhs_value) = op::diff_value(&ops[j], source) {
                    if lhs_value.deep_eq(&rhs_value) {
                        let move_op = match (&ops[i], &ops[j]) {
                            (PatchOperation::Remove(rm), PatchOperation::Add(add)) => {
                                Some((add.path.clone(), rm.path.clone()))
                            }
                            (PatchOperation::Add(add), PatchOperation::Remove(rm)) => {
                                Some((add.path.clone(), rm.path.clone()))
                            }
                            _ => None,
                        };
                        if let Some((path, from)) = move_op {
                            matched = Some((j, path, from));
                            break;
                        }
                    }
                }
                j += 1;
            }
        }
        if let Some((j, path, from)) = matched {
            ops.remove(j);
            ops[i] = PatchOperation::Move(MoveOperation { from, path });
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_builder_is_additive() {
        let opts = DiffOptions::new().use_copy().use_move();
        assert!(opts.copy_enabled());
        assert!(opts.move_enabled());
        assert!(!opts.check_copy_enabled());
        assert!(!opts.full_remove_enabled());
    }
}
