//! Content hashing used by the `move`/`copy` diff rewrite passes.
//!
//! The hash itself is treated as an external black-box primitive (see
//! `SPEC_FULL.md`); only its consistency (equal subtrees hash equal) and
//! the canonical encoding that feeds it are part of this crate's contract.

use md5::{Digest, Md5};

use crate::node::{Node, NodeKind, Scalar};

/// Output of the content hash - an MD5 digest.
pub type HashCode = [u8; 16];

/// Compute the content hash of a subtree.
///
/// Scalars hash their canonical textual form. Arrays fold their children's
/// hashes in order. Objects sort their children's hashes before folding,
/// so that two objects which differ only in key order (and are therefore
/// [`Node::deep_eq`]) hash identically.
pub fn hash(node: &Node) -> HashCode {
    match &node.kind {
        NodeKind::Value(scalar) => hash_scalar(scalar),
        NodeKind::Array(children) => {
            let mut digest = Md5::new();
            for child in children {
                digest.update(hash(child));
            }
            finalize(digest)
        }
        NodeKind::Object(children) => {
            let mut codes: Vec<HashCode> = children.values().map(hash).collect();
            codes.sort_unstable();
            let mut digest = Md5::new();
            for code in codes {
                digest.update(code);
            }
            finalize(digest)
        }
    }
}

/// Compute and cache the content hash on `node` itself, returning it.
pub fn cache(node: &mut Node) -> HashCode {
    let code = hash(node);
    node.hash = Some(code);
    code
}

fn hash_scalar(scalar: &Scalar) -> HashCode {
    let text = match scalar {
        Scalar::Null => "null".to_string(),
        Scalar::Bool(b) => b.to_string(),
        Scalar::Number { value, .. } => format!("{value}"),
        Scalar::String { value, .. } => value.clone(),
    };
    let mut digest = Md5::new();
    digest.update(text.as_bytes());
    finalize(digest)
}

fn finalize(digest: Md5) -> HashCode {
    digest.finalize().into()
}
