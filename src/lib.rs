//! A [JSON Patch (RFC 6902)](https://tools.ietf.org/html/rfc6902) and
//! [JSON Merge Patch (RFC 7396)](https://tools.ietf.org/html/rfc7396)
//! implementation built on a hand-written JSON parser, so that every scalar
//! retains its original source lexeme instead of being reformatted when the
//! document is re-serialized.
//!
//! # Usage
//!
//! Add this to your *Cargo.toml*:
//! ```toml
//! [dependencies]
//! jsondelta = "*"
//! ```
//!
//! # Examples
//!
//! ```rust
//! use jsondelta::{apply, diff, parse, serialize, DiffOptions};
//!
//! let source = parse(br#"{"title":"Goodbye!","tags":["example","sample"]}"#).unwrap();
//! let target = parse(br#"{"title":"Hello!","tags":["example"]}"#).unwrap();
//!
//! let ops = diff(&source, &target, DiffOptions::new());
//! let patched = apply(&source, &ops).unwrap();
//! assert!(patched.deep_eq(&target));
//! assert_eq!(serialize(&patched), serialize(&target));
//! ```
#![warn(missing_docs)]

mod apply;
mod diff;
mod error;
mod hash;
mod lexer;
mod node;
mod op;
mod options;
mod parser;
pub mod pointer;

pub use apply::merge;
pub use error::{ParseError, PatchError};
pub use hash::HashCode;
pub use node::{Node, NodeKind, Scalar};
pub use op::{
    AddOperation, CopyOperation, MoveOperation, Patch, PatchOperation, RemoveOperation,
    ReplaceOperation, TestOperation,
};
pub use options::DiffOptions;

/// Parse a complete JSON document into a [`Node`] tree.
///
/// The parser records the raw source lexeme of every number and string, so
/// [`serialize`]-ing a [`Node`] before any patch is applied to it reproduces
/// the original bytes exactly.
pub fn parse(input: &[u8]) -> Result<Node, ParseError> {
    parser::parse(input)
}

/// Serialize a [`Node`] tree back to JSON bytes.
pub fn serialize(node: &Node) -> Vec<u8> {
    parser::serialize(node)
}

/// Compute the patch that turns `source` into `target`.
///
/// `options` tunes optional rewrite passes that can shrink the resulting
/// patch at the cost of extra computation; [`DiffOptions::new`] runs the
/// base object/array diff with none of them enabled.
pub fn diff(source: &Node, target: &Node, options: DiffOptions) -> Vec<PatchOperation> {
    diff::diff(source, target, options)
}

/// Parse `source` and `target`, diff them, and serialize the resulting
/// patch back to the RFC 6902 wire format in one call.
pub fn diff_bytes(
    source: &[u8],
    target: &[u8],
    options: DiffOptions,
) -> Result<Vec<u8>, ParseError> {
    let source = parse(source)?;
    let target = parse(target)?;
    let ops = diff(&source, &target, options);
    Ok(serialize(&Patch(ops).to_node()))
}

/// Apply a sequence of patch operations to `source`, returning the result.
///
/// `source` is left untouched; if any operation fails the whole call fails
/// and no partially-patched document is ever exposed to the caller.
pub fn apply(source: &Node, ops: &[PatchOperation]) -> Result<Node, PatchError> {
    apply::apply(source, ops)
}

/// Apply patch operations to `doc` in place, without the atomic-failure
/// guarantee [`apply`] provides: an operation that fails partway through
/// leaves earlier operations applied.
pub fn apply_unchecked(doc: &mut Node, ops: &[PatchOperation]) -> Result<(), PatchError> {
    apply::apply_unchecked(doc, ops)
}

/// Compute the content hash of a subtree: [`Node::deep_eq`] subtrees always
/// hash equal.
pub fn content_hash(node: &Node) -> HashCode {
    hash::hash(node)
}
