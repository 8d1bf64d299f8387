//! Error types returned by parsing, diffing and applying patches.

/// Errors produced while tokenizing or parsing a JSON document.
///
/// Every variant carries the byte offset into the input at which the
/// problem was detected, so callers can point a user at the exact spot.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ParseError {
    /// A byte sequence does not start any valid token.
    #[error("unexpected byte {byte:#04x} at offset {offset}")]
    UnexpectedByte {
        /// Offset of the offending byte.
        offset: usize,
        /// The offending byte.
        byte: u8,
    },

    /// Input ended in the middle of a token or a structural construct.
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof {
        /// Offset at which input ran out.
        offset: usize,
    },

    /// A string literal contained a `\n`/`\r` byte or an unsupported escape.
    #[error("invalid string literal at offset {offset}")]
    InvalidString {
        /// Offset of the invalid byte.
        offset: usize,
    },

    /// A number literal did not match the JSON number grammar.
    #[error("invalid number literal at offset {offset}")]
    InvalidNumber {
        /// Offset at which the malformed number starts.
        offset: usize,
    },

    /// `true`, `false` or `null` did not match exactly.
    #[error("invalid literal at offset {offset}")]
    InvalidLiteral {
        /// Offset at which the malformed literal starts.
        offset: usize,
    },

    /// The token stream did not form a valid value/array/object per the grammar.
    #[error("unexpected token at offset {offset}: {message}")]
    UnexpectedToken {
        /// Offset of the unexpected token.
        offset: usize,
        /// Human readable description of what was expected instead.
        message: String,
    },

    /// Trailing bytes remained after a complete document was parsed.
    #[error("trailing data after document at offset {offset}")]
    TrailingData {
        /// Offset at which the trailing data starts.
        offset: usize,
    },
}

/// Errors that can occur while applying a patch to a document.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum PatchError {
    /// The patch document itself is not a well-formed array of operations.
    #[error("bad patch: {0}")]
    BadPatch(String),

    /// A pointer in the patch does not resolve to an existing location.
    #[error("path not found: {0}")]
    PathNotFound(String),

    /// An operation was attempted on a node of the wrong kind (e.g. `add`
    /// with a non-numeric key into an array).
    #[error("bad node type at {path}: {message}")]
    BadNodeType {
        /// Path at which the mismatch was detected.
        path: String,
        /// Description of the mismatch.
        message: String,
    },

    /// An array index was out of the `[0, len]` range the operation allows.
    #[error("index {index} out of range (length {len}) at {path}")]
    IndexOutOfRange {
        /// Path at which the index was used.
        path: String,
        /// The offending index.
        index: usize,
        /// Length of the array at the time of the operation.
        len: usize,
    },

    /// A `test` operation's value did not match the document.
    #[error("test failed at {path}: {message}")]
    TestFailed {
        /// Path that was tested.
        path: String,
        /// Description of the expected vs. actual mismatch.
        message: String,
    },

    /// A `move` operation's `from` is a prefix of its `path`, which would
    /// move a node into one of its own descendants.
    #[error("cannot move {from} into its own descendant {path}")]
    InvalidMove {
        /// Source path of the move.
        from: String,
        /// Destination path of the move.
        path: String,
    },
}
