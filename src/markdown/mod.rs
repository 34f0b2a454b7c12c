//! Metadata splitting for MDX documents.
//!
//! An MDX document is a body optionally preceded by a `---` delimited
//! preamble:
//!
//! ```markdown
//! ---
//! title: Hello
//! components: {"Button": "react-button"}
//! $type: https://schema.org/BlogPosting
//! $context: https://mdx.org.ai/docs
//! ---
//!
//! # Hello
//!
//! <Button>Click</Button>
//! ```
//!
//! [`split`] returns the body and two disjoint views of the preamble:
//! **plain** metadata (display fields and artifact declarations) and
//! **linked** metadata (keys starting with `$` or `@`). Every key lands in
//! exactly one view.

pub mod frontmatter;

use serde_json::{Map, Value};

use crate::constants::LINKED_DATA_PREFIXES;

/// Ordered metadata map.
pub type Metadata = Map<String, Value>;

/// A document split into body and partitioned metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitDocument {
    /// Text after the preamble
    pub body: String,
    /// Entries without a linked-data prefix
    pub plain: Metadata,
    /// Entries whose key starts with a linked-data prefix
    pub linked: Metadata,
}

/// Whether a frontmatter key belongs to the linked-data namespace.
pub fn is_linked_key(key: &str) -> bool {
    key.starts_with(LINKED_DATA_PREFIXES)
}

/// Partition a metadata map into `(plain, linked)`, preserving order.
pub fn partition(entries: Metadata) -> (Metadata, Metadata) {
    let mut plain = Map::new();
    let mut linked = Map::new();
    for (key, value) in entries {
        if is_linked_key(&key) {
            linked.insert(key, value);
        } else {
            plain.insert(key, value);
        }
    }
    (plain, linked)
}

/// Split raw document text.
///
/// A document without a preamble is all body with empty metadata. Never
/// fails; bad preamble lines are dropped one at a time.
pub fn split(text: &str) -> SplitDocument {
    let (raw, body) = frontmatter::split_preamble(text);
    let entries = raw.as_deref().map(frontmatter::parse_preamble).unwrap_or_default();
    let (plain, linked) = partition(entries);

    SplitDocument {
        body,
        plain,
        linked,
    }
}
