//! Known specifier → URL mappings.
//!
//! Mappings are immutable configuration loaded once. Lookup precedence is
//! fixed: the context-specific table, then the default table. A type
//! identifier without a direct entry is retried through its inheritance chain
//! within each scope before moving on to the next scope.
//!
//! ```toml
//! [mappings.default.layouts]
//! "schema.org/Thing" = "https://esm.sh/@mdxui/thing-layout"
//!
//! [mappings.contexts."mdx.org.ai/docs".layouts]
//! "schema.org/BlogPosting" = "https://esm.sh/@mdxui/docs-layout"
//!
//! [types."mdx.org.ai/Guide"]
//! inherits = ["schema.org/BlogPosting"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use super::ArtifactKind;

/// Types the original mdx.org.ai vocabulary declares as subtypes of `schema.org/Thing`.
const THING_SUBTYPES: &[&str] = &[
    "mdx.org.ai/Product",
    "mdx.org.ai/BlogPost",
    "mdx.org.ai/Agent",
    "mdx.org.ai/API",
    "mdx.org.ai/App",
    "mdx.org.ai/Assistant",
    "mdx.org.ai/Blog",
    "mdx.org.ai/Component",
    "mdx.org.ai/Function",
    "mdx.org.ai/Workflow",
    "mdx.org.ai/Directory",
    "mdx.org.ai/Eval",
    "mdx.org.ai/Package",
    "mdx.org.ai/Prompt",
    "mdx.org.ai/Startup",
    "mdx.org.ai/StateMachine",
    "mdx.org.ai/Tool",
    "mdx.org.ai/WebPage",
    "mdx.org.ai/Worker",
];

/// One scope of mappings, split by artifact kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingTable {
    /// Specifier or type → component URL
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub components: BTreeMap<String, String>,
    /// Specifier or type → layout URL
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub layouts: BTreeMap<String, String>,
}

impl MappingTable {
    fn normalized(&self) -> Self {
        let norm = |map: &BTreeMap<String, String>| {
            map.iter().map(|(k, v)| (normalize_key(k), v.clone())).collect()
        };
        Self {
            components: norm(&self.components),
            layouts: norm(&self.layouts),
        }
    }

    fn get(&self, key: &str) -> Option<MappedArtifact> {
        if let Some(url) = self.layouts.get(key) {
            return Some(MappedArtifact {
                url: url.clone(),
                kind: ArtifactKind::Layout,
            });
        }
        self.components.get(key).map(|url| MappedArtifact {
            url: url.clone(),
            kind: ArtifactKind::Component,
        })
    }
}

/// `[mappings]` section of the configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingsConfig {
    /// Mappings that apply regardless of context
    #[serde(default)]
    pub default: MappingTable,
    /// Mappings that apply only under a given `$context`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub contexts: BTreeMap<String, MappingTable>,
}

/// `[types."<type>"]` entry of the configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeConfig {
    /// Parent types searched, in order, when this type has no mapping
    #[serde(default)]
    pub inherits: Vec<String>,
}

/// A mapping hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedArtifact {
    /// Target URL
    pub url: String,
    /// Which table the hit came from
    pub kind: ArtifactKind,
}

/// Immutable, normalized lookup tables.
#[derive(Debug, Clone, Default)]
pub struct Mappings {
    default: MappingTable,
    contexts: HashMap<String, MappingTable>,
    inherits: HashMap<String, Vec<String>>,
}

impl Mappings {
    /// Build lookup tables from configuration, layered over the built-in type hierarchy.
    pub fn new(config: &MappingsConfig, types: &BTreeMap<String, TypeConfig>) -> Self {
        let mut inherits: HashMap<String, Vec<String>> = THING_SUBTYPES
            .iter()
            .map(|t| (normalize_key(t), vec!["schema.org/Thing".to_string()]))
            .collect();

        for (name, ty) in types {
            inherits.insert(normalize_key(name), ty.inherits.iter().map(|p| normalize_key(p)).collect());
        }

        Self {
            default: config.default.normalized(),
            contexts: config.contexts.iter().map(|(k, v)| (normalize_key(k), v.normalized())).collect(),
            inherits,
        }
    }

    /// Look up `key` under an optional context.
    ///
    /// Returns the first hit in precedence order: context table (key, then its
    /// ancestors), then default table (key, then its ancestors).
    pub fn lookup(&self, context: Option<&str>, key: &str) -> Option<MappedArtifact> {
        let candidates = self.lineage(&normalize_key(key));

        let context_table = context.and_then(|c| self.contexts.get(&normalize_key(c)));
        for table in context_table.into_iter().chain(std::iter::once(&self.default)) {
            if let Some(hit) = candidates.iter().find_map(|candidate| table.get(candidate)) {
                return Some(hit);
            }
        }
        None
    }

    /// `key` followed by its ancestors, depth-first, each visited once.
    fn lineage(&self, key: &str) -> Vec<String> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![key.to_string()];

        while let Some(current) = stack.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(parents) = self.inherits.get(&current) {
                // Reverse so the first declared parent is visited first
                stack.extend(parents.iter().rev().cloned());
            }
            order.push(current);
        }
        order
    }
}

/// Normalize a type, context, or specifier key.
///
/// Strips an `http(s)://` scheme and trailing slashes so that
/// `https://schema.org/Thing` and `schema.org/Thing` address the same entry.
pub fn normalize_key(key: &str) -> String {
    let key = key.trim();
    let key = key
        .strip_prefix("https://")
        .or_else(|| key.strip_prefix("http://"))
        .unwrap_or(key);
    key.trim_end_matches('/').to_string()
}
