//! Route table read view and resource resolution.

use serde::Deserialize;

/// One prefix-to-service mapping from the gateway route table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteEntry {
    /// Path prefix owned by the target service.
    pub prefix: String,
    /// Identifier of the backend service the prefix routes to.
    pub service_id: String,
}

/// Ordered, first-match-wins route table.
///
/// The routing engine owns the table; the gate only reads it to derive
/// resource names. Matching is substring containment in table order with no
/// longest-prefix preference, so resolution is order-dependent: reordering
/// entries can change which resource a path maps to. That sharp edge is
/// deliberate and mirrors how the proxy itself picks routes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    #[must_use]
    pub fn new(entries: Vec<RouteEntry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Resolve the logical resource identifier a request path targets.
    ///
    /// The first entry whose prefix occurs anywhere in the path wins. Every
    /// occurrence of the prefix is removed from the path, the remainder is
    /// split immediately before each `/`, and the first two pieces joined
    /// form the resource identifier.
    ///
    /// Returns `None` when no prefix matches, or when the matching entry
    /// leaves fewer than two pieces — a path addressing a whole service
    /// rather than an entity within it names no protected resource.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<String> {
        for entry in &self.entries {
            if !path.contains(entry.prefix.as_str()) {
                continue;
            }
            let remainder = path.replace(entry.prefix.as_str(), "");
            let pieces = split_before_separators(&remainder);
            let (Some(first), Some(second)) = (pieces.first(), pieces.get(1)) else {
                return None;
            };
            return Some(format!("{first}{second}"));
        }
        None
    }
}

/// Split `s` immediately before every `/`, so each separator starts the
/// piece that follows it. A leading `/` starts the first piece rather than
/// producing an empty one.
fn split_before_separators(s: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in s.match_indices('/') {
        // A boundary at the very start produces no empty piece.
        if idx > start {
            pieces.push(&s[start..idx]);
            start = idx;
        }
    }
    pieces.push(&s[start..]);
    pieces
}
