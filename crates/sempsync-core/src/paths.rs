//! URL path composition for management-API resources.
//!
//! Resource identifiers routinely embed `/` (topic names, queue names) and
//! compound identifiers join their parts with `,` inside a single path
//! segment. Segments after the first are therefore encoded by substituting
//! only the embedded `/` — a full percent-encode would also escape the commas
//! the API expects verbatim.

use crate::error::{SempError, SempResult};

/// Join path segments with `/`, replacing embedded `/` with `%2F` in every
/// segment except the first (the API root, which is a literal path).
pub fn compose_path(segments: &[&str]) -> SempResult<String> {
    let mut parts: Vec<String> = Vec::with_capacity(segments.len());
    for (i, seg) in segments.iter().enumerate() {
        if seg.is_empty() {
            return Err(SempError::config(format!(
                "empty path segment at position {} in {:?}",
                i, segments
            )));
        }
        if i > 0 {
            parts.push(seg.replace('/', "%2F"));
        } else {
            parts.push((*seg).to_string());
        }
    }
    Ok(parts.join("/"))
}

/// Join the parts of a compound instance identifier with `,`, e.g.
/// `name,virtualRouter`. Parts stay unencoded here; [`compose_path`] encodes
/// the resulting segment as a whole.
pub fn join_instance_id(parts: &[&str]) -> String {
    parts.join(",")
}

// ─── Tests ──────────────────────────────────────────────────────────
