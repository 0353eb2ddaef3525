//! Source attribution for retrieved passages.

use lexdraft_shared::SourceDescriptor;

use crate::sidecar::HitMetadata;

/// Filename used for passages with no recorded provenance.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// Derive where a passage came from. `None` when the metadata records
/// neither a local path nor an object-store key.
pub fn derive_source(metadata: &HitMetadata, data_root_marker: &str) -> Option<SourceDescriptor> {
    if metadata.source.is_none() && metadata.s3_key.is_none() {
        return None;
    }

    let is_remote = matches!(metadata.source_type.as_deref(), Some("remote" | "s3"));
    if let (true, Some(key)) = (is_remote, metadata.s3_key.as_deref()) {
        let filename = metadata
            .file_name
            .clone()
            .unwrap_or_else(|| last_segment(key).to_string());
        return Some(SourceDescriptor::remote(filename, key));
    }

    let path = metadata.source.as_deref().unwrap_or_default();
    let relative = relative_to_marker(path, data_root_marker);
    let filename = metadata.file_name.clone().unwrap_or(relative);
    if filename.is_empty() {
        return Some(SourceDescriptor::local(UNKNOWN_SOURCE));
    }
    Some(SourceDescriptor::local(filename))
}

/// The part of `path` after the first segment equal to `marker`, joined with
/// `/`. Without such a segment, the final path component.
pub fn relative_to_marker(path: &str, marker: &str) -> String {
    let segments: Vec<&str> = path.split(['/', '\\']).collect();
    match segments.iter().position(|s| *s == marker) {
        Some(idx) => segments[idx + 1..].join("/"),
        None => last_segment(path).to_string(),
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Remove repeated descriptors, keeping the first occurrence of each.
pub fn dedup_sources(sources: impl IntoIterator<Item = SourceDescriptor>) -> Vec<SourceDescriptor> {
    let mut unique: Vec<SourceDescriptor> = Vec::new();
    for source in sources {
        if !unique.contains(&source) {
            unique.push(source);
        }
    }
    unique
}
