//! Magnet extraction from free text.

/// Whitespace-split tokens that look like a magnet URI or a torrent URL.
pub fn extract_magnets(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|token| token.starts_with("magnet:?") || token.ends_with(".torrent"))
        .map(str::to_string)
        .collect()
}
