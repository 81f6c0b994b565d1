//! Hierarchical path handling.
//!
//! A footprint's persistent identity chain is a slash-delimited string whose
//! last segment identifies the leaf component and whose prior segments
//! identify the enclosing hierarchical sheet instances. Segments are opaque;
//! paths are only ever compared segment-wise.

use sublayout_board::Footprint;

/// Split a raw path string into segments, stripping leading/trailing
/// delimiters. An absent path yields a single empty segment. A result of
/// fewer than two segments denotes a root-level (non-hierarchical)
/// component.
pub fn segments(path: &str) -> Vec<String> {
    path.trim_matches('/').split('/').map(str::to_string).collect()
}

/// Path segments of a footprint.
pub fn path_of(footprint: &Footprint) -> Vec<String> {
    segments(&footprint.path)
}

/// True if the footprint's path starts with `prefix`, segment-wise. A path
/// shorter than the prefix never matches.
pub fn starts_with(footprint: &Footprint, prefix: &[String]) -> bool {
    let segs = path_of(footprint);
    segs.len() >= prefix.len() && segs[..prefix.len()] == *prefix
}

#[cfg(test)]
mod tests {
    use super::*;
    use sublayout_board::Point;

    fn fp(path: &str) -> Footprint {
        Footprint::new("U1", path, Point::new(0, 0))
    }

    fn prefix(segs: &[&str]) -> Vec<String> {
        segs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn splits_and_strips_delimiters() {
        assert_eq!(segments("/a/b/c"), ["a", "b", "c"]);
        assert_eq!(segments("a/b"), ["a", "b"]);
        assert_eq!(segments("/leaf/"), ["leaf"]);
    }

    #[test]
    fn absent_path_is_single_empty_segment() {
        assert_eq!(segments(""), [""]);
    }

    #[test]
    fn prefix_matching() {
        assert!(starts_with(&fp("/a/b/c"), &prefix(&["a"])));
        assert!(starts_with(&fp("/a/b/c"), &prefix(&["a", "b"])));
        assert!(starts_with(&fp("/a/b/c"), &prefix(&["a", "b", "c"])));
        assert!(!starts_with(&fp("/a/b/c"), &prefix(&["b"])));
        assert!(!starts_with(&fp("/a"), &prefix(&["a", "b"])));
        // Empty prefix matches everything.
        assert!(starts_with(&fp("/a"), &prefix(&[])));
    }
}
