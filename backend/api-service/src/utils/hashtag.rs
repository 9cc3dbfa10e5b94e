use once_cell::sync::Lazy;
use regex::Regex;

pub const MAX_HASHTAGS_PER_POST: usize = 10;

static HASHTAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#([a-zA-Z0-9_\p{L}]+)").expect("valid hashtag regex"));

/// Extract hashtag names from post content.
///
/// Names are lower-cased and de-duplicated in order of first appearance;
/// at most ten are returned.
pub fn extract_hashtags(content: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();

    for cap in HASHTAG_RE.captures_iter(content) {
        let tag = cap[1].to_lowercase();
        if !tags.contains(&tag) {
            tags.push(tag);
            if tags.len() >= MAX_HASHTAGS_PER_POST {
                break;
            }
        }
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_basic() {
        assert_eq!(
            extract_hashtags("Hello #Rust and #rust_lang!"),
            vec!["rust", "rust_lang"]
        );
    }

    #[test]
    fn test_deduplicates_case_insensitively() {
        assert_eq!(extract_hashtags("#Go #go #GO"), vec!["go"]);
    }

    #[test]
    fn test_unicode_letters() {
        assert_eq!(extract_hashtags("今日は #東京 へ"), vec!["東京"]);
    }

    #[test]
    fn test_limit_of_ten() {
        let content: String = (0..15).map(|i| format!("#tag{i} ")).collect();
        let tags = extract_hashtags(&content);
        assert_eq!(tags.len(), 10);
        assert_eq!(tags[0], "tag0");
        assert_eq!(tags[9], "tag9");
    }

    #[test]
    fn test_no_tags() {
        assert!(extract_hashtags("no tags here # alone").is_empty());
    }
}
