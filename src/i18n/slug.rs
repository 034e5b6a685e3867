/// Normalize a (possibly translated) title into a URL slug.
///
/// Letters and digits are kept (unicode included) and lowercased, every run of
/// whitespace or punctuation becomes a single dash, `-` and `_` survive as-is.
pub fn sanitize_title(raw: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;

    for ch in raw.trim().chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() && !slug.ends_with(['-', '_']) {
                slug.push('-');
            }
            slug.extend(ch.to_lowercase());
            pending_dash = false;
        } else if ch == '-' || ch == '_' {
            if !slug.is_empty() && !slug.ends_with(['-', '_']) {
                slug.push(ch);
            }
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }

    slug.trim_matches(&['-', '_'][..]).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_title_ascii() {
        assert_eq!(sanitize_title("Month"), "month");
        assert_eq!(sanitize_title("  Featured Events "), "featured-events");
        assert_eq!(sanitize_title("page!"), "page");
    }

    #[test]
    fn test_sanitize_title_unicode() {
        assert_eq!(sanitize_title("Día"), "día");
        assert_eq!(sanitize_title("Veranstaltungen & Mehr"), "veranstaltungen-mehr");
    }

    #[test]
    fn test_sanitize_title_dashes() {
        assert_eq!(sanitize_title("--list--"), "list");
        assert_eq!(sanitize_title("a - b"), "a-b");
        assert_eq!(sanitize_title(""), "");
    }
}
