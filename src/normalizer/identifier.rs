/// Canonical domain string for a blog URL.
///
/// Strips a leading `http://`/`https://`, drops every `www.` and cuts at the
/// first `/`. Input without any of these comes back unchanged.
pub fn domain_name(url: &str) -> String {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let rest = rest.replace("www.", "");
    rest.split('/').next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_scheme_www_and_path() {
        assert_eq!(domain_name("https://www.example.com/blog"), "example.com");
    }

    #[test]
    fn test_plain_http() {
        assert_eq!(domain_name("http://example.com"), "example.com");
    }

    #[test]
    fn test_no_scheme_with_path() {
        assert_eq!(domain_name("example.com/path"), "example.com");
    }

    #[test]
    fn test_scheme_match_is_case_sensitive() {
        assert_eq!(domain_name("HTTPS://example.com"), "HTTPS:");
    }

    #[test]
    fn test_unmatched_input_is_returned_as_is() {
        assert_eq!(domain_name("localhost"), "localhost");
        assert_eq!(domain_name(""), "");
    }

    #[test]
    fn test_www_removed_inside_host() {
        assert_eq!(domain_name("https://blog.www.example.org/"), "blog.example.org");
    }
}
