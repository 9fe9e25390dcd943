// Link extraction from HTML entry content

use scraper::{Html, Selector};
use std::sync::LazyLock;

static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static selector is valid"));

/// Split off a leading `scheme:` (a letter followed by letters, digits, `+`,
/// `-` or `.`), returning what follows it.
fn after_scheme(link: &str) -> &str {
    let Some((scheme, rest)) = link.split_once(':') else {
        return link;
    };
    let valid = scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if valid { rest } else { link }
}

/// Normalize an `href` into a link target, or `None` if it does not name an
/// entry in the archive.
///
/// Leading `.` and `/` characters are stripped. Anything with a network
/// location (a non-empty authority after `//`) is external and dropped; so is
/// anything whose path is empty (pure `#fragment` or `?query` links). A
/// scheme without an authority, as in `http:Foo` or `Category:Fruit`, is part
/// of an entry path. The returned target is the stripped href verbatim, since
/// archive entries are addressed by their relative path.
pub fn normalize_href(href: &str) -> Option<&str> {
    let link = href.trim_start_matches(['.', '/']);
    let mut rest = after_scheme(link);

    if let Some(authority) = rest.strip_prefix("//") {
        let end = authority.find(['/', '?', '#']).unwrap_or(authority.len());
        if end > 0 {
            return None;
        }
        rest = authority;
    }

    let path_end = rest.find(['?', '#']).unwrap_or(rest.len());
    (path_end > 0).then_some(link)
}

/// Collect every `href` value of the document's anchor elements, in document order.
pub fn extract_hrefs(html: &[u8]) -> Vec<String> {
    let document = Html::parse_document(&String::from_utf8_lossy(html));
    document
        .select(&LINK_SELECTOR)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}

/// Anchor targets of an HTML document that name archive entries.
pub fn extract_links(html: &[u8]) -> Vec<String> {
    extract_hrefs(html)
        .iter()
        .filter_map(|href| normalize_href(href))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_links_kept_verbatim() {
        assert_eq!(normalize_href("Apple"), Some("Apple"));
        assert_eq!(normalize_href("./Apple"), Some("Apple"));
        assert_eq!(normalize_href("../Apple"), Some("Apple"));
        assert_eq!(normalize_href("/wiki/Apple"), Some("wiki/Apple"));
    }

    #[test]
    fn test_query_and_fragment_kept_on_target() {
        assert_eq!(normalize_href("Apple#History"), Some("Apple#History"));
        assert_eq!(normalize_href("Apple?action=raw"), Some("Apple?action=raw"));
    }

    #[test]
    fn test_fragment_or_query_only_dropped() {
        assert_eq!(normalize_href("#cite_note-1"), None);
        assert_eq!(normalize_href("?oldid=4"), None);
        assert_eq!(normalize_href(""), None);
        assert_eq!(normalize_href("./"), None);
    }

    #[test]
    fn test_external_links_dropped() {
        assert_eq!(normalize_href("https://en.wikipedia.org/wiki/Apple"), None);
        assert_eq!(normalize_href("http://example.com"), None);
        assert_eq!(normalize_href("ftp://mirror/Apple"), None);
        assert_eq!(normalize_href("//cdn.example.com/x.js"), Some("cdn.example.com/x.js"));
    }

    #[test]
    fn test_scheme_without_authority_is_an_entry() {
        assert_eq!(normalize_href("http:Foo"), Some("http:Foo"));
        assert_eq!(normalize_href("https:Bar"), Some("https:Bar"));
        assert_eq!(normalize_href("file:///Baz"), Some("file:///Baz"));
        assert_eq!(normalize_href("Apple:"), None);
        assert_eq!(normalize_href("http:#top"), None);
    }

    #[test]
    fn test_colon_paths_are_entries() {
        assert_eq!(normalize_href("Category:Fruit"), Some("Category:Fruit"));
        assert_eq!(normalize_href("mailto:someone@example.com"), Some("mailto:someone@example.com"));
    }

    #[test]
    fn test_extract_links() {
        let html = br##"<html><body>
            <a href="Apple">Apple</a>
            <a href="https://example.com/">External</a>
            <a href="#top">Top</a>
            <a name="anchor">No href</a>
            <a href="./Category:Fruit">Fruit</a>
        </body></html>"##;

        assert_eq!(extract_links(html), vec!["Apple", "Category:Fruit"]);
        assert_eq!(extract_hrefs(html).len(), 4);
    }

    #[test]
    fn test_extract_links_non_utf8() {
        let html = b"<a href=\"Caf\xe9\">x</a><a href=\"Tea\">y</a>";
        let links = extract_links(html);
        assert_eq!(links.len(), 2);
        assert_eq!(links[1], "Tea");
    }
}
