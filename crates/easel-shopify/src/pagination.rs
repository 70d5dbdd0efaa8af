//! Shopify cursor-based pagination via the `Link` response header.
//!
//! Each Admin API page response carries a `Link` header with URLs for adjacent
//! pages; the cursor is the `page_info` query parameter of the `rel="next"`
//! entry. Format:
//!
//! ```text
//! <https://shop.com/admin/api/2024-01/products.json?limit=250&page_info=PREV>; rel="previous",
//! <https://shop.com/admin/api/2024-01/products.json?limit=250&page_info=NEXT>; rel="next"
//! ```

/// Parses a Shopify `Link` header value and extracts the `page_info` cursor
/// for the next page.
///
/// Returns `None` if the header is absent, there is no `rel="next"` segment
/// (last page reached), or the next URL carries no `page_info` parameter.
#[must_use]
pub fn extract_next_cursor(link_header: Option<&str>) -> Option<String> {
    let header = link_header?;

    for segment in header.split(',') {
        let segment = segment.trim();
        if !segment.contains(r#"rel="next""#) {
            continue;
        }

        let start = segment.find('<')? + 1;
        let end = segment.find('>')?;
        if start >= end {
            return None;
        }
        return page_info_param(&segment[start..end]);
    }

    None
}

/// Extracts the `page_info` query parameter from a URL string.
///
/// Shopify cursors are base64url-encoded, so no percent-decoding is needed.
fn page_info_param(url: &str) -> Option<String> {
    let query = &url[url.find('?')? + 1..];
    for pair in query.split('&') {
        if let Some(value) = pair.strip_prefix("page_info=") {
            let value = value.split('#').next().unwrap_or(value);
            if !value.is_empty() {
                return Some(value.to_owned());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_none_when_header_is_none() {
        assert!(extract_next_cursor(None).is_none());
    }

    #[test]
    fn extracts_cursor_from_single_next_link() {
        let header =
            r#"<https://shop.test/admin/api/2024-01/products.json?limit=250&page_info=abc123>; rel="next""#;
        assert_eq!(extract_next_cursor(Some(header)).as_deref(), Some("abc123"));
    }

    #[test]
    fn extracts_cursor_from_combined_prev_next_link() {
        let header = concat!(
            r#"<https://shop.test/products.json?limit=250&page_info=PREV>; rel="previous", "#,
            r#"<https://shop.test/products.json?limit=250&page_info=NEXT>; rel="next""#
        );
        assert_eq!(extract_next_cursor(Some(header)).as_deref(), Some("NEXT"));
    }

    #[test]
    fn returns_none_when_only_previous_link_present() {
        let header = r#"<https://shop.test/products.json?page_info=PREV>; rel="previous""#;
        assert!(extract_next_cursor(Some(header)).is_none());
    }

    #[test]
    fn returns_none_when_no_page_info_in_next_url() {
        let header = r#"<https://shop.test/products.json?limit=250>; rel="next""#;
        assert!(extract_next_cursor(Some(header)).is_none());
    }

    #[test]
    fn extracts_cursor_when_page_info_is_not_first_param() {
        let header = r#"<https://shop.test/products.json?limit=250&page_info=XYZ>; rel="next""#;
        assert_eq!(extract_next_cursor(Some(header)).as_deref(), Some("XYZ"));
    }
}
