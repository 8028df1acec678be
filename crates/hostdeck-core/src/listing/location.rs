// ── Location string ──
//
// The dashboard reflects its page number in a shareable location:
// `/` for the first page, `/?page=N` otherwise. Updates replace the
// current location; there is no history stack.

use std::fmt;

/// Page number from a query string (`page=3`, with or without a leading
/// `?`). Missing, unparsable, and non-positive values read as page 1.
pub fn parse_page_param(query: &str) -> u32 {
    let query = query.strip_prefix('?').unwrap_or(query);
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.trim().parse::<u32>().ok())
        .filter(|page| *page > 0)
        .unwrap_or(1)
}

/// Current dashboard location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    path: String,
    query: String,
}

impl Default for Location {
    fn default() -> Self {
        Self::for_page(1)
    }
}

impl Location {
    /// Parse an href such as `/?page=2` or `/servers?page=2#top`.
    pub fn parse(href: &str) -> Self {
        let href = href.split_once('#').map_or(href, |(before, _)| before);
        let (path, query) = href.split_once('?').unwrap_or((href, ""));
        Self {
            path: if path.is_empty() { "/".into() } else { path.into() },
            query: query.into(),
        }
    }

    /// Canonical location for a page. Page 1 carries no query.
    pub fn for_page(page: u32) -> Self {
        Self {
            path: "/".into(),
            query: if page <= 1 {
                String::new()
            } else {
                format!("page={page}")
            },
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query without the leading `?`.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn page(&self) -> u32 {
        parse_page_param(&self.query)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.query.is_empty() {
            f.write_str(&self.path)
        } else {
            write!(f, "{}?{}", self.path, self.query)
        }
    }
}
