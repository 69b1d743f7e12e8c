use chrono::{DateTime, Local};
use url::Url;

/// Placeholder domain for URLs whose host can't be parsed. A single bad row
/// must not abort the batch, so these are binned rather than rejected.
pub const UNKNOWN_DOMAIN: &str = "unknown";

/// One normalized browsing event, immutable once extracted.
///
/// `visit_time` is in local time so hour and weekday buckets reflect the
/// user's clock, matching how the history is experienced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    pub url: String,
    pub domain: String,
    pub title: Option<String>,
    pub visit_time: DateTime<Local>,
}

impl Visit {
    pub fn new(url: &str, title: Option<String>, visit_time: DateTime<Local>) -> Self {
        Self {
            url: url.to_string(),
            domain: domain_of(url),
            title,
            visit_time,
        }
    }
}

/// Extract the host component of a URL, falling back to [`UNKNOWN_DOMAIN`]
/// for malformed URLs or schemes without a host (`file:`, `about:` and the
/// like).
pub fn domain_of(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed
            .host_str()
            .map(str::to_string)
            .unwrap_or_else(|| UNKNOWN_DOMAIN.to_string()),
        Err(_) => UNKNOWN_DOMAIN.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_of_standard_url() {
        assert_eq!(domain_of("https://example.com/path?q=1"), "example.com");
        assert_eq!(domain_of("http://sub.a.org"), "sub.a.org");
    }

    #[test]
    fn domain_of_malformed_url_is_unknown() {
        assert_eq!(domain_of("not a url"), UNKNOWN_DOMAIN);
        assert_eq!(domain_of(""), UNKNOWN_DOMAIN);
    }

    #[test]
    fn domain_of_hostless_scheme_is_unknown() {
        assert_eq!(domain_of("about:blank"), UNKNOWN_DOMAIN);
        assert_eq!(domain_of("data:text/plain,hi"), UNKNOWN_DOMAIN);
    }
}
