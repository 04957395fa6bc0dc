//! Site blacklist matching.

use url::Url;

/// Whether the host of `url` matches an entry in `blacklist`.
///
/// Entries are exact host names, or `*.suffix` patterns matching any host
/// ending in `suffix`. Unparseable URLs never match.
pub fn is_domain_blacklisted(url: &str, blacklist: &[String]) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };

    blacklist.iter().any(|blocked| match blocked.strip_prefix("*.") {
        Some(suffix) => host.ends_with(suffix),
        None => host == blocked,
    })
}
