//! URL discovery in message bodies and link-list pages.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::domain::UrlClassifier;

fn generic_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"https?://[^\s<>\[\]"']+"#).expect("valid URL pattern"))
}

fn script_link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"javascript:self\.abre\('(.+?)'\)").expect("valid script link pattern")
    })
}

/// A URL is usable when it parses and has both a scheme and a host.
pub fn is_valid_url(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|url| !url.scheme().is_empty() && url.host_str().is_some_and(|h| !h.is_empty()))
        .unwrap_or(false)
}

/// Every valid `http(s)://` URL in free text, in order of appearance.
pub fn find_urls(text: &str) -> Vec<String> {
    generic_url_pattern()
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|candidate| is_valid_url(candidate))
        .map(String::from)
        .collect()
}

/// URLs opened through `javascript:self.abre('...')` calls in a link-list page.
pub fn find_script_links(text: &str) -> Vec<String> {
    script_link_pattern()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|candidate| is_valid_url(candidate))
        .map(String::from)
        .collect()
}

/// Link-list seed URLs found across message bodies, first occurrence wins.
pub fn discover_seeds<I, B>(bodies: I, classifier: &UrlClassifier) -> Vec<String>
where
    I: IntoIterator<Item = B>,
    B: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut seeds = Vec::new();

    for body in bodies {
        for url in find_urls(body.as_ref()) {
            if classifier.is_link_list(&url) && seen.insert(url.clone()) {
                seeds.push(url);
            }
        }
    }

    seeds
}
