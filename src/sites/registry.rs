//! Static host → adapter table.

use std::sync::Arc;

use tracing::debug;

use crate::app::{Result, ThreadlineError};
use crate::page::{LivePage, PageDriver};
use crate::sites::{
    AdapterOptions, HackerNewsAdapter, Platform, QuoraAdapter, RedditAdapter, SiteAdapter,
};

type Constructor = fn(Arc<LivePage>, Arc<dyn PageDriver>, AdapterOptions) -> Box<dyn SiteAdapter>;

const ADAPTERS: &[(&str, Platform)] = &[
    ("news.ycombinator.com", Platform::HackerNews),
    ("reddit.com", Platform::Reddit),
    ("quora.com", Platform::Quora),
];

/// Subdomain prefixes that never change which site a host belongs to.
const STRIPPED_PREFIXES: &[&str] = &["www.", "old.", "np.", "new.", "m."];

fn normalize(host: &str) -> String {
    host.trim().trim_end_matches('.').to_ascii_lowercase()
}

fn strip_prefix(host: &str) -> &str {
    STRIPPED_PREFIXES
        .iter()
        .find_map(|prefix| host.strip_prefix(*prefix))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(host)
}

fn is_same_or_subdomain(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|head| head.ends_with('.'))
}

/// Exact lookup on the stripped host, then on the bare host, then the
/// subdomain rule shared with [`is_supported_site`].
pub fn resolve_platform(host: &str) -> Result<Platform> {
    let bare = normalize(host);
    let stripped = strip_prefix(&bare);

    let exact = |candidate: &str| {
        ADAPTERS
            .iter()
            .find(|(domain, _)| *domain == candidate)
            .map(|(_, platform)| *platform)
    };

    exact(stripped)
        .or_else(|| exact(&bare))
        .or_else(|| {
            ADAPTERS
                .iter()
                .find(|(domain, _)| is_same_or_subdomain(&bare, domain))
                .map(|(_, platform)| *platform)
        })
        .ok_or_else(|| ThreadlineError::UnsupportedSite(host.to_string()))
}

/// True when `host` equals or is a subdomain of a registered domain.
pub fn is_supported_site(host: &str) -> bool {
    let bare = normalize(host);
    ADAPTERS
        .iter()
        .any(|(domain, _)| is_same_or_subdomain(&bare, domain))
}

fn constructor(platform: Platform) -> Constructor {
    match platform {
        Platform::HackerNews => HackerNewsAdapter::boxed,
        Platform::Reddit => RedditAdapter::boxed,
        Platform::Quora => QuoraAdapter::boxed,
    }
}

/// Builds the adapter for the page's host.
pub fn get_adapter(
    page: Arc<LivePage>,
    driver: Arc<dyn PageDriver>,
    options: AdapterOptions,
) -> Result<Box<dyn SiteAdapter>> {
    let platform = resolve_platform(page.host())?;
    debug!("Using {} adapter for {}", platform, page.host());
    Ok(constructor(platform)(page, driver, options))
}
