//! Website strategy: fork listing from the network members page, divergence
//! from the banner on each fork's front page. No token is needed.

use crate::data_source::{ComparisonSource, ForkSource};
use crate::error::{ForkRankError, Result};
use crate::github::types::{Counts, RepositoryRef};
use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

static REPO_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)/?$").expect("valid regex"));

static DIVERGENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([\d,]+)\s+commits?\s+ahead(?:\s+of)?(?:\s*,\s*([\d,]+)\s+commits?\s+behind)?")
        .expect("valid regex")
});

pub struct ScrapeClient {
    http: reqwest::Client,
    web_url: String,
}

impl ScrapeClient {
    pub fn new(web_url: &str, user_agent: &str) -> Result<Self> {
        let http = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            http,
            web_url: web_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_page(&self, path: &str) -> Result<String> {
        let url = format!("{}/{path}", self.web_url);
        debug!(%url, "fetching page");
        let body = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}

#[async_trait]
impl ForkSource for ScrapeClient {
    async fn fork_page(&self, parent: &RepositoryRef, page: u32) -> Result<Vec<RepositoryRef>> {
        // the members page is a single document
        if page > 1 {
            return Ok(Vec::new());
        }
        let html = self
            .fetch_page(&format!("{}/network/members", parent.key()))
            .await?;
        parse_members(&html, parent)
    }
}

#[async_trait]
impl ComparisonSource for ScrapeClient {
    async fn fetch_counts(&self, fork: &RepositoryRef, _parent: &RepositoryRef) -> Result<Counts> {
        let html = self.fetch_page(fork.key()).await?;
        Ok(banner_divergence(&html))
    }
}

/// Forks linked from a network members page. Forks keep the parent's name;
/// links to the parent itself and repeats are dropped.
pub fn parse_members(html: &str, parent: &RepositoryRef) -> Result<Vec<RepositoryRef>> {
    let selector =
        Selector::parse("a[href]").map_err(|e| ForkRankError::Scrape(e.to_string()))?;
    let document = Html::parse_document(html);

    let mut seen = HashSet::new();
    let mut forks = Vec::new();
    for anchor in document.select(&selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(caps) = REPO_LINK.captures(href) else {
            continue;
        };
        let (owner, repo) = (&caps[1], &caps[2]);
        if !repo.eq_ignore_ascii_case(parent.name()) || owner.eq_ignore_ascii_case(parent.owner()) {
            continue;
        }
        let fork = RepositoryRef::new(owner, parent.name());
        if seen.insert(fork.key().to_string()) {
            forks.push(fork);
        }
    }

    Ok(forks)
}

/// Whitespace-normalized text content of an HTML document.
pub fn page_text(html: &str) -> String {
    let document = Html::parse_document(html);
    document
        .root_element()
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Elements that have carried the "This branch is ..." banner.
const BANNER_SELECTORS: [&str; 3] = [
    ".branch-infobar",
    "[data-testid='branch-info-bar']",
    "[class*='BranchInfoBar']",
];

const BANNER_PREFIX: &str = "This branch is";

/// Divergence from the fork's branch banner, ignoring README and other page
/// text. Without a known banner element, only sentences starting with
/// "This branch is" are read.
pub fn banner_divergence(html: &str) -> Counts {
    let document = Html::parse_document(html);
    for selector in BANNER_SELECTORS.iter().filter_map(|s| Selector::parse(s).ok()) {
        for banner in document.select(&selector) {
            let text = banner
                .text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ");
            let counts = parse_divergence(&text);
            if counts != Counts::UNKNOWN {
                return counts;
            }
        }
    }

    let text = page_text(html);
    text.match_indices(BANNER_PREFIX)
        .map(|(at, _)| {
            let sentence = &text[at..];
            let end = sentence.find(". ").map_or(sentence.len(), |i| i + 1);
            parse_divergence(&sentence[..end])
        })
        .find(|counts| *counts != Counts::UNKNOWN)
        .unwrap_or(Counts::UNKNOWN)
}

/// Reads `N commits ahead[, M commits behind]`. No "ahead" phrase means the
/// fork is not ahead and both counts stay [`Counts::UNKNOWN`].
pub fn parse_divergence(text: &str) -> Counts {
    let Some(caps) = DIVERGENCE.captures(text) else {
        return Counts::UNKNOWN;
    };
    let ahead = caps.get(1).and_then(|m| parse_count(m.as_str()));
    let behind = match caps.get(2) {
        Some(m) => parse_count(m.as_str()),
        None => Some(0),
    };
    match (ahead, behind) {
        (Some(ahead), Some(behind)) => Counts::new(ahead, behind),
        _ => Counts::UNKNOWN,
    }
}

fn parse_count(digits: &str) -> Option<i64> {
    digits.replace(',', "").parse().ok()
}
