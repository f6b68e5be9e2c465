//! Blocking Mastodon API client.
//!
//! Timeline endpoints cap a single page at 40 statuses, so requests for
//! more than that walk backwards with `max_id` until enough statuses have
//! been collected or the feed runs out.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client as HttpClient;
use reqwest::header::USER_AGENT;
use serde::Deserialize;

pub const DEFAULT_INSTANCE: &str = "https://mastodon.social";

const PAGE_LIMIT: usize = 40;

#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub instance_url: String,
    pub access_token: String,
    pub user_agent: String,
    pub http_client: Option<HttpClient>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub id: String,
    pub username: String,
    pub acct: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub url: String,
}

impl Account {
    /// Display name, falling back to the username when unset.
    pub fn name(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.username
        } else {
            &self.display_name
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    pub id: String,
    pub uri: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub content: String,
    pub account: Account,
}

impl Status {
    /// Web permalink. Some statuses only carry the federation URI.
    pub fn link(&self) -> &str {
        self.url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(&self.uri)
    }

    pub fn plain_text(&self) -> String {
        html_to_text(&self.content)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct List {
    id: String,
    title: String,
}

#[derive(Debug, Clone, Deserialize)]
struct SearchResults {
    #[serde(default)]
    statuses: Vec<Status>,
}

pub struct Client {
    http: HttpClient,
    base_url: String,
    access_token: String,
    user_agent: String,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.instance_url.trim().is_empty() {
            bail!("mastodon: instance url required");
        }
        if config.user_agent.trim().is_empty() {
            bail!("mastodon: client user agent required");
        }

        let http = match config.http_client {
            Some(client) => client,
            None => HttpClient::builder()
                .timeout(Duration::from_secs(20))
                .build()?,
        };

        Ok(Client {
            http,
            base_url: config.instance_url.trim_end_matches('/').to_string(),
            access_token: config.access_token,
            user_agent: config.user_agent,
        })
    }

    pub fn home_timeline(&self, count: usize) -> Result<Vec<Status>> {
        self.paged_statuses("/api/v1/timelines/home", count)
    }

    pub fn account_statuses(&self, acct: &str, count: usize) -> Result<Vec<Status>> {
        let account = self.lookup_account(acct)?;
        self.paged_statuses(&format!("/api/v1/accounts/{}/statuses", account.id), count)
    }

    pub fn list_timeline(&self, title: &str, count: usize) -> Result<Vec<Status>> {
        let list = self.find_list(title)?;
        self.paged_statuses(&format!("/api/v1/timelines/list/{}", list.id), count)
    }

    pub fn list_members(&self, title: &str) -> Result<Vec<Account>> {
        let list = self.find_list(title)?;
        self.get_json(
            &format!("/api/v1/lists/{}/accounts", list.id),
            &[("limit", "0".to_string())],
        )
    }

    pub fn search_statuses(&self, query: &str, count: usize) -> Result<Vec<Status>> {
        let limit = count.clamp(1, PAGE_LIMIT);
        let results: SearchResults = self.get_json(
            "/api/v2/search",
            &[
                ("q", query.to_string()),
                ("type", "statuses".to_string()),
                ("limit", limit.to_string()),
            ],
        )?;
        Ok(results.statuses)
    }

    pub fn post_status(&self, text: &str) -> Result<Status> {
        let url = format!("{}/api/v1/statuses", self.base_url);
        let resp = self
            .authorize(self.http.post(&url))
            .header(USER_AGENT, &self.user_agent)
            .form(&[("status", text)])
            .send()
            .context("mastodon: post status")?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            bail!("mastodon: post status failed ({status}): {body}");
        }
        resp.json().context("mastodon: decode posted status")
    }

    fn lookup_account(&self, acct: &str) -> Result<Account> {
        let acct = acct.trim_start_matches('@');
        self.get_json("/api/v1/accounts/lookup", &[("acct", acct.to_string())])
            .with_context(|| format!("mastodon: look up account {acct}"))
    }

    fn find_list(&self, title: &str) -> Result<List> {
        let lists: Vec<List> = self.get_json("/api/v1/lists", &[])?;
        lists
            .into_iter()
            .find(|list| list.title.eq_ignore_ascii_case(title))
            .with_context(|| format!("mastodon: no list named {title:?}"))
    }

    fn paged_statuses(&self, path: &str, count: usize) -> Result<Vec<Status>> {
        let mut statuses: Vec<Status> = Vec::new();
        let mut max_id: Option<String> = None;

        while statuses.len() < count {
            let limit = (count - statuses.len()).min(PAGE_LIMIT);
            let mut query: Vec<(&str, String)> = vec![("limit", limit.to_string())];
            if let Some(id) = &max_id {
                query.push(("max_id", id.clone()));
            }
            let page: Vec<Status> = self.get_json(path, &query)?;
            let Some(last) = page.last() else {
                break;
            };
            max_id = Some(last.id.clone());
            let page_len = page.len();
            statuses.extend(page);
            if page_len < limit {
                break;
            }
        }

        statuses.truncate(count);
        Ok(statuses)
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .authorize(self.http.get(&url))
            .header(USER_AGENT, &self.user_agent)
            .query(query)
            .send()
            .with_context(|| format!("mastodon: request {path}"))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            bail!("mastodon: request {path} failed ({status}): {body}");
        }
        resp.json()
            .with_context(|| format!("mastodon: decode {path}"))
    }

    fn authorize(
        &self,
        builder: reqwest::blocking::RequestBuilder,
    ) -> reqwest::blocking::RequestBuilder {
        if self.access_token.is_empty() {
            builder
        } else {
            builder.bearer_auth(&self.access_token)
        }
    }
}

/// Flattens status HTML to plain text: `<br>` and closing `</p>` become
/// newlines, every other tag is dropped and character entities are left
/// in place for the line formatter to decode.
pub fn html_to_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find('<') {
        text.push_str(&rest[..start]);
        let Some(end) = rest[start..].find('>') else {
            text.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let tag: String = rest[start + 1..start + end]
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        if matches!(tag.as_str(), "br" | "br/" | "/p") {
            text.push('\n');
        }
        rest = &rest[start + end + 1..];
    }
    text.push_str(rest);
    text.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUS_JSON: &str = r#"{
        "id": "114",
        "uri": "https://example.social/users/amy/statuses/114",
        "url": "https://example.social/@amy/114",
        "content": "<p>Hello &amp; welcome</p><p>second<br />third</p>",
        "account": {
            "id": "7",
            "username": "amy",
            "acct": "amy@example.social",
            "display_name": "Amy",
            "url": "https://example.social/@amy"
        }
    }"#;

    #[test]
    fn status_prefers_the_web_url() {
        let status: Status = serde_json::from_str(STATUS_JSON).unwrap();
        assert_eq!(status.link(), "https://example.social/@amy/114");
    }

    #[test]
    fn status_falls_back_to_the_federation_uri() {
        let mut status: Status = serde_json::from_str(STATUS_JSON).unwrap();
        status.url = None;
        assert_eq!(status.link(), "https://example.social/users/amy/statuses/114");
    }

    #[test]
    fn html_flattens_to_plain_text_with_entities_intact() {
        let status: Status = serde_json::from_str(STATUS_JSON).unwrap();
        assert_eq!(status.plain_text(), "Hello &amp; welcome\nsecond\nthird");
    }

    #[test]
    fn account_name_falls_back_to_username() {
        let mut status: Status = serde_json::from_str(STATUS_JSON).unwrap();
        assert_eq!(status.account.name(), "Amy");
        status.account.display_name = String::new();
        assert_eq!(status.account.name(), "amy");
    }

    #[test]
    fn client_requires_instance_and_user_agent() {
        assert!(Client::new(ClientConfig::default()).is_err());
        assert!(Client::new(ClientConfig {
            instance_url: DEFAULT_INSTANCE.to_string(),
            ..Default::default()
        })
        .is_err());
        assert!(Client::new(ClientConfig {
            instance_url: DEFAULT_INSTANCE.to_string(),
            user_agent: "perch-test/0.1".to_string(),
            ..Default::default()
        })
        .is_ok());
    }
}
