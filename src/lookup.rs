//! Remote candidate lookups for filters whose options are not embedded in the
//! page (the user directory and the CRM campaign list).

use crate::{FilterOption, LookupError};
use serde::Deserialize;
use url::Url;

pub const AUTHORS_ENDPOINT: &str = "/v1/get-users/";
pub const CAMPAIGNS_ENDPOINT: &str = "/manager/salesforce_campaigns/";
pub const AUTHORS_DEBOUNCE_MS: u32 = 300;
pub const CAMPAIGNS_DEBOUNCE_MS: u32 = 700;
pub const MAX_RESULTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Authors,
    Campaigns,
}

/// A user directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorRecord {
    pub first_name: String,
    pub surname: String,
    pub email: String,
}

impl From<AuthorRecord> for FilterOption {
    fn from(author: AuthorRecord) -> Self {
        FilterOption::new(
            author.email.clone(),
            format!("{} {}", author.first_name, author.surname),
        )
        .with_attr("email", author.email)
        .with_attr("firstname", author.first_name)
        .with_attr("lastname", author.surname)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CampaignRecord {
    pub id: String,
    pub name: String,
}

impl From<CampaignRecord> for FilterOption {
    fn from(campaign: CampaignRecord) -> Self {
        FilterOption::new(campaign.id, campaign.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupConfig {
    pub kind: LookupKind,
    pub endpoint: String,
    pub debounce_ms: u32,
    pub max_results: usize,
}

impl LookupConfig {
    pub fn authors() -> Self {
        Self {
            kind: LookupKind::Authors,
            endpoint: AUTHORS_ENDPOINT.to_string(),
            debounce_ms: AUTHORS_DEBOUNCE_MS,
            max_results: MAX_RESULTS,
        }
    }

    pub fn campaigns() -> Self {
        Self {
            kind: LookupKind::Campaigns,
            endpoint: CAMPAIGNS_ENDPOINT.to_string(),
            debounce_ms: CAMPAIGNS_DEBOUNCE_MS,
            max_results: MAX_RESULTS,
        }
    }

    pub fn with_debounce(mut self, debounce_ms: u32) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    /// Resolve the endpoint against `page` and append `fragment` as one
    /// percent-encoded path segment.
    pub fn request_url(&self, page: &Url, fragment: &str) -> Result<Url, LookupError> {
        let mut url = page.join(&self.endpoint)?;
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| LookupError::CannotBeABase(self.endpoint.clone()))?
            .pop_if_empty()
            .push(fragment.trim());
        Ok(url)
    }

    /// Decode a JSON response body into options.
    pub fn decode(&self, body: &str) -> Result<Vec<FilterOption>, LookupError> {
        let decode_err = |e: serde_json::Error| LookupError::Decode(e.to_string());
        Ok(match self.kind {
            LookupKind::Authors => serde_json::from_str::<Vec<AuthorRecord>>(body)
                .map_err(decode_err)?
                .into_iter()
                .map(FilterOption::from)
                .collect(),
            LookupKind::Campaigns => serde_json::from_str::<Vec<CampaignRecord>>(body)
                .map_err(decode_err)?
                .into_iter()
                .map(FilterOption::from)
                .collect(),
        })
    }
}

/// Sequence number of an issued lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Hands out monotonically increasing tickets; only the newest is current.
/// Responses carrying an older ticket arrived out of order and are dropped.
#[derive(Debug, Default)]
pub struct LookupSequencer {
    latest: u64,
}

impl LookupSequencer {
    pub fn issue(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    /// Invalidate every outstanding ticket without issuing a new request.
    pub fn cancel(&mut self) {
        self.latest += 1;
    }

    /// A keystroke changed the query: whatever is in flight answers a query
    /// that no longer exists. Returns whether `query` should be looked up.
    pub fn input(&mut self, query: &str) -> bool {
        self.cancel();
        !query.trim().is_empty()
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }
}
