//! arXiv export API client
//!
//! Async reqwest behind a sync interface: the pipeline is a sequential
//! batch job, so the client owns a current-thread runtime and blocks on
//! each request.

use std::time::Duration;

use anyhow::Context;

use crate::parser::{parse_feed, Feed};

pub const DEFAULT_BASE_URL: &str = "https://export.arxiv.org/api/query";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const USER_AGENT: &str = concat!("paperloom/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy)]
pub enum SortBy {
    SubmittedDate,
    LastUpdatedDate,
    Relevance,
}

impl SortBy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SubmittedDate => "submittedDate",
            Self::LastUpdatedDate => "lastUpdatedDate",
            Self::Relevance => "relevance",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        }
    }
}

/// One page request against the upstream query interface.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub search_query: String,
    pub start: usize,
    pub max_results: usize,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

/// Error from fetching or decoding one page.
#[derive(Debug)]
pub enum ApiError {
    Http {
        status: Option<u16>,
        message: String,
    },
    Parse(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http {
                status: Some(s),
                message,
            } => write!(f, "HTTP {s}: {message}"),
            Self::Http {
                status: None,
                message,
            } => write!(f, "HTTP error: {message}"),
            Self::Parse(message) => write!(f, "feed parse error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        Self::Http {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

/// The upstream query interface the fetcher depends on. Production uses
/// [`ArxivClient`]; tests substitute in-memory fakes.
pub trait QuerySource {
    fn query(&self, req: &QueryRequest) -> Result<Feed, ApiError>;
}

pub struct ArxivClient {
    base_url: String,
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

impl ArxivClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build HTTP client")?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to build tokio runtime")?;
        Ok(Self {
            base_url: base_url.to_string(),
            client,
            runtime,
        })
    }
}

impl QuerySource for ArxivClient {
    fn query(&self, req: &QueryRequest) -> Result<Feed, ApiError> {
        let params = [
            ("search_query", req.search_query.clone()),
            ("start", req.start.to_string()),
            ("max_results", req.max_results.to_string()),
            ("sortBy", req.sort_by.as_str().to_string()),
            ("sortOrder", req.sort_order.as_str().to_string()),
        ];
        let result: Result<String, reqwest::Error> = self.runtime.block_on(async {
            let resp = self
                .client
                .get(&self.base_url)
                .query(&params)
                .send()
                .await?
                .error_for_status()?;
            resp.text().await
        });
        let body = result.map_err(|e| ApiError::from_reqwest(&e))?;
        parse_feed(&body).map_err(|e| ApiError::Parse(format!("{e:#}")))
    }
}
