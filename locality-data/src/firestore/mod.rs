//! Firestore document store reached through the REST `documents:commit` API.
//!
//! [`FirestoreDocumentStore`] implements the synchronous [`BatchWriter`] seam by
//! blocking on one HTTP request per batch. Every write creates a new document
//! with a client-generated id and a server-assigned `createdAt`.
//!
//! # Runtime behaviour
//!
//! Outside any Tokio runtime the store drives requests on its own
//! `current_thread` runtime. Inside a multi-threaded runtime it reuses that
//! runtime through [`tokio::task::block_in_place`]. Inside a `current_thread`
//! runtime it falls back to its own runtime.
//!
//! # Example
//!
//! ```no_run
//! use locality_data::{FirestoreConfig, FirestoreDocumentStore};
//! use locality_core::BatchWriter;
//!
//! let config = FirestoreConfig::new("my-project").with_bearer_token("ya29.token");
//! let mut store = FirestoreDocumentStore::with_config(config)?;
//! store.commit_batch(&[])?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod document;

use std::time::Duration;

use locality_core::{BatchWriter, CommitError, LocationRecord, MAX_BATCH_OPERATIONS};
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

use document::{CommitRequest, CommitResponse, ErrorEnvelope, create_write};

/// Public Firestore REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Database id used when none is configured.
pub const DEFAULT_DATABASE: &str = "(default)";

/// Collection receiving location documents by default.
pub const DEFAULT_COLLECTION: &str = "locations";

/// Default user agent for commit requests.
pub const DEFAULT_USER_AGENT: &str = "locality-seed/0.1";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors raised while constructing a [`FirestoreDocumentStore`].
#[derive(Debug, Error)]
pub enum FirestoreBuildError {
    /// The base URL is not an absolute URL.
    #[error("invalid Firestore base URL {url}: {source}")]
    InvalidBaseUrl {
        /// Configured base URL.
        url: String,
        /// Parse failure.
        #[source]
        source: url::ParseError,
    },
    /// The project id is empty.
    #[error("Firestore project id must not be empty")]
    MissingProject,
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Configuration for [`FirestoreDocumentStore`].
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    /// REST endpoint root, e.g. `"https://firestore.googleapis.com/v1"`.
    pub base_url: String,
    /// Google Cloud project id.
    pub project_id: String,
    /// Database id within the project.
    pub database_id: String,
    /// Target collection id.
    pub collection: String,
    /// OAuth bearer token sent with every request, if any.
    pub bearer_token: Option<String>,
    /// Per-request timeout; applies to connect and the whole request.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl FirestoreConfig {
    /// Configuration for `project_id` with every other setting defaulted.
    #[must_use]
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            project_id: project_id.into(),
            database_id: DEFAULT_DATABASE.to_owned(),
            collection: DEFAULT_COLLECTION.to_owned(),
            bearer_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    /// Point requests at another endpoint, such as the Firestore emulator.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the database id.
    #[must_use]
    pub fn with_database(mut self, database_id: impl Into<String>) -> Self {
        self.database_id = database_id.into();
        self
    }

    /// Set the collection id.
    #[must_use]
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Send `token` as an `Authorization: Bearer` header.
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Resource path of the database's document root.
    fn documents_path(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.project_id, self.database_id
        )
    }
}

/// Document store committing batches through Firestore's REST API.
pub struct FirestoreDocumentStore {
    client: Client,
    config: FirestoreConfig,
    commit_url: Url,
    collection_path: String,
    runtime: Runtime,
}

impl std::fmt::Debug for FirestoreDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreDocumentStore")
            .field("commit_url", &self.commit_url.as_str())
            .field("collection_path", &self.collection_path)
            .field("timeout", &self.config.timeout)
            .field("authenticated", &self.config.bearer_token.is_some())
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl FirestoreDocumentStore {
    /// Create a store for `project_id` with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(project_id: impl Into<String>) -> Result<Self, FirestoreBuildError> {
        Self::with_config(FirestoreConfig::new(project_id))
    }

    /// Create a store with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the project id is empty, the base URL does not
    /// parse, or the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: FirestoreConfig) -> Result<Self, FirestoreBuildError> {
        if config.project_id.trim().is_empty() {
            return Err(FirestoreBuildError::MissingProject);
        }
        let documents_path = config.documents_path();
        let commit_url = Url::parse(&format!(
            "{}/{documents_path}:commit",
            config.base_url.trim_end_matches('/')
        ))
        .map_err(|source| FirestoreBuildError::InvalidBaseUrl {
            url: config.base_url.clone(),
            source,
        })?;
        let collection_path = format!("{documents_path}/{}", config.collection);

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(FirestoreBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(FirestoreBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            commit_url,
            collection_path,
            runtime,
        })
    }

    /// URL receiving `documents:commit` requests.
    #[must_use]
    pub const fn commit_url(&self) -> &Url {
        &self.commit_url
    }

    async fn commit_async(&self, batch: &[LocationRecord]) -> Result<(), CommitError> {
        let body = {
            let mut rng = rand::thread_rng();
            CommitRequest {
                writes: batch
                    .iter()
                    .map(|record| create_write(&self.collection_path, record, &mut rng))
                    .collect(),
            }
        };

        let mut request = self.client.post(self.commit_url.clone()).json(&body);
        if let Some(token) = &self.config.bearer_token {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(convert_status(status, &text));
        }

        // Writes are durable once the status is 2xx.
        match response.text().await {
            Ok(text) => check_write_results(&text, batch.len()),
            Err(err) => warn!(
                "failed to read commit response from {}: {err}",
                self.commit_url
            ),
        }
        Ok(())
    }

    /// Convert a transport error to a `CommitError`.
    fn convert_reqwest_error(&self, error: &reqwest::Error) -> CommitError {
        if error.is_timeout() {
            return CommitError::Timeout {
                timeout_secs: self.config.timeout.as_secs(),
            };
        }
        if let Some(status) = error.status() {
            return convert_status(status, &error.to_string());
        }
        CommitError::Unavailable {
            message: format!("{}: {error}", self.commit_url),
        }
    }
}

/// Warn when an accepted commit does not echo one result per write.
fn check_write_results(body: &str, expected: usize) {
    match serde_json::from_str::<CommitResponse>(body) {
        Ok(parsed) if parsed.write_results.len() == expected => {}
        Ok(parsed) => warn!(
            "commit accepted but returned {} write results for {expected} writes",
            parsed.write_results.len()
        ),
        Err(err) => warn!("commit accepted but the response body is not a commit result: {err}"),
    }
}

/// Client errors are rejections; server errors and throttling mean the store
/// is unavailable.
fn convert_status(status: StatusCode, body: &str) -> CommitError {
    let detail = serde_json::from_str::<ErrorEnvelope>(body).map_or_else(
        |_| body.trim().to_owned(),
        |envelope| {
            if envelope.error.status.is_empty() {
                envelope.error.message
            } else {
                format!("{}: {}", envelope.error.status, envelope.error.message)
            }
        },
    );
    let message = format!("HTTP {}: {detail}", status.as_u16());
    if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
        CommitError::Rejected { message }
    } else {
        CommitError::Unavailable { message }
    }
}

impl BatchWriter for FirestoreDocumentStore {
    fn commit_batch(&mut self, batch: &[LocationRecord]) -> Result<(), CommitError> {
        if batch.len() > MAX_BATCH_OPERATIONS {
            return Err(CommitError::BatchTooLarge {
                size: batch.len(),
                limit: MAX_BATCH_OPERATIONS,
            });
        }
        if batch.is_empty() {
            return Ok(());
        }
        debug!("POST {} with {} writes", self.commit_url, batch.len());

        let future = self.commit_async(batch);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}
