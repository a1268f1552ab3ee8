//! HTTP backend.
//!
//! Bucket and database registrations go to the credentials service, views
//! and packages to the executor. Every call is a JSON `POST` under the
//! `/1/public` prefix and blocks until the response arrives or the global
//! timeout elapses.

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::types::{BucketRegistration, RdbmsConnection, RdbmsKind};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

const API_PREFIX: &str = "/1/public";

const BUCKETS_LIST: &str = "/storage/buckets/list";
const BUCKETS_REGISTER: &str = "/storage/buckets/register";
const RDBMS_LIST: &str = "/rdbms/list";
const VIEWS_LIST: &str = "/views/list";
const VIEWS_CREATE: &str = "/views/create";
const PACKAGES_LIST: &str = "/packages/list";
const PACKAGES_CREATE: &str = "/packages/create";
const PACKAGES_DELETE: &str = "/packages/delete";

/// Connection settings for [`HttpBackend`].
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Base URL of the query executor
    pub executor_url: String,
    /// Base URL of the credentials service
    pub creds_url: String,
    /// Bearer token sent with every request
    pub access_token: Option<String>,
    /// Global per-request timeout
    pub timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            executor_url: "http://localhost:54321".to_string(),
            creds_url: "http://localhost:54322".to_string(),
            access_token: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Blocking HTTP implementation of [`Backend`].
pub struct HttpBackend {
    agent: ureq::Agent,
    executor_url: String,
    creds_url: String,
    access_token: Option<String>,
}

#[derive(Serialize)]
struct NameRequest<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct ScriptRequest<'a> {
    name: &'a str,
    script: &'a str,
}

#[derive(Serialize)]
struct RdbmsRequest<'a> {
    name: &'a str,
    #[serde(flatten)]
    conn: &'a RdbmsConnection,
}

#[derive(Serialize)]
struct Empty {}

impl HttpBackend {
    /// Create a backend from connection settings.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        if config.timeout.is_zero() {
            return Err(Error::Config("timeout must be greater than zero".into()));
        }
        let executor_url = normalize_base(&config.executor_url, "executor_url")?;
        let creds_url = normalize_base(&config.creds_url, "creds_url")?;

        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Ok(Self {
            agent,
            executor_url,
            creds_url,
            access_token: config.access_token.clone(),
        })
    }

    /// Base URL of the executor, without trailing slash.
    pub fn executor_url(&self) -> &str {
        &self.executor_url
    }

    /// Base URL of the credentials service, without trailing slash.
    pub fn creds_url(&self) -> &str {
        &self.creds_url
    }

    fn url(base: &str, path: &str) -> String {
        format!("{base}{API_PREFIX}{path}")
    }

    fn rdbms_register_path(kind: RdbmsKind) -> String {
        format!("/rdbms/register/{}", kind.as_str())
    }

    fn send<B: Serialize>(
        &self,
        base: &str,
        path: &str,
        body: &B,
    ) -> Result<ureq::http::Response<ureq::Body>> {
        let url = Self::url(base, path);
        let mut request = self.agent.post(&url);
        if let Some(token) = &self.access_token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let mut response = request
            .send_json(body)
            .map_err(|e| Error::network(path, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .body_mut()
                .read_to_string()
                .unwrap_or_default()
                .trim()
                .to_string();
            return Err(Error::status(path, status.as_u16(), message));
        }

        Ok(response)
    }

    fn call<B: Serialize>(&self, base: &str, path: &str, body: &B) -> Result<()> {
        self.send(base, path, body).map(|_| ())
    }

    fn fetch<T: DeserializeOwned>(&self, base: &str, path: &str) -> Result<T> {
        let mut response = self.send(base, path, &Empty {})?;
        response
            .body_mut()
            .read_json()
            .map_err(|e| Error::InvalidResponse {
                endpoint: path.to_string(),
                message: e.to_string(),
            })
    }

    fn register_rdbms(&self, kind: RdbmsKind, name: &str, conn: &RdbmsConnection) -> Result<()> {
        self.call(
            &self.creds_url,
            &Self::rdbms_register_path(kind),
            &RdbmsRequest { name, conn },
        )
    }
}

impl Backend for HttpBackend {
    fn list_buckets(&self) -> Result<Vec<String>> {
        self.fetch(&self.creds_url, BUCKETS_LIST)
    }

    fn list_rdbms(&self) -> Result<Vec<String>> {
        self.fetch(&self.creds_url, RDBMS_LIST)
    }

    fn list_views(&self) -> Result<Vec<String>> {
        self.fetch(&self.executor_url, VIEWS_LIST)
    }

    fn list_packages(&self) -> Result<Vec<String>> {
        self.fetch(&self.executor_url, PACKAGES_LIST)
    }

    fn register_bucket(&self, bucket: &BucketRegistration) -> Result<()> {
        self.call(&self.creds_url, BUCKETS_REGISTER, bucket)
    }

    fn register_postgresql(&self, name: &str, conn: &RdbmsConnection) -> Result<()> {
        self.register_rdbms(RdbmsKind::Postgresql, name, conn)
    }

    fn register_sqlserver(&self, name: &str, conn: &RdbmsConnection) -> Result<()> {
        self.register_rdbms(RdbmsKind::Sqlserver, name, conn)
    }

    fn register_oracle(&self, name: &str, conn: &RdbmsConnection) -> Result<()> {
        self.register_rdbms(RdbmsKind::Oracle, name, conn)
    }

    fn register_mysql(&self, name: &str, conn: &RdbmsConnection) -> Result<()> {
        self.register_rdbms(RdbmsKind::Mysql, name, conn)
    }

    fn create_view(&self, name: &str, script: &str) -> Result<()> {
        self.call(&self.executor_url, VIEWS_CREATE, &ScriptRequest { name, script })
    }

    fn create_package(&self, name: &str, script: &str) -> Result<()> {
        self.call(&self.executor_url, PACKAGES_CREATE, &ScriptRequest { name, script })
    }

    fn delete_package(&self, name: &str) -> Result<()> {
        self.call(&self.executor_url, PACKAGES_DELETE, &NameRequest { name })
    }
}

/// Trim a base URL and reject anything that is not http(s).
fn normalize_base(url: &str, field: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::Config(format!("{field} is empty")));
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(Error::Config(format!(
            "{field} must start with http:// or https://, got '{trimmed}'"
        )));
    }
    Ok(trimmed.to_string())
}
