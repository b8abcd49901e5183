use async_trait::async_trait;
use reqwest::{header, Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};
use v3d_core::{GenerateResponse, GenerationRequest};
use crate::config::ServiceConfig;
use crate::error::AppError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error("Cannot reach service: {0}")]
    Unreachable(String),

    #[error("Service did not answer within the timeout")]
    Timeout,

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::Malformed(e.to_string())
        } else {
            Self::Unreachable(e.to_string())
        }
    }
}

/// Remote model generator.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// One generate call. A well-formed `success: false` reply is `Ok`.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerateResponse, ServiceError>;

    /// Origin that relative asset paths in replies are resolved against
    fn origin(&self) -> &Url;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceStats {
    pub cache_hit_rate: String,
    pub cached_avg_response: String,
    pub non_cached_avg_response: String,
}

pub struct HttpGenerationService {
    client: Client,
    origin: Url,
    generate_url: Url,
    health_url: Url,
    stats_url: Url,
}

impl HttpGenerationService {
    pub fn new(conf: &ServiceConfig) -> anyhow::Result<Self> {
        let origin = Url::parse(&conf.service_url)
            .map_err(|_| AppError::InvalidOrigin(conf.service_url.clone()))?;
        let endpoint = |path: &str| {
            origin
                .join(path)
                .map_err(|_| AppError::InvalidOrigin(format!("{}{}", conf.service_url, path)))
        };

        let client = Client::builder()
            .timeout(conf.request_timeout)
            .build()?;

        Ok(Self {
            generate_url: endpoint(&conf.generate_path)?,
            health_url: endpoint(&conf.health_path)?,
            stats_url: endpoint(&conf.stats_path)?,
            client,
            origin,
        })
    }

    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<HealthStatus, ServiceError> {
        let response = self.client.get(self.health_url.clone()).send().await?;
        read_json(response).await
    }

    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<PerformanceStats, ServiceError> {
        let response = self.client.get(self.stats_url.clone()).send().await?;
        read_json(response).await
    }
}

#[async_trait]
impl GenerationService for HttpGenerationService {
    #[instrument(skip(self, request), fields(prompt = request.prompt()))]
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerateResponse, ServiceError> {
        let response = self.client
            .post(self.generate_url.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .header("X-Requested-With", "XMLHttpRequest")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(%status, bytes = body.len(), "generate replied");

        match GenerateResponse::from_json(&body) {
            Ok(reply) if status.is_success() => Ok(reply),
            // The service answers 400/500 with the usual envelope
            Ok(reply) if !reply.success => Ok(reply),
            Ok(_) => Err(status_error(status, body)),
            Err(_) if !status.is_success() => Err(status_error(status, body)),
            Err(e) => Err(ServiceError::Malformed(e.to_string())),
        }
    }

    fn origin(&self) -> &Url {
        &self.origin
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, ServiceError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(status_error(status, body));
    }
    serde_json::from_str(&body).map_err(|e| ServiceError::Malformed(e.to_string()))
}

fn status_error(status: StatusCode, body: String) -> ServiceError {
    const MAX_BODY: usize = 200;
    let body = match body.char_indices().nth(MAX_BODY) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body,
    };
    ServiceError::Status { status: status.as_u16(), body }
}
