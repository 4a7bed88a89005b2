//! Network transport executing one `HttpRequest`.
//!
//! # Design
//! The client never touches sockets directly. It describes the connection
//! for one attempt as a `Connection`, lets the hooks adjust it, and hands it
//! together with the request to a `Transport`. `UreqTransport` is the
//! blocking implementation; tests substitute scripted transports.
//!
//! A fresh ureq agent is created for every attempt, so connections are never
//! pooled across attempts or calls.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use ureq::tls::{PemItem, RootCerts, TlsConfig};
use ureq::Agent;

use crate::config::ClientConfig;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Largest response body read into memory.
pub const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

/// Transport settings for a single attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub use_ssl: bool,
    pub trust_store: PathBuf,
    pub read_timeout: Duration,
    pub open_timeout: Duration,
}

impl Connection {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            scheme: config.scheme().to_string(),
            host: config.host.clone(),
            port: config.port,
            use_ssl: config.use_ssl,
            trust_store: config.trust_store.clone(),
            read_timeout: config.timeout(),
            open_timeout: config.timeout(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connecting or reading exceeded its timeout.
    #[error("{0}")]
    Timeout(String),

    /// The trust store could not be loaded or the peer failed verification.
    #[error("tls: {0}")]
    Tls(String),

    #[error("{0}")]
    Failed(String),
}

/// Executes one request over one connection.
pub trait Transport {
    fn send(
        &self,
        connection: &Connection,
        request: &HttpRequest,
    ) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(
        &self,
        connection: &Connection,
        request: &HttpRequest,
    ) -> Result<HttpResponse, TransportError> {
        (**self).send(connection, request)
    }
}

/// Blocking transport backed by ureq.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl Transport for UreqTransport {
    fn send(
        &self,
        connection: &Connection,
        request: &HttpRequest,
    ) -> Result<HttpResponse, TransportError> {
        let agent = agent_for(connection)?;

        let result = match request.method {
            HttpMethod::Get => with_headers(agent.get(&request.url), request).call(),
            HttpMethod::Delete => with_headers(agent.delete(&request.url), request).call(),
            HttpMethod::Post => {
                let body = request.body.as_deref().unwrap_or_default();
                with_headers(agent.post(&request.url), request).send(body.as_bytes())
            }
            HttpMethod::Put => {
                let body = request.body.as_deref().unwrap_or_default();
                with_headers(agent.put(&request.url), request).send(body.as_bytes())
            }
        };
        let mut response = result.map_err(classify)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_BYTES)
            .read_to_vec()
            .map_err(classify)?;
        let body = String::from_utf8_lossy(&body).into_owned();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Status codes, redirects included, are returned as data so the client
/// does the classification.
fn agent_for(connection: &Connection) -> Result<Agent, TransportError> {
    let mut builder = Agent::config_builder()
        .http_status_as_error(false)
        .max_redirects(0)
        .timeout_connect(Some(connection.open_timeout))
        .timeout_recv_response(Some(connection.read_timeout))
        .timeout_recv_body(Some(connection.read_timeout));

    if connection.use_ssl {
        let roots = load_trust_store(&connection.trust_store)?;
        builder = builder.tls_config(TlsConfig::builder().root_certs(roots).build());
    }

    Ok(builder.build().new_agent())
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    request: &HttpRequest,
) -> ureq::RequestBuilder<B> {
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn load_trust_store(path: &std::path::Path) -> Result<RootCerts, TransportError> {
    let pem = fs::read(path)
        .map_err(|e| TransportError::Tls(format!("reading {}: {e}", path.display())))?;

    let mut certs = Vec::new();
    for item in ureq::tls::parse_pem(&pem) {
        match item {
            Ok(PemItem::Certificate(cert)) => certs.push(cert),
            Ok(_) => {}
            Err(e) => {
                return Err(TransportError::Tls(format!(
                    "parsing {}: {e}",
                    path.display()
                )))
            }
        }
    }
    if certs.is_empty() {
        return Err(TransportError::Tls(format!(
            "no certificates in {}",
            path.display()
        )));
    }
    Ok(RootCerts::Specific(Arc::new(certs)))
}

fn classify(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::Timeout(_) => TransportError::Timeout(err.to_string()),
        ureq::Error::Io(ref e) if is_timeout_kind(e.kind()) => {
            TransportError::Timeout(err.to_string())
        }
        other => TransportError::Failed(other.to_string()),
    }
}

fn is_timeout_kind(kind: io::ErrorKind) -> bool {
    matches!(kind, io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
}
