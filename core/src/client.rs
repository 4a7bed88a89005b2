//! Request execution engine shared by concrete API clients.
//!
//! # Design
//! Every entry point is split into a pure `build_*` method producing an
//! `HttpRequest` and `execute`, which runs it either once or inside the
//! bounded retry loop. A single attempt:
//!
//! 1. derives a `Connection` from the config and lets the hooks tune it,
//! 2. attaches the cookie jar as one `Cookie` header and lets the hooks tune
//!    the request,
//! 3. dumps the request to the debug sink unless suppressed,
//! 4. sends it through the `Transport` and classifies the response,
//! 5. on success merges `Set-Cookie` entries into the jar.
//!
//! Only timeouts are retried. The client takes `&mut self` for every call
//! because the cookie jar is updated in place; share it across threads only
//! behind a lock.

use std::fmt;
use std::io::{self, Write};

use tracing::{debug, warn};
use url::Url;

use crate::config::{CallOptions, ClientConfig};
use crate::cookies::CookieJar;
use crate::error::ApiError;
use crate::hooks::{ApiHooks, NoHooks, Params};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::retry::RetryState;
use crate::transport::{Connection, Transport, UreqTransport};
use crate::wire;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Blocking HTTP API client with cookie replay and retry on timeout.
pub struct ApiClient<H = NoHooks, T = UreqTransport> {
    config: ClientConfig,
    hooks: H,
    transport: T,
    cookies: CookieJar,
    debug_sink: Box<dyn Write + Send>,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_hooks(config, NoHooks)
    }
}

impl<H: ApiHooks> ApiClient<H> {
    pub fn with_hooks(config: ClientConfig, hooks: H) -> Self {
        Self::with_transport(config, hooks, UreqTransport)
    }
}

impl<H: ApiHooks, T: Transport> ApiClient<H, T> {
    pub fn with_transport(config: ClientConfig, hooks: H, transport: T) -> Self {
        Self {
            config,
            hooks,
            transport,
            cookies: CookieJar::new(),
            debug_sink: Box::new(io::stdout()),
        }
    }

    /// Redirect the wire dump (stdout by default).
    pub fn with_debug_sink(mut self, sink: impl Write + Send + 'static) -> Self {
        self.debug_sink = Box::new(sink);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ClientConfig {
        &mut self.config
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    pub fn cookies_mut(&mut self) -> &mut CookieJar {
        &mut self.cookies
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    // -----------------------------------------------------------------------
    // Request builders
    // -----------------------------------------------------------------------

    pub fn build_get(&self, path: &str, mut params: Params) -> Result<HttpRequest, ApiError> {
        self.hooks.inject_default_params(&mut params);
        let mut url = self.url_for(path)?;
        if !params.is_empty() {
            url.push('?');
            url.push_str(&encode_params(&params));
        }
        Ok(HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: Vec::new(),
            body: None,
        })
    }

    pub fn build_post(&self, path: &str, mut params: Params) -> Result<HttpRequest, ApiError> {
        self.hooks.inject_default_params(&mut params);
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.url_for(path)?,
            headers: vec![("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string())],
            body: Some(encode_params(&params)),
        })
    }

    pub fn build_post_with_body(&self, path: &str, payload: &str) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.url_for(path)?,
            headers: Vec::new(),
            body: Some(payload.to_string()),
        })
    }

    pub fn build_put(&self, path: &str, payload: &str) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Put,
            url: self.url_for(path)?,
            headers: Vec::new(),
            body: Some(payload.to_string()),
        })
    }

    pub fn build_delete(&self, path: &str) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Delete,
            url: self.url_for(path)?,
            headers: Vec::new(),
            body: None,
        })
    }

    fn url_for(&self, path: &str) -> Result<String, ApiError> {
        let raw = format!("{}/{}", self.config.base_url(), path.trim_start_matches('/'));
        Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))?;
        Ok(raw)
    }

    // -----------------------------------------------------------------------
    // Entry points
    // -----------------------------------------------------------------------

    /// GET `path` with `params` URL-encoded into the query string.
    pub fn get(
        &mut self,
        path: &str,
        params: Params,
        opts: CallOptions,
    ) -> Result<HttpResponse, ApiError> {
        let request = self.build_get(path, params)?;
        self.execute(&request, opts)
    }

    /// POST `params` as a form-encoded body.
    pub fn post(
        &mut self,
        path: &str,
        params: Params,
        opts: CallOptions,
    ) -> Result<HttpResponse, ApiError> {
        let request = self.build_post(path, params)?;
        self.execute(&request, opts)
    }

    /// POST `payload` verbatim.
    pub fn post_with_body(
        &mut self,
        path: &str,
        payload: &str,
        opts: CallOptions,
    ) -> Result<HttpResponse, ApiError> {
        let request = self.build_post_with_body(path, payload)?;
        self.execute(&request, opts)
    }

    /// PUT `payload` verbatim.
    pub fn put(
        &mut self,
        path: &str,
        payload: &str,
        opts: CallOptions,
    ) -> Result<HttpResponse, ApiError> {
        let request = self.build_put(path, payload)?;
        self.execute(&request, opts)
    }

    pub fn delete(&mut self, path: &str, opts: CallOptions) -> Result<HttpResponse, ApiError> {
        let request = self.build_delete(path)?;
        self.execute(&request, opts)
    }

    /// Run a prebuilt request, retrying on timeout when `opts.with_retry`.
    pub fn execute(
        &mut self,
        request: &HttpRequest,
        opts: CallOptions,
    ) -> Result<HttpResponse, ApiError> {
        if opts.with_retry {
            self.execute_with_retry(request, opts.suppress_log)
        } else {
            self.execute_once(request, opts.suppress_log)
        }
    }

    /// Repeat single attempts while they time out, making at most
    /// `max_retries` attempts in total. The last timeout is returned.
    pub fn execute_with_retry(
        &mut self,
        request: &HttpRequest,
        suppress_log: bool,
    ) -> Result<HttpResponse, ApiError> {
        let mut state = RetryState::new(self.config.max_retries);
        loop {
            state.check_bound()?;
            match self.execute_once(request, suppress_log) {
                Err(ApiError::Timeout(msg)) if state.can_retry() => {
                    warn!(
                        request = %request.describe(),
                        attempt = state.attempt(),
                        "caught timeout making http request, will try again: {msg}"
                    );
                    state.advance();
                }
                result => return result,
            }
        }
    }

    /// One request/response cycle without retry.
    pub fn execute_once(
        &mut self,
        request: &HttpRequest,
        suppress_log: bool,
    ) -> Result<HttpResponse, ApiError> {
        let mut connection = Connection::from_config(&self.config);
        self.hooks.tweak_connection_if_necessary(&mut connection);

        let mut request = request.clone();
        if let Some(cookie) = self.cookies.header_value() {
            request.set_header("Cookie", cookie);
        }
        self.hooks.tweak_request_if_necessary(&mut request);

        if !suppress_log {
            if let Err(e) = wire::write_request(self.debug_sink.as_mut(), &request) {
                debug!(error = %e, "failed to write request to debug sink");
            }
        }

        debug!(url = %request.url, "making http call to {}", request.url);
        let response = self
            .transport
            .send(&connection, &request)
            .map_err(ApiError::from)?;

        if !suppress_log {
            if let Err(e) = wire::write_response(self.debug_sink.as_mut(), &response) {
                debug!(error = %e, "failed to write response to debug sink");
            }
        }

        check_status(&response)?;
        self.hooks.check_for_special_response_errors(&response)?;
        debug!(url = %request.url, status = response.status, "finished http call to {}", request.url);

        self.cookies.store_from(&response);
        Ok(response)
    }
}

impl<H: fmt::Debug, T: fmt::Debug> fmt::Debug for ApiClient<H, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("hooks", &self.hooks)
            .field("transport", &self.transport)
            .field("cookies", &self.cookies)
            .finish_non_exhaustive()
    }
}

/// Map timeout and non-2xx statuses to the matching `ApiError`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_timeout() {
        return Err(ApiError::Timeout(format!("server answered {}", response.status)));
    }
    if !response.is_success() {
        return Err(ApiError::Http {
            status: response.status,
            body: response.body.clone(),
        });
    }
    Ok(())
}

fn encode_params(params: &Params) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter())
        .finish()
}
