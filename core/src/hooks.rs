//! Customization points applied by `ApiClient` around every request.
//!
//! Concrete API clients implement `ApiHooks` and hand it to
//! `ApiClient::with_hooks`. Every method has a no-op default, so an
//! implementation only overrides what its API needs.

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Connection;

/// Ordered query/form parameters.
pub type Params = Vec<(String, String)>;

pub trait ApiHooks {
    /// Add parameters every `get`/`post` call must carry, such as an API
    /// version. Runs before encoding.
    fn inject_default_params(&self, _params: &mut Params) {}

    /// Adjust transport settings just before an attempt is sent.
    fn tweak_connection_if_necessary(&self, _connection: &mut Connection) {}

    /// Adjust the request just before an attempt is sent. The `Cookie`
    /// header is already attached.
    fn tweak_request_if_necessary(&self, _request: &mut HttpRequest) {}

    /// Inspect a 2xx response and fail it when the body encodes an
    /// application-level error. Not called for non-2xx responses.
    fn check_for_special_response_errors(&self, _response: &HttpResponse) -> Result<(), ApiError> {
        Ok(())
    }
}

/// Hooks that change nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl ApiHooks for NoHooks {}
