use axum::response::Response;

use authkit_session::CoordinationError;

use super::config::AUTHKIT_REDIRECT_ANON;
use super::redirect::found;

/// Helper trait for turning flow failures into responses
///
/// Browsers never see error details: every failed flow ends at the login page.
pub(super) trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, Response>;
}

impl<T> IntoResponseError<T> for Result<T, CoordinationError> {
    fn into_response_error(self) -> Result<T, Response> {
        self.map_err(|e| {
            tracing::debug!("Flow failed, redirecting to login: {}", e);
            found(AUTHKIT_REDIRECT_ANON.as_str())
        })
    }
}
