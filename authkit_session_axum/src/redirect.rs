use axum::response::{IntoResponse, Response};
use http::header::{HeaderMap, HeaderValue, LOCATION};
use http::StatusCode;

/// `302 Found` to `location`
///
/// `axum::response::Redirect` only offers 303, 307 and 308.
pub(crate) fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(LOCATION, value)]).into_response(),
        Err(_) => {
            tracing::error!("Invalid redirect location: {}", location);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// `302 Found` to `location`, carrying extra headers such as `Set-Cookie`
pub(crate) fn found_with_headers(headers: HeaderMap, location: &str) -> Response {
    let mut response = found(location);
    for (name, value) in headers.iter() {
        response.headers_mut().append(name, value.clone());
    }
    response
}
