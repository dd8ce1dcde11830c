//! Backend URL helpers.
//!
//! Base URLs come from settings, the CLI, or the `server` section of the
//! backend config; all of them are normalized before endpoints are appended.

/// Strip trailing slashes from a base URL.
///
/// ```
/// use paia_client::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://localhost:8000/"), "http://localhost:8000");
/// assert_eq!(normalize_base_url("http://localhost:8000///"), "http://localhost:8000");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path with exactly one slash.
///
/// ```
/// use paia_client::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("http://localhost:8000/", "/services"),
///     "http://localhost:8000/services"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}

/// Queries are POSTed to the backend root.
pub fn query_endpoint(base_url: &str) -> String {
    construct_api_url(base_url, "")
}
