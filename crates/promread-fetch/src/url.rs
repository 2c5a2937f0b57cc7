//! Remote-read endpoint URL construction.

/// Path of the remote-read endpoint.
pub const REMOTE_READ_PATH: &str = "/api/v1/read";

/// Path of the health endpoint.
pub const HEALTH_PATH: &str = "/health";

/// Normalizes a base address by trimming trailing slashes.
///
/// # Example
///
/// ```
/// use promread_fetch::url::normalize_addr;
///
/// assert_eq!(normalize_addr("http://localhost:9090/"), "http://localhost:9090");
/// ```
#[must_use]
pub fn normalize_addr(addr: &str) -> &str {
    addr.trim_end_matches('/')
}

/// Builds the remote-read URL for a base address.
///
/// # Example
///
/// ```
/// use promread_fetch::url::read_url;
///
/// assert_eq!(read_url("http://localhost:9090"), "http://localhost:9090/api/v1/read");
/// ```
#[must_use]
pub fn read_url(addr: &str) -> String {
    format!("{}{}", normalize_addr(addr), REMOTE_READ_PATH)
}

/// Builds the health-check URL for a base address.
#[must_use]
pub fn health_url(addr: &str) -> String {
    format!("{}{}", normalize_addr(addr), HEALTH_PATH)
}

/// Masks any password embedded in a URL so it can be logged.
#[must_use]
pub fn redacted(url: &str) -> String {
    match reqwest::Url::parse(url) {
        Ok(mut parsed) if parsed.password().is_some() => {
            let _ = parsed.set_password(Some("xxxxx"));
            parsed.to_string()
        }
        _ => url.to_string(),
    }
}
