//! Return path validation for the post-login redirect
//!
//! The `ret` cookie comes back from the browser, so it is treated as untrusted
//! input before being used as a `Location`.

/// Validate that a return path is a safe same-origin relative path
///
/// Accepted paths:
/// 1. start with `/`
/// 2. are visible ASCII only, so they can be sent as a header value as-is
/// 3. do not begin with `//` or `/\` in the path part, raw or percent-encoded
///
/// The query string and fragment are not inspected.
///
/// # Examples
///
/// ```
/// use edge_auth::url_validation::validate_return_path;
///
/// assert!(validate_return_path("/"));
/// assert!(validate_return_path("/dashboard?tab=2"));
/// assert!(validate_return_path("/search?next=https://docs.example.com/a"));
///
/// assert!(!validate_return_path("https://evil.com"));
/// assert!(!validate_return_path("//evil.com"));
/// assert!(!validate_return_path("/%2F/evil.com"));
/// assert!(!validate_return_path("/\\evil.com"));
/// ```
pub fn validate_return_path(path: &str) -> bool {
    if !path.starts_with('/') || !path.chars().all(|c| c.is_ascii_graphic()) {
        return false;
    }

    let path_part = path.split(['?', '#']).next().unwrap_or(path);
    let decoded: Vec<u8> = percent_encoding::percent_decode_str(path_part)
        .filter(|b| !matches!(b, b'\t' | b'\n' | b'\r'))
        .collect();
    !(decoded.starts_with(b"//") || decoded.starts_with(b"/\\"))
}

/// The return path to redirect to after login: `ret` if safe, else `/`
pub fn return_path_or_root(ret: Option<&str>) -> &str {
    match ret {
        Some(path) if validate_return_path(path) => path,
        _ => "/",
    }
}
