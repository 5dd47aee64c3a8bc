//! Base URL handling

use url::Url;

use crate::error::{ClientError, Result};

/// Normalize a platform host into an `https` base URL ending in `/`.
///
/// Accepts a bare host (`platform.example.com`) or a full URL with any
/// scheme; the scheme is always replaced by `https`.
pub fn normalize_host(host: &str) -> Result<Url> {
    let host = host.trim();
    if host.is_empty() {
        return Err(ClientError::invalid_host(host, "host is empty"));
    }

    let candidate = if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{host}")
    };
    let mut url = Url::parse(&candidate).map_err(|e| ClientError::invalid_host(host, e))?;
    if url.scheme() != "https" && url.set_scheme("https").is_err() {
        return Err(ClientError::invalid_host(
            host,
            format!("cannot use scheme '{}'", url.scheme()),
        ));
    }

    with_trailing_slash(&mut url);
    Ok(url)
}

/// Base URL for the local API proxy.
///
/// The proxy address keeps its scheme (`http` when none is given); only a
/// trailing slash is added.
pub fn proxy_base(proxy: &str) -> Result<Url> {
    let proxy = proxy.trim();
    let candidate = if proxy.contains("://") {
        proxy.to_string()
    } else {
        format!("http://{proxy}")
    };
    let mut url = Url::parse(&candidate).map_err(|e| ClientError::invalid_host(proxy, e))?;
    with_trailing_slash(&mut url);
    Ok(url)
}

fn with_trailing_slash(url: &mut Url) {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
}
