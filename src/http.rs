//! Shared HTTP client construction for metadata and archive requests.
//!
//! Both stages talk to the same provider, so they share the User-Agent,
//! compression and proxy policy and differ only in timeouts. Metadata
//! requests are small and get a deadline on the whole request; archive
//! transfers can run for many minutes and only fail when the connection
//! stalls.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use reqwest::{Client, ClientBuilder, Proxy};
use tracing::warn;

use crate::user_agent;

/// Reason a client could not be built.
#[derive(Debug)]
pub(crate) enum BuildClientFailure {
    /// The builder panicked while reading system proxy settings.
    Panic,
    /// The builder rejected the configuration.
    Build(reqwest::Error),
}

impl std::fmt::Display for BuildClientFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Panic => f.write_str("HTTP client construction panicked"),
            Self::Build(error) => write!(f, "HTTP client construction failed: {error}"),
        }
    }
}

/// How the read timeout of a client is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReadTimeout {
    /// Caps the whole request, body included.
    WholeRequest(u64),
    /// Caps the gap between two successful reads; a slow but steady body never trips it.
    BetweenReads(u64),
}

/// Builds a client with the given timeouts.
///
/// Some sandboxed hosts panic when the system proxy configuration is probed;
/// in that case the build is retried with only the `*_PROXY` environment
/// variables applied.
pub(crate) fn build_http_client(
    connect_timeout_secs: u64,
    read_timeout: ReadTimeout,
) -> Result<Client, BuildClientFailure> {
    match try_build_client(connect_timeout_secs, read_timeout, false) {
        Err(BuildClientFailure::Panic) => {
            warn!(
                "HTTP client builder panicked while loading system proxy settings; retrying with env-proxy fallback"
            );
            try_build_client(connect_timeout_secs, read_timeout, true)
        }
        other => other,
    }
}

fn try_build_client(
    connect_timeout_secs: u64,
    read_timeout: ReadTimeout,
    disable_system_proxy_lookup: bool,
) -> Result<Client, BuildClientFailure> {
    catch_unwind(AssertUnwindSafe(move || {
        let mut builder = base_builder(connect_timeout_secs, read_timeout);
        if disable_system_proxy_lookup {
            builder = apply_env_proxy_fallback(builder.no_proxy());
        }
        builder.build().map_err(BuildClientFailure::Build)
    }))
    .map_err(|_| BuildClientFailure::Panic)?
}

fn base_builder(connect_timeout_secs: u64, read_timeout: ReadTimeout) -> ClientBuilder {
    let builder = Client::builder()
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .gzip(true)
        .user_agent(user_agent::default_user_agent());
    match read_timeout {
        ReadTimeout::WholeRequest(secs) => builder.timeout(Duration::from_secs(secs)),
        ReadTimeout::BetweenReads(secs) => builder.read_timeout(Duration::from_secs(secs)),
    }
}

fn apply_env_proxy_fallback(mut builder: ClientBuilder) -> ClientBuilder {
    if let Some(proxy) = env_proxy_for_scheme("https")
        && let Ok(resolved) = Proxy::https(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    if let Some(proxy) = env_proxy_for_scheme("http")
        && let Ok(resolved) = Proxy::http(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    builder
}

fn env_proxy_for_scheme(scheme: &str) -> Option<String> {
    match scheme {
        "https" => {
            find_first_proxy_var(&["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"])
        }
        "http" => find_first_proxy_var(&["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"]),
        _ => None,
    }
}

fn find_first_proxy_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}
