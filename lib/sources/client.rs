use std::time::Duration;

use reqwest::{
    Client, ClientBuilder as HttpClientBuilder, Error,
    header::{HeaderMap, HeaderValue, USER_AGENT},
};

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;

const USER_AGENT_VALUE: &str = concat!(
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("CARGO_PKG_REPOSITORY"),
    ")",
);

/*
    Adds middleware for tracing of HTTP requests.

    Failed requests are never retried, a failure aborts the whole update.
*/
fn add_client_middleware(client: Client) -> ClientWithMiddleware {
    ClientBuilder::new(client)
        .with(TracingMiddleware::default())
        .build()
}

fn base_client_builder(mut default_headers: HeaderMap) -> HttpClientBuilder {
    default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

    Client::builder()
        .default_headers(default_headers)
        .connect_timeout(Duration::from_secs(15))
        .timeout(Duration::from_secs(60))
}

/**
    Creates a client with:

    - HTTPS only
    - Timeouts for connection and response
    - All common compression algorithms enabled
    - User agent set to `<crate_name>/<crate_version> (<repository_url>)`
*/
pub fn create_client(default_headers: HeaderMap) -> Result<ClientWithMiddleware, Error> {
    let client = base_client_builder(default_headers)
        .https_only(true)
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .build()?;

    Ok(add_client_middleware(client))
}

/**
    Creates a client for reading metadata of hosted files.

    Unlike [`create_client`], it accepts plain HTTP URLs and never asks
    for compressed responses. Decoding a compressed response drops its
    `Content-Length` header, which is the size being looked up.
*/
pub fn create_probe_client() -> Result<ClientWithMiddleware, Error> {
    let client = base_client_builder(HeaderMap::new())
        .no_gzip()
        .no_brotli()
        .no_deflate()
        .build()?;

    Ok(add_client_middleware(client))
}
