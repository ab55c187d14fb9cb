use std::time::Duration;

use async_trait::async_trait;
use colored::Colorize;
use tokio::time::Instant;

use super::{ApiRequest, ApiResponse, RemoteError, Transport};

#[derive(Clone, Debug)]
pub struct HttpOptions {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub proxy: Option<String>,
    pub header: Option<String>,
    pub follow_redirects: bool,
    pub verbose: u8,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_seconds: 10,
            proxy: None,
            header: None,
            follow_redirects: true,
            verbose: 0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: reqwest::Url,
    verbose: u8,
}

pub fn parse_header(raw: &str) -> Result<(String, String), RemoteError> {
    let invalid = || RemoteError::InvalidHeader {
        header: raw.to_string(),
    };
    let (key, value) = raw.split_once(':').ok_or_else(invalid)?;
    let key = key.trim();
    if key.is_empty() {
        return Err(invalid());
    }
    Ok((key.to_string(), value.trim().to_string()))
}

impl HttpTransport {
    pub fn new(options: &HttpOptions) -> Result<Self, RemoteError> {
        let mut base_url = reqwest::Url::parse(options.base_url.trim()).map_err(|_| {
            RemoteError::InvalidBaseUrl {
                url: options.base_url.clone(),
            }
        })?;
        // join() replaces the last path segment unless the base ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(concat!(
                "gsu-monitor/",
                env!("CARGO_PKG_VERSION")
            )),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        if let Some(raw) = options.header.as_deref().filter(|h| !h.trim().is_empty()) {
            let (key, value) = parse_header(raw)?;
            let name = reqwest::header::HeaderName::from_bytes(key.as_bytes()).map_err(|_| {
                RemoteError::InvalidHeader {
                    header: raw.to_string(),
                }
            })?;
            let value = reqwest::header::HeaderValue::from_str(&value).map_err(|_| {
                RemoteError::InvalidHeader {
                    header: raw.to_string(),
                }
            })?;
            headers.insert(name, value);
        }

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .redirect(if options.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .timeout(Duration::from_secs(options.timeout_seconds));
        if let Some(proxy) = options.proxy.as_deref().filter(|p| !p.trim().is_empty()) {
            let proxy_cfg =
                reqwest::Proxy::all(proxy).map_err(|source| RemoteError::ProxySetup {
                    proxy: proxy.to_string(),
                    source,
                })?;
            builder = builder.proxy(proxy_cfg);
        }
        let client = builder
            .build()
            .map_err(|source| RemoteError::HttpClientBuild { source })?;

        Ok(Self {
            client,
            base_url,
            verbose: options.verbose,
        })
    }

    fn url_for(&self, path: &str) -> Result<reqwest::Url, RemoteError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|_| RemoteError::InvalidBaseUrl {
                url: format!("{}{}", self.base_url, path),
            })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, RemoteError> {
        let url = self.url_for(&request.path)?;
        let started = Instant::now();
        let mut builder = self.client.request(request.method.clone(), url);
        if let Some(body) = request.body.as_ref() {
            builder = builder.json(body);
        } else if request.method == reqwest::Method::DELETE {
            builder = builder.header(reqwest::header::CONTENT_TYPE, "application/json");
        }

        let response = builder.send().await.map_err(|e| RemoteError::Network {
            path: request.path.clone(),
            message: describe_reqwest_error(&e),
        })?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| RemoteError::Network {
            path: request.path.clone(),
            message: describe_reqwest_error(&e),
        })?;

        if self.verbose > 0 {
            eprintln!(
                "{}{}{} {} {} -> {} ({}ms)",
                "[".bold().white(),
                "DBG".bold().magenta(),
                "]".bold().white(),
                request.method,
                request.path,
                status,
                started.elapsed().as_millis()
            );
        }
        if self.verbose > 1 && !body.is_empty() {
            eprintln!("{}", body.dimmed());
        }

        Ok(ApiResponse { status, body })
    }
}

fn describe_reqwest_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("timeout - request took too long ({e})")
    } else if e.is_connect() {
        format!("connection error - is the panel server running? ({e})")
    } else if e.is_decode() {
        format!("decode error - unexpected response body ({e})")
    } else {
        e.to_string()
    }
}
