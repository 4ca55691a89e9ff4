//! How a request reaches the proxy.
//!
//! Some proxy deployments only answer script-style requests, so besides
//! plain JSON over HTTP there is a JSONP transport that asks for a callback
//! wrapper and strips it again. Callers get a `serde_json::Value` either way.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Url};
use serde_json::Value;

use crate::error::FetchError;

#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, url: Url) -> Result<Value, FetchError>;
}

fn client(timeout: Duration) -> Result<Client, FetchError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Plain `GET` returning a JSON body.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// # Errors
    /// Fails if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            client: client(timeout)?,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, url: Url) -> Result<Value, FetchError> {
        Ok(self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?)
    }
}

/// Callback names with a request in flight.
#[derive(Debug, Clone, Default)]
pub struct CallbackRegistry {
    pending: Arc<Mutex<HashSet<String>>>,
}

impl CallbackRegistry {
    /// Mark `name` as pending until the returned guard is dropped.
    pub fn register(&self, name: &str) -> PendingCallback {
        if let Ok(mut pending) = self.pending.lock() {
            pending.insert(name.to_string());
        }
        PendingCallback {
            registry: self.clone(),
            name: name.to_string(),
        }
    }

    pub fn is_pending(&self, name: &str) -> bool {
        self.pending.lock().is_ok_and(|p| p.contains(name))
    }

    pub fn len(&self) -> usize {
        self.pending.lock().map_or(0, |p| p.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Deregisters its callback name on drop, whether the request succeeded,
/// failed, or was abandoned.
#[derive(Debug)]
pub struct PendingCallback {
    registry: CallbackRegistry,
    name: String,
}

impl PendingCallback {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for PendingCallback {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.registry.pending.lock() {
            pending.remove(&self.name);
        }
    }
}

/// Script-style requests: adds `callback=<name>&_ts=<ms>` and expects
/// `<name>(<json>);` back.
#[derive(Debug)]
pub struct JsonpTransport {
    client: Client,
    registry: CallbackRegistry,
    sequence: AtomicU64,
}

impl JsonpTransport {
    /// # Errors
    /// Fails if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            client: client(timeout)?,
            registry: CallbackRegistry::default(),
            sequence: AtomicU64::new(0),
        })
    }

    pub fn registry(&self) -> &CallbackRegistry {
        &self.registry
    }

    fn callback_name(&self, now_ms: i64) -> String {
        let n = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("__jsonp_cb_{now_ms}_{n}")
    }
}

/// Append the callback and cache-busting parameters to `url`.
pub fn jsonp_url(mut url: Url, callback: &str, now_ms: i64) -> Url {
    url.query_pairs_mut()
        .append_pair("callback", callback)
        .append_pair("_ts", &now_ms.to_string());
    url
}

/// Extract the JSON argument from `callback(<json>);`.
///
/// Tolerates surrounding whitespace, a leading `/**/` and a missing trailing
/// semicolon. A different callback name is an error.
pub fn unwrap_jsonp(body: &str, callback: &str) -> Result<Value, FetchError> {
    let body = body.trim();
    let body = body.strip_prefix("/**/").unwrap_or(body).trim_start();
    let body = body.strip_suffix(';').unwrap_or(body).trim_end();

    let Some(open) = body.find('(') else {
        return Err(FetchError::Jsonp("response is not a callback invocation".into()));
    };
    let name = body[..open].trim();
    if name != callback {
        return Err(FetchError::Jsonp(format!(
            "callback mismatch: expected {callback}, got {name}"
        )));
    }
    let Some(args) = body[open + 1..].strip_suffix(')') else {
        return Err(FetchError::Jsonp("unterminated callback invocation".into()));
    };
    Ok(serde_json::from_str(args)?)
}

#[async_trait]
impl Transport for JsonpTransport {
    async fn get_json(&self, url: Url) -> Result<Value, FetchError> {
        let now_ms = Utc::now().timestamp_millis();
        let pending = self.registry.register(&self.callback_name(now_ms));
        let url = jsonp_url(url, pending.name(), now_ms);

        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        unwrap_jsonp(&body, pending.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CB: &str = "__jsonp_cb_1710165600000_0";

    #[test]
    fn unwraps_plain_invocation() {
        let value = unwrap_jsonp(&format!("{CB}({{\"ok\":true}});"), CB);
        assert_eq!(value.ok(), Some(json!({"ok": true})));
    }

    #[test]
    fn unwraps_with_comment_and_whitespace() {
        let body = format!("/**/ {CB} ({{\"text\":\"a (b)\"}})\n");
        let value = unwrap_jsonp(&body, CB);
        assert_eq!(value.ok(), Some(json!({"text": "a (b)"})));
    }

    #[test]
    fn rejects_other_callback() {
        let result = unwrap_jsonp("__jsonp_cb_1_1({});", CB);
        assert!(matches!(result, Err(FetchError::Jsonp(m)) if m.contains("mismatch")));
    }

    #[test]
    fn rejects_bare_json_and_bad_payload() {
        assert!(matches!(
            unwrap_jsonp("{\"ok\":true}", CB),
            Err(FetchError::Jsonp(_))
        ));
        assert!(matches!(
            unwrap_jsonp(&format!("{CB}({{oops}})"), CB),
            Err(FetchError::Malformed(_))
        ));
    }

    #[test]
    fn url_gets_callback_and_timestamp() {
        let url = Url::parse("https://proxy.example/exec?mode=events").expect("valid url");
        let url = jsonp_url(url, CB, 42);
        assert_eq!(
            url.query(),
            Some("mode=events&callback=__jsonp_cb_1710165600000_0&_ts=42")
        );
    }

    #[test]
    fn registry_guard_cleans_up() {
        let registry = CallbackRegistry::default();
        {
            let a = registry.register("a");
            let _b = registry.register("b");
            assert_eq!(registry.len(), 2);
            assert!(registry.is_pending(a.name()));
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn callback_names_are_unique() {
        let transport = JsonpTransport::new(Duration::from_secs(1)).expect("client builds");
        let a = transport.callback_name(5);
        let b = transport.callback_name(5);
        assert_ne!(a, b);
        assert!(a.starts_with("__jsonp_cb_5_"));
    }

    /// Serve `body` as JSON to a single connection on a loopback port.
    fn serve_once(body: &'static str) -> Url {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let addr = listener.local_addr().expect("bound address");
        std::thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let _ = write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
        });
        Url::parse(&format!("http://{addr}/exec?mode=events")).expect("valid url")
    }

    fn loopback_transport() -> HttpTransport {
        let client = Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("client builds");
        HttpTransport { client }
    }

    #[test_log::test(tokio::test)]
    async fn http_transport_decodes_json_body() {
        let transport = loopback_transport();
        let value = transport
            .get_json(serve_once(r#"{"ok":true,"events":[]}"#))
            .await
            .expect("json body");
        assert_eq!(value, json!({"ok": true, "events": []}));
    }

    #[test_log::test(tokio::test)]
    async fn http_transport_reports_undecodable_body() {
        let transport = loopback_transport();
        let result = transport.get_json(serve_once("not json")).await;
        assert!(matches!(result, Err(FetchError::Http(e)) if e.is_decode()));
    }

    #[test_log::test(tokio::test)]
    async fn failed_request_deregisters_callback() {
        let transport = JsonpTransport::new(Duration::from_millis(200)).expect("client builds");
        let url = Url::parse("http://127.0.0.1:9/exec?mode=events").expect("valid url");
        let result = transport.get_json(url).await;
        assert!(matches!(result, Err(FetchError::Http(_))));
        assert!(transport.registry().is_empty());
    }
}
