use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::error::{AppError, Result};
use crate::app::domain::{ClientSettings, CountryRecord, NewCountry, PolygonList, StatEntry, StatsResponse};
use crate::app::services::remote::{AuthService, CountryService, StatsService};

#[derive(Deserialize)]
struct CreatedCountry {
    country: CountryRecord,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Deserialize)]
struct ServerMessage {
    message: String,
}

/// REST client for the country, stats and auth endpoints.
pub struct HttpApi {
    settings: ClientSettings,
}

impl HttpApi {
    pub fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }

    fn request(&self, method: minreq::Method, path: &str, token: Option<&str>) -> minreq::Request {
        let url = format!("{}{}", self.settings.base_url(), path);
        let mut request = minreq::Request::new(method, url)
            .with_header("User-Agent", self.settings.user_agent.as_str())
            .with_header("Accept", "application/json");
        if let Some(token) = token {
            request = request.with_header("Authorization", format!("Bearer {}", token));
        }
        if let Some(secs) = self.settings.request_timeout_secs {
            request = request.with_timeout(secs);
        }
        request
    }

    fn with_body<B: serde::Serialize>(request: minreq::Request, body: &B) -> Result<minreq::Request> {
        request
            .with_json(body)
            .map_err(|e| AppError::Remote(format!("Failed to encode request: {}", e)))
    }

    fn send(&self, request: minreq::Request, what: &str) -> Result<minreq::Response> {
        let response = request
            .send()
            .map_err(|e| AppError::Remote(format!("Failed to connect to server: {}", e)))?;

        if (200..300).contains(&response.status_code) {
            Ok(response)
        } else {
            let err = status_error(
                response.status_code,
                &response.reason_phrase,
                response.as_bytes(),
            );
            log::warn!("{} failed: {}", what, err);
            Err(err)
        }
    }

    fn auth(&self, path: &str, email: &str, password: &str) -> Result<String> {
        let body = serde_json::json!({ "email": email, "password": password });
        let request = Self::with_body(self.request(minreq::Method::Post, path, None), &body)?;
        let response = self.send(request, path).map_err(|e| match e {
            AppError::Remote(msg) => AppError::Auth(msg),
            other => other,
        })?;
        let parsed: TokenResponse = decode(&response)
            .map_err(|_| AppError::Auth("Server did not return a token".to_string()))?;
        Ok(parsed.token)
    }
}

/// Map a non-success status to an error, preferring the server's `message`.
fn status_error(status: i32, reason: &str, body: &[u8]) -> AppError {
    let detail = serde_json::from_slice::<ServerMessage>(body)
        .map(|m| m.message)
        .unwrap_or_else(|_| reason.to_string());

    match status {
        401 | 403 => AppError::Auth(detail),
        _ => AppError::Remote(format!("Server returned {}: {}", status, detail)),
    }
}

fn decode<T: DeserializeOwned>(response: &minreq::Response) -> Result<T> {
    decode_body(response.as_bytes())
}

/// Bodies that do not match the expected shape are transport failures.
fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| AppError::Remote(format!("Malformed response: {}", e)))
}

/// Percent-encode a single path segment (RFC 3986 unreserved set kept as is)
fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

impl CountryService for HttpApi {
    fn list(&self, token: &str) -> Result<Vec<CountryRecord>> {
        let request = self.request(minreq::Method::Get, "/countries", Some(token));
        let response = self.send(request, "List countries")?;
        decode(&response)
    }

    fn create(&self, token: &str, country: &NewCountry) -> Result<CountryRecord> {
        let request = Self::with_body(
            self.request(minreq::Method::Post, "/countries", Some(token)),
            country,
        )?;
        let response = self.send(request, "Create country")?;
        let created: CreatedCountry = decode(&response)?;
        Ok(created.country)
    }

    fn update_polygons(&self, token: &str, code: &str, polygons: &PolygonList) -> Result<()> {
        let path = format!("/countries/{}", encode_segment(code));
        let body = serde_json::json!({ "polygons": polygons });
        let request = Self::with_body(self.request(minreq::Method::Put, &path, Some(token)), &body)?;
        self.send(request, "Update polygons")?;
        Ok(())
    }

    fn delete(&self, token: &str, code: &str) -> Result<()> {
        let path = format!("/countries/{}", encode_segment(code));
        let request = self.request(minreq::Method::Delete, &path, Some(token));
        self.send(request, "Delete country")?;
        Ok(())
    }
}

impl StatsService for HttpApi {
    fn fetch(&self, token: &str) -> Result<Vec<StatEntry>> {
        let request = self.request(minreq::Method::Get, "/stats", Some(token));
        let response = self.send(request, "Fetch stats")?;
        let stats: StatsResponse = decode(&response)?;
        Ok(stats.data)
    }
}

impl AuthService for HttpApi {
    fn login(&self, email: &str, password: &str) -> Result<String> {
        self.auth("/auth/login", email, password)
    }

    fn register(&self, email: &str, password: &str) -> Result<String> {
        self.auth("/auth/register", email, password)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    use super::*;
    use crate::app::controllers::registry::CountryRegistry;
    use crate::app::services::fake::record;
    use crate::app::services::session::SessionContext;

    /// Answer exactly one request with `status` and `body`. The handle yields
    /// the raw request as received.
    fn serve_once(status: &'static str, body: &'static str) -> (HttpApi, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut raw = Vec::new();
            let mut chunk = [0u8; 1024];
            let header_end = loop {
                let n = stream.read(&mut chunk).unwrap();
                raw.extend_from_slice(&chunk[..n]);
                if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
                if n == 0 {
                    break raw.len();
                }
            };
            let head = String::from_utf8_lossy(&raw[..header_end]).to_string();
            let content_length = head
                .lines()
                .filter_map(|l| l.split_once(':'))
                .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            while raw.len() < header_end + content_length {
                let n = stream.read(&mut chunk).unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&chunk[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&raw).to_string()
        });
        let api = HttpApi::new(ClientSettings {
            api_base_url: format!("http://{}/api", addr),
            request_timeout_secs: Some(5),
            ..Default::default()
        });
        (api, handle)
    }

    #[test]
    fn test_decode_listing_missing_code_is_remote_error() {
        let body = br#"[{"_id":"1","name":"Nowhere","polygons":[]}]"#;
        let result: Result<Vec<CountryRecord>> = decode_body(body);
        assert!(matches!(result, Err(AppError::Remote(ref m)) if m.starts_with("Malformed response")));
    }

    #[test]
    fn test_decode_listing_with_object_polygons_is_remote_error() {
        let body = br#"[{"_id":"1","name":"Nowhere","code":"NW","polygons":{"type":"Polygon"}}]"#;
        let result: Result<Vec<CountryRecord>> = decode_body(body);
        assert!(matches!(result, Err(AppError::Remote(_))));
    }

    #[test]
    fn test_decode_created_envelope() {
        let body = br#"{"message":"created","country":{"_id":"9","name":"Wakanda","code":"WK","polygons":[[[1,2]]]}}"#;
        let created: CreatedCountry = decode_body(body).unwrap();
        assert_eq!(created.country.id.0, "9");
        assert_eq!(created.country.code, "WK");

        let bare = br#"{"_id":"9","name":"Wakanda","code":"WK","polygons":[]}"#;
        assert!(matches!(decode_body::<CreatedCountry>(bare), Err(AppError::Remote(_))));
    }

    #[test]
    fn test_list_over_http() {
        let (api, server) = serve_once(
            "200 OK",
            r#"[{"_id":"1","id":"1","name":"Canada","code":"CA","polygons":[[[-140,60],[-120,60]]]}]"#,
        );
        let records = api.list("tok").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code, "CA");

        let request = server.join().unwrap();
        assert!(request.starts_with("GET /api/countries "));
        assert!(request.contains("Authorization: Bearer tok"));
    }

    #[test]
    fn test_create_over_http_unwraps_country() {
        let (api, server) = serve_once(
            "201 Created",
            r#"{"country":{"_id":"srv-7","name":"Wakanda","code":"WK","polygons":[]}}"#,
        );
        let new = NewCountry {
            name: "Wakanda".to_string(),
            code: "WK".to_string(),
            polygons: PolygonList::default(),
        };
        let created = api.create("tok", &new).unwrap();
        assert_eq!(created.id.0, "srv-7");

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /api/countries "));
        assert!(request.contains(r#""code":"WK""#));
    }

    #[test]
    fn test_stats_over_http_unwraps_data() {
        let (api, _server) = serve_once(
            "200 OK",
            r#"{"data":[{"_id":"US","totalRequests":5,"trueResponses":2,"falseResponses":3}]}"#,
        );
        let stats = api.fetch("tok").unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].code, "US");
    }

    #[test]
    fn test_server_message_over_http() {
        let (api, _server) = serve_once("404 Not Found", r#"{"message":"Country not found"}"#);
        let err = api.delete("tok", "ZZ").unwrap_err();
        assert_eq!(err.to_string(), "Remote error: Server returned 404: Country not found");
    }

    #[test]
    fn test_malformed_listing_keeps_registry() {
        let mut session = SessionContext::in_memory();
        session.login("tok").unwrap();
        let mut registry = CountryRegistry::new();
        registry.apply_listing(vec![record("1", "Canada", "CA", "[]")]);

        let (api, _server) = serve_once("200 OK", r#"[{"_id":"2","name":"Broken","polygons":[]}]"#);
        let err = registry.load(&session, &api).unwrap_err();
        assert!(matches!(err, AppError::Remote(_)));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.records()[0].code, "CA");
    }

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode_segment("US"), "US");
        assert_eq!(encode_segment("a b/c"), "a%20b%2Fc");
        assert_eq!(encode_segment("CÔ"), "C%C3%94");
    }

    #[test]
    fn test_status_error_uses_server_message() {
        let err = status_error(404, "Not Found", br#"{"message":"Country not found"}"#);
        match err {
            AppError::Remote(msg) => assert_eq!(msg, "Server returned 404: Country not found"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_status_error_falls_back_to_reason() {
        let err = status_error(500, "Internal Server Error", b"<html>oops</html>");
        assert_eq!(
            err.to_string(),
            "Remote error: Server returned 500: Internal Server Error"
        );
    }

    #[test]
    fn test_unauthorized_maps_to_auth_error() {
        let err = status_error(401, "Unauthorized", br#"{"message":"Invalid token"}"#);
        assert!(matches!(err, AppError::Auth(ref m) if m == "Invalid token"));
        assert!(matches!(status_error(403, "Forbidden", b""), AppError::Auth(_)));
    }

    #[test]
    fn test_unreachable_server_is_remote_error() {
        let api = HttpApi::new(ClientSettings {
            api_base_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: Some(2),
            ..Default::default()
        });
        assert!(matches!(api.list("t"), Err(AppError::Remote(_))));
    }
}
