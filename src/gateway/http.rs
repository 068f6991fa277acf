use std::time::Duration;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use intake_config::Config;
use intake_core::{
    AirtableRecord, CoverSheetRequest, CoverSheetResponse, EmailMessage, EmailResponse,
    GatewayError, TransactionGateway,
};

/// Environment variable holding the records API token.
pub const AIRTABLE_KEY_ENV: &str = "AIRTABLE_API_KEY";

const COVER_SHEET_PATH: &str = "/api/generateCoverSheet";
const EMAIL_PATH: &str = "/api/send-email";

/// Endpoints and credentials for [`HttpGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySettings {
    pub api_base_url: String,
    pub airtable_api_url: String,
    pub airtable_base_id: String,
    pub airtable_table_id: String,
    pub airtable_api_key: Option<String>,
    pub timeout: Duration,
}

impl GatewaySettings {
    /// Settings from the saved config; the API key comes from the environment.
    pub fn from_config(config: &Config) -> Self {
        Self {
            api_base_url: config.api_base_url.clone(),
            airtable_api_url: config.airtable_api_url.clone(),
            airtable_base_id: config.airtable_base_id.clone(),
            airtable_table_id: config.airtable_table_id.clone(),
            airtable_api_key: std::env::var(AIRTABLE_KEY_ENV)
                .ok()
                .filter(|key| !key.trim().is_empty()),
            timeout: Duration::from_secs(config.request_timeout_secs.max(1)),
        }
    }

    fn record_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.airtable_api_url.trim_end_matches('/'),
            self.airtable_base_id.trim(),
            self.airtable_table_id.trim()
        )
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url.trim_end_matches('/'), path)
    }
}

/// Blocking JSON-over-HTTP implementation of [`TransactionGateway`].
pub struct HttpGateway {
    agent: ureq::Agent,
    settings: GatewaySettings,
}

impl HttpGateway {
    pub fn new(settings: GatewaySettings) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(settings.timeout))
            .http_status_as_error(false)
            .build();
        Self::with_agent(settings, ureq::Agent::new_with_config(config))
    }

    /// Uses a caller-configured agent. The agent must not treat HTTP error
    /// statuses as transport errors.
    pub fn with_agent(settings: GatewaySettings, agent: ureq::Agent) -> Self {
        Self { agent, settings }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(GatewaySettings::from_config(config))
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    fn post(
        &self,
        url: &str,
        bearer: Option<&str>,
        body: &impl Serialize,
    ) -> Result<(u16, String), GatewayError> {
        debug!("POST {}", url);
        let mut request = self
            .agent
            .post(url)
            .header("Accept", "application/json");
        if let Some(token) = bearer {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        let mut response = request
            .send_json(body)
            .map_err(|err| GatewayError::Transport(err.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|err| GatewayError::Transport(err.to_string()))?;
        debug!("POST {} -> {}", url, status);
        if status >= 400 {
            return Err(GatewayError::Remote {
                status,
                message: remote_message(&text),
            });
        }
        Ok((status, text))
    }
}

impl TransactionGateway for HttpGateway {
    fn create_record(&self, record: &AirtableRecord) -> Result<String, GatewayError> {
        let key = self
            .settings
            .airtable_api_key
            .as_deref()
            .ok_or_else(|| GatewayError::MissingCredential(AIRTABLE_KEY_ENV.into()))?;
        if self.settings.airtable_base_id.trim().is_empty()
            || self.settings.airtable_table_id.trim().is_empty()
        {
            return Err(GatewayError::MissingCredential(
                "airtable_base_id / airtable_table_id".into(),
            ));
        }

        let body = json!({ "fields": &record.fields, "typecast": true });
        let (_, text) = self.post(&self.settings.record_url(), Some(key), &body)?;
        let value: Value =
            serde_json::from_str(&text).map_err(|err| GatewayError::Decode(err.to_string()))?;
        value
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| GatewayError::Decode("record response has no id".into()))
    }

    fn generate_cover_sheet(
        &self,
        request: &CoverSheetRequest,
    ) -> Result<CoverSheetResponse, GatewayError> {
        let (status, text) = self.post(&self.settings.api_url(COVER_SHEET_PATH), None, request)?;
        let response: CoverSheetResponse =
            serde_json::from_str(&text).map_err(|err| GatewayError::Decode(err.to_string()))?;
        if !response.success {
            return Err(GatewayError::Remote {
                status,
                message: response
                    .error
                    .or(response.message)
                    .unwrap_or_else(|| "cover sheet generation failed".into()),
            });
        }
        Ok(response)
    }

    fn send_email(&self, message: &EmailMessage) -> Result<EmailResponse, GatewayError> {
        let (status, text) = self.post(&self.settings.api_url(EMAIL_PATH), None, message)?;
        let response: EmailResponse =
            serde_json::from_str(&text).map_err(|err| GatewayError::Decode(err.to_string()))?;
        if !response.success {
            return Err(GatewayError::Remote {
                status,
                message: response
                    .message
                    .unwrap_or_else(|| "email delivery failed".into()),
            });
        }
        Ok(response)
    }
}

/// Best human-readable message from an error body.
fn remote_message(body: &str) -> String {
    let trimmed = body.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        let candidates = [
            value.pointer("/error/message"),
            value.get("error"),
            value.get("message"),
        ];
        for candidate in candidates.into_iter().flatten() {
            if let Some(text) = candidate.as_str() {
                return text.to_string();
            }
        }
    }
    if trimmed.is_empty() {
        "empty response".to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    use super::*;

    /// Serves one canned response and hands back the raw request.
    fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let address = format!("http://{}", listener.local_addr().expect("addr"));
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream);
            let mut head = String::new();
            let mut content_length = 0usize;
            let mut chunked = false;
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).expect("read line") == 0 {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    let name = name.trim();
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap_or(0);
                    } else if name.eq_ignore_ascii_case("transfer-encoding") {
                        chunked = value.to_ascii_lowercase().contains("chunked");
                    }
                }
                let end = line == "\r\n";
                head.push_str(&line);
                if end {
                    break;
                }
            }
            let mut body = Vec::new();
            if chunked {
                loop {
                    let mut size_line = String::new();
                    reader.read_line(&mut size_line).expect("chunk size");
                    let size = usize::from_str_radix(size_line.trim(), 16).unwrap_or(0);
                    let mut chunk = vec![0u8; size + 2];
                    reader.read_exact(&mut chunk).expect("chunk data");
                    if size == 0 {
                        break;
                    }
                    body.extend_from_slice(&chunk[..size]);
                }
            } else {
                body.resize(content_length, 0);
                reader.read_exact(&mut body).expect("read body");
            }
            let mut stream = reader.into_inner();
            stream.write_all(response.as_bytes()).expect("write response");
            stream.flush().expect("flush");
            format!("{}{}", head, String::from_utf8_lossy(&body))
        });
        (address, handle)
    }

    fn settings(base: &str) -> GatewaySettings {
        GatewaySettings {
            api_base_url: base.to_string(),
            airtable_api_url: format!("{}/v0", base),
            airtable_base_id: "appBase".into(),
            airtable_table_id: "tblIntake".into(),
            airtable_api_key: Some("key123".into()),
            timeout: Duration::from_secs(5),
        }
    }

    fn gateway(base: &str) -> HttpGateway {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(5)))
            .http_status_as_error(false)
            .proxy(None)
            .build();
        HttpGateway::with_agent(settings(base), ureq::Agent::new_with_config(config))
    }

    fn record() -> AirtableRecord {
        let mut fields = BTreeMap::new();
        fields.insert("Role".to_string(), json!("Dual Agent"));
        AirtableRecord { fields }
    }

    #[test]
    fn create_record_posts_fields_with_bearer_token() {
        let (base, server) = serve_once("200 OK", r#"{"id":"recABC","fields":{}}"#);
        let id = gateway(&base).create_record(&record()).expect("record created");
        assert_eq!(id, "recABC");

        let request = server.join().expect("server thread");
        assert!(request.starts_with("POST /v0/appBase/tblIntake"));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer key123"));
        assert!(request.contains(r#""typecast":true"#));
        assert!(request.contains(r#""Role":"Dual Agent""#));
    }

    #[test]
    fn error_status_becomes_remote_error() {
        let (base, server) = serve_once(
            "422 Unprocessable Entity",
            r#"{"error":{"type":"INVALID_VALUE_FOR_COLUMN","message":"Field \"Role\" cannot accept the provided value"}}"#,
        );
        let err = gateway(&base).create_record(&record()).unwrap_err();
        server.join().expect("server thread");
        assert_eq!(
            err,
            GatewayError::Remote {
                status: 422,
                message: "Field \"Role\" cannot accept the provided value".into()
            }
        );
    }

    #[test]
    fn missing_key_fails_before_any_request() {
        let mut settings = settings("http://127.0.0.1:9");
        settings.airtable_api_key = None;
        let err = HttpGateway::new(settings).create_record(&record()).unwrap_err();
        assert_eq!(err, GatewayError::MissingCredential(AIRTABLE_KEY_ENV.into()));
    }

    #[test]
    fn cover_sheet_request_uses_camel_case_body() {
        let (base, server) = serve_once("200 OK", r#"{"success":true,"pdfUrl":"https://files/x.pdf"}"#);
        let request = CoverSheetRequest {
            table_id: "tblIntake".into(),
            record_id: "recABC".into(),
            agent_role: "Dual Agent".into(),
        };
        let response = gateway(&base).generate_cover_sheet(&request).expect("generated");
        assert_eq!(response.url.as_deref(), Some("https://files/x.pdf"));

        let raw = server.join().expect("server thread");
        assert!(raw.starts_with("POST /api/generateCoverSheet"));
        assert!(raw.contains(r#""agentRole":"Dual Agent""#));
        assert!(raw.contains(r#""recordId":"recABC""#));
    }

    #[test]
    fn unsuccessful_email_payload_is_remote_error() {
        let (base, server) = serve_once("200 OK", r#"{"success":false,"message":"SMTP down"}"#);
        let message = EmailMessage {
            to: "office@x.com".into(),
            subject: "s".into(),
            body: "b".into(),
        };
        let err = gateway(&base).send_email(&message).unwrap_err();
        server.join().expect("server thread");
        assert_eq!(
            err,
            GatewayError::Remote {
                status: 200,
                message: "SMTP down".into()
            }
        );
    }

    #[test]
    fn remote_message_prefers_structured_fields() {
        assert_eq!(remote_message(r#"{"error":"NOT_FOUND"}"#), "NOT_FOUND");
        assert_eq!(remote_message(r#"{"message":"nope"}"#), "nope");
        assert_eq!(remote_message("  "), "empty response");
        assert_eq!(remote_message("Bad Gateway"), "Bad Gateway");
    }
}
