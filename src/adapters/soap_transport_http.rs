//! Node agent transport over SOAP/HTTP using reqwest.

use std::time::Duration;

use quick_xml::Reader;
use quick_xml::events::Event;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::domain::rtml::Element;
use crate::domain::{AccountConfig, AppError, ServiceConfig};
use crate::ports::SubmissionTransport;

const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const SOAP_OPERATION: &str = "handle_rtml";
const LATIN1_DECLARATION: &str = "encoding=\"ISO-8859-1\"";

/// SOAP transport for the node agent `handle_rtml` operation.
///
/// This client performs a single request per call and never retries: resubmitting an RTML
/// request could create a duplicate group.
#[derive(Clone)]
pub struct HttpSubmissionTransport {
    endpoint: Url,
    username: String,
    password: String,
    client: Client,
}

impl std::fmt::Debug for HttpSubmissionTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSubmissionTransport")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl HttpSubmissionTransport {
    /// Create a transport for the configured endpoint and credentials.
    pub fn new(service: &ServiceConfig, account: &AccountConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(service.timeout_secs))
            .build()
            .map_err(|e| AppError::transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: service.endpoint()?,
            username: account.username.clone(),
            password: account.rtml_password.clone(),
            client,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn post(&self, envelope: String) -> Result<String, AppError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("Username", &self.username)
            .header("Password", &self.password)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", "\"\"")
            .body(envelope)
            .send()
            .map_err(|e| AppError::transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response.text().map_err(|e| AppError::Transport {
            message: format!("Failed to read response body: {}", e),
            status: Some(status.as_u16()),
        })?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AppError::Transport {
                message: "authentication failed: check credentials".to_string(),
                status: Some(status.as_u16()),
            });
        }

        // SOAP faults travel with a 500 status, so look at the body before the status code.
        match (parse_envelope(&body), status.is_success()) {
            (Ok(SoapBody::Fault(fault)), _) => Err(AppError::Transport {
                message: format!("SOAP fault: {}", fault),
                status: Some(status.as_u16()),
            }),
            (_, false) => Err(AppError::Transport {
                message: format!("Node agent returned HTTP {}", status.as_u16()),
                status: Some(status.as_u16()),
            }),
            (Ok(SoapBody::Return(document)), true) => {
                Ok(document.replacen(LATIN1_DECLARATION, "", 1))
            }
            (Err(err), true) => Err(err),
        }
    }
}

impl SubmissionTransport for HttpSubmissionTransport {
    fn send(&self, document: &str) -> Result<String, AppError> {
        self.post(envelope(document)?)
    }
}

fn envelope(document: &str) -> Result<String, AppError> {
    let call = Element::new(SOAP_OPERATION).child(Element::new("document").text(document));
    Element::new("soapenv:Envelope")
        .attr("xmlns:soapenv", SOAP_ENV_NS)
        .child(Element::new("soapenv:Body").child(call))
        .to_xml()
}

#[derive(Debug, PartialEq, Eq)]
enum SoapBody {
    Return(String),
    Fault(String),
}

/// Pull the `handle_rtml` return value, or the fault string, out of a SOAP envelope.
fn parse_envelope(body: &str) -> Result<SoapBody, AppError> {
    let mut reader = Reader::from_str(body);
    let mut stack: Vec<String> = Vec::new();
    let mut returned: Option<String> = None;
    let mut fault: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if name == "Fault" {
                    fault.get_or_insert_with(String::new);
                }
                if is_return_element(&name) {
                    returned.get_or_insert_with(String::new);
                }
                stack.push(name);
            }
            Ok(Event::End(_)) => {
                stack.pop();
            }
            Ok(Event::Text(t)) => {
                let text = t.unescape().map_err(|e| AppError::ProtocolViolation(e.to_string()))?;
                collect_text(&stack, &text, &mut returned, &mut fault);
            }
            Ok(Event::CData(c)) => {
                let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                collect_text(&stack, &text, &mut returned, &mut fault);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(AppError::ProtocolViolation(format!(
                    "Unparseable SOAP envelope: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    if let Some(fault) = fault {
        let fault = fault.trim();
        let fault = if fault.is_empty() { "unknown fault" } else { fault };
        return Ok(SoapBody::Fault(fault.to_string()));
    }
    match returned {
        Some(document) if !document.trim().is_empty() => {
            Ok(SoapBody::Return(document.trim().to_string()))
        }
        _ => Err(AppError::ProtocolViolation(
            "SOAP response has no handle_rtml return value".to_string(),
        )),
    }
}

fn is_return_element(name: &str) -> bool {
    name == "return" || name.ends_with("Return")
}

fn collect_text(
    stack: &[String],
    text: &str,
    returned: &mut Option<String>,
    fault: &mut Option<String>,
) {
    let Some(current) = stack.last() else {
        return;
    };
    if current == "faultstring" {
        fault.get_or_insert_with(String::new).push_str(text);
    } else if is_return_element(current) {
        returned.get_or_insert_with(String::new).push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RTML_CONFIRM: &str = concat!(
        r#"<?xml version="1.0" encoding="ISO-8859-1"?>"#,
        r#"<RTML mode="confirm" uid="PROJ_1700000000" version="3.1a"/>"#
    );

    fn soap_return(rtml: &str) -> String {
        let escaped = rtml.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;");
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
  <soapenv:Body>
    <ns1:handle_rtmlResponse xmlns:ns1="urn:node_agent">
      <handle_rtmlReturn>{}</handle_rtmlReturn>
    </ns1:handle_rtmlResponse>
  </soapenv:Body>
</soapenv:Envelope>"#,
            escaped
        )
    }

    const SOAP_FAULT: &str = r#"<soapenv:Envelope
    xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
  <soapenv:Body>
    <soapenv:Fault>
      <faultcode>soapenv:Server.userException</faultcode>
      <faultstring>java.lang.SecurityException: bad password</faultstring>
    </soapenv:Fault>
  </soapenv:Body>
</soapenv:Envelope>"#;

    fn transport(server: &mockito::Server) -> HttpSubmissionTransport {
        let url = Url::parse(&server.url()).unwrap();
        let service = ServiceConfig {
            host: url.host_str().unwrap().to_string(),
            port: url.port().unwrap(),
            path: "/node_agent2/node_agent".to_string(),
            timeout_secs: 1,
        };
        let account = AccountConfig::new("observer", "secret", "PL20A01", "PROJ");
        HttpSubmissionTransport::new(&service, &account).unwrap()
    }

    #[test]
    fn envelope_escapes_document() {
        let body = envelope("<RTML mode=\"request\"/>").unwrap();
        assert!(body.contains("<handle_rtml>"));
        assert!(body.contains("<document>&lt;RTML"));
        assert!(body.contains(SOAP_ENV_NS));
    }

    #[test]
    fn send_returns_unwrapped_rtml() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/node_agent2/node_agent")
            .match_header("Username", "observer")
            .match_header("Password", "secret")
            .match_body(mockito::Matcher::Regex("handle_rtml".to_string()))
            .with_status(200)
            .with_header("content-type", "text/xml")
            .with_body(soap_return(RTML_CONFIRM))
            .expect(1)
            .create();

        let response = transport(&server).send("<RTML mode=\"request\"/>").unwrap();
        assert!(response.contains("mode=\"confirm\""));
        assert!(!response.contains("ISO-8859-1"));
        mock.assert();
    }

    #[test]
    fn soap_fault_is_transport_error() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/node_agent2/node_agent")
            .with_status(500)
            .with_body(SOAP_FAULT)
            .create();

        match transport(&server).send("<RTML/>").unwrap_err() {
            AppError::Transport { message, status } => {
                assert!(message.contains("bad password"));
                assert_eq!(status, Some(500));
            }
            other => panic!("unexpected error variant: {}", other),
        }
    }

    #[test]
    fn unauthorized_is_transport_error() {
        let mut server = mockito::Server::new();
        let _mock = server.mock("POST", "/node_agent2/node_agent").with_status(401).create();

        match transport(&server).send("<RTML/>").unwrap_err() {
            AppError::Transport { message, status } => {
                assert!(message.contains("credentials"));
                assert_eq!(status, Some(401));
            }
            other => panic!("unexpected error variant: {}", other),
        }
    }

    #[test]
    fn server_error_without_fault_is_transport_error() {
        let mut server = mockito::Server::new();
        let mock =
            server.mock("POST", "/node_agent2/node_agent").with_status(503).expect(1).create();

        let err = transport(&server).send("<RTML/>").unwrap_err();
        assert!(matches!(err, AppError::Transport { status: Some(503), .. }));
        mock.assert();
    }

    #[test]
    fn unreachable_service_is_transport_error() {
        let service = ServiceConfig { timeout_secs: 1, ..ServiceConfig::new("127.0.0.1", 1) };
        let account = AccountConfig::new("observer", "secret", "PL20A01", "PROJ");
        let transport = HttpSubmissionTransport::new(&service, &account).unwrap();
        assert!(matches!(transport.send("<RTML/>"), Err(AppError::Transport { status: None, .. })));
    }

    #[test]
    fn truncated_body_is_transport_error() {
        use std::io::{Read, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            while !String::from_utf8_lossy(&request).contains("</soapenv:Envelope>") {
                match stream.read(&mut chunk) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&chunk[..n]),
                }
            }
            let head =
                "HTTP/1.1 200 OK\r\nContent-Type: text/xml\r\nContent-Length: 5000\r\n\r\n";
            stream.write_all(head.as_bytes()).unwrap();
            stream.write_all(b"<soapenv:Envelope").unwrap();
        });

        let service = ServiceConfig { timeout_secs: 5, ..ServiceConfig::new("127.0.0.1", port) };
        let account = AccountConfig::new("observer", "secret", "PL20A01", "PROJ");
        let transport = HttpSubmissionTransport::new(&service, &account).unwrap();

        let err = transport.send("<RTML/>").unwrap_err();
        server.join().unwrap();
        match err {
            AppError::Transport { message, status } => {
                assert!(message.contains("response body"), "message: {}", message);
                assert_eq!(status, Some(200));
            }
            other => panic!("unexpected error variant: {}", other),
        }
    }

    #[test]
    fn envelope_without_return_is_protocol_violation() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/node_agent2/node_agent")
            .with_status(200)
            .with_body("<soapenv:Envelope xmlns:soapenv=\"x\"><soapenv:Body/></soapenv:Envelope>")
            .create();

        assert!(matches!(transport(&server).send("<RTML/>"), Err(AppError::ProtocolViolation(_))));
    }

    #[test]
    fn cdata_return_is_accepted() {
        let body = format!(
            "<Envelope><Body><handle_rtmlReturn><![CDATA[{}]]></handle_rtmlReturn></Body>{}",
            RTML_CONFIRM, "</Envelope>"
        );
        match parse_envelope(&body).unwrap() {
            SoapBody::Return(doc) => assert!(doc.starts_with("<?xml")),
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn debug_redacts_password() {
        let service = ServiceConfig::new("example.org", 8080);
        let account = AccountConfig::new("observer", "secret", "PL20A01", "PROJ");
        let transport = HttpSubmissionTransport::new(&service, &account).unwrap();
        let rendered = format!("{:?}", transport);
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("secret"));
    }
}
