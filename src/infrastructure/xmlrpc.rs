//! Minimal XML-RPC transport for the Ubigraph server.
//!
//! Only integer and string scalars are needed: Ubigraph's vertex and edge
//! procedures take ids and attribute strings and answer with an integer.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::trace;

use crate::error::RenderError;
use crate::ports::UbigraphClient;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum XmlRpcValue<'a> {
    Int(i64),
    Str(&'a str),
}

/// Encode a `<methodCall>` document.
pub fn encode_method_call(method: &str, params: &[XmlRpcValue<'_>]) -> String {
    let mut body = String::from("<?xml version=\"1.0\"?>\n<methodCall>");
    body.push_str(&format!("<methodName>{}</methodName><params>", escape_xml(method)));
    for param in params {
        let value = match param {
            XmlRpcValue::Int(i) => format!("<int>{}</int>", i),
            XmlRpcValue::Str(s) => format!("<string>{}</string>", escape_xml(s)),
        };
        body.push_str(&format!("<param><value>{}</value></param>", value));
    }
    body.push_str("</params></methodCall>");
    body
}

/// Integer result of a `<methodResponse>`, if it carries one.
pub fn parse_int_response(body: &str) -> Option<i64> {
    ["<int>", "<i4>", "<i8>"].iter().find_map(|open| {
        let start = body.find(open)? + open.len();
        let end = body[start..].find("</")? + start;
        body[start..end].trim().parse().ok()
    })
}

/// `faultString` of a fault response, or the whole body when it cannot be found.
pub fn parse_fault(body: &str) -> Option<String> {
    if !body.contains("<fault>") {
        return None;
    }
    let message = body
        .find("faultString")
        .and_then(|idx| {
            let rest = &body[idx..];
            let start = rest.find("<string>")? + "<string>".len();
            let end = rest[start..].find("</string>")? + start;
            Some(rest[start..end].to_string())
        })
        .unwrap_or_else(|| body.trim().to_string());
    Some(message)
}

/// Map a response body to its integer result; a fault is an RPC error.
pub fn read_response(method: &str, body: &str) -> Result<Option<i64>, RenderError> {
    if let Some(message) = parse_fault(body) {
        return Err(RenderError::Rpc {
            method: method.to_string(),
            message,
        });
    }
    Ok(parse_int_response(body))
}

/// Ubigraph signals failure with -1. A response without a value counts as 0.
pub fn require_success(method: &str, result: Option<i64>) -> Result<i64, RenderError> {
    match result {
        Some(-1) => Err(RenderError::Rpc {
            method: method.to_string(),
            message: "server returned -1".to_string(),
        }),
        Some(value) => Ok(value),
        None => Ok(0),
    }
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Blocking XML-RPC client bound to one server endpoint.
pub struct XmlRpcClient {
    http: Client,
    server_url: String,
}

impl XmlRpcClient {
    pub fn new(server_url: &str) -> Result<Self, RenderError> {
        let http = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            http,
            server_url: server_url.to_string(),
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn call(&self, method: &str, params: &[XmlRpcValue<'_>]) -> Result<Option<i64>, RenderError> {
        let method = format!("ubigraph.{}", method);
        let body = encode_method_call(&method, params);
        trace!(%method, "xml-rpc call");

        let response = self
            .http
            .post(&self.server_url)
            .header("Content-Type", "text/xml")
            .body(body)
            .send()?
            .error_for_status()?
            .text()?;

        read_response(&method, &response)
    }

    fn call_checked(&self, method: &str, params: &[XmlRpcValue<'_>]) -> Result<i64, RenderError> {
        let result = self.call(method, params)?;
        require_success(&format!("ubigraph.{}", method), result)
    }
}

impl UbigraphClient for XmlRpcClient {
    fn clear(&mut self) -> Result<(), RenderError> {
        self.call("clear", &[]).map(|_| ())
    }

    fn new_vertex_w_id(&mut self, id: i64) -> Result<(), RenderError> {
        self.call_checked("new_vertex_w_id", &[XmlRpcValue::Int(id)]).map(|_| ())
    }

    fn new_edge(&mut self, from: i64, to: i64) -> Result<i64, RenderError> {
        self.call_checked("new_edge", &[XmlRpcValue::Int(from), XmlRpcValue::Int(to)])
    }

    fn remove_vertex(&mut self, id: i64) -> Result<(), RenderError> {
        self.call_checked("remove_vertex", &[XmlRpcValue::Int(id)]).map(|_| ())
    }

    fn remove_edge(&mut self, edge_id: i64) -> Result<(), RenderError> {
        self.call_checked("remove_edge", &[XmlRpcValue::Int(edge_id)]).map(|_| ())
    }

    fn set_vertex_attribute(&mut self, id: i64, key: &str, value: &str) -> Result<(), RenderError> {
        self.call_checked(
            "set_vertex_attribute",
            &[XmlRpcValue::Int(id), XmlRpcValue::Str(key), XmlRpcValue::Str(value)],
        )
        .map(|_| ())
    }
}
