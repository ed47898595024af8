//! Encoder and decoder for XML-RPC documents.
//!
//! Requests are written directly into a `String`; responses are read with a
//! pull parser so that whitespace between structural elements is ignored
//! while character data inside `<string>` and untyped `<value>` elements is
//! preserved exactly.

use crate::error::ProtocolError;
use crate::message::{Fault, MethodCall, Response, FAULT_CODE_MEMBER, FAULT_STRING_MEMBER};
use crate::value::Value;
use base64::Engine;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

const XML_DECL: &str = "<?xml version=\"1.0\"?>\n";

/// Encodes method calls and responses into XML-RPC documents.
pub struct Encoder;

impl Encoder {
    /// Encodes a `methodCall`. Parameters are written in order, each tagged
    /// with its XML-RPC type.
    pub fn encode_request(call: &MethodCall) -> Result<String, ProtocolError> {
        validate_method_name(&call.method_name)?;

        let mut out = String::with_capacity(128 + call.params.len() * 64);
        out.push_str(XML_DECL);
        out.push_str("<methodCall><methodName>");
        out.push_str(&call.method_name);
        out.push_str("</methodName><params>");
        for param in &call.params {
            out.push_str("<param>");
            write_value(&mut out, param)?;
            out.push_str("</param>");
        }
        out.push_str("</params></methodCall>");
        Ok(out)
    }

    /// Encodes a `methodResponse`. Used by test doubles and benchmarks that
    /// stand in for the daemon.
    pub fn encode_response(response: &Response) -> Result<String, ProtocolError> {
        let mut out = String::with_capacity(256);
        out.push_str(XML_DECL);
        out.push_str("<methodResponse>");
        match response {
            Response::Success(value) => {
                out.push_str("<params><param>");
                write_value(&mut out, value)?;
                out.push_str("</param></params>");
            }
            Response::Fault(fault) => {
                out.push_str("<fault>");
                write_value(&mut out, &fault.to_value())?;
                out.push_str("</fault>");
            }
        }
        out.push_str("</methodResponse>");
        Ok(out)
    }
}

fn validate_method_name(name: &str) -> Result<(), ProtocolError> {
    if name.is_empty() {
        return Err(ProtocolError::Encoding("method name is empty".to_string()));
    }
    if let Some(c) = name
        .chars()
        .find(|&c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':' | '/')))
    {
        return Err(ProtocolError::Encoding(format!(
            "method name {:?} contains {:?}",
            name, c
        )));
    }
    Ok(())
}

/// Characters allowed by the XML 1.0 `Char` production.
fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

fn escape_text(text: &str) -> Result<Cow<'_, str>, ProtocolError> {
    if let Some(c) = text.chars().find(|&c| !is_xml_char(c)) {
        return Err(ProtocolError::Encoding(format!(
            "character U+{:04X} cannot appear in XML",
            c as u32
        )));
    }
    // A raw CR would be normalized to LF by the receiving parser.
    let escaped = partial_escape(text);
    if escaped.contains('\r') {
        Ok(Cow::Owned(escaped.replace('\r', "&#13;")))
    } else {
        Ok(escaped)
    }
}

fn write_value(out: &mut String, value: &Value) -> Result<(), ProtocolError> {
    out.push_str("<value>");
    match value {
        Value::Int(i) => {
            out.push_str("<int>");
            out.push_str(&i.to_string());
            out.push_str("</int>");
        }
        Value::I8(i) => {
            out.push_str("<i8>");
            out.push_str(&i.to_string());
            out.push_str("</i8>");
        }
        Value::Boolean(b) => {
            out.push_str(if *b {
                "<boolean>1</boolean>"
            } else {
                "<boolean>0</boolean>"
            });
        }
        Value::String(s) => {
            out.push_str("<string>");
            out.push_str(&escape_text(s)?);
            out.push_str("</string>");
        }
        Value::Double(d) => {
            if !d.is_finite() {
                return Err(ProtocolError::Encoding(format!(
                    "double {} has no XML-RPC representation",
                    d
                )));
            }
            // `Display` for f64 never uses exponent notation, which XML-RPC forbids.
            out.push_str("<double>");
            out.push_str(&d.to_string());
            out.push_str("</double>");
        }
        Value::DateTime(s) => {
            out.push_str("<dateTime.iso8601>");
            out.push_str(&escape_text(s)?);
            out.push_str("</dateTime.iso8601>");
        }
        Value::Base64(bytes) => {
            out.push_str("<base64>");
            out.push_str(&base64::engine::general_purpose::STANDARD.encode(bytes));
            out.push_str("</base64>");
        }
        Value::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                write_value(out, item)?;
            }
            out.push_str("</data></array>");
        }
        Value::Struct(members) => {
            out.push_str("<struct>");
            for (name, member) in members {
                out.push_str("<member><name>");
                out.push_str(&escape_text(name)?);
                out.push_str("</name>");
                write_value(out, member)?;
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
        Value::Nil => out.push_str("<nil/>"),
    }
    out.push_str("</value>");
    Ok(())
}

/// Decodes XML-RPC documents.
pub struct Decoder;

impl Decoder {
    /// Decodes a `methodResponse` into a success value or a fault.
    pub fn decode_response(input: &str) -> Result<Response, ProtocolError> {
        if input.trim().is_empty() {
            return Err(ProtocolError::EmptyDocument);
        }

        let mut parser = Parser::new(input);
        parser.expect_open("methodResponse")?;

        let response = match parser.next_node()? {
            Node::Open(name) if name == "params" => {
                parser.expect_open("param")?;
                let value = parser.parse_value_element()?;
                parser.expect_close("param")?;
                parser.expect_close("params")?;
                Response::Success(value)
            }
            Node::Open(name) if name == "fault" => {
                let value = parser.parse_value_element()?;
                parser.expect_close("fault")?;
                Response::Fault(fault_from_struct(&value)?)
            }
            Node::Empty(name) if name == "params" => {
                return Err(ProtocolError::MissingElement("param"))
            }
            other => return Err(unexpected(&other, "params")),
        };

        parser.expect_close("methodResponse")?;
        parser.expect_eof()?;
        Ok(response)
    }

    /// Decodes a `methodCall`.
    pub fn decode_request(input: &str) -> Result<MethodCall, ProtocolError> {
        if input.trim().is_empty() {
            return Err(ProtocolError::EmptyDocument);
        }

        let mut parser = Parser::new(input);
        parser.expect_open("methodCall")?;
        parser.expect_open("methodName")?;
        let method_name = parser.read_text("methodName")?.trim().to_string();

        let mut params = Vec::new();
        match parser.next_node()? {
            Node::Open(name) if name == "params" => loop {
                match parser.next_node()? {
                    Node::Open(name) if name == "param" => {
                        params.push(parser.parse_value_element()?);
                        parser.expect_close("param")?;
                    }
                    Node::Close(name) if name == "params" => break,
                    other => return Err(unexpected(&other, "param")),
                }
            },
            Node::Empty(name) if name == "params" => {}
            Node::Close(name) if name == "methodCall" => {
                parser.expect_eof()?;
                return Ok(MethodCall {
                    method_name,
                    params,
                });
            }
            other => return Err(unexpected(&other, "params")),
        }

        parser.expect_close("methodCall")?;
        parser.expect_eof()?;
        Ok(MethodCall {
            method_name,
            params,
        })
    }
}

/// `<fault>` bodies are recognized by their two well-known members; extra
/// members are tolerated.
fn fault_from_struct(value: &Value) -> Result<Fault, ProtocolError> {
    let code = value.get(FAULT_CODE_MEMBER).and_then(Value::as_i32);
    let message = value.get(FAULT_STRING_MEMBER).and_then(Value::as_str);
    match (code, message) {
        (Some(code), Some(message)) => Ok(Fault::new(code, message)),
        _ => Err(ProtocolError::Malformed(
            "fault is missing faultCode or faultString".to_string(),
        )),
    }
}

/// A structural event with whitespace and comments stripped.
#[derive(Debug)]
enum Node {
    Open(String),
    Empty(String),
    Close(String),
    Eof,
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Open(name) => write!(f, "<{}>", name),
            Node::Empty(name) => write!(f, "<{}/>", name),
            Node::Close(name) => write!(f, "</{}>", name),
            Node::Eof => write!(f, "end of document"),
        }
    }
}

fn unexpected(node: &Node, expected: &'static str) -> ProtocolError {
    match node {
        Node::Eof => ProtocolError::MissingElement(expected),
        other => ProtocolError::Malformed(format!("expected <{}>, found {}", expected, other)),
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, ProtocolError> {
    std::str::from_utf8(bytes).map_err(|_| ProtocolError::InvalidUtf8)
}

fn tag_name(start: &BytesStart<'_>) -> Result<String, ProtocolError> {
    utf8(start.name().as_ref()).map(str::to_owned)
}

/// Deepest array/struct nesting accepted in a document.
const MAX_DEPTH: usize = 64;

struct Parser<'a> {
    reader: Reader<&'a [u8]>,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            reader: Reader::from_str(input),
            depth: 0,
        }
    }

    fn descend(&mut self) -> Result<(), ProtocolError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ProtocolError::Malformed(format!(
                "nesting too deep (limit {})",
                MAX_DEPTH
            )));
        }
        Ok(())
    }

    /// Returns the next element boundary, skipping whitespace, comments,
    /// the XML declaration and processing instructions.
    fn next_node(&mut self) -> Result<Node, ProtocolError> {
        loop {
            match self.reader.read_event()? {
                Event::Start(e) => return Ok(Node::Open(tag_name(&e)?)),
                Event::Empty(e) => return Ok(Node::Empty(tag_name(&e)?)),
                Event::End(e) => return Ok(Node::Close(utf8(e.name().as_ref())?.to_owned())),
                Event::Text(t) => {
                    if !t.iter().all(u8::is_ascii_whitespace) {
                        return Err(ProtocolError::Malformed(format!(
                            "unexpected text {:?}",
                            String::from_utf8_lossy(&t)
                        )));
                    }
                }
                Event::CData(_) => {
                    return Err(ProtocolError::Malformed("unexpected CDATA".to_string()))
                }
                Event::Eof => return Ok(Node::Eof),
                _ => {}
            }
        }
    }

    fn expect_open(&mut self, name: &'static str) -> Result<(), ProtocolError> {
        match self.next_node()? {
            Node::Open(found) if found == name => Ok(()),
            other => Err(unexpected(&other, name)),
        }
    }

    fn expect_close(&mut self, name: &'static str) -> Result<(), ProtocolError> {
        match self.next_node()? {
            Node::Close(found) if found == name => Ok(()),
            Node::Eof => Err(ProtocolError::Malformed(format!("unterminated <{}>", name))),
            other => Err(ProtocolError::Malformed(format!(
                "expected </{}>, found {}",
                name, other
            ))),
        }
    }

    fn expect_eof(&mut self) -> Result<(), ProtocolError> {
        match self.next_node()? {
            Node::Eof => Ok(()),
            other => Err(ProtocolError::Malformed(format!(
                "trailing content after document: {}",
                other
            ))),
        }
    }

    /// Reads character data up to the closing tag `name`.
    fn read_text(&mut self, name: &str) -> Result<String, ProtocolError> {
        let mut text = String::new();
        loop {
            match self.reader.read_event()? {
                Event::Text(t) => text.push_str(
                    &t.unescape()
                        .map_err(|e| ProtocolError::Malformed(e.to_string()))?,
                ),
                Event::CData(c) => text.push_str(utf8(&c)?),
                Event::End(e) if e.name().as_ref() == name.as_bytes() => return Ok(text),
                Event::Comment(_) => {}
                Event::Eof => {
                    return Err(ProtocolError::Malformed(format!("unterminated <{}>", name)))
                }
                _ => {
                    return Err(ProtocolError::Malformed(format!(
                        "unexpected markup inside <{}>",
                        name
                    )))
                }
            }
        }
    }

    /// Parses a `<value>` element, or `<value/>` as the empty string.
    fn parse_value_element(&mut self) -> Result<Value, ProtocolError> {
        match self.next_node()? {
            Node::Open(name) if name == "value" => self.parse_value(),
            Node::Empty(name) if name == "value" => Ok(Value::String(String::new())),
            other => Err(unexpected(&other, "value")),
        }
    }

    /// Parses the content of a `<value>` whose start tag was consumed.
    /// Character data without a type element is a string.
    fn parse_value(&mut self) -> Result<Value, ProtocolError> {
        let mut text = String::new();
        loop {
            match self.reader.read_event()? {
                Event::Text(t) => text.push_str(
                    &t.unescape()
                        .map_err(|e| ProtocolError::Malformed(e.to_string()))?,
                ),
                Event::CData(c) => text.push_str(utf8(&c)?),
                Event::End(e) if e.name().as_ref() == b"value" => return Ok(Value::String(text)),
                Event::Start(e) => {
                    reject_mixed_content(&text)?;
                    let name = tag_name(&e)?;
                    let value = self.parse_typed(&name)?;
                    self.expect_close("value")?;
                    return Ok(value);
                }
                Event::Empty(e) => {
                    reject_mixed_content(&text)?;
                    let value = empty_typed(&tag_name(&e)?)?;
                    self.expect_close("value")?;
                    return Ok(value);
                }
                Event::Eof => {
                    return Err(ProtocolError::Malformed("unterminated <value>".to_string()))
                }
                Event::End(e) => {
                    return Err(ProtocolError::Malformed(format!(
                        "unexpected </{}> inside <value>",
                        String::from_utf8_lossy(e.name().as_ref())
                    )))
                }
                _ => {}
            }
        }
    }

    /// Parses a typed value whose start tag `name` was consumed.
    fn parse_typed(&mut self, name: &str) -> Result<Value, ProtocolError> {
        match name {
            "int" | "i4" => {
                let text = self.read_text(name)?;
                text.trim()
                    .parse::<i32>()
                    .map(Value::Int)
                    .map_err(|_| ProtocolError::InvalidInt(text))
            }
            "i8" => {
                let text = self.read_text(name)?;
                text.trim()
                    .parse::<i64>()
                    .map(Value::I8)
                    .map_err(|_| ProtocolError::InvalidInt(text))
            }
            "boolean" => {
                let text = self.read_text(name)?;
                match text.trim() {
                    "1" | "true" => Ok(Value::Boolean(true)),
                    "0" | "false" => Ok(Value::Boolean(false)),
                    _ => Err(ProtocolError::InvalidBoolean(text)),
                }
            }
            "string" => self.read_text(name).map(Value::String),
            "double" => {
                let text = self.read_text(name)?;
                match text.trim().parse::<f64>() {
                    Ok(d) if d.is_finite() => Ok(Value::Double(d)),
                    _ => Err(ProtocolError::InvalidDouble(text)),
                }
            }
            "dateTime.iso8601" => {
                let text = self.read_text(name)?;
                Ok(Value::DateTime(text.trim().to_string()))
            }
            "base64" => {
                let text = self.read_text(name)?;
                let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
                base64::engine::general_purpose::STANDARD
                    .decode(compact)
                    .map(Value::Base64)
                    .map_err(|_| ProtocolError::InvalidBase64)
            }
            "nil" => {
                self.read_text(name)?;
                Ok(Value::Nil)
            }
            "array" | "struct" => {
                self.descend()?;
                let value = if name == "array" {
                    self.parse_array()
                } else {
                    self.parse_struct()
                };
                self.depth -= 1;
                value
            }
            other => Err(ProtocolError::Malformed(format!(
                "unknown value type <{}>",
                other
            ))),
        }
    }

    fn parse_array(&mut self) -> Result<Value, ProtocolError> {
        match self.next_node()? {
            Node::Open(name) if name == "data" => {}
            Node::Empty(name) if name == "data" => {
                self.expect_close("array")?;
                return Ok(Value::Array(Vec::new()));
            }
            other => return Err(unexpected(&other, "data")),
        }

        let mut items = Vec::new();
        loop {
            match self.next_node()? {
                Node::Open(name) if name == "value" => items.push(self.parse_value()?),
                Node::Empty(name) if name == "value" => items.push(Value::String(String::new())),
                Node::Close(name) if name == "data" => break,
                other => return Err(unexpected(&other, "value")),
            }
        }

        self.expect_close("array")?;
        Ok(Value::Array(items))
    }

    fn parse_struct(&mut self) -> Result<Value, ProtocolError> {
        let mut members = BTreeMap::new();
        loop {
            match self.next_node()? {
                Node::Open(name) if name == "member" => {
                    let name = match self.next_node()? {
                        Node::Open(found) if found == "name" => self.read_text("name")?,
                        Node::Empty(found) if found == "name" => String::new(),
                        other => return Err(unexpected(&other, "name")),
                    };
                    let value = self.parse_value_element()?;
                    self.expect_close("member")?;
                    members.insert(name, value);
                }
                Node::Close(name) if name == "struct" => return Ok(Value::Struct(members)),
                other => return Err(unexpected(&other, "member")),
            }
        }
    }
}

fn reject_mixed_content(text: &str) -> Result<(), ProtocolError> {
    if text.trim().is_empty() {
        Ok(())
    } else {
        Err(ProtocolError::Malformed(format!(
            "text {:?} mixed with a typed value",
            text
        )))
    }
}

fn empty_typed(name: &str) -> Result<Value, ProtocolError> {
    match name {
        "string" => Ok(Value::String(String::new())),
        "nil" => Ok(Value::Nil),
        "base64" => Ok(Value::Base64(Vec::new())),
        "array" => Ok(Value::Array(Vec::new())),
        "struct" => Ok(Value::Struct(BTreeMap::new())),
        other => Err(ProtocolError::Malformed(format!("empty <{}/>", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn state_struct() -> Value {
        Value::structure([
            ("statecode", Value::Int(1)),
            ("statename", Value::from("RUNNING")),
        ])
    }

    #[test]
    fn test_encode_request_layout() {
        let call = MethodCall::new("supervisor.startProcess")
            .arg("foo")
            .arg(false);
        let xml = Encoder::encode_request(&call).unwrap();
        assert_eq!(
            xml,
            "<?xml version=\"1.0\"?>\n<methodCall><methodName>supervisor.startProcess</methodName>\
             <params><param><value><string>foo</string></value></param>\
             <param><value><boolean>0</boolean></value></param></params></methodCall>"
        );
    }

    #[test]
    fn test_encode_request_without_params() {
        let xml = Encoder::encode_request(&MethodCall::new("supervisor.getState")).unwrap();
        assert!(xml.contains("<methodName>supervisor.getState</methodName><params></params>"));

        let decoded = Decoder::decode_request(&xml).unwrap();
        assert_eq!(decoded.method_name, "supervisor.getState");
        assert!(decoded.params.is_empty());
    }

    #[test]
    fn test_encode_escapes_markup() {
        let call = MethodCall::new("supervisor.sendProcessStdin")
            .arg("web")
            .arg("a < b && c > d\n");
        let xml = Encoder::encode_request(&call).unwrap();
        assert!(xml.contains("<string>a &lt; b &amp;&amp; c &gt; d\n</string>"));

        let decoded = Decoder::decode_request(&xml).unwrap();
        assert_eq!(decoded, call);
    }

    #[test]
    fn test_encode_nested_values() {
        let call = MethodCall::new("system.multicall").arg(vec![Value::structure([
            ("methodName", Value::from("supervisor.getPID")),
            ("params", Value::Array(Vec::new())),
        ])]);
        let xml = Encoder::encode_request(&call).unwrap();
        assert!(xml.contains(
            "<value><array><data><value><struct><member><name>methodName</name>"
        ));
        assert_eq!(Decoder::decode_request(&xml).unwrap(), call);
    }

    #[test]
    fn test_encode_rejects_unrepresentable_values() {
        let err = Encoder::encode_request(&MethodCall::new("x.y").arg(f64::NAN)).unwrap_err();
        assert!(err.is_encoding());

        let err =
            Encoder::encode_request(&MethodCall::new("x.y").arg(f64::INFINITY)).unwrap_err();
        assert!(err.is_encoding());

        let err = Encoder::encode_request(&MethodCall::new("x.y").arg("bell\u{7}")).unwrap_err();
        assert!(err.is_encoding());
        assert!(err.to_string().contains("U+0007"));

        let err = Encoder::encode_request(&MethodCall::new("")).unwrap_err();
        assert!(err.is_encoding());

        let err = Encoder::encode_request(&MethodCall::new("bad<name>")).unwrap_err();
        assert!(err.is_encoding());
    }

    #[test]
    fn test_decode_success_struct() {
        let xml = r#"<?xml version='1.0'?>
<methodResponse>
<params>
<param>
<value><struct>
<member>
<name>statecode</name>
<value><int>1</int></value>
</member>
<member>
<name>statename</name>
<value><string>RUNNING</string></value>
</member>
</struct></value>
</param>
</params>
</methodResponse>
"#;
        let resp = Decoder::decode_response(xml).unwrap();
        assert_eq!(resp, Response::Success(state_struct()));
    }

    #[test]
    fn test_decode_fault() {
        let xml = r#"<?xml version='1.0'?>
<methodResponse>
<fault>
<value><struct>
<member>
<name>faultCode</name>
<value><int>70</int></value>
</member>
<member>
<name>faultString</name>
<value><string>NOT_RUNNING</string></value>
</member>
</struct></value>
</fault>
</methodResponse>
"#;
        let resp = Decoder::decode_response(xml).unwrap();
        assert_eq!(resp, Response::fault(70, "NOT_RUNNING"));
    }

    #[test]
    fn test_decode_fault_without_signature_is_malformed() {
        let xml = "<methodResponse><fault><value><struct>\
                   <member><name>faultCode</name><value><int>1</int></value></member>\
                   </struct></value></fault></methodResponse>";
        assert!(matches!(
            Decoder::decode_response(xml),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_scalar_types() {
        let cases = [
            ("<i4>-12</i4>", Value::Int(-12)),
            ("<int> 7 </int>", Value::Int(7)),
            ("<i8>9000000000</i8>", Value::I8(9_000_000_000)),
            ("<boolean>1</boolean>", Value::Boolean(true)),
            ("<double>-0.5</double>", Value::Double(-0.5)),
            (
                "<dateTime.iso8601>20240102T03:04:05</dateTime.iso8601>",
                Value::DateTime("20240102T03:04:05".to_string()),
            ),
            ("<base64>aGVs\nbG8=</base64>", Value::Base64(b"hello".to_vec())),
            ("<nil/>", Value::Nil),
            ("<string/>", Value::String(String::new())),
            ("<string><![CDATA[<raw>]]></string>", Value::from("<raw>")),
            ("<array><data/></array>", Value::Array(Vec::new())),
            ("<struct></struct>", Value::Struct(BTreeMap::new())),
        ];
        for (inner, expected) in cases {
            let xml = format!(
                "<methodResponse><params><param><value>{}</value></param></params></methodResponse>",
                inner
            );
            let resp = Decoder::decode_response(&xml).unwrap();
            assert_eq!(resp, Response::Success(expected), "decoding {}", inner);
        }
    }

    #[test]
    fn test_decode_untyped_value_is_string() {
        let xml = "<methodResponse><params><param><value>  spaced out  </value>\
                   </param></params></methodResponse>";
        let resp = Decoder::decode_response(xml).unwrap();
        assert_eq!(resp, Response::ok("  spaced out  "));
    }

    #[test]
    fn test_decode_preserves_string_whitespace() {
        let xml = "<methodResponse><params><param><value><string>\n  log line\n</string>\
                   </value></param></params></methodResponse>";
        let resp = Decoder::decode_response(xml).unwrap();
        assert_eq!(resp, Response::ok("\n  log line\n"));
    }

    #[test]
    fn test_decode_entities() {
        let xml = "<methodResponse><params><param><value><string>a &amp; b &lt;c&gt; &#65;</string>\
                   </value></param></params></methodResponse>";
        let resp = Decoder::decode_response(xml).unwrap();
        assert_eq!(resp, Response::ok("a & b <c> A"));
    }

    #[test]
    fn test_decode_process_list() {
        let xml = "<?xml version='1.0'?><!-- supervisord -->\
                   <methodResponse><params><param><value><array><data>\
                   <value><struct>\
                   <member><name>name</name><value><string>web</string></value></member>\
                   <member><name>pid</name><value><int>4242</int></value></member>\
                   </struct></value>\
                   <value><struct>\
                   <member><name>name</name><value><string>worker</string></value></member>\
                   <member><name>pid</name><value><int>0</int></value></member>\
                   </struct></value>\
                   </data></array></value></param></params></methodResponse>";
        let resp = Decoder::decode_response(xml).unwrap();
        let Response::Success(value) = resp else {
            panic!("expected success");
        };
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].get("name").and_then(Value::as_str), Some("web"));
        assert_eq!(items[1].get("pid").and_then(Value::as_i32), Some(0));
    }

    #[test]
    fn test_decode_empty_and_malformed() {
        assert!(matches!(
            Decoder::decode_response(""),
            Err(ProtocolError::EmptyDocument)
        ));
        assert!(matches!(
            Decoder::decode_response("  \n\t "),
            Err(ProtocolError::EmptyDocument)
        ));
        assert!(Decoder::decode_response("<html><body>502</body></html>").is_err());
        assert!(Decoder::decode_response("not xml at all").is_err());
        assert!(Decoder::decode_response("<methodResponse><params>").is_err());
        assert!(matches!(
            Decoder::decode_response("<methodResponse><params/></methodResponse>"),
            Err(ProtocolError::MissingElement("param"))
        ));
        assert!(matches!(
            Decoder::decode_response(
                "<methodResponse><params><param><value><int>x</int></value></param></params></methodResponse>"
            ),
            Err(ProtocolError::InvalidInt(_))
        ));
        assert!(matches!(
            Decoder::decode_response(
                "<methodResponse><params><param><value><blob>1</blob></value></param></params></methodResponse>"
            ),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_rejects_trailing_content() {
        let xml = "<methodResponse><params><param><value><int>1</int></value></param></params>\
                   </methodResponse><methodResponse/>";
        assert!(Decoder::decode_response(xml).is_err());
    }

    #[test]
    fn test_encode_response_roundtrip_fault() {
        let resp = Response::fault(10, "BAD_NAME: nope");
        let xml = Encoder::encode_response(&resp).unwrap();
        assert!(xml.contains("<fault>"));
        assert_eq!(Decoder::decode_response(&xml).unwrap(), resp);
    }

    #[test]
    fn test_encode_preserves_carriage_returns() {
        let call = MethodCall::new("supervisor.sendProcessStdin")
            .arg("web")
            .arg("line\r\n");
        let xml = Encoder::encode_request(&call).unwrap();
        assert!(xml.contains("<string>line&#13;\n</string>"));
        assert!(!xml.contains('\r'));
        assert_eq!(Decoder::decode_request(&xml).unwrap(), call);

        let xml = Encoder::encode_response(&Response::fault(30, "FAILED\r")).unwrap();
        assert!(xml.contains("FAILED&#13;"));
        assert_eq!(
            Decoder::decode_response(&xml).unwrap(),
            Response::fault(30, "FAILED\r")
        );
    }

    fn nested_arrays(depth: usize) -> String {
        format!(
            "<methodResponse><params><param><value>{}<int>1</int>{}</value></param></params></methodResponse>",
            "<array><data><value>".repeat(depth),
            "</value></data></array>".repeat(depth)
        )
    }

    #[test]
    fn test_decode_rejects_excessive_nesting() {
        let err = Decoder::decode_response(&nested_arrays(10_000)).unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed(ref m) if m.contains("nesting too deep")));

        let deep_struct = format!(
            "<methodResponse><params><param><value>{}<nil/>{}</value></param></params></methodResponse>",
            "<struct><member><name>k</name><value>".repeat(MAX_DEPTH + 1),
            "</value></member></struct>".repeat(MAX_DEPTH + 1)
        );
        assert!(matches!(
            Decoder::decode_response(&deep_struct),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_accepts_nesting_up_to_limit() {
        let resp = Decoder::decode_response(&nested_arrays(MAX_DEPTH)).unwrap();
        let mut value = match resp {
            Response::Success(value) => value,
            other => panic!("unexpected response: {other:?}"),
        };
        for _ in 0..MAX_DEPTH {
            value = value.as_array().unwrap()[0].clone();
        }
        assert_eq!(value, Value::Int(1));
    }

    /// Strings mixing markup, line breaks, tabs and non-ASCII text.
    const TEXT: &str = "[ -~\r\n\téüß€中文😀]";

    fn arb_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            any::<i32>().prop_map(Value::Int),
            any::<i64>().prop_map(Value::I8),
            any::<bool>().prop_map(Value::Boolean),
            proptest::string::string_regex(&format!("{}{{0,24}}", TEXT))
                .unwrap()
                .prop_map(Value::String),
            (-1.0e9f64..1.0e9f64).prop_map(Value::Double),
            "[0-9]{8}T[0-9]{2}:[0-9]{2}:[0-9]{2}".prop_map(Value::DateTime),
            proptest::collection::vec(any::<u8>(), 0..32).prop_map(Value::Base64),
            Just(Value::Nil),
        ];
        leaf.prop_recursive(3, 32, 6, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                proptest::collection::btree_map("[a-zA-Z_]{1,10}", inner, 0..6)
                    .prop_map(Value::Struct),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_request_roundtrip(
            method in "[a-z]{1,8}\\.[a-zA-Z]{1,16}",
            params in proptest::collection::vec(arb_value(), 0..5),
        ) {
            let call = MethodCall::new(method).with_params(params);
            let xml = Encoder::encode_request(&call).unwrap();
            let decoded = Decoder::decode_request(&xml).unwrap();
            prop_assert_eq!(decoded, call);
        }

        #[test]
        fn prop_success_never_decodes_as_fault(value in arb_value()) {
            let xml = Encoder::encode_response(&Response::Success(value.clone())).unwrap();
            let decoded = Decoder::decode_response(&xml).unwrap();
            prop_assert!(decoded.is_ok());
            prop_assert_eq!(decoded, Response::Success(value));
        }

        #[test]
        fn prop_fault_never_decodes_as_success(
            code in any::<i32>(),
            message in proptest::string::string_regex(&format!("{}{{0,32}}", TEXT)).unwrap(),
        ) {
            let xml = Encoder::encode_response(&Response::fault(code, message.clone())).unwrap();
            let decoded = Decoder::decode_response(&xml).unwrap();
            prop_assert!(decoded.is_fault());
            prop_assert_eq!(decoded.into_result(), Err(Fault::new(code, message)));
        }
    }
}
