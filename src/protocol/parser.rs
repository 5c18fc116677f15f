//! Request parsing
//!
//! Routes a raw HTTP request to an avatar API operation and decodes form
//! bodies. Both `multipart/form-data` (what the browser client sends) and
//! `application/x-www-form-urlencoded` are supported.

use std::collections::HashMap;

use crate::error::ProtocolError;
use crate::protocol::commands::{HttpRequest, Request};

/// Parses a raw HTTP request into an avatar API operation.
///
/// Coordinate fields accept any integer; values outside the `i32` range are
/// saturated here and clamped onto the grid by the registry. The id must be
/// a non-negative integer that fits in `u32`.
pub fn parse_request(request: &HttpRequest) -> Result<Request, ProtocolError> {
    match (request.method.as_str(), request.path.as_str()) {
        ("POST", "/avatar/new") => Ok(Request::NewAvatar),
        ("GET", "/avatar/list") => Ok(Request::ListAvatars),
        ("POST", "/avatar/update") => {
            let fields = parse_form(request.content_type.as_deref(), &request.body)?;
            Ok(Request::UpdateAvatar {
                id: require_id(&fields)?,
                x: require_coord(&fields, "x")?,
                y: require_coord(&fields, "y")?,
            })
        }
        ("POST", "/avatar/speak") => {
            let fields = parse_form(request.content_type.as_deref(), &request.body)?;
            Ok(Request::Speak {
                id: require_id(&fields)?,
                // A form without a text field means an empty utterance.
                text: fields.get("text").cloned().unwrap_or_default(),
            })
        }
        (method, path) => Err(ProtocolError::UnknownRoute(format!("{} {}", method, path))),
    }
}

/// Decodes a form body into a field map based on the content type.
pub fn parse_form(
    content_type: Option<&str>,
    body: &[u8],
) -> Result<HashMap<String, String>, ProtocolError> {
    let content_type = content_type.unwrap_or("application/x-www-form-urlencoded");

    if let Some(params) = content_type.strip_prefix("multipart/form-data") {
        let boundary = params
            .split(';')
            .map(str::trim)
            .find_map(|p| p.strip_prefix("boundary="))
            .map(|b| b.trim_matches('"'))
            .ok_or_else(|| {
                ProtocolError::MalformedRequest("multipart body without boundary".into())
            })?;
        parse_multipart(boundary, body)
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        Ok(parse_urlencoded(&String::from_utf8_lossy(body)))
    } else {
        Err(ProtocolError::UnsupportedContentType(
            content_type.to_string(),
        ))
    }
}

/// Decodes an `application/x-www-form-urlencoded` body.
fn parse_urlencoded(body: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    for pair in body.split('&') {
        if pair.is_empty() {
            continue;
        }
        let mut parts = pair.splitn(2, '=');
        let name = percent_decode(parts.next().unwrap_or(""));
        let value = percent_decode(parts.next().unwrap_or(""));
        fields.insert(name, value);
    }
    fields
}

/// Decodes a `multipart/form-data` body.
///
/// Only text fields are expected; file parts would be stored like any other
/// field. Chat text passes through verbatim.
fn parse_multipart(boundary: &str, body: &[u8]) -> Result<HashMap<String, String>, ProtocolError> {
    let text = String::from_utf8_lossy(body);
    let delimiter = format!("--{}", boundary);

    let mut fields = HashMap::new();
    for part in text.split(delimiter.as_str()).skip(1) {
        // The final delimiter carries a trailing "--".
        if part == "--" || part.starts_with("--\r\n") {
            break;
        }
        let part = part
            .strip_prefix("\r\n")
            .ok_or_else(|| ProtocolError::MalformedRequest("malformed multipart part".into()))?;

        let (headers, value) = part.split_once("\r\n\r\n").ok_or_else(|| {
            ProtocolError::MalformedRequest("multipart part without blank line".into())
        })?;

        let name = headers
            .lines()
            .find(|l| l.to_ascii_lowercase().starts_with("content-disposition:"))
            .and_then(|l| {
                l.split(';')
                    .map(str::trim)
                    .find_map(|p| p.strip_prefix("name="))
            })
            .map(|n| n.trim_matches('"').to_string())
            .ok_or_else(|| {
                ProtocolError::MalformedRequest("multipart part without field name".into())
            })?;

        // Field values end with the CRLF preceding the next delimiter.
        let value = value.strip_suffix("\r\n").unwrap_or(value);
        fields.insert(name, value.to_string());
    }

    Ok(fields)
}

/// Decodes percent escapes and `+` in a urlencoded component.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => match (hex_val(bytes.get(i + 1)), hex_val(bytes.get(i + 2))) {
                (Some(hi), Some(lo)) => {
                    out.push(hi * 16 + lo);
                    i += 3;
                }
                // A dangling escape passes through untouched.
                _ => {
                    out.push(b'%');
                    i += 1;
                }
            },
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_val(byte: Option<&u8>) -> Option<u8> {
    byte.and_then(|b| (*b as char).to_digit(16)).map(|d| d as u8)
}

fn require_id(fields: &HashMap<String, String>) -> Result<u32, ProtocolError> {
    let raw = fields
        .get("id")
        .ok_or_else(|| ProtocolError::MissingField("id".into()))?;
    raw.trim()
        .parse::<u32>()
        .map_err(|_| ProtocolError::InvalidField {
            field: "id".into(),
            value: raw.clone(),
        })
}

fn require_coord(fields: &HashMap<String, String>, name: &str) -> Result<i32, ProtocolError> {
    let raw = fields
        .get(name)
        .ok_or_else(|| ProtocolError::MissingField(name.into()))?;
    // Values beyond i32 are saturated; the registry clamps onto the grid.
    raw.trim()
        .parse::<i64>()
        .map(|v| v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
        .map_err(|_| ProtocolError::InvalidField {
            field: name.into(),
            value: raw.clone(),
        })
}
