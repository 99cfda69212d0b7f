//! Eager form body parsing.
//!
//! Bodies sent as `application/x-www-form-urlencoded` or
//! `multipart/form-data` are parsed when the request context is created.
//! Larger bodies than [`MAX_FORM_BODY_SIZE`] are not parsed.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::HeaderMap;

use crate::content_type::{parse_mime, ContentType};
use crate::error::FormError;

/// Largest body parsed as a form: 32 MiB
pub const MAX_FORM_BODY_SIZE: usize = 32 << 20;

/// Fields and uploaded files of a form body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    fields: Vec<(String, String)>,
    files: Vec<FilePart>,
}

/// A multipart part carrying a `filename`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    name: String,
    filename: String,
    content_type: Option<String>,
    data: Bytes,
}

impl FilePart {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

impl Form {
    /// Parses `body` according to the request's `Content-Type`.
    ///
    /// Bodies that are neither url-encoded nor multipart give an empty form.
    pub fn parse(headers: &HeaderMap, body: &Bytes) -> Result<Self, FormError> {
        let Some(value) = headers.get(CONTENT_TYPE) else {
            return Ok(Self::default());
        };

        let content_type = ContentType::from_header(value);
        if matches!(content_type, Some(ContentType::WwwForm | ContentType::FormData)) && body.len() > MAX_FORM_BODY_SIZE {
            return Err(FormError::TooLarge { size: body.len(), max_size: MAX_FORM_BODY_SIZE });
        }

        match content_type {
            Some(ContentType::WwwForm) => {
                let fields = serde_urlencoded::from_bytes::<Vec<(String, String)>>(body)?;
                Ok(Self { fields, files: Vec::new() })
            }
            Some(ContentType::FormData) => {
                let boundary = parse_mime(value)
                    .and_then(|parsed| parsed.get_param(mime::BOUNDARY).map(|boundary| boundary.as_str().to_owned()))
                    .ok_or(FormError::MissingBoundary)?;
                parse_multipart(body, &boundary)
            }
            _ => Ok(Self::default()),
        }
    }

    /// The first value of field `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }

    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields.iter().filter(move |(key, _)| key == name).map(|(_, value)| value.as_str())
    }

    /// The first uploaded file of field `name`
    pub fn file(&self, name: &str) -> Option<&FilePart> {
        self.files.iter().find(|file| file.name == name)
    }

    pub fn files(&self) -> &[FilePart] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.files.is_empty()
    }
}

fn parse_multipart(body: &[u8], boundary: &str) -> Result<Form, FormError> {
    let delimiter = format!("--{boundary}");
    let part_end = format!("\r\n--{boundary}");

    let mut form = Form::default();

    let start = find(body, delimiter.as_bytes()).ok_or(FormError::InvalidMultipart { reason: "no opening boundary" })?;
    let mut rest = &body[start + delimiter.len()..];

    loop {
        if rest.starts_with(b"--") {
            return Ok(form);
        }

        rest = rest.strip_prefix(b"\r\n").ok_or(FormError::InvalidMultipart { reason: "boundary not followed by CRLF" })?;

        let headers_end = find(rest, b"\r\n\r\n").ok_or(FormError::InvalidMultipart { reason: "unterminated part headers" })?;
        let headers = std::str::from_utf8(&rest[..headers_end])
            .map_err(|_e| FormError::InvalidMultipart { reason: "part headers are not utf-8" })?;
        rest = &rest[headers_end + 4..];

        let data_end = find(rest, part_end.as_bytes()).ok_or(FormError::InvalidMultipart { reason: "no closing boundary" })?;
        let data = &rest[..data_end];
        rest = &rest[data_end + part_end.len()..];

        let mut disposition = None;
        let mut content_type = None;
        for line in headers.split("\r\n") {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            if name.trim().eq_ignore_ascii_case("content-disposition") {
                disposition = Some(parse_disposition(value.trim())?);
            } else if name.trim().eq_ignore_ascii_case("content-type") {
                content_type = Some(value.trim().to_owned());
            }
        }

        let (name, filename) = disposition.ok_or(FormError::MissingContentDisposition)?;
        match filename {
            Some(filename) => form.files.push(FilePart { name, filename, content_type, data: Bytes::copy_from_slice(data) }),
            None => form.fields.push((name, String::from_utf8_lossy(data).into_owned())),
        }
    }
}

/// Parses `form-data; name="field"; filename="a.txt"` into the name and optional filename
fn parse_disposition(value: &str) -> Result<(String, Option<String>), FormError> {
    let mut params = value.split(';').map(str::trim);

    if !params.next().is_some_and(|kind| kind.eq_ignore_ascii_case("form-data")) {
        return Err(FormError::InvalidMultipart { reason: "part disposition is not form-data" });
    }

    let mut name = None;
    let mut filename = None;
    for param in params {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"').to_owned();
        match key.trim() {
            "name" => name = Some(value),
            "filename" => filename = Some(value),
            _ => {}
        }
    }

    let name = name.ok_or(FormError::InvalidMultipart { reason: "part disposition has no name" })?;
    Ok((name, filename))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}
