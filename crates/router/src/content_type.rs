//! The fixed table of content types the router encodes and decodes.
//!
//! Logical names map to wire MIME strings:
//!
//! | name       | MIME                                |
//! |------------|-------------------------------------|
//! | `JSON`     | `application/json`                  |
//! | `text`     | `text/plain`                        |
//! | `formData` | `multipart/form-data`               |
//! | `wwwForm`  | `application/x-www-form-urlencoded` |

use http::HeaderValue;
use mime::Mime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Json,
    Text,
    FormData,
    WwwForm,
}

/// Every registered content type with its logical name
pub const CONTENT_TYPES: [(&str, ContentType); 4] = [
    ("JSON", ContentType::Json),
    ("text", ContentType::Text),
    ("formData", ContentType::FormData),
    ("wwwForm", ContentType::WwwForm),
];

impl ContentType {
    pub const fn as_str(self) -> &'static str {
        match self {
            ContentType::Json => "application/json",
            ContentType::Text => "text/plain",
            ContentType::FormData => "multipart/form-data",
            ContentType::WwwForm => "application/x-www-form-urlencoded",
        }
    }

    /// The logical name under which this content type is registered
    pub const fn name(self) -> &'static str {
        match self {
            ContentType::Json => "JSON",
            ContentType::Text => "text",
            ContentType::FormData => "formData",
            ContentType::WwwForm => "wwwForm",
        }
    }

    /// Looks up a content type by its logical name, e.g. `"JSON"`
    pub fn from_name(name: &str) -> Option<Self> {
        CONTENT_TYPES.iter().find(|(registered, _)| *registered == name).map(|(_, content_type)| *content_type)
    }

    /// Resolves a `Content-Type` header value, ignoring parameters such as `charset` or `boundary`
    pub fn from_header(value: &HeaderValue) -> Option<Self> {
        let mime = parse_mime(value)?;
        CONTENT_TYPES
            .iter()
            .map(|(_, content_type)| *content_type)
            .find(|content_type| mime.essence_str().eq_ignore_ascii_case(content_type.as_str()))
    }

    pub const fn header_value(self) -> HeaderValue {
        HeaderValue::from_static(self.as_str())
    }
}

pub(crate) fn parse_mime(value: &HeaderValue) -> Option<Mime> {
    value.to_str().ok()?.parse::<Mime>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        assert_eq!(ContentType::from_name("JSON"), Some(ContentType::Json));
        assert_eq!(ContentType::from_name("wwwForm").map(ContentType::as_str), Some("application/x-www-form-urlencoded"));
        assert_eq!(ContentType::from_name("json"), None);
    }

    #[test]
    fn resolve_header_with_parameters() {
        let value = HeaderValue::from_static("application/json; charset=utf-8");
        assert_eq!(ContentType::from_header(&value), Some(ContentType::Json));

        let value = HeaderValue::from_static("multipart/form-data; boundary=----abc");
        assert_eq!(ContentType::from_header(&value), Some(ContentType::FormData));

        let value = HeaderValue::from_static("image/png");
        assert_eq!(ContentType::from_header(&value), None);
    }

    #[test]
    fn names_round_trip_through_table() {
        for (name, content_type) in CONTENT_TYPES {
            assert_eq!(content_type.name(), name);
        }
    }
}
