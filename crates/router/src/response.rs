//! The response side of a request: the transport boundary a context writes
//! through, and the payload shapes handlers can send.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use bytes::Bytes;
use http::Response;
use serde::Serialize;

/// Accepts the single response of a request.
///
/// [`RequestContext`](crate::RequestContext) calls `write` at most once.
#[cfg_attr(test, mockall::automock)]
pub trait ResponseWriter {
    fn write(&mut self, response: Response<Bytes>);
}

/// A [`ResponseWriter`] that keeps the response in memory.
///
/// A request whose handler chain never sends anything turns into
/// `200 OK` with an empty body.
#[derive(Debug, Default)]
pub struct BufferedResponse {
    response: Option<Response<Bytes>>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_written(&self) -> bool {
        self.response.is_some()
    }

    pub fn into_response(self) -> Response<Bytes> {
        self.response.unwrap_or_else(|| Response::new(Bytes::new()))
    }
}

impl ResponseWriter for BufferedResponse {
    fn write(&mut self, response: Response<Bytes>) {
        if self.response.is_none() {
            self.response = Some(response);
        }
    }
}

/// Data a handler can send as a success response.
///
/// Structured data (maps, sequences, JSON objects) is sent as
/// `application/json`, everything else as `text/plain`, unless the handler
/// already set a `Content-Type` response header.
pub trait ResponseData {
    /// Whether the data defaults to a JSON body
    fn is_structured(&self) -> bool;

    fn to_json(&self) -> Result<Bytes, serde_json::Error>;

    fn to_text(&self) -> Result<Bytes, serde_json::Error>;
}

impl<T: ResponseData + ?Sized> ResponseData for &T {
    #[inline]
    fn is_structured(&self) -> bool {
        (**self).is_structured()
    }

    #[inline]
    fn to_json(&self) -> Result<Bytes, serde_json::Error> {
        (**self).to_json()
    }

    #[inline]
    fn to_text(&self) -> Result<Bytes, serde_json::Error> {
        (**self).to_text()
    }
}

macro_rules! text_data {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ResponseData for $ty {
                fn is_structured(&self) -> bool {
                    false
                }

                fn to_json(&self) -> Result<Bytes, serde_json::Error> {
                    serde_json::to_vec(self).map(Bytes::from)
                }

                fn to_text(&self) -> Result<Bytes, serde_json::Error> {
                    Ok(Bytes::from(self.to_string()))
                }
            }
        )*
    };
}

text_data!(str, String, bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

/// An empty body
impl ResponseData for () {
    fn is_structured(&self) -> bool {
        false
    }

    fn to_json(&self) -> Result<Bytes, serde_json::Error> {
        Ok(Bytes::from_static(b"null"))
    }

    fn to_text(&self) -> Result<Bytes, serde_json::Error> {
        Ok(Bytes::new())
    }
}

macro_rules! structured_data {
    () => {
        fn is_structured(&self) -> bool {
            true
        }

        fn to_json(&self) -> Result<Bytes, serde_json::Error> {
            serde_json::to_vec(self).map(Bytes::from)
        }

        fn to_text(&self) -> Result<Bytes, serde_json::Error> {
            self.to_json()
        }
    };
}

impl<K: Serialize + Eq + Hash, V: Serialize, S: BuildHasher> ResponseData for HashMap<K, V, S> {
    structured_data!();
}

impl<K: Serialize, V: Serialize> ResponseData for BTreeMap<K, V> {
    structured_data!();
}

impl<T: Serialize> ResponseData for Vec<T> {
    structured_data!();
}

impl<T: Serialize> ResponseData for [T] {
    structured_data!();
}

impl<T: Serialize, const N: usize> ResponseData for [T; N] {
    fn is_structured(&self) -> bool {
        true
    }

    fn to_json(&self) -> Result<Bytes, serde_json::Error> {
        serde_json::to_vec(self.as_slice()).map(Bytes::from)
    }

    fn to_text(&self) -> Result<Bytes, serde_json::Error> {
        self.to_json()
    }
}

/// Objects and arrays are structured; a JSON string is sent raw as text.
impl ResponseData for serde_json::Value {
    fn is_structured(&self) -> bool {
        matches!(self, serde_json::Value::Object(_) | serde_json::Value::Array(_))
    }

    fn to_json(&self) -> Result<Bytes, serde_json::Error> {
        serde_json::to_vec(self).map(Bytes::from)
    }

    fn to_text(&self) -> Result<Bytes, serde_json::Error> {
        match self {
            serde_json::Value::String(s) => Ok(Bytes::from(s.clone())),
            other => Ok(Bytes::from(other.to_string())),
        }
    }
}

/// Sends any [`Serialize`] value as structured JSON.
///
/// ```
/// use micro_router::Json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// let _user = Json(User { id: 7, name: "alice".into() });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T: Serialize> ResponseData for Json<T> {
    fn is_structured(&self) -> bool {
        true
    }

    fn to_json(&self) -> Result<Bytes, serde_json::Error> {
        serde_json::to_vec(&self.0).map(Bytes::from)
    }

    fn to_text(&self) -> Result<Bytes, serde_json::Error> {
        self.to_json()
    }
}
