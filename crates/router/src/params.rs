//! Path variables and query values of a request.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use tracing::warn;

/// Variables extracted from the request path, keyed by placeholder name.
///
/// Binding assigns by name, so when a template repeats a name the last
/// occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    params: HashMap<String, String>,
}

impl PathParams {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Gets the value of a path variable by its name
    #[inline]
    pub fn get(&self, key: impl AsRef<str>) -> Option<&str> {
        self.params.get(key.as_ref()).map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<N, V> FromIterator<(N, V)> for PathParams
where
    N: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut params = HashMap::new();
        for (name, value) in iter {
            params.insert(name.into(), value.into());
        }
        Self { params }
    }
}

/// Decoded query string values, in the order they appear.
///
/// A name may occur several times; [`Query::get`] returns the first value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    /// Parses a raw query string such as `a=1&b=2&a=3`
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.filter(|raw| !raw.is_empty()) else {
            return Self::default();
        };

        match serde_urlencoded::from_str::<Vec<(String, String)>>(raw) {
            Ok(pairs) => Self { pairs },
            Err(e) => {
                warn!(cause = %e, query = raw, "can't parse query string, ignore it");
                Self::default()
            }
        }
    }

    /// The first value of `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }

    /// Every value of `name`, in order
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs.iter().filter(move |(key, _)| key == name).map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pairs.iter().any(|(key, _)| key == name)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Deserializes the pairs into `T`
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, serde_urlencoded::de::Error> {
        // pairs came out of serde_urlencoded, so they always encode back
        let raw = serde_urlencoded::to_string(&self.pairs).unwrap_or_default();
        serde_urlencoded::from_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn path_params_last_binding_wins() {
        let params: PathParams = [("id", "1"), ("id", "2"), ("name", "bob")].into_iter().collect();

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("id"), Some("2"));
        assert_eq!(params.get("name"), Some("bob"));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn query_multi_values() {
        let query = Query::parse(Some("a=1&b=hello%20world&a=3"));

        assert_eq!(query.len(), 3);
        assert_eq!(query.get("a"), Some("1"));
        assert_eq!(query.get_all("a").collect::<Vec<_>>(), vec!["1", "3"]);
        assert_eq!(query.get("b"), Some("hello world"));
        assert!(!query.contains("c"));
    }

    #[test]
    fn query_empty() {
        assert!(Query::parse(None).is_empty());
        assert!(Query::parse(Some("")).is_empty());
    }

    #[test]
    fn query_deserialize() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Paging {
            page: u32,
            size: Option<u32>,
        }

        let query = Query::parse(Some("page=2"));
        assert_eq!(query.deserialize::<Paging>().unwrap(), Paging { page: 2, size: None });

        let query = Query::parse(Some("page=abc"));
        assert!(query.deserialize::<Paging>().is_err());
    }
}
