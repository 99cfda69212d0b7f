//! Path template compilation.
//!
//! A template such as `/users/{user_id}/posts/{post_id}` becomes the anchored
//! pattern `^/users/([^/]+)/posts/([^/]+)$` plus the variable names
//! `["user_id", "post_id"]` in template order. Literal template text is
//! escaped, so it only ever matches itself.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::PatternError;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(.*?)\}").expect("placeholder pattern must compile"));

/// Replacement for every placeholder: one or more non-slash characters
const VARIABLE_CAPTURE: &str = "([^/]+)";

/// A template compiled into a matchable pattern
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    path: String,
    regex: Regex,
    variables: Vec<String>,
}

impl CompiledPattern {
    /// The normalized template this pattern was compiled from
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Placeholder names in template order, duplicates included
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Whether `path` has the shape of this template
    #[inline]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// The captured values of `path` paired with their variable names, in template order
    pub fn captures<'p>(&self, path: &'p str) -> Option<Vec<(&str, &'p str)>> {
        let captures = self.regex.captures(path)?;
        Some(
            self.variables
                .iter()
                .zip(captures.iter().skip(1))
                .filter_map(|(name, value)| value.map(|value| (name.as_str(), value.as_str())))
                .collect(),
        )
    }
}

/// Compiles a path template into an anchored pattern and its variable names.
///
/// The template is normalized first, see [`normalize_path`].
pub fn compile(template: &str) -> Result<CompiledPattern, PatternError> {
    let path = normalize_path(template);

    let mut pattern = String::with_capacity(path.len() + 16);
    let mut variables = Vec::new();
    let mut literal_start = 0;

    pattern.push('^');
    for captures in PLACEHOLDER.captures_iter(&path) {
        let (Some(placeholder), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };

        pattern.push_str(&regex::escape(&path[literal_start..placeholder.start()]));
        pattern.push_str(VARIABLE_CAPTURE);
        variables.push(name.as_str().to_owned());
        literal_start = placeholder.end();
    }
    pattern.push_str(&regex::escape(&path[literal_start..]));
    pattern.push('$');

    let regex = Regex::new(&pattern).map_err(|source| PatternError::Compile { template: template.to_owned(), source })?;

    let captures = regex.captures_len() - 1;
    if captures != variables.len() {
        return Err(PatternError::CaptureMismatch { template: template.to_owned(), variables: variables.len(), captures });
    }

    Ok(CompiledPattern { path, regex, variables })
}

/// Strips one trailing slash and makes sure the path starts with exactly one slash.
///
/// `""`, `"/"` and `"//"` all normalize to `"/"`; `"users/"` becomes `"/users"`.
pub fn normalize_path(path: &str) -> String {
    let path = path.strip_suffix('/').unwrap_or(path);
    let path = path.trim_start_matches('/');

    let mut normalized = String::with_capacity(path.len() + 1);
    normalized.push('/');
    normalized.push_str(path);
    normalized
}

/// Joins a group prefix and a route path with a single slash, then normalizes.
pub fn join_paths(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    normalize_path(&format!("{prefix}/{path}"))
}
