//! Internal helper macros.

/// Returns early with `$error` unless `$predicate` holds.
///
/// ```ignore
/// ensure!(length <= max_body_size, ParseError::too_large_body(length, max_body_size));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
