// ABOUTME: Environment variable expansion applied to raw config text before parsing.
// ABOUTME: Supports ${VAR} and ${VAR:-default}; a bare $ is left untouched.

use crate::error::{Error, Result};

/// Expand `${VAR}` and `${VAR:-default}` references in `raw`.
///
/// Unset variables without a default are an error so that a missing secret
/// never silently deploys an empty value.
pub fn expand_env(raw: &str) -> Result<String> {
    expand_with(raw, |name| std::env::var(name).ok())
}

pub(crate) fn expand_with<F>(raw: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}').ok_or_else(|| {
            Error::InvalidConfig(format!("unterminated variable reference: ${{{after}"))
        })?;
        let reference = &after[..end];

        let (name, default) = match reference.split_once(":-") {
            Some((name, default)) => (name, Some(default)),
            None => (reference, None),
        };

        if name.is_empty() {
            return Err(Error::InvalidConfig("empty variable reference".to_string()));
        }

        match lookup(name).or_else(|| default.map(str::to_string)) {
            Some(value) => out.push_str(&value),
            None => return Err(Error::MissingEnvVar(name.to_string())),
        }

        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}
