use crate::utils::error::{AuditError, Result};
use std::path::Path;

pub const DEFAULT_PREFIXES: &[&str] = &["air_fare", "air_fares"];
pub const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "xlsx"];

/// True when `name` starts with one of `prefixes` and carries one of
/// `extensions`. Both comparisons ignore case.
pub fn is_candidate(name: &str, prefixes: &[String], extensions: &[String]) -> bool {
    let lower = name.to_lowercase();
    let prefix_ok = prefixes
        .iter()
        .any(|p| lower.starts_with(&p.to_lowercase()));
    let ext_ok = Path::new(&lower)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
        .unwrap_or(false);
    prefix_ok && ext_ok
}

/// Picks the single input file from a directory listing.
pub fn resolve_input(names: &[String], prefixes: &[String], extensions: &[String]) -> Result<String> {
    let mut candidates: Vec<&String> = names
        .iter()
        .filter(|n| is_candidate(n, prefixes, extensions))
        .collect();
    candidates.sort();

    match candidates.as_slice() {
        [single] => Ok((*single).clone()),
        [] => Err(AuditError::input_not_found(format!(
            "no file named {}*.{{{}}} in the data directory",
            prefixes.join("*/"),
            extensions.join(",")
        ))),
        many => Err(AuditError::input_not_found(format!(
            "{} candidate files found ({}); expected exactly one",
            many.len(),
            many.iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}
