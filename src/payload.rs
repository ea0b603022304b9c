//! Request body parsing.
//!
//! PUT and DELETE requests carry their parameters in the body, one entry per
//! line, each framed as `[key]:=:[value]`:
//!
//! ```text
//! [name::str]:=:[Alice]
//! [age::int]:=:[21]
//! ```

use thiserror::Error;

/// Separates the bracketed key from the bracketed value on a body line.
pub const ENTRY_DELIMITER: &str = "]:=:[";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("Request body is not valid UTF-8")]
    NotUtf8,

    #[error("Malformed body entry on line {line}: expected '[key]:=:[value]', got '{entry}'")]
    MalformedEntry { line: usize, entry: String },
}

/// Parses a request body into key/value pairs, in body order.
///
/// An empty body yields no pairs. Blank lines are skipped. When a key repeats,
/// the later entry wins.
///
/// # Errors
///
/// Returns [`PayloadError::NotUtf8`] for non UTF-8 bodies and
/// [`PayloadError::MalformedEntry`] for a line that is not `[key]:=:[value]`.
pub fn parse_payload(body: &[u8]) -> Result<Vec<(String, String)>, PayloadError> {
    let text = std::str::from_utf8(body).map_err(|_| PayloadError::NotUtf8)?;
    let mut entries: Vec<(String, String)> = Vec::new();

    for (index, raw_line) in text.split('\n').enumerate() {
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
        if line.trim().is_empty() {
            continue;
        }

        let (key, value) = parse_entry(line).ok_or_else(|| PayloadError::MalformedEntry {
            line: index + 1,
            entry: line.to_string(),
        })?;

        if let Some(existing) = entries.iter_mut().find(|(k, _)| k == key) {
            existing.1 = value.to_string();
        } else {
            entries.push((key.to_string(), value.to_string()));
        }
    }

    Ok(entries)
}

fn parse_entry(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(ENTRY_DELIMITER)?;
    let key = key.strip_prefix('[')?;
    let value = value.strip_suffix(']')?;
    Some((key, value))
}

/// Formats key/value pairs as a request body.
pub fn encode_payload<I, K, V>(entries: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    entries
        .into_iter()
        .map(|(key, value)| format!("[{}{ENTRY_DELIMITER}{}]", key.as_ref(), value.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}
