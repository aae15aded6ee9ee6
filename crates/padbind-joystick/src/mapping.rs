//! Text edits on SDL-style mapping strings:
//! `GUID,Name,name:token,name:token,...,platform:X,`
//!
//! All functions are pure and return a new string.

use std::ops::Range;

const PLATFORM_KEY: &str = "platform:";

/// A `name:token,` clause located in a mapping string.
struct Clause<'a> {
    /// Byte range of the whole clause including its trailing comma.
    range: Range<usize>,
    name: &'a str,
}

/// Byte index of the comma that ends the name field, or the string length
/// when the mapping has no binding section. Clauses only start after it.
fn header_end(mapping: &str) -> usize {
    mapping
        .match_indices(',')
        .nth(1)
        .map_or(mapping.len(), |(pos, _)| pos)
}

/// Finds the first clause whose value is exactly `token` and whose name
/// satisfies `accept`.
fn find_clause<'a>(
    mapping: &'a str,
    token: &str,
    accept: impl Fn(&str) -> bool,
) -> Option<Clause<'a>> {
    if token.is_empty() {
        return None;
    }
    let bytes = mapping.as_bytes();
    let body = header_end(mapping);
    for (pos, _) in mapping.match_indices(token) {
        let after = pos + token.len();
        let bound = pos > 0 && bytes[pos - 1] == b':';
        let terminated = after == mapping.len() || bytes[after] == b',';
        if !bound || !terminated {
            continue;
        }
        let Some(sep) = mapping[..pos].rfind(',') else {
            continue;
        };
        // GUID and name fields are not clauses.
        if sep < body {
            continue;
        }
        let start = sep + 1;
        let end = if after == mapping.len() { after } else { after + 1 };
        let name = &mapping[start..pos - 1];
        if accept(name) {
            return Some(Clause {
                range: start..end,
                name,
            });
        }
    }
    None
}

/// Removes the clause bound to `token`, e.g. `guide:b10,` for `b10`.
pub fn remove_binding(mapping: &str, token: &str) -> String {
    let mut out = mapping.to_string();
    if let Some(clause) = find_clause(mapping, token, |_| true) {
        out.replace_range(clause.range, "");
    }
    out
}

/// Name of the logical input currently bound to `token`, if any.
pub fn binding_for_token<'a>(mapping: &'a str, token: &str) -> Option<&'a str> {
    find_clause(mapping, token, |_| true).map(|clause| clause.name)
}

/// Sets `name:token`, replacing an existing clause for `name` in place or
/// inserting it before the `platform:` clause.
pub fn upsert_binding(mapping: &str, name: &str, token: &str) -> String {
    let clause = format!("{name}:{token},");
    let mut out = mapping.to_string();

    let body = header_end(mapping);
    if let Some(pos) = mapping[body..].find(&format!(",{name}:")) {
        let start = body + pos + 1;
        let end = mapping[start..]
            .find(',')
            .map(|offset| start + offset + 1)
            .unwrap_or(mapping.len());
        out.replace_range(start..end, &clause);
    } else if let Some(pos) = platform_clause_start(mapping) {
        out.insert_str(pos, &clause);
    } else {
        if !out.is_empty() && !out.ends_with(',') {
            out.push(',');
        }
        out.push_str(&clause);
    }
    out
}

/// Binds `token` to `name`, first removing every clause that binds the same
/// token to another logical input. Applying it twice equals applying it once.
pub fn rebind(mapping: &str, name: &str, token: &str) -> String {
    let mut out = mapping.to_string();
    while let Some(clause) = find_clause(&out, token, |bound| bound != name) {
        out.replace_range(clause.range, "");
    }
    upsert_binding(&out, name, token)
}

fn platform_clause_start(mapping: &str) -> Option<usize> {
    let body = header_end(mapping);
    mapping[body..]
        .find(&format!(",{PLATFORM_KEY}"))
        .map(|pos| body + pos + 1)
}

pub fn ensure_trailing_comma(mapping: &str) -> String {
    let mut out = mapping.to_string();
    if !out.ends_with(',') {
        out.push(',');
    }
    out
}

/// Appends `platform:<platform>,` unless the mapping already names one.
pub fn ensure_platform_suffix(mapping: &str, platform: &str) -> String {
    if platform_clause_start(mapping).is_some() {
        return mapping.to_string();
    }
    let mut out = ensure_trailing_comma(mapping);
    out.push_str(PLATFORM_KEY);
    out.push_str(platform);
    out.push(',');
    out
}

/// Stable textual form of a mapping read back from the backend.
pub fn canonicalize(mapping: &str, platform: &str) -> String {
    ensure_platform_suffix(&ensure_trailing_comma(mapping), platform)
}

/// The GUID field of a mapping line.
pub fn guid_prefix(mapping: &str) -> &str {
    mapping.split_once(',').map_or(mapping, |(guid, _)| guid)
}

/// Splits off the `platform:X` clause. Returns the platform name, if any,
/// and the line without that clause.
pub fn strip_platform(mapping: &str) -> (Option<&str>, String) {
    let Some(start) = platform_clause_start(mapping) else {
        return (None, mapping.to_string());
    };
    let value_start = start + PLATFORM_KEY.len();
    let (value_end, clause_end) = match mapping[value_start..].find(',') {
        Some(offset) => (value_start + offset, value_start + offset + 1),
        None => (mapping.len(), mapping.len()),
    };
    let mut stripped = mapping.to_string();
    stripped.replace_range(start..clause_end, "");
    (Some(&mapping[value_start..value_end]), stripped)
}
