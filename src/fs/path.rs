//! Path utilities
//!
//! Pure string functions. Map keys on the read side are always the output of
//! [`normalize_path`].

/// Canonical slash-delimited absolute form of `path`.
///
/// Backslashes become `/`, the `//?/` extended-length prefix is dropped, a
/// leading drive (`C:`) is kept as the root, and `.`/`..` are resolved
/// without ever climbing above the root.
pub fn normalize_path(path: &str) -> String {
    let mut normalized = path.replace('\\', "/");
    if let Some(rest) = normalized.strip_prefix("//?/") {
        normalized = rest.to_string();
    }

    let (root, rest) = split_drive(&normalized);

    let mut resolved: Vec<&str> = Vec::new();
    for part in rest.split('/').filter(|p| !p.is_empty() && *p != ".") {
        if part == ".." {
            resolved.pop();
        } else {
            resolved.push(part);
        }
    }

    if resolved.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, resolved.join("/"))
    }
}

/// Name of the entry directly under `dir` that the stored `key` belongs to.
///
/// `dir` must already be normalized. `key` is matched as stored, so a key
/// that only normalizes into `dir` (e.g. `app\a.ts` for `/app`) is not a
/// child. Empty names and names starting with `.` yield `None`.
pub fn child_segment<'a>(dir: &str, key: &'a str) -> Option<&'a str> {
    let rest = key.strip_prefix(dir)?;
    // A root ("/" or "C:/") already ends with the separator.
    let rest = if dir.ends_with('/') { rest } else { rest.strip_prefix('/')? };
    let name = rest.split('/').next().unwrap_or("");
    (!name.is_empty() && !name.starts_with('.')).then_some(name)
}

fn split_drive(path: &str) -> (&str, &str) {
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        (&path[..2], &path[2..])
    } else {
        ("", path)
    }
}
