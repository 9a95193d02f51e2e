// Parameter name stripping for method descriptors
//
// Signature format 3.0+ may carry parameter names:
//     method public void setVolume(int zone, @IntRange(from=0) int index);
// Renaming `zone` must not look like an API change, so descriptors are
// compared with names removed:
//     method public void setVolume(int, @IntRange(from=0) int);

/// Remove parameter names from the first parameter list in `descriptor`.
///
/// Type tokens, annotations, generics, arrays and varargs markers are kept,
/// as are parameter count and order. A descriptor without a parameter list
/// is returned unchanged.
pub fn normalize_params(descriptor: &str) -> String {
    let Some((open, close)) = param_list_span(descriptor) else {
        return descriptor.to_string();
    };

    let inner = &descriptor[open + 1..close];
    if inner.trim().is_empty() {
        return descriptor.to_string();
    }

    let params: Vec<&str> = split_top_level(inner, b',')
        .into_iter()
        .map(strip_param_name)
        .collect();

    format!(
        "{}({}){}",
        &descriptor[..open],
        params.join(", "),
        &descriptor[close + 1..]
    )
}

/// Locate the byte offsets of the parameter list's `(` and matching `)`.
///
/// Parentheses that belong to annotation arguments (`@IntRange(from=0)`)
/// are skipped.
pub(crate) fn param_list_span(s: &str) -> Option<(usize, usize)> {
    let bytes = s.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'(' {
            i += 1;
            continue;
        }

        let close = matching_paren(bytes, i)?;

        // Walk back over the dotted identifier in front of the paren
        let mut start = i;
        while start > 0 && is_path_byte(bytes[start - 1]) {
            start -= 1;
        }

        if start > 0 && bytes[start - 1] == b'@' {
            i = close + 1;
            continue;
        }

        return Some((i, close));
    }

    None
}

fn matching_paren(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, &b) in bytes[open..].iter().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

fn is_path_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b == b'.'
}

fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Split on `sep` where it is not nested inside `<>`, `()` or `[]`
fn split_top_level(s: &str, sep: u8) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (i, b) in s.bytes().enumerate() {
        match b {
            b'<' | b'(' | b'[' => depth += 1,
            b'>' | b')' | b']' => depth -= 1,
            _ if b == sep && depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Whitespace-separated tokens at nesting depth zero, as byte ranges
fn top_level_tokens(s: &str) -> Vec<(usize, usize)> {
    let mut tokens = Vec::new();
    let mut depth = 0i32;
    let mut start: Option<usize> = None;

    for (i, b) in s.bytes().enumerate() {
        match b {
            b'<' | b'(' | b'[' => depth += 1,
            b'>' | b')' | b']' => depth -= 1,
            _ => {}
        }

        if b.is_ascii_whitespace() && depth == 0 {
            if let Some(st) = start.take() {
                tokens.push((st, i));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(st) = start {
        tokens.push((st, s.len()));
    }
    tokens
}

fn strip_param_name(param: &str) -> &str {
    let param = param.trim();
    let tokens = top_level_tokens(param);

    let type_tokens = tokens
        .iter()
        .filter(|(s, _)| !param[*s..].starts_with('@'))
        .count();

    match tokens.last() {
        Some(&(start, end)) if type_tokens >= 2 && is_identifier(&param[start..end]) => {
            param[..start].trim_end()
        }
        _ => param,
    }
}
