/// Split `line` on any of `delimiters` into trimmed tokens.
///
/// Adjacent delimiters produce empty tokens so callers can spot missing
/// segments. A blank line yields no tokens at all.
pub fn tokenize<'a>(line: &'a str, delimiters: &[char]) -> Vec<&'a str> {
    if line.trim().is_empty() {
        return Vec::new();
    }
    line.split(|c: char| delimiters.contains(&c))
        .map(str::trim)
        .collect()
}

/// Split a timestamped channel `(t1,v1),(t2,v2)` into `(t, v)` token pairs.
///
/// Returns `None` when parentheses are unbalanced or a pair does not hold
/// exactly two comma-separated parts.
pub fn pair_tokens(segment: &str) -> Option<Vec<(&str, &str)>> {
    let mut pairs = Vec::new();
    let mut rest = segment.trim();

    while !rest.is_empty() {
        rest = rest.strip_prefix('(')?;
        let close = rest.find(')')?;
        let inner = &rest[..close];
        if inner.contains('(') {
            return None;
        }
        let parts = tokenize(inner, &[',']);
        if parts.len() != 2 {
            return None;
        }
        pairs.push((parts[0], parts[1]));

        rest = rest[close + 1..].trim_start();
        if let Some(after) = rest.strip_prefix(',') {
            rest = after.trim_start();
            if rest.is_empty() {
                return None;
            }
        } else if !rest.is_empty() {
            return None;
        }
    }
    Some(pairs)
}
