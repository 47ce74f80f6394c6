//! host range patterns
//!
//! `web[01:03].example.com` stands for `web01`, `web02` and `web03` (`.example.com` appended).
//! Ranges are `[start:end]` or `[start:end:stride]`, numeric or single letters. A numeric
//! start with a leading zero fixes the width of every generated number. A pattern may hold
//! several ranges; they expand left to right. Brackets without a `:` are taken literally.
//!
//! One pattern expands to at most [MAX_HOSTS] names.

pub(crate) const MAX_HOSTS: usize = 100_000;

pub(crate) fn expand(pattern: &str) -> Result<Vec<String>, String> {
    let Some((head, range, tail)) = split_range(pattern) else {
        return Ok(vec![pattern.to_string()]);
    };

    let mut parts: Vec<&str> = range.split(':').collect();
    let stride = match parts.len() {
        2 => 1,
        3 => {
            let stride = parts.pop().unwrap_or_default();
            stride
                .parse::<usize>()
                .ok()
                .filter(|stride| *stride > 0)
                .ok_or_else(|| format!("invalid stride {stride:?} in {pattern:?}"))?
        }
        _ => return Err(format!("invalid range [{range}] in {pattern:?}")),
    };

    let (start, end) = (parts[0], parts[1]);
    let is_numeric = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    let items = if is_numeric(start) && is_numeric(end) {
        numeric(start, end, stride, pattern)?
    } else {
        alphabetic(start, end, stride, pattern)?
    };

    let tails = expand(tail)?;
    if items.len().saturating_mul(tails.len()) > MAX_HOSTS {
        return Err(too_many(pattern));
    }

    let mut hosts = Vec::with_capacity(items.len() * tails.len());
    for item in &items {
        for tail in &tails {
            hosts.push(format!("{head}{item}{tail}"));
        }
    }

    Ok(hosts)
}

/// Splits at the first `[...:...]`
fn split_range(pattern: &str) -> Option<(&str, &str, &str)> {
    let mut from = 0;

    while let Some(offset) = pattern[from..].find('[') {
        let open = from + offset;
        let close = open + pattern[open..].find(']')?;
        let range = &pattern[open + 1..close];

        if range.contains(':') {
            return Some((&pattern[..open], range, &pattern[close + 1..]));
        }
        from = close + 1;
    }

    None
}

fn too_many(pattern: &str) -> String {
    format!("{pattern:?} expands to more than {MAX_HOSTS} hosts")
}

fn numeric(start: &str, end: &str, stride: usize, pattern: &str) -> Result<Vec<String>, String> {
    let start_text = if start.is_empty() { "0" } else { start };
    let width = if start_text.len() > 1 && start_text.starts_with('0') {
        if start_text.len() != end.len() {
            return Err(format!(
                "range start and end must have the same width in {pattern:?}"
            ));
        }
        start_text.len()
    } else {
        0
    };

    let invalid = || format!("invalid range in {pattern:?}");
    let first: u64 = start_text.parse().map_err(|_| invalid())?;
    let last: u64 = end.parse().map_err(|_| invalid())?;
    if first > last {
        return Err(format!("range start is after its end in {pattern:?}"));
    }
    if (last - first) / stride as u64 >= MAX_HOSTS as u64 {
        return Err(too_many(pattern));
    }

    Ok((first..=last)
        .step_by(stride)
        .map(|n| format!("{n:0width$}"))
        .collect())
}

fn alphabetic(start: &str, end: &str, stride: usize, pattern: &str) -> Result<Vec<String>, String> {
    let letter = |s: &str| {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => Some(c),
            _ => None,
        }
    };

    let (Some(first), Some(last)) = (letter(start), letter(end)) else {
        return Err(format!("invalid range in {pattern:?}"));
    };

    if first > last {
        return Err(format!("range start is after its end in {pattern:?}"));
    }

    Ok((first..=last)
        .filter(char::is_ascii_alphabetic)
        .step_by(stride)
        .map(String::from)
        .collect())
}
