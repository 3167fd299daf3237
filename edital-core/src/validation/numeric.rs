// Lenient parsing for deadline and percentage fields. Anything unreadable is
// zero, which evaluators treat as "no usable value".

/// Leading integer of `value`: optional whitespace and sign, then digits.
/// Trailing text is ignored ("8 dias" is 8); no digits or overflow gives 0.
pub fn leading_int(value: &str) -> i64 {
    let trimmed = value.trim_start();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse::<i64>().map_or(0, |n| sign * n)
}

/// Leading decimal of `value`, accepting a comma or a point as separator and
/// an optional trailing percent sign ("0,5%" is 0.5).
pub fn leading_decimal(value: &str) -> f64 {
    let normalized = value.trim().replace(',', ".");
    let mut end = 0;
    let mut seen_point = false;
    for (i, c) in normalized.char_indices() {
        match c {
            '0'..='9' => end = i + 1,
            '.' if !seen_point && end == i && i > 0 => seen_point = true,
            _ => break,
        }
    }
    normalized[..end].parse::<f64>().unwrap_or(0.0)
}

/// Optional field as a leading integer; absent fields read as 0.
pub fn field_int(value: Option<&str>) -> i64 {
    value.map_or(0, leading_int)
}
