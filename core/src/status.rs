//! Status-line extraction from raw wrapper header lines.

/// Parse `HTTP/<version> <code> <reason>` and return the code.
///
/// The version must be numeric and a reason token must follow the code;
/// anything else is not a status line.
pub fn parse_status_line(line: &str) -> Option<u16> {
    let rest = line.strip_prefix("HTTP/")?;
    let mut parts = rest.split_whitespace();
    parts.next()?.parse::<f32>().ok()?;
    let code = parts.next()?.parse::<u16>().ok()?;
    parts.next()?;
    Some(code)
}

/// Pick the status to report from a hop-ordered list of header lines.
///
/// Redirect codes (300-399) are passed over in favour of the first status
/// line after them. If every status line is a redirect the last one wins;
/// with no status line at all the result is 0.
pub fn resolve_status<'a>(lines: impl IntoIterator<Item = &'a str>) -> u16 {
    let mut status = 0;
    for line in lines {
        let Some(code) = parse_status_line(line) else {
            continue;
        };
        status = code;
        if !(300..400).contains(&code) {
            break;
        }
    }
    status
}
