//! Parse HTTP response header lines.

/// Extracts `Content-Length` from collected header lines.
pub(crate) fn content_length(lines: &[String]) -> Option<u64> {
    lines.iter().find_map(|line| {
        let (name, value) = line.trim().split_once(':')?;
        if name.trim().eq_ignore_ascii_case("content-length") {
            value.trim().parse::<u64>().ok()
        } else {
            None
        }
    })
}
