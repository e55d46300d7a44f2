//! Byte-level search helpers shared by the detectors and the sub-parsers.
//!
//! All offsets returned here are byte offsets into UTF-8 text. Every needle
//! is ASCII, so a match always starts and ends on a character boundary.

/// Returns every offset in `text` at which a line starts.
///
/// Offset `0` is only reported when `at_line_start` is set; an offset equal
/// to `text.len()` is reported when the text ends with a newline.
pub(crate) fn line_starts(text: &str, at_line_start: bool) -> impl Iterator<Item = usize> + '_ {
    let first = if at_line_start { Some(0) } else { None };
    first
        .into_iter()
        .chain(memchr::memchr_iter(b'\n', text.as_bytes()).map(|pos| pos + 1))
}

/// Finds the first occurrence of `needle` in `haystack`, ignoring ASCII
/// case. `needle` must be lowercase.
pub(crate) fn find_ignore_ascii_case(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }

    haystack
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

/// Returns the offset of the longest proper prefix of `needle` that
/// `haystack` ends with, ignoring ASCII case.
pub(crate) fn partial_match_at_end(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    let longest = needle.len().saturating_sub(1).min(haystack.len());
    (1..=longest)
        .rev()
        .find(|&len| haystack[haystack.len() - len..].eq_ignore_ascii_case(&needle[..len]))
        .map(|len| haystack.len() - len)
}

/// Result of searching for a token that must be followed by a delimiter.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum TokenMatch {
    /// The token and its delimiter start at the offset.
    Complete(usize),
    /// The text ends with a prefix of the token, or with the token itself,
    /// starting at the offset.
    Partial(usize),
    Absent,
}

/// Finds the first occurrence of `needle` that is followed by a byte
/// accepted by `is_delimiter`, ignoring ASCII case. `needle` must be
/// lowercase.
pub(crate) fn find_delimited(
    haystack: &[u8],
    needle: &[u8],
    is_delimiter: impl Fn(u8) -> bool,
) -> TokenMatch {
    let mut from = 0;
    while let Some(pos) = find_ignore_ascii_case(&haystack[from..], needle) {
        let start = from + pos;
        match haystack.get(start + needle.len()) {
            None => return TokenMatch::Partial(start),
            Some(&byte) if is_delimiter(byte) => return TokenMatch::Complete(start),
            Some(_) => from = start + 1,
        }
    }

    partial_match_at_end(haystack, needle).map_or(TokenMatch::Absent, TokenMatch::Partial)
}

/// Returns the number of leading spaces and tabs.
pub(crate) fn indent_len(line: &[u8]) -> usize {
    line.iter()
        .take_while(|&&byte| byte == b' ' || byte == b'\t')
        .count()
}
