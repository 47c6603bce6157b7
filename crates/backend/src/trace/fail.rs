use lazy_static::lazy_static;
use regex::Regex;

/// Marker printed by the interpreter when a script run aborts.
pub const FATAL_MARKER: &str = "Fatal error:";

lazy_static! {
    static ref FAIL_PAYLOAD: Regex =
        Regex::new(r"(?s)reached \w+ instruction\nwith\s+(.*?)\n(?:trace|Fatal error:)")
            .expect("failure payload regex is valid");
}

/// Extracts the value a failed run aborted with, e.g. `(Pair "mystr" 2)`.
///
/// Returns `None` when `raw` carries no failure report.
pub fn extract_fail(raw: &str) -> Option<String> {
    if !raw.contains(FATAL_MARKER) {
        return None;
    }

    match FAIL_PAYLOAD.captures(raw) {
        Some(caps) => Some(unescape(caps[1].trim())),
        None => {
            warn!("script failed but its failure value could not be located");
            None
        }
    }
}

/// Decodes `%XX` and `%uXXXX` escape sequences. Malformed sequences are kept verbatim.
pub fn unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];
        match decode_escape(tail) {
            Some((c, used)) => {
                out.push(c);
                rest = &tail[used..];
            }
            None => {
                out.push('%');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_escape(tail: &str) -> Option<(char, usize)> {
    if let Some(code) = tail.strip_prefix('u') {
        let code = hex_digits(code, 4)?;
        return char::from_u32(u32::from_str_radix(code, 16).ok()?).map(|c| (c, 5));
    }

    let code = hex_digits(tail, 2)?;
    Some((char::from(u8::from_str_radix(code, 16).ok()?), 2))
}

fn hex_digits(s: &str, n: usize) -> Option<&str> {
    let digits = s.get(..n)?;
    digits.chars().all(|c| c.is_ascii_hexdigit()).then_some(digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_fail() {
        let raw = "Runtime error in contract KT1BEqzn5Wx8uJrZNvuS9DVHmLvG9td3fDLi:\n\
                   At line 4 characters 20 to 28,\n\
                   script reached FAILWITH instruction\n\
                   with (Pair \"mystr\" 2)\n\
                   trace\n  - location: 9 (just consumed gas: 3.745)\n    [ Unit ]\n\
                   Fatal error:\n  error running script";
        assert_eq!(extract_fail(raw).as_deref(), Some("(Pair \"mystr\" 2)"));
    }

    #[test]
    fn test_extract_fail_before_marker() {
        let raw = "script reached FAILWITH instruction\nwith\n  \"NOT_ALLOWED\"\nFatal error:\n  error";
        assert_eq!(extract_fail(raw).as_deref(), Some("\"NOT_ALLOWED\""));
    }

    #[test]
    fn test_multiline_payload() {
        let raw = "reached FAILWITH instruction\nwith (Pair 1\n        2)\ntrace\nFatal error:";
        assert_eq!(extract_fail(raw).as_deref(), Some("(Pair 1\n        2)"));
    }

    #[test]
    fn test_no_failure() {
        assert_eq!(extract_fail("storage\n  2\ntrace\n"), None);
        // a report without the fatal marker is not a failure
        assert_eq!(extract_fail("reached FAILWITH instruction\nwith 1\ntrace\n"), None);
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("a%20b"), "a b");
        assert_eq!(unescape("%u00e9t%E9"), "été");
        assert_eq!(unescape("100%"), "100%");
        assert_eq!(unescape("%zz%u12"), "%zz%u12");
        assert_eq!(unescape("plain"), "plain");
    }
}
