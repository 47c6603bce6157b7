//! Segmentation of a bracketed stack dump into individual Michelson values.
//!
//! The interpreter prints one value per line, but nested values (pairs, maps, lambdas) may
//! spread over several lines. Lines are therefore accumulated until braces and parentheses
//! are both balanced.

/// Returns true if `value` has as many `{` as `}` and as many `(` as `)`, ignoring those
/// inside string literals. An unterminated string is never balanced.
pub fn is_balanced(value: &str) -> bool {
    let (mut braces, mut parens) = (0i64, 0i64);
    let mut in_string = false;
    let mut escaped = false;
    for c in value.chars() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => braces += 1,
            '}' => braces -= 1,
            '(' => parens += 1,
            ')' => parens -= 1,
            _ => {}
        }
    }
    !in_string && braces == 0 && parens == 0
}

/// Why a stack dump could not be segmented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackDumpError {
    /// The dump does not start with `[` or never closes it.
    NotBracketed,
    /// The last value never became balanced.
    Unbalanced(String),
}

/// Splits the stack dump following an item header into values, top of stack first.
///
/// An empty dump or `[]` is an empty stack.
pub fn split_stack(dump: &str) -> Result<Vec<String>, StackDumpError> {
    let dump = dump.trim();
    if dump.is_empty() {
        return Ok(vec![]);
    }

    let inner = bracket_content(dump).ok_or(StackDumpError::NotBracketed)?;

    let mut values = vec![];
    let mut accu = String::new();
    for line in inner.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if !accu.is_empty() {
            accu.push(' ');
        }
        accu.push_str(line);
        if is_balanced(&accu) {
            values.push(std::mem::take(&mut accu));
        }
    }

    if accu.is_empty() {
        Ok(values)
    } else {
        Err(StackDumpError::Unbalanced(accu))
    }
}

/// Returns the text between the leading `[` and its closing `]`.
///
/// Anything printed after the closing bracket (e.g. the interpreter's error report that
/// follows the last item of a failed run) is ignored. Brackets inside string literals do
/// not count.
fn bracket_content(dump: &str) -> Option<&str> {
    let body = dump.strip_prefix('[')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in body.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' if depth == 0 => {
                let trailing = body[i + 1..].trim();
                if !trailing.is_empty() {
                    trace!("ignoring text after stack dump: {:?}", trailing);
                }
                return Some(&body[..i]);
            }
            ']' => depth -= 1,
            _ => {}
        }
    }

    None
}
