use std::{convert::Infallible, fmt, str::FromStr};

use num_bigint::{BigInt, Sign};

use crate::{error::InputError, utils::date::is_date};

/// Type of a user supplied value, as named by the contract interface.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ArgType {
    Nat,
    Int,
    Bool,
    String,
    Bytes,
    Address,
    Timestamp,
    /// Any other type; values are accepted verbatim.
    Other(String),
}

impl FromStr for ArgType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "nat" => Self::Nat,
            "int" => Self::Int,
            "bool" => Self::Bool,
            "string" => Self::String,
            "bytes" => Self::Bytes,
            "address" => Self::Address,
            "date" | "timestamp" => Self::Timestamp,
            other => Self::Other(other.to_string()),
        })
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nat => write!(f, "nat"),
            Self::Int => write!(f, "int"),
            Self::Bool => write!(f, "bool"),
            Self::String => write!(f, "string"),
            Self::Bytes => write!(f, "bytes"),
            Self::Address => write!(f, "address"),
            Self::Timestamp => write!(f, "timestamp"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

/// A validated value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArgValue {
    Integer(BigInt),
    Bool(bool),
    /// Text, with surrounding double quotes removed for strings and `0x` removed for bytes.
    Text(String),
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
            Self::Text(text) => write!(f, "{text}"),
        }
    }
}

/// A named, typed and validated value: an entrypoint argument or a storage field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryArg {
    pub name: String,
    pub ty: ArgType,
    pub value: ArgValue,
}

impl EntryArg {
    /// Validates `value` against `ty`.
    pub fn new(name: impl Into<String>, value: &str, ty: ArgType) -> Result<Self, InputError> {
        let value = validate(value, &ty).map_err(|detail| InputError::new("argument", detail))?;
        Ok(Self { name: name.into(), ty, value })
    }

    /// Michelson literal of the value.
    pub fn to_michelson(&self) -> String {
        match (&self.ty, &self.value) {
            (ArgType::String | ArgType::Address, value) => format!("\"{value}\""),
            (ArgType::Bytes, value) => format!("0x{value}"),
            (_, value) => value.to_string(),
        }
    }
}

impl fmt::Display for EntryArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} = {}", self.name, self.ty, self.value)
    }
}

fn validate(value: &str, ty: &ArgType) -> Result<ArgValue, &'static str> {
    match ty {
        ArgType::Nat => match parse_integer(value) {
            Some(n) if n.sign() != Sign::Minus => Ok(ArgValue::Integer(n)),
            _ => Err("a nat value is expected"),
        },
        ArgType::Int => parse_integer(value).map(ArgValue::Integer).ok_or("an integer value is expected"),
        ArgType::Address => {
            if is_address(value) {
                Ok(ArgValue::Text(value.to_string()))
            } else {
                Err("an address value is expected")
            }
        }
        ArgType::Timestamp => {
            if is_date(value) {
                Ok(ArgValue::Text(value.to_string()))
            } else {
                Err("a date value 'YYYY-MM-DD dd:mm:ss' is expected")
            }
        }
        ArgType::String => {
            let text = remove_double_quotes(value);
            if text.is_ascii() {
                Ok(ArgValue::Text(text.to_string()))
            } else {
                Err("a string with non extended ASCII characters is expected")
            }
        }
        ArgType::Bool => {
            if value.trim().eq_ignore_ascii_case("true") {
                Ok(ArgValue::Bool(true))
            } else if value.trim().eq_ignore_ascii_case("false") {
                Ok(ArgValue::Bool(false))
            } else {
                Err("a boolean value 'True' or 'False' is expected")
            }
        }
        ArgType::Bytes => {
            let text = remove_double_quotes(value.trim());
            let digits = text.strip_prefix("0x").unwrap_or(text);
            match hex::decode(digits) {
                Ok(_) => Ok(ArgValue::Text(digits.to_ascii_lowercase())),
                Err(_) => Err("a hexadecimal bytes value is expected"),
            }
        }
        ArgType::Other(_) => Ok(ArgValue::Text(value.to_string())),
    }
}

/// Parses a decimal integer with an optional sign.
pub fn parse_integer(value: &str) -> Option<BigInt> {
    let value = value.trim();
    let digits = value.strip_prefix(['-', '+']).unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

pub fn is_nat(value: &str) -> bool {
    parse_integer(value).is_some_and(|n| n.sign() != Sign::Minus)
}

/// Tezos implicit accounts start with `tz`, originated contracts with `KT`.
pub fn is_address(value: &str) -> bool {
    value.starts_with("tz") || value.starts_with("KT")
}

pub fn remove_double_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
