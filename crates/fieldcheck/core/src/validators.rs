//! Built-in field validators
//!
//! Each validator has a typed form (`equal`, `require`, `is_cyrillic`, `is_email`)
//! and a registry form taking positional `serde_json::Value` arguments, registered
//! under the names `EQUAL`, `REQUIRE`, `CYRILLIC_LNG` and `EMAIL`.

use std::rc::Rc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::controller::Validator;
use crate::error::ArgumentError;

pub const EQUAL: &str = "EQUAL";
pub const REQUIRE: &str = "REQUIRE";
pub const CYRILLIC_LNG: &str = "CYRILLIC_LNG";
pub const EMAIL: &str = "EMAIL";

// Basic Russian alphabet only; `ё`/`Ё` sit outside this range.
static NON_CYRILLIC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^а-яА-Я]+").unwrap());

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9_\-.])+@([A-Za-z0-9_\-.])+\.([A-Za-z]{2,4})$").unwrap()
});

static NULL: Value = Value::Null;

/// Positional argument, `Null` when the caller passed fewer arguments
pub fn arg(args: &[Value], index: usize) -> &Value {
    args.get(index).unwrap_or(&NULL)
}

/// Positional argument that must be a string
pub fn str_arg(args: &[Value], index: usize) -> Result<&str, ArgumentError> {
    match args.get(index) {
        None | Some(Value::Null) => Err(ArgumentError::MissingArgument { index }),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(ArgumentError::NotAString { index }),
    }
}

/// Largest integer a browser number holds exactly
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// JSON number for a numeric argument coming from the browser
///
/// Whole numbers become integers, so `5` and `5.0` are the same value.
/// NaN and the infinities have no JSON form and are rejected.
pub fn number_value(n: f64, index: usize) -> Result<Value, ArgumentError> {
    if !n.is_finite() {
        return Err(ArgumentError::NonFiniteNumber { index });
    }
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Ok(Value::from(n as i64));
    }
    serde_json::Number::from_f64(n)
        .map(Value::Number)
        .ok_or(ArgumentError::NonFiniteNumber { index })
}

/// Strict equality: no coercion between numbers, strings, booleans
pub fn equal(needle: &Value, handle: &Value) -> bool {
    match (needle, handle) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => needle == handle,
    }
}

/// Only the exact empty string counts as missing
pub fn require(value: &Value) -> bool {
    !matches!(value, Value::String(s) if s.is_empty())
}

/// Removes every character outside `[а-яА-Я]`
pub fn strip_non_cyrillic(value: &str) -> String {
    NON_CYRILLIC_REGEX.replace_all(value, "").into_owned()
}

/// True when nothing had to be stripped
pub fn is_cyrillic(value: &str) -> bool {
    strip_non_cyrillic(value).len() == value.len()
}

/// ASCII local/domain parts and a 2-4 letter TLD
pub fn is_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

fn equal_validator(args: &[Value]) -> Result<bool, ArgumentError> {
    Ok(equal(arg(args, 0), arg(args, 1)))
}

fn require_validator(args: &[Value]) -> Result<bool, ArgumentError> {
    Ok(require(arg(args, 0)))
}

fn cyrillic_validator(args: &[Value]) -> Result<bool, ArgumentError> {
    Ok(is_cyrillic(str_arg(args, 0)?))
}

fn email_validator(args: &[Value]) -> Result<bool, ArgumentError> {
    Ok(is_email(str_arg(args, 0)?))
}

/// Validators attached to a controller out of the box
pub fn builtin_validators() -> Vec<(&'static str, Validator)> {
    vec![
        (EQUAL, Rc::new(equal_validator) as Validator),
        (REQUIRE, Rc::new(require_validator) as Validator),
        (CYRILLIC_LNG, Rc::new(cyrillic_validator) as Validator),
        (EMAIL, Rc::new(email_validator) as Validator),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!(5), json!("5"), false)]
    #[case(json!(5), json!(5), true)]
    #[case(json!(5), json!(5.0), true)]
    #[case(json!(0.5), json!(0.25), false)]
    #[case(json!("secret"), json!("secret"), true)]
    #[case(json!(true), json!("true"), false)]
    #[case(json!(null), json!(""), false)]
    fn test_equal(#[case] a: Value, #[case] b: Value, #[case] expected: bool) {
        assert_eq!(equal(&a, &b), expected);
    }

    #[test]
    fn test_number_value() {
        assert_eq!(number_value(5.0, 0), Ok(json!(5)));
        assert_eq!(number_value(-0.0, 0), Ok(json!(0)));
        assert_eq!(number_value(2.5, 0), Ok(json!(2.5)));
        assert_eq!(number_value(f64::NAN, 1), Err(ArgumentError::NonFiniteNumber { index: 1 }));
        assert_eq!(
            number_value(f64::INFINITY, 0),
            Err(ArgumentError::NonFiniteNumber { index: 0 })
        );
    }

    #[rstest]
    #[case(json!(""), false)]
    #[case(json!(" "), true)]
    #[case(json!("x"), true)]
    #[case(json!(null), true)]
    #[case(json!(0), true)]
    fn test_require(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(require(&value), expected);
    }

    #[rstest]
    #[case("привет", true)]
    #[case("ПРИВЕТ", true)]
    #[case("", true)]
    #[case("hello", false)]
    #[case("привет123", false)]
    #[case("при вет", false)]
    #[case("ёлка", false)]
    fn test_is_cyrillic(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(is_cyrillic(value), expected);
    }

    #[test]
    fn test_strip_non_cyrillic() {
        assert_eq!(strip_non_cyrillic("при1вет"), "привет");
        assert_eq!(strip_non_cyrillic("hello"), "");
        assert_eq!(strip_non_cyrillic("Мир!"), "Мир");
    }

    #[rstest]
    #[case("a@b.co", true)]
    #[case("first.last-name_1@mail.example.org", true)]
    #[case("not-an-email", false)]
    #[case("a@b.toolongtld", false)]
    #[case("a@b.c", false)]
    #[case("user+tag@example.com", false)]
    #[case("@example.com", false)]
    #[case("user@example.com ", false)]
    fn test_is_email(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(is_email(value), expected);
    }

    #[test]
    fn test_string_arguments_fail_fast() {
        let builtins = builtin_validators();
        let email = &builtins.iter().find(|(n, _)| *n == EMAIL).unwrap().1;

        assert_eq!(email(&[json!(42)]), Err(ArgumentError::NotAString { index: 0 }));
        assert_eq!(email(&[]), Err(ArgumentError::MissingArgument { index: 0 }));
        assert_eq!(email(&[json!("a@b.co")]), Ok(true));
    }

    #[test]
    fn test_missing_arguments_read_as_null() {
        let builtins = builtin_validators();
        let require = &builtins.iter().find(|(n, _)| *n == REQUIRE).unwrap().1;
        let equal = &builtins.iter().find(|(n, _)| *n == EQUAL).unwrap().1;

        assert_eq!(require(&[]), Ok(true));
        assert_eq!(equal(&[json!("a")]), Ok(false));
    }
}
