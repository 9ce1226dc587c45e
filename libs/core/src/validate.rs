//! Value-level assertions shared by every component.
//!
//! The helpers take `(field, value)` pairs so one call can check several fields and the
//! resulting [`SkillError::TypeMismatch`] names the field that failed.

use serde_json::Value;

use crate::error::{Result, SkillError, ValueKind};

/// A named, possibly absent JSON value under inspection.
pub type Field<'a> = (&'a str, Option<&'a Value>);

/// Checks every present value against `expected`; absent values fail only when
/// `disallow_none` is set. Stops at the first failure.
///
/// ```
/// use kskill_core::validate::assert_type;
/// use kskill_core::ValueKind;
/// use serde_json::json;
///
/// let extra = json!({"k": "v"});
/// assert!(assert_type(ValueKind::Object, false, [("extra", Some(&extra)), ("other", None)]).is_ok());
/// assert!(assert_type(ValueKind::Object, true, [("extra", None)]).is_err());
/// ```
pub fn assert_type<'a, I>(expected: ValueKind, disallow_none: bool, values: I) -> Result<()>
where
    I: IntoIterator<Item = Field<'a>>,
{
    for (field, value) in values {
        match value {
            None | Some(Value::Null) => {
                if disallow_none {
                    return Err(SkillError::type_mismatch(format!("{field} (none)"), expected));
                }
            }
            Some(value) if !matches_kind(expected, value) => {
                return Err(SkillError::type_mismatch(
                    format!("{field} ({value})"),
                    expected,
                ));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

pub fn assert_string<'a, I>(disallow_none: bool, values: I) -> Result<()>
where
    I: IntoIterator<Item = Field<'a>>,
{
    assert_type(ValueKind::String, disallow_none, values)
}

pub fn assert_int<'a, I>(disallow_none: bool, values: I) -> Result<()>
where
    I: IntoIterator<Item = Field<'a>>,
{
    assert_type(ValueKind::Integer, disallow_none, values)
}

pub fn assert_non_negative<'a, I>(disallow_none: bool, values: I) -> Result<()>
where
    I: IntoIterator<Item = Field<'a>>,
{
    assert_type(ValueKind::NonNegativeInteger, disallow_none, values)
}

/// Typed counterpart of `disallow_none`: unwraps a required field or reports it missing.
pub fn require<'a, T: ?Sized>(
    field: &str,
    value: Option<&'a T>,
    expected: ValueKind,
) -> Result<&'a T> {
    value.ok_or_else(|| SkillError::type_mismatch(format!("{field} (none)"), expected))
}

/// Rejects blank required text (the typed form of an absent string).
pub fn require_text<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    if value.trim().is_empty() {
        return Err(SkillError::type_mismatch(
            format!("{field} (empty)"),
            ValueKind::String,
        ));
    }
    Ok(value)
}

fn matches_kind(expected: ValueKind, value: &Value) -> bool {
    match expected {
        ValueKind::String => value.is_string(),
        ValueKind::Integer => value.is_i64() || value.is_u64(),
        ValueKind::NonNegativeInteger => value.is_u64(),
        ValueKind::Boolean => value.is_boolean(),
        ValueKind::Object => value.is_object(),
        ValueKind::Array => value.is_array(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_values_pass_unless_disallowed() {
        assert!(assert_string(false, [("title", None)]).is_ok());
        let err = assert_string(true, [("title", None)]).unwrap_err();
        assert_eq!(
            err,
            SkillError::type_mismatch("title (none)", ValueKind::String)
        );
    }

    #[test]
    fn null_counts_as_absent() {
        let null = Value::Null;
        assert!(assert_int(false, [("ttl", Some(&null))]).is_ok());
        assert!(assert_int(true, [("ttl", Some(&null))]).is_err());
    }

    #[test]
    fn short_circuits_on_first_wrong_value() {
        let ok = json!("fine");
        let bad = json!(3);
        let worse = json!(true);
        let err = assert_string(
            false,
            [("a", Some(&ok)), ("b", Some(&bad)), ("c", Some(&worse))],
        )
        .unwrap_err();
        assert_eq!(err, SkillError::type_mismatch("b (3)", ValueKind::String));
    }

    #[test]
    fn floats_are_not_integers() {
        let float = json!(1.5);
        assert!(assert_int(false, [("lifespan", Some(&float))]).is_err());
        let whole = json!(-2);
        assert!(assert_int(false, [("lifespan", Some(&whole))]).is_ok());
        assert!(assert_non_negative(false, [("price", Some(&whole))]).is_err());
    }

    #[test]
    fn zero_values_is_a_noop() {
        assert!(assert_type(ValueKind::Array, true, []).is_ok());
    }

    #[test]
    fn require_reports_missing_field() {
        let present = Some("x");
        assert_eq!(require("blockId", present, ValueKind::String).unwrap(), "x");
        let missing: Option<&str> = None;
        assert!(require("blockId", missing, ValueKind::String).is_err());
        assert!(require_text("id", "  ").is_err());
    }
}
