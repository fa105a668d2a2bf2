//! Per-field merge policies.
//!
//! Fields of a chunked value do not all merge the same way. Identity fields
//! are fixed once set, accumulating text is appended, and summary fields are
//! replaced by the latest report. Each rule is one function here so reducers
//! read as a table of `field => policy`.

use serde_json::{Map, Value};
use std::fmt;

use crate::errors::{ConflictError, ConflictKind};
use crate::messages::{ResponseMeta, Role};
use crate::usage::TokenUsage;

/// Whether a field value counts as "not provided" by a chunk.
pub trait IsEmpty: fmt::Debug {
    /// True when the value is the empty value for its type.
    fn is_empty_value(&self) -> bool;

    /// Human-readable form used in conflict errors.
    fn describe(&self) -> String {
        format!("{self:?}")
    }
}

impl IsEmpty for String {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }

    fn describe(&self) -> String {
        self.clone()
    }
}

impl<T: IsEmpty> IsEmpty for Option<T> {
    fn is_empty_value(&self) -> bool {
        self.as_ref().map_or(true, IsEmpty::is_empty_value)
    }

    fn describe(&self) -> String {
        self.as_ref().map(IsEmpty::describe).unwrap_or_default()
    }
}

impl<T: fmt::Debug> IsEmpty for Vec<T> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl IsEmpty for Map<String, Value> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl IsEmpty for Value {
    fn is_empty_value(&self) -> bool {
        self.is_null()
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl IsEmpty for bool {
    fn is_empty_value(&self) -> bool {
        !*self
    }
}

macro_rules! impl_is_empty_for_numbers {
    ($($t:ty),*) => {
        $(
            impl IsEmpty for $t {
                fn is_empty_value(&self) -> bool {
                    *self == (0 as $t)
                }

                fn describe(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_is_empty_for_numbers!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64);

impl IsEmpty for Role {
    fn is_empty_value(&self) -> bool {
        false
    }

    fn describe(&self) -> String {
        self.as_str().to_string()
    }
}

impl IsEmpty for TokenUsage {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl IsEmpty for ResponseMeta {
    fn is_empty_value(&self) -> bool {
        *self == ResponseMeta::default()
    }
}

/// A value that accumulates by appending.
pub trait Appendable {
    /// Append `other` to the end of `self`.
    fn append_from(&mut self, other: &Self);
}

impl Appendable for String {
    fn append_from(&mut self, other: &Self) {
        self.push_str(other);
    }
}

impl<T: Clone> Appendable for Vec<T> {
    fn append_from(&mut self, other: &Self) {
        self.extend(other.iter().cloned());
    }
}

impl<T: Appendable + Clone> Appendable for Option<T> {
    fn append_from(&mut self, other: &Self) {
        match (self.as_mut(), other) {
            (_, None) => {}
            (Some(acc), Some(next)) => acc.append_from(next),
            (None, Some(next)) => *self = Some(next.clone()),
        }
    }
}

/// The first non-empty value is authoritative.
///
/// A later non-empty value that differs is a conflict; an equal one is accepted.
pub fn first_non_empty<T>(acc: &mut T, next: &T, kind: ConflictKind) -> Result<(), ConflictError>
where
    T: IsEmpty + PartialEq + Clone,
{
    if next.is_empty_value() {
        return Ok(());
    }
    if acc.is_empty_value() {
        *acc = next.clone();
        return Ok(());
    }
    if acc != next {
        return Err(ConflictError::new(kind, acc.describe(), next.describe()));
    }
    Ok(())
}

/// The latest non-empty value replaces whatever came before.
pub fn last_non_empty<T>(acc: &mut T, next: &T)
where
    T: IsEmpty + Clone,
{
    if !next.is_empty_value() {
        *acc = next.clone();
    }
}

/// Append `next` to `acc` in chunk order.
pub fn append<T: Appendable>(acc: &mut T, next: &T) {
    acc.append_from(next);
}

/// Union two metadata maps; on key collision the later value wins.
pub fn union_maps(acc: &mut Map<String, Value>, next: &Map<String, Value>) {
    for (key, value) in next {
        acc.insert(key.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("", "user", "user")]
    #[case("user", "", "user")]
    #[case("user", "user", "user")]
    fn test_first_non_empty_accepts(#[case] acc: &str, #[case] next: &str, #[case] expected: &str) {
        let mut acc = acc.to_string();
        first_non_empty(&mut acc, &next.to_string(), ConflictKind::Name).unwrap();
        assert_eq!(acc, expected);
    }

    #[test]
    fn test_first_non_empty_conflict() {
        let mut acc = "a".to_string();
        let err = first_non_empty(&mut acc, &"b".to_string(), ConflictKind::Name).unwrap_err();
        assert_eq!(err.first, "a");
        assert_eq!(err.second, "b");
        assert_eq!(acc, "a");
    }

    #[test]
    fn test_first_non_empty_role() {
        let mut acc: Option<Role> = None;
        first_non_empty(&mut acc, &Some(Role::User), ConflictKind::Role).unwrap();
        let err = first_non_empty(&mut acc, &Some(Role::Assistant), ConflictKind::Role).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot concat messages with different roles: 'user' 'assistant'"
        );
    }

    #[rstest]
    #[case("", "stop", "stop")]
    #[case("stop", "", "stop")]
    #[case("stop", "tool_calls", "tool_calls")]
    fn test_last_non_empty(#[case] acc: &str, #[case] next: &str, #[case] expected: &str) {
        let mut acc = acc.to_string();
        last_non_empty(&mut acc, &next.to_string());
        assert_eq!(acc, expected);
    }

    #[test]
    fn test_last_non_empty_replaces_whole_value() {
        let mut acc = Some(TokenUsage::with_tokens(20, 10).cached_tokens(10));
        last_non_empty(&mut acc, &None);
        assert_eq!(acc, Some(TokenUsage::with_tokens(20, 10).cached_tokens(10)));

        last_non_empty(&mut acc, &Some(TokenUsage::with_tokens(30, 15)));
        assert_eq!(acc, Some(TokenUsage::with_tokens(30, 15)));
    }

    #[test]
    fn test_append() {
        let mut s = "Hello, ".to_string();
        append(&mut s, &"world".to_string());
        assert_eq!(s, "Hello, world");

        let mut v = vec![1];
        append(&mut v, &vec![2, 3]);
        assert_eq!(v, vec![1, 2, 3]);

        let mut o: Option<String> = None;
        append(&mut o, &Some("a".to_string()));
        append(&mut o, &Some("b".to_string()));
        assert_eq!(o.as_deref(), Some("ab"));
    }

    #[test]
    fn test_union_maps_later_key_wins() {
        let mut acc = json!({"key1": "val1", "shared": 1})
            .as_object()
            .cloned()
            .unwrap();
        let next = json!({"key2": "val2", "shared": 2})
            .as_object()
            .cloned()
            .unwrap();
        union_maps(&mut acc, &next);
        assert_eq!(
            Value::Object(acc),
            json!({"key1": "val1", "key2": "val2", "shared": 2})
        );
    }

    #[test]
    fn test_numbers_and_bools() {
        assert!(0u64.is_empty_value());
        assert!(!3i32.is_empty_value());
        assert!(false.is_empty_value());
        assert!(0.0f64.is_empty_value());
    }
}
