//! Defensive extraction of display records from snapshot JSON.
//!
//! Every accessor on [`Node`] has a documented default, so a [`Decode`]
//! implementation is a pure function from an arbitrary JSON tree to a record
//! and cannot fail. Walking through a missing or non-object node yields an
//! empty node; `null` is treated the same as an absent key.

use serde_json::Value;

mod lookup;
mod time;

pub use lookup::{class_names, difficulty, Lookup};
pub use time::{clock, compact, timestamp};

/// Builds a record from a (possibly missing) JSON node.
pub trait Decode: Sized {
    fn decode(node: Node<'_>) -> Self;
}

/// A borrowed view into a snapshot that may point at nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Node<'a>(Option<&'a Value>);

impl<'a> Node<'a> {
    pub fn new(value: &'a Value) -> Self {
        if value.is_null() {
            Self(None)
        } else {
            Self(Some(value))
        }
    }

    pub fn is_missing(self) -> bool {
        self.0.is_none()
    }

    pub fn value(self) -> Option<&'a Value> {
        self.0
    }

    /// Child by key. Missing when `self` is missing or not an object.
    pub fn get(self, key: &str) -> Node<'a> {
        self.0.and_then(|v| v.get(key)).map(Node::new).unwrap_or_default()
    }

    pub fn path(self, keys: &[&str]) -> Node<'a> {
        keys.iter().fold(self, |node, key| node.get(key))
    }

    /// The raw string, only when the node holds one.
    pub fn str(self) -> Option<&'a str> {
        self.0.and_then(Value::as_str)
    }

    /// Display text with fallback: missing, `""`, `false` and `0` give
    /// `default`.
    pub fn text_or(self, default: &str) -> String {
        match self.0 {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) if n.as_f64() != Some(0.0) => n.to_string(),
            Some(Value::Bool(true)) => "true".to_string(),
            _ => default.to_string(),
        }
    }

    /// Counters default to zero. Numeric strings are accepted.
    pub fn count(self) -> u64 {
        match self.0 {
            Some(Value::Number(n)) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
                .unwrap_or(0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }

    pub fn int(self) -> Option<i64> {
        match self.0 {
            Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn float(self) -> Option<f64> {
        match self.0 {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn float_or(self, default: f64) -> f64 {
        self.float().unwrap_or(default)
    }

    /// Truthiness of the node.
    pub fn flag(self) -> bool {
        match self.0 {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        }
    }

    /// Like `text_or("-")` but keeps a literal `0`.
    pub fn number_or_dash(self) -> String {
        match self.0 {
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => "-".to_string(),
        }
    }

    /// Elements of an array node; empty for anything else.
    pub fn items(self) -> impl Iterator<Item = Node<'a>> + 'a {
        self.0
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .map(Node::new)
    }

    pub fn len(self) -> usize {
        self.0.and_then(Value::as_array).map_or(0, Vec::len)
    }

    /// Key/value pairs of an object node; empty for anything else.
    pub fn entries(self) -> impl Iterator<Item = (&'a str, Node<'a>)> + 'a {
        self.0
            .and_then(Value::as_object)
            .into_iter()
            .flatten()
            .map(|(k, v)| (k.as_str(), Node::new(v)))
    }

    pub fn is_array(self) -> bool {
        self.0.is_some_and(Value::is_array)
    }

    pub fn decode_items<T: Decode>(self) -> Vec<T> {
        self.items().map(T::decode).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_intermediate_nodes_fall_back() {
        let raw = json!({ "game_limits": null, "resource_usage": 3 });
        let root = Node::new(&raw);
        assert!(root.path(&["game_limits", "max_games_set"]).is_missing());
        assert!(root.path(&["resource_usage", "physical_memory", "used_mb"]).is_missing());
        assert_eq!(root.path(&["a", "b", "c"]).text_or("N/A"), "N/A");
        assert_eq!(root.path(&["a", "b"]).count(), 0);
    }

    #[test]
    fn text_follows_display_truthiness() {
        let raw = json!({ "empty": "", "zero": 0, "num": 12, "name": "Ber", "off": false });
        let root = Node::new(&raw);
        assert_eq!(root.get("empty").text_or("-"), "-");
        assert_eq!(root.get("zero").text_or("N/A"), "N/A");
        assert_eq!(root.get("num").text_or("N/A"), "12");
        assert_eq!(root.get("name").text_or("-"), "Ber");
        assert_eq!(root.get("off").text_or("-"), "-");
    }

    #[test]
    fn number_or_dash_keeps_zero() {
        let raw = json!({ "zero": 0, "blank": "", "str": 25 });
        let root = Node::new(&raw);
        assert_eq!(root.get("zero").number_or_dash(), "0");
        assert_eq!(root.get("blank").number_or_dash(), "-");
        assert_eq!(root.get("nope").number_or_dash(), "-");
        assert_eq!(root.get("str").number_or_dash(), "25");
    }

    #[test]
    fn counts_accept_numeric_strings_and_reject_junk() {
        let raw = json!({ "a": "7", "b": "x", "c": -3, "d": 2.9, "e": [1] });
        let root = Node::new(&raw);
        assert_eq!(root.get("a").count(), 7);
        assert_eq!(root.get("b").count(), 0);
        assert_eq!(root.get("c").count(), 0);
        assert_eq!(root.get("d").count(), 2);
        assert_eq!(root.get("e").count(), 0);
    }

    #[test]
    fn items_and_entries_tolerate_wrong_types() {
        let raw = json!({ "list": { "k": 1 }, "map": [1, 2] });
        let root = Node::new(&raw);
        assert_eq!(root.get("list").items().count(), 0);
        assert_eq!(root.get("map").entries().count(), 0);
        assert_eq!(root.get("map").len(), 2);
        assert_eq!(root.get("list").entries().count(), 1);
    }

    #[test]
    fn null_snapshot_is_missing() {
        let raw = Value::Null;
        let root = Node::new(&raw);
        assert!(root.is_missing());
        assert!(!root.flag());
    }
}
