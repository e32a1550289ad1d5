//! An ordered map from element names to [`Bson`] values.
//!
//! Unlike most maps, a [`Document`] remembers insertion order, because the order of
//! elements is part of a BSON document's bytes.
//!
//! # Example
//!
//! ```
//! use bson_io::prelude::*;
//! use std::collections::BTreeMap;
//!
//! // built by hand
//! let mut doc = Document::new();
//! doc.insert("b", 1);
//! doc.insert("a", "two");
//!
//! // order is preserved
//! let names: Vec<&str> = doc.iter().map(|(k, _)| k.as_str()).collect();
//! assert_eq!(names, vec!["b", "a"]);
//!
//! // from a `BTreeMap`, ordered by key
//! let mut bt = BTreeMap::new();
//! bt.insert("z".to_string(), Bson::Null);
//! let from_bt = Document::from(bt);
//! assert_eq!(from_bt.len(), 1);
//! ```

use crate::{
    encoding::to_json,
    io::{JsonOutputMode, JsonWriterSettings},
    Bson,
};
use std::{collections::BTreeMap, fmt, iter::FromIterator, slice::Iter, vec::IntoIter};

#[derive(PartialEq, Clone, Debug, Default)]
/// A document: named values in insertion order.
///
/// See also: [module level documentation](`crate::document`).
pub struct Document(Vec<(String, Bson)>);

impl Document {
    /// Creates an empty [`Document`].
    pub fn new() -> Document { Document(Vec::new()) }

    /// Returns the number of elements.
    pub fn len(&self) -> usize { self.0.len() }

    /// Indicates whether the [`Document`] has no elements.
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Returns an [`Iter`] of the name value pairs, in order.
    pub fn iter(&self) -> Iter<(String, Bson)> { self.0.iter() }

    /// Looks up an element by name.
    ///
    /// # Example
    ///
    /// ```
    /// use bson_io::prelude::*;
    ///
    /// let mut doc = Document::new();
    /// doc.insert("x", 1);
    ///
    /// assert_eq!(doc.get("x"), Some(&Bson::Int32(1)));
    /// assert_eq!(doc.get("y"), None);
    /// ```
    pub fn get(&self, name: &str) -> Option<&Bson> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Indicates whether an element with this name exists.
    pub fn contains_key(&self, name: &str) -> bool { self.get(name).is_some() }

    /// Inserts an element. An existing element with the same name is replaced in place
    /// and its old value returned; otherwise the element is appended.
    pub fn insert<K: Into<String>, V: Into<Bson>>(&mut self, name: K, value: V) -> Option<Bson> {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.0.push((name, value));
                None
            }
        }
    }

    /// Removes an element by name, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<Bson> {
        let idx = self.0.iter().position(|(k, _)| k == name)?;
        Some(self.0.remove(idx).1)
    }
}

impl IntoIterator for Document {
    type IntoIter = IntoIter<(String, Bson)>;
    type Item = (String, Bson);

    fn into_iter(self) -> IntoIter<(String, Bson)> { self.0.into_iter() }
}

impl<'a> IntoIterator for &'a Document {
    type IntoIter = Iter<'a, (String, Bson)>;
    type Item = &'a (String, Bson);

    fn into_iter(self) -> Iter<'a, (String, Bson)> { self.0.iter() }
}

impl<K: Into<String>, V: Into<Bson>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Document {
        let mut doc = Document::new();
        for (k, v) in iter {
            doc.insert(k, v);
        }
        doc
    }
}

impl<V: Into<Bson>> From<BTreeMap<String, V>> for Document {
    fn from(bt: BTreeMap<String, V>) -> Self { Self::from_iter(bt) }
}

/// Renders the document as TenGen-mode JSON, the shell's own syntax.
impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let settings = JsonWriterSettings {
            output_mode: JsonOutputMode::TenGen,
            ..JsonWriterSettings::default()
        };
        match to_json(self, settings) {
            Ok(s) => f.write_str(&s),
            Err(_) => Err(fmt::Error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_in_place() {
        let mut doc = Document::new();
        assert_eq!(doc.insert("a", 1), None);
        doc.insert("b", 2);
        assert_eq!(doc.insert("a", 3), Some(Bson::Int32(1)));

        let v: Vec<(String, Bson)> = doc.into_iter().collect();
        assert_eq!(
            v,
            vec![
                ("a".to_string(), Bson::Int32(3)),
                ("b".to_string(), Bson::Int32(2))
            ]
        );
    }

    #[test]
    fn remove() {
        let mut doc: Document = vec![("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(doc.remove("a"), Some(Bson::Int32(1)));
        assert_eq!(doc.remove("a"), None);
        assert_eq!(doc.len(), 1);
        assert!(doc.contains_key("b"));
    }

    #[test]
    fn display() {
        let doc: Document = vec![("x", 1)].into_iter().collect();
        assert_eq!(doc.to_string(), "{ \"x\" : 1 }");
    }
}
