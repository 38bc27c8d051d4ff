use std::collections::{HashMap, hash_map};

use crate::http::header::{HeaderField, HeaderParseError, HeaderValueTrait};

use super::{HeaderName, HeaderValue};

/// Header fields of a message, one value per name
#[derive(Debug, Clone, Default)]
pub struct HeaderMap {
    map: HashMap<HeaderName, HeaderValue>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Inserts a field, replacing an earlier one with the same name
    ///
    /// The later spelling of the name replaces the earlier one too.
    pub fn insert(&mut self, name: HeaderName, value: HeaderValue) -> Option<HeaderValue> {
        let old = self.map.remove(&name);
        self.map.insert(name, value);
        old
    }

    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.map.get(&HeaderName::from(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(&HeaderName::from(name))
    }

    pub fn get_header<T: HeaderField>(&self) -> Result<Option<T::Output>, HeaderParseError> {
        match self.map.get(&T::name()) {
            None => Ok(None),
            Some(val) => T::parse(val).map(Some),
        }
    }

    pub fn set_header<T: HeaderField>(&mut self, value: T::Output) {
        self.insert(T::name(), value.to_header_value());
    }

    pub fn remove_header<T: HeaderField>(&mut self) -> Option<HeaderValue> {
        self.map.remove(&T::name())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, HeaderName, HeaderValue> {
        self.map.iter()
    }
}

impl<'a> IntoIterator for &'a HeaderMap {
    type Item = (&'a HeaderName, &'a HeaderValue);
    type IntoIter = hash_map::Iter<'a, HeaderName, HeaderValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
