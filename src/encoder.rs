//! Frozen label encoders for categorical fields.
//!
//! An encoder is fitted once over a set of strings: the distinct values are
//! sorted and each value's code is its rank. After fitting it is read-only,
//! so it can be shared freely between the catalog and the predictor.

use crate::error::{RecommendError, RecommendResult};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoder {
    field: &'static str,
    classes: Vec<String>,
    index: HashMap<String, u32>,
}

impl LabelEncoder {
    /// Fit over every value, ignoring duplicates.
    pub fn fit<I, S>(field: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut classes: Vec<String> = values.into_iter().map(|v| v.as_ref().to_string()).collect();
        classes.sort();
        classes.dedup();
        Self::from_sorted(field, classes)
    }

    fn from_sorted(field: &'static str, classes: Vec<String>) -> Self {
        let index = classes
            .iter()
            .enumerate()
            .map(|(code, class)| (class.clone(), code as u32))
            .collect();
        Self { field, classes, index }
    }

    /// Field name used in error messages
    #[must_use]
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Code for `value`; unseen values are an error, never a default.
    pub fn encode(&self, value: &str) -> RecommendResult<u32> {
        self.index
            .get(value)
            .copied()
            .ok_or_else(|| RecommendError::UnknownCategory {
                field: self.field,
                value: value.to_string(),
            })
    }

    #[must_use]
    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.index.contains_key(value)
    }

    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
