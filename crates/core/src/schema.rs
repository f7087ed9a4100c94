//! Feature schema: the ordered list of named numeric inputs a pipeline consumes.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{ArtifactError, ArtifactResult};

/// Feature names of the reference diabetes dataset, in training order.
pub const REFERENCE_FEATURES: [&str; 10] = [
    "age", "sex", "bmi", "bp", "s1", "s2", "s3", "s4", "s5", "s6",
];

/// Ordered, immutable sequence of feature names.
///
/// Order is significant: position `i` in the schema is column `i` of the
/// matrix the pipeline was fitted on. Names are unique and non-blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    pub fn new<I, S>(names: I) -> ArtifactResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(ArtifactError::schema("schema must list at least one feature"));
        }

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if name.trim().is_empty() {
                return Err(ArtifactError::schema("feature names must not be blank"));
            }
            if !seen.insert(name.as_str()) {
                return Err(ArtifactError::schema(format!("duplicate feature name '{name}'")));
            }
        }

        Ok(Self { names })
    }

    /// The ten-slot diabetes schema (`age, sex, bmi, bp, s1..s6`).
    pub fn reference() -> Self {
        Self {
            names: REFERENCE_FEATURES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl TryFrom<Vec<String>> for FeatureSchema {
    type Error = ArtifactError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FeatureSchema> for Vec<String> {
    fn from(value: FeatureSchema) -> Self {
        value.names
    }
}
