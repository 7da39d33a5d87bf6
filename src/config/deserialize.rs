// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Validates release names, dependency lists and namespaces while parsing.

use serde::Deserialize;

use crate::types::{Namespace, ReleaseName};

pub fn deserialize_release_name<'de, D>(deserializer: D) -> Result<ReleaseName, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    ReleaseName::new(&s).map_err(serde::de::Error::custom)
}

pub fn deserialize_release_names<'de, D>(deserializer: D) -> Result<Vec<ReleaseName>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let values: Vec<String> = Vec::deserialize(deserializer)?;
    values
        .iter()
        .map(|s| ReleaseName::new(s))
        .collect::<Result<Vec<_>, _>>()
        .map_err(serde::de::Error::custom)
}

pub fn deserialize_namespace<'de, D>(deserializer: D) -> Result<Namespace, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Namespace::new(&s).map_err(serde::de::Error::custom)
}
