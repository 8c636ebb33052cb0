//! Namespaced object identity.

use crate::KeyError;

/// Identity of a namespaced object (`namespace/name`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectKey {
    namespace: String,
    name: String,
}

impl ObjectKey {
    /// Creates a key from its two segments.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Returns the namespace segment.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the name segment.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parses a key from a string.
    ///
    /// The string must be in the format `{namespace}/{name}`.
    pub fn parse(s: &str) -> Result<Self, KeyError> {
        if s.is_empty() {
            return Err(KeyError::Empty);
        }

        let Some((namespace, name)) = s.split_once('/') else {
            return Err(KeyError::MissingSeparator(s.to_string()));
        };

        if namespace.is_empty() {
            return Err(KeyError::EmptySegment {
                segment: "namespace",
                actual: s.to_string(),
            });
        }

        if name.is_empty() {
            return Err(KeyError::EmptySegment {
                segment: "name",
                actual: s.to_string(),
            });
        }

        if name.contains('/') {
            return Err(KeyError::ExtraSeparator(s.to_string()));
        }

        Ok(Self::new(namespace, name))
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

impl std::str::FromStr for ObjectKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for ObjectKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for ObjectKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
