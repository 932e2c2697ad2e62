use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};
use uuid::Uuid;

/// Opaque identifier of a single `import_table` invocation, used to tag logs.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportId(Arc<str>);

impl ImportId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(Arc::from(id.into()))
    }

    pub fn generate() -> Self {
        Self::new(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ImportId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ImportId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for ImportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_id_serializes_as_plain_string() {
        let id = ImportId::from("run-42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"run-42\"");

        let back: ImportId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert_eq!(back.to_string(), "run-42");
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = ImportId::generate();
        let b = ImportId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
    }
}
