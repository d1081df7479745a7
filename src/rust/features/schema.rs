use std::collections::HashSet;

/// The ordered field list a trained classifier expects, plus which of those
/// fields are categorical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    names: Vec<String>,
    categorical: Vec<String>,
}

impl FeatureSchema {
    pub fn new<N, C>(names: N, categorical: C) -> Self
    where
        N: IntoIterator,
        N::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            categorical: categorical.into_iter().map(Into::into).collect(),
        }
    }

    /// Field names in the order the model was trained on
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Fields that must reach the model as strings
    pub fn categorical(&self) -> &[String] {
        &self.categorical
    }

    pub fn is_categorical(&self, name: &str) -> bool {
        self.categorical.iter().any(|c| c == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Checks the schema is usable: non-empty, no repeated names, and every
    /// categorical field is one of the schema fields.
    pub fn check(&self) -> Result<(), String> {
        if self.names.is_empty() {
            return Err("schema has no feature names".to_string());
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.names.iter().find(|n| !seen.insert(n.as_str())) {
            return Err(format!("feature '{}' appears more than once", dup));
        }
        if let Some(stray) = self.categorical.iter().find(|c| !seen.contains(c.as_str())) {
            return Err(format!("categorical feature '{}' is not in the schema", stray));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_rejects_duplicates() {
        let schema = FeatureSchema::new(["Age", "Age"], Vec::<String>::new());
        assert!(schema.check().unwrap_err().contains("more than once"));
    }

    #[test]
    fn test_check_rejects_stray_categorical() {
        let schema = FeatureSchema::new(["Age"], ["Department"]);
        assert!(schema.check().is_err());
    }

    #[test]
    fn test_lookup() {
        let schema = FeatureSchema::new(["Age", "Department"], ["Department"]);
        assert!(schema.check().is_ok());
        assert_eq!(schema.position("Department"), Some(1));
        assert!(schema.is_categorical("Department"));
        assert!(!schema.is_categorical("Age"));
    }
}
