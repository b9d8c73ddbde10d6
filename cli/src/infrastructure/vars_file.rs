//! YAML vars files
//!
//! A vars file is a YAML mapping of variable names to values, passed
//! with `-l/--vars-file`. Files are read once per run.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_yaml::{Mapping, Value};

use crate::domain::VariableSource;

pub struct VarsFile {
    path: PathBuf,
    name: String,
}

impl VarsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }
}

#[async_trait]
impl VariableSource for VarsFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(&self) -> Result<Mapping> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(Mapping::new());
        }

        let value: Value = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;

        match value {
            Value::Mapping(vars) => Ok(vars),
            Value::Null => Ok(Mapping::new()),
            _ => anyhow::bail!(
                "Expected {} to contain a YAML mapping of variables",
                self.path.display()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio_test::{assert_err, assert_ok};

    fn vars_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[tokio::test]
    async fn test_loads_mapping() {
        let file = vars_file("name1: val1\nnested:\n  key: value\n");
        let vars = assert_ok!(VarsFile::new(file.path()).load().await);

        assert_eq!(vars.get("name1"), Some(&Value::from("val1")));
        assert!(vars.get("nested").and_then(Value::as_mapping).is_some());
    }

    #[tokio::test]
    async fn test_empty_file_has_no_vars() {
        let file = vars_file("");
        let vars = assert_ok!(VarsFile::new(file.path()).load().await);
        assert!(vars.is_empty());
    }

    #[tokio::test]
    async fn test_rejects_non_mapping() {
        let file = vars_file("- a\n- b\n");
        assert_err!(VarsFile::new(file.path()).load().await);
    }

    #[tokio::test]
    async fn test_missing_file_names_path() {
        let source = VarsFile::new("/nonexistent/vars.yml");
        let err = assert_err!(source.load().await);
        assert!(err.to_string().contains("/nonexistent/vars.yml"));
        assert_eq!(source.name(), "/nonexistent/vars.yml");
    }
}
