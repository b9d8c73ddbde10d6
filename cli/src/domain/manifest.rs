//! Interpolated manifest and its release list

use serde::{Deserialize, Deserializer};
use serde_yaml::Value;
use tracing::warn;

use crate::error::DeployError;

/// A release referenced by the manifest
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseSpec {
    pub name: String,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(deserialize_with = "version_string")]
    pub version: String,
}

impl ReleaseSpec {
    /// Source URL, if the release must be fetched by the director
    pub fn source_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }
}

/// Accept numeric versions such as `version: 2`.
///
/// Floats come back in YAML's canonical form, so `1.10` becomes `1.1`.
fn version_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => {
            if n.is_f64() {
                warn!(
                    version = %n,
                    "Release version is a YAML float; quote it to keep trailing zeros"
                );
            }
            Ok(n.to_string())
        }
        other => Err(serde::de::Error::custom(format!(
            "expected release version to be a string, got {:?}",
            other
        ))),
    }
}

#[derive(Deserialize)]
struct ManifestFields {
    name: String,
    #[serde(default)]
    releases: Vec<ReleaseSpec>,
}

/// Manifest bytes after interpolation, plus the fields the pipeline needs
#[derive(Debug, Clone)]
pub struct ManifestDocument {
    bytes: Vec<u8>,
    name: String,
    releases: Vec<ReleaseSpec>,
}

impl ManifestDocument {
    pub fn parse(bytes: Vec<u8>) -> Result<Self, DeployError> {
        let fields: ManifestFields = serde_yaml::from_slice(&bytes)
            .map_err(|e| DeployError::invalid_manifest(e.to_string()))?;

        Ok(Self {
            bytes,
            name: fields.name,
            releases: fields.releases,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn releases(&self) -> &[ReleaseSpec] {
        &self.releases
    }

    /// Check the declared name against the targeted deployment
    pub fn validate_for(&self, deployment: &str) -> Result<&[ReleaseSpec], DeployError> {
        if self.name != deployment {
            return Err(DeployError::NameMismatch {
                expected: deployment.to_string(),
                actual: self.name.clone(),
            });
        }
        Ok(self.releases())
    }
}
