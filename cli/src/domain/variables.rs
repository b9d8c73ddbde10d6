//! Variable resolution and manifest interpolation
//!
//! Placeholders look like `((name))`. Lookup is a single ordered chain:
//! direct `name=value` pairs first, then each file-backed source in the
//! order given. The first source that defines a name wins.

use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde_yaml::{Mapping, Value};
use tracing::{debug, trace};

use super::ports::VariableSource;
use crate::error::DeployError;

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\(\(\s*([A-Za-z0-9_./\-]+)\s*\)\)").expect("placeholder pattern is valid")
    })
}

/// A direct `name=value` variable (highest priority)
#[derive(Debug, Clone, PartialEq)]
pub struct VarKv {
    pub name: String,
    pub value: Value,
}

impl VarKv {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl FromStr for VarKv {
    type Err = String;

    /// Parse `name=value`; the value is read as a YAML scalar
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, raw) = s
            .split_once('=')
            .ok_or_else(|| format!("Expected variable '{}' to be in format 'name=value'", s))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(format!("Expected variable '{}' to have a name", s));
        }

        let value = if raw.is_empty() {
            Value::String(String::new())
        } else {
            match serde_yaml::from_str::<Value>(raw) {
                Ok(v @ (Value::Bool(_) | Value::Number(_) | Value::String(_))) => v,
                _ => Value::String(raw.to_string()),
            }
        };

        Ok(Self::new(name, value))
    }
}

/// In-memory variable source
#[cfg(test)]
pub struct StaticVariables {
    name: String,
    vars: Mapping,
}

#[cfg(test)]
impl StaticVariables {
    pub fn new(name: impl Into<String>, vars: Mapping) -> Self {
        Self {
            name: name.into(),
            vars,
        }
    }
}

#[cfg(test)]
#[async_trait::async_trait]
impl VariableSource for StaticVariables {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(&self) -> anyhow::Result<Mapping> {
        Ok(self.vars.clone())
    }
}

/// Ordered variable sources for one pipeline run
#[derive(Clone, Default)]
pub struct VariableSet {
    kvs: Vec<VarKv>,
    sources: Vec<Arc<dyn VariableSource>>,
}

impl VariableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a direct pair
    pub fn with_kv(mut self, kv: VarKv) -> Self {
        self.kvs.push(kv);
        self
    }

    /// Builder: append a file-backed source (lower priority than earlier ones)
    pub fn with_source(mut self, source: Arc<dyn VariableSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.kvs.is_empty() && self.sources.is_empty()
    }

    /// Load every file-backed source, in order
    pub async fn resolve(&self) -> Result<ResolvedVariables, DeployError> {
        let mut files = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let vars = source
                .load()
                .await
                .map_err(|reason| DeployError::VarsFile {
                    source_name: source.name().to_string(),
                    reason,
                })?;
            debug!(source = %source.name(), count = vars.len(), "Loaded variables");
            files.push(LoadedSource {
                name: source.name().to_string(),
                vars,
            });
        }

        Ok(ResolvedVariables {
            kvs: self.kvs.clone(),
            files,
        })
    }
}

struct LoadedSource {
    name: String,
    vars: Mapping,
}

/// Variables ready for lookup
pub struct ResolvedVariables {
    kvs: Vec<VarKv>,
    files: Vec<LoadedSource>,
}

/// Where a resolved variable came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableOrigin<'a> {
    Kv,
    File(&'a str),
}

impl ResolvedVariables {
    /// Look up a name through the precedence chain
    pub fn lookup(&self, name: &str) -> Option<(&Value, VariableOrigin<'_>)> {
        // Later pairs override earlier ones, as with repeated CLI flags
        let from_kv = self.kvs.iter().rev().find_map(|kv| {
            if kv.name == name {
                return Some(&kv.value);
            }
            let rest = name.strip_prefix(kv.name.as_str())?.strip_prefix('.')?;
            descend(&kv.value, rest)
        });
        if let Some(value) = from_kv {
            return Some((value, VariableOrigin::Kv));
        }

        self.files.iter().find_map(|file| {
            lookup_in_mapping(&file.vars, name).map(|v| (v, VariableOrigin::File(&file.name)))
        })
    }
}

fn lookup_in_mapping<'a>(vars: &'a Mapping, name: &str) -> Option<&'a Value> {
    if let Some(value) = vars.get(name) {
        return Some(value);
    }
    let (head, rest) = name.split_once('.')?;
    descend(vars.get(head)?, rest)
}

fn descend<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, key| current.as_mapping()?.get(key))
}

/// Replace every placeholder in `manifest` and serialize the result
pub fn interpolate(manifest: &[u8], vars: &ResolvedVariables) -> Result<Vec<u8>, DeployError> {
    let document: Value = serde_yaml::from_slice(manifest)
        .map_err(|e| DeployError::invalid_manifest(format!("Parsing manifest: {}", e)))?;

    let evaluated = evaluate(document, vars)?;

    let rendered = serde_yaml::to_string(&evaluated)
        .map_err(|e| DeployError::invalid_manifest(format!("Serializing manifest: {}", e)))?;
    Ok(rendered.into_bytes())
}

fn evaluate(value: Value, vars: &ResolvedVariables) -> Result<Value, DeployError> {
    match value {
        Value::String(s) => evaluate_string(&s, vars),
        Value::Sequence(items) => items
            .into_iter()
            .map(|item| evaluate(item, vars))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Sequence),
        Value::Mapping(mapping) => {
            let mut out = Mapping::with_capacity(mapping.len());
            for (key, val) in mapping {
                out.insert(evaluate(key, vars)?, evaluate(val, vars)?);
            }
            Ok(Value::Mapping(out))
        }
        Value::Tagged(mut tagged) => {
            let inner = std::mem::take(&mut tagged.value);
            tagged.value = evaluate(inner, vars)?;
            Ok(Value::Tagged(tagged))
        }
        other => Ok(other),
    }
}

fn evaluate_string(s: &str, vars: &ResolvedVariables) -> Result<Value, DeployError> {
    let re = placeholder_regex();

    // A scalar that is exactly one placeholder keeps the variable's type
    if let Some(caps) = re.captures(s) {
        if caps.get(0).map(|m| m.as_str().len()) == Some(s.len()) {
            return resolve(&caps[1], vars).cloned();
        }
    } else {
        return Ok(Value::String(s.to_string()));
    }

    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    for caps in re.captures_iter(s) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&s[last..whole.start()]);
        out.push_str(&scalar_to_string(name.as_str(), resolve(name.as_str(), vars)?)?);
        last = whole.end();
    }
    out.push_str(&s[last..]);

    Ok(Value::String(out))
}

fn resolve<'a>(name: &str, vars: &'a ResolvedVariables) -> Result<&'a Value, DeployError> {
    let (value, origin) = vars.lookup(name).ok_or_else(|| DeployError::MissingVariable {
        name: name.to_string(),
    })?;
    trace!(variable = name, ?origin, "Resolved variable");
    Ok(value)
}

fn scalar_to_string(name: &str, value: &Value) -> Result<String, DeployError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok("null".to_string()),
        _ => Err(DeployError::invalid_manifest(format!(
            "Expected variable '{}' to be a scalar when embedded in a string",
            name
        ))),
    }
}
