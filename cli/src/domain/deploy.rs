//! Deploy domain types
//!
//! Defines the deploy pipeline as a state machine with explicit phases.

use std::fmt;
use std::time::Duration;

use super::version::ParsedVersion;

/// Phases of a deploy run, in the order they are reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployPhase {
    Start,
    /// Placeholders replaced
    Interpolated,
    /// Manifest name matches the targeted deployment
    Validated,
    /// Diff fetched and shown
    Diffed,
    /// User confirmed
    Confirmed,
    /// Every release with a source URL is on the director
    ReleasesSynced,
    /// Update call returned
    Updated,
    Done,
    /// Terminal failure state
    Aborted,
}

impl DeployPhase {
    /// Ordered phases of a successful run
    pub const SEQUENCE: [DeployPhase; 8] = [
        Self::Start,
        Self::Interpolated,
        Self::Validated,
        Self::Diffed,
        Self::Confirmed,
        Self::ReleasesSynced,
        Self::Updated,
        Self::Done,
    ];

    /// Get human-readable name for the phase
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Interpolated => "Interpolate",
            Self::Validated => "Validate",
            Self::Diffed => "Diff",
            Self::Confirmed => "Confirm",
            Self::ReleasesSynced => "Sync Releases",
            Self::Updated => "Update",
            Self::Done => "Done",
            Self::Aborted => "Aborted",
        }
    }

    /// What the pipeline is doing while moving into this phase
    pub fn activity(&self) -> &'static str {
        match self {
            Self::Start => "starting",
            Self::Interpolated => "interpolating manifest",
            Self::Validated => "validating manifest",
            Self::Diffed => "fetching diff",
            Self::Confirmed => "waiting for confirmation",
            Self::ReleasesSynced => "uploading releases",
            Self::Updated => "updating deployment",
            Self::Done => "finishing",
            Self::Aborted => "aborting",
        }
    }

    /// Next phase of a successful run; terminal phases have none
    pub fn next(&self) -> Option<DeployPhase> {
        let index = Self::SEQUENCE.iter().position(|phase| phase == self)?;
        Self::SEQUENCE.get(index + 1).copied()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }
}

impl fmt::Display for DeployPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which instance groups skip their drain scripts
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SkipDrain {
    /// Drain scripts run normally
    #[default]
    Disabled,
    All,
    Only(Vec<String>),
}

impl SkipDrain {
    /// Build from the CLI form: absent, bare flag, or `group,group`
    pub fn from_flag(flag: Option<Option<&str>>) -> Self {
        match flag {
            None => Self::Disabled,
            Some(None) | Some(Some("*")) => Self::All,
            Some(Some(groups)) => {
                let groups: Vec<String> = groups
                    .split(',')
                    .map(str::trim)
                    .filter(|g| !g.is_empty())
                    .map(String::from)
                    .collect();
                if groups.is_empty() {
                    Self::All
                } else {
                    Self::Only(groups)
                }
            }
        }
    }

    /// Value of the director's `skip_drain` query parameter
    pub fn query_value(&self) -> Option<String> {
        match self {
            Self::Disabled => None,
            Self::All => Some("*".to_string()),
            Self::Only(groups) => Some(groups.join(",")),
        }
    }
}

/// Modifiers applied to the final update call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployOptions {
    pub recreate: bool,
    pub skip_drain: SkipDrain,
}

impl DeployOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: recreate every VM
    pub fn with_recreate(mut self, recreate: bool) -> Self {
        self.recreate = recreate;
        self
    }

    /// Builder: set skip-drain directive
    pub fn with_skip_drain(mut self, skip_drain: SkipDrain) -> Self {
        self.skip_drain = skip_drain;
        self
    }
}

/// The terminal artifact of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    pub manifest: Vec<u8>,
    pub recreate: bool,
    pub skip_drain: SkipDrain,
}

/// One remote release to hand to the uploader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub name: String,
    pub url: String,
    pub sha1: Option<String>,
    pub version: ParsedVersion,
}

/// What the uploader did with a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded,
    /// The director already had this name/version
    AlreadyPresent,
}

/// Result of a pipeline step execution
#[derive(Debug, Clone)]
pub struct StepResult {
    pub phase: DeployPhase,
    pub duration: Duration,
}

/// Summary of a successful run
#[derive(Debug, Clone)]
pub struct DeployReport {
    pub deployment: String,
    pub phase: DeployPhase,
    pub steps: Vec<StepResult>,
    /// Releases sent to the uploader, with what it did
    pub uploads: Vec<(String, UploadOutcome)>,
    /// Releases without a source URL
    pub skipped: Vec<String>,
}

impl DeployReport {
    pub fn new(deployment: impl Into<String>) -> Self {
        Self {
            deployment: deployment.into(),
            phase: DeployPhase::Start,
            steps: Vec::new(),
            uploads: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn uploaded_count(&self) -> usize {
        self.uploads
            .iter()
            .filter(|(_, outcome)| *outcome == UploadOutcome::Uploaded)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_sequence_follows_next() {
        let mut phase = DeployPhase::Start;
        let mut seen = vec![phase];
        while let Some(next) = phase.next() {
            seen.push(next);
            phase = next;
        }
        assert_eq!(seen, DeployPhase::SEQUENCE);
        assert!(phase.is_terminal());
        assert_eq!(DeployPhase::Aborted.next(), None);
    }

    #[test]
    fn test_skip_drain_from_flag() {
        assert_eq!(SkipDrain::from_flag(None), SkipDrain::Disabled);
        assert_eq!(SkipDrain::from_flag(Some(None)), SkipDrain::All);
        assert_eq!(SkipDrain::from_flag(Some(Some("*"))), SkipDrain::All);
        assert_eq!(
            SkipDrain::from_flag(Some(Some("router, db"))),
            SkipDrain::Only(vec!["router".to_string(), "db".to_string()])
        );
    }

    #[test]
    fn test_skip_drain_query_value() {
        assert_eq!(SkipDrain::Disabled.query_value(), None);
        assert_eq!(SkipDrain::All.query_value().as_deref(), Some("*"));
        assert_eq!(
            SkipDrain::Only(vec!["a".into(), "b".into()])
                .query_value()
                .as_deref(),
            Some("a,b")
        );
    }

    #[test]
    fn test_deploy_options_builder() {
        let options = DeployOptions::new()
            .with_recreate(true)
            .with_skip_drain(SkipDrain::All);
        assert!(options.recreate);
        assert_eq!(options.skip_drain, SkipDrain::All);
        assert_eq!(DeployOptions::default().skip_drain, SkipDrain::Disabled);
    }
}
