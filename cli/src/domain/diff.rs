//! Deployment diff lines

/// How a diff line changed between the live and proposed deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChangeMarker {
    #[default]
    Unchanged,
    Added,
    Removed,
}

impl ChangeMarker {
    /// Parse the director's marker; anything unknown renders as unchanged
    pub fn from_marker(marker: Option<&str>) -> Self {
        match marker {
            Some("added") => Self::Added,
            Some("removed") => Self::Removed,
            _ => Self::Unchanged,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Unchanged => "  ",
            Self::Added => "+ ",
            Self::Removed => "- ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub text: String,
    pub marker: ChangeMarker,
}

impl DiffLine {
    pub fn new(text: impl Into<String>, marker: ChangeMarker) -> Self {
        Self {
            text: text.into(),
            marker,
        }
    }

    /// Render as one output unit, terminator included
    pub fn render(&self) -> String {
        format!("{}{}\n", self.marker.prefix(), self.text)
    }
}

#[cfg(test)]
impl DiffLine {
    pub fn unchanged(text: impl Into<String>) -> Self {
        Self::new(text, ChangeMarker::Unchanged)
    }

    pub fn added(text: impl Into<String>) -> Self {
        Self::new(text, ChangeMarker::Added)
    }

    pub fn removed(text: impl Into<String>) -> Self {
        Self::new(text, ChangeMarker::Removed)
    }
}

/// Render lines in the order given
pub fn render_diff(lines: &[DiffLine]) -> Vec<String> {
    lines.iter().map(DiffLine::render).collect()
}
