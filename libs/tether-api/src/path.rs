use std::fmt;

/// One step from a parent value to a child value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// Attribute of an object.
    AttributeName(String),
    /// Element of a map, addressed by key.
    ElementKey(String),
    /// Element of a list or set, addressed by position.
    ElementIndex(usize),
}

/// Location of a value relative to the conversion root.
///
/// Appending never mutates: `at_name`, `at_key` and `at_index` return a new
/// path, so a parent can hand out child paths while keeping its own.
/// Used only to attribute diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    steps: Vec<PathStep>,
}

impl Path {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn at_name(&self, name: impl Into<String>) -> Self {
        self.with(PathStep::AttributeName(name.into()))
    }

    pub fn at_key(&self, key: impl Into<String>) -> Self {
        self.with(PathStep::ElementKey(key.into()))
    }

    pub fn at_index(&self, index: usize) -> Self {
        self.with(PathStep::ElementIndex(index))
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Number of steps, i.e. the nesting depth below the root.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    fn with(&self, step: PathStep) -> Self {
        let mut steps = Vec::with_capacity(self.steps.len() + 1);
        steps.extend_from_slice(&self.steps);
        steps.push(step);
        Self { steps }
    }
}

impl fmt::Display for Path {
    /// `outer.items[0].tags["env"]`. The root renders as an empty string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            match step {
                PathStep::AttributeName(name) if i == 0 => write!(f, "{name}")?,
                PathStep::AttributeName(name) => write!(f, ".{name}")?,
                PathStep::ElementKey(key) => write!(f, "[{key:?}]")?,
                PathStep::ElementIndex(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}
