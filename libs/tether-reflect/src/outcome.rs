use tether_api::Diagnostics;

/// Result of a top-level conversion: the value, if any, plus every
/// diagnostic recorded on the way.
///
/// The value is present only when no error was recorded. Warnings may
/// accompany a successful value.
#[derive(Debug, Clone)]
#[must_use]
pub struct Outcome<T> {
    value: Option<T>,
    diagnostics: Diagnostics,
}

impl<T> Outcome<T> {
    pub(crate) fn new(value: Option<T>, diagnostics: Diagnostics) -> Self {
        let value = if diagnostics.has_error() { None } else { value };
        Self { value, diagnostics }
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn has_error(&self) -> bool {
        self.diagnostics.has_error()
    }

    pub fn into_parts(self) -> (Option<T>, Diagnostics) {
        (self.value, self.diagnostics)
    }

    /// `Ok` with the value and any warnings, or `Err` with the diagnostics.
    pub fn into_result(self) -> Result<(T, Diagnostics), Diagnostics> {
        match self.value {
            Some(value) => Ok((value, self.diagnostics)),
            None => Err(self.diagnostics),
        }
    }
}
