//! Parameter validation for request inputs.
//!
//! Every input type implements [`Validate`] explicitly. Validation never stops
//! at the first problem: all faults are collected in a [`FaultAggregator`] and
//! surfaced together as one [`InvalidParams`] error. A valid input yields
//! `Ok(())`; there is no such thing as an empty `InvalidParams`.
//!
//! Field paths use the wire names of the fields. Positions inside a list are
//! 0-based (`Entries[0]`, `Entries[1]`, ...) and map keys are quoted
//! (`MessageAttributes["trace"]`).

use std::fmt;
use thiserror::Error;

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;

/// Classification of a single failed precondition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaultKind {
    /// A required field is absent or empty
    Required,
    /// A batch entry reuses an id already taken by an earlier entry
    DuplicateId,
    /// Any other rejected value, with a human-readable reason
    Invalid(String),
}

/// One failed precondition, scoped to a field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFault {
    path: String,
    kind: FaultKind,
}

impl ValidationFault {
    /// Fault for a missing required field
    pub fn required(field: impl Into<String>) -> Self {
        Self {
            path: field.into(),
            kind: FaultKind::Required,
        }
    }

    /// Fault for a batch entry id that was already used in the same request
    pub fn duplicate_id(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: FaultKind::DuplicateId,
        }
    }

    /// Fault for a present but unacceptable value
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: field.into(),
            kind: FaultKind::Invalid(reason.into()),
        }
    }

    /// Full field path, e.g. `Entries[3].ReceiptHandle`
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> &FaultKind {
        &self.kind
    }

    /// Human-readable reason without the path
    pub fn reason(&self) -> String {
        match &self.kind {
            FaultKind::Required => "is required".to_string(),
            FaultKind::DuplicateId => "Id must be unique within the request".to_string(),
            FaultKind::Invalid(reason) => reason.clone(),
        }
    }

    /// Re-scope this fault under `prefix`
    fn nested(mut self, prefix: &str) -> Self {
        self.path = if self.path.is_empty() {
            prefix.to_string()
        } else {
            format!("{}.{}", prefix, self.path)
        };
        self
    }
}

impl fmt::Display for ValidationFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FaultKind::Required => write!(f, "{} is required", self.path),
            FaultKind::DuplicateId => {
                write!(f, "{}: Id must be unique within the request", self.path)
            }
            FaultKind::Invalid(reason) => write!(f, "{}: {}", self.path, reason),
        }
    }
}

/// Composite validation error holding every fault found in one pass
///
/// Constructed only by [`FaultAggregator::into_result`], so `faults()` is
/// never empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct InvalidParams {
    context: &'static str,
    faults: Vec<ValidationFault>,
}

impl InvalidParams {
    /// Name of the input type that failed validation
    pub fn context(&self) -> &'static str {
        self.context
    }

    /// Faults in discovery order
    pub fn faults(&self) -> &[ValidationFault] {
        &self.faults
    }

    pub fn len(&self) -> usize {
        self.faults.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faults.is_empty()
    }

    /// Field paths of all faults, in order
    pub fn paths(&self) -> Vec<&str> {
        self.faults.iter().map(ValidationFault::path).collect()
    }

    pub fn into_faults(self) -> Vec<ValidationFault> {
        self.faults
    }
}

impl fmt::Display for InvalidParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} validation error(s) found in {}",
            self.faults.len(),
            self.context
        )?;
        for fault in &self.faults {
            write!(f, "\n- {}", fault)?;
        }
        Ok(())
    }
}

/// Accumulates faults during one validation pass
#[derive(Debug)]
pub struct FaultAggregator {
    context: &'static str,
    faults: Vec<ValidationFault>,
}

impl FaultAggregator {
    pub fn new(context: &'static str) -> Self {
        Self {
            context,
            faults: Vec::new(),
        }
    }

    pub fn add(&mut self, fault: ValidationFault) {
        self.faults.push(fault);
    }

    /// Shorthand for `add(ValidationFault::required(field))`
    pub fn add_required(&mut self, field: &str) {
        self.add(ValidationFault::required(field));
    }

    /// Re-scope every fault of a nested error under `prefix` and append them
    pub fn add_nested(&mut self, prefix: &str, nested: InvalidParams) {
        self.faults
            .extend(nested.faults.into_iter().map(|fault| fault.nested(prefix)));
    }

    pub fn extend(&mut self, faults: impl IntoIterator<Item = ValidationFault>) {
        self.faults.extend(faults);
    }

    pub fn len(&self) -> usize {
        self.faults.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faults.is_empty()
    }

    /// Finish the pass: `Ok(())` when nothing was recorded
    pub fn into_result(self) -> Result<(), InvalidParams> {
        if self.faults.is_empty() {
            Ok(())
        } else {
            Err(InvalidParams {
                context: self.context,
                faults: self.faults,
            })
        }
    }
}

/// Explicit, reflection-free validation of an input value
pub trait Validate {
    /// Check every precondition and report all failures at once
    fn validate(&self) -> Result<(), InvalidParams>;
}

/// Record a `Required` fault when a string field is absent or empty
pub(crate) fn require_str(faults: &mut FaultAggregator, field: &str, value: &Option<String>) {
    if value.as_deref().map_or(true, str::is_empty) {
        faults.add_required(field);
    }
}

/// Record a `Required` fault when a non-string field is absent
pub(crate) fn require<T>(faults: &mut FaultAggregator, field: &str, value: &Option<T>) {
    if value.is_none() {
        faults.add_required(field);
    }
}
