//! The filter chain: ordered directive stack with integrity enforcement.
//!
//! The chain is the scan-capability boundary the visibility engine relies
//! on. System-owned directives live under the reserved namespace; every
//! external mutation path here rejects reserved names, so a later caller
//! operating on the same chain can neither strip the engine's filters nor
//! spoof new ones under its namespace. A rejected call leaves the chain
//! untouched.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, ScanError};
use crate::filter::{FilterDirective, PermissionSet, is_reserved_name};

/// An ordered stack of filter directives attached to one scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterChain {
    directives: Vec<FilterDirective>,
}

impl FilterChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// The directives currently attached, in application order.
    pub fn directives(&self) -> &[FilterDirective] {
        &self.directives
    }

    /// Attaches a system-owned directive, replacing any existing directive
    /// with the same name. Replacement (rather than duplication) is what
    /// makes re-applying the same directive sequence idempotent.
    pub(crate) fn attach_system(&mut self, directive: FilterDirective) {
        match self
            .directives
            .iter_mut()
            .find(|d| d.name() == directive.name())
        {
            Some(existing) => *existing = directive,
            None => self.directives.push(directive),
        }
    }

    /// Adds an externally-owned directive.
    ///
    /// # Errors
    ///
    /// - [`ScanError::IntegrityViolation`] if the directive's name falls in
    ///   the reserved namespace or the directive claims to be system-owned
    ///   (both are spoofing attempts).
    /// - [`ScanError::InvalidArgument`] if a directive with the same name is
    ///   already attached.
    pub fn add(&mut self, directive: FilterDirective) -> Result<()> {
        if is_reserved_name(directive.name()) || directive.is_system_owned() {
            warn!(
                name = %directive.name(),
                "rejected attempt to add a directive under the reserved namespace"
            );
            return Err(ScanError::IntegrityViolation(format!(
                "cannot add directive '{}': the '{}' namespace is reserved for system-owned visibility filters",
                directive.name(),
                crate::filter::RESERVED_FILTER_PREFIX,
            )));
        }
        if self.directives.iter().any(|d| d.name() == directive.name()) {
            return Err(ScanError::InvalidArgument(format!(
                "a directive named '{}' is already attached",
                directive.name()
            )));
        }
        debug!(name = %directive.name(), "attached external filter directive");
        self.directives.push(directive);
        Ok(())
    }

    /// Removes the directive named `name`.
    ///
    /// Removing an unknown (non-reserved) name is a no-op, matching the
    /// underlying store's scanner behavior.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::IntegrityViolation`] if `name` is reserved.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        self.reject_reserved(name, "remove")?;
        self.directives.retain(|d| d.name() != name);
        Ok(())
    }

    /// Renames the directive `name` to `new_name`.
    ///
    /// # Errors
    ///
    /// - [`ScanError::IntegrityViolation`] if either name is reserved.
    /// - [`ScanError::InvalidArgument`] if `name` is unknown or `new_name`
    ///   is already taken.
    pub fn rename(&mut self, name: &str, new_name: &str) -> Result<()> {
        self.reject_reserved(name, "rename")?;
        self.reject_reserved(new_name, "rename to")?;
        if self.directives.iter().any(|d| d.name() == new_name) {
            return Err(ScanError::InvalidArgument(format!(
                "a directive named '{new_name}' is already attached"
            )));
        }
        match self.directives.iter_mut().find(|d| d.name() == name) {
            Some(directive) => {
                directive.set_name(new_name.to_owned());
                Ok(())
            }
            None => Err(ScanError::InvalidArgument(format!(
                "no directive named '{name}' is attached"
            ))),
        }
    }

    /// Replaces the labels of the directive named `name`.
    ///
    /// Updating an unknown (non-reserved) name is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::IntegrityViolation`] if `name` is reserved.
    pub fn update_labels(&mut self, name: &str, labels: PermissionSet) -> Result<()> {
        self.reject_reserved(name, "mutate")?;
        if let Some(directive) = self.directives.iter_mut().find(|d| d.name() == name) {
            directive.set_labels(labels);
        }
        Ok(())
    }

    /// Removes all externally-owned directives. System-owned directives are
    /// retained.
    pub fn clear(&mut self) {
        self.directives.retain(FilterDirective::is_system_owned);
    }

    fn reject_reserved(&self, name: &str, action: &str) -> Result<()> {
        if is_reserved_name(name) {
            warn!(
                name = %name,
                action = %action,
                "rejected attempt to mutate a system-owned visibility filter"
            );
            return Err(ScanError::IntegrityViolation(format!(
                "cannot {action} '{name}': system-owned visibility filters are immutable"
            )));
        }
        Ok(())
    }
}
