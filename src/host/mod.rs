//! Host Fields - The input fields a mask binds to.
//!
//! Hosts live in an id-based registry (relation + lookup, never ownership):
//! a controller stores a `HostId` and resolves it on every operation, so a
//! destroyed host invalidates the binding instead of being kept alive by it.
//!
//! Capabilities are explicit. A host advertises what it supports
//! (value-change notification, validity state, settable value) and callers
//! branch on capability presence, never on the concrete field type.

pub mod field;
pub mod registry;

use bitflags::bitflags;

pub use field::HostField;

// =============================================================================
// Identifiers
// =============================================================================

/// Identifier of a host field in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostId(pub(crate) usize);

/// Identifier of an element in a host's child-element tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub(crate) usize);

// =============================================================================
// Host Kind and Capabilities
// =============================================================================

/// Concrete kind of a host field.
///
/// Only [`HostKind::TextField`] supports unmasked-value binding through
/// [`crate::value_field::MaskedValueField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    TextField,
    TextArea,
    Custom,
}

bitflags! {
    /// Optional capabilities a host field may advertise.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HostCaps: u8 {
        /// Notifies listeners when its value changes, tagged with the origin.
        const VALUE_CHANGE = 1 << 0;
        /// Exposes an invalid flag and an error message.
        const VALIDITY = 1 << 1;
        /// Accepts programmatic value assignment.
        const SETTABLE_VALUE = 1 << 2;
    }
}

// =============================================================================
// Value Origin
// =============================================================================

/// Where a host value change came from.
///
/// Client-originated changes (the user typing through the mask) must never
/// be relayed back into the client instance; programmatic changes always are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueOrigin {
    /// The change was produced by the client-side mask itself.
    Client,
    /// The change was assigned programmatically on the server side.
    Programmatic,
}

// =============================================================================
// Registration
// =============================================================================

/// Cancellable handle for a registered listener.
///
/// Removing a registration is idempotent; removing one whose listener has
/// already fired (one-shot mount listeners) is a no-op.
pub struct Registration {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Registration {
    pub(crate) fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Cancel the underlying listener.
    pub fn remove(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
