//! Host Field Handle - Typed wrapper over a registry entry.
//!
//! `HostField` is a thin handle around a [`HostId`]; the record itself lives
//! in the registry. Dropping the handle does not destroy the host, call
//! [`HostField::release`] for that.
//!
//! # Example
//!
//! ```ignore
//! use input_mask::host::{HostCaps, HostField};
//!
//! let phone = HostField::text_field()
//!     .with_caps(HostCaps::VALUE_CHANGE | HostCaps::VALIDITY)
//!     .create();
//! phone.mount();
//! phone.set_value("1112223333");
//! ```

use spark_signals::Signal;

use super::registry;
use super::{HostCaps, HostId, HostKind, Registration, ValueOrigin};

// =============================================================================
// Builder
// =============================================================================

/// Builder for a host field record.
#[derive(Debug, Clone)]
pub struct HostFieldBuilder {
    kind: HostKind,
    caps: HostCaps,
}

impl HostFieldBuilder {
    /// Add capabilities to the host.
    pub fn with_caps(mut self, caps: HostCaps) -> Self {
        self.caps |= caps;
        self
    }

    /// Create the host in the registry (unmounted).
    pub fn create(self) -> HostField {
        HostField {
            id: registry::create_host(self.kind, self.caps),
        }
    }
}

// =============================================================================
// Host Field
// =============================================================================

/// Handle to a host field in the registry.
#[derive(Debug, Clone, Copy)]
pub struct HostField {
    id: HostId,
}

impl HostField {
    /// A text field: settable value with change notification.
    pub fn text_field() -> HostFieldBuilder {
        HostFieldBuilder {
            kind: HostKind::TextField,
            caps: HostCaps::VALUE_CHANGE | HostCaps::SETTABLE_VALUE,
        }
    }

    /// A multi-line text area: settable value with change notification.
    pub fn text_area() -> HostFieldBuilder {
        HostFieldBuilder {
            kind: HostKind::TextArea,
            caps: HostCaps::VALUE_CHANGE | HostCaps::SETTABLE_VALUE,
        }
    }

    /// A custom field with no capabilities beyond mounting.
    pub fn custom() -> HostFieldBuilder {
        HostFieldBuilder {
            kind: HostKind::Custom,
            caps: HostCaps::empty(),
        }
    }

    pub fn id(&self) -> HostId {
        self.id
    }

    pub fn kind(&self) -> Option<HostKind> {
        registry::kind(self.id)
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    pub fn mount(&self) {
        registry::mount(self.id);
    }

    pub fn unmount(&self) {
        registry::unmount(self.id);
    }

    pub fn is_mounted(&self) -> bool {
        registry::is_mounted(self.id)
    }

    /// Destroy the host record. The handle (and any stored [`HostId`])
    /// becomes dangling; registry lookups turn into no-ops.
    pub fn release(self) {
        registry::release_host(self.id);
    }

    // -------------------------------------------------------------------------
    // Value
    // -------------------------------------------------------------------------

    /// Current field value.
    pub fn value(&self) -> String {
        registry::value(self.id).unwrap_or_default()
    }

    /// The reactive value signal, for deriveds/effects.
    pub fn value_signal(&self) -> Option<Signal<String>> {
        registry::value_signal(self.id)
    }

    /// Assign the value programmatically (server origin).
    pub fn set_value(&self, value: &str) {
        registry::set_value(self.id, value);
    }

    /// Report a client-originated edit, e.g. the masked text produced while
    /// the user types.
    pub fn client_input(&self, value: &str) {
        registry::client_input(self.id, value);
    }

    /// Subscribe to origin-tagged value changes.
    pub fn on_value_change(&self, listener: impl Fn(&str, ValueOrigin) + 'static) -> Registration {
        registry::on_value_change(self.id, listener)
    }

    // -------------------------------------------------------------------------
    // Validity
    // -------------------------------------------------------------------------

    pub fn is_invalid(&self) -> bool {
        registry::is_invalid(self.id)
    }

    pub fn error_message(&self) -> String {
        registry::error_message(self.id)
    }
}
