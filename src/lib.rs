//! # input-mask
//!
//! Input-mask binding addon for signal-based component frameworks.
//!
//! The crate is a thin lifecycle/attachment shim around an opaque
//! client-side masking engine: it serializes configuration options, attaches
//! a masking element to a host field, relays value changes between client
//! and server, and forwards validity state. The mask algorithm itself lives
//! behind the [`MaskClient`] contract and is out of scope.
//!
//! ## Architecture
//!
//! ```text
//! MaskController --attach--> HostField (id-based registry lookup)
//!       |                        |
//!       | init payload,          | value changes (origin-tagged)
//!       | set_value              v
//!       +------------> ClientConnection --> MaskClient instance
//! ```
//!
//! Everything runs on the framework's single logical event-processing
//! thread; the only suspension point is the client round trip behind
//! [`MaskController::get_masked_value`] / [`MaskController::get_unmasked_value`].
//!
//! ## Modules
//!
//! - [`option`] - Immutable `{key, value, eval}` option triples and factories
//! - [`host`] - Host-field registry, capabilities, lifecycle listeners
//! - [`client`] - Client boundary: mask contract, connection, queries
//! - [`controller`] - The attachment state machine and value relay
//! - [`value_field`] - The controller exposed as a bindable form field

pub mod client;
pub mod controller;
pub mod error;
pub mod host;
pub mod option;
pub mod value_field;

// Re-export commonly used items
pub use client::{ClientConnection, MaskClient, ScriptedClient};
pub use controller::{AttachState, MaskController, MASK_ELEMENT_TAG};
pub use error::MaskError;
pub use host::{HostCaps, HostField, HostId, HostKind, Registration, ValueOrigin};
pub use option::{MaskOption, OptionValue};
pub use value_field::MaskedValueField;
