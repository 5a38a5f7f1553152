//! Masked Value Field - The controller exposed as a form field.
//!
//! Form binders that want to validate and bind against the *unmasked* value
//! bind this field instead of the host field itself. This is a special use
//! case supported only for text-field hosts; binding any other host kind
//! fails with [`MaskError::UnsupportedBinding`].
//!
//! Validity state is delegated to the host if and only if the host has the
//! validity capability; without it the setters are no-ops and the getters
//! return the neutral valid state.

use crate::controller::{AttachState, MaskController};
use crate::error::MaskError;
use crate::host::registry;
use crate::host::{HostCaps, HostId, HostKind};

/// A [`MaskController`] wrapped as a bindable form field.
#[derive(Debug)]
pub struct MaskedValueField {
    controller: MaskController,
}

impl MaskedValueField {
    /// Wrap a controller for use as a form field.
    pub fn new(controller: MaskController) -> Self {
        Self { controller }
    }

    /// Bind to a host field and attach the underlying mask.
    ///
    /// Only [`HostKind::TextField`] hosts support unmasked-value binding;
    /// any other kind fails with [`MaskError::UnsupportedBinding`] and the
    /// binding attempt is not retried.
    pub fn bind(&self, host: HostId) -> Result<(), MaskError> {
        match registry::kind(host) {
            None => return Err(MaskError::UnknownHost(host)),
            Some(HostKind::TextField) => {}
            Some(kind) => {
                return Err(MaskError::UnsupportedBinding(format!(
                    "unmasked-value binding is only supported for TextField hosts, got {kind:?}"
                )));
            }
        }
        if !registry::has_capability(host, HostCaps::SETTABLE_VALUE) {
            return Err(MaskError::UnsupportedBinding(
                "host does not accept programmatic values".into(),
            ));
        }
        self.controller.attach(host)
    }

    /// Detach the underlying mask and drop the binding.
    pub fn unbind(&self) {
        self.controller.detach();
    }

    pub fn state(&self) -> AttachState {
        self.controller.state()
    }

    /// The wrapped controller.
    pub fn controller(&self) -> &MaskController {
        &self.controller
    }

    // -------------------------------------------------------------------------
    // Presentation Value
    // -------------------------------------------------------------------------

    /// Push a presentation value to the bound host.
    ///
    /// The host relays it into the client mask through the normal
    /// programmatic value path. No-op when unbound.
    pub fn set_value(&self, value: &str) {
        if let Some(host) = self.controller.host() {
            registry::set_value(host, value);
        }
    }

    /// Clear the bound host's value.
    pub fn clear(&self) {
        self.set_value("");
    }

    /// Current presentation value of the bound host (empty when unbound).
    pub fn host_value(&self) -> String {
        self.controller
            .host()
            .and_then(registry::value)
            .unwrap_or_default()
    }

    /// Query the unmasked value for binder validation (best-effort,
    /// delivered via the client connection).
    pub fn unmasked_value(&self, callback: impl FnOnce(String) + 'static) {
        self.controller.get_unmasked_value(callback);
    }

    // -------------------------------------------------------------------------
    // Validity Delegation
    // -------------------------------------------------------------------------

    /// Mark the host invalid. No-op without the validity capability.
    pub fn set_invalid(&self, invalid: bool) {
        if let Some(host) = self.controller.host() {
            registry::set_invalid(host, invalid);
        }
    }

    /// Whether the host reports invalid; neutral `false` when unbound or
    /// without the validity capability.
    pub fn is_invalid(&self) -> bool {
        self.controller
            .host()
            .map(registry::is_invalid)
            .unwrap_or(false)
    }

    /// Set the host's error message. No-op without the validity capability.
    pub fn set_error_message(&self, message: &str) {
        if let Some(host) = self.controller.host() {
            registry::set_error_message(host, message);
        }
    }

    pub fn error_message(&self) -> String {
        self.controller
            .host()
            .map(registry::error_message)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientConnection, MaskClient, ScriptedClient};
    use crate::host::registry::reset_hosts;
    use crate::host::HostField;
    use std::rc::Rc;

    fn scripted_connection() -> (Rc<ClientConnection>, Rc<ScriptedClient>) {
        let client = ScriptedClient::new();
        let client_for_factory = client.clone();
        let conn = ClientConnection::new(move || client_for_factory.clone() as Rc<dyn MaskClient>);
        (conn, client)
    }

    fn phone_field(conn: Rc<ClientConnection>) -> MaskedValueField {
        MaskedValueField::new(MaskController::new(conn, "(000) 000-0000", vec![]).unwrap())
    }

    #[test]
    fn test_bind_text_field() {
        reset_hosts();
        let (conn, _) = scripted_connection();

        let host = HostField::text_field().create();
        host.mount();

        let field = phone_field(conn);
        field.bind(host.id()).unwrap();
        assert_eq!(field.state(), AttachState::Attached);
    }

    #[test]
    fn test_bind_other_kind_unsupported() {
        reset_hosts();
        let (conn, _) = scripted_connection();

        let area = HostField::text_area().create();
        area.mount();

        let field = phone_field(conn);
        assert!(matches!(
            field.bind(area.id()),
            Err(MaskError::UnsupportedBinding(_))
        ));
        assert_eq!(field.state(), AttachState::Unattached);
    }

    #[test]
    fn test_set_value_forwards_and_relays() {
        reset_hosts();
        let (conn, client) = scripted_connection();

        let host = HostField::text_field().create();
        host.mount();

        let field = phone_field(conn);
        field.bind(host.id()).unwrap();

        field.set_value("4445556666");
        assert_eq!(host.value(), "4445556666");
        assert_eq!(client.set_value_calls(), vec!["4445556666".to_string()]);

        field.clear();
        assert_eq!(host.value(), "");
    }

    #[test]
    fn test_set_value_noop_when_unbound() {
        reset_hosts();
        let (conn, client) = scripted_connection();

        let field = phone_field(conn);
        field.set_value("123");
        assert!(client.set_value_calls().is_empty());
        assert_eq!(field.host_value(), "");
    }

    #[test]
    fn test_validity_delegates_with_capability() {
        reset_hosts();
        let (conn, _) = scripted_connection();

        let host = HostField::text_field()
            .with_caps(HostCaps::VALIDITY)
            .create();
        host.mount();

        let field = phone_field(conn);
        field.bind(host.id()).unwrap();

        field.set_invalid(true);
        field.set_error_message("Has to be different from 123456");
        assert!(field.is_invalid());
        assert!(host.is_invalid());
        assert_eq!(host.error_message(), "Has to be different from 123456");
    }

    #[test]
    fn test_validity_neutral_without_capability() {
        reset_hosts();
        let (conn, _) = scripted_connection();

        let host = HostField::text_field().create();
        host.mount();

        let field = phone_field(conn);
        field.bind(host.id()).unwrap();

        field.set_invalid(true);
        field.set_error_message("nope");
        assert!(!field.is_invalid());
        assert_eq!(field.error_message(), "");
    }
}
