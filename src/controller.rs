//! Mask Controller - Attachment lifecycle and value synchronization.
//!
//! Binds a masking behavior to exactly one host field at a time:
//!
//! ```text
//! Unattached -> (attach, host unmounted) -> PendingMount -> (mount) -> Attached
//! Unattached -> (attach, host mounted) ----------------------------> Attached
//! Attached   -> (detach | host unmounts | attach elsewhere) -------> Unattached
//! ```
//!
//! Every transition out of `PendingMount` and `Attached` releases its
//! listener registrations; a dangling listener would keep the controller,
//! and transitively the old host, alive.
//!
//! # Example
//!
//! ```ignore
//! use input_mask::{ClientConnection, MaskController};
//! use input_mask::host::HostField;
//!
//! let phone = HostField::text_field().create();
//! phone.mount();
//!
//! let mask = MaskController::new(conn, "(000) 000-0000", vec![])?;
//! mask.attach(phone.id())?;
//!
//! phone.set_value("1112223333"); // relayed into the client mask
//! mask.detach();
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::client::ClientConnection;
use crate::error::MaskError;
use crate::host::registry;
use crate::host::{ElementId, HostCaps, HostId, Registration, ValueOrigin};
use crate::option::{self, MaskOption};

/// Tag of the masking element inserted into the host's child-element tree.
pub const MASK_ELEMENT_TAG: &str = "input-mask";

// =============================================================================
// Attach State
// =============================================================================

/// Where the controller currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachState {
    /// Not bound to any host.
    Unattached,
    /// Bound to a host that has not mounted yet; binding is deferred.
    PendingMount,
    /// Bound and live: the masking element is in the host's tree.
    Attached,
}

// =============================================================================
// Controller
// =============================================================================

struct Inner {
    options: Vec<MaskOption>,
    payload: String,
    conn: Rc<ClientConnection>,
    host: Option<HostId>,
    element: Option<ElementId>,
    mount_reg: Option<Registration>,
    unmount_reg: Option<Registration>,
    value_reg: Option<Registration>,
}

/// Controller owning a set of mask options and at most one host binding.
///
/// The controller stores the host's id, never the host itself; destroying
/// the host invalidates the binding instead of leaking it.
pub struct MaskController {
    inner: Rc<RefCell<Inner>>,
}

impl MaskController {
    /// Create a controller with a literal mask pattern.
    ///
    /// The primary `mask` option is inserted first in the option sequence so
    /// later duplicate keys cannot override it unless the caller reorders.
    pub fn new(
        conn: Rc<ClientConnection>,
        pattern: &str,
        options: Vec<MaskOption>,
    ) -> Result<Self, MaskError> {
        Self::with_primary(conn, pattern, false, options)
    }

    /// Create a controller whose pattern is a client-evaluated expression
    /// (e.g. a regular expression or numeric-mask descriptor).
    pub fn new_eval(
        conn: Rc<ClientConnection>,
        pattern: &str,
        options: Vec<MaskOption>,
    ) -> Result<Self, MaskError> {
        Self::with_primary(conn, pattern, true, options)
    }

    fn with_primary(
        conn: Rc<ClientConnection>,
        pattern: &str,
        eval: bool,
        extra: Vec<MaskOption>,
    ) -> Result<Self, MaskError> {
        let mut options = Vec::with_capacity(extra.len() + 1);
        options.push(MaskOption::primary(pattern, eval)?);
        options.extend(extra);

        Ok(Self {
            inner: Rc::new(RefCell::new(Inner {
                options,
                payload: String::new(),
                conn,
                host: None,
                element: None,
                mount_reg: None,
                unmount_reg: None,
                value_reg: None,
            })),
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> AttachState {
        let inner = self.inner.borrow();
        match (inner.host, inner.element) {
            (None, _) => AttachState::Unattached,
            (Some(_), None) => AttachState::PendingMount,
            (Some(_), Some(_)) => AttachState::Attached,
        }
    }

    /// Attach the mask to a host field.
    ///
    /// Implicitly detaches from any previous host first. If the host is not
    /// mounted yet, binding is deferred until its mount notification fires;
    /// an unmount listener detaches the controller either way.
    ///
    /// Options are effectively immutable post-attach: the serialized payload
    /// is pushed to the client exactly once per binding. Re-attach to change
    /// them.
    pub fn attach(&self, host: HostId) -> Result<(), MaskError> {
        detach_inner(&self.inner);

        if !registry::exists(host) {
            return Err(MaskError::UnknownHost(host));
        }

        // Serialize up front so a configuration problem surfaces to the
        // caller even when the bind itself is deferred to mount time.
        let payload = {
            let inner = self.inner.borrow();
            option::to_payload(&inner.options).map_err(|err| {
                log::error!("failed to serialize mask options: {err}");
                MaskError::Configuration(err)
            })?
        };

        {
            let mut inner = self.inner.borrow_mut();
            inner.payload = payload;
            inner.host = Some(host);
        }

        let weak = Rc::downgrade(&self.inner);
        let unmount_reg = registry::on_unmount(host, move || {
            if let Some(inner) = weak.upgrade() {
                detach_inner(&inner);
            }
        });
        self.inner.borrow_mut().unmount_reg = Some(unmount_reg);

        if registry::is_mounted(host) {
            bind(&self.inner, host);
        } else {
            let weak = Rc::downgrade(&self.inner);
            let mount_reg = registry::on_mount(host, move || {
                if let Some(inner) = weak.upgrade() {
                    bind(&inner, host);
                }
            });
            self.inner.borrow_mut().mount_reg = Some(mount_reg);
        }

        Ok(())
    }

    /// Detach from the current host.
    ///
    /// Idempotent: safe when unattached, safe to call repeatedly, and safe
    /// from within a host-unmount listener. Cancels the mount and
    /// value-change registrations, removes the masking element, and clears
    /// the stored host id.
    pub fn detach(&self) {
        detach_inner(&self.inner);
    }

    /// Query the displayed (masked) value from the client instance.
    ///
    /// Best-effort: when unattached this is a no-op and the callback never
    /// fires. The reply arrives via [`ClientConnection::pump`] with no
    /// timeout, ordering guarantee, or cancellation.
    pub fn get_masked_value(&self, callback: impl FnOnce(String) + 'static) {
        let (conn, element) = {
            let inner = self.inner.borrow();
            (inner.conn.clone(), inner.element)
        };
        if let Some(element) = element {
            conn.query_masked(element, callback);
        }
    }

    /// Query the underlying (unmasked) value from the client instance.
    ///
    /// Same best-effort contract as [`MaskController::get_masked_value`].
    pub fn get_unmasked_value(&self, callback: impl FnOnce(String) + 'static) {
        let (conn, element) = {
            let inner = self.inner.borrow();
            (inner.conn.clone(), inner.element)
        };
        if let Some(element) = element {
            conn.query_unmasked(element, callback);
        }
    }

    /// The option sequence, primary mask option first.
    pub fn options(&self) -> Vec<MaskOption> {
        self.inner.borrow().options.clone()
    }

    /// Id of the currently attached host, if any.
    pub fn host(&self) -> Option<HostId> {
        self.inner.borrow().host
    }
}

impl Drop for MaskController {
    fn drop(&mut self) {
        detach_inner(&self.inner);
    }
}

impl std::fmt::Debug for MaskController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaskController")
            .field("state", &self.state())
            .field("host", &self.inner.borrow().host)
            .finish()
    }
}

// =============================================================================
// Bind / Detach Internals
// =============================================================================

/// Bind to a mounted host: insert the masking element, initialize the client
/// instance, and subscribe to value changes when the host supports them.
///
/// Free function over the shared inner so the one-shot mount listener can
/// run it without borrowing the controller.
fn bind(inner_rc: &Rc<RefCell<Inner>>, host: HostId) {
    let conn = inner_rc.borrow().conn.clone();

    // Duplicate-bind guard: a second attach without an intervening detach
    // must not leave two masking elements under the host.
    for stale in registry::remove_children_by_tag(host, MASK_ELEMENT_TAG) {
        conn.remove_instance(stale);
    }

    let Some(element) = registry::insert_child(host, MASK_ELEMENT_TAG) else {
        // Host released between attach and mount.
        log::warn!("bind against released host {host:?}");
        detach_inner(inner_rc);
        return;
    };

    let payload = inner_rc.borrow().payload.clone();
    conn.create_instance(element, &payload);
    inner_rc.borrow_mut().element = Some(element);
    log::debug!("mask bound to host {host:?} as element {element:?}");

    if registry::has_capability(host, HostCaps::VALUE_CHANGE) {
        let relay_conn = conn.clone();
        let value_reg = registry::on_value_change(host, move |value, origin| {
            // Relay server-assigned values into the mask. Client-originated
            // changes are never echoed back (infinite update loop).
            if origin == ValueOrigin::Programmatic {
                relay_conn.set_value(element, value);
            }
        });
        inner_rc.borrow_mut().value_reg = Some(value_reg);
    }
}

/// Tear down a binding. Registrations are cancelled before the element is
/// removed so no callback can fire against half-torn-down state.
fn detach_inner(inner_rc: &Rc<RefCell<Inner>>) {
    let (mount_reg, unmount_reg, value_reg, host, element, conn) = {
        let mut inner = inner_rc.borrow_mut();
        (
            inner.mount_reg.take(),
            inner.unmount_reg.take(),
            inner.value_reg.take(),
            inner.host.take(),
            inner.element.take(),
            inner.conn.clone(),
        )
    };

    if let Some(reg) = mount_reg {
        reg.remove();
    }
    if let Some(reg) = unmount_reg {
        reg.remove();
    }
    if let Some(reg) = value_reg {
        reg.remove();
    }

    if let Some(element) = element {
        if let Some(host) = host {
            registry::remove_child(host, element);
        }
        conn.remove_instance(element);
    }

    if let Some(host) = host {
        log::debug!("mask detached from host {host:?}");
    }
}
