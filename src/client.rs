//! Client Boundary - The opaque masking engine and its connection.
//!
//! The actual mask logic (pattern parsing, per-character constraints, caret
//! placement) lives behind [`MaskClient`] and is out of scope for this crate.
//! The controller only produces its initialization payload, relays values
//! into it, and queries values back.
//!
//! Value queries are round trips: they are queued on the [`ClientConnection`]
//! and their callbacks fire when [`ClientConnection::pump`] delivers replies.
//! There is no timeout and no cancellation; if the connection is lost (or
//! the element is gone by delivery time) a callback simply never fires.
//! Callers must treat queries as best-effort telemetry, never as values
//! required for correctness-critical control flow.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::host::ElementId;

// =============================================================================
// Mask Client Contract
// =============================================================================

/// Contract of a client-side mask instance bound to one masking element.
pub trait MaskClient {
    /// Receive the serialized option payload, sent exactly once at bind time.
    fn initialize(&self, payload: &str);

    /// Push a server-assigned value into the mask.
    fn set_value(&self, value: &str);

    /// The displayed string including literal template characters.
    fn masked_value(&self) -> String;

    /// The underlying value with template literals stripped.
    fn unmasked_value(&self) -> String;
}

// =============================================================================
// Client Connection
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryKind {
    Masked,
    Unmasked,
}

struct PendingQuery {
    element: ElementId,
    kind: QueryKind,
    callback: Box<dyn FnOnce(String)>,
}

/// Connection to the client side, holding one mask instance per masking
/// element plus the queue of unanswered value queries.
///
/// Passed explicitly to controllers at construction; there is no ambient
/// "current session" state.
pub struct ClientConnection {
    factory: Box<dyn Fn() -> Rc<dyn MaskClient>>,
    instances: RefCell<HashMap<ElementId, Rc<dyn MaskClient>>>,
    pending: RefCell<Vec<PendingQuery>>,
}

impl ClientConnection {
    /// Create a connection; `factory` produces one mask instance per bind.
    pub fn new(factory: impl Fn() -> Rc<dyn MaskClient> + 'static) -> Rc<Self> {
        Rc::new(Self {
            factory: Box::new(factory),
            instances: RefCell::new(HashMap::new()),
            pending: RefCell::new(Vec::new()),
        })
    }

    /// Create and initialize a mask instance for a masking element.
    pub(crate) fn create_instance(&self, element: ElementId, payload: &str) {
        let client = (self.factory)();
        client.initialize(payload);
        self.instances.borrow_mut().insert(element, client);
        log::debug!("mask instance created for element {element:?}");
    }

    /// Destroy the mask instance for a masking element, if any.
    pub(crate) fn remove_instance(&self, element: ElementId) {
        if self.instances.borrow_mut().remove(&element).is_some() {
            log::debug!("mask instance destroyed for element {element:?}");
        }
    }

    /// Relay a server-assigned value into the mask instance (fire-and-forget).
    pub(crate) fn set_value(&self, element: ElementId, value: &str) {
        let instance = self.instances.borrow().get(&element).cloned();
        match instance {
            Some(instance) => instance.set_value(value),
            None => log::warn!("set_value for element {element:?} with no live instance"),
        }
    }

    pub(crate) fn query_masked(&self, element: ElementId, callback: impl FnOnce(String) + 'static) {
        self.enqueue(element, QueryKind::Masked, Box::new(callback));
    }

    pub(crate) fn query_unmasked(
        &self,
        element: ElementId,
        callback: impl FnOnce(String) + 'static,
    ) {
        self.enqueue(element, QueryKind::Unmasked, Box::new(callback));
    }

    fn enqueue(&self, element: ElementId, kind: QueryKind, callback: Box<dyn FnOnce(String)>) {
        self.pending.borrow_mut().push(PendingQuery {
            element,
            kind,
            callback,
        });
    }

    /// Deliver replies for all pending queries whose instance is still live.
    ///
    /// Queries against elements with no instance (detached before delivery)
    /// are dropped without firing their callback. Returns the number of
    /// callbacks invoked.
    pub fn pump(&self) -> usize {
        let queries: Vec<PendingQuery> = self.pending.borrow_mut().drain(..).collect();

        let mut delivered = 0;
        for query in queries {
            let instance = self.instances.borrow().get(&query.element).cloned();
            let Some(instance) = instance else {
                log::warn!(
                    "dropping {:?} query for element {:?}: no live instance",
                    query.kind,
                    query.element
                );
                continue;
            };
            let value = match query.kind {
                QueryKind::Masked => instance.masked_value(),
                QueryKind::Unmasked => instance.unmasked_value(),
            };
            (query.callback)(value);
            delivered += 1;
        }
        delivered
    }

    /// Drop all pending queries without replying (a lost connection).
    pub fn drop_pending(&self) -> usize {
        let dropped = self.pending.borrow_mut().drain(..).count();
        if dropped > 0 {
            log::warn!("dropped {dropped} pending mask queries");
        }
        dropped
    }

    /// Number of queries still awaiting a reply.
    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Whether a mask instance is live for the given element.
    pub fn has_instance(&self, element: ElementId) -> bool {
        self.instances.borrow().contains_key(&element)
    }
}

impl std::fmt::Debug for ClientConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConnection")
            .field("instances", &self.instances.borrow().len())
            .field("pending", &self.pending.borrow().len())
            .finish()
    }
}

// =============================================================================
// Scripted Client
// =============================================================================

/// Scriptable [`MaskClient`] used by the demos and tests.
///
/// Records every `initialize`/`set_value` call and serves canned masked and
/// unmasked values.
#[derive(Default)]
pub struct ScriptedClient {
    init_payloads: RefCell<Vec<String>>,
    set_value_calls: RefCell<Vec<String>>,
    masked: RefCell<String>,
    unmasked: RefCell<String>,
}

impl ScriptedClient {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Script the value the client reports as its masked value.
    pub fn script_masked(&self, value: &str) {
        *self.masked.borrow_mut() = value.to_string();
    }

    /// Script the value the client reports as its unmasked value.
    pub fn script_unmasked(&self, value: &str) {
        *self.unmasked.borrow_mut() = value.to_string();
    }

    /// Initialization payloads received, in order.
    pub fn init_payloads(&self) -> Vec<String> {
        self.init_payloads.borrow().clone()
    }

    /// Values pushed via `set_value`, in order.
    pub fn set_value_calls(&self) -> Vec<String> {
        self.set_value_calls.borrow().clone()
    }
}

impl MaskClient for ScriptedClient {
    fn initialize(&self, payload: &str) {
        self.init_payloads.borrow_mut().push(payload.to_string());
    }

    fn set_value(&self, value: &str) {
        self.set_value_calls.borrow_mut().push(value.to_string());
    }

    fn masked_value(&self) -> String {
        self.masked.borrow().clone()
    }

    fn unmasked_value(&self) -> String {
        self.unmasked.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn scripted_connection() -> (Rc<ClientConnection>, Rc<ScriptedClient>) {
        let client = ScriptedClient::new();
        let client_for_factory = client.clone();
        let conn = ClientConnection::new(move || client_for_factory.clone() as Rc<dyn MaskClient>);
        (conn, client)
    }

    #[test]
    fn test_initialize_once_per_instance() {
        let (conn, client) = scripted_connection();

        conn.create_instance(ElementId(0), r#"[{"key":"mask"}]"#);
        assert_eq!(client.init_payloads().len(), 1);
        assert!(conn.has_instance(ElementId(0)));
    }

    #[test]
    fn test_query_replies_on_pump() {
        let (conn, client) = scripted_connection();
        client.script_masked("(111) 222-3333");

        conn.create_instance(ElementId(0), "[]");

        let seen = Rc::new(RefCell::new(None));
        let seen_clone = seen.clone();
        conn.query_masked(ElementId(0), move |value| {
            *seen_clone.borrow_mut() = Some(value);
        });

        // Nothing fires until the reply is delivered.
        assert!(seen.borrow().is_none());
        assert_eq!(conn.pending_count(), 1);

        assert_eq!(conn.pump(), 1);
        assert_eq!(seen.borrow().as_deref(), Some("(111) 222-3333"));
        assert_eq!(conn.pending_count(), 0);
    }

    #[test]
    fn test_query_dropped_when_instance_gone() {
        let (conn, _client) = scripted_connection();
        conn.create_instance(ElementId(0), "[]");

        let fired = Rc::new(Cell::new(false));
        let fired_clone = fired.clone();
        conn.query_unmasked(ElementId(0), move |_| fired_clone.set(true));

        conn.remove_instance(ElementId(0));
        assert_eq!(conn.pump(), 0);
        assert!(!fired.get());
    }

    #[test]
    fn test_drop_pending() {
        let (conn, _client) = scripted_connection();
        conn.create_instance(ElementId(0), "[]");

        let fired = Rc::new(Cell::new(false));
        let fired_clone = fired.clone();
        conn.query_masked(ElementId(0), move |_| fired_clone.set(true));

        assert_eq!(conn.drop_pending(), 1);
        assert_eq!(conn.pump(), 0);
        assert!(!fired.get());
    }
}
