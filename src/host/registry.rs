//! Host Registry - Id-based lookup and lifecycle for host fields.
//!
//! Manages the lifecycle of host fields:
//! - `HostId` allocation and release
//! - mounted/unmounted state with one-shot mount listeners
//! - origin-tagged value-change notification
//! - per-host child-element tree (insert/remove/query by tag)
//!
//! All state is thread-local; the framework serializes access on its single
//! event-processing thread, so no internal locking is needed. Listener
//! callbacks are invoked with no registry borrow held, so a listener may
//! call back into the registry (an unmount listener detaching a controller
//! does exactly that).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use spark_signals::{signal, Signal};

use super::{ElementId, HostCaps, HostId, HostKind, Registration, ValueOrigin};

// =============================================================================
// Registry State
// =============================================================================

struct ChildElement {
    id: ElementId,
    tag: String,
}

struct Validity {
    invalid: bool,
    message: String,
}

struct HostRecord {
    kind: HostKind,
    caps: HostCaps,
    mounted: bool,
    value: Signal<String>,
    validity: Validity,
    children: Vec<ChildElement>,
    mount_listeners: Vec<(usize, Box<dyn FnOnce()>)>,
    unmount_listeners: Vec<(usize, Rc<dyn Fn()>)>,
    value_listeners: Vec<(usize, Rc<dyn Fn(&str, ValueOrigin)>)>,
    next_listener_id: usize,
}

thread_local! {
    static HOSTS: RefCell<HashMap<usize, HostRecord>> = RefCell::new(HashMap::new());

    static NEXT_HOST_ID: RefCell<usize> = const { RefCell::new(0) };

    static NEXT_ELEMENT_ID: RefCell<usize> = const { RefCell::new(0) };
}

fn with_record<R>(id: HostId, f: impl FnOnce(&mut HostRecord) -> R) -> Option<R> {
    HOSTS.with(|hosts| hosts.borrow_mut().get_mut(&id.0).map(f))
}

// =============================================================================
// Allocation
// =============================================================================

/// Create a host field record. Hosts start unmounted.
pub fn create_host(kind: HostKind, caps: HostCaps) -> HostId {
    let id = NEXT_HOST_ID.with(|next| {
        let mut next = next.borrow_mut();
        let id = *next;
        *next += 1;
        id
    });

    HOSTS.with(|hosts| {
        hosts.borrow_mut().insert(
            id,
            HostRecord {
                kind,
                caps,
                mounted: false,
                value: signal(String::new()),
                validity: Validity {
                    invalid: false,
                    message: String::new(),
                },
                children: Vec::new(),
                mount_listeners: Vec::new(),
                unmount_listeners: Vec::new(),
                value_listeners: Vec::new(),
                next_listener_id: 0,
            },
        );
    });

    HostId(id)
}

/// Remove a host from the registry entirely (the host was destroyed).
///
/// Pending listeners are dropped without firing; lookups against the id
/// return `None`/no-op afterwards.
pub fn release_host(id: HostId) {
    HOSTS.with(|hosts| {
        hosts.borrow_mut().remove(&id.0);
    });
}

/// Whether the id resolves to a live host.
pub fn exists(id: HostId) -> bool {
    HOSTS.with(|hosts| hosts.borrow().contains_key(&id.0))
}

pub fn kind(id: HostId) -> Option<HostKind> {
    with_record(id, |r| r.kind)
}

pub fn has_capability(id: HostId, cap: HostCaps) -> bool {
    with_record(id, |r| r.caps.contains(cap)).unwrap_or(false)
}

// =============================================================================
// Mount Lifecycle
// =============================================================================

pub fn is_mounted(id: HostId) -> bool {
    with_record(id, |r| r.mounted).unwrap_or(false)
}

/// Mount the host into the live view tree.
///
/// Fires and consumes all pending one-shot mount listeners in registration
/// order. Mounting an already-mounted host is a no-op.
pub fn mount(id: HostId) {
    let listeners = match with_record(id, |r| {
        if r.mounted {
            return Vec::new();
        }
        r.mounted = true;
        std::mem::take(&mut r.mount_listeners)
    }) {
        Some(listeners) => listeners,
        None => return,
    };

    for (_, listener) in listeners {
        listener();
    }
}

/// Unmount the host. Fires unmount listeners in registration order.
pub fn unmount(id: HostId) {
    let listeners = match with_record(id, |r| {
        if !r.mounted {
            return Vec::new();
        }
        r.mounted = false;
        r.unmount_listeners
            .iter()
            .map(|(_, l)| l.clone())
            .collect::<Vec<_>>()
    }) {
        Some(listeners) => listeners,
        None => return,
    };

    for listener in listeners {
        listener();
    }
}

/// Register a one-shot listener fired when the host mounts.
pub fn on_mount(id: HostId, listener: impl FnOnce() + 'static) -> Registration {
    let listener_id = with_record(id, |r| {
        let listener_id = r.next_listener_id;
        r.next_listener_id += 1;
        r.mount_listeners.push((listener_id, Box::new(listener)));
        listener_id
    });

    match listener_id {
        Some(listener_id) => Registration::new(move || {
            with_record(id, |r| {
                r.mount_listeners.retain(|(lid, _)| *lid != listener_id);
            });
        }),
        None => Registration::new(|| {}),
    }
}

/// Register a listener fired every time the host unmounts.
pub fn on_unmount(id: HostId, listener: impl Fn() + 'static) -> Registration {
    let listener_id = with_record(id, |r| {
        let listener_id = r.next_listener_id;
        r.next_listener_id += 1;
        r.unmount_listeners.push((listener_id, Rc::new(listener)));
        listener_id
    });

    match listener_id {
        Some(listener_id) => Registration::new(move || {
            with_record(id, |r| {
                r.unmount_listeners.retain(|(lid, _)| *lid != listener_id);
            });
        }),
        None => Registration::new(|| {}),
    }
}

// =============================================================================
// Value
// =============================================================================

/// Current value of the host field.
pub fn value(id: HostId) -> Option<String> {
    with_record(id, |r| r.value.get())
}

/// The host's value signal (for reactive reads in deriveds/effects).
pub fn value_signal(id: HostId) -> Option<Signal<String>> {
    with_record(id, |r| r.value.clone())
}

/// Assign the value programmatically (server origin).
pub fn set_value(id: HostId, value: &str) {
    notify_value(id, value, ValueOrigin::Programmatic);
}

/// Report a client-originated edit (the user typed through the mask).
pub fn client_input(id: HostId, value: &str) {
    notify_value(id, value, ValueOrigin::Client);
}

fn notify_value(id: HostId, value: &str, origin: ValueOrigin) {
    // Clone the signal and listeners out first: setting the signal can run
    // subscriber effects synchronously, and those may read the registry.
    let (signal, listeners) = match with_record(id, |r| {
        (
            r.value.clone(),
            r.value_listeners
                .iter()
                .map(|(_, l)| l.clone())
                .collect::<Vec<_>>(),
        )
    }) {
        Some(parts) => parts,
        None => return,
    };

    signal.set(value.to_string());
    for listener in listeners {
        listener(value, origin);
    }
}

/// Register an origin-tagged value-change listener.
pub fn on_value_change(
    id: HostId,
    listener: impl Fn(&str, ValueOrigin) + 'static,
) -> Registration {
    let listener_id = with_record(id, |r| {
        let listener_id = r.next_listener_id;
        r.next_listener_id += 1;
        r.value_listeners.push((listener_id, Rc::new(listener)));
        listener_id
    });

    match listener_id {
        Some(listener_id) => Registration::new(move || {
            with_record(id, |r| {
                r.value_listeners.retain(|(lid, _)| *lid != listener_id);
            });
        }),
        None => Registration::new(|| {}),
    }
}

// =============================================================================
// Child Elements
// =============================================================================

/// Insert a child element with the given tag, returning its id.
pub fn insert_child(id: HostId, tag: &str) -> Option<ElementId> {
    let element = ElementId(NEXT_ELEMENT_ID.with(|next| {
        let mut next = next.borrow_mut();
        let id = *next;
        *next += 1;
        id
    }));

    with_record(id, |r| {
        r.children.push(ChildElement {
            id: element,
            tag: tag.to_string(),
        });
        element
    })
}

/// Remove a child element by id. No-op if the host or element is gone.
pub fn remove_child(id: HostId, element: ElementId) {
    with_record(id, |r| {
        r.children.retain(|c| c.id != element);
    });
}

/// Remove every child element carrying the given tag.
pub fn remove_children_by_tag(id: HostId, tag: &str) -> Vec<ElementId> {
    with_record(id, |r| {
        let removed: Vec<ElementId> = r
            .children
            .iter()
            .filter(|c| c.tag == tag)
            .map(|c| c.id)
            .collect();
        r.children.retain(|c| c.tag != tag);
        removed
    })
    .unwrap_or_default()
}

/// Ids of child elements carrying the given tag, in tree order.
pub fn children_with_tag(id: HostId, tag: &str) -> Vec<ElementId> {
    with_record(id, |r| {
        r.children
            .iter()
            .filter(|c| c.tag == tag)
            .map(|c| c.id)
            .collect()
    })
    .unwrap_or_default()
}

// =============================================================================
// Validity State
// =============================================================================

/// Set the invalid flag. No-op without [`HostCaps::VALIDITY`].
pub fn set_invalid(id: HostId, invalid: bool) {
    with_record(id, |r| {
        if r.caps.contains(HostCaps::VALIDITY) {
            r.validity.invalid = invalid;
        }
    });
}

/// Invalid flag; hosts without [`HostCaps::VALIDITY`] are neutrally valid.
pub fn is_invalid(id: HostId) -> bool {
    with_record(id, |r| r.caps.contains(HostCaps::VALIDITY) && r.validity.invalid)
        .unwrap_or(false)
}

/// Set the error message. No-op without [`HostCaps::VALIDITY`].
pub fn set_error_message(id: HostId, message: &str) {
    with_record(id, |r| {
        if r.caps.contains(HostCaps::VALIDITY) {
            r.validity.message = message.to_string();
        }
    });
}

pub fn error_message(id: HostId) -> String {
    with_record(id, |r| {
        if r.caps.contains(HostCaps::VALIDITY) {
            r.validity.message.clone()
        } else {
            String::new()
        }
    })
    .unwrap_or_default()
}

// =============================================================================
// Reset (for testing)
// =============================================================================

/// Reset all registry state (for testing).
pub fn reset_hosts() {
    HOSTS.with(|hosts| hosts.borrow_mut().clear());
    NEXT_HOST_ID.with(|next| *next.borrow_mut() = 0);
    NEXT_ELEMENT_ID.with(|next| *next.borrow_mut() = 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_create_and_release() {
        reset_hosts();

        let a = create_host(HostKind::TextField, HostCaps::all());
        let b = create_host(HostKind::Custom, HostCaps::empty());

        assert!(exists(a));
        assert!(exists(b));
        assert_eq!(kind(a), Some(HostKind::TextField));

        release_host(a);
        assert!(!exists(a));
        assert!(exists(b));
        assert_eq!(kind(a), None);
    }

    #[test]
    fn test_mount_fires_one_shot_listeners() {
        reset_hosts();

        let host = create_host(HostKind::TextField, HostCaps::empty());
        let fired = Rc::new(Cell::new(0));

        let fired_clone = fired.clone();
        let _reg = on_mount(host, move || fired_clone.set(fired_clone.get() + 1));

        assert!(!is_mounted(host));
        assert_eq!(fired.get(), 0);

        mount(host);
        assert!(is_mounted(host));
        assert_eq!(fired.get(), 1);

        // Already mounted: listener was consumed, nothing fires again.
        mount(host);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_mount_registration_cancel() {
        reset_hosts();

        let host = create_host(HostKind::TextField, HostCaps::empty());
        let fired = Rc::new(Cell::new(false));

        let fired_clone = fired.clone();
        let reg = on_mount(host, move || fired_clone.set(true));
        reg.remove();

        mount(host);
        assert!(!fired.get());
    }

    #[test]
    fn test_unmount_listener_repeats() {
        reset_hosts();

        let host = create_host(HostKind::TextField, HostCaps::empty());
        let fired = Rc::new(Cell::new(0));

        let fired_clone = fired.clone();
        let _reg = on_unmount(host, move || fired_clone.set(fired_clone.get() + 1));

        mount(host);
        unmount(host);
        assert_eq!(fired.get(), 1);

        mount(host);
        unmount(host);
        assert_eq!(fired.get(), 2);

        // Not mounted: no-op.
        unmount(host);
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn test_value_change_origin() {
        reset_hosts();

        let host = create_host(HostKind::TextField, HostCaps::VALUE_CHANGE);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let seen_clone = seen.clone();
        let _reg = on_value_change(host, move |value, origin| {
            seen_clone.borrow_mut().push((value.to_string(), origin));
        });

        set_value(host, "abc");
        client_input(host, "a-b-c");

        assert_eq!(value(host), Some("a-b-c".to_string()));
        assert_eq!(
            *seen.borrow(),
            vec![
                ("abc".to_string(), ValueOrigin::Programmatic),
                ("a-b-c".to_string(), ValueOrigin::Client),
            ]
        );
    }

    #[test]
    fn test_listener_may_reenter_registry() {
        reset_hosts();

        let host = create_host(HostKind::TextField, HostCaps::empty());
        let _reg = on_unmount(host, move || {
            // Re-entrant call while the unmount notification is in flight.
            remove_children_by_tag(host, "input-mask");
        });

        insert_child(host, "input-mask");
        mount(host);
        unmount(host);

        assert!(children_with_tag(host, "input-mask").is_empty());
    }

    #[test]
    fn test_child_elements_by_tag() {
        reset_hosts();

        let host = create_host(HostKind::TextField, HostCaps::empty());
        let a = insert_child(host, "input-mask").unwrap();
        let _b = insert_child(host, "tooltip").unwrap();

        assert_eq!(children_with_tag(host, "input-mask"), vec![a]);

        let removed = remove_children_by_tag(host, "input-mask");
        assert_eq!(removed, vec![a]);
        assert!(children_with_tag(host, "input-mask").is_empty());
        assert_eq!(children_with_tag(host, "tooltip").len(), 1);
    }

    #[test]
    fn test_validity_requires_capability() {
        reset_hosts();

        let plain = create_host(HostKind::Custom, HostCaps::empty());
        set_invalid(plain, true);
        set_error_message(plain, "bad");
        assert!(!is_invalid(plain));
        assert_eq!(error_message(plain), "");

        let field = create_host(HostKind::TextField, HostCaps::VALIDITY);
        set_invalid(field, true);
        set_error_message(field, "bad");
        assert!(is_invalid(field));
        assert_eq!(error_message(field), "bad");
    }
}
