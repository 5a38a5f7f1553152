//! Binder Demo - Unmasked-value binding with validation.
//!
//! Mirrors the binder demo view: a phone field whose *unmasked* value is
//! bound through a `MaskedValueField`, validated against a rule, with
//! set-default and clear actions. Also shows that binding any host kind
//! other than a text field is rejected.
//!
//! Run with: cargo run --example binder

use std::rc::Rc;

use input_mask::host::HostField;
use input_mask::{
    ClientConnection, MaskClient, MaskController, MaskedValueField, ScriptedClient,
};

const PHONE_MASK: &str = "(000) 000-0000";
const FORBIDDEN: &str = "123456";

fn main() {
    println!("=== input-mask Binder Demo ===\n");

    let client = ScriptedClient::new();
    let client_for_factory = client.clone();
    let conn = ClientConnection::new(move || client_for_factory.clone() as Rc<dyn MaskClient>);

    let phone = HostField::text_field()
        .with_caps(input_mask::HostCaps::VALIDITY)
        .create();
    phone.mount();

    let field = MaskedValueField::new(
        MaskController::new(conn.clone(), PHONE_MASK, vec![]).expect("valid mask pattern"),
    );
    field.bind(phone.id()).expect("text field host");

    // "Set default phone number" button.
    field.set_value("4445556666");
    println!("Default assigned, host value: {:?}", field.host_value());
    println!("Relayed into the mask:        {:?}", client.set_value_calls());

    // Binder validation runs against the unmasked value from the client.
    client.script_unmasked("4445556666");
    field.unmasked_value(|unmasked| {
        println!("\nValidating unmasked value {unmasked:?}...");
        if unmasked == FORBIDDEN {
            println!("  -> invalid: has to be different from {FORBIDDEN}");
        } else {
            println!("  -> valid");
        }
    });
    conn.pump();

    // The forbidden number trips the rule; validity is delegated to the host.
    field.set_value(FORBIDDEN);
    client.script_unmasked(FORBIDDEN);
    field.set_invalid(true);
    field.set_error_message("Has to be different from 123456");
    println!("\nAfter binding the forbidden number:");
    println!("  host invalid:  {}", field.is_invalid());
    println!("  error message: {:?}", field.error_message());

    // "Clear phone number" button.
    field.clear();
    field.set_invalid(false);
    field.set_error_message("");
    println!("\nCleared, host value: {:?}", field.host_value());

    // Unmasked-value binding is a text-field-only feature.
    let area = HostField::text_area().create();
    area.mount();
    let other = MaskedValueField::new(
        MaskController::new(conn, PHONE_MASK, vec![]).expect("valid mask pattern"),
    );
    match other.bind(area.id()) {
        Err(err) => println!("\nBinding a text area fails as expected:\n  {err}"),
        Ok(()) => unreachable!("text areas do not support unmasked-value binding"),
    }

    println!("\n=== Done ===");
}
