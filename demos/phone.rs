//! Phone Mask Demo - Basic mask binding on a text field.
//!
//! Mirrors the classic phone-number demo:
//! - attach a `(000) 000-0000` mask to a text field
//! - assign a value programmatically and watch it relayed into the mask
//! - simulate the user typing (a client-originated edit, never echoed back)
//! - read the masked and unmasked values back across the client boundary
//!
//! Run with: cargo run --example phone

use std::rc::Rc;

use input_mask::host::HostField;
use input_mask::{ClientConnection, MaskClient, MaskController, MaskOption, ScriptedClient};

const PHONE_MASK: &str = "(000) 000-0000";

fn main() {
    println!("=== input-mask Phone Demo ===\n");

    // The scripted client stands in for the real client-side masking engine.
    let client = ScriptedClient::new();
    let client_for_factory = client.clone();
    let conn = ClientConnection::new(move || client_for_factory.clone() as Rc<dyn MaskClient>);

    // A text field host, not yet mounted.
    let phone = HostField::text_field().create();

    let mask = MaskController::new(conn.clone(), PHONE_MASK, vec![MaskOption::lazy(false)])
        .expect("valid mask pattern");

    // Attach before mount: binding is deferred until the field mounts.
    mask.attach(phone.id()).expect("live host");
    println!("Attached before mount, state: {:?}", mask.state());

    phone.mount();
    println!("Field mounted, state:        {:?}", mask.state());
    println!(
        "Init payload sent to client: {}",
        client.init_payloads().first().map(String::as_str).unwrap_or("<none>")
    );

    // Programmatic value assignment is relayed into the client mask.
    phone.set_value("1112223333");
    println!("\nAfter set_value(\"1112223333\"):");
    println!("  client received: {:?}", client.set_value_calls());

    // The user types through the mask; the client pushes the masked text
    // back. This change is client-originated and must not be echoed.
    client.script_masked("(111) 222-3333");
    client.script_unmasked("1112223333");
    phone.client_input("(111) 222-3333");
    println!("\nAfter a client-originated edit:");
    println!("  field value:     {:?}", phone.value());
    println!("  client received: {:?} (no echo)", client.set_value_calls());

    // Value read-back is a best-effort round trip; replies arrive when the
    // connection pumps.
    mask.get_masked_value(|masked| println!("  masked value:    {masked:?}"));
    mask.get_unmasked_value(|unmasked| println!("  unmasked value:  {unmasked:?}"));
    println!("\nPumping the client connection:");
    conn.pump();

    mask.detach();
    println!("\nDetached, state: {:?}", mask.state());

    println!("\n=== Done ===");
}
