//! Verify stage: one sector-0 handshake decides admissibility.

mod common;

use common::*;
use volna_rs::plugin::{Protocol, register};

#[test]
fn plugin_registers_under_the_classic_protocol() {
    let plugin = register();
    assert_eq!(plugin.protocol(), Protocol::MfClassic);
    assert_eq!(u8::from(plugin.protocol()), 0x02);
    assert_eq!(Protocol::from(0x7Fu8), Protocol::Unknown(0x7F));
}

#[test]
fn verify_succeeds_when_sector_zero_authenticates() {
    let plugin = VolnaPlugin::new();
    let mut transport = MockTransport::happy();

    assert!(plugin.verify(&mut transport));

    assert_eq!(
        transport.auth_calls,
        vec![(0u8, KeyType::A, VOLNA_1K_KEYS.key_a(0))]
    );
    assert_eq!(transport.bulk_calls, 0, "verify must not read the card");
}

#[test]
fn verify_fails_on_key_rejection() {
    let plugin = VolnaPlugin::new();
    let mut transport = MockTransport::with_auth_error(AuthError::KeyRejected {
        sector: 0,
        key_type: KeyType::A,
    });

    assert!(!plugin.verify(&mut transport));
}

#[test]
fn verify_fails_on_timeout() {
    let plugin = VolnaPlugin::new();
    let mut transport = MockTransport::with_auth_error(AuthError::Timeout);

    assert!(!plugin.verify(&mut transport));
}

#[test]
fn verify_fails_on_transport_fault() {
    let plugin = VolnaPlugin::new();
    let mut transport =
        MockTransport::with_auth_error(AuthError::Fault("field dropped".to_string()));

    assert!(!plugin.verify(&mut transport));
}
