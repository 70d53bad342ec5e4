use std::time::Duration;

use rand_core::OsRng;
use zeroize::Zeroizing;

use signer::{transport::EmuTransport, DeviceHandle, Error};
use signer_core::{
    engine::{pin::matrix_encode, Engine, Settings},
    signing::verifying_key_from_pem,
};
use signer_device::Buttons;
use signer_proto::{failure::FailureCode, prelude::*, to_frame};

mod helpers;
use helpers::*;

#[tokio::test]
async fn sign_plugin() -> anyhow::Result<()> {
    let (h, shared) = emulator(Settings::default(), true);

    let a = h
        .sign_plugin(CONFIG.as_bytes(), PROTOSPEC.as_bytes(), no_pin())
        .await?;

    // Artifact verifies against the device key
    let key = verifying_key_from_pem(&KEY_PEM)?;
    a.verify(&key)?;

    let d = a.descriptor()?;
    assert_eq!(d.valid_until, Some((NOW + 86_400) as u32));
    assert_eq!(d.whitelist_urls, vec!["https://a".to_string()]);
    assert!(d.blacklist_urls.is_empty());
    assert_eq!(d.known_devices.len(), 1);
    assert_eq!(d.known_devices[0].vendor_id, Some(0x1234));
    assert_eq!(d.known_devices[0].product_id, Some(0x5678));

    // Device returns to idle
    assert!(shared.lock().unwrap().question.is_none());

    Ok(())
}

#[tokio::test]
async fn sign_plugin_repeated() -> anyhow::Result<()> {
    let (h, _shared) = emulator(Settings::default(), true);

    let a = h
        .sign_plugin(CONFIG.as_bytes(), PROTOSPEC.as_bytes(), no_pin())
        .await?;
    let b = h
        .sign_plugin(CONFIG.as_bytes(), PROTOSPEC.as_bytes(), no_pin())
        .await?;

    // Fixed issue time, deterministic signatures
    assert_eq!(a, b);

    Ok(())
}

#[tokio::test]
async fn sign_plugin_declined() {
    let (h, shared) = emulator(Settings::default(), false);

    let r = h
        .sign_plugin(CONFIG.as_bytes(), PROTOSPEC.as_bytes(), no_pin())
        .await;

    assert!(matches!(r, Err(Error::UserDenied)), "{:?}", r);
    assert!(shared.lock().unwrap().question.is_none());
}

#[tokio::test]
async fn sign_plugin_invalid_config() {
    let (h, _shared) = emulator(Settings::default(), true);

    let r = h
        .sign_plugin(b"{\"valid_days\": \"one\"}", PROTOSPEC.as_bytes(), no_pin())
        .await;

    assert!(
        matches!(&r, Err(Error::Failure { code: FailureCode::Other, .. })),
        "{:?}",
        r
    );
}

#[tokio::test]
async fn sign_plugin_button_ack() -> anyhow::Result<()> {
    let settings = Settings {
        require_button_ack: true,
        ..Default::default()
    };
    let (h, _shared) = emulator(settings, true);
    let h = h.with_button_ack(true);

    let a = h
        .sign_plugin(CONFIG.as_bytes(), PROTOSPEC.as_bytes(), no_pin())
        .await?;

    a.verify(&verifying_key_from_pem(&KEY_PEM)?)?;

    Ok(())
}

#[tokio::test]
async fn sign_plugin_with_pin() -> anyhow::Result<()> {
    let settings = Settings {
        require_pin: true,
        ..Default::default()
    };
    let (h, shared) = emulator(settings, true);
    shared.lock().unwrap().pin = Some("4711".to_string());

    let a = h
        .sign_plugin(
            CONFIG.as_bytes(),
            PROTOSPEC.as_bytes(),
            matrix_pin(shared.clone(), "4711"),
        )
        .await?;

    a.verify(&verifying_key_from_pem(&KEY_PEM)?)?;

    let s = shared.lock().unwrap();
    assert_eq!(s.attempts, 0);
    assert!(s.delays.is_empty());

    Ok(())
}

#[tokio::test]
async fn sign_plugin_wrong_pin() {
    let settings = Settings {
        require_pin: true,
        ..Default::default()
    };
    let (h, shared) = emulator(settings, true);
    shared.lock().unwrap().pin = Some("4711".to_string());

    for i in 1..=2 {
        let r = h
            .sign_plugin(
                CONFIG.as_bytes(),
                PROTOSPEC.as_bytes(),
                matrix_pin(shared.clone(), "1234"),
            )
            .await;

        assert!(
            matches!(&r, Err(Error::Failure { code: FailureCode::PinInvalid, .. })),
            "{:?}",
            r
        );
        assert_eq!(shared.lock().unwrap().attempts, i);
    }

    let s = shared.lock().unwrap();
    assert_eq!(s.delays, vec![Duration::from_secs(1), Duration::from_secs(2)]);
}

#[tokio::test]
async fn change_pin() -> anyhow::Result<()> {
    let (h, shared) = emulator(Settings::default(), true);

    let m = h.change_pin(matrix_pin(shared.clone(), "2580")).await?;
    assert_eq!(m, "PIN changed");
    assert_eq!(shared.lock().unwrap().pin.as_deref(), Some("2580"));

    // Changing an existing PIN verifies the current one first
    let mut pins = vec!["1379", "2580"];
    let s = shared.clone();
    let entry = move || -> Result<Zeroizing<String>, Error> {
        let m = s.lock().unwrap().matrix.expect("matrix displayed");
        let p = pins.pop().expect("pin requested");
        Ok(Zeroizing::new(matrix_encode(&m, p).expect("valid pin")))
    };

    let m = h.change_pin(entry).await?;
    assert_eq!(m, "PIN changed");
    assert_eq!(shared.lock().unwrap().pin.as_deref(), Some("1379"));

    Ok(())
}

#[tokio::test]
async fn unexpected_response() {
    let mut t = ScriptedTransport::default();
    t.responses.push_back(to_frame(&ButtonAck {}).unwrap());

    let h = signer::DeviceHandle::from(t);
    let r = h.change_pin(no_pin()).await;

    assert!(
        matches!(r, Err(Error::UnexpectedResponse(MessageKind::ButtonAck))),
        "{:?}",
        r
    );
}

#[tokio::test]
async fn timeouts() {
    // No response to the request
    let h = signer::DeviceHandle::from(ScriptedTransport::default());
    let r = h.change_pin(no_pin()).await;
    assert!(matches!(r, Err(Error::RequestTimeout)), "{:?}", r);

    // No response once waiting on the user
    let mut t = ScriptedTransport::default();
    t.responses.push_back(to_frame(&ButtonRequest {}).unwrap());

    let h = signer::DeviceHandle::from(t);
    let r = h.change_pin(no_pin()).await;
    assert!(matches!(r, Err(Error::UserTimeout)), "{:?}", r);
}

#[tokio::test]
async fn failure_response() {
    let mut t = ScriptedTransport::default();
    t.responses.push_back(to_frame(&ButtonRequest {}).unwrap());
    t.responses
        .push_back(to_frame(&Failure::new(FailureCode::Other, "Signature failed")).unwrap());

    let h = signer::DeviceHandle::from(t);
    let r = h
        .sign_plugin(CONFIG.as_bytes(), PROTOSPEC.as_bytes(), no_pin())
        .await;

    match r {
        Err(Error::Failure { code, message }) => {
            assert_eq!(code, FailureCode::Other);
            assert_eq!(message, "Signature failed");
        }
        r => panic!("unexpected result: {:?}", r),
    }
}

/// Buttons failing on first use
struct FaultyButtons;

impl Buttons for FaultyButtons {
    fn poll(&mut self) -> Option<bool> {
        panic!("button controller fault");
    }
}

#[tokio::test]
async fn device_thread_panic() {
    setup();

    let shared = SharedState::default();
    let engine = Engine::new_with(SharedDriver(shared), Settings::default(), FixedCompiler, OsRng);

    let h = DeviceHandle::from(EmuTransport::spawn(engine, FaultyButtons)).with_timeouts(1, 1);

    let r = h
        .sign_plugin(CONFIG.as_bytes(), PROTOSPEC.as_bytes(), no_pin())
        .await;
    assert!(r.is_err(), "{:?}", r);

    // Joining the failed device thread on drop does not propagate the panic
    drop(h);
}
