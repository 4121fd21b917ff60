use std::sync::Arc;

use liblabid::mifare::{AuthState, Mifare, UltralightCAuth};
use liblabid::standards::Iso14443a;
use liblabid::test_support::ultralight_c_responder;
use liblabid::Error;

use crate::common;

const KEY: [u8; 16] = *b"BREAKMEIFYOUCAN!";
const RND_B: [u8; 8] = [0x51, 0xE7, 0x64, 0x60, 0x26, 0x78, 0xDF, 0x2B];

#[test]
fn fixed_nonce_against_simulated_tag() {
    let (mock, engine) = common::mock_engine();
    mock.set_responder(ultralight_c_responder(KEY, RND_B));

    let iso = Iso14443a::new(engine);
    let mut auth = UltralightCAuth::new(&iso, &KEY).unwrap();
    assert!(auth.run_with_nonce([0x10; 8]).unwrap());
    assert_eq!(auth.state(), AuthState::Authenticated);

    let bodies = mock.sent_bodies();
    assert_eq!(bodies[0], vec![0xA0, 0xD1, 0x02, 0x1A, 0x00]);
    assert_eq!(&bodies[1][..4], &[0xA0, 0xD1, 0x11, 0xAF]);
    assert_eq!(bodies[1].len(), 3 + 17);
}

#[test]
fn macro_set_authenticates_with_random_nonce() {
    let (mock, engine) = common::mock_engine();
    mock.set_responder(ultralight_c_responder(KEY, RND_B));
    let mf = Mifare::new(Arc::clone(&engine));
    assert!(mf.authenticate_ultralight_c(&KEY).unwrap());
    // fresh nonces every attempt
    assert!(mf.authenticate_ultralight_c(&KEY).unwrap());
    let bodies = mock.sent_bodies();
    assert_eq!(bodies.len(), 4);
    assert_ne!(bodies[1], bodies[3]);
}

#[test]
fn wrong_key_is_false_not_error() {
    let (mock, engine) = common::mock_engine();
    mock.set_responder(ultralight_c_responder(KEY, RND_B));
    let mf = Mifare::new(engine);
    assert!(!mf.authenticate_ultralight_c(&[0x00; 16]).unwrap());
}

#[test]
fn missing_tag_is_an_authentication_error() {
    let (mock, engine) = common::mock_engine();
    // reader reports no tag for the pass-through
    mock.push_reply(0x01, &[]).unwrap();
    let mf = Mifare::new(engine);
    assert!(matches!(
        mf.authenticate_ultralight_c(&KEY),
        Err(Error::Authentication(_))
    ));
}
