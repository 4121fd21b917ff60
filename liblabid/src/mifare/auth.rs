// liblabid/src/mifare/auth.rs

//! MIFARE Ultralight C three-pass mutual authentication (2K3DES).
//!
//! ```text
//! PCD -> PICC  1A 00
//! PICC -> PCD  AF ek(RndB)
//! PCD -> PICC  AF ek(RndA || RndB')        RndB' = RndB rotated left by one byte
//! PICC -> PCD  00 ek(RndA')                RndA' = RndA rotated left by one byte
//! ```
//!
//! Every encryption runs in CBC mode, chaining the IV across the messages.

use cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use des::TdesEde3;
use log::debug;
use rand::RngCore;

use crate::{Error, Result};

const AUTH_STEP1: [u8; 2] = [0x1A, 0x00];
const AUTH_CONTINUE: u8 = 0xAF;

const NONCE_LEN: usize = 8;

type Block = cipher::Block<TdesEde3>;

/// Raw byte exchange with a tag, bypassing the reader's command set.
pub trait RawExchange {
    /// Send `data` to the tag and return its raw answer.
    fn transceive(&self, data: &[u8]) -> Result<Vec<u8>>;
}

impl<T: RawExchange + ?Sized> RawExchange for &T {
    fn transceive(&self, data: &[u8]) -> Result<Vec<u8>> {
        (**self).transceive(data)
    }
}

/// Progress of one authentication attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// Nothing sent yet.
    Idle,
    /// Waiting for the encrypted RndB.
    Step1Sent,
    /// Waiting for the encrypted, rotated RndA.
    Step2Sent,
    /// Both sides proved the key.
    Authenticated,
    /// Tag rejected the key or its answer did not match.
    Failed,
}

/// One Ultralight C authentication session. Each call to [`run`](Self::run)
/// is a fresh attempt with fresh nonces.
pub struct UltralightCAuth<L> {
    link: L,
    key: [u8; 16],
    state: AuthState,
}

impl<L> std::fmt::Debug for UltralightCAuth<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UltralightCAuth")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<L: RawExchange> UltralightCAuth<L> {
    /// `key` is the 16 byte two-key 3DES key (K1 || K2).
    pub fn new(link: L, key: &[u8]) -> Result<Self> {
        let key: [u8; 16] = key.try_into().map_err(|_| {
            Error::Validation(format!(
                "ultralight c key must be 16 bytes long, got {}",
                key.len()
            ))
        })?;
        Ok(Self {
            link,
            key,
            state: AuthState::Idle,
        })
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    /// Authenticate with a random RndA drawn from `rng`.
    pub fn run<R: RngCore>(&mut self, rng: &mut R) -> Result<bool> {
        let mut rnd_a = [0u8; NONCE_LEN];
        rng.fill_bytes(&mut rnd_a);
        self.run_with_nonce(rnd_a)
    }

    /// Authenticate with a caller supplied RndA.
    pub fn run_with_nonce(&mut self, rnd_a: [u8; NONCE_LEN]) -> Result<bool> {
        self.state = AuthState::Idle;
        let result = self.handshake(rnd_a);
        self.state = match result {
            Ok(true) => AuthState::Authenticated,
            _ => AuthState::Failed,
        };
        result
    }

    fn handshake(&mut self, rnd_a: [u8; NONCE_LEN]) -> Result<bool> {
        self.state = AuthState::Step1Sent;
        let resp = self
            .link
            .transceive(&AUTH_STEP1)
            .map_err(|e| Error::Authentication(format!("step 1 failed: {}", e)))?;
        if resp.len() < 1 + NONCE_LEN || resp[0] != AUTH_CONTINUE {
            return Err(Error::Authentication(format!(
                "unexpected step 1 reply: {}",
                crate::utils::bytes_to_hex(&resp)
            )));
        }
        let mut rnd_b_enc = [0u8; NONCE_LEN];
        rnd_b_enc.copy_from_slice(&resp[1..1 + NONCE_LEN]);

        let rnd_b = decrypt_cbc(&self.key, &[0u8; NONCE_LEN], &rnd_b_enc)?;

        let mut plain = Vec::with_capacity(2 * NONCE_LEN);
        plain.extend_from_slice(&rnd_a);
        plain.extend_from_slice(&rotate_left(&rnd_b));
        let cipher_text = encrypt_cbc(&self.key, &rnd_b_enc, &plain)?;

        let mut step2 = Vec::with_capacity(1 + cipher_text.len());
        step2.push(AUTH_CONTINUE);
        step2.extend_from_slice(&cipher_text);

        self.state = AuthState::Step2Sent;
        let resp = self
            .link
            .transceive(&step2)
            .map_err(|e| Error::Authentication(format!("step 2 failed: {}", e)))?;

        if resp.len() == 1 {
            debug!("ultralight c rejected the key ({:#04x})", resp[0]);
            return Ok(false);
        }
        if resp.len() < 1 + NONCE_LEN {
            return Err(Error::Authentication(format!(
                "unexpected step 2 reply: {}",
                crate::utils::bytes_to_hex(&resp)
            )));
        }

        let mut iv = [0u8; NONCE_LEN];
        iv.copy_from_slice(&cipher_text[NONCE_LEN..]);
        let rnd_a_rot = decrypt_cbc(&self.key, &iv, &resp[1..1 + NONCE_LEN])?;

        Ok(rnd_a_rot == rotate_left(&rnd_a))
    }
}

/// First byte moved to the end.
pub(crate) fn rotate_left(data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    if !out.is_empty() {
        out.rotate_left(1);
    }
    out
}

/// Expand a two-key 3DES key to K1 || K2 || K1.
fn resize_key(key: &[u8; 16]) -> [u8; 24] {
    let mut out = [0u8; 24];
    out[..16].copy_from_slice(key);
    out[16..].copy_from_slice(&key[..8]);
    out
}

fn to_blocks(data: &[u8]) -> Result<Vec<Block>> {
    if data.len() % NONCE_LEN != 0 {
        return Err(Error::Authentication(format!(
            "cipher input of {} bytes is not block aligned",
            data.len()
        )));
    }
    Ok(data
        .chunks_exact(NONCE_LEN)
        .map(Block::clone_from_slice)
        .collect())
}

fn from_blocks(blocks: &[Block]) -> Vec<u8> {
    blocks.iter().flat_map(|b| b.iter().copied()).collect()
}

pub(crate) fn encrypt_cbc(key: &[u8; 16], iv: &[u8; 8], data: &[u8]) -> Result<Vec<u8>> {
    let mut blocks = to_blocks(data)?;
    let mut enc = cbc::Encryptor::<TdesEde3>::new_from_slices(&resize_key(key), iv)
        .map_err(|e| Error::Authentication(format!("cipher setup failed: {}", e)))?;
    enc.encrypt_blocks_mut(&mut blocks);
    Ok(from_blocks(&blocks))
}

pub(crate) fn decrypt_cbc(key: &[u8; 16], iv: &[u8; 8], data: &[u8]) -> Result<Vec<u8>> {
    let mut blocks = to_blocks(data)?;
    let mut dec = cbc::Decryptor::<TdesEde3>::new_from_slices(&resize_key(key), iv)
        .map_err(|e| Error::Authentication(format!("cipher setup failed: {}", e)))?;
    dec.decrypt_blocks_mut(&mut blocks);
    Ok(from_blocks(&blocks))
}
