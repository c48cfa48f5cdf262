//! Symmetric encryption (§3 `age-symmetric`), gated behind the `crypto` feature.
//!
//! A passphrase-derived AES-256-GCM scheme in the style of the `age` tool's symmetric
//! mode: a random salt feeds `pbkdf2`-hmac-sha256 to derive a 256-bit key, a random
//! 96-bit nonce is generated per encryption, and ciphertext is `salt || nonce ||
//! aead-output`. This is the same crate family (`aes-gcm`, `pbkdf2`, `sha2`/`hmac`) the
//! distilled original's author used for the equivalent feature, carried over verbatim.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use hmac::Hmac;
use rand::RngCore;
use sha2::Sha256;

use crate::error::{CodeLoc, LoxError, RunResult};

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const PBKDF2_ROUNDS: u32 = 100_000;

/// A passphrase-backed symmetric cipher handle. Holds no key material at rest --
/// `encrypt`/`decrypt` each derive a fresh key from the passphrase and a (stored or
/// freshly generated) salt, matching age's "no persistent key" design.
#[derive(Debug)]
pub struct AgeSymmetric {
    passphrase: String,
}

impl AgeSymmetric {
    #[must_use]
    pub fn new(passphrase: String) -> Self {
        Self { passphrase }
    }

    pub fn encrypt(&self, plaintext: &[u8], at: CodeLoc) -> RunResult<Vec<u8>> {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let key = derive_key(&self.passphrase, &salt);
        let cipher = Aes256Gcm::new((&key).into());
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);
        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| LoxError::runtime("Encryption failed.", at))?;
        let mut out = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&salt);
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    pub fn decrypt(&self, blob: &[u8], at: CodeLoc) -> RunResult<Vec<u8>> {
        if blob.len() < SALT_LEN + NONCE_LEN {
            return Err(LoxError::runtime("Ciphertext is truncated.", at));
        }
        let (salt, rest) = blob.split_at(SALT_LEN);
        let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);
        let key = derive_key(&self.passphrase, salt);
        let cipher = Aes256Gcm::new((&key).into());
        let nonce = Nonce::from_slice(nonce_bytes);
        cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| LoxError::runtime("Decryption failed: wrong passphrase or corrupted data.", at))
    }
}

fn derive_key(passphrase: &str, salt: &[u8]) -> [u8; 32] {
    let mut key = [0u8; 32];
    pbkdf2::pbkdf2::<Hmac<Sha256>>(passphrase.as_bytes(), salt, PBKDF2_ROUNDS, &mut key)
        .expect("pbkdf2 output length is valid for HMAC-SHA256");
    key
}
