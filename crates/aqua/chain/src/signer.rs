//! Signing credentials.
//!
//! A signature revision signs the raw 32 bytes of its predecessor's verification
//! hash. The signer is identified by a wallet address derived from its public
//! key, so the address can be checked from the revision alone.

use aqua_types::{ContentHash, SignaturePayload, SignatureType};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::RngCore;

/// A credential able to sign revision hashes.
pub trait RevisionSigner: Send + Sync {
    fn signature_type(&self) -> SignatureType;

    /// Hex-encoded public key, recorded in the revision.
    fn public_key_hex(&self) -> String;

    fn wallet_address(&self) -> String;

    /// Sign `message`, returning hex-encoded signature bytes.
    fn sign(&self, message: &[u8]) -> Result<String, String>;
}

/// Ed25519 key pair used as a wallet.
#[derive(Clone)]
pub struct Ed25519Wallet {
    signing_key: SigningKey,
}

impl Ed25519Wallet {
    pub fn from_secret(secret: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&secret),
        }
    }

    pub fn from_secret_hex(secret_hex: &str) -> Result<Self, String> {
        let digits = secret_hex.strip_prefix("0x").unwrap_or(secret_hex);
        let mut secret = [0u8; 32];
        hex::decode_to_slice(digits, &mut secret)
            .map_err(|e| format!("invalid secret key hex: {e}"))?;
        Ok(Self::from_secret(secret))
    }

    pub fn generate() -> Self {
        let mut secret = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut secret);
        Self::from_secret(secret)
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Hex of the 32-byte secret, accepted back by [`Self::from_secret_hex`].
    pub fn secret_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }
}

impl std::fmt::Debug for Ed25519Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519Wallet")
            .field("address", &self.wallet_address())
            .finish_non_exhaustive()
    }
}

impl RevisionSigner for Ed25519Wallet {
    fn signature_type(&self) -> SignatureType {
        SignatureType::Ed25519
    }

    fn public_key_hex(&self) -> String {
        hex::encode(self.verifying_key().as_bytes())
    }

    fn wallet_address(&self) -> String {
        wallet_address(self.verifying_key().as_bytes())
    }

    fn sign(&self, message: &[u8]) -> Result<String, String> {
        let signature = self.signing_key.sign(message);
        Ok(hex::encode(signature.to_bytes()))
    }
}

/// `0x` followed by the hex of the last 20 bytes of BLAKE3(public key).
pub fn wallet_address(public_key: &[u8]) -> String {
    let digest = blake3::hash(public_key);
    format!("0x{}", hex::encode(&digest.as_bytes()[12..]))
}

/// Why a signature did not check out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureCheck {
    Valid,
    /// Malformed key or signature, or a signature that does not verify.
    Invalid(String),
    /// Verified, but the derived address differs from the recorded one.
    AddressMismatch { derived: String, recorded: String },
    /// No verifier for this signature type.
    Unsupported(String),
}

/// Verify a signature payload over `signed` (the predecessor hash) and check the
/// recorded wallet address against the one derived from the public key.
pub fn verify_signature(payload: &SignaturePayload, signed: &ContentHash) -> SignatureCheck {
    if let SignatureType::Other(kind) = &payload.signature_type {
        return SignatureCheck::Unsupported(kind.clone());
    }

    let Ok(sig_bytes) = hex::decode(&payload.signature) else {
        return SignatureCheck::Invalid("signature is not hex".into());
    };
    let Ok(pk_bytes) = hex::decode(&payload.signature_public_key) else {
        return SignatureCheck::Invalid("public key is not hex".into());
    };
    let Ok(sig_array) = <[u8; 64]>::try_from(sig_bytes.as_slice()) else {
        return SignatureCheck::Invalid(format!("signature is {} bytes", sig_bytes.len()));
    };
    let Ok(pk_array) = <[u8; 32]>::try_from(pk_bytes.as_slice()) else {
        return SignatureCheck::Invalid(format!("public key is {} bytes", pk_bytes.len()));
    };
    let Ok(verifying_key) = VerifyingKey::from_bytes(&pk_array) else {
        return SignatureCheck::Invalid("public key is not a curve point".into());
    };

    let signature = Signature::from_bytes(&sig_array);
    if verifying_key.verify(signed.as_bytes(), &signature).is_err() {
        return SignatureCheck::Invalid("signature does not verify over predecessor".into());
    }

    let derived = wallet_address(&pk_array);
    if !derived.eq_ignore_ascii_case(&payload.signature_wallet_address) {
        return SignatureCheck::AddressMismatch {
            derived,
            recorded: payload.signature_wallet_address.clone(),
        };
    }
    SignatureCheck::Valid
}
