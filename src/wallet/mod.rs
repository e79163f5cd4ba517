// Allow deprecated Signature for compatibility with alloy-consensus ecosystem
#![allow(deprecated)]

use bip32::DerivationPath;
use bip39::Mnemonic;
use k256::ecdsa::SigningKey;
use sha3::{digest::FixedOutput, Digest, Keccak256};
use std::str::FromStr;
use tiny_keccak::{Hasher, Keccak};
use zeroize::Zeroizing;

use crate::error::Error;
use crate::evm::tx::{LegacyTransaction, SignedTransaction};
use alloy_primitives::{Address, Bytes, Signature, B256};

/// HD Path prefix for Ethereum chains (BIP-44)
const ETHEREUM_HD_PATH: &str = "m/44'/60'/0'/0/";

/// Capability able to authorize transactions for one address
///
/// Implementations receive a fully populated transaction (nonce and chain id
/// included) and return its signed raw form.
pub trait TransactionSigner: Send + Sync {
    /// Address the signatures recover to
    fn address(&self) -> Address;

    /// Sign a transaction and produce its raw encoding
    fn sign_transaction(&self, tx: &LegacyTransaction) -> Result<SignedTransaction, Error>;
}

/// Whitelist signature over an address
#[derive(Debug, Clone)]
pub struct AddressSignature {
    /// Address that was signed
    pub address: Address,
    /// 65-byte `r || s || v` signature
    pub signature: Bytes,
}

/// Account backed by a local secp256k1 key
pub struct LocalAccount {
    signer: SigningKey,
    address: Address,
}

// Note: LocalAccount intentionally does not implement Clone
// The signing key should not be easily duplicated

impl std::fmt::Debug for LocalAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalAccount")
            .field("address", &self.address)
            .finish()
    }
}

impl LocalAccount {
    /// Create an account from a hex-encoded private key (with or without `0x`)
    pub fn from_private_key(private_key: &str) -> Result<Self, Error> {
        let key_bytes = Zeroizing::new(
            hex::decode(private_key.trim().trim_start_matches("0x"))
                .map_err(|e| Error::Wallet(format!("Invalid private key hex: {}", e)))?,
        );
        let signer = SigningKey::from_slice(&key_bytes)
            .map_err(|e| Error::Wallet(format!("Invalid private key: {}", e)))?;
        Self::from_signing_key(signer)
    }

    /// Create an account from a mnemonic using the Ethereum derivation path
    pub fn from_mnemonic(mnemonic: &str, account_index: u32) -> Result<Self, Error> {
        let mnemonic = Mnemonic::from_str(mnemonic)
            .map_err(|e| Error::Wallet(format!("Invalid mnemonic: {}", e)))?;

        let seed = mnemonic.to_seed("");
        let seed = bip32::Seed::new(seed);

        let path = format!("{}{}", ETHEREUM_HD_PATH, account_index);
        let path = DerivationPath::from_str(&path)
            .map_err(|e| Error::Wallet(format!("Invalid derivation path: {}", e)))?;

        let derived_key = bip32::XPrv::derive_from_path(seed.as_bytes(), &path)
            .map_err(|e| Error::Wallet(format!("Key derivation error: {}", e)))?;

        let key_bytes = Zeroizing::new(derived_key.to_bytes());
        let signer = SigningKey::from_slice(key_bytes.as_slice())
            .map_err(|e| Error::Wallet(format!("Failed to create signing key: {}", e)))?;
        Self::from_signing_key(signer)
    }

    /// Generate a new random account, returning it with its mnemonic phrase
    pub fn generate() -> Result<(Self, String), Error> {
        use rand::{thread_rng, RngCore};

        // 16 bytes of entropy for a 12-word mnemonic
        let mut entropy = Zeroizing::new([0u8; 16]);
        thread_rng().fill_bytes(&mut entropy[..]);

        let mnemonic = Mnemonic::from_entropy(&entropy[..])
            .map_err(|e| Error::Wallet(format!("Failed to generate mnemonic: {}", e)))?;

        let phrase = mnemonic.to_string();
        let account = Self::from_mnemonic(&phrase, 0)?;

        Ok((account, phrase))
    }

    fn from_signing_key(signer: SigningKey) -> Result<Self, Error> {
        let address = address_from_key(&signer)?;
        Ok(Self { signer, address })
    }

    /// Get the account's address
    pub fn address(&self) -> Address {
        self.address
    }

    fn sign_with_keccak<F>(&self, builder: F) -> Result<(Signature, B256), Error>
    where
        F: FnOnce(&mut Keccak256),
    {
        let mut digest = Keccak256::new();
        builder(&mut digest);

        let hash_bytes: [u8; 32] = digest.clone().finalize_fixed().into();

        let (sig, recid) = self
            .signer
            .sign_digest_recoverable(digest)
            .map_err(|e| Error::Wallet(format!("Failed to sign digest: {}", e)))?;

        let signature = Signature::from((sig, recid));
        Ok((signature, B256::from(hash_bytes)))
    }

    /// Sign an EIP-155 legacy transaction and return the full signed payload
    pub fn sign_legacy(&self, tx: &LegacyTransaction) -> Result<SignedTransaction, Error> {
        let encoded = tx.encoded_for_signing();
        let (signature, _) = self.sign_with_keccak(|d| d.update(&encoded))?;
        Ok(tx.clone().into_signed(signature))
    }

    /// Sign `message` with the EIP-191 `personal_sign` prefix
    pub fn sign_message(&self, message: &[u8]) -> Result<Signature, Error> {
        let prefix = format!("\x19Ethereum Signed Message:\n{}", message.len());
        let (signature, _) = self.sign_with_keccak(|d| {
            d.update(prefix.as_bytes());
            d.update(message);
        })?;
        Ok(signature)
    }

    /// Sign an address for a whitelisted sale
    ///
    /// The signed message is the 20 raw address bytes, so the contract can
    /// verify it with `ecrecover` over the prefixed hash of `msg.sender`.
    pub fn sign_address(&self, address: Address) -> Result<AddressSignature, Error> {
        let signature = self.sign_message(address.as_slice())?;
        Ok(AddressSignature {
            address,
            signature: Bytes::from(signature.as_bytes().to_vec()),
        })
    }

    /// Sign a batch of addresses for a whitelisted sale
    pub fn sign_addresses(&self, addresses: &[Address]) -> Result<Vec<AddressSignature>, Error> {
        addresses.iter().map(|a| self.sign_address(*a)).collect()
    }
}

impl TransactionSigner for LocalAccount {
    fn address(&self) -> Address {
        self.address
    }

    fn sign_transaction(&self, tx: &LegacyTransaction) -> Result<SignedTransaction, Error> {
        self.sign_legacy(tx)
    }
}

/// Derive the Ethereum address of a secp256k1 key
///
/// Keccak-256 of the uncompressed public key without its 0x04 prefix; the
/// address is the last 20 bytes.
fn address_from_key(key: &SigningKey) -> Result<Address, Error> {
    let point = key.verifying_key().to_encoded_point(false);
    let pubkey_bytes = point.as_bytes();

    if pubkey_bytes.len() != 65 || pubkey_bytes[0] != 0x04 {
        return Err(Error::Wallet(
            "Invalid public key format for Ethereum address derivation".to_string(),
        ));
    }

    let mut hasher = Keccak::v256();
    hasher.update(&pubkey_bytes[1..]);
    let mut hash = [0u8; 32];
    hasher.finalize(&mut hash);

    Ok(Address::from_slice(&hash[12..]))
}
