//! AES-128/192/256-ECB + PKCS#7 symmetric codec.
//!
//! Grounded in `examples/original_source/kobodict/crypt.go`: the Kobo
//! reader firmware requires ECB mode, so this preserves that choice for
//! on-device compatibility even though ECB is not recommended for general
//! use (spec.md §9).

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256};

use crate::error::{CryptoError, Result};

/// Block size used by every supported method (AES's block size, 16 bytes).
pub const BLOCK_SIZE: usize = 16;

/// The only crypter method identifier currently supported.
pub const CRYPT_METHOD_AES: &str = "aes";

/// A symmetric dictzip encryption method: both directions in one trait,
/// mirroring `kobodict.Crypter` (`Encrypter` + `Decrypter` combined).
pub trait Crypter {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>>;
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>>;
}

enum AesBlockCipher {
    Aes128(Box<Aes128>),
    Aes192(Box<Aes192>),
    Aes256(Box<Aes256>),
}

impl AesBlockCipher {
    fn encrypt_block(&self, block: &mut GenericArray<u8, aes::cipher::consts::U16>) {
        match self {
            AesBlockCipher::Aes128(c) => c.encrypt_block(block),
            AesBlockCipher::Aes192(c) => c.encrypt_block(block),
            AesBlockCipher::Aes256(c) => c.encrypt_block(block),
        }
    }

    fn decrypt_block(&self, block: &mut GenericArray<u8, aes::cipher::consts::U16>) {
        match self {
            AesBlockCipher::Aes128(c) => c.decrypt_block(block),
            AesBlockCipher::Aes192(c) => c.decrypt_block(block),
            AesBlockCipher::Aes256(c) => c.decrypt_block(block),
        }
    }
}

/// AES-ECB with PKCS#7 padding, for any of the three standard AES key
/// sizes (16/24/32 bytes).
pub struct AesCrypter {
    cipher: AesBlockCipher,
}

impl AesCrypter {
    pub fn new(key: &[u8]) -> Result<Self> {
        let cipher = match key.len() {
            16 => AesBlockCipher::Aes128(Box::new(Aes128::new(GenericArray::from_slice(key)))),
            24 => AesBlockCipher::Aes192(Box::new(Aes192::new(GenericArray::from_slice(key)))),
            32 => AesBlockCipher::Aes256(Box::new(Aes256::new(GenericArray::from_slice(key)))),
            n => return Err(CryptoError::BadKeySize(n).into()),
        };
        Ok(AesCrypter { cipher })
    }
}

impl Crypter for AesCrypter {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let padded = pkcs7_pad(plaintext, BLOCK_SIZE);
        let mut out = padded;
        for chunk in out.chunks_mut(BLOCK_SIZE) {
            let block = GenericArray::from_mut_slice(chunk);
            self.cipher.encrypt_block(block);
        }
        Ok(out)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(CryptoError::BadBlockAlignment(ciphertext.len()).into());
        }
        let mut out = ciphertext.to_vec();
        for chunk in out.chunks_mut(BLOCK_SIZE) {
            let block = GenericArray::from_mut_slice(chunk);
            self.cipher.decrypt_block(block);
        }
        pkcs7_unpad(&out, BLOCK_SIZE)
    }
}

/// Constructs the crypter named by `method` (currently only `"aes"`).
pub fn new_crypter(method: &str, key: &[u8]) -> Result<Box<dyn Crypter>> {
    match method {
        CRYPT_METHOD_AES => Ok(Box::new(AesCrypter::new(key)?)),
        other => Err(CryptoError::UnknownMethod(other.to_string()).into()),
    }
}

/// Parses a `"method:keyhex"` crypter spec, as accepted by the CLI
/// front-ends (`--crypt aes:00112233...`), and constructs the crypter.
pub fn parse_crypter_spec(spec: &str) -> Result<Box<dyn Crypter>> {
    let (method, keyhex) = spec
        .split_once(':')
        .ok_or_else(|| CryptoError::InvalidSpec(spec.to_string()))?;
    let key = hex::decode(keyhex).map_err(CryptoError::InvalidHex)?;
    new_crypter(method, &key)
}

fn pkcs7_pad(src: &[u8], block_size: usize) -> Vec<u8> {
    let pad_len = block_size - (src.len() % block_size);
    let mut out = Vec::with_capacity(src.len() + pad_len);
    out.extend_from_slice(src);
    out.extend(std::iter::repeat(pad_len as u8).take(pad_len));
    out
}

fn pkcs7_unpad(src: &[u8], block_size: usize) -> Result<Vec<u8>> {
    if src.is_empty() || src.len() % block_size != 0 {
        return Err(CryptoError::BadBlockAlignment(src.len()).into());
    }
    let pad_len = *src.last().unwrap() as usize;
    if pad_len == 0 || pad_len > src.len() {
        return Err(CryptoError::BadPadding.into());
    }
    if src[src.len() - pad_len..].iter().any(|&b| b as usize != pad_len) {
        return Err(CryptoError::BadPadding.into());
    }
    Ok(src[..src.len() - pad_len].to_vec())
}
