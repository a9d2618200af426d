//! decrypt.rs
//!
//! Jam track MIDI files are served as `.dat` blobs: a Standard MIDI File encrypted
//! with AES in ECB mode and no padding. This module turns such a blob back into a
//! buffer that starts with the `MThd` header chunk.
//!
//! Some payloads are already plain MIDI, and some carry a few junk bytes before the
//! real header. Both cases are handled:
//!  - a buffer that already starts with `MThd` is returned untouched, key or no key
//!  - after decryption the first `MThd` is searched for and everything before it dropped
//!  - if decryption yields no header but the input has one further in, the input
//!    was plain MIDI behind junk bytes and is sliced from there

use aes::cipher::{Block, BlockDecrypt, BlockSizeUser, KeyInit};
use aes::{Aes128, Aes192, Aes256};

/// The 4-byte chunk id every Standard MIDI File starts with.
pub const MIDI_HEADER: &[u8; 4] = b"MThd";

#[derive(thiserror::Error, Debug)]
pub enum DecryptError {
    #[error("Bad MIDI file. Too small to contain header ({len} bytes).")]
    TooSmall { len: usize },
    #[error("Bad MIDI file. Expected 'MThd' header. First bytes: {first_bytes}")]
    Malformed { first_bytes: String },
    #[error("key is not valid hex: {0}")]
    InvalidKeyHex(#[from] hex::FromHexError),
    #[error("key must be 16, 24 or 32 bytes, got {0}")]
    InvalidKeyLength(usize),
}

/// Decrypt a jam track MIDI blob with a hex encoded AES key.
///
/// The key size picks the AES variant (128/192/256). Output always has the
/// same length as the input before the header search trims the front.
pub fn decrypt_midi(bytes: &[u8], key_hex: &str) -> Result<Vec<u8>, DecryptError> {
    if is_midi_header(bytes, 0) {
        tracing::debug!("MIDI file is already decrypted");
        return Ok(bytes.to_vec());
    }
    if bytes.len() < MIDI_HEADER.len() {
        return Err(DecryptError::TooSmall { len: bytes.len() });
    }

    let key = hex::decode(key_hex.trim())?;
    let mut plain = bytes.to_vec();
    match key.len() {
        16 => decrypt_ecb::<Aes128>(&key, &mut plain)?,
        24 => decrypt_ecb::<Aes192>(&key, &mut plain)?,
        32 => decrypt_ecb::<Aes256>(&key, &mut plain)?,
        n => return Err(DecryptError::InvalidKeyLength(n)),
    }

    match find_midi_header(&plain) {
        Some(start) => {
            if start > 0 {
                tracing::debug!(offset = start, "skipping junk bytes before MIDI header");
                plain.drain(..start);
            }
            Ok(plain)
        }
        // Plain MIDI behind junk bytes never needed decrypting.
        None => match find_midi_header(bytes) {
            Some(start) => {
                tracing::debug!(offset = start, "MIDI file is already decrypted, skipping junk bytes");
                Ok(bytes[start..].to_vec())
            }
            None => Err(DecryptError::Malformed {
                first_bytes: hex_preview(&plain[..MIDI_HEADER.len()]),
            }),
        },
    }
}

/// Slice a buffer so it starts at its first `MThd` header.
pub fn normalize_midi_buffer(bytes: &[u8]) -> Result<&[u8], DecryptError> {
    let start = normalize_offset(bytes)?;
    Ok(&bytes[start..])
}

/// Offset of the first `MThd` signature, if any.
pub fn find_midi_header(bytes: &[u8]) -> Option<usize> {
    bytes.windows(MIDI_HEADER.len()).position(|w| w == MIDI_HEADER)
}

pub fn is_midi_header(bytes: &[u8], offset: usize) -> bool {
    bytes
        .get(offset..offset + MIDI_HEADER.len())
        .is_some_and(|w| w == MIDI_HEADER)
}

fn normalize_offset(bytes: &[u8]) -> Result<usize, DecryptError> {
    if bytes.len() < MIDI_HEADER.len() {
        return Err(DecryptError::TooSmall { len: bytes.len() });
    }
    match find_midi_header(bytes) {
        Some(0) => Ok(0),
        Some(offset) => {
            tracing::debug!(offset, "skipping junk bytes before MIDI header");
            Ok(offset)
        }
        None => Err(DecryptError::Malformed {
            first_bytes: hex_preview(&bytes[..MIDI_HEADER.len()]),
        }),
    }
}

/// ECB, no padding. A short final block is zero-filled, decrypted, then cut back
/// to its original length, which keeps output length equal to input length.
fn decrypt_ecb<C>(key: &[u8], data: &mut [u8]) -> Result<(), DecryptError>
where
    C: KeyInit + BlockDecrypt,
{
    let cipher = C::new_from_slice(key).map_err(|_| DecryptError::InvalidKeyLength(key.len()))?;
    for chunk in data.chunks_mut(<C as BlockSizeUser>::block_size()) {
        let mut block = Block::<C>::default();
        block[..chunk.len()].copy_from_slice(chunk);
        cipher.decrypt_block(&mut block);
        chunk.copy_from_slice(&block[..chunk.len()]);
    }
    Ok(())
}

/// Space separated lowercase hex, e.g. `de ad be ef`.
fn hex_preview(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| hex::encode([*b]))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use aes::cipher::{BlockEncrypt, generic_array::GenericArray};

    const KEY: &str = "000102030405060708090a0b0c0d0e0f";

    // Smallest well-formed SMF: header chunk plus one empty track.
    fn tiny_midi() -> Vec<u8> {
        let mut b = Vec::new();
        b.extend_from_slice(b"MThd");
        b.extend_from_slice(&[0, 0, 0, 6, 0, 1, 0, 1, 0x01, 0xE0]);
        b.extend_from_slice(b"MTrk");
        b.extend_from_slice(&[0, 0, 0, 4, 0x00, 0xFF, 0x2F, 0x00]);
        b
    }

    fn encrypt(plain: &[u8], key_hex: &str) -> Vec<u8> {
        let key = hex::decode(key_hex).unwrap();
        let cipher = Aes128::new_from_slice(&key).unwrap();
        let mut out = plain.to_vec();
        for chunk in out.chunks_mut(16) {
            assert_eq!(chunk.len(), 16, "fixtures are block aligned");
            cipher.encrypt_block(GenericArray::from_mut_slice(chunk));
        }
        out
    }

    fn pad_to_block(mut v: Vec<u8>) -> Vec<u8> {
        while v.len() % 16 != 0 {
            v.push(0);
        }
        v
    }

    #[test]
    fn plain_midi_passes_through_for_any_key() {
        let midi = tiny_midi();
        assert_eq!(decrypt_midi(&midi, KEY).unwrap(), midi);
        // key is never parsed on pass-through
        assert_eq!(decrypt_midi(&midi, "not hex at all").unwrap(), midi);
    }

    #[test]
    fn decrypts_to_midi_header() {
        let plain = pad_to_block(tiny_midi());
        let enc = encrypt(&plain, KEY);
        assert!(!enc.starts_with(b"MThd"));

        let out = decrypt_midi(&enc, KEY).unwrap();
        assert!(out.starts_with(b"MThd"));
        assert_eq!(out, plain);
    }

    #[test]
    fn strips_junk_before_header_after_decrypt() {
        let mut plain = vec![0xAA; 5];
        plain.extend(tiny_midi());
        let plain = pad_to_block(plain);
        let enc = encrypt(&plain, KEY);

        let out = decrypt_midi(&enc, KEY).unwrap();
        assert_eq!(out, &plain[5..]);
    }

    #[test]
    fn header_search_for_any_prefix_length() {
        let midi = tiny_midi();
        for n in 0..40 {
            let mut buf = vec![0x11; n];
            buf.extend_from_slice(&midi);
            assert_eq!(normalize_midi_buffer(&buf).unwrap(), &midi[..], "prefix {n}");
            assert_eq!(decrypt_midi(&buf, KEY).unwrap(), midi, "decrypt with prefix {n}");
        }
    }

    #[test]
    fn encrypted_garbage_still_reports_decrypted_bytes() {
        let enc = encrypt(&[0x11; 32], KEY);
        let err = decrypt_midi(&enc, KEY).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Bad MIDI file. Expected 'MThd' header. First bytes: 11 11 11 11"
        );
    }

    #[test]
    fn partial_trailing_block_keeps_length() {
        let mut plain = tiny_midi();
        plain.truncate(16 + 7);
        let mut buf = encrypt(&plain[..16], KEY);
        buf.extend_from_slice(&plain[16..]);

        decrypt_ecb::<Aes128>(&hex::decode(KEY).unwrap(), &mut buf).unwrap();
        assert_eq!(buf.len(), 16 + 7);
        assert_eq!(&buf[..16], &plain[..16]);
    }

    #[test]
    fn too_small_is_rejected() {
        let err = decrypt_midi(b"MT", KEY).unwrap_err();
        assert!(matches!(err, DecryptError::TooSmall { len: 2 }));
        assert!(matches!(
            normalize_midi_buffer(&[]),
            Err(DecryptError::TooSmall { len: 0 })
        ));
    }

    #[test]
    fn missing_header_reports_first_bytes() {
        let err = normalize_midi_buffer(&[0xde, 0xad, 0xbe, 0xef, 0x00]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Bad MIDI file. Expected 'MThd' header. First bytes: de ad be ef"
        );
    }

    #[test]
    fn bad_keys_are_rejected() {
        let junk = vec![0u8; 32];
        assert!(matches!(
            decrypt_midi(&junk, "zz"),
            Err(DecryptError::InvalidKeyHex(_))
        ));
        assert!(matches!(
            decrypt_midi(&junk, "0011"),
            Err(DecryptError::InvalidKeyLength(2))
        ));
    }
}
