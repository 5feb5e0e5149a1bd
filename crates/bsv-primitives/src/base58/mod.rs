//! Base58Check encoding for addresses, WIF keys and extended keys.
//!
//! All three formats share the same envelope: a version-prefixed payload
//! followed by the first four bytes of its double SHA-256.

use crate::hash::sha256d;
use crate::PrimitivesError;

/// Length of the trailing Base58Check checksum.
const CHECKSUM_LEN: usize = 4;

/// Encode `data` with its 4-byte checksum appended.
///
/// # Arguments
/// * `data` - Version byte(s) followed by the payload.
///
/// # Returns
/// The Base58 string of `data || sha256d(data)[..4]`.
pub fn check_encode(data: &[u8]) -> String {
    let checksum = sha256d(data);
    let mut payload = Vec::with_capacity(data.len() + CHECKSUM_LEN);
    payload.extend_from_slice(data);
    payload.extend_from_slice(&checksum[..CHECKSUM_LEN]);
    bs58::encode(payload).into_string()
}

/// Decode a Base58Check string and strip its verified checksum.
///
/// # Arguments
/// * `s` - The encoded string.
///
/// # Returns
/// The payload without checksum, `InvalidBase58` for bad characters or
/// short input, or `ChecksumMismatch`.
pub fn check_decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    let decoded = bs58::decode(s)
        .into_vec()
        .map_err(|e| PrimitivesError::InvalidBase58(e.to_string()))?;
    if decoded.len() < CHECKSUM_LEN {
        return Err(PrimitivesError::InvalidBase58(
            "data too short for checksum".to_string(),
        ));
    }
    let (payload, checksum) = decoded.split_at(decoded.len() - CHECKSUM_LEN);
    if checksum != &sha256d(payload)[..CHECKSUM_LEN] {
        return Err(PrimitivesError::ChecksumMismatch);
    }
    Ok(payload.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_encode_known_address() {
        let mut payload = vec![0x00];
        payload.extend_from_slice(
            &hex::decode("8fe80c75c9560e8b56ed64ea3c26e18d2c52211b").unwrap(),
        );
        assert_eq!(check_encode(&payload), "1E7ucTTWRTahCyViPhxSMor2pj4VGQdFMr");
    }

    #[test]
    fn test_check_decode_strips_checksum() {
        let payload = check_decode("1E7ucTTWRTahCyViPhxSMor2pj4VGQdFMr").unwrap();
        assert_eq!(payload.len(), 21);
        assert_eq!(payload[0], 0x00);
    }

    #[test]
    fn test_check_decode_rejects_corruption() {
        let result = check_decode("1E7ucTTWRTahCyViPhxSMor2pj4VGQdFMs");
        assert!(matches!(result, Err(PrimitivesError::ChecksumMismatch)));
    }

    #[test]
    fn test_check_decode_rejects_bad_chars() {
        assert!(matches!(
            check_decode("0OIl"),
            Err(PrimitivesError::InvalidBase58(_))
        ));
        assert!(check_decode("1").is_err());
    }
}
