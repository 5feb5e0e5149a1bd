//! Destination addresses for the split outputs.
//!
//! A fixed address is repeated for every output. An extended public key
//! yields consecutive children on the receive (0) or change (1) branch;
//! which branch comes from the path hint.

use rayon::prelude::*;
use tracing::debug;

use bsv_primitives::bip32::{ExtendedPublicKey, HARDENED_OFFSET};
use bsv_script::{Address, Network};

use crate::error::SplitError;
use crate::types::Recipient;

/// Conventional external (receive) branch.
pub const RECEIVE_BRANCH: u32 = 0;
/// Conventional internal (change) branch.
pub const CHANGE_BRANCH: u32 = 1;

/// Resolve `output_count` destinations in output order.
///
/// # Returns
/// `InvalidRecipientConfig` for unparseable addresses or keys, or a
/// preview list of the wrong length; `DerivationFailure` when any child
/// cannot be derived. No partial list is ever returned.
pub fn resolve_recipients(
    recipient: &Recipient,
    output_count: u32,
) -> Result<Vec<Address>, SplitError> {
    match recipient {
        Recipient::Single { address } => {
            let address = parse_address(address)?;
            Ok(vec![address; output_count as usize])
        }
        Recipient::Xpub {
            resolved_addresses: Some(list),
            ..
        } => {
            if list.len() != output_count as usize {
                return Err(SplitError::InvalidRecipientConfig(format!(
                    "{} precomputed addresses for {} outputs",
                    list.len(),
                    output_count
                )));
            }
            list.iter().map(|a| parse_address(a)).collect()
        }
        Recipient::Xpub {
            xpub,
            path,
            start_index,
            resolved_addresses: None,
        } => derive_addresses(xpub, path, *start_index, output_count),
    }
}

/// Derive `count` addresses at `start_index..start_index + count` on the
/// branch selected by `path`.
///
/// Children are derived in parallel; the result keeps index order and
/// reports the failure at the lowest index.
pub fn derive_addresses(
    xpub: &str,
    path: &str,
    start_index: u32,
    count: u32,
) -> Result<Vec<Address>, SplitError> {
    let trimmed = xpub.trim();
    if trimmed.is_empty() {
        return Err(SplitError::InvalidRecipientConfig(
            "extended public key is empty".to_string(),
        ));
    }
    let account = ExtendedPublicKey::from_string(trimmed)
        .map_err(|e| SplitError::InvalidRecipientConfig(e.to_string()))?;
    let network = if account.is_testnet() {
        Network::Testnet
    } else {
        Network::Mainnet
    };

    let branch_index = branch_from_path(path)?;
    let branch = account
        .derive_path(&[branch_index])
        .map_err(|e| SplitError::DerivationFailure {
            index: branch_index,
            reason: e.to_string(),
        })?;

    debug!(branch = branch_index, start_index, count, "deriving recipient addresses");

    let results: Vec<Result<Address, SplitError>> = (0..count)
        .into_par_iter()
        .map(|offset| {
            let index = start_index
                .checked_add(offset)
                .filter(|i| *i < HARDENED_OFFSET)
                .ok_or_else(|| SplitError::DerivationFailure {
                    index: start_index.saturating_add(offset),
                    reason: "index outside the non-hardened range".to_string(),
                })?;
            let child = branch
                .derive_child(index)
                .map_err(|e| SplitError::DerivationFailure {
                    index,
                    reason: e.to_string(),
                })?;
            Ok(Address::from_public_key(child.public_key(), network))
        })
        .collect();
    results.into_iter().collect()
}

/// Pick the branch index from a path hint like `m/44'/236'/0'/1`.
///
/// Segments are scanned from the end; the first non-hardened segment equal
/// to 0 or 1 wins. Paths without one select the receive branch.
///
/// # Returns
/// `InvalidRecipientConfig` for segments that are not numbers.
pub fn branch_from_path(path: &str) -> Result<u32, SplitError> {
    let segments: Vec<&str> = path
        .trim()
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "m" && *s != "M")
        .collect();

    let mut branch = None;
    for segment in segments.iter().rev() {
        let (digits, hardened) = match segment.strip_suffix(['\'', 'h', 'H']) {
            Some(d) => (d, true),
            None => (*segment, false),
        };
        let value: u32 = digits.parse().map_err(|_| {
            SplitError::InvalidRecipientConfig(format!("invalid path segment '{}'", segment))
        })?;
        if branch.is_none() && !hardened && (value == RECEIVE_BRANCH || value == CHANGE_BRANCH) {
            branch = Some(value);
        }
    }
    Ok(branch.unwrap_or(RECEIVE_BRANCH))
}

fn parse_address(address: &str) -> Result<Address, SplitError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(SplitError::InvalidRecipientConfig(
            "recipient address is empty".to_string(),
        ));
    }
    Address::from_string(trimmed).map_err(|e| SplitError::InvalidRecipientConfig(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // BIP-32 test vector 2 master key.
    const XPUB: &str = "xpub661MyMwAqRbcFW31YEwpkMuc5THy2PSt5bDMsktWQcFF8syAmRUapSCGu8ED9W6oDMSgv6Zz8idoc4a6mr8BDzTJY47LJhkJ8UB7WEGuduB";

    #[test]
    fn test_branch_selection() {
        assert_eq!(branch_from_path("m/44'/236'/0'/0").unwrap(), 0);
        assert_eq!(branch_from_path("m/44'/236'/0'/1").unwrap(), 1);
        assert_eq!(branch_from_path("m/0/1/5").unwrap(), 1);
        assert_eq!(branch_from_path("m/1'/0h").unwrap(), 0);
        assert_eq!(branch_from_path("m/44'/1'/7").unwrap(), 0);
        assert_eq!(branch_from_path("").unwrap(), 0);
        assert_eq!(branch_from_path("m").unwrap(), 0);
        assert!(matches!(
            branch_from_path("m/44'/x/0"),
            Err(SplitError::InvalidRecipientConfig(_))
        ));
    }

    #[test]
    fn test_single_repeats_address() {
        let r = Recipient::Single { address: "1E7ucTTWRTahCyViPhxSMor2pj4VGQdFMr".into() };
        let addrs = resolve_recipients(&r, 4).unwrap();
        assert_eq!(addrs.len(), 4);
        assert!(addrs.iter().all(|a| a.address_string == "1E7ucTTWRTahCyViPhxSMor2pj4VGQdFMr"));

        for bad in ["", "  ", "1E7ucTTWRTahCyViPhxSMor2pj4VGQdFMs"] {
            let r = Recipient::Single { address: bad.into() };
            assert!(matches!(resolve_recipients(&r, 1), Err(SplitError::InvalidRecipientConfig(_))));
        }
    }

    #[test]
    fn test_derivation_matches_direct_bip32() {
        let addrs = derive_addresses(XPUB, "m/0", 3, 4).unwrap();
        let branch = ExtendedPublicKey::from_string(XPUB).unwrap().derive_child(0).unwrap();
        assert_eq!(
            ExtendedPublicKey::from_string(XPUB).unwrap().derive_path(&[0, 3]).unwrap(),
            branch.derive_child(3).unwrap()
        );
        for (offset, addr) in addrs.iter().enumerate() {
            let child = branch.derive_child(3 + offset as u32).unwrap();
            assert_eq!(*addr, Address::from_public_key(child.public_key(), Network::Mainnet));
        }
        let change = derive_addresses(XPUB, "m/1", 3, 4).unwrap();
        assert_ne!(addrs, change);
    }

    #[test]
    fn test_derivation_is_repeatable() {
        let a = derive_addresses(XPUB, "m/44'/236'/0'/0", 0, 8).unwrap();
        let b = derive_addresses(XPUB, "m/44'/236'/0'/0", 0, 8).unwrap();
        assert_eq!(a, b);
        let distinct: std::collections::HashSet<_> = a.iter().collect();
        assert_eq!(distinct.len(), 8);
    }

    #[test]
    fn test_precomputed_list_used_verbatim() {
        let preview = derive_addresses(XPUB, "m/0", 0, 2).unwrap();
        let r = Recipient::Xpub {
            xpub: String::new(),
            path: String::new(),
            start_index: 0,
            resolved_addresses: Some(preview.iter().map(|a| a.to_string()).collect()),
        };
        assert_eq!(resolve_recipients(&r, 2).unwrap(), preview);
        assert!(matches!(resolve_recipients(&r, 3), Err(SplitError::InvalidRecipientConfig(_))));
    }

    #[test]
    fn test_index_range_overflow_aborts() {
        let err = derive_addresses(XPUB, "m/0", HARDENED_OFFSET - 2, 5).unwrap_err();
        match err {
            SplitError::DerivationFailure { index, .. } => assert_eq!(index, HARDENED_OFFSET),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_bad_keys() {
        assert!(matches!(derive_addresses("", "m/0", 0, 1), Err(SplitError::InvalidRecipientConfig(_))));
        assert!(matches!(
            derive_addresses("1E7ucTTWRTahCyViPhxSMor2pj4VGQdFMr", "m/0", 0, 1),
            Err(SplitError::InvalidRecipientConfig(_))
        ));
    }

    #[test]
    fn test_tpub_gives_testnet_addresses() {
        let master = ExtendedPublicKey::from_string(XPUB).unwrap();
        let tpub = ExtendedPublicKey::new(master.public_key().clone(), *master.chain_code(), true);
        let addrs = derive_addresses(&tpub.to_string(), "m/0", 0, 2).unwrap();
        assert!(addrs.iter().all(|a| a.network == Network::Testnet));
    }
}
