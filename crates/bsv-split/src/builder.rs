//! Drives a split build through its stages.
//!
//! ```text
//! Pending -> Validating -> Estimating -> Resolving -> Assembling
//!         -> Signing -> Reconciling -> Done
//! ```
//!
//! Any stage may move to `Failed(kind)` instead. Both `Done` and `Failed`
//! are terminal, and a builder runs at most once.

use tracing::{debug, info};

use bsv_script::Address;

use crate::assembler::{self, UnsignedSplit};
use crate::error::{ErrorKind, SplitError};
use crate::policy::SplitPolicy;
use crate::recipient::resolve_recipients;
use crate::reconciler::reconcile;
use crate::signer::{parse_private_key, sign_split};
use crate::types::{SplitConfig, TransactionResult, Utxo};
use crate::validator::validate_utxos;

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BuildStage {
    Validating,
    Estimating,
    Resolving,
    Assembling,
    Signing,
    Reconciling,
}

/// Where a builder is in its single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Pending,
    Running(BuildStage),
    Done,
    Failed(ErrorKind),
}

impl BuildState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BuildState::Done | BuildState::Failed(_))
    }
}

/// Builds one signed split transaction.
///
/// # Example
/// ```ignore
/// let mut builder = SplitBuilder::new(config);
/// let result = builder.build(&utxos, "1E7ucTTWRTahCyViPhxSMor2pj4VGQdFMr", &wif)?;
/// println!("{}", result.signed_hex());
/// ```
#[derive(Debug, Clone)]
pub struct SplitBuilder {
    config: SplitConfig,
    policy: SplitPolicy,
    state: BuildState,
}

impl SplitBuilder {
    pub fn new(config: SplitConfig) -> Self {
        SplitBuilder {
            config,
            policy: SplitPolicy::default(),
            state: BuildState::Pending,
        }
    }

    pub fn with_policy(mut self, policy: SplitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    pub fn policy(&self) -> &SplitPolicy {
        &self.policy
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    /// Validate, assemble and sign a split of `utxos`.
    ///
    /// Change returns to `source_address`. `signing_key` is WIF or 64 hex
    /// characters. Nothing is signed unless every earlier stage succeeded,
    /// and on failure no transaction is returned.
    ///
    /// # Returns
    /// `InvalidConfig` if this builder has already run.
    pub fn build(
        &mut self,
        utxos: &[Utxo],
        source_address: &str,
        signing_key: &str,
    ) -> Result<TransactionResult, SplitError> {
        if self.state != BuildState::Pending {
            return Err(SplitError::InvalidConfig(format!(
                "builder already ran ({:?})",
                self.state
            )));
        }
        match self.run(utxos, source_address, signing_key) {
            Ok(result) => {
                self.state = BuildState::Done;
                info!(
                    txid = %result.txid,
                    size = result.size_bytes,
                    fee = result.fee,
                    outputs = result.outputs.len(),
                    "split built"
                );
                Ok(result)
            }
            Err(err) => {
                let kind = err.kind();
                debug!(?kind, state = ?self.state, error = %err, "split build failed");
                self.state = BuildState::Failed(kind);
                Err(err)
            }
        }
    }

    fn run(
        &mut self,
        utxos: &[Utxo],
        source_address: &str,
        signing_key: &str,
    ) -> Result<TransactionResult, SplitError> {
        self.enter(BuildStage::Validating);
        self.config.validate()?;
        if utxos.is_empty() {
            return Err(SplitError::InvalidConfig("no UTXOs supplied".to_string()));
        }
        let source = Address::from_string(source_address.trim())
            .map_err(|e| SplitError::InvalidConfig(format!("source address: {}", e)))?;
        let key = parse_private_key(signing_key)?;
        let validated = validate_utxos(utxos)?;

        self.enter(BuildStage::Estimating);
        let total_input = assembler::total_input(&validated)?;
        assembler::check_funds(total_input, validated.len(), &self.config)?;

        self.enter(BuildStage::Resolving);
        let recipients = resolve_recipients(&self.config.recipient, self.config.output_count)?;

        self.enter(BuildStage::Assembling);
        let split: UnsignedSplit =
            assembler::assemble(&validated, &recipients, &source, &self.config, &self.policy)?;

        self.enter(BuildStage::Signing);
        let signed = sign_split(&split, &key)?;

        self.enter(BuildStage::Reconciling);
        reconcile(&split, &signed)
    }

    fn enter(&mut self, stage: BuildStage) {
        debug_assert!(match self.state {
            BuildState::Pending => true,
            BuildState::Running(current) => current < stage,
            _ => false,
        });
        debug!(?stage, "split stage");
        self.state = BuildState::Running(stage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Recipient;

    fn config() -> SplitConfig {
        SplitConfig {
            output_count: 2,
            satoshis_per_output: 500,
            fee_rate: 0.5,
            recipient: Recipient::Single {
                address: "1E7ucTTWRTahCyViPhxSMor2pj4VGQdFMr".to_string(),
            },
        }
    }

    const KEY_HEX: &str = "0000000000000000000000000000000000000000000000000000000000000001";

    #[test]
    fn test_stage_order() {
        assert!(BuildStage::Validating < BuildStage::Estimating);
        assert!(BuildStage::Signing < BuildStage::Reconciling);
        assert!(!BuildState::Running(BuildStage::Signing).is_terminal());
        assert!(BuildState::Failed(ErrorKind::KeyMismatch).is_terminal());
    }

    #[test]
    fn test_config_checked_first() {
        let mut cfg = config();
        cfg.output_count = 0;
        let mut builder = SplitBuilder::new(cfg);
        assert_eq!(builder.state(), BuildState::Pending);
        let err = builder.build(&[], "not an address", "not a key").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        assert_eq!(builder.state(), BuildState::Failed(ErrorKind::InvalidConfig));
    }

    #[test]
    fn test_missing_bytes_fail_validation() {
        let mut builder = SplitBuilder::new(config());
        let utxos = vec![Utxo::new("ab".repeat(32), 0, 5_000)];
        let err = builder
            .build(&utxos, "1E7ucTTWRTahCyViPhxSMor2pj4VGQdFMr", KEY_HEX)
            .unwrap_err();
        assert!(matches!(err, SplitError::MissingSourceBytes { index: 0, .. }));
        assert_eq!(builder.state(), BuildState::Failed(ErrorKind::MissingSourceBytes));
    }

    #[test]
    fn test_bad_key_and_source() {
        let utxos = vec![Utxo::new("ab".repeat(32), 0, 5_000)];
        let mut builder = SplitBuilder::new(config());
        let err = builder.build(&utxos, "1E7ucTTWRTahCyViPhxSMor2pj4VGQdFMr", "nope").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidKeyFormat);

        let mut builder = SplitBuilder::new(config());
        let err = builder.build(&utxos, "", KEY_HEX).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn test_runs_once() {
        let mut builder = SplitBuilder::new(config());
        assert!(builder.build(&[], "1E7ucTTWRTahCyViPhxSMor2pj4VGQdFMr", KEY_HEX).is_err());
        let state = builder.state();
        assert!(state.is_terminal());
        assert!(builder.build(&[], "1E7ucTTWRTahCyViPhxSMor2pj4VGQdFMr", KEY_HEX).is_err());
        assert_eq!(builder.state(), state);
    }

    #[test]
    fn test_policy_attached() {
        let builder = SplitBuilder::new(config()).with_policy(SplitPolicy { dust_limit: 546 });
        assert_eq!(builder.policy().dust_limit, 546);
        assert_eq!(builder.config().output_count, 2);
    }
}
