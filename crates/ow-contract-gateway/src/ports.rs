//! # Gateway Port
//!
//! The untyped call/send surface a ledger provider implements, and a
//! scripted mock for tests.

use async_trait::async_trait;
use serde_json::Value;
use shared_types::{AccountId, ContractAddress, LedgerError, NetworkId, TxReceipt};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

/// Untyped access to the deployed contract.
///
/// Implementations hold the provider connection and the signing machinery;
/// neither is this crate's concern. Writes are fire-and-forget: `send`
/// returns the node's receipt without waiting for confirmations.
#[async_trait]
pub trait ContractGateway: Send + Sync {
    /// Where the contract is deployed on `network`.
    async fn resolve_contract_address(
        &self,
        network: NetworkId,
    ) -> Result<ContractAddress, LedgerError>;

    /// Invoke a read-only contract method.
    async fn call(&self, method: &str, args: &[Value]) -> Result<Value, LedgerError>;

    /// Submit a state-changing contract call signed by `signer`.
    async fn send(
        &self,
        method: &str,
        args: &[Value],
        signer: &AccountId,
    ) -> Result<TxReceipt, LedgerError>;
}

// =============================================================================
// Mock Implementation for Testing
// =============================================================================

/// A recorded `send` invocation.
#[derive(Debug, Clone)]
pub struct RecordedSend {
    /// Method name.
    pub method: String,
    /// Arguments as passed.
    pub args: Vec<Value>,
    /// The signer used.
    pub signer: AccountId,
}

/// Scripted gateway for tests: queue responses per method, record writes.
#[derive(Default)]
pub struct MockContractGateway {
    responses: Mutex<HashMap<String, VecDeque<Result<Value, LedgerError>>>>,
    sends: Mutex<Vec<RecordedSend>>,
    address: Mutex<Option<ContractAddress>>,
}

impl MockContractGateway {
    /// Create an empty mock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response for `method`.
    pub fn stub(&self, method: &str, response: Value) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(method.to_string())
            .or_default()
            .push_back(Ok(response));
    }

    /// Queue a failure for `method`.
    pub fn stub_error(&self, method: &str, error: LedgerError) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(method.to_string())
            .or_default()
            .push_back(Err(error));
    }

    /// Set the address `resolve_contract_address` reports.
    pub fn set_address(&self, address: ContractAddress) {
        *self.address.lock().unwrap_or_else(PoisonError::into_inner) = Some(address);
    }

    /// Every write submitted so far.
    #[must_use]
    pub fn sends(&self) -> Vec<RecordedSend> {
        self.sends
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ContractGateway for MockContractGateway {
    async fn resolve_contract_address(
        &self,
        network: NetworkId,
    ) -> Result<ContractAddress, LedgerError> {
        self.address
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| LedgerError::Rpc {
                method: "resolve_contract_address".into(),
                reason: format!("no deployment configured for network {network}"),
            })
    }

    async fn call(&self, method: &str, _args: &[Value]) -> Result<Value, LedgerError> {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(method)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(LedgerError::Rpc {
                    method: method.to_string(),
                    reason: "no stubbed response".into(),
                })
            })
    }

    async fn send(
        &self,
        method: &str,
        args: &[Value],
        signer: &AccountId,
    ) -> Result<TxReceipt, LedgerError> {
        let mut sends = self.sends.lock().unwrap_or_else(PoisonError::into_inner);
        sends.push(RecordedSend {
            method: method.to_string(),
            args: args.to_vec(),
            signer: signer.clone(),
        });
        Ok(TxReceipt {
            tx_hash: format!("0xmock{:04x}", sends.len()),
            block_height: None,
        })
    }
}
