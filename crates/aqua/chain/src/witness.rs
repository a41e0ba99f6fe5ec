use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use aqua_types::ContentHash;

use crate::error::WitnessError;

/// What a witness network reports about one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WitnessConfirmation {
    pub network: String,
    pub transaction_hash: String,
    /// Hash the transaction anchored.
    pub anchored_hash: ContentHash,
    pub sender: String,
    pub contract: String,
    /// Unix seconds at which the transaction was included.
    pub timestamp: u64,
}

/// Boundary to an external witness network.
///
/// Implementations look a transaction up; they do not retry.
#[async_trait]
pub trait WitnessConfirmer: Send + Sync {
    async fn confirm(
        &self,
        network: &str,
        transaction_hash: &str,
    ) -> Result<WitnessConfirmation, WitnessError>;
}

/// In-memory witness network for tests and local use.
#[derive(Clone, Default)]
pub struct InMemoryWitnessLedger {
    transactions: Arc<RwLock<HashMap<(String, String), WitnessConfirmation>>>,
    offline: Arc<RwLock<bool>>,
}

impl InMemoryWitnessLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchor `hash` on `network`, returning the transaction reference.
    pub fn anchor(&self, network: &str, hash: ContentHash) -> Result<String, WitnessError> {
        let mut transactions = self.transactions.write().map_err(|_| WitnessError::Unreachable {
            network: network.to_string(),
            reason: "ledger lock poisoned".to_string(),
        })?;

        let sequence = transactions.len() as u64;
        let mut seed = Vec::with_capacity(network.len() + 40);
        seed.extend_from_slice(network.as_bytes());
        seed.extend_from_slice(hash.as_bytes());
        seed.extend_from_slice(&sequence.to_be_bytes());
        let transaction_hash = format!("0x{}", blake3::hash(&seed).to_hex());

        let confirmation = WitnessConfirmation {
            network: network.to_string(),
            transaction_hash: transaction_hash.clone(),
            anchored_hash: hash,
            sender: "0x0000000000000000000000000000000000000001".to_string(),
            contract: "0x0000000000000000000000000000000000000a0a".to_string(),
            timestamp: chrono::Utc::now().timestamp().max(0) as u64,
        };
        transactions.insert((network.to_string(), transaction_hash.clone()), confirmation);
        Ok(transaction_hash)
    }

    /// Simulate the network going away.
    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut flag) = self.offline.write() {
            *flag = offline;
        }
    }

    fn is_offline(&self) -> bool {
        self.offline.read().map(|flag| *flag).unwrap_or(true)
    }
}

#[async_trait]
impl WitnessConfirmer for InMemoryWitnessLedger {
    async fn confirm(
        &self,
        network: &str,
        transaction_hash: &str,
    ) -> Result<WitnessConfirmation, WitnessError> {
        if self.is_offline() {
            return Err(WitnessError::Unreachable {
                network: network.to_string(),
                reason: "offline".to_string(),
            });
        }
        let transactions = self.transactions.read().map_err(|_| WitnessError::Unreachable {
            network: network.to_string(),
            reason: "ledger lock poisoned".to_string(),
        })?;
        transactions
            .get(&(network.to_string(), transaction_hash.to_string()))
            .cloned()
            .ok_or_else(|| WitnessError::TransactionNotFound {
                network: network.to_string(),
                transaction: transaction_hash.to_string(),
            })
    }
}
