//! Flash-loan settlement through the deployed arbitrage contract

use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    primitives::Address,
    providers::Provider,
    rpc::types::eth::{TransactionReceipt, TransactionRequest},
    signers::local::PrivateKeySigner,
    sol,
    sol_types::SolCall,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use crate::{
    config::{EXECUTION_TIMEOUT_SECS, SETTLEMENT_GAS_LIMIT},
    errors::{BotError, BotResult},
    execution::Settlement,
    types::{SettlementReceipt, SettlementRequest},
    utils::{decimal_to_u256, gas_cost_native, u256_to_decimal},
    ConcreteProvider,
};

sol! {
    interface IFlashArbitrage {
        function executeArbitrage(address token, uint256 amount, bytes calldata path) external;

        event ArbitrageExecuted(address indexed token, uint256 amount, uint256 profit);
    }
}

pub struct ContractSettlement {
    provider: Arc<ConcreteProvider>,
    wallet: EthereumWallet,
    operator: Address,
    contract: Address,
    chain_id: u64,
    timeout: Duration,
}

impl ContractSettlement {
    pub fn new(
        provider: Arc<ConcreteProvider>,
        private_key: &str,
        contract: Address,
        chain_id: u64,
    ) -> BotResult<Self> {
        let signer = PrivateKeySigner::from_str(private_key)
            .map_err(|e| BotError::Config(format!("invalid PRIVATE_KEY: {}", e)))?;
        let operator = signer.address();

        Ok(Self {
            provider,
            wallet: EthereumWallet::from(signer),
            operator,
            contract,
            chain_id,
            timeout: Duration::from_secs(EXECUTION_TIMEOUT_SECS),
        })
    }

    pub fn operator(&self) -> Address {
        self.operator
    }

    fn rpc_error(message: &str, e: impl Into<anyhow::Error>) -> BotError {
        BotError::Network {
            message: message.to_string(),
            source: Some(e.into()),
            retry_count: 0,
        }
    }

    async fn build_transaction(&self, request: &SettlementRequest) -> BotResult<TransactionRequest> {
        let amount = decimal_to_u256(request.amount, request.token_decimals)
            .ok_or_else(|| BotError::settlement(format!("cannot scale amount {}", request.amount)))?;
        let calldata = IFlashArbitrage::executeArbitrageCall {
            token: request.token,
            amount,
            path: request.encoded_path.clone(),
        }
        .abi_encode();

        let nonce = self
            .provider
            .get_transaction_count(self.operator)
            .await
            .map_err(|e| Self::rpc_error("failed to read nonce", e))?;

        Ok(TransactionRequest::default()
            .with_from(self.operator)
            .with_to(self.contract)
            .with_input(calldata)
            .with_nonce(nonce)
            .with_chain_id(self.chain_id)
            .with_gas_limit(SETTLEMENT_GAS_LIMIT)
            .with_gas_price(request.gas_price_wei))
    }

    /// Profit reported by the contract's `ArbitrageExecuted` event, in token units.
    fn realized_profit(&self, receipt: &TransactionReceipt, decimals: u32) -> Option<Decimal> {
        receipt
            .inner
            .logs()
            .iter()
            .filter(|log| log.address() == self.contract)
            .find_map(|log| log.log_decode::<IFlashArbitrage::ArbitrageExecuted>().ok())
            .and_then(|event| u256_to_decimal(event.inner.data.profit, decimals))
    }
}

#[async_trait]
impl Settlement for ContractSettlement {
    async fn submit(&self, request: &SettlementRequest) -> BotResult<SettlementReceipt> {
        let tx = self.build_transaction(request).await?;
        let envelope = tx.build(&self.wallet).await.map_err(|e| BotError::Settlement {
            message: "failed to sign transaction".to_string(),
            source: Some(e.into()),
        })?;

        let pending = self
            .provider
            .send_tx_envelope(envelope)
            .await
            .map_err(|e| BotError::Settlement {
                message: "failed to send transaction".to_string(),
                source: Some(e.into()),
            })?;
        let tx_hash = format!("{:?}", pending.tx_hash());
        info!(tx_hash = %tx_hash, contract = %self.contract, "📡 Arbitrage transaction sent");

        let receipt = match tokio::time::timeout(self.timeout, pending.get_receipt()).await {
            Ok(Ok(receipt)) => receipt,
            Ok(Err(e)) => {
                return Err(BotError::Settlement {
                    message: format!("receipt unavailable for {}", tx_hash),
                    source: Some(e.into()),
                });
            }
            Err(_) => {
                return Err(BotError::settlement(format!(
                    "transaction {} not confirmed after {} seconds",
                    tx_hash,
                    self.timeout.as_secs()
                )));
            }
        };

        let gas_spent = gas_cost_native(receipt.effective_gas_price, receipt.gas_used as u64);
        let success = receipt.status();
        let realized_profit = if success {
            self.realized_profit(&receipt, request.token_decimals)
                .unwrap_or_else(|| {
                    warn!(tx_hash = %tx_hash, "ArbitrageExecuted event missing from receipt");
                    Decimal::ZERO
                })
        } else {
            Decimal::ZERO
        };

        Ok(SettlementReceipt {
            success,
            realized_profit,
            gas_spent,
            reference: Some(tx_hash),
        })
    }

    async fn operating_balance(&self) -> BotResult<Decimal> {
        let balance = self
            .provider
            .get_balance(self.operator)
            .await
            .map_err(|e| Self::rpc_error("failed to read operating balance", e))?;
        u256_to_decimal(balance, 18).ok_or_else(|| BotError::DataParsing {
            context: "operating balance".to_string(),
            source: anyhow::anyhow!("balance {} out of range", balance),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::providers::ProviderBuilder;

    fn provider() -> Arc<ConcreteProvider> {
        Arc::new(
            ProviderBuilder::new()
                .on_http("http://127.0.0.1:8545".parse().unwrap())
                .boxed(),
        )
    }

    #[test]
    fn rejects_malformed_private_key() {
        let result = ContractSettlement::new(provider(), "not-a-key", Address::ZERO, 1);
        assert!(matches!(result, Err(BotError::Config(_))));
    }

    #[test]
    fn derives_operator_from_key() {
        // anvil account #0
        let key = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
        let settlement = ContractSettlement::new(provider(), key, Address::ZERO, 1).unwrap();
        assert_eq!(
            settlement.operator(),
            Address::from_str("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap()
        );
    }
}
