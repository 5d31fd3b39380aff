//! Credbank Chain - on-chain payment verification
//!
//! Implements [`PaymentVerifier`] against an EVM JSON-RPC endpoint. A
//! payment reference is the purchase transaction's hash; it verifies when
//! the transaction exists, its receipt reports success, and its target is
//! the configured credits contract. The verified account is the sending
//! wallet address, the verified amount is the transferred value divided by
//! the configured wei-per-credit rate.

use async_trait::async_trait;
use credbank_core::Credits;
use credbank_engine::{PaymentVerdict, PaymentVerifier, VerifyError};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// On-chain transaction fields the verifier reads.
#[derive(Debug, Clone, Deserialize)]
pub struct TxObject {
    pub from: String,
    /// None for contract-creation transactions.
    pub to: Option<String>,
    /// Transferred value in wei, hex-encoded.
    pub value: String,
}

/// Transaction receipt fields the verifier reads.
#[derive(Debug, Clone, Deserialize)]
pub struct ReceiptObject {
    /// "0x1" on success, "0x0" on revert.
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

/// JSON-RPC payment verifier.
pub struct RpcVerifier {
    client: Client,
    rpc_url: String,
    contract_address: String,
    wei_per_credit: u128,
}

impl RpcVerifier {
    /// `contract_address` is the credits contract payments must be sent
    /// to; `wei_per_credit` the on-chain price of one credit.
    pub fn new(
        client: Client,
        rpc_url: impl Into<String>,
        contract_address: impl Into<String>,
        wei_per_credit: u128,
    ) -> Self {
        Self {
            client,
            rpc_url: rpc_url.into(),
            contract_address: contract_address.into().to_lowercase(),
            wei_per_credit,
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        reference: &str,
    ) -> Result<Option<T>, VerifyError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": [reference],
        });

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|err| VerifyError::Unavailable(err.to_string()))?;

        let parsed: RpcResponse<T> = response
            .json()
            .await
            .map_err(|err| VerifyError::Malformed(err.to_string()))?;

        if let Some(err) = parsed.error {
            return Err(VerifyError::Unavailable(format!(
                "rpc error {}: {}",
                err.code, err.message
            )));
        }

        Ok(parsed.result)
    }
}

#[async_trait]
impl PaymentVerifier for RpcVerifier {
    async fn verify(&self, reference: &str) -> Result<PaymentVerdict, VerifyError> {
        let tx: TxObject = self
            .call("eth_getTransactionByHash", reference)
            .await?
            .ok_or_else(|| VerifyError::UnknownReference(reference.to_string()))?;

        // A missing receipt means the transaction is still pending.
        let receipt: ReceiptObject = self
            .call("eth_getTransactionReceipt", reference)
            .await?
            .ok_or_else(|| VerifyError::Unconfirmed(reference.to_string()))?;

        let verdict = verdict_from(&tx, &receipt, &self.contract_address, self.wei_per_credit)?;
        debug!(
            reference,
            valid = verdict.valid,
            account = %verdict.account,
            amount = verdict.amount,
            "verified payment reference"
        );
        Ok(verdict)
    }
}

/// Judge a transaction and its receipt against the contract and rate.
///
/// Pure so the decision path is testable without a node.
pub fn verdict_from(
    tx: &TxObject,
    receipt: &ReceiptObject,
    contract_address: &str,
    wei_per_credit: u128,
) -> Result<PaymentVerdict, VerifyError> {
    let succeeded = receipt.status.as_deref() == Some("0x1");
    let to_contract = tx
        .to
        .as_deref()
        .map(|to| to.eq_ignore_ascii_case(contract_address))
        .unwrap_or(false);

    let value = parse_quantity(&tx.value)?;

    Ok(PaymentVerdict {
        valid: succeeded && to_contract,
        account: tx.from.to_lowercase(),
        amount: wei_to_credits(value, wei_per_credit),
    })
}

/// Parse a hex-encoded EVM quantity ("0x..." or bare hex).
pub fn parse_quantity(quantity: &str) -> Result<u128, VerifyError> {
    let digits = quantity.strip_prefix("0x").unwrap_or(quantity);
    if digits.is_empty() {
        return Err(VerifyError::Malformed(format!(
            "empty quantity: {quantity:?}"
        )));
    }
    u128::from_str_radix(digits, 16)
        .map_err(|err| VerifyError::Malformed(format!("bad quantity {quantity:?}: {err}")))
}

/// Convert a wei value to whole credits (partial credits floor away).
pub fn wei_to_credits(value_wei: u128, wei_per_credit: u128) -> Credits {
    if wei_per_credit == 0 {
        return 0;
    }
    Credits::try_from(value_wei / wei_per_credit).unwrap_or(Credits::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTRACT: &str = "0x5faadbd9203bc599b71bb789bd59ca9127a87cac";
    const WEI_PER_CREDIT: u128 = 100_000_000_000_000; // 0.0001 token per credit

    fn tx(to: Option<&str>, value: &str) -> TxObject {
        TxObject {
            from: "0xAbCd000000000000000000000000000000000001".to_string(),
            to: to.map(String::from),
            value: value.to_string(),
        }
    }

    fn receipt(status: &str) -> ReceiptObject {
        ReceiptObject {
            status: Some(status.to_string()),
        }
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0x0").unwrap(), 0);
        assert_eq!(parse_quantity("0x38d7ea4c68000").unwrap(), 1_000_000_000_000_000);
        assert!(parse_quantity("0x").is_err());
        assert!(parse_quantity("0xzz").is_err());
    }

    #[test]
    fn test_wei_to_credits_floors() {
        assert_eq!(wei_to_credits(1_000_000_000_000_000, WEI_PER_CREDIT), 10);
        assert_eq!(wei_to_credits(1_099_999_999_999_999, WEI_PER_CREDIT), 10);
        assert_eq!(wei_to_credits(0, WEI_PER_CREDIT), 0);
    }

    #[test]
    fn test_successful_payment_verdict() {
        // 0.001 token to the contract = 10 credits
        let verdict = verdict_from(
            &tx(Some(CONTRACT), "0x38d7ea4c68000"),
            &receipt("0x1"),
            CONTRACT,
            WEI_PER_CREDIT,
        )
        .unwrap();

        assert!(verdict.valid);
        assert_eq!(verdict.amount, 10);
        // sender address is normalized to lowercase
        assert_eq!(
            verdict.account,
            "0xabcd000000000000000000000000000000000001"
        );
    }

    #[test]
    fn test_reverted_payment_invalid() {
        let verdict = verdict_from(
            &tx(Some(CONTRACT), "0x38d7ea4c68000"),
            &receipt("0x0"),
            CONTRACT,
            WEI_PER_CREDIT,
        )
        .unwrap();
        assert!(!verdict.valid);
    }

    #[test]
    fn test_wrong_target_invalid() {
        let verdict = verdict_from(
            &tx(Some("0x0000000000000000000000000000000000000bad"), "0x38d7ea4c68000"),
            &receipt("0x1"),
            CONTRACT,
            WEI_PER_CREDIT,
        )
        .unwrap();
        assert!(!verdict.valid);

        // contract creation has no target at all
        let verdict = verdict_from(
            &tx(None, "0x38d7ea4c68000"),
            &receipt("0x1"),
            CONTRACT,
            WEI_PER_CREDIT,
        )
        .unwrap();
        assert!(!verdict.valid);
    }

    #[test]
    fn test_contract_address_case_insensitive() {
        let verdict = verdict_from(
            &tx(
                Some("0x5FaADBd9203Bc599B71bb789BD59ca9127a87caC"),
                "0x38d7ea4c68000",
            ),
            &receipt("0x1"),
            CONTRACT,
            WEI_PER_CREDIT,
        )
        .unwrap();
        assert!(verdict.valid);
    }

    #[test]
    fn test_rpc_response_parsing() {
        let body = r#"{
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "from": "0xAbCd000000000000000000000000000000000001",
                "to": "0x5faadbd9203bc599b71bb789bd59ca9127a87cac",
                "value": "0x38d7ea4c68000"
            }
        }"#;
        let parsed: RpcResponse<TxObject> = serde_json::from_str(body).unwrap();
        let tx = parsed.result.unwrap();
        assert_eq!(tx.value, "0x38d7ea4c68000");

        let body = r#"{"jsonrpc": "2.0", "id": 1, "result": null}"#;
        let parsed: RpcResponse<TxObject> = serde_json::from_str(body).unwrap();
        assert!(parsed.result.is_none());
    }
}
