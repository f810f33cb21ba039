//! Omni Layer methods. Amounts are decimal strings on the wire.

use serde_json::Value;

use btcrpc_core::{BitcoinJsonRpcError, Params};

use crate::client::BitcoinRpcClient;
use crate::types::{OmniBalance, OmniTransaction};

impl BitcoinRpcClient {
    pub async fn omni_get_info(&self) -> Result<Value, BitcoinJsonRpcError> {
        self.typed("omni_getinfo", vec![]).await
    }

    pub async fn omni_get_balance(
        &self,
        address: &str,
        property_id: u32,
    ) -> Result<OmniBalance, BitcoinJsonRpcError> {
        self.typed(
            "omni_getbalance",
            Params::new().arg(address).arg(property_id).build(),
        )
        .await
    }

    pub async fn omni_get_transaction(
        &self,
        txid: &str,
    ) -> Result<OmniTransaction, BitcoinJsonRpcError> {
        self.typed("omni_gettransaction", Params::new().arg(txid).build())
            .await
    }

    pub async fn omni_list_pending_transactions(
        &self,
        address: Option<&str>,
    ) -> Result<Vec<OmniTransaction>, BitcoinJsonRpcError> {
        self.typed(
            "omni_listpendingtransactions",
            Params::new().opt(address).build(),
        )
        .await
    }

    /// Simple send of `amount` of `property_id`. Returns the txid.
    pub async fn omni_send(
        &self,
        from: &str,
        to: &str,
        property_id: u32,
        amount: &str,
    ) -> Result<String, BitcoinJsonRpcError> {
        self.txid(
            "omni_send",
            Params::new()
                .arg(from)
                .arg(to)
                .arg(property_id)
                .arg(amount)
                .build(),
        )
        .await
    }

    /// Send with the bitcoin fee paid by `fee_address`. Returns the txid.
    pub async fn omni_funded_send(
        &self,
        from: &str,
        to: &str,
        property_id: u32,
        amount: &str,
        fee_address: &str,
    ) -> Result<String, BitcoinJsonRpcError> {
        self.txid(
            "omni_funded_send",
            Params::new()
                .arg(from)
                .arg(to)
                .arg(property_id)
                .arg(amount)
                .arg(fee_address)
                .build(),
        )
        .await
    }
}
