//! Typed responses. Field names follow the node's JSON; fields that differ
//! between node versions are optional.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─── Chain ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockchainInfo {
    pub chain: String,
    pub blocks: u64,
    pub headers: u64,
    pub bestblockhash: String,
    pub difficulty: f64,
    pub verificationprogress: f64,
    pub initialblockdownload: bool,
    pub pruned: bool,
}

/// `getblock` at verbosity 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub hash: String,
    pub confirmations: i64,
    pub height: u64,
    pub version: i64,
    pub merkleroot: String,
    pub time: u64,
    pub mediantime: u64,
    pub nonce: u64,
    pub bits: String,
    pub difficulty: f64,
    pub tx: Vec<String>,
    pub previousblockhash: Option<String>,
    pub nextblockhash: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MempoolInfo {
    pub size: u64,
    pub bytes: u64,
    pub usage: u64,
    pub mempoolminfee: f64,
    pub minrelaytxfee: f64,
    pub loaded: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptPubKey {
    pub asm: String,
    pub hex: String,
    #[serde(rename = "type")]
    pub script_type: String,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxOut {
    pub value: f64,
    pub n: u32,
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: ScriptPubKey,
}

/// `decoderawtransaction` output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedTransaction {
    pub txid: String,
    pub hash: String,
    pub version: i64,
    pub size: u64,
    pub vsize: u64,
    pub weight: u64,
    pub locktime: u64,
    pub vin: Vec<Value>,
    pub vout: Vec<TxOut>,
}

/// `getrawtransaction` with `verbose = true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerboseTransaction {
    #[serde(flatten)]
    pub decoded: DecodedTransaction,
    pub hex: String,
    pub blockhash: Option<String>,
    pub confirmations: Option<u64>,
    pub time: Option<u64>,
    pub blocktime: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeEstimate {
    pub feerate: Option<f64>,
    #[serde(default)]
    pub errors: Vec<String>,
    pub blocks: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressValidation {
    pub isvalid: bool,
    pub address: Option<String>,
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: Option<String>,
    pub isscript: Option<bool>,
    pub iswitness: Option<bool>,
}

// ─── Wallet ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletInfo {
    pub walletname: String,
    pub walletversion: u64,
    pub txcount: u64,
    pub keypoolsize: u64,
    pub paytxfee: f64,
    pub balance: Option<f64>,
    pub unconfirmed_balance: Option<f64>,
    pub private_keys_enabled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletTxDetail {
    pub address: Option<String>,
    pub category: String,
    pub amount: f64,
    pub label: Option<String>,
    pub vout: u32,
    pub fee: Option<f64>,
    pub abandoned: Option<bool>,
}

/// `gettransaction` output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub txid: String,
    pub amount: f64,
    pub fee: Option<f64>,
    pub confirmations: i64,
    pub blockhash: Option<String>,
    pub blockheight: Option<u64>,
    pub time: u64,
    pub timereceived: u64,
    #[serde(rename = "bip125-replaceable")]
    pub bip125_replaceable: Option<String>,
    #[serde(default)]
    pub details: Vec<WalletTxDetail>,
    pub hex: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnspentOutput {
    pub txid: String,
    pub vout: u32,
    pub address: Option<String>,
    pub label: Option<String>,
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: String,
    pub amount: f64,
    pub confirmations: u64,
    pub spendable: bool,
    pub solvable: bool,
    pub safe: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressInfo {
    pub address: String,
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: String,
    pub ismine: bool,
    pub iswatchonly: bool,
    pub isscript: bool,
    pub iswitness: bool,
    #[serde(default)]
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub hex: String,
    pub complete: bool,
    #[serde(default)]
    pub errors: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundedTransaction {
    pub hex: String,
    pub fee: f64,
    pub changepos: i64,
}

// ─── Omni Layer ───────────────────────────────────────────────────────────────

/// Omni amounts are decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OmniBalance {
    pub balance: String,
    pub reserved: String,
    pub frozen: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OmniTransaction {
    pub txid: String,
    pub fee: String,
    pub sendingaddress: String,
    pub referenceaddress: Option<String>,
    pub ismine: bool,
    pub version: u32,
    pub type_int: u32,
    #[serde(rename = "type")]
    pub tx_type: String,
    pub propertyid: Option<u32>,
    pub amount: Option<String>,
    pub valid: Option<bool>,
    pub invalidreason: Option<String>,
    pub blockhash: Option<String>,
    pub block: Option<u64>,
    pub confirmations: u64,
}

// ─── Request options ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EstimateMode {
    Unset,
    Economical,
    Conservative,
}

impl EstimateMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unset => "UNSET",
            Self::Economical => "ECONOMICAL",
            Self::Conservative => "CONSERVATIVE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AddressType {
    Legacy,
    P2shSegwit,
    Bech32,
    Bech32m,
}

impl AddressType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::P2shSegwit => "p2sh-segwit",
            Self::Bech32 => "bech32",
            Self::Bech32m => "bech32m",
        }
    }
}

/// Optional arguments of `sendtoaddress`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SendToAddressOptions {
    pub comment: Option<String>,
    pub comment_to: Option<String>,
    pub subtract_fee_from_amount: bool,
    /// Sent as an explicit boolean only when set.
    pub replaceable: Option<bool>,
    pub conf_target: Option<u32>,
    pub estimate_mode: Option<EstimateMode>,
}

/// Optional arguments of `sendmany`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SendManyOptions {
    pub comment: Option<String>,
    pub subtract_fee_from: Vec<String>,
    pub replaceable: Option<bool>,
    pub conf_target: Option<u32>,
    pub estimate_mode: Option<EstimateMode>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn verbose_transaction_flattens_decoded_fields() {
        let tx: VerboseTransaction = serde_json::from_value(json!({
            "txid": "aa", "hash": "bb", "version": 2, "size": 10, "vsize": 10,
            "weight": 40, "locktime": 0, "vin": [],
            "vout": [{"value": 0.5, "n": 0, "scriptPubKey": {
                "asm": "", "hex": "0014", "type": "witness_v0_keyhash", "address": "bcrt1q"
            }}],
            "hex": "0200", "confirmations": 3
        }))
        .unwrap();
        assert_eq!(tx.decoded.txid, "aa");
        assert_eq!(tx.decoded.vout[0].script_pub_key.address.as_deref(), Some("bcrt1q"));
        assert_eq!(tx.confirmations, Some(3));
        assert_eq!(tx.blockhash, None);
    }

    #[test]
    fn estimate_mode_strings() {
        assert_eq!(EstimateMode::Conservative.as_str(), "CONSERVATIVE");
        assert_eq!(
            serde_json::to_value(EstimateMode::Economical).unwrap(),
            json!("ECONOMICAL")
        );
        assert_eq!(
            serde_json::to_value(AddressType::P2shSegwit).unwrap(),
            json!(AddressType::P2shSegwit.as_str())
        );
    }

    #[test]
    fn wallet_transaction_reads_bip125_field() {
        let tx: WalletTransaction = serde_json::from_value(json!({
            "txid": "ff", "amount": -0.1, "fee": -0.0001, "confirmations": 0,
            "time": 1, "timereceived": 1, "bip125-replaceable": "yes",
            "details": [], "hex": "00"
        }))
        .unwrap();
        assert_eq!(tx.bip125_replaceable.as_deref(), Some("yes"));
    }
}
