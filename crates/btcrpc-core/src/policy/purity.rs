//! Registry of read-only ("pure") methods.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Methods that never mutate node or wallet state. Every other method is
/// assumed to have side effects.
pub const PURE_METHODS: &[&str] = &[
    // Chain and mempool
    "getbestblockhash",
    "getblock",
    "getblockchaininfo",
    "getblockcount",
    "getblockhash",
    "getblockheader",
    "getmempoolinfo",
    "getnetworkinfo",
    "getrawmempool",
    "getrawtransaction",
    "decoderawtransaction",
    "estimatesmartfee",
    "validateaddress",
    // Wallet reads
    "getaddressinfo",
    "getbalance",
    "gettransaction",
    "getwalletinfo",
    "listtransactions",
    "listunspent",
    // Omni Layer reads
    "omni_getbalance",
    "omni_getinfo",
    "omni_gettransaction",
    "omni_listpendingtransactions",
];

/// Set of pure method names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurityRegistry {
    methods: HashSet<String>,
}

impl PurityRegistry {
    /// A registry with no pure methods: every call is treated as mutating.
    pub fn empty() -> Self {
        Self {
            methods: HashSet::new(),
        }
    }

    pub fn with_methods<I, S>(methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            methods: methods.into_iter().map(Into::into).collect(),
        }
    }

    pub fn insert(&mut self, method: impl Into<String>) {
        self.methods.insert(method.into());
    }

    pub fn is_pure(&self, method: &str) -> bool {
        self.methods.contains(method)
    }

    /// Pure methods in sorted order.
    pub fn methods(&self) -> Vec<&str> {
        let mut methods: Vec<&str> = self.methods.iter().map(String::as_str).collect();
        methods.sort_unstable();
        methods
    }
}

impl Default for PurityRegistry {
    fn default() -> Self {
        Self::with_methods(PURE_METHODS.iter().copied())
    }
}
