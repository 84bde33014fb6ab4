//! Shared value types: networks, balances, connector ids, signing options.
//!
//! Serde names follow the wire shape the injected providers speak, so the
//! same types deserialize straight out of a JS value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Network a wallet reports or is asked to switch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Livenet,
    Testnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Livenet => "livenet",
            Network::Testnet => "testnet",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "livenet" | "mainnet" | "bitcoin" => Some(Network::Livenet),
            "testnet" => Some(Network::Testnet),
            _ => None,
        }
    }

    /// Livenet is the only network every provider fully serves.
    pub fn is_primary(&self) -> bool {
        matches!(self, Network::Livenet)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Balance in satoshis, taken verbatim from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Balance {
    pub confirmed: u64,
    pub unconfirmed: u64,
    pub total: u64,
}

impl Balance {
    pub const ZERO: Balance = Balance {
        confirmed: 0,
        unconfirmed: 0,
        total: 0,
    };

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

/// Known wallet families, in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorId {
    #[default]
    Unisat,
    Okx,
    Sat20,
}

impl ConnectorId {
    pub const ALL: [ConnectorId; 3] = [ConnectorId::Unisat, ConnectorId::Okx, ConnectorId::Sat20];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectorId::Unisat => "unisat",
            ConnectorId::Okx => "okx",
            ConnectorId::Sat20 => "sat20",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "unisat" => Some(ConnectorId::Unisat),
            "okx" => Some(ConnectorId::Okx),
            "sat20" => Some(ConnectorId::Sat20),
            _ => None,
        }
    }
}

impl fmt::Display for ConnectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signature scheme for `signMessage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MessageType {
    #[default]
    #[serde(rename = "ecdsa")]
    Ecdsa,
    #[serde(rename = "bip322-simple")]
    Bip322Simple,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Ecdsa => "ecdsa",
            MessageType::Bip322Simple => "bip322-simple",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim() {
            "ecdsa" => Some(MessageType::Ecdsa),
            "bip322-simple" => Some(MessageType::Bip322Simple),
            _ => None,
        }
    }
}

/// One input the wallet should sign.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToSignInput {
    pub index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sighash_types: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_tweak_signer: Option<bool>,
}

/// Options forwarded untouched to `signPsbt` / `signPsbts`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignPsbtOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_finalized: Option<bool>,
    #[serde(default)]
    pub to_sign_inputs: Vec<ToSignInput>,
}

/// Options for the provider-native `sendBitcoin` and `sendInscription`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOptions {
    pub fee_rate: f64,
}

/// Argument shape of UniSat's `pushTx({ rawtx })`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushTxRequest {
    pub rawtx: String,
}

/// Result of UniSat / SAT20 `sendInscription`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendInscriptionResult {
    pub txid: String,
}

/// Result of OKX `connect()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectResult {
    pub address: String,
    pub public_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inscription {
    pub inscription_id: String,
    #[serde(default)]
    pub inscription_number: serde_json::Value,
    pub address: String,
    #[serde(default)]
    pub output_value: serde_json::Value,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub content_length: serde_json::Value,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub preview: String,
    #[serde(default)]
    pub timestamp: u64,
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub genesis_transaction: String,
    #[serde(default)]
    pub location: String,
}

/// One page of `getInscriptions(cursor, size)`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InscriptionPage {
    pub total: u64,
    pub list: Vec<Inscription>,
}

/// Provider-native events relayed through `on` / `removeListener`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalletEvent {
    #[serde(rename = "accountsChanged")]
    AccountsChanged,
    #[serde(rename = "networkChanged")]
    NetworkChanged,
    #[serde(rename = "accountChanged")]
    AccountChanged,
}

impl WalletEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletEvent::AccountsChanged => "accountsChanged",
            WalletEvent::NetworkChanged => "networkChanged",
            WalletEvent::AccountChanged => "accountChanged",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "accountsChanged" => Some(WalletEvent::AccountsChanged),
            "networkChanged" => Some(WalletEvent::NetworkChanged),
            "accountChanged" => Some(WalletEvent::AccountChanged),
            _ => None,
        }
    }
}

impl fmt::Display for WalletEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
