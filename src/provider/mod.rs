//! Injected provider capabilities
//!
//! One trait per provider family, shaped like the object the browser
//! extension injects. Connectors translate these into the common
//! [`BtcConnector`](crate::connector::BtcConnector) contract.
//!
//! | Global | Trait | Notes |
//! |--------|-------|-------|
//! | `window.unisat` | [`UnisatApi`] | single object, switches network itself |
//! | `window.okxwallet.bitcoin` / `.bitcoinTestnet` | [`OkxApi`] ×2 | one endpoint per network |
//! | `window.sat20` | [`Sat20Api`] | send/push resolve to JSON strings |
//!
//! Every call is fire-through: a rejected promise surfaces as
//! [`ConnectError::Provider`](crate::ConnectError::Provider) with the
//! wallet's own message.

mod listeners;

pub use listeners::Listeners;

use async_trait::async_trait;
use serde_json::Value;
use std::rc::Rc;

use crate::core::error::Result;
use crate::core::types::{
    Balance, ConnectResult, InscriptionPage, MessageType, Network, PushTxRequest,
    SendInscriptionResult, SendOptions, SignPsbtOptions, WalletEvent,
};

/// Callback for provider-native events. Identity is pointer identity, so
/// keep the `Rc` around to remove it later.
pub type EventHandler = Rc<dyn Fn(Value)>;

pub fn same_handler(a: &EventHandler, b: &EventHandler) -> bool {
    Rc::ptr_eq(a, b)
}

/// `window.unisat`
#[async_trait(?Send)]
pub trait UnisatApi {
    async fn request_accounts(&self) -> Result<Vec<String>>;
    async fn get_accounts(&self) -> Result<Vec<String>>;
    async fn get_public_key(&self) -> Result<String>;
    async fn get_network(&self) -> Result<Network>;
    async fn get_balance(&self) -> Result<Balance>;
    async fn switch_network(&self, network: Network) -> Result<()>;
    async fn get_inscriptions(&self, cursor: u32, size: u32) -> Result<InscriptionPage>;
    async fn send_bitcoin(
        &self,
        to_address: &str,
        satoshis: u64,
        options: Option<SendOptions>,
    ) -> Result<String>;
    async fn send_inscription(
        &self,
        address: &str,
        inscription_id: &str,
        options: Option<SendOptions>,
    ) -> Result<SendInscriptionResult>;
    async fn sign_message(&self, message: &str, kind: Option<MessageType>) -> Result<String>;
    async fn sign_psbt(&self, psbt_hex: &str, options: Option<&SignPsbtOptions>) -> Result<String>;
    async fn sign_psbts(
        &self,
        psbt_hexs: &[String],
        options: Option<&[SignPsbtOptions]>,
    ) -> Result<Vec<String>>;
    async fn push_tx(&self, request: PushTxRequest) -> Result<String>;
    async fn push_psbt(&self, psbt_hex: &str) -> Result<String>;
    fn on(&self, event: WalletEvent, handler: EventHandler) -> Result<()>;
    fn remove_listener(&self, event: WalletEvent, handler: &EventHandler) -> Result<()>;
}

/// One OKX endpoint (`okxwallet.bitcoin` or `okxwallet.bitcoinTestnet`).
///
/// The testnet endpoint rejects most reads; connectors never route them there.
#[async_trait(?Send)]
pub trait OkxApi {
    async fn connect(&self) -> Result<ConnectResult>;
    async fn get_accounts(&self) -> Result<Vec<String>>;
    async fn get_public_key(&self) -> Result<String>;
    async fn get_network(&self) -> Result<Network>;
    async fn get_balance(&self) -> Result<Balance>;
    async fn get_inscriptions(&self, cursor: u32, size: u32) -> Result<InscriptionPage>;
    async fn send_bitcoin(
        &self,
        to_address: &str,
        satoshis: u64,
        options: Option<SendOptions>,
    ) -> Result<String>;
    async fn send_inscription(
        &self,
        address: &str,
        inscription_id: &str,
        options: Option<SendOptions>,
    ) -> Result<String>;
    async fn sign_message(&self, message: &str, kind: Option<MessageType>) -> Result<String>;
    async fn sign_psbt(&self, psbt_hex: &str, options: Option<&SignPsbtOptions>) -> Result<String>;
    async fn sign_psbts(
        &self,
        psbt_hexs: &[String],
        options: Option<&[SignPsbtOptions]>,
    ) -> Result<Vec<String>>;
    async fn push_tx(&self, raw_tx: &str) -> Result<String>;
    async fn push_psbt(&self, psbt_hex: &str) -> Result<String>;
    fn on(&self, event: WalletEvent, handler: EventHandler) -> Result<()>;
}

/// `window.okxwallet`: one endpoint object per network.
#[derive(Clone, Default)]
pub struct OkxWallet {
    pub bitcoin: Option<Rc<dyn OkxApi>>,
    pub bitcoin_testnet: Option<Rc<dyn OkxApi>>,
}

impl OkxWallet {
    pub fn new(bitcoin: Rc<dyn OkxApi>, bitcoin_testnet: Rc<dyn OkxApi>) -> Self {
        Self {
            bitcoin: Some(bitcoin),
            bitcoin_testnet: Some(bitcoin_testnet),
        }
    }

    pub fn endpoint(&self, network: Network) -> Option<Rc<dyn OkxApi>> {
        match network {
            Network::Livenet => self.bitcoin.clone(),
            Network::Testnet => self.bitcoin_testnet.clone(),
        }
    }
}

/// `window.sat20`
#[async_trait(?Send)]
pub trait Sat20Api {
    async fn request_accounts(&self) -> Result<Vec<String>>;
    async fn get_accounts(&self) -> Result<Vec<String>>;
    async fn get_public_key(&self) -> Result<String>;
    async fn get_network(&self) -> Result<Network>;
    async fn get_balance(&self) -> Result<Balance>;
    async fn switch_network(&self, network: Network) -> Result<()>;
    async fn get_inscriptions(&self, cursor: u32, size: u32) -> Result<InscriptionPage>;
    /// Resolves to a JSON-encoded string.
    async fn send_bitcoin(
        &self,
        to_address: &str,
        satoshis: u64,
        options: Option<SendOptions>,
    ) -> Result<String>;
    async fn send_inscription(
        &self,
        address: &str,
        inscription_id: &str,
        options: Option<SendOptions>,
    ) -> Result<SendInscriptionResult>;
    async fn sign_message(&self, message: &str, kind: Option<MessageType>) -> Result<String>;
    async fn sign_psbt(&self, psbt_hex: &str, options: Option<&SignPsbtOptions>) -> Result<String>;
    async fn sign_psbts(
        &self,
        psbt_hexs: &[String],
        options: Option<&[SignPsbtOptions]>,
    ) -> Result<Vec<String>>;
    /// Resolves to a JSON-encoded string.
    async fn push_tx(&self, raw_tx: &str) -> Result<String>;
    /// Resolves to a JSON-encoded string.
    async fn push_psbt(&self, psbt_hex: &str) -> Result<String>;
    fn on(&self, event: WalletEvent, handler: EventHandler) -> Result<()>;
    fn remove_listener(&self, event: WalletEvent, handler: &EventHandler) -> Result<()>;
}

/// Providers detected at construction time. `None` means not installed.
#[derive(Clone, Default)]
pub struct ProviderSet {
    pub unisat: Option<Rc<dyn UnisatApi>>,
    pub okx: Option<OkxWallet>,
    pub sat20: Option<Rc<dyn Sat20Api>>,
}

impl ProviderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unisat(mut self, provider: Rc<dyn UnisatApi>) -> Self {
        self.unisat = Some(provider);
        self
    }

    pub fn with_okx(mut self, wallet: OkxWallet) -> Self {
        self.okx = Some(wallet);
        self
    }

    pub fn with_sat20(mut self, provider: Rc<dyn Sat20Api>) -> Self {
        self.sat20 = Some(provider);
        self
    }
}
