//! Connector interface and the three provider adapters.
//!
//! # Architecture
//!
//! ```text
//! BtcWalletConnect (orchestrator)
//!     │
//!     └── Box<dyn BtcConnector>
//!           ├── UnisatConnector → Rc<dyn UnisatApi>   (single object)
//!           ├── OkxConnector    → OkxWallet           (endpoint per network)
//!           └── Sat20Connector  → Rc<dyn Sat20Api>    (JSON-string results)
//! ```
//!
//! Every adapter owns a [`ConnectorState`]. The state only changes through
//! [`ConnectorState::apply`] and [`ConnectorState::reset`], which keeps
//! `connected` and `address` in lockstep.

mod okx;
mod sat20;
mod unisat;

pub use okx::OkxConnector;
pub use sat20::Sat20Connector;
pub use unisat::UnisatConnector;

use async_trait::async_trait;
use serde::Serialize;

use crate::core::error::Result;
use crate::core::types::{
    Balance, ConnectorId, InscriptionPage, MessageType, Network, SendOptions, SignPsbtOptions,
    WalletEvent,
};
use crate::provider::EventHandler;

/// Static display metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConnectorInfo {
    pub id: ConnectorId,
    pub name: &'static str,
    pub logo: &'static str,
    pub homepage: &'static str,
}

/// Session state every connector exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorState {
    pub network: Network,
    pub connected: bool,
    pub address: Option<String>,
    pub public_key: Option<String>,
    pub balance: Balance,
}

impl ConnectorState {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            connected: false,
            address: None,
            public_key: None,
            balance: Balance::ZERO,
        }
    }

    /// Record a live session. The only way `connected` becomes true.
    pub fn apply(
        &mut self,
        address: String,
        public_key: Option<String>,
        network: Network,
        balance: Balance,
    ) {
        self.address = Some(address);
        self.public_key = public_key;
        self.network = network;
        self.balance = balance;
        self.connected = true;
    }

    /// Drop the session. `network` is kept.
    pub fn reset(&mut self) {
        self.connected = false;
        self.address = None;
        self.public_key = None;
        self.balance = Balance::ZERO;
    }
}

/// Capability contract every wallet adapter implements.
///
/// Provider errors propagate unchanged; adapters only add the
/// "not installed" and testnet-restriction checks.
#[async_trait(?Send)]
pub trait BtcConnector {
    fn info(&self) -> &ConnectorInfo;

    fn state(&self) -> &ConnectorState;

    /// Events this connector relays to its provider.
    fn supported_events(&self) -> &'static [WalletEvent];

    fn id(&self) -> ConnectorId {
        self.info().id
    }

    /// Establish a session. Resets first, so a failed retry never reports
    /// a stale `connected`.
    async fn connect(&mut self) -> Result<bool>;

    /// Re-read account, key, network and balance from the provider.
    async fn refresh(&mut self) -> Result<()>;

    /// Forget the session locally. Wallets have no revoke call.
    fn disconnect(&mut self);

    async fn get_accounts(&self) -> Result<Vec<String>>;

    /// Cached network, not re-queried.
    async fn get_network(&self) -> Result<Network> {
        Ok(self.state().network)
    }

    async fn switch_network(&mut self, network: Network) -> Result<()>;

    async fn get_public_key(&self) -> Result<String>;

    async fn get_balance(&self) -> Result<Balance>;

    async fn get_inscriptions(&self, cursor: u32, size: u32) -> Result<InscriptionPage>;

    async fn send_to_address(&self, to_address: &str, satoshis: u64) -> Result<String>;

    /// Transfer one inscription; resolves to the txid.
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

    fn remove_listener(&self, event: WalletEvent, handler: &EventHandler) -> Result<()>;

    fn get_account(&self) -> Option<&str> {
        self.state().address.as_deref()
    }

    fn is_authorized(&self) -> bool {
        self.get_account().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_and_reset_keep_invariant() {
        let mut state = ConnectorState::new(Network::Testnet);
        assert!(!state.connected && state.address.is_none());

        let balance = Balance {
            confirmed: 10,
            unconfirmed: 5,
            total: 15,
        };
        state.apply("tb1qaddr".into(), Some("02ab".into()), Network::Testnet, balance);
        assert!(state.connected);
        assert_eq!(state.address.as_deref(), Some("tb1qaddr"));

        state.reset();
        assert!(!state.connected);
        assert!(state.address.is_none() && state.public_key.is_none());
        assert!(state.balance.is_zero());
        assert_eq!(state.network, Network::Testnet);
    }
}
