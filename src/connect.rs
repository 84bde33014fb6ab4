//! BtcWalletConnect: one API over every registered wallet connector.
//!
//! Owns the connector list, the active connector, and the two persisted
//! keys that decide whether the next page load silently reconnects.
//!
//! ```text
//! UI ──► BtcWalletConnect ──► Box<dyn BtcConnector> ──► injected provider
//!              │
//!              └──► Storage: _btc_connector_id, _btc_disconnect_status
//! ```
//!
//! Mirrored fields (`connected`, `address`, `public_key`, `balance`,
//! `network`) are copied from the active connector after every operation
//! that can change them. Mutating methods take `&mut self`, so calls on one
//! instance never overlap.

use serde::Serialize;

use crate::config::WalletConnectConfig;
use crate::connector::{
    BtcConnector, ConnectorInfo, OkxConnector, Sat20Connector, UnisatConnector,
};
use crate::core::error::{ConnectError, Result};
use crate::core::keys::storage as keys;
use crate::core::storage::Storage;
use crate::core::types::{
    Balance, ConnectorId, InscriptionPage, MessageType, Network, SendOptions, SignPsbtOptions,
    WalletEvent,
};
use crate::provider::{EventHandler, ProviderSet};

/// A registered connector and whether its provider was present.
pub struct ConnectorEntry {
    pub id: ConnectorId,
    pub instance: Box<dyn BtcConnector>,
    pub installed: bool,
}

/// Connector listing for wallet pickers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorSummary {
    #[serde(flatten)]
    pub info: ConnectorInfo,
    pub installed: bool,
}

/// Snapshot of the orchestrator's public state for UI projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletState {
    pub connector_id: ConnectorId,
    pub local_connector_id: Option<ConnectorId>,
    pub dis_connect_status: bool,
    pub connected: bool,
    pub address: Option<String>,
    pub public_key: Option<String>,
    pub network: Network,
    pub balance: Balance,
}

pub struct BtcWalletConnect {
    connectors: Vec<ConnectorEntry>,
    active: Option<usize>,
    connector_id: ConnectorId,
    local_connector_id: Option<ConnectorId>,
    dis_connect_status: bool,
    connected: bool,
    address: Option<String>,
    public_key: Option<String>,
    balance: Balance,
    network: Network,
    storage: Box<dyn Storage>,
}

impl BtcWalletConnect {
    /// Build every known connector, installed or not, and recover the
    /// persisted selection.
    pub fn new(
        config: WalletConnectConfig,
        providers: ProviderSet,
        storage: Box<dyn Storage>,
    ) -> Self {
        let network = config.network;
        let ProviderSet { unisat, okx, sat20 } = providers;
        let connectors = vec![
            ConnectorEntry {
                id: ConnectorId::Unisat,
                installed: unisat.is_some(),
                instance: Box::new(UnisatConnector::new(network, unisat)),
            },
            ConnectorEntry {
                id: ConnectorId::Okx,
                installed: okx.is_some(),
                instance: Box::new(OkxConnector::new(network, okx)),
            },
            ConnectorEntry {
                id: ConnectorId::Sat20,
                installed: sat20.is_some(),
                instance: Box::new(Sat20Connector::new(network, sat20)),
            },
        ];

        let local_connector_id = storage.get(keys::CONNECTOR_ID).and_then(|raw| {
            let id = ConnectorId::from_str(&raw);
            if id.is_none() {
                tracing::warn!("ignoring unknown persisted connector id {:?}", raw);
            }
            id
        });
        let dis_connect_status =
            storage.get(keys::DISCONNECT_STATUS).as_deref() == Some(keys::DISCONNECTED);

        let connector_id = config.default_connector_id;
        let active = Self::find_installed(&connectors, connector_id);
        tracing::debug!(
            "wallet connect: default {} ({}), last used {:?}, disconnected {}",
            connector_id,
            if active.is_some() { "installed" } else { "not installed" },
            local_connector_id,
            dis_connect_status
        );

        Self {
            connectors,
            active,
            connector_id,
            local_connector_id,
            dis_connect_status,
            connected: false,
            address: None,
            public_key: None,
            balance: Balance::ZERO,
            network,
            storage,
        }
    }

    fn find_installed(connectors: &[ConnectorEntry], id: ConnectorId) -> Option<usize> {
        connectors.iter().position(|c| c.id == id && c.installed)
    }

    // =========================================================================
    // STATE
    // =========================================================================

    pub fn connectors(&self) -> &[ConnectorEntry] {
        &self.connectors
    }

    pub fn connector_summaries(&self) -> Vec<ConnectorSummary> {
        self.connectors
            .iter()
            .map(|c| ConnectorSummary {
                info: *c.instance.info(),
                installed: c.installed,
            })
            .collect()
    }

    /// The active connector, if the intended one is installed.
    pub fn connector(&self) -> Option<&dyn BtcConnector> {
        self.active.map(|i| self.connectors[i].instance.as_ref())
    }

    pub fn connector_id(&self) -> ConnectorId {
        self.connector_id
    }

    pub fn local_connector_id(&self) -> Option<ConnectorId> {
        self.local_connector_id
    }

    pub fn dis_connect_status(&self) -> bool {
        self.dis_connect_status
    }

    pub fn connected(&self) -> bool {
        self.connected
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn public_key(&self) -> Option<&str> {
        self.public_key.as_deref()
    }

    pub fn balance(&self) -> Balance {
        self.balance
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn state(&self) -> WalletState {
        WalletState {
            connector_id: self.connector_id,
            local_connector_id: self.local_connector_id,
            dis_connect_status: self.dis_connect_status,
            connected: self.connected,
            address: self.address.clone(),
            public_key: self.public_key.clone(),
            network: self.network,
            balance: self.balance,
        }
    }

    fn active(&self) -> Result<&dyn BtcConnector> {
        self.connector().ok_or(ConnectError::ConnectorNotFound)
    }

    fn active_mut(&mut self) -> Result<&mut Box<dyn BtcConnector>> {
        let index = self.active.ok_or(ConnectError::ConnectorNotFound)?;
        Ok(&mut self.connectors[index].instance)
    }

    /// Copy the active connector's session into the mirrors.
    fn sync_from_active(&mut self) {
        let Some(connector) = self.connector() else {
            return;
        };
        let state = connector.state().clone();
        self.connected = state.connected;
        self.address = state.address;
        self.public_key = state.public_key;
        self.balance = state.balance;
        self.network = state.network;
    }

    // =========================================================================
    // CONNECTION
    // =========================================================================

    /// Select an installed connector. Unknown or uninstalled ids fail and
    /// leave the selection untouched.
    pub fn switch_connector(&mut self, id: ConnectorId) -> Result<&dyn BtcConnector> {
        let index = Self::find_installed(&self.connectors, id)
            .ok_or(ConnectError::ConnectorNotFound)?;
        tracing::debug!("switching connector {} -> {}", self.connector_id, id);
        self.connector_id = id;
        self.active = Some(index);
        self.sync_from_active();
        Ok(self.connectors[index].instance.as_ref())
    }

    /// Run the provider handshake on the active connector. On success the
    /// connector id is remembered and the disconnect intent cleared.
    pub async fn connect(&mut self) -> Result<bool> {
        let result = self.active_mut()?.connect().await;
        // The connector resets before its handshake, so mirror it either way.
        self.sync_from_active();
        let connected = result?;
        if connected {
            self.storage.set(keys::CONNECTOR_ID, self.connector_id.as_str())?;
            self.storage.remove(keys::DISCONNECT_STATUS)?;
            self.local_connector_id = Some(self.connector_id);
            self.dis_connect_status = false;
            tracing::info!(
                "connected {} as {}",
                self.connector_id,
                self.address.as_deref().unwrap_or_default()
            );
        }
        Ok(connected)
    }

    async fn refresh(&mut self) -> Result<()> {
        let index = self.active.ok_or(ConnectError::NotInitialized)?;
        let result = self.connectors[index].instance.refresh().await;
        self.sync_from_active();
        result
    }

    /// Silent reconnect for app startup.
    ///
    /// Returns `Ok(false)` without touching any provider if the user
    /// disconnected last session. Refresh errors are logged, never returned.
    pub async fn check(&mut self) -> Result<bool> {
        if self.dis_connect_status {
            return Ok(false);
        }
        let id = self.local_connector_id.unwrap_or(self.connector_id);
        let index = Self::find_installed(&self.connectors, id)
            .ok_or(ConnectError::ConnectorNotFound)?;
        self.connector_id = id;
        self.active = Some(index);
        match self.refresh().await {
            Ok(()) => Ok(self.connected),
            Err(err) => {
                tracing::warn!("check: refreshing {} failed: {}", id, err);
                Ok(false)
            }
        }
    }

    /// Forget the session and persist the intent so `check` stays quiet.
    pub async fn disconnect(&mut self) -> Result<()> {
        self.active_mut()?.disconnect();
        self.connected = false;
        self.address = None;
        self.public_key = None;
        self.balance = Balance::ZERO;
        self.dis_connect_status = true;
        self.storage.set(keys::DISCONNECT_STATUS, keys::DISCONNECTED)?;
        tracing::info!("disconnected {}", self.connector_id);
        Ok(())
    }

    // =========================================================================
    // NETWORK
    // =========================================================================

    pub async fn get_network(&self) -> Result<Network> {
        self.active()?.get_network().await
    }

    /// Switch network, then resync account state: the reported account can
    /// change with the network.
    pub async fn switch_network(&mut self, network: Network) -> Result<()> {
        let result = self.active_mut()?.switch_network(network).await;
        self.sync_from_active();
        result?;
        tracing::debug!("{} switched to {}", self.connector_id, network);
        self.refresh().await
    }

    // =========================================================================
    // PASSTHROUGH
    // =========================================================================

    pub async fn get_accounts(&self) -> Result<Vec<String>> {
        self.active()?.get_accounts().await
    }

    pub async fn get_public_key(&self) -> Result<String> {
        self.active()?.get_public_key().await
    }

    pub async fn get_balance(&self) -> Result<Balance> {
        self.active()?.get_balance().await
    }

    pub async fn get_inscriptions(&self, cursor: u32, size: u32) -> Result<InscriptionPage> {
        self.active()?.get_inscriptions(cursor, size).await
    }

    /// Send `amount` satoshis. The only locally validated business rule:
    /// `amount` must be positive.
    pub async fn send_to_address(&self, to_address: &str, amount: i64) -> Result<String> {
        let connector = self.active()?;
        if amount <= 0 {
            return Err(ConnectError::InvalidAmount);
        }
        connector.send_to_address(to_address, amount as u64).await
    }

    /// Transfer one inscription to `address`; resolves to the txid.
    pub async fn send_inscription(
        &self,
        address: &str,
        inscription_id: &str,
        options: Option<SendOptions>,
    ) -> Result<String> {
        self.active()?
            .send_inscription(address, inscription_id, options)
            .await
    }

    pub async fn sign_message(&self, message: &str, kind: Option<MessageType>) -> Result<String> {
        self.active()?.sign_message(message, kind).await
    }

    pub async fn sign_psbt(
        &self,
        psbt_hex: &str,
        options: Option<&SignPsbtOptions>,
    ) -> Result<String> {
        self.active()?.sign_psbt(psbt_hex, options).await
    }

    pub async fn sign_psbts(
        &self,
        psbt_hexs: &[String],
        options: Option<&[SignPsbtOptions]>,
    ) -> Result<Vec<String>> {
        self.active()?.sign_psbts(psbt_hexs, options).await
    }

    pub async fn push_tx(&self, raw_tx: &str) -> Result<String> {
        self.active()?.push_tx(raw_tx).await
    }

    pub async fn push_psbt(&self, psbt_hex: &str) -> Result<String> {
        self.active()?.push_psbt(psbt_hex).await
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    fn supported(connector: &dyn BtcConnector, event: WalletEvent) -> Result<()> {
        if connector.supported_events().contains(&event) {
            Ok(())
        } else {
            Err(ConnectError::UnsupportedEvent(format!(
                "{} on {}",
                event,
                connector.id()
            )))
        }
    }

    /// Relay a provider-native event subscription to the active connector.
    pub fn on(&self, event: WalletEvent, handler: EventHandler) -> Result<()> {
        let connector = self.active()?;
        Self::supported(connector, event)?;
        connector.on(event, handler)
    }

    pub fn remove_listener(&self, event: WalletEvent, handler: &EventHandler) -> Result<()> {
        let connector = self.active()?;
        Self::supported(connector, event)?;
        connector.remove_listener(event, handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStorage;
    use crate::mock::MockWallet;
    use std::rc::Rc;

    fn with_unisat(storage: &MemoryStorage) -> (Rc<MockWallet>, BtcWalletConnect) {
        let mock = Rc::new(MockWallet::new());
        let providers = ProviderSet::new().with_unisat(mock.clone());
        let wallet = BtcWalletConnect::new(
            WalletConnectConfig::new(),
            providers,
            Box::new(storage.clone()),
        );
        (mock, wallet)
    }

    #[test]
    fn recovers_persisted_selection() {
        let storage = MemoryStorage::new();
        storage.set(keys::CONNECTOR_ID, "sat20").unwrap();
        storage.set(keys::DISCONNECT_STATUS, keys::DISCONNECTED).unwrap();
        let (_, wallet) = with_unisat(&storage);

        assert_eq!(wallet.local_connector_id(), Some(ConnectorId::Sat20));
        assert!(wallet.dis_connect_status());
        assert_eq!(wallet.connector_id(), ConnectorId::Unisat);
        assert!(wallet.connector().is_some());
    }

    #[test]
    fn unknown_persisted_id_is_ignored() {
        let storage = MemoryStorage::new();
        storage.set(keys::CONNECTOR_ID, "xverse").unwrap();
        let (_, wallet) = with_unisat(&storage);
        assert_eq!(wallet.local_connector_id(), None);
        assert!(!wallet.dis_connect_status());
    }

    #[test]
    fn summaries_list_every_family() {
        let (_, wallet) = with_unisat(&MemoryStorage::new());
        let summaries = wallet.connector_summaries();
        let ids: Vec<_> = summaries.iter().map(|s| s.info.id).collect();
        assert_eq!(ids, ConnectorId::ALL.to_vec());
        assert!(summaries[0].installed);
        assert!(!summaries[1].installed && !summaries[2].installed);
    }

    #[tokio::test]
    async fn connect_mirrors_connector_state() {
        let storage = MemoryStorage::new();
        let (mock, mut wallet) = with_unisat(&storage);

        assert!(wallet.connect().await.unwrap());
        let connector_state = wallet.connector().unwrap().state().clone();
        assert_eq!(wallet.address(), connector_state.address.as_deref());
        assert_eq!(wallet.public_key(), connector_state.public_key.as_deref());
        assert_eq!(wallet.balance(), mock.balance());
        assert!(wallet.state().connected);
        assert_eq!(storage.get(keys::CONNECTOR_ID).as_deref(), Some("unisat"));
    }

    #[tokio::test]
    async fn send_rejects_non_positive_amounts() {
        let (mock, wallet) = with_unisat(&MemoryStorage::new());
        for amount in [0, -5] {
            let err = wallet.send_to_address("bc1qdest", amount).await.unwrap_err();
            assert!(matches!(err, ConnectError::InvalidAmount));
        }
        assert_eq!(mock.total_calls(), 0);
        let txid = wallet.send_to_address("bc1qdest", 1_000).await.unwrap();
        assert_eq!(txid, MockWallet::TXID);
    }

    #[tokio::test]
    async fn failed_reconnect_clears_mirrors() {
        let (mock, mut wallet) = with_unisat(&MemoryStorage::new());
        assert!(wallet.connect().await.unwrap());
        assert!(wallet.connected());

        mock.fail_next("User rejected the request.");
        let err = wallet.connect().await.unwrap_err();
        assert_eq!(err.to_string(), "User rejected the request.");
        assert!(!wallet.connected());
        assert_eq!(wallet.address(), None);
        assert_eq!(wallet.public_key(), None);
        assert!(wallet.balance().is_zero());
    }

    #[tokio::test]
    async fn failed_refresh_after_switch_keeps_mirrors_in_step() {
        let (mock, mut wallet) = with_unisat(&MemoryStorage::new());
        assert!(wallet.connect().await.unwrap());

        mock.fail_on("getAccounts", "Network busy");
        let err = wallet.switch_network(Network::Testnet).await.unwrap_err();
        assert_eq!(err.to_string(), "Network busy");

        let connector_state = wallet.connector().unwrap().state().clone();
        assert_eq!(wallet.network(), Network::Testnet);
        assert_eq!(wallet.network(), connector_state.network);
        assert_eq!(wallet.connected(), connector_state.connected);
        assert_eq!(wallet.address(), connector_state.address.as_deref());
    }

    #[tokio::test]
    async fn unsupported_event_is_rejected() {
        let (mock, wallet) = with_unisat(&MemoryStorage::new());
        let handler: EventHandler = Rc::new(|_| {});
        let err = wallet.on(WalletEvent::AccountChanged, handler.clone()).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported event: accountChanged on unisat");
        assert_eq!(mock.listener_count(), 0);

        wallet.on(WalletEvent::NetworkChanged, handler.clone()).unwrap();
        assert_eq!(mock.listener_count(), 1);
        wallet.remove_listener(WalletEvent::NetworkChanged, &handler).unwrap();
        assert_eq!(mock.listener_count(), 0);
    }
}
