//! Orchestrator configuration - passed from the host application

use serde::Deserialize;

use crate::core::types::{ConnectorId, Network};

/// Options for [`BtcWalletConnect::new`](crate::BtcWalletConnect::new).
///
/// Deserializes from the JS options object `{ network?, defaultConnectorId? }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WalletConnectConfig {
    pub network: Network,
    pub default_connector_id: ConnectorId,
}

impl WalletConnectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn testnet() -> Self {
        Self {
            network: Network::Testnet,
            ..Default::default()
        }
    }

    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    pub fn with_default_connector(mut self, id: ConnectorId) -> Self {
        self.default_connector_id = id;
        self
    }
}
