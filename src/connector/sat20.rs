//! SAT20 adapter. Send and push results arrive as JSON-encoded strings.

use async_trait::async_trait;
use serde_json::Value;
use std::rc::Rc;

use super::{BtcConnector, ConnectorInfo, ConnectorState};
use crate::core::error::{ConnectError, Result};
use crate::core::keys::{installed, meta};
use crate::core::types::{
    Balance, ConnectorId, InscriptionPage, MessageType, Network, SendOptions, SignPsbtOptions,
    WalletEvent,
};
use crate::provider::{EventHandler, Sat20Api};

const INFO: ConnectorInfo = ConnectorInfo {
    id: ConnectorId::Sat20,
    name: meta::sat20::NAME,
    logo: meta::sat20::LOGO,
    homepage: meta::sat20::HOMEPAGE,
};

const EVENTS: &[WalletEvent] = &[WalletEvent::AccountsChanged, WalletEvent::NetworkChanged];

/// Unwrap a JSON-string result into a txid.
///
/// A JSON string yields its contents, an object yields its `txid` field,
/// anything else its JSON text.
pub(crate) fn parse_txid(raw: &str) -> Result<String> {
    Ok(match serde_json::from_str::<Value>(raw)? {
        Value::String(txid) => txid,
        Value::Object(map) => {
            let txid = map.get("txid").and_then(Value::as_str).map(str::to_owned);
            txid.unwrap_or_else(|| Value::Object(map).to_string())
        }
        other => other.to_string(),
    })
}

pub struct Sat20Connector {
    state: ConnectorState,
    sat20: Option<Rc<dyn Sat20Api>>,
}

impl Sat20Connector {
    pub fn new(network: Network, sat20: Option<Rc<dyn Sat20Api>>) -> Self {
        Self {
            state: ConnectorState::new(network),
            sat20,
        }
    }

    pub fn is_installed(&self) -> bool {
        self.sat20.is_some()
    }

    fn provider(&self) -> Result<Rc<dyn Sat20Api>> {
        self.sat20
            .clone()
            .ok_or(ConnectError::NotInstalled(installed::SAT20))
    }

    /// Prompt the wallet for account access.
    pub async fn request_accounts(&self) -> Result<Vec<String>> {
        self.provider()?.request_accounts().await
    }
}

#[async_trait(?Send)]
impl BtcConnector for Sat20Connector {
    fn info(&self) -> &ConnectorInfo {
        &INFO
    }

    fn state(&self) -> &ConnectorState {
        &self.state
    }

    fn supported_events(&self) -> &'static [WalletEvent] {
        EVENTS
    }

    async fn connect(&mut self) -> Result<bool> {
        self.state.reset();
        self.request_accounts().await?;
        self.refresh().await?;
        Ok(self.state.connected)
    }

    async fn refresh(&mut self) -> Result<()> {
        let sat20 = self.provider()?;
        let Some(address) = sat20.get_accounts().await?.into_iter().next() else {
            self.state.reset();
            return Ok(());
        };
        let (public_key, network, balance) = futures::try_join!(
            sat20.get_public_key(),
            sat20.get_network(),
            sat20.get_balance()
        )?;
        self.state.apply(address, Some(public_key), network, balance);
        Ok(())
    }

    fn disconnect(&mut self) {
        self.state.reset();
    }

    async fn get_accounts(&self) -> Result<Vec<String>> {
        self.provider()?.get_accounts().await
    }

    async fn switch_network(&mut self, network: Network) -> Result<()> {
        self.provider()?.switch_network(network).await?;
        self.state.network = network;
        Ok(())
    }

    async fn get_public_key(&self) -> Result<String> {
        self.provider()?.get_public_key().await
    }

    async fn get_balance(&self) -> Result<Balance> {
        self.provider()?.get_balance().await
    }

    async fn get_inscriptions(&self, cursor: u32, size: u32) -> Result<InscriptionPage> {
        self.provider()?.get_inscriptions(cursor, size).await
    }

    async fn send_to_address(&self, to_address: &str, satoshis: u64) -> Result<String> {
        let raw = self
            .provider()?
            .send_bitcoin(to_address, satoshis, None)
            .await?;
        parse_txid(&raw)
    }

    async fn send_inscription(
        &self,
        address: &str,
        inscription_id: &str,
        options: Option<SendOptions>,
    ) -> Result<String> {
        let result = self
            .provider()?
            .send_inscription(address, inscription_id, options)
            .await?;
        Ok(result.txid)
    }

    async fn sign_message(&self, message: &str, kind: Option<MessageType>) -> Result<String> {
        self.provider()?.sign_message(message, kind).await
    }

    async fn sign_psbt(&self, psbt_hex: &str, options: Option<&SignPsbtOptions>) -> Result<String> {
        self.provider()?.sign_psbt(psbt_hex, options).await
    }

    async fn sign_psbts(
        &self,
        psbt_hexs: &[String],
        options: Option<&[SignPsbtOptions]>,
    ) -> Result<Vec<String>> {
        self.provider()?.sign_psbts(psbt_hexs, options).await
    }

    async fn push_tx(&self, raw_tx: &str) -> Result<String> {
        let raw = self.provider()?.push_tx(raw_tx).await?;
        parse_txid(&raw)
    }

    async fn push_psbt(&self, psbt_hex: &str) -> Result<String> {
        let raw = self.provider()?.push_psbt(psbt_hex).await?;
        parse_txid(&raw)
    }

    fn on(&self, event: WalletEvent, handler: EventHandler) -> Result<()> {
        self.provider()?.on(event, handler)
    }

    fn remove_listener(&self, event: WalletEvent, handler: &EventHandler) -> Result<()> {
        self.provider()?.remove_listener(event, handler)
    }
}
