//! UniSat adapter. One provider object serves both networks.

use async_trait::async_trait;
use std::rc::Rc;

use super::{BtcConnector, ConnectorInfo, ConnectorState};
use crate::core::error::{ConnectError, Result};
use crate::core::keys::{installed, meta};
use crate::core::types::{
    Balance, ConnectorId, InscriptionPage, MessageType, Network, PushTxRequest, SendOptions,
    SignPsbtOptions, WalletEvent,
};
use crate::provider::{EventHandler, UnisatApi};

const INFO: ConnectorInfo = ConnectorInfo {
    id: ConnectorId::Unisat,
    name: meta::unisat::NAME,
    logo: meta::unisat::LOGO,
    homepage: meta::unisat::HOMEPAGE,
};

const EVENTS: &[WalletEvent] = &[WalletEvent::AccountsChanged, WalletEvent::NetworkChanged];

pub struct UnisatConnector {
    state: ConnectorState,
    unisat: Option<Rc<dyn UnisatApi>>,
}

impl UnisatConnector {
    pub fn new(network: Network, unisat: Option<Rc<dyn UnisatApi>>) -> Self {
        Self {
            state: ConnectorState::new(network),
            unisat,
        }
    }

    pub fn is_installed(&self) -> bool {
        self.unisat.is_some()
    }

    fn provider(&self) -> Result<Rc<dyn UnisatApi>> {
        self.unisat
            .clone()
            .ok_or(ConnectError::NotInstalled(installed::UNISAT))
    }
}

#[async_trait(?Send)]
impl BtcConnector for UnisatConnector {
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
        // getAccounts stays empty until the site is authorized.
        self.provider()?.request_accounts().await?;
        self.refresh().await?;
        Ok(self.state.connected)
    }

    async fn refresh(&mut self) -> Result<()> {
        let unisat = self.provider()?;
        let Some(address) = unisat.get_accounts().await?.into_iter().next() else {
            self.state.reset();
            return Ok(());
        };
        let (public_key, network, balance) = futures::try_join!(
            unisat.get_public_key(),
            unisat.get_network(),
            unisat.get_balance()
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
        self.provider()?
            .send_bitcoin(to_address, satoshis, None)
            .await
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
        // UniSat wants `{ rawtx }` rather than the bare hex.
        let request = PushTxRequest {
            rawtx: raw_tx.to_string(),
        };
        self.provider()?.push_tx(request).await
    }

    async fn push_psbt(&self, psbt_hex: &str) -> Result<String> {
        self.provider()?.push_psbt(psbt_hex).await
    }

    fn on(&self, event: WalletEvent, handler: EventHandler) -> Result<()> {
        self.provider()?.on(event, handler)
    }

    fn remove_listener(&self, event: WalletEvent, handler: &EventHandler) -> Result<()> {
        self.provider()?.remove_listener(event, handler)
    }
}
