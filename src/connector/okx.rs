//! OKX adapter.
//!
//! `window.okxwallet` carries a separate endpoint object per network, so
//! switching network re-binds the endpoint instead of asking it to switch.
//! The testnet endpoint only signs; account reads, sends and broadcasts
//! fail with [`ConnectError::TestnetRestricted`].
//!
//! Neither endpoint can detach a listener, so `remove_listener` reports
//! [`ConnectError::UnsupportedEvent`] and `on` attaches a given handler at
//! most once per event.

use async_trait::async_trait;
use std::rc::Rc;

use super::{BtcConnector, ConnectorInfo, ConnectorState};
use crate::core::error::{ConnectError, Result};
use crate::core::keys::{installed, meta};
use crate::core::types::{
    Balance, ConnectorId, InscriptionPage, MessageType, Network, SendOptions, SignPsbtOptions,
    WalletEvent,
};
use crate::provider::{EventHandler, Listeners, OkxApi, OkxWallet};

const INFO: ConnectorInfo = ConnectorInfo {
    id: ConnectorId::Okx,
    name: meta::okx::NAME,
    logo: meta::okx::LOGO,
    homepage: meta::okx::HOMEPAGE,
};

const EVENTS: &[WalletEvent] = &[WalletEvent::AccountsChanged, WalletEvent::AccountChanged];

pub struct OkxConnector {
    state: ConnectorState,
    wallet: Option<OkxWallet>,
    okxwallet: Option<Rc<dyn OkxApi>>,
    attached: Listeners<()>,
}

impl OkxConnector {
    pub fn new(network: Network, wallet: Option<OkxWallet>) -> Self {
        let okxwallet = wallet.as_ref().and_then(|w| w.endpoint(network));
        Self {
            state: ConnectorState::new(network),
            wallet,
            okxwallet,
            attached: Listeners::new(),
        }
    }

    pub fn is_installed(&self) -> bool {
        self.wallet.is_some()
    }

    /// Endpoint currently bound for the connector's network.
    pub fn endpoint(&self) -> Result<Rc<dyn OkxApi>> {
        self.okxwallet
            .clone()
            .ok_or(ConnectError::NotInstalled(installed::OKX))
    }

    fn livenet_endpoint(&self) -> Result<Rc<dyn OkxApi>> {
        if !self.state.network.is_primary() {
            return Err(ConnectError::TestnetRestricted);
        }
        self.endpoint()
    }
}

#[async_trait(?Send)]
impl BtcConnector for OkxConnector {
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
        let okx = self.endpoint()?;
        let session = okx.connect().await?;
        let network = self.state.network;
        self.state.apply(
            session.address,
            Some(session.public_key),
            network,
            Balance::ZERO,
        );
        self.refresh().await?;
        Ok(self.state.connected)
    }

    async fn refresh(&mut self) -> Result<()> {
        // The testnet endpoint cannot report accounts; keep what connect() saw.
        if !self.state.network.is_primary() {
            return Ok(());
        }
        let okx = self.endpoint()?;
        let Some(address) = okx.get_accounts().await?.into_iter().next() else {
            self.state.reset();
            return Ok(());
        };
        let (public_key, network, balance) = futures::try_join!(
            okx.get_public_key(),
            okx.get_network(),
            okx.get_balance()
        )?;
        self.state.apply(address, Some(public_key), network, balance);
        Ok(())
    }

    fn disconnect(&mut self) {
        self.state.reset();
    }

    async fn get_accounts(&self) -> Result<Vec<String>> {
        self.livenet_endpoint()?.get_accounts().await
    }

    async fn switch_network(&mut self, network: Network) -> Result<()> {
        if network == self.state.network {
            return Ok(());
        }
        tracing::debug!("okx: re-binding endpoint {} -> {}", self.state.network, network);
        self.okxwallet = self.wallet.as_ref().and_then(|w| w.endpoint(network));
        self.state.network = network;
        // The session belonged to the old endpoint.
        self.state.reset();
        Ok(())
    }

    async fn get_public_key(&self) -> Result<String> {
        self.livenet_endpoint()?.get_public_key().await
    }

    async fn get_balance(&self) -> Result<Balance> {
        self.livenet_endpoint()?.get_balance().await
    }

    async fn get_inscriptions(&self, cursor: u32, size: u32) -> Result<InscriptionPage> {
        self.livenet_endpoint()?.get_inscriptions(cursor, size).await
    }

    async fn send_to_address(&self, to_address: &str, satoshis: u64) -> Result<String> {
        self.livenet_endpoint()?
            .send_bitcoin(to_address, satoshis, None)
            .await
    }

    async fn send_inscription(
        &self,
        address: &str,
        inscription_id: &str,
        options: Option<SendOptions>,
    ) -> Result<String> {
        self.livenet_endpoint()?
            .send_inscription(address, inscription_id, options)
            .await
    }

    async fn sign_message(&self, message: &str, kind: Option<MessageType>) -> Result<String> {
        self.endpoint()?.sign_message(message, kind).await
    }

    async fn sign_psbt(&self, psbt_hex: &str, options: Option<&SignPsbtOptions>) -> Result<String> {
        self.endpoint()?.sign_psbt(psbt_hex, options).await
    }

    async fn sign_psbts(
        &self,
        psbt_hexs: &[String],
        options: Option<&[SignPsbtOptions]>,
    ) -> Result<Vec<String>> {
        self.endpoint()?.sign_psbts(psbt_hexs, options).await
    }

    async fn push_tx(&self, raw_tx: &str) -> Result<String> {
        self.livenet_endpoint()?.push_tx(raw_tx).await
    }

    async fn push_psbt(&self, psbt_hex: &str) -> Result<String> {
        self.livenet_endpoint()?.push_psbt(psbt_hex).await
    }

    fn on(&self, event: WalletEvent, handler: EventHandler) -> Result<()> {
        if !self.state.network.is_primary() {
            return Ok(());
        }
        let okx = self.endpoint()?;
        self.attached
            .attach(event, handler, |handler| okx.on(event, handler.clone()))?;
        Ok(())
    }

    /// The endpoints expose no removal call.
    fn remove_listener(&self, event: WalletEvent, _handler: &EventHandler) -> Result<()> {
        Err(ConnectError::UnsupportedEvent(format!(
            "removeListener({}) on {}",
            event,
            INFO.id
        )))
    }
}
