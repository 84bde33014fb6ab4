//! Mock providers for testing and development.
//!
//! [`MockWallet`] is a scriptable in-memory wallet implementing all three
//! provider traits. It records every call by its JS method name, can be told
//! to reject the next call (or the next call of one method), and keeps
//! registered event handlers so tests can emit provider events.

use async_trait::async_trait;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::core::error::{ConnectError, Result};
use crate::core::types::{
    Balance, ConnectResult, InscriptionPage, MessageType, Network, PushTxRequest,
    SendInscriptionResult, SendOptions, SignPsbtOptions, WalletEvent,
};
use crate::provider::{same_handler, EventHandler, OkxApi, OkxWallet, Sat20Api, UnisatApi};

pub type MockUnisat = MockWallet;
pub type MockSat20 = MockWallet;
pub type MockOkxEndpoint = MockWallet;

/// Scripted wallet state behind a mock provider.
pub struct MockWallet {
    accounts: RefCell<Vec<String>>,
    public_key: RefCell<String>,
    network: Cell<Network>,
    balance: Cell<Balance>,
    inscriptions: RefCell<InscriptionPage>,
    raw_result: RefCell<String>,
    fail_next: RefCell<Option<String>>,
    fail_on: RefCell<Option<(String, String)>>,
    calls: RefCell<Vec<&'static str>>,
    listeners: RefCell<Vec<(WalletEvent, EventHandler)>>,
    last_push_tx: RefCell<Option<PushTxRequest>>,
    last_message_type: Cell<Option<MessageType>>,
    last_sign_options: RefCell<Option<SignPsbtOptions>>,
    last_send_options: Cell<Option<SendOptions>>,
}

impl MockWallet {
    pub const ADDRESS: &'static str = "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4";
    pub const LIVENET_ADDRESS: &'static str = Self::ADDRESS;
    pub const TESTNET_ADDRESS: &'static str = "tb1qw508d6qejxtdg4y5r3zarvary0c5xw7kxpjzsx";
    pub const PUBLIC_KEY: &'static str =
        "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
    pub const TXID: &'static str =
        "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b";
    pub const SIGNATURE: &'static str =
        "H9L5yLFjti0QTHhPyFrZCT1V/MMnBtXKmoiKDZ78NDBjERki6ZTQZdSMCtkgoNmp17By9ItJr8o7ChX0XxY91nk=";

    /// Livenet wallet with one account and 50k sats.
    pub fn new() -> Self {
        Self::for_network(Network::Livenet)
    }

    pub fn for_network(network: Network) -> Self {
        Self {
            accounts: RefCell::new(vec![Self::address_for(network).to_string()]),
            public_key: RefCell::new(Self::PUBLIC_KEY.to_string()),
            network: Cell::new(network),
            balance: Cell::new(Balance {
                confirmed: 50_000,
                unconfirmed: 0,
                total: 50_000,
            }),
            inscriptions: RefCell::new(InscriptionPage::default()),
            raw_result: RefCell::new(Value::String(Self::TXID.to_string()).to_string()),
            fail_next: RefCell::new(None),
            fail_on: RefCell::new(None),
            calls: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            last_push_tx: RefCell::new(None),
            last_message_type: Cell::new(None),
            last_sign_options: RefCell::new(None),
            last_send_options: Cell::new(None),
        }
    }

    fn address_for(network: Network) -> &'static str {
        match network {
            Network::Livenet => Self::LIVENET_ADDRESS,
            Network::Testnet => Self::TESTNET_ADDRESS,
        }
    }

    pub fn set_accounts(&self, accounts: Vec<String>) {
        *self.accounts.borrow_mut() = accounts;
    }

    pub fn set_public_key(&self, public_key: &str) {
        *self.public_key.borrow_mut() = public_key.to_string();
    }

    pub fn set_network(&self, network: Network) {
        self.network.set(network);
    }

    pub fn network(&self) -> Network {
        self.network.get()
    }

    pub fn set_balance(&self, balance: Balance) {
        self.balance.set(balance);
    }

    pub fn balance(&self) -> Balance {
        self.balance.get()
    }

    pub fn set_inscriptions(&self, page: InscriptionPage) {
        *self.inscriptions.borrow_mut() = page;
    }

    /// Raw string SAT20-style send/push calls resolve to.
    pub fn set_raw_result(&self, raw: &str) {
        *self.raw_result.borrow_mut() = raw.to_string();
    }

    /// Reject the next provider call with `message`.
    pub fn fail_next(&self, message: &str) {
        *self.fail_next.borrow_mut() = Some(message.to_string());
    }

    /// Reject the next call of `method` (JS name) with `message`; other
    /// calls go through.
    pub fn fail_on(&self, method: &str, message: &str) {
        *self.fail_on.borrow_mut() = Some((method.to_string(), message.to_string()));
    }

    /// How often `method` (JS name) was called.
    pub fn calls(&self, method: &str) -> usize {
        self.calls.borrow().iter().filter(|m| **m == method).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn last_push_tx(&self) -> Option<PushTxRequest> {
        self.last_push_tx.borrow().clone()
    }

    pub fn last_message_type(&self) -> Option<MessageType> {
        self.last_message_type.get()
    }

    pub fn last_sign_options(&self) -> Option<SignPsbtOptions> {
        self.last_sign_options.borrow().clone()
    }

    pub fn last_send_options(&self) -> Option<SendOptions> {
        self.last_send_options.get()
    }

    /// Fire `event` at every handler registered for it.
    pub fn emit(&self, event: WalletEvent, payload: Value) {
        let handlers: Vec<EventHandler> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(e, _)| *e == event)
            .map(|(_, h)| h.clone())
            .collect();
        for handler in handlers {
            handler(payload.clone());
        }
    }

    fn record(&self, method: &'static str) -> Result<()> {
        self.calls.borrow_mut().push(method);
        if let Some(message) = self.fail_next.borrow_mut().take() {
            return Err(ConnectError::Provider(message));
        }
        let mut fail_on = self.fail_on.borrow_mut();
        if fail_on.as_ref().is_some_and(|(m, _)| m == method) {
            if let Some((_, message)) = fail_on.take() {
                return Err(ConnectError::Provider(message));
            }
        }
        Ok(())
    }

    fn accounts(&self) -> Result<Vec<String>> {
        self.record("getAccounts")?;
        Ok(self.accounts.borrow().clone())
    }

    fn request(&self) -> Result<Vec<String>> {
        self.record("requestAccounts")?;
        Ok(self.accounts.borrow().clone())
    }

    fn public_key(&self) -> Result<String> {
        self.record("getPublicKey")?;
        Ok(self.public_key.borrow().clone())
    }

    fn current_network(&self) -> Result<Network> {
        self.record("getNetwork")?;
        Ok(self.network.get())
    }

    fn current_balance(&self) -> Result<Balance> {
        self.record("getBalance")?;
        Ok(self.balance.get())
    }

    fn switch(&self, network: Network) -> Result<()> {
        self.record("switchNetwork")?;
        self.network.set(network);
        // Switching network hands out that network's account.
        let mut accounts = self.accounts.borrow_mut();
        if !accounts.is_empty() {
            *accounts = vec![Self::address_for(network).to_string()];
        }
        Ok(())
    }

    fn inscriptions(&self, cursor: u32, size: u32) -> Result<InscriptionPage> {
        self.record("getInscriptions")?;
        let page = self.inscriptions.borrow();
        let list = page
            .list
            .iter()
            .skip(cursor as usize)
            .take(size as usize)
            .cloned()
            .collect();
        Ok(InscriptionPage {
            total: page.total,
            list,
        })
    }

    fn message(&self, kind: Option<MessageType>) -> Result<String> {
        self.record("signMessage")?;
        self.last_message_type.set(kind);
        Ok(Self::SIGNATURE.to_string())
    }

    fn psbt(&self, psbt_hex: &str, options: Option<&SignPsbtOptions>) -> Result<String> {
        self.record("signPsbt")?;
        *self.last_sign_options.borrow_mut() = options.cloned();
        Ok(psbt_hex.to_string())
    }

    fn send_inscription_txid(&self, options: Option<SendOptions>) -> Result<String> {
        self.record("sendInscription")?;
        self.last_send_options.set(options);
        Ok(Self::TXID.to_string())
    }

    fn psbts(
        &self,
        psbt_hexs: &[String],
        options: Option<&[SignPsbtOptions]>,
    ) -> Result<Vec<String>> {
        self.record("signPsbts")?;
        *self.last_sign_options.borrow_mut() = options.and_then(|o| o.first().cloned());
        Ok(psbt_hexs.to_vec())
    }

    fn add_listener(&self, event: WalletEvent, handler: EventHandler) -> Result<()> {
        self.record("on")?;
        self.listeners.borrow_mut().push((event, handler));
        Ok(())
    }

    fn drop_listener(&self, event: WalletEvent, handler: &EventHandler) -> Result<()> {
        self.record("removeListener")?;
        self.listeners
            .borrow_mut()
            .retain(|(e, h)| !(*e == event && same_handler(h, handler)));
        Ok(())
    }
}

impl Default for MockWallet {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl UnisatApi for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<String>> {
        self.request()
    }

    async fn get_accounts(&self) -> Result<Vec<String>> {
        self.accounts()
    }

    async fn get_public_key(&self) -> Result<String> {
        self.public_key()
    }

    async fn get_network(&self) -> Result<Network> {
        self.current_network()
    }

    async fn get_balance(&self) -> Result<Balance> {
        self.current_balance()
    }

    async fn switch_network(&self, network: Network) -> Result<()> {
        self.switch(network)
    }

    async fn get_inscriptions(&self, cursor: u32, size: u32) -> Result<InscriptionPage> {
        self.inscriptions(cursor, size)
    }

    async fn send_bitcoin(
        &self,
        _to_address: &str,
        _satoshis: u64,
        _options: Option<SendOptions>,
    ) -> Result<String> {
        self.record("sendBitcoin")?;
        Ok(Self::TXID.to_string())
    }

    async fn send_inscription(
        &self,
        _address: &str,
        _inscription_id: &str,
        options: Option<SendOptions>,
    ) -> Result<SendInscriptionResult> {
        let txid = self.send_inscription_txid(options)?;
        Ok(SendInscriptionResult { txid })
    }

    async fn sign_message(&self, _message: &str, kind: Option<MessageType>) -> Result<String> {
        self.message(kind)
    }

    async fn sign_psbt(
        &self,
        psbt_hex: &str,
        options: Option<&SignPsbtOptions>,
    ) -> Result<String> {
        self.psbt(psbt_hex, options)
    }

    async fn sign_psbts(
        &self,
        psbt_hexs: &[String],
        options: Option<&[SignPsbtOptions]>,
    ) -> Result<Vec<String>> {
        self.psbts(psbt_hexs, options)
    }

    async fn push_tx(&self, request: PushTxRequest) -> Result<String> {
        self.record("pushTx")?;
        *self.last_push_tx.borrow_mut() = Some(request);
        Ok(Self::TXID.to_string())
    }

    async fn push_psbt(&self, _psbt_hex: &str) -> Result<String> {
        self.record("pushPsbt")?;
        Ok(Self::TXID.to_string())
    }

    fn on(&self, event: WalletEvent, handler: EventHandler) -> Result<()> {
        self.add_listener(event, handler)
    }

    fn remove_listener(&self, event: WalletEvent, handler: &EventHandler) -> Result<()> {
        self.drop_listener(event, handler)
    }
}

#[async_trait(?Send)]
impl OkxApi for MockWallet {
    async fn connect(&self) -> Result<ConnectResult> {
        self.record("connect")?;
        let address = self
            .accounts
            .borrow()
            .first()
            .cloned()
            .ok_or_else(|| ConnectError::provider("User rejected the request."))?;
        Ok(ConnectResult {
            address,
            public_key: self.public_key.borrow().clone(),
        })
    }

    async fn get_accounts(&self) -> Result<Vec<String>> {
        self.accounts()
    }

    async fn get_public_key(&self) -> Result<String> {
        self.public_key()
    }

    async fn get_network(&self) -> Result<Network> {
        self.current_network()
    }

    async fn get_balance(&self) -> Result<Balance> {
        self.current_balance()
    }

    async fn get_inscriptions(&self, cursor: u32, size: u32) -> Result<InscriptionPage> {
        self.inscriptions(cursor, size)
    }

    async fn send_bitcoin(
        &self,
        _to_address: &str,
        _satoshis: u64,
        _options: Option<SendOptions>,
    ) -> Result<String> {
        self.record("sendBitcoin")?;
        Ok(Self::TXID.to_string())
    }

    async fn send_inscription(
        &self,
        _address: &str,
        _inscription_id: &str,
        options: Option<SendOptions>,
    ) -> Result<String> {
        self.send_inscription_txid(options)
    }

    async fn sign_message(&self, _message: &str, kind: Option<MessageType>) -> Result<String> {
        self.message(kind)
    }

    async fn sign_psbt(
        &self,
        psbt_hex: &str,
        options: Option<&SignPsbtOptions>,
    ) -> Result<String> {
        self.psbt(psbt_hex, options)
    }

    async fn sign_psbts(
        &self,
        psbt_hexs: &[String],
        options: Option<&[SignPsbtOptions]>,
    ) -> Result<Vec<String>> {
        self.psbts(psbt_hexs, options)
    }

    async fn push_tx(&self, raw_tx: &str) -> Result<String> {
        self.record("pushTx")?;
        *self.last_push_tx.borrow_mut() = Some(PushTxRequest {
            rawtx: raw_tx.to_string(),
        });
        Ok(Self::TXID.to_string())
    }

    async fn push_psbt(&self, _psbt_hex: &str) -> Result<String> {
        self.record("pushPsbt")?;
        Ok(Self::TXID.to_string())
    }

    fn on(&self, event: WalletEvent, handler: EventHandler) -> Result<()> {
        self.add_listener(event, handler)
    }
}

#[async_trait(?Send)]
impl Sat20Api for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<String>> {
        self.request()
    }

    async fn get_accounts(&self) -> Result<Vec<String>> {
        self.accounts()
    }

    async fn get_public_key(&self) -> Result<String> {
        self.public_key()
    }

    async fn get_network(&self) -> Result<Network> {
        self.current_network()
    }

    async fn get_balance(&self) -> Result<Balance> {
        self.current_balance()
    }

    async fn switch_network(&self, network: Network) -> Result<()> {
        self.switch(network)
    }

    async fn get_inscriptions(&self, cursor: u32, size: u32) -> Result<InscriptionPage> {
        self.inscriptions(cursor, size)
    }

    async fn send_bitcoin(
        &self,
        _to_address: &str,
        _satoshis: u64,
        _options: Option<SendOptions>,
    ) -> Result<String> {
        self.record("sendBitcoin")?;
        Ok(self.raw_result.borrow().clone())
    }

    async fn send_inscription(
        &self,
        _address: &str,
        _inscription_id: &str,
        options: Option<SendOptions>,
    ) -> Result<SendInscriptionResult> {
        let txid = self.send_inscription_txid(options)?;
        Ok(SendInscriptionResult { txid })
    }

    async fn sign_message(&self, _message: &str, kind: Option<MessageType>) -> Result<String> {
        self.message(kind)
    }

    async fn sign_psbt(
        &self,
        psbt_hex: &str,
        options: Option<&SignPsbtOptions>,
    ) -> Result<String> {
        self.psbt(psbt_hex, options)
    }

    async fn sign_psbts(
        &self,
        psbt_hexs: &[String],
        options: Option<&[SignPsbtOptions]>,
    ) -> Result<Vec<String>> {
        self.psbts(psbt_hexs, options)
    }

    async fn push_tx(&self, raw_tx: &str) -> Result<String> {
        self.record("pushTx")?;
        *self.last_push_tx.borrow_mut() = Some(PushTxRequest {
            rawtx: raw_tx.to_string(),
        });
        Ok(self.raw_result.borrow().clone())
    }

    async fn push_psbt(&self, _psbt_hex: &str) -> Result<String> {
        self.record("pushPsbt")?;
        Ok(self.raw_result.borrow().clone())
    }

    fn on(&self, event: WalletEvent, handler: EventHandler) -> Result<()> {
        self.add_listener(event, handler)
    }

    fn remove_listener(&self, event: WalletEvent, handler: &EventHandler) -> Result<()> {
        self.drop_listener(event, handler)
    }
}

/// Both OKX endpoints, scripted independently.
pub struct MockOkx {
    pub livenet: Rc<MockWallet>,
    pub testnet: Rc<MockWallet>,
}

impl MockOkx {
    pub fn new() -> Self {
        Self {
            livenet: Rc::new(MockWallet::for_network(Network::Livenet)),
            testnet: Rc::new(MockWallet::for_network(Network::Testnet)),
        }
    }

    /// The `window.okxwallet` shape over both endpoints.
    pub fn wallet(&self) -> OkxWallet {
        OkxWallet::new(self.livenet.clone(), self.testnet.clone())
    }
}

impl Default for MockOkx {
    fn default() -> Self {
        Self::new()
    }
}
