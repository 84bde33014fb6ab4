//! JS-backed providers: thin async wrappers over the objects wallet
//! extensions inject into `window`.
//!
//! Every method looks the function up by name, applies it to the injected
//! object and awaits the result if it is a Promise. Rejections become
//! [`ConnectError::Provider`] carrying the wallet's own message.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use super::log;
use crate::core::error::{ConnectError, Result};
use crate::core::keys::globals;
use crate::core::types::{
    Balance, ConnectResult, InscriptionPage, MessageType, Network, PushTxRequest,
    SendInscriptionResult, SendOptions, SignPsbtOptions, WalletEvent,
};
use crate::provider::{
    EventHandler, Listeners, OkxApi, OkxWallet, ProviderSet, Sat20Api, UnisatApi,
};

/// An injected provider object (`window.unisat`, `window.sat20`, or one of
/// the `window.okxwallet` endpoints).
pub struct JsProvider {
    object: JsValue,
    listeners: Listeners<Closure<dyn Fn(JsValue)>>,
}

/// Best-effort message out of a thrown JS value.
fn js_error(value: JsValue) -> ConnectError {
    if let Some(message) = js_sys::Reflect::get(&value, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
    {
        return ConnectError::Provider(message);
    }
    match value.as_string() {
        Some(message) => ConnectError::Provider(message),
        None => ConnectError::Provider(format!("{:?}", value)),
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    value
        .serialize(&serializer)
        .map_err(|e| ConnectError::provider(format!("serialize: {}", e)))
}

fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| ConnectError::provider(format!("deserialize: {}", e)))
}

fn js_string(value: JsValue) -> Result<String> {
    value
        .as_string()
        .ok_or_else(|| ConnectError::provider(format!("expected string, got {:?}", value)))
}

/// Sat20 resolves send/push to JSON text; re-encode anything else.
fn js_json_text(value: JsValue) -> Result<String> {
    if let Some(text) = value.as_string() {
        return Ok(text);
    }
    js_sys::JSON::stringify(&value)
        .map(String::from)
        .map_err(js_error)
}

fn js_network(value: JsValue) -> Result<Network> {
    let raw = js_string(value)?;
    Network::from_str(&raw)
        .ok_or_else(|| ConnectError::provider(format!("unknown network {:?}", raw)))
}

impl JsProvider {
    /// Wrap `object` unless it is `undefined` or `null`.
    pub fn from_value(object: JsValue) -> Option<Self> {
        if object.is_undefined() || object.is_null() {
            return None;
        }
        Some(Self {
            object,
            listeners: Listeners::new(),
        })
    }

    /// `window[key]`, if injected.
    pub fn from_global(key: &str) -> Option<Self> {
        let window = web_sys::window()?;
        let object = js_sys::Reflect::get(&window, &JsValue::from_str(key)).ok()?;
        Self::from_value(object)
    }

    /// A nested provider object, e.g. `okxwallet.bitcoin`.
    pub fn property(&self, key: &str) -> Option<Self> {
        let object = js_sys::Reflect::get(&self.object, &JsValue::from_str(key)).ok()?;
        Self::from_value(object)
    }

    fn invoke(&self, method: &str, args: &[JsValue]) -> Result<JsValue> {
        let function = js_sys::Reflect::get(&self.object, &JsValue::from_str(method))
            .map_err(js_error)?
            .dyn_into::<js_sys::Function>()
            .map_err(|_| ConnectError::provider(format!("{} is not a function", method)))?;
        function
            .apply(&self.object, &js_sys::Array::from_iter(args.iter()))
            .map_err(js_error)
    }

    async fn call(&self, method: &str, args: &[JsValue]) -> Result<JsValue> {
        let result = self.invoke(method, args)?;
        match result.dyn_into::<js_sys::Promise>() {
            Ok(promise) => JsFuture::from(promise).await.map_err(js_error),
            Err(value) => Ok(value),
        }
    }

    async fn call_as<T: DeserializeOwned>(&self, method: &str, args: &[JsValue]) -> Result<T> {
        from_js(self.call(method, args).await?)
    }

    async fn call_string(&self, method: &str, args: &[JsValue]) -> Result<String> {
        js_string(self.call(method, args).await?)
    }

    // =========================================================================
    // SHARED CALLS
    // =========================================================================

    async fn accounts(&self, method: &str) -> Result<Vec<String>> {
        self.call_as(method, &[]).await
    }

    async fn public_key(&self) -> Result<String> {
        self.call_string("getPublicKey", &[]).await
    }

    async fn network(&self) -> Result<Network> {
        js_network(self.call("getNetwork", &[]).await?)
    }

    async fn balance(&self) -> Result<Balance> {
        self.call_as("getBalance", &[]).await
    }

    async fn switch(&self, network: Network) -> Result<()> {
        self.call("switchNetwork", &[JsValue::from_str(network.as_str())])
            .await?;
        Ok(())
    }

    async fn inscriptions(&self, cursor: u32, size: u32) -> Result<InscriptionPage> {
        let args = [JsValue::from(cursor), JsValue::from(size)];
        self.call_as("getInscriptions", &args).await
    }

    async fn send(
        &self,
        to_address: &str,
        satoshis: u64,
        options: Option<SendOptions>,
    ) -> Result<JsValue> {
        let mut args = vec![
            JsValue::from_str(to_address),
            JsValue::from_f64(satoshis as f64),
        ];
        if let Some(options) = options {
            args.push(to_js(&options)?);
        }
        self.call("sendBitcoin", &args).await
    }

    async fn send_ordinal(
        &self,
        address: &str,
        inscription_id: &str,
        options: Option<SendOptions>,
    ) -> Result<JsValue> {
        let mut args = vec![JsValue::from_str(address), JsValue::from_str(inscription_id)];
        if let Some(options) = options {
            args.push(to_js(&options)?);
        }
        self.call("sendInscription", &args).await
    }

    async fn sign(&self, message: &str, kind: Option<MessageType>) -> Result<String> {
        let mut args = vec![JsValue::from_str(message)];
        if let Some(kind) = kind {
            args.push(JsValue::from_str(kind.as_str()));
        }
        self.call_string("signMessage", &args).await
    }

    async fn sign_one(&self, psbt_hex: &str, options: Option<&SignPsbtOptions>) -> Result<String> {
        let mut args = vec![JsValue::from_str(psbt_hex)];
        if let Some(options) = options {
            args.push(to_js(options)?);
        }
        self.call_string("signPsbt", &args).await
    }

    async fn sign_many(
        &self,
        psbt_hexs: &[String],
        options: Option<&[SignPsbtOptions]>,
    ) -> Result<Vec<String>> {
        let mut args = vec![to_js(psbt_hexs)?];
        if let Some(options) = options {
            args.push(to_js(options)?);
        }
        self.call_as("signPsbts", &args).await
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    /// Wrap `handler` in a closure the provider can call. A handler already
    /// attached for `event` is not wrapped twice.
    fn listen(&self, event: WalletEvent, handler: EventHandler) -> Result<()> {
        self.listeners.attach(event, handler, |handler| {
            let callback = handler.clone();
            let closure = Closure::<dyn Fn(JsValue)>::new(move |payload: JsValue| {
                let value: Value = serde_wasm_bindgen::from_value(payload).unwrap_or(Value::Null);
                callback(value);
            });
            let function: &JsValue = closure.as_ref();
            self.invoke("on", &[JsValue::from_str(event.as_str()), function.clone()])?;
            Ok(closure)
        })?;
        Ok(())
    }

    /// The closure stays registered (and alive) unless `removeListener` succeeds.
    fn unlisten(&self, event: WalletEvent, handler: &EventHandler) -> Result<()> {
        let removed = self.listeners.detach(event, handler, |closure| {
            let function: &JsValue = closure.as_ref();
            self.invoke(
                "removeListener",
                &[JsValue::from_str(event.as_str()), function.clone()],
            )?;
            Ok(())
        })?;
        if !removed {
            log!("[btc-connect] no {} listener registered for handler", event);
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl UnisatApi for JsProvider {
    async fn request_accounts(&self) -> Result<Vec<String>> {
        self.accounts("requestAccounts").await
    }

    async fn get_accounts(&self) -> Result<Vec<String>> {
        self.accounts("getAccounts").await
    }

    async fn get_public_key(&self) -> Result<String> {
        self.public_key().await
    }

    async fn get_network(&self) -> Result<Network> {
        self.network().await
    }

    async fn get_balance(&self) -> Result<Balance> {
        self.balance().await
    }

    async fn switch_network(&self, network: Network) -> Result<()> {
        self.switch(network).await
    }

    async fn get_inscriptions(&self, cursor: u32, size: u32) -> Result<InscriptionPage> {
        self.inscriptions(cursor, size).await
    }

    async fn send_bitcoin(
        &self,
        to_address: &str,
        satoshis: u64,
        options: Option<SendOptions>,
    ) -> Result<String> {
        js_string(self.send(to_address, satoshis, options).await?)
    }

    async fn send_inscription(
        &self,
        address: &str,
        inscription_id: &str,
        options: Option<SendOptions>,
    ) -> Result<SendInscriptionResult> {
        from_js(self.send_ordinal(address, inscription_id, options).await?)
    }

    async fn sign_message(&self, message: &str, kind: Option<MessageType>) -> Result<String> {
        self.sign(message, kind).await
    }

    async fn sign_psbt(
        &self,
        psbt_hex: &str,
        options: Option<&SignPsbtOptions>,
    ) -> Result<String> {
        self.sign_one(psbt_hex, options).await
    }

    async fn sign_psbts(
        &self,
        psbt_hexs: &[String],
        options: Option<&[SignPsbtOptions]>,
    ) -> Result<Vec<String>> {
        self.sign_many(psbt_hexs, options).await
    }

    async fn push_tx(&self, request: PushTxRequest) -> Result<String> {
        self.call_string("pushTx", &[to_js(&request)?]).await
    }

    async fn push_psbt(&self, psbt_hex: &str) -> Result<String> {
        self.call_string("pushPsbt", &[JsValue::from_str(psbt_hex)])
            .await
    }

    fn on(&self, event: WalletEvent, handler: EventHandler) -> Result<()> {
        self.listen(event, handler)
    }

    fn remove_listener(&self, event: WalletEvent, handler: &EventHandler) -> Result<()> {
        self.unlisten(event, handler)
    }
}

#[async_trait(?Send)]
impl OkxApi for JsProvider {
    async fn connect(&self) -> Result<ConnectResult> {
        self.call_as("connect", &[]).await
    }

    async fn get_accounts(&self) -> Result<Vec<String>> {
        self.accounts("getAccounts").await
    }

    async fn get_public_key(&self) -> Result<String> {
        self.public_key().await
    }

    async fn get_network(&self) -> Result<Network> {
        self.network().await
    }

    async fn get_balance(&self) -> Result<Balance> {
        self.balance().await
    }

    async fn get_inscriptions(&self, cursor: u32, size: u32) -> Result<InscriptionPage> {
        self.inscriptions(cursor, size).await
    }

    async fn send_bitcoin(
        &self,
        to_address: &str,
        satoshis: u64,
        options: Option<SendOptions>,
    ) -> Result<String> {
        js_string(self.send(to_address, satoshis, options).await?)
    }

    async fn send_inscription(
        &self,
        address: &str,
        inscription_id: &str,
        options: Option<SendOptions>,
    ) -> Result<String> {
        js_string(self.send_ordinal(address, inscription_id, options).await?)
    }

    async fn sign_message(&self, message: &str, kind: Option<MessageType>) -> Result<String> {
        self.sign(message, kind).await
    }

    async fn sign_psbt(
        &self,
        psbt_hex: &str,
        options: Option<&SignPsbtOptions>,
    ) -> Result<String> {
        self.sign_one(psbt_hex, options).await
    }

    async fn sign_psbts(
        &self,
        psbt_hexs: &[String],
        options: Option<&[SignPsbtOptions]>,
    ) -> Result<Vec<String>> {
        self.sign_many(psbt_hexs, options).await
    }

    async fn push_tx(&self, raw_tx: &str) -> Result<String> {
        self.call_string("pushTx", &[JsValue::from_str(raw_tx)]).await
    }

    async fn push_psbt(&self, psbt_hex: &str) -> Result<String> {
        self.call_string("pushPsbt", &[JsValue::from_str(psbt_hex)])
            .await
    }

    fn on(&self, event: WalletEvent, handler: EventHandler) -> Result<()> {
        self.listen(event, handler)
    }
}

#[async_trait(?Send)]
impl Sat20Api for JsProvider {
    async fn request_accounts(&self) -> Result<Vec<String>> {
        self.accounts("requestAccounts").await
    }

    async fn get_accounts(&self) -> Result<Vec<String>> {
        self.accounts("getAccounts").await
    }

    async fn get_public_key(&self) -> Result<String> {
        self.public_key().await
    }

    async fn get_network(&self) -> Result<Network> {
        self.network().await
    }

    async fn get_balance(&self) -> Result<Balance> {
        self.balance().await
    }

    async fn switch_network(&self, network: Network) -> Result<()> {
        self.switch(network).await
    }

    async fn get_inscriptions(&self, cursor: u32, size: u32) -> Result<InscriptionPage> {
        self.inscriptions(cursor, size).await
    }

    async fn send_bitcoin(
        &self,
        to_address: &str,
        satoshis: u64,
        options: Option<SendOptions>,
    ) -> Result<String> {
        js_json_text(self.send(to_address, satoshis, options).await?)
    }

    async fn send_inscription(
        &self,
        address: &str,
        inscription_id: &str,
        options: Option<SendOptions>,
    ) -> Result<SendInscriptionResult> {
        from_js(self.send_ordinal(address, inscription_id, options).await?)
    }

    async fn sign_message(&self, message: &str, kind: Option<MessageType>) -> Result<String> {
        self.sign(message, kind).await
    }

    async fn sign_psbt(
        &self,
        psbt_hex: &str,
        options: Option<&SignPsbtOptions>,
    ) -> Result<String> {
        self.sign_one(psbt_hex, options).await
    }

    async fn sign_psbts(
        &self,
        psbt_hexs: &[String],
        options: Option<&[SignPsbtOptions]>,
    ) -> Result<Vec<String>> {
        self.sign_many(psbt_hexs, options).await
    }

    async fn push_tx(&self, raw_tx: &str) -> Result<String> {
        js_json_text(self.call("pushTx", &[JsValue::from_str(raw_tx)]).await?)
    }

    async fn push_psbt(&self, psbt_hex: &str) -> Result<String> {
        js_json_text(self.call("pushPsbt", &[JsValue::from_str(psbt_hex)]).await?)
    }

    fn on(&self, event: WalletEvent, handler: EventHandler) -> Result<()> {
        self.listen(event, handler)
    }

    fn remove_listener(&self, event: WalletEvent, handler: &EventHandler) -> Result<()> {
        self.unlisten(event, handler)
    }
}

impl ProviderSet {
    /// Detect injected wallets on `window`. Absent globals stay `None`.
    pub fn from_window() -> Self {
        let unisat =
            JsProvider::from_global(globals::UNISAT).map(|p| Rc::new(p) as Rc<dyn UnisatApi>);
        let okx = JsProvider::from_global(globals::OKX).map(|okx| OkxWallet {
            bitcoin: okx
                .property(globals::OKX_LIVENET)
                .map(|p| Rc::new(p) as Rc<dyn OkxApi>),
            bitcoin_testnet: okx
                .property(globals::OKX_TESTNET)
                .map(|p| Rc::new(p) as Rc<dyn OkxApi>),
        });
        let sat20 =
            JsProvider::from_global(globals::SAT20).map(|p| Rc::new(p) as Rc<dyn Sat20Api>);
        log!(
            "[btc-connect] detected unisat={} okx={} sat20={}",
            unisat.is_some(),
            okx.is_some(),
            sat20.is_some()
        );
        Self { unisat, okx, sat20 }
    }
}
