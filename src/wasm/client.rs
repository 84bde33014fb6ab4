//! BtcWallet: the orchestrator exposed to JavaScript via wasm-bindgen.
//!
//! JS can fire calls concurrently, so the orchestrator sits behind an async
//! mutex and every call runs to completion before the next one starts.

use futures::lock::Mutex;
use serde::Serialize;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

use super::log;
use super::storage::LocalStorage;
use crate::config::WalletConnectConfig;
use crate::connect::BtcWalletConnect;
use crate::core::error::ConnectError;
use crate::core::format;
use crate::core::storage::{MemoryStorage, Storage};
use crate::core::types::{
    ConnectorId, MessageType, Network, SendOptions, SignPsbtOptions, WalletEvent,
};
use crate::provider::{EventHandler, ProviderSet};

fn js_err(e: ConnectError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    value
        .serialize(&serializer)
        .map_err(|e| JsValue::from_str(&format!("serialize: {}", e)))
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("deserialize: {}", e)))
}

fn optional<T: serde::de::DeserializeOwned>(value: JsValue) -> Result<Option<T>, JsValue> {
    if value.is_undefined() || value.is_null() {
        Ok(None)
    } else {
        from_js(value).map(Some)
    }
}

fn parse_event(event: &str) -> Result<WalletEvent, JsValue> {
    WalletEvent::from_str(event)
        .ok_or_else(|| js_err(ConnectError::UnsupportedEvent(event.to_string())))
}

struct JsHandler {
    event: WalletEvent,
    callback: js_sys::Function,
    handler: EventHandler,
}

/// Browser wallet connector with JS bindings
#[wasm_bindgen]
pub struct BtcWallet {
    inner: Rc<Mutex<BtcWalletConnect>>,
    handlers: RefCell<Vec<JsHandler>>,
}

#[wasm_bindgen]
impl BtcWallet {
    /// Detect injected wallets and recover the persisted selection.
    ///
    /// `config` is optional:
    /// `{ network?: "livenet" | "testnet", defaultConnectorId?: "unisat" | "okx" | "sat20" }`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<BtcWallet, JsValue> {
        let config: WalletConnectConfig = optional(config)?.unwrap_or_default();
        let storage: Box<dyn Storage> = match LocalStorage::open() {
            Some(storage) => Box::new(storage),
            None => {
                log!("[btc-connect] localStorage unavailable, selection will not persist");
                Box::new(MemoryStorage::new())
            }
        };
        let wallet = BtcWalletConnect::new(config, ProviderSet::from_window(), storage);
        Ok(Self {
            inner: Rc::new(Mutex::new(wallet)),
            handlers: RefCell::new(Vec::new()),
        })
    }

    // =========================================================================
    // CONNECTION
    // =========================================================================

    #[wasm_bindgen(js_name = "switchConnector")]
    pub async fn switch_connector(&self, id: &str) -> Result<(), JsValue> {
        let id =
            ConnectorId::from_str(id).ok_or_else(|| js_err(ConnectError::ConnectorNotFound))?;
        self.inner
            .lock()
            .await
            .switch_connector(id)
            .map(|_| ())
            .map_err(js_err)
    }

    #[wasm_bindgen]
    pub async fn connect(&self) -> Result<bool, JsValue> {
        self.inner.lock().await.connect().await.map_err(js_err)
    }

    #[wasm_bindgen]
    pub async fn check(&self) -> Result<bool, JsValue> {
        self.inner.lock().await.check().await.map_err(js_err)
    }

    #[wasm_bindgen]
    pub async fn disconnect(&self) -> Result<(), JsValue> {
        self.inner.lock().await.disconnect().await.map_err(js_err)
    }

    // =========================================================================
    // STATE
    // =========================================================================

    /// Snapshot: `{ connectorId, localConnectorId, disConnectStatus, connected, address,
    /// publicKey, network, balance }`
    #[wasm_bindgen]
    pub async fn state(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.lock().await.state())
    }

    /// Every known connector with its display metadata and `installed` flag.
    #[wasm_bindgen]
    pub async fn connectors(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.lock().await.connector_summaries())
    }

    // =========================================================================
    // NETWORK + ACCOUNT
    // =========================================================================

    #[wasm_bindgen(js_name = "getNetwork")]
    pub async fn get_network(&self) -> Result<String, JsValue> {
        let network = self.inner.lock().await.get_network().await.map_err(js_err)?;
        Ok(network.as_str().to_string())
    }

    #[wasm_bindgen(js_name = "switchNetwork")]
    pub async fn switch_network(&self, network: &str) -> Result<(), JsValue> {
        let network = Network::from_str(network)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown network: {}", network)))?;
        self.inner
            .lock()
            .await
            .switch_network(network)
            .await
            .map_err(js_err)
    }

    #[wasm_bindgen(js_name = "getAccounts")]
    pub async fn get_accounts(&self) -> Result<JsValue, JsValue> {
        let accounts = self.inner.lock().await.get_accounts().await.map_err(js_err)?;
        to_js(&accounts)
    }

    #[wasm_bindgen(js_name = "getPublicKey")]
    pub async fn get_public_key(&self) -> Result<String, JsValue> {
        self.inner.lock().await.get_public_key().await.map_err(js_err)
    }

    #[wasm_bindgen(js_name = "getBalance")]
    pub async fn get_balance(&self) -> Result<JsValue, JsValue> {
        let balance = self.inner.lock().await.get_balance().await.map_err(js_err)?;
        to_js(&balance)
    }

    #[wasm_bindgen(js_name = "getInscriptions")]
    pub async fn get_inscriptions(&self, cursor: u32, size: u32) -> Result<JsValue, JsValue> {
        let page = self
            .inner
            .lock()
            .await
            .get_inscriptions(cursor, size)
            .await
            .map_err(js_err)?;
        to_js(&page)
    }

    // =========================================================================
    // TRANSACTIONS
    // =========================================================================

    /// Send `amount` satoshis. Non-integer amounts are rejected like
    /// non-positive ones.
    #[wasm_bindgen(js_name = "sendToAddress")]
    pub async fn send_to_address(&self, to_address: &str, amount: f64) -> Result<String, JsValue> {
        if !amount.is_finite() || amount.fract() != 0.0 {
            return Err(js_err(ConnectError::InvalidAmount));
        }
        self.inner
            .lock()
            .await
            .send_to_address(to_address, amount as i64)
            .await
            .map_err(js_err)
    }

    /// Transfer one inscription. `options` is optional: `{ feeRate }`.
    #[wasm_bindgen(js_name = "sendInscription")]
    pub async fn send_inscription(
        &self,
        address: &str,
        inscription_id: &str,
        options: JsValue,
    ) -> Result<String, JsValue> {
        let options: Option<SendOptions> = optional(options)?;
        self.inner
            .lock()
            .await
            .send_inscription(address, inscription_id, options)
            .await
            .map_err(js_err)
    }

    #[wasm_bindgen(js_name = "signMessage")]
    pub async fn sign_message(
        &self,
        message: &str,
        kind: Option<String>,
    ) -> Result<String, JsValue> {
        let kind = match kind {
            Some(raw) => Some(
                MessageType::from_str(&raw)
                    .ok_or_else(|| JsValue::from_str(&format!("Unknown message type: {}", raw)))?,
            ),
            None => None,
        };
        self.inner
            .lock()
            .await
            .sign_message(message, kind)
            .await
            .map_err(js_err)
    }

    #[wasm_bindgen(js_name = "signPsbt")]
    pub async fn sign_psbt(&self, psbt_hex: &str, options: JsValue) -> Result<String, JsValue> {
        let options: Option<SignPsbtOptions> = optional(options)?;
        self.inner
            .lock()
            .await
            .sign_psbt(psbt_hex, options.as_ref())
            .await
            .map_err(js_err)
    }

    #[wasm_bindgen(js_name = "signPsbts")]
    pub async fn sign_psbts(
        &self,
        psbt_hexs: JsValue,
        options: JsValue,
    ) -> Result<JsValue, JsValue> {
        let psbt_hexs: Vec<String> = from_js(psbt_hexs)?;
        let options: Option<Vec<SignPsbtOptions>> = optional(options)?;
        let signed = self
            .inner
            .lock()
            .await
            .sign_psbts(&psbt_hexs, options.as_deref())
            .await
            .map_err(js_err)?;
        to_js(&signed)
    }

    #[wasm_bindgen(js_name = "pushTx")]
    pub async fn push_tx(&self, raw_tx: &str) -> Result<String, JsValue> {
        self.inner.lock().await.push_tx(raw_tx).await.map_err(js_err)
    }

    #[wasm_bindgen(js_name = "pushPsbt")]
    pub async fn push_psbt(&self, psbt_hex: &str) -> Result<String, JsValue> {
        self.inner
            .lock()
            .await
            .push_psbt(psbt_hex)
            .await
            .map_err(js_err)
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    /// Subscribe `callback` to a provider event on the active connector.
    /// Subscribing the same callback twice is a no-op.
    #[wasm_bindgen]
    pub async fn on(&self, event: &str, callback: js_sys::Function) -> Result<(), JsValue> {
        let event = parse_event(event)?;
        if self.registered(event, &callback).is_some() {
            return Ok(());
        }
        let target = callback.clone();
        let handler: EventHandler = Rc::new(move |payload: Value| {
            let arg = to_js(&payload).unwrap_or(JsValue::NULL);
            if let Err(e) = target.call1(&JsValue::NULL, &arg) {
                log!("[btc-connect] event handler threw: {:?}", e);
            }
        });
        self.inner
            .lock()
            .await
            .on(event, handler.clone())
            .map_err(js_err)?;
        self.handlers.borrow_mut().push(JsHandler {
            event,
            callback,
            handler,
        });
        Ok(())
    }

    /// Detach `callback`. The entry is kept if the wallet refuses, so the
    /// same callback can be retried or still fires.
    #[wasm_bindgen(js_name = "removeListener")]
    pub async fn remove_listener(
        &self,
        event: &str,
        callback: js_sys::Function,
    ) -> Result<(), JsValue> {
        let event = parse_event(event)?;
        let Some(handler) = self.registered(event, &callback) else {
            return Ok(());
        };
        self.inner
            .lock()
            .await
            .remove_listener(event, &handler)
            .map_err(js_err)?;
        self.handlers
            .borrow_mut()
            .retain(|h| !(h.event == event && js_sys::Object::is(&h.callback, &callback)));
        Ok(())
    }
}

impl BtcWallet {
    fn registered(&self, event: WalletEvent, callback: &js_sys::Function) -> Option<EventHandler> {
        self.handlers
            .borrow()
            .iter()
            .find(|h| h.event == event && js_sys::Object::is(&h.callback, callback))
            .map(|h| h.handler.clone())
    }
}

/// Mask the middle of `value`, keeping `keep` characters at each end.
#[wasm_bindgen(js_name = "hideStr")]
pub fn hide_str(value: Option<String>, keep: Option<u32>, placeholder: Option<String>) -> String {
    format::hide_str(
        value.as_deref(),
        keep.map(|k| k as usize).unwrap_or(format::DEFAULT_KEEP),
        placeholder.as_deref().unwrap_or(format::DEFAULT_PLACEHOLDER),
    )
}
