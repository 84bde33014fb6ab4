//! WASM module: the wallet connector inside a browser page.
//!
//! Architecture:
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           BtcWallet (JS API)            │
//! │  connect, check, disconnect, sign...    │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │      BtcWalletConnect (orchestrator)    │
//! └───────┬─────────────────────┬───────────┘
//!         │                     │
//! ┌───────▼─────────┐   ┌───────▼───────────┐
//! │ JsProvider      │   │ LocalStorage      │
//! │ window.unisat…  │   │ _btc_* keys       │
//! └─────────────────┘   └───────────────────┘
//! ```

mod client;
mod provider;
mod storage;

pub use client::BtcWallet;
pub use provider::JsProvider;
pub use storage::LocalStorage;

use wasm_bindgen::prelude::*;

/// Initialize WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Log to browser console
pub fn console_log(s: &str) {
    web_sys::console::log_1(&JsValue::from_str(s));
}

macro_rules! log {
    ($($t:tt)*) => {
        crate::wasm::console_log(&format!($($t)*))
    }
}

pub(crate) use log;
