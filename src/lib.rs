//! btc-connect: one connector API over injected browser Bitcoin wallets.
//!
//! # Architecture
//!
//! ```text
//! BtcWalletConnect (entry point)
//!   │
//!   ├── Storage (persisted last connector + disconnect intent)
//!   │
//!   └── Box<dyn BtcConnector>
//!         ├── UnisatConnector → window.unisat
//!         ├── OkxConnector    → window.okxwallet.{bitcoin, bitcoinTestnet}
//!         └── Sat20Connector  → window.sat20
//! ```
//!
//! # Lifecycle
//!
//! | Step | Method | Description |
//! |------|--------|-------------|
//! | pick | `wallet.switch_connector(id)` | Select an installed wallet |
//! | connect | `wallet.connect()` | Prompt the wallet, remember the choice |
//! | check | `wallet.check()` | Silent reconnect on page load |
//! | disconnect | `wallet.disconnect()` | Forget session, stay quiet next load |
//!
//! # Features
//!
//! - `native` - tracing-subscriber log setup for hosts and tests
//! - `wasm` - JS-backed providers, localStorage, `BtcWallet` JS class
//! - `mock` - in-memory wallet providers for tests
//!
//! # Usage
//!
//! ```ignore
//! use btc_connect::{
//!     BtcWalletConnect, ConnectorId, MemoryStorage, ProviderSet, WalletConnectConfig,
//! };
//!
//! let mut wallet = BtcWalletConnect::new(
//!     WalletConnectConfig::new().with_default_connector(ConnectorId::Okx),
//!     providers,
//!     Box::new(MemoryStorage::new()),
//! );
//!
//! if !wallet.check().await? {
//!     wallet.connect().await?;
//! }
//! let txid = wallet.send_to_address("bc1q...", 10_000).await?;
//! ```

// =============================================================================
// Shared modules (compile everywhere)
// =============================================================================
pub mod config;
pub mod connect;
pub mod connector;
pub mod core;
pub mod provider;

#[cfg(feature = "native")]
pub mod logging;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// =============================================================================
// WASM-only modules (browser, localStorage, wasm-bindgen)
// =============================================================================
#[cfg(feature = "wasm")]
pub mod wasm;

// =============================================================================
// Re-exports
// =============================================================================
pub use config::WalletConnectConfig;
pub use connect::{BtcWalletConnect, ConnectorEntry, ConnectorSummary, WalletState};
pub use connector::{
    BtcConnector, ConnectorInfo, ConnectorState, OkxConnector, Sat20Connector, UnisatConnector,
};
pub use crate::core::error::{ConnectError, Result};
pub use crate::core::format::{hide_address, hide_str};
pub use crate::core::storage::{MemoryStorage, Storage};
pub use crate::core::types::*;
pub use provider::{EventHandler, OkxApi, OkxWallet, ProviderSet, Sat20Api, UnisatApi};

#[cfg(feature = "native")]
pub use logging::init_logging;

#[cfg(feature = "wasm")]
pub use wasm::BtcWallet;
