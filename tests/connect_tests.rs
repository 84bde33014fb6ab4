//! Orchestrator tests: BtcWalletConnect over mock providers
//!
//! These tests verify:
//! 1. Construction and connector selection
//! 2. connect / check / disconnect and the persisted keys
//! 3. Network switching per provider family
//! 4. Passthrough calls and event relay

use btc_connect::core::keys::storage::{CONNECTOR_ID, DISCONNECTED, DISCONNECT_STATUS};
use btc_connect::mock::{MockOkx, MockWallet};
use btc_connect::{
    Balance, BtcConnector, BtcWalletConnect, ConnectError, ConnectorId, EventHandler,
    MemoryStorage, MessageType, Network, ProviderSet, SendOptions, SignPsbtOptions, Storage,
    ToSignInput, WalletConnectConfig, WalletEvent,
};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;

struct Harness {
    unisat: Rc<MockWallet>,
    okx: MockOkx,
    sat20: Rc<MockWallet>,
    storage: MemoryStorage,
}

impl Harness {
    fn new() -> Self {
        btc_connect::init_logging();
        Self {
            unisat: Rc::new(MockWallet::new()),
            okx: MockOkx::new(),
            sat20: Rc::new(MockWallet::new()),
            storage: MemoryStorage::new(),
        }
    }

    fn all_installed(&self) -> ProviderSet {
        ProviderSet::new()
            .with_unisat(self.unisat.clone())
            .with_okx(self.okx.wallet())
            .with_sat20(self.sat20.clone())
    }

    fn wallet(&self, config: WalletConnectConfig) -> BtcWalletConnect {
        BtcWalletConnect::new(config, self.all_installed(), Box::new(self.storage.clone()))
    }

    fn provider_calls(&self) -> usize {
        self.unisat.total_calls()
            + self.okx.livenet.total_calls()
            + self.okx.testnet.total_calls()
            + self.sat20.total_calls()
    }
}

// =============================================================================
// CONSTRUCTION + SELECTION
// =============================================================================

/// Test: no providers installed leaves no active connector
#[tokio::test]
async fn no_providers_connect_fails() {
    let storage = MemoryStorage::new();
    let mut wallet = BtcWalletConnect::new(
        WalletConnectConfig::new(),
        ProviderSet::new(),
        Box::new(storage.clone()),
    );

    assert!(wallet.connector().is_none());
    assert_eq!(wallet.connectors().len(), 3);
    assert!(wallet.connectors().iter().all(|c| !c.installed));

    let err = wallet.connect().await.unwrap_err();
    assert_eq!(err.to_string(), "Connector not found");
    assert!(storage.is_empty());
}

/// Test: every passthrough needs an active connector
#[tokio::test]
async fn passthrough_before_selection_fails() {
    let okx = MockOkx::new();
    let providers = ProviderSet::new().with_okx(okx.wallet());
    let mut wallet = BtcWalletConnect::new(
        WalletConnectConfig::new(),
        providers,
        Box::new(MemoryStorage::new()),
    );
    assert!(wallet.connector().is_none(), "default unisat is not installed");

    let handler: EventHandler = Rc::new(|_| {});
    let errors = vec![
        wallet.get_accounts().await.unwrap_err(),
        wallet.send_to_address("bc1qdest", 1_000).await.unwrap_err(),
        wallet
            .send_inscription("bc1qdest", "abc123i0", None)
            .await
            .unwrap_err(),
        wallet.sign_message("hello", None).await.unwrap_err(),
        wallet.sign_psbt("70736274ff", None).await.unwrap_err(),
        wallet
            .sign_psbts(&["70736274ff".to_string()], None)
            .await
            .unwrap_err(),
        wallet.push_tx("0200").await.unwrap_err(),
        wallet.push_psbt("70736274ff").await.unwrap_err(),
        wallet.on(WalletEvent::AccountsChanged, handler).unwrap_err(),
        wallet.disconnect().await.unwrap_err(),
        wallet.switch_network(Network::Testnet).await.unwrap_err(),
    ];
    for err in errors {
        assert!(matches!(err, ConnectError::ConnectorNotFound), "got {err}");
    }
    assert_eq!(okx.livenet.total_calls(), 0);
}

/// Test: switchConnector refuses uninstalled wallets and keeps the selection
#[tokio::test]
async fn switch_connector_rejects_uninstalled() {
    let unisat = Rc::new(MockWallet::new());
    let providers = ProviderSet::new().with_unisat(unisat);
    let mut wallet = BtcWalletConnect::new(
        WalletConnectConfig::new(),
        providers,
        Box::new(MemoryStorage::new()),
    );

    let err = wallet.switch_connector(ConnectorId::Sat20).err().unwrap();
    assert!(matches!(err, ConnectError::ConnectorNotFound));
    assert_eq!(wallet.connector_id(), ConnectorId::Unisat);
    assert_eq!(wallet.connector().map(|c| c.id()), Some(ConnectorId::Unisat));
}

/// Test: switchConnector returns the new active connector
#[tokio::test]
async fn switch_connector_selects_installed() {
    let h = Harness::new();
    let mut wallet = h.wallet(WalletConnectConfig::new());

    let connector = wallet.switch_connector(ConnectorId::Okx).unwrap();
    assert_eq!(connector.id(), ConnectorId::Okx);
    assert_eq!(connector.info().name, "Okx Wallet");
    assert_eq!(wallet.connector_id(), ConnectorId::Okx);
}

// =============================================================================
// CONNECT / CHECK / DISCONNECT
// =============================================================================

/// Test: connect populates mirrors and persists the connector id
#[tokio::test]
async fn connect_persists_selection() {
    let h = Harness::new();
    h.storage.set(DISCONNECT_STATUS, DISCONNECTED).unwrap();
    let mut wallet = h.wallet(WalletConnectConfig::new());

    assert!(wallet.connect().await.unwrap());
    assert!(wallet.connected());
    assert_eq!(wallet.address(), Some(MockWallet::ADDRESS));
    assert_eq!(wallet.public_key(), Some(MockWallet::PUBLIC_KEY));
    assert_eq!(wallet.balance(), h.unisat.balance());
    assert_eq!(wallet.network(), Network::Livenet);

    assert_eq!(h.storage.get(CONNECTOR_ID).as_deref(), Some("unisat"));
    assert_eq!(h.storage.get(DISCONNECT_STATUS), None);
    assert_eq!(wallet.local_connector_id(), Some(ConnectorId::Unisat));
    assert!(!wallet.dis_connect_status());
}

/// Test: a wallet with no authorized account connects as false and persists nothing
#[tokio::test]
async fn connect_without_accounts_does_not_persist() {
    let h = Harness::new();
    h.unisat.set_accounts(vec![]);
    let mut wallet = h.wallet(WalletConnectConfig::new());

    assert!(!wallet.connect().await.unwrap());
    assert!(!wallet.connected());
    assert!(wallet.address().is_none());
    assert!(h.storage.is_empty());
}

/// Test: provider rejection propagates verbatim
#[tokio::test]
async fn connect_rejection_passes_through() {
    let h = Harness::new();
    let config = WalletConnectConfig::new().with_default_connector(ConnectorId::Sat20);
    let mut wallet = h.wallet(config);

    h.sat20.fail_next("User rejected the request.");
    let err = wallet.connect().await.unwrap_err();
    assert!(matches!(&err, ConnectError::Provider(msg) if msg == "User rejected the request."));
    assert!(!wallet.connected());
    assert!(h.storage.get(CONNECTOR_ID).is_none());
}

/// Test: disconnect zeroes state and later check() stays quiet
#[tokio::test]
async fn disconnect_then_check_stays_quiet() {
    let h = Harness::new();
    let mut wallet = h.wallet(WalletConnectConfig::new());
    assert!(wallet.connect().await.unwrap());

    wallet.disconnect().await.unwrap();
    assert!(!wallet.connected());
    assert!(wallet.address().is_none() && wallet.public_key().is_none());
    assert_eq!(wallet.balance(), Balance::ZERO);
    assert!(wallet.dis_connect_status());
    assert_eq!(h.storage.get(DISCONNECT_STATUS).as_deref(), Some(DISCONNECTED));

    let connector = wallet.connector().unwrap();
    assert!(!connector.state().connected && connector.state().address.is_none());

    // Next page load: fresh orchestrator over the same storage.
    let calls_before = h.provider_calls();
    let mut reloaded = h.wallet(WalletConnectConfig::new());
    assert!(!reloaded.check().await.unwrap());
    assert!(!reloaded.connected());
    assert!(reloaded.address().is_none());
    assert_eq!(h.provider_calls(), calls_before);
}

/// Test: check() reconnects through the last used connector
#[tokio::test]
async fn check_restores_last_connector() {
    let h = Harness::new();
    h.storage.set(CONNECTOR_ID, "sat20").unwrap();
    let mut wallet = h.wallet(WalletConnectConfig::new());

    assert!(wallet.check().await.unwrap());
    assert_eq!(wallet.connector_id(), ConnectorId::Sat20);
    assert_eq!(wallet.address(), Some(MockWallet::ADDRESS));
    assert_eq!(h.sat20.calls("requestAccounts"), 0, "check never prompts");
    assert_eq!(h.unisat.total_calls(), 0);
}

/// Test: check() falls back to the configured default
#[tokio::test]
async fn check_uses_default_without_history() {
    let h = Harness::new();
    let mut wallet = h.wallet(WalletConnectConfig::new());

    assert!(wallet.check().await.unwrap());
    assert_eq!(wallet.connector_id(), ConnectorId::Unisat);
    assert_eq!(h.unisat.calls("getAccounts"), 1);
}

/// Test: check() swallows refresh failures
#[tokio::test]
async fn check_swallows_provider_errors() {
    let h = Harness::new();
    let mut wallet = h.wallet(WalletConnectConfig::new());

    h.unisat.fail_next("session expired");
    assert!(!wallet.check().await.unwrap());
    assert!(!wallet.connected());
    assert!(wallet.address().is_none());
}

/// Test: check() still fails when the remembered wallet is gone
#[tokio::test]
async fn check_fails_for_uninstalled_wallet() {
    let storage = MemoryStorage::new();
    storage.set(CONNECTOR_ID, "okx").unwrap();
    let providers = ProviderSet::new().with_unisat(Rc::new(MockWallet::new()));
    let mut wallet =
        BtcWalletConnect::new(WalletConnectConfig::new(), providers, Box::new(storage));

    let err = wallet.check().await.unwrap_err();
    assert!(matches!(err, ConnectError::ConnectorNotFound));
}

/// Test: a failed check() mirrors the connector it re-selected, not the old one
#[tokio::test]
async fn check_failure_mirrors_reselected_connector() {
    let h = Harness::new();
    let mut wallet = h.wallet(WalletConnectConfig::new());
    assert!(wallet.connect().await.unwrap());
    wallet.switch_connector(ConnectorId::Sat20).unwrap();
    assert!(!wallet.connected(), "sat20 never connected");

    h.unisat.fail_on("getAccounts", "session expired");
    assert!(!wallet.check().await.unwrap());
    assert_eq!(wallet.connector_id(), ConnectorId::Unisat);

    let state = wallet.connector().unwrap().state().clone();
    assert_eq!(wallet.connected(), state.connected);
    assert_eq!(wallet.address(), state.address.as_deref());
    assert_eq!(wallet.public_key(), state.public_key.as_deref());
    assert_eq!(wallet.network(), state.network);
}

/// Test: a rejected reconnect leaves no stale session in the mirrors
#[tokio::test]
async fn failed_reconnect_clears_stale_mirrors() {
    let h = Harness::new();
    let config = WalletConnectConfig::new().with_default_connector(ConnectorId::Okx);
    let mut wallet = h.wallet(config);
    assert!(wallet.connect().await.unwrap());

    h.okx.livenet.fail_next("User rejected the request.");
    assert!(wallet.connect().await.is_err());
    assert!(!wallet.connected());
    assert!(wallet.address().is_none());
    assert_eq!(wallet.balance(), Balance::ZERO);
}

/// Test: the connected/address invariant holds for every family
#[tokio::test]
async fn connected_iff_address_for_all_connectors() {
    let h = Harness::new();
    let mut wallet = h.wallet(WalletConnectConfig::new());

    for id in ConnectorId::ALL {
        wallet.switch_connector(id).unwrap();
        for step in 0..3 {
            match step {
                0 => assert!(wallet.connect().await.unwrap()),
                1 => wallet.disconnect().await.unwrap(),
                _ => {
                    assert!(wallet.connect().await.unwrap());
                }
            }
            let state = wallet.connector().unwrap().state();
            assert_eq!(state.connected, state.address.is_some(), "{id} step {step}");
            assert_eq!(wallet.connected(), wallet.address().is_some(), "{id} step {step}");
        }
    }
}

// =============================================================================
// NETWORK
// =============================================================================

/// Test: UniSat switchNetwork resyncs the account for the new network
#[tokio::test]
async fn unisat_switch_network_resyncs_account() {
    let h = Harness::new();
    let mut wallet = h.wallet(WalletConnectConfig::new());
    assert!(wallet.connect().await.unwrap());

    wallet.switch_network(Network::Testnet).await.unwrap();
    assert_eq!(h.unisat.network(), Network::Testnet);
    assert_eq!(wallet.network(), Network::Testnet);
    assert_eq!(wallet.get_network().await.unwrap(), Network::Testnet);
    assert_eq!(wallet.address(), Some(MockWallet::TESTNET_ADDRESS));
}

/// Test: OKX switchNetwork re-binds the endpoint; testnet reads are restricted
#[tokio::test]
async fn okx_switch_network_restricts_reads() {
    let h = Harness::new();
    let config = WalletConnectConfig::new().with_default_connector(ConnectorId::Okx);
    let mut wallet = h.wallet(config);
    assert!(wallet.connect().await.unwrap());
    assert_eq!(wallet.address(), Some(MockWallet::LIVENET_ADDRESS));

    wallet.switch_network(Network::Testnet).await.unwrap();
    assert_eq!(wallet.network(), Network::Testnet);
    assert!(!wallet.connected());
    assert_eq!(h.okx.livenet.calls("switchNetwork"), 0);

    let err = wallet.get_accounts().await.unwrap_err();
    assert_eq!(err.to_string(), "Can't get accounts on testnet");
    assert_eq!(h.okx.testnet.calls("getAccounts"), 0);

    // Reconnect through the testnet endpoint.
    assert!(wallet.connect().await.unwrap());
    assert_eq!(wallet.address(), Some(MockWallet::TESTNET_ADDRESS));
    assert_eq!(h.okx.testnet.calls("connect"), 1);
}

/// Test: a refresh failure after switching network still mirrors the new network
#[tokio::test]
async fn switch_network_refresh_failure_keeps_mirrors() {
    let h = Harness::new();
    let mut wallet = h.wallet(WalletConnectConfig::new());
    wallet.switch_connector(ConnectorId::Sat20).unwrap();
    assert!(wallet.connect().await.unwrap());

    h.sat20.fail_on("getAccounts", "Network busy");
    let err = wallet.switch_network(Network::Testnet).await.unwrap_err();
    assert_eq!(err.to_string(), "Network busy");
    assert_eq!(h.sat20.network(), Network::Testnet);

    let state = wallet.connector().unwrap().state().clone();
    assert_eq!(wallet.network(), Network::Testnet);
    assert_eq!(wallet.network(), state.network);
    assert_eq!(wallet.connected(), state.connected);
    assert_eq!(wallet.address(), state.address.as_deref());
}

// =============================================================================
// PASSTHROUGH
// =============================================================================

/// Test: non-positive amounts never reach the provider
#[tokio::test]
async fn send_rejects_non_positive_amounts() {
    let h = Harness::new();
    let mut wallet = h.wallet(WalletConnectConfig::new());
    assert!(wallet.connect().await.unwrap());
    let calls = h.unisat.total_calls();

    for amount in [0, -5] {
        let err = wallet.send_to_address("bc1qdest", amount).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid amount");
    }
    assert_eq!(h.unisat.total_calls(), calls);

    let txid = wallet.send_to_address("bc1qdest", 546).await.unwrap();
    assert_eq!(txid, MockWallet::TXID);
    assert_eq!(h.unisat.calls("sendBitcoin"), 1);
}

/// Test: sendInscription reaches every family; OKX refuses it on testnet
#[tokio::test]
async fn send_inscription_per_family() {
    let h = Harness::new();
    let mut wallet = h.wallet(WalletConnectConfig::new());
    let options = SendOptions { fee_rate: 8.0 };

    for id in ConnectorId::ALL {
        wallet.switch_connector(id).unwrap();
        let txid = wallet
            .send_inscription("bc1qdest", "abc123i0", Some(options))
            .await
            .unwrap();
        assert_eq!(txid, MockWallet::TXID, "{id}");
    }
    assert_eq!(h.unisat.last_send_options(), Some(options));
    assert_eq!(h.okx.livenet.last_send_options(), Some(options));
    assert_eq!(h.sat20.calls("sendInscription"), 1);

    wallet.switch_connector(ConnectorId::Okx).unwrap();
    wallet.switch_network(Network::Testnet).await.unwrap();
    let err = wallet
        .send_inscription("tb1qdest", "abc123i0", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ConnectError::TestnetRestricted));
    assert_eq!(h.okx.testnet.calls("sendInscription"), 0);
}

/// Test: signing options and message type reach the provider untouched
#[tokio::test]
async fn signing_passes_options_through() {
    let h = Harness::new();
    let wallet = h.wallet(WalletConnectConfig::new());

    let signature = wallet
        .sign_message("hello", Some(MessageType::Bip322Simple))
        .await
        .unwrap();
    assert_eq!(signature, MockWallet::SIGNATURE);
    assert_eq!(h.unisat.last_message_type(), Some(MessageType::Bip322Simple));

    let options = SignPsbtOptions {
        auto_finalized: Some(false),
        to_sign_inputs: vec![ToSignInput {
            index: 0,
            address: Some(MockWallet::ADDRESS.into()),
            ..Default::default()
        }],
    };
    wallet.sign_psbt("70736274ff", Some(&options)).await.unwrap();
    assert_eq!(h.unisat.last_sign_options(), Some(options));

    let psbts = ["70736274ff".to_string(), "70736274ff01".to_string()];
    let signed = wallet.sign_psbts(&psbts, None).await.unwrap();
    assert_eq!(signed.len(), 2);
}

/// Test: SAT20 JSON-string results are unwrapped through the orchestrator
#[tokio::test]
async fn sat20_push_results_are_unwrapped() {
    let h = Harness::new();
    let mut wallet = h.wallet(WalletConnectConfig::new());
    wallet.switch_connector(ConnectorId::Sat20).unwrap();

    h.sat20.set_raw_result(r#"{"txid":"9e1c"}"#);
    assert_eq!(wallet.push_tx("0200").await.unwrap(), "9e1c");

    h.sat20.set_raw_result("{broken");
    let err = wallet.push_psbt("70736274ff").await.unwrap_err();
    assert!(matches!(err, ConnectError::Json(_)));
}

// =============================================================================
// EVENTS
// =============================================================================

/// Test: provider events reach subscribed handlers until removed
#[tokio::test]
async fn events_relay_to_provider() {
    let h = Harness::new();
    let wallet = h.wallet(WalletConnectConfig::new());
    let seen: Rc<RefCell<Vec<Value>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let handler: EventHandler = Rc::new(move |payload| sink.borrow_mut().push(payload));

    wallet.on(WalletEvent::AccountsChanged, handler.clone()).unwrap();
    h.unisat.emit(WalletEvent::AccountsChanged, json!(["bc1qnew"]));
    h.unisat.emit(WalletEvent::NetworkChanged, json!("testnet"));
    assert_eq!(*seen.borrow(), vec![json!(["bc1qnew"])]);

    wallet.remove_listener(WalletEvent::AccountsChanged, &handler).unwrap();
    h.unisat.emit(WalletEvent::AccountsChanged, json!([]));
    assert_eq!(seen.borrow().len(), 1);
}

/// Test: OKX reports removeListener as unsupported and rejects networkChanged
#[tokio::test]
async fn okx_event_surface() {
    let h = Harness::new();
    let config = WalletConnectConfig::new().with_default_connector(ConnectorId::Okx);
    let wallet = h.wallet(config);
    let handler: EventHandler = Rc::new(|_| {});

    wallet.on(WalletEvent::AccountChanged, handler.clone()).unwrap();
    assert_eq!(h.okx.livenet.listener_count(), 1);
    let err = wallet
        .remove_listener(WalletEvent::AccountChanged, &handler)
        .unwrap_err();
    assert!(matches!(err, ConnectError::UnsupportedEvent(_)));
    assert_eq!(h.okx.livenet.listener_count(), 1);

    let err = wallet.on(WalletEvent::NetworkChanged, handler).unwrap_err();
    assert!(matches!(err, ConnectError::UnsupportedEvent(_)));
}

/// Test: re-subscribing the same handler on OKX never grows the endpoint's listeners
#[tokio::test]
async fn okx_repeated_on_is_bounded() {
    let h = Harness::new();
    let config = WalletConnectConfig::new().with_default_connector(ConnectorId::Okx);
    let wallet = h.wallet(config);
    let count = Rc::new(RefCell::new(0));
    let sink = count.clone();
    let handler: EventHandler = Rc::new(move |_| *sink.borrow_mut() += 1);

    for _ in 0..10 {
        wallet.on(WalletEvent::AccountsChanged, handler.clone()).unwrap();
    }
    assert_eq!(h.okx.livenet.listener_count(), 1);
    assert_eq!(h.okx.livenet.calls("on"), 1);

    h.okx.livenet.emit(WalletEvent::AccountsChanged, json!(["bc1qnew"]));
    assert_eq!(*count.borrow(), 1);
}

/// Test: state snapshot serializes with camelCase keys
#[tokio::test]
async fn state_snapshot_serializes() {
    let h = Harness::new();
    let mut wallet = h.wallet(WalletConnectConfig::new());
    assert!(wallet.connect().await.unwrap());

    let value = serde_json::to_value(wallet.state()).unwrap();
    assert_eq!(value["connectorId"], "unisat");
    assert_eq!(value["localConnectorId"], "unisat");
    assert_eq!(value["disConnectStatus"], false);
    assert_eq!(value["connected"], true);
    assert_eq!(value["network"], "livenet");
    assert_eq!(value["balance"]["total"], 50_000);
}
