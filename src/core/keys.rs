//! Key and name constants
//!
//! Centralized registry for persisted-storage keys, injected provider
//! globals and connector display metadata.

/// Persisted storage keys. Shared by every instance on the same origin.
pub mod storage {
    /// Id of the last connector a user connected with.
    pub const CONNECTOR_ID: &str = "_btc_connector_id";
    /// Present (value [`DISCONNECTED`]) after an explicit disconnect.
    pub const DISCONNECT_STATUS: &str = "_btc_disconnect_status";

    pub const DISCONNECTED: &str = "1";
}

/// Names of the browser globals each provider injects.
pub mod globals {
    pub const UNISAT: &str = "unisat";
    pub const OKX: &str = "okxwallet";
    pub const OKX_LIVENET: &str = "bitcoin";
    pub const OKX_TESTNET: &str = "bitcoinTestnet";
    pub const SAT20: &str = "sat20";
}

/// Connector display metadata
pub mod meta {
    pub mod unisat {
        pub const NAME: &str = "Unisat";
        pub const LOGO: &str = "https://unisat.io/favicon.ico";
        pub const HOMEPAGE: &str = "https://unisat.io";
    }

    pub mod okx {
        pub const NAME: &str = "Okx Wallet";
        pub const LOGO: &str = "https://static.okx.com/cdn/assets/imgs/247/58E63FEA47A2B7D7.png";
        pub const HOMEPAGE: &str =
            "https://www.okx.com/web3/build/docs/sdks/chains/bitcoin/provider";
    }

    pub mod sat20 {
        pub const NAME: &str = "Sat20";
        pub const LOGO: &str = "https://sat20.io/favicon.ico";
        pub const HOMEPAGE: &str = "https://sat20.io";
    }
}

/// Wallet names used in "not installed" errors.
pub mod installed {
    pub const UNISAT: &str = "Unisat";
    pub const OKX: &str = "OkxWallet";
    pub const SAT20: &str = "Sat20";
}
