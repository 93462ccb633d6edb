//! Network constants

/// Relay and bootstrap multiaddrs used when the user has configured none
pub const DEFAULT_RELAY_LIST: &[&str] = &[
    "/dnsaddr/bootstrap.libp2p.io/p2p/QmNnooDu7bfjPFoTZYxMNLWUQJyrVwtbZg5gBMjTezGAJN",
    "/dnsaddr/bootstrap.libp2p.io/p2p/QmQCU2EcMqAqQPR2i9bChDtGNJchTbq5TbXJJ16u19uLTa",
    "/dnsaddr/bootstrap.libp2p.io/p2p/QmbLHAnMoJPWSCR5Zhtx6BHJX9KiKNN6tpvbUcqanj75Nb",
    "/dnsaddr/bootstrap.libp2p.io/p2p/QmcZf59bWwK5XFi76CZX8cbJ4BhTzzA3gU1ZjYZcYW3dwt",
];

/// Owned copy of [`DEFAULT_RELAY_LIST`]
pub fn default_relays() -> Vec<String> {
    DEFAULT_RELAY_LIST.iter().map(|s| s.to_string()).collect()
}
