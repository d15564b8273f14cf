//! Supported chains and their network parameters

use serde::{Deserialize, Serialize};
use std::fmt;
use crate::shared::constants::{COIN_TYPE_ETHEREUM, COIN_TYPE_TESTNET};

/// Closed set of chains the wallet core can talk to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SupportedChain {
    EthereumMainnet,
    Polygon,
    BaseMainnet,
    CoreTestnet,
    BaseSepolia,
    EthereumHolesky,
}

impl SupportedChain {
    /// Catalogue order used for listing.
    pub const ALL: [SupportedChain; 6] = [
        SupportedChain::EthereumMainnet,
        SupportedChain::Polygon,
        SupportedChain::BaseMainnet,
        SupportedChain::CoreTestnet,
        SupportedChain::BaseSepolia,
        SupportedChain::EthereumHolesky,
    ];

    pub fn chain_id(&self) -> u64 {
        match self {
            SupportedChain::EthereumMainnet => 1,
            SupportedChain::Polygon => 137,
            SupportedChain::BaseMainnet => 8453,
            SupportedChain::CoreTestnet => 1114,
            SupportedChain::BaseSepolia => 84532,
            SupportedChain::EthereumHolesky => 17000,
        }
    }

    pub fn from_chain_id(chain_id: u64) -> Option<Self> {
        Self::ALL.iter().copied().find(|chain| chain.chain_id() == chain_id)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SupportedChain::EthereumMainnet => "Ethereum Mainnet",
            SupportedChain::Polygon => "Polygon",
            SupportedChain::BaseMainnet => "Base",
            SupportedChain::CoreTestnet => "Core Testnet",
            SupportedChain::BaseSepolia => "Base Sepolia",
            SupportedChain::EthereumHolesky => "Ethereum Holesky",
        }
    }

    /// Stable identifier used in config keys (`rpc_<slug>`).
    pub fn slug(&self) -> &'static str {
        match self {
            SupportedChain::EthereumMainnet => "ethereum_mainnet",
            SupportedChain::Polygon => "polygon",
            SupportedChain::BaseMainnet => "base_mainnet",
            SupportedChain::CoreTestnet => "core_testnet",
            SupportedChain::BaseSepolia => "base_sepolia",
            SupportedChain::EthereumHolesky => "holesky",
        }
    }

    pub fn native_currency(&self) -> &'static str {
        match self {
            SupportedChain::EthereumMainnet => "ETH",
            SupportedChain::Polygon => "POL",
            SupportedChain::BaseMainnet => "ETH",
            SupportedChain::CoreTestnet => "TCORE2",
            SupportedChain::BaseSepolia => "ETH",
            SupportedChain::EthereumHolesky => "ETH",
        }
    }

    pub fn rpc_url(&self) -> &'static str {
        match self {
            SupportedChain::EthereumMainnet => "https://ethereum-rpc.publicnode.com",
            SupportedChain::Polygon => "https://polygon-rpc.com",
            SupportedChain::BaseMainnet => "https://mainnet.base.org",
            SupportedChain::CoreTestnet => "https://rpc.test2.btcs.network",
            SupportedChain::BaseSepolia => "https://sepolia.base.org",
            // No public default; requires WALLET_CORE_RPC_HOLESKY
            SupportedChain::EthereumHolesky => "",
        }
    }

    pub fn block_explorer(&self) -> &'static str {
        match self {
            SupportedChain::EthereumMainnet => "https://etherscan.io",
            SupportedChain::Polygon => "https://polygonscan.com",
            SupportedChain::BaseMainnet => "https://basescan.org",
            SupportedChain::CoreTestnet => "https://scan.test2.btcs.network",
            SupportedChain::BaseSepolia => "https://sepolia.basescan.org",
            SupportedChain::EthereumHolesky => "https://holesky.etherscan.io",
        }
    }

    pub fn is_testnet(&self) -> bool {
        matches!(
            self,
            SupportedChain::CoreTestnet
                | SupportedChain::BaseSepolia
                | SupportedChain::EthereumHolesky
        )
    }

    /// BIP-44 coin type used when deriving from a mnemonic.
    pub fn coin_type(&self) -> u32 {
        if self.is_testnet() {
            COIN_TYPE_TESTNET
        } else {
            COIN_TYPE_ETHEREUM
        }
    }

    /// Account derivation path for this chain.
    pub fn derivation_path(&self) -> String {
        format!("m/44'/{}'/0'/0/0", self.coin_type())
    }

    pub fn config(&self) -> ChainConfig {
        ChainConfig {
            chain: *self,
            chain_id: self.chain_id(),
            name: self.name(),
            native_symbol: self.native_currency(),
            rpc_url: self.rpc_url().to_string(),
            block_explorer: self.block_explorer(),
            is_testnet: self.is_testnet(),
            coin_type: self.coin_type(),
        }
    }
}

impl fmt::Display for SupportedChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable network parameters for one chain.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChainConfig {
    pub chain: SupportedChain,
    pub chain_id: u64,
    pub name: &'static str,
    pub native_symbol: &'static str,
    pub rpc_url: String,
    pub block_explorer: &'static str,
    pub is_testnet: bool,
    pub coin_type: u32,
}
