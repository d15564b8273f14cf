use anyhow::Context;
use multichain_wallet_core::WalletCoreConfig;

fn main() -> anyhow::Result<()> {
    multichain_wallet_core::init();

    let config = WalletCoreConfig::load().context("loading wallet core configuration")?;
    let registry = config.chain_registry();

    println!(
        "{} {} configuration:\n",
        multichain_wallet_core::NAME,
        multichain_wallet_core::VERSION
    );
    println!("  Default chain id: {}", config.default_chain_id);
    println!("  Storage path: {}", config.storage_path.display());
    println!(
        "  RPC: timeout {} ms, {} retries, backoff {} ms",
        config.rpc_timeout_ms, config.rpc_max_retries, config.rpc_backoff_ms
    );
    println!("  Balance TTL: {} s", config.balance_ttl_secs);

    let kdf = config.kdf_config();
    println!("  KDF: {:?} ({} iterations)", kdf.algorithm, kdf.iterations);
    println!("  Cipher: {:?}", config.cipher);

    println!("\nChains:");
    for chain in registry.list_chains() {
        let marker = if chain.chain_id == config.default_chain_id { "*" } else { " " };
        let rpc = if chain.rpc_url.is_empty() { "(not set)" } else { chain.rpc_url.as_str() };
        println!(
            " {} {:>6}  {:<18} {:<7} {}{}",
            marker,
            chain.chain_id,
            chain.name,
            chain.native_symbol,
            rpc,
            if chain.is_testnet { "  [testnet]" } else { "" }
        );
    }

    Ok(())
}
