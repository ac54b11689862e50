use crate::wallets;
use clap::{
    ArgGroup,
    Parser,
};
use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use deployments::{
    DeploymentEnv,
    DeploymentStore,
};
use fortune_core::ShareSettings;
use std::path::PathBuf;
use tracing::info;

pub const DEFAULT_TESTNET_RPC_URL: &str = "https://testnet.fuel.network";
pub const DEFAULT_DEVNET_RPC_URL: &str = "https://devnet.fuel.network";
pub const DEFAULT_LOCAL_RPC_URL: &str = "http://localhost:4000/";
pub const DEFAULT_TESTNET_EXPLORER_URL: &str = "https://app-testnet.fuel.network";
pub const DEFAULT_DEVNET_EXPLORER_URL: &str = "https://app-devnet.fuel.network";

/// 0.0001 ETH at 9 decimals.
pub const DEFAULT_MINT_FEE: u64 = 100_000;
pub const DEFAULT_APP_URL: &str =
    "https://farcaster.xyz/miniapps/9ehldX_kietX/holiday-fortune-cookie";
pub const DEFAULT_IMAGE_URL: &str =
    "https://holiday-fortune-cookie.onrender.com/fortune_cookie_opened.png";
pub const CHAIN_NAME: &str = "Fuel";

#[derive(Parser, Debug)]
#[command(
    name = "fortune-cookie",
    version,
    about = "Crack a holiday fortune cookie and mint it on Fuel",
    long_about = None,
    group(
        ArgGroup::new("network")
            .args(["devnet", "testnet", "local"])
            .required(true)
    )
)]
pub struct Args {
    /// Connect to Fuel devnet
    #[arg(long)]
    pub devnet: bool,

    /// Connect to Fuel testnet
    #[arg(long)]
    pub testnet: bool,

    /// Connect to a local Fuel node
    #[arg(long)]
    pub local: bool,

    /// Override the RPC URL for the selected network
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Fortune contract; defaults to the network's deployment record
    #[arg(long)]
    pub contract_id: Option<String>,

    /// Fee sent with each mint, in base-asset units; defaults to the recorded fee
    #[arg(long)]
    pub mint_fee: Option<u64>,

    /// forc-wallet keystore to offer first
    #[arg(long)]
    pub wallet: Option<String>,

    /// forc-wallet directory (defaults to ~/.fuel/wallets)
    #[arg(long)]
    pub wallet_dir: Option<String>,

    #[arg(long, default_value = DEFAULT_APP_URL)]
    pub app_url: String,

    #[arg(long, default_value = DEFAULT_IMAGE_URL)]
    pub image_url: String,

    /// Block explorer base URL for transaction links
    #[arg(long)]
    pub explorer_url: Option<String>,

    /// Directory for the client log file
    #[arg(long, default_value = ".logs")]
    pub log_dir: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NetworkTarget {
    Devnet { url: String },
    Testnet { url: String },
    LocalNode { url: String },
}

impl NetworkTarget {
    pub fn url(&self) -> &str {
        match self {
            NetworkTarget::Devnet { url }
            | NetworkTarget::Testnet { url }
            | NetworkTarget::LocalNode { url } => url,
        }
    }

    pub fn env(&self) -> DeploymentEnv {
        match self {
            NetworkTarget::Devnet { .. } => DeploymentEnv::Dev,
            NetworkTarget::Testnet { .. } => DeploymentEnv::Test,
            NetworkTarget::LocalNode { .. } => DeploymentEnv::Local,
        }
    }

    pub fn default_explorer_url(&self) -> Option<&'static str> {
        match self {
            NetworkTarget::Devnet { .. } => Some(DEFAULT_DEVNET_EXPLORER_URL),
            NetworkTarget::Testnet { .. } => Some(DEFAULT_TESTNET_EXPLORER_URL),
            NetworkTarget::LocalNode { .. } => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub network: NetworkTarget,
    pub contract_id: Option<String>,
    pub mint_fee: Option<u64>,
    pub wallet: Option<String>,
    pub wallet_dir: PathBuf,
    pub explorer_url: Option<String>,
    pub share: ShareSettings,
}

impl Args {
    pub fn network(&self) -> NetworkTarget {
        let custom = self.rpc_url.clone();
        if self.devnet {
            NetworkTarget::Devnet {
                url: custom.unwrap_or_else(|| DEFAULT_DEVNET_RPC_URL.to_string()),
            }
        } else if self.testnet {
            NetworkTarget::Testnet {
                url: custom.unwrap_or_else(|| DEFAULT_TESTNET_RPC_URL.to_string()),
            }
        } else {
            NetworkTarget::LocalNode {
                url: custom.unwrap_or_else(|| DEFAULT_LOCAL_RPC_URL.to_string()),
            }
        }
    }

    pub fn into_config(self) -> Result<AppConfig> {
        let network = self.network();
        let wallet_dir = wallets::resolve_wallet_dir(self.wallet_dir.as_deref())?;
        let explorer_url = self
            .explorer_url
            .or_else(|| network.default_explorer_url().map(str::to_string));
        Ok(AppConfig {
            network,
            contract_id: self.contract_id,
            mint_fee: self.mint_fee,
            wallet: self.wallet,
            wallet_dir,
            explorer_url,
            share: ShareSettings {
                chain_name: CHAIN_NAME.to_string(),
                app_url: self.app_url,
                image_url: self.image_url,
            },
        })
    }
}

/// Contract and fee a run mints with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MintTarget {
    pub contract_id: String,
    pub mint_fee: u64,
}

/// Picks the contract to mint against, saving a command-line id as the new record.
///
/// The fee comes from the command line, then the record, then [`DEFAULT_MINT_FEE`].
pub fn resolve_mint_target(
    store: &DeploymentStore,
    cli_contract_id: Option<&str>,
    cli_mint_fee: Option<u64>,
    network: &NetworkTarget,
) -> Result<MintTarget> {
    if let Some(contract_id) = cli_contract_id {
        let record = store
            .record_contract(contract_id, network.url(), cli_mint_fee)
            .map_err(|e| eyre!(e))
            .wrap_err("Failed to save deployment record")?;
        return Ok(MintTarget {
            contract_id: record.contract_id,
            mint_fee: cli_mint_fee.or(record.mint_fee).unwrap_or(DEFAULT_MINT_FEE),
        });
    }
    let record = store
        .load()
        .map_err(|e| eyre!(e))
        .wrap_err("Failed to load deployment record")?
        .ok_or_else(|| {
            eyre!(
                "No deployment record found for {}; provide --contract-id",
                network.env()
            )
        })?;
    info!(
        contract_id = %record.contract_id,
        recorded_at = %record.recorded_at,
        network_url = %record.network_url,
        mint_fee = ?record.mint_fee,
        "using recorded deployment"
    );
    Ok(MintTarget {
        mint_fee: cli_mint_fee.or(record.mint_fee).unwrap_or(DEFAULT_MINT_FEE),
        contract_id: record.contract_id,
    })
}
