//! Asty command-line client.
//!
//! Drives the registration flow against a JSON-RPC endpoint: check a
//! referral, print a member's status, build the payment configuration, or
//! withdraw rewards from an unlocked node account.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use asty_chain::{with_timeout, JsonRpcClient, ReferralContract, RpcReferralContract, RpcWallet, WalletProvider};
use asty_registration::{referral_link, AppConfig, FileStore, PaymentConfig, RegistrationFlow, RegistrationUi};
use asty_types::{chain_name, format_token_amount, parse_address, Address};
use asty_utils::{init_logging, short_address, short_hash, LogFormat};
use clap::Parser;

#[derive(Parser)]
#[command(name = "asty", about = "Asty membership registration client")]
struct Cli {
    /// Path to a TOML configuration file. `ASTY_*` env vars override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON-RPC endpoint of the target chain.
    #[arg(long, default_value = "http://127.0.0.1:8545", env = "ASTY_RPC_URL")]
    rpc_url: String,

    /// Where the registration draft is kept between runs.
    #[arg(long, default_value = "./asty_state.json", env = "ASTY_STATE_FILE")]
    state_file: PathBuf,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "ASTY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "ASTY_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Validate a referral address and check its registration on chain.
    CheckReferral {
        candidate: String,
        /// The wallet that would register (for the self-referral check).
        #[arg(long)]
        wallet: Option<String>,
    },
    /// Show a member's on-chain status.
    Status { address: String },
    /// Print the payment widget configuration as JSON.
    PaymentConfig {
        #[arg(long)]
        wallet: String,
        /// Page URL to read a `?ref=` referral from.
        #[arg(long)]
        url: Option<String>,
        /// Referral address typed by the user; wins over the URL.
        #[arg(long)]
        referral: Option<String>,
    },
    /// Withdraw accrued rewards for the node's first account.
    Withdraw,
    /// Print the referral link for an address.
    Link {
        address: String,
        #[arg(long, default_value = "https://asty.app/")]
        base_url: String,
    },
}

/// Prints the surfaces the flow asks for.
struct ConsoleUi;

impl RegistrationUi for ConsoleUi {
    fn open_payment_dialog(&self, config: &PaymentConfig) {
        tracing::info!(to_chain = config.to_chain, token = %config.token_symbol, "payment dialog requested");
    }

    fn close_payment_dialog(&self) {
        tracing::info!("payment dialog closed");
    }

    fn celebrate(&self) {
        println!("🎉");
    }

    fn open_welcome(&self) {
        println!("Welcome to Asty!");
    }
}

struct Services {
    config: Arc<AppConfig>,
    contract: Arc<dyn ReferralContract>,
    wallet: Arc<dyn WalletProvider>,
}

impl Services {
    fn connect(config: AppConfig, rpc_url: &str) -> anyhow::Result<Self> {
        let contract_address = config
            .referral_contract
            .context("referral contract address is not configured (ASTY_REFERRAL_CONTRACT)")?;
        let client = Arc::new(JsonRpcClient::new(rpc_url)?);
        tracing::debug!(rpc_url, contract = %contract_address, "connected to chain");
        Ok(Self {
            contract: Arc::new(RpcReferralContract::new(client.clone(), contract_address)),
            wallet: Arc::new(RpcWallet::new(client, config.receipt_poll_interval())),
            config: Arc::new(config),
        })
    }

    fn flow(&self, state_file: &Path) -> anyhow::Result<RegistrationFlow> {
        let store = FileStore::open(state_file)
            .with_context(|| format!("failed to open state file {}", state_file.display()))?;
        Ok(RegistrationFlow::new(
            self.config.clone(),
            self.contract.clone(),
            self.wallet.clone(),
            Arc::new(store),
            Arc::new(ConsoleUi),
        ))
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let mut config = match path {
        Some(path) => AppConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::default(),
    };
    config.apply_env()?;
    Ok(config)
}

fn address_arg(value: &str) -> anyhow::Result<Address> {
    parse_address(value).with_context(|| format!("not an address: {value}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    init_logging(LogFormat::parse(&config.log_format), &config.log_level);

    if let Command::Link { address, base_url } = &cli.command {
        println!("{}", referral_link(base_url, &address_arg(address)?)?);
        return Ok(());
    }

    let services = Services::connect(config, &cli.rpc_url)?;

    match cli.command {
        Command::CheckReferral { candidate, wallet } => {
            let wallet = wallet.as_deref().map(address_arg).transpose()?;
            let mut flow = services.flow(&cli.state_file)?;
            if let Some(ticket) = flow.connect_wallet(wallet) {
                flow.resolve_referral(ticket).await;
            }
            if let Some(ticket) = flow.set_referral_input(&candidate) {
                flow.resolve_referral(ticket).await;
            }

            println!("candidate:          {candidate}");
            println!("state:              {:?}", flow.resolver_state());
            if let Some(error) = &flow.registration().errors.referral_address {
                println!("error:              {error}");
            }
            println!("effective referral: {}", flow.effective_referral());
        }

        Command::Status { address } => {
            let address = address_arg(&address)?;
            let contract = &services.contract;
            let timeout = services.config.read_timeout();

            let user = with_timeout("user snapshot", timeout, contract.get_user(address)).await?;
            let levels = with_timeout("referral levels", timeout, contract.referral_counts_by_level(address)).await?;
            let total = with_timeout("total registered", timeout, contract.total_registered_users()).await?;

            let decimals = services.config.deposit_token_decimals;
            let symbol = &services.config.deposit_token_symbol;
            let chain_id = services.config.target_chain_id;
            println!("network:          {} ({chain_id})", chain_name(chain_id));
            println!("address:          {}", short_address(&address));
            println!("registered:       {}", user.registered);
            if user.has_referrer() {
                println!("referrer:         {}", short_address(&user.referrer));
            }
            println!(
                "rewards:          {} {symbol}",
                format_token_amount(user.accrued_rewards, decimals)
            );
            println!("direct referrals: {}", user.direct_referral_count);
            for (level, count) in levels.iter().filter(|(_, count)| *count > 0) {
                println!("  level {level:>2}: {count}");
            }
            println!("network total:    {}", levels.total());
            println!("members:          {total}");
        }

        Command::PaymentConfig { wallet, url, referral } => {
            let wallet = address_arg(&wallet)?;
            let mut flow = services.flow(&cli.state_file)?;
            flow.connect_wallet(Some(wallet));
            if let Some(ticket) = flow.mount(url.as_deref()) {
                flow.resolve_referral(ticket).await;
            }
            if let Some(error) = flow.extraction_error() {
                tracing::warn!(error, "ignoring referral link");
            }
            if let Some(referral) = referral {
                if let Some(ticket) = flow.set_referral_input(&referral) {
                    flow.resolve_referral(ticket).await;
                }
            }
            if let Some(error) = &flow.registration().errors.referral_address {
                bail!("{error}");
            }

            let payment = flow
                .payment_config()
                .context("payment configuration unavailable (deposit token or contract missing)")?;
            println!("{}", serde_json::to_string_pretty(&payment)?);
        }

        Command::Withdraw => {
            let account = services.wallet.account().await?;
            let mut flow = services.flow(&cli.state_file)?;
            flow.connect_wallet(account);
            flow.process_refreshes().await;

            let state = flow.withdraw().await;
            match (&state.error, state.last_transaction_hash) {
                (Some(error), _) => bail!("{error}"),
                (None, Some(hash)) => println!("withdrawn in {}", short_hash(&hash)),
                (None, None) => bail!("withdrawal did not complete"),
            }
        }

        Command::Link { .. } => {}
    }

    Ok(())
}
