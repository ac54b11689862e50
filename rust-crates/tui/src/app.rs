use crate::{
    chain::{
        FuelLogDecoder,
        FuelMinter,
        hex_id,
        parse_contract_id,
    },
    config::{
        AppConfig,
        resolve_mint_target,
    },
    share::WarpcastComposer,
    ui::{
        self,
        AppSnapshot,
        InputEvents,
        UiState,
        UserEvent,
    },
    wallets::{
        ForcKeystoreConnector,
        WalletSession,
    },
};
use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use deployments::DeploymentStore;
use fortune_core::{
    Collaborators,
    FortuneGenerator,
    MintController,
    MintSettings,
    MintStart,
    Outcome,
    ReceiptNotices,
    WalletConnector,
};
use fuels::prelude::Provider;
use std::{
    fs,
    path::Path,
    time::Duration,
};
use tokio::time::{
    self,
    Instant,
};
use tracing::{
    debug,
    info,
    warn,
};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling,
};
use tracing_subscriber::EnvFilter;

const CRACK_ANIMATION: Duration = Duration::from_millis(180);
const LOG_FILE_NAME: &str = "fortune-cookie.log";
const DEFAULT_LOG_FILTER: &str = "info,fortune_core=debug";

type Controller =
    MintController<ForcKeystoreConnector, FuelMinter, FuelLogDecoder, WarpcastComposer>;

/// Logs go to a file; the terminal belongs to the UI. Keep the guard alive until exit.
pub fn init_tracing(log_dir: &Path) -> Result<WorkerGuard> {
    fs::create_dir_all(log_dir)
        .wrap_err_with(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let appender = rolling::never(log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| eyre!(e))?;
    Ok(guard)
}

pub struct AppController {
    controller: Controller,
    minter: FuelMinter,
    composer: WarpcastComposer,
    network_label: String,
    price_checked: bool,
}

impl AppController {
    pub async fn new(config: AppConfig) -> Result<(Self, ReceiptNotices)> {
        let AppConfig {
            network,
            contract_id,
            mint_fee,
            wallet,
            wallet_dir,
            explorer_url,
            share,
        } = config;
        let url = network.url().to_string();
        info!(%url, env = %network.env(), "connecting to provider");
        let provider = Provider::connect(&url)
            .await
            .wrap_err_with(|| format!("Failed to connect to provider at {url}"))?;

        let store = DeploymentStore::new(network.env())
            .map_err(|e| eyre!(e))
            .wrap_err("Failed to open deployments store")?;
        let target = resolve_mint_target(&store, contract_id.as_deref(), mint_fee, &network)?;
        let contract_id = parse_contract_id(&target.contract_id)?;
        let mint_fee = target.mint_fee;

        let session = WalletSession::default();
        let minter = FuelMinter::new(provider.clone(), session.clone()).await?;
        let composer = WarpcastComposer::default();
        let mut settings = MintSettings::new(hex_id(contract_id), mint_fee);
        if let Some(explorer_url) = explorer_url {
            settings = settings.with_explorer_url(explorer_url);
        }
        info!(
            contract_id = %settings.contract_id,
            mint_fee,
            wallet_dir = %wallet_dir.display(),
            "mint client configured"
        );

        let (controller, notices) = MintController::new(
            Collaborators {
                wallet: ForcKeystoreConnector::new(wallet_dir, wallet, provider, session),
                submitter: minter.clone(),
                decoder: FuelLogDecoder::new(contract_id)
                    .with_token_id_field(settings.token_id_field.clone()),
                composer: composer.clone(),
            },
            FortuneGenerator::holiday(),
            settings,
            share,
        );
        let app = Self {
            controller,
            minter,
            composer,
            network_label: format!("{} ({url})", network.env()),
            price_checked: false,
        };
        Ok((app, notices))
    }

    fn snapshot(&self) -> AppSnapshot {
        let c = &self.controller;
        AppSnapshot {
            network: self.network_label.clone(),
            wallet: c.wallet().connection().map(|address| address.truncated()),
            fortune: c.fortune().map(|fortune| fortune.to_string()),
            crack: c.crack_state(),
            busy: c.phase().is_in_flight(),
            cta: c.cta_label(),
            fee: c.fee_label(),
            status: c.status_label(),
            result: c.result().cloned(),
            explorer_link: c.explorer_link(),
            share_link: self.composer.latest_link(),
        }
    }

    /// Renders "waiting for wallet" before the submit call blocks the loop.
    async fn mint(&mut self, ui_state: &mut UiState) -> Result<Outcome> {
        let outcome = match self.controller.begin_mint() {
            MintStart::Submit(call) => {
                ui::draw(ui_state, &self.snapshot())
                    .wrap_err("draw while submitting mint failed")?;
                self.controller.submit(call).await
            }
            MintStart::Crack => self.controller.crack().await,
            MintStart::Connect => self.controller.connect().await,
            MintStart::Busy => Outcome::Busy,
        };
        Ok(outcome)
    }

    /// Warns once if the configured fee disagrees with the contract.
    async fn check_mint_price(&mut self) {
        if self.price_checked {
            return;
        }
        self.price_checked = true;
        let settings = self.controller.settings();
        match self.minter.mint_price(&settings.contract_id).await {
            Ok(price) if price != settings.mint_fee => warn!(
                on_chain = price,
                configured = settings.mint_fee,
                "configured mint fee differs from contract price"
            ),
            Ok(price) => debug!(price, "mint fee matches contract price"),
            Err(err) => warn!(error = %err, "could not read contract mint price"),
        }
    }
}

pub async fn run_app(config: AppConfig) -> Result<()> {
    let (controller, notices) = AppController::new(config).await?;
    let mut ui_state = UiState::default();
    let mut input_events = ui::input_event_stream();

    ui::terminal_enter(&mut ui_state)?;
    info!("UI ready");
    let res = run_loop(controller, notices, &mut ui_state, &mut input_events).await;
    ui::terminal_exit(&mut ui_state)?;
    res
}

fn suspend_terminal(ui_state: &mut UiState, input: &InputEvents) -> Result<()> {
    input.pause();
    ui::terminal_exit(ui_state).wrap_err("leaving terminal for wallet prompt failed")
}

fn resume_terminal(ui_state: &mut UiState, input: &InputEvents) -> Result<()> {
    ui::terminal_enter(ui_state).wrap_err("restoring terminal after wallet prompt failed")?;
    input.resume();
    Ok(())
}

async fn run_loop(
    mut app: AppController,
    mut notices: ReceiptNotices,
    ui_state: &mut UiState,
    input_events: &mut InputEvents,
) -> Result<()> {
    let mut crack_deadline: Option<Instant> = None;
    ui::draw(ui_state, &app.snapshot()).wrap_err("initial draw failed")?;

    loop {
        tokio::select! {
            Some(notice) = notices.recv() => {
                let outcome = app.controller.observe_receipt(notice);
                debug!(?outcome, "receipt observed");
                ui::draw(ui_state, &app.snapshot())
                    .wrap_err("draw after receipt failed")?;
            }
            _ = time::sleep_until(crack_deadline.unwrap_or_else(Instant::now)),
                if crack_deadline.is_some() =>
            {
                crack_deadline = None;
                app.controller.finish_crack_animation();
                ui::draw(ui_state, &app.snapshot())
                    .wrap_err("draw after crack animation failed")?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
            raw_ev = ui::next_raw_event(input_events) => {
                let event = raw_ev?;
                let Some(ev) = ui::interpret_event(ui_state, event) else {
                    continue;
                };
                let prompts = match ev {
                    UserEvent::Quit => break,
                    UserEvent::Redraw => false,
                    UserEvent::Share => {
                        app.controller.share();
                        false
                    }
                    UserEvent::Connect => true,
                    UserEvent::Crack | UserEvent::Mint => !app.controller.is_connected(),
                };
                if !matches!(ev, UserEvent::Redraw | UserEvent::Share) {
                    if prompts {
                        suspend_terminal(ui_state, input_events)?;
                    }
                    let outcome = match ev {
                        UserEvent::Connect => app.controller.connect().await,
                        UserEvent::Crack => app.controller.crack().await,
                        _ => app.mint(ui_state).await?,
                    };
                    if prompts {
                        resume_terminal(ui_state, input_events)?;
                    }
                    debug!(?outcome, "intent handled");
                    match outcome {
                        Outcome::Cracked(_) => {
                            crack_deadline = Some(Instant::now() + CRACK_ANIMATION);
                        }
                        Outcome::Connected(_) => app.check_mint_price().await,
                        _ => {}
                    }
                }
                ui::draw(ui_state, &app.snapshot())
                    .wrap_err("draw after user event failed")?;
            }
        }
    }
    Ok(())
}
