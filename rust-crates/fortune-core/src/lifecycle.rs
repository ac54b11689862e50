use crate::{
    collaborators::{
        ConnectorOption,
        LogDecoder,
        MintCall,
        Receipt,
        SocialComposer,
        TransactionSubmitter,
        TxRef,
        WalletAddress,
        WalletConnector,
    },
    error::{
        MintError,
        MintErrorKind,
    },
    fortune::{
        Fortune,
        FortuneGenerator,
    },
    share::{
        ShareSettings,
        share_payload,
    },
    status,
};
use tokio::sync::mpsc;
use tracing::{
    debug,
    info,
    warn,
};

pub use watch::{
    ReceiptNotice,
    ReceiptNotices,
    ReceiptWatch,
};

mod watch;


pub const DEFAULT_MINT_FUNCTION: &str = "mint";
pub const DEFAULT_EVENT_NAME: &str = "FortuneMinted";
pub const DEFAULT_TOKEN_ID_FIELD: &str = "token_id";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MintPhase {
    #[default]
    Idle,
    AwaitingWalletApproval,
    AwaitingConfirmation,
    Confirmed,
}

impl MintPhase {
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            MintPhase::AwaitingWalletApproval | MintPhase::AwaitingConfirmation
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MintAttemptResult {
    pub fortune: Fortune,
    pub token_id: Option<String>,
    pub tx_ref: TxRef,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CrackState {
    pub has_cracked: bool,
    pub is_cracking: bool,
}

/// Contract constants the lifecycle depends on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MintSettings {
    pub contract_id: String,
    /// Fee paid with each mint, in base-asset units.
    pub mint_fee: u64,
    pub fee_decimals: u32,
    pub fee_symbol: String,
    pub mint_function: String,
    pub event_name: String,
    pub token_id_field: String,
    pub explorer_url: Option<String>,
}

impl MintSettings {
    pub fn new(contract_id: impl Into<String>, mint_fee: u64) -> Self {
        Self {
            contract_id: contract_id.into(),
            mint_fee,
            fee_decimals: 9,
            fee_symbol: String::from("ETH"),
            mint_function: String::from(DEFAULT_MINT_FUNCTION),
            event_name: String::from(DEFAULT_EVENT_NAME),
            token_id_field: String::from(DEFAULT_TOKEN_ID_FIELD),
            explorer_url: None,
        }
    }

    pub fn with_explorer_url(mut self, url: impl Into<String>) -> Self {
        self.explorer_url = Some(url.into());
        self
    }
}

#[derive(Debug)]
pub struct Collaborators<W, S, D, C> {
    pub wallet: W,
    pub submitter: S,
    pub decoder: D,
    pub composer: C,
}

/// What a user intent or notification ended up doing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Cracked(Fortune),
    Connected(WalletAddress),
    Submitted(TxRef),
    Confirmed(MintAttemptResult),
    Failed(MintErrorKind),
    /// A mint is in flight; the intent was rejected.
    Busy,
    /// Stale or out-of-phase input with no effect.
    Ignored,
}

/// First step of a mint: either a call to submit, or the intent it degrades into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MintStart {
    Submit(MintCall),
    Crack,
    Connect,
    Busy,
}

pub struct MintController<W, S, D, C> {
    wallet: W,
    submitter: S,
    decoder: D,
    composer: C,
    generator: FortuneGenerator,
    settings: MintSettings,
    share: ShareSettings,
    phase: MintPhase,
    crack: CrackState,
    fortune: Option<Fortune>,
    pending_fortune: Option<Fortune>,
    tx_ref: Option<TxRef>,
    result: Option<MintAttemptResult>,
    error: Option<MintError>,
    notices: mpsc::UnboundedSender<ReceiptNotice>,
    watch: Option<ReceiptWatch>,
}

impl<W, S, D, C> MintController<W, S, D, C> {
    pub fn new(
        collaborators: Collaborators<W, S, D, C>,
        generator: FortuneGenerator,
        settings: MintSettings,
        share: ShareSettings,
    ) -> (Self, ReceiptNotices) {
        let Collaborators {
            wallet,
            submitter,
            decoder,
            composer,
        } = collaborators;
        let (notices, receiver) = mpsc::unbounded_channel();
        let controller = Self {
            wallet,
            submitter,
            decoder,
            composer,
            generator,
            settings,
            share,
            phase: MintPhase::Idle,
            crack: CrackState::default(),
            fortune: None,
            pending_fortune: None,
            tx_ref: None,
            result: None,
            error: None,
            notices,
            watch: None,
        };
        (controller, receiver)
    }

    pub fn phase(&self) -> MintPhase {
        self.phase
    }

    pub fn crack_state(&self) -> CrackState {
        self.crack
    }

    pub fn fortune(&self) -> Option<&Fortune> {
        self.fortune.as_ref()
    }

    pub fn pending_fortune(&self) -> Option<&Fortune> {
        self.pending_fortune.as_ref()
    }

    pub fn tx_ref(&self) -> Option<&TxRef> {
        self.tx_ref.as_ref()
    }

    pub fn result(&self) -> Option<&MintAttemptResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&MintError> {
        self.error.as_ref()
    }

    pub fn settings(&self) -> &MintSettings {
        &self.settings
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    pub fn status_label(&self) -> Option<String> {
        status::status_label(self.phase, self.error.as_ref(), self.result.as_ref())
    }

    pub fn fee_label(&self) -> String {
        format!(
            "{} {}",
            status::format_base_units(self.settings.mint_fee, self.settings.fee_decimals),
            self.settings.fee_symbol
        )
    }

    pub fn explorer_link(&self) -> Option<String> {
        let base = self.settings.explorer_url.as_deref()?;
        let result = self.result.as_ref()?;
        Some(format!("{}/tx/{}", base.trim_end_matches('/'), result.tx_ref))
    }

    /// Ends the cosmetic crack animation; no lifecycle effect.
    pub fn finish_crack_animation(&mut self) {
        self.crack.is_cracking = false;
    }

    fn crack_now(&mut self) -> Outcome {
        if self.phase.is_in_flight() {
            debug!(phase = ?self.phase, "crack ignored while a mint is in flight");
            return Outcome::Busy;
        }
        self.result = None;
        self.error = None;
        self.pending_fortune = None;
        self.tx_ref = None;
        self.watch = None;
        self.phase = MintPhase::Idle;

        let fortune = self.generator.generate();
        self.crack = CrackState {
            has_cracked: true,
            is_cracking: true,
        };
        self.fortune = Some(fortune.clone());
        debug!(%fortune, "cookie cracked");
        Outcome::Cracked(fortune)
    }
}

impl<W, S, D, C> MintController<W, S, D, C>
where
    W: WalletConnector,
{
    pub fn is_connected(&self) -> bool {
        self.wallet.connection().is_some()
    }

    pub fn cta_label(&self) -> String {
        status::cta_label(
            self.is_connected(),
            self.crack.has_cracked,
            self.fortune.is_some(),
            &self.fee_label(),
        )
    }

    pub async fn connect(&mut self) -> Outcome {
        let options = match self.wallet.options().await {
            Ok(options) => options,
            Err(err) => {
                warn!(error = %err, "listing wallet options failed");
                self.error = Some(MintError::connection(&err));
                return Outcome::Failed(MintErrorKind::ConnectionFailed);
            }
        };
        let Some(option) = preferred_option(&options).cloned() else {
            warn!("no wallet options available");
            self.error = Some(MintError::no_connector());
            return Outcome::Failed(MintErrorKind::NoConnectorAvailable);
        };
        match self.wallet.connect(&option).await {
            Ok(address) => {
                info!(%address, wallet = %option.name, "wallet connected");
                if matches!(
                    self.error.as_ref().map(|e| e.kind),
                    Some(
                        MintErrorKind::ConnectionFailed
                            | MintErrorKind::NoConnectorAvailable
                    )
                ) {
                    self.error = None;
                }
                Outcome::Connected(address)
            }
            Err(err) => {
                warn!(error = %err, wallet = %option.name, "wallet connection failed");
                self.error = Some(MintError::connection(&err));
                Outcome::Failed(MintErrorKind::ConnectionFailed)
            }
        }
    }

    /// Cracks a new cookie, or connects first when no wallet is connected.
    pub async fn crack(&mut self) -> Outcome {
        if !self.is_connected() {
            return self.connect().await;
        }
        self.crack_now()
    }

    pub fn begin_mint(&mut self) -> MintStart {
        if self.phase.is_in_flight() {
            debug!(phase = ?self.phase, "mint ignored while another is in flight");
            return MintStart::Busy;
        }
        let Some(fortune) = self.fortune.clone() else {
            return MintStart::Crack;
        };
        if !self.is_connected() {
            return MintStart::Connect;
        }
        self.error = None;
        self.pending_fortune = Some(fortune.clone());
        self.phase = MintPhase::AwaitingWalletApproval;
        MintStart::Submit(MintCall {
            contract_id: self.settings.contract_id.clone(),
            function: self.settings.mint_function.clone(),
            fortune,
            value: self.settings.mint_fee,
        })
    }
}

impl<W, S, D, C> MintController<W, S, D, C>
where
    W: WalletConnector,
    S: TransactionSubmitter + Clone + Send + Sync + 'static,
{
    pub async fn submit(&mut self, call: MintCall) -> Outcome {
        if self.phase != MintPhase::AwaitingWalletApproval {
            warn!(phase = ?self.phase, "submit called outside of wallet approval");
            return Outcome::Ignored;
        }
        match self.submitter.submit(&call).await {
            Ok(tx_ref) => {
                info!(%tx_ref, fortune = %call.fortune, fee = call.value, "mint submitted");
                self.tx_ref = Some(tx_ref.clone());
                self.phase = MintPhase::AwaitingConfirmation;
                self.watch = Some(ReceiptWatch::spawn(
                    self.submitter.clone(),
                    tx_ref.clone(),
                    self.notices.clone(),
                ));
                Outcome::Submitted(tx_ref)
            }
            Err(err) => {
                warn!(error = %err, "mint submission failed");
                self.phase = MintPhase::Idle;
                self.pending_fortune = None;
                self.error = Some(MintError::submission(&err));
                Outcome::Failed(MintErrorKind::SubmissionFailed)
            }
        }
    }

    pub async fn mint(&mut self) -> Outcome {
        match self.begin_mint() {
            MintStart::Submit(call) => self.submit(call).await,
            MintStart::Crack => self.crack().await,
            MintStart::Connect => self.connect().await,
            MintStart::Busy => Outcome::Busy,
        }
    }
}

impl<W, S, D, C> MintController<W, S, D, C>
where
    D: LogDecoder,
{
    pub fn observe_receipt(&mut self, notice: ReceiptNotice) -> Outcome {
        if self.phase != MintPhase::AwaitingConfirmation
            || self.tx_ref.as_ref() != Some(&notice.tx_ref)
        {
            debug!(tx_ref = %notice.tx_ref, phase = ?self.phase, "ignoring stale receipt");
            return Outcome::Ignored;
        }
        self.watch = None;

        let receipt = match notice.outcome {
            Ok(receipt) => receipt,
            Err(err) => {
                warn!(tx_ref = %notice.tx_ref, error = %err, "mint transaction failed");
                self.phase = MintPhase::Idle;
                self.pending_fortune = None;
                self.tx_ref = None;
                self.error = Some(MintError::confirmation(&err));
                return Outcome::Failed(MintErrorKind::ConfirmationFailed);
            }
        };

        let token_id = self.extract_token_id(&receipt);
        let Some(fortune) = self.pending_fortune.take().or_else(|| self.fortune.clone())
        else {
            warn!(tx_ref = %notice.tx_ref, "confirmed mint has no fortune on record");
            self.phase = MintPhase::Idle;
            return Outcome::Ignored;
        };
        let result = MintAttemptResult {
            fortune,
            token_id,
            tx_ref: notice.tx_ref,
        };
        info!(
            tx_ref = %result.tx_ref,
            token_id = ?result.token_id,
            "mint confirmed"
        );
        self.fortune = None;
        self.phase = MintPhase::Confirmed;
        self.result = Some(result.clone());
        Outcome::Confirmed(result)
    }

    /// Last decoded event wins; a missing field or decode error leaves the id absent.
    fn extract_token_id(&self, receipt: &Receipt) -> Option<String> {
        let events = match self.decoder.decode(&self.settings.event_name, &receipt.logs) {
            Ok(events) => events,
            Err(err) => {
                warn!(tx_ref = %receipt.tx_ref, error = %err, "failed to parse mint logs");
                return None;
            }
        };
        let token_id = events
            .last()
            .and_then(|event| event.field(&self.settings.token_id_field))
            .map(str::to_string);
        if token_id.is_none() {
            debug!(
                tx_ref = %receipt.tx_ref,
                events = events.len(),
                "no token id found in mint logs"
            );
        }
        token_id
    }
}

impl<W, S, D, C> MintController<W, S, D, C>
where
    C: SocialComposer,
{
    pub fn share(&self) {
        let payload = share_payload(self.result.as_ref(), &self.share);
        info!(minted = self.result.is_some(), "sharing fortune");
        self.composer.compose(&payload);
    }
}

fn preferred_option(options: &[ConnectorOption]) -> Option<&ConnectorOption> {
    options
        .iter()
        .find(|option| option.ready)
        .or_else(|| options.first())
}
