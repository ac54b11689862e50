//! Crack-and-mint lifecycle for holiday fortune cookies.
//!
//! The [`lifecycle::MintController`] drives a cookie from cracked, through wallet
//! approval and on-chain confirmation, to a shareable result. Wallet, chain and social
//! integrations are injected through the traits in [`collaborators`].

pub mod collaborators;
pub mod error;
pub mod fortune;
pub mod lifecycle;
pub mod share;
pub mod status;

pub use collaborators::{
    CollaboratorResult,
    ConnectorOption,
    DecodedEvent,
    LogDecoder,
    LogEntry,
    MintCall,
    Receipt,
    SharePayload,
    SocialComposer,
    TransactionSubmitter,
    TxRef,
    WalletAddress,
    WalletConnector,
};
pub use error::{
    CollaboratorError,
    DecodeError,
    MintError,
    MintErrorKind,
};
pub use fortune::{
    Fortune,
    FortuneGenerator,
    HOLIDAY_FORTUNES,
};
pub use lifecycle::{
    Collaborators,
    CrackState,
    MintAttemptResult,
    MintController,
    MintPhase,
    MintSettings,
    MintStart,
    Outcome,
    ReceiptNotice,
    ReceiptNotices,
};
pub use share::ShareSettings;
