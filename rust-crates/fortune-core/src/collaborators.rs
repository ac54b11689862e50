use crate::{
    error::{
        CollaboratorError,
        DecodeError,
    },
    fortune::Fortune,
};
use std::{
    collections::BTreeMap,
    fmt,
};

pub type CollaboratorResult<T> = std::result::Result<T, CollaboratorError>;

/// Reference to a submitted transaction, e.g. `0x`-prefixed hex id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TxRef(String);

impl TxRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletAddress(String);

impl WalletAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `0x1234...abcd` style preview for narrow displays.
    pub fn truncated(&self) -> String {
        let raw = self.0.as_str();
        if raw.len() <= 10 || !raw.is_ascii() {
            return raw.to_string();
        }
        format!("{}...{}", &raw[..6], &raw[raw.len() - 4..])
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One way of connecting a wallet, as offered by the connector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectorOption {
    pub name: String,
    pub ready: bool,
}

impl ConnectorOption {
    pub fn new(name: impl Into<String>, ready: bool) -> Self {
        Self {
            name: name.into(),
            ready,
        }
    }
}

/// Payable contract call recording a fortune on chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MintCall {
    pub contract_id: String,
    pub function: String,
    pub fortune: Fortune,
    pub value: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    /// Contract that emitted the log.
    pub emitter: String,
    pub log_id: u64,
    pub data: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub tx_ref: TxRef,
    pub logs: Vec<LogEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedEvent {
    pub name: String,
    pub fields: BTreeMap<String, String>,
}

impl DecodedEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.fields.insert(name.into(), value.to_string());
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SharePayload {
    pub text: String,
    pub embeds: Vec<String>,
}

pub trait WalletConnector {
    /// Connection options currently offered, in preference order.
    fn options(&self) -> impl Future<Output = CollaboratorResult<Vec<ConnectorOption>>>;

    fn connect(
        &self,
        option: &ConnectorOption,
    ) -> impl Future<Output = CollaboratorResult<WalletAddress>>;

    /// Address of the connected wallet, if any.
    fn connection(&self) -> Option<WalletAddress>;
}

pub trait TransactionSubmitter {
    fn submit(&self, call: &MintCall) -> impl Future<Output = CollaboratorResult<TxRef>>;

    /// Resolves once the transaction is included. Spawned onto the runtime, hence `Send`.
    fn await_receipt(
        &self,
        tx_ref: &TxRef,
    ) -> impl Future<Output = CollaboratorResult<Receipt>> + Send;
}

pub trait LogDecoder {
    fn decode(
        &self,
        event_name: &str,
        logs: &[LogEntry],
    ) -> Result<Vec<DecodedEvent>, DecodeError>;
}

pub trait SocialComposer {
    fn compose(&self, payload: &SharePayload);
}
