use crate::wallets::WalletSession;
use fortune_core::{
    CollaboratorError,
    CollaboratorResult,
    DecodeError,
    DecodedEvent,
    LogDecoder,
    LogEntry,
    MintCall,
    Receipt,
    TransactionSubmitter,
    TxRef,
    lifecycle::{
        DEFAULT_MINT_FUNCTION,
        DEFAULT_TOKEN_ID_FIELD,
    },
};
use fuels::{
    core::{
        codec::{
            ABIDecoder,
            DecoderConfig,
        },
        traits::{
            Parameterize,
            Tokenizable,
        },
    },
    prelude::{
        AssetId,
        CallParameters,
        ContractId,
        Execution,
        Provider,
        TxPolicies,
        Wallet,
    },
    tx::Receipt as FuelReceipt,
    types::{
        AsciiString,
        Bytes32,
        tx_status::TxStatus,
    },
};
use generated_abi::{
    FORTUNE_MINTED_EVENT,
    FORTUNE_MINTED_LOG_ID,
    FortuneMinted,
    holiday_fortune_instance,
};
use std::{
    fmt::Display,
    str::FromStr,
    time::Duration,
};
use tokio::time;
use tracing::{
    debug,
    info,
    warn,
};

pub const DEFAULT_SAFE_SCRIPT_GAS_LIMIT: u64 = 29_000_000;
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(500);

fn chain_error(context: &str, err: impl Display) -> CollaboratorError {
    CollaboratorError::new(format!("{context}: {err}"))
}

/// `0x`-prefixed lowercase hex, the form used for every id we show or compare.
pub fn hex_id(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

pub fn parse_contract_id(raw: &str) -> CollaboratorResult<ContractId> {
    let trimmed = raw.trim();
    let cleaned = trimmed.trim_start_matches("fuel");
    ContractId::from_str(cleaned)
        .map_err(|e| CollaboratorError::new(format!("Invalid contract id '{raw}': {e:?}")))
}

/// Submits `mint` calls with the session wallet and polls the node for receipts.
#[derive(Clone)]
pub struct FuelMinter {
    provider: Provider,
    session: WalletSession,
    base_asset_id: AssetId,
    script_gas_limit: u64,
    poll_interval: Duration,
}

impl FuelMinter {
    pub async fn new(provider: Provider, session: WalletSession) -> CollaboratorResult<Self> {
        let consensus_parameters = provider
            .consensus_parameters()
            .await
            .map_err(|e| chain_error("Failed to fetch consensus parameters", e))?;
        let base_asset_id = *consensus_parameters.base_asset_id();
        Ok(Self {
            provider,
            session,
            base_asset_id,
            script_gas_limit: DEFAULT_SAFE_SCRIPT_GAS_LIMIT,
            poll_interval: RECEIPT_POLL_INTERVAL,
        })
    }

    fn wallet(&self) -> CollaboratorResult<Wallet> {
        self.session
            .current()
            .ok_or_else(|| CollaboratorError::new("Wallet is not connected"))
    }

    /// Reads the contract's configured price; needs a connected wallet.
    pub async fn mint_price(&self, contract_id: &str) -> CollaboratorResult<u64> {
        let contract_id = parse_contract_id(contract_id)?;
        let instance = holiday_fortune_instance(contract_id, self.wallet()?);
        let price = instance
            .methods()
            .mint_price()
            .simulate(Execution::state_read_only())
            .await
            .map_err(|e| chain_error("Failed to read mint price", e))?
            .value;
        Ok(price)
    }
}

impl TransactionSubmitter for FuelMinter {
    async fn submit(&self, call: &MintCall) -> CollaboratorResult<TxRef> {
        if call.function != DEFAULT_MINT_FUNCTION {
            return Err(CollaboratorError::new(format!(
                "Unsupported contract function '{}'",
                call.function
            )));
        }
        let fortune = AsciiString::new(call.fortune.as_str().to_string())
            .map_err(|e| chain_error("Fortune must be plain ASCII", e))?;
        let contract_id = parse_contract_id(&call.contract_id)?;
        let instance = holiday_fortune_instance(contract_id, self.wallet()?);
        let params = CallParameters::default()
            .with_amount(call.value)
            .with_asset_id(self.base_asset_id);
        let response = instance
            .methods()
            .mint(fortune)
            .call_params(params)
            .map_err(|e| chain_error("Invalid call parameters", e))?
            .with_tx_policies(
                TxPolicies::default().with_script_gas_limit(self.script_gas_limit),
            )
            .submit()
            .await
            .map_err(|e| chain_error("Mint submission failed", e))?;
        let tx_ref = TxRef::new(hex_id(response.tx_id()));
        info!(%tx_ref, fee = call.value, "mint transaction submitted");
        Ok(tx_ref)
    }

    fn await_receipt(
        &self,
        tx_ref: &TxRef,
    ) -> impl Future<Output = CollaboratorResult<Receipt>> + Send {
        let provider = self.provider.clone();
        let poll_interval = self.poll_interval;
        let tx_ref = tx_ref.clone();
        async move {
            let tx_id = Bytes32::from_str(tx_ref.as_str()).map_err(|e| {
                CollaboratorError::new(format!("Invalid transaction id {tx_ref}: {e:?}"))
            })?;
            loop {
                let status = provider
                    .tx_status(&tx_id)
                    .await
                    .map_err(|e| chain_error("Failed to fetch transaction status", e))?;
                if matches!(status, TxStatus::Submitted { .. }) {
                    debug!(%tx_ref, "transaction still pending");
                    time::sleep(poll_interval).await;
                    continue;
                }
                let receipts = status
                    .take_receipts_checked(None)
                    .map_err(|e| chain_error("Mint transaction failed", e))?;
                return Ok(Receipt {
                    logs: log_entries(&receipts),
                    tx_ref,
                });
            }
        }
    }
}

/// Keeps the `LogData` receipts, the only ones carrying ABI-encoded events.
pub fn log_entries(receipts: &[FuelReceipt]) -> Vec<LogEntry> {
    receipts
        .iter()
        .filter_map(|receipt| match receipt {
            FuelReceipt::LogData {
                id,
                rb,
                data: Some(data),
                ..
            } => Some(LogEntry {
                emitter: hex_id(id),
                log_id: *rb,
                data: data.clone(),
            }),
            _ => None,
        })
        .collect()
}

/// Decodes `FortuneMinted` logs emitted by one contract.
pub struct FuelLogDecoder {
    contract: String,
    token_id_field: String,
    decoder: ABIDecoder,
}

impl FuelLogDecoder {
    pub fn new(contract_id: ContractId) -> Self {
        Self {
            contract: hex_id(contract_id),
            token_id_field: String::from(DEFAULT_TOKEN_ID_FIELD),
            decoder: ABIDecoder::new(DecoderConfig::default()),
        }
    }

    /// Field name the decoded token id is exposed under.
    pub fn with_token_id_field(mut self, field: impl Into<String>) -> Self {
        self.token_id_field = field.into();
        self
    }

    fn decode_minted(&self, entry: &LogEntry) -> Result<DecodedEvent, DecodeError> {
        let malformed = |reason: String| DecodeError::Malformed {
            event: FORTUNE_MINTED_EVENT.to_string(),
            emitter: entry.emitter.clone(),
            reason,
        };
        let token = self
            .decoder
            .decode(&FortuneMinted::param_type(), entry.data.as_slice())
            .map_err(|e| malformed(e.to_string()))?;
        let minted = FortuneMinted::from_token(token).map_err(|e| malformed(e.to_string()))?;
        Ok(DecodedEvent::new(FORTUNE_MINTED_EVENT)
            .with_field(&self.token_id_field, minted.token_id)
            .with_field("minter", hex_id(minted.minter.0)))
    }
}

impl LogDecoder for FuelLogDecoder {
    fn decode(
        &self,
        event_name: &str,
        logs: &[LogEntry],
    ) -> Result<Vec<DecodedEvent>, DecodeError> {
        if event_name != FORTUNE_MINTED_EVENT {
            return Err(DecodeError::UnknownEvent(event_name.to_string()));
        }
        let events = logs
            .iter()
            .filter(|entry| {
                entry.emitter == self.contract && entry.log_id == FORTUNE_MINTED_LOG_ID
            })
            .filter_map(|entry| match self.decode_minted(entry) {
                Ok(event) => Some(event),
                Err(err) => {
                    warn!(error = %err, "skipping undecodable mint log");
                    None
                }
            })
            .collect();
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    const CONTRACT: [u8; 32] = [7u8; 32];

    fn minted_bytes(token_id: u64, minter: [u8; 32]) -> Vec<u8> {
        let mut data = token_id.to_be_bytes().to_vec();
        data.extend_from_slice(&minter);
        data
    }

    fn entry(emitter: [u8; 32], log_id: u64, data: Vec<u8>) -> LogEntry {
        LogEntry {
            emitter: hex_id(emitter),
            log_id,
            data,
        }
    }

    fn decoder() -> FuelLogDecoder {
        FuelLogDecoder::new(ContractId::from(CONTRACT))
    }

    #[test]
    fn decode__minted_log__exposes_token_id_and_minter() {
        // given
        let logs = vec![entry(
            CONTRACT,
            FORTUNE_MINTED_LOG_ID,
            minted_bytes(42, [0xab; 32]),
        )];

        // when
        let events = decoder().decode(FORTUNE_MINTED_EVENT, &logs).unwrap();

        // then
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].field("token_id"), Some("42"));
        assert_eq!(events[0].field("minter"), Some(hex_id([0xab; 32]).as_str()));
    }

    #[test]
    fn decode__foreign_emitter_or_log_id__is_skipped() {
        // given
        let logs = vec![
            entry([1u8; 32], FORTUNE_MINTED_LOG_ID, minted_bytes(1, [0; 32])),
            entry(CONTRACT, FORTUNE_MINTED_LOG_ID + 1, minted_bytes(2, [0; 32])),
            entry(CONTRACT, FORTUNE_MINTED_LOG_ID, minted_bytes(3, [0; 32])),
        ];

        // when
        let events = decoder().decode(FORTUNE_MINTED_EVENT, &logs).unwrap();

        // then
        let ids: Vec<_> = events.iter().filter_map(|e| e.field("token_id")).collect();
        assert_eq!(ids, vec!["3"]);
    }

    #[test]
    fn decode_minted__truncated_payload__is_malformed() {
        // given
        let bad = entry(CONTRACT, FORTUNE_MINTED_LOG_ID, vec![0, 0, 1]);

        // when
        let err = decoder().decode_minted(&bad).unwrap_err();

        // then
        assert!(matches!(err, DecodeError::Malformed { .. }));
    }

    #[test]
    fn decode__malformed_entry__is_skipped_and_later_token_kept() {
        // given
        let logs = vec![
            entry(CONTRACT, FORTUNE_MINTED_LOG_ID, minted_bytes(5, [0; 32])),
            entry(CONTRACT, FORTUNE_MINTED_LOG_ID, vec![0, 0, 1]),
            entry(CONTRACT, FORTUNE_MINTED_LOG_ID, minted_bytes(9, [0; 32])),
        ];

        // when
        let events = decoder().decode(FORTUNE_MINTED_EVENT, &logs).unwrap();

        // then
        let ids: Vec<_> = events.iter().filter_map(|e| e.field("token_id")).collect();
        assert_eq!(ids, vec!["5", "9"]);
    }

    #[test]
    fn decode__custom_token_id_field__exposes_token_under_that_name() {
        // given
        let decoder = decoder().with_token_id_field("fortune_id");
        let logs = vec![entry(
            CONTRACT,
            FORTUNE_MINTED_LOG_ID,
            minted_bytes(11, [0; 32]),
        )];

        // when
        let events = decoder.decode(FORTUNE_MINTED_EVENT, &logs).unwrap();

        // then
        assert_eq!(events[0].field("fortune_id"), Some("11"));
        assert_eq!(events[0].field("token_id"), None);
    }

    #[test]
    fn decode__unknown_event_name__errors() {
        let err = decoder().decode("Transfer", &[]).unwrap_err();
        assert_eq!(err, DecodeError::UnknownEvent(String::from("Transfer")));
    }

    #[test]
    fn parse_contract_id__accepts_fuel_prefix() {
        let raw = format!("fuel{}", hex_id(CONTRACT));
        assert_eq!(parse_contract_id(&raw).unwrap(), ContractId::from(CONTRACT));
    }
}
