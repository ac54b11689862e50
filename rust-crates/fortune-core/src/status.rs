use crate::{
    error::MintError,
    lifecycle::{
        MintAttemptResult,
        MintPhase,
    },
};

pub const WAITING_FOR_WALLET: &str = "Waiting for wallet confirmation...";
pub const CONFIRMING: &str = "Minting your fortune...";
pub const CONFIRMED_WITHOUT_TOKEN: &str = "Mint confirmed. Fortune sealed onchain.";

/// Banner text for the current lifecycle state. Errors take precedence.
pub fn status_label(
    phase: MintPhase,
    error: Option<&MintError>,
    result: Option<&MintAttemptResult>,
) -> Option<String> {
    if let Some(error) = error {
        return Some(format!("Error: {}", error.message));
    }
    match phase {
        MintPhase::AwaitingWalletApproval => Some(WAITING_FOR_WALLET.to_string()),
        MintPhase::AwaitingConfirmation => Some(CONFIRMING.to_string()),
        MintPhase::Confirmed => match result.and_then(|r| r.token_id.as_deref()) {
            Some(token_id) => Some(format!("Mint confirmed · Token #{token_id}")),
            None => Some(CONFIRMED_WITHOUT_TOKEN.to_string()),
        },
        MintPhase::Idle => None,
    }
}

/// Label of the primary button: connect, crack, or mint the fortune on display.
pub fn cta_label(
    connected: bool,
    has_cracked: bool,
    has_fortune: bool,
    fee_label: &str,
) -> String {
    if !connected {
        String::from("Connect wallet to crack cookies")
    } else if has_fortune {
        format!("Mint this fortune ({fee_label})")
    } else if has_cracked {
        String::from("Crack again")
    } else {
        String::from("Crack your fortune cookie")
    }
}

/// Renders an integer amount with `decimal_places` implied decimals, trimming zeros.
pub fn format_base_units(amount: u64, decimal_places: u32) -> String {
    let one_unit = 10u64.saturating_pow(decimal_places);
    let whole = amount / one_unit;
    let fractional = amount % one_unit;
    if fractional == 0 {
        format!("{whole}")
    } else {
        let width = decimal_places as usize;
        format!(
            "{}.{}",
            whole,
            format!("{fractional:0width$}").trim_end_matches('0')
        )
    }
}
