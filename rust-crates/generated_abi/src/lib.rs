use fuels::{
    accounts::wallet::Wallet,
    macros::abigen,
    types::ContractId,
};

pub mod holiday_fortune_types {
    use super::*;

    abigen!(Contract(
        name = "HolidayFortune",
        abi = "sway-projects/holiday-fortune/holiday-fortune-abi.json"
    ));
}

pub use holiday_fortune_types::{
    FortuneMinted,
    HolidayFortune,
};

/// Receipt `rb` value identifying a logged `FortuneMinted`.
pub const FORTUNE_MINTED_LOG_ID: u64 = 1515321061603883997;

pub const FORTUNE_MINTED_EVENT: &str = "FortuneMinted";

pub fn holiday_fortune_instance(
    id: ContractId,
    wallet: Wallet,
) -> HolidayFortune<Wallet> {
    HolidayFortune::new(id, wallet)
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    const ABI: &str = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../sway-projects/holiday-fortune/holiday-fortune-abi.json"
    ));

    #[test]
    fn fortune_minted_log_id__matches_abi() {
        // given
        let abi: serde_json::Value = serde_json::from_str(ABI).unwrap();

        // when
        let logged = abi["loggedTypes"].as_array().unwrap();

        // then
        assert_eq!(logged.len(), 1);
        let log_id: u64 = logged[0]["logId"].as_str().unwrap().parse().unwrap();
        assert_eq!(log_id, FORTUNE_MINTED_LOG_ID);
    }

    #[test]
    fn mint__is_payable() {
        let abi: serde_json::Value = serde_json::from_str(ABI).unwrap();
        let mint = abi["functions"]
            .as_array()
            .unwrap()
            .iter()
            .find(|f| f["name"] == "mint")
            .unwrap();
        let payable = mint["attributes"]
            .as_array()
            .unwrap()
            .iter()
            .any(|attr| attr["name"] == "payable");
        assert!(payable);
    }
}
