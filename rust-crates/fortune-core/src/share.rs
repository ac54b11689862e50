use crate::{
    collaborators::SharePayload,
    lifecycle::MintAttemptResult,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareSettings {
    /// Display name of the chain fortunes are minted on.
    pub chain_name: String,
    pub app_url: String,
    pub image_url: String,
}

pub fn share_payload(
    result: Option<&MintAttemptResult>,
    settings: &ShareSettings,
) -> SharePayload {
    let text = match result {
        Some(result) => format!(
            "Minted a Holiday Fortune Cookie on {}: \"{}\" 🍪🔮\n{}",
            settings.chain_name, result.fortune, settings.app_url
        ),
        None => format!(
            "Crack a Holiday Fortune Cookie and mint your crypto pun on {}!\n{}",
            settings.chain_name, settings.app_url
        ),
    };
    SharePayload {
        text,
        embeds: vec![settings.image_url.clone()],
    }
}
