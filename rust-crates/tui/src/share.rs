use fortune_core::{
    SharePayload,
    SocialComposer,
};
use std::sync::{
    Arc,
    Mutex,
    PoisonError,
};
use tracing::{
    info,
    warn,
};
use url::Url;

pub const WARPCAST_COMPOSE_URL: &str = "https://warpcast.com/~/compose";

pub fn compose_url(payload: &SharePayload) -> Result<Url, url::ParseError> {
    let params = std::iter::once(("text", payload.text.as_str())).chain(
        payload
            .embeds
            .iter()
            .map(|embed| ("embeds[]", embed.as_str())),
    );
    Url::parse_with_params(WARPCAST_COMPOSE_URL, params)
}

/// Turns share payloads into Warpcast compose links the user can open.
#[derive(Clone, Debug, Default)]
pub struct WarpcastComposer {
    latest: Arc<Mutex<Option<String>>>,
}

impl WarpcastComposer {
    pub fn latest_link(&self) -> Option<String> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SocialComposer for WarpcastComposer {
    fn compose(&self, payload: &SharePayload) {
        match compose_url(payload) {
            Ok(url) => {
                info!(%url, "share link ready");
                *self.latest.lock().unwrap_or_else(PoisonError::into_inner) =
                    Some(url.to_string());
            }
            Err(err) => warn!(error = %err, "failed to build share link"),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use proptest::prelude::*;

    fn payload(text: &str) -> SharePayload {
        SharePayload {
            text: text.to_string(),
            embeds: vec![String::from("https://cookies.example/cookie.png")],
        }
    }

    #[test]
    fn compose__stores_encoded_link() {
        // given
        let composer = WarpcastComposer::default();

        // when
        composer.compose(&payload("HODL & \"chill\" 🍪\nhttps://cookies.example"));

        // then
        let link = composer.latest_link().unwrap();
        assert!(link.starts_with("https://warpcast.com/~/compose?text="));
        assert!(link.contains("embeds%5B%5D=https%3A%2F%2Fcookies.example%2Fcookie.png"));
        assert!(!link.contains(' '));
        assert!(!link.contains('\n'));
    }

    #[test]
    fn latest_link__nothing_shared__is_none() {
        assert!(WarpcastComposer::default().latest_link().is_none());
    }

    proptest! {
        #[test]
        fn compose_url__any_text__survives_query_parsing(text in ".*") {
            let url = compose_url(&payload(&text)).unwrap();
            let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
            prop_assert_eq!(pairs[0].clone(), (String::from("text"), text));
            prop_assert_eq!(pairs[1].0.as_str(), "embeds[]");
        }
    }
}
