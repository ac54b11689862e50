use rand::{
    Rng,
    SeedableRng,
    rngs::StdRng,
};
use std::fmt;

/// Holiday crypto puns a cookie can hold.
pub const HOLIDAY_FORTUNES: &[&str] = &[
    "HODL your cookies",
    "To the moon, one bite at a time",
    "Your portfolio will be merry and bright",
    "A gas-free holiday is coming your way",
    "Sleigh the market, not your seed phrase",
    "Santa checks his ledger twice, so should you",
    "Diamond hands keep the cocoa warm",
    "Not your keys, not your cookies",
    "The blockchain remembers every snowflake",
    "Your next block will bring good tidings",
    "Jingle all the way to finality",
    "Stake your claim under the mistletoe",
    "Fortune favors the well-audited",
    "A bull run is hiding in your stocking",
    "May your wallet be full and your fees be low",
    "Peace on earth, consensus on chain",
    "Deck the halls with decentralized ledgers",
    "An airdrop of joy is in your forecast",
    "Your mempool will overflow with good cheer",
    "Even reindeer need a cold wallet",
    "Rudolph's nose lights the path to mainnet",
    "Snowflakes are unique, so are your tokens",
    "Trust the process, verify the cookie",
    "A merkle proof of your good deeds is on its way",
    "Wrap your gifts, not your tokens",
    "This cookie was minted with love and low latency",
    "Eggnog first, rebalance later",
    "Your seed phrase is safer than Santa's list",
    "Holiday spirits rise faster than gas prices",
    "One cookie a day keeps the bear market away",
];

/// A fortune pulled from a cracked cookie.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fortune(String);

impl Fortune {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fortune {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Fortune {
    fn from(text: &str) -> Self {
        Self(text.to_owned())
    }
}

pub struct FortuneGenerator {
    corpus: &'static [&'static str],
    rng: StdRng,
}

impl fmt::Debug for FortuneGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FortuneGenerator")
            .field("corpus_len", &self.corpus.len())
            .finish()
    }
}

impl FortuneGenerator {
    /// Generator over [`HOLIDAY_FORTUNES`] seeded from the OS.
    pub fn holiday() -> Self {
        Self {
            corpus: HOLIDAY_FORTUNES,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible generator over [`HOLIDAY_FORTUNES`].
    pub fn seeded(seed: u64) -> Self {
        Self {
            corpus: HOLIDAY_FORTUNES,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Returns `None` for an empty corpus or one containing blank entries.
    pub fn with_corpus(corpus: &'static [&'static str], rng: StdRng) -> Option<Self> {
        if corpus.is_empty() || corpus.iter().any(|entry| entry.trim().is_empty()) {
            return None;
        }
        Some(Self { corpus, rng })
    }

    pub fn corpus(&self) -> &'static [&'static str] {
        self.corpus
    }

    pub fn generate(&mut self) -> Fortune {
        let idx = self.rng.random_range(0..self.corpus.len());
        Fortune::from(self.corpus[idx])
    }
}
