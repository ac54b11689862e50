use anyhow::{
    Context,
    Result,
    anyhow,
};
use chrono::Utc;
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    fmt,
    fs,
    path::{
        Path,
        PathBuf,
    },
};

pub const DEPLOYMENTS_ROOT: &str = ".deployments";
const DEPLOYMENTS_FILE: &str = "deployments.json";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeploymentEnv {
    Dev,
    Test,
    Local,
}

impl DeploymentEnv {
    pub fn dir_name(self) -> &'static str {
        match self {
            DeploymentEnv::Dev => "dev",
            DeploymentEnv::Test => "test",
            DeploymentEnv::Local => "local",
        }
    }
}

impl fmt::Display for DeploymentEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeploymentEnv::Dev => "Devnet",
            DeploymentEnv::Test => "Testnet",
            DeploymentEnv::Local => "Local",
        };
        write!(f, "{name}")
    }
}

/// Where the fortune contract lives on one network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    /// When this record was written, which may be later than the contract deployment.
    #[serde(alias = "deployed_at")]
    pub recorded_at: String,
    pub contract_id: String,
    pub network_url: String,
    #[serde(default)]
    pub mint_fee: Option<u64>,
}

impl DeploymentRecord {
    pub fn new(
        contract_id: impl Into<String>,
        network_url: impl Into<String>,
        mint_fee: Option<u64>,
    ) -> Self {
        Self {
            recorded_at: Utc::now().to_rfc3339(),
            contract_id: contract_id.into(),
            network_url: network_url.into(),
            mint_fee,
        }
    }
}

#[derive(Debug)]
pub struct DeploymentStore {
    path: PathBuf,
}

impl DeploymentStore {
    /// Store under `.deployments/` in the working directory.
    pub fn new(env: DeploymentEnv) -> Result<Self> {
        Self::new_in(DEPLOYMENTS_ROOT, env)
    }

    pub fn new_in(root: impl AsRef<Path>, env: DeploymentEnv) -> Result<Self> {
        let env_dir = root.as_ref().join(env.dir_name());
        fs::create_dir_all(&env_dir).with_context(|| {
            format!("Failed to create deployments directory {}", env_dir.display())
        })?;
        Ok(Self {
            path: env_dir.join(DEPLOYMENTS_FILE),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<DeploymentRecord>> {
        if !self.path.exists() {
            return Ok(None);
        }
        read_record(&self.path)
    }

    pub fn save(&self, record: &DeploymentRecord) -> Result<()> {
        write_record(&self.path, record)?;
        tracing::debug!(
            contract_id = %record.contract_id,
            path = %self.path.display(),
            "saved deployment record"
        );
        Ok(())
    }

    /// Saves `contract_id` unless it is already the recorded one.
    pub fn record_contract(
        &self,
        contract_id: &str,
        network_url: &str,
        mint_fee: Option<u64>,
    ) -> Result<DeploymentRecord> {
        if let Some(existing) = self.load()?
            && existing.contract_id == contract_id
            && existing.network_url == network_url
            && (mint_fee.is_none() || existing.mint_fee == mint_fee)
        {
            return Ok(existing);
        }
        let record = DeploymentRecord::new(contract_id, network_url, mint_fee);
        self.save(&record)?;
        Ok(record)
    }
}

fn read_record(path: &Path) -> Result<Option<DeploymentRecord>> {
    let data = fs::read(path).context("Failed to read deployment record")?;
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice::<DeploymentRecord>(&data).map(Some).map_err(|e| {
        anyhow!(
            "Failed to parse deployment record {}: {e}",
            path.display()
        )
    })
}

fn write_record(path: &Path, record: &DeploymentRecord) -> Result<()> {
    let json = serde_json::to_vec_pretty(record)
        .context("Failed to serialize deployment record")?;
    fs::write(path, json).context("Failed to write deployment record")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn load__no_record_yet__returns_none() {
        // given
        let dir = TempDir::new("deployments").unwrap();
        let store = DeploymentStore::new_in(dir.path(), DeploymentEnv::Local).unwrap();

        // when
        let loaded = store.load().unwrap();

        // then
        assert!(loaded.is_none());
        assert!(store.path().starts_with(dir.path().join("local")));
    }

    #[test]
    fn record_contract__then_load__returns_saved_record() {
        // given
        let dir = TempDir::new("deployments").unwrap();
        let store = DeploymentStore::new_in(dir.path(), DeploymentEnv::Test).unwrap();

        // when
        store
            .record_contract("0xfeed", "https://testnet.fuel.network", Some(100_000))
            .unwrap();

        // then
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.contract_id, "0xfeed");
        assert_eq!(loaded.network_url, "https://testnet.fuel.network");
        assert_eq!(loaded.mint_fee, Some(100_000));
    }

    #[test]
    fn record_contract__same_contract__keeps_original_timestamp() {
        // given
        let dir = TempDir::new("deployments").unwrap();
        let store = DeploymentStore::new_in(dir.path(), DeploymentEnv::Dev).unwrap();
        let first = store.record_contract("0xfeed", "http://node", None).unwrap();

        // when
        let second = store.record_contract("0xfeed", "http://node", None).unwrap();

        // then
        assert_eq!(first, second);
    }

    #[test]
    fn load__record_without_fee__defaults_to_none() {
        // given
        let dir = TempDir::new("deployments").unwrap();
        let store = DeploymentStore::new_in(dir.path(), DeploymentEnv::Dev).unwrap();
        fs::write(
            store.path(),
            r#"{"recorded_at":"2024-12-01T00:00:00Z","contract_id":"0xabc","network_url":"http://node"}"#,
        )
        .unwrap();

        // when
        let loaded = store.load().unwrap().unwrap();

        // then
        assert_eq!(loaded.mint_fee, None);
    }

    #[test]
    fn load__legacy_deployed_at_key__reads_as_recorded_at() {
        // given
        let dir = TempDir::new("deployments").unwrap();
        let store = DeploymentStore::new_in(dir.path(), DeploymentEnv::Dev).unwrap();
        fs::write(
            store.path(),
            r#"{"deployed_at":"2024-12-01T00:00:00Z","contract_id":"0xabc","network_url":"http://node","mint_fee":5}"#,
        )
        .unwrap();

        // when
        let loaded = store.load().unwrap().unwrap();

        // then
        assert_eq!(loaded.recorded_at, "2024-12-01T00:00:00Z");
        assert_eq!(loaded.mint_fee, Some(5));
    }

    #[test]
    fn save__writes_recorded_at_key() {
        // given
        let dir = TempDir::new("deployments").unwrap();
        let store = DeploymentStore::new_in(dir.path(), DeploymentEnv::Dev).unwrap();

        // when
        store.record_contract("0xabc", "http://node", None).unwrap();

        // then
        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"recorded_at\""));
        assert!(!raw.contains("deployed_at"));
    }

    #[test]
    fn load__garbage__is_an_error() {
        let dir = TempDir::new("deployments").unwrap();
        let store = DeploymentStore::new_in(dir.path(), DeploymentEnv::Dev).unwrap();
        fs::write(store.path(), "not json").unwrap();

        assert!(store.load().is_err());
    }
}
