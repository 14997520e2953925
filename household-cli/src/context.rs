//! Everything a command needs to talk to the server.

use anyhow::Result;

use household_core::alert::AlertCenter;
use household_core::config::ClientConfig;
use household_core::dispatcher::{ListStore, Member};
use household_core::remote::HttpRemote;
use household_core::snapshot::SnapshotCache;
use household_core::Record;

pub struct Context {
    pub config: ClientConfig,
    pub member: Member,
    pub remote: HttpRemote,
    pub alerts: AlertCenter,
}

impl Context {
    pub fn load() -> Result<Self> {
        let config = ClientConfig::load()?;
        let member = config.member().map_err(|e| {
            anyhow::anyhow!(
                "{e}\n\nSet it in {} or through HOUSEHOLD_* environment variables.",
                ClientConfig::config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "the config file".into())
            )
        })?;
        let remote = HttpRemote::new(config.server_url.clone(), config.token.clone())?;

        Ok(Context {
            config,
            member,
            remote,
            alerts: AlertCenter::new(),
        })
    }

    /// A store for `R` with its snapshot already loaded.
    pub async fn store<R: Record>(&self) -> Result<ListStore<R, HttpRemote>> {
        let store = ListStore::new(
            self.remote.clone(),
            self.member.clone(),
            SnapshotCache::default(),
            self.alerts.clone(),
        );
        store.refresh().await?;
        Ok(store)
    }
}
