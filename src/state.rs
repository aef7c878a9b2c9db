use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::warn;

use crate::config::{AccountsConfig, SheetsConfig};
use crate::db;
use crate::scan::scanner::{NmapScanner, PortScanner};
use crate::sheets::store::UserSheetStore;

#[derive(Clone)]
pub struct AccountsState {
    pub db: SqlitePool,
    pub config: Arc<AccountsConfig>,
}

impl AccountsState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AccountsConfig::from_env()?);
        let db = db::connect(&config.database_url).await?;
        db::migrate(&db).await?;
        Ok(Self { db, config })
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AccountsConfig>) -> Self {
        Self { db, config }
    }
}

#[derive(Clone)]
pub struct SheetsState {
    pub store: Arc<UserSheetStore>,
    pub scanner: Arc<dyn PortScanner>,
    pub config: Arc<SheetsConfig>,
}

impl SheetsState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(SheetsConfig::from_env()?);
        if config.api_key.is_none() {
            warn!("API_KEY not set; register, login and scan are open to anyone");
        }
        let store = Arc::new(UserSheetStore::new(&config.sheet_path));
        let scanner = Arc::new(NmapScanner::new(&config.nmap_path)) as Arc<dyn PortScanner>;
        Ok(Self {
            store,
            scanner,
            config,
        })
    }

    pub fn from_parts(
        store: Arc<UserSheetStore>,
        scanner: Arc<dyn PortScanner>,
        config: Arc<SheetsConfig>,
    ) -> Self {
        Self {
            store,
            scanner,
            config,
        }
    }
}
