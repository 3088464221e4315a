//! Application context - dependency injection container

use std::sync::Arc;

use mdsync_core::{CacheInvalidator, ImportService, MasterDataService, Reconciler, ScopeLocks};
use mdsync_domain::{Address, BusinessPartner, Config, MdSyncError, Result};
use mdsync_infra::{
    DbManager, ServiceLayerClient, SqliteAddressRepository, SqliteBusinessPartnerRepository,
    SqliteContactRepository, SqliteImportRepository, SqliteSyncMetaRepository, TagCache,
};
use tracing::info;

use crate::utils::health::{ComponentHealth, HealthStatus};

/// Holds every service the actions call into.
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub cache: Arc<TagCache>,
    pub erp: Arc<ServiceLayerClient>,
    pub partner_sync: Reconciler<BusinessPartner>,
    pub address_sync: Reconciler<Address>,
    pub import: ImportService,
    pub master: MasterDataService,
}

impl AppContext {
    /// Load configuration from the environment (or a config file) and wire
    /// the context.
    pub fn new() -> Result<Self> {
        let config = mdsync_infra::config::load()?;
        Self::from_config(config)
    }

    /// Wire the context from an explicit configuration.
    ///
    /// Opens the pool and runs migrations; no ERP call is made until an
    /// action needs one.
    pub fn from_config(config: Config) -> Result<Self> {
        let db = Arc::new(DbManager::from_config(&config.database)?);
        db.run_migrations()?;

        let cache = Arc::new(TagCache::new(&config.cache));
        let invalidator: Arc<dyn CacheInvalidator> = cache.clone();
        let erp = Arc::new(ServiceLayerClient::from_config(&config.erp)?);

        let partners = Arc::new(SqliteBusinessPartnerRepository::new(Arc::clone(&db)));
        let addresses = Arc::new(SqliteAddressRepository::new(Arc::clone(&db)));
        let contacts = Arc::new(SqliteContactRepository::new(Arc::clone(&db)));
        let checkpoints = Arc::new(SqliteSyncMetaRepository::new(Arc::clone(&db)));
        let import_store = Arc::new(SqliteImportRepository::new(Arc::clone(&db)));

        let mut partner_sync = Reconciler::<BusinessPartner>::new(
            erp.clone(),
            partners.clone(),
            checkpoints.clone(),
            config.erp.partner_query.clone(),
        )
        .with_cache(Arc::clone(&invalidator))
        .with_updated_by(config.sync.updated_by.clone());

        let mut address_sync = Reconciler::<Address>::new(
            erp.clone(),
            addresses.clone(),
            checkpoints,
            config.erp.address_query.clone(),
        )
        .with_cache(Arc::clone(&invalidator))
        .with_updated_by(config.sync.updated_by.clone());

        if config.sync.serialize_scopes {
            let locks = Arc::new(ScopeLocks::new());
            partner_sync = partner_sync.with_scope_locks(Arc::clone(&locks));
            address_sync = address_sync.with_scope_locks(locks);
        }

        let import = ImportService::new(import_store)
            .with_cache(Arc::clone(&invalidator))
            .with_max_batch_size(config.import.max_batch_size)
            .with_manager_check(config.import.excess_manager_check);

        let master = MasterDataService::new(partners, addresses, contacts).with_cache(invalidator);

        info!(
            db_path = %db.path().display(),
            erp = %config.erp.base_url,
            serialize_scopes = config.sync.serialize_scopes,
            "application context ready"
        );

        Ok(Self { config, db, cache, erp, partner_sync, address_sync, import, master })
    }

    /// Check the store and the ERP session.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let health = context.health_check().await;
    /// for component in health.components.iter().filter(|c| !c.is_healthy) {
    ///     eprintln!("{} is unhealthy: {:?}", component.name, component.message);
    /// }
    /// ```
    pub async fn health_check(&self) -> HealthStatus {
        let (database, erp) = tokio::join!(self.check_database_health(), self.check_erp_health());

        let mut status = HealthStatus::new().add_component(database).add_component(erp);
        status.calculate_score();
        status
    }

    /// Run the health query on a blocking thread.
    async fn check_database_health(&self) -> ComponentHealth {
        let db = Arc::clone(&self.db);
        let result = tokio::task::spawn_blocking(move || db.health_check())
            .await
            .map_err(|err| MdSyncError::Internal(format!("health check task failed: {err}")))
            .and_then(|inner| inner);

        match result {
            Ok(()) => ComponentHealth::healthy("database"),
            Err(err) => ComponentHealth::unhealthy("database", err.to_string()),
        }
    }

    async fn check_erp_health(&self) -> ComponentHealth {
        match self.erp.health_check().await {
            Ok(()) => ComponentHealth::healthy("erp"),
            Err(err) => ComponentHealth::unhealthy("erp", err.to_string()),
        }
    }
}
