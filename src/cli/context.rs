//! Command execution context
//!
//! Bundles the loaded config, the resolved execution context, the cached
//! API client and the vehicle store, so command handlers share one setup
//! path instead of repeating it.

use std::sync::Arc;

use log::warn;

use crate::cache::CachedVehicleClient;
use crate::cli::args::{GlobalOptions, OutputFormat};
use crate::client::FitmentClient;
use crate::config::Config;
use crate::context::{discover_shop, ContextKind, ExecutionContext};
use crate::error::{ApiError, ConfigError, Result};
use crate::store::VehicleStore;

/// Shared state for command execution
pub struct CommandContext {
    pub config: Config,
    pub client: Arc<CachedVehicleClient<FitmentClient>>,
    pub store: VehicleStore,
    pub format: OutputFormat,
}

impl CommandContext {
    /// Load config, resolve the shop and execution context, and build the
    /// client stack.
    ///
    /// The shop resolves from the `--shop` flag first, then the config.
    /// A freshly generated analytics session id is written back to the
    /// config so later runs reuse it.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let mut config = Config::load_at(opts.config_ref())?;

        let shop = discover_shop(opts.shop_ref(), None, None, config.shop.as_deref());
        let mut dirty = false;
        if shop != config.shop {
            config.shop = shop.clone();
            dirty = true;
        }

        if config.session_id.is_none() {
            config.ensure_session_id();
            dirty = true;
        }

        // Remember the discovered shop and session id for later runs
        if dirty {
            if let Err(e) = config.save_at(opts.config_ref()) {
                warn!("Failed to persist configuration: {}", e);
            }
        }

        if config.context == ContextKind::Admin && config.is_token_expired() {
            warn!("Admin session token is missing or expired; requests may be rejected");
        }

        // Storefront URLs cannot be built without a shop
        if config.context == ContextKind::Storefront && shop.is_none() {
            return Err(ApiError::ShopUnresolved.into());
        }

        // An explicit flag wins; otherwise the config preference decides
        let format = opts.format.unwrap_or_else(|| {
            match config.preferences.format.as_deref() {
                Some("json") => OutputFormat::Json,
                _ => OutputFormat::Table,
            }
        });

        let mut context =
            ExecutionContext::new(config.context, shop.clone(), config.proxy_subpath.clone());
        if let Some(app_url) = &config.app_url {
            context = context.with_base(app_url.trim_end_matches('/').to_string());
        }

        let raw = FitmentClient::new(context, config.admin_token.clone())?;
        let client = Arc::new(CachedVehicleClient::new(raw, shop, !opts.no_cache));
        let store = VehicleStore::new(Config::data_dir(opts.config_ref())?);

        Ok(Self {
            config,
            client,
            store,
            format,
        })
    }

    /// The shop domain, or an error pointing at init/--shop
    pub fn require_shop(&self) -> Result<&str> {
        self.config
            .shop
            .as_deref()
            .ok_or_else(|| ConfigError::MissingShop.into())
    }

    /// Page size for product listings, flag value first
    pub fn page_size(&self, flag: Option<usize>) -> usize {
        flag.unwrap_or(self.config.preferences.page_size)
    }

    pub fn session_id(&self) -> Option<String> {
        self.config.session_id.clone()
    }
}
