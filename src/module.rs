use std::sync::Arc;

use crate::{
    builder::build_rules_tree_with, rules_store::RulesStore, ModuleConfig, RequestWrapper, Result,
};

/// Request optimization step for the auction pipeline.
///
/// In order to create a module instance, first create [`ModuleConfig`].
///
/// # Examples
/// ```
/// # use prebid_optimization::{ModuleConfig, OptimizationModule, RequestWrapper};
/// let module = OptimizationModule::new(ModuleConfig::new());
/// module
///     .load_configuration(br#"{"schema": [], "rules": [{"conditions": [], "results": [
///         {"function": "excludeBidders", "args": {"bidders": ["bidderB"]}}
///     ]}]}"#)
///     .unwrap();
///
/// let mut request = RequestWrapper::default();
/// module.execute(&mut request).unwrap();
/// assert!(request.is_bidder_excluded("bidderB"));
/// ```
#[derive(Debug)]
pub struct OptimizationModule {
    rules_store: Arc<RulesStore>,
    config: ModuleConfig,
}

impl OptimizationModule {
    pub fn new(config: ModuleConfig) -> Self {
        OptimizationModule {
            rules_store: Arc::new(RulesStore::new()),
            config,
        }
    }

    /// Create a module sharing `rules_store` with other components, e.g. a reloader.
    pub fn new_with_rules_store(config: ModuleConfig, rules_store: Arc<RulesStore>) -> Self {
        Self {
            rules_store,
            config,
        }
    }

    pub fn rules_store(&self) -> &Arc<RulesStore> {
        &self.rules_store
    }

    /// Compile `data` and make it the active rule tree.
    ///
    /// On error the previously active rules stay in place.
    pub fn load_configuration(&self, data: &[u8]) -> Result<()> {
        let rules = build_rules_tree_with(data, &self.config.registry).inspect_err(|err| {
            log::warn!(target: "prebid_optimization",
                       "failed to compile optimization rules: {:?}", err);
        })?;

        log::debug!(target: "prebid_optimization",
                    depth = rules.depth(),
                    leaves = rules.leaf_count();
                    "loaded optimization rules");
        self.rules_store.set_rules(rules);
        Ok(())
    }

    /// Run the active rules against `request`.
    pub fn execute(&self, request: &mut RequestWrapper) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }

        let Some(rules) = self.rules_store.get_rules() else {
            log::warn!(target: "prebid_optimization",
                       request_id:display = request.bid_request.id;
                       "executing optimization before rules have been loaded");
            // Not loaded yet is a normal startup state.
            return Ok(());
        };

        rules.execute(request).inspect_err(|err| {
            log::warn!(target: "prebid_optimization",
                       request_id:display = request.bid_request.id;
                       "error occurred while executing optimization rules: {:?}", err);
        })?;

        log::trace!(target: "prebid_optimization",
                    request_id:display = request.bid_request.id,
                    device_ip:debug = request.device_ip(),
                    excluded_bidders:serde = request.excluded_bidders();
                    "executed optimization rules");
        Ok(())
    }
}
