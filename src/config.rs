use crate::{FunctionRegistry, OptimizationModule};

/// Configuration for [`OptimizationModule`].
#[derive(Debug)]
pub struct ModuleConfig {
    pub(crate) enabled: bool,
    pub(crate) registry: FunctionRegistry,
}

impl ModuleConfig {
    /// Create an enabled configuration with the built-in functions.
    ///
    /// ```
    /// # use prebid_optimization::ModuleConfig;
    /// ModuleConfig::new();
    /// ```
    pub fn new() -> Self {
        ModuleConfig {
            enabled: true,
            registry: FunctionRegistry::default(),
        }
    }

    /// Enable or disable rule execution. A disabled module leaves every request untouched.
    pub fn enabled(&mut self, enabled: bool) -> &mut Self {
        self.enabled = enabled;
        self
    }

    /// Resolve function names in `registry` instead of the built-in one, e.g. to add
    /// host-specific functions.
    ///
    /// ```
    /// # use prebid_optimization::{FunctionRegistry, ModuleConfig};
    /// let mut registry = FunctionRegistry::default();
    /// // registry.register_schema("deviceOs", ...);
    /// let mut config = ModuleConfig::new();
    /// config.registry(registry);
    /// ```
    pub fn registry(&mut self, registry: FunctionRegistry) -> &mut Self {
        self.registry = registry;
        self
    }

    /// Create a new [`OptimizationModule`] using the specified configuration.
    ///
    /// ```
    /// # use prebid_optimization::{ModuleConfig, OptimizationModule};
    /// let module: OptimizationModule = ModuleConfig::new().to_module();
    /// ```
    pub fn to_module(self) -> OptimizationModule {
        OptimizationModule::new(self)
    }
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self::new()
    }
}
