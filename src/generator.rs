use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::dialect::Loader;
use crate::resolver::{NameResolver, Scope};

/// State for one generation run.
///
/// Owns the configuration, the dialect loader, the short name cache and the
/// warning log. Create a new generator for every run; nothing carries over.
pub struct Generator {
    pub(crate) config: Config,
    pub(crate) loader: Box<dyn Loader>,
    resolver: NameResolver,
    diagnostics: Diagnostics,
}

impl Generator {
    pub fn new(config: Config, loader: impl Loader + 'static) -> Self {
        let resolver = NameResolver::from_config(&config);
        Generator {
            config,
            loader: Box::new(loader),
            resolver,
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn resolver(&self) -> &NameResolver {
        &self.resolver
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// See [`NameResolver::short_name`].
    pub fn shortname(&self, type_name: &str, scopes: &[Scope<'_>]) -> String {
        self.resolver.short_name(type_name, scopes)
    }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("config", &self.config)
            .field("resolver", &self.resolver)
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}
