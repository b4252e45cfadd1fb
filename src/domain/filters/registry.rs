//! Name-keyed table of filter factories.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use super::{gemini_filter, list_filter, regex_filter, safe_browsing_filter, Filter};
use crate::domain::error::UnknownFilterError;

/// Constructor for a fresh, unconfigured filter.
pub type FilterFactory = Box<dyn Fn() -> Box<dyn Filter> + Send + Sync>;

/// Registry of filter factories keyed by lower-cased name.
///
/// Populated once at start-up and only read afterwards.
#[derive(Default)]
pub struct FilterRegistry {
    factories: HashMap<String, FilterFactory>,
}

impl FilterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in filter.
    pub fn with_builtin_filters() -> Self {
        let mut registry = Self::new();
        list_filter::register(&mut registry);
        regex_filter::register(&mut registry);
        safe_browsing_filter::register(&mut registry);
        gemini_filter::register(&mut registry);
        registry
    }

    /// Register a factory under `name`.
    ///
    /// Names are case-insensitive. Registering an existing name replaces
    /// the previous factory.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn Filter> + Send + Sync + 'static,
    {
        let key = name.to_lowercase();
        if self.factories.insert(key, Box::new(factory)).is_some() {
            debug!("Filter factory replaced: {}", name);
        }
    }

    /// Create a new, unconfigured instance of the named filter.
    pub fn create(&self, name: &str) -> Result<Box<dyn Filter>, UnknownFilterError> {
        self.factories
            .get(&name.to_lowercase())
            .map(|factory| factory())
            .ok_or_else(|| UnknownFilterError(name.to_string()))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("filters", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::{ConfigError, RunError};
    use crate::domain::{FilterResult, Params};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Fixed(bool);

    impl Filter for Fixed {
        fn configure(&mut self, _params: &Params) -> Result<(), ConfigError> {
            Ok(())
        }

        fn run(&self, _url: &str) -> Result<FilterResult, RunError> {
            Ok(FilterResult {
                proceed: self.0,
                reason: String::new(),
            })
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut registry = FilterRegistry::new();
        registry.register("MyFilter", || Box::new(Fixed(true)));

        assert!(registry.create("myfilter").is_ok());
        assert!(registry.create("MYFILTER").is_ok());
        assert_eq!(registry.names(), vec!["myfilter"]);
    }

    #[test]
    fn test_unknown_filter() {
        let registry = FilterRegistry::new();
        let err = registry.create("Unknown").err().unwrap();
        assert_eq!(err, UnknownFilterError("Unknown".to_string()));
    }

    #[test]
    fn test_duplicate_registration_overwrites() {
        let mut registry = FilterRegistry::new();
        registry.register("f", || Box::new(Fixed(true)));
        registry.register("F", || Box::new(Fixed(false)));

        let filter = registry.create("f").unwrap();
        assert!(!filter.run("https://example.com").unwrap().proceed);
        assert_eq!(registry.names(), vec!["f"]);
    }

    #[test]
    fn test_create_returns_new_instance_each_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut registry = FilterRegistry::new();
        registry.register("counted", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::new(Fixed(true))
        });

        registry.create("counted").unwrap();
        registry.create("counted").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_builtin_filters() {
        let registry = FilterRegistry::with_builtin_filters();
        for name in [
            "Block",
            "PhishTankFilter",
            "RegexFilter",
            "RickRoll",
            "GoogleSafeBrowsing",
            "GeminiFilter",
        ] {
            assert!(registry.create(name).is_ok(), "missing {name}");
        }
    }
}
