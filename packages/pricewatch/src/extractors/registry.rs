//! Hostname → extractor lookup table.
//!
//! Built once at process start from the compiled-in extractor list and
//! immutable afterwards. Construction is explicit (no hidden global):
//! callers build the registry and pass it by reference into the
//! orchestrator, which keeps tests free to register fakes.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::RegistryError;
use crate::traits::extractor::SiteExtractor;

/// Read-only map from exact hostname to extractor.
///
/// Lookup is a case-sensitive exact string match on the hostname as
/// parsed from an item's URL; there is no fuzzy matching. A miss is the
/// terminal "unsupported site" condition.
pub struct ExtractorRegistry {
    extractors: HashMap<String, Arc<dyn SiteExtractor>>,
}

impl ExtractorRegistry {
    /// Start building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder {
            extractors: Vec::new(),
        }
    }

    /// Look up the extractor for a hostname.
    pub fn lookup(&self, host: &str) -> Option<&dyn SiteExtractor> {
        self.extractors.get(host).map(Arc::as_ref)
    }

    /// Registered hostnames, in no particular order.
    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.extractors.keys().map(String::as_str)
    }

    /// Number of registered extractors.
    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

/// Builder that rejects duplicate hostname claims at construction time.
pub struct RegistryBuilder {
    extractors: Vec<Arc<dyn SiteExtractor>>,
}

impl RegistryBuilder {
    /// Register an extractor.
    pub fn register(self, extractor: impl SiteExtractor + 'static) -> Self {
        self.register_arc(Arc::new(extractor))
    }

    /// Register an already-shared extractor.
    pub fn register_arc(mut self, extractor: Arc<dyn SiteExtractor>) -> Self {
        self.extractors.push(extractor);
        self
    }

    /// Build the registry, failing fast when two extractors claim the
    /// same host. Registration order is irrelevant.
    pub fn build(self) -> Result<ExtractorRegistry, RegistryError> {
        let mut map: HashMap<String, Arc<dyn SiteExtractor>> =
            HashMap::with_capacity(self.extractors.len());

        for extractor in self.extractors {
            let host = extractor.host().to_string();
            if map.insert(host.clone(), extractor).is_some() {
                return Err(RegistryError::DuplicateHost { host });
            }
        }

        Ok(ExtractorRegistry { extractors: map })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedExtractor;

    #[test]
    fn test_lookup_exact_match() {
        let registry = ExtractorRegistry::builder()
            .register(ScriptedExtractor::new("shop-a.example"))
            .register(ScriptedExtractor::new("shop-b.example"))
            .build()
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.lookup("shop-a.example").is_some());
        assert!(registry.lookup("shop-b.example").is_some());
        assert!(registry.lookup("shop-c.example").is_none());
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let registry = ExtractorRegistry::builder()
            .register(ScriptedExtractor::new("Shop-A.example"))
            .build()
            .unwrap();

        assert!(registry.lookup("Shop-A.example").is_some());
        assert!(registry.lookup("shop-a.example").is_none());
    }

    #[test]
    fn test_duplicate_host_fails_fast() {
        let result = ExtractorRegistry::builder()
            .register(ScriptedExtractor::new("shop-a.example"))
            .register(ScriptedExtractor::new("shop-a.example"))
            .build();

        match result {
            Err(RegistryError::DuplicateHost { host }) => {
                assert_eq!(host, "shop-a.example");
            }
            Ok(_) => panic!("duplicate host must be rejected"),
        }
    }

    #[test]
    fn test_empty_registry() {
        let registry = ExtractorRegistry::builder().build().unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.hosts().count(), 0);
    }
}
