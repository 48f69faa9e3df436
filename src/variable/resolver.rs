//! Reference resolution through the cache and the registry

use thiserror::Error;
use tracing::trace;

use super::cache::ValueCache;
use super::registry::Registry;
use super::ProviderError;

/// Errors that can occur while resolving a reference
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No exact variable or prefix matches the reference
    #[error("variable \"{name}\" not found")]
    VariableNotFound { name: String },

    /// The variable exists but reported no value
    #[error("value of variable \"{name}\" not found")]
    ValueNotFound { name: String },

    /// Provider failure, passed through unchanged
    #[error(transparent)]
    Provider(ProviderError),
}

impl ResolveError {
    fn value_not_found(name: &str) -> Self {
        ResolveError::ValueNotFound {
            name: name.to_string(),
        }
    }
}

/// Resolve `reference` to its value.
///
/// Cached entries (negative ones included) short-circuit the provider unless
/// the variable is flagged `no_cacheable`. Provider errors are never cached.
pub fn resolve<C: ?Sized>(
    registry: &Registry<C>,
    cache: &mut ValueCache,
    reference: &str,
    ctx: &C,
) -> Result<String, ResolveError> {
    let found = registry
        .lookup(reference)
        .ok_or_else(|| ResolveError::VariableNotFound {
            name: reference.to_string(),
        })?;
    let use_cache = !found.variable.flags().no_cacheable;

    if use_cache {
        if let Some(cached) = cache.get(reference) {
            trace!(reference, "cache hit");
            if cached.not_found {
                return Err(ResolveError::value_not_found(reference));
            }
            return Ok(cached.value.clone());
        }
    }

    trace!(reference, suffix = found.suffix, "calling provider");
    let value = found
        .variable
        .provide(ctx, found.suffix)
        .map_err(ResolveError::Provider)?;

    if value.not_found {
        if use_cache && value.cacheable {
            cache.put(reference, value);
        }
        return Err(ResolveError::value_not_found(reference));
    }

    if use_cache && value.cacheable {
        cache.put(reference, value.clone());
    }
    Ok(value.value)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::variable::{StaticValue, Variable, VariableValue};

    fn counting(counter: Arc<AtomicU32>, cacheable: bool) -> Variable {
        Variable::from_fn("height", move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            let value = VariableValue::found((170 + counter.load(Ordering::SeqCst)).to_string());
            Ok(if cacheable { value } else { value.volatile() })
        })
    }

    #[test]
    fn test_cacheable_value_is_memoized() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut registry: Registry = Registry::new();
        let mut cache = ValueCache::new();
        registry.register(counting(calls.clone(), true), &mut cache).unwrap();

        assert_eq!(resolve(&registry, &mut cache, "height", &()).unwrap(), "171");
        assert_eq!(resolve(&registry, &mut cache, "height", &()).unwrap(), "171");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_volatile_value_is_recomputed() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut registry: Registry = Registry::new();
        let mut cache = ValueCache::new();
        registry.register(counting(calls.clone(), false), &mut cache).unwrap();

        assert_eq!(resolve(&registry, &mut cache, "height", &()).unwrap(), "171");
        assert_eq!(resolve(&registry, &mut cache, "height", &()).unwrap(), "172");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_no_cacheable_flag_bypasses_cache() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut registry: Registry = Registry::new();
        let mut cache = ValueCache::new();
        registry
            .register(counting(calls.clone(), true).no_cacheable(), &mut cache)
            .unwrap();
        // A stale entry must not be read for a no_cacheable variable
        cache.put("height", VariableValue::found("0"));

        assert_eq!(resolve(&registry, &mut cache, "height", &()).unwrap(), "171");
        assert_eq!(resolve(&registry, &mut cache, "height", &()).unwrap(), "172");
        assert_eq!(cache.get("height").unwrap().value, "0");
    }

    #[test]
    fn test_cached_not_found_skips_provider() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let mut registry: Registry = Registry::new();
        let mut cache = ValueCache::new();
        registry
            .register(
                Variable::from_fn("none", move |_, _| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(VariableValue::not_found())
                }),
                &mut cache,
            )
            .unwrap();

        for _ in 0..2 {
            let err = resolve(&registry, &mut cache, "none", &()).unwrap_err();
            assert_eq!(err.to_string(), "value of variable \"none\" not found");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unknown_reference() {
        let registry: Registry = Registry::new();
        let mut cache = ValueCache::new();
        let err = resolve(&registry, &mut cache, "ghost", &()).unwrap_err();
        assert!(matches!(err, ResolveError::VariableNotFound { .. }));
        assert_eq!(err.to_string(), "variable \"ghost\" not found");
    }

    #[test]
    fn test_provider_error_is_verbatim_and_uncached() {
        let mut registry: Registry = Registry::new();
        let mut cache = ValueCache::new();
        registry
            .register(
                Variable::from_fn("broken", |_, _| Err("disk on fire".into())),
                &mut cache,
            )
            .unwrap();

        let err = resolve(&registry, &mut cache, "broken", &()).unwrap_err();
        assert_eq!(err.to_string(), "disk on fire");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_prefix_cached_under_full_reference() {
        let mut registry: Registry = Registry::new();
        let mut cache = ValueCache::new();
        registry
            .register(
                Variable::prefix_fn("upper_", |_, suffix| {
                    Ok(VariableValue::found(suffix.to_uppercase()))
                }),
                &mut cache,
            )
            .unwrap();

        assert_eq!(resolve(&registry, &mut cache, "upper_abc", &()).unwrap(), "ABC");
        assert!(cache.get("upper_abc").is_some());
        assert!(cache.get("abc").is_none());
    }

    #[test]
    fn test_context_is_threaded_to_provider() {
        let mut registry: Registry<str> = Registry::new();
        let mut cache = ValueCache::new();
        registry
            .register(
                Variable::from_fn("user", |ctx: &str, _| Ok(VariableValue::found(ctx).volatile())),
                &mut cache,
            )
            .unwrap();

        assert_eq!(resolve(&registry, &mut cache, "user", "alice").unwrap(), "alice");
        assert_eq!(resolve(&registry, &mut cache, "user", "bob").unwrap(), "bob");
    }

    #[test]
    fn test_static_value() {
        let mut registry: Registry = Registry::new();
        let mut cache = ValueCache::new();
        registry
            .register(Variable::new("name", StaticValue::new("alex")), &mut cache)
            .unwrap();
        assert_eq!(resolve(&registry, &mut cache, "name", &()).unwrap(), "alex");
    }
}
