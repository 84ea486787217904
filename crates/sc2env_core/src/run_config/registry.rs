//! Registry of run config variants and priority resolution.

use std::collections::BTreeMap;

use super::{
    global_overrides, LaunchOverrides, LocalVariant, Platform, RunConfigProxy, RunConfigVariant,
};
use crate::error::LaunchError;

/// Holds every known [`RunConfigVariant`] and picks one to launch with.
#[derive(Default)]
pub struct RunConfigRegistry {
    variants: Vec<Box<dyn RunConfigVariant>>,
}

impl std::fmt::Debug for RunConfigRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.variants.iter().map(|v| v.name()))
            .finish()
    }
}

impl RunConfigRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            variants: Vec::new(),
        }
    }

    /// Registry with the local install variant of every platform.
    pub fn with_platform_defaults() -> Self {
        let mut registry = Self::new();
        for platform in Platform::ALL {
            registry.register(LocalVariant::new(platform));
        }
        registry
    }

    /// Add a variant. A later variant with the same name shadows the earlier.
    pub fn register<V: RunConfigVariant + 'static>(&mut self, variant: V) -> &mut Self {
        self.variants.push(Box::new(variant));
        self
    }

    /// Every registered variant with its current priority, in registration order.
    pub fn variants(&self) -> Vec<(&str, i32)> {
        self.variants
            .iter()
            .map(|v| (v.name(), v.priority()))
            .collect()
    }

    /// Eligible variants (positive priority) keyed by name.
    fn eligible_map(&self) -> BTreeMap<&str, (i32, &dyn RunConfigVariant)> {
        let mut eligible = BTreeMap::new();
        for variant in &self.variants {
            let priority = variant.priority();
            if priority > 0 {
                eligible.insert(variant.name(), (priority, variant.as_ref()));
            } else {
                eligible.remove(variant.name());
            }
        }
        eligible
    }

    /// Eligible `(name, priority)` pairs, sorted by name.
    pub fn eligible(&self) -> Vec<(&str, i32)> {
        self.eligible_map()
            .into_iter()
            .map(|(name, (priority, _))| (name, priority))
            .collect()
    }

    /// Resolve using the process-wide overrides.
    ///
    /// See [`RunConfigRegistry::resolve_with`].
    pub fn resolve(
        &self,
        explicit_name: Option<&str>,
        version: Option<&str>,
    ) -> Result<RunConfigProxy, LaunchError> {
        self.resolve_with(explicit_name, version, &global_overrides())
    }

    /// Pick a variant, build it for `version` and wrap it with `overrides`.
    ///
    /// Without an explicit name the eligible variant with the highest
    /// priority wins; equal priorities go to the lexicographically smallest
    /// name.
    ///
    /// # Errors
    ///
    /// [`LaunchError::NoValidRunConfigs`] if no variant is eligible,
    /// [`LaunchError::InvalidRunConfig`] if `explicit_name` is not eligible,
    /// or whatever the variant's build step reports.
    pub fn resolve_with(
        &self,
        explicit_name: Option<&str>,
        version: Option<&str>,
        overrides: &LaunchOverrides,
    ) -> Result<RunConfigProxy, LaunchError> {
        let eligible = self.eligible_map();
        if eligible.is_empty() {
            return Err(LaunchError::NoValidRunConfigs);
        }

        let variant = match explicit_name {
            None => eligible
                .values()
                .fold(None::<(i32, &dyn RunConfigVariant)>, |best, &(priority, v)| {
                    match best {
                        Some((best_priority, _)) if best_priority >= priority => best,
                        _ => Some((priority, v)),
                    }
                })
                .map(|(_, v)| v)
                .ok_or(LaunchError::NoValidRunConfigs)?,
            Some(name) => match eligible.get(name) {
                Some(&(_, v)) => v,
                None => {
                    return Err(LaunchError::InvalidRunConfig {
                        requested: name.to_string(),
                        valid: eligible.keys().map(|k| (*k).to_string()).collect(),
                    })
                }
            },
        };

        tracing::debug!(
            run_config = variant.name(),
            version = version.unwrap_or("latest"),
            explicit = explicit_name.is_some(),
            "Resolved run config"
        );

        let config = variant.build(version)?;
        Ok(RunConfigProxy::new(config, overrides.clone()))
    }
}
