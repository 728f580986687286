//! Support registries.
//!
//! Which executor, authenticator and voting-strategy ids this crate knows how
//! to drive. Registries are injected into the dispatcher so tests can swap in
//! synthetic ones.

use std::collections::HashSet;

use serde::Deserialize;

use crate::execution::resolver::{VANILLA_EXECUTOR, ZODIAC_EXECUTOR};

/// Kinds of on-chain primitive a space can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Executor,
    Authenticator,
    Strategy,
}

/// Set membership over supported primitive ids.
pub trait SupportRegistry: Send + Sync {
    fn is_supported(&self, kind: PrimitiveKind, id: &str) -> bool;
}

/// Supported id lists, as read from configuration.
///
/// Only the two known executors are supported out of the box. Authenticator
/// and strategy ids are deployment specific and default to empty, so a
/// registry built from the default config rejects every propose and vote as
/// an unsupported space until `authenticators` and `strategies` are set.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SupportedConfig {
    pub executors: Vec<String>,
    pub authenticators: Vec<String>,
    pub strategies: Vec<String>,
}

impl Default for SupportedConfig {
    fn default() -> Self {
        Self {
            executors: vec![VANILLA_EXECUTOR.to_string(), ZODIAC_EXECUTOR.to_string()],
            authenticators: Vec::new(),
            strategies: Vec::new(),
        }
    }
}

/// Immutable registry backed by hash sets.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    executors: HashSet<String>,
    authenticators: HashSet<String>,
    strategies: HashSet<String>,
}

impl StaticRegistry {
    pub fn builder() -> StaticRegistryBuilder {
        StaticRegistryBuilder::default()
    }

    pub fn from_config(config: &SupportedConfig) -> Self {
        Self::builder()
            .executors(config.executors.iter().cloned())
            .authenticators(config.authenticators.iter().cloned())
            .strategies(config.strategies.iter().cloned())
            .build()
    }

    fn set(&self, kind: PrimitiveKind) -> &HashSet<String> {
        match kind {
            PrimitiveKind::Executor => &self.executors,
            PrimitiveKind::Authenticator => &self.authenticators,
            PrimitiveKind::Strategy => &self.strategies,
        }
    }
}

impl SupportRegistry for StaticRegistry {
    fn is_supported(&self, kind: PrimitiveKind, id: &str) -> bool {
        self.set(kind).contains(id)
    }
}

/// Builder for [`StaticRegistry`].
#[derive(Debug, Default)]
pub struct StaticRegistryBuilder {
    registry: StaticRegistry,
}

impl StaticRegistryBuilder {
    pub fn executors<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registry.executors.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn authenticators<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registry
            .authenticators
            .extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn strategies<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registry.strategies.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> StaticRegistry {
        self.registry
    }
}
