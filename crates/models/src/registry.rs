//! Model registry.
//!
//! The registry is an ordinary value owned by whoever hosts the models:
//! build it once at startup and pass it to request handlers.

use crate::{Model, ModelKind, RegistryError, RegressionModel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

const MODEL_VERSION: &str = "0.1";

/// Summary of a registered model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Registered name
    pub name: String,
    /// Model version
    pub version: String,
    /// Model family
    #[serde(rename = "type")]
    pub kind: ModelKind,
}

/// Named collection of hosted models.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: BTreeMap<String, Model>,
}

impl ModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the `base` regression model over four features.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .models
            .insert("base".to_string(), RegressionModel::new(4).into());
        registry
    }

    /// Register a model under a new name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        model: impl Into<Model>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.models.contains_key(&name) {
            return Err(RegistryError::AlreadyRegistered(name));
        }
        let model = model.into();
        debug!("Registered model {} ({})", name, model.kind());
        self.models.insert(name, model);
        Ok(())
    }

    /// Look up a model.
    pub fn get(&self, name: &str) -> Result<&Model, RegistryError> {
        self.models
            .get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Registered names in sorted order.
    pub fn list(&self) -> Vec<&str> {
        self.models.keys().map(String::as_str).collect()
    }

    /// Summary of a model, if registered.
    pub fn info(&self, name: &str) -> Option<ModelInfo> {
        self.models.get(name).map(|m| ModelInfo {
            name: name.to_string(),
            version: MODEL_VERSION.to_string(),
            kind: m.kind(),
        })
    }

    /// Number of registered models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
