#![forbid(unsafe_code)]

//! The plugin boundary.
//!
//! Each panel `type` maps to a [`PanelModel`] in an explicit registry keyed
//! by the type key stored on the panel record (never inferred from
//! presentation state). The core calls the model at lifecycle points and
//! never inspects the plugin's config value.

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::error::CanvasError;
use crate::panel::Panel;

/// Why a panel is being mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountReason {
    /// Fresh user-initiated creation (or its redo).
    Create,
    /// Rebuilt from a persisted config.
    Restore,
}

/// Behavior attached to a panel type.
///
/// `on_save` may return a replacement for the panel's opaque plugin config;
/// returning `None` keeps whatever is already stored.
pub trait PanelModel {
    fn on_mount(&mut self, panel: &mut Panel, reason: MountReason);

    fn on_save(&mut self, panel: &Panel) -> Option<Value> {
        let _ = panel;
        None
    }

    fn on_delete(&mut self, panel: &mut Panel) {
        let _ = panel;
    }
}

impl std::fmt::Debug for dyn PanelModel + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn PanelModel")
    }
}

/// Registry of panel models keyed by explicit type key.
#[derive(Default)]
pub struct PluginRegistry {
    models: FxHashMap<String, Box<dyn PanelModel>>,
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&str> = self.models.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("PluginRegistry").field("types", &keys).finish()
    }
}

impl PluginRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model under its type key, replacing any previous one.
    pub fn register(&mut self, type_key: impl Into<String>, model: Box<dyn PanelModel>) {
        self.models.insert(type_key.into(), model);
    }

    /// Whether a type key has a model.
    #[must_use]
    pub fn contains(&self, type_key: &str) -> bool {
        self.models.contains_key(type_key)
    }

    /// Resolve a model or fail loudly; an unknown type is fatal because the
    /// panel cannot exist without its model.
    pub fn resolve_mut(&mut self, type_key: &str) -> Result<&mut dyn PanelModel, CanvasError> {
        self.models
            .get_mut(type_key)
            .map(|model| model.as_mut() as &mut dyn PanelModel)
            .ok_or_else(|| CanvasError::UnknownPanelType {
                type_key: type_key.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::PanelConfig;
    use pinboard_core::{Rect, RectPatch};

    struct Marker;

    impl PanelModel for Marker {
        fn on_mount(&mut self, panel: &mut Panel, _reason: MountReason) {
            panel
                .dataset_mut()
                .insert("mounted".to_string(), "yes".to_string());
        }
    }

    #[test]
    fn resolve_unknown_type_is_fatal() {
        let mut registry = PluginRegistry::new();
        let err = registry.resolve_mut("markdown").unwrap_err();
        assert!(matches!(err, CanvasError::UnknownPanelType { .. }));
    }

    #[test]
    fn registered_model_mounts() {
        let mut registry = PluginRegistry::new();
        registry.register("marker", Box::new(Marker));
        assert!(registry.contains("marker"));

        let mut panel = Panel::from_config(PanelConfig::sticky(RectPatch::default()), Rect::default());
        registry
            .resolve_mut("marker")
            .unwrap()
            .on_mount(&mut panel, MountReason::Create);
        assert_eq!(panel.dataset().get("mounted").unwrap(), "yes");
    }
}
