#![forbid(unsafe_code)]

//! Panels: the live sticky/dock records and their persisted descriptors.
//!
//! A [`PanelConfig`] is the serializable descriptor; a [`Panel`] is the live
//! instance owned by the board's ordered collection while alive. Identity is
//! the [`PanelId`]; once a panel leaves the collection it is eligible for
//! destruction but may still be resurrected by a pending undo entry.
//!
//! # Invariants
//!
//! - `MAXIMIZED` and `MINIMIZED` are mutually exclusive; all other flags
//!   combine freely
//! - `dataset["rect"]` caches the pre-maximize rectangle so the
//!   maximize/minimize round-trip is lossless, including across save/reload

use std::collections::BTreeMap;
use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use pinboard_core::{GeometryError, Rect, RectPatch};

/// Dataset key caching the pre-maximize rectangle.
pub const DATASET_RECT_KEY: &str = "rect";

/// Stable identity of a panel for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PanelId(Uuid);

impl PanelId {
    /// Mint a fresh random id.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a dock is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DockPlacement {
    Top,
    Bottom,
    Left,
    Right,
}

/// Free-floating sticky or fixed-edge dock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum PanelKind {
    #[default]
    Sticky,
    Dock { placement: DockPlacement },
}

bitflags! {
    /// Visible state flags of a panel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct PanelFlags: u8 {
        const MAXIMIZED = 1 << 0;
        const MINIMIZED = 1 << 1;
        /// Disables edit/move/resize while set.
        const PINNED = 1 << 2;
        /// Visually transparent; hit-testing semantics are plugin-defined.
        const GHOST = 1 << 3;
        /// Transient: mid-removal-animation.
        const DELETED = 1 << 4;
    }
}

/// Serializable panel descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelConfig {
    pub id: PanelId,
    /// Plugin key; absent means the basic panel with no model.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_key: Option<String>,
    #[serde(flatten)]
    pub kind: PanelKind,
    /// Partial geometry; `null` slots mean "let default logic choose".
    #[serde(default)]
    pub rect: RectPatch,
    pub z_index: u32,
    #[serde(default)]
    pub flags: PanelFlags,
    /// Free-form string map; `dataset["rect"]` caches pre-maximize geometry.
    #[serde(default)]
    pub dataset: BTreeMap<String, String>,
    /// Opaque to the core; owned by the plugin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_config: Option<Value>,
}

impl PanelConfig {
    /// A minimal sticky config with a fresh id.
    #[must_use]
    pub fn sticky(rect: RectPatch) -> Self {
        Self {
            id: PanelId::random(),
            type_key: None,
            kind: PanelKind::Sticky,
            rect,
            z_index: 0,
            flags: PanelFlags::empty(),
            dataset: BTreeMap::new(),
            plugin_config: None,
        }
    }
}

/// Callback invoked with `(old, new)` flags on every flags mutation.
pub type FlagsObserver = Box<dyn FnMut(PanelFlags, PanelFlags)>;

/// A live panel on the board.
///
/// Exclusively owned by the board's ordered collection while alive. All
/// flag mutations go through [`set_flag`](Self::set_flag) /
/// [`toggle_flag`](Self::toggle_flag) so observers stay in sync.
pub struct Panel {
    id: PanelId,
    type_key: Option<String>,
    kind: PanelKind,
    rect: Rect,
    z_index: u32,
    flags: PanelFlags,
    dataset: BTreeMap<String, String>,
    plugin_config: Option<Value>,
    observers: Vec<FlagsObserver>,
}

impl fmt::Debug for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Panel")
            .field("id", &self.id)
            .field("type_key", &self.type_key)
            .field("rect", &self.rect)
            .field("z_index", &self.z_index)
            .field("flags", &self.flags)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Panel {
    /// Materialize a live panel from its descriptor.
    ///
    /// `null` rect slots fall back to `default_rect`.
    #[must_use]
    pub fn from_config(config: PanelConfig, default_rect: Rect) -> Self {
        Self {
            id: config.id,
            type_key: config.type_key,
            kind: config.kind,
            rect: config.rect.apply_to(&default_rect),
            z_index: config.z_index,
            flags: config.flags,
            dataset: config.dataset,
            plugin_config: config.plugin_config,
            observers: Vec::new(),
        }
    }

    /// Serialize the live state back into a descriptor.
    #[must_use]
    pub fn save(&self) -> PanelConfig {
        PanelConfig {
            id: self.id,
            type_key: self.type_key.clone(),
            kind: self.kind,
            rect: self.rect.into(),
            z_index: self.z_index,
            flags: self.flags,
            dataset: self.dataset.clone(),
            plugin_config: self.plugin_config.clone(),
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> PanelId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn type_key(&self) -> Option<&str> {
        self.type_key.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> PanelKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    /// Apply a partial patch over the current rectangle.
    pub fn patch_rect(&mut self, patch: &RectPatch) {
        self.rect = patch.apply_to(&self.rect);
    }

    #[inline]
    #[must_use]
    pub fn z_index(&self) -> u32 {
        self.z_index
    }

    pub(crate) fn set_z_index(&mut self, z: u32) {
        self.z_index = z;
    }

    #[inline]
    #[must_use]
    pub fn flags(&self) -> PanelFlags {
        self.flags
    }

    #[inline]
    #[must_use]
    pub fn is_pinned(&self) -> bool {
        self.flags.contains(PanelFlags::PINNED)
    }

    #[inline]
    #[must_use]
    pub fn is_maximized(&self) -> bool {
        self.flags.contains(PanelFlags::MAXIMIZED)
    }

    /// Set or clear one flag, enforcing the maximized⊕minimized exclusion,
    /// and notify observers if anything changed.
    pub fn set_flag(&mut self, flag: PanelFlags, on: bool) {
        let mut next = self.flags;
        next.set(flag, on);
        if on && flag == PanelFlags::MAXIMIZED {
            next.remove(PanelFlags::MINIMIZED);
        }
        if on && flag == PanelFlags::MINIMIZED {
            next.remove(PanelFlags::MAXIMIZED);
        }
        self.apply_flags(next);
    }

    /// Flip one flag.
    pub fn toggle_flag(&mut self, flag: PanelFlags) {
        let on = !self.flags.contains(flag);
        self.set_flag(flag, on);
    }

    fn apply_flags(&mut self, next: PanelFlags) {
        if next == self.flags {
            return;
        }
        let old = self.flags;
        self.flags = next;
        for cb in &mut self.observers {
            cb(old, next);
        }
    }

    /// Subscribe to flag changes. Replaces DOM mutation observation with a
    /// typed subscriber list on the panel record itself.
    pub fn on_flags_changed(&mut self, cb: FlagsObserver) {
        self.observers.push(cb);
    }

    #[must_use]
    pub fn dataset(&self) -> &BTreeMap<String, String> {
        &self.dataset
    }

    pub fn dataset_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.dataset
    }

    #[must_use]
    pub fn plugin_config(&self) -> Option<&Value> {
        self.plugin_config.as_ref()
    }

    pub fn set_plugin_config(&mut self, value: Option<Value>) {
        self.plugin_config = value;
    }

    /// Stash the current rectangle in `dataset["rect"]`.
    pub fn cache_rect(&mut self) {
        let patch: RectPatch = self.rect.into();
        self.dataset
            .insert(DATASET_RECT_KEY.to_string(), patch.to_cache_string());
    }

    /// Read back the cached pre-maximize rectangle, if present.
    ///
    /// A malformed cache string is a loud error, not a silent default.
    pub fn cached_rect(&self) -> Result<Option<Rect>, GeometryError> {
        match self.dataset.get(DATASET_RECT_KEY) {
            None => Ok(None),
            Some(text) => {
                let patch = RectPatch::parse_cache_string(text)?;
                Ok(Some(patch.apply_to(&self.rect)))
            }
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn basic_panel() -> Panel {
        Panel::from_config(
            PanelConfig::sticky(RectPatch::full(10.0, 20.0, 300.0, 200.0)),
            Rect::default(),
        )
    }

    #[test]
    fn from_config_applies_defaults_for_null_slots() {
        let config = PanelConfig::sticky(RectPatch {
            left: Some(50.0),
            ..RectPatch::default()
        });
        let panel = Panel::from_config(config, Rect::new(0.0, 0.0, 300.0, 200.0));
        assert_eq!(panel.rect(), Rect::new(50.0, 0.0, 300.0, 200.0));
    }

    #[test]
    fn save_round_trips_live_state() {
        let mut panel = basic_panel();
        panel.set_flag(PanelFlags::PINNED, true);
        panel
            .dataset_mut()
            .insert("color".to_string(), "yellow".to_string());
        let config = panel.save();
        assert_eq!(config.id, panel.id());
        assert_eq!(config.rect, RectPatch::full(10.0, 20.0, 300.0, 200.0));
        assert!(config.flags.contains(PanelFlags::PINNED));
        assert_eq!(config.dataset.get("color").unwrap(), "yellow");
    }

    #[test]
    fn maximized_and_minimized_are_exclusive() {
        let mut panel = basic_panel();
        panel.set_flag(PanelFlags::MINIMIZED, true);
        panel.set_flag(PanelFlags::MAXIMIZED, true);
        assert!(panel.flags().contains(PanelFlags::MAXIMIZED));
        assert!(!panel.flags().contains(PanelFlags::MINIMIZED));
        panel.set_flag(PanelFlags::MINIMIZED, true);
        assert!(!panel.flags().contains(PanelFlags::MAXIMIZED));
    }

    #[test]
    fn observers_see_old_and_new_flags() {
        let seen: Rc<RefCell<Vec<(PanelFlags, PanelFlags)>>> = Rc::default();
        let sink = seen.clone();
        let mut panel = basic_panel();
        panel.on_flags_changed(Box::new(move |old, new| {
            sink.borrow_mut().push((old, new));
        }));
        panel.set_flag(PanelFlags::GHOST, true);
        panel.set_flag(PanelFlags::GHOST, true); // no change, no callback
        panel.toggle_flag(PanelFlags::GHOST);
        let events = seen.borrow();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], (PanelFlags::empty(), PanelFlags::GHOST));
        assert_eq!(events[1], (PanelFlags::GHOST, PanelFlags::empty()));
    }

    #[test]
    fn rect_cache_round_trip() {
        let mut panel = basic_panel();
        panel.cache_rect();
        panel.set_rect(Rect::new(0.0, 0.0, 1280.0, 800.0));
        let cached = panel.cached_rect().unwrap().unwrap();
        assert_eq!(cached, Rect::new(10.0, 20.0, 300.0, 200.0));
    }

    #[test]
    fn malformed_rect_cache_is_loud() {
        let mut panel = basic_panel();
        panel
            .dataset_mut()
            .insert(DATASET_RECT_KEY.to_string(), "1,2,3".to_string());
        assert!(panel.cached_rect().is_err());
    }

    #[test]
    fn config_serde_shape() {
        let mut config = PanelConfig::sticky(RectPatch::full(0.0, 0.0, 300.0, 200.0));
        config.type_key = Some("markdown".to_string());
        config.z_index = 7;
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["type"], "markdown");
        assert_eq!(json["kind"], "sticky");
        assert_eq!(json["zIndex"], 7);
        assert_eq!(json["rect"][2], 300.0);
        let back: PanelConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn dock_config_serde_carries_placement() {
        let mut config = PanelConfig::sticky(RectPatch::default());
        config.kind = PanelKind::Dock {
            placement: DockPlacement::Bottom,
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["kind"], "dock");
        assert_eq!(json["placement"], "bottom");
    }
}
