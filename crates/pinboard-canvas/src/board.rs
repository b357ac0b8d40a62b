#![forbid(unsafe_code)]

//! The board: ordered panel collection, lifecycle, and history wiring.
//!
//! [`Board`] owns a [`BoardState`] (the mutable document) and a
//! [`History`] over it. Every user-observable mutation goes through a
//! command so undo/redo stay a pure cursor walk; camera moves (zoom, pan)
//! and focus raises are deliberately not recorded.
//!
//! # Invariants
//!
//! - Panel array order and `z_index` agree: the array is bottom-to-top and
//!   z strictly increases with position
//! - A panel whose removal animation is running stays in the collection
//!   (flagged `DELETED`) until the animation ends or times out; only then
//!   does it move to the graveyard, from where undo can resurrect it
//! - Undo of a delete restores the same id, rectangle, flags, and z slot
//!
//! # Removal race
//!
//! Delete starts an animation owned by the presentation layer. Whichever of
//! "animation done" and the timeout deadline fires first finalizes the
//! removal; the loser finds nothing pending and no-ops. An undo that lands
//! mid-animation clears the flag and cancels the pending entry instead of
//! resurrecting from the graveyard.

use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};
use web_time::{Duration, Instant};

use pinboard_core::{Offset, Point, Rect, RectPatch, ScaleContext, Transform, WheelEvent, ZoomLimits};
use pinboard_history::{Checkpoint, CommandError, CommandResult, History, Undoable};

use crate::arrange::{DEFAULT_CELL, pack};
use crate::error::CanvasError;
use crate::gesture::{ResizeEdges, ZoomPanController, resize_rect};
use crate::panel::{DATASET_RECT_KEY, Panel, PanelConfig, PanelFlags, PanelId, PanelKind};
use crate::plugin::{MountReason, PanelModel, PluginRegistry};
use crate::snapshot::{BOARD_SCHEMA_VERSION, BoardSnapshot};

/// Tuning knobs for a board. All have workable defaults.
#[derive(Debug, Clone)]
pub struct BoardOptions {
    /// The rectangle a maximized panel fills.
    pub viewport: Rect,
    /// Geometry for `null` rect slots in a config.
    pub default_rect: Rect,
    /// Resize floor as `(width, height)`.
    pub min_panel_size: (f64, f64),
    pub zoom_limits: ZoomLimits,
    /// How long a removal animation may run before the board finalizes
    /// the removal anyway.
    pub removal_timeout: Duration,
    /// Offset applied to a duplicated panel so it does not cover its source.
    pub duplicate_offset: Point,
    /// Grid cell size for arrange packing.
    pub arrange_cell: f64,
}

impl Default for BoardOptions {
    fn default() -> Self {
        Self {
            viewport: Rect::new(0.0, 0.0, 1280.0, 800.0),
            default_rect: Rect::new(0.0, 0.0, 300.0, 200.0),
            min_panel_size: (100.0, 80.0),
            zoom_limits: ZoomLimits::default(),
            removal_timeout: Duration::from_millis(400),
            duplicate_offset: Point::new(20.0, 20.0),
            arrange_cell: DEFAULT_CELL,
        }
    }
}

#[derive(Debug)]
struct PendingRemoval {
    id: PanelId,
    deadline: Instant,
}

/// The mutable document: panels, camera, plugin registry, removal queues.
///
/// Commands mutate this; [`Board`] decides what becomes a command.
pub struct BoardState {
    panels: Vec<Panel>,
    transform: Transform,
    offset: Offset,
    scale: ScaleContext,
    next_z: u32,
    registry: PluginRegistry,
    /// Finalized removals kept alive for undo resurrection.
    graveyard: FxHashMap<PanelId, Panel>,
    pending_removals: Vec<PendingRemoval>,
    options: BoardOptions,
}

impl std::fmt::Debug for BoardState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardState")
            .field("panels", &self.panels.len())
            .field("transform", &self.transform)
            .field("offset", &self.offset)
            .field("graveyard", &self.graveyard.len())
            .field("pending_removals", &self.pending_removals.len())
            .finish()
    }
}

impl BoardState {
    fn new(options: BoardOptions, registry: PluginRegistry, scale: ScaleContext) -> Self {
        Self {
            panels: Vec::new(),
            transform: Transform::default(),
            offset: Offset::default(),
            scale,
            next_z: 1,
            registry,
            graveyard: FxHashMap::default(),
            pending_removals: Vec::new(),
            options,
        }
    }

    /// Live panels, bottom-to-top.
    #[must_use]
    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    #[must_use]
    pub fn panel(&self, id: PanelId) -> Option<&Panel> {
        self.panels.iter().find(|p| p.id() == id)
    }

    pub fn panel_mut(&mut self, id: PanelId) -> Option<&mut Panel> {
        self.panels.iter_mut().find(|p| p.id() == id)
    }

    #[must_use]
    pub fn transform(&self) -> Transform {
        self.transform
    }

    #[must_use]
    pub fn offset(&self) -> Offset {
        self.offset
    }

    #[must_use]
    pub fn options(&self) -> &BoardOptions {
        &self.options
    }

    fn index_of(&self, id: PanelId) -> Option<usize> {
        self.panels.iter().position(|p| p.id() == id)
    }

    fn take_z(&mut self) -> u32 {
        let z = self.next_z;
        self.next_z += 1;
        z
    }

    /// Move a panel to the end of the collection with a fresh top z.
    fn move_to_top(&mut self, id: PanelId) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        let mut panel = self.panels.remove(idx);
        let z = self.take_z();
        panel.set_z_index(z);
        self.panels.push(panel);
        true
    }

    /// Build a panel from its config, push it on top, and mount its model.
    ///
    /// Creation assigns a fresh top z; restore keeps the persisted z and
    /// advances the counter past it.
    fn spawn_from_config(
        &mut self,
        config: PanelConfig,
        reason: MountReason,
    ) -> Result<PanelId, CanvasError> {
        if let Some(key) = config.type_key.as_deref() {
            if !self.registry.contains(key) {
                return Err(CanvasError::UnknownPanelType {
                    type_key: key.to_string(),
                });
            }
        }
        let id = config.id;
        let mut panel = Panel::from_config(config, self.options.default_rect);
        match reason {
            MountReason::Create => {
                let z = self.take_z();
                panel.set_z_index(z);
            }
            MountReason::Restore => {
                self.next_z = self.next_z.max(panel.z_index() + 1);
            }
        }
        self.panels.push(panel);
        let idx = self.panels.len() - 1;
        let BoardState { panels, registry, .. } = self;
        let panel = &mut panels[idx];
        if let Some(key) = panel.type_key().map(str::to_string) {
            registry.resolve_mut(&key)?.on_mount(panel, reason);
        }
        debug!(%id, ?reason, "panel spawned");
        Ok(id)
    }

    /// Flag a panel deleted and queue its removal deadline. The panel stays
    /// in the collection until the animation finishes or times out.
    fn soft_remove(&mut self, id: PanelId) {
        let deadline = Instant::now() + self.options.removal_timeout;
        let BoardState {
            panels,
            registry,
            pending_removals,
            ..
        } = self;
        let Some(panel) = panels.iter_mut().find(|p| p.id() == id) else {
            return;
        };
        panel.set_flag(PanelFlags::DELETED, true);
        if let Some(key) = panel.type_key().map(str::to_string) {
            match registry.resolve_mut(&key) {
                Ok(model) => model.on_delete(panel),
                Err(_) => warn!(%id, key, "no model for deleted panel"),
            }
        }
        pending_removals.push(PendingRemoval { id, deadline });
    }

    fn cancel_pending(&mut self, id: PanelId) {
        self.pending_removals.retain(|p| p.id != id);
    }

    /// Remove a deleted panel from the collection into the graveyard.
    /// Returns false if it was already finalized (or never deleted).
    fn finalize_removal(&mut self, id: PanelId) -> bool {
        self.cancel_pending(id);
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        if !self.panels[idx].flags().contains(PanelFlags::DELETED) {
            return false;
        }
        let panel = self.panels.remove(idx);
        self.graveyard.insert(id, panel);
        debug!(%id, "removal finalized");
        true
    }

    /// Bring a deleted panel back, whichever side of finalization it is on.
    fn resurrect(&mut self, id: PanelId, index: usize, z: u32) -> CommandResult {
        self.cancel_pending(id);
        if let Some(panel) = self.panel_mut(id) {
            // Undo landed mid-animation; the panel never left.
            panel.set_flag(PanelFlags::DELETED, false);
            return Ok(());
        }
        let Some(mut panel) = self.graveyard.remove(&id) else {
            return Err(CommandError::TargetNotFound { id: id.to_string() });
        };
        panel.set_flag(PanelFlags::DELETED, false);
        panel.set_z_index(z);
        let index = index.min(self.panels.len());
        self.panels.insert(index, panel);
        self.next_z = self.next_z.max(z + 1);
        Ok(())
    }

    /// Remove a panel immediately with no history entry and no resurrection.
    fn force_delete(&mut self, id: PanelId) -> bool {
        self.cancel_pending(id);
        if self.graveyard.remove(&id).is_some() {
            return true;
        }
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        let BoardState { panels, registry, .. } = self;
        let panel = &mut panels[idx];
        if let Some(key) = panel.type_key().map(str::to_string) {
            if let Ok(model) = registry.resolve_mut(&key) {
                model.on_delete(panel);
            }
        }
        self.panels.remove(idx);
        true
    }

    fn force_delete_all(&mut self) {
        let BoardState { panels, registry, .. } = self;
        for panel in panels.iter_mut() {
            if let Some(key) = panel.type_key().map(str::to_string) {
                if let Ok(model) = registry.resolve_mut(&key) {
                    model.on_delete(panel);
                }
            }
        }
        self.panels.clear();
        self.graveyard.clear();
        self.pending_removals.clear();
    }

    /// Serialize every live panel, giving each model a chance to refresh
    /// its opaque config first. Panels mid-removal are not persisted.
    fn save_configs(&mut self) -> Result<Vec<PanelConfig>, CanvasError> {
        let BoardState { panels, registry, .. } = self;
        let mut out = Vec::with_capacity(panels.len());
        for panel in panels.iter_mut() {
            if panel.flags().contains(PanelFlags::DELETED) {
                continue;
            }
            if let Some(key) = panel.type_key().map(str::to_string) {
                if let Some(value) = registry.resolve_mut(&key)?.on_save(panel) {
                    panel.set_plugin_config(Some(value));
                }
            }
            out.push(panel.save());
        }
        Ok(out)
    }
}

// ===========================================================================
// Commands
// ===========================================================================

fn not_found(id: PanelId) -> CommandError {
    CommandError::TargetNotFound { id: id.to_string() }
}

struct CreateCmd {
    label: &'static str,
    config: PanelConfig,
}

impl Undoable<BoardState> for CreateCmd {
    fn execute(&mut self, state: &mut BoardState) -> CommandResult {
        state
            .spawn_from_config(self.config.clone(), MountReason::Create)
            .map_err(|e| CommandError::InvalidState(e.to_string()))?;
        Ok(())
    }

    fn undo(&mut self, state: &mut BoardState) -> CommandResult {
        if state.force_delete(self.config.id) {
            Ok(())
        } else {
            Err(not_found(self.config.id))
        }
    }

    fn label(&self) -> &str {
        self.label
    }
}

struct DeleteCmd {
    id: PanelId,
    saved_index: usize,
    saved_z: u32,
}

impl Undoable<BoardState> for DeleteCmd {
    fn execute(&mut self, state: &mut BoardState) -> CommandResult {
        let idx = state.index_of(self.id).ok_or_else(|| not_found(self.id))?;
        self.saved_index = idx;
        self.saved_z = state.panels[idx].z_index();
        state.soft_remove(self.id);
        Ok(())
    }

    fn undo(&mut self, state: &mut BoardState) -> CommandResult {
        state.resurrect(self.id, self.saved_index, self.saved_z)
    }

    fn label(&self) -> &str {
        "delete sticky"
    }
}

/// One geometry jump; drag and resize coalescing overwrite these in place.
struct SetRectCmd {
    label: &'static str,
    id: PanelId,
    from: Rect,
    to: Rect,
}

impl SetRectCmd {
    fn apply(&self, state: &mut BoardState, rect: Rect) -> CommandResult {
        let panel = state.panel_mut(self.id).ok_or_else(|| not_found(self.id))?;
        panel.set_rect(rect);
        Ok(())
    }
}

impl Undoable<BoardState> for SetRectCmd {
    fn execute(&mut self, state: &mut BoardState) -> CommandResult {
        self.apply(state, self.to)
    }

    fn undo(&mut self, state: &mut BoardState) -> CommandResult {
        self.apply(state, self.from)
    }

    fn label(&self) -> &str {
        self.label
    }
}

struct ToggleMaximizeCmd {
    id: PanelId,
    /// Rectangle before this toggle ran.
    prev_rect: Rect,
    was_maximized: bool,
    /// Restore target when leaving maximized state.
    cached: Option<Rect>,
    /// Dataset cache entry before this toggle, for exact undo.
    prev_cache: Option<String>,
}

impl Undoable<BoardState> for ToggleMaximizeCmd {
    fn execute(&mut self, state: &mut BoardState) -> CommandResult {
        let viewport = state.options.viewport;
        let default_rect = state.options.default_rect;
        let panel = state.panel_mut(self.id).ok_or_else(|| not_found(self.id))?;
        if self.was_maximized {
            panel.set_rect(self.cached.unwrap_or(default_rect));
            panel.set_flag(PanelFlags::MAXIMIZED, false);
        } else {
            panel.cache_rect();
            panel.set_rect(viewport);
            panel.set_flag(PanelFlags::MAXIMIZED, true);
        }
        Ok(())
    }

    fn undo(&mut self, state: &mut BoardState) -> CommandResult {
        let panel = state.panel_mut(self.id).ok_or_else(|| not_found(self.id))?;
        panel.set_rect(self.prev_rect);
        panel.set_flag(PanelFlags::MAXIMIZED, self.was_maximized);
        if !self.was_maximized {
            // execute() overwrote the cache slot; put the old value back.
            match &self.prev_cache {
                Some(text) => {
                    panel
                        .dataset_mut()
                        .insert(DATASET_RECT_KEY.to_string(), text.clone());
                }
                None => {
                    panel.dataset_mut().remove(DATASET_RECT_KEY);
                }
            }
        }
        Ok(())
    }

    fn label(&self) -> &str {
        "toggle maximize"
    }
}

/// Grabbing a maximized panel shrinks it under the cursor before the drag.
struct MinimizeToCursorCmd {
    id: PanelId,
    restored: Rect,
    maximized_rect: Rect,
}

impl Undoable<BoardState> for MinimizeToCursorCmd {
    fn execute(&mut self, state: &mut BoardState) -> CommandResult {
        let panel = state.panel_mut(self.id).ok_or_else(|| not_found(self.id))?;
        panel.set_rect(self.restored);
        panel.set_flag(PanelFlags::MAXIMIZED, false);
        Ok(())
    }

    fn undo(&mut self, state: &mut BoardState) -> CommandResult {
        let panel = state.panel_mut(self.id).ok_or_else(|| not_found(self.id))?;
        panel.set_rect(self.maximized_rect);
        panel.set_flag(PanelFlags::MAXIMIZED, true);
        Ok(())
    }

    fn label(&self) -> &str {
        "restore from maximized"
    }
}

/// Self-inverse flag flip (pin, ghost).
struct ToggleFlagCmd {
    id: PanelId,
    flag: PanelFlags,
    label: &'static str,
}

impl ToggleFlagCmd {
    fn flip(&self, state: &mut BoardState) -> CommandResult {
        let panel = state.panel_mut(self.id).ok_or_else(|| not_found(self.id))?;
        panel.toggle_flag(self.flag);
        Ok(())
    }
}

impl Undoable<BoardState> for ToggleFlagCmd {
    fn execute(&mut self, state: &mut BoardState) -> CommandResult {
        self.flip(state)
    }

    fn undo(&mut self, state: &mut BoardState) -> CommandResult {
        self.flip(state)
    }

    fn label(&self) -> &str {
        self.label
    }
}

/// One arrangement: every target's before/after rect plus the camera reset.
struct ArrangeCmd {
    moves: Vec<(PanelId, Rect, Rect)>,
    before_transform: Transform,
    before_offset: Offset,
}

impl Undoable<BoardState> for ArrangeCmd {
    fn execute(&mut self, state: &mut BoardState) -> CommandResult {
        for (id, _, to) in &self.moves {
            let panel = state.panel_mut(*id).ok_or_else(|| not_found(*id))?;
            panel.set_rect(*to);
        }
        state.transform = Transform::default();
        state.offset = Offset::default();
        state.scale.set(1.0);
        Ok(())
    }

    fn undo(&mut self, state: &mut BoardState) -> CommandResult {
        for (id, from, _) in &self.moves {
            let panel = state.panel_mut(*id).ok_or_else(|| not_found(*id))?;
            panel.set_rect(*from);
        }
        state.transform = self.before_transform;
        state.offset = self.before_offset;
        state.scale.set(self.before_transform.scale);
        Ok(())
    }

    fn label(&self) -> &str {
        "arrange stickies"
    }
}

// ===========================================================================
// Board
// ===========================================================================

struct DragSession {
    id: PanelId,
    checkpoint: Checkpoint<BoardState>,
    origin: Rect,
    accum: Point,
}

struct ResizeSession {
    id: PanelId,
    edges: ResizeEdges,
    checkpoint: Checkpoint<BoardState>,
    origin: Rect,
    accum: Point,
}

/// Hook run just before a snapshot is taken; may flush live state into
/// panel datasets.
pub type BeforeSaveHook = Box<dyn FnMut(&mut BoardState)>;
/// Hook run after a snapshot restore completes.
pub type AfterLoadHook = Box<dyn FnMut(&BoardState)>;

/// The board orchestrator.
pub struct Board {
    state: BoardState,
    history: History<BoardState>,
    zoom: ZoomPanController,
    drag: Option<DragSession>,
    resize: Option<ResizeSession>,
    before_save: Vec<BeforeSaveHook>,
    after_load: Vec<AfterLoadHook>,
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Board")
            .field("state", &self.state)
            .field("history", &self.history)
            .field("dragging", &self.drag.is_some())
            .field("resizing", &self.resize.is_some())
            .finish()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BoardOptions::default(), PluginRegistry::new())
    }
}

impl Board {
    #[must_use]
    pub fn new(options: BoardOptions, registry: PluginRegistry) -> Self {
        let scale = ScaleContext::new(1.0);
        let zoom = ZoomPanController::new(scale.clone(), options.zoom_limits);
        Self {
            state: BoardState::new(options, registry, scale),
            history: History::new(),
            zoom,
            drag: None,
            resize: None,
            before_save: Vec::new(),
            after_load: Vec::new(),
        }
    }

    // -- accessors ---------------------------------------------------------

    #[must_use]
    pub fn state(&self) -> &BoardState {
        &self.state
    }

    /// Live panels, bottom-to-top.
    #[must_use]
    pub fn panels(&self) -> &[Panel] {
        self.state.panels()
    }

    #[must_use]
    pub fn panel(&self, id: PanelId) -> Option<&Panel> {
        self.state.panel(id)
    }

    /// The topmost panel not mid-removal. Derived from the live collection
    /// on every call rather than cached, so delete-then-query is always
    /// consistent.
    #[must_use]
    pub fn latest_panel(&self) -> Option<&Panel> {
        self.state
            .panels
            .iter()
            .rev()
            .find(|p| !p.flags().contains(PanelFlags::DELETED))
    }

    #[must_use]
    pub fn transform(&self) -> Transform {
        self.state.transform
    }

    #[must_use]
    pub fn offset(&self) -> Offset {
        self.state.offset
    }

    /// Handle onto the live scale, for wiring external gesture controllers.
    #[must_use]
    pub fn scale_context(&self) -> ScaleContext {
        self.state.scale.clone()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// History entry labels, oldest first.
    #[must_use]
    pub fn history_labels(&self) -> Vec<&str> {
        self.history.labels()
    }

    /// Register a panel model for a type key.
    pub fn register_plugin(&mut self, type_key: impl Into<String>, model: Box<dyn PanelModel>) {
        self.state.registry.register(type_key, model);
    }

    // -- lifecycle ---------------------------------------------------------

    /// Create a panel from its config, on top of the stack. Undoable.
    ///
    /// A config naming an unregistered type is rejected before anything
    /// mutates.
    pub fn create_sticky(&mut self, config: PanelConfig) -> Result<PanelId, CanvasError> {
        if let Some(key) = config.type_key.as_deref() {
            if !self.state.registry.contains(key) {
                return Err(CanvasError::UnknownPanelType {
                    type_key: key.to_string(),
                });
            }
        }
        let id = config.id;
        let cmd = CreateCmd {
            label: "create sticky",
            config,
        };
        self.history
            .write(&mut self.state, Box::new(cmd))
            .map_err(CanvasError::Command)?;
        Ok(id)
    }

    /// Rebuild a panel from a persisted config without a history entry.
    /// Bulk-load path; the model mounts with [`MountReason::Restore`].
    pub fn restore_sticky(&mut self, config: PanelConfig) -> Result<PanelId, CanvasError> {
        self.state.spawn_from_config(config, MountReason::Restore)
    }

    /// Clone a panel's full persisted state under a fresh id, offset so it
    /// does not cover its source. Undoable.
    pub fn duplicate(&mut self, id: PanelId) -> Result<PanelId, CanvasError> {
        let source = self
            .state
            .panel(id)
            .ok_or(CanvasError::PanelNotFound { id })?;
        let mut config = source.save();
        config.id = PanelId::random();
        config.flags.remove(PanelFlags::DELETED);
        let off = self.state.options.duplicate_offset;
        config.rect = RectPatch {
            left: config.rect.left.map(|v| v + off.x),
            top: config.rect.top.map(|v| v + off.y),
            ..config.rect
        };
        let new_id = config.id;
        let cmd = CreateCmd {
            label: "duplicate sticky",
            config,
        };
        self.history
            .write(&mut self.state, Box::new(cmd))
            .map_err(CanvasError::Command)?;
        Ok(new_id)
    }

    /// Start a panel's removal. The panel stays visible (flagged) until the
    /// removal animation completes or times out. Undoable at any point.
    pub fn delete(&mut self, id: PanelId) -> Result<(), CanvasError> {
        if self.state.index_of(id).is_none() {
            return Err(CanvasError::PanelNotFound { id });
        }
        let cmd = DeleteCmd {
            id,
            saved_index: 0,
            saved_z: 0,
        };
        self.history
            .write(&mut self.state, Box::new(cmd))
            .map_err(CanvasError::Command)
    }

    /// Remove a panel immediately, bypassing history and animation.
    pub fn force_delete(&mut self, id: PanelId) -> bool {
        self.state.force_delete(id)
    }

    /// Remove every panel immediately, bypassing history and animation.
    /// Any active gesture session is dropped with its target.
    pub fn force_delete_all(&mut self) {
        self.drag = None;
        self.resize = None;
        self.state.force_delete_all();
    }

    /// The presentation layer finished a removal animation.
    pub fn notify_removal_animation_done(&mut self, id: PanelId) -> bool {
        if !self.state.pending_removals.iter().any(|p| p.id == id) {
            return false;
        }
        self.state.finalize_removal(id)
    }

    /// Finalize every pending removal whose deadline has passed.
    pub fn tick(&mut self, now: Instant) -> Vec<PanelId> {
        let due: Vec<PanelId> = self
            .state
            .pending_removals
            .iter()
            .filter(|p| p.deadline <= now)
            .map(|p| p.id)
            .collect();
        for id in &due {
            self.state.finalize_removal(*id);
        }
        due
    }

    /// Raise a panel to the top of the stack. Not recorded in history:
    /// focus changes are not edits.
    pub fn move_to_top(&mut self, id: PanelId) -> bool {
        self.state.move_to_top(id)
    }

    // -- flags -------------------------------------------------------------

    /// Toggle between maximized (filling the viewport) and the cached
    /// pre-maximize rectangle. Undoable.
    pub fn toggle_maximize(&mut self, id: PanelId) -> Result<(), CanvasError> {
        let (prev_rect, was_maximized, cached, prev_cache) = {
            let panel = self
                .state
                .panel(id)
                .ok_or(CanvasError::PanelNotFound { id })?;
            (
                panel.rect(),
                panel.is_maximized(),
                panel.cached_rect()?,
                panel.dataset().get(DATASET_RECT_KEY).cloned(),
            )
        };
        let cmd = ToggleMaximizeCmd {
            id,
            prev_rect,
            was_maximized,
            cached,
            prev_cache,
        };
        self.history
            .write(&mut self.state, Box::new(cmd))
            .map_err(CanvasError::Command)
    }

    /// Toggle the pin flag. Undoable.
    pub fn toggle_pin(&mut self, id: PanelId) -> Result<(), CanvasError> {
        self.toggle_flag(id, PanelFlags::PINNED, "toggle pin")
    }

    /// Toggle the ghost flag. Undoable.
    pub fn toggle_ghost(&mut self, id: PanelId) -> Result<(), CanvasError> {
        self.toggle_flag(id, PanelFlags::GHOST, "toggle ghost")
    }

    fn toggle_flag(
        &mut self,
        id: PanelId,
        flag: PanelFlags,
        label: &'static str,
    ) -> Result<(), CanvasError> {
        if self.state.index_of(id).is_none() {
            return Err(CanvasError::PanelNotFound { id });
        }
        let cmd = ToggleFlagCmd { id, flag, label };
        self.history
            .write(&mut self.state, Box::new(cmd))
            .map_err(CanvasError::Command)
    }

    // -- drag --------------------------------------------------------------

    /// Begin dragging a panel. Returns false (and starts nothing) for a
    /// pinned panel. Grabbing a maximized panel first restores it centered
    /// under `pointer` as its own undoable step, then drags the restored
    /// rectangle.
    pub fn begin_drag(&mut self, id: PanelId, pointer: Point) -> Result<bool, CanvasError> {
        let (pinned, maximized, current_rect, cached) = {
            let panel = self
                .state
                .panel(id)
                .ok_or(CanvasError::PanelNotFound { id })?;
            (
                panel.is_pinned(),
                panel.is_maximized(),
                panel.rect(),
                panel.cached_rect()?,
            )
        };
        if pinned {
            return Ok(false);
        }
        self.state.move_to_top(id);
        let origin = if maximized {
            let restored = cached
                .unwrap_or(self.state.options.default_rect)
                .centered_at(pointer);
            let cmd = MinimizeToCursorCmd {
                id,
                restored,
                maximized_rect: current_rect,
            };
            self.history
                .write(&mut self.state, Box::new(cmd))
                .map_err(CanvasError::Command)?;
            restored
        } else {
            current_rect
        };
        self.drag = Some(DragSession {
            id,
            checkpoint: Checkpoint::new(),
            origin,
            accum: Point::default(),
        });
        Ok(true)
    }

    /// Apply one screen-space drag delta. Coalesces into a single history
    /// entry for the whole gesture. No-op when no drag is active.
    pub fn drag_by(&mut self, screen_delta: Point) -> Result<(), CanvasError> {
        let scale = self.state.scale.get();
        let Some(session) = self.drag.as_mut() else {
            return Ok(());
        };
        session.accum = session.accum.offset_by(screen_delta.to_content(scale));
        let cmd = SetRectCmd {
            label: "move sticky",
            id: session.id,
            from: session.origin,
            to: session.origin.translated(session.accum.x, session.accum.y),
        };
        session
            .checkpoint
            .overwrite(&mut self.history, &mut self.state, Box::new(cmd))
            .map_err(CanvasError::Command)
    }

    /// End the drag, committing whatever the last delta produced.
    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    // -- resize ------------------------------------------------------------

    /// Begin resizing from a handle. Returns false for a pinned panel.
    pub fn begin_resize(&mut self, id: PanelId, edges: ResizeEdges) -> Result<bool, CanvasError> {
        let (pinned, origin) = {
            let panel = self
                .state
                .panel(id)
                .ok_or(CanvasError::PanelNotFound { id })?;
            (panel.is_pinned(), panel.rect())
        };
        if pinned {
            return Ok(false);
        }
        self.state.move_to_top(id);
        self.resize = Some(ResizeSession {
            id,
            edges,
            checkpoint: Checkpoint::new(),
            origin,
            accum: Point::default(),
        });
        Ok(true)
    }

    /// Apply one screen-space resize delta, coalesced like drags.
    pub fn resize_by(&mut self, screen_delta: Point) -> Result<(), CanvasError> {
        let scale = self.state.scale.get();
        let min = self.state.options.min_panel_size;
        let Some(session) = self.resize.as_mut() else {
            return Ok(());
        };
        session.accum = session.accum.offset_by(screen_delta.to_content(scale));
        let cmd = SetRectCmd {
            label: "resize sticky",
            id: session.id,
            from: session.origin,
            to: resize_rect(&session.origin, session.edges, session.accum, min),
        };
        session
            .checkpoint
            .overwrite(&mut self.history, &mut self.state, Box::new(cmd))
            .map_err(CanvasError::Command)
    }

    pub fn end_resize(&mut self) {
        self.resize = None;
    }

    #[must_use]
    pub fn is_resizing(&self) -> bool {
        self.resize.is_some()
    }

    // -- arrange -----------------------------------------------------------

    /// Pack every unpinned sticky into a first-fit grid and reset the
    /// camera. One undoable step restores every rectangle and the camera.
    pub fn arrange(&mut self, container_width: f64) -> Result<(), CanvasError> {
        let targets: Vec<(PanelId, Rect)> = self
            .state
            .panels
            .iter()
            .filter(|p| matches!(p.kind(), PanelKind::Sticky))
            .filter(|p| !p.is_pinned() && !p.flags().contains(PanelFlags::DELETED))
            .map(|p| (p.id(), p.rect()))
            .collect();
        if targets.is_empty() {
            return Ok(());
        }
        let sizes: Vec<Rect> = targets.iter().map(|(_, r)| *r).collect();
        let positions = pack(container_width, &sizes, self.state.options.arrange_cell);
        let moves = targets
            .iter()
            .zip(positions)
            .map(|((id, before), pos)| {
                (
                    *id,
                    *before,
                    Rect::new(pos.x, pos.y, before.width, before.height),
                )
            })
            .collect();
        let cmd = ArrangeCmd {
            moves,
            before_transform: self.state.transform,
            before_offset: self.state.offset,
        };
        self.history
            .write(&mut self.state, Box::new(cmd))
            .map_err(CanvasError::Command)
    }

    // -- camera ------------------------------------------------------------

    /// Feed a wheel event; only ctrl+wheel zooms. Never recorded in history.
    pub fn zoom_wheel(&mut self, ev: &WheelEvent) -> bool {
        self.zoom.on_wheel(&mut self.state.transform, ev)
    }

    pub fn zoom_in(&mut self) {
        let center = self.viewport_center();
        self.zoom.zoom_in(&mut self.state.transform, center);
    }

    pub fn zoom_out(&mut self) {
        let center = self.viewport_center();
        self.zoom.zoom_out(&mut self.state.transform, center);
    }

    pub fn zoom_reset(&mut self) {
        let center = self.viewport_center();
        self.zoom.zoom_reset(&mut self.state.transform, center);
    }

    /// Shift the pan offset by a screen-space delta.
    pub fn pan_by(&mut self, delta: Point) {
        self.zoom.pan(&mut self.state.offset, delta);
    }

    fn viewport_center(&self) -> Point {
        let v = self.state.options.viewport;
        Point::new(v.left + v.width / 2.0, v.top + v.height / 2.0)
    }

    // -- history -----------------------------------------------------------

    /// Undo the most recent entry; `None` at the bottom of history.
    pub fn undo(&mut self) -> Option<CommandResult> {
        self.history.undo(&mut self.state)
    }

    /// Redo the next entry; `None` at the top of history.
    pub fn redo(&mut self) -> Option<CommandResult> {
        self.history.redo(&mut self.state)
    }

    // -- persistence -------------------------------------------------------

    /// Register a hook that runs just before every snapshot.
    pub fn on_before_save(&mut self, hook: BeforeSaveHook) {
        self.before_save.push(hook);
    }

    /// Register a hook that runs after every snapshot restore.
    pub fn on_after_load(&mut self, hook: AfterLoadHook) {
        self.after_load.push(hook);
    }

    /// Snapshot the whole board: camera plus every live panel in z-order.
    pub fn save_work(&mut self) -> Result<BoardSnapshot, CanvasError> {
        let mut hooks = std::mem::take(&mut self.before_save);
        for hook in &mut hooks {
            hook(&mut self.state);
        }
        self.before_save = hooks;
        let stickies = self.state.save_configs()?;
        Ok(BoardSnapshot {
            schema_version: BOARD_SCHEMA_VERSION,
            transform: self.state.transform,
            offset: self.state.offset,
            stickies,
        })
    }

    /// Validate a snapshot, then replace the whole board with it: all
    /// current panels are destroyed, history is cleared, and every panel in
    /// the snapshot is rebuilt and remounted.
    pub fn restore_and_replace_all(&mut self, snapshot: BoardSnapshot) -> Result<(), CanvasError> {
        snapshot.validate()?;
        self.drag = None;
        self.resize = None;
        self.state.force_delete_all();
        self.history.clear();
        self.state.transform = snapshot.transform;
        self.state.offset = snapshot.offset;
        self.state.scale.set(snapshot.transform.scale);
        for config in snapshot.stickies {
            self.state.spawn_from_config(config, MountReason::Restore)?;
        }
        let mut hooks = std::mem::take(&mut self.after_load);
        for hook in &mut hooks {
            hook(&self.state);
        }
        self.after_load = hooks;
        info!(panels = self.state.panels.len(), "board restored");
        Ok(())
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::PanelModel;
    use serde_json::Value;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn board() -> Board {
        Board::default()
    }

    fn sticky_at(left: f64, top: f64) -> PanelConfig {
        PanelConfig::sticky(RectPatch::full(left, top, 300.0, 200.0))
    }

    fn z_is_strictly_increasing(board: &Board) -> bool {
        board
            .panels()
            .windows(2)
            .all(|w| w[1].z_index() > w[0].z_index())
    }

    #[test]
    fn create_puts_panel_on_top() {
        let mut b = board();
        let a = b.create_sticky(sticky_at(0.0, 0.0)).unwrap();
        let c = b.create_sticky(sticky_at(10.0, 10.0)).unwrap();
        assert_eq!(b.panels().len(), 2);
        assert_eq!(b.latest_panel().unwrap().id(), c);
        assert!(z_is_strictly_increasing(&b));
        assert!(b.panel(a).is_some());
    }

    #[test]
    fn create_with_unknown_type_is_rejected_before_mutation() {
        let mut b = board();
        let mut config = sticky_at(0.0, 0.0);
        config.type_key = Some("markdown".to_string());
        let err = b.create_sticky(config).unwrap_err();
        assert!(matches!(err, CanvasError::UnknownPanelType { .. }));
        assert!(b.panels().is_empty());
        assert!(!b.can_undo());
    }

    #[test]
    fn undo_create_removes_redo_recreates() {
        let mut b = board();
        let id = b.create_sticky(sticky_at(0.0, 0.0)).unwrap();
        b.undo().unwrap().unwrap();
        assert!(b.panel(id).is_none());
        b.redo().unwrap().unwrap();
        assert!(b.panel(id).is_some());
    }

    #[test]
    fn restore_sticky_bypasses_history_and_keeps_z() {
        let mut b = board();
        let mut config = sticky_at(5.0, 5.0);
        config.z_index = 9;
        let id = b.restore_sticky(config).unwrap();
        assert!(!b.can_undo());
        assert_eq!(b.panel(id).unwrap().z_index(), 9);
        // The z counter advances past restored values.
        let top = b.create_sticky(sticky_at(0.0, 0.0)).unwrap();
        assert!(b.panel(top).unwrap().z_index() > 9);
    }

    #[test]
    fn delete_flags_then_finalizes_on_animation_done() {
        let mut b = board();
        let id = b.create_sticky(sticky_at(0.0, 0.0)).unwrap();
        b.delete(id).unwrap();
        // Still in the collection, but not the latest.
        assert!(b.panel(id).unwrap().flags().contains(PanelFlags::DELETED));
        assert!(b.latest_panel().is_none());
        assert!(b.notify_removal_animation_done(id));
        assert!(b.panel(id).is_none());
        // Second notification finds nothing pending.
        assert!(!b.notify_removal_animation_done(id));
    }

    #[test]
    fn tick_finalizes_after_deadline() {
        let mut b = board();
        let id = b.create_sticky(sticky_at(0.0, 0.0)).unwrap();
        b.delete(id).unwrap();
        assert!(b.tick(Instant::now()).is_empty(), "deadline not reached");
        let later = Instant::now() + Duration::from_secs(5);
        assert_eq!(b.tick(later), vec![id]);
        assert!(b.panel(id).is_none());
    }

    #[test]
    fn undo_delete_restores_identity_rect_and_z() {
        let mut b = board();
        let id = b.create_sticky(sticky_at(40.0, 50.0)).unwrap();
        let _top = b.create_sticky(sticky_at(0.0, 0.0)).unwrap();
        let before_z = b.panel(id).unwrap().z_index();
        b.delete(id).unwrap();
        b.notify_removal_animation_done(id);
        assert!(b.panel(id).is_none());

        b.undo().unwrap().unwrap();
        let back = b.panel(id).unwrap();
        assert_eq!(back.rect(), Rect::new(40.0, 50.0, 300.0, 200.0));
        assert_eq!(back.z_index(), before_z);
        assert_eq!(b.state().index_of(id), Some(0), "restored to its slot");
        assert!(z_is_strictly_increasing(&b));
    }

    #[test]
    fn undo_delete_mid_animation_just_clears_the_flag() {
        let mut b = board();
        let id = b.create_sticky(sticky_at(0.0, 0.0)).unwrap();
        b.delete(id).unwrap();
        b.undo().unwrap().unwrap();
        assert!(!b.panel(id).unwrap().flags().contains(PanelFlags::DELETED));
        // The stale animation-done callback finds nothing pending.
        assert!(!b.notify_removal_animation_done(id));
        assert!(b.panel(id).is_some());
    }

    #[test]
    fn duplicate_copies_state_under_fresh_id() {
        let mut b = board();
        let id = b.create_sticky(sticky_at(100.0, 100.0)).unwrap();
        b.state.panel_mut(id).unwrap().dataset_mut().insert(
            "color".to_string(),
            "yellow".to_string(),
        );
        let copy = b.duplicate(id).unwrap();
        assert_ne!(copy, id);
        let dup = b.panel(copy).unwrap();
        assert_eq!(dup.rect(), Rect::new(120.0, 120.0, 300.0, 200.0));
        assert_eq!(dup.dataset().get("color").unwrap(), "yellow");
        assert_eq!(b.latest_panel().unwrap().id(), copy);
    }

    #[test]
    fn drag_coalesces_to_one_history_entry() {
        let mut b = board();
        let id = b.create_sticky(sticky_at(0.0, 0.0)).unwrap();
        let depth_before = b.history_labels().len();
        assert!(b.begin_drag(id, Point::new(0.0, 0.0)).unwrap());
        for _ in 0..10 {
            b.drag_by(Point::new(5.0, 5.0)).unwrap();
        }
        b.end_drag();
        assert_eq!(b.history_labels().len(), depth_before + 1);
        assert_eq!(b.panel(id).unwrap().rect().left, 50.0);
        b.undo().unwrap().unwrap();
        assert_eq!(b.panel(id).unwrap().rect().left, 0.0, "one undo reverts all");
    }

    #[test]
    fn undo_mid_drag_starts_a_fresh_history_entry() {
        let mut b = board();
        let id = b.create_sticky(sticky_at(0.0, 0.0)).unwrap();
        assert!(b.begin_drag(id, Point::new(0.0, 0.0)).unwrap());
        b.drag_by(Point::new(10.0, 0.0)).unwrap();
        b.undo().unwrap().unwrap();
        assert_eq!(b.panel(id).unwrap().rect().left, 0.0);

        // The held drag keeps going; the next frame must not execute into
        // the undone entry behind the cursor.
        b.drag_by(Point::new(5.0, 0.0)).unwrap();
        b.end_drag();
        assert_eq!(b.panel(id).unwrap().rect().left, 15.0);
        assert_eq!(b.history_labels(), vec!["create sticky", "move sticky"]);
        b.undo().unwrap().unwrap();
        assert_eq!(b.panel(id).unwrap().rect().left, 0.0);
        b.undo().unwrap().unwrap();
        assert!(b.panel(id).is_none());
    }

    #[test]
    fn drag_deltas_divide_by_live_scale() {
        let mut b = board();
        let id = b.create_sticky(sticky_at(0.0, 0.0)).unwrap();
        b.zoom_wheel(&WheelEvent {
            pos: Point::new(0.0, 0.0),
            delta_y: -1.0,
            ctrl: true,
        });
        let scale = b.transform().scale;
        b.begin_drag(id, Point::new(0.0, 0.0)).unwrap();
        b.drag_by(Point::new(50.0, 50.0)).unwrap();
        let rect = b.panel(id).unwrap().rect();
        assert!((rect.left - 50.0 / scale).abs() < 1e-9);
    }

    #[test]
    fn pinned_panel_refuses_drag_and_resize() {
        let mut b = board();
        let id = b.create_sticky(sticky_at(0.0, 0.0)).unwrap();
        b.toggle_pin(id).unwrap();
        assert!(!b.begin_drag(id, Point::new(0.0, 0.0)).unwrap());
        assert!(!b.begin_resize(id, ResizeEdges::EAST).unwrap());
        assert!(!b.is_dragging());
        assert!(!b.is_resizing());
    }

    #[test]
    fn dragging_maximized_panel_restores_under_cursor_first() {
        let mut b = board();
        let id = b.create_sticky(sticky_at(100.0, 100.0)).unwrap();
        b.toggle_maximize(id).unwrap();
        assert!(b.panel(id).unwrap().is_maximized());

        b.begin_drag(id, Point::new(400.0, 300.0)).unwrap();
        let panel = b.panel(id).unwrap();
        assert!(!panel.is_maximized());
        let rect = panel.rect();
        assert_eq!(rect.left + rect.width / 2.0, 400.0);
        assert_eq!(rect.top + rect.height / 2.0, 300.0);
        // The restore is its own undoable step before the drag entry.
        b.end_drag();
        b.undo().unwrap().unwrap();
        assert!(b.panel(id).unwrap().is_maximized());
    }

    #[test]
    fn resize_coalesces_and_respects_floor() {
        let mut b = board();
        let id = b.create_sticky(sticky_at(0.0, 0.0)).unwrap();
        let depth_before = b.history_labels().len();
        assert!(b.begin_resize(id, ResizeEdges::WEST).unwrap());
        b.resize_by(Point::new(1000.0, 0.0)).unwrap();
        b.resize_by(Point::new(10.0, 0.0)).unwrap();
        b.end_resize();
        assert_eq!(b.history_labels().len(), depth_before + 1);
        let rect = b.panel(id).unwrap().rect();
        assert_eq!(rect.width, 100.0, "clamped to the floor");
        assert_eq!(rect.right(), 300.0, "east edge stationary");
    }

    #[test]
    fn maximize_round_trip_via_undo() {
        let mut b = board();
        let id = b.create_sticky(sticky_at(25.0, 35.0)).unwrap();
        b.toggle_maximize(id).unwrap();
        let viewport = b.state().options().viewport;
        assert_eq!(b.panel(id).unwrap().rect(), viewport);
        b.toggle_maximize(id).unwrap();
        assert_eq!(b.panel(id).unwrap().rect(), Rect::new(25.0, 35.0, 300.0, 200.0));
        b.undo().unwrap().unwrap();
        assert!(b.panel(id).unwrap().is_maximized());
        b.undo().unwrap().unwrap();
        let panel = b.panel(id).unwrap();
        assert!(!panel.is_maximized());
        assert_eq!(panel.rect(), Rect::new(25.0, 35.0, 300.0, 200.0));
        assert!(panel.dataset().get(DATASET_RECT_KEY).is_none(), "cache undone");
    }

    #[test]
    fn arrange_moves_resets_camera_and_undoes_as_one() {
        let mut b = board();
        let a = b.create_sticky(sticky_at(500.0, 500.0)).unwrap();
        let c = b.create_sticky(sticky_at(900.0, 100.0)).unwrap();
        b.pan_by(Point::new(77.0, -3.0));
        b.arrange(300.0).unwrap();

        // Two 300x200 rects in a 300-wide container stack vertically.
        assert_eq!(b.panel(a).unwrap().rect(), Rect::new(0.0, 0.0, 300.0, 200.0));
        assert_eq!(b.panel(c).unwrap().rect(), Rect::new(0.0, 200.0, 300.0, 200.0));
        assert_eq!(b.offset(), Offset::default());
        assert_eq!(b.transform(), Transform::default());

        b.undo().unwrap().unwrap();
        assert_eq!(b.panel(a).unwrap().rect(), Rect::new(500.0, 500.0, 300.0, 200.0));
        assert_eq!(b.panel(c).unwrap().rect(), Rect::new(900.0, 100.0, 300.0, 200.0));
        assert_eq!(b.offset().offset_left, 77.0);
    }

    #[test]
    fn arrange_skips_pinned_panels() {
        let mut b = board();
        let pinned = b.create_sticky(sticky_at(500.0, 500.0)).unwrap();
        b.toggle_pin(pinned).unwrap();
        let free = b.create_sticky(sticky_at(900.0, 900.0)).unwrap();
        b.arrange(1200.0).unwrap();
        assert_eq!(
            b.panel(pinned).unwrap().rect(),
            Rect::new(500.0, 500.0, 300.0, 200.0)
        );
        assert_eq!(b.panel(free).unwrap().rect().left, 0.0);
    }

    #[test]
    fn force_delete_all_empties_the_board_without_history() {
        let mut b = board();
        let a = b.create_sticky(sticky_at(0.0, 0.0)).unwrap();
        b.create_sticky(sticky_at(10.0, 10.0)).unwrap();
        b.delete(a).unwrap();
        let depth = b.history_labels().len();

        b.force_delete_all();
        assert!(b.panels().is_empty());
        assert!(b.latest_panel().is_none());
        assert!(!b.notify_removal_animation_done(a), "pending queue drained");
        assert_eq!(b.history_labels().len(), depth, "no history entry added");
    }

    #[test]
    fn move_to_top_is_not_undoable() {
        let mut b = board();
        let a = b.create_sticky(sticky_at(0.0, 0.0)).unwrap();
        let _c = b.create_sticky(sticky_at(10.0, 10.0)).unwrap();
        let depth = b.history_labels().len();
        assert!(b.move_to_top(a));
        assert_eq!(b.latest_panel().unwrap().id(), a);
        assert_eq!(b.history_labels().len(), depth);
        assert!(z_is_strictly_increasing(&b));
    }

    #[test]
    fn camera_moves_are_not_history_entries() {
        let mut b = board();
        b.zoom_in();
        b.pan_by(Point::new(10.0, 10.0));
        b.zoom_wheel(&WheelEvent {
            pos: Point::new(100.0, 100.0),
            delta_y: -1.0,
            ctrl: true,
        });
        assert!(!b.can_undo());
    }

    #[test]
    fn save_and_restore_round_trip() {
        let mut b = board();
        let id = b.create_sticky(sticky_at(10.0, 20.0)).unwrap();
        b.create_sticky(sticky_at(30.0, 40.0)).unwrap();
        b.zoom_in();
        b.pan_by(Point::new(5.0, 6.0));
        let snap = b.save_work().unwrap();
        assert!(snap.validate().is_ok());
        assert_eq!(snap.stickies.len(), 2);

        let mut fresh = board();
        fresh.restore_and_replace_all(snap).unwrap();
        assert_eq!(fresh.panels().len(), 2);
        let back = fresh.panel(id).unwrap();
        assert_eq!(back.rect(), Rect::new(10.0, 20.0, 300.0, 200.0));
        assert_eq!(fresh.transform().scale, b.transform().scale);
        assert_eq!(fresh.scale_context().get(), b.transform().scale);
        assert!(!fresh.can_undo(), "history cleared by restore");
        assert!(z_is_strictly_increasing(&fresh));
    }

    #[test]
    fn save_skips_panels_mid_removal() {
        let mut b = board();
        let keep = b.create_sticky(sticky_at(0.0, 0.0)).unwrap();
        let gone = b.create_sticky(sticky_at(10.0, 10.0)).unwrap();
        b.delete(gone).unwrap();
        let snap = b.save_work().unwrap();
        assert_eq!(snap.stickies.len(), 1);
        assert_eq!(snap.stickies[0].id, keep);
    }

    #[test]
    fn restore_rejects_invalid_snapshot() {
        let mut b = board();
        b.create_sticky(sticky_at(0.0, 0.0)).unwrap();
        let mut snap = BoardSnapshot::default();
        snap.schema_version = 99;
        let err = b.restore_and_replace_all(snap).unwrap_err();
        assert!(matches!(err, CanvasError::Snapshot(_)));
    }

    // -- plugin lifecycle --------------------------------------------------

    #[derive(Default)]
    struct EventLog(Rc<RefCell<Vec<String>>>);

    impl PanelModel for EventLog {
        fn on_mount(&mut self, _panel: &mut Panel, reason: MountReason) {
            self.0.borrow_mut().push(format!("mount:{reason:?}"));
        }

        fn on_save(&mut self, _panel: &Panel) -> Option<Value> {
            self.0.borrow_mut().push("save".to_string());
            Some(Value::from(42))
        }

        fn on_delete(&mut self, _panel: &mut Panel) {
            self.0.borrow_mut().push("delete".to_string());
        }
    }

    #[test]
    fn plugin_sees_mount_save_delete() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut b = board();
        b.register_plugin("note", Box::new(EventLog(log.clone())));

        let mut config = sticky_at(0.0, 0.0);
        config.type_key = Some("note".to_string());
        let id = b.create_sticky(config).unwrap();
        let snap = b.save_work().unwrap();
        assert_eq!(snap.stickies[0].plugin_config, Some(Value::from(42)));
        b.delete(id).unwrap();

        assert_eq!(
            *log.borrow(),
            vec!["mount:Create", "save", "delete"],
            "lifecycle order"
        );
    }

    #[test]
    fn restore_mounts_with_restore_reason() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut b = board();
        b.register_plugin("note", Box::new(EventLog(log.clone())));
        let mut config = sticky_at(0.0, 0.0);
        config.type_key = Some("note".to_string());
        b.create_sticky(config).unwrap();
        let snap = b.save_work().unwrap();

        b.restore_and_replace_all(snap).unwrap();
        let events = log.borrow();
        assert_eq!(events.last().unwrap(), "mount:Restore");
        assert!(events.contains(&"delete".to_string()), "old instance torn down");
    }

    #[test]
    fn restore_with_unregistered_type_fails() {
        let mut snap = BoardSnapshot::default();
        let mut config = sticky_at(0.0, 0.0);
        config.type_key = Some("markdown".to_string());
        config.z_index = 1;
        snap.stickies.push(config);
        let mut b = board();
        let err = b.restore_and_replace_all(snap).unwrap_err();
        assert!(matches!(err, CanvasError::UnknownPanelType { .. }));
    }

    #[test]
    fn before_save_hook_can_flush_state() {
        let mut b = board();
        let id = b.create_sticky(sticky_at(0.0, 0.0)).unwrap();
        b.on_before_save(Box::new(move |state: &mut BoardState| {
            if let Some(panel) = state.panel_mut(id) {
                panel
                    .dataset_mut()
                    .insert("flushed".to_string(), "yes".to_string());
            }
        }));
        let snap = b.save_work().unwrap();
        assert_eq!(snap.stickies[0].dataset.get("flushed").unwrap(), "yes");
    }
}
