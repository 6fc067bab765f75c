//! The scene store: single source of truth for one editing session.
//!
//! [`SceneStore`] owns the template, canvas size, layers, selection, the
//! undo/redo [`History`] and the [`ExportSettings`]. Every mutation goes through
//! a named method so each one can be snapshotted consistently. The store is a
//! plain value: hand it by reference to the render surface and the editor
//! panels, and create a fresh one per test.

use crate::history::{History, Snapshot};
use crate::patch::Patch;
use crate::{
    ExportSettings, ExportSettingsUpdate, ImageLayer, ImageUpdate, Layer, LayerId, LayerKind,
    SceneDocument, Template, TextLayer, TextUpdate,
};

/// The single active element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Selected layer id. May not resolve to a live layer.
    pub id: LayerId,
    /// Which layer array the id refers to.
    pub kind: LayerKind,
}

/// Canvas contents, selection and history for one session.
///
/// # Example
///
/// ```
/// use meme_core::{SceneStore, Template, TextUpdate};
///
/// let mut store = SceneStore::new(Template::default());
/// let id = store.add_text(TextUpdate::text("Hello"));
/// assert_eq!(store.texts().len(), 1);
///
/// store.undo();
/// assert!(store.texts().is_empty());
/// store.redo();
/// assert_eq!(store.text(&id).map(|t| t.text.as_str()), Some("Hello"));
/// ```
#[derive(Debug, Clone)]
pub struct SceneStore {
    template: Template,
    canvas_width: u32,
    canvas_height: u32,
    texts: Vec<TextLayer>,
    images: Vec<ImageLayer>,
    selection: Option<Selection>,
    history: History,
    export_settings: ExportSettings,
    revision: u64,
}

impl SceneStore {
    /// Create a store for `template` with an empty scene.
    ///
    /// The empty scene is recorded as the first history entry, so undo can
    /// always walk back to it.
    #[must_use]
    pub fn new(template: Template) -> Self {
        let mut store = Self {
            canvas_width: template.width,
            canvas_height: template.height,
            template,
            texts: Vec::new(),
            images: Vec::new(),
            selection: None,
            history: History::default(),
            export_settings: ExportSettings::default(),
            revision: 0,
        };
        store.history.reset(store.snapshot());
        store
    }

    /// Rebuild a store from a saved document. History starts over.
    #[must_use]
    pub fn from_document(document: SceneDocument) -> Self {
        let mut store = Self::new(document.template);
        store.canvas_width = document.canvas_width;
        store.canvas_height = document.canvas_height;
        store.texts = document.texts;
        store.images = document.images;
        store.export_settings = document.export_settings.normalized();
        store.history.reset(store.snapshot());
        store
    }

    /// Capture the current scene as a document.
    #[must_use]
    pub fn document(&self) -> SceneDocument {
        SceneDocument {
            template: self.template.clone(),
            canvas_width: self.canvas_width,
            canvas_height: self.canvas_height,
            texts: self.texts.clone(),
            images: self.images.clone(),
            export_settings: self.export_settings,
        }
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Switch template: resets the canvas size and clears layers and selection.
    pub fn set_template(&mut self, template: Template) {
        tracing::debug!("Set template {} ({}x{})", template.id, template.width, template.height);
        self.canvas_width = template.width;
        self.canvas_height = template.height;
        self.template = template;
        self.texts.clear();
        self.images.clear();
        self.selection = None;
        self.commit();
    }

    /// Append a text layer built from defaults plus `fields`, select it.
    pub fn add_text(&mut self, fields: TextUpdate) -> LayerId {
        let id = LayerId::generate(LayerKind::Text);
        let mut layer = TextLayer::new(id.clone());
        fields.apply_to(&mut layer);
        tracing::debug!("Add text {id}");
        self.texts.push(layer);
        self.selection = Some(Selection {
            id: id.clone(),
            kind: LayerKind::Text,
        });
        self.commit();
        id
    }

    /// Append an image layer built from defaults plus `fields`, select it.
    pub fn add_image(&mut self, fields: ImageUpdate) -> LayerId {
        let id = LayerId::generate(LayerKind::Image);
        let mut layer = ImageLayer::new(id.clone());
        fields.apply_to(&mut layer);
        tracing::debug!("Add image {id}");
        self.images.push(layer);
        self.selection = Some(Selection {
            id: id.clone(),
            kind: LayerKind::Image,
        });
        self.commit();
        id
    }

    /// Merge `update` into the text layer `id`.
    ///
    /// Returns `false` without recording history when the id is unknown or
    /// no field actually changes.
    pub fn update_text(&mut self, id: &LayerId, update: &TextUpdate) -> bool {
        let Some(layer) = self.texts.iter_mut().find(|t| &t.id == id) else {
            tracing::trace!("Update of unknown text {id} ignored");
            return false;
        };
        if !update.apply_to(layer) {
            return false;
        }
        tracing::debug!("Update text {id}");
        self.commit();
        true
    }

    /// Merge `update` into the image layer `id`.
    ///
    /// Returns `false` without recording history when the id is unknown or
    /// no field actually changes.
    pub fn update_image(&mut self, id: &LayerId, update: &ImageUpdate) -> bool {
        let Some(layer) = self.images.iter_mut().find(|i| &i.id == id) else {
            tracing::trace!("Update of unknown image {id} ignored");
            return false;
        };
        if !update.apply_to(layer) {
            return false;
        }
        tracing::debug!("Update image {id}");
        self.commit();
        true
    }

    /// Remove the text layer `id`. Returns `false` if it did not exist.
    pub fn remove_text(&mut self, id: &LayerId) -> bool {
        let before = self.texts.len();
        self.texts.retain(|t| &t.id != id);
        if self.texts.len() == before {
            return false;
        }
        self.drop_selection_of(id);
        tracing::debug!("Remove text {id}");
        self.commit();
        true
    }

    /// Remove the image layer `id`. Returns `false` if it did not exist.
    pub fn remove_image(&mut self, id: &LayerId) -> bool {
        let before = self.images.len();
        self.images.retain(|i| &i.id != id);
        if self.images.len() == before {
            return false;
        }
        self.drop_selection_of(id);
        tracing::debug!("Remove image {id}");
        self.commit();
        true
    }

    /// Select an element, or clear the selection with `None`.
    ///
    /// The pair is recorded as given; it is not checked against live layers.
    pub fn select_element(&mut self, target: Option<(LayerId, LayerKind)>) {
        let selection = target.map(|(id, kind)| Selection { id, kind });
        if self.selection != selection {
            self.selection = selection;
            self.revision += 1;
        }
    }

    /// Remove every layer and clear the selection.
    pub fn clear_canvas(&mut self) {
        tracing::debug!("Clear canvas");
        self.texts.clear();
        self.images.clear();
        self.selection = None;
        self.commit();
    }

    /// Step back one history entry. Returns `false` at the oldest entry.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    /// Step forward one history entry. Returns `false` at the newest entry.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    /// Override the canvas dimensions without recording history.
    pub fn set_canvas_size(&mut self, width: u32, height: u32) {
        if (self.canvas_width, self.canvas_height) != (width, height) {
            self.canvas_width = width;
            self.canvas_height = height;
            self.revision += 1;
        }
    }

    /// Merge export configuration. Never recorded in history.
    pub fn update_export_settings(&mut self, update: &ExportSettingsUpdate) {
        if update.apply_to(&mut self.export_settings) {
            tracing::debug!("Export settings now {:?}", self.export_settings);
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            texts: self.texts.clone(),
            images: self.images.clone(),
        }
    }

    fn commit(&mut self) {
        self.history.push(self.snapshot());
        self.revision += 1;
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.texts = snapshot.texts;
        self.images = snapshot.images;
        self.selection = None;
        self.revision += 1;
    }

    fn drop_selection_of(&mut self, id: &LayerId) {
        if self.selection.as_ref().is_some_and(|s| &s.id == id) {
            self.selection = None;
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// The active template.
    #[must_use]
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Canvas size as `(width, height)` in native pixels.
    #[must_use]
    pub fn canvas_size(&self) -> (u32, u32) {
        (self.canvas_width, self.canvas_height)
    }

    /// Text layers, in draw order.
    #[must_use]
    pub fn texts(&self) -> &[TextLayer] {
        &self.texts
    }

    /// Image layers, in draw order.
    #[must_use]
    pub fn images(&self) -> &[ImageLayer] {
        &self.images
    }

    /// Find a text layer by id.
    #[must_use]
    pub fn text(&self, id: &LayerId) -> Option<&TextLayer> {
        self.texts.iter().find(|t| &t.id == id)
    }

    /// Find an image layer by id.
    #[must_use]
    pub fn image(&self, id: &LayerId) -> Option<&ImageLayer> {
        self.images.iter().find(|i| &i.id == id)
    }

    /// The recorded selection, live or not.
    #[must_use]
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// The selected element id, if any.
    #[must_use]
    pub fn selected_element_id(&self) -> Option<&LayerId> {
        self.selection.as_ref().map(|s| &s.id)
    }

    /// The selected layer, resolved against live layers.
    #[must_use]
    pub fn selected_layer(&self) -> Option<Layer<'_>> {
        let selection = self.selection.as_ref()?;
        match selection.kind {
            LayerKind::Text => self.text(&selection.id).map(Layer::Text),
            LayerKind::Image => self.image(&selection.id).map(Layer::Image),
        }
    }

    /// All layers bottom to top: images first, then texts.
    pub fn layers(&self) -> impl DoubleEndedIterator<Item = Layer<'_>> {
        self.images
            .iter()
            .map(Layer::Image)
            .chain(self.texts.iter().map(Layer::Text))
    }

    /// Whether [`SceneStore::undo`] would do anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether [`SceneStore::redo`] would do anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Number of retained history entries.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Current history cursor.
    #[must_use]
    pub fn history_index(&self) -> usize {
        self.history.index()
    }

    /// The history log.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Current export settings.
    #[must_use]
    pub fn export_settings(&self) -> &ExportSettings {
        &self.export_settings
    }

    /// Counter bumped on every change the surface must redraw for.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new(Template::default())
    }
}
