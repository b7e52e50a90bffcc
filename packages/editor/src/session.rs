//! # Edit Session
//!
//! One user's editing state for one page: the element tree with its
//! selection, the drag controller, the simulated device, the inspector tab
//! and the bookkeeping for uploads still in flight.
//!
//! Uploads are tracked by ticket. A result that arrives after its element
//! was deleted, or after the session cancelled its uploads, is discarded.

use crate::drag::{DragController, DragSource, DropOutcome, DropTarget, Point};
use crate::inspector::{field_patch, upload_patch};
use crate::mutations::MutationResult;
use crate::store::ElementTree;
use crate::EditorError;
use marble_evaluator::{
    render_inspector, Canvas, Device, FieldGroup, InspectorTab, MarkupPolicy, VNode,
};
use marble_model::{IdGenerator, PageElement};
use std::collections::HashMap;

/// Handle for an upload in flight
pub type UploadTicket = u64;

#[derive(Debug, Clone, PartialEq)]
pub struct PendingUpload {
    pub element_id: String,
    pub group: FieldGroup,
    pub field: String,
}

/// What happened to a finished upload
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// Field now holds the public URL
    Applied { element_id: String, url: String },
    /// Element no longer exists; result dropped
    Discarded,
    /// Upload failed; field left unchanged
    Failed { message: String },
}

#[derive(Debug)]
pub struct EditSession {
    /// Unique session identifier
    pub id: String,
    tree: ElementTree,
    drag: DragController,
    device: Device,
    tab: InspectorTab,
    markup: MarkupPolicy,
    ids: IdGenerator,
    uploads: HashMap<UploadTicket, PendingUpload>,
    next_ticket: UploadTicket,
}

impl EditSession {
    pub fn new(id: impl Into<String>, elements: Vec<PageElement>) -> Self {
        Self {
            id: id.into(),
            tree: ElementTree::from_elements(elements),
            drag: DragController::default(),
            device: Device::default(),
            tab: InspectorTab::default(),
            markup: MarkupPolicy::default(),
            ids: IdGenerator::default(),
            uploads: HashMap::new(),
            next_ticket: 1,
        }
    }

    pub fn with_drag_threshold(mut self, threshold: f64) -> Self {
        self.drag = DragController::new(threshold);
        self
    }

    pub fn with_markup_policy(mut self, markup: MarkupPolicy) -> Self {
        self.markup = markup;
        self
    }

    pub fn with_id_generator(mut self, ids: IdGenerator) -> Self {
        self.ids = ids;
        self
    }

    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ElementTree {
        &mut self.tree
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn set_device(&mut self, device: Device) {
        self.device = device;
    }

    pub fn tab(&self) -> InspectorTab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: InspectorTab) {
        self.tab = tab;
    }

    pub fn markup_policy(&self) -> MarkupPolicy {
        self.markup
    }

    pub fn selection(&self) -> Option<&str> {
        self.tree.selection()
    }

    pub fn select(&mut self, id: Option<&str>) -> bool {
        self.tree.select(id)
    }

    pub fn pointer_down(&mut self, source: &DragSource, at: Point) -> bool {
        self.drag.pointer_down(source, at)
    }

    pub fn pointer_move(&mut self, to: Point) -> bool {
        self.drag.pointer_move(to)
    }

    /// Finish a gesture. A drop creates a fresh element from the carried
    /// widget, adds it to the tree and selects it; the new id is returned.
    pub fn pointer_up(&mut self, target: DropTarget) -> Result<Option<String>, EditorError> {
        let (widget, target) = match self.drag.pointer_up(target) {
            DropOutcome::Dropped { widget, target } => (widget, target),
            DropOutcome::Discarded | DropOutcome::NoDrag => return Ok(None),
        };

        let element = widget.instantiate(self.ids.new_id());
        let id = element.id.clone();
        match target {
            DropTarget::Canvas => self.tree.append(element)?,
            DropTarget::Column {
                section_id,
                column_index,
            } => self.tree.insert_child(&section_id, column_index, element)?,
            DropTarget::Outside => return Ok(None),
        }
        tracing::debug!(id = %id, kind = %widget.kind, "element dropped");
        self.tree.select(Some(&id));
        Ok(Some(id))
    }

    /// Apply one inspector change to the selected element
    pub fn edit_field(
        &mut self,
        group: FieldGroup,
        key: &str,
        raw: &str,
    ) -> Result<MutationResult, EditorError> {
        let element = self
            .tree
            .selected_element()
            .ok_or(EditorError::NothingSelected)?;
        let id = element.id.clone();
        let patch = field_patch(element, group, key, raw)?;
        let applied = self.tree.update_by_id(&id, &patch);
        Ok(MutationResult {
            version: self.tree.version(),
            applied,
        })
    }

    pub fn delete(&mut self, id: &str) -> bool {
        self.tree.delete_by_id(id)
    }

    pub fn delete_selected(&mut self) -> Result<bool, EditorError> {
        let id = self
            .tree
            .selection()
            .map(str::to_string)
            .ok_or(EditorError::NothingSelected)?;
        Ok(self.tree.delete_by_id(&id))
    }

    /// Register an upload for an element's field
    pub fn begin_upload(&mut self, element_id: &str, group: FieldGroup, field: &str) -> UploadTicket {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.uploads.insert(
            ticket,
            PendingUpload {
                element_id: element_id.to_string(),
                group,
                field: field.to_string(),
            },
        );
        ticket
    }

    /// Resolve an upload with the store's result
    pub fn finish_upload(
        &mut self,
        ticket: UploadTicket,
        result: Result<String, String>,
    ) -> Result<UploadOutcome, EditorError> {
        let pending = self
            .uploads
            .remove(&ticket)
            .ok_or(EditorError::UnknownUpload(ticket))?;

        let url = match result {
            Ok(url) => url,
            Err(message) => return Ok(UploadOutcome::Failed { message }),
        };
        let patch = upload_patch(pending.group, &pending.field, &url);
        if self.tree.update_by_id(&pending.element_id, &patch) {
            Ok(UploadOutcome::Applied {
                element_id: pending.element_id,
                url,
            })
        } else {
            tracing::warn!(element_id = %pending.element_id, "upload finished for a deleted element");
            Ok(UploadOutcome::Discarded)
        }
    }

    pub fn pending_uploads(&self) -> usize {
        self.uploads.len()
    }

    /// Forget every upload in flight; late results are then rejected
    pub fn cancel_uploads(&mut self) -> usize {
        let count = self.uploads.len();
        self.uploads.clear();
        if count > 0 {
            tracing::warn!(session = %self.id, count, "cancelled pending uploads");
        }
        count
    }

    /// Replace the tree with a loaded document
    pub fn load(&mut self, elements: Vec<PageElement>) {
        self.cancel_uploads();
        self.drag.cancel();
        self.tree.replace(elements);
    }

    pub fn render_canvas(&self) -> VNode {
        Canvas::editing(self.tree.selection(), self.device)
            .with_markup_policy(self.markup)
            .render(self.tree.elements())
    }

    pub fn render_inspector(&self) -> VNode {
        render_inspector(self.tree.selected_element(), self.tab)
    }
}
