//! # Element Tree Store
//!
//! Single owner of the page being edited. Views never hold elements; they
//! read through the store and subscribe to [`Change`] notifications.
//!
//! A flat side index maps every id, nested ones included, to its path in the
//! tree. The index is rebuilt after every structural mutation, so lookup,
//! update and delete behave the same at any depth.

use crate::mutations::{Mutation, MutationError, MutationResult};
use marble_evaluator::{section_layout, Device};
use marble_model::element::COLUMN_INDEX_KEY;
use marble_model::{decode_elements, schema_for, ElementPatch, PageElement};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Notification sent to subscribers after the store changes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Change {
    Appended { id: String },
    #[serde(rename_all = "camelCase")]
    Inserted { parent_id: String, id: String },
    Updated { id: String },
    /// Every id removed with the subtree, root first
    Deleted { ids: Vec<String> },
    Replaced { count: usize },
    SelectionChanged { id: Option<String> },
}

pub type SubscriptionId = u64;

type Listener = Box<dyn FnMut(&Change) + Send>;

pub struct ElementTree {
    elements: Vec<PageElement>,
    index: HashMap<String, Vec<usize>>,
    selection: Option<String>,
    version: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: SubscriptionId,
}

impl fmt::Debug for ElementTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementTree")
            .field("elements", &self.elements.len())
            .field("selection", &self.selection)
            .field("version", &self.version)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for ElementTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementTree {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            index: HashMap::new(),
            selection: None,
            version: 0,
            listeners: Vec::new(),
            next_subscription: 1,
        }
    }

    /// Store over an existing tree, e.g. a loaded document
    pub fn from_elements(elements: Vec<PageElement>) -> Self {
        let mut tree = Self::new();
        tree.elements = elements;
        tree.rebuild_index();
        tree
    }

    /// Store over stored JSON content; malformed content becomes an empty tree
    pub fn deserialize(value: Value) -> Self {
        let decoded = decode_elements(value);
        if decoded.malformed {
            tracing::warn!("stored content is not a sequence, starting from an empty tree");
        }
        Self::from_elements(decoded.elements)
    }

    /// Tree as stored JSON
    pub fn serialize(&self) -> Value {
        serde_json::to_value(&self.elements).unwrap_or_else(|_| Value::Array(Vec::new()))
    }

    pub fn elements(&self) -> &[PageElement] {
        &self.elements
    }

    /// Snapshot of the tree for persistence
    pub fn to_vec(&self) -> Vec<PageElement> {
        self.elements.clone()
    }

    /// Number of top-level elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements at any depth
    pub fn element_count(&self) -> usize {
        self.index.len()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Find an element anywhere in the tree
    pub fn get(&self, id: &str) -> Option<&PageElement> {
        let path = self.index.get(id)?;
        resolve(&self.elements, path)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut PageElement> {
        let path = self.index.get(id)?;
        resolve_mut(&mut self.elements, path)
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    pub fn selected_element(&self) -> Option<&PageElement> {
        self.selection.as_deref().and_then(|id| self.get(id))
    }

    /// Set or clear the selection. Unknown ids are ignored.
    pub fn select(&mut self, id: Option<&str>) -> bool {
        if let Some(id) = id {
            if !self.contains(id) {
                tracing::debug!(id, "ignoring selection of unknown element");
                return false;
            }
        }
        if self.selection.as_deref() == id {
            return true;
        }
        self.selection = id.map(str::to_string);
        self.notify(Change::SelectionChanged {
            id: self.selection.clone(),
        });
        true
    }

    /// Register a callback for every change
    pub fn subscribe(&mut self, listener: impl FnMut(&Change) + Send + 'static) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, change: Change) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&change);
        }
    }

    /// Apply one mutation
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, MutationError> {
        tracing::debug!(op = mutation.name(), target = ?mutation.target_id(), "applying mutation");
        let applied = match mutation {
            Mutation::Append { element } => {
                self.append(element)?;
                true
            }
            Mutation::InsertChild {
                parent_id,
                column_index,
                element,
            } => {
                self.insert_child(&parent_id, column_index, element)?;
                true
            }
            Mutation::Update { id, patch } => self.update_by_id(&id, &patch),
            Mutation::Delete { id } => self.delete_by_id(&id),
            Mutation::Replace { elements } => {
                self.replace(elements);
                true
            }
        };
        Ok(MutationResult {
            version: self.version,
            applied,
        })
    }

    /// Add a top-level element at the end
    pub fn append(&mut self, element: PageElement) -> Result<(), MutationError> {
        self.ensure_fresh_ids(&element)?;
        let id = element.id.clone();
        self.elements.push(element);
        self.rebuild_index();
        self.version += 1;
        self.notify(Change::Appended { id });
        Ok(())
    }

    /// Add an element to a container's column slot
    pub fn insert_child(
        &mut self,
        parent_id: &str,
        column_index: usize,
        mut element: PageElement,
    ) -> Result<(), MutationError> {
        self.ensure_fresh_ids(&element)?;
        let parent = self
            .get(parent_id)
            .ok_or_else(|| MutationError::ParentNotFound(parent_id.to_string()))?;

        if !schema_for(&parent.kind).map_or(false, |schema| schema.container) {
            return Err(MutationError::NotAContainer(parent_id.to_string()));
        }
        let columns = section_layout(parent, Device::Desktop).slots;
        if column_index >= columns {
            return Err(MutationError::ColumnOutOfRange {
                parent_id: parent_id.to_string(),
                column_index,
                columns,
            });
        }

        element
            .content
            .insert(COLUMN_INDEX_KEY.to_string(), Value::from(column_index));
        let id = element.id.clone();
        if let Some(parent) = self.get_mut(parent_id) {
            parent.children.get_or_insert_with(Vec::new).push(element);
        }
        self.rebuild_index();
        self.version += 1;
        self.notify(Change::Inserted {
            parent_id: parent_id.to_string(),
            id,
        });
        Ok(())
    }

    /// Shallow-merge a patch into the element with `id`, at any depth.
    /// Returns false, changing nothing, when no element matches.
    pub fn update_by_id(&mut self, id: &str, patch: &ElementPatch) -> bool {
        let Some(element) = self.get_mut(id) else {
            tracing::debug!(id, "update ignored, no such element");
            return false;
        };
        element.merge(patch);
        self.version += 1;
        self.notify(Change::Updated { id: id.to_string() });
        true
    }

    /// Remove the element with `id` and everything below it.
    /// Returns false when no element matches.
    pub fn delete_by_id(&mut self, id: &str) -> bool {
        let Some(path) = self.index.get(id).cloned() else {
            tracing::debug!(id, "delete ignored, no such element");
            return false;
        };

        let removed = match path.split_last() {
            Some((last, [])) => Some(self.elements.remove(*last)),
            Some((last, parent_path)) => resolve_mut(&mut self.elements, parent_path)
                .and_then(|parent| parent.children.as_mut())
                .map(|children| children.remove(*last)),
            None => None,
        };
        let Some(removed) = removed else {
            return false;
        };

        let mut ids = Vec::new();
        removed.walk(&mut |el| ids.push(el.id.clone()));
        self.rebuild_index();
        self.version += 1;

        let clears_selection = self
            .selection
            .as_ref()
            .map_or(false, |selected| ids.contains(selected));
        self.notify(Change::Deleted { ids });
        if clears_selection {
            self.selection = None;
            self.notify(Change::SelectionChanged { id: None });
        }
        true
    }

    /// Replace the whole tree and clear the selection
    pub fn replace(&mut self, elements: Vec<PageElement>) {
        let count = elements.len();
        self.elements = elements;
        self.rebuild_index();
        self.version += 1;
        self.notify(Change::Replaced { count });
        if self.selection.take().is_some() {
            self.notify(Change::SelectionChanged { id: None });
        }
    }

    fn ensure_fresh_ids(&self, element: &PageElement) -> Result<(), MutationError> {
        let mut duplicate = None;
        element.walk(&mut |el| {
            if duplicate.is_none() && self.index.contains_key(&el.id) {
                duplicate = Some(el.id.clone());
            }
        });
        match duplicate {
            Some(id) => Err(MutationError::DuplicateId(id)),
            None => Ok(()),
        }
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        let mut path = Vec::new();
        for (i, element) in self.elements.iter().enumerate() {
            path.push(i);
            index_subtree(&mut self.index, element, &mut path);
            path.pop();
        }
    }
}

fn index_subtree(index: &mut HashMap<String, Vec<usize>>, element: &PageElement, path: &mut Vec<usize>) {
    if index.contains_key(&element.id) {
        tracing::warn!(id = %element.id, "duplicate element id, keeping the first occurrence");
    } else {
        index.insert(element.id.clone(), path.clone());
    }
    for (i, child) in element.children().iter().enumerate() {
        path.push(i);
        index_subtree(index, child, path);
        path.pop();
    }
}

fn resolve<'a>(elements: &'a [PageElement], path: &[usize]) -> Option<&'a PageElement> {
    let (first, rest) = path.split_first()?;
    let mut node = elements.get(*first)?;
    for i in rest {
        node = node.children.as_ref()?.get(*i)?;
    }
    Some(node)
}

fn resolve_mut<'a>(elements: &'a mut [PageElement], path: &[usize]) -> Option<&'a mut PageElement> {
    let (first, rest) = path.split_first()?;
    let mut node = elements.get_mut(*first)?;
    for i in rest {
        node = node.children.as_mut()?.get_mut(*i)?;
    }
    Some(node)
}
