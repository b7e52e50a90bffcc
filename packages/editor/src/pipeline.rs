//! # Render Pipeline
//!
//! Coordinates the edit loop: Mutate → Render canvas → Cache
//!
//! The canvas is rebuilt only when something it depends on changed: the tree
//! version, the selection or the simulated device. Views poll
//! [`Pipeline::canvas`] after every gesture and get the cached tree when
//! nothing moved.

use crate::mutations::{Mutation, MutationResult};
use crate::session::EditSession;
use crate::EditorError;
use marble_evaluator::{to_html, Device, HtmlOptions, VNode};

#[derive(Debug, Clone, PartialEq)]
struct RenderKey {
    version: u64,
    selection: Option<String>,
    device: Device,
}

/// Manages the edit → render loop for one session
#[derive(Debug)]
pub struct Pipeline {
    session: EditSession,
    cached: Option<(RenderKey, VNode)>,
}

/// Result of a mutation pushed through the pipeline
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub version: u64,
    pub applied: bool,
    pub canvas: VNode,
}

impl Pipeline {
    pub fn new(session: EditSession) -> Self {
        Self {
            session,
            cached: None,
        }
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    /// Mutable session access for gestures; the cache notices changes itself
    pub fn session_mut(&mut self) -> &mut EditSession {
        &mut self.session
    }

    /// Apply a mutation and re-render
    pub fn apply_mutation(&mut self, mutation: Mutation) -> Result<PipelineResult, EditorError> {
        let MutationResult { version, applied } = self.session.tree_mut().apply(mutation)?;
        Ok(PipelineResult {
            version,
            applied,
            canvas: self.canvas().clone(),
        })
    }

    fn current_key(&self) -> RenderKey {
        RenderKey {
            version: self.session.tree().version(),
            selection: self.session.selection().map(str::to_string),
            device: self.session.device(),
        }
    }

    /// Current canvas, rebuilt if stale
    pub fn canvas(&mut self) -> &VNode {
        let key = self.current_key();
        if self.cached.as_ref().map_or(false, |(cached, _)| *cached != key) {
            self.cached = None;
        }
        let session = &self.session;
        let (_, node) = self.cached.get_or_insert_with(|| {
            tracing::debug!(version = key.version, device = %key.device, "rendering canvas");
            let node = session.render_canvas();
            (key, node)
        });
        node
    }

    pub fn canvas_html(&mut self, options: &HtmlOptions) -> String {
        to_html(self.canvas(), options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marble_model::{ElementKind, ElementPatch, PageElement};

    #[test]
    fn test_canvas_cached_until_change() {
        let session = EditSession::new("p", vec![PageElement::new("a", ElementKind::Quote)]);
        let mut pipeline = Pipeline::new(session);

        let first = pipeline.canvas().clone();
        assert_eq!(pipeline.canvas(), &first);

        pipeline.session_mut().select(Some("a"));
        let selected = pipeline.canvas().clone();
        assert_ne!(selected, first);

        let result = pipeline
            .apply_mutation(Mutation::Update {
                id: "a".into(),
                patch: ElementPatch::content("text", "changed"),
            })
            .unwrap();
        assert!(result.applied);
        assert!(result.canvas.text_content().contains("changed"));
    }

    #[test]
    fn test_device_switch_rerenders() {
        let session = EditSession::new("p", Vec::new());
        let mut pipeline = Pipeline::new(session);
        let desktop = pipeline.canvas_html(&HtmlOptions::compact());
        pipeline.session_mut().set_device(Device::Mobile);
        let mobile = pipeline.canvas_html(&HtmlOptions::compact());
        assert!(desktop.contains("max-width: 1280px"));
        assert!(mobile.contains("max-width: 375px"));
    }
}
