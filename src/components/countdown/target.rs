use super::models::CountdownStatus;
use super::render::{apply, FieldBindings, Rendering};
use crate::markup::{Element, ElementPath, SharedDocument, STATE_ATTRIBUTE};
use tracing::warn;

/// The slice of the page one countdown writes into
#[derive(Debug, Clone)]
pub struct RenderTarget {
    document: SharedDocument,
    container: ElementPath,
    bindings: FieldBindings,
}

impl RenderTarget {
    pub fn new(document: SharedDocument, container: ElementPath, bindings: FieldBindings) -> Self {
        Self {
            document,
            container,
            bindings,
        }
    }

    pub fn container(&self) -> &ElementPath {
        &self.container
    }

    /// Overwrite every bound field
    pub async fn write(&self, rendering: &Rendering) {
        let mut document = self.document.write().await;
        apply(rendering, &self.bindings, &mut document);
    }

    /// Replace the container's whole content
    pub async fn replace_content(&self, content: Element) {
        self.with_container(|container| container.replace_children(vec![content]))
            .await;
    }

    pub async fn append(&self, child: Element) {
        self.with_container(|container| container.append_child(child))
            .await;
    }

    pub async fn mark(&self, status: CountdownStatus) {
        self.with_container(|container| container.set_attribute(STATE_ATTRIBUTE, status.as_str()))
            .await;
    }

    async fn with_container<F>(&self, f: F)
    where
        F: FnOnce(&mut Element),
    {
        let mut document = self.document.write().await;
        match document.get_mut(&self.container) {
            Some(container) => f(container),
            None => warn!("Countdown container {} is no longer on the page", self.container),
        }
    }
}
