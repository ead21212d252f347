//! CAD document collaborator.
//!
//! The pipeline talks to the CAD engine only through [`CadDocument`]. Every
//! method takes `&mut self`: the engine is not reentrant, so a document
//! handle serves one call at a time.

mod freecad;
mod index;
mod scripts;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::camera::CameraTransform;
use crate::errors::{ExportError, ResolutionError};

pub use freecad::FreeCadDocument;
pub use index::{DocumentIndex, DocumentObject, DRAW_PAGE_TYPE};

/// Reference to an object of an open document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Internal name, unique within the document.
    pub name: String,
    /// User-facing label.
    pub label: String,
    /// Engine type id.
    pub type_id: String,
    /// True if the object carries a solid shape.
    pub has_shape: bool,
}

impl ObjectRef {
    /// Returns true if the object is a drawing page.
    #[must_use]
    pub fn is_page(&self) -> bool {
        self.type_id == DRAW_PAGE_TYPE
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.name)
    }
}

/// Capabilities of an open CAD document.
#[async_trait]
pub trait CadDocument: Send {
    /// Returns every object carrying `label`, in document order.
    async fn objects_by_label(&mut self, label: &str) -> Result<Vec<ObjectRef>, ResolutionError>;

    /// Returns the top-level solid bodies, in document order.
    async fn solid_shapes(&mut self) -> Result<Vec<ObjectRef>, ResolutionError>;

    /// Returns the drawing pages, in document order.
    async fn drawing_pages(&mut self) -> Result<Vec<ObjectRef>, ResolutionError>;

    /// Exports solids as a single STEP file.
    async fn export_step(&mut self, objects: &[ObjectRef], target: &Path) -> Result<(), ExportError>;

    /// Exports one solid as an STL mesh.
    async fn export_mesh(&mut self, object: &ObjectRef, target: &Path) -> Result<(), ExportError>;

    /// Exports drawing pages as one PDF, merged in the given order.
    async fn export_pdf(&mut self, pages: &[ObjectRef], target: &Path) -> Result<(), ExportError>;

    /// Renders the given objects, hiding every other solid.
    async fn render_screenshot(
        &mut self,
        objects: &[ObjectRef],
        camera: &CameraTransform,
        target: &Path,
    ) -> Result<(), ExportError>;
}
