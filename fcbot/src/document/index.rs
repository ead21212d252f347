//! In-memory index of document objects.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::ObjectRef;

/// Type id of TechDraw drawing pages.
pub const DRAW_PAGE_TYPE: &str = "TechDraw::DrawPage";

/// One object of an open document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentObject {
    /// Internal name, unique within the document.
    pub name: String,
    /// User-facing label.
    pub label: String,
    /// Engine type id, e.g. `PartDesign::Body`.
    pub type_id: String,
    /// True if the object carries a solid shape.
    #[serde(default)]
    pub has_shape: bool,
    /// Internal names of the objects that own this one.
    #[serde(default)]
    pub parents: Vec<String>,
}

impl DocumentObject {
    /// Creates an object without parents.
    #[must_use]
    pub fn new(name: impl Into<String>, label: impl Into<String>, type_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            type_id: type_id.into(),
            has_shape: false,
            parents: Vec::new(),
        }
    }

    /// Marks the object as carrying a shape.
    #[must_use]
    pub fn with_shape(mut self) -> Self {
        self.has_shape = true;
        self
    }

    /// Adds an owning object.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parents.push(parent.into());
        self
    }

    /// Returns true if the object is a drawing page.
    #[must_use]
    pub fn is_page(&self) -> bool {
        self.type_id == DRAW_PAGE_TYPE
    }

    /// Returns a reference to this object.
    #[must_use]
    pub fn to_ref(&self) -> ObjectRef {
        ObjectRef {
            name: self.name.clone(),
            label: self.label.clone(),
            type_id: self.type_id.clone(),
            has_shape: self.has_shape,
        }
    }
}

/// Ordered listing of a document's objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentIndex {
    objects: Vec<DocumentObject>,
}

impl DocumentIndex {
    /// Creates an index from objects in document order.
    #[must_use]
    pub fn new(objects: Vec<DocumentObject>) -> Self {
        Self { objects }
    }

    /// Returns all objects in document order.
    #[must_use]
    pub fn objects(&self) -> &[DocumentObject] {
        &self.objects
    }

    /// Returns the number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if the document has no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Returns every object carrying `label`, in document order.
    #[must_use]
    pub fn objects_by_label(&self, label: &str) -> Vec<ObjectRef> {
        self.objects
            .iter()
            .filter(|o| o.label == label)
            .map(DocumentObject::to_ref)
            .collect()
    }

    /// Returns the top-level solids of the document.
    ///
    /// Every object with a shape contributes its top-most ancestors that
    /// also carry a shape. Each ancestor is listed once, in the order it is
    /// first reached while walking the document.
    #[must_use]
    pub fn solid_shapes(&self) -> Vec<ObjectRef> {
        let by_name: HashMap<&str, &DocumentObject> =
            self.objects.iter().map(|o| (o.name.as_str(), o)).collect();

        let mut seen = HashSet::new();
        let mut shapes = Vec::new();

        for object in self.objects.iter().filter(|o| o.has_shape) {
            let mut tops = Vec::new();
            let mut path = HashSet::new();
            collect_tops(object, &by_name, &mut path, &mut tops);

            debug!(
                object = %object.name,
                parents = ?tops.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
                "Found top-level parents"
            );

            for top in tops {
                if seen.insert(top.name.as_str()) {
                    shapes.push(top.to_ref());
                }
            }
        }

        shapes
    }

    /// Returns every drawing page, in document order.
    #[must_use]
    pub fn drawing_pages(&self) -> Vec<ObjectRef> {
        self.objects
            .iter()
            .filter(|o| o.is_page())
            .map(DocumentObject::to_ref)
            .collect()
    }
}

fn collect_tops<'a>(
    object: &'a DocumentObject,
    by_name: &HashMap<&str, &'a DocumentObject>,
    path: &mut HashSet<&'a str>,
    tops: &mut Vec<&'a DocumentObject>,
) {
    if !path.insert(object.name.as_str()) {
        return;
    }

    let parents: Vec<&DocumentObject> = object
        .parents
        .iter()
        .filter_map(|name| by_name.get(name.as_str()).copied())
        .filter(|parent| parent.has_shape && !path.contains(parent.name.as_str()))
        .collect();

    if parents.is_empty() {
        tops.push(object);
    } else {
        for parent in parents {
            collect_tops(parent, by_name, path, tops);
        }
    }

    path.remove(object.name.as_str());
}
