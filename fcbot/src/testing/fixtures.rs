//! Document and configuration fixtures.

use crate::document::{DocumentIndex, DocumentObject, DRAW_PAGE_TYPE};

/// A solid body.
#[must_use]
pub fn solid(name: &str, label: &str) -> DocumentObject {
    DocumentObject::new(name, label, "Part::Feature").with_shape()
}

/// A TechDraw page.
#[must_use]
pub fn page(name: &str, label: &str) -> DocumentObject {
    DocumentObject::new(name, label, DRAW_PAGE_TYPE)
}

/// One solid labelled `Part` and two drawing pages.
#[must_use]
pub fn part_index() -> DocumentIndex {
    DocumentIndex::new(vec![
        solid("Part", "Part"),
        page("Page", "Sheet 1"),
        page("Page001", "Sheet 2"),
    ])
}

/// Two bodies, one with nested features, a spreadsheet and two pages.
///
/// Top-level solids are `Body` (label `Housing`) and `Box` (label `Lid`).
#[must_use]
pub fn assembly_index() -> DocumentIndex {
    DocumentIndex::new(vec![
        DocumentObject::new("Body", "Housing", "PartDesign::Body").with_shape(),
        DocumentObject::new("Pad", "Pad", "PartDesign::Pad")
            .with_shape()
            .with_parent("Body"),
        DocumentObject::new("Spreadsheet", "Params", "Spreadsheet::Sheet"),
        DocumentObject::new("Box", "Lid", "Part::Box").with_shape(),
        page("Page", "Sheet 1"),
        page("Page001", "Sheet 2"),
    ])
}

/// STEP of `Part`, STL of all shapes and PDF of all pages.
pub const THREE_STEP_CONFIG: &str = r#"
fcbot:
  version: 1
outputs:
  - name: part-step
    type: step
    filename: part.step
    objects: [Part]
  - name: part-mesh
    type: stl
    filename: mesh/part.stl
    objects:
      shapes: all
  - name: drawings
    comment: Every drawing page
    type: pdf
    filename: drawings.pdf
    objects:
      pages: all
"#;

/// A screenshot of `Housing` from the isometric view.
pub const SCREENSHOT_CONFIG: &str = r#"
outputs:
  - name: housing-iso
    type: screenshot
    filename: images/housing.png
    objects: [Housing]
    options:
      camera: orthographic
      view: isometric
      resolution: [640, 480]
      background: white
"#;
