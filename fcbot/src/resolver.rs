//! Object resolution.
//!
//! Turns a step's [`ObjectSelector`] into document objects, in the order
//! the document enumerates them.

use tracing::debug;

use crate::config::{ObjectSelector, OutputKind};
use crate::document::{CadDocument, ObjectRef};
use crate::errors::ResolutionError;

/// Resolves `selector` against the open document for an output of `kind`.
///
/// An empty result is only returned for output types that accept it;
/// callers treat it as nothing to do.
///
/// # Errors
///
/// Returns a [`ResolutionError`] if a label is missing or ambiguous, an
/// object cannot be exported as `kind`, or the selection size does not fit
/// the output type.
pub async fn resolve_objects<D>(
    selector: &ObjectSelector,
    kind: OutputKind,
    document: &mut D,
) -> Result<Vec<ObjectRef>, ResolutionError>
where
    D: CadDocument + ?Sized,
{
    let objects = match selector {
        ObjectSelector::ByLabel(labels) => {
            let mut objects = Vec::with_capacity(labels.len());
            for label in labels {
                let mut found = document.objects_by_label(label).await?;
                match found.len() {
                    0 => return Err(ResolutionError::ObjectNotFound(label.clone())),
                    1 => objects.append(&mut found),
                    _ => return Err(ResolutionError::AmbiguousLabel(label.clone())),
                }
            }
            objects
        }
        ObjectSelector::AllShapes => document.solid_shapes().await?,
        ObjectSelector::AllPages => document.drawing_pages().await?,
    };

    if let Some(rejected) = objects.iter().find(|o| !exportable(o, kind)) {
        return Err(ResolutionError::UnsupportedObject {
            label: rejected.label.clone(),
            kind: kind.to_string(),
        });
    }

    if objects.is_empty() && kind.requires_objects() {
        return Err(ResolutionError::EmptySelection);
    }

    if kind.single_object() && objects.len() > 1 {
        return Err(ResolutionError::TooManyObjects {
            count: objects.len(),
        });
    }

    debug!(
        count = objects.len(),
        labels = ?objects.iter().map(|o| o.label.as_str()).collect::<Vec<_>>(),
        "Collected objects for processing"
    );
    Ok(objects)
}

fn exportable(object: &ObjectRef, kind: OutputKind) -> bool {
    match kind {
        OutputKind::Pdf => object.is_page(),
        OutputKind::Step | OutputKind::Stl | OutputKind::Screenshot => object.has_shape,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentIndex, DocumentObject, DRAW_PAGE_TYPE};
    use crate::testing::{fixtures, StubDocument};
    use pretty_assertions::assert_eq;

    fn labels(selector: &[&str]) -> ObjectSelector {
        ObjectSelector::ByLabel(selector.iter().map(ToString::to_string).collect())
    }

    fn names(objects: &[ObjectRef]) -> Vec<&str> {
        objects.iter().map(|o| o.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_by_label_keeps_configured_order() {
        let mut document = StubDocument::new(fixtures::assembly_index());
        let objects = resolve_objects(&labels(&["Lid", "Housing"]), OutputKind::Step, &mut document)
            .await
            .unwrap();
        assert_eq!(names(&objects), vec!["Box", "Body"]);
    }

    #[tokio::test]
    async fn test_missing_label() {
        let mut document = StubDocument::new(fixtures::assembly_index());
        let err = resolve_objects(&labels(&["Housing", "Ghost"]), OutputKind::Step, &mut document)
            .await
            .unwrap_err();
        assert_eq!(err, ResolutionError::ObjectNotFound("Ghost".to_string()));
    }

    #[tokio::test]
    async fn test_ambiguous_label() {
        let mut document = StubDocument::new(DocumentIndex::new(vec![
            fixtures::solid("Box", "Part"),
            fixtures::solid("Box001", "Part"),
        ]));
        let err = resolve_objects(&labels(&["Part"]), OutputKind::Step, &mut document)
            .await
            .unwrap_err();
        assert_eq!(err, ResolutionError::AmbiguousLabel("Part".to_string()));
    }

    #[tokio::test]
    async fn test_all_shapes_deterministic() {
        let mut document = StubDocument::new(fixtures::assembly_index());
        let first = resolve_objects(&ObjectSelector::AllShapes, OutputKind::Step, &mut document)
            .await
            .unwrap();
        let second = resolve_objects(&ObjectSelector::AllShapes, OutputKind::Step, &mut document)
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(names(&first), vec!["Body", "Box"]);
    }

    #[tokio::test]
    async fn test_stl_rejects_multiple_objects() {
        let mut document = StubDocument::new(fixtures::assembly_index());
        let err = resolve_objects(&labels(&["Housing", "Lid"]), OutputKind::Stl, &mut document)
            .await
            .unwrap_err();
        assert_eq!(err, ResolutionError::TooManyObjects { count: 2 });
    }

    #[tokio::test]
    async fn test_empty_pages_allowed_for_pdf() {
        let mut document = StubDocument::new(DocumentIndex::new(vec![fixtures::solid("Body", "Body")]));
        let pages = resolve_objects(&ObjectSelector::AllPages, OutputKind::Pdf, &mut document)
            .await
            .unwrap();
        assert!(pages.is_empty());
    }

    #[tokio::test]
    async fn test_empty_shapes_rejected() {
        let mut document = StubDocument::new(DocumentIndex::default());
        let err = resolve_objects(&ObjectSelector::AllShapes, OutputKind::Stl, &mut document)
            .await
            .unwrap_err();
        assert_eq!(err, ResolutionError::EmptySelection);
    }

    #[tokio::test]
    async fn test_unsupported_object() {
        let mut document = StubDocument::new(DocumentIndex::new(vec![
            DocumentObject::new("Sheet", "Params", "Spreadsheet::Sheet"),
            DocumentObject::new("Page", "Drawing", DRAW_PAGE_TYPE),
        ]));

        let err = resolve_objects(&labels(&["Params"]), OutputKind::Step, &mut document)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ResolutionError::UnsupportedObject {
                label: "Params".to_string(),
                kind: "step".to_string(),
            }
        );

        let err = resolve_objects(&labels(&["Params"]), OutputKind::Pdf, &mut document)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolutionError::UnsupportedObject { .. }));

        let pages = resolve_objects(&labels(&["Drawing"]), OutputKind::Pdf, &mut document)
            .await
            .unwrap();
        assert_eq!(names(&pages), vec!["Page"]);
    }

    #[tokio::test]
    async fn test_query_failure_propagates() {
        let mut document = StubDocument::new(fixtures::assembly_index()).with_query_failure("engine gone");
        let err = resolve_objects(&ObjectSelector::AllShapes, OutputKind::Stl, &mut document)
            .await
            .unwrap_err();
        assert_eq!(err, ResolutionError::Query("engine gone".to_string()));
    }
}
