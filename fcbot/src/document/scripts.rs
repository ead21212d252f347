//! Python scripts run inside the FreeCAD process.
//!
//! A script is the prologue, one operation body defining
//! `run(doc, request)`, and the epilogue. The request is a JSON file named
//! by the `FCBOT_REQUEST` environment variable. The answer is written as
//! JSON to [`RESULT_FILE`] next to the request, since the FreeCAD GUI
//! captures Python's stdout in its report view.

/// Name of the answer file, created in the request file's directory.
pub const RESULT_FILE: &str = "result.json";

/// Environment variable naming the request file.
pub const REQUEST_ENV: &str = "FCBOT_REQUEST";

const PROLOGUE: &str = r#"
import json
import os
import sys


_fcbot_request_path = os.environ["FCBOT_REQUEST"]
_fcbot_result_path = os.path.join(os.path.dirname(_fcbot_request_path), "result.json")


def _fcbot_finish(payload):
    with open(_fcbot_result_path, "w", encoding="utf-8") as result_file:
        json.dump(payload, result_file)
    os._exit(0)


with open(_fcbot_request_path, "r", encoding="utf-8") as _fcbot_file:
    request = json.load(_fcbot_file)

for _fcbot_path in reversed(request.get("paths", [])):
    if _fcbot_path not in sys.path:
        sys.path.insert(0, _fcbot_path)
"#;

const EPILOGUE: &str = r#"
try:
    import FreeCAD

    _fcbot_doc = FreeCAD.openDocument(request["document"])
    _fcbot_finish({"ok": True, "data": run(_fcbot_doc, request)})
except Exception as e:
    _fcbot_finish({"ok": False, "error": repr(e)})
"#;

/// Lists every object of the document.
pub const LIST_OBJECTS: &str = r#"
def run(doc, request):
    objects = []
    for obj in doc.Objects:
        objects.append({
            "name": obj.Name,
            "label": obj.Label,
            "type_id": obj.TypeId,
            "has_shape": hasattr(obj, "Shape"),
            "parents": [parent.Name for parent, _ in obj.Parents],
        })
    return {"objects": objects}
"#;

/// Exports `objects` as one STEP file.
pub const EXPORT_STEP: &str = r#"
def run(doc, request):
    import Import

    items = [doc.getObject(name) for name in request["objects"]]
    Import.export(items, request["target"])
    return {}
"#;

/// Exports the single object in `objects` as an STL mesh.
pub const EXPORT_STL: &str = r#"
def run(doc, request):
    item = doc.getObject(request["objects"][0])
    item.Shape.exportStl(request["target"])
    return {}
"#;

/// Exports drawing pages, merging them with pypdf when there are several.
pub const EXPORT_PDF: &str = r#"
def run(doc, request):
    import FreeCADGui
    import TechDrawGui

    pages = [doc.getObject(name) for name in request["objects"]]
    for page in pages:
        page.recompute(True)
    FreeCADGui.updateGui()

    if len(pages) == 1:
        TechDrawGui.exportPageAsPdf(pages[0], request["target"])
        return {"pages": 1}

    from pypdf import PdfReader, PdfWriter

    writer = PdfWriter()
    workdir = os.path.dirname(request["target"])
    for i, page in enumerate(pages):
        page_fn = os.path.join(workdir, "page-%d.pdf" % i)
        TechDrawGui.exportPageAsPdf(page, page_fn)
        if not os.path.isfile(page_fn):
            raise RuntimeError("no PDF generated for page " + page.Label)
        for sheet in PdfReader(page_fn).pages:
            writer.add_page(sheet)

    with open(request["target"], "wb") as out:
        writer.write(out)
    return {"pages": len(pages)}
"#;

/// Renders `objects` with every other solid in `shapes` hidden.
pub const SCREENSHOT: &str = r#"
def run(doc, request):
    import FreeCADGui

    selected = set(request["objects"])
    restore = {}
    for name in request["shapes"]:
        obj = doc.getObject(name)
        visible = name in selected
        if obj is not None and obj.Visibility != visible:
            restore[name] = obj.Visibility
            obj.Visibility = visible

    try:
        FreeCADGui.runCommand("Std_ViewCreate", 0)
        view = FreeCADGui.ActiveDocument.ActiveView
        if not view or not hasattr(view, "saveImage"):
            raise RuntimeError("Std_ViewCreate did not create a 3D view")

        camera = request["camera"]
        view.setCameraType(camera["projection"])
        view.setCameraOrientation(tuple(camera["orientation"]))
        if camera["position"] is None:
            view.fitAll()
        else:
            view.getCameraNode().position.setValue(*camera["position"])

        view.saveImage(request["target"], camera["width"], camera["height"], camera["background"])
    finally:
        for name, visible in restore.items():
            obj = doc.getObject(name)
            if obj is not None:
                obj.Visibility = visible

    return {}
"#;

/// Assembles a complete script around an operation body.
#[must_use]
pub fn compose(body: &str) -> String {
    format!("{PROLOGUE}\n{body}\n{EPILOGUE}")
}
