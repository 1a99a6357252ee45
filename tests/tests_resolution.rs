//! End-to-end definition scenarios across the workspace.

use strom::Position;
use strom::ide::Location;
use strom::workspace::{TextChange, Workspace};
use tokio_util::sync::CancellationToken;

fn definition(
    workspace: &Workspace,
    uri: &str,
    line: u32,
    character: u32,
) -> Option<Location> {
    workspace
        .definition(uri, Position::new(line, character), &CancellationToken::new())
        .expect("query not cancelled")
        .into_iter()
        .next()
}

#[test]
fn inner_local_shadows_outer() {
    let mut workspace = Workspace::new();
    workspace.open_document(
        "file:///app.strom",
        "module app;\n\
         fn void main() {\n\
         \x20   int value = 1;\n\
         \x20   {\n\
         \x20       int value = 2;\n\
         \x20       int x = value;\n\
         \x20   }\n\
         }\n",
        1,
    );

    let location = definition(&workspace, "file:///app.strom", 5, 17).unwrap();
    assert_eq!(location.range.start, Position::new(4, 12));
}

#[test]
fn local_is_not_visible_before_its_declaration() {
    let mut workspace = Workspace::new();
    workspace.open_document(
        "file:///app.strom",
        "module app;\n\
         fn void main() {\n\
         \x20   int x = value;\n\
         \x20   int value = 1;\n\
         }\n",
        1,
    );

    assert!(definition(&workspace, "file:///app.strom", 2, 13).is_none());
}

#[test]
fn qualified_call_resolves_across_documents() {
    let mut workspace = Workspace::new();
    workspace.open_document("file:///foo.strom", "module foo;\nfn void tick() {}\n", 1);
    workspace.open_document(
        "file:///app.strom",
        "module app;\n\
         import foo;\n\
         fn void main() {\n\
         \x20   foo::tick();\n\
         }\n",
        1,
    );

    let location = definition(&workspace, "file:///app.strom", 3, 10).unwrap();
    assert_eq!(location.uri, "file:///foo.strom");
    assert_eq!(location.range.start, Position::new(1, 8));
}

#[test]
fn bare_module_name_resolves_to_its_section() {
    let mut workspace = Workspace::new();
    workspace.open_document("file:///foo.strom", "module foo;\nfn void tick() {}\n", 1);
    workspace.open_document(
        "file:///app.strom",
        "module app;\n\
         import foo;\n\
         fn void main() {\n\
         \x20   foo::tick();\n\
         }\n",
        1,
    );

    let location = definition(&workspace, "file:///app.strom", 3, 5).unwrap();
    assert_eq!(location.uri, "file:///foo.strom");
    assert_eq!(location.range.start.line, 0);
}

#[test]
fn inline_member_fields_are_hoisted() {
    let mut workspace = Workspace::new();
    workspace.open_document(
        "file:///shapes.strom",
        "module shapes;\n\
         struct Inner {\n\
         \x20   int a;\n\
         }\n\
         struct Outer {\n\
         \x20   inline Inner inner;\n\
         \x20   int b;\n\
         }\n\
         fn void build() {\n\
         \x20   Outer obj;\n\
         \x20   obj.a;\n\
         }\n",
        1,
    );

    let location = definition(&workspace, "file:///shapes.strom", 10, 8).unwrap();
    assert_eq!(location.range.start, Position::new(2, 8));
}

#[test]
fn method_resolves_through_instance() {
    let mut workspace = Workspace::new();
    workspace.open_document(
        "file:///media.strom",
        "module media;\n\
         struct Video {\n\
         \x20   bool open;\n\
         }\n\
         fn bool Video.isOpen(&self) {\n\
         \x20   return self.open;\n\
         }\n\
         fn void play() {\n\
         \x20   Video v;\n\
         \x20   v.isOpen();\n\
         }\n",
        1,
    );

    let location = definition(&workspace, "file:///media.strom", 9, 7).unwrap();
    assert_eq!(location.range.start, Position::new(4, 14));

    // `self` inside the method carries the receiver type.
    let field = definition(&workspace, "file:///media.strom", 5, 17).unwrap();
    assert_eq!(field.range.start, Position::new(2, 9));
}

#[test]
fn inline_distinct_exposes_its_own_methods() {
    let mut workspace = Workspace::new();
    workspace.open_document(
        "file:///maths.strom",
        "module maths;\n\
         typedef SuperInt = inline int;\n\
         fn SuperInt SuperInt.addOne(self) {\n\
         \x20   return self;\n\
         }\n\
         fn void calc() {\n\
         \x20   SuperInt x;\n\
         \x20   x.addOne();\n\
         }\n",
        1,
    );

    let location = definition(&workspace, "file:///maths.strom", 7, 7).unwrap();
    assert_eq!(location.range.start, Position::new(2, 21));
}

#[test]
fn non_inline_distinct_hides_base_members() {
    let mut workspace = Workspace::new();
    workspace.open_document(
        "file:///wrap.strom",
        "module wrap;\n\
         struct Point {\n\
         \x20   int x;\n\
         }\n\
         distinct Handle = Point;\n\
         fn void probe() {\n\
         \x20   Handle h;\n\
         \x20   h.x;\n\
         }\n",
        1,
    );

    assert!(definition(&workspace, "file:///wrap.strom", 7, 6).is_none());
}

#[test]
fn fault_constants_resolve_with_module_prefix() {
    let mut workspace = Workspace::new();
    workspace.open_document(
        "file:///io.strom",
        "module io;\nfaultdef NOT_FOUND, DENIED;\n",
        1,
    );
    workspace.open_document(
        "file:///app.strom",
        "module app;\n\
         import io;\n\
         fn void run() {\n\
         \x20   io::NOT_FOUND;\n\
         }\n",
        1,
    );

    let location = definition(&workspace, "file:///app.strom", 3, 10).unwrap();
    assert_eq!(location.uri, "file:///io.strom");
    assert_eq!(location.range.start, Position::new(1, 9));
}

#[test]
fn private_sections_are_invisible_to_foreign_modules() {
    let mut workspace = Workspace::new();
    workspace.open_document(
        "file:///lib.strom",
        "module lib @private;\nint hidden = 1;\n",
        1,
    );
    workspace.open_document(
        "file:///app.strom",
        "module app;\n\
         import lib;\n\
         fn void f() {\n\
         \x20   hidden;\n\
         }\n",
        1,
    );
    workspace.open_document(
        "file:///sub.strom",
        "module lib::sub;\n\
         fn void g() {\n\
         \x20   hidden;\n\
         }\n",
        1,
    );

    assert!(definition(&workspace, "file:///app.strom", 3, 6).is_none());
    let location = definition(&workspace, "file:///sub.strom", 2, 6).unwrap();
    assert_eq!(location.uri, "file:///lib.strom");
}

#[test]
fn partial_import_matches_by_suffix() {
    let mut workspace = Workspace::new();
    workspace.open_document(
        "file:///stdio.strom",
        "module std::io;\nfn void open() {}\n",
        1,
    );
    workspace.open_document(
        "file:///app.strom",
        "module app;\n\
         import io;\n\
         fn void main() {\n\
         \x20   open();\n\
         }\n",
        1,
    );

    let location = definition(&workspace, "file:///app.strom", 3, 5).unwrap();
    assert_eq!(location.uri, "file:///stdio.strom");
    assert_eq!(location.range.start, Position::new(1, 8));
}

#[test]
fn enum_members_differ_by_type_and_instance() {
    let mut workspace = Workspace::new();
    workspace.open_document(
        "file:///colors.strom",
        "module colors;\n\
         enum Color : int (String label) {\n\
         \x20   RED(\"red\"),\n\
         \x20   GREEN(\"green\")\n\
         }\n\
         fn void paint() {\n\
         \x20   Color c = Color.RED;\n\
         \x20   c.label;\n\
         }\n",
        1,
    );

    // Type access reaches the enumerator.
    let red = definition(&workspace, "file:///colors.strom", 6, 21).unwrap();
    assert_eq!(red.range.start, Position::new(2, 4));

    // Instance access reaches the associated value instead.
    assert!(definition(&workspace, "file:///colors.strom", 7, 7).is_some());
}

#[test]
fn keywords_never_resolve() {
    let mut workspace = Workspace::new();
    workspace.open_document(
        "file:///app.strom",
        "module app;\n\
         fn void main() {\n\
         \x20   return;\n\
         }\n",
        1,
    );

    assert!(definition(&workspace, "file:///app.strom", 2, 6).is_none());
}

#[test]
fn cancelled_queries_stop_early() {
    let mut workspace = Workspace::new();
    workspace.open_document("file:///app.strom", "module app;\nint x = 1;\n", 1);

    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = workspace.definition("file:///app.strom", Position::new(1, 5), &cancel);
    assert_eq!(result, Err(strom::QueryError::Cancelled));
}

#[test]
fn resolution_is_idempotent_across_edits() {
    let mut workspace = Workspace::new();
    let text = "module app;\n\
                int counter = 0;\n\
                fn void main() {\n\
                \x20   counter;\n\
                }\n";
    workspace.open_document("file:///app.strom", text, 1);
    let first = definition(&workspace, "file:///app.strom", 3, 6).unwrap();

    workspace.update_document("file:///app.strom", vec![TextChange::full(text)], 2);
    let second = definition(&workspace, "file:///app.strom", 3, 6).unwrap();
    assert_eq!(first, second);
}
