//! Hover, signature help, and find-implementations.

use strom::Position;
use strom::workspace::Workspace;
use tokio_util::sync::CancellationToken;

fn cancel() -> CancellationToken {
    CancellationToken::new()
}

#[test]
fn hover_renders_function_signature_and_doc() {
    let mut workspace = Workspace::new();
    workspace.open_document(
        "file:///media.strom",
        "module media;\n\
         <* Opens the stream.\n\
         \x20  @require path\n\
         *>\n\
         fn bool open(String path) {\n\
         \x20   return true;\n\
         }\n\
         fn void main() {\n\
         \x20   open(\"x\");\n\
         }\n",
        1,
    );

    let hover = workspace
        .hover("file:///media.strom", Position::new(8, 5), &cancel())
        .unwrap()
        .unwrap();
    assert!(hover.contents.contains("```strom\nfn bool open(String path)\n```"));
    assert!(hover.contents.contains("In module **media**"));
    assert!(hover.contents.contains("Opens the stream."));
    assert!(hover.contents.contains("**@require**"));
}

#[test]
fn hover_renders_distinct_declarations() {
    let mut workspace = Workspace::new();
    workspace.open_document(
        "file:///maths.strom",
        "module maths;\n\
         typedef SuperInt = inline int;\n\
         fn void calc() {\n\
         \x20   SuperInt x;\n\
         }\n",
        1,
    );

    let hover = workspace
        .hover("file:///maths.strom", Position::new(3, 6), &cancel())
        .unwrap()
        .unwrap();
    assert!(hover.contents.contains("distinct SuperInt = inline int"));
}

#[test]
fn hover_range_covers_the_word() {
    let mut workspace = Workspace::new();
    workspace.open_document(
        "file:///app.strom",
        "module app;\nint counter = 0;\nfn void f() {\n\x20   counter;\n}\n",
        1,
    );

    let hover = workspace
        .hover("file:///app.strom", Position::new(3, 6), &cancel())
        .unwrap()
        .unwrap();
    assert_eq!(hover.range.start, Position::new(3, 4));
    assert_eq!(hover.range.end, Position::new(3, 11));
}

#[test]
fn hover_shows_enumerator_values() {
    let mut workspace = Workspace::new();
    workspace.open_document(
        "file:///paint.strom",
        "module paint;\n\
         enum Color : int {\n\
         \x20   RED = 3,\n\
         \x20   GREEN\n\
         }\n\
         fn void main() {\n\
         \x20   Color c = Color.RED;\n\
         }\n",
        1,
    );

    let hover = workspace
        .hover("file:///paint.strom", Position::new(6, 21), &cancel())
        .unwrap()
        .unwrap();
    assert!(hover.contents.contains("```strom\nRED: 3\n```"));
}

#[test]
fn macro_hover_includes_the_body_parameter() {
    let mut workspace = Workspace::new();
    workspace.open_document(
        "file:///meta.strom",
        "module meta;\n\
         macro int twice(int x; @body(int y)) {\n\
         }\n\
         fn void main() {\n\
         \x20   twice(2);\n\
         }\n",
        1,
    );

    let hover = workspace
        .hover("file:///meta.strom", Position::new(4, 6), &cancel())
        .unwrap()
        .unwrap();
    assert!(hover.contents.contains("macro int twice(int x; @body(int y))"));
}

#[test]
fn signature_help_tracks_the_active_parameter() {
    let mut workspace = Workspace::new();
    workspace.open_document(
        "file:///calc.strom",
        "module calc;\n\
         fn int add(int first, int second) {\n\
         \x20   return first;\n\
         }\n\
         fn void main() {\n\
         \x20   add(1, \n\
         }\n",
        1,
    );

    let help = workspace
        .signature_help("file:///calc.strom", Position::new(5, 11), &cancel())
        .unwrap()
        .unwrap();
    assert_eq!(help.label, "fn int add(int first, int second)");
    assert_eq!(help.parameters, vec!["int first", "int second"]);
    assert_eq!(help.active_parameter, 1);
}

#[test]
fn signature_help_clamps_past_the_last_parameter() {
    let mut workspace = Workspace::new();
    workspace.open_document(
        "file:///calc.strom",
        "module calc;\n\
         fn int add(int first, int second) {\n\
         \x20   return first;\n\
         }\n\
         fn void main() {\n\
         \x20   add(1, 2, 3, \n\
         }\n",
        1,
    );

    let help = workspace
        .signature_help("file:///calc.strom", Position::new(5, 17), &cancel())
        .unwrap()
        .unwrap();
    assert_eq!(help.active_parameter, 1);
}

#[test]
fn signature_help_outside_calls_is_empty() {
    let mut workspace = Workspace::new();
    workspace.open_document(
        "file:///calc.strom",
        "module calc;\nfn void main() {\n\x20   int x = 1;\n}\n",
        1,
    );

    let help = workspace
        .signature_help("file:///calc.strom", Position::new(2, 10), &cancel())
        .unwrap();
    assert!(help.is_none());
}

#[test]
fn interface_lists_implementing_structs() {
    let mut workspace = Workspace::new();
    workspace.open_document(
        "file:///shapes.strom",
        "module shapes;\n\
         interface Drawable {\n\
         \x20   fn void draw();\n\
         }\n\
         struct Circle (Drawable) {\n\
         \x20   int radius;\n\
         }\n\
         fn void Circle.draw(&self) {\n\
         }\n",
        1,
    );

    let locations = workspace
        .implementations("file:///shapes.strom", Position::new(1, 12), &cancel())
        .unwrap();
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].range.start, Position::new(4, 7));
}

#[test]
fn interface_method_lists_implementing_methods() {
    let mut workspace = Workspace::new();
    workspace.open_document(
        "file:///shapes.strom",
        "module shapes;\n\
         interface Drawable {\n\
         \x20   fn void draw();\n\
         }\n\
         struct Circle (Drawable) {\n\
         \x20   int radius;\n\
         }\n\
         fn void Circle.draw(&self) {\n\
         }\n",
        1,
    );

    let locations = workspace
        .implementations("file:///shapes.strom", Position::new(2, 13), &cancel())
        .unwrap();
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].range.start, Position::new(7, 15));
}

#[test]
fn interface_lists_implementing_bitstructs() {
    let mut workspace = Workspace::new();
    workspace.open_document(
        "file:///flags.strom",
        "module flags;\n\
         interface Printable {\n\
         \x20   fn void print();\n\
         }\n\
         bitstruct Flags : int (Printable) {\n\
         \x20   int raw : 0..7;\n\
         }\n\
         fn void Flags.print(&self) {\n\
         }\n",
        1,
    );

    let locations = workspace
        .implementations("file:///flags.strom", Position::new(1, 12), &cancel())
        .unwrap();
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].range.start, Position::new(4, 10));

    let methods = workspace
        .implementations("file:///flags.strom", Position::new(2, 13), &cancel())
        .unwrap();
    assert_eq!(methods.len(), 1);
    assert_eq!(methods[0].range.start, Position::new(7, 14));
}

#[test]
fn implementations_match_qualified_interface_names() {
    let mut workspace = Workspace::new();
    workspace.open_document(
        "file:///traits.strom",
        "module std::traits;\ninterface Printable {\n\x20   fn void print();\n}\n",
        1,
    );
    workspace.open_document(
        "file:///app.strom",
        "module app;\n\
         import std::traits;\n\
         struct Report (traits::Printable) {\n\
         \x20   int pages;\n\
         }\n",
        1,
    );

    let locations = workspace
        .implementations("file:///traits.strom", Position::new(1, 12), &cancel())
        .unwrap();
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].uri, "file:///app.strom");
}
