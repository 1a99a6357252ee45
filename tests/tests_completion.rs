//! Completion engine scenarios.

use strom::Position;
use strom::ide::{CompletionItem, CompletionKind};
use strom::workspace::Workspace;
use tokio_util::sync::CancellationToken;

fn completions(
    workspace: &Workspace,
    uri: &str,
    line: u32,
    character: u32,
) -> Vec<CompletionItem> {
    workspace
        .completions(uri, Position::new(line, character), &CancellationToken::new())
        .expect("query not cancelled")
}

fn labels(items: &[CompletionItem]) -> Vec<&str> {
    items.iter().map(|i| i.label.as_str()).collect()
}

#[test]
fn enum_type_members_filter_by_prefix() {
    let mut workspace = Workspace::new();
    workspace.open_document(
        "file:///colors.strom",
        "module colors;\n\
         enum Color {\n\
         \x20   RED,\n\
         \x20   GREEN\n\
         }\n\
         fn Color Color.transparentize(self) {\n\
         \x20   return self;\n\
         }\n\
         fn void mix() {\n\
         \x20   Color.tra\n\
         }\n",
        1,
    );

    let items = completions(&workspace, "file:///colors.strom", 9, 13);
    assert_eq!(labels(&items), vec!["transparentize"]);
    assert_eq!(items[0].kind, CompletionKind::Method);
}

#[test]
fn enum_type_dot_lists_enumerators_and_methods() {
    let mut workspace = Workspace::new();
    workspace.open_document(
        "file:///colors.strom",
        "module colors;\n\
         enum Color {\n\
         \x20   RED,\n\
         \x20   GREEN\n\
         }\n\
         fn Color Color.transparentize(self) {\n\
         \x20   return self;\n\
         }\n\
         fn void mix() {\n\
         \x20   Color.\n\
         }\n",
        1,
    );

    let items = completions(&workspace, "file:///colors.strom", 9, 10);
    assert_eq!(labels(&items), vec!["GREEN", "RED", "transparentize"]);
}

#[test]
fn module_path_window_lists_matching_modules() {
    let mut workspace = Workspace::new();
    workspace.open_document("file:///core.strom", "module app::core;\n", 1);
    workspace.open_document("file:///window.strom", "module app::window;\n", 1);
    workspace.open_document(
        "file:///errors.strom",
        "module app::window::errors;\n",
        1,
    );
    workspace.open_document(
        "file:///main.strom",
        "module main;\n\
         fn void run() {\n\
         \x20   app::\n\
         }\n",
        1,
    );

    let items = completions(&workspace, "file:///main.strom", 2, 9);
    assert_eq!(
        labels(&items),
        vec!["app::core", "app::window", "app::window::errors"]
    );
    assert!(items.iter().all(|i| i.kind == CompletionKind::Module));
}

#[test]
fn struct_instance_dot_lists_fields() {
    let mut workspace = Workspace::new();
    workspace.open_document(
        "file:///geo.strom",
        "module geo;\n\
         struct Point {\n\
         \x20   int x;\n\
         \x20   int y;\n\
         }\n\
         fn void use() {\n\
         \x20   Point p;\n\
         \x20   p.\n\
         }\n",
        1,
    );

    let items = completions(&workspace, "file:///geo.strom", 7, 6);
    assert_eq!(labels(&items), vec!["x", "y"]);
    assert!(items.iter().all(|i| i.kind == CompletionKind::Field));
}

#[test]
fn plain_prefix_mixes_symbols_and_keywords() {
    let mut workspace = Workspace::new();
    workspace.open_document(
        "file:///app.strom",
        "module app;\n\
         int counter = 0;\n\
         fn void tick() {\n\
         \x20   int local_value = 1;\n\
         \x20   co\n\
         }\n",
        1,
    );

    let items = completions(&workspace, "file:///app.strom", 4, 6);
    let labels = labels(&items);
    assert!(labels.contains(&"counter"));
    assert!(labels.contains(&"const"));
    assert!(labels.contains(&"continue"));
    assert!(!labels.contains(&"local_value"));

    let counter = items.iter().find(|i| i.label == "counter").unwrap();
    assert_eq!(counter.kind, CompletionKind::Variable);
}

#[test]
fn locals_complete_inside_their_scope() {
    let mut workspace = Workspace::new();
    workspace.open_document(
        "file:///app.strom",
        "module app;\n\
         fn void tick() {\n\
         \x20   int local_value = 1;\n\
         \x20   lo\n\
         }\n",
        1,
    );

    let items = completions(&workspace, "file:///app.strom", 3, 6);
    assert!(labels(&items).contains(&"local_value"));
}

#[test]
fn import_statement_completes_module_paths() {
    let mut workspace = Workspace::new();
    workspace.open_document("file:///stdio.strom", "module std::io;\n", 1);
    workspace.open_document("file:///app.strom", "module app;\nimport std\n", 1);

    let items = completions(&workspace, "file:///app.strom", 1, 10);
    assert!(labels(&items).contains(&"std::io"));
}

#[test]
fn comments_and_literals_complete_nothing() {
    let mut workspace = Workspace::new();
    workspace.open_document(
        "file:///app.strom",
        "module app;\n\
         // counter notes\n\
         int counter = 0;\n\
         char* s = \"counter\";\n",
        1,
    );

    assert!(completions(&workspace, "file:///app.strom", 1, 6).is_empty());
    assert!(completions(&workspace, "file:///app.strom", 3, 14).is_empty());
}

#[test]
fn output_is_sorted_case_insensitively() {
    let mut workspace = Workspace::new();
    workspace.open_document(
        "file:///zoo.strom",
        "module zoo;\n\
         struct Animal {\n\
         \x20   int Zebra;\n\
         \x20   int ant;\n\
         \x20   int Bee;\n\
         }\n\
         fn void visit() {\n\
         \x20   Animal a;\n\
         \x20   a.\n\
         }\n",
        1,
    );

    let items = completions(&workspace, "file:///zoo.strom", 8, 6);
    assert_eq!(labels(&items), vec!["ant", "Bee", "Zebra"]);
}
