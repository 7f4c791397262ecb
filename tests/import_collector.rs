use mirrorgen::core::ImportCollector;

#[test]
fn add_is_idempotent_and_ignores_empty_paths() {
    let mut imports = ImportCollector::new();

    assert!(imports.add("example.com/mirror/tls"));
    assert!(!imports.add("example.com/mirror/tls"));
    assert!(!imports.add(""));

    assert_eq!(imports.len(), 1);
    assert!(imports.contains("example.com/mirror/tls"));
}

#[test]
fn block_is_sorted_and_quoted() {
    let mut imports = ImportCollector::new();
    imports.add("example.com/mirror/types");
    imports.add("example.com/mirror/tls");
    imports.add("encoding/json");

    assert_eq!(
        imports.render_block(),
        "import (\n\t\"encoding/json\"\n\t\"example.com/mirror/tls\"\n\t\"example.com/mirror/types\"\n)\n"
    );
}

#[test]
fn empty_collector_renders_no_block() {
    assert_eq!(ImportCollector::new().render_block(), "");
}
