//! Tests for LoadService

use std::path::PathBuf;
use std::sync::Arc;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use luabundle::application::services::{LoadService, PreviewOptions};
use luabundle::application::ApplicationError;
use luabundle::config::Settings;
use luabundle::domain::TreeStyle;
use luabundle::infrastructure::traits::RealFileSystem;
use luabundle::util::testing;

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

fn create_lua_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(&path, content).expect("write lua file");
    path
}

#[fixture]
fn loader() -> LoadService {
    LoadService::new(Arc::new(RealFileSystem), Arc::new(Settings::default()))
}

#[rstest]
fn given_project_when_loading_then_bundle_wraps_dependencies_and_ends_with_entry(
    loader: LoadService,
) {
    // Arrange
    let temp = TempDir::new().unwrap();
    create_lua_file(&temp, "lib/util.lua", "return { answer = 42 }");
    let entry = create_lua_file(
        &temp,
        "main.lua",
        "local util = require(\"lib.util\")\nprint(util.answer)",
    );

    // Act
    let out = loader.load(&entry).unwrap();

    // Assert
    let expected = "-- module: \"lib.util\"\n\
                    local function _loaded_mod_lib_util()\n\
                    return { answer = 42 }\n\
                    end\n\
                    \n\
                    _G.package.loaded[\"lib.util\"] = _loaded_mod_lib_util()\n\
                    \n\
                    local util = require(\"lib.util\")\n\
                    print(util.answer)";
    assert_eq!(out.bundle.source, expected);
    assert_eq!(out.bundle.modules.len(), 2);
}

#[rstest]
fn given_dependency_chain_when_loading_then_definitions_precede_their_users(loader: LoadService) {
    let temp = TempDir::new().unwrap();
    create_lua_file(&temp, "b.lua", "return 'b'");
    create_lua_file(&temp, "a.lua", "return require('b')");
    let entry = create_lua_file(&temp, "main.lua", "print(require('a'))");

    let source = loader.load(&entry).unwrap().bundle.source;

    let b = source.find("_G.package.loaded[\"b\"]").unwrap();
    let a = source.find("local function _loaded_mod_a()").unwrap();
    let main = source.find("print(require('a'))").unwrap();
    assert!(b < a);
    assert!(a < main);
    assert!(source.ends_with("print(require('a'))"));
}

#[rstest]
fn given_two_names_for_one_file_when_loading_then_one_definition_and_two_registrations(
    loader: LoadService,
) {
    let temp = TempDir::new().unwrap();
    create_lua_file(&temp, "lib/util.lua", "return {}");
    let entry = create_lua_file(&temp, "main.lua", "require('lib.util')\nrequire('lib/util')");

    let source = loader.load(&entry).unwrap().bundle.source;

    assert_eq!(source.matches("local function _loaded_mod_lib_util()").count(), 1);
    assert!(source.contains("_G.package.loaded[\"lib.util\"] = _loaded_mod_lib_util()"));
    assert!(source.contains("_G.package.loaded[\"lib/util\"] = _loaded_mod_lib_util()"));
}

#[rstest]
fn given_names_deriving_same_loader_id_when_loading_then_each_name_keeps_its_file(
    loader: LoadService,
) {
    let temp = TempDir::new().unwrap();
    create_lua_file(&temp, "a/b.lua", "return 'AB'");
    create_lua_file(&temp, "a_b.lua", "return 'A_B'");
    let entry = create_lua_file(
        &temp,
        "main.lua",
        "require('a.b')\nrequire('a_b')\nrequire('a/b')",
    );

    let source = loader.load(&entry).unwrap().bundle.source;

    assert!(source.contains("local function _loaded_mod_a_b()\nreturn 'AB'\nend"));
    assert!(source.contains("local function _loaded_mod_a_b_2()\nreturn 'A_B'\nend"));
    assert!(source.contains("_G.package.loaded[\"a.b\"] = _loaded_mod_a_b()"));
    assert!(source.contains("_G.package.loaded[\"a_b\"] = _loaded_mod_a_b_2()"));
    assert!(source.contains("_G.package.loaded[\"a/b\"] = _loaded_mod_a_b()"));
}

#[rstest]
fn given_non_utf8_dependency_when_loading_then_bundles_it_lossily(loader: LoadService) {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("lat.lua"), b"return \"caf\xe9\"").unwrap();
    let entry = create_lua_file(&temp, "main.lua", "print(require('lat'))");

    let out = loader.load(&entry).unwrap();

    assert!(out
        .bundle
        .source
        .contains("local function _loaded_mod_lat()\nreturn \"caf\u{FFFD}\"\nend"));
    assert!(out.bundle.source.ends_with("print(require('lat'))"));
}

#[rstest]
fn given_non_utf8_entry_when_loading_then_bundles_it_lossily(loader: LoadService) {
    let temp = TempDir::new().unwrap();
    let entry = temp.path().join("main.lua");
    std::fs::write(&entry, b"print(\"\xff\")").unwrap();

    let out = loader.load(&entry).unwrap();

    assert_eq!(out.bundle.source, "print(\"\u{FFFD}\")");
}

#[rstest]
fn given_entry_without_requires_when_loading_then_bundle_is_entry_content(loader: LoadService) {
    let temp = TempDir::new().unwrap();
    let entry = create_lua_file(&temp, "main.lua", "print('hello')\n");

    let out = loader.load(&entry).unwrap();

    assert_eq!(out.bundle.source, "print('hello')\n");
}

#[rstest]
fn given_relative_preview_when_rendering_then_entry_is_labelled(loader: LoadService) {
    let temp = TempDir::new().unwrap();
    create_lua_file(&temp, "lib/a.lua", "return 1");
    create_lua_file(&temp, "lib/b.lua", "return 2");
    let entry = create_lua_file(&temp, "main.lua", "require('lib.a')\nrequire('lib.b')\n");
    let project = loader.resolve(&entry).unwrap();

    let preview = loader.preview(
        &project,
        &PreviewOptions {
            style: TreeStyle::UNICODE,
            relative: true,
            label: Some("[MAIN]".into()),
        },
    );

    assert_eq!(preview, "lib\n├── a.lua\n└── b.lua\nmain.lua [MAIN]");
}

#[rstest]
fn given_absolute_preview_when_rendering_then_shared_prefix_is_compressed(loader: LoadService) {
    let temp = TempDir::new().unwrap();
    create_lua_file(&temp, "util.lua", "return 1");
    let entry = create_lua_file(&temp, "main.lua", "require('util')\n");
    let project = loader.resolve(&entry).unwrap();

    let preview = loader.preview(&project, &PreviewOptions::default());

    let lines: Vec<&str> = preview.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with(project.root.file_name().unwrap().to_str().unwrap()));
    assert_eq!(lines[1], "├── util.lua");
    assert_eq!(lines[2], "└── main.lua");
}

#[rstest]
fn given_load_directive_when_loading_then_resolves_against_cwd(loader: LoadService) {
    let temp = TempDir::new().unwrap();
    create_lua_file(&temp, "process/main.lua", "print(1)");

    let out = loader
        .load_directive(".load \"process/main.lua\"", temp.path())
        .unwrap();

    assert_eq!(out.bundle.source, "print(1)");
    assert!(out.project.entry.ends_with("process/main.lua"));
}

#[rstest]
fn given_directive_for_wrong_extension_when_loading_then_errors(loader: LoadService) {
    let temp = TempDir::new().unwrap();

    let result = loader.load_directive(".load main.js", temp.path());

    assert!(matches!(
        result,
        Err(ApplicationError::InvalidExtension { .. })
    ));
}

#[rstest]
fn given_bundle_when_writing_then_creates_parent_dirs(loader: LoadService) {
    let temp = TempDir::new().unwrap();
    let entry = create_lua_file(&temp, "main.lua", "print(1)");
    let out = loader.load(&entry).unwrap();
    let target = temp.path().join("build/nested/out.lua");

    loader.write_bundle(&out.bundle, &target).unwrap();

    assert_eq!(std::fs::read_to_string(&target).unwrap(), "print(1)");
}

#[rstest]
fn given_spec_directory_when_bundling_specs_then_only_spec_files_are_written(
    loader: LoadService,
) {
    let temp = TempDir::new().unwrap();
    create_lua_file(&temp, "helper.lua", "return {}");
    create_lua_file(&temp, "a_spec.lua", "local h = require('helper')");
    create_lua_file(&temp, "b_spec.lua", "print('b')");
    let out_dir = temp.path().join("out");

    let report = loader.bundle_specs(temp.path(), &out_dir).unwrap();

    assert!(report.is_success());
    assert_eq!(
        report.bundled,
        vec![out_dir.join("a_spec.lua"), out_dir.join("b_spec.lua")]
    );
    assert!(!out_dir.join("helper.lua").exists());
    let a = std::fs::read_to_string(out_dir.join("a_spec.lua")).unwrap();
    assert!(a.contains("_G.package.loaded[\"helper\"] = _loaded_mod_helper()"));
}

#[rstest]
fn given_unwritable_spec_output_when_bundling_specs_then_others_still_bundle(
    loader: LoadService,
) {
    let temp = TempDir::new().unwrap();
    create_lua_file(&temp, "bad_spec.lua", "print('bad')");
    create_lua_file(&temp, "good_spec.lua", "print('ok')");
    let out_dir = temp.path().join("out");
    // a directory where the bundle file should go
    std::fs::create_dir_all(out_dir.join("bad_spec.lua")).unwrap();

    let report = loader.bundle_specs(temp.path(), &out_dir).unwrap();

    assert!(!report.is_success());
    assert_eq!(report.bundled, vec![out_dir.join("good_spec.lua")]);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].0.ends_with("bad_spec.lua"));
}

#[rstest]
fn given_missing_spec_directory_when_bundling_specs_then_errors(loader: LoadService) {
    let temp = TempDir::new().unwrap();

    let result = loader.bundle_specs(&temp.path().join("nope"), &temp.path().join("out"));

    assert!(result.is_err());
}
