#![cfg(unix)]

// Registry behavior against real directory trees: discovery from MODELS files
// and installed packages, path priority, caching, and failure isolation.
mod support;

use anyhow::Result;
use modelreg::namespace::{Membership, Namespace, escape, is_file_namespace_member};
use modelreg::{RegistryError, registry};
use std::fs;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use support::{Workspace, fullnames};

const PROJ_A_MODELS: &str = r#"[
    {"name": "net", "description": "public network"},
    {"name": "debug-net", "private": true, "extends": ["net"]}
]"#;

fn proj_a_fullname(model: &str) -> String {
    format!(".modelfile.{}/{model}", escape("./proj-a"))
}

// Walks two file-backed roots through listing, private lookup, and add_model_path.
#[test]
fn two_project_scenario() -> Result<()> {
    let ws = Workspace::new();
    ws.write_modelfile("proj-a", PROJ_A_MODELS);
    ws.mkdir("proj-b");

    let mut registry = ws.registry();
    registry.set_path(vec!["./proj-a".into(), "./proj-b".into()]);

    let listed = registry.iterate();
    assert_eq!(fullnames(&listed), vec![proj_a_fullname("net")]);
    assert_eq!(listed[0].1.name(), "net");

    let private = registry.for_name(&proj_a_fullname("debug-net"))?;
    assert!(private.is_private());
    assert_eq!(private.fullname(), proj_a_fullname("debug-net"));

    ws.write_modelfile("proj-b", r#"{"name": "net2"}"#);
    registry.add_model_path("./proj-b");
    assert_eq!(registry.path(), ["./proj-b", "./proj-a"]);

    let listed = registry.iterate();
    let net2 = format!(".modelfile.{}/net2", escape("./proj-b"));
    let names = fullnames(&listed);
    assert_eq!(names.len(), 2);
    assert!(names.contains(&proj_a_fullname("net").as_str()));
    assert!(names.contains(&net2.as_str()));
    Ok(())
}

// Same fullname from two roots: the earlier root wins until the later one is promoted.
#[test]
fn earlier_root_wins_and_add_model_path_flips_priority() -> Result<()> {
    let ws = Workspace::new();
    ws.write_package(
        "site1",
        "mnist",
        "1.0",
        &[("mnist/MODELS", r#"{"name": "cnn", "description": "from site1"}"#)],
    );
    ws.write_package(
        "site2",
        "mnist",
        "2.0",
        &[("mnist/MODELS", r#"{"name": "cnn", "description": "from site2"}"#)],
    );

    let mut registry = ws.registry();
    registry.set_path(vec!["site1".into(), "site2".into()]);
    let model = registry.for_name("mnist/cnn")?;
    assert_eq!(model.modeldef().description.as_deref(), Some("from site1"));
    assert_eq!(model.reference(), "dist:mnist 1.0 cnn");

    registry.add_model_path("site2");
    let model = registry.for_name("mnist/cnn")?;
    assert_eq!(model.modeldef().description.as_deref(), Some("from site2"));
    assert_eq!(registry.iterate().len(), 1);
    Ok(())
}

// Lookups between path changes reuse one scan and hand back the same model objects.
#[test]
fn repeated_lookups_reuse_the_index() -> Result<()> {
    let ws = Workspace::new();
    ws.write_modelfile("proj-a", PROJ_A_MODELS);
    let (mut registry, scans) = ws.counting_registry();
    registry.set_path(vec!["./proj-a".into(), "./missing".into()]);

    let first = registry.iterate();
    let second = registry.iterate();
    assert_eq!(scans.load(Ordering::SeqCst), 2);
    assert_eq!(fullnames(&first), fullnames(&second));
    assert!(Arc::ptr_eq(&first[0].1, &second[0].1));

    let a = registry.for_name(&proj_a_fullname("net"))?;
    let b = registry.for_name(&proj_a_fullname("net"))?;
    assert!(Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(&a, &first[0].1));
    assert_eq!(scans.load(Ordering::SeqCst), 2);

    registry.set_path(registry.path().to_vec());
    registry.iterate();
    assert_eq!(scans.load(Ordering::SeqCst), 4);
    Ok(())
}

// Private models stay out of iterate() but remain resolvable by fullname.
#[test]
fn private_models_are_hidden_from_listing_only() -> Result<()> {
    let ws = Workspace::new();
    ws.write_modelfile("proj-a", PROJ_A_MODELS);
    let mut registry = ws.registry();
    registry.set_path(vec!["./proj-a".into()]);

    let public = registry.iterate();
    assert!(public.iter().all(|(_, model)| !model.is_private()));
    assert_eq!(public.len(), 1);

    let all = registry.entries();
    assert_eq!(
        fullnames(&all),
        vec![proj_a_fullname("debug-net"), proj_a_fullname("net")]
    );

    let private = registry.for_name(&proj_a_fullname("debug-net"))?;
    // extends copies the parent's description
    assert_eq!(private.modeldef().description.as_deref(), Some("public network"));
    Ok(())
}

// A malformed or dangling definition file is a warning, not a failed rebuild.
#[test]
fn invalid_definition_file_only_hides_its_own_root() -> Result<()> {
    let ws = Workspace::new();
    let broken = ws.write_modelfile("broken", r#"[{"name": "net""#);
    ws.write_modelfile("proj-a", PROJ_A_MODELS);
    ws.write_modelfile("dangling", r#"{"name": "x", "extends": ["nowhere"]}"#);

    let mut registry = ws.registry();
    registry.set_path(vec!["./broken".into(), "./dangling".into(), "./proj-a".into()]);

    let listed = registry.iterate();
    assert_eq!(fullnames(&listed), vec![proj_a_fullname("net")]);

    let warnings = registry.warnings();
    assert_eq!(warnings.len(), 2, "warnings: {warnings:?}");
    assert_eq!(warnings[0].source, broken);
    assert!(warnings[1].message.contains("undefined model 'nowhere'"));
    Ok(())
}

// Packages contribute models listed in RECORD; a package without RECORD only warns.
#[test]
fn packages_without_manifest_contribute_nothing() -> Result<()> {
    let ws = Workspace::new();
    ws.write_package(
        "site",
        "vision",
        "0.3",
        &[
            ("vision/__init__.py", ""),
            ("vision/MODELS", r#"[{"name": "resnet"}, {"name": "vgg"}]"#),
            ("vision/extra/MODEL", r#"{"name": "mobilenet", "resources": [{"name": "weights"}]}"#),
        ],
    );
    let broken = ws.mkdir("site/broken-1.0.dist-info");
    ws.write_package("site", "nomodels", "1.0", &[("nomodels/__init__.py", "")]);

    let mut registry = ws.registry();
    registry.set_path(vec!["site".into()]);
    let listed = registry.iterate();
    assert_eq!(
        fullnames(&listed),
        vec!["vision/mobilenet", "vision/resnet", "vision/vgg"]
    );
    let warnings = registry.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].source, broken);
    assert!(warnings[0].message.contains("missing RECORD"));

    let resource = registry.resource_for_name("vision/weights")?;
    assert_eq!(resource.name(), "weights");
    Ok(())
}

// A root holding both a MODELS file and packages lists the file distribution first.
#[test]
fn root_with_modelfile_and_packages_contributes_both() -> Result<()> {
    let ws = Workspace::new();
    ws.write_modelfile("site", r#"{"name": "local", "resources": [{"name": "data"}]}"#);
    ws.write_package("site", "pkg", "1.0", &[("pkg/MODELS", r#"{"name": "remote"}"#)]);

    let mut registry = ws.registry();
    registry.set_path(vec!["site".into()]);
    let listed = registry.iterate();
    let local = format!(".modelfile.{}/local", escape("./site"));
    assert_eq!(fullnames(&listed), vec![local.as_str(), "pkg/remote"]);

    let resources = registry.iter_resources();
    assert_eq!(
        fullnames(&resources),
        vec![format!(".modelfile.{}/data", escape("./site"))]
    );
    Ok(())
}

// File-backed fullnames decode back to the defining directory and refuse installation.
#[test]
fn fullname_recovers_defining_directory() -> Result<()> {
    let ws = Workspace::new();
    ws.write_modelfile("nested/proj", r#"{"name": "net"}"#);
    let mut registry = ws.registry();
    registry.set_path(vec![ws.path().join("nested/proj").display().to_string()]);

    let (fullname, model) = registry.iterate().into_iter().next().expect("one model");
    let (membership, recovered) = is_file_namespace_member(&fullname)?;
    assert_eq!(membership, Membership::Yes);
    assert_eq!(recovered.as_deref(), Some("./nested/proj/net"));

    assert!(matches!(
        model.distribution().install_requirement(),
        Err(RegistryError::Unsupported(_))
    ));
    assert!(model.reference().starts_with("file:"));
    assert!(model.reference().ends_with(" net"));
    Ok(())
}

// Unknown names are NotFound, including names dropped by a path change.
#[test]
fn unknown_names_and_path_changes() -> Result<()> {
    let ws = Workspace::new();
    ws.write_modelfile("proj-a", PROJ_A_MODELS);
    let mut registry = ws.registry();
    registry.set_path(vec!["./proj-a".into()]);
    assert!(registry.for_name(&proj_a_fullname("net")).is_ok());
    assert!(matches!(
        registry.for_name("net"),
        Err(RegistryError::NotFound(_))
    ));

    registry.set_path(Vec::new());
    assert!(registry.iterate().is_empty());
    assert!(matches!(
        registry.for_name(&proj_a_fullname("net")),
        Err(RegistryError::NotFound(_))
    ));
    Ok(())
}

// Deleting a definition file keeps the built index until the path is reset.
#[test]
fn definitions_removed_after_indexing_keep_their_snapshot() -> Result<()> {
    let ws = Workspace::new();
    let path = ws.write_modelfile("proj-a", PROJ_A_MODELS);
    let mut registry = ws.registry();
    registry.set_path(vec!["./proj-a".into()]);
    registry.iterate();

    fs::remove_file(&path)?;
    // The index still reflects the path it was built for.
    let model = registry.for_name(&proj_a_fullname("net"))?;
    assert!(model.reference().contains(" - net"));

    registry.set_path(registry.path().to_vec());
    assert!(registry.iterate().is_empty());
    Ok(())
}

// The free functions share one registry across calls.
#[test]
fn process_wide_registry() -> Result<()> {
    let ws = Workspace::new();
    ws.write_modelfile("proj-a", PROJ_A_MODELS);
    let root = ws.path().join("proj-a").display().to_string();

    registry::set_path(Vec::new());
    assert!(registry::iter_models().is_empty());

    registry::add_model_path(root.clone());
    assert_eq!(registry::get_path(), vec![root]);
    let models = registry::iter_models();
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].name(), "net");

    let resolved = registry::for_name(models[0].fullname())?;
    assert!(Arc::ptr_eq(&resolved, &models[0]));
    assert!(registry::warnings().is_empty());
    Ok(())
}

// A package whose name only looks file-backed keeps its name and stays resolvable.
#[test]
fn undecodable_file_prefix_from_package_passes_through() -> Result<()> {
    let ws = Workspace::new();
    ws.write_package(
        "site",
        "odd",
        "1.0",
        &[
            ("odd-1.0.dist-info/METADATA", "Metadata-Version: 2.1\nName: .modelfile.not-hex\n"),
            ("odd/MODELS", r#"{"name": "cnn"}"#),
        ],
    );

    let mut registry = ws.registry();
    registry.set_path(vec!["site".into()]);
    let listed = registry.iterate();
    assert_eq!(fullnames(&listed), vec![".modelfile.not-hex/cnn"]);

    let model = registry.for_name(".modelfile.not-hex/cnn")?;
    assert_eq!(model.reference(), "dist:.modelfile.not-hex 1.0 cnn");
    assert_eq!(model.namespace(), None);
    assert!(matches!(
        is_file_namespace_member(model.fullname()),
        Err(RegistryError::Decode { .. })
    ));
    assert!(registry.warnings().is_empty());
    Ok(())
}

// Package models belong to the pypi namespace and pin their version on install.
#[test]
fn package_models_resolve_through_pypi_namespace() -> Result<()> {
    let ws = Workspace::new();
    ws.write_package("site", "mnist", "1.0", &[("mnist/MODELS", r#"{"name": "cnn"}"#)]);
    let mut registry = ws.registry();
    registry.set_path(vec!["site".into()]);

    let model = registry.for_name("mnist/cnn")?;
    assert_eq!(model.namespace(), Some(Namespace::Pypi));
    assert_eq!(model.distribution().install_requirement()?, "mnist==1.0");
    Ok(())
}
