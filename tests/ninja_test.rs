//! Integration tests for Ninja file generation through the library API
//!
//! Declares projects in code with the GCC and copy adapters, generates the
//! file into a temporary directory and checks the emitted rules and edges.

mod common;

use common::TestProject;
use shuriken::core::configure::{new_build_context, BuildPaths};
use shuriken::core::context::{current_context, PhaseResults};
use shuriken::core::ninja::NinjaFile;
use shuriken::core::project::{Phase, Project};
use shuriken::error::{GraphError, ShurikenError};
use shuriken::infra::copy::CopyFiles;
use shuriken::infra::gcc::{GccCompile, GccLink};

fn program(sources: &TestProject) -> Project {
    let mut project = Project::new("app")
        .with_version("0.3")
        .with_variant(|_| "linux64".to_string());
    let compile = project
        .add_phase(
            "compile",
            Phase::new(GccCompile::new().standard("c11").define("NDEBUG", None))
                .with_inputs([sources.join("src/a.c"), sources.join("src/b.c")]),
        )
        .unwrap();
    project
        .add_phase(
            "link",
            Phase::new(GccLink::new().library("m"))
                .with_inputs_from(compile)
                .with_output("app"),
        )
        .unwrap();
    project
}

#[test]
fn test_generate_program() {
    let sources = TestProject::new();
    let ctx = new_build_context(&BuildPaths::rooted(sources.path().display().to_string())).unwrap();
    let _guard = ctx.enter();
    ctx.set("ninja.file_columns", 0).unwrap();
    let results = PhaseResults::new();
    ctx.set("build._phase_results", results.clone()).unwrap();

    let project = program(&sources);
    let path = NinjaFile::new(&project).generate().unwrap();

    assert_eq!(
        path.display().to_string(),
        sources.join("build/linux64/build.ninja")
    );
    let text = sources.read_file("build/linux64/build.ninja");
    assert!(text.starts_with("# Ninja file for app 0.3 (linux64)\n"));
    assert!(text.contains("rule compile\n"));
    assert!(text.contains("rule link\n"));
    assert!(text.contains(
        "  command = gcc -MD -MF $out.d -std=c11 -DNDEBUG -c $in -o $out\n"
    ));
    assert!(text.contains("  depfile = $out.d\n  deps = gcc\n"));
    assert!(text.contains("  command = gcc $in -o $out -lm\n"));

    let a = sources.join("build/linux64/obj/src/a.o");
    let b = sources.join("build/linux64/obj/src/b.o");
    let app = sources.join("build/linux64/bin/app");
    assert!(text.contains(&format!("build {a}: compile {}\n", sources.join("src/a.c"))));
    assert!(text.contains(&format!("build {b}: compile {}\n", sources.join("src/b.c"))));
    assert!(text.contains(&format!("build {app}: link {a} {b}\n")));

    assert_eq!(results.outputs("compile"), Some(vec![a, b]));
    assert_eq!(results.outputs("link"), Some(vec![app]));
}

#[test]
fn test_compile_rule_precedes_link_rule() {
    let sources = TestProject::new();
    let ctx = new_build_context(&BuildPaths::rooted(sources.path().display().to_string())).unwrap();
    let _guard = ctx.enter();

    let mut project = Project::new("app").with_variant(|_| "linux64".to_string());
    project
        .add_phase(
            "link",
            Phase::new(GccLink::new())
                .with_inputs_from("compile")
                .with_output("app"),
        )
        .unwrap();
    project
        .add_phase(
            "compile",
            Phase::new(GccCompile::new()).with_inputs([sources.join("main.c")]),
        )
        .unwrap();

    let text = NinjaFile::new(&project).render().unwrap();
    let compile = text.find("rule compile").unwrap();
    let link = text.find("rule link").unwrap();
    assert!(compile < link);
    assert_eq!(text.matches("rule compile").count(), 1);
}

#[test]
fn test_shared_library_on_windows() {
    let sources = TestProject::new();
    let ctx = new_build_context(&BuildPaths::rooted(sources.path().display().to_string())).unwrap();
    let _guard = ctx.enter();
    ctx.set("ninja.file_columns", 0).unwrap();
    ctx.set("projects.default_variant", "win64").unwrap();

    let mut project = Project::new("widgets");
    project
        .add_phase(
            "link",
            Phase::new(GccLink::new().shared())
                .with_inputs(["widgets.o"])
                .with_output("widgets"),
        )
        .unwrap();

    let text = NinjaFile::new(&project).render().unwrap();
    let dll = sources.join("build/win64/bin/widgets.dll");
    assert!(text.contains(&format!("build {dll}: link widgets.o\n")));
    assert!(text.contains("  command = gcc -shared $in -o $out\n"));
}

#[test]
fn test_copy_keeps_extensions() {
    let sources = TestProject::new();
    let ctx = new_build_context(&BuildPaths::rooted(sources.path().display().to_string())).unwrap();
    let _guard = ctx.enter();
    ctx.set("ninja.file_columns", 0).unwrap();
    ctx.set("projects.default_variant", "linux64").unwrap();

    let mut project = Project::new("assets");
    project
        .add_phase(
            "copy",
            Phase::new(CopyFiles::new()).with_inputs([sources.join("res/logo.png")]),
        )
        .unwrap();

    let text = NinjaFile::new(&project).render().unwrap();
    let copied = sources.join("build/linux64/bin/res/logo.png");
    assert!(text.contains(&format!(
        "build {copied}: copy {}\n",
        sources.join("res/logo.png")
    )));
}

#[test]
fn test_cycle_generates_nothing() {
    let sources = TestProject::new();
    let ctx = new_build_context(&BuildPaths::rooted(sources.path().display().to_string())).unwrap();
    let _guard = ctx.enter();

    let mut project = Project::new("loop").with_variant(|_| "linux64".to_string());
    project
        .add_phase("a", Phase::new(CopyFiles::new()).with_inputs_from("b"))
        .unwrap();
    project
        .add_phase("b", Phase::new(CopyFiles::new()).with_inputs_from("a"))
        .unwrap();

    let err = NinjaFile::new(&project).generate().unwrap_err();
    assert!(matches!(err, ShurikenError::Graph(GraphError::Cycle { .. })));
    assert!(!sources.file_exists("build/linux64/build.ninja"));
}

#[test]
fn test_build_context_is_scoped() {
    let sources = TestProject::new();
    let ctx = new_build_context(&BuildPaths::rooted(sources.path().display().to_string())).unwrap();
    {
        let _guard = ctx.enter();
        assert!(current_context().is_ok());
    }
    assert!(current_context().is_err());
}
