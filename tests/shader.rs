#[macro_use]
extern crate lazy_static;

use std::sync::{Mutex, MutexGuard};

use kindling::prelude::*;

lazy_static! {
    static ref EXCLUSIVE: Mutex<()> = Mutex::new(());
}

fn exclusive() -> MutexGuard<'static, ()> {
    let _ = env_logger::try_init();
    EXCLUSIVE.lock().unwrap_or_else(|err| err.into_inner())
}

const VS: &str = "void main() { gl_Position = vec4(0.0); }";
const FS: &str = "void main() { gl_FragColor = vec4(1.0); }";

#[test]
fn compile_and_link() {
    let _guard = exclusive();

    let renderer = Renderer::new();
    renderer.initialize_headless().unwrap();

    let program = renderer.compile_and_link_shader(VS, FS).unwrap();
    assert!(renderer.program_linked(&program));
    renderer.delete_shader(program);
}

#[test]
fn compile_failure_reports_through_last_error() {
    let _guard = exclusive();

    let renderer = Renderer::new();
    renderer.initialize_headless().unwrap();

    assert!(renderer.compile_and_link_shader(VS, "").is_err());
    assert!(renderer.last_error().contains("Fragment"));

    assert!(renderer.compile_and_link_shader("", FS).is_err());
    assert!(renderer.last_error().contains("Vertex"));
}

#[test]
fn recompile_swaps_in_place() {
    let _guard = exclusive();

    let renderer = Renderer::new();
    renderer.initialize_headless().unwrap();

    let program = renderer.compile_and_link_shader(VS, FS).unwrap();
    renderer
        .recompile_shader(VS, "void main() { gl_FragColor = vec4(0.5); }", &program)
        .unwrap();
    assert!(renderer.program_linked(&program));
    renderer.delete_shader(program);
}

#[test]
fn failed_recompile_preserves_the_old_program() {
    let _guard = exclusive();

    let renderer = Renderer::new();
    renderer.initialize_headless().unwrap();

    let program = renderer.compile_and_link_shader(VS, FS).unwrap();
    assert!(renderer.recompile_shader(VS, "", &program).is_err());
    assert!(renderer.last_error().contains("Fragment"));
    assert!(renderer.program_linked(&program));
    renderer.delete_shader(program);
}

#[test]
fn handles_are_not_reused_across_generations() {
    let _guard = exclusive();

    let renderer = Renderer::new();
    renderer.initialize_headless().unwrap();

    let first = renderer.compile_and_link_shader(VS, FS).unwrap();
    let stale = first.handle();
    renderer.delete_shader(first);

    let second = renderer.compile_and_link_shader(VS, FS).unwrap();
    assert_ne!(second.handle(), stale);
    renderer.delete_shader(second);
}

#[test]
fn override_fragment_shader_applies_to_new_programs() {
    let _guard = exclusive();

    let renderer = Renderer::new();
    renderer.initialize_headless().unwrap();

    renderer.set_override_fragment_shader(Some(FS.into()));
    // The override replaces even an empty source, so this builds.
    let program = renderer.compile_and_link_shader(VS, "").unwrap();
    assert!(renderer.program_linked(&program));
    renderer.delete_shader(program);

    renderer.set_override_fragment_shader(None);
    assert!(renderer.compile_and_link_shader(VS, "").is_err());
}
