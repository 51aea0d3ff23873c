#[macro_use]
extern crate lazy_static;

use std::sync::{Arc, Mutex, MutexGuard};

use kindling::device;
use kindling::prelude::*;

lazy_static! {
    // The shared device is process-wide, so tests that create and destroy
    // renderers take turns.
    static ref EXCLUSIVE: Mutex<()> = Mutex::new(());
}

fn exclusive() -> MutexGuard<'static, ()> {
    let _ = env_logger::try_init();
    EXCLUSIVE.lock().unwrap_or_else(|err| err.into_inner())
}

#[test]
fn renderers_share_one_device() {
    let _guard = exclusive();

    let a = Renderer::new();
    let b = Renderer::new();
    assert!(Arc::ptr_eq(a.device(), b.device()));
    assert!(device::is_alive());

    drop(a);
    assert!(device::is_alive());
    let c = Renderer::new();
    assert!(Arc::ptr_eq(b.device(), c.device()));
}

#[test]
fn device_is_recreated_after_the_last_renderer_dies() {
    let _guard = exclusive();

    let first = Renderer::new();
    drop(first);
    assert!(!device::is_alive());

    let second = Renderer::new();
    assert!(device::is_alive());
    drop(second);
    assert!(!device::is_alive());
}

#[test]
fn instance_matches_the_live_device() {
    let _guard = exclusive();

    let renderer = Renderer::new();
    assert!(Arc::ptr_eq(&device::instance(), renderer.device()));
}

#[test]
#[should_panic(expected = "no renderer is alive")]
fn instance_panics_with_no_renderer_alive() {
    let _guard = exclusive();
    let _ = device::instance();
}

#[test]
fn capabilities_survive_for_the_device_lifetime() {
    let _guard = exclusive();

    let first = Renderer::new();
    first.initialize_headless().unwrap();
    assert_eq!(first.last_error(), "");

    let level = first.feature_level();
    let components = first.max_vertex_uniform_components();
    assert!(first.supports_texture_format(TextureFormat::U8U8U8U8));
    assert!(components >= 16);

    let second = Renderer::new();
    drop(first);

    // Queries between the two destructions still serve the same snapshot.
    assert!(device::is_alive());
    assert_eq!(second.feature_level(), level);
    assert_eq!(second.max_vertex_uniform_components(), components);
    assert!(second.supports_texture_format(TextureFormat::U8U8U8U8));

    drop(second);
    assert!(!device::is_alive());
}

#[test]
fn advance_frame_updates_time_even_when_minimized() {
    let _guard = exclusive();

    let mut renderer = Renderer::new();
    renderer.initialize_headless().unwrap();
    assert_eq!(renderer.time(), 0.0);

    renderer.advance_frame(false, 0.016);
    assert_eq!(renderer.time(), 0.016);

    renderer.advance_frame(true, 1.5);
    assert_eq!(renderer.time(), 1.5);
}

#[test]
fn advance_frame_resets_the_depth_function() {
    let _guard = exclusive();

    let mut renderer = Renderer::new();
    renderer.initialize_headless().unwrap();

    renderer.set_depth_function(DepthFunction::Always);
    assert_eq!(renderer.depth_function(), DepthFunction::Always);

    renderer.advance_frame(false, 0.016);
    assert_eq!(renderer.depth_function(), DepthFunction::Less);
}

#[test]
fn last_error_is_writable_and_readable() {
    let _guard = exclusive();

    let renderer = Renderer::new();
    assert_eq!(renderer.last_error(), "");
    renderer.set_last_error("out of cheese");
    assert_eq!(renderer.last_error(), "out of cheese");
}

#[test]
fn shut_down_is_idempotent() {
    let _guard = exclusive();

    let renderer = Renderer::new();
    renderer.initialize_headless().unwrap();
    renderer.shut_down();
    renderer.shut_down();
}
