#[macro_use]
extern crate lazy_static;

use std::sync::{Mutex, MutexGuard};

use kindling::math::prelude::*;
use kindling::prelude::*;

lazy_static! {
    static ref EXCLUSIVE: Mutex<()> = Mutex::new(());
}

fn exclusive() -> MutexGuard<'static, ()> {
    let _ = env_logger::try_init();
    EXCLUSIVE.lock().unwrap_or_else(|err| err.into_inner())
}

fn headless() -> Renderer {
    let renderer = Renderer::new();
    renderer.initialize_headless().unwrap();
    renderer
}

#[test]
fn render_state_defaults() {
    let _guard = exclusive();
    let renderer = Renderer::new();

    let state = renderer.render_state();
    assert_eq!(state.blend, BlendMode::Off);
    assert_eq!(state.blend_amount, 0.5);
    assert_eq!(state.cull, CullMode::Nothing);
    assert_eq!(state.depth_function, DepthFunction::Less);
    assert_eq!(state.scissor, None);
}

#[test]
fn render_state_setters() {
    let _guard = exclusive();
    let mut renderer = headless();

    renderer.set_blend_mode(BlendMode::Alpha);
    assert_eq!(renderer.blend_mode(), BlendMode::Alpha);
    assert_eq!(renderer.render_state().blend_amount, 0.5);

    renderer.set_blend_mode_with_amount(BlendMode::Test, 0.25);
    assert_eq!(renderer.blend_mode(), BlendMode::Test);
    assert_eq!(renderer.render_state().blend_amount, 0.25);

    renderer.set_culling(CullMode::Back);
    assert_eq!(renderer.render_state().cull, CullMode::Back);

    renderer.set_depth_function(DepthFunction::Always);
    assert_eq!(renderer.depth_function(), DepthFunction::Always);
}

#[test]
fn scissor_toggles() {
    let _guard = exclusive();
    let mut renderer = headless();

    renderer.scissor_on(Vector2::new(8, 8), Vector2::new(64, 32));
    let rect = renderer.render_state().scissor.unwrap();
    assert_eq!(rect.position, Vector2::new(8, 8));
    assert_eq!(rect.size, Vector2::new(64, 32));

    renderer.scissor_off();
    assert_eq!(renderer.render_state().scissor, None);
}

#[test]
fn texture_bindings_are_tracked_per_unit() {
    let _guard = exclusive();
    let mut renderer = headless();

    assert_eq!(renderer.texture(0), None);
    renderer.set_texture(0, TextureHandle(42));
    renderer.set_texture(3, TextureHandle(7));
    assert_eq!(renderer.texture(0), Some(TextureHandle(42)));
    assert_eq!(renderer.texture(3), Some(TextureHandle(7)));
    assert_eq!(renderer.texture(1), None);
}

#[test]
#[should_panic]
fn texture_unit_out_of_range() {
    let _guard = exclusive();
    let mut renderer = headless();
    renderer.set_texture(64, TextureHandle(1));
}

#[test]
fn uniform_values_round_trip() {
    let _guard = exclusive();
    let mut renderer = Renderer::new();

    assert_eq!(renderer.model_view_projection(), Matrix4::identity());
    assert_eq!(renderer.color(), Color::white());
    assert_eq!(renderer.num_bones(), 0);

    let mvp = Matrix4::from_scale(2.0);
    renderer.set_model_view_projection(mvp);
    assert_eq!(renderer.model_view_projection(), mvp);

    renderer.set_model(Matrix4::from_scale(0.5));
    renderer.set_color(Color::new(1.0, 0.0, 0.0, 1.0));
    renderer.set_light_pos(Vector3::new(0.0, 10.0, 0.0));
    renderer.set_camera_pos(Vector3::new(1.0, 2.0, 3.0));
    assert_eq!(renderer.light_pos(), Vector3::new(0.0, 10.0, 0.0));
    assert_eq!(renderer.camera_pos(), Vector3::new(1.0, 2.0, 3.0));

    let bones = [Matrix4::identity(); 4];
    renderer.set_bone_transforms(&bones);
    assert_eq!(renderer.num_bones(), 4);
    assert_eq!(renderer.bone_transforms().len(), 4);

    renderer.set_bone_transforms(&[]);
    assert_eq!(renderer.num_bones(), 0);
}

#[test]
fn frame_bracket_and_shader_bind() {
    let _guard = exclusive();
    let mut renderer = headless();

    let program = renderer
        .compile_and_link_shader(
            "void main() { gl_Position = vec4(0.0); }",
            "void main() { gl_FragColor = vec4(1.0); }",
        )
        .unwrap();

    renderer.begin_rendering();
    renderer.clear_frame_buffer(Color::black());
    renderer.bind_shader(&program);
    renderer.clear_depth_buffer();
    renderer.end_rendering();
    renderer.advance_frame(false, 0.016);

    renderer.delete_shader(program);
}

#[test]
#[should_panic]
fn nested_begin_rendering_is_rejected() {
    let _guard = exclusive();
    let mut renderer = headless();
    renderer.begin_rendering();
    renderer.begin_rendering();
}

#[test]
#[should_panic]
fn advance_frame_inside_a_frame_is_rejected() {
    let _guard = exclusive();
    let mut renderer = headless();
    renderer.begin_rendering();
    renderer.advance_frame(false, 0.016);
}

#[test]
fn force_blend_mode_overrides_setters() {
    let _guard = exclusive();
    let mut renderer = headless();

    renderer.set_force_blend_mode(Some(BlendMode::Add));
    assert_eq!(renderer.force_blend_mode(), Some(BlendMode::Add));

    // The handle still records what the caller asked for; the override is
    // applied at the device boundary.
    renderer.set_blend_mode(BlendMode::Alpha);
    assert_eq!(renderer.blend_mode(), BlendMode::Alpha);

    renderer.set_force_blend_mode(None);
    assert_eq!(renderer.force_blend_mode(), None);
}
