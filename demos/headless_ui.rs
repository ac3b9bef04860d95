//! Headless walkthrough: builds a small editor panel, drives it with host
//! events, nudges a transform with the gizmo and submits both to the
//! in-memory renderer.
//!
//! Run with `RUST_LOG=debug cargo run --example headless_ui`.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{anyhow, Result};
use cgmath::Vector3;
use log::info;

use haggis_ui::config::{GizmoConfig, UiConfig};
use haggis_ui::editor::{EditorGizmo, GizmoMode};
use haggis_ui::gfx::renderer::{submit_render_list, RenderBuffer, ShaderId, UiPassSettings};
use haggis_ui::gfx::{HeadlessRenderer, OrbitCamera, RenderList};
use haggis_ui::input::{ClipboardContent, KeyCode, Modifiers, MouseButton, UiEvent};
use haggis_ui::ui::{InputKind, ScrollAxes, UiServices, UiState};

const WIDTH: f32 = 800.0;
const HEIGHT: f32 = 600.0;

fn main() -> Result<()> {
    env_logger::init();

    let config = UiConfig::default();
    let renderer = Rc::new(RefCell::new(HeadlessRenderer::new()));
    let mut services = UiServices::headless(&config);
    services.renderer = renderer.clone();
    let transforms = services.transforms.clone();

    let mut ui = UiState::new(config, services.clone(), WIDTH, HEIGHT)?;

    // Inspector panel with a name field, a visibility toggle and a scene tree.
    let panel = ui.panel_create("inspector", [240.0, 400.0], [0.12, 0.12, 0.14, 1.0])?;
    ui.set_position(panel, 10.0, 10.0)?;

    let title = ui.label_create("title", "Inspector")?;
    ui.add_child(panel, title)?;
    ui.set_position(title, 8.0, 8.0)?;

    let name = ui.textbox_create("name", InputKind::String, [200.0, 24.0])?;
    ui.add_child(panel, name)?;
    ui.set_position(name, 8.0, 32.0)?;

    let visible = ui.checkbox_create("visible", "Visible")?;
    ui.add_child(panel, visible)?;
    ui.set_position(visible, 8.0, 64.0)?;
    ui.set_on_checked_changed(visible, |_, _, checked| info!("visible -> {}", checked));

    let apply = ui.button_create_text("apply", "Apply", [80.0, 24.0])?;
    ui.add_child(panel, apply)?;
    ui.set_position(apply, 8.0, 88.0)?;
    ui.set_on_click(apply, |ui, _, _| {
        let text = ui
            .find_by_name("name")
            .and_then(|name| ui.textbox_text(name))
            .unwrap_or_default()
            .to_string();
        info!("apply pressed, name = {:?}", text);
        false
    });

    let outline = ui.scrollable_create("outline", [220.0, 200.0], ScrollAxes::VERTICAL)?;
    ui.add_child(panel, outline)?;
    ui.set_position(outline, 8.0, 120.0)?;
    let scene = ui.tree_item_create("scene", "Scene", 0)?;
    ui.scrollable_add_child(outline, scene)?;
    for (index, object) in ["Camera", "Light", "Cube"].iter().enumerate() {
        let item = ui.tree_item_create(object, object, index as u64 + 1)?;
        ui.tree_item_add_child(scene, item)?;
        ui.set_on_click(item, |ui, handle, _| {
            info!("selected object {:?}", ui.tree_item_context(handle));
            false
        });
    }
    ui.tree_item_expand(scene)?;

    // Type a name, copy it, and paste it back through the host clipboard.
    let events = [
        UiEvent::ButtonClicked { button: MouseButton::Left, x: 30.0, y: 50.0 },
        UiEvent::KeyPressed { key: KeyCode::C, modifiers: Modifiers::SHIFT },
        UiEvent::KeyPressed { key: KeyCode::U, modifiers: Modifiers::NONE },
        UiEvent::KeyPressed { key: KeyCode::B, modifiers: Modifiers::NONE },
        UiEvent::KeyPressed { key: KeyCode::E, modifiers: Modifiers::NONE },
        UiEvent::KeyPressed { key: KeyCode::A, modifiers: Modifiers::CONTROL },
        UiEvent::KeyPressed { key: KeyCode::C, modifiers: Modifiers::CONTROL },
        UiEvent::KeyPressed { key: KeyCode::End, modifiers: Modifiers::NONE },
        UiEvent::KeyPressed { key: KeyCode::V, modifiers: Modifiers::CONTROL },
        UiEvent::ClipboardPaste(ClipboardContent::text("Cube")),
        UiEvent::ButtonClicked { button: MouseButton::Left, x: 24.0, y: 80.0 },
        UiEvent::MouseMoved { x: 40.0, y: 105.0 },
        UiEvent::ButtonClicked { button: MouseButton::Left, x: 40.0, y: 105.0 },
    ];
    for event in &events {
        let handled = ui.handle_event(event);
        info!("{:?} handled = {}", event, handled);
    }
    info!("name field now reads {:?}", ui.textbox_text(name));

    // Gizmo on a scene object, dragged one step along x.
    let object = transforms.borrow_mut().create(1);
    let camera = OrbitCamera::new(10.0, 0.4, 0.6, Vector3::new(0.0, 0.0, 0.0), WIDTH / HEIGHT);
    let mut gizmo = EditorGizmo::new(GizmoConfig::default(), &services);
    gizmo.load()?;
    gizmo.set_mode(GizmoMode::Move);
    gizmo.select(Some(object));
    gizmo.update(&camera, HEIGHT);

    let origin = to_screen(&camera, Vector3::new(gizmo.world_scale(), 0.0, 0.0));
    let press = camera
        .screen_ray(origin.0, origin.1, WIDTH, HEIGHT)
        .ok_or_else(|| anyhow!("degenerate camera"))?;
    if gizmo.handle_hover(&press) && gizmo.begin_drag(&press, &camera) {
        if let Some(ray) = camera.screen_ray(origin.0 + 40.0, origin.1, WIDTH, HEIGHT) {
            gizmo.drag(&ray);
        }
        gizmo.end_drag();
    }
    info!(
        "object moved to {:?}",
        transforms.borrow().position_get(object)
    );

    // One frame through the render pass.
    ui.update();
    let mut frame = RenderList::new();
    ui.render(&mut frame);
    gizmo.update(&camera, HEIGHT);
    gizmo.render(&mut frame);

    let mut settings = UiPassSettings::new(ShaderId(0), ShaderId(1), WIDTH, HEIGHT);
    settings.view_projection = camera.view_projection();
    let failures = submit_render_list(&mut *renderer.borrow_mut(), &settings, &frame);
    info!(
        "frame: {} renderables, {} draw failures, {} vertex ranges live",
        frame.len(),
        failures,
        renderer.borrow().live_allocations(RenderBuffer::Vertex)
    );

    gizmo.unload();
    ui.shutdown();
    info!(
        "after shutdown: {} vertex ranges live",
        renderer.borrow().live_allocations(RenderBuffer::Vertex)
    );
    Ok(())
}

/// Pixel position of a world point.
fn to_screen(camera: &OrbitCamera, point: Vector3<f32>) -> (f32, f32) {
    let clip = camera.view_projection() * point.extend(1.0);
    let (x, y) = (clip.x / clip.w, clip.y / clip.w);
    ((x + 1.0) * 0.5 * WIDTH, (1.0 - y) * 0.5 * HEIGHT)
}
