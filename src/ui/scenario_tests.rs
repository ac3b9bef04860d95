//! End-to-end event scenarios driven through `handle_event`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::UiConfig;
use crate::input::{ClipboardContent, KeyCode, MemoryClipboard, Modifiers, MouseButton, UiEvent};

use super::callbacks::MouseEventKind;
use super::control::Rect;
use super::controls::CheckboxState;
use super::handle::ControlHandle;
use super::state::{UiServices, UiState};
use super::text_edit::InputKind;

type Log = Rc<RefCell<Vec<String>>>;

fn ui_with_clipboard() -> (UiState, Rc<RefCell<MemoryClipboard>>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = UiConfig {
        super_acts_as_control: false,
        ..UiConfig::default()
    };
    let mut services = UiServices::headless(&config);
    let clipboard = Rc::new(RefCell::new(MemoryClipboard::new()));
    services.clipboard = clipboard.clone();
    (UiState::new(config, services, 800.0, 600.0).unwrap(), clipboard)
}

fn ui() -> UiState {
    ui_with_clipboard().0
}

fn click(x: f32, y: f32) -> UiEvent {
    UiEvent::ButtonClicked {
        button: MouseButton::Left,
        x,
        y,
    }
}

fn press(key: KeyCode, modifiers: Modifiers) -> UiEvent {
    UiEvent::KeyPressed { key, modifiers }
}

fn release(key: KeyCode) -> UiEvent {
    UiEvent::KeyReleased {
        key,
        modifiers: Modifiers::NONE,
    }
}

fn record(ui: &mut UiState, handle: ControlHandle, name: &str, kinds: &[MouseEventKind], log: &Log) {
    for &kind in kinds {
        let log = log.clone();
        let name = name.to_string();
        ui.set_mouse_callback(
            handle,
            kind,
            Box::new(move |_, _, _| {
                log.borrow_mut().push(format!("{:?}({})", kind, name).to_lowercase());
                true
            }),
        );
    }
}

#[test]
fn test_click_to_focus_and_type() {
    let mut ui = ui();
    let t = ui.textbox_create("t", InputKind::String, [10.0, 10.0]).unwrap();
    ui.set_bounds(t, Rect::new(0.0, 0.0, 200.0, 40.0)).unwrap();

    ui.handle_event(&click(50.0, 20.0));
    ui.handle_event(&press(KeyCode::H, Modifiers::SHIFT));
    ui.handle_event(&press(KeyCode::I, Modifiers::SHIFT));
    ui.handle_event(&release(KeyCode::I));
    ui.handle_event(&release(KeyCode::H));

    assert_eq!(ui.textbox_text(t), Some("HI"));
    assert_eq!(ui.textbox_cursor(t), Some(2));
    assert_eq!(ui.focused(), Some(t));

    // Select all and delete.
    ui.handle_event(&press(KeyCode::A, Modifiers::CONTROL));
    ui.handle_event(&press(KeyCode::Delete, Modifiers::NONE));
    assert_eq!(ui.textbox_text(t), Some(""));
    assert_eq!(ui.textbox_cursor(t), Some(0));
    assert!(ui.textbox_highlight(t).unwrap().is_empty());
}

#[test]
fn test_paste_rejection_on_int_textbox() {
    let (mut ui, clipboard) = ui_with_clipboard();
    let n = ui.textbox_create("n", InputKind::Int, [100.0, 24.0]).unwrap();
    ui.set_focus(Some(n));

    ui.handle_event(&press(KeyCode::V, Modifiers::CONTROL));
    assert!(clipboard.borrow().has_pending_request());
    clipboard.borrow_mut().set_contents("12abc");
    let content = clipboard.borrow_mut().take_request().unwrap();
    assert!(!ui.handle_event(&UiEvent::ClipboardPaste(content)));
    assert_eq!(ui.textbox_text(n), Some(""));
    assert_eq!(ui.textbox_cursor(n), Some(0));

    ui.handle_event(&press(KeyCode::V, Modifiers::CONTROL));
    assert!(ui.handle_event(&UiEvent::ClipboardPaste(ClipboardContent::text("42"))));
    assert_eq!(ui.textbox_text(n), Some("42"));
    assert_eq!(ui.textbox_cursor(n), Some(2));

    // A delivery nobody asked for is ignored.
    assert!(!ui.handle_event(&UiEvent::ClipboardPaste(ClipboardContent::text("7"))));
    assert_eq!(ui.textbox_text(n), Some("42"));
}

#[test]
fn test_checkbox_toggle() {
    let mut ui = ui();
    let c = ui.checkbox_create("c", "enable").unwrap();
    assert_eq!(ui.checkbox_state(c), Some(CheckboxState::EnabledUnchecked));
    let changes = Rc::new(RefCell::new(Vec::new()));
    let sink = changes.clone();
    ui.set_on_checked_changed(c, move |_, _, checked| sink.borrow_mut().push(checked));

    ui.handle_event(&click(5.0, 5.0));
    assert_eq!(ui.checkbox_state(c), Some(CheckboxState::EnabledChecked));
    ui.handle_event(&click(5.0, 5.0));
    assert_eq!(ui.checkbox_state(c), Some(CheckboxState::EnabledUnchecked));
    assert_eq!(*changes.borrow(), vec![true, false]);
}

#[test]
fn test_checkbox_state_follows_activity() {
    let mut ui = ui();
    let group = ui.panel_create("group", [300.0, 300.0], [0.0; 4]).unwrap();
    let c = ui.checkbox_create("c", "enable").unwrap();
    ui.add_child(group, c).unwrap();
    ui.checkbox_set_checked(c, true).unwrap();

    ui.set_active(group, false).unwrap();
    assert_eq!(ui.checkbox_state(c), Some(CheckboxState::DisabledChecked));
    let image = ui.checkbox_image(c).unwrap();
    let disabled_region = ui.config().atlas.checkbox[CheckboxState::DisabledChecked.index()];
    assert_eq!(ui.image_box_region(image), Some(disabled_region));

    // Recomputing is idempotent.
    ui.set_active(group, false).unwrap();
    ui.checkbox_set_checked(c, true).unwrap();
    assert_eq!(ui.checkbox_state(c), Some(CheckboxState::DisabledChecked));

    // Inactive checkboxes ignore clicks.
    ui.handle_event(&click(5.0, 5.0));
    assert_eq!(ui.checkbox_is_checked(c), Some(true));

    ui.set_active(group, true).unwrap();
    assert_eq!(ui.checkbox_state(c), Some(CheckboxState::EnabledChecked));
}

#[test]
fn test_hover_transitions() {
    let mut ui = ui();
    let a = ui.panel_create("a", [100.0, 100.0], [1.0; 4]).unwrap();
    let b = ui.panel_create("b", [100.0, 100.0], [1.0; 4]).unwrap();
    ui.set_position(b, 50.0, 0.0).unwrap();
    assert_eq!((ui.depth(a), ui.depth(b)), (Some(1), Some(1)));

    let log: Log = Rc::default();
    let kinds = [MouseEventKind::Over, MouseEventKind::Out, MouseEventKind::Move];
    record(&mut ui, a, "a", &kinds, &log);
    record(&mut ui, b, "b", &kinds, &log);

    ui.handle_event(&UiEvent::MouseMoved { x: 25.0, y: 50.0 });
    assert_eq!(*log.borrow(), ["over(a)", "move(a)"]);
    log.borrow_mut().clear();

    // Equal depth: the later control is on top and hears first.
    ui.handle_event(&UiEvent::MouseMoved { x: 75.0, y: 50.0 });
    assert_eq!(*log.borrow(), ["over(b)", "move(b)", "move(a)"]);
    log.borrow_mut().clear();

    ui.handle_event(&UiEvent::MouseMoved { x: 125.0, y: 50.0 });
    assert_eq!(*log.borrow(), ["move(b)", "out(a)"]);
    assert!(!ui.is_hovered(a));
    assert!(ui.is_hovered(b));
}

#[test]
fn test_deactivating_hovered_control_fires_mouse_out() {
    let mut ui = ui();
    let a = ui.panel_create("a", [100.0, 100.0], [1.0; 4]).unwrap();
    let log: Log = Rc::default();
    record(&mut ui, a, "a", &[MouseEventKind::Over, MouseEventKind::Out], &log);

    ui.handle_event(&UiEvent::MouseMoved { x: 25.0, y: 50.0 });
    assert_eq!(*log.borrow(), ["over(a)"]);

    ui.set_active(a, false).unwrap();
    assert_eq!(*log.borrow(), ["over(a)", "out(a)"]);
    assert!(!ui.is_hovered(a));

    ui.set_active(a, true).unwrap();
    ui.handle_event(&UiEvent::MouseMoved { x: 30.0, y: 50.0 });
    assert_eq!(*log.borrow(), ["over(a)", "out(a)", "over(a)"]);
    assert!(ui.is_hovered(a));

    // Deactivating a control that is not hovered stays silent.
    ui.handle_event(&UiEvent::MouseMoved { x: 300.0, y: 300.0 });
    ui.set_active(a, false).unwrap();
    let log = log.borrow();
    let overs = log.iter().filter(|e| e.starts_with("over")).count();
    let outs = log.iter().filter(|e| e.starts_with("out")).count();
    assert_eq!((overs, outs), (2, 2));
}

#[test]
fn test_blocking_stops_deeper_delivery_but_not_mouse_out() {
    let mut ui = ui();
    let back = ui.panel_create("back", [100.0, 100.0], [1.0; 4]).unwrap();
    let front = ui.panel_create("front", [100.0, 100.0], [1.0; 4]).unwrap();
    ui.add_child(back, front).unwrap();
    let log: Log = Rc::default();
    record(&mut ui, back, "back", &[MouseEventKind::Click, MouseEventKind::Out], &log);
    let sink = log.clone();
    ui.set_on_click(front, move |_, _, _| {
        sink.borrow_mut().push("click(front)".into());
        false
    });
    let out_sink = log.clone();
    ui.set_mouse_callback(
        front,
        MouseEventKind::Out,
        Box::new(move |_, _, _| {
            out_sink.borrow_mut().push("out(front)".into());
            false
        }),
    );

    assert!(ui.handle_event(&click(10.0, 10.0)));
    assert_eq!(*log.borrow(), ["click(front)"]);

    ui.handle_event(&UiEvent::MouseMoved { x: 10.0, y: 10.0 });
    log.borrow_mut().clear();
    ui.handle_event(&UiEvent::MouseMoved { x: 500.0, y: 10.0 });
    assert_eq!(*log.borrow(), ["out(front)", "out(back)"]);
}

#[test]
fn test_click_on_nothing_clears_focus() {
    let mut ui = ui();
    let t = ui.textbox_create("t", InputKind::String, [100.0, 24.0]).unwrap();
    let unfocused = Rc::new(RefCell::new(0));
    let counter = unfocused.clone();
    ui.set_on_unfocus(t, move |_, _| *counter.borrow_mut() += 1);
    ui.set_focus(Some(t));
    ui.handle_event(&click(700.0, 500.0));
    assert_eq!(ui.focused(), None);
    assert_eq!(*unfocused.borrow(), 1);
}

#[test]
fn test_focus_requires_focusable_visible_and_active() {
    let mut ui = ui();
    let panel = ui.panel_create("p", [100.0, 100.0], [1.0; 4]).unwrap();
    let t = ui.textbox_create("t", InputKind::String, [100.0, 24.0]).unwrap();
    ui.add_child(panel, t).unwrap();

    ui.set_focus(Some(panel));
    assert_eq!(ui.focused(), None);

    ui.set_focus(Some(t));
    assert_eq!(ui.focused(), Some(t));
    ui.set_visible(panel, false).unwrap();
    assert_eq!(ui.focused(), None);

    ui.set_visible(panel, true).unwrap();
    ui.set_focus(Some(t));
    ui.set_active(panel, false).unwrap();
    assert_eq!(ui.focused(), None);
    ui.set_focus(Some(t));
    assert_eq!(ui.focused(), None);

    // Clicking an unfocusable control takes focus away.
    ui.set_active(panel, true).unwrap();
    let other = ui.panel_create("other", [50.0, 50.0], [1.0; 4]).unwrap();
    ui.set_position(other, 300.0, 300.0).unwrap();
    ui.set_focus(Some(t));
    ui.handle_event(&click(310.0, 310.0));
    assert_eq!(ui.focused(), None);
}

#[test]
fn test_keys_reach_user_callback_of_focused_control() {
    let mut ui = ui();
    let t = ui.textbox_create("t", InputKind::String, [100.0, 24.0]).unwrap();
    let keys = Rc::new(RefCell::new(Vec::new()));
    let sink = keys.clone();
    ui.set_on_key(t, move |_, _, event| {
        sink.borrow_mut().push((event.key, event.pressed));
        true
    });
    assert!(!ui.handle_event(&press(KeyCode::Q, Modifiers::NONE)));
    ui.set_focus(Some(t));
    assert!(ui.handle_event(&press(KeyCode::Q, Modifiers::NONE)));
    assert!(ui.handle_event(&release(KeyCode::Q)));
    assert_eq!(*keys.borrow(), vec![(KeyCode::Q, true), (KeyCode::Q, false)]);
    assert_eq!(ui.textbox_text(t), Some("q"));
}

#[test]
fn test_callback_destroying_controls_mid_dispatch() {
    let mut ui = ui();
    let back = ui.panel_create("back", [100.0, 100.0], [1.0; 4]).unwrap();
    let front = ui.panel_create("front", [100.0, 100.0], [1.0; 4]).unwrap();
    let log: Log = Rc::default();
    record(&mut ui, back, "back", &[MouseEventKind::Click], &log);
    // The front panel destroys itself and the panel behind it.
    ui.set_on_click(front, move |ui, handle, _| {
        ui.destroy(handle).unwrap();
        ui.destroy(back).unwrap();
        true
    });
    ui.handle_event(&click(10.0, 10.0));
    assert!(!ui.is_valid(front));
    assert!(!ui.is_valid(back));
    assert!(log.borrow().is_empty());
    ui.validate_tree().unwrap();
}

#[test]
fn test_destroying_focused_control_in_callback_clears_focus() {
    let mut ui = ui();
    let t = ui.textbox_create("t", InputKind::String, [100.0, 24.0]).unwrap();
    ui.set_on_key(t, |ui, handle, _| {
        ui.destroy(handle).unwrap();
        false
    });
    ui.set_focus(Some(t));
    ui.handle_event(&press(KeyCode::Escape, Modifiers::NONE));
    assert!(!ui.is_valid(t));
    assert_eq!(ui.focused(), None);
    assert_eq!(ui.control_count(), 1);
}

#[test]
fn test_drag_keeps_notifying_after_leaving() {
    let mut ui = ui();
    let p = ui.panel_create("p", [50.0, 50.0], [1.0; 4]).unwrap();
    let log: Log = Rc::default();
    record(
        &mut ui,
        p,
        "p",
        &[MouseEventKind::DragBegin, MouseEventKind::Drag, MouseEventKind::DragEnd],
        &log,
    );
    let drag = |x: f32| UiEvent::MouseDragged {
        button: MouseButton::Left,
        x,
        y: 10.0,
    };
    ui.handle_event(&UiEvent::MouseDragBegin {
        button: MouseButton::Left,
        x: 10.0,
        y: 10.0,
    });
    assert!(ui.is_dragging(p));
    ui.handle_event(&drag(30.0));
    ui.handle_event(&drag(300.0));
    ui.handle_event(&UiEvent::MouseDragEnd {
        button: MouseButton::Left,
        x: 300.0,
        y: 10.0,
    });
    assert!(!ui.is_dragging(p));
    assert_eq!(*log.borrow(), ["dragbegin(p)", "drag(p)", "drag(p)", "dragend(p)"]);

    // No drag in progress: nothing hears drag events.
    ui.handle_event(&drag(20.0));
    assert_eq!(log.borrow().len(), 4);
}

#[test]
fn test_names_and_tags() {
    let mut ui = ui();
    let a = ui.panel_create("a", [1.0, 1.0], [1.0; 4]).unwrap();
    let b = ui.panel_create("b", [1.0, 1.0], [1.0; 4]).unwrap();
    ui.add_tag(a, "Tool").unwrap();
    ui.add_tag(b, "Tool").unwrap();
    ui.add_tag(b, "tool").unwrap();
    assert_eq!(ui.find_by_tag("Tool"), vec![a, b]);
    assert_eq!(ui.find_by_tag("tool"), vec![b]);
    ui.set_name(a, "renamed").unwrap();
    assert_eq!(ui.find_by_name("a"), None);
    assert_eq!(ui.find_by_name("renamed"), Some(a));
}

#[test]
fn test_window_resize_updates_root() {
    let mut ui = ui();
    ui.handle_event(&UiEvent::WindowResized {
        width: 1024,
        height: 768,
    });
    assert_eq!(ui.viewport(), (1024.0, 768.0));
    assert_eq!(ui.bounds(ui.root()), Some(Rect::sized(1024.0, 768.0)));
}
