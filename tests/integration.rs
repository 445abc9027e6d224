//! Integration tests for ctk-core.
//!
//! These tests exercise the public API from outside the crate: widgets in a
//! [`Dom`] mirrored by style nodes, stylesheets cascading over them, and
//! gestures driving style state.

use std::cell::RefCell;
use std::rc::Rc;

use ctk_core::css::length::{Length, Sides};
use ctk_core::dom::{Dom, WidgetData, WidgetId, WidgetTree};
use ctk_core::gesture::{PropagationPhase, SequenceState};
use ctk_core::style::{
    NodeDeclaration, NodeKind, StateFlags, StyleNodeId, StyleTree, PRIORITY_APPLICATION,
    PRIORITY_USER,
};
use ctk_core::testing::Pilot;
use ctk_core::{Dispatcher, Settings};
use pretty_assertions::assert_eq;

const THEME: &str = "
    window { color: black; font-size: 10px; }
    button { padding: 2px 4px; background-color: #dddddd; }
    button.suggested { background-color: blue; }
    button:active { background-color: #333333; }
    #cancel { color: red; }
";

/// A window with two buttons, each widget owning a style node.
///
/// ```text
///        window
///        /    \
///   button    button#cancel
///  .suggested
/// ```
struct Fixture {
    styles: Rc<RefCell<StyleTree>>,
    dom: Dom,
    window: WidgetId,
    ok: WidgetId,
    cancel: WidgetId,
}

fn fixture() -> Fixture {
    let mut styles = StyleTree::new();
    styles.add_provider_from_str(THEME, PRIORITY_APPLICATION).unwrap();

    let window_node = styles.create_node(NodeDeclaration::new("CtkWindow").with_name("window"));
    let ok_node = styles.create_node(
        NodeDeclaration::new("CtkButton")
            .with_name("button")
            .with_class("suggested"),
    );
    let cancel_node = styles.create_node(
        NodeDeclaration::new("CtkButton")
            .with_name("button")
            .with_id("cancel"),
    );
    styles.set_parent(ok_node, Some(window_node));
    styles.set_parent(cancel_node, Some(window_node));

    let mut dom = Dom::new();
    let window = dom.insert(
        WidgetData::new("CtkWindow")
            .with_name("window")
            .with_style_node(window_node),
    );
    let ok = dom.insert_child(
        window,
        WidgetData::new("CtkButton")
            .with_name("ok")
            .with_style_node(ok_node),
    );
    let cancel = dom.insert_child(
        window,
        WidgetData::new("CtkButton")
            .with_name("cancel")
            .with_style_node(cancel_node),
    );

    Fixture {
        styles: Rc::new(RefCell::new(styles)),
        dom,
        window,
        ok,
        cancel,
    }
}

fn background(styles: &Rc<RefCell<StyleTree>>, node: StyleNodeId) -> Option<String> {
    styles
        .borrow_mut()
        .style(node)
        .and_then(|s| s.values().background_color.clone())
}

/// Set or clear `flag` on the style node of the widget `gesture` belongs to.
fn toggle_state(
    styles: &Rc<RefCell<StyleTree>>,
    d: &Dispatcher,
    gesture: ctk_core::GestureId,
    flag: StateFlags,
    on: bool,
) {
    let Some(node) = d
        .gesture(gesture)
        .and_then(|core| d.tree().style_node(core.widget()))
    else {
        return;
    };
    let mut styles = styles.borrow_mut();
    let mut state = styles.state(node);
    state.set(flag, on);
    styles.set_state(node, state);
}

// ---------------------------------------------------------------------------
// Cascade over a widget tree
// ---------------------------------------------------------------------------

#[test]
fn theme_cascades_over_widgets() {
    let f = fixture();
    let tree = &f.dom;
    let ok_node = tree.style_node(f.ok).unwrap();
    let cancel_node = tree.style_node(f.cancel).unwrap();
    let mut styles = f.styles.borrow_mut();

    let ok = styles.style(ok_node).unwrap();
    assert_eq!(ok.values().color.as_deref(), Some("black"));
    assert_eq!(ok.values().background_color.as_deref(), Some("blue"));
    assert_eq!(ok.values().font_size, Some(Length::px(10.0)));
    assert_eq!(
        ok.values().padding,
        Some(Sides::symmetric(Length::px(2.0), Length::px(4.0)))
    );

    let cancel = styles.style(cancel_node).unwrap();
    assert_eq!(cancel.values().color.as_deref(), Some("red"));
    assert_eq!(cancel.values().background_color.as_deref(), Some("#dddddd"));
}

#[test]
fn user_provider_overrides_application() {
    let f = fixture();
    let node = f.dom.style_node(f.cancel).unwrap();
    let mut styles = f.styles.borrow_mut();
    assert_eq!(
        styles.style(node).and_then(|s| s.values().color.clone()),
        Some("red".into())
    );

    let user = styles
        .add_provider_from_str("button { color: green; }", PRIORITY_USER)
        .unwrap();
    assert_eq!(
        styles.style(node).and_then(|s| s.values().color.clone()),
        Some("green".into())
    );

    assert!(styles.remove_provider(user));
    assert_eq!(
        styles.style(node).and_then(|s| s.values().color.clone()),
        Some("red".into())
    );
}

#[test]
fn invalid_stylesheet_is_rejected() {
    let f = fixture();
    let mut styles = f.styles.borrow_mut();
    assert!(styles
        .add_provider_from_str("button:sparkly { color: red; }", PRIORITY_APPLICATION)
        .is_err());
    assert_eq!(styles.cascade().len(), 1);
}

#[test]
fn print_reflects_widget_state() {
    let f = fixture();
    let window_node = f.dom.style_node(f.window).unwrap();
    let cancel_node = f.dom.style_node(f.cancel).unwrap();
    let mut styles = f.styles.borrow_mut();
    styles.set_state(cancel_node, StateFlags::PRELIGHT);
    insta::assert_snapshot!(styles.print(window_node).trim_end(), @r"
    window
      button.suggested
      button#cancel:hover
    ");
}

#[test]
fn transient_node_styles_like_its_widget() {
    let f = fixture();
    let ok_node = f.dom.style_node(f.ok).unwrap();
    let mut styles = f.styles.borrow_mut();
    let arrow = styles.create_transient_node(ok_node);
    assert_eq!(styles.kind(arrow), Some(NodeKind::Transient));
    assert_eq!(styles.widget_path(arrow), styles.widget_path(ok_node));
    assert_eq!(
        styles.style(arrow).and_then(|s| s.values().background_color.clone()),
        Some("blue".into())
    );
    styles.destroy_node(arrow);
    assert!(!styles.contains(arrow));
}

// ---------------------------------------------------------------------------
// Gestures driving style state
// ---------------------------------------------------------------------------

#[test]
fn press_toggles_active_state() {
    let f = fixture();
    let ok_node = f.dom.style_node(f.ok).unwrap();
    let styles = Rc::clone(&f.styles);
    let mut pilot = Pilot::new(f.dom);

    let gesture = pilot.add_gesture(f.ok, "press", PropagationPhase::Bubble, SequenceState::Claimed);
    let s = Rc::clone(&styles);
    pilot
        .dispatcher_mut()
        .connect_pressed(gesture, move |d, g, _, _, _| toggle_state(&s, d, g, StateFlags::ACTIVE, true));
    let s = Rc::clone(&styles);
    pilot
        .dispatcher_mut()
        .connect_released(gesture, move |d, g, _, _, _| toggle_state(&s, d, g, StateFlags::ACTIVE, false));

    assert_eq!(background(&styles, ok_node), Some("blue".into()));

    pilot.mouse_move(f.ok, 5.0, 5.0);
    pilot.mouse_press(f.ok, 1);
    assert_eq!(pilot.take_trace(), "bubble press, press state claimed");
    assert!(styles.borrow().state(ok_node).contains(StateFlags::ACTIVE));
    assert_eq!(background(&styles, ok_node), Some("#333333".into()));

    pilot.mouse_release(1);
    assert!(!styles.borrow().state(ok_node).contains(StateFlags::ACTIVE));
    assert_eq!(background(&styles, ok_node), Some("blue".into()));
}

#[test]
fn destroyed_widget_drops_gestures_and_style() {
    let f = fixture();
    let cancel_node = f.dom.style_node(f.cancel).unwrap();
    let styles = Rc::clone(&f.styles);
    let mut pilot = Pilot::new(f.dom);

    pilot.add_gesture(f.window, "window", PropagationPhase::Capture, SequenceState::None);
    let on_cancel = pilot.add_gesture(f.cancel, "cancel", PropagationPhase::Bubble, SequenceState::None);

    pilot.mouse_move(f.cancel, 1.0, 1.0);
    pilot.mouse_press(f.cancel, 1);
    pilot.mouse_release(1);
    assert_eq!(pilot.take_trace(), "capture window, bubble cancel");

    pilot.dispatcher_mut().tree_mut().remove(f.cancel);
    pilot.dispatcher_mut().prune();
    styles.borrow_mut().destroy_node(cancel_node);
    assert!(pilot.gesture(on_cancel).is_none());
    assert!(!styles.borrow().contains(cancel_node));

    // Events for the dead widget are dropped; the window still works.
    assert!(!pilot.mouse_press(f.cancel, 1));
    assert!(!pilot.mouse_release(1));
    pilot.mouse_move(f.window, 1.0, 1.0);
    pilot.mouse_press(f.window, 1);
    assert_eq!(pilot.take_trace(), "capture window");
}

#[test]
fn double_click_time_comes_from_settings() {
    let f = fixture();
    let dispatcher =
        Dispatcher::new(f.dom).with_settings(Settings::new().with_double_click_time(100));
    let mut pilot = Pilot::with_dispatcher(dispatcher);

    let presses = Rc::new(RefCell::new(Vec::new()));
    let gesture = pilot.add_gesture(f.ok, "ok", PropagationPhase::Bubble, SequenceState::None);
    let log = Rc::clone(&presses);
    pilot
        .dispatcher_mut()
        .connect_pressed(gesture, move |_, _, n_press, _, _| log.borrow_mut().push(n_press));

    pilot.mouse_move(f.ok, 3.0, 3.0);
    pilot.mouse_press(f.ok, 1);
    pilot.mouse_release(1);
    pilot.advance(50);
    pilot.mouse_press(f.ok, 1);
    pilot.mouse_release(1);
    pilot.advance(150);
    pilot.mouse_press(f.ok, 1);
    pilot.mouse_release(1);

    assert_eq!(*presses.borrow(), vec![1, 2, 1]);
}

// ---------------------------------------------------------------------------
// css! macro
// ---------------------------------------------------------------------------

#[cfg(feature = "macros")]
#[test]
fn css_macro_matches_stylesheet() {
    use ctk_core::css;

    let inline = css! {
        color: red;
        background-color: #dddddd;
        padding: 2px 4px;
        opacity: 0.5;
        transition: opacity 200ms;
    };

    let mut styles = StyleTree::new();
    styles
        .add_provider_from_str(
            "label { color: red; background-color: #dddddd; padding: 2px 4px; \
             opacity: 0.5; transition: opacity 200ms; }",
            PRIORITY_APPLICATION,
        )
        .unwrap();
    let node = styles.create_node(NodeDeclaration::new("CtkLabel").with_name("label"));
    let parsed = styles.style(node).unwrap();

    assert_eq!(&inline, parsed.values());
}
