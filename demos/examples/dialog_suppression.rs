// Copyright 2025 the Tickui Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A dialog that blocks host controls while it is shown.
//!
//! This example shows how:
//! - a component flagged `NEEDS_CONTROL_SUPPRESSION` makes the controller
//!   suppress host controls,
//! - suppression keeps going for a grace window after the dialog hides,
//! - the dialog only sees pointer edges once its start-suppression window
//!   has elapsed.
//!
//! Run:
//! - `cargo run -p tickui_demos --example dialog_suppression`

use std::cell::Cell;
use std::rc::Rc;

use kurbo::{Point, Size, Vec2};
use tickui_controller::{Component, Context, Controller, ControllerConfig, Host};
use tickui_event_state::edge::{InputSnapshot, MouseButtons};
use tickui_tree::{LocalNode, NodeFlags};

/// Replays a fixed input script and records what the controller asked for.
struct ScriptedHost {
    frame: usize,
    script: Vec<InputSnapshot>,
    suppressed: bool,
    cursor: bool,
}

impl ScriptedHost {
    fn new(script: Vec<InputSnapshot>) -> Self {
        Self {
            frame: 0,
            script,
            suppressed: false,
            cursor: false,
        }
    }

    /// Start a new frame, clearing the per-frame imperatives.
    fn begin_frame(&mut self) {
        self.suppressed = false;
        self.cursor = false;
    }
}

impl Host for ScriptedHost {
    fn poll_input(&mut self) -> InputSnapshot {
        let snapshot = self.script.get(self.frame).copied().unwrap_or_default();
        self.frame += 1;
        snapshot
    }

    fn viewport(&self) -> Size {
        Size::new(1920.0, 1080.0)
    }

    fn suppress_controls_this_frame(&mut self) {
        self.suppressed = true;
    }

    fn show_cursor_this_frame(&mut self) {
        self.cursor = true;
    }
}

/// A confirmation dialog that closes itself on the first click.
struct Dialog {
    closed: Rc<Cell<bool>>,
}

impl Component for Dialog {
    fn initialize(&mut self, cx: &mut Context<'_>) {
        println!("  dialog initialized at {:?}", cx.position());
    }

    fn mouse_buttons(&mut self, cx: &mut Context<'_>, buttons: MouseButtons) {
        if buttons.contains(MouseButtons::LEFT) {
            println!("  dialog accepted, hiding");
            cx.hide();
            self.closed.set(true);
        }
    }

    fn render(&mut self, _: &mut Context<'_>) {}
}

/// The dialog's "OK" button, drawn relative to the dialog.
struct Button;

impl Component for Button {
    fn render(&mut self, cx: &mut Context<'_>) {
        if cx.position() != Point::new(1160.0, 660.0) {
            println!("  button drawn at unexpected {:?}", cx.position());
        }
    }
}

fn main() {
    let config = ControllerConfig::default()
        .with_grace_frames(3)
        .with_start_suppression_frames(2);
    let mut controller = Controller::with_config(config);

    let closed = Rc::new(Cell::new(false));
    let dialog = controller.insert(
        LocalNode {
            offset: Vec2::new(660.0, 340.0),
            flags: NodeFlags::VISIBLE
                | NodeFlags::NEEDS_CONTROL_SUPPRESSION
                | NodeFlags::NEEDS_VISIBLE_CURSOR
                | NodeFlags::NEEDS_STARTUP_SUPPRESSION,
        },
        Dialog {
            closed: closed.clone(),
        },
    );
    controller
        .insert_child(
            dialog,
            LocalNode {
                offset: Vec2::new(500.0, 320.0),
                flags: NodeFlags::VISIBLE,
            },
            Button,
        )
        .expect("dialog is alive");
    controller.register(dialog).expect("dialog is parentless");

    // The user clicks on frame 1 (too early, swallowed by start suppression)
    // and again on frame 5.
    let press = InputSnapshot {
        cursor: Point::new(0.5, 0.5),
        accept: 1.0,
        ..InputSnapshot::default()
    };
    let idle = InputSnapshot {
        cursor: Point::new(0.5, 0.5),
        ..InputSnapshot::default()
    };
    let script = vec![idle, press, idle, idle, idle, press, idle];
    let mut host = ScriptedHost::new(script);

    for frame in 0..14 {
        host.begin_frame();
        controller.on_tick(&mut host);
        println!(
            "frame {frame:2}: suppressed={:<5} cursor={:<5} closed={}",
            host.suppressed,
            host.cursor,
            closed.get()
        );
    }

    controller.dispose(dialog);
    println!("dialog disposed, tree now holds {} nodes", controller.tree().len());
}
