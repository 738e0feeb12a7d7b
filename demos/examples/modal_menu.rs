// Copyright 2025 the Tickui Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keys, observers, spawning and a blocking modal menu.
//!
//! This example shows how to combine:
//! - `before_key_down` observers that veto keys before components see them,
//! - components spawning new top-level components from a key handler,
//! - a modal surface that takes over ticks until it hides,
//! - `tick_handled` listeners that watch every frame.
//!
//! Run:
//! - `cargo run -p tickui_demos --example modal_menu`

use std::cell::Cell;
use std::rc::Rc;

use kurbo::Size;
use tickui_chain::{Listener, Observer};
use tickui_controller::{
    Component, Context, Controller, Host, Key, KeyEvent, ModalSurface, TickEvent,
};
use tickui_event_state::edge::InputSnapshot;
use tickui_tree::{LocalNode, NodeFlags};

struct Idle;

impl Host for Idle {
    fn poll_input(&mut self) -> InputSnapshot {
        InputSnapshot::default()
    }

    fn viewport(&self) -> Size {
        Size::new(800.0, 600.0)
    }

    fn suppress_controls_this_frame(&mut self) {}
}

/// A pause menu that stays up for a fixed number of ticks.
struct PauseMenu {
    remaining: u32,
}

impl ModalSurface for PauseMenu {
    fn process(&mut self) {
        println!("  pause menu: {} ticks left", self.remaining);
        self.remaining = self.remaining.saturating_sub(1);
    }

    fn is_visible(&self) -> bool {
        self.remaining > 0
    }
}

/// A toast notification that removes itself after a few renders.
struct Toast {
    text: &'static str,
    frames: u32,
}

impl Component for Toast {
    fn initialize(&mut self, _: &mut Context<'_>) {
        println!("  toast up: {}", self.text);
    }

    fn dispose(&mut self, _: &mut Context<'_>) {
        println!("  toast gone: {}", self.text);
    }

    fn render(&mut self, cx: &mut Context<'_>) {
        self.frames = self.frames.saturating_sub(1);
        if self.frames == 0 {
            let me = cx.id();
            cx.dispose(me);
        }
    }
}

/// The main HUD: `t` spawns a toast, `p` opens the pause menu.
struct Hud;

impl Component for Hud {
    fn key_down(&mut self, cx: &mut Context<'_>, event: &KeyEvent) {
        match event.key {
            Key::Character('t') => cx.spawn(
                LocalNode {
                    flags: NodeFlags::VISIBLE,
                    ..LocalNode::default()
                },
                Toast {
                    text: "saved",
                    frames: 2,
                },
            ),
            Key::Character('p') => {
                cx.show_modal(PauseMenu { remaining: 3 });
            }
            _ => {}
        }
    }

    fn render(&mut self, _: &mut Context<'_>) {}
}

fn main() {
    let mut controller = Controller::new();

    // Swallow `x` before any component sees it.
    let veto: Observer<Controller, KeyEvent> = Rc::new(|_: &Controller, event: &mut KeyEvent| {
        if event.key == Key::Character('x') {
            println!("  observer vetoed {:?}", event.key);
            event.handled = true;
        }
    });
    controller.before_key_down().subscribe(veto);

    let frames = Rc::new(Cell::new(0_u32));
    let counter: Listener<Controller, TickEvent> = {
        let frames = frames.clone();
        Rc::new(move |_: &Controller, _: &TickEvent| frames.set(frames.get() + 1))
    };
    controller.tick_handled().subscribe(counter);

    let hud = controller.insert(
        LocalNode {
            flags: NodeFlags::VISIBLE,
            ..LocalNode::default()
        },
        Hud,
    );
    controller.register(hud).expect("hud is parentless");

    let mut host = Idle;
    let keys = [None, Some('t'), None, Some('x'), Some('p'), None, None, None, None, None];
    for (frame, key) in keys.into_iter().enumerate() {
        if let Some(c) = key {
            println!("frame {frame}: key {c:?}");
            controller.on_key_down(&mut KeyEvent::new(Key::Character(c)));
        }
        controller.on_tick(&mut host);
        println!(
            "frame {frame}: {} top-level components, modal={}",
            controller.components().len(),
            controller.is_modal_active()
        );
    }

    println!("{} ticks handled", frames.get());
}
