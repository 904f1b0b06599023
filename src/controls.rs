//! Maps pointer and keyboard input onto view transitions.
//!
//! | input              | effect                         |
//! |--------------------|--------------------------------|
//! | left click         | recentre on the cursor         |
//! | wheel, `+` / `-`   | zoom in / out                  |
//! | `C`, space         | toggle colour mode             |
//! | `R`                | reset view                     |
//! | `1` .. `5`         | presets                        |
//! | up / down          | iteration cap ± 10             |
//! | left / right       | real part of `c` ± 0.001       |
//! | page up / down     | imaginary part of `c` ± 0.001  |
//! | escape             | quit                           |

use log::warn;
use winit::event::VirtualKeyCode;

use crate::{
    error::ParamError,
    screen::Position,
    view::{Preset, ViewParams},
};

pub const ITERATION_STEP: i64 = 10;
pub const C_STEP: f64 = 0.001;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Input {
    Click(Position),
    /// Wheel delta, negative towards the viewer.
    Wheel(f64),
    Key(VirtualKeyCode),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Redraw,
    Ignored,
    Exit,
}

impl From<Result<(), ParamError>> for Outcome {
    fn from(result: Result<(), ParamError>) -> Self {
        match result {
            Ok(()) => Outcome::Redraw,
            Err(error) => {
                warn!("rejected edit: {}", error);
                Outcome::Ignored
            }
        }
    }
}

pub fn apply(view: &mut ViewParams, input: Input) -> Outcome {
    match input {
        Input::Click(position) => {
            view.recenter(position);
            Outcome::Redraw
        }
        Input::Wheel(delta) => {
            view.zoom(delta);
            Outcome::Redraw
        }
        Input::Key(key) => apply_key(view, key),
    }
}

fn apply_key(view: &mut ViewParams, key: VirtualKeyCode) -> Outcome {
    use VirtualKeyCode::*;

    let c = view.c();
    match key {
        Escape => Outcome::Exit,
        C | Space => {
            view.toggle_colour_mode();
            Outcome::Redraw
        }
        R => {
            view.reset();
            Outcome::Redraw
        }
        Equals | Plus | NumpadAdd => apply(view, Input::Wheel(-1.0)),
        Minus | NumpadSubtract => apply(view, Input::Wheel(1.0)),
        Up => view
            .set_max_iterations(i64::from(view.max_iterations()) + ITERATION_STEP)
            .into(),
        Down => view
            .set_max_iterations((i64::from(view.max_iterations()) - ITERATION_STEP).max(0))
            .into(),
        Left => view.set_real(c.real - C_STEP).into(),
        Right => view.set_real(c.real + C_STEP).into(),
        PageDown => view.set_imaginary(c.imaginary - C_STEP).into(),
        PageUp => view.set_imaginary(c.imaginary + C_STEP).into(),
        _ => match preset_for(key) {
            Some(preset) => {
                view.select_preset(preset);
                Outcome::Redraw
            }
            None => Outcome::Ignored,
        },
    }
}

fn preset_for(key: VirtualKeyCode) -> Option<Preset> {
    use VirtualKeyCode::*;

    let index = match key {
        Key1 | Numpad1 => 0,
        Key2 | Numpad2 => 1,
        Key3 | Numpad3 => 2,
        Key4 | Numpad4 => 3,
        Key5 | Numpad5 => 4,
        _ => return None,
    };
    Preset::ALL.get(index).copied()
}
