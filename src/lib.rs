//! Interactive Julia set explorer.
//!
//! Every pixel is coloured by how many iterations of `z → z² + c` it takes to
//! leave a disc around the origin. The same escape-time and colouring rules run
//! either on the CPU ([`cpu`]) or in a fragment shader ([`gpu`]); [`backend`]
//! picks one per session. [`view::ViewParams`] holds the state that user input
//! changes, and [`redraw::RedrawCoordinator`] decides when a new frame is due.

pub mod app;
pub mod backend;
pub mod colour;
pub mod complex;
pub mod config;
pub mod controls;
pub mod cpu;
pub mod error;
pub mod escape;
pub mod frame;
pub mod gfx;
pub mod gpu;
pub mod redraw;
pub mod screen;
pub mod uniform;
pub mod view;

pub use complex::Complex;
pub use config::Config;
pub use frame::FrameBuffer;
pub use view::{ColourMode, Preset, ViewParams};
