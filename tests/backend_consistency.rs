//! Renders the same view on both backends and compares the images.
//!
//! Skipped when the machine has no usable graphics adapter.

use julia_explorer::{
    cpu::CpuRenderer,
    gfx::Gpu,
    gpu::GpuBackend,
    screen::{Position, Size},
    view::Limits,
    ColourMode, FrameBuffer, Preset, ViewParams,
};

/// Largest per-channel difference treated as rounding.
const CHANNEL_TOLERANCE: u8 = 2;
/// Share of pixels allowed to differ by more, where f32 on the GPU changes the
/// escape iteration of points close to the set's boundary.
const MISMATCH_BUDGET: f64 = 0.05;

fn gpu() -> Option<Gpu> {
    match Gpu::headless() {
        Ok(gpu) => Some(gpu),
        Err(err) => {
            eprintln!("no graphics adapter, skipping: {}", err);
            None
        }
    }
}

fn mismatch_ratio(cpu: &FrameBuffer, gpu: &FrameBuffer) -> f64 {
    assert_eq!(cpu.size(), gpu.size());
    let mismatched = cpu
        .as_bytes()
        .chunks_exact(4)
        .zip(gpu.as_bytes().chunks_exact(4))
        .filter(|(a, b)| {
            a.iter()
                .zip(b.iter())
                .any(|(a, b)| a.abs_diff(*b) > CHANNEL_TOLERANCE)
        })
        .count();
    mismatched as f64 / cpu.size().pixel_count() as f64
}

fn compare(params: &ViewParams) {
    let gpu = match gpu() {
        Some(gpu) => gpu,
        None => return,
    };
    let backend = GpuBackend::offscreen(&gpu, params).unwrap();
    let on_gpu = backend.render_offscreen(&gpu, params).unwrap();
    let on_cpu = CpuRenderer::new(2).unwrap().render(params);

    let ratio = mismatch_ratio(&on_cpu, &on_gpu);
    assert!(ratio <= MISMATCH_BUDGET, "{:.3} of pixels differ", ratio);
}

#[test]
fn colourful_default_view_matches() {
    compare(&ViewParams::new(Size::new(96, 64), Limits::default()));
}

#[test]
fn black_and_white_rabbit_matches() {
    let mut params = ViewParams::new(Size::new(80, 60), Limits::default());
    params.select_preset(Preset::Rabbit);
    params.set_colour_mode(ColourMode::BlackWhite);
    params.recenter(Position::new(30.0, 25.0));
    compare(&params);
}

#[test]
fn every_preset_matches() {
    for preset in Preset::ALL {
        let mut params = ViewParams::new(Size::new(200, 150), Limits::default());
        params.select_preset(preset);
        compare(&params);
    }
}

#[test]
fn zero_cap_matches_exactly() {
    let gpu = match gpu() {
        Some(gpu) => gpu,
        None => return,
    };
    let mut params = ViewParams::new(Size::new(33, 17), Limits::default());
    params.set_max_iterations(0).unwrap();
    let backend = GpuBackend::offscreen(&gpu, &params).unwrap();
    let on_gpu = backend.render_offscreen(&gpu, &params).unwrap();
    assert_eq!(on_gpu, CpuRenderer::new(1).unwrap().render(&params));
}
