use std::time::Instant;

use glow::HasContext;
use sdl2::{event::Event, event::WindowEvent, keyboard::Keycode};

use crate::{abs::App, config::Config, render::QuadPass};

mod abs;
mod config;
mod logging;
mod render;

fn run() -> Result<(), String> {
    let config = match Config::locate(std::env::args().nth(1)) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    logging::init(config.log_level())?;

    let mut app = App::new(&config.window)?;
    let mut pass = QuadPass::new(&app.gl, &config.program)?;

    log::info!("Press R to reload shaders, H to toggle highlight, Escape to quit");

    let start = Instant::now();
    let mut highlight = false;

    'running: loop {
        for event in app.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'running,
                Event::Window {
                    win_event: WindowEvent::Resized(width, height),
                    ..
                } => unsafe {
                    app.gl.viewport(0, 0, width, height);
                },
                Event::KeyDown {
                    keycode: Some(Keycode::R),
                    repeat: false,
                    ..
                } => pass.reload(),
                Event::KeyDown {
                    keycode: Some(Keycode::H),
                    repeat: false,
                    ..
                } => highlight = !highlight,
                _ => {}
            }
        }

        unsafe {
            app.gl.clear_color(0.1, 0.1, 0.2, 1.0);
            app.gl.clear(glow::COLOR_BUFFER_BIT);
        }

        pass.draw(app.size(), start.elapsed().as_secs_f32(), highlight);
        app.window.gl_swap_window();
    }

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        log::error!("{e}");
        eprintln!("{e}");
        std::process::exit(1);
    }
}
