use clap::Parser;
use orbitfall::constants::*;
use orbitfall::{
    FrameScheduler, LogCue, ManualClock, ManualScheduler, NullCanvas, Renderer, SeededRandom,
    SimulationConfig, SimulationState, SystemClock,
};
use std::{sync::Arc, time::Instant};
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

#[derive(Parser, Debug)]
#[command(version, about = "Planets circling a star, bouncing off the edges and shattering on impact")]
struct Args {
    /// Seed for positions and velocities; random when omitted
    #[arg(long)]
    seed: Option<u64>,
    /// Multiplies star radius, planet radius and gravity
    #[arg(long, default_value_t = DEFAULT_SCALE_FACTOR)]
    scale: f32,
    #[arg(long, default_value_t = WINDOW_WIDTH)]
    width: u32,
    #[arg(long, default_value_t = WINDOW_HEIGHT)]
    height: u32,
    /// Number of planets at start
    #[arg(long, default_value_t = INITIAL_PLANET_COUNT)]
    population: usize,
    /// Run this many frames without a window and print the final statistics
    #[arg(long, value_name = "FRAMES")]
    headless: Option<u64>,
}

impl Args {
    fn simulation_config(&self) -> SimulationConfig {
        let mut config =
            SimulationConfig::scaled(self.width as f32, self.height as f32, self.scale);
        config.initial_population = self.population;
        config
    }
}

// --- Main Function ---
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let config = args.simulation_config();
    log::info!("Starting with {:?}", config);

    match args.headless {
        Some(frames) => run_headless(config, args.seed, frames),
        None => run_windowed(config, args.seed),
    }
}

fn run_headless(
    config: SimulationConfig,
    seed: Option<u64>,
    frames: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let clock = ManualClock::new();
    let mut simulation = SimulationState::new(
        config,
        Box::new(clock.clone()),
        Box::new(SeededRandom::new(seed)),
    )?
    .with_cue(Box::new(LogCue));
    let scheduler = ManualScheduler::new();
    let mut canvas = NullCanvas::default();

    scheduler.request_next_frame();
    let mut frame = 0;
    while frame < frames && scheduler.take_request() {
        simulation.step(&mut canvas, &scheduler);
        clock.advance(HEADLESS_FRAME_INTERVAL);
        frame += 1;
    }

    let stats = simulation.stats();
    println!(
        "frames: {}, planets: {}, peak: {}, absorbed: {}, collisions: {}, fragments: {}",
        stats.frames,
        simulation.population(),
        stats.peak_population,
        stats.absorbed,
        stats.collisions,
        stats.fragments_spawned
    );
    Ok(())
}

fn run_windowed(
    config: SimulationConfig,
    seed: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Orbitfall")
            .with_inner_size(PhysicalSize::new(config.width as u32, config.height as u32))
            .build(&event_loop)?,
    );
    let mut renderer = pollster::block_on(Renderer::new(window.clone()))?;
    let mut simulation = SimulationState::new(
        config,
        Box::new(SystemClock::new()),
        Box::new(SeededRandom::new(seed)),
    )?
    .with_cue(Box::new(LogCue));

    let mut last_fps_update_time = Instant::now();
    let mut frames_since_last_fps_update = 0;
    let mut current_fps = 0.0;

    window.request_redraw();
    event_loop.run(move |event, elwt: &EventLoopWindowTarget<()>| {
        // Frames are driven by redraw requests the simulation makes itself.
        elwt.set_control_flow(ControlFlow::Wait);
        if let Event::WindowEvent { window_id, event } = event {
            if window_id != window.id() {
                return;
            }
            match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(physical_size) => renderer.resize(physical_size),
                WindowEvent::ScaleFactorChanged { .. } => renderer.resize(window.inner_size()),
                WindowEvent::KeyboardInput {
                    event: key_event, ..
                } => {
                    if key_event.state == ElementState::Pressed && !key_event.repeat {
                        match key_event.physical_key {
                            PhysicalKey::Code(KeyCode::Space) => simulation.toggle_pause(),
                            PhysicalKey::Code(KeyCode::KeyR) => simulation.restart(None),
                            PhysicalKey::Code(KeyCode::Escape) => elwt.exit(),
                            _ => {}
                        }
                    }
                }
                WindowEvent::RedrawRequested => {
                    simulation.step(&mut renderer, &*window);
                    match renderer.present() {
                        Ok(()) => {}
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            renderer.reconfigure()
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("WGPU Error: OutOfMemory");
                            elwt.exit();
                        }
                        Err(e) => log::warn!("WGPU Error: {:?}", e),
                    }

                    frames_since_last_fps_update += 1;
                    let now = Instant::now();
                    let elapsed_secs = now.duration_since(last_fps_update_time).as_secs_f64();
                    if elapsed_secs >= FPS_UPDATE_INTERVAL_SECS {
                        current_fps = frames_since_last_fps_update as f64 / elapsed_secs;
                        last_fps_update_time = now;
                        frames_since_last_fps_update = 0;

                        let stats = simulation.stats();
                        let paused_text = if simulation.is_paused() {
                            " [PAUSED]"
                        } else {
                            ""
                        };
                        window.set_title(&format!(
                            "Orbitfall - Planets: {} - Absorbed: {} - Splits: {} - FPS: {:.1}{}",
                            simulation.population(),
                            stats.absorbed,
                            stats.collisions,
                            current_fps,
                            paused_text
                        ));
                    }
                }
                _ => {}
            }
        }
    })?;
    Ok(())
}
