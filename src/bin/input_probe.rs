//! Input probe - diagnostics and a live event log for input profiles

use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use layered_input::InputConfig;
use layered_input::health::{HealthCheckRunner, checks::*, print_report};
use layered_input::input::{
    BlockBehavior, Button, EventFilter, EventKind, InputCollector, InputContext, InputEvent,
    Phase,
};

/// Layered input probe
#[derive(Parser)]
#[command(name = "input-probe")]
#[command(about = "Diagnose input profiles and watch synthesized events")]
#[command(version)]
struct Args {
    /// Configuration profile (defaults to INPUT_PROFILE, then "default")
    #[arg(short, long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run health checks against the profile and exit with their status
    Check {
        /// Also list details of passing checks
        #[arg(short, long)]
        verbose: bool,
    },
    /// Open a window and log every event the engine synthesizes
    Watch {
        /// Include held events
        #[arg(long)]
        held: bool,

        /// Report the cursor tile using tiles of this many logical pixels
        #[arg(long)]
        tile_size: Option<f32>,
    },
}

fn setup_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let loaded = match &args.profile {
        Some(profile) => InputConfig::load(profile),
        None => InputConfig::load_from_env(),
    };
    let config = match loaded {
        Ok(config) => {
            setup_logging(&config.logging.filter);
            config
        }
        Err(e) => {
            setup_logging("info");
            warn!(error = %e, "Failed to load config, using default configuration");
            InputConfig::default()
        }
    };

    match args.command {
        Command::Check { verbose } => {
            let code = run_checks(&config, verbose);
            std::process::exit(code);
        }
        Command::Watch { held, tile_size } => watch(&config, held, tile_size),
    }
}

/// Run the health checks for `config`, returning the process exit code
fn run_checks(config: &InputConfig, verbose: bool) -> i32 {
    let mut runner =
        HealthCheckRunner::new().add_check(ConfigCheck::with_profiles([config.profile.clone()]));
    match InputContext::from_config(config) {
        Ok(context) => {
            runner = runner
                .add_check(BindingConflictCheck::from_map(context.button_map().clone()))
                .add_check(ActionConflictCheck::from_registry(context.actions().clone()));
        }
        Err(e) => error!(error = %e, "Profile does not build an input context"),
    }

    let report = runner.add_check(StackCheck::new()).run();
    print_report(&report, verbose);
    report.exit_code()
}

fn watch(config: &InputConfig, held: bool, tile_size: Option<f32>) -> anyhow::Result<()> {
    let mut input = InputContext::from_config(config).context("Invalid input profile")?;
    install_probe(&mut input, held)?;

    let mut collector = InputCollector::new();
    collector.set_tile_size(tile_size);

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::wait_duration(Duration::from_millis(16)));

    info!(profile = %config.profile, "Watching input, press F1 to capture a keybinding");
    let mut app = Probe {
        window: None,
        collector,
        input,
    };
    event_loop.run_app(&mut app).context("Failed to run event loop")?;
    Ok(())
}

/// Subscribe the event logger on the global scope and a capture trigger below it
fn install_probe(input: &mut InputContext, held: bool) -> layered_input::Result<()> {
    input.global_mut().subscribe(EventFilter::all(), move |_, event| {
        match event {
            InputEvent::Ticked { .. } => {}
            _ if !held && event.phase() == Some(Phase::Held) => {}
            _ => info!(?event, "Input"),
        }
    });

    input
        .create_scope("probe", true, BlockBehavior::PassBelow)?
        .subscribe(
            EventFilter::kind(EventKind::Button).with_phase(Phase::Pressed),
            |cx, event| {
                if let InputEvent::Button {
                    button: Button::F1, ..
                } = event
                {
                    info!("Press a button or chord to bind, cancel to abort");
                    cx.listen_for_keybinding(Box::new(|binding| match binding {
                        Some(binding) => info!(%binding, "Captured keybinding"),
                        None => info!("Keybinding capture cancelled"),
                    }));
                }
            },
        );
    Ok(())
}

struct Probe {
    window: Option<Window>,
    collector: InputCollector,
    input: InputContext,
}

impl ApplicationHandler for Probe {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let window_attributes = Window::default_attributes()
            .with_title("Input Probe")
            .with_inner_size(winit::dpi::LogicalSize::new(800.0, 600.0));

        match event_loop.create_window(window_attributes) {
            Ok(window) => {
                self.collector.set_scale_factor(window.scale_factor() as f32);
                self.window = Some(window);
            }
            Err(e) => {
                error!(error = %e, "Failed to create window");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match &event {
            WindowEvent::CloseRequested => {
                info!(ticks = self.input.tick_count(), "Close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.collector.set_scale_factor(*scale_factor as f32);
            }
            _ => self.collector.handle_window_event(&event),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        self.input.tick(self.collector.sample());
        debug!(
            tick = self.input.tick_count(),
            events = self.input.last_events().len(),
            "Tick"
        );
    }
}
