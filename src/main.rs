use clap::Parser;
use hap_light_bridge::config::{Config, load_dotenv};
use hap_light_bridge::error::Result;
use hap_light_bridge::hap::HapBridge;
use hap_light_bridge::homekit::LightPublisher;
use hap_light_bridge::light::{ColorCapability, LightState};
use log::{error, info};
use rand::Rng;
use rand::seq::SliceRandom;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::signal;

/// How often running transitions are advanced
const TICK_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Parser)]
#[command(name = "hap-light-bridge")]
#[command(about = "Expose lights as bridged HomeKit accessories")]
struct Cli {
    /// JSON configuration file (defaults to the user config directory)
    #[arg(long, env = "HAP_CONFIG")]
    config: Option<PathBuf>,

    /// Seconds between simulated physical light changes, 0 disables
    #[arg(long, default_value_t = 0)]
    simulate_interval: u64,

    /// Print the accessory database as JSON and exit
    #[arg(long)]
    dump: bool,
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() -> ExitCode {
    init_logger();
    // Before the runtime exists, see load_dotenv
    load_dotenv();
    let cli = Cli::parse();

    info!("Starting HAP light bridge");

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("Configuration loaded:");
    info!("  Model: {}", config.accessory.model);
    info!("  Manufacturer: {}", config.accessory.manufacturer);
    info!("  Firmware: {}", config.accessory.firmware_revision);
    info!("  Lights: {}", config.lights.len());

    let hap = Arc::new(HapBridge::new());
    let publisher = LightPublisher::new(hap.clone(), config.accessory.clone());
    let lights = match publish_lights(&publisher, &config) {
        Ok(lights) => lights,
        Err(e) => {
            error!("Failed to publish lights: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if cli.dump {
        return match serde_json::to_string_pretty(&hap.accessories_json()) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Failed to serialize accessory database: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };
    runtime.block_on(run(publisher, lights, cli.simulate_interval));

    ExitCode::SUCCESS
}

fn publish_lights(publisher: &LightPublisher, config: &Config) -> Result<Vec<Arc<LightState>>> {
    let mut lights = Vec::with_capacity(config.lights.len());
    for light_config in &config.lights {
        let light = Arc::new(light_config.build());
        publisher.publish(&light)?;
        lights.push(light);
    }
    Ok(lights)
}

async fn run(publisher: LightPublisher, lights: Vec<Arc<LightState>>, simulate_interval: u64) {
    let driver = tokio::spawn(drive_transitions(lights.clone()));
    let simulation = (simulate_interval > 0).then(|| {
        tokio::spawn(simulate(
            lights.clone(),
            Duration::from_secs(simulate_interval),
        ))
    });

    info!("HAP light bridge is running");
    info!("  - {} light(s) published", lights.len());
    if simulate_interval > 0 {
        info!("  - Simulating a physical change every {}s", simulate_interval);
    }
    info!("  - Press Ctrl+C to exit");

    // Wait for shutdown signal
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal");
        }
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
        }
    }

    driver.abort();
    if let Some(simulation) = simulation {
        simulation.abort();
    }

    for light in &lights {
        publisher.unlink(light);
    }

    info!("HAP light bridge stopped");
}

async fn drive_transitions(lights: Vec<Arc<LightState>>) {
    let mut interval = tokio::time::interval(TICK_INTERVAL);
    loop {
        interval.tick().await;
        let now = Instant::now();
        for light in &lights {
            light.tick(now);
        }
    }
}

async fn simulate(lights: Vec<Arc<LightState>>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    // The first tick completes immediately
    interval.tick().await;
    loop {
        interval.tick().await;
        simulate_change(&lights);
    }
}

/// Change a random light the way a wall switch or an automation would.
fn simulate_change(lights: &[Arc<LightState>]) {
    let mut rng = rand::thread_rng();
    let Some(light) = lights.choose(&mut rng) else {
        return;
    };
    let traits = light.traits();

    let call = match rng.gen_range(0..3) {
        1 if traits.supports(ColorCapability::Brightness) => {
            let brightness: f32 = rng.gen_range(0.05..=1.0);
            info!("[Simulation] '{}' dimmed to {:.2}", light.name(), brightness);
            light.turn_on().set_brightness(brightness)
        }
        2 if traits.supports(ColorCapability::ColorTemperature) => {
            let mireds = rng.gen_range(traits.min_mireds()..=traits.max_mireds());
            info!("[Simulation] '{}' set to {:.0} mireds", light.name(), mireds);
            light.turn_on().set_color_temperature(mireds)
        }
        _ => {
            let on = !light.current_values().state;
            info!("[Simulation] '{}' switched {}", light.name(), if on { "on" } else { "off" });
            if on { light.turn_on() } else { light.turn_off() }
        }
    };
    call.perform();
}
