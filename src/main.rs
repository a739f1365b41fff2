use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::SecondsFormat;
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, LevelFilter};

use horus::{Config, Controller, Device, Outcome, Power, State, HSBK};

/// This struct defines the command line interface of the application
#[derive(Parser)]
#[clap(name = "horus", about = "Controls the LIFX lights listed in a configuration file", version)]
struct Cli {
    /// Configuration file (defaults to $CONFIG_FILE, then config.yaml)
    #[clap(long)]
    config: Option<PathBuf>,

    /// Product catalog (defaults to $PRODUCTS_FILE, then productsFile, then the built-in table)
    #[clap(long)]
    products: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Refreshes the selected lights and prints them
    #[clap(name = "list")]
    List {
        /// Which lights, e.g. `all`, `label:kitchen` or `group:Downstairs`
        #[clap(short, long, default_value = "all")]
        selector: String,

        /// One line per light instead of JSON
        #[clap(long)]
        brief: bool,
    },
    /// Changes the label, power or color of the selected lights
    #[clap(name = "set-state")]
    SetState {
        #[clap(short, long, default_value = "all")]
        selector: String,

        #[clap(long, value_enum)]
        power: Option<CliPower>,

        #[clap(long)]
        label: Option<String>,

        /// Hue (0-65535); the four color flags go together
        #[clap(long)]
        hue: Option<u16>,

        /// Saturation (0-65535)
        #[clap(long)]
        saturation: Option<u16>,

        /// Brightness (0-65535)
        #[clap(long)]
        brightness: Option<u16>,

        /// Color temperature (2500-9000)
        #[clap(long, value_parser = clap::value_parser!(u16).range(2500..=9000))]
        kelvin: Option<u16>,

        /// Transition time in milliseconds
        #[clap(short, long, default_value_t = 0)]
        duration: u32,
    },
    /// Turns lit lights off and the others on
    #[clap(name = "toggle")]
    Toggle {
        #[clap(short, long, default_value = "all")]
        selector: String,

        /// Transition time in milliseconds
        #[clap(short, long, default_value_t = 0)]
        duration: u32,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum CliPower {
    On,
    Off,
}

impl From<CliPower> for Power {
    fn from(p: CliPower) -> Power {
        match p {
            CliPower::On => Power::On,
            CliPower::Off => Power::Off,
        }
    }
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config_path = Config::path(cli.config);
    let config = Config::load(&config_path)?;
    let catalog = config.catalog(cli.products)?;
    debug!("{} product(s) in the catalog", catalog.len());
    let controller = Controller::from_config(&config, catalog);

    match cli.command {
        Commands::List { selector, brief } => {
            let devices = controller.read_devices(&selector)?;
            if brief {
                for device in &devices {
                    println!("{}", describe(&device.lock()));
                }
            } else {
                let devices = devices
                    .iter()
                    .map(|d| serde_json::to_value(&*d.lock()))
                    .collect::<Result<Vec<_>, _>>()?;
                println!("{}", serde_json::to_string_pretty(&devices)?);
            }
        }
        Commands::SetState {
            selector,
            power,
            label,
            hue,
            saturation,
            brightness,
            kelvin,
            duration,
        } => {
            let state = State {
                color: color_from_flags(hue, saturation, brightness, kelvin)?,
                power: power.map(Power::from),
                label,
            };
            if state == State::default() {
                bail!("nothing to set: pass --power, --label or a color");
            }
            report(controller.set_state(&selector, &state, duration)?)?;
        }
        Commands::Toggle { selector, duration } => {
            report(controller.toggle(&selector, duration)?)?;
        }
    }

    Ok(())
}

/// `ENVIRONMENT=PROD` logs warnings and up, anything else logs debug.  `RUST_LOG` wins over both.
fn init_logging() {
    let level = level_for(std::env::var("ENVIRONMENT").ok().as_deref());
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn level_for(environment: Option<&str>) -> LevelFilter {
    match environment {
        Some("PROD") => LevelFilter::Warn,
        _ => LevelFilter::Debug,
    }
}

fn color_from_flags(
    hue: Option<u16>,
    saturation: Option<u16>,
    brightness: Option<u16>,
    kelvin: Option<u16>,
) -> Result<Option<HSBK>> {
    match (hue, saturation, brightness, kelvin) {
        (Some(hue), Some(saturation), Some(brightness), Some(kelvin)) => Ok(Some(HSBK {
            hue,
            saturation,
            brightness,
            kelvin,
        })),
        (None, None, None, None) => Ok(None),
        _ => bail!("--hue, --saturation, --brightness and --kelvin must be given together"),
    }
}

fn describe(d: &Device) -> String {
    let color = d
        .color
        .map(|c| c.describe(false))
        .unwrap_or_else(|| "unknown color".to_owned());
    let product = d.product.as_ref().map_or("unknown product", |p| p.name.as_str());
    let mut line = format!("{} ({}) {} {} - {}", d.label, d.uuid, d.power, color, product);
    if let Some(info) = d.info {
        line.push_str(&format!(
            " - clock {}",
            info.clock().to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
    }
    if !d.connected {
        line.push_str(" [unreachable]");
    }
    line
}

fn report(outcomes: Vec<Outcome>) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&outcomes).context("cannot render the results")?
    );
    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    if failed > 0 {
        bail!("{} of {} device(s) failed", failed, outcomes.len());
    }
    Ok(())
}
