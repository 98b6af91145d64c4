//! Tally CLI
//!
//! Preview, trace, and format animated counters.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;
use tally_animation::{AnimatedNumber, Easing, FrameScheduler};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

use config::TallyConfig;

/// Stop a trace that never settles
const MAX_TRACE_FRAMES: usize = 100_000;

#[derive(Parser)]
#[command(name = "tally")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Animated number counter toolkit", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to ./tally.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Animate a value in the terminal in real time
    Animate {
        /// Starting value
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        from: f64,

        /// Target value
        #[arg(long, allow_negative_numbers = true)]
        to: f64,

        #[command(flatten)]
        motion: MotionArgs,

        /// Frames per second
        #[arg(long)]
        fps: Option<u32>,
    },

    /// Print every frame of an animation on a fixed time step
    Trace {
        /// Starting value
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        from: f64,

        /// Target value
        #[arg(long, allow_negative_numbers = true)]
        to: f64,

        #[command(flatten)]
        motion: MotionArgs,

        /// Time between frames in milliseconds
        #[arg(long, default_value = "16.0")]
        interval: f64,

        /// Time of a mid-flight retarget in milliseconds
        #[arg(long, requires = "retarget_to")]
        retarget_at: Option<f64>,

        /// New target applied at --retarget-at
        #[arg(long, requires = "retarget_at", allow_negative_numbers = true)]
        retarget_to: Option<f64>,
    },

    /// Render a value with fixed and grouped formatting
    Format {
        /// Value to render
        #[arg(allow_negative_numbers = true)]
        value: f64,

        /// Fractional digits
        #[arg(short, long)]
        decimals: Option<u32>,

        /// Locale for grouped output (e.g. en-US, de, hi)
        #[arg(short, long)]
        locale: Option<String>,
    },

    /// Estimate reading time for a text length
    ReadTime {
        /// Length of the text in units
        units: u64,
    },

    /// Print the effective configuration
    Config,
}

/// Flags that override the `[animation]` and `[display]` tables
#[derive(Args, Debug, Default)]
struct MotionArgs {
    /// Duration in milliseconds
    #[arg(long)]
    duration: Option<f64>,

    /// Display precision
    #[arg(short, long)]
    decimals: Option<u32>,

    /// Easing curve (expo, cubic)
    #[arg(short, long)]
    easing: Option<Easing>,

    /// Start delay in milliseconds
    #[arg(long)]
    delay: Option<f64>,

    /// Locale for grouped output; implies --grouped
    #[arg(short, long)]
    locale: Option<String>,

    /// Insert thousands separators
    #[arg(short, long)]
    grouped: bool,
}

impl MotionArgs {
    fn apply(&self, config: &mut TallyConfig) {
        let animation = &mut config.animation;
        if let Some(duration) = self.duration {
            animation.duration_ms = duration;
        }
        if let Some(decimals) = self.decimals {
            animation.decimals = decimals;
        }
        if let Some(easing) = self.easing {
            animation.easing = easing;
        }
        if let Some(delay) = self.delay {
            animation.delay_ms = delay;
        }

        if let Some(ref locale) = self.locale {
            config.display.locale = locale.clone();
            config.display.grouped = true;
        }
        if self.grouped {
            config.display.grouped = true;
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    let mut config = TallyConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Animate {
            from,
            to,
            motion,
            fps,
        } => {
            motion.apply(&mut config);
            if let Some(fps) = fps {
                config.display.fps = fps;
            }
            config.validate()?;
            cmd_animate(&config, from, to)
        }

        Commands::Trace {
            from,
            to,
            motion,
            interval,
            retarget_at,
            retarget_to,
        } => {
            motion.apply(&mut config);
            config.validate()?;
            let retarget = retarget_at.zip(retarget_to);
            cmd_trace(&config, from, to, interval, retarget)
        }

        Commands::Format {
            value,
            decimals,
            locale,
        } => {
            let decimals = decimals.unwrap_or(config.animation.decimals);
            let locale = locale.unwrap_or(config.display.locale);
            cmd_format(value, decimals, &locale)
        }

        Commands::ReadTime { units } => cmd_read_time(units),

        Commands::Config => cmd_config(&config),
    }
}

fn cmd_animate(config: &TallyConfig, from: f64, to: f64) -> Result<()> {
    let format = config.number_format()?;

    let (wake_tx, wake_rx) = mpsc::channel();
    let mut scheduler = FrameScheduler::new();
    scheduler.set_wake_callback(move || {
        let _ = wake_tx.send(());
    });

    let mut value = AnimatedNumber::new(scheduler.handle(), from, config.animation)
        .context("Invalid starting value")?;
    value.set_target(to).context("Invalid target value")?;

    info!(
        "Animating {} -> {} over {}ms ({})",
        from, to, config.animation.duration_ms, config.animation.easing
    );

    scheduler.start_background(config.display.fps);

    let mut stdout = io::stdout().lock();
    let mut width = 0;
    let mut draw = |shown: f64, out: &mut dyn Write| -> io::Result<()> {
        let rendered = format.render(shown);
        width = width.max(rendered.len());
        write!(out, "\r{:>width$}", rendered, width = width)?;
        out.flush()
    };

    draw(value.get(), &mut stdout)?;
    while value.is_animating() {
        // Delays schedule no frames, so poll in case no wake arrives
        let _ = wake_rx.recv_timeout(Duration::from_millis(100));
        if scheduler.take_needs_redraw() {
            draw(value.get(), &mut stdout)?;
        }
    }
    draw(value.get(), &mut stdout)?;
    writeln!(stdout)?;

    drop(value);
    scheduler.stop_background();
    Ok(())
}

fn cmd_trace(
    config: &TallyConfig,
    from: f64,
    to: f64,
    interval: f64,
    mut retarget: Option<(f64, f64)>,
) -> Result<()> {
    anyhow::ensure!(
        interval.is_finite() && interval > 0.0,
        "Interval must be a positive number of milliseconds, got {}",
        interval
    );

    let format = config.number_format()?;
    let scheduler = FrameScheduler::manual();
    let mut value = AnimatedNumber::new(scheduler.handle(), from, config.animation)
        .context("Invalid starting value")?;
    value.set_target(to).context("Invalid target value")?;

    println!(
        "{:>10}  {:>8}  {:>20}  {}",
        "time_ms", "progress", "value", "rendered"
    );

    let mut now = 0.0;
    for frame in 0..MAX_TRACE_FRAMES {
        if let Some((at, target)) = retarget {
            if now >= at {
                info!("Retargeting to {} at {}ms", target, now);
                value
                    .set_target(target)
                    .context("Invalid retarget value")?;
                retarget = None;
            }
        }

        let pending = scheduler.tick_at(now);
        let shown = value.get();
        println!(
            "{:>10.1}  {:>8.4}  {:>20}  {}",
            now,
            value.progress_at(now),
            shown,
            format.render(shown)
        );

        if !pending && retarget.is_none() {
            info!("Settled at {} after {} frames", shown, frame + 1);
            return Ok(());
        }
        now += interval;
    }

    anyhow::bail!(
        "Animation did not settle within {} frames",
        MAX_TRACE_FRAMES
    )
}

fn cmd_format(value: f64, decimals: u32, locale: &str) -> Result<()> {
    let grouped = tally_format::grouped(value, decimals, locale)
        .with_context(|| format!("Cannot group for locale '{}'", locale))?;

    println!("fixed:   {}", tally_format::fixed_decimal(value, decimals));
    println!("grouped: {}", grouped);
    Ok(())
}

fn cmd_read_time(units: u64) -> Result<()> {
    let minutes = tally_format::estimate_read_minutes(units);
    println!(
        "{} min read ({} units at {} per minute)",
        minutes,
        units,
        tally_format::UNITS_PER_MINUTE
    );
    Ok(())
}

fn cmd_config(config: &TallyConfig) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}
