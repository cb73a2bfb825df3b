/*
 *  main.rs
 *
 *  gsdisplay - ground station status display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Host binary - overlay ticks and stdin messages onto one display session
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::fmt::Debug;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use embedded_graphics::draw_target::DrawTarget;
use env_logger::Env;
use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal::unix::{signal, SignalKind};

use gsdisplay::clock::{SystemClock, TimeSource};
use gsdisplay::config::{self, Cli, Config, ConfigProvider, DriverKind};
use gsdisplay::display::{DisplayDriver, DisplaySession, MockDriver, MonoDisplay};
use gsdisplay::message::{MessagePayload, MessagePlanner};
use gsdisplay::overlay::{OverlayState, OverlayUpdater};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Waits for SIGINT, SIGTERM or SIGHUP and logs which one arrived.
async fn signal_handler() -> std::io::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

/// Main loop: overlay on every tick, one message per stdin line, config
/// re-read on SIGUSR1.
async fn run<D>(mut session: DisplaySession<D>, cli: &Cli, mut cfg: Config) -> anyhow::Result<()>
where
    D: MonoDisplay,
    <D as DrawTarget>::Error: Debug,
{
    session.init(&cfg.snapshot()).context("display init failed")?;

    let planner = MessagePlanner::new(session.grid().clone());
    let clock = SystemClock;
    let mut state = OverlayState::default();

    if let Err(e) = session.execute(&planner.plan_no_messages()) {
        warn!("Placeholder draw failed: {}", e);
    }

    let mut ticker = tokio::time::interval(Duration::from_millis(cfg.tick_ms()));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    let shutdown = signal_handler();
    tokio::pin!(shutdown);
    let mut reload = signal(SignalKind::user_defined1()).context("SIGUSR1 handler")?;

    info!("Running, overlay every {} ms, sender prefix {:?}", cfg.tick_ms(), cfg.user_id());

    loop {
        tokio::select! {
            res = &mut shutdown => {
                res.context("signal handler setup failed")?;
                break;
            }

            _ = reload.recv() => {
                match config::reload(cli, &cfg) {
                    Ok(fresh) => {
                        info!("Configuration reloaded");
                        cfg = fresh;
                    }
                    Err(e) => warn!("Reload failed, keeping current configuration: {}", e),
                }
            }

            _ = ticker.tick() => {
                let snapshot = cfg.snapshot();
                if let Some(effects) = OverlayUpdater::tick(&clock, &snapshot, &state) {
                    if let Err(e) = session.apply_overlay(&effects, &mut state) {
                        warn!("Overlay update failed: {}", e);
                    }
                }
            }

            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(text)) => {
                        let timestamp = match clock.now() {
                            Ok(t) => t,
                            Err(e) => {
                                warn!("Message dropped, no timestamp: {}", e);
                                continue;
                            }
                        };
                        let payload = MessagePayload::new(text, timestamp);
                        let plan = planner.plan_payload(&payload, cfg.user_id());
                        if plan.is_empty() {
                            continue;
                        }
                        debug!("message at {}", timestamp.hms());
                        if let Err(e) = session.execute(&plan) {
                            warn!("Message draw failed: {}", e);
                        }
                    }
                    Ok(None) => {
                        info!("stdin closed, overlay only from here");
                        stdin_open = false;
                    }
                    Err(e) => {
                        warn!("stdin read failed: {}", e);
                        stdin_open = false;
                    }
                }
            }
        }
    }

    // leave a blank panel behind
    DisplayDriver::clear(session.driver_mut())?;
    session.display()?;
    info!("Display cleared, bye");
    Ok(())
}

#[cfg(feature = "driver-ssd1306")]
async fn run_ssd1306(cli: &Cli, cfg: Config) -> anyhow::Result<()> {
    use gsdisplay::config::BusConfig;
    use gsdisplay::display::Ssd1306Driver;

    let BusConfig::I2c { bus, address } = cfg.bus();
    let driver = Ssd1306Driver::new_i2c(&bus, address, &cfg.display.clone().unwrap_or_default())
        .with_context(|| format!("cannot open SSD1306 on {}", bus))?;
    run(DisplaySession::new(driver), cli, cfg).await
}

#[cfg(not(feature = "driver-ssd1306"))]
async fn run_ssd1306(_cli: &Cli, _cfg: Config) -> anyhow::Result<()> {
    anyhow::bail!("built without the driver-ssd1306 feature")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_from(&cli).context("configuration")?;

    if cli.dump_config {
        print!("{}", serde_yaml::to_string(&cfg).context("serializing config")?);
        return Ok(());
    }

    let log_level = if cli.debug {
        "debug".to_string()
    } else {
        cfg.log_level.clone().unwrap_or_else(|| "info".to_string())
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_secs()
        .init();

    info!("{} v{} built {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), BUILD_DATE);

    match cfg.driver_kind() {
        DriverKind::Ssd1306 => run_ssd1306(&cli, cfg).await,
        DriverKind::Mock => {
            info!("Using mock display driver");
            let driver = MockDriver::new(&cfg.display.clone().unwrap_or_default())?;
            run(DisplaySession::new(driver), &cli, cfg).await
        }
    }
}
