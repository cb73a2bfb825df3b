/*
 *  config.rs
 *
 *  gsdisplay - ground station status display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Layered configuration: defaults, YAML file, CLI overrides
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

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::constants::{DEFAULT_BRIGHTNESS, TICK_INTERVAL_MS};

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    pub tick_ms: Option<u64>,          // overlay refresh period
    pub display: Option<DisplayConfig>,
    pub device: Option<DeviceConfig>,
    pub messages: Option<MessageConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub brightness: Option<u8>,     // 0-100
    pub day_night: Option<bool>,    // invert during daytime
    pub flip: Option<bool>,         // mount upside down
    pub driver: Option<DriverKind>,
    pub bus: Option<BusConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DeviceConfig {
    pub thing_name: Option<String>,
    pub wifi_ssid: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MessageConfig {
    /// Only messages starting with this id are shown, with the id stripped
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BusConfig {
    I2c {
        bus: String,        // e.g. "/dev/i2c-1"
        address: u8,        // e.g. 0x3C
    },
}

impl Default for BusConfig {
    fn default() -> Self {
        BusConfig::I2c { bus: "/dev/i2c-1".to_string(), address: 0x3C }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    Ssd1306,
    Mock,       // headless, no hardware
}

/// Read-only view of the display related settings, taken once per tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfigSnapshot {
    pub brightness_level: u8,
    pub day_night_enabled: bool,
    pub flip_enabled: bool,
    pub thing_name: String,
    pub wifi_ssid: String,
}

impl Default for DisplayConfigSnapshot {
    fn default() -> Self {
        Self {
            brightness_level: DEFAULT_BRIGHTNESS,
            day_night_enabled: false,
            flip_enabled: false,
            thing_name: String::new(),
            wifi_ssid: String::new(),
        }
    }
}

/// Accessors the display core reads settings through. Never writes.
pub trait ConfigProvider {
    fn brightness(&self) -> u8;
    fn day_night(&self) -> bool;
    fn flip(&self) -> bool;
    fn thing_name(&self) -> &str;
    fn wifi_ssid(&self) -> &str;

    fn snapshot(&self) -> DisplayConfigSnapshot {
        DisplayConfigSnapshot {
            brightness_level: self.brightness(),
            day_night_enabled: self.day_night(),
            flip_enabled: self.flip(),
            thing_name: self.thing_name().to_string(),
            wifi_ssid: self.wifi_ssid().to_string(),
        }
    }
}

impl ConfigProvider for Config {
    fn brightness(&self) -> u8 {
        self.display.as_ref().and_then(|d| d.brightness).unwrap_or(DEFAULT_BRIGHTNESS)
    }

    fn day_night(&self) -> bool {
        self.display.as_ref().and_then(|d| d.day_night).unwrap_or(false)
    }

    fn flip(&self) -> bool {
        self.display.as_ref().and_then(|d| d.flip).unwrap_or(false)
    }

    fn thing_name(&self) -> &str {
        self.device.as_ref().and_then(|d| d.thing_name.as_deref()).unwrap_or("")
    }

    fn wifi_ssid(&self) -> &str {
        self.device.as_ref().and_then(|d| d.wifi_ssid.as_deref()).unwrap_or("")
    }
}

impl ConfigProvider for DisplayConfigSnapshot {
    fn brightness(&self) -> u8 { self.brightness_level }
    fn day_night(&self) -> bool { self.day_night_enabled }
    fn flip(&self) -> bool { self.flip_enabled }
    fn thing_name(&self) -> &str { &self.thing_name }
    fn wifi_ssid(&self) -> &str { &self.wifi_ssid }

    fn snapshot(&self) -> DisplayConfigSnapshot {
        self.clone()
    }
}

impl Config {
    pub fn tick_ms(&self) -> u64 {
        self.tick_ms.unwrap_or(TICK_INTERVAL_MS)
    }

    pub fn user_id(&self) -> &str {
        self.messages.as_ref().and_then(|m| m.user_id.as_deref()).unwrap_or("")
    }

    pub fn driver_kind(&self) -> DriverKind {
        self.display.as_ref().and_then(|d| d.driver).unwrap_or(DriverKind::Mock)
    }

    pub fn bus(&self) -> BusConfig {
        self.display.as_ref().and_then(|d| d.bus.clone()).unwrap_or_default()
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone)]
#[command(name = "gsdisplay", version, about = "Ground station OLED status display")]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Enable debug log level
    #[arg(short = 'v', long, alias = "verbose", action = ArgAction::SetTrue)]
    pub debug: bool,
    #[arg(long)]
    pub log_level: Option<String>,
    #[arg(long)]
    pub tick_ms: Option<u64>,
    #[arg(long, value_enum)]
    pub driver: Option<DriverKind>,
    #[arg(long)]
    pub i2c_bus: Option<String>,
    #[arg(long, value_parser = parse_i2c_address)]
    pub i2c_address: Option<u8>,
    #[arg(long)]
    pub display_width: Option<u32>,
    #[arg(long)]
    pub display_height: Option<u32>,
    /// Panel brightness 0-100, 0 switches the panel off
    #[arg(long)]
    pub brightness: Option<u8>,
    #[arg(long, action = ArgAction::Set)]
    pub day_night: Option<bool>,
    #[arg(long, action = ArgAction::Set)]
    pub flip: Option<bool>,
    #[arg(long)]
    pub thing_name: Option<String>,
    #[arg(long)]
    pub wifi_ssid: Option<String>,
    /// Sender id prefix a message must carry to be shown
    #[arg(long)]
    pub user_id: Option<String>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

fn parse_i2c_address(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse::<u8>(),
    };
    parsed.map_err(|e| format!("invalid I2C address {s:?}: {e}"))
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<(Config, Cli), ConfigError> {
    let cli = Cli::parse();
    let cfg = load_from(&cli)?;
    Ok((cfg, cli))
}

/// Build the effective config for already parsed CLI arguments.
pub fn load_from(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;

    Ok(cfg)
}

/// Re-read the configuration for a running display.
///
/// The panel is already open, so geometry, driver and bus are carried over
/// from `current`; everything else comes from the fresh load.
pub fn reload(cli: &Cli, current: &Config) -> Result<Config, ConfigError> {
    let mut fresh = load_from(cli)?;
    carry_hardware(&mut fresh, current);
    Ok(fresh)
}

fn carry_hardware(fresh: &mut Config, current: &Config) {
    let old = current.display.clone().unwrap_or_default();
    let new = fresh.display.get_or_insert_with(DisplayConfig::default);
    new.width = old.width;
    new.height = old.height;
    new.driver = old.driver;
    new.bus = old.bus;
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/gsdisplay/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/gsdisplay/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/gsdisplay.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["gsdisplay.yaml", "config.yaml", "config/gsdisplay.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some()  { dst.log_level = src.log_level; }
    if src.tick_ms.is_some()    { dst.tick_ms = src.tick_ms; }
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
    match (&mut dst.device, src.device) {
        (None, Some(c)) => dst.device = Some(c),
        (Some(d), Some(s)) => {
            if s.thing_name.is_some() { d.thing_name = s.thing_name; }
            if s.wifi_ssid.is_some()  { d.wifi_ssid = s.wifi_ssid; }
        }
        _ => {}
    }
    match (&mut dst.messages, src.messages) {
        (None, Some(c)) => dst.messages = Some(c),
        (Some(d), Some(s)) => {
            if s.user_id.is_some() { d.user_id = s.user_id; }
        }
        _ => {}
    }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.width.is_some()       { dst.width = src.width; }
    if src.height.is_some()      { dst.height = src.height; }
    if src.brightness.is_some()  { dst.brightness = src.brightness; }
    if src.day_night.is_some()   { dst.day_night = src.day_night; }
    if src.flip.is_some()        { dst.flip = src.flip; }
    if src.driver.is_some()      { dst.driver = src.driver; }
    if src.bus.is_some()         { dst.bus = src.bus; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some() { cfg.log_level = cli.log_level.clone(); }
    if cli.tick_ms.is_some()   { cfg.tick_ms = cli.tick_ms; }

    let any_display = cli.display_width.is_some()
        || cli.display_height.is_some()
        || cli.brightness.is_some()
        || cli.day_night.is_some()
        || cli.flip.is_some()
        || cli.driver.is_some()
        || cli.i2c_bus.is_some()
        || cli.i2c_address.is_some();

    if any_display && cfg.display.is_none() {
        cfg.display = Some(DisplayConfig::default());
    }
    if let Some(display) = cfg.display.as_mut() {
        if cli.display_width.is_some()  { display.width = cli.display_width; }
        if cli.display_height.is_some() { display.height = cli.display_height; }
        if cli.brightness.is_some()     { display.brightness = cli.brightness; }
        if cli.day_night.is_some()      { display.day_night = cli.day_night; }
        if cli.flip.is_some()           { display.flip = cli.flip; }
        if cli.driver.is_some()         { display.driver = cli.driver; }

        if cli.i2c_bus.is_some() || cli.i2c_address.is_some() {
            let BusConfig::I2c { bus, address } = display.bus.get_or_insert_with(BusConfig::default);
            if let Some(b) = cli.i2c_bus.as_ref() { *bus = b.clone(); }
            if let Some(a) = cli.i2c_address    { *address = a; }
        }
    }

    if cli.thing_name.is_some() || cli.wifi_ssid.is_some() {
        let device = cfg.device.get_or_insert_with(DeviceConfig::default);
        if cli.thing_name.is_some() { device.thing_name = cli.thing_name.clone(); }
        if cli.wifi_ssid.is_some()  { device.wifi_ssid = cli.wifi_ssid.clone(); }
    }

    if cli.user_id.is_some() {
        cfg.messages.get_or_insert_with(MessageConfig::default).user_id = cli.user_id.clone();
    }
}

/// Put any invariants here (required fields, ranges, etc.)
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.tick_ms == Some(0) {
        return Err(ConfigError::Validation("tick_ms must be > 0".into()));
    }
    if let Some(display) = cfg.display.as_ref() {
        if display.width == Some(0) || display.height == Some(0) {
            return Err(ConfigError::Validation("display width/height must be > 0".into()));
        }
        if let Some(b) = display.brightness {
            if b > 100 {
                return Err(ConfigError::Validation("display brightness must be 0..=100".into()));
            }
        }
        if display.driver == Some(DriverKind::Ssd1306) {
            let size = (display.width.unwrap_or(128), display.height.unwrap_or(64));
            if !matches!(size, (128, 64) | (128, 32)) {
                return Err(ConfigError::Validation(format!(
                    "SSD1306 supports 128x64 or 128x32, not {}x{}", size.0, size.1
                )));
            }
        }
    }
    Ok(())
}
