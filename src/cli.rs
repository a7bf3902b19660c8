//! CLI argument parsing

use clap::Parser;
use pjburn_core::resolve::{parse_fill, parse_swap, DeviceIndex, Settings};
use pjburn_core::tables::{legal_image_types, legal_sizes, legal_widths, BusWidth, DeviceSize, ImageType};
use std::path::PathBuf;

fn parse_size_arg(s: &str) -> Result<DeviceSize, String> {
    s.parse().map_err(|e: pjburn_core::Error| e.to_string())
}

fn parse_width_arg(s: &str) -> Result<BusWidth, String> {
    s.parse().map_err(|e: pjburn_core::Error| e.to_string())
}

fn parse_type_arg(s: &str) -> Result<ImageType, String> {
    s.parse().map_err(|e: pjburn_core::Error| e.to_string())
}

fn parse_device_arg(s: &str) -> Result<DeviceIndex, String> {
    s.parse().map_err(|e: pjburn_core::Error| e.to_string())
}

fn parse_swap_arg(s: &str) -> Result<bool, String> {
    parse_swap(s).map_err(|e| e.to_string())
}

fn parse_fill_arg(s: &str) -> Result<u8, String> {
    parse_fill(s).map_err(|e| e.to_string())
}

fn size_help() -> String {
    format!("Promjet size in memory locations [{}]", legal_sizes())
}

fn width_help() -> String {
    format!("Promjet bus width [{}]", legal_widths())
}

fn type_help() -> String {
    format!("Image type [{}]", legal_image_types())
}

/// Settings are taken from the command line first, then from the PJET_WIDTH,
/// PJET_SIZE and PJET_SWAP environment variables, then from autodetection.
#[derive(Parser)]
#[command(name = "pjburn")]
#[command(author, version, about = "Burn images into a Promjet through pjet", long_about = None)]
pub struct Cli {
    /// Input image, or - to read from stdin
    #[arg(required_unless_present = "list")]
    pub file: Option<String>,

    #[arg(short, long, value_parser = parse_size_arg, help = size_help())]
    pub size: Option<DeviceSize>,

    #[arg(short, long, value_parser = parse_width_arg, help = width_help())]
    pub width: Option<BusWidth>,

    /// Swap bytes on transfer (on, off, yes, no, 1, 0)
    #[arg(short = 'S', long, value_parser = parse_swap_arg)]
    pub swap: Option<bool>,

    /// Fill byte value, hex
    #[arg(short, long, default_value = "0xFF", value_parser = parse_fill_arg)]
    pub fill: u8,

    /// Device number when several Promjets are attached (lsusb order)
    #[arg(short, long, value_parser = parse_device_arg)]
    pub device: Option<DeviceIndex>,

    #[arg(short = 't', long = "type", default_value = "B", value_parser = parse_type_arg, help = type_help())]
    pub image_type: ImageType,

    /// Do not pad the image; preserves the rest of the Promjet contents
    #[arg(short = 'P', long)]
    pub no_padding: bool,

    /// Take every setting from the command line or environment, no autodetection
    #[arg(short, long)]
    pub manual_mode: bool,

    /// Print the pjet command instead of running it
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Enable the ICE feature
    #[arg(long)]
    pub enable_ice: bool,

    /// pjet binary to run
    #[arg(long)]
    pub pjet_command: Option<String>,

    /// Extra platform definitions (TOML), matched before the built-in ones
    #[arg(long)]
    pub platform_db: Option<PathBuf>,

    /// List sizes, widths, image types and known platforms
    #[arg(long)]
    pub list: bool,
}

impl Cli {
    /// Explicit settings for the resolver
    pub fn settings(&self) -> Settings {
        Settings {
            size: self.size,
            width: self.width,
            swap: self.swap,
            fill: self.fill,
            device: self.device,
            image_type: self.image_type,
            no_padding: self.no_padding,
            manual_mode: self.manual_mode,
            enable_ice: self.enable_ice,
        }
    }
}
