//! Picaso LCD Control Tool
//!
//! CLI for driving a Picaso serial display, one command per invocation.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use picaso_lcd::color::parse_hex_color;
use picaso_lcd::{Font, LcdDevice, Orientation};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use config::Config;

#[derive(Parser)]
#[command(name = "picasoctl")]
#[command(about = "Control tool for Picaso serial LCD modules")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial port, overrides the configuration file
    #[arg(long)]
    port: Option<String>,

    /// Baud rate, overrides the configuration file
    #[arg(long)]
    baud: Option<u32>,

    /// Read timeout in milliseconds, overrides the configuration file
    #[arg(long)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clear the screen
    Clear,
    /// Set a single pixel
    Pixel {
        x: u16,
        y: u16,
        /// Color in hex format (e.g., #FF0000 for red)
        #[arg(long, default_value = "#FFFFFF", value_parser = parse_color)]
        color: u16,
    },
    /// Draw a rectangle from two corners
    Rect {
        x1: u16,
        y1: u16,
        x2: u16,
        y2: u16,
        #[arg(long, default_value = "#FFFFFF", value_parser = parse_color)]
        color: u16,
        #[arg(long)]
        filled: bool,
    },
    /// Draw a line
    Line {
        x1: u16,
        y1: u16,
        x2: u16,
        y2: u16,
        #[arg(long, default_value = "#FFFFFF", value_parser = parse_color)]
        color: u16,
    },
    /// Draw a circle
    Circle {
        x: u16,
        y: u16,
        radius: u16,
        #[arg(long, default_value = "#FFFFFF", value_parser = parse_color)]
        color: u16,
        #[arg(long)]
        filled: bool,
    },
    /// Draw an ellipse
    Ellipse {
        x: u16,
        y: u16,
        x_radius: u16,
        y_radius: u16,
        #[arg(long, default_value = "#FFFFFF", value_parser = parse_color)]
        color: u16,
        #[arg(long)]
        filled: bool,
    },
    /// Draw a triangle from three x,y vertices
    Triangle {
        #[arg(num_args = 3, value_parser = parse_vertex)]
        vertices: Vec<(u16, u16)>,
        #[arg(long, default_value = "#FFFFFF", value_parser = parse_color)]
        color: u16,
        #[arg(long)]
        filled: bool,
    },
    /// Draw a polyline through x,y vertices
    Polyline {
        #[arg(required = true, value_parser = parse_vertex)]
        vertices: Vec<(u16, u16)>,
        #[arg(long, default_value = "#FFFFFF", value_parser = parse_color)]
        color: u16,
        /// Join the last vertex to the first
        #[arg(long)]
        closed: bool,
        /// Fill the shape (implies --closed)
        #[arg(long)]
        filled: bool,
    },
    /// Set the contrast
    Contrast { value: u16 },
    /// Turn the display on (restore contrast)
    On,
    /// Turn the display off (contrast 0)
    Off,
    /// Set display orientation
    Orientation {
        /// Orientation: landscape, landscape-reverse, portrait, portrait-reverse
        orientation: Orientation,
    },
    /// Show the display resolution
    Size,
    /// Select the text font
    Font {
        /// Font: system, medium, default, or a font number
        #[arg(value_parser = parse_font)]
        font: Font,
    },
    /// Set the text width and height multiplier
    FontSize { size: u16 },
    /// Set the text color
    TextColor {
        #[arg(value_parser = parse_color)]
        color: u16,
    },
    /// Set the background color
    BgColor {
        #[arg(value_parser = parse_color)]
        color: u16,
    },
    /// Move the text cursor
    Move { line: u16, column: u16 },
    /// Print a single character at the cursor
    Putc { character: char },
    /// Print a string at the cursor
    Puts { text: String },
    /// Configuration file commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write a configuration file with default values
    Init {
        /// Output file path
        path: PathBuf,
    },
    /// Show the effective configuration
    Show,
}

fn parse_color(s: &str) -> std::result::Result<u16, String> {
    parse_hex_color(s).map_err(|e| e.to_string())
}

fn parse_font(s: &str) -> std::result::Result<Font, String> {
    match s.to_lowercase().as_str() {
        "system" => Ok(Font::System),
        "medium" => Ok(Font::Medium),
        "default" => Ok(Font::Default),
        other => other
            .parse::<u16>()
            .map(Font::from)
            .map_err(|_| format!("invalid font {s:?}: use system, medium, default or a number")),
    }
}

fn parse_vertex(s: &str) -> std::result::Result<(u16, u16), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got {s:?}"))?;
    let x = x.trim().parse().map_err(|e| format!("invalid x in {s:?}: {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("invalid y in {s:?}: {e}"))?;
    Ok((x, y))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(port) = cli.port {
        config.serial.port = port;
    }
    if let Some(baud) = cli.baud {
        config.serial.baud = baud;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.serial.timeout_ms = timeout_ms;
    }
    debug!("Effective configuration: {:?}", config);

    let command = match cli.command {
        Commands::Config { action } => return handle_config(action, &config),
        command => command,
    };

    let lcd = LcdDevice::open(
        &config.serial.port,
        config.serial.baud,
        Duration::from_millis(config.serial.timeout_ms),
    )
    .with_context(|| format!("Failed to open display on {}", config.serial.port))?
    .initial_contrast(config.display.contrast);

    handle_command(command, &lcd)
}

fn handle_config(action: ConfigCommands, config: &Config) -> Result<()> {
    match action {
        ConfigCommands::Init { path } => {
            Config::default().save(&path)?;
            println!("Configuration written to: {}", path.display());
        }
        ConfigCommands::Show => {
            println!("Serial:");
            println!("  Port: {}", config.serial.port);
            println!("  Baud: {}", config.serial.baud);
            println!("  Timeout: {}ms", config.serial.timeout_ms);
            println!("Display:");
            println!("  Contrast: {}", config.display.contrast);
        }
    }

    Ok(())
}

fn handle_command<P: Read + Write>(command: Commands, lcd: &LcdDevice<P>) -> Result<()> {
    match command {
        Commands::Clear => lcd.clear_screen()?,
        Commands::Pixel { x, y, color } => lcd.put_pixel(x, y, color)?,
        Commands::Rect {
            x1,
            y1,
            x2,
            y2,
            color,
            filled,
        } => lcd.draw_rectangle(x1, y1, x2, y2, color, filled)?,
        Commands::Line {
            x1,
            y1,
            x2,
            y2,
            color,
        } => lcd.draw_line(x1, y1, x2, y2, color)?,
        Commands::Circle {
            x,
            y,
            radius,
            color,
            filled,
        } => lcd.draw_circle(x, y, radius, color, filled)?,
        Commands::Ellipse {
            x,
            y,
            x_radius,
            y_radius,
            color,
            filled,
        } => lcd.draw_ellipse(x, y, x_radius, y_radius, color, filled)?,
        Commands::Triangle {
            vertices,
            color,
            filled,
        } => {
            let vertices: [(u16, u16); 3] = vertices
                .try_into()
                .map_err(|_| anyhow::anyhow!("A triangle needs exactly three vertices"))?;
            lcd.draw_triangle(vertices, color, filled)?
        }
        Commands::Polyline {
            vertices,
            color,
            closed,
            filled,
        } => lcd.draw_polyline(&vertices, color, closed, filled)?,
        Commands::Contrast { value } => {
            let previous = lcd.set_contrast(value)?;
            println!("Contrast set to: {} (was {})", value, previous);
        }
        Commands::On => {
            lcd.on()?;
            println!("Display on (contrast {})", lcd.contrast());
        }
        Commands::Off => {
            lcd.off()?;
            println!("Display off");
        }
        Commands::Orientation { orientation } => {
            let previous = lcd.set_orientation(orientation)?;
            println!("Orientation set to: {} (was {})", orientation, previous);
        }
        Commands::Size => {
            let (width, height) = lcd.display_size()?;
            println!("Display size: {}x{}", width, height);
        }
        Commands::Font { font } => {
            let previous = lcd.text().set_font(font)?;
            println!("Font set to: {} (was {})", font, previous);
        }
        Commands::FontSize { size } => {
            let (width, height) = lcd.text().set_font_size(size)?;
            println!("Font size set to: {} (was {}x{})", size, width, height);
        }
        Commands::TextColor { color } => {
            let previous = lcd.text().set_text_color(color)?;
            println!("Text color set to: 0x{:04X} (was 0x{:04X})", color, previous);
        }
        Commands::BgColor { color } => {
            let previous = lcd.set_background_color(color)?;
            println!(
                "Background color set to: 0x{:04X} (was 0x{:04X})",
                color, previous
            );
        }
        Commands::Move { line, column } => lcd.text().move_cursor(line, column)?,
        Commands::Putc { character } => lcd.text().put_character(character)?,
        Commands::Puts { text } => lcd.text().put_string(&text)?,
        Commands::Config { .. } => anyhow::bail!("Configuration commands do not use the display"),
    }

    Ok(())
}
