use std::{path::PathBuf, str::FromStr, time::Duration};

use anyhow::Context;
use clap::Parser;
use qrlive::{ECLevel, Mode, PipelineConfig, QRError, Request, Version};

/// An option that can be fixed or left to the encoder with `auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Setting<T>(pub Option<T>);

impl<T: FromStr<Err = QRError>> FromStr for Setting<T> {
    type Err = QRError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(Self(None));
        }
        s.parse().map(|v| Self(Some(v)))
    }
}

/// Runtime configuration for the `qrlive` binary.
///
/// Every flag can also be set through the environment or a `.env` file.
#[derive(Parser, Debug, Clone)]
#[command(name = "qrlive", version, about = "Regenerates a QR code as you edit its text")]
pub struct CliArgs {
    /// Text encoded at startup.
    ///
    /// Environment variable: `QRLIVE_TEXT`
    #[arg(long, env = "QRLIVE_TEXT", default_value_t = String::from("Hello, world!"))]
    pub text: String,

    /// Error correction level: L, M, Q, H or auto.
    ///
    /// Environment variable: `QRLIVE_EC_LEVEL`
    #[arg(long, env = "QRLIVE_EC_LEVEL", default_value = "auto")]
    pub ec_level: Setting<ECLevel>,

    /// Symbol version between 1 and 40, 0 picks the smallest that fits.
    ///
    /// Environment variable: `QRLIVE_VERSION`
    #[arg(long = "symbol-version", env = "QRLIVE_VERSION", default_value_t = 0)]
    pub symbol_version: u16,

    /// Encoding mode: numeric, alphanumeric, byte, kanji or auto.
    ///
    /// Environment variable: `QRLIVE_MODE`
    #[arg(long, env = "QRLIVE_MODE", default_value = "auto")]
    pub mode: Setting<Mode>,

    /// Pixels per module.
    ///
    /// Environment variable: `QRLIVE_SCALE`
    #[arg(long, env = "QRLIVE_SCALE", default_value_t = qrlive::request::DEFAULT_SCALE)]
    pub scale: u32,

    /// Minimum milliseconds between two generations, 0 disables throttling.
    ///
    /// Environment variable: `QRLIVE_THROTTLE_MS`
    #[arg(long, env = "QRLIVE_THROTTLE_MS", default_value_t = 0)]
    pub throttle_ms: u64,

    /// Generate the startup text once, print it and exit.
    #[arg(long, default_value_t = false)]
    pub once: bool,

    /// PNG file written by `--once` on success.
    #[arg(short, long, requires = "once")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub request: Request,
    pub pipeline: PipelineConfig,
    pub once: bool,
    pub output: Option<PathBuf>,
}

impl TryFrom<CliArgs> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let version = Version::from_number(args.symbol_version).context("Invalid symbol version")?;
        let request = Request::builder(args.text)
            .options(args.ec_level.0, version, args.mode.0)
            .scale(args.scale)
            .build()
            .context("Invalid scale")?;

        let mut pipeline = PipelineConfig::default();
        if args.throttle_ms > 0 {
            pipeline = pipeline.throttle(Duration::from_millis(args.throttle_ms));
        }

        Ok(Self { request, pipeline, once: args.once, output: args.output })
    }
}

// Interactive commands
//------------------------------------------------------------------------------

pub const HELP: &str = "\
Type any line to encode it. Commands:
  :ec <L|M|Q|H|auto>        error correction level
  :version <1-40|0|auto>    symbol version
  :mode <numeric|alphanumeric|byte|kanji|auto>
  :scale <pixels>           pixels per module
  :save <path>              write the last image as PNG
  :help                     show this message
  :quit                     exit
Start a line with '::' to encode text beginning with ':'.";

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Text(String),
    EcLevel(Option<ECLevel>),
    Version(Option<Version>),
    Mode(Option<Mode>),
    Scale(u32),
    Save(PathBuf),
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        if let Some(text) = line.strip_prefix("::") {
            return Ok(Self::Text(format!(":{text}")));
        }
        let Some(cmd) = line.strip_prefix(':') else {
            return Ok(Self::Text(line.to_string()));
        };

        let (name, arg) = cmd.trim().split_once(char::is_whitespace).unwrap_or((cmd.trim(), ""));
        let arg = arg.trim();
        match name {
            "q" | "quit" | "exit" => Ok(Self::Quit),
            "h" | "help" => Ok(Self::Help),
            "ec" => arg
                .parse::<Setting<ECLevel>>()
                .map(|s| Self::EcLevel(s.0))
                .map_err(|e| e.to_string()),
            "mode" => {
                arg.parse::<Setting<Mode>>().map(|s| Self::Mode(s.0)).map_err(|e| e.to_string())
            }
            "version" | "v" => {
                if arg.eq_ignore_ascii_case("auto") {
                    return Ok(Self::Version(None));
                }
                let n = arg.parse::<u16>().map_err(|_| format!("Invalid version {arg:?}"))?;
                Version::from_number(n).map(Self::Version).map_err(|e| e.to_string())
            }
            "scale" | "s" => match arg.parse::<u32>() {
                Ok(n) if n > 0 => Ok(Self::Scale(n)),
                _ => Err(format!("Invalid scale {arg:?}, expected a positive number")),
            },
            "save" | "w" if arg.is_empty() => Err(format!(":{name} needs a file path")),
            "save" | "w" => Ok(Self::Save(PathBuf::from(arg))),
            _ => Err(format!("Unknown command :{name}, try :help")),
        }
    }
}
