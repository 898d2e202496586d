//! Clipper - diode clipper and JFET stage processor
//!
//! Streams raw audio through a nonlinear pedal stage, or prints accuracy
//! reports for the solvers.
//!
//! # Usage
//!
//! ```bash
//! ffmpeg -i input.wav -f f32le -ac 1 -ar 48000 - | clipper diode -r 4.7k | ffmpeg -f f32le -ac 1 -ar 48000 -i - output.wav
//! clipper report diode --amplitude 2
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clipper_core::{
    analysis,
    audio::process_audio,
    config::{self, JfetConfig, StageOptions},
    error::Result,
    models::{self, ModelLibrary},
    DiodeParams, DiodeStage, Formulation, JfetParams, JfetSolver, JfetStage, Precision, Real,
    DEFAULT_SAMPLE_RATE, DEFAULT_TEMPERATURE_C,
};

/// Diode clipper and JFET stage processor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stream f32le audio through a diode clipper
    Diode(DiodeArgs),
    /// Stream f32le audio through a common-source JFET stage
    Jfet(JfetArgs),
    /// Print accuracy figures
    #[command(subcommand)]
    Report(ReportCommand),
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Compare diode formulations across load resistances
    Diode(DiodeReportArgs),
    /// Compare single and double precision JFET evaluation
    Jfet(JfetReportArgs),
}

/// Model selection shared by all subcommands.
#[derive(Args, Debug)]
struct ModelArgs {
    /// Device model name
    #[arg(short, long)]
    model: Option<String>,

    /// Additional SPICE model library file
    #[arg(long, value_name = "FILE")]
    models: Option<PathBuf>,
}

impl ModelArgs {
    fn library(&self) -> Result<ModelLibrary> {
        let mut library = models::builtin()?;
        if let Some(path) = &self.models {
            library.extend(models::parse_file(path)?);
        }
        Ok(library)
    }

    fn diode(&self) -> Result<DiodeParams<f64>> {
        let library = self.library()?;
        DiodeParams::from_model(library.require(self.model.as_deref().unwrap_or("1N4148"))?)
    }

    fn jfet(&self, circuit: &JfetCircuitArgs) -> Result<JfetParams<f64>> {
        let library = self.library()?;
        let card = library.require(self.model.as_deref().unwrap_or("J201"))?;
        let params = JfetParams::from_model(card, circuit.rd, circuit.rs, circuit.vdd)?;
        config::validate_jfet(&params)?;
        Ok(params)
    }
}

#[derive(Args, Debug)]
struct DiodeArgs {
    #[command(flatten)]
    model: ModelArgs,

    /// Series load resistance in ohm (accepts 4.7k, 1meg, ...)
    #[arg(short = 'r', long, default_value = "1k", value_parser = parse_quantity)]
    resistance: f64,

    /// Junction temperature in degrees Celsius
    #[arg(short, long, default_value_t = DEFAULT_TEMPERATURE_C)]
    temperature: f64,

    /// Closed-form solution to use
    #[arg(short, long, value_enum, default_value_t = Formulation::WrightOmega)]
    formulation: Formulation,

    /// Scale the output so that a 1 V input maps to 1 V
    #[arg(long)]
    normalize: bool,

    /// Float width used inside the stage
    #[arg(short, long, value_enum, default_value_t = Precision::Single)]
    precision: Precision,
}

/// External JFET circuit.
#[derive(Args, Debug)]
struct JfetCircuitArgs {
    /// External drain resistor in ohm
    #[arg(long, default_value = "4.4k", value_parser = parse_quantity)]
    rd: f64,

    /// External source resistor in ohm
    #[arg(long, default_value = "1k", value_parser = parse_quantity)]
    rs: f64,

    /// Supply voltage
    #[arg(long, default_value = "9", value_parser = parse_quantity)]
    vdd: f64,

    /// Skip the channel-length modulation refinement
    #[arg(long)]
    no_clm: bool,

    /// Newton steps per root candidate
    #[arg(long, default_value_t = clipper_core::solver::DEFAULT_NEWTON_STEPS)]
    newton_steps: usize,
}

impl JfetCircuitArgs {
    fn config(&self) -> JfetConfig {
        JfetConfig::new()
            .with_channel_length_modulation(!self.no_clm)
            .with_newton_steps(self.newton_steps)
    }
}

#[derive(Args, Debug)]
struct JfetArgs {
    #[command(flatten)]
    model: ModelArgs,

    #[command(flatten)]
    circuit: JfetCircuitArgs,

    /// Float width used inside the stage
    #[arg(short, long, value_enum, default_value_t = Precision::Single)]
    precision: Precision,
}

#[derive(Args, Debug)]
struct DiodeReportArgs {
    #[command(flatten)]
    model: ModelArgs,

    /// Peak input voltage of the sweep
    #[arg(short, long, default_value_t = 2.0)]
    amplitude: f64,

    /// Number of sweep points
    #[arg(long, default_value_t = 4001)]
    points: usize,

    /// Junction temperature in degrees Celsius
    #[arg(short, long, default_value_t = DEFAULT_TEMPERATURE_C)]
    temperature: f64,
}

#[derive(Args, Debug)]
struct JfetReportArgs {
    #[command(flatten)]
    model: ModelArgs,

    #[command(flatten)]
    circuit: JfetCircuitArgs,

    /// Sine amplitude in volts
    #[arg(short, long, default_value_t = 1.3)]
    amplitude: f64,

    /// Sine frequency in Hz
    #[arg(short, long, default_value_t = 20.0)]
    frequency: f64,

    /// Signal length in seconds
    #[arg(short, long, default_value_t = 0.1)]
    duration: f64,

    /// Sample rate in Hz
    #[arg(short, long, default_value_t = DEFAULT_SAMPLE_RATE)]
    sample_rate: f32,
}

fn parse_quantity(text: &str) -> std::result::Result<f64, String> {
    models::parse_value(text).ok_or_else(|| format!("'{}' is not a number", text))
}

fn run_diode<T: Real>(args: &DiodeArgs) -> Result<()> {
    let params: DiodeParams<T> = args.model.diode()?.cast();
    let options = StageOptions::new()
        .with_formulation(args.formulation)
        .with_normalize(args.normalize)
        .with_temperature(args.temperature);
    let mut stage = DiodeStage::new(params, args.resistance, options);
    process_audio(&mut stage)
}

fn run_jfet<T: Real>(args: &JfetArgs) -> Result<()> {
    let params = args.model.jfet(&args.circuit)?;
    let solver = JfetSolver::<T>::with_config(params.cast(), args.circuit.config());
    let mut stage = JfetStage::new(solver);
    process_audio(&mut stage)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Diode(args) => {
            config::validate_diode_circuit(args.resistance, args.temperature)?;
            match args.precision {
                Precision::Single => run_diode::<f32>(&args),
                Precision::Double => run_diode::<f64>(&args),
            }
        }
        Command::Jfet(args) => match args.precision {
            Precision::Single => run_jfet::<f32>(&args),
            Precision::Double => run_jfet::<f64>(&args),
        },
        Command::Report(ReportCommand::Diode(args)) => {
            config::validate_positive("amplitude", args.amplitude)?;
            let params = args.model.diode()?;
            let input = analysis::linspace(-args.amplitude, args.amplitude, args.points);
            let report = analysis::diode_report(
                &params,
                &analysis::DEFAULT_RESISTANCES,
                &input,
                args.temperature,
            );
            println!("{}", report);
            Ok(())
        }
        Command::Report(ReportCommand::Jfet(args)) => {
            let params = args.model.jfet(&args.circuit)?;
            let input = analysis::sine(
                args.amplitude,
                args.frequency,
                args.duration,
                f64::from(args.sample_rate),
            );
            let report = analysis::jfet_report(&params, args.circuit.config(), &input);
            println!("{}", report);
            Ok(())
        }
    }
}
