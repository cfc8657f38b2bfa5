// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! The informative CLI front end (spec §6). The front end itself is out
//! of scope (spec §1); this binary is a thin driver wiring the flag
//! surface onto [`lopper::Engine`], grounded on the derive-based `clap`
//! pattern this corpus already uses for its build tooling.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use lopper::config::EngineConfig;
use lopper::engine::Engine;
use lopper::error::LopError;
use lopper::format;
use lopper::lop::loader::LopFile;
use lopper::tree::Tree;

/// System Device Tree lop transformation engine.
#[derive(Parser, Debug)]
#[command(name = "lopper")]
#[command(about = "Applies lop directives to a system device tree")]
struct Cli {
    /// Increase verbosity; repeatable (-v, -vv, -vvv).
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    /// Target domain to operate against.
    #[arg(short = 't', long = "target")]
    target: Option<String>,

    /// Perform every transformation without writing output files.
    #[arg(long = "dryrun")]
    dryrun: bool,

    /// Assist module to load (repeatable).
    #[arg(short = 'a', long = "assist")]
    assist: Vec<String>,

    /// Additional assist search path (repeatable).
    #[arg(short = 'A', long = "assist-path")]
    assist_path: Vec<PathBuf>,

    /// Output file path.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Output directory relative outputs are resolved against.
    #[arg(short = 'O', long = "output-dir")]
    output_dir: Option<PathBuf>,

    /// Overwrite an existing output path.
    #[arg(short = 'f', long = "force")]
    force: bool,

    /// Promote warnings to fatal errors.
    #[arg(long = "werror")]
    werror: bool,

    /// Keep intermediate files instead of removing them.
    #[arg(short = 'S', long = "save-temps")]
    save_temps: bool,

    /// Emit comments, symbolic phandle references, and annotated types.
    #[arg(long = "enhanced")]
    enhanced: bool,

    /// Relax structural checks that would otherwise fail fast.
    #[arg(long = "permissive")]
    permissive: bool,

    /// Run without interactive confirmation prompts.
    #[arg(long = "auto")]
    auto_run: bool,

    /// Translate via an embedded script: TYPE[:LOP].
    #[arg(short = 'x', long = "xlate")]
    xlate: Option<String>,

    /// The primary SDT file, followed by zero or more auxiliary files.
    inputs: Vec<PathBuf>,

    /// Arguments after `--` are the assist module name and its own
    /// arguments.
    #[arg(last = true)]
    assist_args: Vec<String>,
}

fn classify_is_lop_file(source: &str) -> bool {
    source
        .lines()
        .any(|line| line.contains("system-device-tree-v1,lop"))
}

fn load_source(path: &PathBuf) -> Result<Tree, LopError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => {
            let text = std::fs::read_to_string(path)?;
            format::yaml::parse(&text)
        }
        Some("dtb") => format::dtb::read(path),
        Some("dts") => Err(LopError::CompileFailure(format!(
            "'.dts' ingestion requires an external dtc/cpp invocation, not bundled in this build: {}",
            path.display()
        ))),
        _ => Err(LopError::ParseFailure(format!(
            "unrecognized input extension: {}",
            path.display()
        ))),
    }
}

fn run(cli: Cli) -> Result<(), LopError> {
    let config = EngineConfig {
        verbosity: cli.verbose,
        dryrun: cli.dryrun,
        force: cli.force,
        werror: cli.werror,
        save_temps: cli.save_temps,
        enhanced: cli.enhanced,
        permissive: cli.permissive,
        auto_run: cli.auto_run,
        output_dir: cli.output_dir.clone(),
    };

    let (primary, auxiliary) = cli
        .inputs
        .split_first()
        .ok_or_else(|| LopError::MissingInput(PathBuf::from("<none given>")))?;

    let mut main_tree = load_source(primary)?;
    let mut lop_files = Vec::new();

    for path in auxiliary {
        let is_dtb = path.extension().and_then(|e| e.to_str()) == Some("dtb");
        let text = std::fs::read_to_string(path).unwrap_or_default();
        let tree = load_source(path)?;
        if is_dtb || classify_is_lop_file(&text) {
            lop_files.push(LopFile::from_tree(tree));
        } else {
            format::yaml::merge_into(&mut main_tree, &tree)?;
        }
    }

    let mut engine = Engine::new(main_tree, config);

    if let Some(target) = &cli.target {
        info!("target domain: {}", target);
    }
    for path in &cli.assist {
        info!("requested assist module: {}", path);
    }
    for path in &cli.assist_path {
        info!("assist search path: {}", path.display());
    }
    if let Some(xlate) = &cli.xlate {
        info!("xlate requested: {}", xlate);
    }
    if !cli.assist_args.is_empty() {
        info!("assist module arguments: {:?}", cli.assist_args);
    }

    info!("running {} lop file(s) against {}", lop_files.len(), primary.display());
    engine.run(lop_files)?;

    if let Some(out) = cli.output {
        let tree = engine.main().clone();
        format::write(&mut engine, &tree, &out)?;
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut builder = env_logger::Builder::new();
    builder.filter_level(match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    });
    builder.init();

    match run(cli) {
        Ok(()) => ExitCode::from(0),
        Err(LopError::MissingInput(_)) | Err(LopError::ParseFailure(_)) => {
            error!("usage/runtime failure");
            ExitCode::from(1)
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::from(2)
        }
    }
}
