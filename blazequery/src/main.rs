use blazequery_lib::blaze_process::blaze_query;
use blazequery_lib::{Breakpoints, ConfigError, Options, OutputStyle, ResponsiveExpander};
use clap::Parser;
use log::info;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

const BLAZEQUERY_INTRO: &str = r#"
        ____  __                 ____
       / __ )/ /___ _____  ___  / __ \__  _____  _______  __
      / __  / / __ `/_  / / _ \/ / / / / / / _ \/ ___/ / / /
     / /_/ / / /_/ / / /_/  __/ /_/ / /_/ /  __/ /  / /_/ /
    /_____/_/\__,_/ /___/\___/\___\_\__,_/\___/_/   \__, /
                                                   /____/
    BlazeQuery - @responsive blocks, expanded per breakpoint.
"#;

#[derive(Parser)]
#[command(name = "BlazeQuery")]
#[command(about = "Expand @responsive blocks into per-breakpoint @media queries")]
struct Args {
    /// Input stylesheets.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// JSON options file with a "breakpoints" map.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Extra breakpoint, appended after the config file's ones.
    #[arg(short, long = "breakpoint", value_name = "NAME=QUERY")]
    breakpoints: Vec<String>,

    /// Write each result to <OUT_DIR>/<input file name> instead of stdout.
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Output style.
    #[arg(long, default_value = "pretty", value_parser = ["compact", "pretty", "minified"])]
    style: String,
}

fn main() {
    env_logger::init();
    eprintln!("{}", BLAZEQUERY_INTRO);

    // parse the args given in terminal
    let args: Args = Args::parse();

    let expander = match build_expander(&args) {
        Ok(expander) => expander,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let mut sources = Vec::with_capacity(args.inputs.len());
    for input in &args.inputs {
        match fs::read_to_string(input) {
            Ok(css) => sources.push(css),
            Err(e) => {
                eprintln!("Error reading CSS file {}: {}", input.display(), e);
                process::exit(1);
            }
        }
    }

    let style = match args.style.as_str() {
        "compact" => OutputStyle::Compact,
        "minified" => OutputStyle::Minified,
        _ => OutputStyle::Pretty,
    };
    let results = blaze_query::process_batch(&sources, &expander, style);

    let mut failed = false;
    for (input, result) in args.inputs.iter().zip(results) {
        match result {
            Ok(processed) => {
                for warning in &processed.report.warnings {
                    eprintln!(
                        "{}:{}: {} (\"{}\")",
                        input.display(),
                        warning.location,
                        warning.message,
                        warning.selector
                    );
                }
                if let Err(e) = emit(input, &processed.css, args.out_dir.as_deref()) {
                    eprintln!("Error writing output for {}: {}", input.display(), e);
                    failed = true;
                }
            }
            Err(e) => {
                eprintln!("{}: {}", input.display(), e);
                failed = true;
            }
        }
    }

    if failed {
        process::exit(1);
    }
}

fn build_expander(args: &Args) -> Result<ResponsiveExpander, ConfigError> {
    let mut options = match &args.config {
        Some(path) => Options::load(path)?,
        None => Options::default(),
    };

    if !args.breakpoints.is_empty() {
        let breakpoints = options.breakpoints.get_or_insert_with(Breakpoints::new);
        for pair in &args.breakpoints {
            let (name, query) = Breakpoints::parse_pair(pair)?;
            breakpoints.insert(name, query);
        }
    }

    ResponsiveExpander::new(options)
}

fn emit(input: &Path, css: &str, out_dir: Option<&Path>) -> std::io::Result<()> {
    match out_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let name = input.file_name().unwrap_or_else(|| OsStr::new("out.css"));
            let target = dir.join(name);
            fs::write(&target, css)?;
            info!("wrote {}", target.display());
        }
        None => {
            print!("{}", css);
            if !css.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}
