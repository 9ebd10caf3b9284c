//! `xcplist` CLI: read, write and normalize property lists from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Dump a project file as pretty-printed JSON
//! xcplist read MyApp.xcodeproj/project.pbxproj
//!
//! # Write JSON (stdin or -i) to a plist
//! echo '{"archiveVersion":"1"}' | xcplist write Info.plist
//!
//! # Rewrite an ASCII or XML plist in Xcode's canonical XML layout
//! xcplist touch project.pbxproj
//!
//! # Skip the native backend and always use the portable encoder
//! xcplist --pure touch project.pbxproj -o normalized.pbxproj
//! ```

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use xcplist::{DefaultBackend, Dictionary, PlistValue, PlistWriter, Strategy};

#[derive(Parser)]
#[command(
    name = "xcplist",
    version,
    about = "Read, write and normalize Xcode property lists"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Never try the native backend; always use the portable XML encoder
    #[arg(long, global = true)]
    pure: bool,

    /// Log backend selection and fallbacks (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a plist (XML or ASCII) as JSON
    Read {
        /// Plist file to read
        path: PathBuf,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write a JSON object as an XML plist
    Write {
        /// Destination plist file
        path: PathBuf,
        /// Input JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Rewrite a plist in canonical XML form
    Touch {
        /// Plist file to normalize
        path: PathBuf,
        /// Output file (rewrites PATH in place if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli.command {
        Commands::Read { path, output } => {
            let dict = xcplist::read_plist(&path)
                .with_context(|| format!("Failed to read plist: {}", path.display()))?;
            let mut json = serde_json::to_string_pretty(&PlistValue::Dictionary(dict))
                .context("Failed to serialize plist as JSON")?;
            json.push('\n');
            write_output(output.as_deref(), &json)?;
        }
        Commands::Write { path, input } => {
            let json = read_input(input.as_deref())?;
            let value: serde_json::Value =
                serde_json::from_str(&json).context("Input is not valid JSON")?;
            let dict = xcplist::coerce_root(&value).context("Input cannot be stored as a plist")?;
            write_plist(&dict, &path, cli.pure)?;
        }
        Commands::Touch { path, output } => {
            let dict = xcplist::read_plist(&path)
                .with_context(|| format!("Failed to read plist: {}", path.display()))?;
            let target = output.unwrap_or(path);
            write_plist(&dict, &target, cli.pure)?;
        }
    }

    Ok(())
}

fn write_plist(dict: &Dictionary, path: &Path, pure: bool) -> Result<()> {
    let written = if pure {
        PlistWriter::pure().write_dictionary(dict, path)
    } else {
        PlistWriter::<DefaultBackend>::default().write_dictionary(dict, path)
    };
    let strategy = written.with_context(|| format!("Failed to write plist: {}", path.display()))?;

    log::info!(
        "wrote {} ({})",
        path.display(),
        match strategy {
            Strategy::Native => "native",
            Strategy::Pure => "xml",
        }
    );
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path.display()))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
