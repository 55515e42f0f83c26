//! Build automation tasks for the netpool workspace.
//!
//! Run with `cargo xtask <command>`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use xshell::{Shell, cmd};

#[derive(Parser)]
#[command(name = "xtask", about = "Build automation for netpool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all checks (format, lint, test)
    Ci,
    /// Run cargo fmt --check
    Fmt,
    /// Run clippy with all features
    Clippy,
    /// Run all tests
    Test,
    /// Run the pool property tests with many more cases
    Props {
        /// Number of proptest cases
        #[arg(long, default_value_t = 2048)]
        cases: u32,
    },
    /// Fuzz endpoint parsing (requires nightly and cargo-fuzz)
    Fuzz {
        /// Maximum fuzzing time in seconds
        #[arg(long, default_value_t = 60)]
        seconds: u32,
    },
    /// Run cargo-deny checks
    Deny,
    /// Generate documentation
    Doc,
    /// Clean build artifacts
    Clean,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;

    // Change to workspace root
    let workspace_root = workspace_root()?;
    sh.change_dir(&workspace_root);

    match cli.command {
        Command::Ci => {
            println!("Running CI checks...");
            fmt(&sh)?;
            clippy(&sh)?;
            test(&sh)?;
            println!("All CI checks passed!");
        }
        Command::Fmt => fmt(&sh)?,
        Command::Clippy => clippy(&sh)?,
        Command::Test => test(&sh)?,
        Command::Props { cases } => props(&sh, cases)?,
        Command::Fuzz { seconds } => fuzz(&sh, seconds)?,
        Command::Deny => deny(&sh)?,
        Command::Doc => doc(&sh)?,
        Command::Clean => clean(&sh)?,
    }

    Ok(())
}

fn workspace_root() -> Result<PathBuf> {
    let output = std::process::Command::new("cargo")
        .args(["locate-project", "--workspace", "--message-format=plain"])
        .output()
        .context("failed to run cargo locate-project")?;

    let path = String::from_utf8(output.stdout)
        .context("invalid UTF-8 in cargo output")?
        .trim()
        .to_string();

    Ok(PathBuf::from(path)
        .parent()
        .context("failed to get workspace root")?
        .to_path_buf())
}

fn fmt(sh: &Shell) -> Result<()> {
    println!("Checking formatting...");
    cmd!(sh, "cargo fmt --all -- --check").run()?;
    println!("Formatting check passed.");
    Ok(())
}

fn clippy(sh: &Shell) -> Result<()> {
    println!("Running clippy...");
    cmd!(
        sh,
        "cargo clippy --workspace --all-features --all-targets -- -D warnings"
    )
    .run()?;
    println!("Clippy check passed.");
    Ok(())
}

fn test(sh: &Shell) -> Result<()> {
    println!("Running tests...");
    cmd!(sh, "cargo test --workspace --all-features").run()?;
    println!("All tests passed.");
    Ok(())
}

fn props(sh: &Shell, cases: u32) -> Result<()> {
    println!("Running property tests with {cases} cases...");
    let _env = sh.push_env("PROPTEST_CASES", cases.to_string());
    cmd!(sh, "cargo test -p netpool-testing --test membership_props --release").run()?;
    println!("Property tests passed.");
    Ok(())
}

fn fuzz(sh: &Shell, seconds: u32) -> Result<()> {
    println!("Fuzzing endpoint parsing for {seconds}s...");
    let _dir = sh.push_dir("fuzz");
    let max_time = format!("-max_total_time={seconds}");
    cmd!(sh, "cargo +nightly fuzz run parse_endpoint -- {max_time}").run()?;
    Ok(())
}

fn deny(sh: &Shell) -> Result<()> {
    println!("Running cargo-deny...");
    cmd!(sh, "cargo deny check").run()?;
    println!("Cargo-deny check passed.");
    Ok(())
}

fn doc(sh: &Shell) -> Result<()> {
    println!("Generating documentation...");
    cmd!(sh, "cargo doc --workspace --all-features --no-deps").run()?;
    println!("Documentation generated.");
    Ok(())
}

fn clean(sh: &Shell) -> Result<()> {
    println!("Cleaning build artifacts...");
    cmd!(sh, "cargo clean").run()?;
    println!("Clean complete.");
    Ok(())
}
