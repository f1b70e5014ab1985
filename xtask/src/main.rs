use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for peerspace")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// fmt, clippy, tests and docs, in that order
    Check,
    /// cargo fmt --check
    Fmt,
    /// clippy with warnings denied
    Clippy,
    /// Workspace tests, including the input crate's winit feature
    Test,
    /// rustdoc for the workspace
    Doc,
    /// Rig integration timing
    Bench,
    /// Scripted CLI demo: a peer joins, moves and leaves
    Demo,
}

struct Step {
    label: &'static str,
    args: &'static [&'static str],
}

const FMT: Step = Step {
    label: "cargo fmt --check",
    args: &["fmt", "--all", "--", "--check"],
};
const CLIPPY: Step = Step {
    label: "cargo clippy",
    args: &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
};
const TEST: Step = Step {
    label: "cargo test",
    args: &["test", "--workspace"],
};
const TEST_WINIT: Step = Step {
    label: "cargo test (input/winit)",
    args: &["test", "-p", "peerspace-input", "--features", "winit"],
};
const DOC: Step = Step {
    label: "cargo doc",
    args: &["doc", "--workspace", "--no-deps"],
};
const BENCH: Step = Step {
    label: "rig bench",
    args: &["bench", "-p", "peerspace-rig", "--bench", "bench_rig_integrate"],
};
const DEMO: Step = Step {
    label: "peerspace-cli demo",
    args: &["run", "-p", "peerspace-cli", "--", "demo", "--frames", "6"],
};

const CHECK: &[Step] = &[FMT, CLIPPY, TEST, TEST_WINIT, DOC];
const TESTS: &[Step] = &[TEST, TEST_WINIT];

fn steps(command: Commands) -> &'static [Step] {
    match command {
        Commands::Check => CHECK,
        Commands::Fmt => std::slice::from_ref(&FMT),
        Commands::Clippy => std::slice::from_ref(&CLIPPY),
        Commands::Test => TESTS,
        Commands::Doc => std::slice::from_ref(&DOC),
        Commands::Bench => std::slice::from_ref(&BENCH),
        Commands::Demo => std::slice::from_ref(&DEMO),
    }
}

fn run(step: &Step) -> Result<()> {
    println!("==> {}", step.label);
    let status = Command::new("cargo").args(step.args).status()?;
    if !status.success() {
        bail!("{} failed ({status})", step.label);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    for step in steps(cli.command) {
        run(step)?;
    }
    Ok(())
}
