use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;

use crate::prelude::*;
use crate::source::{DEFAULT_PROC_ROOT, StatusSource};
use crate::{ParsePolicy, Pid, Render, RenderOptions, SnapshotBuilder, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "pstree",
    about = "Display the running processes as a tree",
    disable_version_flag = true
)]
pub struct Cli {
    /// Show the pid of each process after its name
    #[arg(short = 'p', long)]
    pub show_pids: bool,

    /// Sort sibling processes by pid instead of listing order
    #[arg(short = 'n', long)]
    pub numeric_sort: bool,

    /// Print version information and exit
    #[arg(short = 'v', long, visible_short_alias = 'V')]
    pub version: bool,

    /// What to do with a status record that cannot be parsed
    #[arg(long, value_enum, default_value_t = ParsePolicy::Abort)]
    pub on_parse_error: ParsePolicy,

    /// The procfs mount to read processes from
    #[arg(long, env = "PSTREE_PROC_ROOT", hide = true, default_value = DEFAULT_PROC_ROOT)]
    pub proc_root: PathBuf,

    /// Only show the tree rooted at this pid
    pub pid: Option<Pid>,
}

impl Cli {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            show_pids: self.show_pids,
            numeric_sort: self.numeric_sort,
        }
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("pstree {VERSION}");
        return Ok(());
    }

    let stdout = BufWriter::new(io::stdout().lock());
    execute(&cli, &live_source(&cli)?, stdout)
}

#[cfg(target_os = "linux")]
fn live_source(cli: &Cli) -> Result<crate::source::ProcfsSource> {
    Ok(crate::source::ProcfsSource::new(&cli.proc_root))
}

#[cfg(not(target_os = "linux"))]
fn live_source(_cli: &Cli) -> Result<crate::source::StaticSource> {
    bail!("Reading the process list is only supported on Linux")
}

/// Snapshot `source`, resolve it and write the tree to `out`.
///
/// Lines are written as they are produced, so a failure halfway leaves the
/// lines already rendered in `out`.
pub fn execute<S, W>(cli: &Cli, source: &S, mut out: W) -> Result<()>
where
    S: StatusSource + ?Sized,
    W: Write,
{
    let snapshot = SnapshotBuilder::new(cli.on_parse_error)
        .build(source)
        .context("Failed to snapshot the running processes")?;
    let tree = snapshot.resolve();
    let options = cli.render_options();
    debug!("Rendering {} processes with {options:?}", tree.len());

    let lines = match cli.pid {
        Some(pid) => {
            let root = tree
                .position_of(pid)
                .with_context(|| format!("No process with pid {pid}"))?;
            Render::new(&tree, root, options)
        }
        None => {
            for index in tree.detached() {
                let record = &tree.records()[index];
                warn!(
                    "Process {} ({}) is part of a parent cycle and is not shown",
                    record.id, record.name
                );
            }
            Render::forest(&tree, options)
        }
    };

    let mut inconsistencies = 0;
    for line in lines {
        match line {
            Ok(line) => writeln!(out, "{line}")?,
            Err(err) => {
                error!("{err}");
                inconsistencies += 1;
            }
        }
    }
    out.flush()?;

    if inconsistencies > 0 {
        bail!("The process tree is inconsistent, {inconsistencies} subtree(s) were skipped");
    }
    Ok(())
}
