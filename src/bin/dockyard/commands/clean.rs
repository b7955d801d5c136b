//! `dockyard clean` command

use anyhow::Result;

use crate::cli::CleanArgs;
use dockyard::ops::{clean, Project, ProjectOverrides};
use dockyard::util::fs::relative_path;
use dockyard::util::GlobalContext;

pub fn execute(args: CleanArgs, ctx: &GlobalContext) -> Result<()> {
    let overrides = ProjectOverrides {
        build_dir: args.build_dir,
        output: args.output,
        ..Default::default()
    };
    let project = Project::load(ctx, &overrides)?;

    let summary = clean(&project.root, &project.options.build_root, &project.output)?;
    if summary.removed.is_empty() {
        eprintln!("     Nothing to clean");
    }
    for path in &summary.removed {
        eprintln!("     Removed {}", relative_path(ctx.cwd(), path).display());
    }

    Ok(())
}
