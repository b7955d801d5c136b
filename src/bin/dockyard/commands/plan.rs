//! `dockyard plan` command

use anyhow::{Context, Result};

use crate::cli::PlanArgs;
use dockyard::ops::{plan, Project};
use dockyard::util::GlobalContext;

pub fn execute(args: PlanArgs, ctx: &GlobalContext) -> Result<()> {
    let project = Project::load(ctx, &args.project.overrides(None))?;
    let targets = project.targets()?;

    let plan = plan(&targets, &project.profile, &project.bindings, &project.options)?;
    let json = serde_json::to_string_pretty(&plan).context("failed to serialize build plan")?;
    println!("{}", json);

    Ok(())
}
