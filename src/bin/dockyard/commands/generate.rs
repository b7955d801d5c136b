//! `dockyard generate` command

use anyhow::Result;

use crate::cli::GenerateArgs;
use dockyard::ops::{generate, render, Project};
use dockyard::util::fs::relative_path;
use dockyard::util::GlobalContext;

pub fn execute(args: GenerateArgs, ctx: &GlobalContext) -> Result<()> {
    let project = Project::load(ctx, &args.project.overrides(args.output.clone()))?;
    let targets = project.targets()?;

    if args.stdout {
        let text = render(&targets, &project.profile, &project.bindings, &project.options)?;
        print!("{}", text);
        return Ok(());
    }

    let summary = generate(
        &targets,
        &project.profile,
        &project.bindings,
        &project.output,
        &project.options,
    )?;

    eprintln!(
        "   Generated {} ({} targets, {} build steps, {} {})",
        relative_path(ctx.cwd(), &summary.output).display(),
        summary.targets,
        summary.steps,
        project.profile.platform,
        project.options.build_type
    );

    Ok(())
}
