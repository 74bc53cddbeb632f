//! `hostconf apply` - converge the host toward a resource file

use anyhow::{Context as AnyhowContext, Result};
use declarative::{ApplyContext, ErrorCategory, SystemAccounts};

use crate::Context;
use crate::backend::{Apt, Systemctl};
use crate::cli::ConfigArgs;
use crate::config;
use crate::progress::ConsoleProgress;
use crate::ui;

pub fn run(ctx: &Context, args: &ConfigArgs) -> Result<()> {
    let map = config::load(&args.config)?;
    if map.is_empty() {
        if !ctx.quiet {
            ui::info("No resources declared");
        }
        return Ok(());
    }

    if !ctx.quiet {
        ui::header(&format!(
            "Applying {} from {}",
            ui::plural(map.len(), "resource"),
            args.config.display()
        ));
    }

    let packages = Apt::default();
    let services = Systemctl::default();
    let apply_ctx = ApplyContext::new(&packages, &services, &SystemAccounts);
    let mut progress = ConsoleProgress::new(ctx.quiet, ctx.verbose > 0);

    declarative::reconcile(&map, &apply_ctx, &mut progress)
        .inspect_err(|e| {
            if e.category() == ErrorCategory::Validation && !ctx.quiet {
                ui::warn("Run `hostconf validate` to list every problem in the file");
            }
        })
        .with_context(|| format!("Could not apply {}", args.config.display()))?;
    Ok(())
}
