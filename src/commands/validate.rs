//! `hostconf validate` - check a resource file without touching the host

use anyhow::{Result, bail};
use declarative::ResourceMap;
use std::collections::BTreeMap;

use crate::Context;
use crate::cli::ConfigArgs;
use crate::config;
use crate::ui;

pub fn run(ctx: &Context, args: &ConfigArgs) -> Result<()> {
    let map = config::load(&args.config)?;

    let problems = map.check_references();
    for problem in &problems {
        ui::warn(&problem.to_string());
    }
    if !problems.is_empty() {
        bail!(
            "{} in {}",
            ui::plural(problems.len(), "problem"),
            args.config.display()
        );
    }

    if !ctx.quiet {
        ui::success(&format!(
            "{} is valid ({})",
            args.config.display(),
            ui::plural(map.len(), "resource")
        ));
        for (kind, count) in count_by_kind(&map) {
            ui::kv(kind, &count.to_string());
        }
        if ctx.verbose > 0 {
            for resource in &map {
                ui::dim(&format!("{}: {}", resource.identity(), resource.description()));
            }
        }
    }
    Ok(())
}

/// Number of declared resources of each kind
fn count_by_kind(map: &ResourceMap) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for resource in map {
        *counts.entry(resource.kind()).or_default() += 1;
    }
    counts
}
