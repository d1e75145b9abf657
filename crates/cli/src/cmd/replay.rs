//! Replay a call schedule against the debounced API call

use crate::util::{self, Overrides};
use anyhow::Result;
use cli_lib::{parse_schedule, ReplayPlan};
use owo_colors::OwoColorize;
use std::path::Path;

pub async fn run(config: Option<&Path>, overrides: Overrides, schedule: &str) -> Result<()> {
    let options = util::resolve_options(config, overrides)?;
    let offsets = parse_schedule(schedule)?;

    util::print_options(&options);
    println!(
        "{} {}\n",
        "Schedule:".bold(),
        offsets.iter().map(|o| format!("{}ms", o)).collect::<Vec<_>>().join(", ")
    );

    let plan = ReplayPlan { options, offsets };
    let invocations = plan
        .run(|inv| {
            println!(
                "{} API called with query: {}",
                util::format_offset(inv.at).dimmed(),
                inv.query
            );
        })
        .await?;

    println!(
        "\n{} {} calls collapsed into {} invocations",
        "✓".green(),
        plan.offsets.len(),
        invocations.len()
    );
    Ok(())
}
