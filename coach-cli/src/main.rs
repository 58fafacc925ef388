use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use coach_core::{Goal, OptimizeRequest, Optimizer, SolverConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod config;
mod narrate;
mod report;
mod request;
mod state;

use narrate::{PlanContext, PlanNarrator, TemplateNarrator};

#[derive(Parser, Debug)]
#[command(
    name = "coach",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("COACH_BUILD_SHA"), ")"),
    about = "Pick the remediation actions that best serve a financial goal"
)]
struct Cli {
    /// Config file (default: ~/.coach/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Solve a request file and print the selection
    Optimize {
        /// JSON request: actions, goal, constraints, snapshot
        #[arg(long)]
        request: PathBuf,

        /// Override the goal in the request file
        #[arg(long)]
        goal: Option<Goal>,

        /// Seed for the stochastic solver
        #[arg(long)]
        seed: Option<u64>,

        /// Print JSON instead of the text report
        #[arg(long)]
        json: bool,

        /// Include the explainability report (default from `[output] explain`)
        #[arg(long, overrides_with = "no_explain")]
        explain: bool,

        /// Leave the explainability report out
        #[arg(long, overrides_with = "explain")]
        no_explain: bool,
    },

    /// Solve a request file and write a weekly plan (markdown)
    Plan {
        #[arg(long)]
        request: PathBuf,

        #[arg(long)]
        goal: Option<Goal>,

        #[arg(long)]
        seed: Option<u64>,

        /// Where to write the plan (default: ~/.coach/last_plan.md)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// List the supported goals
    Goals,

    /// Write a default config to ~/.coach/config.toml
    InitConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(cli.config.as_deref())?;
    init_logging(&cfg.logging.filter);

    match cli.command {
        Command::Optimize {
            request,
            goal,
            seed,
            json,
            explain,
            no_explain,
        } => {
            let req = request::apply_overrides(request::load_request(&request)?, goal);
            let optimizer = Optimizer::new(solver_config(&cfg.solver, seed));
            let json = json || cfg.output.json;
            let explain = toggle(explain, no_explain, cfg.output.explain);

            let (result, explanation) = if explain {
                let (r, e) = optimizer.solve_explained(&req)?;
                (r, Some(e))
            } else {
                (optimizer.solve(&req)?, None)
            };

            if json {
                println!("{}", report::render_json(req.goal, &result, explanation.as_ref())?);
            } else {
                print!("{}", report::render_text(req.goal, &result, explanation.as_ref())?);
            }
        }

        Command::Plan {
            request,
            goal,
            seed,
            out,
        } => {
            let req = request::apply_overrides(request::load_request(&request)?, goal);
            let narrator = TemplateNarrator {
                max_actions: cfg.output.plan_max_actions,
            };
            let plan = plan(&req, &solver_config(&cfg.solver, seed), &narrator)?;
            let path = match out {
                Some(p) => p,
                None => state::last_plan_path()?,
            };
            write_plan(&path, &plan)?;
            print!("{plan}");
            eprintln!("Wrote {}", path.display());
        }

        Command::Goals => {
            for goal in Goal::ALL {
                println!("{:<22} {}", goal.as_slug(), goal.rationale());
            }
        }

        Command::InitConfig => {
            config::init_config()?;
        }
    }

    Ok(())
}

/// `COACH_LOG` wins over the config file; logs go to stderr so stdout stays parseable.
fn init_logging(config_filter: &str) {
    let filter =
        EnvFilter::try_from_env("COACH_LOG").unwrap_or_else(|_| EnvFilter::new(config_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Resolve a `--flag` / `--no-flag` pair against the config default.
fn toggle(on: bool, off: bool, default: bool) -> bool {
    if on {
        true
    } else if off {
        false
    } else {
        default
    }
}

fn solver_config(base: &SolverConfig, seed: Option<u64>) -> SolverConfig {
    match seed {
        Some(seed) => base.clone().with_seed(seed),
        None => base.clone(),
    }
}

fn plan(
    req: &OptimizeRequest,
    solver: &SolverConfig,
    narrator: &dyn PlanNarrator,
) -> Result<String> {
    let (result, explanation) = Optimizer::new(solver.clone()).solve_explained(req)?;
    let ctx = PlanContext {
        request: req,
        result: &result,
        explanation: &explanation,
        week_of: narrate::week_start(Local::now().date_naive()),
    };
    narrator.narrate(&ctx)
}

fn write_plan(path: &Path, plan: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(path, plan).with_context(|| format!("write {}", path.display()))
}
