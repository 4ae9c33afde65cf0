//! IAM users and groups CLI
//!
//! Validates an inventory of IAM users and groups and prints the synthesized
//! resource plan, either as the typed plan or as Terraform JSON.
//!
//! # Environment Variables
//!
//! - `IAM_USER_GROUPS_ACCOUNT_ID`: account the entities are created in
//! - `IAM_USER_GROUPS_PARTITION`: partition, defaults to the caller's or `aws`
//! - `IAM_USER_GROUPS_PGP_KEY`: path of the operator public key file
//! - `RUST_LOG`: overrides the level chosen with `-v`

mod output;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand, ValueEnum};
use iam_user_groups_synthesis::render::terraform;
use iam_user_groups_synthesis::{
    validate, Inventory, MembershipCheck, PgpKey, PlanRequest, ProvisioningService,
    SynthesisError, SynthesisOptions,
};
use log::{debug, LevelFilter};

/// Synthesize IAM users, groups and their policies from a declarative inventory
#[derive(Parser, Debug)]
#[command(name = "iam-user-groups")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Synthesize the resource plan for an inventory
    Plan(PlanArgs),
    /// Validate an inventory without synthesizing
    Validate(ValidateArgs),
}

#[derive(Args, Debug)]
struct InventoryArgs {
    /// Inventory JSON file, or `-` for stdin (default: stdin when piped)
    #[arg(short, long, value_name = "PATH")]
    inventory: Option<PathBuf>,

    /// Operator public key file; required when any user requests credentials
    #[arg(long, env = "IAM_USER_GROUPS_PGP_KEY", value_name = "PATH")]
    pgp_key: Option<PathBuf>,

    /// Reject group members that are not enabled users of the inventory
    #[arg(long)]
    strict_membership: bool,
}

#[derive(Args, Debug)]
struct PlanArgs {
    #[command(flatten)]
    input: InventoryArgs,

    /// Account id; resolved from the current AWS credentials when omitted
    #[arg(long, env = "IAM_USER_GROUPS_ACCOUNT_ID")]
    account_id: Option<String>,

    /// Partition, e.g. `aws`, `aws-cn`, `aws-us-gov`
    #[arg(long, env = "IAM_USER_GROUPS_PARTITION")]
    partition: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Plan)]
    format: OutputFormat,

    /// Write the result to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    #[command(flatten)]
    input: InventoryArgs,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Typed resource plan
    Plan,
    /// Terraform JSON configuration
    Terraform,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Plan(args) => run_plan(args).await,
        Commands::Validate(args) => run_validate(&args),
    };

    if let Err(e) = result {
        output::error(&format!("{:#}", e));
        std::process::exit(exit_code(&e));
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// 2 for problems with the operator's input, 1 for everything else.
fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<SynthesisError>() {
        Some(e) if e.is_configuration() => 2,
        _ => 1,
    }
}

async fn run_plan(args: PlanArgs) -> Result<()> {
    let inventory = load_inventory(args.input.inventory.as_deref())?;
    let options = load_options(&args.input)?;

    let service = if args.account_id.is_some() {
        ProvisioningService::offline()
    } else {
        debug!("No account id given, resolving it from the current credentials");
        ProvisioningService::new()
            .await
            .context("Failed to initialize AWS clients")?
    };

    let request = PlanRequest {
        account_id: args.account_id,
        partition: args.partition,
        options,
    };
    let plan = service.plan(&inventory, request).await?;
    output::print_plan_summary(&plan);

    let rendered = match args.format {
        OutputFormat::Plan => {
            serde_json::to_string_pretty(&plan).context("Failed to serialize plan")?
        }
        OutputFormat::Terraform => terraform::render_string(&plan)?,
    };

    match args.output {
        Some(path) => {
            std::fs::write(&path, format!("{rendered}\n"))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            output::print_written(&path);
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

fn run_validate(args: &ValidateArgs) -> Result<()> {
    let inventory = load_inventory(args.input.inventory.as_deref())?;
    let options = load_options(&args.input)?;
    let report = validate(&inventory, &options)?;
    output::print_validation_report(&inventory, &report);
    Ok(())
}

fn load_inventory(path: Option<&Path>) -> Result<Inventory> {
    match path {
        Some(p) if p != Path::new("-") => {
            debug!("Reading inventory from {}", p.display());
            Ok(Inventory::from_path(p)?)
        }
        Some(_) => read_stdin(),
        None if atty::isnt(atty::Stream::Stdin) => read_stdin(),
        None => Cli::command()
            .error(
                clap::error::ErrorKind::MissingRequiredArgument,
                "no inventory given: pass --inventory PATH or pipe the inventory on stdin",
            )
            .exit(),
    }
}

fn read_stdin() -> Result<Inventory> {
    debug!("Reading inventory from stdin");
    Ok(Inventory::from_reader(io::stdin().lock())?)
}

fn load_options(args: &InventoryArgs) -> Result<SynthesisOptions> {
    let mut options = SynthesisOptions::default();
    if let Some(path) = &args.pgp_key {
        options = options.with_pgp_key(PgpKey::from_path(path)?);
    }
    if args.strict_membership {
        options = options.with_membership_check(MembershipCheck::Strict);
    }
    Ok(options)
}
