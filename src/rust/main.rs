use std::path::PathBuf;
use std::time::Instant;
use anyhow::{bail, Context, Result};
use attrition::features::NUMERIC_INPUTS;
use attrition::{
    AlignmentPolicy, ArtifactBundle, ArtifactSource, ArtifactStore, EmployeeProfile,
    PredictionContext, RuntimeConfig, DEFAULT_BUNDLE,
};
use clap::{Args, Parser, Subcommand};
use log::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Artifact store root (defaults to $ATTRITION_HOME or the user cache dir)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Name of the bundle inside the store
    #[arg(long, global = true, default_value = DEFAULT_BUNDLE)]
    bundle: String,

    /// Load the bundle from this directory instead of the store
    #[arg(long, global = true)]
    bundle_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Predict whether an employee is likely to leave
    Predict(PredictArgs),
    /// Print the model's features, categorical choices, and input defaults
    Schema,
    /// Download a bundle into the store
    Fetch(FetchArgs),
    /// Check a stored bundle against its declared hash
    Verify,
}

#[derive(Args)]
struct PredictArgs {
    #[arg(long)]
    age: Option<i64>,
    /// Distance from home in km
    #[arg(long)]
    distance_from_home: Option<i64>,
    #[arg(long)]
    environment_satisfaction: Option<i64>,
    #[arg(long)]
    relationship_satisfaction: Option<i64>,
    #[arg(long)]
    hourly_rate: Option<i64>,
    /// Monthly income in dollars
    #[arg(long)]
    monthly_income: Option<i64>,
    #[arg(long)]
    num_companies_worked: Option<i64>,
    #[arg(long)]
    job_involvement: Option<i64>,
    #[arg(long)]
    job_level: Option<i64>,
    /// Defaults to the first department the model knows
    #[arg(long)]
    department: Option<String>,
    /// Defaults to the first job role the model knows
    #[arg(long)]
    job_role: Option<String>,
    /// The employee works overtime
    #[arg(long)]
    over_time: bool,
    /// Last salary hike in percent
    #[arg(long)]
    percent_salary_hike: Option<i64>,
    #[arg(long)]
    stock_option_level: Option<i64>,
    #[arg(long)]
    training_times_last_year: Option<i64>,
    #[arg(long)]
    work_life_balance: Option<i64>,
    #[arg(long)]
    years_since_last_promotion: Option<i64>,
    #[arg(long)]
    years_with_curr_manager: Option<i64>,

    /// Warn instead of failing when the input does not match the model schema
    #[arg(long)]
    lenient_alignment: bool,
    /// Print the prediction as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct FetchArgs {
    #[arg(long)]
    manifest_url: String,
    #[arg(long)]
    model_url: String,
    /// Expected SHA-256 of the model file
    #[arg(long)]
    sha256: String,
    /// Expected SHA-256 of the manifest
    #[arg(long)]
    manifest_sha256: Option<String>,
    /// Remove any stored copy before downloading
    #[arg(short, long)]
    fresh: bool,
}

impl PredictArgs {
    fn to_profile(&self, context: &PredictionContext) -> Result<EmployeeProfile> {
        let first_choice = |field: &str| {
            context.choices(field).into_iter().next()
                .with_context(|| format!("the model lists no choices for {}", field))
        };
        let defaults = EmployeeProfile::default();
        Ok(EmployeeProfile {
            age: self.age.unwrap_or(defaults.age),
            distance_from_home: self.distance_from_home.unwrap_or(defaults.distance_from_home),
            environment_satisfaction: self.environment_satisfaction.unwrap_or(defaults.environment_satisfaction),
            relationship_satisfaction: self.relationship_satisfaction.unwrap_or(defaults.relationship_satisfaction),
            hourly_rate: self.hourly_rate.unwrap_or(defaults.hourly_rate),
            monthly_income: self.monthly_income.unwrap_or(defaults.monthly_income),
            num_companies_worked: self.num_companies_worked.unwrap_or(defaults.num_companies_worked),
            job_involvement: self.job_involvement.unwrap_or(defaults.job_involvement),
            job_level: self.job_level.unwrap_or(defaults.job_level),
            department: match &self.department {
                Some(d) => d.clone(),
                None => first_choice("Department")?,
            },
            job_role: match &self.job_role {
                Some(r) => r.clone(),
                None => first_choice("JobRole")?,
            },
            over_time: self.over_time,
            percent_salary_hike: self.percent_salary_hike.unwrap_or(defaults.percent_salary_hike),
            stock_option_level: self.stock_option_level.unwrap_or(defaults.stock_option_level),
            training_times_last_year: self.training_times_last_year.unwrap_or(defaults.training_times_last_year),
            work_life_balance: self.work_life_balance.unwrap_or(defaults.work_life_balance),
            years_since_last_promotion: self.years_since_last_promotion.unwrap_or(defaults.years_since_last_promotion),
            years_with_curr_manager: self.years_with_curr_manager.unwrap_or(defaults.years_with_curr_manager),
        })
    }
}

fn open_store(cli: &Cli) -> Result<ArtifactStore> {
    let store = match &cli.store {
        Some(root) => ArtifactStore::new(root),
        None => ArtifactStore::new_default(),
    };
    store.context("Failed to open artifact store")
}

fn bundle_dir(cli: &Cli) -> Result<PathBuf> {
    match &cli.bundle_dir {
        Some(dir) => Ok(dir.clone()),
        None => Ok(open_store(cli)?.bundle_dir(&cli.bundle)),
    }
}

fn predict(cli: &Cli, args: &PredictArgs) -> Result<()> {
    let start_time = Instant::now();
    let dir = bundle_dir(cli)?;
    let context = PredictionContext::load(&dir, RuntimeConfig::from_env())
        .with_context(|| format!("Error loading model from {}", dir.display()))?;
    info!("Model loaded (took {:.2?})", start_time.elapsed());

    let policy = if args.lenient_alignment { AlignmentPolicy::Lenient } else { AlignmentPolicy::Strict };
    let profile = args.to_profile(&context)?;
    let prediction = context.predict_profile(&profile, policy)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&prediction)?);
    } else {
        println!("Result: {}", prediction.outcome.headline());
        println!("Risk Probability: {}", prediction.risk_percent());
    }
    info!("Prediction finished (took {:.2?})", start_time.elapsed());
    Ok(())
}

fn schema(cli: &Cli) -> Result<()> {
    let bundle = ArtifactBundle::load(bundle_dir(cli)?)?;
    let schema = bundle.schema();

    println!("Model features ({}):", schema.len());
    for (i, name) in schema.names().iter().enumerate() {
        let kind = if schema.is_categorical(name) { "categorical" } else { "numeric" };
        println!("  {:>2}. {} ({})", i + 1, name, kind);
    }
    for field in schema.categorical() {
        println!("\n{} choices:", field);
        for choice in bundle.choices(field) {
            println!("  - {}", choice);
        }
    }
    println!("\nInputs:");
    for input in NUMERIC_INPUTS {
        println!(
            "  {:<28} {}..={} (default {})",
            input.label, input.range.start(), input.range.end(), input.default
        );
    }
    println!("\nFixed defaults:");
    for (field, value) in attrition::features::DEFAULT_VALUES {
        println!("  {} = {}", field, value);
    }
    Ok(())
}

async fn fetch(cli: &Cli, args: &FetchArgs) -> Result<()> {
    if cli.bundle_dir.is_some() {
        bail!("--bundle-dir cannot be used with fetch; use --store and --bundle");
    }
    let store = open_store(cli)?;
    let source = ArtifactSource {
        name: cli.bundle.clone(),
        manifest_url: args.manifest_url.clone(),
        model_url: args.model_url.clone(),
        model_sha256: args.sha256.clone(),
        manifest_sha256: args.manifest_sha256.clone(),
    };

    if args.fresh {
        info!("Fresh download requested - removing any existing bundle...");
        store.remove(&source.name)?;
    }
    store.ensure_downloaded(&source).await?;
    println!("Bundle '{}' stored at {}", source.name, store.bundle_dir(&source.name).display());
    Ok(())
}

fn verify(cli: &Cli) -> Result<()> {
    let store = open_store(cli)?;
    if store.verify(&cli.bundle)? {
        println!("Bundle '{}' verified", cli.bundle);
        Ok(())
    } else {
        bail!("Bundle '{}' is missing or does not match its declared hash", cli.bundle)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Command::Predict(args) => predict(&cli, args),
        Command::Schema => schema(&cli),
        Command::Fetch(args) => fetch(&cli, args).await,
        Command::Verify => verify(&cli),
    }
}
