//! Loan Projection CLI
//!
//! Thin command-line front end over the projection library. Every command
//! prints its result as JSON on stdout; amounts are rounded to cents here and
//! nowhere else.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::info;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use loan_projection::debt::SimulationConfig;
use loan_projection::money::round_cents;
use loan_projection::tax::RateTableSet;
use loan_projection::{
    apply_extra_payments, generate_schedule, project, BuyerStatus, Debt, ExtraFrequency, ExtraPayment, Frequency,
    GrowthParams, LoanSummary, LoanTerms, RepaymentType, ScenarioRunner, StampDutyCalculator, Strategy,
};

#[derive(Parser)]
#[command(
    name = "loan-projection",
    version,
    about = "Loan amortization, overpayment, debt payoff, stamp duty and growth projections"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Loan parameters shared by `amortize` and `overpay`
#[derive(clap::Args)]
struct LoanArgs {
    /// Amount borrowed
    #[arg(short, long)]
    principal: f64,
    /// Annual interest rate in percent, e.g. 3.5
    #[arg(short, long)]
    rate: f64,
    /// Term in years
    #[arg(short, long)]
    years: u32,
    /// repayment or interest-only
    #[arg(long, default_value = "repayment", value_parser = parse_named::<RepaymentType>)]
    repayment_type: RepaymentType,
    /// Interest-only months before repayments start
    #[arg(long, default_value_t = 0)]
    grace_months: u32,
    /// Add grace period interest to the balance instead of tracking it separately
    #[arg(long)]
    capitalize_grace: bool,
}

impl LoanArgs {
    fn terms(&self) -> LoanTerms {
        LoanTerms {
            principal: self.principal,
            annual_rate_percent: self.rate,
            term_years: self.years,
            repayment_type: self.repayment_type,
            grace_period_months: self.grace_months,
            capitalize_grace_interest: self.capitalize_grace,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print a full amortization schedule
    Amortize {
        #[command(flatten)]
        loan: LoanArgs,
        /// Only print the summary
        #[arg(long)]
        summary_only: bool,
    },

    /// Apply extra payments to a loan and report the savings
    Overpay {
        #[command(flatten)]
        loan: LoanArgs,
        /// Extra amount per payment
        #[arg(long)]
        extra: Option<f64>,
        /// monthly, quarterly, annually or one-time
        #[arg(long, default_value = "monthly", value_parser = parse_named::<ExtraFrequency>)]
        frequency: ExtraFrequency,
        /// Month of the first extra payment
        #[arg(long, default_value_t = 1)]
        start_month: u32,
        /// JSON file with a list of extra payments, used instead of --extra
        #[arg(long, conflicts_with = "extra")]
        plan: Option<PathBuf>,
    },

    /// Simulate paying off several debts
    Debts {
        /// JSON file with a list of debts
        file: PathBuf,
        /// Amount paid on top of the minimums each month
        #[arg(short, long, default_value_t = 0.0)]
        extra: f64,
        /// avalanche, snowball or consolidation; all three are compared when omitted
        #[arg(short, long, value_parser = parse_named::<Strategy>)]
        strategy: Option<Strategy>,
        /// Month ceiling for the simulation
        #[arg(long, default_value_t = 1200)]
        max_months: u32,
        /// Leave the month-by-month balances out of the output
        #[arg(long)]
        no_balances: bool,
    },

    /// Property transaction tax
    StampDuty {
        /// Purchase price
        value: f64,
        /// Region, e.g. england or scotland
        #[arg(short, long, default_value = "england")]
        region: String,
        /// standard, firstTimeBuyer or additionalProperty
        #[arg(short, long, default_value = "standard", value_parser = parse_named::<BuyerStatus>)]
        status: BuyerStatus,
        /// Table key to use instead of the buyer status, e.g. nonResidential
        #[arg(short, long, conflicts_with = "status")]
        key: Option<String>,
        /// Completion date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Directory of rate table CSV files, defaults to the built-in tables
        #[arg(long)]
        tables: Option<PathBuf>,
    },

    /// Project savings growth
    Grow {
        /// Initial deposit
        #[arg(short, long, default_value_t = 0.0)]
        principal: f64,
        /// Annual interest rate in percent
        #[arg(short, long)]
        rate: f64,
        /// Term in years
        #[arg(short, long)]
        years: u32,
        #[arg(long, default_value = "monthly", value_parser = parse_named::<Frequency>)]
        compounding: Frequency,
        /// Amount paid in at each contribution
        #[arg(short, long, default_value_t = 0.0)]
        contribution: f64,
        #[arg(long, default_value = "monthly", value_parser = parse_named::<Frequency>)]
        contribution_frequency: Frequency,
        /// Also report the final balance in today's money at this inflation rate
        #[arg(long)]
        inflation: Option<f64>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Amortize { loan, summary_only } => {
            let schedule = generate_schedule(&loan.terms()).context("generating schedule")?;
            let summary = rounded_summary(schedule.summary());
            if summary_only {
                print_json(&summary)
            } else {
                print_json(&json!({ "summary": summary, "schedule": schedule.rounded_entries() }))
            }
        }
        Commands::Overpay { loan, extra, frequency, start_month, plan } => {
            let terms = loan.terms();
            let extras = match (plan, extra) {
                (Some(path), _) => read_json::<Vec<ExtraPayment>>(&path)?,
                (None, Some(amount)) => vec![ExtraPayment::new(amount, frequency, start_month)],
                (None, None) => return Err(anyhow!("either --extra or --plan is required")),
            };

            let baseline = generate_schedule(&terms).context("generating baseline schedule")?;
            let result = apply_extra_payments(&baseline, &terms, &extras).context("applying extra payments")?;
            info!("{} extra payments save {} months", extras.len(), result.months_saved);

            print_json(&json!({
                "months_saved": result.months_saved,
                "interest_saved": round_cents(result.interest_saved),
                "total_extra_paid": round_cents(result.total_extra_paid),
                "roi": result.roi,
                "schedule": result.modified.iter().map(|e| e.rounded()).collect::<Vec<_>>(),
            }))
        }
        Commands::Debts { file, extra, strategy, max_months, no_balances } => {
            let debts = read_json::<Vec<Debt>>(&file)?;
            let runner = ScenarioRunner::with_config(SimulationConfig {
                max_months,
                track_balances: !no_balances,
            });

            match strategy {
                Some(strategy) => {
                    let result =
                        loan_projection::debt::simulate_with_config(&debts, extra, strategy, runner.config())
                            .with_context(|| format!("simulating {:?}", strategy))?;
                    print_json(&result)
                }
                None => {
                    let comparison = runner.compare_strategies(&debts, extra).context("comparing strategies")?;
                    print_json(&comparison)
                }
            }
        }
        Commands::StampDuty { value, region, status, key, date, tables } => {
            let calculator = match tables {
                Some(dir) => StampDutyCalculator::new(load_tables(&dir)?),
                None => StampDutyCalculator::uk_default(),
            };
            let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());

            let result = match key {
                Some(key) => calculator.calculate_for_key(&region, &key, value, date),
                None => calculator.calculate(&region, status, value, date),
            }
            .with_context(|| format!("calculating tax in {} on {}", region, date))?;

            print_json(&json!({
                "value": result.value,
                "banded_tax": round_cents(result.banded.total_tax),
                "surcharge": round_cents(result.surcharge),
                "registration_fee": round_cents(result.registration_fee),
                "total": round_cents(result.total),
                "effective_rate": result.effective_rate,
                "bands": result.banded.per_band,
            }))
        }
        Commands::Grow {
            principal,
            rate,
            years,
            compounding,
            contribution,
            contribution_frequency,
            inflation,
        } => {
            let params = GrowthParams {
                principal,
                annual_rate_percent: rate,
                compounding,
                contribution,
                contribution_frequency,
                term_years: years,
            };
            let result = project(&params).context("projecting growth")?;

            print_json(&json!({
                "final_balance": round_cents(result.final_balance),
                "total_contributions": round_cents(result.total_contributions),
                "total_interest": round_cents(result.total_interest),
                "total_return_percent": result.total_return_percent,
                "real_final_balance": inflation.map(|i| round_cents(result.real_final_balance(i))),
                "periods": result.periods,
            }))
        }
    }
}

fn rounded_summary(summary: LoanSummary) -> LoanSummary {
    LoanSummary {
        months: summary.months,
        monthly_payment: round_cents(summary.monthly_payment),
        total_interest: round_cents(summary.total_interest),
        total_paid: round_cents(summary.total_paid),
        grace_interest: round_cents(summary.grace_interest),
        total_cost: round_cents(summary.total_cost),
    }
}

fn load_tables(dir: &Path) -> Result<RateTableSet> {
    let tables = RateTableSet::from_csv_path(dir)
        .map_err(|e| anyhow!("loading rate tables from {}: {}", dir.display(), e))?;
    info!("loaded rate tables for {:?}", tables.regions());
    Ok(tables)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file)).with_context(|| format!("parsing {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Parse a CLI word through the type's serde names
fn parse_named<T: DeserializeOwned>(s: &str) -> std::result::Result<T, String> {
    serde_json::from_value(serde_json::Value::String(s.to_string())).map_err(|e| e.to_string())
}
