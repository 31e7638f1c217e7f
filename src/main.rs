use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod fallback;
mod features;
mod models;
mod predictor;
mod report;
mod risk;
mod scoring;
mod suggestions;

use config::PredictorConfig;
use models::{ExamPreparation, RawInput, StudentSession, StudyMaterials};
use predictor::Predictor;
use scoring::{HttpScoringService, Offline, ScoringService};

#[derive(Parser)]
#[command(name = "gpa-risk-predictor")]
#[command(about = "First-year GPA prediction and risk tiering for student questionnaires", long_about = None)]
struct Cli {
    /// JSON file with fallback coefficients, risk thresholds and scoring settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Prep {
    Collab,
    PastPapers,
    Notes,
    Help,
}

#[derive(Clone, Copy, ValueEnum)]
enum Material {
    Notes,
    Online,
    Practice,
    Textbooks,
    Tutorials,
    Videos,
}

#[derive(clap::Args)]
#[command(group(
    ArgGroup::new("source")
        .args(["input", "age"])
        .required(true)
        .multiple(false)
))]
struct FormArgs {
    /// Questionnaire submission as JSON
    #[arg(long)]
    input: Option<PathBuf>,
    #[arg(long, requires = "study_hours")]
    age: Option<u32>,
    #[arg(long)]
    study_hours: Option<f64>,
    /// WAEC grade code (1-6), repeat for each subject
    #[arg(long = "waec-grade")]
    waec_grades: Vec<u8>,
    #[arg(long = "prep", value_enum)]
    prep: Vec<Prep>,
    #[arg(long = "material", value_enum)]
    materials: Vec<Material>,
}

impl FormArgs {
    fn into_raw_input(self) -> anyhow::Result<RawInput> {
        if let Some(path) = self.input {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            return serde_json::from_str(&raw)
                .with_context(|| format!("invalid submission in {}", path.display()));
        }

        let mut exam_preparation = ExamPreparation::default();
        for prep in self.prep {
            match prep {
                Prep::Collab => exam_preparation.collaborating_with_study_partners = true,
                Prep::PastPapers => exam_preparation.practicing_past_exam_papers = true,
                Prep::Notes => exam_preparation.reviewing_lecture_notes_and_materials = true,
                Prep::Help => exam_preparation.seeking_help_from_instructors_or_tutors = true,
            }
        }

        let mut study_materials = StudyMaterials::default();
        for material in self.materials {
            match material {
                Material::Notes => study_materials.lecture_notes = true,
                Material::Online => study_materials.online_resources = true,
                Material::Practice => study_materials.practice_problems_and_exercises = true,
                Material::Textbooks => study_materials.textbooks = true,
                Material::Tutorials => study_materials.tutorials = true,
                Material::Videos => study_materials.video_lectures = true,
            }
        }

        Ok(RawInput {
            age: self.age.context("--age is required without --input")?,
            study_hours_per_day: self
                .study_hours
                .context("--study-hours is required without --input")?,
            waec_grades: self.waec_grades,
            exam_preparation,
            study_materials,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Predict GPA and risk tier for one questionnaire submission
    Predict {
        #[command(flatten)]
        form: FormArgs,
        #[arg(long)]
        student_id: Option<String>,
        #[arg(long, env = "SCORING_URL")]
        scoring_url: Option<String>,
        #[arg(long, env = "SCORING_TIMEOUT_SECS")]
        timeout_secs: Option<u64>,
        /// Skip the scoring service and use the local estimate
        #[arg(long)]
        offline: bool,
        /// Also write a markdown report
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Print the feature record sent to the scoring service
    Features {
        #[command(flatten)]
        form: FormArgs,
    },
    /// List a roster of predictions with their risk tiers
    Roster {
        #[arg(long)]
        csv: PathBuf,
        /// low, medium, high, unknown or all
        #[arg(long = "risk", default_value = "all")]
        filter: String,
    },
    /// Export roster rows that are not low risk
    Export {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value = "at_risk_students.csv")]
        out: PathBuf,
    },
}

async fn run_prediction<S: ScoringService>(
    predictor: &Predictor<S>,
    session: &StudentSession,
    input: &RawInput,
    report_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let result = predictor.submit(session, input).await?;

    println!("Predicted GPA: {:.2}", result.gpa);
    println!("Risk: {} ({})", result.risk, result.risk.presentation_token());
    println!("Suggestions:");
    for suggestion in &result.suggestions {
        println!("- {suggestion}");
    }

    if let Some(path) = report_path {
        let features = features::build_features(input)?;
        let report = report::build_report(session, &features, &result, chrono::Utc::now());
        std::fs::write(&path, report)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Report written to {}.", path.display());
    }

    Ok(())
}

fn open_roster(path: &Path) -> anyhow::Result<Vec<models::RosterEntry>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open roster {}", path.display()))?;
    report::read_roster(file)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = PredictorConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Predict {
            form,
            student_id,
            scoring_url,
            timeout_secs,
            offline,
            report,
        } => {
            let session = StudentSession::new(student_id);
            if let Some(welcome) = session.welcome() {
                println!("{welcome}");
            }
            let input = form.into_raw_input()?;
            let config = config.with_overrides(scoring_url, timeout_secs);

            if offline {
                let predictor = Predictor::new(Offline, config);
                run_prediction(&predictor, &session, &input, report).await?;
            } else {
                let service = HttpScoringService::new(config.scoring.url.clone(), config.scoring.timeout());
                let predictor = Predictor::new(service, config);
                run_prediction(&predictor, &session, &input, report).await?;
            }
        }
        Commands::Features { form } => {
            let input = form.into_raw_input()?;
            let record = features::build_features(&input)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Commands::Roster { csv, filter } => {
            let tier = risk::parse_filter(&filter)
                .with_context(|| format!("unknown risk filter {filter:?}"))?;
            let roster = open_roster(&csv)?;
            let rows = risk::filter_roster(&config.thresholds, &roster, tier);

            if rows.is_empty() {
                println!("No students match this filter.");
                return Ok(());
            }

            for (entry, tier) in &rows {
                let gpa = entry
                    .predicted_gpa
                    .trim()
                    .parse::<f64>()
                    .map(|value| format!("{value:.2}"))
                    .unwrap_or_else(|_| entry.predicted_gpa.clone());
                println!(
                    "- {} GPA {} risk {} ({})",
                    entry.student_id, gpa, tier, entry.key_predictors
                );
            }

            println!();
            println!("By risk tier:");
            for summary in risk::summarize_by_tier(&config.thresholds, &roster) {
                println!(
                    "- {}: {} students (avg GPA {:.2})",
                    summary.tier, summary.count, summary.avg_gpa
                );
            }
        }
        Commands::Export { csv, out } => {
            let roster = open_roster(&csv)?;
            if risk::at_risk(&config.thresholds, &roster).is_empty() {
                println!("No at-risk students in current view.");
                return Ok(());
            }
            let file = std::fs::File::create(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            let written = report::write_at_risk_csv(file, &config.thresholds, &roster)?;
            println!("Exported {written} students to {}.", out.display());
        }
    }

    Ok(())
}
