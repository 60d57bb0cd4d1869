use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use intent_protocol::{command_response_schema, serialize_json_pretty, CommandResponse};
use serde::Serialize;
use std::io;
use std::path::PathBuf;

pub mod command;
pub mod eval;
pub mod session;

use command::{error_response, Engine};
use session::Session;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "intent")]
#[command(about = "Match questions to known topics and answer them", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for answers)
    #[arg(long, global = true)]
    quiet: bool,

    /// Corpus document to use instead of the built-in one
    #[arg(long, global = true, env = "INTENT_CORPUS")]
    corpus: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the topic a question resolves to
    Classify(QuestionArgs),

    /// Print the canned answer for a question
    Ask(QuestionArgs),

    /// Show how every training phrase scored against a question
    Explain(ExplainArgs),

    /// List known topics with their example counts and responses
    Topics(JsonArgs),

    /// Interactive session on stdin/stdout; `/name <NAME>` sets the user name
    Chat(ChatArgs),

    /// Measure accuracy on a golden dataset
    Eval(EvalArgs),

    /// Write the active corpus to a file, as a starting point for a custom one
    Export(ExportArgs),

    /// Print the JSON Schema of --json output
    Schema,
}

impl Commands {
    const fn wants_json(&self) -> bool {
        match self {
            Commands::Classify(args) | Commands::Ask(args) => args.json,
            Commands::Explain(args) => args.json,
            Commands::Topics(args) => args.json,
            Commands::Eval(args) => args.json,
            Commands::Export(args) => args.json,
            Commands::Chat(_) | Commands::Schema => false,
        }
    }
}

#[derive(Args)]
struct QuestionArgs {
    /// Question text
    question: String,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ExplainArgs {
    /// Question text
    question: String,

    /// Maximum number of phrases to show
    #[arg(long, short = 'n', default_value_t = 5)]
    limit: usize,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct JsonArgs {
    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ChatArgs {
    /// Set the user name up front instead of sending `/name <NAME>`
    #[arg(long)]
    name: Option<String>,
}

#[derive(Args)]
struct EvalArgs {
    /// Path to eval dataset JSON
    #[arg(long)]
    dataset: PathBuf,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ExportArgs {
    /// Destination corpus file
    #[arg(long, short = 'o')]
    output: PathBuf,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

fn init_logging(verbose: bool, quiet: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn emit_json<T: Serialize>(data: &T) -> Result<()> {
    print_stdout(&serialize_json_pretty(&CommandResponse::ok(data)?)?)
}

fn fail_json(err: &anyhow::Error) -> Result<()> {
    print_stdout(&serialize_json_pretty(&error_response(err))?)?;
    std::process::exit(1);
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if matches!(cli.command, Commands::Schema) {
        return print_stdout(&command_response_schema()?);
    }

    let json = cli.command.wants_json();
    let engine = match Engine::load(cli.corpus.as_deref()).await {
        Ok(engine) => engine,
        Err(err) if json => return fail_json(&err),
        Err(err) => return Err(err),
    };

    match cli.command {
        Commands::Classify(args) => run_classify(&engine, args)?,
        Commands::Ask(args) => run_ask(&engine, args)?,
        Commands::Explain(args) => run_explain(&engine, args)?,
        Commands::Topics(args) => run_topics(&engine, args)?,
        Commands::Chat(args) => run_chat(&engine, args).await?,
        Commands::Eval(args) => run_eval(&engine, args).await?,
        Commands::Export(args) => run_export(&engine, args).await?,
        Commands::Schema => {}
    }
    Ok(())
}

fn run_classify(engine: &Engine, args: QuestionArgs) -> Result<()> {
    let out = engine.classify(&args.question);
    if args.json {
        return emit_json(&out);
    }
    print_stdout(out.topic.as_deref().unwrap_or("no match"))
}

fn run_ask(engine: &Engine, args: QuestionArgs) -> Result<()> {
    let out = engine.ask(&args.question);
    if args.json {
        return emit_json(&out);
    }
    print_stdout(&out.response)
}

fn run_explain(engine: &Engine, args: ExplainArgs) -> Result<()> {
    let out = engine.explain(&args.question, args.limit);
    if args.json {
        return emit_json(&out);
    }
    print_stdout(&format!("Terms: {}", out.terms.join(" ")))?;
    for ranked in &out.ranked {
        print_stdout(&format!(
            "{}. {:.3} [{}] {}",
            ranked.rank, ranked.score, ranked.topic, ranked.phrase
        ))?;
    }
    print_stdout(&format!(
        "Decision (> {}): {}",
        out.threshold,
        out.topic.as_deref().unwrap_or("no match")
    ))
}

fn run_topics(engine: &Engine, args: JsonArgs) -> Result<()> {
    let out = engine.topics();
    if args.json {
        return emit_json(&out);
    }
    for topic in &out.topics {
        print_stdout(&format!("{} ({} examples)", topic.topic, topic.examples))?;
        match &topic.response {
            Some(response) => print_stdout(&format!("   {response}"))?,
            None => print_stdout("   (no response, fallback is used)")?,
        }
    }
    Ok(())
}

async fn run_chat(engine: &Engine, args: ChatArgs) -> Result<()> {
    let mut session = Session::new();
    if let Some(name) = args.name.as_deref() {
        match session.set_name(name) {
            Ok(greeting) => print_stdout(&greeting)?,
            Err(message) => anyhow::bail!(message),
        }
    }
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    session::run_chat(engine, session, stdin, tokio::io::stdout()).await
}

async fn run_eval(engine: &Engine, args: EvalArgs) -> Result<()> {
    let out = match eval::run_eval(engine, &args.dataset).await {
        Ok(out) => out,
        Err(err) if args.json => return fail_json(&err),
        Err(err) => return Err(err),
    };
    if args.json {
        return emit_json(&out);
    }
    for case in out.cases.iter().filter(|case| !case.passed) {
        print_stdout(&format!(
            "FAIL {}: {:?} expected {} got {} ({:.3})",
            case.id,
            case.question,
            case.expected.as_deref().unwrap_or("no match"),
            case.actual.as_deref().unwrap_or("no match"),
            case.score
        ))?;
    }
    print_stdout(&format!(
        "Accuracy: {}/{} ({:.1}%)",
        out.summary.correct,
        out.summary.total,
        out.summary.accuracy * 100.0
    ))
}

async fn run_export(engine: &Engine, args: ExportArgs) -> Result<()> {
    let out = match engine.export(&args.output).await {
        Ok(out) => out,
        Err(err) if args.json => return fail_json(&err),
        Err(err) => return Err(err),
    };
    if args.json {
        return emit_json(&out);
    }
    print_stdout(&format!(
        "Wrote {} phrases across {} topics to {}",
        out.phrases, out.topics, out.path
    ))
}
