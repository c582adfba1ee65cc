use std::io::{self, Write};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use sensei::auth::{self, AuthStorage};
use sensei::banner::{BannerInfo, print_banner, print_session_summary};
use sensei::client::ChatSession;
use sensei::client::history::{HistoryStore, excerpt};
use sensei::client::remote::HttpTutor;
use sensei::client::render::to_terminal;
use sensei::commands::{CommandRegistry, CommandResult, SessionInfo};
use sensei::config::{ServerConfig, Settings};
use sensei::consts::{
    API_KEY_ENV, DEFAULT_API_BASE, DEFAULT_BODY_LIMIT, DEFAULT_MODEL, DEFAULT_PORT, PROVIDER,
    default_db_path,
};
use sensei::generator::TokenUsage;
use sensei::generator::gemini::GeminiGenerator;
use sensei::image::DataUrl;
use sensei::server;
use sensei::solver::{PipelineMode, Solver, Tutor};
use sensei::spinner::Spinner;

#[derive(Parser)]
#[command(name = "sensei", version, about = "A patient tutor for photographed homework.")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// SQLite database for settings, API key, and terminal history
    #[arg(short, long, global = true, env = "SENSEI_DB")]
    db: Option<PathBuf>,

    /// Gemini model (overrides the saved setting)
    #[arg(short, long, global = true, env = "SENSEI_MODEL")]
    model: Option<String>,

    /// How an image becomes an answer (overrides the saved setting)
    #[arg(short, long, global = true, value_enum)]
    pipeline: Option<PipelineMode>,

    /// Generation API base URL
    #[arg(long, global = true, env = "SENSEI_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the browser client and the solve API
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: IpAddr,

        /// Port to listen on
        #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Maximum request body size in bytes
        #[arg(long, default_value_t = DEFAULT_BODY_LIMIT)]
        body_limit: usize,

        /// Open the browser client once listening
        #[arg(long, default_value_t = false)]
        open: bool,
    },
    /// Solve a problem from an image file, then chat about it
    Solve {
        /// Photo or scan of the problem
        image: PathBuf,

        /// Use a running `sensei serve` instead of calling the API directly
        #[arg(short, long)]
        server: Option<String>,

        /// Print the answer and exit
        #[arg(long, default_value_t = false)]
        once: bool,

        /// Print answer HTML as-is
        #[arg(long, default_value_t = false)]
        raw: bool,

        /// Don't record this problem in local history
        #[arg(long, default_value_t = false)]
        no_history: bool,
    },
    /// List or clear locally recorded problems
    History {
        /// Delete all records
        #[arg(long, default_value_t = false)]
        clear: bool,

        /// Skip the confirmation prompt
        #[arg(short, long, default_value_t = false)]
        yes: bool,
    },
    /// Save a Gemini API key
    Login {
        /// The key; prompted for when omitted
        key: Option<String>,
    },
    /// Remove the saved API key
    Logout,
    /// Show or change saved defaults
    Settings {
        /// Save a default model
        #[arg(long)]
        set_model: Option<String>,

        /// Save a default pipeline
        #[arg(long, value_enum)]
        set_pipeline: Option<PipelineMode>,

        /// Forget the saved model
        #[arg(long, default_value_t = false)]
        reset_model: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.command {
        Command::Serve { .. } => "sensei=info",
        _ => "sensei=warn",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    let db_path = resolve_db_path(cli.db.as_deref())?;
    let settings = Settings::open(&db_path)?;
    let model = match &cli.model {
        Some(model) => model.clone(),
        None => settings
            .model()?
            .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
    };
    let pipeline = match cli.pipeline {
        Some(mode) => mode,
        None => settings.pipeline()?.unwrap_or_default(),
    };

    match cli.command {
        Command::Serve {
            host,
            port,
            body_limit,
            open,
        } => {
            let config = ServerConfig {
                host,
                port,
                body_limit,
                open_browser: open,
            };
            let (solver, auth_status) = local_solver(&db_path, &model, pipeline, &cli.api_base)?;

            print_banner(&BannerInfo {
                mode: "serve",
                model: &model,
                pipeline: pipeline.as_str(),
                auth_status: &auth_status,
                endpoint: &config.local_url(),
                history: "browser local storage",
            });

            server::serve(&config, Arc::clone(&solver)).await?;
            print_session_summary(solver.session_usage());
            Ok(())
        }
        Command::Solve {
            image,
            server,
            once,
            raw,
            no_history,
        } => {
            let history = if no_history {
                None
            } else {
                Some(HistoryStore::open(&db_path)?)
            };

            let (tutor, solver, auth_status, endpoint): (
                Box<dyn Tutor>,
                Option<Arc<Solver>>,
                String,
                String,
            ) = match server {
                Some(url) => {
                    let tutor = HttpTutor::new(&url);
                    let endpoint = tutor.endpoint().to_string();
                    (
                        Box::new(tutor) as Box<dyn Tutor>,
                        None,
                        "server-side".to_string(),
                        endpoint,
                    )
                }
                None => {
                    let (solver, auth_status) =
                        local_solver(&db_path, &model, pipeline, &cli.api_base)?;
                    (
                        Box::new(Arc::clone(&solver)) as Box<dyn Tutor>,
                        Some(solver),
                        auth_status,
                        cli.api_base.clone(),
                    )
                }
            };

            let history_label = if history.is_some() { db_path.as_str() } else { "off" };
            if !once {
                print_banner(&BannerInfo {
                    mode: "solve",
                    model: &model,
                    pipeline: pipeline.as_str(),
                    auth_status: &auth_status,
                    endpoint: &endpoint,
                    history: history_label,
                });
            }

            let mut session = ChatSession::new(tutor, history);
            let usage = || solver.as_ref().map(|s| s.session_usage()).unwrap_or_default();

            load_image(&mut session, &image, raw).await?;
            if once {
                return Ok(());
            }

            repl(&mut session, raw, &model, pipeline, &usage).await?;
            print_session_summary(usage());
            Ok(())
        }
        Command::History { clear, yes } => {
            let store = HistoryStore::open(&db_path)?;
            if clear {
                if !yes && !confirm("本当にすべての記録を消去しますか？")? {
                    return Ok(());
                }
                store.clear()?;
                println!("✓ history cleared");
                return Ok(());
            }

            let entries = store.list()?;
            if entries.is_empty() {
                println!("まだ記録はありません。");
            }
            for (i, entry) in entries.iter().enumerate() {
                let text = excerpt(&to_terminal(&entry.result)).replace('\n', " ");
                println!("{:>2}. [{}] {}", i + 1, entry.timestamp, text);
            }
            Ok(())
        }
        Command::Login { key } => {
            let key = match key {
                Some(key) => key,
                None => {
                    print!("Paste your Gemini API key: ");
                    io::stdout().flush()?;
                    let mut key = String::new();
                    io::stdin().read_line(&mut key)?;
                    key
                }
            };
            auth::login(&db_path, PROVIDER, &key)?;
            println!("✓ API key saved to {db_path}");
            Ok(())
        }
        Command::Logout => {
            auth::logout(&db_path, PROVIDER)?;
            println!("✓ API key removed.");
            Ok(())
        }
        Command::Settings {
            set_model,
            set_pipeline,
            reset_model,
        } => {
            if reset_model {
                settings.reset_model()?;
            }
            if let Some(model) = &set_model {
                settings.set_model(model)?;
            }
            if let Some(mode) = set_pipeline {
                settings.set_pipeline(mode)?;
            }

            let auth = AuthStorage::open(&db_path)?;
            println!(
                "model     {}",
                settings.model()?.as_deref().unwrap_or(DEFAULT_MODEL)
            );
            println!("pipeline  {}", settings.pipeline()?.unwrap_or_default());
            println!("auth      {}", auth.key_source(PROVIDER, API_KEY_ENV)?.label());
            println!("database  {db_path}");
            Ok(())
        }
    }
}

/// Default to `~/.sensei/sensei.db`, creating the directory.
fn resolve_db_path(db: Option<&Path>) -> Result<String> {
    let path = match db {
        Some(path) => path.to_path_buf(),
        None => default_db_path()?,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(path.to_string_lossy().into_owned())
}

fn local_solver(
    db_path: &str,
    model: &str,
    pipeline: PipelineMode,
    api_base: &str,
) -> Result<(Arc<Solver>, String)> {
    let auth = Arc::new(AuthStorage::open(db_path)?);
    let auth_status = auth.key_source(PROVIDER, API_KEY_ENV)?.label().to_string();
    let generator =
        GeminiGenerator::new(Some(model.to_string()), auth).with_base_url(api_base);
    Ok((Arc::new(Solver::new(Arc::new(generator), pipeline)), auth_status))
}

async fn load_image(session: &mut ChatSession, path: &Path, raw: bool) -> Result<()> {
    let image = DataUrl::from_file(path)?;
    let answer = Spinner::wrap("考え中...", session.start(&image)).await?;
    print_answer(&answer, raw);
    Ok(())
}

fn print_answer(answer: &str, raw: bool) {
    if raw {
        println!("\n{answer}");
    } else {
        println!("\n{}", to_terminal(answer));
    }
}

fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

/// Follow-up loop. Without a loaded problem, input is read as an image path.
async fn repl(
    session: &mut ChatSession,
    raw: bool,
    model: &str,
    pipeline: PipelineMode,
    usage: &dyn Fn() -> TokenUsage,
) -> Result<()> {
    let registry = CommandRegistry::new();
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    println!("\n質問をどうぞ (/help でコマンド一覧)");

    loop {
        let prompt = if session.conversation().is_empty() {
            "image> "
        } else {
            "質問> "
        };
        print!("\n{prompt}");
        io::stdout().flush()?;

        let line = tokio::select! {
            result = lines.next_line() => {
                match result {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        // Ctrl+D (EOF)
                        println!();
                        break;
                    }
                    Err(e) => {
                        eprintln!("input error: {e}");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let info = SessionInfo {
            model,
            pipeline: pipeline.as_str(),
            usage: usage(),
            history: session.history(),
        };
        let outcome = registry.dispatch(input, &info).await;
        match outcome {
            CommandResult::Quit => break,
            CommandResult::Handled => continue,
            CommandResult::Reset => {
                session.reset();
                println!("  新しい問題の画像パスを入力してください");
                continue;
            }
            CommandResult::NotACommand => {}
        }

        // Ctrl+C during a request cancels the request, not the REPL
        tokio::select! {
            result = next_turn(session, input, raw) => {
                if let Err(e) = result {
                    eprintln!("\nエラーが発生しました: {e}");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\n\ninterrupted");
            }
        }
    }

    Ok(())
}

async fn next_turn(session: &mut ChatSession, input: &str, raw: bool) -> Result<()> {
    if session.conversation().is_empty() {
        return load_image(session, Path::new(input), raw).await;
    }

    match Spinner::wrap("考え中...", session.follow_up(input)).await? {
        Some(answer) => print_answer(&answer, raw),
        None => bail!("empty question"),
    }
    Ok(())
}
