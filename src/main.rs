// src/main.rs

use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use client::{
    ApiClient, ClientError, Session,
    api::OAuthProvider,
    config::Config,
    controllers::{
        comments::CommentBoard,
        play::{QuizSession, SessionState},
    },
    models::{
        attempt::AttemptResult,
        comment::CommentNode,
        quiz::CreateQuizRequest,
        user::{LoginRequest, RegisterRequest},
    },
    session::FileTokenStore,
    utils::{clock::IntervalTicker, clock::Ticker, time::time_ago},
};
use dotenvy::dotenv;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    task::JoinHandle,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "client", version, about = "Terminal client for the quiz service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "QUIZ_PASSWORD")]
        password: String,
    },
    /// Create an account and store the token
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "QUIZ_PASSWORD")]
        password: String,
    },
    /// Forget the stored token
    Logout,
    /// Print the sign-in URL of a third-party provider
    Oauth {
        #[arg(value_enum)]
        provider: Provider,
    },
    /// List quizzes
    Quizzes {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long)]
        search: Option<String>,
    },
    /// Create a free-text quiz
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// Seconds, 0 for untimed
        #[arg(long, default_value_t = 0)]
        time_limit: u32,
        /// Expected answer, repeat once per question
        #[arg(long = "answer", required = true)]
        answers: Vec<String>,
    },
    /// Play a quiz
    Play { id: i64 },
    /// Show attempt statistics of a quiz
    Stats { id: i64 },
    /// Read or write the comments of a quiz
    Comments {
        quiz_id: i64,
        #[command(subcommand)]
        action: Option<CommentAction>,
    },
}

impl Command {
    /// Commands behind the sign-in wall: everything that reads or writes quizzes
    /// or their comments on the user's behalf.
    fn requires_login(&self) -> bool {
        matches!(
            self,
            Command::Quizzes { .. }
                | Command::Create { .. }
                | Command::Play { .. }
                | Command::Comments { .. }
        )
    }
}

#[derive(Subcommand)]
enum CommentAction {
    Add { content: String },
    Reply { comment_id: i64, content: String },
    Edit { comment_id: i64, content: String },
    Delete { comment_id: i64 },
}

#[derive(Clone, Copy, ValueEnum)]
enum Provider {
    Wechat,
    Weibo,
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "client.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    let cli = Cli::parse();

    let session = Session::new(Arc::new(FileTokenStore::new(&config.token_file)));
    let api = match ApiClient::from_config(&config, session) {
        Ok(api) => api,
        Err(e) => {
            tracing::error!("Failed to build HTTP client: {:?}", e);
            std::process::exit(1);
        }
    };
    tracing::debug!("Using API at {}", config.api_url);

    if let Err(e) = run(cli.command, &api).await {
        eprintln!("{}", e.message());
        std::process::exit(1);
    }
}

async fn run(command: Command, api: &ApiClient) -> Result<(), ClientError> {
    if command.requires_login() {
        api.session().require_token()?;
    }

    match command {
        Command::Login { email, password } => {
            api.login(LoginRequest { email, password }).await?;
            println!("Signed in.");
        }
        Command::Register {
            username,
            email,
            password,
        } => {
            api.register(RegisterRequest {
                username,
                email,
                password,
            })
            .await?;
            println!("Account created, signed in.");
        }
        Command::Logout => {
            api.logout()?;
            println!("Signed out.");
        }
        Command::Oauth { provider } => {
            let provider = match provider {
                Provider::Wechat => OAuthProvider::WeChat,
                Provider::Weibo => OAuthProvider::Weibo,
            };
            println!("{}", api.oauth_url(provider)?);
        }
        Command::Quizzes {
            page,
            limit,
            search,
        } => {
            list_quizzes(api, page, limit, search.as_deref()).await?;
        }
        Command::Create {
            title,
            description,
            time_limit,
            answers,
        } => {
            let mut request = CreateQuizRequest::standard(title, answers).with_time_limit(time_limit);
            request.description = description;
            let quiz = api.create_quiz(&request).await?;
            println!("Created quiz #{}: {}", quiz.id, quiz.title);
        }
        Command::Play { id } => {
            play(api, id).await?;
        }
        Command::Stats { id } => {
            let stats = api.quiz_statistics(id).await?;
            println!(
                "Attempts: {}  Average score: {:.1}%",
                stats.total_attempts, stats.average_score
            );
            for answer in stats.answers_stats {
                println!(
                    "  {:<30} {}/{} ({:.0}%)",
                    answer.answer, answer.correct_count, answer.attempt_count, answer.percentage
                );
            }
        }
        Command::Comments { quiz_id, action } => {
            comments(api, quiz_id, action).await?;
        }
    }
    Ok(())
}

async fn list_quizzes(
    api: &ApiClient,
    page: u32,
    limit: u32,
    search: Option<&str>,
) -> Result<(), ClientError> {
    let quizzes = api.list_quizzes(page, limit, search).await?;
    if quizzes.is_empty() {
        println!("No quizzes found.");
    }
    for quiz in quizzes {
        println!("#{:<5} {}", quiz.id, quiz.title);
        println!(
            "       {}",
            quiz.description
                .as_deref()
                .filter(|d| !d.is_empty())
                .unwrap_or("No description available")
        );
        println!("       Attempts: {}", quiz.attempt_count);
    }
    Ok(())
}

/// Interactive attempt: each line is an answer, `:finish` submits, `:quit` leaves.
async fn play(api: &ApiClient, quiz_id: i64) -> Result<(), ClientError> {
    let mut session = QuizSession::new(quiz_id);
    println!("Loading quiz...");
    let quiz = session.load(api).await?;
    println!("{}", quiz.title);
    if let Some(description) = quiz.description.as_deref() {
        println!("{}", description);
    }
    if let Some(display) = session.countdown_display() {
        println!("Time Left: {}", display);
    }
    println!("Type an answer and press Enter. `:finish` submits, `:quit` leaves.");

    let mut ticker = IntervalTicker::seconds();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending: Option<JoinHandle<Result<AttemptResult, ClientError>>> = None;

    while session.is_in_progress() {
        tokio::select! {
            _ = ticker.tick(), if session.countdown_active() => {
                if let Some(remaining) = session.tick() {
                    if remaining == 0 || remaining % 10 == 0 {
                        println!("Time Left: {}", session.countdown_display().unwrap_or_default());
                    }
                }
            }
            line = lines.next_line(), if pending.is_none() => {
                let Some(line) = line.map_err(|e| ClientError::Transport(e.to_string()))? else {
                    break;
                };
                match line.trim() {
                    ":quit" => break,
                    ":finish" => {
                        if !session.can_finish() {
                            println!("Submit at least one answer first.");
                            continue;
                        }
                        let submission = session.begin_finish()?;
                        let api = api.clone();
                        pending = Some(tokio::spawn(async move {
                            api.submit_attempt(submission.quiz_id, &submission.attempt).await
                        }));
                        println!("Submitting...");
                    }
                    _ => {
                        session.set_input(line);
                        if session.submit_answer() {
                            let n = session.answers().len();
                            println!("Answer {}: {}", n, session.answers()[n - 1]);
                        }
                    }
                }
            }
            outcome = async {
                match pending.as_mut() {
                    Some(handle) => handle.await,
                    None => std::future::pending().await,
                }
            }, if pending.is_some() => {
                pending = None;
                let outcome = outcome.unwrap_or_else(|e| Err(ClientError::Transport(e.to_string())));
                session.resolve_finish(outcome);
            }
        }
    }

    if let Some(handle) = pending.take() {
        handle.abort();
    }
    drop(ticker);

    match session.state() {
        SessionState::Completed(result) => {
            println!("Quiz Results");
            println!("Score: {}%", result.score);
            println!(
                "Correct Answers: {} / {}",
                result.correct_answers, result.total_questions
            );
            println!("Points Earned: {}", result.points_earned);
        }
        SessionState::Error(msg) => println!("{}", msg),
        _ => println!("Left without submitting."),
    }
    Ok(())
}

async fn comments(
    api: &ApiClient,
    quiz_id: i64,
    action: Option<CommentAction>,
) -> Result<(), ClientError> {
    let mut board = CommentBoard::new(quiz_id);
    match action {
        None => {
            board.refresh(api).await?;
        }
        Some(CommentAction::Add { content }) => {
            board.add(api, &content).await?;
        }
        Some(CommentAction::Reply {
            comment_id,
            content,
        }) => {
            board.reply(api, comment_id, &content).await?;
        }
        Some(CommentAction::Edit {
            comment_id,
            content,
        }) => {
            // Load first so an unchanged edit is recognised.
            board.refresh(api).await?;
            board.update(api, comment_id, &content).await?;
        }
        Some(CommentAction::Delete { comment_id }) => {
            board.delete(api, comment_id).await?;
        }
    }

    let tree = board.tree();
    if tree.is_empty() {
        println!("No comments yet.");
    }
    let now = Utc::now();
    for node in &tree {
        print_comment(node, 0, now);
    }
    Ok(())
}

fn print_comment(node: &CommentNode, depth: usize, now: chrono::DateTime<Utc>) {
    let indent = "  ".repeat(depth);
    let c = &node.comment;
    println!(
        "{}[{}] {} · {}",
        indent,
        c.id,
        c.author_username,
        time_ago(c.created_at, now)
    );
    println!("{}  {}", indent, c.content);
    for reply in &node.replies {
        print_comment(reply, depth + 1, now);
    }
}
