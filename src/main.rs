// SPDX-License-Identifier: MIT
//! `quizcore` CLI — inspect the locally persisted quiz state: cumulative
//! stats, history, achievements, and the derived difficulty/improvement
//! rankings.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use quizcore::{Engine, EngineConfig};

#[derive(Parser)]
#[command(
    name = "quizcore",
    about = "Quiz result & progression engine — local state inspector",
    version
)]
struct Args {
    /// Path to quizcore.toml (default: ./quizcore.toml)
    #[arg(long, env = "QUIZCORE_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory holding the SQLite database (overrides the config file)
    #[arg(long, env = "QUIZCORE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "QUIZCORE_LOG")]
    log: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show cumulative user stats, level, XP, and the current streak.
    Stats,
    /// List quiz history, newest first.
    History {
        /// Maximum entries to print
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// List achievements with unlock state and progress.
    Achievements {
        /// Only show unlocked awards
        #[arg(long)]
        unlocked: bool,
    },
    /// Questions ranked hardest first by observed success rate.
    Difficult {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Topics with the largest recent score improvement.
    Improved {
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log.as_deref());

    let config_path = args
        .config
        .unwrap_or_else(|| PathBuf::from("quizcore.toml"));
    let mut config = EngineConfig::load(Path::new(&config_path))?;
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    let engine = Engine::open(config).await?;

    match args.command {
        Command::Stats => print_stats(&engine).await,
        Command::History { limit } => print_history(&engine, limit).await,
        Command::Achievements { unlocked } => print_achievements(&engine, unlocked).await,
        Command::Difficult { limit } => print_difficult(&engine, limit).await,
        Command::Improved { limit } => print_improved(&engine, limit).await,
    }

    Ok(())
}

/// RUST_LOG wins; `--log` / QUIZCORE_LOG is the fallback; default `warn`
/// keeps inspector output clean.
fn init_tracing(level: Option<&str>) {
    let fallback = level.unwrap_or("warn");
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn print_stats(engine: &Engine) {
    let p = engine.user_profile().await;
    let streak = engine.current_streak().await;
    let week = engine.weekly_stats().await;

    println!("Level {}  ({} XP, {}/100 into the level)", p.level, p.stats.xp, p.level_progress);
    println!("Streak: {streak} day(s)");
    println!();
    println!("Quizzes:   {:>8}", p.stats.total_quizzes);
    println!("Questions: {:>8}", p.stats.total_questions);
    println!("Correct:   {:>8}  ({:.1}% overall)", p.stats.correct_answers, p.stats.overall_accuracy);
    println!("Practice:  {:>8}  ({:.0}% avg score)", p.stats.practice_quizzes, p.stats.practice_accuracy);
    println!("Tests:     {:>8}  ({:.0}% avg score)", p.stats.test_quizzes, p.stats.test_accuracy);
    println!("Studied:   {:>7.1}h", p.stats.total_time_hours());
    println!();
    println!(
        "This week: {} quizzes over {} active day(s), {:.1}% accuracy",
        week.quizzes, week.active_days, week.accuracy
    );
}

async fn print_history(engine: &Engine, limit: usize) {
    let history = engine.recent_history(limit).await;
    if history.is_empty() {
        println!("No quizzes recorded yet.");
        return;
    }
    for r in history {
        let topic = r
            .topic_id
            .as_deref()
            .map(|_| format!(" / {}", r.topic_title))
            .unwrap_or_default();
        println!(
            "{}  {:>5.1}%  {:>2}/{:<2}  {:?}  {}{}",
            r.created_at.format("%Y-%m-%d %H:%M"),
            r.score,
            r.correct_count,
            r.total_count,
            r.mode,
            r.subject_title,
            topic,
        );
    }
}

async fn print_achievements(engine: &Engine, unlocked_only: bool) {
    let p = engine.user_profile().await;
    let unlocked = p.awards.iter().filter(|a| a.unlocked).count();
    println!("{unlocked}/{} unlocked\n", p.awards.len());

    for award in &p.awards {
        if unlocked_only && !award.unlocked {
            continue;
        }
        let mark = if award.unlocked { "✓" } else { " " };
        let progress = match (award.progress, award.max_progress) {
            (Some(p), Some(max)) if !award.unlocked => format!("  [{p}/{max}]"),
            _ => String::new(),
        };
        println!("{mark} {} {} — {}{progress}", award.icon, award.name, award.description);
    }
}

async fn print_difficult(engine: &Engine, limit: usize) {
    let questions = engine.most_difficult_questions(limit).await;
    if questions.is_empty() {
        println!("No attempted questions yet.");
        return;
    }
    for q in questions {
        println!(
            "rating {}/5  {:>5.1}% success  {:>4} attempt(s)  {}",
            q.difficulty_rating,
            100.0 * q.success_rate(),
            q.total_attempts,
            q.question_id,
        );
    }
}

async fn print_improved(engine: &Engine, limit: usize) {
    let topics = engine.most_improved_topics(limit).await;
    if topics.is_empty() {
        println!("Not enough topic history yet (4 quizzes per topic needed).");
        return;
    }
    for t in topics {
        println!(
            "+{:<5.1}  {} ({} quizzes): {:.1}% → {:.1}%",
            t.improvement, t.topic_title, t.quizzes, t.older_avg, t.newer_avg
        );
    }
}
