use std::env;
use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pool::Pool;

#[derive(Parser)]
#[command(name = "poolctl")]
#[command(about = "Demonstration client for the polyglot function pool", long_about = None)]
struct Cli {
    /// Storage root. Falls back to $POOL_ROOT, then ./.pool.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse, normalize, and store a source file under a language tag.
    Store {
        /// Path to a single-function source file.
        file: PathBuf,
        /// Natural-language tag for this presentation (e.g. eng, fra).
        #[arg(long)]
        lang: String,
        /// Free-text note describing this overlay variant.
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Reconstruct source text for a stored function in a given language.
    Show {
        /// `<hash>[@<lang>[@<overlay_hash>]]` locator.
        locator: String,
    },
    /// List the language tags a function has overlays under.
    Languages { hash: String },
    /// List the overlays stored for a function under a language.
    Overlays { hash: String, lang: String },
    /// Re-hash a stored function and all its overlays, reporting mismatches.
    Validate { hash: String },
}

fn resolve_root(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| env::var_os("POOL_ROOT").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("./.pool"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let pool = Pool::new(resolve_root(cli.root));

    match cli.command {
        Commands::Store { file, lang, comment } => cmd_store(&pool, &file, &lang, &comment)?,
        Commands::Show { locator } => cmd_show(&pool, &locator)?,
        Commands::Languages { hash } => cmd_languages(&pool, &hash)?,
        Commands::Overlays { hash, lang } => cmd_overlays(&pool, &hash, &lang)?,
        Commands::Validate { hash } => cmd_validate(&pool, &hash)?,
    }

    Ok(())
}

fn cmd_store(pool: &Pool, file: &PathBuf, lang: &str, comment: &str) -> anyhow::Result<()> {
    let source = fs::read_to_string(file)?;
    let (function_hash, overlay_hash) = pool.store(&source, lang, comment)?;
    println!("function_hash: {function_hash}");
    println!("overlay_hash:  {overlay_hash}");
    println!("locator:       {function_hash}@{lang}@{overlay_hash}");
    Ok(())
}

fn cmd_show(pool: &Pool, locator: &str) -> anyhow::Result<()> {
    let loc = pool::parse_locator(locator)?;
    let lang = loc
        .language_tag
        .ok_or_else(|| anyhow::anyhow!("locator must include a language tag to render source"))?;
    let source = pool.denormalize(&loc.function_hash, &lang, loc.overlay_hash.as_deref())?;
    print!("{source}");
    Ok(())
}

fn cmd_languages(pool: &Pool, hash: &str) -> anyhow::Result<()> {
    let mut langs: Vec<String> = pool.list_languages(hash)?.into_iter().collect();
    langs.sort();
    for lang in langs {
        println!("{lang}");
    }
    Ok(())
}

fn cmd_overlays(pool: &Pool, hash: &str, lang: &str) -> anyhow::Result<()> {
    for (overlay_hash, comment) in pool.list_overlays(hash, lang)? {
        if comment.is_empty() {
            println!("{overlay_hash}");
        } else {
            println!("{overlay_hash}  {comment}");
        }
    }
    Ok(())
}

fn cmd_validate(pool: &Pool, hash: &str) -> anyhow::Result<()> {
    match pool.validate(hash) {
        Ok(()) => {
            println!("OK: {hash}");
            Ok(())
        }
        Err(errors) => {
            println!("FAILED: {hash}");
            for err in &errors {
                println!("  - {err}");
            }
            Err(anyhow::anyhow!("{} integrity failure(s)", errors.len()))
        }
    }
}
