use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use pager::Pager;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;
use tracing::{Level, warn};
use zimgraph_archive::{ArchiveSource, ZimSource};
use zimgraph_core::build::{CHUNK_SIZE, GraphConfig, default_workers};
use zimgraph_core::model::DEFAULT_CATEGORY_PREFIX;
use zimgraph_core::report::{
    format_article_detail, format_listing, format_search_results, format_stats,
    format_view_summary,
};
use zimgraph_core::search::Resolution;
use zimgraph_core::session::{Session, SessionConfig};

/// Typed at the prompt to leave the explore loop.
pub const QUIT_COMMAND: &str = ":q";

/// Pager that article details are piped through from the explore loop.
pub const DETAIL_PAGER: &str = "less -R";

/// Log to stderr, at DEBUG with `--verbose` and WARN otherwise.
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .try_init();
}

/// Session options from the root command's flags.
pub fn session_config(args: &ArgMatches) -> SessionConfig {
    let workers = args
        .get_one::<usize>("workers")
        .copied()
        .unwrap_or_else(default_workers);
    let chunk_size = args
        .get_one::<usize>("chunk-size")
        .copied()
        .unwrap_or(CHUNK_SIZE);
    let category_prefix = args
        .get_one::<String>("category-prefix")
        .cloned()
        .unwrap_or_else(|| DEFAULT_CATEGORY_PREFIX.to_string());

    SessionConfig {
        exclude_related: args.get_flag("exclude-related"),
        graph: GraphConfig {
            chunk_size,
            workers,
            category_prefix,
        },
    }
}

pub fn open_session(args: &ArgMatches) -> Result<Session<ZimSource>> {
    let path = args
        .get_one::<PathBuf>("ZIM_PATH")
        .context("No ZIM archive given")?;
    Session::open(ZimSource::new(path), session_config(args))
        .with_context(|| format!("Failed to open {}", path.display()))
}

fn reading_progress_bar(total: usize, quiet: bool) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }
    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("Reading articles [{bar:40.cyan/blue}] {pos}/{len} chunks")?
            .progress_chars("=>-"),
    );
    Ok(bar)
}

/// Build the link graph up front, drawing chunk progress on stderr.
pub async fn build_graph<S: ArchiveSource>(session: Session<S>, quiet: bool) -> Result<Session<S>> {
    let bar = reading_progress_bar(session.chunk_count(), quiet)?;
    let callback_bar = bar.clone();
    let session = session.with_progress_callback(Arc::new(move |done: usize, _total: usize| {
        callback_bar.set_position(done as u64);
    }));

    let built = session.views().await.map(|_| ());
    bar.finish_and_clear();
    built.context("Failed to build the link graph")?;
    Ok(session)
}

async fn prepare(args: &ArgMatches) -> Result<Session<ZimSource>> {
    let session = open_session(args)?;
    build_graph(session, args.get_flag("quiet")).await
}

/// Pipe `text` into a child `pager` process and wait for it to exit.
///
/// Returns `false` when the pager cannot be started, leaving the text unshown.
pub fn page_text(pager: &str, text: &str) -> Result<bool> {
    let mut parts = pager.split_whitespace();
    let Some(program) = parts.next() else {
        return Ok(false);
    };
    let mut child = match Command::new(program).args(parts).stdin(Stdio::piped()).spawn() {
        Ok(child) => child,
        Err(e) => {
            warn!("Failed to start pager '{}': {}", pager, e);
            return Ok(false);
        }
    };

    if let Some(mut stdin) = child.stdin.take() {
        // Quitting the pager early closes the pipe.
        if let Err(e) = stdin.write_all(text.as_bytes())
            && e.kind() != io::ErrorKind::BrokenPipe
        {
            return Err(e.into());
        }
    }
    child.wait().context("Pager did not exit cleanly")?;
    Ok(true)
}

/// Prompt for article queries until `:q` or end of input.
///
/// An exact identifier shows the article's links, through `pager` when one is
/// given and starts, inline otherwise. Anything else prints the matching
/// search candidates.
pub async fn explore<S, R, W>(
    session: &Session<S>,
    mut input: R,
    output: &mut W,
    pager: Option<&str>,
) -> Result<()>
where
    S: ArchiveSource,
    R: BufRead,
    W: Write,
{
    let views = session.views().await?;

    loop {
        write!(
            output,
            "{}",
            format_view_summary(views.all_articles().order(), views.category_articles().order())
        )?;
        write!(output, "{} ", "Enter an article:".bright_cyan().bold())?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(());
        }
        let query = line.trim();
        if query == QUIT_COMMAND {
            return Ok(());
        }
        if query.is_empty() {
            continue;
        }

        match session.resolve(query).await? {
            Resolution::Exact(id) => {
                if let Some(detail) = session.article_detail(&id).await? {
                    let text = format!("{}\n", format_article_detail(&detail));
                    let paged = match pager {
                        Some(pager) => page_text(pager, &text)?,
                        None => false,
                    };
                    if !paged {
                        write!(output, "{}", text)?;
                    }
                }
            }
            Resolution::Candidates(candidates) => {
                write!(output, "{}", format_search_results(&candidates))?;
            }
        }
    }
}

/// The article detail for `query`, or the search candidates when it is not
/// an exact identifier.
pub async fn render_show<S: ArchiveSource>(session: &Session<S>, query: &str) -> Result<String> {
    match session.resolve(query).await? {
        Resolution::Exact(id) => match session.article_detail(&id).await? {
            Some(detail) => Ok(format_article_detail(&detail)),
            None => Ok(format_search_results(&[])),
        },
        Resolution::Candidates(candidates) => Ok(format_search_results(&candidates)),
    }
}

pub async fn handle_explore(args: &ArgMatches) -> Result<()> {
    let session = prepare(args).await?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let pager = stdout.is_terminal().then_some(DETAIL_PAGER);
    explore(&session, stdin.lock(), &mut stdout, pager).await
}

pub async fn handle_list(args: &ArgMatches) -> Result<()> {
    let session = prepare(args).await?;
    let listing = session.listing().await?;

    Pager::with_pager("less -R").setup();
    print!("{}", format_listing(&listing));
    Ok(())
}

pub async fn handle_show(args: &ArgMatches, sub_matches: &ArgMatches) -> Result<()> {
    let query = sub_matches
        .get_one::<String>("ID")
        .context("No article given")?;
    let session = prepare(args).await?;
    let report = render_show(&session, query).await?;

    Pager::with_pager("less -R").setup();
    print!("{}", report);
    Ok(())
}

pub async fn handle_stats(args: &ArgMatches, sub_matches: &ArgMatches) -> Result<()> {
    let session = prepare(args).await?;
    let stats = session.stats().await?;

    if sub_matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print!("{}", format_stats(&stats));
    }
    Ok(())
}
