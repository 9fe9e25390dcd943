use std::io::{Cursor, Write};
use tempfile::NamedTempFile;
use zimgraph::handlers::*;
use zimgraph::command_argument_builder;
use zimgraph_archive::{MemoryArchive, MemorySource};
use zimgraph_core::build::{CHUNK_SIZE, GraphConfig};
use zimgraph_core::session::{Session, SessionConfig};

fn wiki_session() -> Session<MemorySource> {
    let mut archive = MemoryArchive::new();
    let main = archive.add_article(
        "Main",
        "Main Page",
        r#"<a href="Category:Fruit">Fruit</a>"#,
    );
    archive.add_article(
        "Category:Fruit",
        "Fruit",
        r#"<a href="Apple">Apple</a> <a href="Pear">Pear</a>"#,
    );
    archive.add_article("Apple", "Apple", r#"<a href="Pear">Pear</a>"#);
    archive.add_article("Pear", "Pear", "");
    archive.set_main_entry(main);

    let config = SessionConfig {
        exclude_related: false,
        graph: GraphConfig {
            chunk_size: 2,
            workers: 2,
            ..GraphConfig::default()
        },
    };
    Session::open(archive.into_source(), config).unwrap()
}

// ============================================================================
// Argument parsing
// ============================================================================

#[test]
fn test_session_config_defaults() {
    let matches = command_argument_builder()
        .try_get_matches_from(["zimgraph", "wiki.zim", "list"])
        .unwrap();
    let config = session_config(&matches);

    assert!(!config.exclude_related);
    assert_eq!(config.graph.chunk_size, CHUNK_SIZE);
    assert_eq!(config.graph.category_prefix, "Category:");
    assert!(config.graph.workers >= 1);
}

#[test]
fn test_session_config_from_flags() {
    let matches = command_argument_builder()
        .try_get_matches_from([
            "zimgraph",
            "wiki.zim",
            "-x",
            "--workers",
            "3",
            "--chunk-size",
            "50",
            "--category-prefix",
            "Kategorie:",
            "stats",
            "--json",
        ])
        .unwrap();
    let config = session_config(&matches);

    assert!(config.exclude_related);
    assert_eq!(config.graph.workers, 3);
    assert_eq!(config.graph.chunk_size, 50);
    assert_eq!(config.graph.category_prefix, "Kategorie:");

    let (name, sub_matches) = matches.subcommand().unwrap();
    assert_eq!(name, "stats");
    assert!(sub_matches.get_flag("json"));
}

#[test]
fn test_subcommand_required() {
    let result = command_argument_builder().try_get_matches_from(["zimgraph", "wiki.zim"]);
    assert!(result.is_err());
}

#[test]
fn test_show_requires_id() {
    let result = command_argument_builder().try_get_matches_from(["zimgraph", "wiki.zim", "show"]);
    assert!(result.is_err());
}

// ============================================================================
// Opening archives
// ============================================================================

#[test]
fn test_open_session_missing_file() {
    let matches = command_argument_builder()
        .try_get_matches_from(["zimgraph", "/nonexistent/wiki.zim", "list"])
        .unwrap();
    let error = open_session(&matches).err().unwrap();
    assert!(error.to_string().contains("/nonexistent/wiki.zim"));
}

#[test]
fn test_open_session_not_a_zim_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut temp_file = NamedTempFile::new()?;
    temp_file.write_all(&[0u8; 128])?;

    let path = temp_file.path().to_string_lossy().to_string();
    let matches = command_argument_builder().try_get_matches_from(["zimgraph", path.as_str(), "list"])?;
    assert!(open_session(&matches).is_err());

    Ok(())
}

// ============================================================================
// Explore loop and show
// ============================================================================

#[tokio::test]
async fn test_explore_exact_then_search_then_quit() {
    colored::control::set_override(false);
    let session = wiki_session();
    let input = Cursor::new("Apple\nzeppelin\n:q\nPear\n");
    let mut output = Vec::new();

    explore(&session, input, &mut output, None).await.unwrap();
    let output = String::from_utf8(output).unwrap();

    assert!(output.starts_with("Graph contains 4 articles\n3 articles are directly related to categories\nEnter an article: "));
    assert!(output.contains("Apple\ntext/html\n"));
    assert!(output.contains("Forward links:\n * Pear (Pear)\n"));
    assert!(output.contains("Backward links:\n * Category:Fruit (Fruit)\n"));
    assert!(output.contains("\nSearch results:\n(No search results)\n"));
    // Nothing after :q is read.
    assert_eq!(output.matches("Enter an article:").count(), 3);
    assert!(!output.contains("(No forward links)"));
}

#[tokio::test]
async fn test_explore_ends_on_eof() {
    let session = wiki_session();
    let mut output = Vec::new();
    explore(&session, Cursor::new(""), &mut output, None).await.unwrap();
    assert!(session.is_built());
}

#[tokio::test]
async fn test_explore_skips_blank_lines() {
    colored::control::set_override(false);
    let session = wiki_session();
    let mut output = Vec::new();
    explore(&session, Cursor::new("\n  \n:q\n"), &mut output, None).await.unwrap();

    let output = String::from_utf8(output).unwrap();
    assert_eq!(output.matches("Enter an article:").count(), 3);
    assert!(!output.contains("Search results"));
}

#[tokio::test]
async fn test_explore_pipes_detail_through_pager() {
    colored::control::set_override(false);
    let session = wiki_session();
    let mut output = Vec::new();
    explore(&session, Cursor::new("Apple\n:q\n"), &mut output, Some("cat"))
        .await
        .unwrap();

    let output = String::from_utf8(output).unwrap();
    assert_eq!(output.matches("Enter an article:").count(), 2);
    assert!(!output.contains("Forward links:"));
}

#[tokio::test]
async fn test_explore_falls_back_inline_without_pager() {
    colored::control::set_override(false);
    let session = wiki_session();
    let mut output = Vec::new();
    explore(
        &session,
        Cursor::new("Apple\n:q\n"),
        &mut output,
        Some("zimgraph-no-such-pager -R"),
    )
    .await
    .unwrap();

    let output = String::from_utf8(output).unwrap();
    assert!(output.contains("Forward links:\n * Pear (Pear)\n"));
}

#[test]
fn test_page_text_reports_unstartable_pager() {
    assert!(page_text("cat", "Apple\n").unwrap());
    assert!(!page_text("zimgraph-no-such-pager", "Apple\n").unwrap());
    assert!(!page_text("", "Apple\n").unwrap());
}

#[tokio::test]
async fn test_render_show_candidates() {
    colored::control::set_override(false);
    let session = wiki_session();

    let report = render_show(&session, "fruit").await.unwrap();
    assert_eq!(report, "\nSearch results:\n * Category:Fruit\n\n");

    let report = render_show(&session, "Pear").await.unwrap();
    assert!(report.starts_with("Pear\ntext/html\n"));
    assert!(report.contains("(No forward links)"));
}

#[tokio::test]
async fn test_build_graph_reports_progress_quietly() {
    let session = build_graph(wiki_session(), true).await.unwrap();
    assert!(session.is_built());
    assert_eq!(session.chunk_count(), 2);
}
