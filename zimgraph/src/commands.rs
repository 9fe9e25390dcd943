use crate::CLAP_STYLING;
use clap::{arg, command};
use std::path::PathBuf;
use zimgraph_core::model::DEFAULT_CATEGORY_PREFIX;

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("zimgraph")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("zimgraph")
        .about("Explore the link graph of an offline ZIM archive")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress the progress bar").required(false))
        .arg(arg!(-v --"verbose" "Log debug output to stderr").required(false))
        .arg(
            arg!(<ZIM_PATH>)
                .help("Path to the ZIM archive")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            arg!(-x --"exclude-related")
                .required(false)
                .help("Only show articles which are listed in category pages"),
        )
        .arg(
            arg!(--"workers" <NUM_WORKERS>)
                .required(false)
                .help("Number of blocking workers reading the archive (default: one per core)")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            arg!(--"chunk-size" <NUM_ENTRIES>)
                .required(false)
                .help("Number of archive entries handed to a worker at a time")
                .value_parser(clap::value_parser!(usize))
                .default_value("500"),
        )
        .arg(
            arg!(--"category-prefix" <PREFIX>)
                .required(false)
                .help("Path prefix that marks an entry as a category page")
                .default_value(DEFAULT_CATEGORY_PREFIX),
        )
        .subcommand_required(true)
        .subcommand(
            command!("explore")
                .about("Interactively look up articles and their forward and backward links"),
        )
        .subcommand(
            command!("list").about("List every article under its category breadcrumb"),
        )
        .subcommand(
            command!("show")
                .about("Show the links of one article, or search candidates for a query")
                .arg(arg!(<ID>).help("Article identifier or search query")),
        )
        .subcommand(
            command!("stats")
                .about("Print node, edge and view counts")
                .arg(
                    arg!(--"json")
                        .required(false)
                        .help("Print the counts as JSON"),
                ),
        )
}
