use zimgraph::command_argument_builder;
use zimgraph::handlers::{
    handle_explore, handle_list, handle_show, handle_stats, init_logging,
};

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    init_logging(chosen_command.get_flag("verbose"));

    let result = match chosen_command.subcommand() {
        Some(("explore", _)) => handle_explore(&chosen_command).await,
        Some(("list", _)) => handle_list(&chosen_command).await,
        Some(("show", primary_command)) => handle_show(&chosen_command, primary_command).await,
        Some(("stats", primary_command)) => handle_stats(&chosen_command, primary_command).await,
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        eprintln!("✗ {:#}", e);
        std::process::exit(1);
    }
}
