use std::path::PathBuf;

use clap::Parser;

/// Browse a Mastodon timeline from the terminal.
#[derive(Debug, Parser)]
#[command(name = "perch", version, about = "Browse your Mastodon timeline from the terminal.")]
struct Cli {
    /// Search for statuses matching a query
    #[arg(short, long)]
    query: Option<String>,

    /// Show the timeline of the given account (user@host)
    #[arg(short, long)]
    user: Option<String>,

    /// Show the timeline of the named list
    #[arg(short, long)]
    list: Option<String>,

    /// Print the members of the named list and exit
    #[arg(long, value_name = "LIST")]
    list_members: Option<String>,

    /// How many statuses to fetch
    #[arg(short, long, default_value_t = 50)]
    count: usize,

    /// Post a status; uses MESSAGE when given, otherwise opens $EDITOR
    #[arg(short, long)]
    post: bool,

    /// Status text for --post
    #[arg(value_name = "MESSAGE")]
    message: Option<String>,

    /// Action taken on Enter: browser, copy or download-edit
    #[arg(short = 'e', long)]
    action: Option<String>,

    /// Print a static table instead of the interactive list
    #[arg(long)]
    table: bool,

    /// Use an alternate config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    let options = perch::app::Options {
        query: cli.query,
        user: cli.user,
        list: cli.list,
        list_members: cli.list_members,
        count: cli.count,
        post: cli.post,
        message: cli.message,
        action: cli.action,
        table: cli.table,
        config_file: cli.config,
    };

    if let Err(err) = perch::run(options) {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}
