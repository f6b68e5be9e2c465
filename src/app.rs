use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

use anyhow::{bail, Context, Result};

use crate::action::{ActionKind, ProcessExecutor};
use crate::config;
use crate::item::Item;
use crate::mastodon;
use crate::table;
use crate::ui;

/// Everything the CLI layer hands to the application.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub query: Option<String>,
    pub user: Option<String>,
    pub list: Option<String>,
    pub list_members: Option<String>,
    pub count: usize,
    pub post: bool,
    pub message: Option<String>,
    pub action: Option<String>,
    pub table: bool,
    pub config_file: Option<PathBuf>,
}

pub fn run(options: Options) -> Result<()> {
    let cfg = config::load(config::LoadOptions {
        config_file: options.config_file.clone(),
        ..Default::default()
    })
    .context("load config")?;

    // Validated once here; a bad action name never reaches the session.
    let action_name = options
        .action
        .clone()
        .unwrap_or_else(|| cfg.actions.default_action.clone());
    let action: ActionKind = action_name.parse()?;

    let client = mastodon::Client::new(mastodon::ClientConfig {
        instance_url: cfg.mastodon.instance_url.clone(),
        access_token: cfg.mastodon.access_token.clone(),
        user_agent: cfg.mastodon.user_agent.clone(),
        http_client: None,
    })
    .context("build mastodon client")?;

    if options.post {
        return post_status(&client, options.message.as_deref());
    }

    if let Some(list) = options.list_members.as_deref() {
        let members = client.list_members(list)?;
        for member in &members {
            println!("{}(@{}) {}", member.name(), member.acct, member.url);
        }
        return Ok(());
    }

    let count = options.count.max(1);
    let statuses = if let Some(query) = options.query.as_deref() {
        client.search_statuses(query, count)?
    } else if let Some(user) = options.user.as_deref() {
        client.account_statuses(user, count)?
    } else if let Some(list) = options.list.as_deref() {
        client.list_timeline(list, count)?
    } else {
        client.home_timeline(count)?
    };

    let items: Vec<Item> = statuses
        .iter()
        .map(|status| Item {
            id: status.id.clone(),
            display_name: format!("{}@{}", status.account.name(), status.account.acct),
            body: status.plain_text(),
            url: status.link().to_string(),
        })
        .collect();

    if options.table {
        print!("{}", table::render(&items));
        return Ok(());
    }

    let executor = ProcessExecutor::new(cfg.actions.editor.clone(), None)?;
    let status_message = format!(
        "{} statuses loaded. j/k to move, Enter to {}, q to quit.",
        items.len(),
        action.describe()
    );
    let mut model = ui::Model::new(ui::Options {
        items,
        action,
        executor: Box::new(executor),
        status_message,
    });
    model.run()
}

fn post_status(client: &mastodon::Client, message: Option<&str>) -> Result<()> {
    let text = match message {
        Some(text) => text.to_string(),
        None => compose_in_editor()?,
    };
    if text.trim().is_empty() {
        return Ok(());
    }
    let status = client.post_status(&text)?;
    println!("Posted: {}", status.link());
    Ok(())
}

fn compose_in_editor() -> Result<String> {
    let path = compose_file_path().context("determine compose file path")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    // Drop any stale draft.
    let _ = fs::remove_file(&path);

    let editor = env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    let status = Command::new(&editor)
        .arg(&path)
        .status()
        .with_context(|| format!("launch editor {editor}"))?;
    if !status.success() {
        bail!("editor {editor} exited with {status}");
    }

    Ok(fs::read_to_string(&path).unwrap_or_default())
}

fn compose_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("perch").join("STATUS"))
}
