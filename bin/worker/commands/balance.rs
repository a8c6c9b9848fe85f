//! Balance command - look up an account's credits

use crate::style::*;
use anyhow::{anyhow, Context, Result};
use velonode_worker::types::find_account;
use velonode_worker::{HttpBackend, JobBackend, WorkerConfig};

pub async fn run(config: &WorkerConfig, username: Option<String>) -> Result<()> {
    let username = username
        .or_else(|| config.worker_name.clone())
        .ok_or_else(|| anyhow!("No account given: pass --username or --worker-name"))?;

    let backend = HttpBackend::with_timeout(&config.backend_url, config.request_timeout())?;
    let users = backend
        .list_users()
        .await
        .with_context(|| format!("Failed to fetch accounts from {}", config.backend_url))?;

    print_header("Balance");

    match find_account(&users, &username) {
        Some(account) => {
            print_key_value("Account", &account.username);
            let credits = account
                .credits
                .map(|c| format!("{} VELO", c))
                .unwrap_or_else(|| "unknown".to_string());
            print_key_value("Credits", &credits);
            println!();
            print_success("Account found");
        }
        None => print_warning(&format!("No account named {}", username)),
    }

    println!();
    Ok(())
}
