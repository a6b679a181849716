//! 콘솔용 기본 명령어
//!
//! | Command          | Roles   |
//! |------------------|---------|
//! | `echo [bob]`     | `*`     |
//! | `whoami`         | `*`     |
//! | `session`        | `*`     |
//! | `uptime`         | `*`     |
//! | `admin config`   | `ADMIN` |

use chrono::{DateTime, Utc};
use opshell_core::{CommandDescriptor, CommandProvider, Reply, ShellConfig};

/// Role required for the `admin` namespace
pub const ADMIN_ROLE: &str = "ADMIN";

pub fn providers(config: &ShellConfig) -> Vec<CommandProvider> {
    vec![echo(), whoami(), session(), uptime(Utc::now()), admin(config)]
}

fn echo() -> CommandProvider {
    CommandProvider::new("echo", "Print the argument back")
        .executor(|arg| Ok(Reply::output(arg.unwrap_or(""))))
        .subcommand(
            CommandDescriptor::new("bob", "Have bob repeat the argument").executor(|arg| {
                Ok(Reply::output(format!("bob says {}", arg.unwrap_or("nothing"))))
            }),
        )
}

fn whoami() -> CommandProvider {
    CommandProvider::new("whoami", "Show your user name and roles").context_executor(|ctx, _| {
        let user = ctx.username().unwrap_or("unknown");
        let roles = ctx.roles().map(|r| r.to_string()).unwrap_or_default();
        Ok(Reply::output(format!("{} {}", user, roles)))
    })
}

fn session() -> CommandProvider {
    CommandProvider::new("session", "Show the current session id").context_executor(|ctx, _| {
        Ok(Reply::output(format!(
            "session {}",
            ctx.session_id().unwrap_or("-")
        )))
    })
}

fn uptime(started: DateTime<Utc>) -> CommandProvider {
    CommandProvider::new("uptime", "Show how long the shell has been running").executor(
        move |_| {
            let secs = (Utc::now() - started).num_seconds().max(0);
            Ok(Reply::output(format!(
                "up {}s since {}",
                secs,
                started.to_rfc3339()
            )))
        },
    )
}

fn admin(config: &ShellConfig) -> CommandProvider {
    let rendered = serde_json::to_string_pretty(config);
    CommandProvider::new("admin", "Administrative commands")
        .roles([ADMIN_ROLE])
        .subcommand(
            CommandDescriptor::new("config", "Show the effective shell configuration").executor(
                move |_| match &rendered {
                    Ok(json) => Ok(Reply::output(json.clone())),
                    Err(e) => Err(anyhow::anyhow!("config serialization failed: {}", e)),
                },
            ),
        )
}
