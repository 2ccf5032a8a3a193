//! hookmux: Claude Code pane-state tracker for tmux.
//!
//! Every subcommand is a short-lived process. Hooks, the status line and
//! the F-key bindings coordinate only through the state directory.

use std::fs::OpenOptions;
use std::path::Path;

use clap::Parser;

mod cli;
mod cmd_list;
mod context;
mod recorder;
mod relay;
mod reporter;
mod setup_hooks;
mod tmux_conf;
mod tracker;

#[cfg(test)]
mod test_support;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = match cli::Cli::try_parse() {
        Ok(args) => args,
        // A hook must never fail the agent, even when misconfigured.
        Err(e) if e.use_stderr() && cli::is_hook_invocation(std::env::args_os()) => {
            let _ = e.print();
            return Ok(());
        }
        Err(e) => e.exit(),
    };
    init_logging(args.log_file.as_deref());

    let store = args.store();
    let tmux = args.tmux();

    match args.command {
        cli::Command::Hook(opts) => {
            // Hooks never fail the agent: no output means "no decision".
            if let Err(e) = recorder::cmd_hook(&store, &tmux, &opts).await {
                tracing::warn!("hook {} failed: {e:#}", opts.event);
            }
        }
        cli::Command::Status(opts) => {
            reporter::cmd_status(&store, &tmux, &opts);
        }
        cli::Command::Guard(opts) => {
            let intercept = reporter::cmd_guard(&store, &tmux, opts.window.as_deref());
            std::process::exit(if intercept { 0 } else { 1 });
        }
        cli::Command::Respond(opts) => {
            let tracker = tracker::Tracker::new(&store, &tmux);
            if let Err(e) = relay::cmd_respond(&tracker, opts.key, opts.window.window.as_deref()) {
                tracing::warn!("respond {:?} failed: {e:#}", opts.key);
            }
        }
        cli::Command::List(opts) => {
            cmd_list::cmd_list(&store, opts.json)?;
        }
        cli::Command::SetupHooks(opts) => {
            let path = setup_hooks::apply_hooks(&opts)?;
            println!("hooks written to {}", path.display());
        }
        cli::Command::TmuxConf(opts) => {
            print!("{}", tmux_conf::render(&opts));
        }
    }

    Ok(())
}

/// Logs go to stderr, or to `log_file` when given: stdout belongs to the
/// hook protocol and the status line.
fn init_logging(log_file: Option<&Path>) {
    let filter = std::env::var("HOOKMUX_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "warn".to_string());
    let builder =
        tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::new(filter));

    let file = log_file.and_then(|path| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| eprintln!("hookmux: cannot open log file {}: {e}", path.display()))
            .ok()
    });

    match file {
        Some(file) => builder
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init(),
        None => builder.with_writer(std::io::stderr).init(),
    }
}
