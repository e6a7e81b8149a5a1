use clap::Parser;
use miette::Result;
use prt::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    // This is standard practice for CLI tools that output to stdout.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    // Credentials live in the environment; a local .env is honored when present.
    let _ = dotenv::dotenv();

    let cli = Cli::parse();
    let global = cli.global;

    match cli.command {
        Commands::Reassign(args) => prt::cli::commands::reassign::run(args, &global),
        Commands::SyncLocations(args) => prt::cli::commands::sync_locations::run(args, &global),
        Commands::Completions(args) => prt::cli::commands::completions::run(args),
    }
}
