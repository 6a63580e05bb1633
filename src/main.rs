use clap::Parser;
use fieldtrack::cli::{Cli, Commands};
use miette::Result;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
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

    let cli = Cli::parse();
    let global = cli.global;

    match cli.command {
        Commands::Init(args) => fieldtrack::cli::commands::init::run(args),
        Commands::Store(cmd) => fieldtrack::cli::commands::store::run(cmd, &global),
        Commands::Visit(cmd) => fieldtrack::cli::commands::visit::run(cmd, &global),
        Commands::User(cmd) => fieldtrack::cli::commands::user::run(cmd, &global),
        Commands::Product(cmd) => fieldtrack::cli::commands::registry::run_product(cmd, &global),
        Commands::Salesperson(cmd) => {
            fieldtrack::cli::commands::registry::run_salesperson(cmd, &global)
        }
        Commands::Import(args) => fieldtrack::cli::commands::import::run(args, &global),
        Commands::Export(args) => fieldtrack::cli::commands::export::run(args, &global),
        Commands::Report(cmd) => fieldtrack::cli::commands::report::run(cmd, &global),
        Commands::Completions(args) => fieldtrack::cli::commands::completions::run(args),
    }
}
