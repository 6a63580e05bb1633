//! `fieldtrack user` command - Team management and login

use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Password};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{format_date, open_repository};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::clock::{Clock, SystemClock};
use crate::core::session::Session;
use crate::entities::user::{Role, User};

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// List team members
    List(ListArgs),

    /// Add a team member
    Add(AddArgs),

    /// Remove a team member
    Rm(RmArgs),

    /// Set or replace a member's password
    ResetPassword(ResetPasswordArgs),

    /// Log in as a team member
    Login(LoginArgs),

    /// Log out of the current session
    Logout,

    /// Show who is currently logged in
    Whoami,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Full name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Email address (must be unique)
    #[arg(long, short = 'e')]
    pub email: String,

    /// Role
    #[arg(long, short = 'r', default_value = "sales")]
    pub role: Role,

    /// Initial password (prompted when omitted)
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// Email of the member to remove
    pub email: String,

    /// Skip the confirmation prompt
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub struct ResetPasswordArgs {
    /// Email of the member
    pub email: String,

    /// New password (prompted when omitted)
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct LoginArgs {
    /// Email address
    pub email: String,

    /// Password (prompted when omitted)
    #[arg(long)]
    pub password: Option<String>,
}

pub fn run(cmd: UserCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        UserCommands::List(args) => run_list(args, global),
        UserCommands::Add(args) => run_add(args, global),
        UserCommands::Rm(args) => run_rm(args, global),
        UserCommands::ResetPassword(args) => run_reset_password(args, global),
        UserCommands::Login(args) => run_login(args, global),
        UserCommands::Logout => run_logout(global),
        UserCommands::Whoami => run_whoami(global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let repo = open_repository(global)?;
    let users = repo.users();

    if args.count {
        println!("{}", users.len());
        return Ok(());
    }
    if users.is_empty() {
        println!("No team members found.");
        return Ok(());
    }

    match global.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(users).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&users).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Id => {
            for user in users {
                println!("{}", user.id);
            }
        }
        _ => {
            println!(
                "{:<24} {:<28} {:<12} {}",
                style("NAME").bold(),
                style("EMAIL").bold(),
                style("ROLE").bold(),
                style("JOINED").bold()
            );
            println!("{}", "-".repeat(76));
            for user in users {
                println!(
                    "{:<24} {:<28} {:<12} {}",
                    user.name,
                    user.email,
                    user.role,
                    format_date(&user.join_date)
                );
            }
        }
    }
    Ok(())
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let mut repo = open_repository(global)?;
    let clock = SystemClock;

    let password = match args.password {
        Some(password) => password,
        None => Password::with_theme(&ColorfulTheme::default())
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()
            .into_diagnostic()?,
    };

    let mut user = User::new(&args.name, &args.email, args.role, clock.now());
    user.password = Some(password);

    repo.add_user(user).map_err(|e| miette::miette!("{}", e))?;
    println!(
        "{} Added {} ({}) as {}",
        style("✓").green(),
        style(&args.name).yellow(),
        style(&args.email).cyan(),
        args.role
    );
    Ok(())
}

fn run_rm(args: RmArgs, global: &GlobalOpts) -> Result<()> {
    let mut repo = open_repository(global)?;
    let (id, name) = {
        let user = repo
            .user_by_email(&args.email)
            .ok_or_else(|| miette::miette!("No team member with email '{}'", args.email))?;
        (user.id.clone(), user.name.clone())
    };

    if !args.force {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Remove team member '{}'?", name))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    repo.delete_user(&id).map_err(|e| miette::miette!("{}", e))?;

    // Drop any lingering session for the removed member
    if let Some(session) = Session::load(repo.workspace()) {
        if session.user_id == id {
            Session::clear(repo.workspace()).into_diagnostic()?;
        }
    }

    println!("{} Removed {}", style("✓").green(), style(name).yellow());
    Ok(())
}

fn run_reset_password(args: ResetPasswordArgs, global: &GlobalOpts) -> Result<()> {
    let mut repo = open_repository(global)?;
    let mut user = repo
        .user_by_email(&args.email)
        .cloned()
        .ok_or_else(|| miette::miette!("No team member with email '{}'", args.email))?;

    let password = match args.password {
        Some(password) => password,
        None => Password::with_theme(&ColorfulTheme::default())
            .with_prompt("New password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()
            .into_diagnostic()?,
    };

    user.password = Some(password);
    repo.update_user(user).map_err(|e| miette::miette!("{}", e))?;
    println!(
        "{} Password updated for {}",
        style("✓").green(),
        style(&args.email).cyan()
    );
    Ok(())
}

fn run_login(args: LoginArgs, global: &GlobalOpts) -> Result<()> {
    let repo = open_repository(global)?;
    let user = repo
        .user_by_email(&args.email)
        .ok_or_else(|| miette::miette!("Invalid email or password"))?;

    let password = match args.password {
        Some(password) => password,
        None => Password::with_theme(&ColorfulTheme::default())
            .with_prompt("Password")
            .interact()
            .into_diagnostic()?,
    };

    if user.password.as_deref() != Some(password.as_str()) {
        return Err(miette::miette!("Invalid email or password"));
    }

    let session = Session {
        user_id: user.id.clone(),
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role,
    };
    session.save(repo.workspace()).into_diagnostic()?;

    println!(
        "{} Logged in as {} ({})",
        style("✓").green(),
        style(&user.name).yellow(),
        user.role
    );
    Ok(())
}

fn run_logout(global: &GlobalOpts) -> Result<()> {
    let repo = open_repository(global)?;
    Session::clear(repo.workspace()).into_diagnostic()?;
    println!("{} Logged out", style("✓").green());
    Ok(())
}

fn run_whoami(global: &GlobalOpts) -> Result<()> {
    let repo = open_repository(global)?;
    match Session::load(repo.workspace()) {
        Some(session) => {
            println!(
                "{} ({}) - {}",
                style(&session.name).yellow(),
                session.email,
                session.role
            );
        }
        None => println!("Not logged in."),
    }
    Ok(())
}
