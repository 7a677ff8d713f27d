//! Session command handler
//!
//! Show, set or clear the logged-in user.

use crate::auth::{AuthContext, FileSessionStore, User};
use crate::error::Result;
use clap::{Args, Subcommand};

/// Session command arguments
#[derive(Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: Option<SessionCommand>,
}

/// Session subcommands
#[derive(Subcommand)]
pub enum SessionCommand {
    /// Show the logged-in user
    Show,
    /// Log a user in
    Login {
        /// E-mail address
        #[arg(long)]
        mail: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        /// Customer identifier
        #[arg(long)]
        person_id: String,
    },
    /// Log the current user out
    Logout,
}

/// Run the session command
pub fn run(args: SessionArgs) -> Result<()> {
    let mut auth = AuthContext::restore(FileSessionStore::open()?)?;

    match args.command.unwrap_or(SessionCommand::Show) {
        SessionCommand::Show => match auth.current_user() {
            Some(user) => println!(
                "{} {} <{}> (id {})",
                user.first_name, user.last_name, user.mail, user.person_id
            ),
            None => println!("Not logged in"),
        },
        SessionCommand::Login {
            mail,
            first_name,
            last_name,
            person_id,
        } => {
            auth.login(User {
                mail,
                first_name,
                last_name,
                person_id,
            })?;
            println!("Logged in");
        }
        SessionCommand::Logout => {
            if auth.is_logged_in() {
                auth.logout()?;
                println!("Logged out");
            } else {
                println!("Not logged in");
            }
        }
    }

    Ok(())
}
