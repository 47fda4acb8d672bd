use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Subcommand, Clone, PartialEq, Eq, Debug)]
pub enum Command {
    /// Open the full-screen dashboard (default)
    Tui,
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// List blogs
    List,
    /// Print one blog
    Show { id: String },
    /// Publish a new blog
    Create(ComposeArgs),
    /// Change one of your blogs
    Edit {
        id: String,
        #[command(flatten)]
        compose: ComposeArgs,
        /// Video file to attach
        #[arg(long)]
        video: Option<PathBuf>,
    },
    /// Delete one of your blogs
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// List stories
    Stories,
    /// Share a story
    Story {
        #[arg(long)]
        image: Option<PathBuf>,
        #[arg(long, default_value = "")]
        caption: String,
    },
}

#[derive(Args, Clone, PartialEq, Eq, Debug, Default)]
pub struct ComposeArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    /// Image file to attach
    #[arg(long)]
    pub image: Option<PathBuf>,
    /// Plain-text body to import
    #[arg(long, conflicts_with = "external")]
    pub body_file: Option<PathBuf>,
    /// Write the body in $EDITOR
    #[arg(long)]
    pub external: bool,
}

#[derive(Parser, Debug)]
#[command(about = concat!(env!("CARGO_CRATE_NAME"), " - terminal client for the blog service"))]
pub struct Flags {
    /// Blog service base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Flags {
    /// Parse from `std::env::args_os()`, [exit][clap::Error::exit] on error.
    // Wraps `clap::Parser` logic without direct trait imports
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// The dashboard when no sub-command is given.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Tui)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_command_opens_the_dashboard() {
        let flags = Flags::try_parse_from(["blogterm"]).unwrap();
        assert_eq!(flags.command(), Command::Tui);
        assert_eq!(flags.api_url, None);
    }

    #[test]
    fn create_with_body_file_and_global_url() {
        let flags = Flags::try_parse_from([
            "blogterm", "create", "--title", "Hi", "--body-file", "post.txt", "--api-url", "http://x",
        ])
        .unwrap();
        assert_eq!(flags.api_url.as_deref(), Some("http://x"));
        match flags.command() {
            Command::Create(args) => {
                assert_eq!(args.title.as_deref(), Some("Hi"));
                assert_eq!(args.body_file, Some(PathBuf::from("post.txt")));
                assert!(!args.external);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn body_sources_are_exclusive() {
        assert!(Flags::try_parse_from(["blogterm", "create", "--body-file", "a", "--external"]).is_err());
    }

    #[test]
    fn delete_takes_yes() {
        let flags = Flags::try_parse_from(["blogterm", "delete", "p1", "-y"]).unwrap();
        assert_eq!(flags.command(), Command::Delete { id: "p1".into(), yes: true });
    }
}
