use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Command-line admin for the portfolio CMS
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    /// TOML config file (default: ./folio-admin.toml when present)
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// API base URL, overrides config and FOLIO_API_URL
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Projects,
    Blogs,
    Services,
    Testimonials,
    Experience,
    Skills,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Clear the stored session
    Logout,
    /// Verify the stored session and print the admin profile
    Status,
    /// Show or update the admin profile
    Profile {
        #[command(subcommand)]
        action: ProfileCmd,
    },
    /// Change the admin password
    Password {
        #[arg(long)]
        current: String,
        #[arg(long = "new")]
        new_password: String,
        #[arg(long)]
        confirm: String,
    },
    /// Aggregated dashboard statistics
    Dashboard,
    /// Print a collection
    List {
        #[arg(value_enum)]
        resource: Resource,
    },
    /// Append one item read from a JSON file
    Add {
        #[arg(value_enum)]
        resource: Resource,
        #[arg(long, value_name = "FILE")]
        json: PathBuf,
    },
    /// Overwrite one item, matched by id, with the JSON object in a file
    Update {
        #[arg(value_enum)]
        resource: Resource,
        id: String,
        #[arg(long, value_name = "FILE")]
        json: PathBuf,
    },
    /// Replace a whole collection with the JSON array in a file
    Replace {
        #[arg(value_enum)]
        resource: Resource,
        #[arg(long, value_name = "FILE")]
        json: PathBuf,
    },
    /// Delete one item by id
    Delete {
        #[arg(value_enum)]
        resource: Resource,
        id: String,
        /// Send the collection without the item instead of calling the item endpoint
        #[arg(long)]
        via_replace: bool,
    },
    /// Blog extras
    Blogs {
        #[command(subcommand)]
        action: BlogsCmd,
    },
    /// Skill extras
    Skills {
        #[command(subcommand)]
        action: SkillsCmd,
    },
    /// Hero, about and footer sections
    Content {
        #[command(subcommand)]
        action: ContentCmd,
    },
    /// Contact-form inbox
    Messages {
        #[command(subcommand)]
        action: MessagesCmd,
    },
    /// Contact section document
    Contact {
        #[command(subcommand)]
        action: ContactCmd,
    },
    /// Upload an image and print its URL
    Upload {
        file: PathBuf,
        #[arg(long, default_value = "hero")]
        folder: String,
    },
    /// Delete a previously uploaded file
    UploadDelete { path: String },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCmd {
    Show,
    Update {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum BlogsCmd {
    /// Print the featured post, or replace it with --set
    Featured {
        #[arg(long, value_name = "FILE")]
        set: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SkillsCmd {
    /// Skill categories (prints them when no action is given)
    Categories {
        #[command(subcommand)]
        action: Option<CategoriesCmd>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CategoriesCmd {
    List,
    /// Replace every category with the JSON array in a file
    Replace {
        #[arg(long, value_name = "FILE")]
        json: PathBuf,
    },
    /// Append a category; skills are comma separated
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        skills: String,
        #[arg(long, default_value = "")]
        icon: String,
    },
    /// Change the given fields of one category
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        skills: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum ContentCmd {
    Show,
    /// Merge the given sections; any subset may be passed
    Save {
        #[arg(long, value_name = "FILE")]
        hero: Option<PathBuf>,
        #[arg(long, value_name = "FILE")]
        about: Option<PathBuf>,
        #[arg(long, value_name = "FILE")]
        footer: Option<PathBuf>,
        /// Plain text, one bio paragraph per line
        #[arg(long, value_name = "FILE")]
        bio_text: Option<PathBuf>,
        /// Plain text, one highlight per line
        #[arg(long, value_name = "FILE")]
        highlights_text: Option<PathBuf>,
    },
    /// Push all three sections from a file written by `content show`
    Restore {
        #[arg(long, value_name = "FILE")]
        json: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum MessagesCmd {
    List {
        /// new, read or replied
        #[arg(long)]
        status: Option<String>,
    },
    Open { id: String },
    Reply { id: String },
    Status { id: String, status: String },
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum ContactCmd {
    Show,
    Update {
        #[arg(long, value_name = "FILE")]
        json: PathBuf,
    },
    /// Send the public contact form, as a site visitor would
    Submit {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        subject: String,
        #[arg(long)]
        message: String,
    },
}

impl Command {
    /// Label used in error output.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Login { .. } => "login",
            Command::Logout => "logout",
            Command::Status => "status",
            Command::Profile { .. } => "profile",
            Command::Password { .. } => "password",
            Command::Dashboard => "dashboard",
            Command::List { .. } => "list",
            Command::Add { .. } => "add",
            Command::Update { .. } => "update",
            Command::Replace { .. } => "replace",
            Command::Delete { .. } => "delete",
            Command::Blogs { .. } => "blogs",
            Command::Skills { .. } => "skills",
            Command::Content { .. } => "content",
            Command::Messages { .. } => "messages",
            Command::Contact { .. } => "contact",
            Command::Upload { .. } => "upload",
            Command::UploadDelete { .. } => "upload-delete",
        }
    }

    pub fn needs_session(&self) -> bool {
        !matches!(
            self,
            Command::Login { .. }
                | Command::Logout
                | Command::Contact {
                    action: ContactCmd::Submit { .. }
                }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let args = Args::try_parse_from(["folio-admin", "list", "projects", "-vv"]).unwrap();
        assert_eq!(args.verbosity, 2);
        assert!(matches!(
            args.command,
            Command::List { resource: Resource::Projects }
        ));
    }

    #[test]
    fn login_and_logout_skip_session_check() {
        let login = Args::try_parse_from([
            "folio-admin", "login", "--email", "a@b.co", "--password", "secret",
        ])
        .unwrap();
        assert!(!login.command.needs_session());
        let status = Args::try_parse_from(["folio-admin", "status"]).unwrap();
        assert!(status.command.needs_session());
    }

    #[test]
    fn upload_folder_defaults_to_hero() {
        let args = Args::try_parse_from(["folio-admin", "upload", "pic.png"]).unwrap();
        match args.command {
            Command::Upload { folder, .. } => assert_eq!(folder, "hero"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn update_takes_resource_id_and_file() {
        let args = Args::try_parse_from([
            "folio-admin", "update", "blogs", "65a1", "--json", "post.json",
        ])
        .unwrap();
        match args.command {
            Command::Update { resource, id, json } => {
                assert_eq!(resource, Resource::Blogs);
                assert_eq!(id, "65a1");
                assert_eq!(json, PathBuf::from("post.json"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(Args::try_parse_from(["folio-admin", "update", "blogs", "65a1"]).is_err());
    }

    #[test]
    fn category_actions() {
        let bare = Args::try_parse_from(["folio-admin", "skills", "categories"]).unwrap();
        assert!(matches!(
            bare.command,
            Command::Skills {
                action: SkillsCmd::Categories { action: None }
            }
        ));
        let update = Args::try_parse_from([
            "folio-admin", "skills", "categories", "update", "c1", "--skills", "rust, go",
        ])
        .unwrap();
        match update.command {
            Command::Skills {
                action:
                    SkillsCmd::Categories {
                        action: Some(CategoriesCmd::Update { id, title, skills, .. }),
                    },
            } => {
                assert_eq!(id, "c1");
                assert_eq!(title, None);
                assert_eq!(skills.as_deref(), Some("rust, go"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn public_contact_form_needs_no_session() {
        let args = Args::try_parse_from([
            "folio-admin", "contact", "submit", "--name", "Bo", "--email", "bo@x.co",
            "--message", "Hello",
        ])
        .unwrap();
        assert!(!args.command.needs_session());
        let show = Args::try_parse_from(["folio-admin", "contact", "show"]).unwrap();
        assert!(show.command.needs_session());
    }

    #[test]
    fn unknown_resource_is_refused() {
        assert!(Args::try_parse_from(["folio-admin", "list", "widgets"]).is_err());
    }
}
