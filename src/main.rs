mod api;
mod cli;
mod config;
mod error;
mod inflight;
mod mirror;
mod models;
mod session;


use clap::Parser;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use api::auth::{Credentials, PasswordChange, ProfileUpdate};
use api::collection::{Blogs, CollectionResource, Experience, Projects, Services, Skills, Testimonials};
use api::content::{ContentChanges, ContentSnapshot, SaveOutcome};
use api::ApiClient;
use cli::{
    Args, BlogsCmd, CategoriesCmd, Command, ContactCmd, ContentCmd, MessagesCmd, ProfileCmd,
    Resource, SkillsCmd,
};
use config::AdminConfig;
use error::ApiError;
use mirror::{Inbox, Mirror};
use models::contact::{ContactForm, MessageStatus};
use models::content::About;
use models::project::Project;
use models::skill::SkillCategory;
use models::split_csv;
use session::{FileSessionStore, Session, SessionState};

fn init_logger(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logger(args.verbosity);

    if let Err(e) = run(&args) {
        log::error!("{} failed: {}", args.command.name(), e);
        eprintln!("error: {}: {}", args.command.name(), e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), ApiError> {
    let cfg = AdminConfig::load(args.config.as_deref(), args.api_url.as_deref())?;
    log::debug!("API base {}", cfg.api_url);
    let store = FileSessionStore::new(cfg.session_file.clone());
    log::debug!("session file {}", store.path().display());
    let client = ApiClient::from_config(&cfg, Session::new(Arc::new(store)))?;

    if !args.command.needs_session() {
        return dispatch(&client, &args.command);
    }
    if client.auth().restore() == SessionState::Anonymous {
        return Err(ApiError::Session(
            "not logged in or session expired, run `folio-admin login`".into(),
        ));
    }
    expire_on_auth_failure(&client, dispatch(&client, &args.command))
}

/// A 401/403 mid-command means the token died after `restore()`; drop it.
fn expire_on_auth_failure(client: &ApiClient, result: Result<(), ApiError>) -> Result<(), ApiError> {
    match result {
        Err(e) if e.is_auth_failure() => {
            log::warn!("[session] server refused the stored token, logging out");
            client.auth().logout()?;
            Err(ApiError::Session(format!(
                "{}, run `folio-admin login`",
                e.message()
            )))
        }
        other => other,
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ApiError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| ApiError::Validation(format!("cannot read {}: {}", path.display(), e)))?;
    serde_json::from_str(&raw).map_err(|e| ApiError::Decode(format!("{}: {}", path.display(), e)))
}

fn read_text(path: &Path) -> Result<String, ApiError> {
    fs::read_to_string(path)
        .map_err(|e| ApiError::Validation(format!("cannot read {}: {}", path.display(), e)))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), ApiError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Item from a JSON object file, with `_id` forced to `id`.
fn read_item_with_id<T: DeserializeOwned>(path: &Path, id: &str) -> Result<T, ApiError> {
    let mut raw: Value = read_json(path)?;
    match raw.as_object_mut() {
        Some(obj) => {
            obj.insert("_id".to_string(), json!(id));
        }
        None => {
            return Err(ApiError::Validation(format!(
                "{}: expected a JSON object",
                path.display()
            )))
        }
    }
    Ok(serde_json::from_value(raw)?)
}

fn not_found(name: &str, id: &str) -> ApiError {
    ApiError::Validation(format!("no {} with id {}", name, id))
}

fn saved(outcome: SaveOutcome) -> Result<(), ApiError> {
    println!("{}", outcome.summary());
    if outcome.is_saved() {
        return Ok(());
    }
    match outcome {
        SaveOutcome::Partial { failed, .. } | SaveOutcome::Failed(failed) => {
            let names: Vec<&str> = failed.iter().map(|(n, _)| *n).collect();
            Err(ApiError::Rejected(format!("not saved: {}", names.join(", "))))
        }
        SaveOutcome::Saved => Ok(()),
    }
}

enum CollectionOp<'a> {
    List,
    Add(&'a Path),
    Update(&'a str, &'a Path),
    Replace(&'a Path),
    Delete { id: &'a str, via_replace: bool },
}

fn run_collection<R: CollectionResource>(client: &ApiClient, op: CollectionOp<'_>) -> Result<(), ApiError> {
    let api = client.collection::<R>();
    match op {
        CollectionOp::List => print_json(&api.list()?),
        CollectionOp::Add(path) => {
            let item: R::Item = read_json(path)?;
            let mut mirror = Mirror::new(api.list()?);
            let before = mirror.count();
            mirror.replace(api.add(&item)?);
            log::info!("{}: {} -> {} items", R::NAME, before, mirror.count());
            print_json(mirror.items())
        }
        CollectionOp::Update(id, path) => {
            let item: R::Item = read_item_with_id(path, id)?;
            let mut mirror = Mirror::new(api.list()?);
            if mirror.get(id).is_none() {
                return Err(not_found(R::NAME, id));
            }
            let updated = api.update_item(mirror.items(), &item)?;
            mirror.replace(updated);
            print_json(&mirror.get(id))
        }
        CollectionOp::Replace(path) => {
            let items: Vec<R::Item> = read_json(path)?;
            print_json(&api.replace_collection(&items)?)
        }
        CollectionOp::Delete { id, via_replace } => {
            let mut mirror = Mirror::new(api.list()?);
            if !mirror.contains(id) {
                return Err(not_found(R::NAME, id));
            }
            if via_replace {
                let remaining = api.remove_via_replace(mirror.items(), id)?;
                mirror.replace(remaining);
            } else {
                api.delete(id)?;
                mirror.remove(id);
            }
            println!("Deleted {} {}, {} remaining", R::NAME, id, mirror.count());
            Ok(())
        }
    }
}

fn collection(client: &ApiClient, resource: Resource, op: CollectionOp<'_>) -> Result<(), ApiError> {
    match resource {
        Resource::Projects => match op {
            CollectionOp::List => {
                let mirror: Mirror<Project> = Mirror::new(client.projects().list()?);
                log::info!("{} projects, {} featured", mirror.count(), mirror.featured_count());
                print_json(mirror.items())
            }
            op => run_collection::<Projects>(client, op),
        },
        Resource::Blogs => run_collection::<Blogs>(client, op),
        Resource::Services => run_collection::<Services>(client, op),
        Resource::Testimonials => run_collection::<Testimonials>(client, op),
        Resource::Experience => run_collection::<Experience>(client, op),
        Resource::Skills => run_collection::<Skills>(client, op),
    }
}

fn dispatch(client: &ApiClient, command: &Command) -> Result<(), ApiError> {
    match command {
        Command::Login { email, password } => {
            let admin = client.auth().login(&Credentials::new(email, password))?;
            println!("Logged in as {} <{}>", admin.username, admin.email);
            Ok(())
        }
        Command::Logout => {
            client.auth().logout()?;
            println!("Logged out");
            Ok(())
        }
        Command::Status => {
            let admin = client.auth().admin().unwrap_or_default();
            print_json(&json!({
                "authenticated": client.auth().token().is_some(),
                "admin": admin,
            }))
        }
        Command::Profile { action } => match action {
            ProfileCmd::Show => print_json(&client.auth().me()?),
            ProfileCmd::Update { username, email } => {
                let update = ProfileUpdate {
                    username: username.clone(),
                    email: email.clone(),
                };
                print_json(&client.auth().update_profile(&update)?)
            }
        },
        Command::Password {
            current,
            new_password,
            confirm,
        } => {
            client.auth().update_password(&PasswordChange {
                current_password: current.clone(),
                new_password: new_password.clone(),
                confirm_password: confirm.clone(),
            })?;
            println!("Password updated");
            Ok(())
        }
        Command::Dashboard => print_json(&client.stats().dashboard()?),
        Command::List { resource } => collection(client, *resource, CollectionOp::List),
        Command::Add { resource, json } => collection(client, *resource, CollectionOp::Add(json)),
        Command::Update { resource, id, json } => {
            collection(client, *resource, CollectionOp::Update(id, json))
        }
        Command::Replace { resource, json } => {
            collection(client, *resource, CollectionOp::Replace(json))
        }
        Command::Delete {
            resource,
            id,
            via_replace,
        } => collection(
            client,
            *resource,
            CollectionOp::Delete {
                id,
                via_replace: *via_replace,
            },
        ),
        Command::Blogs {
            action: BlogsCmd::Featured { set },
        } => match set {
            Some(path) => print_json(&client.blogs().set_featured(&read_json(path)?)?),
            None => print_json(&client.blogs().featured()?),
        },
        Command::Skills {
            action: SkillsCmd::Categories { action },
        } => categories(client, action.as_ref()),
        Command::Content { action } => match action {
            ContentCmd::Show => print_json(&client.content_editor().load()?),
            ContentCmd::Save {
                hero,
                about,
                footer,
                bio_text,
                highlights_text,
            } => {
                let mut about: Option<About> = about.as_deref().map(read_json).transpose()?;
                if bio_text.is_some() || highlights_text.is_some() {
                    let mut section = match about.take() {
                        Some(section) => section,
                        None => client.about().get()?,
                    };
                    if let Some(path) = bio_text {
                        section.set_bio_text(read_text(path)?.trim_end_matches('\n'));
                    }
                    if let Some(path) = highlights_text {
                        section.set_highlights_text(&read_text(path)?);
                    }
                    about = Some(section);
                }
                let changes = ContentChanges {
                    hero: hero.as_deref().map(read_json).transpose()?,
                    about,
                    footer: footer.as_deref().map(read_json).transpose()?,
                };
                saved(client.content_editor().save(changes))
            }
            ContentCmd::Restore { json } => {
                let snapshot: ContentSnapshot = read_json(json)?;
                saved(client.content_editor().save_all(snapshot))
            }
        },
        Command::Messages { action } => {
            let mut inbox = Inbox::load(client)?;
            match action {
                MessagesCmd::List { status } => {
                    let status = status.as_deref().map(str::parse::<MessageStatus>).transpose()?;
                    print_json(&json!({
                        "counts": inbox.counts(),
                        "messages": inbox.filter(status),
                    }))
                }
                MessagesCmd::Open { id } => print_json(inbox.open(id)?),
                MessagesCmd::Reply { id } => {
                    println!("{}", inbox.reply(id)?);
                    Ok(())
                }
                MessagesCmd::Status { id, status } => {
                    let status: MessageStatus = status.parse()?;
                    inbox.set_status(id, status)?;
                    println!("Message {} marked {}", id, status);
                    Ok(())
                }
                MessagesCmd::Delete { id } => {
                    inbox.delete(id)?;
                    println!("Deleted message {}, {} left", id, inbox.counts().total);
                    Ok(())
                }
            }
        }
        Command::Contact { action } => match action {
            ContactCmd::Show => print_json(&client.contact().info()?),
            ContactCmd::Update { json } => print_json(&client.contact().update_info(&read_json(json)?)?),
            ContactCmd::Submit {
                name,
                email,
                subject,
                message,
            } => {
                client.contact().submit(&ContactForm {
                    name: name.clone(),
                    email: email.clone(),
                    subject: subject.clone(),
                    message: message.clone(),
                })?;
                println!("Message sent");
                Ok(())
            }
        },
        Command::Upload { file, folder } => {
            let uploaded = client.upload().upload_single(file, folder)?;
            println!("{}", uploaded.url);
            Ok(())
        }
        Command::UploadDelete { path } => {
            client.upload().delete_file(path)?;
            println!("Deleted {}", path);
            Ok(())
        }
    }
}

fn categories(client: &ApiClient, action: Option<&CategoriesCmd>) -> Result<(), ApiError> {
    let skills = client.skills();
    let action = match action {
        None | Some(CategoriesCmd::List) => return print_json(&skills.categories()?),
        Some(action) => action,
    };
    let current = skills.categories()?;
    let updated = match action {
        CategoriesCmd::Replace { json } => {
            let list: Vec<SkillCategory> = read_json(json)?;
            skills.replace_categories(&list)?
        }
        CategoriesCmd::Add {
            title,
            skills: names,
            icon,
        } => {
            let category = SkillCategory {
                id: None,
                icon: icon.clone(),
                title: title.clone(),
                skills: split_csv(names),
                extra: Map::new(),
            };
            skills.add_category(&current, &category)?
        }
        CategoriesCmd::Update {
            id,
            title,
            skills: names,
            icon,
        } => {
            let mut category = current
                .iter()
                .find(|c| c.id.as_deref() == Some(id.as_str()))
                .cloned()
                .ok_or_else(|| not_found("skill category", id))?;
            if let Some(title) = title {
                category.title = title.clone();
            }
            if let Some(names) = names {
                category.skills = split_csv(names);
            }
            if let Some(icon) = icon {
                category.icon = icon.clone();
            }
            skills.update_category(&current, &category)?
        }
        CategoriesCmd::Delete { id } => {
            if !current.iter().any(|c| c.id.as_deref() == Some(id.as_str())) {
                return Err(not_found("skill category", id));
            }
            skills.delete_category(&current, id)?
        }
        CategoriesCmd::List => current,
    };
    print_json(&updated)
}
