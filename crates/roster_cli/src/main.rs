//! Command-line host for the roster directory.
//!
//! # Responsibility
//! - Map subcommands onto `roster_core` services over one SQLite store.
//! - Queue outgoing mail in the store's outbox table.
//! - Print machine-readable JSON for list and report commands.

#![forbid(unsafe_code)]

use clap::{Args, Parser, Subcommand};
use log::info;
use roster_core::db::open_db;
use roster_core::{
    init_logging, load_config, provision_directory, ContactStatus, DirectoryService, IntakeService,
    IntakeSubmission, MailMergeRequest, MailMergeService, NewContact, ReminderService, RosterConfig,
    SqliteContactRepository, SqliteIntakeRepository, SqliteOutbox, SqliteReminderRepository,
    SqliteTagRepository, SqliteTemplateRepository, TagMatchMode, TagRepository, TagSet,
};
use rusqlite::Connection;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "roster")]
#[command(about = "Contact directory, mail merge and meeting reminders")]
struct Cli {
    /// JSON config file; built-in defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Overrides `tag_match` from the config (`substring` or `exact`).
    #[arg(long, global = true)]
    tag_match: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Creates the schema and seeds the tag catalogue and sample contacts.
    Init,
    Contacts {
        #[command(subcommand)]
        command: ContactsCommand,
    },
    /// Emails of active contacts carrying a tag.
    Emails {
        #[arg(long)]
        tag: String,
    },
    /// Distinct tag labels from the tag reference.
    Tags {
        /// Print full reference rows instead of labels.
        #[arg(long, default_value_t = false)]
        catalogue: bool,
    },
    /// Sends a mail merge to every active contact matching a tag.
    Merge(MergeArgs),
    Template {
        #[command(subcommand)]
        command: TemplateCommand,
    },
    Reminders {
        #[command(subcommand)]
        command: RemindersCommand,
    },
    Intake {
        #[command(subcommand)]
        command: IntakeCommand,
    },
    /// Lists queued outgoing messages.
    Outbox {
        #[arg(long)]
        run_id: Option<String>,
    },
}

#[derive(Subcommand)]
enum ContactsCommand {
    Add(ContactArgs),
    List {
        /// Only website-visible profile fields.
        #[arg(long, default_value_t = false)]
        public: bool,
    },
    SetStatus {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        status: String,
    },
    SetTags {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        tags: String,
    },
}

#[derive(Args)]
struct ContactArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long, default_value = "")]
    title: String,
    #[arg(long, default_value = "")]
    phone: String,
    #[arg(long, default_value = "")]
    location: String,
    #[arg(long, default_value = "")]
    bio: String,
    #[arg(long, default_value = "")]
    photo_url: String,
    #[arg(long, default_value = "")]
    tags: String,
    #[arg(long, default_value = "Active")]
    status: String,
    /// Keep the profile off the public website.
    #[arg(long, default_value_t = false)]
    hidden: bool,
}

#[derive(Args)]
struct MergeArgs {
    /// Comma-separated target tags.
    #[arg(long)]
    tags: String,
    /// Stored template to send instead of `--subject`/`--body`.
    #[arg(long, conflicts_with_all = ["subject", "body"])]
    template: Option<String>,
    #[arg(long)]
    subject: Option<String>,
    #[arg(long)]
    body: Option<String>,
}

#[derive(Subcommand)]
enum TemplateCommand {
    Save {
        #[arg(long)]
        name: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        body: String,
    },
    List,
}

#[derive(Subcommand)]
enum RemindersCommand {
    Add {
        #[arg(long)]
        name: String,
        /// `YYYY-MM-DD[ HH:MM[:SS]]`, local time.
        #[arg(long)]
        next: String,
        #[arg(long, default_value = "None")]
        recurrence: String,
        #[arg(long)]
        tags: String,
        #[arg(long, default_value = "")]
        message: String,
    },
    List,
    /// Fires every due reminder once.
    Run {
        /// Evaluate as of this local time instead of the clock.
        #[arg(long)]
        now: Option<String>,
    },
    /// Prints the crontab line for the daily due check.
    CronLine,
}

#[derive(Subcommand)]
enum IntakeCommand {
    /// Appends a form response read from a JSON file.
    Submit {
        #[arg(long)]
        file: PathBuf,
    },
    /// Imports every pending form response as a contact.
    Import,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    init_logging(&config.log_level, &config.log_dir)?;
    info!(
        "event=cli_start module=cli status=ok command={}",
        command_name(&cli.command)
    );

    if let Commands::Reminders {
        command: RemindersCommand::CronLine,
    } = &cli.command
    {
        let exe = std::env::current_exe().map_err(|e| e.to_string())?;
        println!(
            "{}",
            config.reminder_cron_line(&format!("{} reminders run", exe.display()))
        );
        return Ok(());
    }

    let mut conn = open_db(&config.database_path).map_err(|e| e.to_string())?;
    match cli.command {
        Commands::Init => {
            let report = provision_directory(
                &SqliteContactRepository::new(&conn),
                &SqliteTagRepository::new(&conn),
            )
            .map_err(|e| e.to_string())?;
            print_json(&report)
        }
        Commands::Contacts { command } => run_contacts(&conn, &config, command),
        Commands::Emails { tag } => {
            let service = directory(&conn, &config);
            let emails = service.emails_by_tag(&tag).map_err(|e| e.to_string())?;
            print_json(&emails)
        }
        Commands::Tags { catalogue } => {
            let repo = SqliteTagRepository::new(&conn);
            if catalogue {
                print_json(&repo.list_tag_references().map_err(|e| e.to_string())?)
            } else {
                print_json(&repo.list_tags().map_err(|e| e.to_string())?)
            }
        }
        Commands::Merge(args) => run_merge(&conn, &config, args),
        Commands::Template { command } => run_template(&conn, &config, command),
        Commands::Reminders { command } => run_reminders(&conn, &config, command),
        Commands::Intake { command } => run_intake(&mut conn, command),
        Commands::Outbox { run_id } => {
            let run_id = run_id
                .map(|raw| uuid::Uuid::parse_str(raw.trim()).map_err(|e| e.to_string()))
                .transpose()?;
            let queued = SqliteOutbox::new(&conn)
                .list_queued(run_id)
                .map_err(|e| e.to_string())?;
            print_json(&queued)
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<RosterConfig, String> {
    let mut config = match &cli.config {
        Some(path) => load_config(path).map_err(|e| e.to_string())?,
        None => RosterConfig::default(),
    };
    if let Some(db) = &cli.db {
        config.database_path = db.clone();
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = std::path::absolute(log_dir).map_err(|e| e.to_string())?;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(mode) = &cli.tag_match {
        config.tag_match = TagMatchMode::parse(mode)
            .ok_or_else(|| format!("unknown tag match mode `{mode}`; expected substring|exact"))?;
    }
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn directory<'conn>(
    conn: &'conn Connection,
    config: &RosterConfig,
) -> DirectoryService<SqliteContactRepository<'conn>> {
    DirectoryService::new(SqliteContactRepository::new(conn), config.tag_match)
}

fn mail_merge<'conn>(
    conn: &'conn Connection,
    config: &RosterConfig,
) -> MailMergeService<SqliteContactRepository<'conn>, SqliteTemplateRepository<'conn>> {
    MailMergeService::new(
        SqliteContactRepository::new(conn),
        SqliteTemplateRepository::new(conn),
        config.tag_match,
    )
}

fn run_contacts(
    conn: &Connection,
    config: &RosterConfig,
    command: ContactsCommand,
) -> Result<(), String> {
    let service = directory(conn, config);
    match command {
        ContactsCommand::Add(args) => {
            let contact = NewContact {
                full_name: args.name,
                title: args.title,
                email: args.email,
                phone: args.phone,
                location: args.location,
                bio: args.bio,
                photo_url: args.photo_url,
                tags: TagSet::parse(&args.tags),
                website_display: !args.hidden,
                status: parse_status(&args.status)?,
            };
            print_json(&service.add_contact(&contact).map_err(|e| e.to_string())?)
        }
        ContactsCommand::List { public } => {
            if public {
                print_json(&service.list_public_profiles().map_err(|e| e.to_string())?)
            } else {
                print_json(&service.list_contacts().map_err(|e| e.to_string())?)
            }
        }
        ContactsCommand::SetStatus { id, status } => {
            let status = parse_status(&status)?;
            let updated = service
                .update_status(id, status)
                .map_err(|e| e.to_string())?;
            print_json(&updated)
        }
        ContactsCommand::SetTags { id, tags } => {
            let updated = service
                .set_tags(id, TagSet::parse(&tags))
                .map_err(|e| e.to_string())?;
            print_json(&updated)
        }
    }
}

fn run_merge(conn: &Connection, config: &RosterConfig, args: MergeArgs) -> Result<(), String> {
    let service = mail_merge(conn, config);
    let tags = roster_core::model::tag::split_tag_list(&args.tags);
    let mut outbox = SqliteOutbox::new(conn);
    let report = match args.template {
        Some(name) => service.send_template_merge(&mut outbox, &name, tags),
        None => {
            let request = MailMergeRequest {
                tags,
                subject: args
                    .subject
                    .ok_or_else(|| "--subject is required without --template".to_string())?,
                body: args
                    .body
                    .ok_or_else(|| "--body is required without --template".to_string())?,
            };
            service.send_mail_merge(&mut outbox, &request)
        }
    }
    .map_err(|e| e.to_string())?;

    eprintln!("{}", report.summary());
    print_json(&report)
}

fn run_template(
    conn: &Connection,
    config: &RosterConfig,
    command: TemplateCommand,
) -> Result<(), String> {
    let service = mail_merge(conn, config);
    match command {
        TemplateCommand::Save {
            name,
            subject,
            body,
        } => {
            let template = service
                .save_template(&name, &subject, &body)
                .map_err(|e| e.to_string())?;
            print_json(&template)
        }
        TemplateCommand::List => {
            let templates = service.list_templates().map_err(|e| e.to_string())?;
            print_json(&templates)
        }
    }
}

fn run_reminders(
    conn: &Connection,
    config: &RosterConfig,
    command: RemindersCommand,
) -> Result<(), String> {
    let service = ReminderService::new(
        SqliteReminderRepository::new(conn),
        SqliteContactRepository::new(conn),
        config.reminder_settings(),
    );
    match command {
        RemindersCommand::Add {
            name,
            next,
            recurrence,
            tags,
            message,
        } => {
            let reminder = service
                .add_reminder_from_form(&name, &next, &recurrence, &tags, &message)
                .map_err(|e| e.to_string())?;
            print_json(&reminder)
        }
        RemindersCommand::List => {
            let reminders = service.list_reminders().map_err(|e| e.to_string())?;
            print_json(&reminders)
        }
        RemindersCommand::Run { now } => {
            let now = match now {
                Some(raw) => roster_core::parse_next_fire(&raw).map_err(|e| e.to_string())?,
                None => chrono::Local::now().naive_local(),
            };
            let mut outbox = SqliteOutbox::new(conn);
            let report = service
                .run_due(now, &mut outbox)
                .map_err(|e| e.to_string())?;
            print_json(&report)
        }
        RemindersCommand::CronLine => Err("cron-line does not open the store".to_string()),
    }
}

fn run_intake(conn: &mut Connection, command: IntakeCommand) -> Result<(), String> {
    let mut service = IntakeService::new(SqliteIntakeRepository::new(conn));
    match command {
        IntakeCommand::Submit { file } => {
            let raw = std::fs::read_to_string(&file).map_err(|e| e.to_string())?;
            let submission: IntakeSubmission =
                serde_json::from_str(&raw).map_err(|e| e.to_string())?;
            let id = service.submit(&submission).map_err(|e| e.to_string())?;
            print_json(&serde_json::json!({ "response_id": id }))
        }
        IntakeCommand::Import => {
            let report = service
                .handle_submission_event()
                .map_err(|e| e.to_string())?;
            print_json(&report)
        }
    }
}

fn parse_status(value: &str) -> Result<ContactStatus, String> {
    ContactStatus::parse(value.trim()).ok_or_else(|| {
        format!("unknown status `{value}`; expected Active|Inactive|Transitioning")
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), String> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).map_err(|e| e.to_string())?
    );
    Ok(())
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Init => "init",
        Commands::Contacts { .. } => "contacts",
        Commands::Emails { .. } => "emails",
        Commands::Tags { .. } => "tags",
        Commands::Merge(_) => "merge",
        Commands::Template { .. } => "template",
        Commands::Reminders { .. } => "reminders",
        Commands::Intake { .. } => "intake",
        Commands::Outbox { .. } => "outbox",
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_status, Cli};
    use clap::CommandFactory;
    use roster_core::ContactStatus;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_status_accepts_exact_names_only() {
        assert_eq!(parse_status(" Active ").unwrap(), ContactStatus::Active);
        assert!(parse_status("active").is_err());
    }
}
