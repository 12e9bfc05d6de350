use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod csv;
mod db;
mod error;
mod filter;
mod models;
mod render;
mod session;
mod store;
mod view;

use error::Error;
use models::{InternPatch, InternshipStatus, InternshipType, Person};
use store::Store;
use view::Dashboard;

#[derive(Parser)]
#[command(name = "intern-tracker")]
#[command(about = "Internship record tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load demo persons and intern records for the current user
    Seed,
    /// Record the signed-in user (authentication itself is external)
    Login {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// Clear the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Manage persons, the owners of intern records
    Person {
        #[command(subcommand)]
        command: PersonCommands,
    },
    /// Manage individual intern records
    Intern {
        #[command(subcommand)]
        command: InternCommands,
    },
    /// Show a person's intern table
    List {
        #[arg(long)]
        person: String,
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = filter::ALL)]
        status: String,
        #[arg(long = "type", default_value = filter::ALL)]
        kind: String,
        /// Per-column filter, repeatable: --filter column=value
        #[arg(long = "filter")]
        filters: Vec<String>,
        /// Comma-separated column keys to show instead of the defaults
        #[arg(long)]
        columns: Option<String>,
    },
    /// Import intern records from a CSV file
    Import {
        #[arg(long)]
        person: String,
        #[arg(long)]
        csv: PathBuf,
    },
    /// Export a person's intern records as CSV
    Export {
        #[arg(long)]
        person: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List the distinct values of a column, for filter choices
    Values {
        #[arg(long)]
        person: String,
        column: String,
    },
}

#[derive(Subcommand)]
enum PersonCommands {
    /// Add a new person or department
    Add { name: String },
    /// List persons, optionally filtered by name
    List {
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Rename a person
    Rename {
        id: Uuid,
        #[arg(long)]
        name: String,
    },
    /// Delete persons and all their intern records
    Delete {
        ids: Vec<Uuid>,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum InternCommands {
    /// Add a new intern record
    Add {
        #[arg(long)]
        person: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        status: Option<InternshipStatus>,
        #[arg(long = "date-applied")]
        date_applied: Option<String>,
        #[arg(long)]
        interviewer: Option<String>,
        #[arg(long = "type")]
        kind: Option<InternshipType>,
        #[arg(long = "joining-date")]
        joining_date: Option<String>,
        #[arg(long)]
        duration: Option<String>,
        #[arg(long = "offer-accepted")]
        offer_accepted: bool,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long, default_value_t = 0)]
        rating: i32,
        #[arg(long = "full-time")]
        full_time: bool,
    },
    /// Update fields of an existing record
    Edit {
        #[arg(long)]
        person: String,
        /// Record id or its Sr No.
        intern: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        status: Option<InternshipStatus>,
        #[arg(long = "date-applied")]
        date_applied: Option<String>,
        #[arg(long)]
        interviewer: Option<String>,
        #[arg(long = "type")]
        kind: Option<InternshipType>,
        #[arg(long = "joining-date")]
        joining_date: Option<String>,
        #[arg(long)]
        duration: Option<String>,
        #[arg(long = "offer-accepted")]
        offer_accepted: Option<bool>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        rating: Option<i32>,
        #[arg(long = "full-time")]
        full_time: Option<bool>,
    },
    /// Edit a single cell in place
    Set {
        #[arg(long)]
        person: String,
        /// Record id or its Sr No.
        intern: String,
        column: String,
        value: String,
    },
    /// Show one record in full
    View {
        #[arg(long)]
        person: String,
        /// Record id or its Sr No.
        intern: String,
    },
    /// Delete a record and renumber the rest
    Delete {
        #[arg(long)]
        person: String,
        /// Record id or its Sr No.
        intern: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();

    let cli = Cli::parse();

    // Session commands never touch the database.
    match &cli.command {
        Commands::Login { name, email } => {
            let session = session::login(name, email)?;
            println!("Logged in as {} <{}>.", session.user_name, session.email);
            return Ok(());
        }
        Commands::Logout => {
            if session::logout()? {
                println!("You have been logged out.");
            } else {
                println!("No active session.");
            }
            return Ok(());
        }
        Commands::Whoami => {
            match session::current()? {
                Some(session) => println!(
                    "{} <{}> (user id {})",
                    session.user_name, session.email, session.user_id
                ),
                None => println!("Not logged in."),
            }
            return Ok(());
        }
        _ => {}
    }

    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a Postgres instance")?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    run(cli.command, pool).await
}

async fn run(command: Commands, pool: PgPool) -> anyhow::Result<()> {
    let store = db::PgStore::new(pool.clone());

    match command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let session = session::require()?;
            db::seed(&pool, session.user_id).await?;
            println!("Seed data inserted.");
        }
        Commands::Person { command } => person_command(command, &store).await?,
        Commands::Intern { command } => intern_command(command, &store).await?,
        Commands::List {
            person,
            search,
            status,
            kind,
            filters,
            columns,
        } => {
            let session = session::require()?;
            let person = resolve_person(&store, session.user_id, &person).await?;
            let mut dash = Dashboard::load(&store, person.id, person.name).await?;

            dash.search_query = search;
            dash.status_filter = status;
            dash.type_filter = kind;
            for spec in &filters {
                let (column, value) = spec.split_once('=').ok_or_else(|| {
                    Error::Validation(format!("bad filter '{spec}', expected column=value"))
                })?;
                if models::column_by_key(column).is_none() {
                    return Err(Error::Validation(format!("unknown column: {column}")).into());
                }
                dash.column_filters
                    .insert(column.to_string(), value.to_string());
            }
            if let Some(columns) = columns {
                let keys: Vec<String> =
                    columns.split(',').map(|key| key.trim().to_string()).collect();
                dash.set_visible_columns(&keys)?;
            }

            let visible = dash.visible_interns();
            let stats = dash.stats();
            if visible.is_empty() {
                if stats.total == 0 {
                    println!("No interns added yet. Run `intern-tracker intern add` to get started.");
                } else {
                    println!("No interns match your filters.");
                }
            } else {
                print!("{}", render::table(&visible, &dash.visible_columns()));
            }
            println!("{}", render::stats_line(&stats));
        }
        Commands::Import { person, csv: path } => {
            let session = session::require()?;
            let person = resolve_person(&store, session.user_id, &person).await?;
            if path.extension().and_then(|ext| ext.to_str()) != Some("csv") {
                return Err(Error::Format("please provide a .csv file".to_string()).into());
            }
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let drafts = csv::parse(&text)?;
            println!("{} record(s) found in {}.", drafts.len(), path.display());

            let mut dash = Dashboard::load(&store, person.id, person.name).await?;
            let count = dash.import(drafts).await?;
            println!("{count} intern(s) have been imported.");
        }
        Commands::Export { person, out } => {
            let session = session::require()?;
            let person = resolve_person(&store, session.user_id, &person).await?;
            let dash = Dashboard::load(&store, person.id, person.name).await?;

            let (file_name, content) = dash.export(Utc::now().date_naive());
            let path = out.unwrap_or_else(|| PathBuf::from(file_name));
            std::fs::write(&path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!(
                "Exported {} record(s) to {}.",
                dash.interns().len(),
                path.display()
            );
        }
        Commands::Values { person, column } => {
            let session = session::require()?;
            let person = resolve_person(&store, session.user_id, &person).await?;
            let dash = Dashboard::load(&store, person.id, person.name).await?;
            for value in dash.unique_values(&column)? {
                println!("{value}");
            }
        }
        Commands::Login { .. } | Commands::Logout | Commands::Whoami => {
            unreachable!("handled before connecting")
        }
    }

    Ok(())
}

async fn person_command(command: PersonCommands, store: &db::PgStore) -> anyhow::Result<()> {
    let session = session::require()?;

    match command {
        PersonCommands::Add { name } => {
            if name.trim().is_empty() {
                return Err(Error::Validation("please enter a name".to_string()).into());
            }
            let now = Utc::now();
            let person = Person {
                id: Uuid::new_v4(),
                name: name.trim().to_string(),
                user_id: session.user_id,
                created_at: now,
                updated_at: now,
            };
            store.insert_person(&person).await?;
            println!("{} has been added.", person.name);
        }
        PersonCommands::List { search } => {
            let persons = store.list_persons(session.user_id).await?;
            let visible = filter::filter_persons(&persons, &search);
            if visible.is_empty() {
                if search.is_empty() {
                    println!("No persons added yet.");
                } else {
                    println!("No results found.");
                }
            } else {
                print!("{}", render::person_list(&visible));
            }
        }
        PersonCommands::Rename { id, name } => {
            if name.trim().is_empty() {
                return Err(Error::Validation("please enter a name".to_string()).into());
            }
            store.rename_person(id, name.trim()).await?;
            println!("Person renamed.");
        }
        PersonCommands::Delete { ids, yes } => {
            if ids.is_empty() {
                return Err(Error::Validation("please select persons to delete".to_string()).into());
            }
            if !yes {
                println!(
                    "This will delete {} person(s) and all intern records associated with them.",
                    ids.len()
                );
                println!("This action cannot be undone. Re-run with --yes to confirm.");
                return Ok(());
            }
            store.delete_persons(&ids).await?;
            println!("{} person(s) and their records have been deleted.", ids.len());
        }
    }

    Ok(())
}

async fn intern_command(command: InternCommands, store: &db::PgStore) -> anyhow::Result<()> {
    let session = session::require()?;

    match command {
        InternCommands::Add {
            person,
            name,
            email,
            phone,
            status,
            date_applied,
            interviewer,
            kind,
            joining_date,
            duration,
            offer_accepted,
            notes,
            rating,
            full_time,
        } => {
            let person = resolve_person(store, session.user_id, &person).await?;
            let mut dash = Dashboard::load(store, person.id, person.name).await?;

            let mut form = view::default_form(Utc::now().date_naive());
            form.intern_name = name.clone();
            form.email = email;
            form.accepted_offer_letter = offer_accepted;
            form.performance_rating = rating;
            form.full_time_conversion = full_time;
            if let Some(value) = phone {
                form.phone_number = value;
            }
            if let Some(value) = status {
                form.internship_status = value;
            }
            if let Some(value) = date_applied {
                form.date_applied = value;
            }
            if let Some(value) = interviewer {
                form.interviewer = value;
            }
            if let Some(value) = kind {
                form.internship_type = value;
            }
            if let Some(value) = joining_date {
                form.joining_date = value;
            }
            if let Some(value) = duration {
                form.duration = value;
            }
            if let Some(value) = notes {
                form.notes = value;
            }

            dash.add_intern(form).await?;
            println!("{name} has been added successfully.");
        }
        InternCommands::Edit {
            person,
            intern,
            name,
            email,
            phone,
            status,
            date_applied,
            interviewer,
            kind,
            joining_date,
            duration,
            offer_accepted,
            notes,
            rating,
            full_time,
        } => {
            let person = resolve_person(store, session.user_id, &person).await?;
            let mut dash = Dashboard::load(store, person.id, person.name).await?;
            let id = resolve_intern(&dash, &intern)?;

            let patch = InternPatch {
                intern_name: name,
                email,
                phone_number: phone,
                internship_status: status,
                date_applied,
                interviewer,
                internship_type: kind,
                joining_date,
                duration,
                accepted_offer_letter: offer_accepted,
                notes,
                performance_rating: rating,
                full_time_conversion: full_time,
                ..InternPatch::default()
            };
            dash.update_intern(id, patch).await?;

            let updated = dash.select(id)?;
            println!("{}'s record has been updated.", updated.intern_name);
        }
        InternCommands::Set {
            person,
            intern,
            column,
            value,
        } => {
            let person = resolve_person(store, session.user_id, &person).await?;
            let mut dash = Dashboard::load(store, person.id, person.name).await?;
            let id = resolve_intern(&dash, &intern)?;
            dash.set_cell(id, &column, &value).await?;
            println!("Updated {column}.");
        }
        InternCommands::View { person, intern } => {
            let person = resolve_person(store, session.user_id, &person).await?;
            let mut dash = Dashboard::load(store, person.id, person.name).await?;
            let id = resolve_intern(&dash, &intern)?;
            let record = dash.select(id)?;
            print!("{}", render::detail(record));
        }
        InternCommands::Delete { person, intern } => {
            let person = resolve_person(store, session.user_id, &person).await?;
            let mut dash = Dashboard::load(store, person.id, person.name).await?;
            let id = resolve_intern(&dash, &intern)?;
            let removed = dash.delete_intern(id).await?;
            println!("{} has been removed.", removed.intern_name);
        }
    }

    Ok(())
}

/// Accept a person by id or by (case-insensitive) name, scoped to the
/// signed-in user.
async fn resolve_person(
    store: &db::PgStore,
    user_id: Uuid,
    spec: &str,
) -> anyhow::Result<Person> {
    let persons = store.list_persons(user_id).await?;

    if let Ok(id) = Uuid::parse_str(spec) {
        if let Some(person) = persons.iter().find(|person| person.id == id) {
            return Ok(person.clone());
        }
    }

    persons
        .iter()
        .find(|person| person.name.eq_ignore_ascii_case(spec))
        .cloned()
        .with_context(|| format!("no person matching '{spec}'"))
}

/// Accept a record by id or by its Sr No. within the loaded dashboard.
fn resolve_intern(dash: &Dashboard<'_>, spec: &str) -> anyhow::Result<Uuid> {
    if let Ok(sr_no) = spec.parse::<i32>() {
        return dash
            .interns()
            .iter()
            .find(|intern| intern.sr_no == sr_no)
            .map(|intern| intern.id)
            .with_context(|| format!("no intern with Sr No. {sr_no}"));
    }

    let id = Uuid::parse_str(spec)
        .with_context(|| format!("'{spec}' is neither a Sr No. nor a record id"))?;
    dash.interns()
        .iter()
        .find(|intern| intern.id == id)
        .map(|intern| intern.id)
        .with_context(|| format!("no intern with id {id}"))
}
