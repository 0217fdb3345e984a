//! `sentya` - CLI for the Sentya user registry
//!
//! This binary registers, edits and lists users through the same validation,
//! phone and change-set rules the admin dashboard uses.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;

use sentya::cli::{
    CheckCommand, Cli, Command, ConfigCommand, ListCommand, OutputFormat, PhoneCommand,
    UserCommand,
};
use sentya::config::StoreKind;
use sentya::listing::{DashboardStats, Listing, ListingFilter};
use sentya::phone::{search_countries, PhoneNumber};
use sentya::session::EditSession;
use sentya::store::{MemoryStore, SqliteStore, UserStore};
use sentya::{init_logging, Backend, Config, LocalBackend, Role, UserRecord};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::User(user_cmd) => match config.storage.kind {
            StoreKind::Sqlite => {
                let store = SqliteStore::open(config.database_path())
                    .context("failed to open user database")?;
                handle_user(LocalBackend::from_config(store, &config), &config, user_cmd).await
            }
            StoreKind::Memory => {
                tracing::warn!("Memory store selected; changes are discarded on exit");
                let store = MemoryStore::new();
                handle_user(LocalBackend::from_config(store, &config), &config, user_cmd).await
            }
        },
        Command::Check(check_cmd) => handle_check(&config, &check_cmd),
        Command::Phone(phone_cmd) => handle_phone(&config, phone_cmd),
        Command::Login { email, password } => {
            let backend = LocalBackend::from_config(MemoryStore::new(), &config);
            let session = backend.login(&email, &password).await?;
            println!("{}", serde_json::to_string_pretty(&session)?);
            Ok(())
        }
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

async fn handle_user<S: UserStore>(
    backend: LocalBackend<S>,
    config: &Config,
    cmd: UserCommand,
) -> anyhow::Result<()> {
    match cmd {
        UserCommand::Add(fields) => {
            let draft = fields.to_draft(&config.phone.default_prefix)?;
            match backend.create_user(&draft).await {
                Ok(user) => println!("Registered user {} ({})", user.id, user.full_name()),
                Err(err) => return Err(report(err)),
            }
        }
        UserCommand::List(list_cmd) => {
            let users = backend.with_store(|store| store.list())?;
            print_listing(config, &list_cmd, &users)?;
        }
        UserCommand::Show { id, json } => {
            let user = backend
                .with_store(|store| store.get(id))?
                .ok_or(sentya::Error::UserNotFound { id })?;
            if json {
                println!("{}", serde_json::to_string_pretty(&user)?);
            } else {
                print_user(&user);
            }
        }
        UserCommand::Edit {
            id,
            fields,
            clear_birth_date,
        } => {
            let original = backend
                .with_store(|store| store.get(id))?
                .ok_or(sentya::Error::UserNotFound { id })?;
            let mut session =
                EditSession::open(original, backend.validator(), &config.phone.default_prefix);
            fields.apply_to(&mut session)?;
            if clear_birth_date {
                session.set_birth_date(None);
            }

            let changed = session.patch().changed_fields();
            match session.submit(&backend).await {
                Ok(user) => {
                    let names: Vec<&str> = changed.iter().map(|f| f.key()).collect();
                    println!("Updated user {} ({})", user.id, names.join(", "));
                }
                Err(sentya::Error::NoChanges) => println!("No changes to save."),
                Err(err) => return Err(report(err)),
            }
        }
        UserCommand::Online { id, off } => {
            backend.with_store(|store| store.set_online(id, !off))?;
            println!(
                "User {id} is now {}",
                if off { "offline" } else { "online" }
            );
        }
    }
    Ok(())
}

/// Print field errors one per line before handing the error to anyhow.
fn report(err: sentya::Error) -> anyhow::Error {
    if let Some(errors) = err.field_errors() {
        for (field, error) in errors.iter() {
            eprintln!("  {field}: {error}");
        }
    }
    err.into()
}

fn print_listing(config: &Config, cmd: &ListCommand, users: &[UserRecord]) -> anyhow::Result<()> {
    let filter = ListingFilter {
        search: cmd.search.clone().unwrap_or_default(),
        role: cmd.role.map(Role::from),
        online: cmd.online_filter(),
    };

    if cmd.stats {
        let matching: Vec<UserRecord> = filter.apply(users).into_iter().cloned().collect();
        let stats = DashboardStats::compute(&matching);
        if cmd.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            println!("Total:   {}", stats.total);
            println!("Active:  {}", stats.active);
            println!("Online:  {}", stats.online);
            for role in Role::ALL {
                println!("  {:<16} {}", role.label(), stats.count_for(role));
            }
        }
        return Ok(());
    }

    let mut listing = Listing::new(config.listing, cmd.width);
    listing.set_filter(filter);
    listing.go_to(cmd.page);
    let page = listing.view(users);

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&page)?),
        OutputFormat::Table => {
            println!(
                "{:>4}  {:<28} {:<28} {:<15} {:>4}  {:<6} {:<6}",
                "ID", "NAME", "EMAIL", "ROLE", "AGE", "ACTIVE", "ONLINE"
            );
            for user in &page.items {
                println!(
                    "{:>4}  {:<28} {:<28} {:<15} {:>4}  {:<6} {:<6}",
                    user.id,
                    user.full_name(),
                    user.email,
                    user.role.label(),
                    user.age().map_or_else(|| "-".to_string(), |a| a.to_string()),
                    yes_no(user.is_active),
                    yes_no(user.is_online),
                );
            }
            println!();
            println!(
                "Page {} of {} ({} matching)",
                page.page, page.total_pages, page.total_matches
            );
        }
        OutputFormat::Plain => {
            for user in &page.items {
                println!("{}\t{}\t{}", user.id, user.full_name(), user.email);
            }
        }
    }
    Ok(())
}

fn print_user(user: &UserRecord) {
    println!("User {}", user.id);
    println!("---------------");
    println!("Name:          {}", user.full_name());
    println!("Email:         {}", user.email);
    println!("DNI/NIE:       {}", user.dni);
    println!("Phone:         {}", user.phone);
    match (user.birth_date, user.age()) {
        (Some(birth), Some(age)) => println!("Birth date:    {birth} ({age} years)"),
        _ => println!("Birth date:    -"),
    }
    println!("Address:       {}", user.address.as_deref().unwrap_or("-"));
    println!("Observations:  {}", user.observations.as_deref().unwrap_or("-"));
    println!("Role:          {}", user.role.label());
    println!("Active:        {}", yes_no(user.is_active));
    println!("Online:        {}", yes_no(user.is_online));
    println!("Joined:        {}", user.join_date);
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn handle_check(config: &Config, cmd: &CheckCommand) -> anyhow::Result<()> {
    let draft = cmd.fields.to_draft(&config.phone.default_prefix)?.normalized();
    let validator = sentya::Validator::with_bounds(config.validation.bounds());
    let errors = validator.validate(&draft, sentya::user::today());

    if cmd.json {
        let report = serde_json::json!({
            "valid": errors.is_valid(),
            "errors": errors,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if errors.is_valid() {
        println!("All fields are valid.");
    } else {
        for (field, error) in errors.iter() {
            println!("{field}: {error}");
        }
    }

    if errors.is_valid() {
        Ok(())
    } else {
        Err(sentya::Error::Validation(errors).into())
    }
}

fn handle_phone(config: &Config, cmd: PhoneCommand) -> anyhow::Result<()> {
    match cmd {
        PhoneCommand::Split { value, json } => {
            let phone = PhoneNumber::split(&value, &config.phone.default_prefix);
            if json {
                println!("{}", serde_json::to_string_pretty(&phone)?);
            } else {
                let country = phone
                    .country()
                    .map_or_else(|| "unknown".to_string(), |c| format!("{} {}", c.flag(), c.name));
                println!("Prefix:   {} ({country})", phone.prefix());
                println!("Number:   {}", phone.number());
                println!("Stored:   {}", phone.compose());
            }
        }
        PhoneCommand::Countries { query } => {
            let countries = match query.as_deref() {
                Some(q) => search_countries(q),
                None => sentya::phone::COUNTRIES.iter().collect(),
            };
            for country in countries {
                println!(
                    "{:<6} {} {:<20} {}",
                    country.code,
                    country.flag(),
                    country.name,
                    country.iso
                );
            }
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Kind:               {:?}", config.storage.kind);
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Listing]");
                println!("  Breakpoint (px):    {}", config.listing.breakpoint_px);
                println!("  Narrow page size:   {}", config.listing.narrow_page_size);
                println!("  Wide page size:     {}", config.listing.wide_page_size);
                println!();
                println!("[Phone]");
                println!("  Default prefix:     {}", config.phone.default_prefix);
                println!();
                println!("[Validation]");
                println!("  Min age:            {}", config.validation.min_age);
                println!("  Max age:            {}", config.validation.max_age);
                println!();
                println!("[Backend]");
                println!(
                    "  Latency (ms):       {}",
                    config.backend.simulated_latency_ms
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
