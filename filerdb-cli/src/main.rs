use clap::{Parser, Subcommand, ValueEnum};
use filerdb::{Config, FilerDbError, Instance};
use std::path::PathBuf;
use std::process;

/// FilerDB CLI — manage FilerDB databases and collections from the command line
#[derive(Parser)]
#[command(name = "filerdb", version, about)]
struct Cli {
    /// Storage root (overrides DATABASE_PATH from --config)
    #[arg(long)]
    path: Option<PathBuf>,

    /// YAML file with configuration options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Default database for collection commands
    #[arg(long, short)]
    database: Option<String>,

    /// Output format
    #[arg(long, default_value = "yaml")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// List databases under the storage root
    Databases,

    /// Create a database
    CreateDatabase {
        /// Database name
        name: String,
    },

    /// Delete a database and all of its collections
    DropDatabase {
        /// Database name
        name: String,
    },

    /// List collections in the selected database
    Collections,

    /// Create a collection in the selected database
    CreateCollection {
        /// Collection name
        name: String,
    },

    /// Delete a collection from the selected database
    DropCollection {
        /// Collection name
        name: String,
    },

    /// List documents in a collection
    List {
        /// Collection name
        collection: String,
    },

    /// Get a single document by ID
    Get {
        /// Collection name
        collection: String,
        /// Document ID
        id: String,
    },

    /// Insert a new document
    Insert {
        /// Collection name
        collection: String,
        /// Field values (e.g. --field name="Alice Chen")
        #[arg(long = "field", value_parser = parse_key_value)]
        fields: Vec<(String, String)>,
    },

    /// Update fields of an existing document
    Update {
        /// Collection name
        collection: String,
        /// Document ID
        id: String,
        /// Field values to update (e.g. --field status=published)
        #[arg(long = "field", value_parser = parse_key_value)]
        fields: Vec<(String, String)>,
    },

    /// Delete a document
    Delete {
        /// Collection name
        collection: String,
        /// Document ID
        id: String,
    },

    /// Show the storage root, writability and selected database
    Status,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let pos = s.find('=').ok_or_else(|| {
        format!("Invalid key=value pair: no '=' found in '{s}'")
    })?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("ERROR:{}: {e}", e.kind());
        process::exit(1);
    }
}

fn build_config(cli: &Cli) -> filerdb::Result<Config> {
    let mut config = match &cli.config {
        Some(file) => Config::load(file)?,
        None => Config::new(),
    };
    if let Some(path) = &cli.path {
        config.database_path = Some(path.clone());
    }
    if let Some(database) = &cli.database {
        config.database = Some(database.clone());
    }
    Ok(config)
}

fn run(cli: Cli) -> filerdb::Result<()> {
    let config = build_config(&cli)?;
    log::debug!("Opening FilerDB with {config:?}");
    let instance = Instance::new(config)?;

    match cli.command {
        Command::Databases => {
            let names = instance.databases().list()?;
            print_output(&serde_json::json!(names), &cli.format)?;
        }

        Command::CreateDatabase { name } => {
            instance.databases().create(&name)?;
            print_output(&serde_json::json!({ "ok": true, "created": name }), &cli.format)?;
        }

        Command::DropDatabase { name } => {
            instance.databases().drop(&name)?;
            print_output(&serde_json::json!({ "ok": true, "dropped": name }), &cli.format)?;
        }

        Command::Collections => {
            let names = selected(&instance)?.collections()?;
            print_output(&serde_json::json!(names), &cli.format)?;
        }

        Command::CreateCollection { name } => {
            selected(&instance)?.create_collection(&name)?;
            print_output(&serde_json::json!({ "ok": true, "created": name }), &cli.format)?;
        }

        Command::DropCollection { name } => {
            selected(&instance)?.drop_collection(&name)?;
            print_output(&serde_json::json!({ "ok": true, "dropped": name }), &cli.format)?;
        }

        Command::List { collection } => {
            let docs = instance.collection(&collection)?.all()?;
            print_output(&serde_json::Value::Array(docs), &cli.format)?;
        }

        Command::Get { collection, id } => {
            let doc = instance.collection(&collection)?.get(&id)?;
            print_output(&doc, &cli.format)?;
        }

        Command::Insert { collection, fields } => {
            let id = instance
                .collection(&collection)?
                .insert(fields_to_value(&fields))?;
            print_output(&serde_json::json!({ "id": id }), &cli.format)?;
        }

        Command::Update {
            collection,
            id,
            fields,
        } => {
            let doc = instance
                .collection(&collection)?
                .update(&id, fields_to_value(&fields))?;
            print_output(&doc, &cli.format)?;
        }

        Command::Delete { collection, id } => {
            instance.collection(&collection)?.delete(&id)?;
            print_output(&serde_json::json!({ "ok": true, "deleted": id }), &cli.format)?;
        }

        Command::Status => {
            let status = serde_json::json!({
                "path": instance.databases().root().display().to_string(),
                "status": instance.status(),
                "database": instance.default_database().map(|db| db.name().to_string()),
            });
            print_output(&status, &cli.format)?;
        }
    }

    Ok(())
}

fn selected(instance: &Instance) -> filerdb::Result<&filerdb::Database> {
    instance
        .default_database()
        .ok_or(FilerDbError::DatabaseNotSelected)
}

fn print_output(value: &serde_json::Value, format: &OutputFormat) -> filerdb::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(value)?);
        }
    }
    Ok(())
}

fn fields_to_value(fields: &[(String, String)]) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for (key, val) in fields {
        // Try to parse as JSON value (for numbers, booleans, arrays, objects)
        let json_val = serde_json::from_str(val).unwrap_or(serde_json::Value::String(val.clone()));
        map.insert(key.clone(), json_val);
    }
    serde_json::Value::Object(map)
}
