use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use rbyte_app_core::FilePersistence;
use rbyte_cli::commands::{self, FlowOutcome};
use rbyte_cli::prompt::StdinPrompter;
use rbyte_cli::{resolve_settings, CliLeadKind, FormArgs};
use rbyte_core::FlowSpec;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,
    #[arg(long, global = true, env = "RBYTE_API_BASE", help = "Backend base URL")]
    api_base: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enroll in the program
    Enroll {
        #[command(flatten)]
        form: FormArgs,
    },
    /// Register interest in the program
    Register {
        #[command(flatten)]
        form: FormArgs,
    },
    /// Reserve a seat in a masterclass
    Masterclass {
        id: String,
        #[command(flatten)]
        form: FormArgs,
    },
    /// Verify a phone number to unlock the syllabus
    Syllabus {
        #[arg(short, long, help = "Download the curriculum to this file")]
        output: Option<Utf8PathBuf>,
        #[command(flatten)]
        form: FormArgs,
    },
    /// Admin view of collected leads
    Leads {
        #[command(subcommand)]
        command: LeadsCommands,
    },
    /// Browse a masterclass catalog file
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
    Curriculum {
        #[arg(short, long)]
        output: Option<Utf8PathBuf>,
    },
    /// Show or change saved settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
}

#[derive(Subcommand)]
enum LeadsCommands {
    Overview,
    List {
        #[arg(value_enum)]
        kind: CliLeadKind,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        page_size: Option<u32>,
    },
}

#[derive(Subcommand)]
enum CatalogCommands {
    Search {
        #[arg(long)]
        file: Utf8PathBuf,
        #[arg(short, long, default_value = "")]
        query: String,
        #[arg(short, long)]
        category: Option<String>,
    },
    Categories {
        #[arg(long)]
        file: Utf8PathBuf,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    Show,
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("default subscriber");

    let repo = FilePersistence::new();
    let settings = resolve_settings(&repo, cli.api_base)?;

    let run_flow = |spec: FlowSpec, form: FormArgs, output: Option<Utf8PathBuf>| {
        let fields = form.into_fields(&settings.default_country_code);
        let settings = settings.clone();
        async move {
            let client = commands::build_client(&settings)?;
            let outcome =
                commands::cmd_flow(client, spec, fields, &mut StdinPrompter, output).await?;
            if outcome == FlowOutcome::Closed {
                anyhow::bail!("closed before the form was submitted");
            }
            anyhow::Ok(())
        }
    };

    match cli.command {
        Commands::Enroll { form } => run_flow(FlowSpec::enrollment(), form, None).await?,
        Commands::Register { form } => run_flow(FlowSpec::interest(), form, None).await?,
        Commands::Masterclass { id, form } => {
            run_flow(FlowSpec::masterclass(Some(id)), form, None).await?
        }
        Commands::Syllabus { output, form } => {
            run_flow(FlowSpec::syllabus_download(), form, output).await?
        }
        Commands::Leads { command } => {
            let client = commands::build_client(&settings)?;
            match command {
                LeadsCommands::Overview => {
                    commands::cmd_leads_overview(client).await?;
                }
                LeadsCommands::List {
                    kind,
                    page,
                    page_size,
                } => {
                    let page_size = page_size.unwrap_or(settings.page_size);
                    commands::cmd_leads_list(client, kind.into(), page, page_size).await?;
                }
            }
        }
        Commands::Catalog { command } => match command {
            CatalogCommands::Search {
                file,
                query,
                category,
            } => {
                commands::cmd_catalog_search(&file, &query, category.as_deref())?;
            }
            CatalogCommands::Categories { file } => {
                commands::cmd_catalog_categories(&file)?;
            }
        },
        Commands::Curriculum { output } => {
            let client = commands::build_client(&settings)?;
            commands::cmd_curriculum(&client, output).await?;
        }
        Commands::Settings { command } => match command {
            SettingsCommands::Show => {
                commands::cmd_settings_show(&repo)?;
            }
            SettingsCommands::Set { key, value } => {
                commands::cmd_settings_set(&repo, &key, &value)?;
            }
        },
    }

    Ok(())
}
