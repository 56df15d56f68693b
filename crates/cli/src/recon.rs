//! `mvd run | validate | query`: config-driven movement reconciliation.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use tracing::{debug, info};

use movement_recon::config::{DatabaseConfig, ReconConfig};
use movement_recon::engine::load_csv_rows;
use movement_recon::export::{highlighted_columns, write_records_csv, HeaderStyle};
use movement_recon::filter::{options_query, MovementFilter, MovementQuery};
use movement_recon::{MatchPolicy, MovementResult};

use crate::exit_codes::{
    EXIT_ERROR, EXIT_RECON_EMPTY, EXIT_RECON_INVALID_CONFIG, EXIT_RECON_MISMATCH,
    EXIT_RECON_RUNTIME, EXIT_USAGE,
};
use crate::util::{pad_left, pad_right};
use crate::CliError;

#[derive(Subcommand)]
pub enum ReconCommands {
    /// Reconcile a movement export from a TOML config file
    #[command(after_help = "\
Examples:
  mvd run movement.toml
  mvd run movement.toml --from 2026-01-14 --to 2026-01-15 --outlet Kemang
  mvd run movement.toml --policy consumption --json
  mvd run movement.toml --csv movement_daily.csv --table")]
    Run {
        /// Path to the .movement.toml config file
        config: PathBuf,

        /// CSV export of the movement view (overrides [source] file)
        #[arg(long)]
        input: Option<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,

        /// Match policy: closing_stock or consumption (overrides config)
        #[arg(long)]
        policy: Option<String>,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write reconciled rows as CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// CSV header style: display or source (overrides config)
        #[arg(long)]
        headers: Option<String>,

        /// Print the reconciled table to stdout, mismatches marked with '!'
        #[arg(long, conflicts_with = "json")]
        table: bool,

        /// Exit 61 when any row is mismatched
        #[arg(long)]
        fail_on_mismatch: bool,
    },

    /// Validate a movement config without running
    #[command(after_help = "\
Examples:
  mvd validate movement.toml")]
    Validate {
        /// Path to the .movement.toml config file
        config: PathBuf,
    },

    /// Print the view query for the external query layer
    #[command(after_help = "\
Examples:
  mvd query movement.toml
  mvd query movement.toml --outlet Kemang --item 'Kopi Susu' --json
  mvd query movement.toml --options")]
    Query {
        /// Path to the .movement.toml config file
        config: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        database: DatabaseArgs,

        /// Print the outlet/item lookup query instead
        #[arg(long)]
        options: bool,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },
}

/// Filter overrides shared by `run` and `query`.
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// First day of the period (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", requires = "to")]
    pub from: Option<NaiveDate>,

    /// Last day of the period, inclusive (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", requires = "from")]
    pub to: Option<NaiveDate>,

    /// Restrict to an outlet. Repeatable.
    #[arg(long, value_name = "OUTLET")]
    pub outlet: Vec<String>,

    /// Restrict to an item. Repeatable.
    #[arg(long, value_name = "ITEM")]
    pub item: Vec<String>,
}

/// Connection overrides, read once from flags or the environment.
#[derive(Args, Debug, Default)]
pub struct DatabaseArgs {
    #[arg(long, env = "MOVEMENT_DB_HOST")]
    pub db_host: Option<String>,

    #[arg(long, env = "MOVEMENT_DB_PORT")]
    pub db_port: Option<u16>,

    #[arg(long, env = "MOVEMENT_DB_NAME")]
    pub db_name: Option<String>,

    #[arg(long, env = "MOVEMENT_DB_USER")]
    pub db_user: Option<String>,

    #[arg(long, env = "MOVEMENT_DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,
}

impl DatabaseArgs {
    fn apply(self, db: &mut DatabaseConfig) {
        if let Some(host) = self.db_host {
            db.host = host;
        }
        if let Some(port) = self.db_port {
            db.port = port;
        }
        if let Some(name) = self.db_name {
            db.name = name;
        }
        if let Some(user) = self.db_user {
            db.user = user;
        }
        if self.db_password.is_some() {
            db.password = self.db_password;
        }
    }
}

pub fn cmd_recon(cmd: ReconCommands) -> Result<(), CliError> {
    match cmd {
        ReconCommands::Run {
            config,
            input,
            filter,
            policy,
            json,
            output,
            csv,
            headers,
            table,
            fail_on_mismatch,
        } => cmd_recon_run(RunOptions {
            config_path: config,
            input,
            filter,
            policy,
            json_output: json,
            output_file: output,
            csv_file: csv,
            headers,
            table,
            fail_on_mismatch,
        }),
        ReconCommands::Validate { config } => cmd_recon_validate(config),
        ReconCommands::Query { config, filter, database, options, json } => {
            cmd_recon_query(config, filter, database, options, json)
        }
    }
}

fn recon_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

fn load_config(config_path: &Path) -> Result<ReconConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path)
        .map_err(|e| recon_err(EXIT_RECON_RUNTIME, format!("cannot read config: {e}")))?;
    ReconConfig::from_toml(&config_str)
        .map_err(|e| recon_err(EXIT_RECON_INVALID_CONFIG, e.to_string()))
}

fn base_dir(config_path: &Path) -> &Path {
    config_path.parent().unwrap_or_else(|| Path::new("."))
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Config defaults first, then command-line overrides.
fn resolve_filter(config: &ReconConfig, args: FilterArgs) -> Result<MovementFilter, CliError> {
    let mut filter = MovementFilter::from_config(&config.filter, today());

    if let (Some(from), Some(to)) = (args.from, args.to) {
        if from > to {
            return Err(recon_err(EXIT_USAGE, format!("--from {from} is after --to {to}")));
        }
        filter.start = from;
        filter.end = to;
    }
    if !args.outlet.is_empty() {
        filter = filter.outlets(args.outlet);
    }
    if !args.item.is_empty() {
        filter = filter.items(args.item);
    }

    Ok(filter)
}

struct RunOptions {
    config_path: PathBuf,
    input: Option<PathBuf>,
    filter: FilterArgs,
    policy: Option<String>,
    json_output: bool,
    output_file: Option<PathBuf>,
    csv_file: Option<PathBuf>,
    headers: Option<String>,
    table: bool,
    fail_on_mismatch: bool,
}

fn cmd_recon_run(opts: RunOptions) -> Result<(), CliError> {
    let mut config = load_config(&opts.config_path)?;
    let config_dir = base_dir(&opts.config_path);

    if let Some(ref policy) = opts.policy {
        config.policy = policy
            .parse::<MatchPolicy>()
            .map_err(|e| recon_err(EXIT_USAGE, e.to_string()))?;
    }

    let header_style = match opts.headers {
        Some(ref h) => h.parse::<HeaderStyle>().map_err(|e| recon_err(EXIT_USAGE, e))?,
        None => config.output.headers,
    };

    let filter = resolve_filter(&config, opts.filter)?;

    // CLI paths are relative to the working directory, config paths to the config file.
    let input_path = match (opts.input, config.source.as_ref()) {
        (Some(path), _) => path,
        (None, Some(source)) => config_dir.join(&source.file),
        (None, None) => {
            return Err(recon_err(
                EXIT_RECON_INVALID_CONFIG,
                "no input: config has no [source] file and --input was not given",
            ))
        }
    };
    let json_path = opts
        .output_file
        .or_else(|| config.output.json.as_ref().map(|p| config_dir.join(p)));
    let csv_path = opts
        .csv_file
        .or_else(|| config.output.csv.as_ref().map(|p| config_dir.join(p)));

    let csv_data = std::fs::read_to_string(&input_path).map_err(|e| {
        recon_err(EXIT_RECON_RUNTIME, format!("cannot read {}: {e}", input_path.display()))
    })?;
    let rows = load_csv_rows(&csv_data, &config.columns)
        .map_err(|e| recon_err(EXIT_RECON_RUNTIME, format!("{}: {e}", input_path.display())))?;
    info!(rows = rows.len(), input = %input_path.display(), "loaded movement export");

    let result = movement_recon::run(&config, &filter, &rows);

    eprintln!("period: {} to {}", filter.start, filter.end);

    if result.records.is_empty() {
        let mut err = recon_err(EXIT_RECON_EMPTY, "no data for the selected filter");
        if !result.skipped.is_empty() {
            err = err.with_hint(format!("{} row(s) were skipped as invalid", result.skipped.len()));
        }
        return Err(err);
    }

    write_outputs(&result, json_path.as_deref(), csv_path.as_deref(), header_style, opts.json_output)?;

    if opts.table {
        print_table(&result);
    }

    // Human summary to stderr
    let s = &result.summary;
    eprintln!(
        "{} rows ({}): {} sesuai, {} tidak sesuai, {} skipped",
        s.total,
        config.policy,
        s.matched,
        s.mismatched,
        result.skipped.len(),
    );
    if s.upstream_disagreements > 0 {
        eprintln!("note: {} row(s) disagree with the view's so_flag", s.upstream_disagreements);
    }

    if opts.fail_on_mismatch && s.mismatched > 0 {
        return Err(recon_err(EXIT_RECON_MISMATCH, format!("{} mismatched row(s)", s.mismatched)));
    }

    Ok(())
}

fn write_outputs(
    result: &MovementResult,
    json_path: Option<&Path>,
    csv_path: Option<&Path>,
    header_style: HeaderStyle,
    json_stdout: bool,
) -> Result<(), CliError> {
    if json_path.is_some() || json_stdout {
        let json_str = serde_json::to_string_pretty(result)
            .map_err(|e| recon_err(EXIT_ERROR, format!("JSON serialization error: {e}")))?;

        if let Some(path) = json_path {
            std::fs::write(path, &json_str)
                .map_err(|e| recon_err(EXIT_RECON_RUNTIME, format!("cannot write output: {e}")))?;
            eprintln!("wrote {}", path.display());
        }
        if json_stdout {
            println!("{json_str}");
        }
    }

    if let Some(path) = csv_path {
        let file = std::fs::File::create(path)
            .map_err(|e| recon_err(EXIT_RECON_RUNTIME, format!("cannot write {}: {e}", path.display())))?;
        write_records_csv(&result.records, file, header_style)
            .map_err(|e| recon_err(EXIT_RECON_RUNTIME, e.to_string()))?;
        eprintln!("wrote {}", path.display());
    }

    Ok(())
}

/// Plain-text table. Mismatched rows carry a '!' marker.
fn print_table(result: &MovementResult) {
    const OUTLET_W: usize = 14;
    const ITEM_W: usize = 18;
    const QTY_W: usize = 8;

    println!(
        "  {} {} {} {} {} {} {}",
        pad_right("Tanggal", 10),
        pad_right("Outlet", OUTLET_W),
        pad_right("Nama Produk", ITEM_W),
        pad_left("Sisa", QTY_W),
        pad_left("Seharus", QTY_W),
        pad_left("Selisih", QTY_W),
        "Status Stok",
    );

    for r in &result.records {
        let marker = if highlighted_columns(r).is_empty() { ' ' } else { '!' };
        println!(
            "{marker} {} {} {} {} {} {} {}",
            r.date,
            pad_right(&r.outlet, OUTLET_W),
            pad_right(&r.item, ITEM_W),
            pad_left(&r.closing_stock.to_string(), QTY_W),
            pad_left(&r.expected_closing_stock.to_string(), QTY_W),
            pad_left(&r.gap_qty.to_string(), QTY_W),
            r.status,
        );
    }
}

fn cmd_recon_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let source = config
        .source
        .as_ref()
        .map(|s| s.file.as_str())
        .unwrap_or("none");
    eprintln!(
        "valid: '{}' policy={} source={} lookback_days={}",
        config.name, config.policy, source, config.filter.lookback_days,
    );
    Ok(())
}

fn cmd_recon_query(
    config_path: PathBuf,
    filter_args: FilterArgs,
    database: DatabaseArgs,
    options: bool,
    json_output: bool,
) -> Result<(), CliError> {
    let mut config = load_config(&config_path)?;
    database.apply(&mut config.database);
    debug!(database = ?config.database, "resolved database settings");

    let query: MovementQuery = if options {
        options_query()
    } else {
        resolve_filter(&config, filter_args)?.to_query()
    };

    if json_output {
        let out = serde_json::json!({
            "connection": config.database.connection_url(),
            "sql": query.sql,
            "params": query.params,
        });
        println!("{out}");
    } else {
        let params = serde_json::to_string(&query.params)
            .map_err(|e| recon_err(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
        println!("-- connection: {}", config.database.connection_url());
        println!("{}", query.sql);
        println!("-- params: {params}");
    }

    Ok(())
}
