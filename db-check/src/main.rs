//! Checks that the configured PostgreSQL connection string works and lists
//! the databases it can see. Exits non-zero with hints when it does not.

use std::{env, process::ExitCode, str::FromStr};

use tokio_postgres::{Config, NoTls, config::Host};

#[derive(Debug, thiserror::Error)]
enum CheckError {
    #[error("neither DATABASE_URL nor PG_DSN is set")]
    MissingDsn,

    #[error("connection string could not be parsed")]
    InvalidDsn,

    #[error("{0}")]
    Postgres(#[from] tokio_postgres::Error),
}

fn connection_string() -> Result<String, CheckError> {
    env::var("DATABASE_URL")
        .or_else(|_| env::var("PG_DSN"))
        .map_err(|_| CheckError::MissingDsn)
}

/// Describes the connection target with credentials replaced by placeholders.
///
/// Built from the parsed configuration, so nothing of the password survives
/// however it was quoted or escaped.
fn redacted(config: &Config) -> String {
    let mut out = String::from("postgres://");

    if config.get_user().is_some() || config.get_password().is_some() {
        out.push_str("USERNAME:PASSWORD@");
    }

    let ports = config.get_ports();
    let hosts: Vec<String> = config
        .get_hosts()
        .iter()
        .enumerate()
        .map(|(i, host)| {
            let name = match host {
                Host::Tcp(name) => name.clone(),
                #[cfg(unix)]
                Host::Unix(path) => path.display().to_string(),
            };
            match ports.get(i).or_else(|| ports.first()) {
                Some(port) => format!("{name}:{port}"),
                None => name,
            }
        })
        .collect();
    out.push_str(&hosts.join(","));

    if let Some(dbname) = config.get_dbname() {
        out.push('/');
        out.push_str(dbname);
    }

    out
}

/// Host names never contain `@`; one that does is the tail of an unescaped password.
fn parse_dsn(dsn: &str) -> Result<Config, CheckError> {
    let config = Config::from_str(dsn).map_err(|_| CheckError::InvalidDsn)?;

    let stray_at = config
        .get_hosts()
        .iter()
        .any(|host| matches!(host, Host::Tcp(name) if name.contains('@')));
    if stray_at {
        return Err(CheckError::InvalidDsn);
    }

    Ok(config)
}

async fn list_databases(config: &Config) -> Result<Vec<String>, CheckError> {
    let (client, con) = config.connect(NoTls).await?;

    tokio::spawn(async move {
        if let Err(e) = con.await {
            tracing::error!("connection error: {}", e);
        }
    });

    let rows = client
        .query(
            "SELECT datname FROM pg_database WHERE NOT datistemplate ORDER BY datname",
            &[],
        )
        .await?;

    Ok(rows.iter().map(|row| row.get("datname")).collect())
}

async fn run() -> Result<Vec<String>, CheckError> {
    let dsn = connection_string()?;

    println!("Testing PostgreSQL connection...");
    let config = match parse_dsn(&dsn) {
        Ok(config) => config,
        Err(e) => {
            println!("Connection string: <unparseable>");
            return Err(e);
        }
    };
    println!("Connection string: {}", redacted(&config));

    list_databases(&config).await
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    match run().await {
        Ok(databases) => {
            println!("Connected to PostgreSQL successfully!");
            println!("Available databases: {databases:?}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Connection failed: {e}");
            println!();
            println!("Check these:");
            println!("1. Is the password in DATABASE_URL correct?");
            println!("2. Does the server accept connections from this host (pg_hba.conf, firewall)?");
            println!("3. Are the host, port and database name in the connection string correct?");
            ExitCode::FAILURE
        }
    }
}
