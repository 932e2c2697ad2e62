use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Run an import described by a settings file
    Import {
        #[arg(long, help = "Settings file path")]
        config: String,

        #[arg(long, help = "Additional .env file used to resolve ${VAR} references")]
        env_file: Option<String>,

        #[arg(
            long,
            help = "If specified, writes the JSON import result to this file instead of stdout"
        )]
        output: Option<String>,
    },
    /// Print the SQL an import would run, without connecting
    Plan {
        #[arg(long, help = "Settings file path")]
        config: String,

        #[arg(long, help = "Additional .env file used to resolve ${VAR} references")]
        env_file: Option<String>,
    },
    /// Load and validate a settings file
    Validate {
        #[arg(long, help = "Settings file path")]
        config: String,

        #[arg(long, help = "Additional .env file used to resolve ${VAR} references")]
        env_file: Option<String>,
    },
    /// Check that a warehouse accepts connections
    TestConn {
        #[arg(long, help = "Backend (snowflake, synapse, exasol, teradata, bigquery, redshift)")]
        backend: String,

        #[arg(long, help = "Connection string")]
        url: String,
    },
}
