use clap::builder::TypedValueParser;
use clap::{Parser, Subcommand};

use crate::core::DEFAULT_CONCURRENCY;

#[derive(Parser, Debug)]
#[command(name = "mutavault", version)]
#[command(about = "Additional utilities to interact with Hashicorp Vault", long_about = None)]
pub struct Cli {
    /// Address of the Vault server
    #[arg(long, env = "VAULT_ADDR", value_name = "URL")]
    pub vault_addr: String,

    /// Token used to authenticate against Vault
    #[arg(long, env = "VAULT_TOKEN", hide_env_values = true, value_name = "TOKEN")]
    pub vault_token: String,

    /// Vault enterprise namespace
    #[arg(long, env = "VAULT_NAMESPACE", value_name = "NAMESPACE")]
    pub vault_namespace: Option<String>,

    /// Maximum number of concurrent requests against Vault
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_CONCURRENCY,
        value_parser = clap::value_parser!(u16).range(1..).map(usize::from),
        value_name = "NUM"
    )]
    pub concurrency: usize,

    /// Log every request on stderr
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Utilities for interacting with a kvv2 engine
    Kv {
        /// Mount path of kvv2 engine
        #[arg(long, value_name = "MOUNT")]
        mount: String,

        #[command(subcommand)]
        command: KvCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum KvCommand {
    /// List all accessible paths in a kv engine
    #[command(name = "listall")]
    ListAll {
        /// Directory to start from (must end with '/')
        #[arg(default_value = "/")]
        root: String,
    },

    /// Gets the custom metadata of provided paths to secrets
    #[command(name = "getcustommetas")]
    GetCustomMetas {
        #[arg(value_name = "PATH")]
        paths: Vec<String>,
    },

    /// Takes custommetadata and paths on stdin and updates vault
    #[command(name = "setcustommetas")]
    SetCustomMetas,
}
