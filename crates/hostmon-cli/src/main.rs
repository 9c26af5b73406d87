//! CLI for hostmon: host telemetry for MCP clients over stdio or HTTP.

mod commands;

use clap::Parser;

#[derive(Parser)]
#[command(name = "hostmon")]
#[command(about = "hostmon: host telemetry for MCP clients over stdio or HTTP")]
#[command(disable_version_flag = true)]
struct Cli {
    /// Print the version and exit
    #[arg(short = 'v', long)]
    version: bool,

    /// Serve MCP over HTTP instead of stdio (port from $PORT, default 8081)
    #[arg(long)]
    http: bool,

    /// Address to bind in HTTP mode
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
}

fn main() {
    let cli = Cli::parse();

    if cli.version {
        println!("{} {}", hostmon_core::SERVER_NAME, hostmon_core::VERSION);
        return;
    }

    // stdout carries protocol frames in stdio mode; logs always go to stderr.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let code = if cli.http {
        commands::http::run(&cli.host, commands::http::port_from_env())
    } else {
        commands::stdio::run()
    };
    std::process::exit(code);
}
