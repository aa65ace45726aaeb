use clap::{Parser, Subcommand};

mod commands;
mod output;
mod tty;

use commands::{new, register};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "nodewright")]
#[command(version = VERSION)]
#[command(about = "Scaffold Zenoh pub/sub nodes and register them in the master flake")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new node project and register it in the master flake
    New(new::NewArgs),
    /// Register an existing node project in the master flake
    Register(register::RegisterArgs),
}

fn main() -> std::process::ExitCode {
    // try_parse instead of parse: usage errors exit 1 like every other
    // failure, not clap's default 2.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = if e.use_stderr() { 1 } else { 0 };
            return std::process::ExitCode::from(code);
        }
    };

    let (json_result, exit_code) = commands::run_json(cli.command);

    if let Err(err) = output::print_json_result(json_result) {
        eprintln!("nodewright: {}", err);
        return std::process::ExitCode::from(1);
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
