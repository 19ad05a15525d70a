//! # msd347 CLI
//!
//! ```bash
//! # Print an image centered, then cut
//! msd347 print --justify center --cut ticket.png
//!
//! # Check the printer for errors
//! RUST_LOG=debug msd347 status
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use std::{path::PathBuf, process::ExitCode, time::Duration};

use msd347::{Config, Error, Justification, LockMode, PrintMode, Printer};

/// MSD347 ticket printer utility
#[derive(Parser, Debug)]
#[command(name = "msd347")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// USB transfer timeout in milliseconds (0 waits forever)
    #[arg(long, default_value = "0")]
    timeout_ms: u64,

    /// Serialize every command with the status queries
    #[arg(long)]
    exclusive: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Reset the printer
    Init,

    /// Query the error status
    Status,

    /// Query whether the last ticket was taken
    Ticket,

    /// Full cut
    Cut,

    /// Set justification for what follows
    Justify {
        #[arg(value_enum)]
        justification: Justification,
    },

    /// Enable or disable the panel buttons
    Buttons {
        #[arg(value_enum)]
        state: ButtonState,
    },

    /// Print an image file
    Print {
        /// Image to print (any format the image crate decodes)
        file: PathBuf,

        /// Device-side scaling
        #[arg(long, value_enum, default_value = "normal")]
        mode: PrintMode,

        /// Justification to set before printing
        #[arg(long, value_enum)]
        justify: Option<Justification>,

        /// Cut after printing
        #[arg(long)]
        cut: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ButtonState {
    Enable,
    Disable,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let lock_mode = if cli.exclusive {
        LockMode::Exclusive
    } else {
        LockMode::Queries
    };
    let config = Config::new()
        .timeout(Duration::from_millis(cli.timeout_ms))
        .lock_mode(lock_mode);

    // decode before touching the device so a bad file leaves it alone
    let image = match &cli.command {
        Commands::Print { file, .. } => Some(image::open(file)?),
        _ => None,
    };

    let mut printer = Printer::connect(config)?;
    let result = execute(&printer, &cli.command, image.as_ref());
    let closed = printer.close();
    result?;
    closed?;
    Ok(())
}

fn execute(
    printer: &Printer,
    command: &Commands,
    image: Option<&image::DynamicImage>,
) -> Result<(), Error> {
    match command {
        Commands::Init => printer.initialize(),
        Commands::Status => {
            printer.query_error()?;
            println!("ok");
            Ok(())
        }
        Commands::Ticket => {
            let info = printer.ticket_info()?;
            if info.ticket_taken {
                println!("ticket taken");
            } else {
                println!("ticket present");
            }
            Ok(())
        }
        Commands::Cut => printer.full_cut(),
        Commands::Justify { justification } => printer.set_justification(*justification),
        Commands::Buttons { state } => {
            printer.set_buttons_enabled(matches!(state, ButtonState::Enable))
        }
        Commands::Print {
            mode, justify, cut, ..
        } => {
            if let Some(justification) = justify {
                printer.set_justification(*justification)?;
            }
            if let Some(image) = image {
                printer.print_image(image, *mode)?;
            }
            if *cut {
                printer.full_cut()?;
            }
            Ok(())
        }
    }
}
