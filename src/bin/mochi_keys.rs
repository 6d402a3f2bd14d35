//! Mochi Keys
//!
//! Headless runner for the TTY input pipeline. Reads raw terminal input from
//! a file or stdin, feeds it through a session in fixed-size chunks, and
//! prints the resulting key events.
//!
//! ```bash
//! printf '\x1b[Aabc\x01' | mochi-keys
//! mochi-keys --json --charset utf-16le capture.bin
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mochi_tty::app::{CliArgs, Config};
use mochi_tty::readline::{KeyEvent, Keymap};
use mochi_tty::tty::TtySession;

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = CliArgs::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_with_args(args)?;
    let keymap = Arc::new(Keymap::from_config(&config)?);
    tracing::info!("Loaded {} key bindings", keymap.len());

    let mut session = TtySession::new(keymap, &config)?;

    let mut input: Box<dyn Read> = match &args.input {
        Some(path) => Box::new(File::open(path)?),
        None => Box::new(io::stdin().lock()),
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut buf = vec![0u8; args.chunk_size.max(1)];

    loop {
        let n = input.read(&mut buf)?;
        if n == 0 {
            break;
        }
        session.feed(&buf[..n])?;
        while let Some(event) = session.next_event() {
            print_event(&mut out, &event, args.json)?;
        }
    }

    // Input ended mid-sequence: flush what is left as literals
    let leftover = session.events().clear();
    for c in leftover {
        print_event(&mut out, &KeyEvent::Literal(c), args.json)?;
    }

    out.flush()?;
    Ok(())
}

fn print_event(out: &mut impl Write, event: &KeyEvent, json: bool) -> io::Result<()> {
    if json {
        serde_json::to_writer(&mut *out, event)?;
        writeln!(out)
    } else {
        writeln!(out, "{}", event)
    }
}
