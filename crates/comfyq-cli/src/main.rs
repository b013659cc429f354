//! `comfyq` binary

use std::error::Error;
use std::process;

use comfyq_cli::{command, init_tracing, invocation, run, verbosity, DriverError};

fn main() {
    let matches = command().get_matches();
    let flags = verbosity(&matches);
    init_tracing(flags.verbose, flags.quiet);

    let outcome = invocation(&matches).and_then(|inv| {
        let report = run(&inv)?;
        if inv.json() {
            report.render_json().map(|mut text| {
                text.push('\n');
                text
            })
        } else {
            Ok(report.render_text())
        }
    });

    match outcome {
        Ok(text) => print!("{text}"),
        Err(err) => {
            print_error(&err);
            process::exit(err.exit_code());
        }
    }
}

fn print_error(err: &DriverError) {
    let mut message = err.to_string();
    eprintln!("error: {message}");
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            eprintln!("  caused by: {text}");
        }
        message = text;
        source = cause.source();
    }
}
