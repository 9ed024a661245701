//! For `vival`s tests only
//!
//! Each argument is a command, applied in order:
//! - `echo`: copy stdin to stdout
//! - `increment`: print every whitespace-separated number of stdin plus one
//! - `reverse`: print the lines of stdin in reverse order
//! - `args`: print the remaining arguments, one per line, and stop
//! - `stderr=<text>`: print `text` to stderr
//! - `sleep=<seconds>`: sleep
//! - `exit=<code>`: exit immediately

use std::env;
use std::error::Error;
use std::io;
use std::io::{Read, Write};
use std::process;

fn run() -> Result<(), Box<dyn Error>> {
    let mut stdin: Option<String> = None;
    let mut read_stdin = || -> Result<String, io::Error> {
        if let Some(text) = &stdin {
            return Ok(text.clone());
        }
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        stdin = Some(text.clone());
        Ok(text)
    };

    let mut stdout = io::stdout().lock();
    let mut args = env::args().skip(1);
    while let Some(command) = args.next() {
        let (name, value) = command.split_once('=').unwrap_or((command.as_str(), ""));
        match name {
            "echo" => write!(stdout, "{}", read_stdin()?)?,
            "increment" => {
                let numbers = read_stdin()?
                    .split_whitespace()
                    .map(|n| n.parse::<i64>().map(|n| (n + 1).to_string()))
                    .collect::<Result<Vec<_>, _>>()?;
                writeln!(stdout, "{}", numbers.join(" "))?;
            }
            "reverse" => {
                let text = read_stdin()?;
                for line in text.lines().rev() {
                    writeln!(stdout, "{line}")?;
                }
            }
            "args" => {
                for arg in args.by_ref() {
                    writeln!(stdout, "{arg}")?;
                }
            }
            "stderr" => {
                stdout.flush()?;
                writeln!(io::stderr(), "{value}")?;
            }
            "sleep" => {
                stdout.flush()?;
                let secs: f64 = value.parse()?;
                std::thread::sleep(std::time::Duration::from_secs_f64(secs));
            }
            "exit" => {
                stdout.flush()?;
                process::exit(value.parse()?);
            }
            _ => return Err(format!("unknown command `{command}`").into()),
        }
    }
    stdout.flush()?;
    Ok(())
}

fn main() {
    let code = match run() {
        Ok(_) => 0,
        Err(ref e) => {
            write!(&mut io::stderr(), "{e}").expect("writing to stderr won't fail");
            1
        }
    };
    process::exit(code);
}
