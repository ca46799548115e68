use std::ffi::OsString;
use std::fs::File;
use std::io::{self, stdin, stdout, BufWriter, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use argh::FromArgs;
use extract_input_value::{InputValueExtractor, Scanner};

const COMMAND_NAME: &str = "extract-input-value";

/// Print the value attribute of every <input> element whose name attribute equals FIELDNAME, one
/// line per element.
#[derive(FromArgs)]
struct Cli {
    /// the name of the input element, compared exactly
    #[argh(positional)]
    fieldname: String,

    /// an HTML file to read, standard input if omitted
    #[argh(positional)]
    infile: Option<PathBuf>,
}

/// argh has no `-h` and takes a bare `help` as a help request even in positional slots. Map `-h`
/// to `--help` and put a `--` in front of the first positional argument.
fn normalize_args(args: &[String]) -> Vec<&str> {
    if args
        .iter()
        .take_while(|arg| *arg != "--")
        .any(|arg| arg == "-h" || arg == "--help")
    {
        return vec!["--help"];
    }

    let mut normalized = Vec::with_capacity(args.len() + 1);
    let mut options_ended = false;

    for arg in args.iter().map(String::as_str) {
        if options_ended {
            normalized.push(arg);
        } else if arg == "--" {
            options_ended = true;
            normalized.push(arg);
        } else if arg.starts_with('-') && arg != "-" {
            normalized.push(arg);
        } else {
            options_ended = true;
            normalized.extend(["--", arg]);
        }
    }

    normalized
}

fn parse_cli() -> Result<Cli, ExitCode> {
    let args = std::env::args_os()
        .skip(1)
        .map(OsString::into_string)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|arg| {
            eprintln!("Invalid utf8: {}", arg.to_string_lossy());
            ExitCode::FAILURE
        })?;

    Cli::from_args(&[COMMAND_NAME], &normalize_args(&args)).map_err(|early_exit| {
        match early_exit.status {
            Ok(()) => {
                println!("{}", early_exit.output);
                ExitCode::SUCCESS
            }
            Err(()) => {
                eprintln!(
                    "{}\nRun {} --help for more information.",
                    early_exit.output, COMMAND_NAME
                );
                ExitCode::FAILURE
            }
        }
    })
}

fn read_input(infile: Option<&Path>) -> io::Result<Vec<u8>> {
    let mut input = Vec::new();
    match infile {
        Some(path) => File::open(path)?.read_to_end(&mut input)?,
        None => stdin().lock().read_to_end(&mut input)?,
    };
    Ok(input)
}

fn extract(fieldname: &str, input: &[u8]) -> io::Result<()> {
    let out = BufWriter::new(stdout().lock());
    let mut scanner = Scanner::new(InputValueExtractor::new(fieldname, out));
    scanner.feed(input)?;
    scanner.close()?.into_inner()?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = match parse_cli() {
        Ok(cli) => cli,
        Err(code) => return code,
    };

    let input = match read_input(cli.infile.as_deref()) {
        Ok(input) => input,
        Err(e) => {
            match cli.infile {
                Some(ref path) => eprintln!("error: can't read {}: {}", path.display(), e),
                None => eprintln!("error: can't read standard input: {}", e),
            }
            eprintln!("Run {} --help for more information.", COMMAND_NAME);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = extract(&cli.fieldname, &input) {
        eprintln!("error: can't write output: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::normalize_args;

    fn normalize(args: &[&str]) -> Vec<String> {
        let args: Vec<String> = args.iter().map(|arg| (*arg).to_owned()).collect();
        normalize_args(&args).into_iter().map(str::to_owned).collect()
    }

    #[test]
    fn test_normalize_args() {
        assert_eq!(normalize(&[]), Vec::<String>::new());
        assert_eq!(normalize(&["q"]), ["--", "q"]);
        assert_eq!(normalize(&["q", "in.html"]), ["--", "q", "in.html"]);
        assert_eq!(normalize(&["help"]), ["--", "help"]);
        assert_eq!(normalize(&["-"]), ["--", "-"]);
        assert_eq!(normalize(&["--", "help"]), ["--", "help"]);
        assert_eq!(normalize(&["--", "-h"]), ["--", "-h"]);
    }

    #[test]
    fn test_help_flags() {
        assert_eq!(normalize(&["-h"]), ["--help"]);
        assert_eq!(normalize(&["--help"]), ["--help"]);
        assert_eq!(normalize(&["q", "-h"]), ["--help"]);
        assert_eq!(normalize(&["help", "--help"]), ["--help"]);
        assert_eq!(normalize(&["--bogus", "-h"]), ["--help"]);
    }
}
