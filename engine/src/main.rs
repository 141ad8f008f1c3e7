use std::env;
use std::process::ExitCode;

use engine::io::cli::parse_cli;
use engine::io::Repl;

fn main() -> ExitCode {
    let opts = match parse_cli(env::args().skip(1)) {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(22); // EINVAL
        }
    };
    let interactive = opts.interactive;
    match Repl::new(opts) {
        Ok(mut repl) => {
            repl.run(interactive);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(22)
        }
    }
}
