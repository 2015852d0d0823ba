use std::process::ExitCode;

fn main() -> ExitCode {
    tokenwire_cli::run()
}
