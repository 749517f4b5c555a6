use std::process::ExitCode;

fn main() -> ExitCode {
    heymoji_cli::run()
}
