use std::process::ExitCode;

fn main() -> ExitCode {
    insight_cli::run()
}
