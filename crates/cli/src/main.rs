use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    listly_cli::run()
}
