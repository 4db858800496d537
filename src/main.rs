use std::process::ExitCode;

fn main() -> ExitCode {
    pkhex_setup::cli::run()
}
