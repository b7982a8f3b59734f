use std::process::ExitCode;

fn main() -> ExitCode {
    applet_dialog_cli::run()
}
