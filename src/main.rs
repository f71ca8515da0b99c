use par_source_windows::cli;

fn main() {
    // Logging is initialised inside process_cli once the --log-level flag is known
    let code = cli::process_cli();
    log::info!("par-source-windows {} exiting with code {}", par_source_windows::VERSION, code);
    if code != 0 {
        std::process::exit(code);
    }
}
