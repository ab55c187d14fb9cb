fn main() {
    if let Err(e) = gsu_monitor::app::run_cli() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
