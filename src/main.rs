use env_logger::{Builder, Env};

fn init_logger() {
    // RUST_LOG wins; default is warn so command output stays clean.
    Builder::from_env(Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    let res = pagesnap::cli::run();
    let code = pagesnap::cli::exit_code(&res);
    if code != 0 {
        std::process::exit(code);
    }
}
