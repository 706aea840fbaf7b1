use env_logger::Env;

fn main() {
    env_logger::Builder::from_env(Env::new().filter_or("PSTREE_LOG", "warn"))
        .format_timestamp(None)
        .init();

    if let Err(err) = pstree::app::run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
