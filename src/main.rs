fn main() {
    if let Err(err) = smp_submitter::cli::run() {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}
