use std::process;

fn main() {
    process::exit(rask::cli::run());
}
