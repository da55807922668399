fn main() {
    if let Err(err) = gittree_rs::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
