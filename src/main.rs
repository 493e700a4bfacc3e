use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    darwin_kml::cli::run(std::env::args().skip(1))
}
