use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    paia_client::cli::main()
}
