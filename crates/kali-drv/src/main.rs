use kali_drv::{Config, Session};

fn main() {
    match run() {
        Ok(errors) if errors > 0 => std::process::exit(1),
        Ok(_) => {}
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> anyhow::Result<usize> {
    let config = Config::from_args(std::env::args().skip(1))?;
    let session = Session::new(config);
    session.run()
}
