use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;

use proofview::config::Config;
use proofview::session::{DocumentSession, LoadState};

/// How long the driver waits for one load cycle before giving up.
const LOAD_TIMEOUT: Duration = Duration::from_secs(120);

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <document-id> [output.png]", args[0]);
        std::process::exit(1);
    }
    let doc_ref = &args[1];
    let output = args.get(2).map(String::as_str).unwrap_or("page.png");

    let config = Config::load();
    let mut session = DocumentSession::new(config);
    session.set_document(doc_ref);

    let started = Instant::now();
    loop {
        session.poll();
        match session.state() {
            LoadState::Ready(_) => break,
            LoadState::Failed(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
            _ => {
                if started.elapsed() > LOAD_TIMEOUT {
                    eprintln!("Error: timed out loading {}", doc_ref);
                    std::process::exit(1);
                }
                std::thread::sleep(Duration::from_millis(10));
            }
        }
    }

    let view = session.view_mut().expect("state is Ready");
    println!(
        "{}: page {}x{} at scale {}, {} box(es)",
        doc_ref,
        view.transform.width,
        view.transform.height,
        view.transform.scale,
        view.boxes.len()
    );
    for field in view.fields.fields() {
        println!("  {}  {:?}", field.input_id, field.text);
    }

    view.write_png(Path::new(output))?;
    log::info!("Wrote {}", output);

    Ok(())
}
