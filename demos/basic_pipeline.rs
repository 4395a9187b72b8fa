use std::{error::Error, sync::mpsc, thread, time::Duration};

use qrlive::{Outcome, Pipeline, PipelineConfig, QrGenerator, Request};

fn main() -> Result<(), Box<dyn Error>> {
    let (tx, rx) = mpsc::channel();
    let pipeline = Pipeline::spawn(QrGenerator, tx, PipelineConfig::default())?;

    // Simulate someone typing, one keystroke every few milliseconds
    let text = "https://www.rust-lang.org";
    let mut last = None;
    for end in 1..=text.len() {
        last = Some(pipeline.submit(Request::builder(&text[..end]).scale(2).build()?)?);
        thread::sleep(Duration::from_millis(2));
    }
    let last = last.ok_or("Nothing submitted")?;

    loop {
        let (ticket, outcome) = rx.recv()?;
        match &outcome {
            Outcome::Success(artifact) => println!("{ticket}: {}", artifact.symbol()),
            Outcome::Failure { message } => println!("{ticket}: {message}"),
        }
        if ticket == last {
            if let Some(artifact) = outcome.artifact() {
                println!("{}", artifact.to_terminal());
            }
            break;
        }
    }

    println!("{} keystrokes were skipped", pipeline.superseded());
    pipeline.shutdown()?;
    Ok(())
}
