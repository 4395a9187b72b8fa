use std::{
    sync::mpsc,
    time::{Duration, Instant},
};

use qrlive::{ECLevel, Generator, Pipeline, PipelineConfig, QrGenerator, Request, Version};

const ITERATIONS: u32 = 50;

fn benchmark_generation() {
    let cases = [
        ("v1 numeric", "01234567", None, 4),
        ("v10 alphanumeric", "HELLO WORLD ", Some(10), 4),
        ("v40 byte", "Hello, world! ", Some(40), 2),
    ];

    for (name, unit, version, scale) in cases {
        let mut builder = Request::builder(unit.repeat(8));
        builder.ec_level(ECLevel::L).scale(scale);
        if let Some(v) = version {
            builder.version(Version::new(v).expect("Valid version"));
        }
        let request = builder.build().expect("Valid request");

        let start = Instant::now();
        for _ in 0..ITERATIONS {
            QrGenerator.generate(&request).expect("Generation failed");
        }
        let avg = start.elapsed() / ITERATIONS;
        println!("{name:<20} avg: {avg:?}");
    }
}

fn benchmark_burst() {
    let (tx, rx) = mpsc::channel();
    let pipeline =
        Pipeline::spawn(QrGenerator, tx, PipelineConfig::default()).expect("Failed to spawn");

    let text = "https://www.rust-lang.org/learn/get-started".repeat(4);
    let start = Instant::now();
    let mut last = None;
    for end in 1..=text.len() {
        last = pipeline.submit(Request::builder(&text[..end]).scale(3).build().expect("Valid request")).ok();
    }
    let submitted = start.elapsed();

    let mut generated = 0;
    while let Ok((ticket, _)) = rx.recv_timeout(Duration::from_secs(10)) {
        generated += 1;
        if Some(ticket) == last {
            break;
        }
    }
    let total = start.elapsed();

    println!("Submitted {} requests in {submitted:?}", text.len());
    println!("Generated {generated}, superseded {}", pipeline.superseded());
    println!("Latest outcome delivered after {total:?}");
    pipeline.shutdown().expect("Worker panicked");
}

fn main() {
    println!("Running qrlive benchmarks");
    println!("=========================\n");

    println!("Generation");
    println!("----------");
    benchmark_generation();

    println!("\nKeystroke burst");
    println!("---------------");
    benchmark_burst();
}
