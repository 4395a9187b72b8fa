use std::error::Error;

use qrlive::{ECLevel, Generator, Mode, QrGenerator, Request, Version};

fn main() -> Result<(), Box<dyn Error>> {
    // Every option fixed, nothing left to the encoder
    let request = Request::builder("HELLO WORLD")
        .ec_level(ECLevel::Q)
        .version(Version::new(2)?)
        .mode(Mode::Alphanumeric)
        .scale(8)
        .build()?;
    println!("Request: {}", request.metadata());

    let artifact = QrGenerator.generate(&request)?;
    artifact.save("./hello_world.png")?;

    let (w, h) = artifact.dimensions();
    println!("Saved {} ({w}x{h}px) to hello_world.png", artifact.symbol());
    Ok(())
}
