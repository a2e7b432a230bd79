use std::error::Error;

use log::info;
use tondo::circle;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let radius = 5.0;
    let area = circle::area(radius);
    info!("Computed the area for radius {}", radius);

    println!("Area of circle with radius {}: {}", radius, area);

    Ok(())
}
