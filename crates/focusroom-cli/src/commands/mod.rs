pub mod config;
pub mod stats;
pub mod timer;

/// Print one value as a single JSON line.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
