use crate::error::Result;
use crate::settings::{to_json, Settings};

pub fn run(settings: &Settings) -> Result<()> {
    println!("{}", to_json(settings)?);
    Ok(())
}
