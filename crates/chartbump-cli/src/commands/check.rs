//! Check command - list annotated manifests without contacting the registry

use chartbump_core::ChartInfo;

use crate::display;
use crate::error::Result;

pub fn run(charts: &[ChartInfo]) -> Result<()> {
    display::discovered(charts);
    Ok(())
}
