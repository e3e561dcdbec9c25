//! SoC thermal zone
//!
//! Linux exposes the SoC temperature as an integer number of
//! millidegrees Celsius in `<zone>/temp`.

/// Parse the contents of a thermal zone `temp` file into degrees Celsius
pub fn parse_millidegrees(text: &str) -> Option<f32> {
    let millidegrees: i32 = text.trim().parse().ok()?;
    Some(millidegrees as f32 / 1000.0)
}
