//! CLI enum types for output mode options.

use clap::ValueEnum;

use crate::output::OutputMode;

/// What to produce for each new grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Mode {
    /// Write a PNG image
    #[default]
    Png,
    /// Print the grid as block symbols
    Preview,
    /// Log grid statistics only
    Log,
}

impl From<Mode> for OutputMode {
    fn from(m: Mode) -> Self {
        match m {
            Mode::Png => OutputMode::Png,
            Mode::Preview => OutputMode::Preview,
            Mode::Log => OutputMode::Log,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_to_output_mode() {
        assert_eq!(OutputMode::from(Mode::Png), OutputMode::Png);
        assert_eq!(OutputMode::from(Mode::Preview), OutputMode::Preview);
        assert_eq!(OutputMode::from(Mode::Log), OutputMode::Log);
    }

    #[test]
    fn test_mode_default_is_png() {
        assert_eq!(Mode::default(), Mode::Png);
        assert_eq!(OutputMode::from(Mode::default()), OutputMode::default());
    }
}
