use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Simulated device width for the builder canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    #[default]
    Desktop,
    Tablet,
    Mobile,
}

impl Device {
    /// Canvas width in CSS pixels
    pub fn width(&self) -> u32 {
        match self {
            Device::Desktop => 1280,
            Device::Tablet => 768,
            Device::Mobile => 375,
        }
    }

    /// Column tracks a container with `stored` columns is laid out in.
    /// Display-only; stored content is never touched.
    pub fn layout_columns(&self, stored: usize) -> usize {
        let stored = stored.max(1);
        match self {
            Device::Desktop => stored,
            Device::Tablet => stored.min(2),
            Device::Mobile => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Desktop => "desktop",
            Device::Tablet => "tablet",
            Device::Mobile => "mobile",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Device {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "desktop" => Ok(Device::Desktop),
            "tablet" => Ok(Device::Tablet),
            "mobile" => Ok(Device::Mobile),
            other => Err(format!(
                "Invalid device: {}. Use: mobile, tablet, or desktop",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mobile_collapses_to_one_column() {
        assert_eq!(Device::Mobile.layout_columns(3), 1);
        assert_eq!(Device::Desktop.layout_columns(3), 3);
        assert_eq!(Device::Tablet.layout_columns(3), 2);
        assert_eq!(Device::Tablet.layout_columns(1), 1);
        assert_eq!(Device::Desktop.layout_columns(0), 1);
    }

    #[test]
    fn test_parse_device() {
        assert_eq!("mobile".parse::<Device>(), Ok(Device::Mobile));
        assert!("watch".parse::<Device>().is_err());
    }
}
