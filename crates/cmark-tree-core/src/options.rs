//! Configuration options for HTML serialization

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Tag of the element wrapping a rendered document
pub const DEFAULT_ROOT_TAG: &str = "div";

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// HTML: void elements are written as `<br>`
    Html,
    /// XHTML: void elements are written as `<br />`
    #[default]
    Xhtml,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Xhtml => "xhtml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(OutputFormat::Html),
            "xhtml" => Ok(OutputFormat::Xhtml),
            _ => Err(Error::UnknownOutputFormat(s.to_string())),
        }
    }
}
