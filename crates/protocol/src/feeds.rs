use serde::{Deserialize, Serialize};

/// Which ticker document the proxy should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TickerDoc {
    Master,
    Install,
}

impl TickerDoc {
    pub const ALL: [TickerDoc; 2] = [TickerDoc::Master, TickerDoc::Install];

    /// Value of the `doc` query parameter.
    pub fn as_param(self) -> &'static str {
        match self {
            Self::Master => "master",
            Self::Install => "install",
        }
    }
}

impl std::fmt::Display for TickerDoc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_param())
    }
}

/// Which weather feed the proxy should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherKind {
    Shop,
    Jobs,
}

impl WeatherKind {
    pub const ALL: [WeatherKind; 2] = [WeatherKind::Shop, WeatherKind::Jobs];

    /// Value of the `kind` query parameter.
    pub fn as_param(self) -> &'static str {
        match self {
            Self::Shop => "shop",
            Self::Jobs => "jobs",
        }
    }

    /// Prefix used on this feed's ticker line.
    pub fn label(self) -> &'static str {
        match self {
            Self::Shop => "SHOP WX",
            Self::Jobs => "JOB WX",
        }
    }
}

impl std::fmt::Display for WeatherKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_param())
    }
}
