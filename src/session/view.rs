use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Consultation,
    Dashboard,
    Traces,
    Database,
}

impl Tab {
    /// Tabs that render the per-patient dashboard collections.
    pub fn uses_dashboard(self) -> bool {
        matches!(self, Tab::Dashboard | Tab::Traces)
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tab::Consultation => "consultation",
            Tab::Dashboard => "dashboard",
            Tab::Traces => "traces",
            Tab::Database => "database",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseTabError {
    message: String,
}

impl fmt::Display for ParseTabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseTabError {}

impl FromStr for Tab {
    type Err = ParseTabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "consultation" | "chat" => Ok(Tab::Consultation),
            "dashboard" => Ok(Tab::Dashboard),
            "traces" => Ok(Tab::Traces),
            "database" | "db" => Ok(Tab::Database),
            _ =>
                Err(ParseTabError {
                    message: format!("Unknown tab: '{}'", s),
                }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

impl AuthMode {
    pub fn toggled(self) -> Self {
        match self {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiStatus {
    #[default]
    Checking,
    Connected,
    Failed,
}

/// Everything the presentation layer needs besides the data collections.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    pub active_tab: Tab,
    pub auth_mode: AuthMode,
    pub auth_gate_open: bool,
    pub attachment_panel_open: bool,
    pub composer: String,
    pub typing: bool,
    pub listening: bool,
    pub api_status: ApiStatus,
    pub email_service_live: bool,
}
