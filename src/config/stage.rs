use anyhow::{Result, anyhow};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Stage {
    #[default]
    Local,
    Development,
    Production,
}

impl Stage {
    pub fn try_from(stage: &str) -> Result<Self> {
        match stage.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            _ => Err(anyhow!("Invalid stage: {}", stage)),
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "Local"),
            Self::Development => write!(f, "Development"),
            Self::Production => write!(f, "Production"),
        }
    }
}
