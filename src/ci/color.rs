use std::io::IsTerminal;

/// When to colorize console output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorMode {
    /// Detect based on terminal and CI environment
    #[default]
    Auto,
    /// Force colors on
    Always,
    /// Force colors off
    Never,
}

impl ColorMode {
    /// Resolve `Auto` against the environment variables read by `lookup`.
    ///
    /// `NO_COLOR` and `CLICOLOR=0` disable color, `CLICOLOR_FORCE=1` enables
    /// it, and the Actions log viewer (`GITHUB_ACTIONS=true`) renders ANSI
    /// colors even though stdout is not a terminal.
    pub fn resolve<F>(self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if self != Self::Auto {
            return self;
        }
        if lookup("NO_COLOR").is_some() || lookup("CLICOLOR").as_deref() == Some("0") {
            return Self::Never;
        }
        if lookup("CLICOLOR_FORCE").as_deref() == Some("1")
            || lookup("GITHUB_ACTIONS").as_deref() == Some("true")
        {
            return Self::Always;
        }
        Self::Auto
    }

    pub fn should_use_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => std::io::stdout().is_terminal(),
        }
    }

    /// Set the process-wide `colored` override.
    pub fn apply(self) {
        colored::control::set_override(self.should_use_color());
    }
}
