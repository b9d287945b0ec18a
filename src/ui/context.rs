//! UI context for detecting interactive vs CI environments

use std::io::IsTerminal;

/// CI environment indicators
const CI_VARS: &[&str] = &[
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "BUILDKITE",
    "JENKINS_URL",
    "TF_BUILD",
];

/// UI context that determines output behavior
#[derive(Debug, Clone)]
pub struct UiContext {
    /// Whether running in an interactive terminal
    interactive: bool,
    /// Suppress progress output (stdout is reserved for machine output)
    quiet: bool,
}

impl UiContext {
    /// Detect the current environment
    pub fn detect() -> Self {
        Self {
            interactive: Self::detect_interactive(),
            quiet: false,
        }
    }

    /// Create a non-interactive context (for testing or explicit CI mode)
    pub fn non_interactive() -> Self {
        Self {
            interactive: false,
            quiet: false,
        }
    }

    /// Suppress progress output
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Check if we're in an interactive terminal
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Check if progress output is suppressed
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Check if we should use fancy output (spinners, colors)
    pub fn use_fancy_output(&self) -> bool {
        self.interactive && !self.quiet
    }

    fn detect_interactive() -> bool {
        if !std::io::stdout().is_terminal() || !std::io::stdin().is_terminal() {
            return false;
        }
        !running_in_ci()
    }
}

/// Whether any CI indicator variable is set
fn running_in_ci() -> bool {
    CI_VARS.iter().any(|var| std::env::var_os(var).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn non_interactive_context() {
        let ctx = UiContext::non_interactive();
        assert!(!ctx.is_interactive());
        assert!(!ctx.is_quiet());
        assert!(!ctx.use_fancy_output());
    }

    #[test]
    fn quiet_disables_fancy_output() {
        let ctx = UiContext {
            interactive: true,
            quiet: false,
        }
        .with_quiet(true);
        assert!(ctx.is_quiet());
        assert!(!ctx.use_fancy_output());
    }

    #[test]
    #[serial]
    fn ci_variable_detected() {
        let previous = std::env::var_os("GITHUB_ACTIONS");
        std::env::set_var("GITHUB_ACTIONS", "true");

        assert!(running_in_ci());
        assert!(!UiContext::detect().is_interactive());

        match previous {
            Some(value) => std::env::set_var("GITHUB_ACTIONS", value),
            None => std::env::remove_var("GITHUB_ACTIONS"),
        }
    }
}
