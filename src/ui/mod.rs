//! Terminal output with CI fallback
//!
//! Uses `cliclack` spinners and log lines in an interactive terminal and
//! plain `[OK]`/`[WARN]` prefixed lines everywhere else. Automation runs are
//! the common case, so the plain path is the one most users see.

mod context;
mod output;
mod progress;
mod prompts;

pub use context::UiContext;
pub use output::{
    intro, key_value, outro_success, outro_warn, step_info, step_ok, step_ok_detail, step_warn,
    step_warn_hint,
};
pub use progress::TaskSpinner;
pub use prompts::confirm;
