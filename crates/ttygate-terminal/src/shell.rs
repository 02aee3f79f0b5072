//! Shell detection and argument helpers.
//!
//! Used when no hosted program is configured: the session then runs the
//! host's login shell.

/// Detect the host's default shell.
///
/// - On Unix: reads the `SHELL` environment variable, falling back to `/bin/sh`.
/// - On Windows: reads the `COMSPEC` environment variable, falling back to `cmd.exe`.
pub fn detect_shell() -> String {
    #[cfg(unix)]
    {
        std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
    }

    #[cfg(windows)]
    {
        std::env::var("COMSPEC").unwrap_or_else(|_| "cmd.exe".to_string())
    }

    #[cfg(not(any(unix, windows)))]
    {
        "/bin/sh".to_string()
    }
}

/// Return the appropriate command-line arguments for the given shell binary.
///
/// Interactive login flags are added for shells that support them.
pub fn shell_args(shell: &str) -> Vec<String> {
    if shell.ends_with("zsh") || shell.ends_with("bash") {
        vec!["--login".to_string()]
    } else {
        vec![]
    }
}

/// Resolve the program and arguments a session should run.
///
/// An empty `program` means the detected login shell with its login flags.
pub fn resolve_command(program: &str, args: &[String]) -> (String, Vec<String>) {
    if program.trim().is_empty() {
        let shell = detect_shell();
        let args = shell_args(&shell);
        (shell, args)
    } else {
        (program.to_string(), args.to_vec())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_shell_returns_non_empty() {
        let shell = detect_shell();
        assert!(!shell.is_empty(), "detect_shell() should not be empty");
    }

    #[test]
    fn shell_args_for_login_shells() {
        assert_eq!(shell_args("/bin/zsh"), vec!["--login".to_string()]);
        assert_eq!(shell_args("/bin/bash"), vec!["--login".to_string()]);
    }

    #[test]
    fn shell_args_for_other_shells() {
        assert!(shell_args("/usr/bin/fish").is_empty());
        assert!(shell_args("/bin/sh").is_empty());
    }

    #[test]
    fn resolve_command_keeps_configured_program() {
        let (program, args) = resolve_command("node", &["app/index.js".to_string()]);
        assert_eq!(program, "node");
        assert_eq!(args, vec!["app/index.js"]);
    }

    #[test]
    fn resolve_command_falls_back_to_shell() {
        let (program, _) = resolve_command("", &["ignored".to_string()]);
        assert_eq!(program, detect_shell());
    }
}
