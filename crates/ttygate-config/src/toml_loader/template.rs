//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# ttygate Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[server]
# host = "0.0.0.0"
# port = 2222                 # 1-65535
# host_key_path = "host.key"
# generate_host_key = true    # ephemeral Ed25519 key when host_key_path is missing
# max_sessions = 64           # 1-10000

[auth]
# mode = "accept_all"         # accept_all, credentials
# authorized_keys = []        # public key fingerprints

# [auth.passwords]
# alice = "<sha256 hex of the password>"

[app]
# program = ""                # empty = login shell ($SHELL)
# args = []
# working_directory = ""      # unset = gateway working directory
# full_screen = true
# default_term = "xterm-256color"

[environment]
# allow = ["PATH", "HOME", "LANG", "LC_ALL", "LC_CTYPE", "NODE_ENV"]

# [environment.overrides]
# APP_MODE = "demo"

[session]
# resize_debounce_ms = 50     # 1-5000

[logging]
# level = "INFO"              # TRACE, DEBUG, INFO, WARNING, ERROR
"##
    .to_string()
}
