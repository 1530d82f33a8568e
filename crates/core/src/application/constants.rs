// Runtime constants (no magic values)
use std::time::Duration;

/// Default delay between two status requests for a remote task (1s)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Hard limit for one container runtime trial invocation (60s)
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(60);

/// File a setup script writes its environment to, relative to its working directory
pub const ENV_OUTPUT_FILE: &str = "output_environment.dat";

/// Shell used to run setup scripts
pub const SETUP_SHELL: &str = "bash";

/// Exit code reported when the process layer gives neither a code nor a signal
pub const UNKNOWN_EXIT_CODE: i32 = -1;

/// Container runtime probed for user namespace support
pub const DEFAULT_PROBE_RUNTIME: &str = "singularity";

/// Minimal image the probe runs against
pub const DEFAULT_PROBE_IMAGE: &str = "hello.simg";

/// Stderr phrases showing the runtime accepted `--userns` and only failed on the
/// minimal image itself
pub const USERNS_ACCEPTED_PHRASES: [&str; 3] = [
    "No valid /bin/sh",
    "/bin/sh doesn't exist in container",
    "executable file not found in",
];
