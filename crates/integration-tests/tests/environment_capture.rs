// Setup script capture: protected names never leak, failures degrade

use std::collections::HashMap;
use std::path::Path;
use stepexec_core::domain::{EnvMap, EXCLUDED_VARIABLES};
use stepexec_core::port::EnvironmentPreparer;
use stepexec_infra_system::EnvironmentCapture;

fn input_env() -> EnvMap {
    HashMap::from([
        ("LANG".to_string(), "C".to_string()),
        ("JOB_VAR".to_string(), "job".to_string()),
    ])
}

async fn capture_with(dir: &Path, script_body: &str) -> EnvMap {
    let script = dir.join("setup.sh");
    std::fs::write(&script, script_body).unwrap();
    EnvironmentCapture::new(dir)
        .prepare(&input_env(), &script)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_excluded_names_never_imported() {
    let scripts = [
        "env > output_environment.dat\n",
        "env -0 > output_environment.dat\n",
        "printf '_=/x\\nPWD=/x\\nSHLVL=7\\nTMPDIR=/x\\nHOME=/x\\n_STEPEXEC=0\\nOK=1\\n' > output_environment.dat\n",
        "export HOME=/elsewhere TMPDIR=/scratch\ncd /\nenv > \"$OLDPWD/output_environment.dat\"\n",
    ];

    for body in scripts {
        let dir = tempfile::tempdir().unwrap();
        let env = capture_with(dir.path(), body).await;

        for name in EXCLUDED_VARIABLES {
            assert!(!env.contains_key(name), "{} imported by script {:?}", name, body);
        }
        assert_eq!(env.get("JOB_VAR").map(String::as_str), Some("job"));
    }
}

#[tokio::test]
async fn test_nonzero_exit_returns_input_unchanged() {
    let scripts = [
        "exit 1\n",
        "export NEW=1\nenv > output_environment.dat\nexit 42\n",
        "false\n",
        "this-command-does-not-exist-xyz\n",
        "kill -TERM $$\n",
    ];

    for body in scripts {
        let dir = tempfile::tempdir().unwrap();
        let env = capture_with(dir.path(), body).await;
        assert_eq!(env, input_env(), "script {:?} changed the environment", body);
    }
}
