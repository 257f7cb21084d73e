use std::{fs, path::PathBuf, process::Command};

#[test]
fn basic_workflow() {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("basic_workflow");

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");

    let config_path = test_dir.join("config.toml");
    let config_contents = String::new()
        + "[population]\n"
        + "size = 200\n"
        + "vaccination_rate = 0.5\n"
        + "initial_infected = 2\n"
        + "\n"
        + "[pathogen]\n"
        + "name = \"Sniffles\"\n"
        + "transmission_probability = 0.15\n"
        + "lethality_probability = 0.2\n"
        + "\n"
        + "[run]\n"
        + "seed = 42\n";

    fs::write(&config_path, config_contents).expect("failed to write config file");

    fn run_bin(args: &[&str]) {
        let bin = PathBuf::from(env!("CARGO_BIN_EXE_herdsim"));

        let output = Command::new(bin)
            .args(args)
            .output()
            .expect("failed to execute command");

        let stdout_str =
            std::str::from_utf8(&output.stdout).expect("failed to convert stdout to string");
        let stderr_str =
            std::str::from_utf8(&output.stderr).expect("failed to convert stderr to string");

        assert!(
            output.status.success(),
            "failed to run binary with {args:?}\nstdout:\n{stdout_str}\nstderr:\n{stderr_str}\n"
        );
    }

    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    run_bin(&["--sim-dir", test_dir_str, "run"]);
    run_bin(&["--sim-dir", test_dir_str, "run"]);

    for file in ["run-0000.log", "run-0000.json", "run-0001.log", "run-0001.json"] {
        assert!(test_dir.join(file).exists(), "{file} was not written");
    }

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(test_dir.join("run-0000.json")).unwrap())
            .expect("failed to parse run summary");
    assert!(summary["steps"].as_u64().is_some());
    assert_eq!(
        summary["living"].as_u64().unwrap() + summary["dead"].as_u64().unwrap(),
        200
    );

    // Seeded runs are reproducible.
    let first = fs::read_to_string(test_dir.join("run-0000.json")).unwrap();
    let second = fs::read_to_string(test_dir.join("run-0001.json")).unwrap();
    assert_eq!(first, second);

    run_bin(&[
        "--sim-dir",
        test_dir_str,
        "sweep",
        "--points",
        "3",
        "--replicates",
        "2",
    ]);
    assert!(test_dir.join("sweep.json").exists());

    run_bin(&["--sim-dir", test_dir_str, "clean"]);
    assert!(!test_dir.join("run-0000.log").exists());
    assert!(!test_dir.join("sweep.json").exists());

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn invalid_config_fails_fast() {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("invalid_config");

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");

    let config_contents = String::new()
        + "[population]\n"
        + "size = 10\n"
        + "vaccination_rate = 0.5\n"
        + "initial_infected = 11\n"
        + "\n"
        + "[pathogen]\n"
        + "name = \"Sniffles\"\n"
        + "transmission_probability = 0.15\n"
        + "lethality_probability = 0.2\n";

    fs::write(test_dir.join("config.toml"), config_contents).expect("failed to write config file");

    let bin = PathBuf::from(env!("CARGO_BIN_EXE_herdsim"));
    let output = Command::new(bin)
        .args([
            "--sim-dir",
            test_dir.to_str().expect("failed to convert test directory"),
            "run",
        ])
        .output()
        .expect("failed to execute command");

    assert!(!output.status.success());
    assert!(!test_dir.join("run-0000.log").exists());

    fs::remove_dir_all(&test_dir).ok();
}
