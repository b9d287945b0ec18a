//! Integration tests for lazydep

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    /// Command isolated from the user's config, workspace and store
    fn lazydep(temp: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("lazydep");
        cmd.arg("--config")
            .arg(temp.path().join("config.toml"))
            .arg("--workspace")
            .arg(temp.path().join("deps"))
            .arg("--store")
            .arg(temp.path().join("store"))
            .env_remove("LAZYDEP_PROJECT")
            .env_remove("LAZYDEP_HOSTING");
        cmd
    }

    #[test]
    fn help_displays() {
        let temp = TempDir::new().unwrap();
        lazydep(&temp)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Lazy plugin dependency cache"));
    }

    #[test]
    fn version_displays() {
        let temp = TempDir::new().unwrap();
        lazydep(&temp)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("lazydep"));
    }

    #[test]
    fn key_without_manifest() {
        let temp = TempDir::new().unwrap();
        lazydep(&temp)
            .args(["key", "--project", "lib", "--hosting", "hostA"])
            .arg("--no-manifest-fingerprint")
            .assert()
            .success()
            .stdout("lib+hostA\n");
    }

    #[test]
    fn key_with_manifest_fingerprint() {
        let temp = TempDir::new().unwrap();
        let manifest = temp.path().join("lazydep.lock");
        std::fs::write(&manifest, "X").unwrap();
        std::fs::write(
            temp.path().join("config.toml"),
            format!(
                "[workspace]\nmanifest_path = {:?}\n",
                manifest.display().to_string()
            ),
        )
        .unwrap();

        lazydep(&temp)
            .args(["key", "--project", "lib", "--hosting", "hostA"])
            .assert()
            .success()
            .stdout("lib+hostA+4b68ab38\n");
    }

    #[test]
    fn key_with_repository_preset() {
        let temp = TempDir::new().unwrap();
        let manifest = temp.path().join("lazydep.lock");
        std::fs::write(&manifest, "X").unwrap();
        std::fs::write(
            temp.path().join("config.toml"),
            format!(
                "[workspace]\nmanifest_path = {:?}\n",
                manifest.display().to_string()
            ),
        )
        .unwrap();

        let mut cmd = cargo_bin_cmd!("lazydep");
        cmd.arg("--config")
            .arg(temp.path().join("config.toml"))
            .arg("--repository")
            .arg(temp.path())
            .args(["key", "--project", "lib", "--hosting", "hostA"])
            .env_remove("LAZYDEP_WORKSPACE")
            .assert()
            .success()
            .stdout("lib+hostA\n");
    }

    #[test]
    fn key_skips_empty_fragments() {
        let temp = TempDir::new().unwrap();
        lazydep(&temp)
            .args(["key", "--hosting", "hostA", "--no-manifest-fingerprint"])
            .assert()
            .success()
            .stdout("hostA\n");
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        lazydep(&temp)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let temp = TempDir::new().unwrap();
        lazydep(&temp)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[installer]"));
    }

    #[test]
    fn config_init_writes_file() {
        let temp = TempDir::new().unwrap();
        lazydep(&temp).args(["config", "init"]).assert().success();
        let written = std::fs::read_to_string(temp.path().join("config.toml")).unwrap();
        assert!(written.contains("program = \"npm\""));
    }

    #[test]
    fn invalid_config_shows_hint() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("config.toml"), "[installer\n").unwrap();
        lazydep(&temp)
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn cache_list_empty() {
        let temp = TempDir::new().unwrap();
        lazydep(&temp)
            .args(["cache", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No cache snapshots found"));
    }

    #[test]
    fn cache_list_empty_json() {
        let temp = TempDir::new().unwrap();
        lazydep(&temp)
            .args(["cache", "list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[]"));
    }

    #[test]
    fn cache_remove_missing() {
        let temp = TempDir::new().unwrap();
        lazydep(&temp)
            .args(["cache", "remove", "lib+hostA"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Cache snapshot not found"));
    }

    #[test]
    fn acquire_rejects_bad_package() {
        let temp = TempDir::new().unwrap();
        lazydep(&temp)
            .args(["acquire", "pluginA@"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid package spec"));
    }

    #[test]
    fn acquire_with_missing_installer_fails() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("config.toml"),
            "[installer]\nprogram = \"lazydep-no-such-installer\"\n",
        )
        .unwrap();

        lazydep(&temp)
            .args(["acquire", "pluginA", "--project", "lib"])
            .arg("--no-manifest-fingerprint")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to install pluginA"));
    }
}

#[cfg(unix)]
mod run_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Fake package manager: writes node_modules/<name>/package.json and
    /// appends the requested qualifier to `installs.log`
    fn write_fake_installer(dir: &Path) -> PathBuf {
        let log = dir.join("installs.log");
        let script = dir.join("fake-pm");
        let body = format!(
            r#"#!/bin/sh
pkg="$2"
case "$pkg" in
  ?*@*) name="${{pkg%@*}}"; version="${{pkg##*@}}" ;;
  *) name="$pkg"; version="1.0.0" ;;
esac
mkdir -p "node_modules/$name"
printf '{{"name":"%s","version":"%s"}}' "$name" "$version" > "node_modules/$name/package.json"
echo "$pkg" >> "{}"
"#,
            log.display()
        );
        std::fs::write(&script, body).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    fn setup() -> TempDir {
        let temp = TempDir::new().unwrap();
        let script = write_fake_installer(temp.path());
        std::fs::write(
            temp.path().join("config.toml"),
            format!(
                "[installer]\nprogram = {:?}\n",
                script.display().to_string()
            ),
        )
        .unwrap();
        temp
    }

    fn acquire(temp: &TempDir, packages: &[&str]) -> Command {
        let mut cmd = cargo_bin_cmd!("lazydep");
        cmd.arg("--config")
            .arg(temp.path().join("config.toml"))
            .arg("--workspace")
            .arg(temp.path().join("deps"))
            .arg("--store")
            .arg(temp.path().join("store"))
            .arg("--no-manifest-fingerprint")
            .arg("acquire")
            .args(packages)
            .args(["--project", "lib", "--hosting", "hostA", "--format", "json"]);
        cmd
    }

    fn report(cmd: &mut Command) -> serde_json::Value {
        let output = cmd.assert().success().get_output().stdout.clone();
        serde_json::from_slice(&output).unwrap()
    }

    fn installs(temp: &TempDir) -> Vec<String> {
        std::fs::read_to_string(temp.path().join("installs.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn cold_then_warm_run() {
        let temp = setup();

        let first = report(&mut acquire(&temp, &["pluginA@2.0.0"]));
        assert_eq!(first["status"], "miss");
        assert_eq!(first["key"], "lib+hostA");
        assert_eq!(first["saved"], true);
        assert_eq!(first["plugins"][0]["version"], "2.0.0");
        assert_eq!(installs(&temp), vec!["pluginA@2.0.0"]);

        std::fs::remove_dir_all(temp.path().join("deps")).unwrap();

        let second = report(&mut acquire(&temp, &["pluginA@2.0.0"]));
        assert_eq!(second["status"], "hit");
        assert_eq!(second["saved"], false);
        assert_eq!(second["plugins"][0]["name"], "pluginA");
        assert_eq!(installs(&temp), vec!["pluginA@2.0.0"]);
    }

    #[test]
    fn miss_installs_each_package() {
        let temp = setup();

        let run = report(&mut acquire(&temp, &["pluginA", "@scope/pluginB@1.2.0"]));

        assert_eq!(run["plugins"].as_array().unwrap().len(), 2);
        assert_eq!(installs(&temp), vec!["pluginA", "@scope/pluginB@1.2.0"]);
        assert!(temp
            .path()
            .join("deps/node_modules/@scope/pluginB/package.json")
            .exists());
    }

    #[test]
    fn hit_with_unseen_package_fails_to_load() {
        let temp = setup();
        report(&mut acquire(&temp, &["pluginA"]));

        acquire(&temp, &["pluginC"])
            .assert()
            .failure()
            .stderr(predicates::str::contains("Failed to load plugin pluginC"));
        assert_eq!(installs(&temp), vec!["pluginA"]);
    }

    #[test]
    fn verify_installed_fills_gap_on_hit() {
        let temp = setup();
        report(&mut acquire(&temp, &["pluginA"]));

        let run = report(acquire(&temp, &["pluginC"]).arg("--verify-installed"));

        assert_eq!(run["status"], "hit");
        assert_eq!(run["saved"], true);
        assert_eq!(installs(&temp), vec!["pluginA", "pluginC"]);
    }
}
