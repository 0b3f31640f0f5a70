use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_pkbindgen")))
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

/// Generate every target into a fresh directory.
fn generate_all(dir: &TempDir) {
    cmd()
        .arg("--year")
        .arg("2024")
        .arg(fixture_path("pagekite.h"))
        .arg(dir.path().join("PageKiteAPI.java"))
        .arg(dir.path().join("pagekite-jni.c"))
        .arg(dir.path().join("libpagekite/__init__.py"))
        .arg(dir.path().join("doc/API.md"))
        .arg(dir.path().join("doc/JNI_API.md"))
        .arg(dir.path().join("api.json"))
        .assert()
        .success();
}

fn read(dir: &TempDir, name: &str) -> String {
    fs::read_to_string(dir.path().join(name)).unwrap()
}

const OUTPUTS: &[&str] = &[
    "PageKiteAPI.java",
    "pagekite-jni.c",
    "libpagekite/__init__.py",
    "doc/API.md",
    "doc/JNI_API.md",
    "api.json",
];

#[test]
fn writes_every_target() {
    let dir = TempDir::new().unwrap();
    generate_all(&dir);
    for name in OUTPUTS {
        assert!(dir.path().join(name).exists(), "missing {}", name);
    }

    let java = read(&dir, "PageKiteAPI.java");
    assert!(java.contains("Copyright 2012-2024"));
    assert!(java.contains("    public static final String PK_VERSION = \"141208C\";"));
    assert!(java.contains("    public static native boolean init(String app_id, int max_kites, int flags, int verbosity);"));
    assert!(java.contains("    public static native String version();"));
}

#[test]
fn constants_follow_the_whitelist() {
    let dir = TempDir::new().unwrap();
    generate_all(&dir);
    let json: serde_json::Value = serde_json::from_str(&read(&dir, "api.json")).unwrap();
    let names: Vec<&str> = json["constants"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "PK_VERSION",
            "PK_WITH_SSL",
            "PK_WITH_IPV4",
            "PK_WITH_IPV6",
            "PK_STATUS_STARTUP",
            "PK_STATUS_FLYING",
            "PK_LOG_ERROR",
            "PK_LOG_MANAGER_ERROR",
            "PK_LOG_ERRORS",
            "PK_LOG_NORMAL",
        ]
    );
    assert_eq!(json["constants"][0]["value"], "\"141208C\"");
}

#[test]
fn excluded_functions_appear_nowhere() {
    let dir = TempDir::new().unwrap();
    generate_all(&dir);
    for name in OUTPUTS {
        let out = read(&dir, name);
        assert!(!out.contains("relay_add_listener"), "{} mentions a relay function", name);
        assert!(!out.contains("relayAddListener"), "{} mentions a relay function", name);
    }
}

#[test]
fn unmappable_function_is_stubbed_everywhere_it_must_be() {
    let dir = TempDir::new().unwrap();
    generate_all(&dir);

    let java = read(&dir, "PageKiteAPI.java");
    assert!(java.contains("/* FIXME: int pagekite_enable_plugins(pagekite_mgr, int count, char** settings) */"));
    let jni = read(&dir, "pagekite-jni.c");
    assert!(jni.contains("/* FIXME: int pagekite_enable_plugins("));
    let py = read(&dir, "libpagekite/__init__.py");
    assert!(py.contains("# FIXME: int pagekite_enable_plugins("));
    let jni_doc = read(&dir, "doc/JNI_API.md");
    assert!(jni_doc.contains("> FIXME: `int pagekite_enable_plugins("));

    // Siblings declared after the stub are still generated.
    assert!(java.contains("public static native String getLog();"));
    assert!(jni.contains("Java_net_pagekite_lib_PageKiteAPI_getLog("));
    assert!(py.contains("    def get_log(self):"));
}

#[test]
fn parameter_counts_agree_across_targets() {
    let dir = TempDir::new().unwrap();
    generate_all(&dir);

    // pagekite_add_kite: handle + six public parameters.
    let java = read(&dir, "PageKiteAPI.java");
    let line = java.lines().find(|l| l.contains(" addKite(")).unwrap();
    assert_eq!(line.matches(',').count() + 1, 6);

    let jni = read(&dir, "pagekite-jni.c");
    let bridge = jni.split("Java_net_pagekite_lib_PageKiteAPI_addKite(").nth(1).unwrap();
    let head = &bridge[..bridge.find("){").unwrap()];
    assert_eq!(head.lines().filter(|l| l.starts_with(", j")).count(), 6);

    let py = read(&dir, "libpagekite/__init__.py");
    assert!(py.contains("    def add_kite(self, proto, kitename, pport, secret, backend, lport):"));
    assert!(py.contains("('pagekite_add_kite', c_int, [c_void_p, c_char_p, c_char_p, c_int, c_char_p, c_char_p, c_int]),"));

    let doc = read(&dir, "doc/API.md");
    let block = doc.split("#### `int pagekite_add_kite(...)`").nth(1).unwrap();
    let block = &block[..block.find("**Returns**").unwrap()];
    assert_eq!(block.lines().filter(|l| l.starts_with("   * `")).count(), 7);
}

#[test]
fn documentation_groups_and_returns() {
    let dir = TempDir::new().unwrap();
    generate_all(&dir);
    let doc = read(&dir, "doc/API.md");
    assert!(doc.starts_with("# PageKite API reference manual\n"));
    assert!(doc.contains("   * Lifecycle\n      * [`pagekite_init"));
    assert!(doc.contains("**Returns**: 0 on success, -1 on failure."));
    assert!(doc.contains(" * `PK_WITH_SSL`: `0x0001`"));
    assert!(doc.contains("   * `const char* proto`: Protocol, e.g. http"));

    let jni_doc = read(&dir, "doc/JNI_API.md");
    assert!(jni_doc.contains("#### `boolean init(...)`"));
    assert!(jni_doc.contains("**Returns**: true on success."));
    assert!(!jni_doc.contains("`pagekite_mgr`"));
}

#[test]
fn python_wrapper_manages_the_handle() {
    let dir = TempDir::new().unwrap();
    generate_all(&dir);
    let py = read(&dir, "libpagekite/__init__.py");
    assert!(py.contains("        self.pkm = self.dll.pagekite_init(_bytes(app_id), max_kites, flags, verbosity)"));
    assert!(py.contains("        if self.pkm is not None:\n            self.thread_stop()\n            self.free()"));
    assert!(py.contains("        Returns: bytes, or None.\n"));
}

#[test]
fn unknown_extension_fails_before_writing() {
    let dir = TempDir::new().unwrap();
    let java = dir.path().join("PageKiteAPI.java");
    cmd()
        .arg(fixture_path("pagekite.h"))
        .arg(&java)
        .arg(dir.path().join("bindings.rb"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized output target"));
    assert!(!java.exists());
}

#[test]
fn missing_header_fails() {
    let dir = TempDir::new().unwrap();
    cmd()
        .arg(fixture_path("nope.h"))
        .arg(dir.path().join("API.md"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read header"));
}

#[test]
fn stdout_mode_prints_single_output() {
    cmd()
        .arg("--stdout")
        .arg(fixture_path("pagekite.h"))
        .arg("API.md")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# PageKite API reference manual"));
}

#[test]
fn stdout_mode_rejects_several_outputs() {
    cmd()
        .arg("--stdout")
        .arg(fixture_path("pagekite.h"))
        .arg("API.md")
        .arg("api.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--stdout needs exactly one output"));
}

#[test]
fn profile_overrides_names() {
    let dir = TempDir::new().unwrap();
    let profile = dir.path().join("profile.toml");
    fs::write(
        &profile,
        "java_package = \"org.example.kite\"\njava_class = \"KiteAPI\"\n",
    )
    .unwrap();
    cmd()
        .arg("--profile")
        .arg(&profile)
        .arg("--stdout")
        .arg(fixture_path("pagekite.h"))
        .arg("glue.c")
        .assert()
        .success()
        .stdout(predicate::str::contains("Java_org_example_kite_KiteAPI_addKite("));
}

#[test]
fn bad_profile_is_fatal() {
    let dir = TempDir::new().unwrap();
    let profile = dir.path().join("profile.toml");
    fs::write(&profile, "no_such_field = 1\n").unwrap();
    cmd()
        .arg("-c")
        .arg(&profile)
        .arg(fixture_path("pagekite.h"))
        .arg(dir.path().join("API.md"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse profile"));
}

#[test]
fn stubs_are_logged() {
    let dir = TempDir::new().unwrap();
    cmd()
        .arg(fixture_path("pagekite.h"))
        .arg(dir.path().join("PageKiteAPI.java"))
        .assert()
        .success()
        .stderr(predicate::str::contains("stubbing pagekite_enable_plugins"))
        .stderr(predicate::str::contains("wrote"));
}
