//! Launcher tests using fake run configs.

use sc2env_core::process::ProcessHandle;
use sc2env_core::run_config::{LaunchOverrides, RunConfig, RunConfigRegistry, StartOptions};
use sc2env_headless::launcher::{launch_game, plan_launch, resolve_run_config_with};
use sc2env_headless::settings::EnvSettings;
use sc2env_test_utils::fixtures::{FakeVariant, StartLog};

fn registry(log: &StartLog) -> RunConfigRegistry {
    let mut registry = RunConfigRegistry::new();
    registry
        .register(FakeVariant::with_log("Linux", 1, log.clone()))
        .register(FakeVariant::with_log("Wine", 2, log.clone()));
    registry
}

#[test]
fn test_settings_select_run_config_and_version() {
    let log = StartLog::default();
    let settings = EnvSettings {
        run_config: Some("Linux".to_string()),
        version: Some("4.10".to_string()),
        ..EnvSettings::default()
    };
    let config =
        resolve_run_config_with(&registry(&log), &settings, &LaunchOverrides::default()).unwrap();
    assert_eq!(config.name(), "Linux");
    assert_eq!(config.version(), Some("4.10"));
}

#[test]
fn test_default_selection_is_highest_priority() {
    let log = StartLog::default();
    let config = resolve_run_config_with(
        &registry(&log),
        &EnvSettings::default(),
        &LaunchOverrides::default(),
    )
    .unwrap();
    assert_eq!(config.name(), "Wine");
}

#[test]
fn test_unknown_run_config_in_settings() {
    let log = StartLog::default();
    let settings = EnvSettings {
        run_config: Some("Cluster".to_string()),
        ..EnvSettings::default()
    };
    let err = resolve_run_config_with(&registry(&log), &settings, &LaunchOverrides::default())
        .unwrap_err();
    assert!(err.to_string().contains("Valid configs are: Linux, Wine"));
}

#[test]
fn test_launch_starts_one_process_per_agent_with_overrides() {
    let log = StartLog::default();
    let overrides = LaunchOverrides::default()
        .with_extra_args(["-norender"])
        .with_window_size((320, 240));
    let config =
        resolve_run_config_with(&registry(&log), &EnvSettings::default(), &overrides).unwrap();

    let options = StartOptions {
        extra_args: Some(vec!["-verbose".to_string()]),
        ..StartOptions::default()
    };
    let mut game = launch_game(config, 3, &options).unwrap();

    assert_eq!(game.processes().len(), 3);
    let mut ports = game.ports();
    ports.sort_unstable();
    ports.dedup();
    assert_eq!(ports.len(), 3, "every agent needs its own port");
    let calls = log.calls();
    assert_eq!(calls.len(), 3);
    for call in calls {
        assert_eq!(
            call.extra_args,
            Some(vec!["-verbose".to_string(), "-norender".to_string()])
        );
        assert_eq!(call.window_size, Some((320, 240)));
    }

    assert!(game.processes().iter_mut().all(|p| p.is_running()));
    game.close_all().unwrap();
    assert!(game.processes().iter_mut().all(|p| !p.is_running()));
}

#[test]
fn test_plan_launch_does_not_start() {
    let log = StartLog::default();
    let overrides = LaunchOverrides::default().with_extra_args(["-norender"]);
    let config =
        resolve_run_config_with(&registry(&log), &EnvSettings::default(), &overrides).unwrap();

    let commands = plan_launch(&config, 2, &StartOptions::default()).unwrap();
    assert_eq!(commands.len(), 2);
    assert!(commands.iter().all(|c| c.args == vec!["-norender"]));
    assert_ne!(commands[0].port, commands[1].port);
    assert!(log.calls().is_empty());
}

#[test]
fn test_bundled_settings_file_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/settings/default.ron");
    let settings = EnvSettings::load(path).unwrap();
    assert_eq!(settings.step_mul, 8);
    assert_eq!(settings.window_size, Some(vec![640, 480]));
    assert_eq!(settings.agent_names.len(), 2);
}

#[test]
fn test_override_snapshot_reported_as_json() {
    let log = StartLog::default();
    let overrides = LaunchOverrides::default()
        .with_extra_args(["-norender"])
        .with_window_location((10, 20));
    let config =
        resolve_run_config_with(&registry(&log), &EnvSettings::default(), &overrides).unwrap();

    let json = serde_json::to_value(config.overrides()).unwrap();
    assert_eq!(json["extra_args"], serde_json::json!(["-norender"]));
    assert_eq!(json["window_location"], serde_json::json!([10, 20]));
    assert!(json["window_size"].is_null());
}
