//! Application command reconciliation against the console gateway
//! Run with: cargo test --test reconcile_test

mod common;

use carik_runtime::domain::entities::{ApplicationCommandDescriptor, Command, Extension, ExtensionScope, Scope};
use carik_runtime::extensions::StaticLoader;
use carik_runtime::{Config, RuntimeError};

use common::{runtime, Calls, Record, GUILD};

fn slash_extension(name: &str, commands: &[&str], calls: &Calls) -> Extension {
    commands.iter().fold(Extension::new(name), |ext, command| {
        ext.with_command(
            Command::new(*command)
                .with_application_command(ApplicationCommandDescriptor::slash(*command, "test command"))
                .on_chat_input(Record::new(command, calls)),
        )
    })
}

fn guild_extension(name: &str, commands: &[&str], calls: &Calls) -> Extension {
    slash_extension(name, commands, calls).with_scope(ExtensionScope::Guilds(vec![GUILD.to_string()]))
}

#[tokio::test]
async fn test_stale_commands_are_deleted_and_desired_set_pushed() {
    let calls = Calls::default();
    let (adapter, runtime) = runtime(Config::default());
    runtime.extensions().register(slash_extension("tools", &["a", "b"], &calls)).unwrap();
    runtime.extensions().activate("tools", &Scope::Global).unwrap();
    adapter.set_live(Scope::Global, ["b", "c"]);

    let report = runtime.reconciler().reconcile(&Scope::Global).await.unwrap();

    assert_eq!(report.deleted, vec!["c"]);
    assert_eq!(report.pushed, vec!["a", "b"]);
    assert!(report.failed.is_empty());
    assert_eq!(adapter.deleted(), vec![(Scope::Global, "c".to_string())]);
    assert_eq!(adapter.live_names(&Scope::Global), vec!["a", "b"]);
}

#[tokio::test]
async fn test_only_active_extensions_are_published() {
    let calls = Calls::default();
    let (adapter, runtime) = runtime(Config::default());
    runtime.extensions().register(slash_extension("on", &["a"], &calls)).unwrap();
    runtime.extensions().register(slash_extension("off", &["b"], &calls)).unwrap();
    runtime.extensions().activate("on", &Scope::Global).unwrap();

    let report = runtime.reconciler().reconcile(&Scope::Global).await.unwrap();
    assert_eq!(report.pushed, vec!["a"]);
    assert!(adapter.live_names(&Scope::guild(GUILD)).is_empty());
}

#[tokio::test]
async fn test_duplicate_names_across_extensions_fail_before_any_call() {
    let calls = Calls::default();
    let (adapter, runtime) = runtime(Config::default());
    runtime.extensions().register(slash_extension("first", &["x"], &calls)).unwrap();
    runtime.extensions().register(slash_extension("second", &["x"], &calls)).unwrap();
    runtime.extensions().activate_all(&Scope::Global).unwrap();

    assert!(matches!(
        runtime.reconciler().reconcile(&Scope::Global).await,
        Err(RuntimeError::DuplicateRegistration(_))
    ));
    assert!(adapter.pushed().is_empty());
}

#[tokio::test]
async fn test_failed_delete_does_not_abort() {
    let calls = Calls::default();
    let (adapter, runtime) = runtime(Config::default());
    runtime.extensions().register(slash_extension("tools", &["a"], &calls)).unwrap();
    runtime.extensions().activate("tools", &Scope::Global).unwrap();
    adapter.set_live(Scope::Global, ["old", "older"]);
    adapter.fail_delete("old");

    let report = runtime.reconciler().reconcile(&Scope::Global).await.unwrap();

    assert_eq!(report.deleted, vec!["older"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "old");
    assert_eq!(adapter.pushed(), vec![(Scope::Global, vec!["a".to_string()])]);
}

#[tokio::test]
async fn test_clear_empties_scope() {
    let (adapter, runtime) = runtime(Config::default());
    adapter.set_live(Scope::guild(GUILD), ["a", "b"]);

    runtime.reconciler().clear(&Scope::guild(GUILD)).await.unwrap();

    assert!(adapter.live_names(&Scope::guild(GUILD)).is_empty());
    assert_eq!(adapter.pushed(), vec![(Scope::guild(GUILD), Vec::new())]);
}

#[tokio::test]
async fn test_start_publishes_into_development_guild() {
    let calls = Calls::default();
    let mut config = Config::default();
    config.commands.auto_register = true;
    config.commands.guild_id = Some(GUILD.to_string());
    let (adapter, runtime) = runtime(config);

    let tools = calls.clone();
    let loader = StaticLoader::new().with("tools", move || slash_extension("tools", &["a", "b"], &tools));
    let report = runtime.start(&loader).await.unwrap();

    let reconciled = report.reconciled.unwrap();
    assert_eq!(reconciled.scope, Scope::guild(GUILD));
    assert_eq!(reconciled.pushed, vec!["a", "b"]);
    assert_eq!(adapter.live_names(&Scope::guild(GUILD)), vec!["a", "b"]);
    assert!(adapter.live_names(&Scope::Global).is_empty());
}

#[tokio::test]
async fn test_unload_prunes_published_commands() {
    let calls = Calls::default();
    let mut config = Config::default();
    config.commands.auto_register = true;
    let (adapter, runtime) = runtime(config);

    let first = calls.clone();
    let second = calls.clone();
    let loader = StaticLoader::new()
        .with("tools", move || slash_extension("tools", &["a"], &first))
        .with("games", move || slash_extension("games", &["dice"], &second));
    runtime.start(&loader).await.unwrap();
    assert_eq!(adapter.live_names(&Scope::Global), vec!["a", "dice"]);

    let report = runtime.unload_extension("games").await.unwrap();
    assert_eq!(report.application_commands, vec!["dice"]);
    assert_eq!(adapter.live_names(&Scope::Global), vec!["a"]);
    assert_eq!(adapter.deleted(), vec![(Scope::Global, "dice".to_string())]);
}

#[tokio::test]
async fn test_unload_prunes_guild_scoped_commands() {
    let calls = Calls::default();
    let (adapter, runtime) = runtime(Config::default());
    runtime.extensions().register(guild_extension("guildy", &["x"], &calls)).unwrap();
    runtime.extensions().activate("guildy", &Scope::guild(GUILD)).unwrap();
    runtime.reconciler().reconcile(&Scope::guild(GUILD)).await.unwrap();
    assert_eq!(adapter.live_names(&Scope::guild(GUILD)), vec!["x"]);

    let report = runtime.unload_extension("guildy").await.unwrap();

    assert_eq!(report.scopes, vec![Scope::guild(GUILD)]);
    assert!(adapter.live_names(&Scope::guild(GUILD)).is_empty());
    assert_eq!(adapter.deleted(), vec![(Scope::guild(GUILD), "x".to_string())]);
    assert!(adapter.live_names(&Scope::Global).is_empty());
}

#[tokio::test]
async fn test_development_guild_carries_global_and_guild_commands() {
    let calls = Calls::default();
    let mut config = Config::default();
    config.commands.auto_register = true;
    config.commands.guild_id = Some(GUILD.to_string());
    let (adapter, runtime) = runtime(config);

    let tools = calls.clone();
    let loader = StaticLoader::new().with("tools", move || slash_extension("tools", &["a"], &tools));
    runtime.start(&loader).await.unwrap();
    assert_eq!(adapter.live_names(&Scope::guild(GUILD)), vec!["a"]);

    runtime.extensions().register(guild_extension("guildy", &["x"], &calls)).unwrap();
    runtime.extensions().activate("guildy", &Scope::guild(GUILD)).unwrap();
    let report = runtime.reconciler().reconcile(&Scope::guild(GUILD)).await.unwrap();
    assert!(report.deleted.is_empty());
    assert_eq!(adapter.live_names(&Scope::guild(GUILD)), vec!["a", "x"]);

    // unloading the global extension keeps the guild's own commands
    runtime.unload_extension("tools").await.unwrap();
    assert_eq!(adapter.live_names(&Scope::guild(GUILD)), vec!["x"]);

    runtime.unload_extension("guildy").await.unwrap();
    assert!(adapter.live_names(&Scope::guild(GUILD)).is_empty());
}

#[tokio::test]
async fn test_development_guild_names_are_unique_across_scopes() {
    let calls = Calls::default();
    let mut config = Config::default();
    config.commands.guild_id = Some(GUILD.to_string());
    let (adapter, runtime) = runtime(config);
    runtime.extensions().register(slash_extension("tools", &["a"], &calls)).unwrap();
    runtime.extensions().register(guild_extension("guildy", &["a"], &calls)).unwrap();
    runtime.extensions().activate("tools", &Scope::Global).unwrap();
    runtime.extensions().activate("guildy", &Scope::guild(GUILD)).unwrap();

    assert!(matches!(
        runtime.publish().await,
        Err(RuntimeError::DuplicateRegistration(_))
    ));
    assert!(adapter.pushed().is_empty());

    // a guild that is not the development guild only carries its own set
    assert_eq!(runtime.reconciler().sources(&Scope::guild("777")), vec![Scope::guild("777")]);
}
